use std::sync::Arc;

use num_bigint::BigUint;
use rayon::ThreadPool;
use tokio::task::{self, JoinError, JoinHandle};
use tracing::{debug, trace};

use crate::math::{checked_uint64, Matrix, RowVector};

#[derive(Debug, thiserror::Error)]
pub enum FibonacciError {
    #[error("F({n}) does not fit in 64 bits, largest supported index is {max}")]
    OutOfRange { n: u64, max: u64 },
    #[error("Tokio Join error: {0:?}")]
    TokioJoin(#[from] JoinError),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

// Fixed-width shortcut shared by all big-integer entry points
fn small(n: u64) -> Option<BigUint> {
    let value = checked_uint64(n).ok()?;
    debug!(n, "computed on the fixed-width path");
    Some(BigUint::from(value))
}

/// Computes F(n) for any `n` using sequential matrix exponentiation over big integers.
///
/// Indices below 94 are answered by [`uint64`](crate::math::uint64) and promoted.
///
/// # Example
/// ```
/// use fibcalc::fibonacci;
/// use num_bigint::BigUint;
/// assert_eq!(
///     fibonacci::sequential(100),
///     BigUint::parse_bytes(b"354224848179261915075", 10).unwrap()
/// );
/// ```
pub fn sequential(n: u64) -> BigUint {
    if let Some(value) = small(n) {
        return value;
    }

    let mut m = Matrix::fibonacci_q();
    let mut r = RowVector::unit();
    let mut rest = n;

    while rest != 1 {
        // If the remaining exponent is odd
        if rest & 1 != 0 {
            r.mul_matrix(&m);
        }

        m.square();

        rest >>= 1;
    }

    let result = r.combine(&m);
    debug!(n, bits = result.bits(), "computed sequentially");
    result
}

/// Computes F(n) like [`sequential`], fanning the independent products of every step out to the
/// rayon global pool.
///
/// Each batch runs inside a `rayon::scope` and every task writes its own slot, so the end of the
/// scope is the only synchronisation. A panicking task (e.g. allocation failure) is resumed on the
/// caller once the batch is joined.
///
/// # Example
/// ```
/// use fibcalc::fibonacci;
/// assert_eq!(fibonacci::concurrent(500), fibonacci::sequential(500));
/// ```
pub fn concurrent(n: u64) -> BigUint {
    if let Some(value) = small(n) {
        return value;
    }

    let mut m = Matrix::fibonacci_q();
    let mut r = RowVector::unit();
    let mut rest = n;

    while rest != 1 {
        trace!(rest, "concurrent step");

        if rest & 1 != 0 {
            par_mul_matrix(&mut r, &m);
        }

        par_square(&mut m);

        rest >>= 1;
    }

    // rc*a + rd*c
    let (rc_a, rd_c) = rayon::join(|| &r.rc * &m.a, || &r.rd * &m.c);
    let result = rc_a + rd_c;
    debug!(n, bits = result.bits(), "computed concurrently");
    result
}

/// Runs [`concurrent`] on the given pool instead of the global one.
pub fn concurrent_in(pool: &ThreadPool, n: u64) -> BigUint {
    pool.install(|| concurrent(n))
}

// rc, rd = rc*a + rd*c, rc*b + rd*d as a batch of 4 products followed by a batch of 2 sums
fn par_mul_matrix(r: &mut RowVector, m: &Matrix) {
    let (mut rc_a, mut rd_c, mut rc_b, mut rd_d): (BigUint, BigUint, BigUint, BigUint) =
        Default::default();

    {
        let (rc, rd) = (&r.rc, &r.rd);
        let (rc_a, rd_c, rc_b, rd_d) = (&mut rc_a, &mut rd_c, &mut rc_b, &mut rd_d);
        rayon::scope(|s| {
            s.spawn(move |_| *rc_a = rc * &m.a);
            s.spawn(move |_| *rd_c = rd * &m.c);
            s.spawn(move |_| *rc_b = rc * &m.b);
            s.spawn(move |_| *rd_d = rd * &m.d);
        });
    }

    let RowVector { rc, rd } = r;
    let (rc_a, rd_c, rc_b, rd_d) = (&rc_a, &rd_c, &rc_b, &rd_d);
    rayon::scope(|s| {
        s.spawn(move |_| *rc = rc_a + rd_c);
        s.spawn(move |_| *rd = rc_b + rd_d);
    });
}

// Products of one squaring step; b*c serves both the new a and the new d
#[derive(Default)]
struct SquareTerms {
    aa: BigUint,
    bc: BigUint,
    ab: BigUint,
    bd: BigUint,
    ca: BigUint,
    dc: BigUint,
    dd: BigUint,
}

// a, b, c, d = a*a + b*c, a*b + b*d, c*a + d*c, c*b + d*d as a batch of 7 products followed by a
// batch of 4 sums
fn par_square(m: &mut Matrix) {
    let mut terms = SquareTerms::default();

    {
        let Matrix { a, b, c, d } = &*m;
        let SquareTerms {
            aa,
            bc,
            ab,
            bd,
            ca,
            dc,
            dd,
        } = &mut terms;
        rayon::scope(|s| {
            s.spawn(move |_| *aa = a * a);
            s.spawn(move |_| *bc = b * c);
            s.spawn(move |_| *ab = a * b);
            s.spawn(move |_| *bd = b * d);
            s.spawn(move |_| *ca = c * a);
            s.spawn(move |_| *dc = d * c);
            s.spawn(move |_| *dd = d * d);
        });
    }

    let Matrix { a, b, c, d } = m;
    let SquareTerms {
        aa,
        bc,
        ab,
        bd,
        ca,
        dc,
        dd,
    } = &terms;
    rayon::scope(|s| {
        s.spawn(move |_| *a = aa + bc);
        s.spawn(move |_| *b = ab + bd);
        s.spawn(move |_| *c = ca + dc);
        s.spawn(move |_| *d = bc + dd);
    });
}

/// Async counterpart of [`concurrent`] for callers already inside a tokio runtime.
///
/// Products run as blocking tasks over a shared snapshot of the current state and are joined with
/// `tokio::try_join!`; the cheap sums are done inline. The first task that fails is returned as
/// [`FibonacciError::TokioJoin`].
///
/// # Example
/// ```
/// # #[tokio::main]
/// # async fn main() -> Result<(), fibcalc::fibonacci::FibonacciError> {
/// use fibcalc::fibonacci;
/// assert_eq!(fibonacci::concurrent_async(300).await?, fibonacci::sequential(300));
/// # Ok(())
/// # }
/// ```
pub async fn concurrent_async(n: u64) -> Result<BigUint, FibonacciError> {
    if let Some(value) = small(n) {
        return Ok(value);
    }

    let mut m = Arc::new(Matrix::fibonacci_q());
    let mut r = Arc::new(RowVector::unit());
    let mut rest = n;

    while rest != 1 {
        trace!(rest, "async step");

        if rest & 1 != 0 {
            let (rc_a, rd_c, rc_b, rd_d) = tokio::try_join!(
                spawn_row_product(&r, &m, |r, m| &r.rc * &m.a),
                spawn_row_product(&r, &m, |r, m| &r.rd * &m.c),
                spawn_row_product(&r, &m, |r, m| &r.rc * &m.b),
                spawn_row_product(&r, &m, |r, m| &r.rd * &m.d),
            )?;

            r = Arc::new(RowVector {
                rc: rc_a + rd_c,
                rd: rc_b + rd_d,
            });
        }

        let (aa, bc, ab, bd, ca, dc, dd) = tokio::try_join!(
            spawn_square_term(&m, |m| &m.a * &m.a),
            spawn_square_term(&m, |m| &m.b * &m.c),
            spawn_square_term(&m, |m| &m.a * &m.b),
            spawn_square_term(&m, |m| &m.b * &m.d),
            spawn_square_term(&m, |m| &m.c * &m.a),
            spawn_square_term(&m, |m| &m.d * &m.c),
            spawn_square_term(&m, |m| &m.d * &m.d),
        )?;

        m = Arc::new(Matrix {
            a: aa + &bc,
            b: ab + bd,
            c: ca + dc,
            d: bc + dd,
        });

        rest >>= 1;
    }

    let result = r.combine(&m);
    debug!(n, bits = result.bits(), "computed asynchronously");
    Ok(result)
}

fn spawn_row_product(
    r: &Arc<RowVector>,
    m: &Arc<Matrix>,
    product: fn(&RowVector, &Matrix) -> BigUint,
) -> JoinHandle<BigUint> {
    let (r, m) = (Arc::clone(r), Arc::clone(m));
    task::spawn_blocking(move || product(&r, &m))
}

fn spawn_square_term(m: &Arc<Matrix>, product: fn(&Matrix) -> BigUint) -> JoinHandle<BigUint> {
    let m = Arc::clone(m);
    task::spawn_blocking(move || product(&m))
}
