use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::config::thresholds::FIXED_WIDTH_MAX;
use crate::fibonacci::FibonacciError;

/// Computes F(n) by raising the Fibonacci matrix to the n-th power over `u64`.
///
/// It is based on the identity:
/// ```text
/// | 1 1 |^n = | F(n+1) F(n)   |
/// | 1 0 |     | F(n)   F(n-1) |
/// ```
///
/// The result is exact for `n <= 93`. Past that the arithmetic wraps, so the returned value is
/// F(n) modulo 2^64. Use [`checked_uint64`] to reject those indices instead.
///
/// # Example
/// ```
/// use fibcalc::math::uint64;
/// assert_eq!(uint64(50), 12586269025);
/// ```
pub fn uint64(mut n: u8) -> u64 {
    if n < 2 {
        return u64::from(n);
    }

    // Matrix being squared
    // | a b |
    // | c d |
    let (mut a, mut b, mut c, mut d) = (1u64, 1u64, 1u64, 0u64);

    // Results vector
    // | rc rd |
    let (mut rc, mut rd) = (0u64, 1u64);

    while n != 1 {
        if n & 1 != 0 {
            // rc, rd = rc*a + rd*c, rc*b + rd*d
            (rc, rd) = (
                rc.wrapping_mul(a).wrapping_add(rd.wrapping_mul(c)),
                rc.wrapping_mul(b).wrapping_add(rd.wrapping_mul(d)),
            );
        }

        // a, b, c, d = a*a + b*c, a*b + b*d, c*a + d*c, c*b + d*d
        (a, b, c, d) = (
            a.wrapping_mul(a).wrapping_add(b.wrapping_mul(c)),
            a.wrapping_mul(b).wrapping_add(b.wrapping_mul(d)),
            c.wrapping_mul(a).wrapping_add(d.wrapping_mul(c)),
            c.wrapping_mul(b).wrapping_add(d.wrapping_mul(d)),
        );

        n >>= 1;
    }

    rc.wrapping_mul(a).wrapping_add(rd.wrapping_mul(c))
}

/// Like [`uint64`], but fails for indices whose value does not fit in a `u64`.
pub fn checked_uint64(n: u64) -> Result<u64, FibonacciError> {
    if n > FIXED_WIDTH_MAX {
        return Err(FibonacciError::OutOfRange {
            n,
            max: FIXED_WIDTH_MAX,
        });
    }
    Ok(uint64(n as u8))
}

// 2x2 matrix over arbitrary-precision integers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    pub a: BigUint,
    pub b: BigUint,
    pub c: BigUint,
    pub d: BigUint,
}

impl Matrix {
    /// The generator `| 1 1 ; 1 0 |`.
    pub fn fibonacci_q() -> Self {
        Matrix {
            a: BigUint::one(),
            b: BigUint::one(),
            c: BigUint::one(),
            d: BigUint::zero(),
        }
    }

    pub fn identity() -> Self {
        Matrix {
            a: BigUint::one(),
            b: BigUint::zero(),
            c: BigUint::zero(),
            d: BigUint::one(),
        }
    }

    /// Replaces the matrix with its square.
    ///
    /// Every new entry is built from the old four, and `b*c` is computed once since it appears
    /// in both the new `a` and the new `d`.
    pub fn square(&mut self) {
        let bc = &self.b * &self.c;

        let a = &self.a * &self.a + &bc;
        let b = &self.a * &self.b + &self.b * &self.d;
        let c = &self.c * &self.a + &self.d * &self.c;
        let d = bc + &self.d * &self.d;

        *self = Matrix { a, b, c, d };
    }
}

// Row vector that accumulates the product of the matrix powers picked by the bits of n
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowVector {
    pub rc: BigUint,
    pub rd: BigUint,
}

impl RowVector {
    /// `| 0 1 |`, the bottom row of the identity.
    pub fn unit() -> Self {
        RowVector {
            rc: BigUint::zero(),
            rd: BigUint::one(),
        }
    }

    /// rc, rd = rc*a + rd*c, rc*b + rd*d
    pub fn mul_matrix(&mut self, m: &Matrix) {
        let rc = &self.rc * &m.a + &self.rd * &m.c;
        let rd = &self.rc * &m.b + &self.rd * &m.d;

        self.rc = rc;
        self.rd = rd;
    }

    /// Left entry of `self * m`, which is the answer once the last bit has been consumed.
    pub fn combine(&self, m: &Matrix) -> BigUint {
        &self.rc * &m.a + &self.rd * &m.c
    }
}
