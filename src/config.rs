//! Thresholds shared by the entry points and the worker-pool configuration used by
//! [`concurrent_in`](crate::fibonacci::concurrent_in).

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::fibonacci::FibonacciError;

pub mod thresholds {
    /// Largest index whose Fibonacci number fits in a `u64` (F(93) = 12200160415121876738).
    pub const FIXED_WIDTH_MAX: u64 = 93;

    /// First index that needs arbitrary-precision arithmetic. Below it the big-integer
    /// entry points delegate to [`uint64`](crate::math::uint64).
    pub const BIG_INT_CROSSOVER: u64 = FIXED_WIDTH_MAX + 1;
}

/// Settings for a dedicated rayon pool.
///
/// # Example
/// ```
/// use fibcalc::config::PoolConfig;
/// use fibcalc::fibonacci;
///
/// let pool = PoolConfig::default().num_threads(2).build().unwrap();
/// assert_eq!(fibonacci::concurrent_in(&pool, 100), fibonacci::sequential(100));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PoolConfig {
    /// Worker count; `None` lets rayon pick one thread per logical CPU.
    pub num_threads: Option<usize>,
    pub thread_name_prefix: Option<String>,
}

impl PoolConfig {
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = Some(prefix.into());
        self
    }

    pub fn build(&self) -> Result<ThreadPool, FibonacciError> {
        let mut builder = ThreadPoolBuilder::new();
        if let Some(num_threads) = self.num_threads {
            builder = builder.num_threads(num_threads);
        }
        if let Some(prefix) = self.thread_name_prefix.clone() {
            builder = builder.thread_name(move |i| format!("{prefix}-{i}"));
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossover_follows_fixed_width_limit() {
        assert_eq!(thresholds::BIG_INT_CROSSOVER, 94);
    }

    #[test]
    fn builds_pool_with_requested_threads() {
        let pool = PoolConfig::default()
            .num_threads(3)
            .thread_name_prefix("fib")
            .build()
            .unwrap();
        assert_eq!(pool.current_num_threads(), 3);

        let name = pool.install(|| std::thread::current().name().map(str::to_owned));
        assert!(name.unwrap().starts_with("fib-"));
    }
}
