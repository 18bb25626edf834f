//! # Fibonacci Matrix Power Library
//!
//! This library computes the n-th Fibonacci number by raising the Fibonacci matrix to the n-th
//! power with exponentiation by squaring, which needs O(log n) matrix steps instead of the O(n)
//! additions of plain iteration. It rests on the identity:
//!
//! ```text
//! | 1 1 |^n = | F(n+1) F(n)   |
//! | 1 0 |     | F(n)   F(n-1) |
//! ```
//!
//! ## Overview of Functions
//!
//! ### Errors
//! - `FibonacciError`: Enum representing the errors an entry point can report, such as an index
//!   that does not fit in 64 bits, a failed Tokio task, or a thread pool that could not be built.
//!
//! ### Entry Points
//!
//! #### `math::uint64`
//! Fixed-width computation over `u64`. Exact up to F(93); larger indices wrap modulo 2^64.
//! `math::checked_uint64` rejects them with `FibonacciError::OutOfRange` instead.
//!
//! #### `fibonacci::sequential`
//! The same loop over arbitrary-precision integers, for any index. Indices below 94 are delegated
//! to `uint64`.
//!
//! #### `fibonacci::concurrent`
//! Parallel version of `sequential`. The independent products of every step are computed as a
//! batch of Rayon tasks and joined before their sums are formed. `concurrent_in` runs it on a
//! pool built from `config::PoolConfig`.
//!
//! #### `fibonacci::concurrent_async`
//! Asynchronous version using Tokio blocking tasks for the products, for callers that already
//! live inside a runtime.
//!
//! ## Usage Example
//! ```rust
//! use fibcalc::fibonacci::{concurrent, sequential};
//! use num_bigint::BigUint;
//! let f = sequential(100);
//! assert_eq!(f, BigUint::parse_bytes(b"354224848179261915075", 10).unwrap());
//! assert_eq!(concurrent(100), f);
//! ```

pub mod config;
pub mod fibonacci;
pub mod math;

pub use fibonacci::{concurrent, concurrent_async, concurrent_in, sequential, FibonacciError};
pub use math::{checked_uint64, uint64};
