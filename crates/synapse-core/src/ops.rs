//! Tensor operations: arithmetic and shape manipulation.
//!
//! Allocating operations return new tensors.
//! In-place variants are suffixed with `_` (e.g., `add_`).

pub mod arithmetic;
pub mod manipulation;
