//! # synapse-core
//!
//! Core tensor engine for the synapse feed-forward layer stack.
//!
//! Provides the foundational `Tensor<T>` type with:
//! - A generic element type (`f32`, `f64`) resolved at compile time
//! - Exclusively owned, contiguous row-major storage
//! - Shape-checked matrix product, elementwise add and reshape
//! - Zeros / ones / normal / uniform initializers

pub mod dtype;
pub mod error;
pub mod init;
pub mod ops;
pub mod prelude;
pub mod shape;
pub mod tensor;

pub use dtype::{DType, Element};
pub use error::{ErrorKind, SynapseError};
pub use init::{Initializer, InitializerType};
pub use shape::Shape;
pub use tensor::Tensor;

pub type Result<T> = std::result::Result<T, SynapseError>;
