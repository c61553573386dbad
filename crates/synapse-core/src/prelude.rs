//! Convenience re-exports for common synapse-core types.
//!
//! ```rust
//! use synapse_core::prelude::*;
//! ```

pub use crate::DType;
pub use crate::Element;
pub use crate::ErrorKind;
pub use crate::Initializer;
pub use crate::InitializerType;
pub use crate::Result;
pub use crate::Shape;
pub use crate::SynapseError;
pub use crate::Tensor;
