//! Convenience re-exports for common synapse-nn types.
//!
//! ```rust
//! use synapse_nn::prelude::*;
//! ```

pub use crate::{Activation, ActivationType};
pub use crate::{Dense, DenseConfig};
pub use crate::FeedForward;
pub use crate::Flatten;
pub use crate::InputLayer;
pub use crate::{Layer, LayerConfig};
pub use crate::{PaddingType, Pooling, PoolingConfig, PoolingType};
pub use crate::Sequential;
pub use synapse_core::prelude::*;
