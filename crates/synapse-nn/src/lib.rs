//! # synapse-nn
//!
//! Feed-forward layers built on `synapse-core` tensors.
//!
//! Every layer implements [`FeedForward`], taking a `[batch, ..features]`
//! tensor and returning the transformed batch. Layers compose into a
//! [`Sequential`] pipeline, either directly or from a deserialized
//! [`LayerConfig`] list.

pub mod activations;
pub mod config;
pub mod dense;
pub mod flatten;
pub mod input;
pub mod layer;
pub mod pool;
pub mod prelude;
pub mod sequential;

pub use activations::{Activation, ActivationType};
pub use config::{DenseConfig, LayerConfig, PoolingConfig};
pub use dense::Dense;
pub use flatten::Flatten;
pub use input::InputLayer;
pub use layer::{FeedForward, Layer};
pub use pool::{PaddingType, Pooling, PoolingType};
pub use sequential::Sequential;
