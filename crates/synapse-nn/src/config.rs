//! Layer configuration.
//!
//! Every struct here deserializes from the camelCase option names used by
//! saved model descriptions, e.g.
//!
//! ```json
//! { "type": "dense", "inputShape": [4], "numUnits": 3, "activationType": "relu" }
//! ```
//!
//! Omitted options take their defaults.

use rand::Rng;
use serde::{Deserialize, Serialize};
use synapse_core::{Element, Initializer, InitializerType, Result};

use crate::activations::ActivationType;
use crate::dense::Dense;
use crate::flatten::Flatten;
use crate::input::InputLayer;
use crate::layer::Layer;
use crate::pool::{PaddingType, Pooling, PoolingType};

/// Options for a [`Dense`] layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DenseConfig {
    pub activation_type: ActivationType,
    pub use_bias: bool,
    pub weights_initializer_type: InitializerType,
    pub weights_initializer_params: (f64, f64),
    pub bias_initializer_type: InitializerType,
    pub bias_initializer_params: (f64, f64),
}

impl Default for DenseConfig {
    fn default() -> Self {
        Self {
            activation_type: ActivationType::Linear,
            use_bias: true,
            weights_initializer_type: InitializerType::RandNormal,
            weights_initializer_params: (0.0, 1.0),
            bias_initializer_type: InitializerType::RandNormal,
            bias_initializer_params: (0.0, 1.0),
        }
    }
}

impl DenseConfig {
    pub fn activation(mut self, activation_type: ActivationType) -> Self {
        self.activation_type = activation_type;
        self
    }

    pub fn use_bias(mut self, use_bias: bool) -> Self {
        self.use_bias = use_bias;
        self
    }

    pub fn weights_initializer(mut self, init: Initializer) -> Self {
        self.weights_initializer_type = init.kind;
        self.weights_initializer_params = init.params;
        self
    }

    pub fn bias_initializer(mut self, init: Initializer) -> Self {
        self.bias_initializer_type = init.kind;
        self.bias_initializer_params = init.params;
        self
    }

    pub fn weights_init(&self) -> Initializer {
        Initializer::new(self.weights_initializer_type, self.weights_initializer_params)
    }

    pub fn bias_init(&self) -> Initializer {
        Initializer::new(self.bias_initializer_type, self.bias_initializer_params)
    }
}

/// Options for a [`Pooling`] layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PoolingConfig {
    pub pooling_type: PoolingType,
    /// Window size, `[rows]` or `[rows, cols]`.
    pub pool_size: Vec<usize>,
    /// Window step; `None` steps by `pool_size`.
    pub strides: Option<Vec<usize>>,
    pub padding_type: PaddingType,
}

impl Default for PoolingConfig {
    fn default() -> Self {
        Self {
            pooling_type: PoolingType::Max,
            pool_size: vec![2, 2],
            strides: None,
            padding_type: PaddingType::Valid,
        }
    }
}

impl PoolingConfig {
    pub fn new(pooling_type: PoolingType, pool_size: &[usize]) -> Self {
        Self {
            pooling_type,
            pool_size: pool_size.to_vec(),
            ..Self::default()
        }
    }

    pub fn strides(mut self, strides: &[usize]) -> Self {
        self.strides = Some(strides.to_vec());
        self
    }

    pub fn padding(mut self, padding_type: PaddingType) -> Self {
        self.padding_type = padding_type;
        self
    }
}

/// A complete layer description, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayerConfig {
    #[serde(rename_all = "camelCase")]
    Input { input_shape: Vec<usize> },
    #[serde(rename_all = "camelCase")]
    Dense {
        input_shape: Vec<usize>,
        num_units: usize,
        #[serde(flatten)]
        options: DenseConfig,
    },
    #[serde(rename_all = "camelCase")]
    Flatten { input_shape: Vec<usize> },
    #[serde(rename_all = "camelCase")]
    Pooling {
        input_shape: Vec<usize>,
        #[serde(flatten)]
        options: PoolingConfig,
    },
}

impl LayerConfig {
    pub fn input_shape(&self) -> &[usize] {
        match self {
            LayerConfig::Input { input_shape }
            | LayerConfig::Dense { input_shape, .. }
            | LayerConfig::Flatten { input_shape }
            | LayerConfig::Pooling { input_shape, .. } => input_shape,
        }
    }

    /// Build the described layer, drawing initial parameters from the
    /// thread-local RNG.
    pub fn build<T: Element>(&self) -> Result<Layer<T>> {
        self.build_with_rng(&mut rand::thread_rng())
    }

    pub fn build_with_rng<T: Element, R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Layer<T>> {
        Ok(match self {
            LayerConfig::Input { input_shape } => InputLayer::new(input_shape).into(),
            LayerConfig::Dense {
                input_shape,
                num_units,
                options,
            } => Dense::with_rng(input_shape, *num_units, options, rng)?.into(),
            LayerConfig::Flatten { input_shape } => Flatten::new(input_shape)?.into(),
            LayerConfig::Pooling {
                input_shape,
                options,
            } => Pooling::new(input_shape, options)?.into(),
        })
    }
}
