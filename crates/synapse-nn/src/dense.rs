use rand::Rng;
use synapse_core::{Element, Result, Shape, SynapseError, Tensor};

use crate::activations::{Activation, ActivationType};
use crate::config::DenseConfig;
use crate::layer::FeedForward;

/// Fully connected layer: y = activation(x @ W + b)
///
/// `W` has shape `[in_features, num_units]` and `b` shape `[num_units]`.
#[derive(Debug, Clone)]
pub struct Dense<T: Element = f32> {
    input_shape: Shape,
    output_shape: Shape,
    activation_type: ActivationType,
    activation: Option<Activation>,
    weights: Tensor<T>,
    bias: Option<Tensor<T>>,
}

impl<T: Element> Dense<T> {
    /// Create a new Dense layer, initializing parameters from the
    /// thread-local RNG.
    pub fn new(input_shape: &[usize], num_units: usize, config: &DenseConfig) -> Result<Self> {
        Self::with_rng(input_shape, num_units, config, &mut rand::thread_rng())
    }

    /// Create a new Dense layer, drawing initial parameters from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        input_shape: &[usize],
        num_units: usize,
        config: &DenseConfig,
        rng: &mut R,
    ) -> Result<Self> {
        if input_shape.len() != 1 {
            return Err(SynapseError::UnsupportedShape {
                layer: "Dense",
                expected: "input shape must be one-dimensional",
                got: input_shape.to_vec(),
            });
        }
        let in_features = input_shape[0];
        if in_features == 0 || num_units == 0 {
            return Err(SynapseError::InvalidParameter(format!(
                "Dense needs at least one input feature and one unit, got {in_features} -> {num_units}"
            )));
        }

        if in_features.checked_mul(num_units).is_none() {
            return Err(SynapseError::InvalidParameter(format!(
                "Dense weights [{in_features}, {num_units}] have more elements than fit in usize"
            )));
        }

        let weights = config
            .weights_init()
            .init_with_rng(&[in_features, num_units], rng)?;
        let bias = if config.use_bias {
            Some(config.bias_init().init_with_rng(&[num_units], rng)?)
        } else {
            None
        };

        tracing::debug!(
            "Dense [{}] -> [{}]: activation={}, weights={}, bias={}",
            in_features,
            num_units,
            config.activation_type,
            config.weights_init(),
            if config.use_bias {
                config.bias_init().to_string()
            } else {
                "none".to_string()
            }
        );

        Ok(Self {
            input_shape: Shape::new(&[in_features]),
            output_shape: Shape::new(&[num_units]),
            activation_type: config.activation_type,
            activation: config.activation_type.activation(),
            weights,
            bias,
        })
    }

    /// Build a layer around existing parameters.
    ///
    /// `weights` must be 2-D; `bias`, when given, must be `[weights.dim(1)]`.
    pub fn from_parameters(
        weights: Tensor<T>,
        bias: Option<Tensor<T>>,
        activation_type: ActivationType,
    ) -> Result<Self> {
        let (in_features, num_units) = match *weights.dims() {
            [i, u] if i > 0 && u > 0 => (i, u),
            _ => {
                return Err(SynapseError::UnsupportedShape {
                    layer: "Dense",
                    expected: "weights must be a non-empty matrix",
                    got: weights.dims().to_vec(),
                })
            }
        };
        if let Some(b) = &bias {
            if b.dims() != [num_units] {
                return Err(SynapseError::ShapeMismatch {
                    op: "Dense::from_parameters",
                    lhs: vec![num_units],
                    rhs: b.dims().to_vec(),
                });
            }
        }

        Ok(Self {
            input_shape: Shape::new(&[in_features]),
            output_shape: Shape::new(&[num_units]),
            activation_type,
            activation: activation_type.activation(),
            weights,
            bias,
        })
    }

    pub fn input_shape(&self) -> &Shape {
        &self.input_shape
    }

    pub fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    pub fn num_units(&self) -> usize {
        self.output_shape.dims()[0]
    }

    pub fn activation_type(&self) -> ActivationType {
        self.activation_type
    }

    pub fn use_bias(&self) -> bool {
        self.bias.is_some()
    }

    /// Get the weight tensor.
    pub fn weights(&self) -> &Tensor<T> {
        &self.weights
    }

    /// Get the bias tensor (if present).
    pub fn bias(&self) -> Option<&Tensor<T>> {
        self.bias.as_ref()
    }

    /// Replace the weights. The new tensor must be exactly
    /// `[in_features, num_units]`; the layer is unchanged on failure.
    pub fn set_weights(&mut self, weights: Tensor<T>) -> Result<()> {
        let expected = [self.input_shape.dims()[0], self.num_units()];
        if weights.dims() != expected {
            return Err(SynapseError::ShapeMismatch {
                op: "Dense::set_weights",
                lhs: expected.to_vec(),
                rhs: weights.dims().to_vec(),
            });
        }
        self.weights = weights;
        Ok(())
    }

    /// Replace the bias. The new tensor must be exactly `[num_units]`.
    pub fn set_bias(&mut self, bias: Tensor<T>) -> Result<()> {
        if self.bias.is_none() {
            return Err(SynapseError::InvalidParameter(
                "Dense layer was built without a bias".to_string(),
            ));
        }
        if bias.dims() != [self.num_units()] {
            return Err(SynapseError::ShapeMismatch {
                op: "Dense::set_bias",
                lhs: vec![self.num_units()],
                rhs: bias.dims().to_vec(),
            });
        }
        self.bias = Some(bias);
        Ok(())
    }

    pub fn parameters(&self) -> Vec<&Tensor<T>> {
        let mut params = vec![&self.weights];
        if let Some(ref b) = self.bias {
            params.push(b);
        }
        params
    }

    pub fn named_parameters(&self) -> Vec<(&str, &Tensor<T>)> {
        let mut params = vec![("weights", &self.weights)];
        if let Some(ref b) = self.bias {
            params.push(("bias", b));
        }
        params
    }
}

impl<T: Element> FeedForward<T> for Dense<T> {
    fn feed_forward(&self, input: Tensor<T>) -> Result<Tensor<T>> {
        if input.ndim() != 2 {
            return Err(SynapseError::UnsupportedShape {
                layer: "Dense",
                expected: "input must be [batch, features]",
                got: input.dims().to_vec(),
            });
        }

        // y = x @ W
        let mut output = input.dot(&self.weights)?;

        // + b, broadcast across the batch as ones[batch, 1] @ b[1, units]
        if let Some(ref bias) = self.bias {
            let batch = input.dims()[0];
            let row = bias.reshape(&[1, self.num_units()])?;
            let broadcast = Tensor::ones(&[batch, 1]).dot(&row)?;
            output.add_(&broadcast)?;
        }

        if let Some(activation) = self.activation {
            activation.apply_(&mut output);
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use synapse_core::{ErrorKind, Initializer};

    fn zero_config() -> DenseConfig {
        DenseConfig::default()
            .use_bias(false)
            .weights_initializer(Initializer::zeros())
    }

    #[test]
    fn test_dense_creation() {
        let layer = Dense::<f32>::new(&[4], 3, &DenseConfig::default()).unwrap();
        assert_eq!(layer.weights().dims(), &[4, 3]);
        assert_eq!(layer.bias().unwrap().dims(), &[3]);
        assert_eq!(layer.output_shape().dims(), &[3]);
        assert_eq!(layer.activation_type(), ActivationType::Linear);
    }

    #[test]
    fn test_zero_weights_give_zero_output() {
        let layer = Dense::<f64>::new(&[3], 2, &zero_config()).unwrap();
        assert!(layer.weights().as_slice().iter().all(|&w| w == 0.0));

        let input = Tensor::from_slice(&[1.5, -2.0, 7.0], &[1, 3]).unwrap();
        let out = layer.feed_forward(input).unwrap();
        assert_eq!(out.dims(), &[1, 2]);
        assert_eq!(out.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn test_bias_is_broadcast() {
        let mut layer = Dense::<f32>::new(
            &[3],
            2,
            &DenseConfig::default().weights_initializer(Initializer::zeros()),
        )
        .unwrap();
        layer.set_bias(Tensor::ones(&[2])).unwrap();

        let out = layer.feed_forward(Tensor::full(&[1, 3], 5.0)).unwrap();
        assert_eq!(out.as_slice(), &[1.0, 1.0]);

        let out = layer.feed_forward(Tensor::zeros(&[4, 3])).unwrap();
        assert_eq!(out.dims(), &[4, 2]);
        assert!(out.as_slice().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_affine_transform() {
        let weights = Tensor::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let bias = Tensor::from_slice(&[0.5, -0.5], &[2]).unwrap();
        let layer = Dense::from_parameters(weights, Some(bias), ActivationType::Linear).unwrap();

        let input = Tensor::from_slice(&[1.0, 1.0, 2.0, 0.0], &[2, 2]).unwrap();
        let out = layer.feed_forward(input).unwrap();
        // [1, 1] @ W = [4, 6]; [2, 0] @ W = [2, 4]
        assert_eq!(out.as_slice(), &[4.5, 5.5, 2.5, 3.5]);
    }

    #[test]
    fn test_activation_applied() {
        let weights = Tensor::from_slice(&[1.0f32, -1.0], &[1, 2]).unwrap();
        let layer = Dense::from_parameters(weights, None, ActivationType::Relu).unwrap();
        let out = layer
            .feed_forward(Tensor::from_slice(&[3.0, -2.0], &[2, 1]).unwrap())
            .unwrap();
        assert_eq!(out.as_slice(), &[3.0, 0.0, 0.0, 2.0]);

        let weights = Tensor::<f32>::zeros(&[2, 4]);
        let layer = Dense::from_parameters(weights, None, ActivationType::Softmax).unwrap();
        let out = layer.feed_forward(Tensor::ones(&[1, 2])).unwrap();
        assert!(out.as_slice().iter().all(|&p| (p - 0.25).abs() < 1e-6));
    }

    #[test]
    fn test_rejects_multi_dim_input_shape() {
        let err = Dense::<f32>::new(&[2, 2], 3, &DenseConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedShape);
        let err = Dense::<f32>::new(&[], 3, &DenseConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedShape);
    }

    #[test]
    fn test_rejects_zero_units() {
        let err = Dense::<f32>::new(&[3], 0, &DenseConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        let err = Dense::<f32>::new(&[0], 2, &DenseConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        let err = Dense::<f32>::new(&[usize::MAX], 2, &DenseConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_rejects_bad_forward_rank() {
        let layer = Dense::<f32>::new(&[3], 2, &zero_config()).unwrap();
        for shape in [&[3][..], &[1, 1, 3][..]] {
            let err = layer.feed_forward(Tensor::zeros(shape)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedShape);
        }
        let err = layer.feed_forward(Tensor::zeros(&[1, 4])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn test_set_weights_validates() {
        let mut layer = Dense::<f32>::new(&[3], 2, &zero_config()).unwrap();
        for shape in [&[2, 3][..], &[6][..], &[3, 2, 1][..]] {
            let err = layer.set_weights(Tensor::ones(shape)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        }
        assert!(layer.weights().as_slice().iter().all(|&w| w == 0.0));

        layer.set_weights(Tensor::ones(&[3, 2])).unwrap();
        assert!(layer.weights().as_slice().iter().all(|&w| w == 1.0));
    }

    #[test]
    fn test_set_bias_validates() {
        let mut layer = Dense::<f32>::new(&[3], 2, &DenseConfig::default()).unwrap();
        for shape in [&[3][..], &[1, 2][..]] {
            let err = layer.set_bias(Tensor::ones(shape)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        }

        let mut no_bias = Dense::<f32>::new(&[3], 2, &zero_config()).unwrap();
        let err = no_bias.set_bias(Tensor::ones(&[2])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(no_bias.bias().is_none());
    }

    #[test]
    fn test_uniform_weights_in_range() {
        let config = DenseConfig::default()
            .weights_initializer(Initializer::rand_uniform(-0.1, 0.1))
            .bias_initializer(Initializer::zeros());
        let layer =
            Dense::<f64>::with_rng(&[16], 8, &config, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(layer
            .weights()
            .as_slice()
            .iter()
            .all(|&w| (-0.1..0.1).contains(&w)));
        assert!(layer.bias().unwrap().as_slice().iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_seeded_construction_is_reproducible() {
        let config = DenseConfig::default();
        let a = Dense::<f32>::with_rng(&[5], 4, &config, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = Dense::<f32>::with_rng(&[5], 4, &config, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.bias(), b.bias());
    }

    #[test]
    fn test_dense_parameters() {
        let layer = Dense::<f32>::new(&[4], 3, &DenseConfig::default()).unwrap();
        assert_eq!(layer.parameters().len(), 2); // weights + bias
        let names: Vec<&str> = layer.named_parameters().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["weights", "bias"]);

        let layer_no_bias = Dense::<f32>::new(&[4], 3, &zero_config()).unwrap();
        assert_eq!(layer_no_bias.parameters().len(), 1);
    }

    #[test]
    fn test_from_parameters_validates() {
        let err = Dense::<f32>::from_parameters(Tensor::zeros(&[4]), None, ActivationType::Linear)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedShape);

        let err = Dense::<f32>::from_parameters(
            Tensor::zeros(&[4, 3]),
            Some(Tensor::zeros(&[4])),
            ActivationType::Linear,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn test_feed_forward_is_deterministic() {
        let layer = Dense::<f64>::with_rng(
            &[3],
            3,
            &DenseConfig::default().activation(ActivationType::Tanh),
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();
        let input = Tensor::from_slice(&[0.1, 0.2, 0.3], &[1, 3]).unwrap();
        let a = layer.feed_forward(input.clone()).unwrap();
        let b = layer.feed_forward(input).unwrap();
        assert_eq!(a, b);
    }
}
