use synapse_core::{Element, Result, Shape, Tensor};

use crate::layer::{check_features, FeedForward};

/// Shape-validating passthrough at the head of a pipeline.
///
/// Performs no transformation: a correctly shaped input comes back as the
/// very same tensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputLayer {
    shape: Shape,
}

impl InputLayer {
    /// `input_shape` is the per-sample feature shape, without the batch axis.
    pub fn new(input_shape: &[usize]) -> Self {
        Self {
            shape: Shape::new(input_shape),
        }
    }

    pub fn input_shape(&self) -> &Shape {
        &self.shape
    }

    pub fn output_shape(&self) -> &Shape {
        &self.shape
    }
}

impl<T: Element> FeedForward<T> for InputLayer {
    fn feed_forward(&self, input: Tensor<T>) -> Result<Tensor<T>> {
        check_features(&input, &self.shape)?;
        Ok(input)
    }
}
