use synapse_core::{Element, Result, Shape, SynapseError, Tensor};

use crate::layer::{check_features, FeedForward};

/// Collapses every feature dimension into one: `[batch, d0, d1, ..]` becomes
/// `[batch, d0 * d1 * ..]`. Element order is preserved and no data is copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flatten {
    input_shape: Shape,
    output_shape: Shape,
}

impl Flatten {
    pub fn new(input_shape: &[usize]) -> Result<Self> {
        if input_shape.is_empty() {
            return Err(SynapseError::UnsupportedShape {
                layer: "Flatten",
                expected: "input shape needs at least one feature dimension",
                got: Vec::new(),
            });
        }
        let input_shape = Shape::new(input_shape);
        let features = input_shape.checked_numel().ok_or_else(|| {
            SynapseError::InvalidParameter(format!(
                "Flatten input shape {input_shape} has more elements than fit in usize"
            ))
        })?;
        let output_shape = Shape::new(&[features]);
        tracing::debug!("Flatten {} -> {}", input_shape, output_shape);
        Ok(Self {
            input_shape,
            output_shape,
        })
    }

    pub fn input_shape(&self) -> &Shape {
        &self.input_shape
    }

    pub fn output_shape(&self) -> &Shape {
        &self.output_shape
    }
}

impl<T: Element> FeedForward<T> for Flatten {
    fn feed_forward(&self, input: Tensor<T>) -> Result<Tensor<T>> {
        check_features(&input, &self.input_shape)?;
        let batch = input.dims()[0];
        input.into_reshaped(&[batch, self.output_shape.dims()[0]])
    }
}
