use std::fmt;

use synapse_core::{Element, Result, Shape, SynapseError, Tensor};

use crate::layer::{FeedForward, Layer};

/// An ordered pipeline that chains layers.
///
/// The output of each layer is fed as input to the next.
///
/// # Example
/// ```ignore
/// use synapse_nn::{Dense, DenseConfig, InputLayer, Sequential};
///
/// let model = Sequential::new(vec![
///     InputLayer::new(&[784]).into(),
///     Dense::new(&[784], 128, &DenseConfig::default())?.into(),
///     Dense::new(&[128], 10, &DenseConfig::default())?.into(),
/// ]);
/// model.check_shapes()?;
/// let output = model.feed_forward(input)?;
/// ```
#[derive(Debug, Clone)]
pub struct Sequential<T: Element = f32> {
    layers: Vec<Layer<T>>,
}

impl<T: Element> Sequential<T> {
    /// Create a pipeline from an ordered list of layers.
    ///
    /// Adjacent shapes are not checked here; see [`Sequential::check_shapes`].
    pub fn new(layers: Vec<Layer<T>>) -> Self {
        Self { layers }
    }

    /// Create an empty pipeline.
    pub fn empty() -> Self {
        Self { layers: Vec::new() }
    }

    /// Append a layer to the end of the pipeline.
    pub fn push(&mut self, layer: impl Into<Layer<T>>) {
        self.layers.push(layer.into());
    }

    /// Number of layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Get a reference to the layer at the given index.
    pub fn get(&self, index: usize) -> Option<&Layer<T>> {
        self.layers.get(index)
    }

    /// Get a mutable reference to the layer at the given index.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Layer<T>> {
        self.layers.get_mut(index)
    }

    pub fn layers(&self) -> &[Layer<T>] {
        &self.layers
    }

    /// Feature shape expected by the first layer.
    pub fn input_shape(&self) -> Option<&Shape> {
        self.layers.first().map(|l| l.input_shape())
    }

    /// Feature shape produced by the last layer.
    pub fn output_shape(&self) -> Option<&Shape> {
        self.layers.last().map(|l| l.output_shape())
    }

    /// Verify that every layer's output shape is the next layer's input shape.
    ///
    /// Reports the first incompatible pair.
    pub fn check_shapes(&self) -> Result<()> {
        for (i, pair) in self.layers.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.output_shape() != next.input_shape() {
                return Err(SynapseError::ShapeError(format!(
                    "layer {} ({}) outputs {} but layer {} ({}) expects {}",
                    i,
                    prev.name(),
                    prev.output_shape(),
                    i + 1,
                    next.name(),
                    next.input_shape()
                )));
            }
        }
        Ok(())
    }

    pub fn parameters(&self) -> Vec<&Tensor<T>> {
        self.layers.iter().flat_map(|l| l.parameters()).collect()
    }

    pub fn named_parameters(&self) -> Vec<(String, &Tensor<T>)> {
        let mut params = Vec::new();
        for (i, layer) in self.layers.iter().enumerate() {
            if let Some(dense) = layer.as_dense() {
                for (name, tensor) in dense.named_parameters() {
                    params.push((format!("{}.{}", i, name), tensor));
                }
            }
        }
        params
    }

    pub fn num_parameters(&self) -> usize {
        self.layers.iter().map(|l| l.num_parameters()).sum()
    }
}

impl<T: Element> Default for Sequential<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Element> FeedForward<T> for Sequential<T> {
    fn feed_forward(&self, input: Tensor<T>) -> Result<Tensor<T>> {
        let mut x = input;
        for (i, layer) in self.layers.iter().enumerate() {
            tracing::trace!("layer {} ({}): input {}", i, layer.name(), x.shape());
            x = layer.feed_forward(x)?;
        }
        Ok(x)
    }
}

impl<T: Element> FromIterator<Layer<T>> for Sequential<T> {
    fn from_iter<I: IntoIterator<Item = Layer<T>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T: Element> fmt::Display for Sequential<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sequential(")?;
        for (i, layer) in self.layers.iter().enumerate() {
            writeln!(f, "  ({i}): {layer}")?;
        }
        write!(f, ")")
    }
}
