use std::fmt;

use synapse_core::{Element, Result, Shape, SynapseError, Tensor};

use crate::activations::ActivationType;
use crate::dense::Dense;
use crate::flatten::Flatten;
use crate::input::InputLayer;
use crate::pool::Pooling;

/// The forward-inference contract shared by every layer and by pipelines.
///
/// The input is taken by value: passthrough layers hand the same buffer
/// back without allocating, and reshaping layers relabel it in place.
pub trait FeedForward<T: Element> {
    fn feed_forward(&self, input: Tensor<T>) -> Result<Tensor<T>>;
}

/// Every layer kind, as a closed set.
#[derive(Debug, Clone)]
pub enum Layer<T: Element = f32> {
    Input(InputLayer),
    Dense(Dense<T>),
    Flatten(Flatten),
    Pooling(Pooling),
}

impl<T: Element> Layer<T> {
    pub fn name(&self) -> &'static str {
        match self {
            Layer::Input(_) => "InputLayer",
            Layer::Dense(_) => "Dense",
            Layer::Flatten(_) => "Flatten",
            Layer::Pooling(_) => "Pooling",
        }
    }

    /// Declared feature shape of the input (batch axis excluded).
    pub fn input_shape(&self) -> &Shape {
        match self {
            Layer::Input(l) => l.input_shape(),
            Layer::Dense(l) => l.input_shape(),
            Layer::Flatten(l) => l.input_shape(),
            Layer::Pooling(l) => l.input_shape(),
        }
    }

    /// Feature shape of the output (batch axis excluded).
    pub fn output_shape(&self) -> &Shape {
        match self {
            Layer::Input(l) => l.output_shape(),
            Layer::Dense(l) => l.output_shape(),
            Layer::Flatten(l) => l.output_shape(),
            Layer::Pooling(l) => l.output_shape(),
        }
    }

    pub fn activation_type(&self) -> ActivationType {
        match self {
            Layer::Dense(l) => l.activation_type(),
            _ => ActivationType::Linear,
        }
    }

    /// Tensors owned by this layer.
    pub fn parameters(&self) -> Vec<&Tensor<T>> {
        match self {
            Layer::Dense(l) => l.parameters(),
            _ => Vec::new(),
        }
    }

    /// Total number of scalar parameters.
    pub fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|t| t.numel()).sum()
    }

    pub fn as_dense(&self) -> Option<&Dense<T>> {
        match self {
            Layer::Dense(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dense_mut(&mut self) -> Option<&mut Dense<T>> {
        match self {
            Layer::Dense(l) => Some(l),
            _ => None,
        }
    }
}

impl<T: Element> FeedForward<T> for Layer<T> {
    fn feed_forward(&self, input: Tensor<T>) -> Result<Tensor<T>> {
        match self {
            Layer::Input(l) => l.feed_forward(input),
            Layer::Dense(l) => l.feed_forward(input),
            Layer::Flatten(l) => l.feed_forward(input),
            Layer::Pooling(l) => l.feed_forward(input),
        }
    }
}

impl<T: Element> fmt::Display for Layer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({} -> {}", self.name(), self.input_shape(), self.output_shape())?;
        if let Layer::Dense(d) = self {
            write!(f, ", activation={}, bias={}", d.activation_type(), d.use_bias())?;
        }
        write!(f, ")")
    }
}

impl<T: Element> From<InputLayer> for Layer<T> {
    fn from(layer: InputLayer) -> Self {
        Layer::Input(layer)
    }
}

impl<T: Element> From<Dense<T>> for Layer<T> {
    fn from(layer: Dense<T>) -> Self {
        Layer::Dense(layer)
    }
}

impl<T: Element> From<Flatten> for Layer<T> {
    fn from(layer: Flatten) -> Self {
        Layer::Flatten(layer)
    }
}

impl<T: Element> From<Pooling> for Layer<T> {
    fn from(layer: Pooling) -> Self {
        Layer::Pooling(layer)
    }
}

/// Check that `input` is `[batch, ..expected]`.
pub(crate) fn check_features<T: Element>(input: &Tensor<T>, expected: &Shape) -> Result<()> {
    if input.ndim() < 2 {
        return Err(SynapseError::ShapeError(format!(
            "feature vectors cannot be zero dimensional: input must have at least two \
             dimensions, got {}",
            input.shape()
        )));
    }
    if input.shape().features() != expected.dims() {
        return Err(SynapseError::ShapeError(format!(
            "wrong shape of tensor {}, must be of shape {}",
            input.shape(),
            batched(expected)
        )));
    }
    Ok(())
}

/// Render a feature shape with an unknown leading batch axis: `(? x 4 x 2)`.
pub(crate) fn batched(features: &Shape) -> String {
    let mut s = String::from("(?");
    for d in features.dims() {
        s.push_str(&format!(" x {d}"));
    }
    s.push(')');
    s
}
