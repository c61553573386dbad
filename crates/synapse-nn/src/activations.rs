//! Activation functions.
//!
//! `ActivationType` is the configuration tag; `Activation` is the transform
//! itself. `Linear` never becomes an `Activation`: layers configured with it
//! simply skip the activation step.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use synapse_core::{Element, Result, SynapseError, Tensor};

/// Activation selected in a layer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationType {
    #[default]
    Linear,
    Softmax,
    Relu,
    Tanh,
    Sigmoid,
}

impl ActivationType {
    /// The transform to apply, or `None` for `Linear`.
    pub fn activation(self) -> Option<Activation> {
        match self {
            ActivationType::Linear => None,
            ActivationType::Softmax => Some(Activation::Softmax),
            ActivationType::Relu => Some(Activation::Relu),
            ActivationType::Tanh => Some(Activation::Tanh),
            ActivationType::Sigmoid => Some(Activation::Sigmoid),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivationType::Linear => "linear",
            ActivationType::Softmax => "softmax",
            ActivationType::Relu => "relu",
            ActivationType::Tanh => "tanh",
            ActivationType::Sigmoid => "sigmoid",
        }
    }
}

impl fmt::Display for ActivationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivationType {
    type Err = SynapseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(ActivationType::Linear),
            "softmax" => Ok(ActivationType::Softmax),
            "relu" => Ok(ActivationType::Relu),
            "tanh" => Ok(ActivationType::Tanh),
            "sigmoid" => Ok(ActivationType::Sigmoid),
            other => Err(SynapseError::UnsupportedActivation(other.to_string())),
        }
    }
}

/// A stateless nonlinearity with no trainable parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activation {
    Relu,
    Sigmoid,
    Tanh,
    Softmax,
}

impl Activation {
    /// Apply to a copy of `input`; `input` is left untouched.
    pub fn apply<T: Element>(&self, input: &Tensor<T>) -> Tensor<T> {
        let mut output = input.clone();
        self.apply_(&mut output);
        output
    }

    /// Apply in place.
    pub fn apply_<T: Element>(&self, tensor: &mut Tensor<T>) {
        match self {
            Activation::Relu => tensor.map_(relu_scalar),
            Activation::Sigmoid => tensor.map_(sigmoid_scalar),
            Activation::Tanh => tensor.map_(|x| x.tanh()),
            Activation::Softmax => softmax_(tensor),
        }
    }

    pub fn activation_type(&self) -> ActivationType {
        match self {
            Activation::Relu => ActivationType::Relu,
            Activation::Sigmoid => ActivationType::Sigmoid,
            Activation::Tanh => ActivationType::Tanh,
            Activation::Softmax => ActivationType::Softmax,
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.activation_type(), f)
    }
}

#[inline]
fn relu_scalar<T: Element>(x: T) -> T {
    if x > T::zero() {
        x
    } else {
        T::zero()
    }
}

#[inline]
fn sigmoid_scalar<T: Element>(x: T) -> T {
    T::one() / (T::one() + (-x).exp())
}

/// ReLU activation: max(0, x)
pub fn relu<T: Element>(input: &Tensor<T>) -> Tensor<T> {
    input.map(relu_scalar)
}

/// Sigmoid activation: 1 / (1 + exp(-x))
pub fn sigmoid<T: Element>(input: &Tensor<T>) -> Tensor<T> {
    input.map(sigmoid_scalar)
}

/// Tanh activation.
pub fn tanh<T: Element>(input: &Tensor<T>) -> Tensor<T> {
    input.map(|x| x.tanh())
}

/// Softmax along the last axis.
pub fn softmax<T: Element>(input: &Tensor<T>) -> Tensor<T> {
    let mut output = input.clone();
    softmax_(&mut output);
    output
}

/// In-place softmax along the last axis. Each row is shifted by its
/// maximum before exponentiation.
pub fn softmax_<T: Element>(tensor: &mut Tensor<T>) {
    for row in tensor.rows_mut() {
        let max_val = row.iter().copied().fold(T::neg_infinity(), T::max);
        let mut exp_sum = T::zero();
        for x in row.iter_mut() {
            *x = (*x - max_val).exp();
            exp_sum = exp_sum + *x;
        }
        for x in row.iter_mut() {
            *x = *x / exp_sum;
        }
    }
}
