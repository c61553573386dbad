//! Initializer policies for freshly allocated weight and bias tensors.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::dtype::Element;
use crate::error::SynapseError;
use crate::tensor::Tensor;
use crate::Result;

/// Which distribution populates a new tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InitializerType {
    Zeros,
    RandNormal,
    RandUniform,
}

impl InitializerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InitializerType::Zeros => "zeros",
            InitializerType::RandNormal => "randNormal",
            InitializerType::RandUniform => "randUniform",
        }
    }
}

impl fmt::Display for InitializerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InitializerType {
    type Err = SynapseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zeros" => Ok(InitializerType::Zeros),
            "randNormal" | "rand_normal" => Ok(InitializerType::RandNormal),
            "randUniform" | "rand_uniform" => Ok(InitializerType::RandUniform),
            other => Err(SynapseError::UnsupportedInitializer(other.to_string())),
        }
    }
}

/// An initializer policy plus its two hyperparameters.
///
/// `params` is `(mean, stddev)` for `RandNormal`, `(low, high)` for
/// `RandUniform`, and ignored for `Zeros`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Initializer {
    pub kind: InitializerType,
    #[serde(default = "default_params")]
    pub params: (f64, f64),
}

fn default_params() -> (f64, f64) {
    (0.0, 1.0)
}

impl Default for Initializer {
    /// Standard normal, N(0, 1).
    fn default() -> Self {
        Self::rand_normal(0.0, 1.0)
    }
}

impl Initializer {
    pub fn new(kind: InitializerType, params: (f64, f64)) -> Self {
        Self { kind, params }
    }

    pub fn zeros() -> Self {
        Self::new(InitializerType::Zeros, default_params())
    }

    pub fn rand_normal(mean: f64, stddev: f64) -> Self {
        Self::new(InitializerType::RandNormal, (mean, stddev))
    }

    pub fn rand_uniform(low: f64, high: f64) -> Self {
        Self::new(InitializerType::RandUniform, (low, high))
    }

    /// Allocate a tensor of `shape` using the thread-local RNG.
    pub fn init<T: Element>(&self, shape: &[usize]) -> Result<Tensor<T>> {
        self.init_with_rng(shape, &mut rand::thread_rng())
    }

    /// Allocate a tensor of `shape`, drawing random values from `rng`.
    pub fn init_with_rng<T: Element, R: Rng + ?Sized>(
        &self,
        shape: &[usize],
        rng: &mut R,
    ) -> Result<Tensor<T>> {
        let (p0, p1) = self.params;
        match self.kind {
            InitializerType::Zeros => Ok(Tensor::zeros(shape)),
            InitializerType::RandNormal => Tensor::rand_normal_with_rng(p0, p1, shape, rng),
            InitializerType::RandUniform => Tensor::rand_uniform_with_rng(p0, p1, shape, rng),
        }
    }
}

impl fmt::Display for Initializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            InitializerType::Zeros => write!(f, "zeros"),
            kind => write!(f, "{}({}, {})", kind, self.params.0, self.params.1),
        }
    }
}
