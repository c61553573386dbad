use std::fmt;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::Normal;

use crate::dtype::{DType, Element};
use crate::error::SynapseError;
use crate::shape::Shape;
use crate::Result;

/// A multi-dimensional array, the fundamental data structure in synapse.
///
/// Storage is a flat row-major `Vec<T>` owned exclusively by the tensor;
/// `data.len() == shape.numel()` holds after every constructor and operation.
///
/// # Examples
///
/// ```
/// use synapse_core::Tensor;
///
/// let t = Tensor::from_vec(vec![1.0f32, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
/// assert_eq!(t.shape().dims(), &[2, 2]);
/// assert_eq!(t.numel(), 4);
///
/// let flat = t.reshape(&[4]).unwrap();
/// assert_eq!(flat.shape().dims(), &[4]);
/// ```
#[derive(Clone, PartialEq)]
pub struct Tensor<T = f32> {
    shape: Shape,
    data: Vec<T>,
}

impl<T: Element> Tensor<T> {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a tensor that takes ownership of `data`.
    ///
    /// Fails with `ShapeMismatch` if `data.len()` differs from the product
    /// of `shape`, or if that product overflows.
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        let s = Shape::new(shape);
        if s.checked_numel() != Some(data.len()) {
            return Err(SynapseError::shape_mismatch(
                "from_vec",
                shape,
                &[data.len()],
            ));
        }
        Ok(Self { shape: s, data })
    }

    /// Create a tensor by copying `data`.
    pub fn from_slice(data: &[T], shape: &[usize]) -> Result<Self> {
        Self::from_vec(data.to_vec(), shape)
    }

    /// Create a tensor filled with `value`.
    pub fn full(shape: &[usize], value: T) -> Self {
        let s = Shape::new(shape);
        let data = vec![value; s.numel()];
        Self { shape: s, data }
    }

    /// Create a tensor of zeros.
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, T::zero())
    }

    /// Create a tensor of ones.
    pub fn ones(shape: &[usize]) -> Self {
        Self::full(shape, T::one())
    }

    /// Create a scalar tensor from a single value.
    pub fn scalar(value: T) -> Self {
        Self {
            shape: Shape::scalar(),
            data: vec![value],
        }
    }

    /// Create a tensor with values drawn from N(mean, stddev²) using the
    /// thread-local RNG.
    pub fn rand_normal(mean: f64, stddev: f64, shape: &[usize]) -> Result<Self> {
        Self::rand_normal_with_rng(mean, stddev, shape, &mut rand::thread_rng())
    }

    /// Create a tensor with values drawn from N(mean, stddev²) using `rng`.
    pub fn rand_normal_with_rng<R: Rng + ?Sized>(
        mean: f64,
        stddev: f64,
        shape: &[usize],
        rng: &mut R,
    ) -> Result<Self> {
        if !mean.is_finite() {
            return Err(SynapseError::InvalidParameter(format!(
                "normal mean must be finite, got {mean}"
            )));
        }
        let normal = Normal::new(mean, stddev).map_err(|e| {
            SynapseError::InvalidParameter(format!("normal stddev {stddev}: {e}"))
        })?;
        let s = Shape::new(shape);
        let data = (0..s.numel())
            .map(|_| T::from_f64(normal.sample(&mut *rng)))
            .collect();
        Ok(Self { shape: s, data })
    }

    /// Create a tensor with values uniformly distributed in `[low, high)`
    /// using the thread-local RNG.
    pub fn rand_uniform(low: f64, high: f64, shape: &[usize]) -> Result<Self> {
        Self::rand_uniform_with_rng(low, high, shape, &mut rand::thread_rng())
    }

    /// Create a tensor with values uniformly distributed in `[low, high)`
    /// using `rng`.
    pub fn rand_uniform_with_rng<R: Rng + ?Sized>(
        low: f64,
        high: f64,
        shape: &[usize],
        rng: &mut R,
    ) -> Result<Self> {
        let lo = T::from_f64(low);
        let hi = T::from_f64(high);
        // Uniform::new panics on an empty or unbounded range.
        if !(lo < hi) || !(hi - lo).is_finite() {
            return Err(SynapseError::InvalidParameter(format!(
                "uniform range [{low}, {high}) is empty or unbounded"
            )));
        }
        let uniform = Uniform::new(lo, hi);
        let s = Shape::new(shape);
        let data = (0..s.numel()).map(|_| uniform.sample(&mut *rng)).collect();
        Ok(Self { shape: s, data })
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Shape of the tensor.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Dimension sizes as a slice.
    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    /// Size of a single dimension.
    pub fn dim(&self, axis: usize) -> Option<usize> {
        self.shape.dim(axis)
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    /// Total number of elements.
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Data type.
    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    // =========================================================================
    // Data access
    // =========================================================================

    /// Flat row-major view of the elements.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable flat view of the elements. The shape cannot change through it.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the tensor and return its buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Get a single element by multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Option<T> {
        self.flat_index(index).map(|i| self.data[i])
    }

    /// Get a single element by flat row-major index.
    pub fn get_flat(&self, flat_index: usize) -> Option<T> {
        self.data.get(flat_index).copied()
    }

    fn flat_index(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.ndim() {
            return None;
        }
        let strides = self.shape.contiguous_strides();
        let mut flat = 0;
        for ((&i, &d), &s) in index.iter().zip(self.dims()).zip(strides.iter()) {
            if i >= d {
                return None;
            }
            flat += i * s;
        }
        Some(flat)
    }

    pub(crate) fn from_parts(shape: Shape, data: Vec<T>) -> Self {
        debug_assert_eq!(shape.numel(), data.len());
        Self { shape, data }
    }

    pub(crate) fn set_shape(&mut self, shape: Shape) {
        debug_assert_eq!(shape.numel(), self.data.len());
        self.shape = shape;
    }
}

impl<T: Element> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor(shape={}, dtype={})", self.shape, T::DTYPE)
    }
}

impl<T: Element> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.numel();
        if n <= 20 {
            write!(f, "tensor({:?}, shape={})", self.data, self.shape)
        } else {
            write!(
                f,
                "tensor([{:.4}, {:.4}, ..., {:.4}], shape={})",
                self.data[0],
                self.data[1],
                self.data[n - 1],
                self.shape
            )
        }
    }
}
