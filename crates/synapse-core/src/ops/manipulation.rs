//! Tensor manipulation operations: reshape and last-axis row views.

use std::slice::{ChunksExact, ChunksExactMut};

use crate::dtype::Element;
use crate::error::SynapseError;
use crate::shape::Shape;
use crate::tensor::Tensor;
use crate::Result;

impl<T: Element> Tensor<T> {
    /// Reshape into a new tensor with the same element order.
    ///
    /// Fails with `ShapeMismatch` unless the element count is preserved.
    pub fn reshape(&self, new_shape: &[usize]) -> Result<Tensor<T>> {
        let resolved = self.resolve(new_shape)?;
        Ok(Tensor::from_parts(resolved, self.as_slice().to_vec()))
    }

    /// Reshape in place. Only the shape metadata changes.
    pub fn reshape_(&mut self, new_shape: &[usize]) -> Result<()> {
        let resolved = self.resolve(new_shape)?;
        self.set_shape(resolved);
        Ok(())
    }

    /// Consume the tensor and return it with a new shape, without copying.
    pub fn into_reshaped(mut self, new_shape: &[usize]) -> Result<Tensor<T>> {
        self.reshape_(new_shape)?;
        Ok(self)
    }

    /// Iterate over slices along the last axis.
    ///
    /// A 2-D tensor yields its rows, a 1-D tensor yields itself, a scalar
    /// yields its single element.
    pub fn rows(&self) -> ChunksExact<'_, T> {
        let width = self.row_width();
        self.as_slice().chunks_exact(width)
    }

    /// Mutable variant of [`Tensor::rows`].
    pub fn rows_mut(&mut self) -> ChunksExactMut<'_, T> {
        let width = self.row_width();
        self.as_mut_slice().chunks_exact_mut(width)
    }

    fn row_width(&self) -> usize {
        // An empty last axis means an empty buffer, so any non-zero width
        // yields no rows.
        self.dims().last().copied().unwrap_or(1).max(1)
    }

    fn resolve(&self, new_shape: &[usize]) -> Result<Shape> {
        self.shape()
            .resolve_reshape(new_shape)
            .ok_or_else(|| SynapseError::shape_mismatch("reshape", self.dims(), new_shape))
    }
}
