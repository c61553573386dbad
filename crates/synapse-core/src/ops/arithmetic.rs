//! Element-wise arithmetic and matrix product.

use crate::dtype::Element;
use crate::error::SynapseError;
use crate::tensor::Tensor;
use crate::Result;

impl<T: Element> Tensor<T> {
    /// Element-wise addition: self + other.
    ///
    /// Shapes must be identical; no broadcasting is performed.
    pub fn add(&self, other: &Tensor<T>) -> Result<Tensor<T>> {
        binary_op("add", self, other, |a, b| a + b)
    }

    /// In-place element-wise addition: self += other.
    ///
    /// The shape check runs before any element is written.
    pub fn add_(&mut self, other: &Tensor<T>) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(SynapseError::shape_mismatch("add_", self.dims(), other.dims()));
        }
        for (a, &b) in self.as_mut_slice().iter_mut().zip(other.as_slice()) {
            *a = *a + b;
        }
        Ok(())
    }

    /// Apply `op` to every element, returning a new tensor.
    pub fn map(&self, op: impl Fn(T) -> T) -> Tensor<T> {
        let data: Vec<T> = self.as_slice().iter().map(|&v| op(v)).collect();
        Tensor::from_parts(self.shape().clone(), data)
    }

    /// Apply `op` to every element in place.
    pub fn map_(&mut self, op: impl Fn(T) -> T) {
        for v in self.as_mut_slice() {
            *v = op(*v);
        }
    }

    /// Matrix product: [M, K] @ [K, N] → [M, N].
    ///
    /// Both operands must be 2-D and share the inner dimension.
    pub fn dot(&self, other: &Tensor<T>) -> Result<Tensor<T>> {
        let a_dims = self.dims();
        let b_dims = other.dims();

        if a_dims.len() != 2 || b_dims.len() != 2 || a_dims[1] != b_dims[0] {
            return Err(SynapseError::shape_mismatch("dot", a_dims, b_dims));
        }

        Ok(matmul_2d(self, other))
    }
}

/// Apply a binary operation element-wise over two same-shaped tensors.
fn binary_op<T: Element>(
    op_name: &'static str,
    a: &Tensor<T>,
    b: &Tensor<T>,
    op: impl Fn(T, T) -> T,
) -> Result<Tensor<T>> {
    if a.shape() != b.shape() {
        return Err(SynapseError::shape_mismatch(op_name, a.dims(), b.dims()));
    }

    let result: Vec<T> = a
        .as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(&x, &y)| op(x, y))
        .collect();

    Ok(Tensor::from_parts(a.shape().clone(), result))
}

/// 2D matrix multiplication: [M, K] @ [K, N] → [M, N]
fn matmul_2d<T: Element>(a: &Tensor<T>, b: &Tensor<T>) -> Tensor<T> {
    let (m, k) = (a.dims()[0], a.dims()[1]);
    let n = b.dims()[1];

    let a_data = a.as_slice();
    let b_data = b.as_slice();
    let mut c_data = vec![T::zero(); m * n];

    for i in 0..m {
        for j in 0..n {
            let mut sum = T::zero();
            for p in 0..k {
                sum = sum + a_data[i * k + p] * b_data[p * n + j];
            }
            c_data[i * n + j] = sum;
        }
    }

    Tensor::from_parts([m, n].into(), c_data)
}
