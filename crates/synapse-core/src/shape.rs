use smallvec::SmallVec;
use std::fmt;

/// Dimension sizes of a tensor, outermost first.
///
/// Up to four dims live inline. Feed-forward tensors are almost always
/// `[batch, features]` or a small batched grid, so the common case never
/// touches the heap.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    dims: SmallVec<[usize; 4]>,
}

impl Shape {
    /// Build a shape from its dimension sizes, outermost first.
    pub fn new(dims: &[usize]) -> Self {
        Self {
            dims: SmallVec::from_slice(dims),
        }
    }

    /// The rank-0 shape of a single value.
    pub fn scalar() -> Self {
        Self {
            dims: SmallVec::new(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Element count, or `None` when the product of the dims does not fit in
    /// a `usize`. Shapes built from untrusted sizes go through this.
    pub fn checked_numel(&self) -> Option<usize> {
        if self.dims.contains(&0) {
            return Some(0);
        }
        self.dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Element count. A rank-0 shape holds one element; an overflowing
    /// product saturates at `usize::MAX`.
    pub fn numel(&self) -> usize {
        self.checked_numel().unwrap_or(usize::MAX)
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Size along `axis`, if the shape has that many axes.
    pub fn dim(&self, axis: usize) -> Option<usize> {
        self.dims.get(axis).copied()
    }

    pub fn is_scalar(&self) -> bool {
        self.dims.is_empty()
    }

    /// Per-sample feature dims: everything after the leading batch axis.
    pub fn features(&self) -> &[usize] {
        self.dims.get(1..).unwrap_or(&[])
    }

    /// Row-major element strides; the last axis is contiguous.
    pub fn contiguous_strides(&self) -> SmallVec<[usize; 4]> {
        let mut strides: SmallVec<[usize; 4]> = SmallVec::from_elem(1, self.dims.len());
        let mut acc = 1usize;
        for (stride, &d) in strides.iter_mut().zip(self.dims.iter()).rev() {
            *stride = acc;
            acc = acc.saturating_mul(d);
        }
        strides
    }

    /// The shape `target`, if it holds exactly as many elements as `self`.
    pub fn resolve_reshape(&self, target: &[usize]) -> Option<Shape> {
        let target = Shape::new(target);
        (target.checked_numel()? == self.checked_numel()?).then_some(target)
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shape({:?})", self.dims.as_slice())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims)
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape {
            dims: SmallVec::from_vec(dims),
        }
    }
}

macro_rules! impl_shape_from_array {
    ($($n:expr),*) => {
        $(
            impl From<[usize; $n]> for Shape {
                fn from(dims: [usize; $n]) -> Self {
                    Shape::new(&dims)
                }
            }
        )*
    };
}

impl_shape_from_array!(0, 1, 2, 3, 4, 5, 6);
