use std::fmt;

use num_traits::Float;
use rand::distributions::uniform::SampleUniform;

/// Element types supported by synapse tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit IEEE 754 single-precision float
    F32,
    /// 64-bit IEEE 754 double-precision float
    F64,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::F32 => write!(f, "f32"),
            DType::F64 => write!(f, "f64"),
        }
    }
}

/// Numeric capability required of a tensor element.
///
/// `Float` supplies the arithmetic, `exp`, comparison and the additive and
/// multiplicative identities; `SampleUniform` lets initializers draw values
/// directly in `T` so that uniform samples never round onto the upper bound.
pub trait Element:
    Float + SampleUniform + Default + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Runtime tag for this element type.
    const DTYPE: DType;

    /// Convert an `f64` hyperparameter into this element type.
    fn from_f64(value: f64) -> Self;
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_tags() {
        assert_eq!(<f32 as Element>::DTYPE, DType::F32);
        assert_eq!(<f64 as Element>::DTYPE, DType::F64);
        assert_eq!(<f32 as Element>::from_f64(0.5), 0.5f32);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", DType::F32), "f32");
        assert_eq!(format!("{}", DType::F64), "f64");
    }
}
