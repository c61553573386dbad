//! Pooling layer over 2-D feature maps.
//!
//! Input shape: `[batch, rows, cols]`, output shape `[batch, out_rows, out_cols]`.
//! With `valid` padding `out = (in - pool) / stride + 1`; with `same` padding
//! `out = ceil(in / stride)` and the window is padded as evenly as possible,
//! the extra cell (if any) going after. Padded cells never contribute to a
//! window.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use synapse_core::{Element, Result, Shape, SynapseError, Tensor};

use crate::config::PoolingConfig;
use crate::layer::{check_features, FeedForward};

/// How a window is reduced to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolingType {
    Average,
    Max,
}

impl PoolingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolingType::Average => "average",
            PoolingType::Max => "max",
        }
    }
}

impl fmt::Display for PoolingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoolingType {
    type Err = SynapseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "average" | "avg" => Ok(PoolingType::Average),
            "max" => Ok(PoolingType::Max),
            other => Err(SynapseError::UnsupportedPooling(other.to_string())),
        }
    }
}

/// How windows treat the borders of the feature map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaddingType {
    /// Only windows that fit entirely inside the input.
    #[default]
    Valid,
    /// Pad so that every input cell is covered and `out = ceil(in / stride)`.
    Same,
}

impl PaddingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaddingType::Valid => "valid",
            PaddingType::Same => "same",
        }
    }
}

impl fmt::Display for PaddingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaddingType {
    type Err = SynapseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "valid" => Ok(PaddingType::Valid),
            "same" => Ok(PaddingType::Same),
            other => Err(SynapseError::UnsupportedPadding(other.to_string())),
        }
    }
}

/// 2-D pooling over `[rows, cols]` feature maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pooling {
    input_shape: Shape,
    output_shape: Shape,
    pooling_type: PoolingType,
    padding_type: PaddingType,
    pool_size: [usize; 2],
    strides: [usize; 2],
    pad_before: [usize; 2],
}

impl Pooling {
    pub fn new(input_shape: &[usize], config: &PoolingConfig) -> Result<Self> {
        let (rows, cols) = match *input_shape {
            [r, c] if r > 0 && c > 0 && r.checked_mul(c).is_some() => (r, c),
            [_, _] => {
                return Err(SynapseError::InvalidParameter(format!(
                    "Pooling input shape must be non-empty and addressable, got {input_shape:?}"
                )))
            }
            _ => {
                return Err(SynapseError::UnsupportedShape {
                    layer: "Pooling",
                    expected: "input shape must be [rows, cols]",
                    got: input_shape.to_vec(),
                })
            }
        };

        let pool_size = window(&config.pool_size, "pool size")?;
        let strides = match &config.strides {
            Some(s) => window(s, "strides")?,
            None => pool_size,
        };

        let (out_rows, pad_rows) =
            axis_geometry(rows, pool_size[0], strides[0], config.padding_type)?;
        let (out_cols, pad_cols) =
            axis_geometry(cols, pool_size[1], strides[1], config.padding_type)?;

        tracing::debug!(
            "Pooling({}) [{}, {}] -> [{}, {}]: pool={:?}, strides={:?}, padding={}",
            config.pooling_type,
            rows,
            cols,
            out_rows,
            out_cols,
            pool_size,
            strides,
            config.padding_type
        );

        Ok(Self {
            input_shape: Shape::new(&[rows, cols]),
            output_shape: Shape::new(&[out_rows, out_cols]),
            pooling_type: config.pooling_type,
            padding_type: config.padding_type,
            pool_size,
            strides,
            pad_before: [pad_rows, pad_cols],
        })
    }

    pub fn input_shape(&self) -> &Shape {
        &self.input_shape
    }

    pub fn output_shape(&self) -> &Shape {
        &self.output_shape
    }

    pub fn pooling_type(&self) -> PoolingType {
        self.pooling_type
    }

    pub fn padding_type(&self) -> PaddingType {
        self.padding_type
    }

    pub fn pool_size(&self) -> [usize; 2] {
        self.pool_size
    }

    pub fn strides(&self) -> [usize; 2] {
        self.strides
    }

    /// Input cells covered by window `o` along `axis`, padding excluded.
    fn window_cells(&self, axis: usize, o: usize) -> Range<usize> {
        let len = self.input_shape.dims()[axis];
        let pad = self.pad_before[axis];
        // Both ends fit: the constructor checked the last window's end.
        let start = o * self.strides[axis];
        let end = start + self.pool_size[axis];
        let lo = start.max(pad) - pad;
        let hi = end.min(pad + len).saturating_sub(pad);
        lo..hi.max(lo)
    }

    fn reduce<T: Element>(&self, map: &[T], oh: usize, ow: usize) -> T {
        let in_w = self.input_shape.dims()[1];
        let rows = self.window_cells(0, oh);
        let cols = self.window_cells(1, ow);

        let mut max_val = T::neg_infinity();
        let mut sum = T::zero();
        for ih in rows.clone() {
            for &v in &map[ih * in_w + cols.start..ih * in_w + cols.end] {
                max_val = max_val.max(v);
                sum = sum + v;
            }
        }
        let count = rows.len() * cols.len();

        match self.pooling_type {
            PoolingType::Max => max_val,
            PoolingType::Average if count > 0 => sum / T::from_f64(count as f64),
            PoolingType::Average => T::zero(),
        }
    }
}

impl<T: Element> FeedForward<T> for Pooling {
    fn feed_forward(&self, input: Tensor<T>) -> Result<Tensor<T>> {
        check_features(&input, &self.input_shape)?;

        let batch = input.dims()[0];
        let map_len = self.input_shape.numel();
        let out_h = self.output_shape.dims()[0];
        let out_w = self.output_shape.dims()[1];

        let mut output = Vec::with_capacity(batch * out_h * out_w);
        for map in input.as_slice().chunks_exact(map_len) {
            for oh in 0..out_h {
                for ow in 0..out_w {
                    output.push(self.reduce(map, oh, ow));
                }
            }
        }

        Tensor::from_vec(output, &[batch, out_h, out_w])
    }
}

/// Expand a one- or two-entry window size to `[rows, cols]`.
fn window(sizes: &[usize], what: &str) -> Result<[usize; 2]> {
    let w = match *sizes {
        [r] => [r, 1],
        [r, c] => [r, c],
        _ => {
            return Err(SynapseError::InvalidParameter(format!(
                "{what} must have one or two entries, got {sizes:?}"
            )))
        }
    };
    if w.contains(&0) {
        return Err(SynapseError::InvalidParameter(format!(
            "{what} entries must be at least 1, got {sizes:?}"
        )));
    }
    Ok(w)
}

/// Output length and leading padding along one axis.
///
/// Fails when the padded extent `(out - 1) * stride + pool` overflows.
fn axis_geometry(
    len: usize,
    pool: usize,
    stride: usize,
    padding: PaddingType,
) -> Result<(usize, usize)> {
    match padding {
        PaddingType::Valid => {
            if pool > len {
                return Err(SynapseError::InvalidParameter(format!(
                    "pool size {pool} exceeds input length {len} with valid padding"
                )));
            }
            Ok(((len - pool) / stride + 1, 0))
        }
        PaddingType::Same => {
            // ceil(len / stride) without forming len + stride - 1
            let out = len / stride + usize::from(len % stride != 0);
            let extent = (out - 1)
                .checked_mul(stride)
                .and_then(|v| v.checked_add(pool))
                .ok_or_else(|| {
                    SynapseError::InvalidParameter(format!(
                        "pool size {pool} with stride {stride} overflows over input length {len}"
                    ))
                })?;
            Ok((out, extent.saturating_sub(len) / 2))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use synapse_core::ErrorKind;

    fn grid_4x4() -> Tensor<f32> {
        let data: Vec<f32> = (1..=16).map(|i| i as f32).collect();
        Tensor::from_vec(data, &[1, 4, 4]).unwrap()
    }

    #[test]
    fn test_max_pool_basic() {
        let pool = Pooling::new(&[4, 4], &PoolingConfig::new(PoolingType::Max, &[2, 2])).unwrap();
        assert_eq!(pool.output_shape().dims(), &[2, 2]);

        let output = pool.feed_forward(grid_4x4()).unwrap();
        assert_eq!(output.dims(), &[1, 2, 2]);
        assert_eq!(output.as_slice(), &[6.0, 8.0, 14.0, 16.0]);
    }

    #[test]
    fn test_max_pool_stride() {
        let config = PoolingConfig::new(PoolingType::Max, &[3, 3]).strides(&[1, 1]);
        let pool = Pooling::new(&[4, 4], &config).unwrap();
        let output = pool.feed_forward(grid_4x4()).unwrap();
        assert_eq!(output.dims(), &[1, 2, 2]);
        assert_eq!(output.as_slice(), &[11.0, 12.0, 15.0, 16.0]);
    }

    #[test]
    fn test_avg_pool_basic() {
        let pool =
            Pooling::new(&[4, 4], &PoolingConfig::new(PoolingType::Average, &[2, 2])).unwrap();
        let output = pool.feed_forward(grid_4x4()).unwrap();
        // avg of [1,2,5,6]=3.5, [3,4,7,8]=5.5, [9,10,13,14]=11.5, [11,12,15,16]=13.5
        let data = output.as_slice();
        assert!((data[0] - 3.5).abs() < 1e-6);
        assert!((data[1] - 5.5).abs() < 1e-6);
        assert!((data[2] - 11.5).abs() < 1e-6);
        assert!((data[3] - 13.5).abs() < 1e-6);
    }

    #[test]
    fn test_single_entry_pool_size() {
        let pool = Pooling::new(&[4, 2], &PoolingConfig::new(PoolingType::Max, &[2])).unwrap();
        assert_eq!(pool.pool_size(), [2, 1]);
        assert_eq!(pool.output_shape().dims(), &[2, 2]);

        let input = Tensor::from_slice(&[1.0f64, 8.0, 3.0, 2.0, 5.0, 6.0, 7.0, 4.0], &[1, 4, 2])
            .unwrap();
        let output = pool.feed_forward(input).unwrap();
        assert_eq!(output.as_slice(), &[3.0, 8.0, 7.0, 6.0]);
    }

    #[test]
    fn test_same_padding_shape() {
        let config = PoolingConfig::new(PoolingType::Max, &[2, 2]).padding(PaddingType::Same);
        let pool = Pooling::new(&[5, 3], &config).unwrap();
        assert_eq!(pool.output_shape().dims(), &[3, 2]);

        let config = PoolingConfig::new(PoolingType::Max, &[3, 3])
            .strides(&[1, 1])
            .padding(PaddingType::Same);
        let pool = Pooling::new(&[4, 4], &config).unwrap();
        assert_eq!(pool.output_shape().dims(), &[4, 4]);
    }

    #[test]
    fn test_same_padding_ignores_padded_cells() {
        // 3x3 windows, stride 1, one cell of padding on every side.
        let config = PoolingConfig::new(PoolingType::Average, &[3, 3])
            .strides(&[1, 1])
            .padding(PaddingType::Same);
        let pool = Pooling::new(&[2, 2], &config).unwrap();
        let input = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[1, 2, 2]).unwrap();
        let output = pool.feed_forward(input).unwrap();
        // Every window covers the whole 2x2 map.
        assert!(output.as_slice().iter().all(|&v| (v - 2.5).abs() < 1e-6));

        let config = PoolingConfig::new(PoolingType::Max, &[2, 2]).padding(PaddingType::Same);
        let pool = Pooling::new(&[3, 3], &config).unwrap();
        let input = Tensor::from_slice(&[-9.0f32; 9], &[1, 3, 3]).unwrap();
        let output = pool.feed_forward(input).unwrap();
        assert_eq!(output.dims(), &[1, 2, 2]);
        assert!(output.as_slice().iter().all(|&v| v == -9.0));
    }

    #[test]
    fn test_batch() {
        let pool = Pooling::new(&[2, 2], &PoolingConfig::new(PoolingType::Max, &[2, 2])).unwrap();
        let input =
            Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 8.0, 7.0, 6.0, 5.0], &[2, 2, 2]).unwrap();
        let output = pool.feed_forward(input).unwrap();
        assert_eq!(output.dims(), &[2, 1, 1]);
        assert_eq!(output.as_slice(), &[4.0, 8.0]);
    }

    #[test]
    fn test_invalid_configs() {
        let max = |size: &[usize]| PoolingConfig::new(PoolingType::Max, size);

        let err = Pooling::new(&[4], &max(&[2])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedShape);
        let err = Pooling::new(&[4, 4, 1], &max(&[2])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedShape);

        for config in [
            max(&[]),
            max(&[2, 2, 2]),
            max(&[0, 2]),
            max(&[2, 2]).strides(&[0, 1]),
            max(&[5, 1]),
        ] {
            let err = Pooling::new(&[4, 4], &config).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter, "{config:?}");
        }
    }

    #[test]
    fn test_huge_strides_and_windows() {
        // A stride past the input leaves a single window along that axis.
        let config = PoolingConfig::new(PoolingType::Max, &[2, 2])
            .strides(&[usize::MAX, 1])
            .padding(PaddingType::Same);
        let pool = Pooling::new(&[4, 4], &config).unwrap();
        assert_eq!(pool.output_shape().dims(), &[1, 4]);
        let output = pool.feed_forward(grid_4x4()).unwrap();
        assert_eq!(output.as_slice(), &[6.0, 7.0, 8.0, 8.0]);

        // The padded extent of the last window does not fit in usize.
        let config = PoolingConfig::new(PoolingType::Max, &[usize::MAX, 1])
            .strides(&[1, 1])
            .padding(PaddingType::Same);
        let err = Pooling::new(&[4, 4], &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);

        // Windows far larger than the map only visit its real cells.
        let config = PoolingConfig::new(PoolingType::Average, &[1 << 20, 1 << 20])
            .strides(&[1, 1])
            .padding(PaddingType::Same);
        let pool = Pooling::new(&[4, 4], &config).unwrap();
        let output = pool.feed_forward(grid_4x4()).unwrap();
        assert_eq!(output.dims(), &[1, 4, 4]);
        assert!(output.as_slice().iter().all(|&v| (v - 8.5).abs() < 1e-6));
    }

    #[test]
    fn test_overflowing_input_shape() {
        let config = PoolingConfig::new(PoolingType::Max, &[1, 1]);
        let err = Pooling::new(&[usize::MAX, 2], &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_forward_validates_input() {
        let pool = Pooling::new(&[4, 4], &PoolingConfig::new(PoolingType::Max, &[2, 2])).unwrap();
        let err = pool.feed_forward(Tensor::<f32>::zeros(&[1, 4, 3])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeError);
        let err = pool.feed_forward(Tensor::<f32>::zeros(&[1, 16])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeError);
    }

    #[test]
    fn test_parse() {
        assert_eq!("max".parse::<PoolingType>().unwrap(), PoolingType::Max);
        assert_eq!("average".parse::<PoolingType>().unwrap(), PoolingType::Average);
        assert_eq!("same".parse::<PaddingType>().unwrap(), PaddingType::Same);

        let err = "min".parse::<PoolingType>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedPooling);
        let err = "same_keras".parse::<PaddingType>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedPadding);
    }
}
