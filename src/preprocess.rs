// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/preprocess.rs - 位图归一化与特征整形
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use image::{
  GrayImage, Luma,
  imageops::{self, FilterType},
};
use ndarray::{Array2, Array4, ArrayViewD};
use serde::Serialize;
use tracing::debug;

use crate::frame::{GRID_SIZE, IntensityGrid, RawBitmap};

// ITU-R BT.601 亮度权重
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

const PIXEL_MAX: f32 = 255.0;

/// 模型期望的输入布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
  /// [1, 784]
  Flat,
  /// [1, 28, 28, 1]
  Grid3D,
}

/// 送入模型的特征张量，元素总数恒为 784
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureTensor {
  Flat(Array2<f32>),
  Grid3D(Array4<f32>),
}

impl FeatureTensor {
  pub fn layout(&self) -> Layout {
    match self {
      FeatureTensor::Flat(_) => Layout::Flat,
      FeatureTensor::Grid3D(_) => Layout::Grid3D,
    }
  }

  pub fn shape(&self) -> &[usize] {
    match self {
      FeatureTensor::Flat(array) => array.shape(),
      FeatureTensor::Grid3D(array) => array.shape(),
    }
  }

  pub fn len(&self) -> usize {
    match self {
      FeatureTensor::Flat(array) => array.len(),
      FeatureTensor::Grid3D(array) => array.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn view(&self) -> ArrayViewD<'_, f32> {
    match self {
      FeatureTensor::Flat(array) => array.view().into_dyn(),
      FeatureTensor::Grid3D(array) => array.view().into_dyn(),
    }
  }

  /// 按行优先顺序展开的元素
  pub fn to_vec(&self) -> Vec<f32> {
    self.view().iter().copied().collect()
  }
}

pub fn luminance([r, g, b]: [u8; 3]) -> u8 {
  let y = LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32;
  y.round().clamp(0.0, PIXEL_MAX) as u8
}

/// 将任意尺寸的 RGB(A) 位图转为 28×28 灰度网格
pub fn normalize(bitmap: &RawBitmap) -> IntensityGrid {
  let (width, height) = (bitmap.width(), bitmap.height());
  let gray: Vec<u8> = bitmap.rgb_pixels().map(luminance).collect();
  let gray = GrayImage::from_fn(width, height, |x, y| {
    Luma([gray[(y as usize) * (width as usize) + (x as usize)]])
  });

  let resized = imageops::resize(&gray, GRID_SIZE, GRID_SIZE, FilterType::Triangle);
  debug!(
    "位图 {}x{} 已缩放为 {}x{}",
    width, height, GRID_SIZE, GRID_SIZE
  );

  let mut grid = IntensityGrid::default();
  grid.as_mut().copy_from_slice(resized.as_raw());
  grid
}

/// 将灰度网格整形为指定布局，数值缩放到 [0, 1]
pub fn shape(grid: &IntensityGrid, layout: Layout) -> FeatureTensor {
  let side = GRID_SIZE as usize;
  let pixels = grid.as_ref();

  match layout {
    Layout::Flat => FeatureTensor::Flat(Array2::from_shape_fn((1, side * side), |(_, i)| {
      pixels[i] as f32 / PIXEL_MAX
    })),
    Layout::Grid3D => {
      FeatureTensor::Grid3D(Array4::from_shape_fn((1, side, side, 1), |(_, y, x, _)| {
        pixels[y * side + x] as f32 / PIXEL_MAX
      }))
    }
  }
}
