// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/frame.rs - 画布位图与灰度帧定义
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

use image::{GrayImage, RgbImage, RgbaImage};
use thiserror::Error;

pub const RGB_CHANNELS: usize = 3;
pub const RGBA_CHANNELS: usize = 4;

/// 模型输入网格边长
pub const GRID_SIZE: u32 = 28;

/// 归一化后的 28×28 灰度网格
pub type IntensityGrid = GrayFrame<GRID_SIZE, GRID_SIZE>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitmapError {
  #[error("画布为空")]
  Empty,
  #[error("不支持的通道数: {0}")]
  UnsupportedChannels(usize),
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  BufferSizeMismatch { expected: usize, actual: usize },
}

/// 画布捕获的原始位图，逐像素交错存储（RGB 或 RGBA）
#[derive(Debug, Clone)]
pub struct RawBitmap {
  width: u32,
  height: u32,
  channels: usize,
  data: Box<[u8]>,
}

impl RawBitmap {
  pub fn new(width: u32, height: u32, channels: usize, data: Vec<u8>) -> Result<Self, BitmapError> {
    if width == 0 || height == 0 || data.is_empty() {
      return Err(BitmapError::Empty);
    }
    if channels != RGB_CHANNELS && channels != RGBA_CHANNELS {
      return Err(BitmapError::UnsupportedChannels(channels));
    }

    let expected = width as usize * height as usize * channels;
    if data.len() != expected {
      return Err(BitmapError::BufferSizeMismatch {
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      width,
      height,
      channels,
      data: data.into_boxed_slice(),
    })
  }

  pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BitmapError> {
    Self::new(width, height, RGBA_CHANNELS, data)
  }

  pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BitmapError> {
    Self::new(width, height, RGB_CHANNELS, data)
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn channels(&self) -> usize {
    self.channels
  }

  /// 逐像素迭代 RGB 三元组，忽略 alpha 通道
  pub fn rgb_pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
    self
      .data
      .chunks_exact(self.channels)
      .map(|px| [px[0], px[1], px[2]])
  }

  /// 画布上是否没有任何笔画（黑底白字约定下全部为黑色）
  pub fn is_blank(&self) -> bool {
    self.rgb_pixels().all(|[r, g, b]| r == 0 && g == 0 && b == 0)
  }
}

impl AsRef<[u8]> for RawBitmap {
  fn as_ref(&self) -> &[u8] {
    &self.data
  }
}

impl TryFrom<RgbaImage> for RawBitmap {
  type Error = BitmapError;

  fn try_from(image: RgbaImage) -> Result<Self, Self::Error> {
    let (width, height) = image.dimensions();
    Self::from_rgba(width, height, image.into_raw())
  }
}

impl TryFrom<RgbImage> for RawBitmap {
  type Error = BitmapError;

  fn try_from(image: RgbImage) -> Result<Self, Self::Error> {
    let (width, height) = image.dimensions();
    Self::from_rgb(width, height, image.into_raw())
  }
}

/// 定长单通道帧，行优先存储
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayFrame<const W: u32, const H: u32> {
  data: Box<[u8]>,
}

impl<const W: u32, const H: u32> TryFrom<Vec<u8>> for GrayFrame<W, H> {
  type Error = BitmapError;

  fn try_from(data: Vec<u8>) -> Result<Self, Self::Error> {
    let expected = W as usize * H as usize;
    if data.len() != expected {
      return Err(BitmapError::BufferSizeMismatch {
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      data: data.into_boxed_slice(),
    })
  }
}

impl<const W: u32, const H: u32> TryFrom<GrayImage> for GrayFrame<W, H> {
  type Error = BitmapError;

  fn try_from(image: GrayImage) -> Result<Self, Self::Error> {
    Self::try_from(image.into_raw())
  }
}

impl<const W: u32, const H: u32> Default for GrayFrame<W, H> {
  fn default() -> Self {
    let data = vec![0u8; W as usize * H as usize].into_boxed_slice();
    Self { data }
  }
}

impl<const W: u32, const H: u32> GrayFrame<W, H> {
  pub fn height(&self) -> usize {
    H as usize
  }

  pub fn width(&self) -> usize {
    W as usize
  }

  pub fn get(&self, x: usize, y: usize) -> Option<u8> {
    if x >= self.width() || y >= self.height() {
      return None;
    }
    Some(self.data[y * self.width() + x])
  }

  pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
    self.data.chunks_exact(W as usize)
  }

  pub fn to_gray_image(&self) -> GrayImage {
    GrayImage::from_fn(W, H, |x, y| {
      image::Luma([self.data[(y * W + x) as usize]])
    })
  }
}

impl<const W: u32, const H: u32> AsRef<[u8]> for GrayFrame<W, H> {
  fn as_ref(&self) -> &[u8] {
    &self.data
  }
}

impl<const W: u32, const H: u32> AsMut<[u8]> for GrayFrame<W, H> {
  fn as_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bitmap_rejects_zero_size() {
    assert_eq!(RawBitmap::from_rgba(0, 10, vec![]).unwrap_err(), BitmapError::Empty);
  }

  #[test]
  fn bitmap_rejects_two_channels() {
    let err = RawBitmap::new(1, 1, 2, vec![0, 0]).unwrap_err();
    assert_eq!(err, BitmapError::UnsupportedChannels(2));
  }

  #[test]
  fn bitmap_rejects_short_buffer() {
    let err = RawBitmap::from_rgba(2, 2, vec![0; 15]).unwrap_err();
    assert_eq!(
      err,
      BitmapError::BufferSizeMismatch {
        expected: 16,
        actual: 15
      }
    );
  }

  #[test]
  fn rgb_pixels_skip_alpha() {
    let bitmap = RawBitmap::from_rgba(2, 1, vec![1, 2, 3, 255, 4, 5, 6, 0]).unwrap();
    let pixels: Vec<_> = bitmap.rgb_pixels().collect();
    assert_eq!(pixels, vec![[1, 2, 3], [4, 5, 6]]);
  }

  #[test]
  fn blank_ignores_alpha() {
    let bitmap = RawBitmap::from_rgba(1, 2, vec![0, 0, 0, 255, 0, 0, 0, 0]).unwrap();
    assert!(bitmap.is_blank());
    let bitmap = RawBitmap::from_rgb(1, 1, vec![0, 9, 0]).unwrap();
    assert!(!bitmap.is_blank());
  }

  #[test]
  fn gray_frame_checks_length() {
    assert!(GrayFrame::<2, 2>::try_from(vec![0u8; 4]).is_ok());
    assert!(GrayFrame::<2, 2>::try_from(vec![0u8; 5]).is_err());
  }

  #[test]
  fn gray_frame_indexing_is_row_major() {
    let frame = GrayFrame::<3, 2>::try_from(vec![0, 1, 2, 3, 4, 5]).unwrap();
    assert_eq!(frame.get(2, 0), Some(2));
    assert_eq!(frame.get(0, 1), Some(3));
    assert_eq!(frame.get(3, 0), None);
    assert_eq!(frame.rows().count(), 2);
    assert_eq!(frame.to_gray_image().get_pixel(1, 1).0, [4]);
  }
}
