// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/output/draw.rs - 处理后网格的可视化
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
  DynamicImage, Rgb, RgbImage,
  imageops::{self, FilterType},
};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::{frame::IntensityGrid, pipeline::PredictionResult, score::Verdict};

const GRID_SCALE: u32 = 10;
const BORDER_THICKNESS: u32 = 3;
const SUCCESS_COLOR: [u8; 3] = [0, 200, 0]; // 绿色
const RETRY_COLOR: [u8; 3] = [220, 0, 0]; // 红色

pub struct Draw {
  scale: u32,
  border_thickness: u32,
  success_color: [u8; 3],
  retry_color: [u8; 3],
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      scale: GRID_SCALE,
      border_thickness: BORDER_THICKNESS,
      success_color: SUCCESS_COLOR,
      retry_color: RETRY_COLOR,
    }
  }
}

impl Draw {
  pub fn with_scale(mut self, scale: u32) -> Self {
    self.scale = scale.max(1);
    self
  }

  pub fn scale(&self) -> u32 {
    self.scale
  }

  /// 最近邻放大 28×28 网格，保留像素块便于目视确认
  pub fn draw_grid(&self, grid: &IntensityGrid) -> RgbImage {
    let gray = grid.to_gray_image();
    let (w, h) = gray.dimensions();
    let enlarged = imageops::resize(&gray, w * self.scale, h * self.scale, FilterType::Nearest);
    DynamicImage::ImageLuma8(enlarged).to_rgb8()
  }

  /// 按判定结果在网格外加一圈彩色边框
  pub fn draw_result(&self, result: &PredictionResult) -> RgbImage {
    let mut image = self.draw_grid(&result.processed_grid);
    let color = match result.verdict {
      Verdict::Success => Some(self.success_color),
      Verdict::Retry => Some(self.retry_color),
      Verdict::NoVerdict => None,
    };
    if let Some(color) = color {
      self.draw_border(&mut image, color);
    }
    image
  }

  fn draw_border(&self, image: &mut RgbImage, color: [u8; 3]) {
    let (w, h) = image.dimensions();
    for t in 0..self.border_thickness {
      if 2 * t >= w || 2 * t >= h {
        break;
      }
      let rect = Rect::at(t as i32, t as i32).of_size(w - 2 * t, h - 2 * t);
      draw_hollow_rect_mut(image, rect, Rgb(color));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::target::Mode;

  fn result(verdict: Verdict) -> PredictionResult {
    let mut data = vec![0u8; 784];
    data[14 * 28 + 14] = 255;
    PredictionResult {
      mode: Mode::Digit,
      predicted_class: Some(1),
      similarity: Ok(50.0),
      verdict,
      processed_grid: IntensityGrid::try_from(data).unwrap(),
    }
  }

  #[test]
  fn grid_is_enlarged_by_scale() {
    let draw = Draw::default().with_scale(4);
    let image = draw.draw_grid(&result(Verdict::NoVerdict).processed_grid);
    assert_eq!(image.dimensions(), (112, 112));
    assert_eq!(image.get_pixel(14 * 4 + 1, 14 * 4 + 2).0, [255, 255, 255]);
    assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0]);
  }

  #[test]
  fn border_follows_verdict() {
    let draw = Draw::default();
    assert_eq!(
      draw.draw_result(&result(Verdict::Success)).get_pixel(0, 0).0,
      SUCCESS_COLOR
    );
    assert_eq!(
      draw.draw_result(&result(Verdict::Retry)).get_pixel(279, 279).0,
      RETRY_COLOR
    );
    assert_eq!(
      draw.draw_result(&result(Verdict::NoVerdict)).get_pixel(0, 0).0,
      [0, 0, 0]
    );
  }
}
