// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use std::path::Path;

use image::ImageReader;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{BitmapError, RawBitmap},
  input::Drawing,
  url_path,
};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("Bitmap error: {0}")]
  BitmapError(#[from] BitmapError),
}

/// 读取图像文件并转为 RGBA 位图
pub fn load_bitmap(path: impl AsRef<Path>) -> Result<RawBitmap, ImageFileInputError> {
  let path = path.as_ref();
  let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
  debug!(
    "读取图像 {}: {}x{}",
    path.display(),
    image.width(),
    image.height()
  );
  Ok(RawBitmap::try_from(image.to_rgba8())?)
}

pub struct ImageFileInput {
  drawing: Option<Drawing>,
}

impl FromUrlWithScheme for ImageFileInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for ImageFileInput {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let path = url_path(url);
    let bitmap = load_bitmap(&path)?;

    Ok(ImageFileInput {
      drawing: Some(Drawing {
        source: path,
        bitmap,
      }),
    })
  }
}

impl Iterator for ImageFileInput {
  type Item = Drawing;

  fn next(&mut self) -> Option<Self::Item> {
    self.drawing.take()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgba, RgbaImage};

  #[test]
  fn reads_png_as_rgba_bitmap() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canvas.png");
    RgbaImage::from_pixel(40, 30, Rgba([255, 255, 255, 255]))
      .save(&path)
      .unwrap();

    let url = Url::from_file_path(&path).unwrap();
    let url = Url::parse(&url.as_str().replacen("file", "image", 1)).unwrap();
    let mut input = ImageFileInput::from_url(&url).unwrap();
    let drawing = input.next().unwrap();
    assert_eq!(drawing.bitmap.width(), 40);
    assert_eq!(drawing.bitmap.height(), 30);
    assert_eq!(drawing.bitmap.channels(), 4);
    assert!(input.next().is_none());
  }

  #[test]
  fn rejects_other_schemes() {
    let url = Url::parse("folder:///tmp").unwrap();
    assert!(matches!(
      ImageFileInput::from_url(&url),
      Err(ImageFileInputError::SchemaMismatch)
    ));
  }

  #[test]
  fn missing_file_is_io_error() {
    assert!(matches!(
      load_bitmap("/nonexistent/canvas.png"),
      Err(ImageFileInputError::IoError(_))
    ));
  }
}
