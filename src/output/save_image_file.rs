// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/output/save_image_file.rs - 保存处理后的图像
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

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  output::{Render, draw::Draw},
  pipeline::{Outcome, PredictionRequest},
  url_path,
};

pub struct SaveImageFileOutput {
  path: String,
  draw: Draw,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(image::ImageError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("缩放倍数无效: {0}")]
  InvalidScale(String),
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    let mut draw = Draw::default();
    if let Some((_, scale)) = uri.query_pairs().find(|(k, _)| k == "scale") {
      let scale = scale
        .parse::<u32>()
        .map_err(|_| SaveImageFileError::InvalidScale(scale.to_string()))?;
      draw = draw.with_scale(scale);
    }

    Ok(SaveImageFileOutput {
      path: url_path(uri),
      draw,
    })
  }
}

impl SaveImageFileOutput {
  fn save_image(&self, image: image::RgbImage) -> Result<(), SaveImageFileError> {
    if let Some(parent) = Path::new(&self.path).parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent).map_err(SaveImageFileError::IoError)?;
    }

    image
      .save(&self.path)
      .map_err(SaveImageFileError::ImageError)?;

    info!("保存处理后图像到文件: {}", self.path);

    Ok(())
  }
}

impl Render<PredictionRequest, Outcome> for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, _request: &PredictionRequest, outcome: &Outcome) -> Result<(), Self::Error> {
    match outcome {
      Ok(result) => self.save_image(self.draw.draw_result(result)),
      Err(e) => {
        warn!("没有可保存的图像: {}", e);
        Ok(())
      }
    }
  }
}
