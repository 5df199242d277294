// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/input.rs - 画布位图输入
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

use thiserror::Error;

use crate::{FromUrl, FromUrlWithScheme, frame::RawBitmap, pipeline::PredictionRequest, target::Mode};

mod read_image_file;
pub use self::read_image_file::{ImageFileInput, ImageFileInputError, load_bitmap};

mod directory;
pub use self::directory::{DirectoryInput, DirectoryInputError};

mod command;
pub use self::command::{Command, CommandInput, USAGE, parse_command};

/// 一张已捕获的画布及其来源
#[derive(Debug, Clone)]
pub struct Drawing {
  pub source: String,
  pub bitmap: RawBitmap,
}

#[derive(Error, Debug)]
pub enum InputError {
  #[error("图像文件输入错误: {0}")]
  ImageFileInputError(#[from] ImageFileInputError),
  #[error("目录输入错误: {0}")]
  DirectoryInputError(#[from] DirectoryInputError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

pub enum InputWrapper {
  ReadImageFile(ImageFileInput),
  Directory(DirectoryInput),
}

impl FromUrl for InputWrapper {
  type Error = InputError;

  fn from_url(url: &url::Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      ImageFileInput::SCHEME => Ok(InputWrapper::ReadImageFile(ImageFileInput::from_url(url)?)),
      DirectoryInput::SCHEME => Ok(InputWrapper::Directory(DirectoryInput::from_url(url)?)),
      other => Err(InputError::SchemeMismatch(other.to_string())),
    }
  }
}

impl Iterator for InputWrapper {
  type Item = Drawing;

  fn next(&mut self) -> Option<Self::Item> {
    match self {
      InputWrapper::ReadImageFile(input) => input.next(),
      InputWrapper::Directory(input) => input.next(),
    }
  }
}

impl InputWrapper {
  /// 每张画布都以相同的模式与目标生成一次请求
  pub fn into_requests(
    self,
    mode: Mode,
    target: String,
  ) -> impl Iterator<Item = PredictionRequest> {
    self.map(move |drawing| {
      PredictionRequest::new(mode, target.clone(), Some(drawing.bitmap)).with_source(drawing.source)
    })
  }
}
