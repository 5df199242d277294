// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/output.rs - 输出定义
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

use std::io::Stdout;

use crate::FromUrl;
use crate::FromUrlWithScheme;
use crate::pipeline::{Outcome, PredictionRequest};
use thiserror::Error;
use url::Url;

pub trait Render<Request, Outcome> {
  type Error;
  fn render_result(&self, request: &Request, outcome: &Outcome) -> Result<(), Self::Error>;
}

impl<Q, R, O: Render<Q, R>> Render<Q, R> for &O {
  type Error = O::Error;

  fn render_result(&self, request: &Q, outcome: &R) -> Result<(), Self::Error> {
    (**self).render_result(request, outcome)
  }
}

/// 依次交给每个输出
impl<Q, R, O: Render<Q, R>> Render<Q, R> for Vec<O> {
  type Error = O::Error;

  fn render_result(&self, request: &Q, outcome: &R) -> Result<(), Self::Error> {
    for output in self.iter() {
      output.render_result(request, outcome)?;
    }
    Ok(())
  }
}

pub mod draw;
pub mod report;
pub use self::report::Report;

mod console;
pub use self::console::ConsoleOutput;

#[cfg(feature = "save_image_file")]
mod save_image_file;
#[cfg(feature = "save_image_file")]
pub use self::save_image_file::{SaveImageFileError, SaveImageFileOutput};

#[cfg(feature = "directory_record")]
mod directory_record;
#[cfg(feature = "directory_record")]
pub use self::directory_record::{DirectoryRecordOutput, DirectoryRecordOutputError};

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("终端输出错误: {0}")]
  ConsoleError(#[from] std::io::Error),
  #[cfg(feature = "save_image_file")]
  #[error("保存图像文件错误: {0}")]
  SaveImageFileError(#[from] SaveImageFileError),
  #[cfg(feature = "directory_record")]
  #[error("目录记录输出错误: {0}")]
  DirectoryRecordOutputError(#[from] DirectoryRecordOutputError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

pub enum OutputWrapper {
  Console(ConsoleOutput<Stdout>),
  #[cfg(feature = "save_image_file")]
  SaveImageFileOutput(SaveImageFileOutput),
  #[cfg(feature = "directory_record")]
  DirectoryRecordOutput(DirectoryRecordOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      ConsoleOutput::<Stdout>::SCHEME => Ok(OutputWrapper::Console(ConsoleOutput::stdout())),
      #[cfg(feature = "save_image_file")]
      SaveImageFileOutput::SCHEME => {
        let output = SaveImageFileOutput::from_url(url)?;
        Ok(OutputWrapper::SaveImageFileOutput(output))
      }
      #[cfg(feature = "directory_record")]
      DirectoryRecordOutput::SCHEME => {
        let output = DirectoryRecordOutput::from_url(url)?;
        Ok(OutputWrapper::DirectoryRecordOutput(output))
      }
      other => Err(OutputError::SchemeMismatch(other.to_string())),
    }
  }
}

impl Render<PredictionRequest, Outcome> for OutputWrapper {
  type Error = OutputError;

  fn render_result(&self, request: &PredictionRequest, outcome: &Outcome) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::Console(output) => output
        .render_result(request, outcome)
        .map_err(OutputError::from),
      #[cfg(feature = "save_image_file")]
      OutputWrapper::SaveImageFileOutput(output) => output
        .render_result(request, outcome)
        .map_err(OutputError::from),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecordOutput(output) => output
        .render_result(request, outcome)
        .map_err(OutputError::from),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn console_scheme_is_recognized() {
    let url = Url::parse("console:").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url),
      Ok(OutputWrapper::Console(_))
    ));
  }

  #[test]
  fn unknown_scheme_is_rejected() {
    let url = Url::parse("rtsp://localhost/stream").unwrap();
    assert!(matches!(
      OutputWrapper::from_url(&url),
      Err(OutputError::SchemeMismatch(s)) if s == "rtsp"
    ));
  }
}
