// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

use crate::{
  FromUrl, FromUrlWithScheme,
  output::{Render, Report, draw::Draw},
  pipeline::{Outcome, PredictionRequest},
  target::ClassIndex,
  url_path,
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 每次请求写入的 JSON 记录
#[derive(Debug, Serialize)]
struct Record<'a> {
  timestamp: String,
  source: Option<&'a str>,
  raw_target: &'a str,
  predicted_class: Option<ClassIndex>,
  error: Option<String>,
  image: Option<String>,
  report: Report,
}

/// 按日期分目录保存处理后的网格与结果记录
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  draw: Draw,
  frame_counter: Mutex<u16>,
  always: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    // 默认只记录成功完成推理的请求
    let always = uri.query_pairs().any(|(k, _)| k == "always");

    Ok(DirectoryRecordOutput {
      directory: PathBuf::from(url_path(uri)),
      draw: Draw::default(),
      frame_counter: Mutex::new(0),
      always,
    })
  }
}

impl DirectoryRecordOutput {
  fn frame_id(&self) -> u16 {
    let mut counter = self
      .frame_counter
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    let id = counter.wrapping_add(1);
    *counter = id;
    id
  }

  fn frame_stem(&self, now: &DateTime<Utc>) -> Result<PathBuf, std::io::Error> {
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    Ok(directory.join(format!(
      "{}-{:04X}",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }

  fn write_record(&self, path: &Path, record: &Record<'_>) -> Result<(), DirectoryRecordOutputError> {
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json)?;
    Ok(())
  }
}

impl Render<PredictionRequest, Outcome> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, request: &PredictionRequest, outcome: &Outcome) -> Result<(), Self::Error> {
    if outcome.is_err() && !self.always {
      return Ok(());
    }

    let now = Utc::now();
    let stem = self.frame_stem(&now)?;

    let image = match outcome {
      Ok(result) => {
        let path = stem.with_extension("png");
        self.draw.draw_result(result).save(&path)?;
        Some(path.display().to_string())
      }
      Err(_) => None,
    };

    let record = Record {
      timestamp: now.to_rfc3339(),
      source: request.source.as_deref(),
      raw_target: &request.target,
      predicted_class: outcome.as_ref().ok().and_then(|r| r.predicted_class),
      error: outcome.as_ref().err().map(|e| e.to_string()),
      image,
      report: Report::new(request, outcome),
    };
    let json_path = stem.with_extension("json");
    self.write_record(&json_path, &record)?;
    debug!("记录已写入: {}", json_path.display());

    Ok(())
  }
}
