// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/output/console.rs - 终端文本输出
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

use std::io::{Stdout, Write};
use std::sync::Mutex;

use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  output::{OutputError, Render, Report},
  pipeline::{Outcome, PredictionRequest},
};

pub struct ConsoleOutput<W> {
  writer: Mutex<W>,
}

impl ConsoleOutput<Stdout> {
  pub fn stdout() -> Self {
    Self::new(std::io::stdout())
  }
}

impl<W: Write> ConsoleOutput<W> {
  pub fn new(writer: W) -> Self {
    Self {
      writer: Mutex::new(writer),
    }
  }

  pub fn into_inner(self) -> W {
    self
      .writer
      .into_inner()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl FromUrlWithScheme for ConsoleOutput<Stdout> {
  const SCHEME: &'static str = "console";
}

impl FromUrl for ConsoleOutput<Stdout> {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OutputError::SchemeMismatch(url.scheme().to_string()));
    }
    Ok(Self::stdout())
  }
}

impl<W: Write> Render<PredictionRequest, Outcome> for ConsoleOutput<W> {
  type Error = std::io::Error;

  fn render_result(&self, request: &PredictionRequest, outcome: &Outcome) -> Result<(), Self::Error> {
    let report = Report::new(request, outcome);
    let mut writer = self
      .writer
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(source) = &request.source {
      writeln!(writer, "[{}]", source)?;
    }
    for line in report.lines() {
      writeln!(writer, "{}", line)?;
    }
    writer.flush()
  }
}
