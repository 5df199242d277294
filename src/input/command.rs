// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/input/command.rs - 交互命令输入
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

use std::io::{BufRead, Write};

use tracing::error;
use url::Url;

use crate::{
  FromUrl,
  input::{InputWrapper, load_bitmap},
  pipeline::PredictionRequest,
  target::Mode,
};

pub const USAGE: &str = "用法: <english|urdu|digit> <目标> [图像路径或 URL] | help | quit";

/// 交互会话中的一行命令
#[derive(Debug)]
pub enum Command {
  Predict(PredictionRequest),
  Invalid(String),
  Help,
  Quit,
}

/// 解析一行命令；空行返回 None
///
/// 省略图像时请求不带位图，相当于用户没有在画布上绘制。
pub fn parse_command(line: &str) -> Option<Command> {
  let mut tokens = line.split_whitespace();
  let head = tokens.next()?;

  match head.to_lowercase().as_str() {
    "quit" | "exit" => return Some(Command::Quit),
    "help" | "?" => return Some(Command::Help),
    _ => {}
  }

  let mode = match head.parse::<Mode>() {
    Ok(mode) => mode,
    Err(_) => return Some(Command::Invalid(format!("未知模式: {}", head))),
  };
  let Some(target) = tokens.next() else {
    return Some(Command::Invalid("缺少目标".to_string()));
  };

  let request = PredictionRequest::new(mode, target, None);
  let Some(source) = tokens.next() else {
    return Some(Command::Predict(request));
  };

  if tokens.next().is_some() {
    return Some(Command::Invalid(USAGE.to_string()));
  }

  let drawing = match Url::parse(source) {
    Ok(url) => InputWrapper::from_url(&url)
      .map_err(|e| e.to_string())
      .and_then(|mut input| input.next().ok_or_else(|| format!("没有可用的图像: {}", source)))
      .map(|drawing| drawing.bitmap),
    // 不是 URL 时按本地路径读取
    Err(_) => load_bitmap(source).map_err(|e| e.to_string()),
  };

  Some(match drawing {
    Ok(bitmap) => Command::Predict(PredictionRequest {
      bitmap: Some(bitmap),
      ..request
    }
    .with_source(source)),
    Err(e) => Command::Invalid(format!("无法读取图像 {}: {}", source, e)),
  })
}

/// 从文本流中逐行读取命令
pub struct CommandInput<R> {
  reader: R,
  prompt: bool,
}

impl<R: BufRead> CommandInput<R> {
  pub fn new(reader: R) -> Self {
    Self {
      reader,
      prompt: false,
    }
  }

  pub fn with_prompt(mut self, prompt: bool) -> Self {
    self.prompt = prompt;
    self
  }
}

impl<R: BufRead> Iterator for CommandInput<R> {
  type Item = Command;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      if self.prompt {
        print!("> ");
        let _ = std::io::stdout().flush();
      }

      let mut line = String::new();
      match self.reader.read_line(&mut line) {
        Ok(0) => return None,
        Ok(_) => {
          if let Some(command) = parse_command(&line) {
            return Some(command);
          }
        }
        Err(e) => {
          error!("读取命令失败: {}", e);
          return None;
        }
      }
    }
  }
}
