// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/target.rs - 语言模式与目标类别解析
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

use std::{fmt, str::FromStr};

use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

use crate::preprocess::Layout;

pub type ClassIndex = usize;

pub const ENGLISH_CLASS_NUM: usize = 26;
pub const DIGIT_CLASS_NUM: usize = 10;

/// 语言模式，决定目标词表、输入布局与提示文本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
  English,
  Urdu,
  Digit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
  #[error("{mode} 模式下无法解析目标: {text:?}")]
  Invalid { mode: Mode, text: String },
  #[error("{mode} 模式下目标索引 {index} 超出类别数 {class_count}")]
  OutOfRange {
    mode: Mode,
    index: ClassIndex,
    class_count: usize,
  },
}

impl TargetError {
  pub fn mode(&self) -> Mode {
    match self {
      TargetError::Invalid { mode, .. } | TargetError::OutOfRange { mode, .. } => *mode,
    }
  }
}

impl Mode {
  pub const ALL: [Mode; 3] = [Mode::English, Mode::Urdu, Mode::Digit];

  pub fn name(&self) -> &'static str {
    match self {
      Mode::English => "English",
      Mode::Urdu => "Urdu",
      Mode::Digit => "Digit",
    }
  }

  /// 各模型训练时使用的输入形状不同
  pub fn layout(&self) -> Layout {
    match self {
      Mode::English | Mode::Urdu => Layout::Grid3D,
      Mode::Digit => Layout::Flat,
    }
  }

  /// 已知的类别数；乌尔都语由模型决定
  pub fn expected_class_count(&self) -> Option<usize> {
    match self {
      Mode::English => Some(ENGLISH_CLASS_NUM),
      Mode::Urdu => None,
      Mode::Digit => Some(DIGIT_CLASS_NUM),
    }
  }

  /// 将用户输入的目标文本解析为类别索引
  pub fn resolve(&self, text: &str, class_count: usize) -> Result<ClassIndex, TargetError> {
    let index = match self {
      Mode::English => english_index(text),
      Mode::Urdu | Mode::Digit => text.trim().parse::<ClassIndex>().ok(),
    }
    .ok_or_else(|| TargetError::Invalid {
      mode: *self,
      text: text.to_string(),
    })?;

    if index >= class_count {
      return Err(TargetError::OutOfRange {
        mode: *self,
        index,
        class_count,
      });
    }
    Ok(index)
  }

  /// 类别索引对应的显示标签
  pub fn label(&self, index: ClassIndex) -> String {
    match self {
      Mode::English if index < ENGLISH_CLASS_NUM => ((b'A' + index as u8) as char).to_string(),
      _ => index.to_string(),
    }
  }

  /// 目标无效时展示给用户的文本
  pub fn invalid_target_message(&self) -> &'static str {
    match self {
      Mode::English => "Invalid English target letter.",
      Mode::Urdu => "Invalid Urdu target index.",
      Mode::Digit => "Invalid target digit.",
    }
  }

  /// 回显的目标文本
  pub fn display_target(&self, text: &str) -> String {
    match self {
      Mode::English => text.trim().to_uppercase(),
      Mode::Urdu | Mode::Digit => text.trim().to_string(),
    }
  }
}

fn english_index(text: &str) -> Option<ClassIndex> {
  let mut chars = text.trim().chars();
  match (chars.next(), chars.next()) {
    (Some(c), None) if c.is_ascii_alphabetic() => {
      Some((c.to_ascii_uppercase() as u8 - b'A') as ClassIndex)
    }
    _ => None,
  }
}

impl fmt::Display for Mode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Mode {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    <Mode as ValueEnum>::from_str(s.trim(), true)
  }
}
