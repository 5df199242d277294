// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/args.rs - 项目参数配置
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

use std::path::PathBuf;

use clap::Parser;
use url::Url;

use likhai::{
  FromUrl,
  model::{ModelPaths, OnnxClassifierBuilder, OnnxError},
  target::Mode,
};

/// Likhai 手写字符相似度检查
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型目录，包含 english_model.onnx、urdu_model.onnx、digit_model.onnx
  #[arg(long, default_value = "Models", value_name = "DIR")]
  pub models: PathBuf,

  /// 覆盖英文模型位置，例如 onnx:///path/to/model.onnx
  #[arg(long, value_name = "MODEL")]
  pub english_model: Option<Url>,

  /// 覆盖乌尔都语模型位置
  #[arg(long, value_name = "MODEL")]
  pub urdu_model: Option<Url>,

  /// 覆盖数字模型位置
  #[arg(long, value_name = "MODEL")]
  pub digit_model: Option<Url>,

  /// 结果输出
  /// 支持:
  /// - console:
  /// - image:///path/to/processed.png?scale=10
  /// - folder:///path/to/records?always
  #[arg(long, default_value = "console:", value_name = "OUTPUT")]
  pub output: Url,

  /// 额外的记录输出
  #[arg(long, value_name = "OUTPUT")]
  pub record: Option<Url>,

  /// 每个模型的推理线程数
  #[arg(long, value_name = "THREADS")]
  pub threads: Option<usize>,
}

impl Args {
  pub fn model_paths(&self) -> Result<ModelPaths, OnnxError> {
    let mut paths = ModelPaths::from_dir(&self.models);
    let overrides = [
      (Mode::English, &self.english_model),
      (Mode::Urdu, &self.urdu_model),
      (Mode::Digit, &self.digit_model),
    ];
    for (mode, url) in overrides {
      if let Some(url) = url {
        let builder = OnnxClassifierBuilder::from_url(url)?;
        paths.set(mode, builder.model_path().to_path_buf());
      }
    }
    Ok(paths)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_use_models_directory() {
    let args = Args::try_parse_from(["likhai"]).unwrap();
    assert_eq!(args.output.scheme(), "console");
    assert_eq!(args.model_paths().unwrap(), ModelPaths::from_dir("Models"));
  }

  #[test]
  fn model_override_replaces_single_path() {
    let args = Args::try_parse_from([
      "likhai",
      "--models",
      "/opt/models",
      "--digit-model",
      "onnx:///tmp/mnist.onnx",
    ])
    .unwrap();
    let paths = args.model_paths().unwrap();
    assert_eq!(paths.digit, PathBuf::from("/tmp/mnist.onnx"));
    assert_eq!(paths.english, PathBuf::from("/opt/models/english_model.onnx"));
  }

  #[test]
  fn model_override_requires_onnx_scheme() {
    let args = Args::try_parse_from(["likhai", "--urdu-model", "file:///tmp/urdu.onnx"]).unwrap();
    assert!(args.model_paths().is_err());
  }
}
