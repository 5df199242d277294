// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/bin/simple_oneshot.rs - 单次检查
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use likhai::{
  FromUrl,
  input::InputWrapper,
  model::{ModelPaths, ModelSet},
  output::OutputWrapper,
  target::Mode,
  task::{OneShotTask, Task},
};
use tracing::info;

/// Likhai 单次检查参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型目录
  #[arg(long, default_value = "Models", value_name = "DIR")]
  pub models: PathBuf,
  /// 语言模式
  #[arg(long, value_enum)]
  pub mode: Mode,
  /// 目标字符
  #[arg(long, value_name = "TARGET")]
  pub target: String,
  /// 输入来源，image:///a.png 或 folder:///drawings
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径，可重复
  #[arg(long, default_value = "console:", value_name = "OUTPUT")]
  pub output: Vec<Url>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型目录: {}", args.models.display());
  info!("模式: {}, 目标: {:?}", args.mode, args.target);
  info!("输入来源: {}", args.input);

  let models = ModelSet::load(&ModelPaths::from_dir(&args.models), None)?;
  let input = InputWrapper::from_url(&args.input)?;
  let output = args
    .output
    .iter()
    .map(OutputWrapper::from_url)
    .collect::<Result<Vec<_>, _>>()?;

  OneShotTask.run_task(input.into_requests(args.mode, args.target), &models, output)?;

  Ok(())
}
