// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use likhai::{
  FromUrl,
  input::{CommandInput, USAGE},
  model::{ModelCache, ModelSet, OnnxClassifier},
  output::OutputWrapper,
  task::{InteractiveTask, Task},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();
  let paths = args.model_paths()?;

  info!("英文模型: {}", paths.english.display());
  info!("乌尔都语模型: {}", paths.urdu.display());
  info!("数字模型: {}", paths.digit.display());
  info!("输出路径: {}", args.output);

  info!("正在加载模型...");
  let cache: ModelCache<OnnxClassifier> = ModelCache::new();
  let models = cache.get_or_load(|| ModelSet::load(&paths, args.threads))?;
  info!("模型加载完成");

  let mut outputs = vec![OutputWrapper::from_url(&args.output)?];
  if let Some(record) = &args.record {
    info!("记录路径: {}", record);
    outputs.push(OutputWrapper::from_url(record)?);
  }

  println!("Likhai 手写字符相似度检查");
  println!("{}", USAGE);

  let stdin = std::io::stdin();
  InteractiveTask::default().run_task(
    CommandInput::new(stdin.lock()).with_prompt(true),
    models,
    outputs,
  )?;

  Ok(())
}
