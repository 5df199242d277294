// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/model.rs - 模型
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

use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing::info;

use crate::{preprocess::FeatureTensor, score::ProbabilityVector, target::Mode};

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 输入特征张量、输出概率向量的分类模型
pub trait Classifier: Model<Input = FeatureTensor, Output = ProbabilityVector> {}

impl<T: Model<Input = FeatureTensor, Output = ProbabilityVector>> Classifier for T {}

/// 三种语言模式各自的模型句柄，启动后只读
#[derive(Debug)]
pub struct ModelSet<M> {
  pub english: M,
  pub urdu: M,
  pub digit: M,
}

impl<M> ModelSet<M> {
  pub fn get(&self, mode: Mode) -> &M {
    match mode {
      Mode::English => &self.english,
      Mode::Urdu => &self.urdu,
      Mode::Digit => &self.digit,
    }
  }
}

pub const ENGLISH_MODEL_FILE: &str = "english_model.onnx";
pub const URDU_MODEL_FILE: &str = "urdu_model.onnx";
pub const DIGIT_MODEL_FILE: &str = "digit_model.onnx";

/// 三个模型文件的位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelPaths {
  pub english: PathBuf,
  pub urdu: PathBuf,
  pub digit: PathBuf,
}

impl ModelPaths {
  /// 按约定文件名在目录中查找
  pub fn from_dir(dir: impl AsRef<Path>) -> Self {
    let dir = dir.as_ref();
    Self {
      english: dir.join(ENGLISH_MODEL_FILE),
      urdu: dir.join(URDU_MODEL_FILE),
      digit: dir.join(DIGIT_MODEL_FILE),
    }
  }

  pub fn get(&self, mode: Mode) -> &Path {
    match mode {
      Mode::English => &self.english,
      Mode::Urdu => &self.urdu,
      Mode::Digit => &self.digit,
    }
  }

  pub fn set(&mut self, mode: Mode, path: PathBuf) {
    match mode {
      Mode::English => self.english = path,
      Mode::Urdu => self.urdu = path,
      Mode::Digit => self.digit = path,
    }
  }
}

/// 模型只加载一次，之后的调用返回同一组句柄
pub struct ModelCache<M> {
  cell: OnceCell<ModelSet<M>>,
}

impl<M> Default for ModelCache<M> {
  fn default() -> Self {
    Self {
      cell: OnceCell::new(),
    }
  }
}

impl<M> ModelCache<M> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get_or_load<E, F>(&self, load: F) -> Result<&ModelSet<M>, E>
  where
    F: FnOnce() -> Result<ModelSet<M>, E>,
  {
    self.cell.get_or_try_init(|| {
      info!("首次加载模型...");
      let now = std::time::Instant::now();
      let models = load()?;
      info!("模型加载完成，耗时: {:.2?}", now.elapsed());
      Ok(models)
    })
  }

  pub fn get(&self) -> Option<&ModelSet<M>> {
    self.cell.get()
  }
}

mod onnx;
pub use self::onnx::{OnnxClassifier, OnnxClassifierBuilder, OnnxError};
