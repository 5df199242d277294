// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/model/onnx.rs - ONNX 分类模型
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
use std::sync::Mutex;

use ort::{session::Session, value::TensorRef};
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::{Model, ModelPaths, ModelSet},
  preprocess::FeatureTensor,
  score::ProbabilityVector,
  target::Mode,
  url_path,
};

const ONNX_NUM_INPUTS: usize = 1;

#[derive(Error, Debug)]
pub enum OnnxError {
  #[error("ONNX Runtime 错误: {0}")]
  OrtError(#[from] ort::Error),
  #[error("模型路径错误: {0}")]
  ModelPathError(String),
  #[error("模型文件不存在: {0}")]
  ModelNotFound(PathBuf),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
  #[error("模型输出形状无效: {0:?}")]
  InvalidOutputShape(Vec<i64>),
  #[error("推理会话锁已失效")]
  SessionPoisoned,
}

/// 基于 ONNX Runtime 的分类器，会话在加载后不再变更
pub struct OnnxClassifier {
  name: String,
  // Session::run 需要 &mut self
  session: Mutex<Session>,
}

impl std::fmt::Debug for OnnxClassifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OnnxClassifier")
      .field("name", &self.name)
      .finish_non_exhaustive()
  }
}

pub struct OnnxClassifierBuilder {
  model_path: PathBuf,
  intra_threads: Option<usize>,
}

impl FromUrlWithScheme for OnnxClassifierBuilder {
  const SCHEME: &'static str = "onnx";
}

impl FromUrl for OnnxClassifierBuilder {
  type Error = OnnxError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(OnnxError::ModelPathError(format!(
        "模型路径必须使用 {} 方案, 实际为 {}",
        Self::SCHEME,
        url.scheme()
      )));
    }

    Ok(Self::new(url_path(url)))
  }
}

impl OnnxClassifierBuilder {
  pub fn new(model_path: impl Into<PathBuf>) -> Self {
    Self {
      model_path: model_path.into(),
      intra_threads: None,
    }
  }

  pub fn model_path(&self) -> &Path {
    &self.model_path
  }

  pub fn intra_threads(mut self, threads: usize) -> Self {
    self.intra_threads = Some(threads);
    self
  }

  pub fn build(self) -> Result<OnnxClassifier, OnnxError> {
    if !self.model_path.is_file() {
      error!("模型文件不存在: {}", self.model_path.display());
      return Err(OnnxError::ModelNotFound(self.model_path));
    }

    info!("加载模型文件: {}", self.model_path.display());
    if let Ok(meta) = std::fs::metadata(&self.model_path) {
      debug!(
        "模型文件大小: {:.2} MB",
        meta.len() as f64 / (1024.0 * 1024.0)
      );
    }

    let mut builder = Session::builder()?;
    if let Some(threads) = self.intra_threads {
      builder = builder.with_intra_threads(threads)?;
    }
    let session = builder.commit_from_file(&self.model_path)?;

    if session.inputs.len() != ONNX_NUM_INPUTS {
      error!(
        "预期模型输入数量为 {}, 实际为 {}",
        ONNX_NUM_INPUTS,
        session.inputs.len()
      );
      return Err(OnnxError::ModelInvalid(format!(
        "预期模型输入数量为 {}, 实际为 {}",
        ONNX_NUM_INPUTS,
        session.inputs.len()
      )));
    }
    if session.outputs.is_empty() {
      return Err(OnnxError::ModelInvalid("模型没有输出".to_string()));
    }

    for input in session.inputs.iter() {
      debug!("模型输入: {} {:?}", input.name, input.input_type);
    }
    for output in session.outputs.iter() {
      debug!("模型输出: {} {:?}", output.name, output.output_type);
    }

    let name = self
      .model_path
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_else(|| self.model_path.display().to_string());
    info!("模型 {} 加载完成", name);

    Ok(OnnxClassifier {
      name,
      session: Mutex::new(session),
    })
  }
}

impl OnnxClassifier {
  pub fn name(&self) -> &str {
    &self.name
  }

  fn postprocess(shape: &[i64], data: &[f32]) -> Result<ProbabilityVector, OnnxError> {
    let valid = match shape {
      [n] => *n > 0,
      [1, n] => *n > 0,
      _ => false,
    };
    if !valid || data.is_empty() {
      return Err(OnnxError::InvalidOutputShape(shape.to_vec()));
    }
    Ok(ProbabilityVector::from(data.to_vec()))
  }
}

impl Model for OnnxClassifier {
  type Input = FeatureTensor;
  type Output = ProbabilityVector;
  type Error = OnnxError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    debug!("设置模型输入: {:?}", input.shape());
    let tensor = TensorRef::from_array_view(input.view())?;

    let mut session = self
      .session
      .lock()
      .map_err(|_| OnnxError::SessionPoisoned)?;

    debug!("执行模型推理: {}", self.name);
    let outputs = session.run(ort::inputs![tensor])?;
    let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
    debug!("模型输出形状: {:?}", shape);

    Self::postprocess(&shape.to_vec(), data)
  }
}

impl ModelSet<OnnxClassifier> {
  pub fn load(paths: &ModelPaths, intra_threads: Option<usize>) -> Result<Self, OnnxError> {
    let load = |mode: Mode| {
      let builder = OnnxClassifierBuilder::new(paths.get(mode));
      match intra_threads {
        Some(threads) => builder.intra_threads(threads),
        None => builder,
      }
      .build()
    };
    Ok(ModelSet {
      urdu: load(Mode::Urdu)?,
      english: load(Mode::English)?,
      digit: load(Mode::Digit)?,
    })
  }
}
