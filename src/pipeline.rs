// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/pipeline.rs - 单次请求处理流程
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

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
  frame::{BitmapError, IntensityGrid, RawBitmap},
  model::{Classifier, ModelSet},
  preprocess::{normalize, shape},
  score::{Verdict, score, verdict},
  target::{ClassIndex, Mode, TargetError},
};

/// 一次“预测”操作的输入
#[derive(Debug, Clone)]
pub struct PredictionRequest {
  pub mode: Mode,
  pub target: String,
  pub bitmap: Option<RawBitmap>,
  /// 位图来源，仅用于日志与记录
  pub source: Option<String>,
}

impl PredictionRequest {
  pub fn new(mode: Mode, target: impl Into<String>, bitmap: Option<RawBitmap>) -> Self {
    Self {
      mode,
      target: target.into(),
      bitmap,
      source: None,
    }
  }

  pub fn with_source(mut self, source: impl Into<String>) -> Self {
    self.source = Some(source.into());
    self
  }
}

#[derive(Error, Debug)]
pub enum PredictError {
  #[error("画布上没有笔画")]
  EmptyInput,
  #[error("位图无效: {0}")]
  Bitmap(#[from] BitmapError),
  #[error("模型推理错误: {0}")]
  Model(Box<dyn std::error::Error + Send + Sync>),
  #[error("模型输出为空")]
  EmptyOutput,
}

/// 一次预测的结果，构造后不再修改
#[derive(Debug, Clone)]
pub struct PredictionResult {
  pub mode: Mode,
  pub predicted_class: Option<ClassIndex>,
  pub similarity: Result<f32, TargetError>,
  pub verdict: Verdict,
  pub processed_grid: IntensityGrid,
}

impl PredictionResult {
  pub fn similarity_pct(&self) -> Option<f32> {
    self.similarity.as_ref().ok().copied()
  }

  pub fn predicted_label(&self) -> Option<String> {
    self.predicted_class.map(|idx| self.mode.label(idx))
  }
}

pub type Outcome = Result<PredictionResult, PredictError>;

/// 归一化 → 整形 → 推理 → 评分 → 判定
pub fn predict<M>(
  models: &ModelSet<M>,
  mode: Mode,
  target: &str,
  bitmap: Option<&RawBitmap>,
) -> Outcome
where
  M: Classifier,
  M::Error: std::error::Error + Send + Sync + 'static,
{
  let bitmap = match bitmap {
    Some(bitmap) if !bitmap.is_blank() => bitmap,
    _ => return Err(PredictError::EmptyInput),
  };

  let grid = normalize(bitmap);
  let tensor = shape(&grid, mode.layout());

  let now = std::time::Instant::now();
  let probabilities = models
    .get(mode)
    .infer(&tensor)
    .map_err(|e| PredictError::Model(Box::new(e)))?;
  debug!("{} 模型推理完成，耗时: {:.2?}", mode, now.elapsed());

  if probabilities.is_empty() {
    return Err(PredictError::EmptyOutput);
  }
  if let Some(expected) = mode.expected_class_count()
    && expected != probabilities.len()
  {
    warn!(
      "{} 模型输出类别数为 {}, 预期为 {}",
      mode,
      probabilities.len(),
      expected
    );
  }

  let (predicted_class, similarity) = match mode
    .resolve(target, probabilities.len())
    .and_then(|index| score(&probabilities, mode, index))
  {
    Ok((predicted, pct)) => (predicted, Ok(pct)),
    Err(e) => {
      info!("目标无效: {}", e);
      (probabilities.argmax(), Err(e))
    }
  };

  let verdict = verdict(similarity.as_ref().ok().copied());
  info!(
    "{} 预测: {:?}, 相似度: {:?}, 判定: {:?}",
    mode, predicted_class, similarity, verdict
  );

  Ok(PredictionResult {
    mode,
    predicted_class,
    similarity,
    verdict,
    processed_grid: grid,
  })
}

pub fn run_request<M>(models: &ModelSet<M>, request: &PredictionRequest) -> Outcome
where
  M: Classifier,
  M::Error: std::error::Error + Send + Sync + 'static,
{
  if let Some(source) = &request.source {
    debug!("处理请求: {} {:?} <- {}", request.mode, request.target, source);
  }
  predict(models, request.mode, &request.target, request.bitmap.as_ref())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{model::Model, preprocess::FeatureTensor, score::ProbabilityVector};
  use std::cell::Cell;

  #[derive(Debug, thiserror::Error)]
  #[error("fake failure")]
  struct FakeError;

  struct Fixed {
    probs: Vec<f32>,
    calls: Cell<usize>,
    fail: bool,
  }

  impl Fixed {
    fn new(probs: Vec<f32>) -> Self {
      Self {
        probs,
        calls: Cell::new(0),
        fail: false,
      }
    }
  }

  impl Model for Fixed {
    type Input = FeatureTensor;
    type Output = ProbabilityVector;
    type Error = FakeError;

    fn infer(&self, input: &FeatureTensor) -> Result<ProbabilityVector, FakeError> {
      assert_eq!(input.len(), 784);
      self.calls.set(self.calls.get() + 1);
      if self.fail {
        return Err(FakeError);
      }
      Ok(ProbabilityVector::from(self.probs.clone()))
    }
  }

  fn models(digit: Fixed) -> ModelSet<Fixed> {
    ModelSet {
      english: Fixed::new(vec![1.0 / 26.0; 26]),
      urdu: Fixed::new(vec![0.025; 40]),
      digit,
    }
  }

  fn stroke() -> RawBitmap {
    let mut data = vec![0u8; 280 * 280 * 4];
    for px in data.chunks_exact_mut(4).take(280 * 10) {
      px.copy_from_slice(&[255, 255, 255, 255]);
    }
    RawBitmap::from_rgba(280, 280, data).unwrap()
  }

  #[test]
  fn missing_bitmap_skips_inference() {
    let set = models(Fixed::new(vec![0.1; 10]));
    let err = predict(&set, Mode::Digit, "1", None).unwrap_err();
    assert!(matches!(err, PredictError::EmptyInput));
    assert_eq!(set.digit.calls.get(), 0);
  }

  #[test]
  fn blank_canvas_counts_as_empty() {
    let set = models(Fixed::new(vec![0.1; 10]));
    let blank = RawBitmap::from_rgba(280, 280, vec![0; 280 * 280 * 4]).unwrap();
    assert!(matches!(
      predict(&set, Mode::Digit, "1", Some(&blank)),
      Err(PredictError::EmptyInput)
    ));
    assert_eq!(set.digit.calls.get(), 0);
  }

  #[test]
  fn model_failure_is_reported() {
    let mut digit = Fixed::new(vec![]);
    digit.fail = true;
    let set = models(digit);
    assert!(matches!(
      predict(&set, Mode::Digit, "1", Some(&stroke())),
      Err(PredictError::Model(_))
    ));
  }

  #[test]
  fn empty_model_output_is_an_error() {
    let set = models(Fixed::new(vec![]));
    assert!(matches!(
      predict(&set, Mode::Digit, "1", Some(&stroke())),
      Err(PredictError::EmptyOutput)
    ));
  }

  #[test]
  fn out_of_range_target_keeps_prediction() {
    let mut probs = vec![0.0; 10];
    probs[4] = 1.0;
    let set = models(Fixed::new(probs));
    let result = predict(&set, Mode::Digit, "12", Some(&stroke())).unwrap();
    assert_eq!(result.predicted_class, Some(4));
    assert!(matches!(
      result.similarity,
      Err(TargetError::OutOfRange { index: 12, .. })
    ));
    assert_eq!(result.verdict, Verdict::NoVerdict);
  }

  #[test]
  fn only_selected_model_runs() {
    let set = models(Fixed::new(vec![0.1; 10]));
    let request = PredictionRequest::new(Mode::Digit, "3", Some(stroke())).with_source("test");
    let result = run_request(&set, &request).unwrap();
    assert_eq!(set.digit.calls.get(), 1);
    assert_eq!(set.english.calls.get(), 0);
    assert_eq!(set.urdu.calls.get(), 0);
    assert_eq!(result.verdict, Verdict::Retry);
    assert!(result.processed_grid.get(0, 0).unwrap() > 0);
    assert_eq!(result.processed_grid.get(0, 27), Some(0));
  }
}
