// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/score.rs - 相似度评分与判定
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

use serde::Serialize;

use crate::target::{ClassIndex, Mode, TargetError};

/// 判定为成功的相似度阈值（百分比）
pub const SUCCESS_THRESHOLD: f32 = 75.0;

/// 模型 softmax 输出
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityVector(Box<[f32]>);

impl From<Vec<f32>> for ProbabilityVector {
  fn from(values: Vec<f32>) -> Self {
    Self(values.into_boxed_slice())
  }
}

impl ProbabilityVector {
  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn get(&self, index: ClassIndex) -> Option<f32> {
    self.0.get(index).copied()
  }

  /// 最大概率的类别，并列时取索引最小者；空向量返回 None
  pub fn argmax(&self) -> Option<ClassIndex> {
    let mut best: Option<(ClassIndex, f32)> = None;
    for (idx, &p) in self.0.iter().enumerate() {
      if p.is_nan() {
        continue;
      }
      match best {
        Some((_, max)) if p <= max => {}
        _ => best = Some((idx, p)),
      }
    }
    best.map(|(idx, _)| idx)
  }
}

impl AsRef<[f32]> for ProbabilityVector {
  fn as_ref(&self) -> &[f32] {
    &self.0
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
  Success,
  Retry,
  NoVerdict,
}

impl Verdict {
  pub fn message(&self) -> Option<&'static str> {
    match self {
      Verdict::Success => Some("Great job! 🎉 Your handwriting is very similar to the target."),
      Verdict::Retry => Some("Try again! ❗ The similarity is below 75%."),
      Verdict::NoVerdict => None,
    }
  }
}

pub fn verdict(similarity_pct: Option<f32>) -> Verdict {
  match similarity_pct {
    Some(pct) if pct >= SUCCESS_THRESHOLD => Verdict::Success,
    Some(_) => Verdict::Retry,
    None => Verdict::NoVerdict,
  }
}

/// 目标类别的概率（百分比）
pub fn similarity(
  probabilities: &ProbabilityVector,
  mode: Mode,
  target: ClassIndex,
) -> Result<f32, TargetError> {
  probabilities
    .get(target)
    .map(|p| p * 100.0)
    .ok_or(TargetError::OutOfRange {
      mode,
      index: target,
      class_count: probabilities.len(),
    })
}

/// 返回 (预测类别, 目标相似度百分比)
pub fn score(
  probabilities: &ProbabilityVector,
  mode: Mode,
  target: ClassIndex,
) -> Result<(Option<ClassIndex>, f32), TargetError> {
  let similarity_pct = similarity(probabilities, mode, target)?;
  Ok((probabilities.argmax(), similarity_pct))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn probs(values: &[f32]) -> ProbabilityVector {
    ProbabilityVector::from(values.to_vec())
  }

  #[test]
  fn argmax_ties_pick_first() {
    assert_eq!(probs(&[0.5, 0.5, 0.0]).argmax(), Some(0));
    assert_eq!(probs(&[0.1, 0.45, 0.45]).argmax(), Some(1));
  }

  #[test]
  fn argmax_skips_nan_and_handles_empty() {
    assert_eq!(probs(&[f32::NAN, 0.2, 0.1]).argmax(), Some(1));
    assert_eq!(probs(&[]).argmax(), None);
  }

  #[test]
  fn score_reports_percentage() {
    let p = probs(&[0.92, 0.05, 0.03]);
    let (predicted, pct) = score(&p, Mode::English, 0).unwrap();
    assert_eq!(predicted, Some(0));
    assert!((pct - 92.0).abs() < 1e-4);
  }

  #[test]
  fn score_is_deterministic() {
    let p = probs(&[0.1, 0.3, 0.6]);
    assert_eq!(score(&p, Mode::Digit, 1), score(&p, Mode::Digit, 1));
  }

  #[test]
  fn score_rejects_out_of_range_target() {
    let p = probs(&[0.5; 10]);
    assert_eq!(
      score(&p, Mode::Digit, 10),
      Err(TargetError::OutOfRange {
        mode: Mode::Digit,
        index: 10,
        class_count: 10
      })
    );
  }

  #[test]
  fn verdict_boundary() {
    assert_eq!(verdict(Some(75.0)), Verdict::Success);
    assert_eq!(verdict(Some(100.0)), Verdict::Success);
    assert_eq!(verdict(Some(74.999)), Verdict::Retry);
    assert_eq!(verdict(Some(0.0)), Verdict::Retry);
    assert_eq!(verdict(None), Verdict::NoVerdict);
  }

  #[test]
  fn only_real_verdicts_have_messages() {
    assert!(Verdict::Success.message().is_some());
    assert!(Verdict::Retry.message().is_some());
    assert!(Verdict::NoVerdict.message().is_none());
  }
}
