// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/output/report.rs - 面向用户的结果文本
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
use tracing::error;

use crate::{
  pipeline::{Outcome, PredictError, PredictionRequest},
  score::Verdict,
  target::Mode,
};

pub const EMPTY_INPUT_WARNING: &str = "Please draw on the canvas first.";
pub const INVALID_INPUT_WARNING: &str = "Invalid input. Please try again.";

/// 各类错误在这里才折叠为一条展示文本
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
  pub mode: Mode,
  pub target: String,
  pub predicted_label: Option<String>,
  pub similarity: Option<String>,
  pub similarity_pct: Option<f32>,
  pub verdict: Verdict,
  pub warning: Option<String>,
}

impl Report {
  pub fn new(request: &PredictionRequest, outcome: &Outcome) -> Self {
    let mode = request.mode;
    let mut report = Report {
      mode,
      target: mode.display_target(&request.target),
      predicted_label: None,
      similarity: None,
      similarity_pct: None,
      verdict: Verdict::NoVerdict,
      warning: None,
    };

    let result = match outcome {
      Ok(result) => result,
      Err(PredictError::EmptyInput) => {
        report.warning = Some(EMPTY_INPUT_WARNING.to_string());
        return report;
      }
      Err(e) => {
        error!("请求处理失败: {}", e);
        report.warning = Some(INVALID_INPUT_WARNING.to_string());
        return report;
      }
    };

    report.verdict = result.verdict;
    match &result.similarity {
      Ok(pct) => {
        report.similarity = Some(format!("{:.2}%", pct));
        report.similarity_pct = Some(*pct);
      }
      Err(_) => report.similarity = Some(mode.invalid_target_message().to_string()),
    }

    report.predicted_label = match mode {
      Mode::English => result.predicted_label(),
      Mode::Digit if result.similarity.is_ok() => result.predicted_label(),
      _ => None,
    };

    report
  }

  pub fn lines(&self) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(warning) = &self.warning {
      lines.push(warning.clone());
      return lines;
    }

    let similarity = self.similarity.as_deref().unwrap_or_default();
    match self.mode {
      Mode::English => {
        lines.push(format!(
          "Predicted Letter: {}",
          self.predicted_label.as_deref().unwrap_or("None")
        ));
        lines.push(format!("Similarity to '{}': {}", self.target, similarity));
      }
      Mode::Urdu => lines.push(format!("Similarity: {}", similarity)),
      Mode::Digit => {
        if let Some(label) = &self.predicted_label {
          lines.push(format!("Predicted Digit: {}", label));
        }
        lines.push(format!("Similarity to '{}': {}", self.target, similarity));
      }
    }

    if let Some(message) = self.verdict.message() {
      lines.push(message.to_string());
    }
    lines
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{frame::IntensityGrid, pipeline::PredictionResult, target::TargetError};

  fn result(mode: Mode, predicted: usize, similarity: Result<f32, TargetError>) -> Outcome {
    let verdict = crate::score::verdict(similarity.as_ref().ok().copied());
    Ok(PredictionResult {
      mode,
      predicted_class: Some(predicted),
      similarity,
      verdict,
      processed_grid: IntensityGrid::default(),
    })
  }

  #[test]
  fn english_success_lines() {
    let request = PredictionRequest::new(Mode::English, " a ", None);
    let report = Report::new(&request, &result(Mode::English, 0, Ok(92.0)));
    assert_eq!(report.target, "A");
    assert_eq!(
      report.lines(),
      vec![
        "Predicted Letter: A".to_string(),
        "Similarity to 'A': 92.00%".to_string(),
        Verdict::Success.message().unwrap().to_string(),
      ]
    );
  }

  #[test]
  fn english_invalid_target_still_shows_prediction() {
    let request = PredictionRequest::new(Mode::English, "1", None);
    let err = TargetError::Invalid {
      mode: Mode::English,
      text: "1".into(),
    };
    let report = Report::new(&request, &result(Mode::English, 2, Err(err)));
    assert_eq!(report.predicted_label.as_deref(), Some("C"));
    assert_eq!(
      report.similarity.as_deref(),
      Some("Invalid English target letter.")
    );
    assert_eq!(report.verdict, Verdict::NoVerdict);
    assert_eq!(report.lines().len(), 2);
  }

  #[test]
  fn digit_invalid_target_hides_prediction() {
    let request = PredictionRequest::new(Mode::Digit, "12", None);
    let err = TargetError::OutOfRange {
      mode: Mode::Digit,
      index: 12,
      class_count: 10,
    };
    let report = Report::new(&request, &result(Mode::Digit, 3, Err(err)));
    assert_eq!(report.predicted_label, None);
    assert_eq!(
      report.lines(),
      vec!["Similarity to '12': Invalid target digit.".to_string()]
    );
  }

  #[test]
  fn urdu_shows_similarity_only() {
    let request = PredictionRequest::new(Mode::Urdu, "5", None);
    let report = Report::new(&request, &result(Mode::Urdu, 5, Ok(80.5)));
    assert_eq!(report.predicted_label, None);
    assert_eq!(report.lines()[0], "Similarity: 80.50%");
  }

  #[test]
  fn empty_input_is_a_warning_only() {
    let request = PredictionRequest::new(Mode::Digit, "1", None);
    let report = Report::new(&request, &Err(PredictError::EmptyInput));
    assert_eq!(report.lines(), vec![EMPTY_INPUT_WARNING.to_string()]);
    assert_eq!(report.verdict, Verdict::NoVerdict);
  }

  #[test]
  fn other_failures_collapse_to_generic_message() {
    let request = PredictionRequest::new(Mode::Digit, "1", None);
    let report = Report::new(&request, &Err(PredictError::EmptyOutput));
    assert_eq!(report.warning.as_deref(), Some(INVALID_INPUT_WARNING));
  }
}
