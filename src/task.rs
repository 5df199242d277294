// 该文件是 Likhai （手写字符相似度检查） 项目的一部分。
// src/task.rs - 任务执行
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

use std::{thread, time::Duration};
use tracing::{info, warn};

use crate::{
  input::{Command, USAGE},
  model::{Classifier, ModelSet},
  output::Render,
  pipeline::{Outcome, PredictionRequest, run_request},
};

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(self, input: I, models: M, output: O) -> Result<(), Self::Error>;
}

/// 逐个处理输入中的每张画布
pub struct OneShotTask;

impl<
  'm,
  C,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = PredictionRequest>,
  O: Render<PredictionRequest, Outcome, Error = RE>,
> Task<I, &'m ModelSet<C>, O> for OneShotTask
where
  C: Classifier,
  C::Error: std::error::Error + Sync + Send + 'static,
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, models: &'m ModelSet<C>, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let mut count = 0usize;
    for request in input {
      let now = std::time::Instant::now();
      let outcome = run_request(models, &request);
      info!("请求处理完成，耗时: {:.2?}", now.elapsed());
      output.render_result(&request, &outcome)?;
      count += 1;
    }

    if count == 0 {
      return Err(anyhow::anyhow!("没有输入画布"));
    }
    info!("任务完成，共处理 {} 张画布", count);
    Ok(())
  }
}

/// 交互会话：逐条读取命令，直到输入结束、quit 或 Ctrl-C
pub struct InteractiveTask {
  handle_interrupt: bool,
}

impl Default for InteractiveTask {
  fn default() -> Self {
    Self {
      handle_interrupt: true,
    }
  }
}

impl InteractiveTask {
  /// Ctrl-C 处理器每个进程只能注册一次
  pub fn with_interrupt(mut self, handle_interrupt: bool) -> Self {
    self.handle_interrupt = handle_interrupt;
    self
  }
}

impl<
  'm,
  C,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = Command>,
  O: Render<PredictionRequest, Outcome, Error = RE>,
> Task<I, &'m ModelSet<C>, O> for InteractiveTask
where
  C: Classifier,
  C::Error: std::error::Error + Sync + Send + 'static,
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, models: &'m ModelSet<C>, output: O) -> Result<(), Self::Error> {
    info!("开始交互会话...");
    let (tx, rx) = std::sync::mpsc::channel();

    if self.handle_interrupt {
      ctrlc::set_handler(move || {
        info!("收到中断信号，准备退出...");
        let _ = tx.send(());
        // 阻塞在读取输入时无法检查信号
        thread::spawn(|| {
          thread::sleep(Duration::from_secs(3));
          warn!("强制退出程序");
          std::process::exit(130);
        });
      })?;
    }

    let mut handled = 0usize;
    for command in input {
      match command {
        Command::Quit => {
          info!("收到退出命令");
          break;
        }
        Command::Help => println!("{}", USAGE),
        Command::Invalid(message) => {
          warn!("无效命令: {}", message);
          eprintln!("{}", message);
        }
        Command::Predict(request) => {
          let outcome = run_request(models, &request);
          output.render_result(&request, &outcome)?;
          handled += 1;
        }
      }

      if rx.try_recv().is_ok() {
        warn!("中断信号接收，退出会话");
        break;
      }
    }

    info!("会话结束，共处理 {} 次预测", handled);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    frame::RawBitmap, model::Model, preprocess::FeatureTensor, score::ProbabilityVector,
    target::Mode,
  };
  use std::cell::RefCell;

  struct Uniform(usize);

  impl Model for Uniform {
    type Input = FeatureTensor;
    type Output = ProbabilityVector;
    type Error = std::io::Error;

    fn infer(&self, _input: &FeatureTensor) -> Result<ProbabilityVector, std::io::Error> {
      Ok(ProbabilityVector::from(vec![1.0 / self.0 as f32; self.0]))
    }
  }

  #[derive(Default)]
  struct Collect(RefCell<Vec<(Mode, bool)>>);

  impl Render<PredictionRequest, Outcome> for Collect {
    type Error = std::io::Error;

    fn render_result(&self, request: &PredictionRequest, outcome: &Outcome) -> Result<(), Self::Error> {
      self.0.borrow_mut().push((request.mode, outcome.is_ok()));
      Ok(())
    }
  }

  fn models() -> ModelSet<Uniform> {
    ModelSet {
      english: Uniform(26),
      urdu: Uniform(40),
      digit: Uniform(10),
    }
  }

  fn canvas() -> RawBitmap {
    RawBitmap::from_rgb(2, 2, vec![255; 12]).unwrap()
  }

  #[test]
  fn oneshot_renders_every_request() {
    let set = models();
    let sink = Collect::default();
    let requests = vec![
      PredictionRequest::new(Mode::Digit, "1", Some(canvas())),
      PredictionRequest::new(Mode::English, "q", None),
    ];
    OneShotTask
      .run_task(requests.into_iter(), &set, &sink)
      .unwrap();
    assert_eq!(
      *sink.0.borrow(),
      vec![(Mode::Digit, true), (Mode::English, false)]
    );
  }

  #[test]
  fn oneshot_without_input_fails() {
    let set = models();
    let sink = Collect::default();
    assert!(
      OneShotTask
        .run_task(Vec::<PredictionRequest>::new().into_iter(), &set, &sink)
        .is_err()
    );
  }

  #[test]
  fn interactive_stops_at_quit_and_survives_bad_commands() {
    let set = models();
    let sink = Collect::default();
    let commands = vec![
      Command::Invalid("bad".into()),
      Command::Predict(PredictionRequest::new(Mode::Urdu, "abc", Some(canvas()))),
      Command::Help,
      Command::Predict(PredictionRequest::new(Mode::Digit, "3", Some(canvas()))),
      Command::Quit,
      Command::Predict(PredictionRequest::new(Mode::Digit, "4", Some(canvas()))),
    ];
    InteractiveTask::default()
      .with_interrupt(false)
      .run_task(commands.into_iter(), &set, &sink)
      .unwrap();
    assert_eq!(
      *sink.0.borrow(),
      vec![(Mode::Urdu, true), (Mode::Digit, true)]
    );
  }
}
