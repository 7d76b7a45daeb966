//! BackgroundTasks - 投げっぱなし（fire-and-forget）の副作用タスク
//!
//! 補償処理とキャッシュの投入・削除はここから起動します。
//!
//! # 設計原則
//! - 起動したリクエストはタスクを待たない。結果も呼び出し元へは戻らない
//! - 各タスクは固有の締め切りを持ち、過ぎたら諦める（リトライキューはない）
//! - 呼び出し元の締め切りやキャンセルはタスクに伝播しない（tokio::spawn で切り離す）
//! - 諦めたタスクが直すはずだった不整合はそのまま残る
//!
//! `wait_idle()` は実行中のタスクが 0 になるまで待つ。テストで補償の完了を観測するためのもの。

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// タスクの結末（ログと、テストでの観測用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Completed,
    Failed(String),
    /// 締め切りを過ぎて中断した
    Abandoned,
}

#[derive(Debug, Default)]
struct Inner {
    in_flight: AtomicUsize,
    idle: Notify,
}

/// 実行中カウンタを panic 時も含めて確実に減らす
struct InFlightGuard(Arc<Inner>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// BackgroundTasks は締め切り付きの切り離しタスクを起動する
///
/// Clone は同じカウンタを共有する。
#[derive(Debug, Clone, Default)]
pub struct BackgroundTasks {
    inner: Arc<Inner>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// タスクを起動する
    ///
    /// 戻り値の JoinHandle は捨ててよい。捨ててもタスクは走り続ける。
    pub fn spawn<F, E>(&self, name: &'static str, deadline: Duration, task: F) -> JoinHandle<TaskOutcome>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.spawn_after(name, Duration::ZERO, deadline, task)
    }

    /// `delay` 待ってからタスクを起動する（締め切りは待機後から数える）
    pub fn spawn_after<F, E>(
        &self,
        name: &'static str,
        delay: Duration,
        deadline: Duration,
        task: F,
    ) -> JoinHandle<TaskOutcome>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlightGuard(self.inner.clone());

        tokio::spawn(async move {
            let _guard = guard;
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let outcome = match tokio::time::timeout(deadline, task).await {
                Ok(Ok(())) => TaskOutcome::Completed,
                Ok(Err(e)) => TaskOutcome::Failed(e.to_string()),
                Err(_) => TaskOutcome::Abandoned,
            };
            match &outcome {
                TaskOutcome::Completed => tracing::debug!(task = name, "Background task completed"),
                TaskOutcome::Failed(error) => {
                    tracing::warn!(task = name, error = %error, "Background task failed")
                }
                TaskOutcome::Abandoned => {
                    tracing::warn!(task = name, ?deadline, "Background task abandoned at deadline")
                }
            }
            outcome
        })
    }

    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// 実行中のタスクがなくなるまで待つ
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }
}
