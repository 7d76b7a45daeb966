//! RequestContext - リクエストの締め切り
//!
//! 書き込み調整役の同期ステップはこの締め切りに従う。
//! 補償タスクには伝播しない（BackgroundTasks が独自の締め切りを持つ）。

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::WikiError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    deadline: Option<Instant>,
}

impl RequestContext {
    /// 締め切りなし
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// 締め切りの範囲内で 1 ステップを実行する
    pub async fn run<T, E, F>(&self, step: F) -> Result<T, WikiError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<WikiError>,
    {
        match self.deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, step).await {
                Ok(result) => result.map_err(Into::into),
                Err(_) => Err(WikiError::DeadlineExceeded),
            },
            None => step.await.map_err(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::StoreError;

    #[tokio::test]
    async fn no_deadline_just_runs() {
        let ctx = RequestContext::background();
        let value = ctx.run(async { Ok::<_, StoreError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn step_errors_are_converted() {
        let ctx = RequestContext::background();
        let err = ctx
            .run(async { Err::<(), _>(StoreError::Duplicate("x".into())) })
            .await
            .unwrap_err();
        assert!(err.is_constraint_violation());
    }

    #[tokio::test]
    async fn slow_step_hits_the_deadline() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(10));
        let err = ctx
            .run(async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok::<(), StoreError>(())
            })
            .await
            .unwrap_err();
        assert_eq!(err, WikiError::DeadlineExceeded);
    }
}
