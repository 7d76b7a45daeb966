//! FaultInjector - インメモリ実装に障害と遅延を注入する
//!
//! 補償処理のテストでは「2 つ目の Blob 書き込みだけ失敗」「削除が締め切りより遅い」
//! といった状況を決定的に作る必要がある。
//!
//! # 使用例
//! ```ignore
//! blobs.faults().fail_next_on("put", "puretext/", StoreError::Unavailable("io".into()));
//! blobs.faults().delay_on("delete", "content/", Duration::from_millis(200));
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::ports::StoreError;

#[derive(Debug, Clone)]
struct FailureRule {
    op: String,
    key_prefix: Option<String>,
    error: StoreError,
    /// None なら解除されるまで毎回失敗
    remaining: Option<usize>,
}

#[derive(Debug, Clone)]
struct LatencyRule {
    op: String,
    key_prefix: Option<String>,
    delay: Duration,
}

#[derive(Debug, Default)]
struct FaultState {
    failures: Vec<FailureRule>,
    latencies: Vec<LatencyRule>,
    calls: HashMap<String, usize>,
}

/// FaultInjector は操作名（と任意のキー接頭辞）ごとに障害を仕掛ける
#[derive(Debug, Default)]
pub struct FaultInjector {
    state: Mutex<FaultState>,
}

impl FaultInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の 1 回だけ `op` を失敗させる
    pub fn fail_next(&self, op: &str, error: StoreError) {
        self.push_failure(op, None, error, Some(1));
    }

    /// キーが `key_prefix` で始まる次の 1 回の `op` を失敗させる
    pub fn fail_next_on(&self, op: &str, key_prefix: &str, error: StoreError) {
        self.push_failure(op, Some(key_prefix), error, Some(1));
    }

    /// 次の `times` 回の `op` を失敗させる
    pub fn fail_times(&self, op: &str, times: usize, error: StoreError) {
        self.push_failure(op, None, error, Some(times));
    }

    /// clear されるまで `op` を失敗させ続ける
    pub fn fail_always(&self, op: &str, error: StoreError) {
        self.push_failure(op, None, error, None);
    }

    pub fn delay(&self, op: &str, delay: Duration) {
        self.lock().latencies.push(LatencyRule {
            op: op.to_string(),
            key_prefix: None,
            delay,
        });
    }

    pub fn delay_on(&self, op: &str, key_prefix: &str, delay: Duration) {
        self.lock().latencies.push(LatencyRule {
            op: op.to_string(),
            key_prefix: Some(key_prefix.to_string()),
            delay,
        });
    }

    /// `op` に仕掛けた障害と遅延をすべて外す
    pub fn clear(&self, op: &str) {
        let mut state = self.lock();
        state.failures.retain(|r| r.op != op);
        state.latencies.retain(|r| r.op != op);
    }

    /// `op` が呼ばれた回数（失敗した呼び出しも数える）
    pub fn calls(&self, op: &str) -> usize {
        self.lock().calls.get(op).copied().unwrap_or(0)
    }

    /// 各操作の入口で呼ぶ
    ///
    /// 呼び出し回数を数え、遅延があれば待ち、障害が仕掛けてあればそれを返す。
    /// 遅延中に future が drop された場合、その操作は何も変更しない。
    pub(crate) async fn enter(&self, op: &str, key: &str) -> Result<(), StoreError> {
        let delay = {
            let mut state = self.lock();
            *state.calls.entry(op.to_string()).or_default() += 1;
            state
                .latencies
                .iter()
                .filter(|r| matches_rule(&r.op, r.key_prefix.as_deref(), op, key))
                .map(|r| r.delay)
                .max()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        let Some(pos) = state
            .failures
            .iter()
            .position(|r| matches_rule(&r.op, r.key_prefix.as_deref(), op, key))
        else {
            return Ok(());
        };

        let rule = &mut state.failures[pos];
        let error = rule.error.clone();
        let exhausted = match rule.remaining.as_mut() {
            Some(remaining) => {
                *remaining -= 1;
                *remaining == 0
            }
            None => false,
        };
        if exhausted {
            state.failures.remove(pos);
        }
        Err(error)
    }

    fn push_failure(
        &self,
        op: &str,
        key_prefix: Option<&str>,
        error: StoreError,
        remaining: Option<usize>,
    ) {
        self.lock().failures.push(FailureRule {
            op: op.to_string(),
            key_prefix: key_prefix.map(str::to_string),
            error,
            remaining,
        });
    }

    fn lock(&self) -> MutexGuard<'_, FaultState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn matches_rule(rule_op: &str, rule_prefix: Option<&str>, op: &str, key: &str) -> bool {
    rule_op == op && rule_prefix.is_none_or(|prefix| key.starts_with(prefix))
}
