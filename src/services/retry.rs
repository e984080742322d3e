//! 重试监督 - 业务能力层
//!
//! 把任意可失败的异步操作包装为"最多尝试 N 次、两次之间固定等待"的调用。
//!
//! 每个阶段的状态流转：
//!
//! ```text
//! Idle → Attempting → Succeeded
//!           ↓
//!        Waiting → Attempting → ... → Exhausted
//! ```
//!
//! 状态转换由 `RetryState` 的纯函数完成，`with_retry` 只负责驱动（执行操作、等待）。

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::RetryExhausted;

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大尝试次数（0 按 1 处理）
    pub max_attempts: u32,
    /// 两次尝试之间的固定等待
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// 单个阶段的重试状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Idle,
    /// 正在进行第 `attempt` 次尝试（从 1 开始）
    Attempting { attempt: u32 },
    /// 第 `attempt` 次尝试失败，等待后重试
    Waiting { attempt: u32 },
    Succeeded { attempts: u32 },
    Exhausted { attempts: u32 },
}

impl RetryState {
    /// 开始第一次尝试
    pub fn start(self) -> Self {
        match self {
            RetryState::Idle => RetryState::Attempting { attempt: 1 },
            other => other,
        }
    }

    /// 当前尝试成功
    pub fn on_success(self) -> Self {
        match self {
            RetryState::Attempting { attempt } => RetryState::Succeeded { attempts: attempt },
            other => other,
        }
    }

    /// 当前尝试失败：还有次数则进入等待，否则耗尽
    pub fn on_failure(self, max_attempts: u32) -> Self {
        match self {
            RetryState::Attempting { attempt } if attempt < max_attempts.max(1) => {
                RetryState::Waiting { attempt }
            }
            RetryState::Attempting { attempt } => RetryState::Exhausted { attempts: attempt },
            other => other,
        }
    }

    /// 等待结束，开始下一次尝试
    pub fn on_wait_elapsed(self) -> Self {
        match self {
            RetryState::Waiting { attempt } => RetryState::Attempting {
                attempt: attempt + 1,
            },
            other => other,
        }
    }

    /// 已经开始的尝试次数
    pub fn attempts(&self) -> u32 {
        match *self {
            RetryState::Idle => 0,
            RetryState::Attempting { attempt } | RetryState::Waiting { attempt } => attempt,
            RetryState::Succeeded { attempts } | RetryState::Exhausted { attempts } => attempts,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RetryState::Succeeded { .. } | RetryState::Exhausted { .. }
        )
    }
}

/// 带重试地执行异步操作
///
/// # 参数
/// - `stage`: 阶段名称（用于日志和错误信息）
/// - `policy`: 重试策略
/// - `operation`: 每次调用返回一个新的 future
///
/// # 返回
/// 第一次成功的结果；全部失败时返回最后一次的错误及尝试次数
pub async fn with_retry<T, E, F, Fut>(
    stage: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, RetryExhausted<E>>
where
    E: std::error::Error + Display + 'static,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut state = RetryState::Idle.start();

    loop {
        let attempt = state.attempts();

        match operation().await {
            Ok(value) => {
                state = state.on_success();
                debug!("{} 第 {} 次尝试成功 ({:?})", stage, attempt, state);
                return Ok(value);
            }
            Err(err) => match state.on_failure(max_attempts) {
                waiting @ RetryState::Waiting { .. } => {
                    warn!(
                        "{} 第 {}/{} 次尝试失败: {}，{:?} 后重试",
                        stage, attempt, max_attempts, err, policy.delay
                    );
                    tokio::time::sleep(policy.delay).await;
                    state = waiting.on_wait_elapsed();
                }
                exhausted => {
                    warn!(
                        "{} 第 {}/{} 次尝试失败: {}，不再重试",
                        stage, attempt, max_attempts, err
                    );
                    return Err(RetryExhausted {
                        stage: stage.to_string(),
                        attempts: exhausted.attempts(),
                        last_error: err,
                    });
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use std::cell::Cell;
    use tokio::time::Instant;

    const DELAY: Duration = Duration::from_millis(1000);

    fn failure(n: u32) -> LlmError {
        LlmError::EmptyContent {
            model: format!("attempt-{}", n),
        }
    }

    #[test]
    fn test_state_transitions_until_success() {
        let state = RetryState::Idle.start();
        assert_eq!(state, RetryState::Attempting { attempt: 1 });

        let state = state.on_failure(3);
        assert_eq!(state, RetryState::Waiting { attempt: 1 });

        let state = state.on_wait_elapsed();
        assert_eq!(state, RetryState::Attempting { attempt: 2 });

        let state = state.on_success();
        assert_eq!(state, RetryState::Succeeded { attempts: 2 });
        assert!(state.is_terminal());
    }

    #[test]
    fn test_state_exhausts_on_last_attempt() {
        let mut state = RetryState::Idle.start();
        for _ in 0..2 {
            state = state.on_failure(3).on_wait_elapsed();
        }
        assert_eq!(state, RetryState::Attempting { attempt: 3 });
        assert_eq!(state.on_failure(3), RetryState::Exhausted { attempts: 3 });
    }

    #[test]
    fn test_terminal_states_ignore_events() {
        let done = RetryState::Succeeded { attempts: 1 };
        assert_eq!(done.on_failure(5), done);
        assert_eq!(done.on_wait_elapsed(), done);
        assert_eq!(RetryState::Idle.on_success(), RetryState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_attempt_k_waits_k_minus_one_times() {
        let policy = RetryPolicy::new(5, DELAY);

        for k in 1..=5u32 {
            let calls = Cell::new(0u32);
            let started = Instant::now();

            let result = with_retry("notes", &policy, || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n < k {
                        Err(failure(n))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

            assert_eq!(result.unwrap(), k);
            assert_eq!(calls.get(), k);
            assert_eq!(started.elapsed(), DELAY * (k - 1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_exhausts_all_attempts() {
        let policy = RetryPolicy::new(5, DELAY);
        let calls = Cell::new(0u32);
        let started = Instant::now();

        let result: Result<(), _> = with_retry("plan", &policy, || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move { Err(failure(n)) }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(calls.get(), 5);
        assert_eq!(err.attempts, 5);
        assert_eq!(err.stage, "plan");
        // 传播的是最后一次的错误
        assert!(err.last_error.to_string().contains("attempt-5"));
        // 最后一次失败之后不再等待
        assert_eq!(started.elapsed(), DELAY * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_runs_once() {
        let policy = RetryPolicy {
            max_attempts: 0,
            delay: DELAY,
        };
        let calls = Cell::new(0u32);

        let result: Result<(), _> = with_retry("quiz", &policy, || {
            calls.set(calls.get() + 1);
            async { Err(failure(0)) }
        })
        .await;

        assert_eq!(calls.get(), 1);
        assert_eq!(result.unwrap_err().attempts, 1);
    }
}
