//! 并发限制 - 业务能力层
//!
//! 固定容量的子主题任务池。每次流水线运行创建自己的池，没有全局实例。
//! 底层是 `tokio::sync::Semaphore`，等待者按提交顺序（FIFO）获得许可。

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{AcquireError, Semaphore};
use tracing::{debug, warn};

/// 子主题任务池
#[derive(Debug, Clone)]
pub struct SubtopicPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl SubtopicPool {
    /// 创建容量为 `capacity` 的池（0 按 1 处理）
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 当前空闲的槽位数
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// 关闭任务池，排队中和之后提交的任务都不会再执行
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// 在池中执行任务
    ///
    /// 先排队等待槽位，拿到许可后执行 `task`。许可在任务结束时释放，
    /// 无论任务返回 `Err` 还是发生 panic。池已关闭时不执行 `task`，直接返回错误。
    pub async fn run<F, T>(&self, task: F) -> Result<T, AcquireError>
    where
        F: Future<Output = T>,
    {
        let _permit = self.semaphore.acquire().await.map_err(|e| {
            warn!("子主题任务池已关闭，任务未执行");
            e
        })?;
        debug!(
            "子主题任务获得槽位，剩余 {}/{}",
            self.semaphore.available_permits(),
            self.capacity
        );
        Ok(task.await)
    }
}
