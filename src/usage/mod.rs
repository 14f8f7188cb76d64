//! 用量账本：按客户端标识记录免费请求次数
//!
//! 计数在固定的刷新窗口内累加，窗口过期后的下一次请求重置为 1。
//! 同一标识的读-改-写必须串行，不同标识之间互不影响。

mod clock;
mod memory;

use async_trait::async_trait;

use crate::cache::UsageRecord;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memory::MemoryUsageLedger;

/// 调用方未提供标识时使用的共享标识
pub const UNKNOWN_IDENTIFIER: &str = "unknown";

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("corrupt usage record for {identifier}")]
    CorruptRecord { identifier: String },
}

#[async_trait]
pub trait UsageLedger: Send + Sync {
    /// 纯查询，不修改记录
    async fn get_usage(&self, identifier: &str) -> Result<Option<UsageRecord>, LedgerError>;

    /// 记录一次请求并返回窗口内的新计数
    async fn increment_usage(&self, identifier: &str) -> Result<u32, LedgerError>;

    /// 窗口内计数低于 `limit` 时记一次请求并返回新计数，否则返回 `None` 且不改记录
    ///
    /// 检查和计数在同一个原子操作里完成，同一标识的并发请求最多放行 `limit` 次。
    async fn try_consume(&self, identifier: &str, limit: u32) -> Result<Option<u32>, LedgerError>;

    /// 清空全部记录，返回删除的条数
    async fn reset_all(&self) -> Result<u64, LedgerError>;

    fn window_ms(&self) -> i64;

    fn clock(&self) -> &dyn Clock;

    /// 当前窗口内生效的计数，过期或不存在时为 0
    async fn current_count(&self, identifier: &str) -> Result<u32, LedgerError> {
        let now = self.clock().now_millis();
        Ok(self
            .get_usage(identifier)
            .await?
            .map(|record| record.effective_count(now, self.window_ms()))
            .unwrap_or(0))
    }
}
