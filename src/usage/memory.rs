use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Clock, LedgerError, SystemClock, UsageLedger};
use crate::cache::UsageRecord;

/// 进程内用量账本，未配置 Redis 时使用
pub struct MemoryUsageLedger {
    records: Mutex<HashMap<String, UsageRecord>>,
    clock: Arc<dyn Clock>,
    window_ms: i64,
}

impl MemoryUsageLedger {
    pub fn new(window_ms: i64) -> Self {
        Self::with_clock(window_ms, Arc::new(SystemClock))
    }

    pub fn with_clock(window_ms: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
            window_ms,
        }
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, UsageRecord>> {
        // 持锁期间不会 panic，中毒的锁里数据仍然完整
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// 调用方必须持有锁
fn record_request(
    records: &mut HashMap<String, UsageRecord>,
    identifier: &str,
    now: i64,
    window_ms: i64,
) -> u32 {
    match records.get_mut(identifier) {
        Some(record) => record.record_request(now, window_ms),
        None => {
            records.insert(identifier.to_string(), UsageRecord::new(identifier, now));
            1
        }
    }
}

#[async_trait]
impl UsageLedger for MemoryUsageLedger {
    async fn get_usage(&self, identifier: &str) -> Result<Option<UsageRecord>, LedgerError> {
        Ok(self.records().get(identifier).cloned())
    }

    async fn increment_usage(&self, identifier: &str) -> Result<u32, LedgerError> {
        let now = self.clock.now_millis();
        let count = record_request(&mut self.records(), identifier, now, self.window_ms);
        tracing::debug!("usage for {} is now {}", identifier, count);
        Ok(count)
    }

    async fn try_consume(&self, identifier: &str, limit: u32) -> Result<Option<u32>, LedgerError> {
        let now = self.clock.now_millis();
        let mut records = self.records();
        let current = records
            .get(identifier)
            .map(|record| record.effective_count(now, self.window_ms))
            .unwrap_or(0);
        if current >= limit {
            return Ok(None);
        }

        let count = record_request(&mut records, identifier, now, self.window_ms);
        tracing::debug!("usage for {} is now {}", identifier, count);
        Ok(Some(count))
    }

    async fn reset_all(&self) -> Result<u64, LedgerError> {
        let mut records = self.records();
        let deleted = records.len() as u64;
        records.clear();
        Ok(deleted)
    }

    fn window_ms(&self) -> i64 {
        self.window_ms
    }

    fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}
