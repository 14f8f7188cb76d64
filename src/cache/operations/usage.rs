use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient, Script};

use crate::cache::keys::usage_keys::{
    usage_key, FIELD_LAST_REQUEST_AT, FIELD_REQUEST_COUNT, USAGE_PATTERN,
};
use crate::cache::models::usage::UsageRecord;
use crate::usage::{Clock, LedgerError, SystemClock, UsageLedger};

/// 在 Redis 端原子地完成检查和读-改-写，同一标识的并发请求不丢计数也不超额
///
/// ARGV: now, window, 计数字段, 时间字段, limit（负数表示不限）。
/// 达到上限时返回 -1 且不修改记录；记录在一个窗口后过期。
const CONSUME_SCRIPT: &str = r#"
local now = tonumber(ARGV[1])
local window = tonumber(ARGV[2])
local limit = tonumber(ARGV[5])
local count = tonumber(redis.call('HGET', KEYS[1], ARGV[3]) or '0')
local last = tonumber(redis.call('HGET', KEYS[1], ARGV[4]) or '0')
if count == 0 or now - last >= window then
    count = 0
end
if limit >= 0 and count >= limit then
    return -1
end
count = count + 1
redis.call('HSET', KEYS[1], ARGV[3], count, ARGV[4], now)
redis.call('PEXPIRE', KEYS[1], window)
return count
"#;

const NO_LIMIT: i64 = -1;

/// 每批 SCAN 的建议条数
const SCAN_BATCH: usize = 200;

/// 基于 Redis 的用量账本
pub struct RedisUsageLedger {
    redis: Arc<RedisClient>,
    clock: Arc<dyn Clock>,
    window_ms: i64,
    consume: Script,
}

impl RedisUsageLedger {
    pub fn new(redis: Arc<RedisClient>, window_ms: i64) -> Self {
        Self::with_clock(redis, window_ms, Arc::new(SystemClock))
    }

    pub fn with_clock(redis: Arc<RedisClient>, window_ms: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            redis,
            clock,
            window_ms,
            consume: Script::new(CONSUME_SCRIPT),
        }
    }

    async fn run_consume(&self, identifier: &str, limit: i64) -> Result<Option<u32>, LedgerError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let raw: i64 = self
            .consume
            .key(usage_key(identifier))
            .arg(self.clock.now_millis())
            .arg(self.window_ms)
            .arg(FIELD_REQUEST_COUNT)
            .arg(FIELD_LAST_REQUEST_AT)
            .arg(limit)
            .invoke_async(&mut conn)
            .await?;

        let count = admitted_count(raw);
        tracing::debug!("usage for {} after consume: {:?}", identifier, count);
        Ok(count)
    }
}

/// 脚本返回值：负数表示已达上限
fn admitted_count(raw: i64) -> Option<u32> {
    u32::try_from(raw).ok()
}

/// 把 HMGET 的两个字段还原成记录，只有一个字段时视为损坏
fn decode_record(
    identifier: &str,
    count: Option<u32>,
    last: Option<i64>,
) -> Result<Option<UsageRecord>, LedgerError> {
    match (count, last) {
        (Some(request_count), Some(last_request_at)) => Ok(Some(UsageRecord {
            identifier: identifier.to_string(),
            request_count,
            last_request_at,
        })),
        (None, None) => Ok(None),
        _ => Err(LedgerError::CorruptRecord {
            identifier: identifier.to_string(),
        }),
    }
}

#[async_trait]
impl UsageLedger for RedisUsageLedger {
    async fn get_usage(&self, identifier: &str) -> Result<Option<UsageRecord>, LedgerError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let (count, last): (Option<u32>, Option<i64>) = conn
            .hget(
                usage_key(identifier),
                &[FIELD_REQUEST_COUNT, FIELD_LAST_REQUEST_AT],
            )
            .await?;

        decode_record(identifier, count, last)
    }

    async fn increment_usage(&self, identifier: &str) -> Result<u32, LedgerError> {
        // 不限额时脚本总会返回计数
        self.run_consume(identifier, NO_LIMIT)
            .await?
            .ok_or_else(|| LedgerError::CorruptRecord {
                identifier: identifier.to_string(),
            })
    }

    async fn try_consume(&self, identifier: &str, limit: u32) -> Result<Option<u32>, LedgerError> {
        self.run_consume(identifier, i64::from(limit)).await
    }

    async fn reset_all(&self) -> Result<u64, LedgerError> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(USAGE_PATTERN)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let removed: u64 = conn.del(&keys).await?;
                deleted += removed;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(deleted)
    }

    fn window_ms(&self) -> i64 {
        self.window_ms
    }

    fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}
