use serde::{Deserialize, Serialize};

/// 用量账本记录
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub identifier: String,
    pub request_count: u32,
    pub last_request_at: i64, // Unix timestamp, 毫秒
}

impl UsageRecord {
    pub fn new(identifier: &str, now_ms: i64) -> Self {
        Self {
            identifier: identifier.to_string(),
            request_count: 1,
            last_request_at: now_ms,
        }
    }

    /// 距上次请求已满一个刷新窗口
    pub fn is_expired(&self, now_ms: i64, window_ms: i64) -> bool {
        now_ms.saturating_sub(self.last_request_at) >= window_ms
    }

    /// 当前窗口内实际生效的计数，窗口已过期时为 0
    pub fn effective_count(&self, now_ms: i64, window_ms: i64) -> u32 {
        if self.is_expired(now_ms, window_ms) {
            0
        } else {
            self.request_count
        }
    }

    /// 记录一次请求：窗口过期则重置为 1，否则加 1
    pub fn record_request(&mut self, now_ms: i64, window_ms: i64) -> u32 {
        self.request_count = if self.is_expired(now_ms, window_ms) {
            1
        } else {
            self.request_count.saturating_add(1)
        };
        self.last_request_at = now_ms;
        self.request_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: i64 = 120_000;

    #[test]
    fn counts_up_inside_the_window() {
        let mut record = UsageRecord::new("1.2.3.4", 0);
        assert_eq!(record.record_request(1_000, WINDOW), 2);
        assert_eq!(record.record_request(119_999, WINDOW), 3);
        assert_eq!(record.last_request_at, 119_999);
    }

    #[test]
    fn resets_once_the_window_has_elapsed() {
        let mut record = UsageRecord::new("1.2.3.4", 0);
        record.record_request(10, WINDOW);
        assert_eq!(record.record_request(10 + WINDOW, WINDOW), 1);
        assert_eq!(record.effective_count(10 + WINDOW + 1, WINDOW), 1);
        assert_eq!(record.effective_count(10 + 2 * WINDOW, WINDOW), 0);
    }
}
