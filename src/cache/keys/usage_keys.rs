/// 用量记录缓存键前缀
const USAGE_PREFIX: &str = "usage:";

/// 匹配全部用量记录的模式
pub const USAGE_PATTERN: &str = "usage:*";

/// 哈希字段：请求计数
pub const FIELD_REQUEST_COUNT: &str = "request_count";

/// 哈希字段：最近请求时间（毫秒）
pub const FIELD_LAST_REQUEST_AT: &str = "last_request_at";

/// 生成用量记录缓存键
pub fn usage_key(identifier: &str) -> String {
    format!("{}{}", USAGE_PREFIX, identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_share_the_reset_pattern_prefix() {
        let key = usage_key("1.2.3.4");
        assert_eq!(key, "usage:1.2.3.4");
        assert!(key.starts_with(USAGE_PATTERN.trim_end_matches('*')));
    }
}
