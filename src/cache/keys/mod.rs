/// 缓存键模块
pub mod usage_keys;

pub use usage_keys::{usage_key, USAGE_PATTERN};
