/// 缓存操作
pub mod usage;

pub use usage::RedisUsageLedger;
