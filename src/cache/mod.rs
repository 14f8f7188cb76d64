// 缓存模块
// 包含用量记录的数据结构和 Redis 操作

pub mod keys;
pub mod models;
pub mod operations;

pub use models::UsageRecord;
pub use operations::RedisUsageLedger;
