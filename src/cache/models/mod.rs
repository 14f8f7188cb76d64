/// 缓存数据模型
pub mod usage;

pub use usage::UsageRecord;
