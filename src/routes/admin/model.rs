use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetUsageResponse {
    pub deleted: u64,
}
