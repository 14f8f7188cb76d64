mod handler;
mod model;

pub use handler::reset_usage;
pub use model::ResetUsageResponse;
