mod handler;
mod model;

pub use handler::{remaining_requests, run_stress_test};
pub use model::{
    RemainingRequestsRequest, RemainingRequestsResponse, StressTestRequest, StressTestResponse,
};
