mod handler;
mod model;

pub use handler::{list_personas, run_direct_analysis};
pub use model::{DirectAnalysisRequest, PersonaInfo};
