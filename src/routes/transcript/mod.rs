mod handler;
mod model;

pub use handler::{export_transcript, import_transcript};
