pub mod events;
pub mod racer;
pub mod scoring;
mod settings;

pub use settings::{Settings, GLOBAL_CONFIG};
