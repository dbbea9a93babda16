pub mod checkpoints;
pub mod cup;
pub mod driver;
pub mod game;
mod progress;
pub mod racer;
pub mod scoring;
pub mod session;
pub mod standings;
pub mod track;
