mod orchestrator;
mod runtime;
#[cfg(test)]
mod tests;
mod types;

pub use orchestrator::FruitcamApp;
pub use types::{SessionCommand, ShutdownReason};
