mod client;
mod types;
#[cfg(test)]
mod tests;

pub use client::{HttpInferenceClient, InferenceClient};
pub use types::{PredictRequest, PredictResponse};
