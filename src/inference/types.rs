use serde::{Deserialize, Serialize};

/// Body of `POST /predict`
#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    /// JPEG frame as a `data:image/jpeg;base64,...` URI
    pub image: &'a str,
}

/// Successful `/predict` reply
#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    /// Classification label, e.g. `Fresh` or `Rotten`
    pub result: String,
}
