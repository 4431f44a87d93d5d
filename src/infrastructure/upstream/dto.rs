use serde::Deserialize;

/// Image API success body.
#[derive(Debug, Deserialize)]
pub struct ImageResponse {
    /// Image URL.
    pub url: String,
}
