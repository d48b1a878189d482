use serde::{Deserialize, Serialize};

/// Request body for the render service `/generate` route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RenderRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub seed: i64,
    pub subseed: i64,
    pub subseed_strength: f64,
    pub steps: u32,
    pub width: u32,
    pub height: u32,
    pub cfg_scale: f32,
    pub sampler: String,
    pub batch_size: u32,
    pub n_iter: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RenderResponse {
    pub status: String,
    pub output_path: Option<String>,
    pub error: Option<String>,
}
