use super::{non_empty, PredictionModel, PredictionService};
use crate::image2image::{Image2ImageRequest, SOURCE_REPLICATE_NANO_BANANA};
use serde::Serialize;

pub const NANO_BANANA_VERSION: &str = "google/nano-banana";

/// Google's nano-banana image editor.
pub struct NanoBanana;

pub type NanoBananaService = PredictionService<NanoBanana>;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NanoBananaInput {
    pub prompt: String,
    pub image_input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

impl PredictionModel for NanoBanana {
    type Request = Image2ImageRequest;
    type Input = NanoBananaInput;

    const VERSION: &'static str = NANO_BANANA_VERSION;
    const SOURCE: &'static str = SOURCE_REPLICATE_NANO_BANANA;
    const FILTER_LIST: bool = false;

    fn build_input(request: &Image2ImageRequest) -> NanoBananaInput {
        NanoBananaInput {
            prompt: request.prompt.clone().unwrap_or_default(),
            image_input: request.images().to_vec(),
            output_format: non_empty(&request.output_format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_mapping() {
        let req = Image2ImageRequest {
            prompt: Some("make it blue".to_string()),
            image_inputs: Some(vec!["https://in/1.png".to_string()]),
            output_format: Some("png".to_string()),
            ..Default::default()
        };
        let input = serde_json::to_value(NanoBanana::build_input(&req)).unwrap();
        assert_eq!(
            input,
            json!({"prompt": "make it blue", "image_input": ["https://in/1.png"], "output_format": "png"})
        );
    }
}
