use super::{non_empty, positive, PredictionModel, PredictionService};
use crate::text2image::{Text2ImageRequest, SOURCE_REPLICATE_FLUX_SCHNELL};
use serde::Serialize;

pub const FLUX_SCHNELL_VERSION: &str = "black-forest-labs/flux-schnell";

const MEGAPIXELS: &str = "1";
const OUTPUT_FORMAT: &str = "jpg";

pub struct FluxSchnell;

pub type FluxSchnellService = PredictionService<FluxSchnell>;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FluxSchnellInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    pub prompt: String,
    pub megapixels: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_outputs: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    pub output_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_quality: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_inference_steps: Option<i64>,
}

impl PredictionModel for FluxSchnell {
    type Request = Text2ImageRequest;
    type Input = FluxSchnellInput;

    const VERSION: &'static str = FLUX_SCHNELL_VERSION;
    const SOURCE: &'static str = SOURCE_REPLICATE_FLUX_SCHNELL;

    fn build_input(request: &Text2ImageRequest) -> FluxSchnellInput {
        FluxSchnellInput {
            seed: positive(request.seed),
            prompt: request.prompt.clone().unwrap_or_default(),
            megapixels: MEGAPIXELS.to_string(),
            speed_mode: non_empty(&request.speed_mode),
            num_outputs: positive(request.num_outputs),
            aspect_ratio: non_empty(&request.aspect_ratio),
            output_format: OUTPUT_FORMAT.to_string(),
            output_quality: positive(request.output_quality),
            num_inference_steps: positive(request.num_inference_steps),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fixed_megapixels_and_format() {
        let req = Text2ImageRequest {
            prompt: Some("a cat".to_string()),
            megapixels: Some(4),
            output_format: Some("png".to_string()),
            num_outputs: Some(2),
            seed: Some(0),
            ..Default::default()
        };
        let input = serde_json::to_value(FluxSchnell::build_input(&req)).unwrap();
        assert_eq!(
            input,
            json!({"prompt": "a cat", "megapixels": "1", "num_outputs": 2, "output_format": "jpg"})
        );
    }
}
