use super::{non_empty, positive, positive_f64, PredictionModel, PredictionService};
use crate::text2image::{Text2ImageRequest, SOURCE_REPLICATE_FLUX1DEV};
use serde::Serialize;

pub const FLUX1DEV_VERSION: &str =
    "prunaai/flux.1-dev:b0306d92aa025bb747dc74162f3c27d6ed83798e08e5f8977adf3d859d0536a3";

/// Pruna-optimized FLUX.1 [dev].
pub struct Flux1Dev;

pub type Flux1DevService = PredictionService<Flux1Dev>;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Flux1DevInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_quality: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_inference_steps: Option<i64>,
}

impl PredictionModel for Flux1Dev {
    type Request = Text2ImageRequest;
    type Input = Flux1DevInput;

    const VERSION: &'static str = FLUX1DEV_VERSION;
    const SOURCE: &'static str = SOURCE_REPLICATE_FLUX1DEV;

    fn build_input(request: &Text2ImageRequest) -> Flux1DevInput {
        Flux1DevInput {
            seed: positive(request.seed),
            prompt: request.prompt.clone().unwrap_or_default(),
            guidance: positive_f64(request.guidance),
            image_size: positive(request.image_size),
            speed_mode: non_empty(&request.speed_mode),
            aspect_ratio: non_empty(&request.aspect_ratio),
            output_format: non_empty(&request.output_format),
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
    fn input_mapping() {
        let req = Text2ImageRequest {
            prompt: Some("mountains".to_string()),
            guidance: Some(3.5),
            image_size: Some(1024),
            speed_mode: Some("Juiced 🔥 (default)".to_string()),
            aspect_ratio: Some("16:9".to_string()),
            ..Default::default()
        };
        let input = serde_json::to_value(Flux1Dev::build_input(&req)).unwrap();
        assert_eq!(
            input,
            json!({
                "prompt": "mountains",
                "guidance": 3.5,
                "image_size": 1024,
                "speed_mode": "Juiced 🔥 (default)",
                "aspect_ratio": "16:9"
            })
        );
    }
}
