use super::{non_empty, positive, positive_f64, PredictionModel, PredictionService};
use crate::text2image::{Text2ImageRequest, SOURCE_REPLICATE_PRUNAAI_QWEN_IMAGE_FAST};
use serde::Serialize;

pub const QWEN_IMAGE_FAST_VERSION: &str =
    "prunaai/qwen-image-fast:01b324d214eb4870ff424dc4215c067759c4c01a8751e327a434e2b16054db2f";

const DEFAULT_ASPECT_RATIO: &str = "1:1";

pub struct PrunaAiQwenImageFast;

pub type PrunaAiQwenImageFastService = PredictionService<PrunaAiQwenImageFast>;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QwenImageFastInput {
    pub prompt: String,
    /// Fed from the request's guidance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creativity: Option<f64>,
    pub aspect_ratio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disable_safety_checker: bool,
}

impl PredictionModel for PrunaAiQwenImageFast {
    type Request = Text2ImageRequest;
    type Input = QwenImageFastInput;

    const VERSION: &'static str = QWEN_IMAGE_FAST_VERSION;
    const SOURCE: &'static str = SOURCE_REPLICATE_PRUNAAI_QWEN_IMAGE_FAST;

    /// The seed is never forwarded; the model picks its own.
    fn build_input(request: &Text2ImageRequest) -> QwenImageFastInput {
        QwenImageFastInput {
            prompt: request.prompt.clone().unwrap_or_default(),
            creativity: positive_f64(request.guidance),
            aspect_ratio: non_empty(&request.aspect_ratio)
                .unwrap_or_else(|| DEFAULT_ASPECT_RATIO.to_string()),
            width: positive(request.image_width),
            height: positive(request.image_height),
            disable_safety_checker: request.disable_safety_checker.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_aspect_ratio_and_drops_seed() {
        let req = Text2ImageRequest {
            prompt: Some("logo".to_string()),
            guidance: Some(0.6),
            seed: Some(42),
            image_width: Some(768),
            ..Default::default()
        };
        let input = serde_json::to_value(PrunaAiQwenImageFast::build_input(&req)).unwrap();
        assert_eq!(
            input,
            json!({"prompt": "logo", "creativity": 0.6, "aspect_ratio": "1:1", "width": 768})
        );
    }
}
