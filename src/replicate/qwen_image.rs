use super::{non_empty, positive, positive_f64, PredictionModel, PredictionService};
use crate::text2image::{Text2ImageRequest, SOURCE_REPLICATE_QWEN_IMAGE};
use serde::Serialize;

pub const QWEN_IMAGE_VERSION: &str = "qwen/qwen-image";

pub struct QwenImage;

pub type QwenImageService = PredictionService<QwenImage>;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct QwenImageInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_quality: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_inference_steps: Option<i64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disable_safety_checker: bool,
}

impl PredictionModel for QwenImage {
    type Request = Text2ImageRequest;
    type Input = QwenImageInput;

    const VERSION: &'static str = QWEN_IMAGE_VERSION;
    const SOURCE: &'static str = SOURCE_REPLICATE_QWEN_IMAGE;

    fn build_input(request: &Text2ImageRequest) -> QwenImageInput {
        QwenImageInput {
            seed: positive(request.seed),
            prompt: request.prompt.clone().unwrap_or_default(),
            guidance: positive_f64(request.guidance),
            strength: positive_f64(request.strength),
            aspect_ratio: non_empty(&request.aspect_ratio),
            output_format: non_empty(&request.output_format),
            output_quality: positive(request.output_quality),
            negative_prompt: non_empty(&request.negative_prompt),
            num_inference_steps: positive(request.num_inference_steps),
            disable_safety_checker: request.disable_safety_checker.unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omits_unset_fields() {
        let req = Text2ImageRequest {
            prompt: Some("poster".to_string()),
            strength: Some(0.8),
            negative_prompt: Some(String::new()),
            disable_safety_checker: Some(true),
            ..Default::default()
        };
        let input = serde_json::to_value(QwenImage::build_input(&req)).unwrap();
        assert_eq!(
            input,
            json!({"prompt": "poster", "strength": 0.8, "disable_safety_checker": true})
        );
    }
}
