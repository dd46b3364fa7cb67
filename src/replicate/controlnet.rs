use super::{positive, PredictionModel, PredictionService};
use crate::image2image::{Image2ImageRequest, SOURCE_REPLICATE_CONTROLNET};
use serde::Serialize;

pub const CONTROLNET_VERSION: &str =
    "854e8727697a057c525cdb45ab037f64ecca770a1769cc52287c2e56472a247b";

/// ControlNet img2img pinned to a fixed model version.
pub struct ControlNet;

pub type ControlNetService = PredictionService<ControlNet>;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ControlNetInput {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ddim_steps: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<i64>,
}

impl PredictionModel for ControlNet {
    type Request = Image2ImageRequest;
    type Input = ControlNetInput;

    const VERSION: &'static str = CONTROLNET_VERSION;
    const SOURCE: &'static str = SOURCE_REPLICATE_CONTROLNET;
    const FILTER_LIST: bool = false;

    fn build_input(request: &Image2ImageRequest) -> ControlNetInput {
        ControlNetInput {
            prompt: request.prompt.clone().unwrap_or_default(),
            image: request.first_image().map(str::to_string).filter(|i| !i.is_empty()),
            ddim_steps: positive(request.num_inference_steps),
            image_resolution: positive(request.output_quality).map(|q| q.to_string()),
            scale: positive(request.guidance_scale),
        }
    }

    /// Drops the first entry when two or more come back.
    fn post_process(mut urls: Vec<String>) -> Vec<String> {
        if urls.len() >= 2 {
            urls.remove(0);
        }
        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn input_mapping() {
        let req = Image2ImageRequest {
            prompt: Some("modern kitchen".to_string()),
            image_inputs: Some(vec!["a.png".to_string(), "b.png".to_string()]),
            num_inference_steps: Some(20),
            output_quality: Some(512),
            guidance_scale: Some(9),
            ..Default::default()
        };
        let input = serde_json::to_value(ControlNet::build_input(&req)).unwrap();
        assert_eq!(
            input,
            json!({
                "prompt": "modern kitchen",
                "image": "a.png",
                "ddim_steps": 20,
                "image_resolution": "512",
                "scale": 9
            })
        );
    }

    #[test]
    fn drops_first_of_many() {
        let urls = vec!["first.png".to_string(), "out.png".to_string()];
        assert_eq!(ControlNet::post_process(urls), vec!["out.png"]);
        assert_eq!(ControlNet::post_process(vec!["only.png".to_string()]), vec!["only.png"]);
    }
}
