use super::{non_empty, positive, PredictionModel, PredictionService};
use crate::aivideo::{AiVideoRequest, SOURCE_REPLICATE_PIXVERSE};
use serde::Serialize;

pub const PIXVERSE_V5_VERSION: &str = "pixverse/pixverse-v5";

/// PixVerse v5 text/image-to-video.
pub struct PixverseV5;

pub type PixverseV5Service = PredictionService<PixverseV5>;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PixverseV5Input {
    pub prompt: String,
    /// 360p, 540p, 720p or 1080p.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// 5 or 8 seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Only honored together with `image`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_frame_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl PredictionModel for PixverseV5 {
    type Request = AiVideoRequest;
    type Input = PixverseV5Input;

    const VERSION: &'static str = PIXVERSE_V5_VERSION;
    const SOURCE: &'static str = SOURCE_REPLICATE_PIXVERSE;

    fn build_input(request: &AiVideoRequest) -> PixverseV5Input {
        PixverseV5Input {
            prompt: request.prompt.clone().unwrap_or_default(),
            quality: non_empty(&request.quality),
            duration: positive(request.duration),
            aspect_ratio: non_empty(&request.aspect_ratio),
            image: non_empty(&request.image),
            last_frame_image: non_empty(&request.last_frame_image),
            effect: non_empty(&request.effect),
            negative_prompt: non_empty(&request.negative_prompt),
            seed: positive(request.seed),
        }
    }
}
