//! Image-to-image task domain.

use crate::registry::{ServiceEntry, ServiceRegistry};
use crate::service::{GenerationRequest, TaskService};
use serde::{Deserialize, Serialize};

pub const SOURCE_OWNER: &str = "owner";
pub const SOURCE_REPLICATE_NANO_BANANA: &str = "replicate_nano_banana";
pub const SOURCE_REPLICATE_CONTROLNET: &str = "replicate_controlnet";
pub const SOURCE_MODELSLAB_INTERIOR: &str = "modelslab_interior";
pub const SOURCE_MODELSLAB_EXTERIOR: &str = "modelslab_exterior";
pub const SOURCE_KIE_NANO_BANANA: &str = "kie_nano_banana";

pub const SERVICES: &[ServiceEntry] = &[
    ServiceEntry::new(SOURCE_OWNER, "0"),
    ServiceEntry::new(SOURCE_REPLICATE_NANO_BANANA, "rnb"),
    ServiceEntry::new(SOURCE_REPLICATE_CONTROLNET, "rcn"),
    ServiceEntry::new(SOURCE_MODELSLAB_INTERIOR, "mli"),
    ServiceEntry::new(SOURCE_MODELSLAB_EXTERIOR, "mle"),
    ServiceEntry::new(SOURCE_KIE_NANO_BANANA, "knb"),
];

pub fn registry() -> ServiceRegistry {
    ServiceRegistry::new(SERVICES)
}

pub type Image2ImageService = dyn TaskService<Request = Image2ImageRequest>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image2ImageRequest {
    pub model: Option<String>,
    pub image_inputs: Option<Vec<String>>,
    pub seed: Option<i64>,
    pub prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub strength: Option<f64>,
    pub guidance_scale: Option<i64>,
    pub output_image_size: Option<String>,
    pub output_format: Option<String>,
    pub output_quality: Option<i64>,
    pub resolution: Option<String>,
    pub num_inference_steps: Option<i64>,
    pub debug: Option<bool>,
}

impl Image2ImageRequest {
    pub fn images(&self) -> &[String] {
        self.image_inputs.as_deref().unwrap_or_default()
    }

    pub fn first_image(&self) -> Option<&str> {
        self.images().first().map(String::as_str)
    }
}

impl GenerationRequest for Image2ImageRequest {
    fn is_debug(&self) -> bool {
        self.debug.unwrap_or(false)
    }
}
