//! Text-to-image task domain.

use crate::registry::{ServiceEntry, ServiceRegistry};
use crate::service::{GenerationRequest, TaskService};
use serde::{Deserialize, Serialize};

pub const SOURCE_OWNER: &str = "owner";
pub const SOURCE_REPLICATE_FLUX_SCHNELL: &str = "replicate_flux-schnell";
pub const SOURCE_REPLICATE_FLUX1DEV: &str = "replicate_flux1dev";
pub const SOURCE_REPLICATE_QWEN_IMAGE: &str = "replicate_qwen_image";
pub const SOURCE_MODELSLAB_FLUX: &str = "modelslab_flux";
pub const SOURCE_REPLICATE_PRUNAAI_QWEN_IMAGE_FAST: &str = "replicate_prunaai_qwen_image_fast";
pub const SOURCE_KIE_QWEN_IMAGE_TEXT2IMAGE: &str = "kie_qwen_image_text2image";

pub const SERVICES: &[ServiceEntry] = &[
    ServiceEntry::new(SOURCE_OWNER, "0"),
    ServiceEntry::new(SOURCE_REPLICATE_FLUX_SCHNELL, "rfc"),
    ServiceEntry::new(SOURCE_REPLICATE_FLUX1DEV, "rf1d"),
    ServiceEntry::new(SOURCE_REPLICATE_QWEN_IMAGE, "rqi"),
    ServiceEntry::new(SOURCE_MODELSLAB_FLUX, "mlf"),
    ServiceEntry::new(SOURCE_REPLICATE_PRUNAAI_QWEN_IMAGE_FAST, "rpqf"),
    ServiceEntry::new(SOURCE_KIE_QWEN_IMAGE_TEXT2IMAGE, "kqi"),
];

pub fn registry() -> ServiceRegistry {
    ServiceRegistry::new(SERVICES)
}

pub type Text2ImageService = dyn TaskService<Request = Text2ImageRequest>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Text2ImageRequest {
    pub model: Option<String>,
    pub style: Option<String>,
    pub image_width: Option<i64>,
    pub image_height: Option<i64>,
    pub image_size: Option<i64>,
    pub seed: Option<i64>,
    pub prompt: Option<String>,
    pub negative_prompt: Option<String>,
    pub guidance: Option<f64>,
    pub strength: Option<f64>,
    pub megapixels: Option<i64>,
    pub speed_mode: Option<String>,
    pub num_outputs: Option<i64>,
    pub aspect_ratio: Option<String>,
    pub output_format: Option<String>,
    pub output_quality: Option<i64>,
    pub num_inference_steps: Option<i64>,
    pub disable_safety_checker: Option<bool>,
    pub debug: Option<bool>,
}

impl GenerationRequest for Text2ImageRequest {
    fn is_debug(&self) -> bool {
        self.debug.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_round_trip() {
        let registry = registry();
        for entry in SERVICES {
            assert_eq!(
                registry.service_type(registry.service_source(entry.service_type)),
                entry.service_type
            );
        }
        assert_eq!(registry.service_type(SOURCE_REPLICATE_FLUX1DEV), "rf1d");
        assert_eq!(registry.service_source("kqi"), SOURCE_KIE_QWEN_IMAGE_TEXT2IMAGE);
        assert_eq!(registry.service_source("xyz"), "unknown");
        assert_eq!(registry.entries().len(), 7);
    }
}
