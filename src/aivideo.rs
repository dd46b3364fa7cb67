//! AI video task domain.

use crate::registry::{ServiceEntry, ServiceRegistry};
use crate::service::{GenerationRequest, TaskService};
use serde::{Deserialize, Serialize};

pub const SOURCE_OWNER: &str = "owner";
pub const SOURCE_REPLICATE_PIXVERSE: &str = "replicate_pixverse";

pub const SERVICES: &[ServiceEntry] = &[
    ServiceEntry::new(SOURCE_OWNER, "0"),
    ServiceEntry::new(SOURCE_REPLICATE_PIXVERSE, "rpv"),
];

pub fn registry() -> ServiceRegistry {
    ServiceRegistry::new(SERVICES)
}

pub type AiVideoService = dyn TaskService<Request = AiVideoRequest>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiVideoRequest {
    pub model: Option<String>,
    pub prompt: Option<String>,
    /// e.g. "360p", "540p", "720p", "1080p".
    pub quality: Option<String>,
    /// Seconds.
    pub duration: Option<i64>,
    pub aspect_ratio: Option<String>,
    /// First frame.
    pub image: Option<String>,
    pub last_frame_image: Option<String>,
    pub effect: Option<String>,
    pub negative_prompt: Option<String>,
    pub seed: Option<i64>,
    pub debug: Option<bool>,
}

impl GenerationRequest for AiVideoRequest {
    fn is_debug(&self) -> bool {
        self.debug.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lookup() {
        let registry = registry();
        assert_eq!(registry.service_type(SOURCE_REPLICATE_PIXVERSE), "rpv");
        assert_eq!(registry.service_source("0"), SOURCE_OWNER);
        assert!(!registry.is_valid_service_type("rnb"));
    }
}
