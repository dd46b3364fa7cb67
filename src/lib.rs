pub mod aivideo;
pub mod auth;
pub mod client;
pub mod error;
pub mod image2image;
pub mod kie;
pub mod lark;
pub mod modelslab;
pub mod output;
pub mod polling;
pub mod registry;
pub mod replicate;
pub mod response;
pub mod service;
pub mod storage;
pub mod text2image;
pub mod types;
pub mod utils;

pub use error::{ComponentsError, Result};
pub use polling::PollSchedule;
pub use registry::ServiceRegistry;
pub use service::{GenerationRequest, TaskService};
pub use storage::{ObjectStorage, StorageService};
pub use types::{ClientOptions, TaskInfo, TaskStatus};
