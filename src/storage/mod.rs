//! Object storage behind one async trait, backed by S3-protocol clients.

pub mod engine;
pub mod gcs;
pub mod s3;
pub mod tos;

pub use engine::{Backend, ObjectStorage};
pub use gcs::GcsConfig;
pub use s3::S3Config;
pub use tos::TosConfig;

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::pin::Pin;
use std::time::Duration;

pub const DEFAULT_PRESIGN_TTL: Duration = Duration::from_secs(15 * 60);
/// Page size used by folder listing and recursive deletes.
pub const FOLDER_PAGE_SIZE: i32 = 1000;
pub const FOLDER_DELIMITER: &str = "/";

pub const ACL_PRIVATE: &str = "private";
pub const ACL_PUBLIC_READ: &str = "public-read";
pub const ACL_PUBLIC_READ_WRITE: &str = "public-read-write";

pub type ObjectStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectInfo {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: String,
    pub content_type: String,
    pub is_dir: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListObjectsInput {
    pub bucket: String,
    pub prefix: Option<String>,
    pub delimiter: Option<String>,
    pub max_keys: Option<i32>,
    pub start_after: Option<String>,
    pub continuation_token: Option<String>,
}

impl ListObjectsInput {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn max_keys(mut self, max_keys: i32) -> Self {
        self.max_keys = Some(max_keys);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListObjectsOutput {
    pub objects: Vec<ObjectInfo>,
    pub common_prefixes: Vec<String>,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
    pub key_count: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CopyObjectInput {
    pub source_bucket: String,
    pub source_key: String,
    pub destination_bucket: String,
    pub destination_key: String,
    /// When non-empty, replaces the user metadata on the copy.
    pub metadata: HashMap<String, String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub content_type: String,
    pub content_length: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: String,
    pub metadata: HashMap<String, String>,
    pub storage_class: String,
    pub server_side_encryption: String,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn upload_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<()>;

    /// Uploads from a chunk stream; large bodies go up as a multipart upload.
    async fn upload_object_stream(&self, bucket: &str, key: &str, body: ObjectStream)
        -> Result<()>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes>;

    /// False on any error, including transport failures.
    async fn head_object(&self, bucket: &str, key: &str) -> bool;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Returns the keys the backend reports as deleted.
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<Vec<String>>;

    async fn list_objects(&self, input: &ListObjectsInput) -> Result<ListObjectsOutput>;

    async fn copy_object(&self, input: &CopyObjectInput) -> Result<()>;

    async fn move_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        destination_bucket: &str,
        destination_key: &str,
    ) -> Result<()>;

    async fn get_object_metadata(&self, bucket: &str, key: &str) -> Result<ObjectMetadata>;

    async fn create_folder(&self, bucket: &str, folder: &str) -> Result<()>;

    /// Deletes every object under the folder prefix.
    async fn delete_folder(&self, bucket: &str, folder: &str) -> Result<()>;

    async fn list_folders(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;

    async fn presign_put_object(&self, bucket: &str, key: &str) -> Result<String>;

    /// Keys that fail to sign map to an empty string.
    async fn batch_presign_put_object(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> HashMap<String, String>;

    async fn presign_get_object(&self, bucket: &str, key: &str) -> Result<String>;

    async fn presign_delete_object(&self, bucket: &str, key: &str) -> Result<String>;

    async fn set_object_acl(&self, bucket: &str, key: &str, acl: &str) -> Result<()>;

    async fn get_object_acl(&self, bucket: &str, key: &str) -> Result<String>;

    async fn set_object_metadata(
        &self,
        bucket: &str,
        key: &str,
        metadata: HashMap<String, String>,
    ) -> Result<()>;

    /// Empty string when no URL can be produced.
    async fn generate_download_url(&self, bucket: &str, key: &str) -> String;
}

/// Image content type guessed from the file extension, `image/jpeg` otherwise.
pub fn content_type_for(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else if lower.ends_with(".svg") {
        "image/svg+xml"
    } else {
        "image/jpeg"
    }
}

pub fn folder_key(folder: &str) -> String {
    if folder.ends_with(FOLDER_DELIMITER) {
        folder.to_string()
    } else {
        format!("{folder}{FOLDER_DELIMITER}")
    }
}
