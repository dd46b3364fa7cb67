use super::{
    content_type_for, folder_key, CopyObjectInput, ListObjectsInput, ListObjectsOutput,
    ObjectInfo, ObjectMetadata, ObjectStream, StorageService, ACL_PRIVATE, ACL_PUBLIC_READ,
    ACL_PUBLIC_READ_WRITE, DEFAULT_PRESIGN_TTL, FOLDER_DELIMITER, FOLDER_PAGE_SIZE,
};
use crate::error::{ComponentsError, Result};
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::{ByteStream, DateTime as SdkDateTime};
use aws_sdk_s3::types::{
    CompletedMultipartUpload, CompletedPart, Delete, Grant, MetadataDirective, ObjectCannedAcl,
    ObjectIdentifier, Permission,
};
use aws_sdk_s3::Client;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Parts are this size except the last; S3 rejects non-final parts under 5 MiB.
pub const MULTIPART_PART_SIZE: usize = 8 * 1024 * 1024;
/// Concurrent signers in a batch pre-sign.
pub const PRESIGN_CONCURRENCY: usize = 16;

const ALL_USERS_URI: &str = "http://acs.amazonaws.com/groups/global/AllUsers";
const GCS_PUBLIC_URL: &str = "https://storage.googleapis.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    S3,
    Gcs,
    Tos,
}

impl Backend {
    pub fn name(self) -> &'static str {
        match self {
            Backend::S3 => "s3",
            Backend::Gcs => "gcs",
            Backend::Tos => "tos",
        }
    }
}

/// `StorageService` over an S3-protocol client. The backend decides the
/// few places where providers differ: ACL handling, batch delete and
/// download URLs.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    client: Client,
    backend: Backend,
    presign_ttl: Duration,
}

impl ObjectStorage {
    pub fn new(client: Client, backend: Backend) -> Self {
        Self {
            client,
            backend,
            presign_ttl: DEFAULT_PRESIGN_TTL,
        }
    }

    pub fn with_presign_ttl(mut self, ttl: Duration) -> Self {
        if !ttl.is_zero() {
            self.presign_ttl = ttl;
        }
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn presign_ttl(&self) -> Duration {
        self.presign_ttl
    }

    fn presigning(&self) -> Result<PresigningConfig> {
        PresigningConfig::expires_in(self.presign_ttl)
            .map_err(|err| ComponentsError::storage("presign config", err))
    }

    async fn put_bytes(&self, bucket: &str, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(sdk_error("put object"))?;
        debug!(backend = self.backend.name(), bucket, key, "object uploaded");
        Ok(())
    }

    async fn upload_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        mut buffer: BytesMut,
        mut body: ObjectStream,
    ) -> Result<Vec<CompletedPart>> {
        let mut parts = Vec::new();
        let mut exhausted = false;
        loop {
            while !exhausted && buffer.len() < MULTIPART_PART_SIZE {
                match body.next().await {
                    Some(chunk) => buffer.extend_from_slice(&chunk?),
                    None => exhausted = true,
                }
            }
            if buffer.is_empty() {
                break;
            }

            let size = buffer.len().min(MULTIPART_PART_SIZE);
            let part = buffer.split_to(size).freeze();
            let part_number = parts.len() as i32 + 1;
            let output = self
                .client
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(part))
                .send()
                .await
                .map_err(sdk_error("upload part"))?;

            parts.push(
                CompletedPart::builder()
                    .set_e_tag(output.e_tag().map(str::to_string))
                    .part_number(part_number)
                    .build(),
            );
        }
        Ok(parts)
    }

    async fn delete_each(&self, bucket: &str, keys: &[String]) -> Vec<String> {
        let mut deleted = Vec::with_capacity(keys.len());
        for key in keys {
            match self.delete_object(bucket, key).await {
                Ok(()) => deleted.push(key.clone()),
                Err(err) => warn!(backend = self.backend.name(), bucket, key = %key, error = %err, "delete failed"),
            }
        }
        deleted
    }

    async fn delete_batch(&self, bucket: &str, keys: &[String]) -> Result<Vec<String>> {
        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|err| ComponentsError::storage("delete objects", err))?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .build()
            .map_err(|err| ComponentsError::storage("delete objects", err))?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(sdk_error("delete objects"))?;

        for failed in output.errors() {
            warn!(
                backend = self.backend.name(),
                bucket,
                key = failed.key().unwrap_or_default(),
                code = failed.code().unwrap_or_default(),
                "object not deleted"
            );
        }
        Ok(output
            .deleted()
            .iter()
            .filter_map(|d| d.key().map(str::to_string))
            .collect())
    }
}

fn sdk_error<E>(context: &'static str) -> impl FnOnce(E) -> ComponentsError
where
    E: std::error::Error,
{
    move |err| ComponentsError::storage(context, DisplayErrorContext(err))
}

fn to_chrono(timestamp: Option<&SdkDateTime>) -> Option<DateTime<Utc>> {
    timestamp.and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()))
}

/// Canned ACL implied by the grants to the all-users group.
pub(crate) fn canned_acl_from_grants(grants: &[Grant]) -> &'static str {
    let mut readable = false;
    for grant in grants {
        let public = grant
            .grantee()
            .and_then(|g| g.uri())
            .is_some_and(|uri| uri == ALL_USERS_URI);
        if !public {
            continue;
        }
        match grant.permission() {
            Some(Permission::Write) | Some(Permission::FullControl) => return ACL_PUBLIC_READ_WRITE,
            Some(Permission::Read) => readable = true,
            _ => {}
        }
    }
    if readable {
        ACL_PUBLIC_READ
    } else {
        ACL_PRIVATE
    }
}

/// `x-amz-copy-source` value: the key is percent-encoded per path segment.
pub(crate) fn copy_source(bucket: &str, key: &str) -> String {
    let key = key
        .split(FOLDER_DELIMITER)
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join(FOLDER_DELIMITER);
    format!("{bucket}/{key}")
}

pub(crate) fn gcs_public_url(bucket: &str, key: &str) -> String {
    format!("{GCS_PUBLIC_URL}/{bucket}/{key}")
}

#[async_trait]
impl StorageService for ObjectStorage {
    async fn upload_object(&self, bucket: &str, key: &str, data: Bytes) -> Result<()> {
        self.put_bytes(bucket, key, data, content_type_for(key)).await
    }

    async fn upload_object_stream(
        &self,
        bucket: &str,
        key: &str,
        mut body: ObjectStream,
    ) -> Result<()> {
        let content_type = content_type_for(key);
        let mut buffer = BytesMut::new();
        while buffer.len() < MULTIPART_PART_SIZE {
            match body.next().await {
                Some(chunk) => buffer.extend_from_slice(&chunk?),
                None => return self.put_bytes(bucket, key, buffer.freeze(), content_type).await,
            }
        }

        let created = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(sdk_error("create multipart upload"))?;
        let upload_id = created
            .upload_id()
            .map(str::to_string)
            .ok_or_else(|| ComponentsError::Storage("multipart upload id missing".to_string()))?;

        let parts = match self.upload_parts(bucket, key, &upload_id, buffer, body).await {
            Ok(parts) => parts,
            Err(err) => {
                if let Err(abort_err) = self
                    .client
                    .abort_multipart_upload()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    warn!(bucket, key, error = %DisplayErrorContext(abort_err), "abort multipart upload failed");
                }
                return Err(err);
            }
        };

        debug!(backend = self.backend.name(), bucket, key, parts = parts.len(), "completing multipart upload");
        self.client
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(&upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(sdk_error("complete multipart upload"))?;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error("get object"))?;
        let data = output
            .body
            .collect()
            .await
            .map_err(|err| ComponentsError::storage("read object body", err))?;
        Ok(data.into_bytes())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> bool {
        self.client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .is_ok()
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error("delete object"))?;
        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<Vec<String>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        match self.backend {
            // The interoperability endpoint has no multi-object delete.
            Backend::Gcs => Ok(self.delete_each(bucket, keys).await),
            Backend::S3 | Backend::Tos => self.delete_batch(bucket, keys).await,
        }
    }

    async fn list_objects(&self, input: &ListObjectsInput) -> Result<ListObjectsOutput> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&input.bucket)
            .set_prefix(input.prefix.clone().filter(|p| !p.is_empty()))
            .set_delimiter(input.delimiter.clone().filter(|d| !d.is_empty()))
            .set_max_keys(input.max_keys.filter(|m| *m > 0))
            .set_start_after(input.start_after.clone().filter(|s| !s.is_empty()))
            .set_continuation_token(input.continuation_token.clone().filter(|t| !t.is_empty()))
            .send()
            .await
            .map_err(sdk_error("list objects"))?;

        let objects = output
            .contents()
            .iter()
            .map(|obj| {
                let key = obj.key().unwrap_or_default().to_string();
                ObjectInfo {
                    is_dir: key.ends_with(FOLDER_DELIMITER),
                    content_type: content_type_for(&key).to_string(),
                    size: obj.size().unwrap_or_default(),
                    last_modified: to_chrono(obj.last_modified()),
                    etag: obj.e_tag().unwrap_or_default().to_string(),
                    key,
                }
            })
            .collect();
        let common_prefixes = output
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(str::to_string))
            .collect();

        Ok(ListObjectsOutput {
            objects,
            common_prefixes,
            is_truncated: output.is_truncated().unwrap_or(false),
            next_continuation_token: output.next_continuation_token().map(str::to_string),
            key_count: output.key_count().unwrap_or_default(),
        })
    }

    async fn copy_object(&self, input: &CopyObjectInput) -> Result<()> {
        let mut request = self
            .client
            .copy_object()
            .bucket(&input.destination_bucket)
            .key(&input.destination_key)
            .copy_source(copy_source(&input.source_bucket, &input.source_key))
            .set_content_type(input.content_type.clone());
        if !input.metadata.is_empty() {
            request = request
                .set_metadata(Some(input.metadata.clone()))
                .metadata_directive(MetadataDirective::Replace);
        }
        request.send().await.map_err(sdk_error("copy object"))?;
        Ok(())
    }

    async fn move_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        destination_bucket: &str,
        destination_key: &str,
    ) -> Result<()> {
        self.copy_object(&CopyObjectInput {
            source_bucket: source_bucket.to_string(),
            source_key: source_key.to_string(),
            destination_bucket: destination_bucket.to_string(),
            destination_key: destination_key.to_string(),
            ..CopyObjectInput::default()
        })
        .await?;
        self.delete_object(source_bucket, source_key).await
    }

    async fn get_object_metadata(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error("head object"))?;

        Ok(ObjectMetadata {
            content_type: output.content_type().unwrap_or_default().to_string(),
            content_length: output.content_length().unwrap_or_default(),
            last_modified: to_chrono(output.last_modified()),
            etag: output.e_tag().unwrap_or_default().to_string(),
            metadata: output.metadata().cloned().unwrap_or_default(),
            storage_class: output
                .storage_class()
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
            server_side_encryption: output
                .server_side_encryption()
                .map(|e| e.as_str().to_string())
                .unwrap_or_default(),
        })
    }

    async fn create_folder(&self, bucket: &str, folder: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(folder_key(folder))
            .body(ByteStream::from_static(b""))
            .send()
            .await
            .map_err(sdk_error("create folder"))?;
        Ok(())
    }

    async fn delete_folder(&self, bucket: &str, folder: &str) -> Result<()> {
        let mut input = ListObjectsInput::new(bucket)
            .prefix(folder_key(folder))
            .max_keys(FOLDER_PAGE_SIZE);
        let mut keys = Vec::new();
        loop {
            let page = self.list_objects(&input).await?;
            keys.extend(page.objects.into_iter().map(|obj| obj.key));
            match page.next_continuation_token {
                Some(token) if page.is_truncated => input.continuation_token = Some(token),
                _ => break,
            }
        }

        for chunk in keys.chunks(FOLDER_PAGE_SIZE as usize) {
            self.delete_objects(bucket, chunk).await?;
        }
        debug!(backend = self.backend.name(), bucket, folder, objects = keys.len(), "folder deleted");
        Ok(())
    }

    async fn list_folders(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let input = ListObjectsInput::new(bucket)
            .prefix(prefix)
            .delimiter(FOLDER_DELIMITER)
            .max_keys(FOLDER_PAGE_SIZE);
        Ok(self.list_objects(&input).await?.common_prefixes)
    }

    async fn presign_put_object(&self, bucket: &str, key: &str) -> Result<String> {
        let request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .presigned(self.presigning()?)
            .await
            .map_err(sdk_error("presign put"))?;
        Ok(request.uri().to_string())
    }

    async fn batch_presign_put_object(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> HashMap<String, String> {
        stream::iter(keys.iter().cloned())
            .map(|key| async move {
                let url = match self.presign_put_object(bucket, &key).await {
                    Ok(url) => url,
                    Err(err) => {
                        warn!(backend = self.backend.name(), bucket, key = %key, error = %err, "presign failed");
                        String::new()
                    }
                };
                (key, url)
            })
            .buffer_unordered(PRESIGN_CONCURRENCY)
            .collect()
            .await
    }

    async fn presign_get_object(&self, bucket: &str, key: &str) -> Result<String> {
        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(self.presigning()?)
            .await
            .map_err(sdk_error("presign get"))?;
        Ok(request.uri().to_string())
    }

    async fn presign_delete_object(&self, bucket: &str, key: &str) -> Result<String> {
        let request = self
            .client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .presigned(self.presigning()?)
            .await
            .map_err(sdk_error("presign delete"))?;
        Ok(request.uri().to_string())
    }

    async fn set_object_acl(&self, bucket: &str, key: &str, acl: &str) -> Result<()> {
        let acl = if acl.is_empty() { ACL_PRIVATE } else { acl };
        if self.backend == Backend::Gcs && acl != ACL_PUBLIC_READ && acl != ACL_PRIVATE {
            return Err(ComponentsError::Storage(format!("unsupported ACL: {acl}")));
        }
        self.client
            .put_object_acl()
            .bucket(bucket)
            .key(key)
            .acl(ObjectCannedAcl::from(acl))
            .send()
            .await
            .map_err(sdk_error("put object acl"))?;
        Ok(())
    }

    async fn get_object_acl(&self, bucket: &str, key: &str) -> Result<String> {
        let output = self
            .client
            .get_object_acl()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error("get object acl"))?;

        let acl = match self.backend {
            Backend::S3 => output
                .owner()
                .and_then(|owner| owner.display_name())
                .unwrap_or("unknown")
                .to_string(),
            Backend::Gcs | Backend::Tos => canned_acl_from_grants(output.grants()).to_string(),
        };
        Ok(acl)
    }

    async fn set_object_metadata(
        &self,
        bucket: &str,
        key: &str,
        metadata: HashMap<String, String>,
    ) -> Result<()> {
        let current = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(sdk_error("head object"))?;

        self.client
            .copy_object()
            .bucket(bucket)
            .key(key)
            .copy_source(copy_source(bucket, key))
            .set_metadata(Some(metadata))
            .metadata_directive(MetadataDirective::Replace)
            .set_content_type(current.content_type().map(str::to_string))
            .send()
            .await
            .map_err(sdk_error("set object metadata"))?;
        Ok(())
    }

    async fn generate_download_url(&self, bucket: &str, key: &str) -> String {
        match self.backend {
            Backend::Gcs => gcs_public_url(bucket, key),
            Backend::S3 | Backend::Tos => match self.presign_get_object(bucket, key).await {
                Ok(url) => url,
                Err(err) => {
                    warn!(backend = self.backend.name(), bucket, key, error = %err, "download url failed");
                    String::new()
                }
            },
        }
    }
}
