use aws_sdk_s3::Client;
use aws_smithy_types::byte_stream::ByteStream;

use crate::error::StorageError;

/// Result of a GET operation, including the body and ETag.
pub struct GetObjectOutput {
    pub body: Vec<u8>,
    pub etag: Option<String>,
}

/// Get an object from S3.
pub async fn get_object(
    client: &Client,
    bucket: &str,
    key: &str,
) -> Result<GetObjectOutput, StorageError> {
    let resp = client
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| {
            let err = e.into_service_error();
            if err.is_no_such_key() {
                StorageError::NotFound {
                    key: key.to_string(),
                }
            } else {
                StorageError::GetObject(err.to_string())
            }
        })?;

    let etag = resp.e_tag().map(|s| s.to_string());
    let body = resp
        .body
        .collect()
        .await
        .map_err(|e| StorageError::GetObject(e.to_string()))?
        .into_bytes()
        .to_vec();

    Ok(GetObjectOutput { body, etag })
}

/// Which precondition a conditional PUT carries.
pub enum Precondition<'a> {
    /// `If-Match: <etag>`: replace only the version we read.
    Matches(&'a str),
    /// `If-None-Match: *`: create only if nothing is stored at the key.
    Absent,
}

/// Put an object to S3 under a precondition. Returns the new ETag on success,
/// or `StorageError::PreconditionFailed` if the precondition does not hold.
pub async fn put_object_conditional(
    client: &Client,
    bucket: &str,
    key: &str,
    body: Vec<u8>,
    content_type: Option<&str>,
    precondition: Precondition<'_>,
) -> Result<String, StorageError> {
    let mut req = client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body));

    req = match precondition {
        Precondition::Matches(etag) => req.if_match(etag),
        Precondition::Absent => req.if_none_match("*"),
    };

    if let Some(ct) = content_type {
        req = req.content_type(ct);
    }

    let resp = req.send().await.map_err(|e| {
        let err = e.into_service_error();
        let message = err.to_string();
        // 412 when the precondition does not hold; 409 when a concurrent
        // conditional write to the same key is in flight.
        if message.contains("PreconditionFailed") || message.contains("ConditionalRequestConflict")
        {
            StorageError::PreconditionFailed {
                key: key.to_string(),
            }
        } else {
            StorageError::PutObject(message)
        }
    })?;

    Ok(resp.e_tag().unwrap_or_default().to_string())
}

/// Delete an object, but only while its ETag still matches `etag`.
///
/// A mismatch surfaces as `StorageError::PreconditionFailed`.
pub async fn delete_object_if_match(
    client: &Client,
    bucket: &str,
    key: &str,
    etag: &str,
) -> Result<(), StorageError> {
    client
        .delete_object()
        .bucket(bucket)
        .key(key)
        .if_match(etag)
        .send()
        .await
        .map_err(|e| {
            let message = e.into_service_error().to_string();
            if message.contains("PreconditionFailed") {
                StorageError::PreconditionFailed {
                    key: key.to_string(),
                }
            } else {
                StorageError::DeleteObject(message)
            }
        })?;

    Ok(())
}
