use crate::config::Credentials;
use crate::{debug, info};
use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use std::path::Path;

/// Handle on the destination bucket. Credentials come from the process
/// environment (the SDK default chain reads the same AWS_* variables the
/// preflight step already verified).
pub struct Bucket {
    client: Client,
    name: String,
}

impl Bucket {
    pub async fn connect(credentials: &Credentials) -> Result<Self> {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(credentials.aws_region.clone()))
            .load()
            .await;

        Ok(Self {
            client: Client::new(&config),
            name: credentials.s3_bucket_name.clone(),
        })
    }

    /// Fetch an object, `None` when the key does not exist.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self
            .client
            .get_object()
            .bucket(&self.name)
            .key(key)
            .send()
            .await
        {
            Ok(output) => {
                let data = output
                    .body
                    .collect()
                    .await
                    .with_context(|| format!("failed to read s3://{}/{}", self.name, key))?;
                let bytes = data.into_bytes().to_vec();
                debug!("fetched s3://{}/{} ({} bytes)", self.name, key, bytes.len());
                Ok(Some(bytes))
            }
            Err(err) => {
                let service = err.into_service_error();
                if service.is_no_such_key() {
                    Ok(None)
                } else {
                    Err(anyhow::Error::new(service)
                        .context(format!("failed to get s3://{}/{}", self.name, key)))
                }
            }
        }
    }

    pub async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let size = bytes.len();
        self.client
            .put_object()
            .bucket(&self.name)
            .key(key)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .with_context(|| format!("failed to put s3://{}/{}", self.name, key))?;
        debug!("put s3://{}/{} ({} bytes)", self.name, key, size);
        Ok(())
    }

    /// Upload the final artifact under the object name from the environment.
    pub async fn upload_artifact(&self, file: &Path, key: &str) -> Result<()> {
        let bytes = tokio::fs::read(file)
            .await
            .with_context(|| format!("failed to read {}", file.display()))?;
        self.put(key, bytes).await?;
        info!("uploaded {} to s3://{}/{}", file.display(), self.name, key);
        Ok(())
    }
}
