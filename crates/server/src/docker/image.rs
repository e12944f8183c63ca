//! Image domain — list, inspect, pull, remove.

use bollard::auth::DockerCredentials;
use bollard::query_parameters::{CreateImageOptions, ListImagesOptions, RemoveImageOptions};
use futures_util::stream::StreamExt;

use super::client::{DockerClient, DockerError};

impl DockerClient {
    /// List images on the Docker host.
    pub async fn list_images(
        &self,
        all: bool,
    ) -> Result<Vec<bollard::models::ImageSummary>, DockerError> {
        let options = Some(ListImagesOptions {
            all,
            ..Default::default()
        });
        self.client
            .list_images(options)
            .await
            .map_err(DockerError::from)
    }

    /// Inspect a specific image by ID or tag.
    pub async fn inspect_image(
        &self,
        image_id: &str,
    ) -> Result<bollard::models::ImageInspect, DockerError> {
        self.client
            .inspect_image(image_id)
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => DockerError::ImageNotFound(image_id.to_string()),
                other => DockerError::BollardError(other),
            })
    }

    /// Pull an image from a registry, returning the progress lines once the
    /// pull is complete.
    pub async fn pull_image(
        &self,
        image: &str,
        tag: &str,
        registry_auth: Option<&str>,
    ) -> Result<Vec<String>, DockerError> {
        let options = Some(CreateImageOptions {
            from_image: Some(image.to_string()),
            tag: Some(tag.to_string()),
            ..Default::default()
        });

        let credentials = registry_auth.map(|auth| DockerCredentials {
            auth: Some(auth.to_string()),
            ..Default::default()
        });

        let mut stream = self.client.create_image(options, None, credentials);
        let mut progress = Vec::new();

        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    if let Some(status) = info.status {
                        tracing::debug!(status = %status, "Image pull progress");
                        progress.push(status);
                    }
                }
                Err(e) => return Err(DockerError::from(e)),
            }
        }

        Ok(progress)
    }

    /// Remove an image by ID or tag, returning the deleted/untagged items.
    pub async fn remove_image(
        &self,
        image_id: &str,
        force: bool,
        no_prune: bool,
    ) -> Result<Vec<bollard::models::ImageDeleteResponseItem>, DockerError> {
        let options = Some(RemoveImageOptions {
            force,
            noprune: no_prune,
            ..Default::default()
        });

        self.client
            .remove_image(image_id, options, None)
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                } => DockerError::ImageNotFound(image_id.to_string()),
                other => DockerError::BollardError(other),
            })
    }
}
