//! Image attachment manager: staging, upload and per-image edits.

use std::sync::Arc;

use crate::domain::{
    AttachmentId, ImageFile, ImageId, ImageMediaType, PendingAttachment, PostId, PostImage,
    PreviewRef, RejectedFile, RejectionReason, display_name,
};
use crate::error::DomainError;
use crate::ports::PostGateway;

/// Largest image accepted for upload (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Checks applied to every file before it is staged.
#[derive(Debug, Clone)]
pub struct AttachmentLimits {
    pub max_bytes: usize,
}

impl Default for AttachmentLimits {
    fn default() -> Self {
        Self {
            max_bytes: MAX_IMAGE_BYTES,
        }
    }
}

impl AttachmentLimits {
    /// Accept a file or say why not.
    pub fn check(&self, file: &ImageFile) -> Result<ImageMediaType, RejectionReason> {
        if file.bytes.is_empty() {
            return Err(RejectionReason::Empty);
        }
        if file.size() > self.max_bytes {
            return Err(RejectionReason::TooLarge {
                size: file.size(),
                limit: self.max_bytes,
            });
        }

        let media_type = ImageMediaType::from_file_name(&file.file_name)
            .ok_or_else(|| RejectionReason::UnsupportedType(file.file_name.clone()))?;

        if let Some(declared) = &file.declared_type {
            if ImageMediaType::from_mime(declared).is_none() {
                return Err(RejectionReason::UnsupportedType(declared.clone()));
            }
        }

        Ok(media_type)
    }
}

/// Result of a staging call. Rejected files are not staged.
#[derive(Debug, Default)]
pub struct StageOutcome {
    pub staged: Vec<AttachmentId>,
    pub rejected: Vec<RejectedFile>,
}

/// Pending uploads of one editing context plus the persisted-image operations.
pub struct ImageAttachments {
    gateway: Arc<dyn PostGateway>,
    limits: AttachmentLimits,
    pending: Vec<PendingAttachment>,
}

impl ImageAttachments {
    pub fn new(gateway: Arc<dyn PostGateway>, limits: AttachmentLimits) -> Self {
        Self {
            gateway,
            limits,
            pending: Vec::new(),
        }
    }

    /// Stage the files that pass the limits, in the order given.
    pub fn stage(&mut self, files: impl IntoIterator<Item = ImageFile>) -> StageOutcome {
        let mut outcome = StageOutcome::default();

        for file in files {
            match self.limits.check(&file) {
                Ok(media_type) => {
                    let id = AttachmentId::generate();
                    self.pending.push(PendingAttachment {
                        id,
                        name: display_name(&file.file_name),
                        file_name: file.file_name,
                        media_type,
                        bytes: file.bytes,
                        preview: PreviewRef::for_attachment(id),
                    });
                    outcome.staged.push(id);
                }
                Err(reason) => {
                    tracing::debug!(file = %file.file_name, %reason, "Image not staged");
                    outcome.rejected.push(RejectedFile {
                        file_name: file.file_name,
                        reason,
                    });
                }
            }
        }

        outcome
    }

    pub fn pending(&self) -> &[PendingAttachment] {
        &self.pending
    }

    pub fn get(&self, id: AttachmentId) -> Option<&PendingAttachment> {
        self.pending.iter().find(|p| p.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Relabel a staged image. Local only.
    pub fn rename(&mut self, id: AttachmentId, name: impl Into<String>) -> Result<(), DomainError> {
        let name = checked_name(name.into())?;
        let entry = self
            .pending
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::not_found("staged image", id))?;
        entry.name = name;
        Ok(())
    }

    /// Drop a staged image. Its preview reference goes with the returned value.
    pub fn unstage(&mut self, id: AttachmentId) -> Result<PendingAttachment, DomainError> {
        let index = self
            .pending
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| DomainError::not_found("staged image", id))?;
        Ok(self.pending.remove(index))
    }

    /// Move staged images out, e.g. into the editor of a freshly created post.
    pub fn take_pending(&mut self) -> Vec<PendingAttachment> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn extend(&mut self, pending: Vec<PendingAttachment>) {
        self.pending.extend(pending);
    }

    /// Upload everything staged as one batch.
    ///
    /// On failure nothing is unstaged so the caller can retry.
    pub async fn commit(&mut self, post_id: &PostId) -> Result<Vec<PostImage>, DomainError> {
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }

        let images = self
            .gateway
            .upload_images(post_id, &self.pending)
            .await
            .map_err(|e| {
                tracing::warn!(post_id = %post_id, error = %e, "Image batch upload failed");
                e.for_upload(post_id)
            })?;

        tracing::info!(
            post_id = %post_id,
            staged = self.pending.len(),
            uploaded = images.len(),
            "Image batch uploaded"
        );
        self.pending.clear();
        Ok(images)
    }

    pub async fn rename_persisted(
        &self,
        post_id: &PostId,
        image_id: &ImageId,
        name: impl Into<String>,
    ) -> Result<String, DomainError> {
        let name = checked_name(name.into())?;
        self.gateway
            .rename_image(post_id, image_id, &name)
            .await
            .map_err(|e| e.for_entity("image", image_id))?;
        Ok(name)
    }

    pub async fn remove_persisted(
        &self,
        post_id: &PostId,
        image_id: &ImageId,
    ) -> Result<(), DomainError> {
        self.gateway
            .delete_image(post_id, image_id)
            .await
            .map_err(|e| e.for_entity("image", image_id))?;
        tracing::info!(post_id = %post_id, image_id = %image_id, "Image removed");
        Ok(())
    }
}

fn checked_name(name: String) -> Result<String, DomainError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(DomainError::Validation(
            "Image name must not be empty".to_string(),
        ));
    }
    Ok(name)
}
