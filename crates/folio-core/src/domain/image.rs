use serde::{Deserialize, Serialize};

use super::{AttachmentId, ImageId};

/// A persisted image attached to a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostImage {
    #[serde(rename = "_id")]
    pub id: ImageId,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub public_id: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// Image formats the backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMediaType {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageMediaType {
    /// Match a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = split_extension(file_name)?;
        Self::from_extension(ext)
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}

fn split_extension(file_name: &str) -> Option<(&str, &str)> {
    let dot = file_name.rfind('.')?;
    let ext = &file_name[dot + 1..];
    if ext.is_empty() || ext.contains('/') || ext.contains('\\') {
        return None;
    }
    Some((&file_name[..dot], ext))
}

/// Default label for a staged file: its name without the extension.
pub fn display_name(file_name: &str) -> String {
    match split_extension(file_name) {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file_name.to_string(),
    }
}

/// A file picked by the user, before any checks.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    /// MIME type reported by the picker, if any.
    pub declared_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            declared_type: None,
            bytes,
        }
    }

    pub fn with_declared_type(mut self, mime: impl Into<String>) -> Self {
        self.declared_type = Some(mime.into());
        self
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Local handle used to show a staged image before upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRef(String);

impl PreviewRef {
    pub(crate) fn for_attachment(id: AttachmentId) -> Self {
        Self(format!("local-preview:{id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An image staged locally but not yet confirmed by the backend.
#[derive(Debug, Clone)]
pub struct PendingAttachment {
    pub id: AttachmentId,
    pub file_name: String,
    pub name: String,
    pub media_type: ImageMediaType,
    pub bytes: Vec<u8>,
    pub preview: PreviewRef,
}

impl PendingAttachment {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Why a file was not staged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectionReason {
    #[error("file is empty")]
    Empty,

    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("unsupported image type: {0}")]
    UnsupportedType(String),
}

/// A file left out of staging, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub file_name: String,
    pub reason: RejectionReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_strips_last_extension() {
        assert_eq!(display_name("photo.PNG"), "photo");
        assert_eq!(display_name("holiday.2024.jpeg"), "holiday.2024");
        assert_eq!(display_name("README"), "README");
        assert_eq!(display_name(".png"), ".png");
    }

    #[test]
    fn test_media_type_from_file_name() {
        assert_eq!(
            ImageMediaType::from_file_name("a.JPG"),
            Some(ImageMediaType::Jpeg)
        );
        assert_eq!(
            ImageMediaType::from_file_name("b.webp"),
            Some(ImageMediaType::Webp)
        );
        assert_eq!(ImageMediaType::from_file_name("c.bmp"), None);
        assert_eq!(ImageMediaType::from_file_name("noext"), None);
    }

    #[test]
    fn test_media_type_from_mime() {
        assert_eq!(
            ImageMediaType::from_mime("image/png"),
            Some(ImageMediaType::Png)
        );
        assert_eq!(ImageMediaType::from_mime("application/pdf"), None);
    }
}
