//! Domain entities - the core business objects.

mod history;
mod ids;
mod image;
mod post;
mod query;
mod user;

pub use history::{ChangeType, HistoryField, PostHistory};
pub use ids::{AttachmentId, HistoryId, ImageId, PostId, UserId};
pub use image::{
    ImageFile, ImageMediaType, PendingAttachment, PostImage, PreviewRef, RejectedFile,
    RejectionReason, display_name,
};
pub use post::{NewPost, Post, PostPatch, PostRules, PostStatus};
pub use query::{Page, PostQuery, StatusFilter, total_pages};
pub use user::{NewUser, Role, User, UserPatch, UserRef};
