//! Services - the post lifecycle built on top of the ports.

mod accounts;
mod aggregate;
mod attachments;
mod guard;
mod history;
mod listing;

#[cfg(test)]
mod testing;

pub use accounts::AccountAdmin;
pub use aggregate::{PostAggregate, PostService};
pub use attachments::{AttachmentLimits, ImageAttachments, MAX_IMAGE_BYTES, StageOutcome};
pub use history::{HistoryLog, HistoryTimeline, Revision};
pub use listing::{MAX_PAGE_SIZE, PostListing};
