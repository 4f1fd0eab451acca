//! Confluence API types.

mod attachment;
mod label;
mod page;
mod user;

pub use attachment::{Attachment, AttachmentsResponse};
pub use label::{Label, LabelsResponse};
pub use page::{Page, SearchResponse, Version};
pub use user::User;
