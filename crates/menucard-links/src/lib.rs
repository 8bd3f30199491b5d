//! Profile links for menucard.
//!
//! A profile owns two ordered link lists (social and custom) stored as child
//! documents of the profile. The editor submits the complete desired state of both
//! lists and [`sync::LinkSynchronizer`] reconciles the stored documents with it,
//! issuing only the creates, updates and deletes that are actually needed.
//!
//! Besides synchronization this crate covers the rest of the link lifecycle:
//! - [`view`] loads links for the editor and for the public profile page
//! - [`clicks`] counts visits of active links
//! - [`profile`] manages the parent profile document links hang off

#![forbid(unsafe_code)]

pub mod clicks;
pub mod profile;
pub mod sync;
pub mod view;

mod prelude {
	pub use menucard_types::prelude::*;
}

pub use sync::{
	CreatedLink, LinkOp, LinkSynchronizer, SyncConfig, SyncOutcome, SyncPlan, SyncReport,
};

// vim: ts=4
