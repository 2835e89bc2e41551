//! Pipeline entry points for announcer operations.
//!
//! - `run_announce`: Post the catalog entries added by a commit
//! - `run_link_check`: Report redirected and broken catalog links

pub mod announce;
pub mod links;

pub use announce::{AnnounceOutcome, AnnounceRequest, Publishers, run_announce};
pub use links::{LinkReport, run_link_check};
