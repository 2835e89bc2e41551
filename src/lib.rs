// src/lib.rs

//! Catalog Announcer Library
//!
//! Turns entries added to a curated Markdown link list into posts for
//! X/Twitter and Bluesky, and checks the list's links for rot.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod publish;
pub mod services;
pub mod utils;
pub mod vcs;
