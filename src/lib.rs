//! Editor-side configuration core for a post-listing block.
//!
//! The block renders either a curated list of media-backed entries (static
//! mode) or the posts of selected categories (dynamic mode). This crate keeps
//! the persisted attributes consistent across both modes and keeps the
//! dynamic preview in sync with a WordPress-compatible REST API.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub(crate) mod util;
