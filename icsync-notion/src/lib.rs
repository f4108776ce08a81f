//! Notion database backend for icsync.
//!
//! Implements [`icsync_core::RecordStore`] on top of the Notion REST API:
//! database retrieval for the schema, database queries for listing, and page
//! create/update for writes.

mod client;
mod decode;
mod encode;
mod error;
mod store;

pub use client::{NotionClient, NOTION_API_URL, NOTION_VERSION};
pub use error::NotionError;
pub use store::NotionStore;
