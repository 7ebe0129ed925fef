//! # athan-notion
//!
//! Notion REST client for Athan Notes: validates database access and writes
//! voice notes as structured pages (icon, title, summary, category select,
//! tag multi-select, chunked body blocks).

pub mod client;

// Re-export core types
pub use athan_core::*;

pub use client::NotionClient;
