//! Trove SDK
//!
//! A client for the Trove v3 API of the National Library of Australia, plus a
//! Model Context Protocol (MCP) server exposing it to LLM agents.
//!
//! # Features
//!
//! - **Typed search**: a validated parameter model and a fluent [`SearchBuilder`]
//! - **Cursor pagination**: per-category cursors, streams and multi-category rounds
//! - **Records**: works, articles, people and lists, with raw JSON kept alongside
//! - **Citations**: PID extraction and eight citation styles
//! - **Rate-limited and cached**: client-side quota and a TTL response cache
//! - **11 MCP tools** over stdio or HTTP
//!
//! # Example
//!
//! ```no_run
//! use trove_sdk::{Category, Config, SearchBuilder, TroveClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = TroveClient::new(Config::from_env()?)?;
//!
//!     let response = SearchBuilder::new()
//!         .text("wattle day")
//!         .category(Category::Newspaper)
//!         .decade(191)
//!         .send(&client)
//!         .await?;
//!
//!     println!("{} results", response.total_results());
//!     Ok(())
//! }
//! ```

pub mod citation;
pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod models;
pub mod pagination;
pub mod query;
pub mod server;
pub mod tools;

pub use citation::{Citation, CitationStyle, Pid, PidKind};
pub use client::{RecordOptions, Resolved, TroveClient};
pub use config::Config;
pub use error::{ClientError, ClientResult, ToolError, ToolResult};
pub use models::{AnyRecord, Category, Facet, RecordLevel, SearchResponse, SortBy};
pub use pagination::{CursorState, MultiCategoryPager, SearchPager};
pub use query::{SearchBuilder, SearchParams};
