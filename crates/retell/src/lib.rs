//! Retell voice platform HTTP client.
//!
//! Covers the three calls the calendar integration needs: fetch an agent
//! (to learn which Retell-LLM drives it), fetch that LLM's configuration,
//! and patch the configuration back in a single update.

pub mod client;
pub mod error;
pub mod types;

pub use client::RetellClient;
pub use error::RetellError;
pub use types::{Agent, LlmUpdate, ResponseEngine, RetellLlm};

/// Production API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.retellai.com";
