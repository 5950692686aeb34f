//! Client library for the Fabric REST API
//!
//! This crate provides a typed client for a Fabric server: CRUD over the
//! named entity kinds (patterns, contexts, sessions), configuration
//! retrieval and update, model and strategy listing, and a streaming chat
//! endpoint consumed over server-sent events.
//!
//! ```no_run
//! use fabric_client::{ChatRequest, Client, PromptRequest, StreamMessage};
//!
//! # async fn run() -> fabric_client::Result<()> {
//! let client = Client::new("http://localhost:8080")?;
//!
//! let request = ChatRequest {
//!     prompts: vec![PromptRequest {
//!         user_input: "Summarize the attached notes.".to_string(),
//!         vendor: "OpenAI".to_string(),
//!         model: "gpt-4o".to_string(),
//!         pattern_name: "summarize".to_string(),
//!         ..Default::default()
//!     }],
//!     language: "en".to_string(),
//!     ..Default::default()
//! };
//!
//! let mut chat = client.chat(&request).await?;
//! while let Some(message) = chat.next_message().await {
//!     match message {
//!         StreamMessage::Content { content, .. } => print!("{content}"),
//!         StreamMessage::Error { content, .. } => eprintln!("error: {content}"),
//!         StreamMessage::Complete { .. } => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod protocol;
pub mod stream;

pub use client::{Client, ClientBuilder};
pub use error::{Error, Result};
pub use protocol::types::{
    AvailableModels, ChatOptions, ChatRequest, Context, Pattern, PromptRequest, ServiceConfig,
    Session, SessionMessage, StreamMessage, Strategy,
};
pub use stream::ChatStream;

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
