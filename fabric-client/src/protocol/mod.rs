//! Protocol module for Fabric request/response structures
//!
//! This module defines the data models exchanged with a Fabric server. These
//! structures are designed to be:
//! - Wire-faithful (serde renames match the server's JSON contract)
//! - Forward-compatible through defaulted optional fields
//! - Type-safe and serializable

pub mod types;

pub use types::{
    AvailableModels, ChatOptions, ChatRequest, Context, Pattern, PromptRequest, ServiceConfig,
    Session, SessionMessage, StreamMessage, Strategy,
};
