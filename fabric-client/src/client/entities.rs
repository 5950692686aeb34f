//! Generic operations over the server's named entity kinds
//!
//! Patterns, contexts, and sessions share one route shape: create
//! `POST /{kind}s/{name}`, delete `DELETE /{kind}s/{name}`, exists
//! `GET /{kind}s/exists/{name}`, rename `PUT /{kind}s/rename/{old}/{new}`,
//! get `GET /{kind}s/{name}`, list `GET /{kind}s/names`. The private
//! helpers here implement that shape once; the public methods pin down the
//! kind and payload type.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::protocol::types::{Context, Pattern, Session};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// The entity kinds the server stores by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityKind {
    Pattern,
    Context,
    Session,
}

impl EntityKind {
    /// The collection segment of the entity's routes.
    fn collection(self) -> &'static str {
        match self {
            EntityKind::Pattern => "patterns",
            EntityKind::Context => "contexts",
            EntityKind::Session => "sessions",
        }
    }

    /// Singular name, used for error context.
    fn noun(self) -> &'static str {
        match self {
            EntityKind::Pattern => "pattern",
            EntityKind::Context => "context",
            EntityKind::Session => "session",
        }
    }
}

impl Client {
    async fn create_entity<T: Serialize>(
        &self,
        kind: EntityKind,
        name: &str,
        entity: &T,
    ) -> Result<()> {
        let body = serde_json::to_vec(entity).map_err(|source| Error::Encode {
            what: kind.noun(),
            source,
        })?;
        self.execute(Method::POST, &[kind.collection(), name], Some(body))
            .await?;
        Ok(())
    }

    async fn delete_entity(&self, kind: EntityKind, name: &str) -> Result<()> {
        self.execute(Method::DELETE, &[kind.collection(), name], None)
            .await?;
        Ok(())
    }

    async fn entity_exists(&self, kind: EntityKind, name: &str) -> Result<bool> {
        self.get_json(&[kind.collection(), "exists", name], kind.noun())
            .await
    }

    async fn get_entity<T: DeserializeOwned>(&self, kind: EntityKind, name: &str) -> Result<T> {
        self.get_json(&[kind.collection(), name], kind.noun()).await
    }

    async fn list_entities(&self, kind: EntityKind) -> Result<Vec<String>> {
        self.get_json(&[kind.collection(), "names"], kind.collection())
            .await
    }

    async fn rename_entity(&self, kind: EntityKind, old_name: &str, new_name: &str) -> Result<()> {
        self.execute(
            Method::PUT,
            &[kind.collection(), "rename", old_name, new_name],
            None,
        )
        .await?;
        Ok(())
    }

    /// Create a new pattern.
    pub async fn create_pattern(&self, name: &str, pattern: &Pattern) -> Result<()> {
        self.create_entity(EntityKind::Pattern, name, pattern).await
    }

    /// Create a new context.
    pub async fn create_context(&self, name: &str, context: &Context) -> Result<()> {
        self.create_entity(EntityKind::Context, name, context).await
    }

    /// Create a new session.
    pub async fn create_session(&self, name: &str, session: &Session) -> Result<()> {
        self.create_entity(EntityKind::Session, name, session).await
    }

    /// Delete a pattern.
    pub async fn delete_pattern(&self, name: &str) -> Result<()> {
        self.delete_entity(EntityKind::Pattern, name).await
    }

    /// Delete a context.
    pub async fn delete_context(&self, name: &str) -> Result<()> {
        self.delete_entity(EntityKind::Context, name).await
    }

    /// Delete a session.
    pub async fn delete_session(&self, name: &str) -> Result<()> {
        self.delete_entity(EntityKind::Session, name).await
    }

    /// Check if a pattern exists.
    pub async fn pattern_exists(&self, name: &str) -> Result<bool> {
        self.entity_exists(EntityKind::Pattern, name).await
    }

    /// Check if a context exists.
    pub async fn context_exists(&self, name: &str) -> Result<bool> {
        self.entity_exists(EntityKind::Context, name).await
    }

    /// Check if a session exists.
    pub async fn session_exists(&self, name: &str) -> Result<bool> {
        self.entity_exists(EntityKind::Session, name).await
    }

    /// Retrieve a pattern with its metadata.
    pub async fn get_pattern(&self, name: &str) -> Result<Pattern> {
        self.get_entity(EntityKind::Pattern, name).await
    }

    /// Retrieve a context with its content.
    pub async fn get_context(&self, name: &str) -> Result<Context> {
        self.get_entity(EntityKind::Context, name).await
    }

    /// Retrieve a session with its message history.
    pub async fn get_session(&self, name: &str) -> Result<Session> {
        self.get_entity(EntityKind::Session, name).await
    }

    /// List the names of all patterns.
    pub async fn list_patterns(&self) -> Result<Vec<String>> {
        self.list_entities(EntityKind::Pattern).await
    }

    /// List the names of all contexts.
    pub async fn list_contexts(&self) -> Result<Vec<String>> {
        self.list_entities(EntityKind::Context).await
    }

    /// List the names of all sessions.
    pub async fn list_sessions(&self) -> Result<Vec<String>> {
        self.list_entities(EntityKind::Session).await
    }

    /// Rename a pattern.
    pub async fn rename_pattern(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.rename_entity(EntityKind::Pattern, old_name, new_name)
            .await
    }

    /// Rename a context.
    pub async fn rename_context(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.rename_entity(EntityKind::Context, old_name, new_name)
            .await
    }

    /// Rename a session.
    pub async fn rename_session(&self, old_name: &str, new_name: &str) -> Result<()> {
        self.rename_entity(EntityKind::Session, old_name, new_name)
            .await
    }
}
