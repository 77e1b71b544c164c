//! okr-tracker - Objectives and Key Results over an external issue tracker
//!
//! Tracks Objectives, Key Results and their Activities with no database of
//! its own: structured fields are encoded as canonical markdown inside the
//! description of GitLab issues, labels classify entity kind and
//! team/product, and issue links stand in for the Objective→KR relation.
//!
//! ## Architecture
//! Entity services orchestrate a document codec (render/parse of the
//! markdown schema), a title/label classifier and a hierarchy resolver on
//! top of an opaque `TicketStore` trait. Updates are read-modify-write of
//! the whole description; unrecognized content survives verbatim.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use okr_tracker::config::Settings;
//! use okr_tracker::gitlab::InMemoryTicketStore;
//! use okr_tracker::services::ObjectiveService;
//!
//! # async fn run() -> okr_tracker::error::OkrResult<()> {
//! let settings = Settings::from_env()?;
//! let store = Arc::new(InMemoryTicketStore::new());
//! let objectives = ObjectiveService::new(store, &settings);
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Process configuration
pub mod config;

// Request/response and domain models
pub mod models;

// Ticket store boundary (GitLab REST client + in-memory test double)
pub mod gitlab;

// OKR document model: codec, classifier, hierarchy resolver
pub mod okr;

// Entity services
pub mod services;

// REST API (when enabled)
#[cfg(feature = "server")]
pub mod api;

// Public re-exports
pub use config::Settings;
pub use error::{OkrError, OkrResult};
pub use gitlab::{GitlabClient, InMemoryTicketStore, Ticket, TicketStore};
pub use models::{
    Activity, FieldUpdate, KrCreateRequest, KrResponse, KrUpdateRequest,
    ObjectiveCreateRequest, ObjectiveResponse, ObjectiveUpdateRequest,
};
pub use okr::{AppendStrategy, DocumentCodec, HierarchyResolver, TitleClassifier};
pub use services::{ActivityService, KrService, ObjectiveService};
