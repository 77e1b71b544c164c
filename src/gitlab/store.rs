//! The ticket store contract
//!
//! Everything the core relies on from the external issue tracker. Services
//! and the hierarchy resolver depend on this trait, never on a concrete
//! client, so tests run against the in-memory implementation.

use async_trait::async_trait;

use crate::error::OkrResult;
use crate::gitlab::types::{Ticket, TicketLink, TicketUpdate};

#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Create a ticket and return it with its store-assigned iid.
    async fn create_ticket(
        &self,
        title: &str,
        description: &str,
        labels: &[String],
    ) -> OkrResult<Ticket>;

    /// Fetch one ticket. Fails with `NotFound` if absent.
    async fn get_ticket(&self, iid: u64) -> OkrResult<Ticket>;

    /// Apply a partial update. A fully-empty update is a no-op that returns
    /// the unchanged ticket.
    async fn update_ticket(&self, iid: u64, update: TicketUpdate) -> OkrResult<Ticket>;

    /// All tickets whose label set is a superset of `labels`.
    async fn list_tickets(&self, labels: &[String]) -> OkrResult<Vec<Ticket>>;

    /// Create a directional link record. Fails if either ticket is absent.
    async fn link_tickets(&self, source_iid: u64, target_iid: u64) -> OkrResult<TicketLink>;

    /// The tickets at the other end of every link `iid` participates in,
    /// in whatever order the store returns them.
    async fn list_links(&self, iid: u64) -> OkrResult<Vec<Ticket>>;
}
