//! Ticket store boundary
//!
//! The external issue tracker, consumed as an opaque CRUD + links interface.

pub mod client;
pub mod memory;
pub mod store;
pub mod types;

pub use client::GitlabClient;
pub use memory::InMemoryTicketStore;
pub use store::TicketStore;
pub use types::{Ticket, TicketLink, TicketUpdate};
