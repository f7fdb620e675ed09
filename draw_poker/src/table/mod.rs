//! Async table actors and the session registry.
//!
//! Each table runs in its own Tokio task with an mpsc inbox; the
//! [`TableRegistry`] spawns actors and hands out [`TableHandle`]s.
//! Because an actor processes one message at a time, every mutation is
//! serialized in arrival order and read replies are consistent copies.

pub mod actor;
pub mod config;
pub mod messages;
pub mod registry;

pub use actor::{TableActor, TableHandle};
pub use config::TableConfig;
pub use messages::{TableMessage, TableMetadata, TableReply};
pub use registry::{TableId, TableRegistry};
