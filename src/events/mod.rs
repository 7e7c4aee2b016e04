//! Change-notification system for real-time multi-client sync.
//!
//! - `BoardEvent` — typed notification emitted after every mutation
//! - `EventEmitter` — injected sink trait (no ambient/global hub)
//! - `EventBus` — broadcast channel fanning events out to WebSocket clients

mod bus;
mod types;

pub use bus::EventBus;
pub use types::{BoardEvent, ChangeAction, EntityKind, EventEmitter, NullEmitter};
