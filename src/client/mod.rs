//! Client-side board replication: gateway to the authoritative server,
//! optimistic reconciliation store, and the kanban view projection.

pub mod gateway;
pub mod replica;
pub mod view;

pub use gateway::{BoardGateway, HttpGateway};
pub use replica::{BoardReplica, DEFAULT_UNDO_WINDOW};
pub use view::{project_board, KanbanColumns, SortDirection, SortKey, ViewOptions};
