//! Board domain: records, bulk parsing, order assignment, storage seam,
//! and the mutation service that ties them together.

pub mod memory;
pub mod models;
pub mod ordering;
pub mod parser;
pub mod service;
pub mod store;

pub use memory::MemoryStore;
pub use models::{
    Epic, EpicPatch, NewEpic, NewProject, NewTask, Priority, Project, ProjectPatch, Status, Task,
    TaskPatch,
};
pub use parser::{parse_bulk_text, TaskDraft};
pub use service::BoardService;
pub use store::BoardStore;

use thiserror::Error;

/// Domain error taxonomy.
///
/// `Validation`, `NotFound` and `NoValidEntries` are user-correctable and
/// map to 400/404 at the HTTP boundary. `Internal` covers unexpected
/// store/transport failures and is surfaced generically, never with
/// internal detail.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("bulk text contained no valid task entries")]
    NoValidEntries,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
