//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod merge;
mod port;
mod search;
mod sort;
mod view;

// Re-export all domain types
pub use merge::merge_protocols;
pub use port::{is_interpreter, normalize_process_name, PortClass, PortProcess, Protocol};
pub use search::{is_port_query, search, FUZZY_MIN_SCORE_PER_CHAR, SIMILARITY_THRESHOLD};
pub use sort::{compare_names, sort_entities, SortField, SortOrder};
pub use view::{Action, Direction, ViewMode, ViewState};
