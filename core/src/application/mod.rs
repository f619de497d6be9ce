//! Application layer - Use case services.
//!
//! Services are thin orchestrators that:
//! - Use ports (traits) for external dependencies
//! - Apply domain rules to what the adapters return
//! - Hand out domain types

mod registry;

pub use registry::ProcessRegistry;
