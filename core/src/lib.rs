//! Port Patrol Core Library
//!
//! Finds which processes are listening on which ports and lets a caller act
//! on them. Provides functionality to:
//! - Scan listening TCP ports and open UDP sockets
//! - Merge TCP/UDP duplicates and keep a port-sorted snapshot
//! - Search, sort and navigate the snapshot through a pure view reducer
//! - Kill processes by PID (gracefully or forcefully)
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure business logic and data models
//! - `ports`: Trait definitions (interfaces)
//! - `adapters`: External system implementations
//! - `application`: Use case services
//!
//! # Platform Support
//! - macOS / BSD: Uses `lsof` and `ps` commands
//! - Linux: Uses `lsof`, falling back to `ss` when lsof is missing
//! - Windows: Uses `netstat` and `tasklist` commands

// Hexagonal architecture layers
pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub mod config;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{
    merge_protocols, search, sort_entities, Action, Direction, PortClass, PortProcess, Protocol,
    SortField, SortOrder, ViewMode, ViewState,
};

// Re-export other commonly used types
pub use adapters::{Platform, PortScanner, ProcessKiller, SystemCommandRunner};
pub use application::ProcessRegistry;
pub use config::{ConfigStore, Settings};
pub use error::{Error, Result};
pub use ports::{CommandRunner, PortScannerPort, ProcessKillerPort};
