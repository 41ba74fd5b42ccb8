pub mod airline;
pub mod common;
pub mod event;
pub mod flight;
pub mod init;
pub mod oracle;
pub mod policy;

// Re-export common types/enums for easier access
pub use common::*;
