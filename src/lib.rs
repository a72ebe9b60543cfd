//! billvault - tiered billing-record storage
//!
//! Live records sit in a hot document store; records past the age
//! threshold migrate to a cold object store and stay readable through a
//! fallback lookup that tries the hot tier, the archive index, then the
//! canonical cold path.

pub mod archive_index;
pub mod billing;
pub mod cli;
pub mod cold_storage;
pub mod config;
pub mod docstore;
pub mod http_server;
pub mod observability;
pub mod primary;
pub mod tiering;
