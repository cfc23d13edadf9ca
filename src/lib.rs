//! # keyflow
//!
//! File keys, path patterns and file lists for tiered detector data.
//!
//! Every data unit of a production is identified by a key of experiment,
//! detector, campaign, measurement, run and timestamp. Templates with
//! `{name}` placeholders map keys to filenames and filenames back to keys,
//! which is all that is needed to find the inputs of a processing tier and
//! name its outputs.
//!
//! ## Modules
//!
//! - `app` - Logging, fatal error reporting and settings of the binary
//! - `cli` - Command-line argument structures and command routing
//! - `config` - Setup configuration with the storage roots of every tier
//! - `error` - Error type with numeric codes
//! - `filelist` - Key expansion, globbing and ignore lists
//! - `key` - File and processing keys, template parsing and rendering
//! - `patterns` - Filename patterns of every tier and artifact
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod filelist;
pub mod key;
pub mod patterns;

pub use error::{KeyflowError, Result};
