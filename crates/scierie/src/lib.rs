//! `scierie` - Management backend for a sawmill and lumber yard
//!
//! This library provides the HTTP API, storage and reporting behind the
//! yard's web pages: stock, production, sales, expenses, supplier charges,
//! invoices with PDF export, and the running net profit.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod pdf;
pub mod report;
pub mod storage;
pub mod timestamp;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use storage::Storage;
