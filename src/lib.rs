//! Docket - record HTTP exchanges and channel messages from tests as API documentation
//!
//! Test helpers capture an interaction, fill in its documentation options
//! (description, group title, module, file, line) from the call site and a
//! title table, and hand the result to a [`Recorder`].
//!
//! ```
//! use docket::{Config, DocOptions, Docket};
//! use docket::interaction::{HttpExchange, HttpRequest, HttpResponse};
//!
//! let config = Config {
//!     enabled_override: Some(true),
//!     ..Config::default()
//! };
//! let docket = Docket::new(config).unwrap();
//!
//! let exchange = HttpExchange::new(
//!     HttpRequest { method: "GET".into(), path: "/widgets".into(), query: vec![], headers: vec![], body: vec![] },
//!     HttpResponse { status: 200, headers: vec![], body: b"[]".to_vec() },
//! );
//! docket::doc!(docket, exchange, DocOptions::new().description("lists all widgets")).unwrap();
//!
//! assert_eq!(docket.recorder().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::multiple_crate_versions
)]

pub mod call_site;
pub mod channel;
pub mod config;
mod docket;
pub mod error;
pub mod fingerprint;
pub mod interaction;
pub mod options;
pub mod recorder;

pub use call_site::CallSite;
pub use config::Config;
pub use docket::Docket;
pub use error::{DocketError, Result};
pub use options::{resolve, Description, DocOptions, ResolvedOptions, TitleTable};
pub use recorder::{MemoryRecorder, Recorder};
