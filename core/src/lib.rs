//! Synchronous client for the mite time-tracking REST API.
//!
//! # Overview
//! [`Mite`] is the entry point for one account (realm plus API key). It hands
//! out one adapter per resource: projects, customers, services, users, time
//! entries, the tracker, and daily summaries. Adapters translate method calls
//! into requests against `https://{realm}.mite.yo.lk/` and return the JSON
//! records as `serde_json::Value`, with the resource wrapper key stripped.
//!
//! ```no_run
//! use mite_core::{Mite, ReadAdapter};
//!
//! let mite = Mite::new("acme", "0123abcd");
//! let projects = mite.projects().all()?;
//! # Ok::<(), mite_core::MiteError>(())
//! ```
//!
//! # Design
//! - `MiteApi` splits every call into `build_request` and `parse_response`;
//!   the network round-trip goes through the [`Transport`] trait, with
//!   [`UreqTransport`] as the blocking default.
//! - Non-2xx responses with a JSON body are returned as data, not as errors.
//!   The service's error shape is `{"error": "<message>"}`; see [`api_error`].
//! - Records are not validated or typed; the library passes them through.

pub mod adapters;
pub mod client;
pub mod config;
pub mod error;
pub mod factory;
pub mod http;

pub use adapters::{
    unwrap_resource, Adapter, ArchivableAdapter, Customers, Daily, GroupBy, Projects,
    ReadAdapter, ResourceId, Services, TimeEntries, TimeEntryFilter, TimeRange, Tracker, Users,
    WriteAdapter,
};
pub use client::{api_error, Credentials, MiteApi};
pub use config::Config;
pub use error::MiteError;
pub use factory::Mite;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
