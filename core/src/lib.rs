//! Async API client for the console backend.
//!
//! # Overview
//! A shared transport wrapper (`ApiClient`) plus one typed client per
//! resource: records, tasks and stores. Every endpoint answers with a
//! `{status, data, message}` envelope which the wrapper unwraps into the
//! payload or an `ApiError`.
//!
//! # Design
//! - `ApiClient` is built once and injected into each resource client; it
//!   carries the base URL, the 5s default timeout, the `Transport` and the
//!   `Notifier`.
//! - Each operation is split into a pure `build_*` step producing an
//!   `HttpRequest` and an async step that executes and unwraps it, so request
//!   shapes are testable without I/O.
//! - Failures notify exactly once and are then returned; nothing retries or
//!   caches.

pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod notify;
pub mod records;
pub mod stores;
pub mod tasks;
pub mod transport;
pub mod types;

pub use config::{ApiClient, ApiConfig};
pub use envelope::{Envelope, EnvelopeStatus};
pub use error::{ApiError, BoxError, DEFAULT_ERROR_MESSAGE};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notify::{Notifier, TracingNotifier};
pub use records::RecordsClient;
pub use stores::StoresClient;
pub use tasks::TasksClient;
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    CreateRecordParams, CreateStoreParams, CreateTaskParams, Page, Pagination, Record, Store,
    StorePagination, Task,
};
