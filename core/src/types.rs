//! Domain DTOs for the console API.
//!
//! # Design
//! Field names follow the backend's camelCase JSON. Optional descriptive
//! fields are `Option<String>` and are omitted from request bodies when unset,
//! so the server sees exactly what the caller filled in. The mock-server
//! crate defines its own copies; integration tests catch schema drift.

use serde::{Deserialize, Serialize};

/// One page of a listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Page selection for record listings, sent verbatim as `page_size` and `p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page_size: String,
    pub page: String,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_size: "100".to_string(),
            page: "1".to_string(),
        }
    }
}

impl Pagination {
    pub fn new(page_size: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            page_size: page_size.into(),
            page: page.into(),
        }
    }
}

/// Page selection for store listings. Stores page numerically, ten at a time
/// unless asked otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorePagination {
    pub page_size: u32,
    pub page: u32,
}

impl Default for StorePagination {
    fn default() -> Self {
        Self {
            page_size: 10,
            page: 1,
        }
    }
}

impl StorePagination {
    pub fn new(page_size: u32, page: u32) -> Self {
        Self { page_size, page }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// An access/audit log entry keyed by `(owner, name)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// Write-side payload for creating or updating a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordParams {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl CreateRecordParams {
    pub fn new(owner: &str, name: &str, created_time: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            created_time: created_time.to_string(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// A unit of work keyed by `(owner, name)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<String>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}

/// Write-side payload for creating or updating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskParams {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl CreateTaskParams {
    pub fn new(owner: &str, name: &str, created_time: &str, display_name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            created_time: created_time.to_string(),
            display_name: display_name.to_string(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

/// A knowledge store keyed by `(owner, name)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub owner: String,
    pub name: String,
    pub created_time: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_subpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Stores are written with the same shape they are read with.
pub type CreateStoreParams = Store;
