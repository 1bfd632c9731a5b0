//! Client for the audit-log record endpoints.
//!
//! Every operation has a pure `build_*` step (inspectable without a network)
//! and an async method that sends it through the shared `ApiClient`.
//!
//! `delete_record` addresses the record by `name` alone while every other
//! operation uses `owner/name`. The backend resolves bare names, so the
//! request is kept exactly as the console has always sent it.

use serde_json::Value;

use crate::config::ApiClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::types::{CreateRecordParams, Page, Pagination, Record};

const GET_RECORDS: &str = "/get-records";
const GET_RECORD: &str = "/get-record";
const ADD_RECORD: &str = "/add-record";
const UPDATE_RECORD: &str = "/update-record";
const DELETE_RECORD: &str = "/delete-record";

#[derive(Debug, Clone)]
pub struct RecordsClient {
    api: ApiClient,
}

impl RecordsClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn build_get_records(&self, pagination: &Pagination) -> HttpRequest {
        self.api.build_get(
            GET_RECORDS,
            &[
                ("page_size", pagination.page_size.as_str()),
                ("p", pagination.page.as_str()),
            ],
        )
    }

    pub fn build_get_record(&self, owner: &str, name: &str) -> HttpRequest {
        let id = format!("{owner}/{name}");
        self.api.build_get(GET_RECORD, &[("id", id.as_str())])
    }

    pub fn build_add_record(&self, params: &CreateRecordParams) -> Result<HttpRequest, ApiError> {
        self.api.build_post(ADD_RECORD, &[], Some(params))
    }

    pub fn build_update_record(
        &self,
        owner: &str,
        name: &str,
        params: &CreateRecordParams,
    ) -> Result<HttpRequest, ApiError> {
        let id = format!("{owner}/{name}");
        self.api.build_post(UPDATE_RECORD, &[("id", id.as_str())], Some(params))
    }

    pub fn build_delete_record(&self, name: &str) -> Result<HttpRequest, ApiError> {
        self.api
            .build_post(DELETE_RECORD, &[("id", name)], Some(&serde_json::json!({})))
    }

    pub async fn get_records(&self, pagination: &Pagination) -> Result<Page<Record>, ApiError> {
        self.api.send(self.build_get_records(pagination)).await
    }

    /// `None` when the backend has no record under `owner/name`.
    pub async fn get_record(&self, owner: &str, name: &str) -> Result<Option<Record>, ApiError> {
        self.api.send(self.build_get_record(owner, name)).await
    }

    /// Resolves to whatever the backend reports for the write, usually
    /// `true`; fetch the record again to see its stored form.
    pub async fn add_record(&self, params: &CreateRecordParams) -> Result<Value, ApiError> {
        self.api.send_built(self.build_add_record(params)).await
    }

    pub async fn update_record(
        &self,
        owner: &str,
        name: &str,
        params: &CreateRecordParams,
    ) -> Result<Value, ApiError> {
        self.api
            .send_built(self.build_update_record(owner, name, params))
            .await
    }

    pub async fn delete_record(&self, name: &str) -> Result<Value, ApiError> {
        self.api.send_built(self.build_delete_record(name)).await
    }
}
