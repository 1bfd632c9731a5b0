//! Client for the knowledge-store endpoints.

use serde_json::Value;

use crate::config::ApiClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::types::{CreateStoreParams, Page, Store, StorePagination};

const GET_STORES: &str = "/get-stores";
const GET_STORE: &str = "/get-store";
const ADD_STORE: &str = "/add-store";
const UPDATE_STORE: &str = "/update-store";
const DELETE_STORE: &str = "/delete-store";

#[derive(Debug, Clone)]
pub struct StoresClient {
    api: ApiClient,
}

impl StoresClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn build_get_stores(&self, pagination: &StorePagination) -> HttpRequest {
        let page_size = pagination.page_size.to_string();
        let page = pagination.page.to_string();
        self.api.build_get(
            GET_STORES,
            &[("page_size", page_size.as_str()), ("p", page.as_str())],
        )
    }

    pub fn build_get_store(&self, owner: &str, name: &str) -> HttpRequest {
        let id = format!("{owner}/{name}");
        self.api.build_get(GET_STORE, &[("id", id.as_str())])
    }

    pub fn build_add_store(&self, params: &CreateStoreParams) -> Result<HttpRequest, ApiError> {
        self.api.build_post(ADD_STORE, &[], Some(params))
    }

    pub fn build_update_store(
        &self,
        owner: &str,
        name: &str,
        params: &CreateStoreParams,
    ) -> Result<HttpRequest, ApiError> {
        let id = format!("{owner}/{name}");
        self.api.build_post(UPDATE_STORE, &[("id", id.as_str())], Some(params))
    }

    pub fn build_delete_store(&self, owner: &str, name: &str) -> Result<HttpRequest, ApiError> {
        let id = format!("{owner}/{name}");
        self.api
            .build_post(DELETE_STORE, &[("id", id.as_str())], Some(&serde_json::json!({})))
    }

    pub async fn get_stores(&self, pagination: &StorePagination) -> Result<Page<Store>, ApiError> {
        self.api.send(self.build_get_stores(pagination)).await
    }

    pub async fn get_store(&self, owner: &str, name: &str) -> Result<Option<Store>, ApiError> {
        self.api.send(self.build_get_store(owner, name)).await
    }

    pub async fn add_store(&self, params: &CreateStoreParams) -> Result<Value, ApiError> {
        self.api.send_built(self.build_add_store(params)).await
    }

    pub async fn update_store(
        &self,
        owner: &str,
        name: &str,
        params: &CreateStoreParams,
    ) -> Result<Value, ApiError> {
        self.api
            .send_built(self.build_update_store(owner, name, params))
            .await
    }

    pub async fn delete_store(&self, owner: &str, name: &str) -> Result<Value, ApiError> {
        self.api.send_built(self.build_delete_store(owner, name)).await
    }
}
