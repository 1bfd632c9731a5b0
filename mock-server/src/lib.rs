use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// The `{status, data, message}` envelope every endpoint answers with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: &T) -> Json<Self> {
        match serde_json::to_value(data) {
            Ok(data) => Json(Self {
                status: "success".to_string(),
                data: Some(data),
                message: None,
            }),
            Err(e) => Self::error(e.to_string()),
        }
    }

    pub fn error(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            status: "error".to_string(),
            data: None,
            message: Some(message.into()),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub owner: String,
    #[serde(default)]
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

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub owner: String,
    #[serde(default)]
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

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub owner: String,
    #[serde(default)]
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

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

type Key = (String, String);
pub type Table<T> = BTreeMap<Key, T>;

#[derive(Debug, Default)]
pub struct Db {
    pub records: Table<Record>,
    pub tasks: Table<Task>,
    pub stores: Table<Store>,
}

pub type SharedDb = Arc<RwLock<Db>>;

/// An owner-scoped resource stored in one of the `Db` tables.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Capitalised resource name used in error messages.
    const KIND: &'static str;
    /// Whether an id without `/` is looked up by name across owners.
    const BARE_NAME_IDS: bool = false;

    fn owner(&self) -> &str;
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    fn table(db: &Db) -> &Table<Self>;
    fn table_mut(db: &mut Db) -> &mut Table<Self>;

    fn key(&self) -> Key {
        (self.owner().to_string(), self.name().to_string())
    }
}

macro_rules! entity {
    ($ty:ty, $kind:literal, $field:ident, $bare:literal) => {
        impl Entity for $ty {
            const KIND: &'static str = $kind;
            const BARE_NAME_IDS: bool = $bare;

            fn owner(&self) -> &str {
                &self.owner
            }
            fn name(&self) -> &str {
                &self.name
            }
            fn set_name(&mut self, name: String) {
                self.name = name;
            }
            fn table(db: &Db) -> &Table<Self> {
                &db.$field
            }
            fn table_mut(db: &mut Db) -> &mut Table<Self> {
                &mut db.$field
            }
        }
    };
}

entity!(Record, "Record", records, true);
entity!(Task, "Task", tasks, false);
entity!(Store, "Store", stores, false);

/// Resolve an `id` query value to a table key.
///
/// `owner/name` is split on its single slash. Bare names are only accepted
/// for entities that allow them and match the first entity with that name.
fn resolve<E: Entity>(table: &Table<E>, id: &str) -> Result<Option<Key>, String> {
    let parts: Vec<&str> = id.split('/').collect();
    match parts.as_slice() {
        [owner, name] => {
            let key = (owner.to_string(), name.to_string());
            Ok(table.contains_key(&key).then_some(key))
        }
        [name] if E::BARE_NAME_IDS => Ok(table.keys().find(|(_, n)| n.as_str() == *name).cloned()),
        _ => Err(format!("invalid id: {id}")),
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn app() -> Router {
    app_with_db(SharedDb::default())
}

pub fn app_with_db(db: SharedDb) -> Router {
    let api = Router::new()
        .route("/get-records", get(list_records))
        .route("/get-record", get(get_entity::<Record>))
        .route("/add-record", post(add_entity::<Record>))
        .route("/update-record", post(update_entity::<Record>))
        .route("/delete-record", post(delete_entity::<Record>))
        .route("/get-stores", get(list_stores))
        .route("/get-store", get(get_entity::<Store>))
        .route("/add-store", post(add_entity::<Store>))
        .route("/update-store", post(update_entity::<Store>))
        .route("/delete-store", post(delete_entity::<Store>))
        .route("/get-tasks", get(list_tasks))
        .route("/get-task", get(get_entity::<Task>))
        .route("/add-task", post(add_entity::<Task>))
        .route("/update-task", post(update_entity::<Task>))
        .route("/delete-task", post(delete_entity::<Task>));
    Router::new().nest("/api", api).with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct RecordPageQuery {
    pub page_size: Option<String>,
    pub p: Option<String>,
}

#[derive(Deserialize)]
pub struct StorePageQuery {
    pub page_size: Option<usize>,
    pub p: Option<usize>,
}

#[derive(Deserialize)]
pub struct OwnerQuery {
    pub owner: String,
}

#[derive(Deserialize)]
pub struct IdQuery {
    pub id: String,
}

fn page_of<T: Clone>(table: &Table<T>, page_size: usize, page: usize) -> ListPage<T> {
    let items: Vec<T> = table
        .values()
        .skip(page_size.saturating_mul(page - 1))
        .take(page_size)
        .cloned()
        .collect();
    ListPage {
        total: items.len(),
        items,
    }
}

fn positive(raw: &str) -> Option<usize> {
    raw.trim().parse().ok().filter(|n| *n > 0)
}

async fn list_records(
    State(db): State<SharedDb>,
    Query(query): Query<RecordPageQuery>,
) -> Json<ApiResponse> {
    let page_size = query.page_size.unwrap_or_else(|| "100".to_string());
    let p = query.p.unwrap_or_else(|| "1".to_string());
    let (Some(size), Some(page)) = (positive(&page_size), positive(&p)) else {
        return ApiResponse::error(format!("invalid pagination: page_size={page_size}, p={p}"));
    };
    let db = db.read().await;
    ApiResponse::success(&page_of(&db.records, size, page))
}

async fn list_stores(
    State(db): State<SharedDb>,
    Query(query): Query<StorePageQuery>,
) -> Json<ApiResponse> {
    let size = query.page_size.unwrap_or(10);
    let page = query.p.unwrap_or(1);
    if size == 0 || page == 0 {
        return ApiResponse::error(format!("invalid pagination: page_size={size}, p={page}"));
    }
    let db = db.read().await;
    ApiResponse::success(&page_of(&db.stores, size, page))
}

async fn list_tasks(
    State(db): State<SharedDb>,
    Query(query): Query<OwnerQuery>,
) -> Json<ApiResponse> {
    let db = db.read().await;
    let tasks: Vec<&Task> = db
        .tasks
        .values()
        .filter(|t| t.owner == query.owner)
        .collect();
    ApiResponse::success(&tasks)
}

async fn get_entity<E: Entity>(
    State(db): State<SharedDb>,
    Query(query): Query<IdQuery>,
) -> Json<ApiResponse> {
    let db = db.read().await;
    let table = E::table(&db);
    match resolve(table, &query.id) {
        Ok(key) => ApiResponse::success(&key.and_then(|k| table.get(&k))),
        Err(message) => ApiResponse::error(message),
    }
}

/// Writes answer `true`, the storage layer's write result, rather than the
/// entity itself.
async fn add_entity<E: Entity>(
    State(db): State<SharedDb>,
    Json(mut input): Json<E>,
) -> Json<ApiResponse> {
    if input.name().is_empty() {
        input.set_name(Uuid::new_v4().to_string());
    }
    let key = input.key();
    let mut db = db.write().await;
    let table = E::table_mut(&mut db);
    if table.contains_key(&key) {
        return ApiResponse::error(format!("{} {}/{} already exists", E::KIND, key.0, key.1));
    }
    tracing::debug!(kind = E::KIND, owner = %key.0, name = %key.1, "add");
    table.insert(key, input);
    ApiResponse::success(&true)
}

/// The entity is identified by the body's `owner`/`name`; the `id` query the
/// console also sends is not consulted.
async fn update_entity<E: Entity>(
    State(db): State<SharedDb>,
    Json(input): Json<E>,
) -> Json<ApiResponse> {
    let key = input.key();
    let mut db = db.write().await;
    let table = E::table_mut(&mut db);
    match table.get_mut(&key) {
        Some(existing) => {
            tracing::debug!(kind = E::KIND, owner = %key.0, name = %key.1, "update");
            *existing = input;
            ApiResponse::success(&true)
        }
        None => ApiResponse::error(format!("{} not found", E::KIND)),
    }
}

async fn delete_entity<E: Entity>(
    State(db): State<SharedDb>,
    Query(query): Query<IdQuery>,
) -> Json<ApiResponse> {
    let mut db = db.write().await;
    let table = E::table_mut(&mut db);
    match resolve(table, &query.id) {
        Ok(Some(key)) => {
            tracing::debug!(kind = E::KIND, owner = %key.0, name = %key.1, "delete");
            table.remove(&key);
            ApiResponse::success(&true)
        }
        Ok(None) => ApiResponse::error(format!("{} not found", E::KIND)),
        Err(message) => ApiResponse::error(message),
    }
}
