use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

/// Header every request must carry.
pub const API_KEY_HEADER: &str = "x-miteapikey";

/// A REST collection served under `/{name}.json` and `/{name}/{id}.json`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resource {
    pub name: &'static str,
    pub key: &'static str,
    pub archivable: bool,
}

pub const PROJECTS: Resource = Resource {
    name: "projects",
    key: "project",
    archivable: true,
};
pub const CUSTOMERS: Resource = Resource {
    name: "customers",
    key: "customer",
    archivable: true,
};
pub const SERVICES: Resource = Resource {
    name: "services",
    key: "service",
    archivable: true,
};
pub const USERS: Resource = Resource {
    name: "users",
    key: "user",
    archivable: true,
};
pub const TIME_ENTRIES: Resource = Resource {
    name: "time_entries",
    key: "time_entry",
    archivable: false,
};

/// In-memory records, keyed by collection name and id.
#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    tables: HashMap<&'static str, BTreeMap<u64, Value>>,
    tracking: Option<u64>,
}

/// Id of the user owning every API key.
pub const OWNER_ID: u64 = 1;

impl Store {
    /// A store holding only the account owner.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        let owner = json!({
            "name": "Mock Owner",
            "email": "owner@example.com",
            "role": "owner",
            "archived": false,
        });
        if let Value::Object(fields) = owner {
            store.insert(USERS, fields);
        }
        store
    }

    /// Assign the next id to `fields` and store the record.
    pub fn insert(&mut self, resource: Resource, mut fields: Map<String, Value>) -> Value {
        self.next_id += 1;
        let id = self.next_id;
        fields.insert("id".to_string(), json!(id));
        if resource.archivable {
            fields.entry("archived").or_insert(Value::Bool(false));
        }
        let record = Value::Object(fields);
        self.tables
            .entry(resource.name)
            .or_default()
            .insert(id, record.clone());
        record
    }

    pub fn get(&self, resource: Resource, id: u64) -> Option<&Value> {
        self.tables.get(resource.name)?.get(&id)
    }

    fn get_mut(&mut self, resource: Resource, id: u64) -> Option<&mut Value> {
        self.tables.get_mut(resource.name)?.get_mut(&id)
    }

    fn remove(&mut self, resource: Resource, id: u64) -> Option<Value> {
        self.tables.get_mut(resource.name)?.remove(&id)
    }

    fn records(&self, resource: Resource) -> impl Iterator<Item = &Value> {
        self.tables.get(resource.name).into_iter().flat_map(|t| t.values())
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::seeded()));
    Router::new()
        .merge(resource_routes(PROJECTS))
        .merge(resource_routes(CUSTOMERS))
        .merge(resource_routes(SERVICES))
        .merge(resource_routes(USERS))
        .merge(resource_routes(TIME_ENTRIES))
        .route("/myself.json", get(myself))
        .route("/account.json", get(account))
        .route("/tracker.json", get(tracker))
        .route("/tracker/{id}", put(start_tracker).delete(stop_tracker))
        .route("/daily.json", get(daily_today))
        .route("/daily/{year}/{month}/{day}", get(daily_at))
        .fallback(not_found)
        .layer(middleware::from_fn(require_api_key))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn resource_routes(resource: Resource) -> Router<Db> {
    let router = Router::new()
        .route(
            &format!("/{}.json", resource.name),
            get(move |State(db): State<Db>, Query(query): Query<HashMap<String, String>>| {
                list(db, resource, false, query)
            })
            .post(move |State(db): State<Db>, body: String| create(db, resource, body)),
        )
        .route(
            &format!("/{}/{{id}}", resource.name),
            get(move |State(db): State<Db>, Path(id): Path<String>| show(db, resource, id))
                .put(move |State(db): State<Db>, Path(id): Path<String>, body: String| {
                    update(db, resource, id, body)
                })
                .delete(move |State(db): State<Db>, Path(id): Path<String>| {
                    destroy(db, resource, id)
                }),
        );
    if !resource.archivable {
        return router;
    }
    router.route(
        &format!("/{}/archived.json", resource.name),
        get(move |State(db): State<Db>, Query(query): Query<HashMap<String, String>>| {
            list(db, resource, true, query)
        }),
    )
}

async fn require_api_key(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(API_KEY_HEADER)
        .is_some_and(|value| !value.is_empty());
    if !authorized {
        return error(
            StatusCode::UNAUTHORIZED,
            "Whoops! You need to provide an API key.",
        );
    }
    next.run(request).await
}

async fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "Whoops! We couldn't find that page.")
}

async fn myself(State(db): State<Db>) -> Response {
    let store = db.read().await;
    match store.get(USERS, OWNER_ID) {
        Some(user) => (StatusCode::OK, Json(wrap(USERS.key, user.clone()))).into_response(),
        None => error(StatusCode::NOT_FOUND, "Whoops! We couldn't find your user."),
    }
}

async fn account() -> Json<Value> {
    Json(json!({
        "account": {
            "id": 1,
            "name": "mock",
            "title": "Mock Account",
            "currency": "EUR",
        }
    }))
}

async fn list(
    db: Db,
    resource: Resource,
    archived: bool,
    query: HashMap<String, String>,
) -> Response {
    let store = db.read().await;
    let records: Vec<&Value> = store
        .records(resource)
        .filter(|record| !resource.archivable || record["archived"] == Value::Bool(archived))
        .filter(|record| matches_query(record, &query))
        .collect();

    if let Some(group_by) = query.get("group_by").filter(|_| resource == TIME_ENTRIES) {
        return match group_time_entries(&records, group_by) {
            Ok(groups) => (StatusCode::OK, Json(groups)).into_response(),
            Err(message) => error(StatusCode::UNPROCESSABLE_ENTITY, &message),
        };
    }

    let body = records
        .into_iter()
        .map(|record| wrap(resource.key, record.clone()))
        .collect();
    (StatusCode::OK, Json(Value::Array(body))).into_response()
}

async fn create(db: Db, resource: Resource, body: String) -> Response {
    let mut fields = match attributes(resource, &body) {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    if resource == TIME_ENTRIES {
        fields.entry("minutes").or_insert(json!(0));
        fields.entry("user_id").or_insert(json!(OWNER_ID));
        fields.entry("date_at").or_insert(json!(today()));
        fields.entry("locked").or_insert(json!(false));
    }
    let record = db.write().await.insert(resource, fields);
    (StatusCode::CREATED, Json(wrap(resource.key, record))).into_response()
}

async fn show(db: Db, resource: Resource, id: String) -> Response {
    let store = db.read().await;
    match parse_id(&id).and_then(|id| store.get(resource, id)) {
        Some(record) => (StatusCode::OK, Json(wrap(resource.key, record.clone()))).into_response(),
        None => record_not_found(),
    }
}

async fn update(db: Db, resource: Resource, id: String, body: String) -> Response {
    let fields = match attributes(resource, &body) {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    let mut store = db.write().await;
    let Some(Value::Object(record)) = parse_id(&id).and_then(|id| store.get_mut(resource, id))
    else {
        return record_not_found();
    };
    for (key, value) in fields {
        if key != "id" {
            record.insert(key, value);
        }
    }
    let record = Value::Object(record.clone());
    (StatusCode::OK, Json(wrap(resource.key, record))).into_response()
}

async fn destroy(db: Db, resource: Resource, id: String) -> Response {
    let mut store = db.write().await;
    let Some(id) = parse_id(&id) else {
        return record_not_found();
    };
    if store.remove(resource, id).is_none() {
        return record_not_found();
    }
    if resource == TIME_ENTRIES && store.tracking == Some(id) {
        store.tracking = None;
    }
    StatusCode::OK.into_response()
}

async fn tracker(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let tracker = match store.tracking {
        Some(id) => json!({ "tracking_time_entry": tracked_entry(&store, id) }),
        None => json!({}),
    };
    Json(json!({ "tracker": tracker }))
}

async fn start_tracker(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let mut store = db.write().await;
    let Some(id) = parse_id(&id).filter(|id| store.get(TIME_ENTRIES, *id).is_some()) else {
        return error(
            StatusCode::NOT_FOUND,
            "Whoops! We couldn't find the given entry.",
        );
    };
    let mut tracker = Map::new();
    if let Some(previous) = store.tracking.filter(|previous| *previous != id) {
        tracker.insert("stopped_time_entry".to_string(), tracked_entry(&store, previous));
    }
    store.tracking = Some(id);
    tracker.insert("tracking_time_entry".to_string(), tracked_entry(&store, id));
    Json(json!({ "tracker": tracker })).into_response()
}

async fn stop_tracker(State(db): State<Db>, Path(id): Path<String>) -> Response {
    let mut store = db.write().await;
    let id = parse_id(&id);
    if id.is_none() || store.tracking != id {
        return error(
            StatusCode::NOT_FOUND,
            "Whoops! We couldn't find the given entry.",
        );
    }
    store.tracking = None;
    let stopped = id.map(|id| tracked_entry(&store, id)).unwrap_or_default();
    Json(json!({ "tracker": { "stopped_time_entry": stopped } })).into_response()
}

async fn daily_today(State(db): State<Db>) -> Json<Value> {
    Json(entries_on(&*db.read().await, &today()))
}

async fn daily_at(
    State(db): State<Db>,
    Path((year, month, day)): Path<(i32, u32, String)>,
) -> Response {
    let date = parse_id(&day)
        .and_then(|day| u32::try_from(day).ok())
        .and_then(|day| chrono::NaiveDate::from_ymd_opt(year, month, day));
    match date {
        Some(date) => {
            let date = date.format("%Y-%m-%d").to_string();
            Json(entries_on(&*db.read().await, &date)).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Whoops! That is not a valid date."),
    }
}

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

fn entries_on(store: &Store, date: &str) -> Value {
    store
        .records(TIME_ENTRIES)
        .filter(|entry| entry["date_at"] == date && entry["user_id"] == OWNER_ID)
        .map(|entry| wrap(TIME_ENTRIES.key, entry.clone()))
        .collect()
}

fn tracked_entry(store: &Store, id: u64) -> Value {
    let minutes = store
        .get(TIME_ENTRIES, id)
        .map(|entry| entry["minutes"].clone())
        .unwrap_or(json!(0));
    json!({ "id": id, "minutes": minutes })
}

/// Sum minutes per distinct combination of the requested fields.
///
/// `week`, `month` and `year` bucket `date_at` as `2024-W05`, `2024-01` and
/// `2024`.
fn group_time_entries(entries: &[&Value], group_by: &str) -> Result<Value, String> {
    let groups: Vec<&str> = group_by.split(',').map(str::trim).collect();
    if let Some(other) = groups.iter().find(|group| !GROUPINGS.contains(*group)) {
        return Err(format!("Whoops! Cannot group by '{other}'."));
    }

    let mut totals: BTreeMap<String, (Map<String, Value>, i64)> = BTreeMap::new();
    for entry in entries {
        let params: Map<String, Value> = groups
            .iter()
            .map(|group| group_value(entry, group))
            .collect();
        let key = Value::Object(params.clone()).to_string();
        let minutes = entry["minutes"].as_i64().unwrap_or(0);
        totals.entry(key).or_insert((params, 0)).1 += minutes;
    }

    Ok(totals
        .into_values()
        .map(|(params, minutes)| {
            let mut group = params.clone();
            group.insert("minutes".to_string(), json!(minutes));
            group.insert("time_entries_params".to_string(), Value::Object(params));
            json!({ "time_entry_group": group })
        })
        .collect())
}

const GROUPINGS: [&str; 8] = [
    "customer", "project", "service", "user", "day", "week", "month", "year",
];

/// The field name and bucket value `entry` falls into for `group`.
fn group_value(entry: &Value, group: &str) -> (String, Value) {
    let date = entry["date_at"]
        .as_str()
        .and_then(|date| chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok());
    let bucket = |format: &str| {
        date.map(|date| json!(date.format(format).to_string()))
            .unwrap_or(Value::Null)
    };
    match group {
        "day" => ("date_at".to_string(), entry["date_at"].clone()),
        "week" => ("week".to_string(), bucket("%G-W%V")),
        "month" => ("month".to_string(), bucket("%Y-%m")),
        "year" => ("year".to_string(), bucket("%Y")),
        _ => (format!("{group}_id"), entry[format!("{group}_id").as_str()].clone()),
    }
}

fn matches_query(record: &Value, query: &HashMap<String, String>) -> bool {
    query.iter().all(|(key, expected)| match key.as_str() {
        "group_by" => true,
        "name" | "note" | "email" => record[key.as_str()]
            .as_str()
            .is_some_and(|actual| actual.to_lowercase().contains(&expected.to_lowercase())),
        "from" => record["date_at"]
            .as_str()
            .is_some_and(|date| date >= expected.as_str()),
        "to" => record["date_at"]
            .as_str()
            .is_some_and(|date| date <= expected.as_str()),
        // Relative ranges like `this_week` are accepted but not applied.
        "at" if !is_iso_date(expected) => true,
        "at" => record["date_at"] == expected.as_str(),
        _ => render(&record[key.as_str()]) == *expected,
    })
}

fn is_iso_date(value: &str) -> bool {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Extract the attributes under the resource key from a request body.
fn attributes(resource: Resource, body: &str) -> Result<Map<String, Value>, Response> {
    let parsed: Value = serde_json::from_str(body).map_err(|_| {
        error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Whoops! The request body is not valid JSON.",
        )
    })?;
    match parsed.get(resource.key) {
        Some(Value::Object(fields)) => Ok(fields.clone()),
        _ => Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            &format!("Whoops! Expected a '{}' object.", resource.key),
        )),
    }
}

fn parse_id(segment: &str) -> Option<u64> {
    segment
        .strip_suffix(".json")
        .unwrap_or(segment)
        .parse()
        .ok()
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn wrap(key: &str, record: Value) -> Value {
    let mut object = Map::new();
    object.insert(key.to_string(), record);
    Value::Object(object)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn record_not_found() -> Response {
    error(StatusCode::NOT_FOUND, "Whoops! We couldn't find the given record.")
}
