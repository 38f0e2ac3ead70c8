//! Full lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every adapter over
//! real HTTP with the default `UreqTransport`. The only indirection is a
//! transport that points the account host at the local server.

use std::sync::Arc;

use chrono::NaiveDate;
use mite_core::{
    api_error, ArchivableAdapter, GroupBy, HttpRequest, HttpResponse, Mite, MiteError,
    ReadAdapter, TimeEntryFilter, Transport, UreqTransport, WriteAdapter,
};
use serde_json::{json, Value};

/// Sends requests for `https://foo.mite.yo.lk` to the local mock server.
struct LocalTransport {
    inner: UreqTransport,
    origin: String,
}

impl Transport for LocalTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, MiteError> {
        let mut request = request.clone();
        request.url = request
            .url
            .replacen("https://foo.mite.yo.lk", &self.origin, 1);
        self.inner.execute(&request)
    }
}

/// Start the mock server on a random port and return its origin.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn local_mite(origin: &str, apikey: &str) -> Mite {
    let transport = Arc::new(LocalTransport {
        inner: UreqTransport::new(),
        origin: origin.to_string(),
    });
    Mite::with_transport("foo", apikey, transport)
}

fn id_of(record: &Value) -> u64 {
    record["id"].as_u64().expect("record has no id")
}

fn len(value: &Value) -> usize {
    value.as_array().expect("expected a list").len()
}

#[test]
fn full_lifecycle() {
    // Step 1: start mock server on a random port.
    let origin = start_server();
    let mite = local_mite(&origin, "bar");

    // Step 2: account level endpoints.
    let me = mite.api().myself().unwrap();
    assert_eq!(me["role"], "owner");
    let owner_id = id_of(&me);
    let account = mite.api().account().unwrap();
    assert!(account.is_object());
    assert!(api_error(&account).is_none());

    // Step 3: projects start empty.
    assert_eq!(mite.projects().all().unwrap(), json!([]));

    // Step 4: create a customer, a service and a project.
    let customer = mite
        .customers()
        .create(json!({"name": "John Cleese"}))
        .unwrap();
    let service = mite
        .services()
        .create(json!({"name": "Sketch Writing"}))
        .unwrap();
    let project = mite
        .projects()
        .create(json!({
            "name": "Bicycle Repair Man",
            "customer_id": id_of(&customer),
        }))
        .unwrap();
    assert_eq!(project["name"], "Bicycle Repair Man");
    assert_eq!(project["archived"], false);
    let project_id = id_of(&project);

    // Step 5: fetch it back by id and by name.
    assert_eq!(mite.projects().by_id(project_id).unwrap(), project);
    let found = mite.projects().by_name("Bicycle Repair Man", false).unwrap();
    assert_eq!(found, json!([project]));

    // Step 6: archive it.
    let archived = mite
        .projects()
        .update(project_id, json!({"archived": true}))
        .unwrap();
    assert_eq!(archived["archived"], true);
    assert_eq!(mite.projects().all().unwrap(), json!([]));
    let found = mite.projects().by_name("Bicycle Repair Man", true).unwrap();
    assert_eq!(found[0]["archived"], true);
    assert_eq!(len(&mite.projects().archived().unwrap()), 1);

    // Step 7: users are read-only and hold the owner.
    assert_eq!(len(&mite.users().all().unwrap()), 1);
    let by_email = mite.users().by_email("owner@example.com", false).unwrap();
    assert_eq!(id_of(&by_email[0]), owner_id);

    // Step 8: book time.
    let entry = mite
        .time_entries()
        .create(json!({
            "minutes": 42,
            "note": "foo",
            "project_id": project_id,
            "service_id": id_of(&service),
        }))
        .unwrap();
    let entry_id = id_of(&entry);
    assert_eq!(entry["minutes"], 42);

    let filter = TimeEntryFilter {
        project_id: Some(project_id),
        ..Default::default()
    };
    assert_eq!(len(&mite.time_entries().filtered(&filter).unwrap()), 1);
    let groups = mite
        .time_entries()
        .grouped(&[GroupBy::Project], &TimeEntryFilter::default())
        .unwrap();
    assert_eq!(groups[0]["project_id"], project_id);
    assert_eq!(groups[0]["minutes"], 42);
    for period in [GroupBy::Week, GroupBy::Month, GroupBy::Year] {
        let groups = mite
            .time_entries()
            .grouped(&[period], &TimeEntryFilter::default())
            .unwrap();
        assert_eq!(len(&groups), 1, "grouped by {}", period.as_str());
        assert_eq!(groups[0]["minutes"], 42);
        assert!(groups[0][period.as_str()].is_string());
    }

    // Step 9: daily summary for the entry's day.
    let date_at = entry["date_at"].as_str().unwrap();
    let date = NaiveDate::parse_from_str(date_at, "%Y-%m-%d").unwrap();
    let daily = mite.daily().at(date).unwrap();
    assert_eq!(id_of(&daily[0]), entry_id);
    assert!(mite.daily().today().unwrap().is_array());

    // Step 10: run the tracker.
    assert_eq!(mite.tracker().current().unwrap(), json!({}));
    let started = mite.tracker().start(entry_id).unwrap();
    assert_eq!(started["tracking_time_entry"]["id"], entry_id);
    let stopped = mite.tracker().stop(entry_id).unwrap();
    assert_eq!(stopped["stopped_time_entry"]["id"], entry_id);

    // Step 11: stopping again comes back as an error body, not an Err.
    let again = mite.tracker().stop(entry_id).unwrap();
    assert_eq!(
        api_error(&again),
        Some("Whoops! We couldn't find the given entry.")
    );

    // Step 12: delete, then the record is gone.
    assert_eq!(mite.time_entries().delete(entry_id).unwrap(), Value::Null);
    let missing = mite.time_entries().by_id(entry_id).unwrap();
    assert!(api_error(&missing).is_some());
    let missing = mite.projects().delete(project_id + 1000).unwrap();
    assert!(api_error(&missing).is_some());
}

#[test]
fn missing_api_key_is_reported_as_data() {
    let origin = start_server();
    let mite = local_mite(&origin, "");

    let me = mite.api().myself().unwrap();
    assert_eq!(
        api_error(&me),
        Some("Whoops! You need to provide an API key.")
    );
}

#[test]
fn unreachable_host_is_a_transport_error() {
    // Bind and drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let mite = local_mite(&format!("http://{addr}"), "bar");

    let err = mite.projects().all().unwrap_err();
    assert!(matches!(err, MiteError::Transport(_)));
}
