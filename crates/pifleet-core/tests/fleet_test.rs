#![allow(clippy::unwrap_used)]
// Integration tests for `Fleet` against wiremock-backed appliances.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pifleet_core::{
    ActionStatus, EntityKind, Fleet, FleetConfig, Instance, InstanceEdit, InstanceStatus,
    MemoryStore, NewInstance, Session, UNREACHABLE_MESSAGE,
};

// ── Helpers ─────────────────────────────────────────────────────────

type TestFleet = Fleet<Arc<MemoryStore>>;

fn fleet(instances: Vec<Instance>) -> (TestFleet, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new(instances));
    let fleet = Fleet::with_http_client(
        Arc::clone(&store),
        FleetConfig::default(),
        reqwest::Client::new(),
    );
    (fleet, store)
}

/// An instance that already holds session `sid` and is cached as active.
fn active(id: u32, name: &str, server: &MockServer, sid: &str) -> Instance {
    let mut instance = Instance::new(id, name, server.uri(), format!("key-{name}"));
    instance.activate(Session::new(sid, format!("csrf-{sid}")));
    instance
}

fn fresh(id: u32, name: &str, url: &str) -> Instance {
    Instance::new(id, name, url, format!("key-{name}"))
}

/// URL of a port nothing listens on.
fn closed_url() -> String {
    "http://127.0.0.1:1".to_owned()
}

async fn mount_session_valid(server: &MockServer, sid: &str) {
    Mock::given(method("GET"))
        .and(path("/api/auth"))
        .and(header("sid", sid))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session": { "valid": true }
        })))
        .mount(server)
        .await;
}

async fn mount_session_rejected(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(401))
        .mount(server)
        .await;
}

async fn mount_login(server: &MockServer, sid: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session": { "valid": true, "sid": sid, "csrf": format!("csrf-{sid}") }
        })))
        .mount(server)
        .await;
}

async fn mount_login_rejected(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(401))
        .mount(server)
        .await;
}

fn processed_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "processed": { "success": [{ "item": "x" }], "errors": [] }
    }))
}

fn by_instance<'a>(statuses: &'a [ActionStatus], name: &str) -> &'a ActionStatus {
    statuses.iter().find(|s| s.instance == name).unwrap()
}

fn reference_ids(instances: &[Instance]) -> Vec<u32> {
    instances
        .iter()
        .filter(|i| i.is_reference)
        .map(|i| i.id)
        .collect()
}

// ── Session lifecycle ───────────────────────────────────────────────

#[tokio::test]
async fn test_ensure_authenticated_is_idempotent() {
    let server = MockServer::start().await;
    mount_session_valid(&server, "s1").await;
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (fleet, store) = fleet(vec![active(1, "a", &server, "s1")]);

    assert_eq!(fleet.ensure_authenticated(1).await.unwrap(), InstanceStatus::Active);
    assert_eq!(fleet.ensure_authenticated(1).await.unwrap(), InstanceStatus::Active);
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_rejected_session_triggers_login_and_persists() {
    let server = MockServer::start().await;
    mount_session_rejected(&server).await;
    mount_login(&server, "fresh").await;

    let (fleet, store) = fleet(vec![active(1, "a", &server, "stale")]);

    let instance = fleet.refresh_status(1).await.unwrap();
    assert_eq!(instance.status, InstanceStatus::Active);
    assert_eq!(instance.sid, "fresh");
    assert!(!instance.csrf.is_empty());

    let stored = store.snapshot().await;
    assert_eq!(stored[0].sid, "fresh");
    assert_eq!(store.writes(), 1);
}

#[tokio::test]
async fn test_fresh_instance_checks_session_before_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session": { "valid": true, "sid": "first", "csrf": "csrf-first" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (fleet, store) = fleet(vec![fresh(1, "a", &server.uri())]);

    assert_eq!(fleet.ensure_authenticated(1).await.unwrap(), InstanceStatus::Active);
    assert_eq!(store.snapshot().await[0].sid, "first");
}

#[tokio::test]
async fn test_check_accepted_without_session_still_logs_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "session": { "valid": true }
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_login(&server, "granted").await;

    let (fleet, _store) = fleet(vec![fresh(1, "a", &server.uri())]);

    let instance = fleet.refresh_status(1).await.unwrap();
    assert_eq!(instance.status, InstanceStatus::Active);
    assert_eq!(instance.sid, "granted");
}

#[tokio::test]
async fn test_unauthorized_login_clears_session() {
    let server = MockServer::start().await;
    mount_session_rejected(&server).await;
    mount_login_rejected(&server).await;

    let (fleet, store) = fleet(vec![active(1, "a", &server, "stale")]);

    let instance = fleet.refresh_status(1).await.unwrap();
    assert_eq!(instance.status, InstanceStatus::Unauthorized);
    assert!(instance.sid.is_empty());
    assert!(instance.csrf.is_empty());
    assert_eq!(store.snapshot().await[0].status, InstanceStatus::Unauthorized);
}

#[tokio::test]
async fn test_server_error_on_login_is_unreachable() {
    let server = MockServer::start().await;
    mount_session_rejected(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (fleet, _store) = fleet(vec![active(1, "a", &server, "stale")]);

    let instance = fleet.refresh_status(1).await.unwrap();
    assert_eq!(instance.status, InstanceStatus::Unreachable);
    assert!(instance.sid.is_empty());
}

#[tokio::test]
async fn test_unknown_instance_is_not_found() {
    let (fleet, _store) = fleet(Vec::new());
    let err = fleet.ensure_authenticated(42).await.unwrap_err();
    assert!(matches!(err, pifleet_core::CoreError::InstanceNotFound { id: 42 }));
}

// ── Fleet-wide refresh ──────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_all_without_changes_writes_nothing() {
    let a = MockServer::start().await;
    mount_session_valid(&a, "sa").await;

    let b = MockServer::start().await;
    mount_login_rejected(&b).await;
    let mut unauthorized = fresh(2, "b", &b.uri());
    unauthorized.status = InstanceStatus::Unauthorized;

    let unreachable = fresh(3, "c", &closed_url());

    let (fleet, store) = fleet(vec![active(1, "a", &a, "sa"), unauthorized, unreachable]);

    let instances = fleet.refresh_all().await.unwrap();
    assert_eq!(instances.len(), 3);
    assert_eq!(instances[0].status, InstanceStatus::Active);
    assert_eq!(instances[1].status, InstanceStatus::Unauthorized);
    assert_eq!(instances[2].status, InstanceStatus::Unreachable);
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_refresh_all_writes_once_for_several_changes() {
    let a = MockServer::start().await;
    mount_login(&a, "sa").await;
    let b = MockServer::start().await;
    mount_login(&b, "sb").await;

    let (fleet, store) = fleet(vec![fresh(1, "a", &a.uri()), fresh(2, "b", &b.uri())]);

    let instances = fleet.refresh_all().await.unwrap();
    assert!(instances.iter().all(|i| i.status == InstanceStatus::Active));
    assert_eq!(store.writes(), 1);

    let stored = store.snapshot().await;
    assert_eq!(stored[0].sid, "sa");
    assert_eq!(stored[1].sid, "sb");
}

// ── Actions ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_restart_short_circuits_when_not_active() {
    let server = MockServer::start().await;
    mount_login_rejected(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/action/restartdns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(0)
        .mount(&server)
        .await;

    let (fleet, _store) = fleet(vec![fresh(1, "den", &server.uri())]);

    let status = fleet.restart(1).await;
    assert!(!status.success);
    assert_eq!(status.instance, "den");
    assert_eq!(status.message, UNREACHABLE_MESSAGE);
    assert_eq!(status.instance_status, Some(InstanceStatus::Unauthorized));
}

#[tokio::test]
async fn test_restart_requires_ok_body() {
    let server = MockServer::start().await;
    mount_session_valid(&server, "s1").await;
    Mock::given(method("POST"))
        .and(path("/api/action/restartdns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "took": 0.2 })))
        .mount(&server)
        .await;

    let (fleet, _store) = fleet(vec![active(1, "den", &server, "s1")]);

    let status = fleet.restart(1).await;
    assert!(!status.success);
    assert_eq!(status.message, "Failed to restart DNS");
}

#[tokio::test]
async fn test_restart_succeeds() {
    let server = MockServer::start().await;
    mount_session_valid(&server, "s1").await;
    Mock::given(method("POST"))
        .and(path("/api/action/restartdns"))
        .and(header("X-FTL-CSRF", "csrf-s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let (fleet, _store) = fleet(vec![active(1, "den", &server, "s1")]);

    let status = fleet.restart(1).await;
    assert!(status.success);
    assert_eq!(status.message, "DNS restarted successfully");
    assert_eq!(status.instance_status, Some(InstanceStatus::Active));
}

#[tokio::test]
async fn test_pause_is_attempted_even_when_not_active() {
    let server = MockServer::start().await;
    mount_login_rejected(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/dns/blocking"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let (fleet, _store) = fleet(vec![fresh(1, "den", &server.uri())]);

    let status = fleet.pause(1, 300).await;
    assert!(!status.success);
    assert_eq!(status.message, "Failed to pause DNS blocking for 5 minutes");
}

#[tokio::test]
async fn test_pause_all_fans_out() {
    let a = MockServer::start().await;
    mount_session_valid(&a, "sa").await;
    Mock::given(method("POST"))
        .and(path("/api/dns/blocking"))
        .and(body_partial_json(json!({ "blocking": false, "timer": 60 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&a)
        .await;

    let b = MockServer::start().await;
    mount_session_valid(&b, "sb").await;
    Mock::given(method("POST"))
        .and(path("/api/dns/blocking"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&b)
        .await;

    let (fleet, _store) = fleet(vec![active(1, "a", &a, "sa"), active(2, "b", &b, "sb")]);

    let statuses = fleet.pause_all(60).await;
    assert_eq!(statuses.len(), 2);
    assert!(by_instance(&statuses, "a").success);
    assert_eq!(
        by_instance(&statuses, "a").message,
        "DNS blocking paused successfully for 1 minute"
    );
    assert!(!by_instance(&statuses, "b").success);
}

#[tokio::test]
async fn test_gravity_and_resume_succeed_on_200() {
    let server = MockServer::start().await;
    mount_session_valid(&server, "s1").await;
    Mock::given(method("POST"))
        .and(path("/api/action/gravity"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/dns/blocking"))
        .and(body_partial_json(json!({ "blocking": true })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (fleet, _store) = fleet(vec![active(1, "den", &server, "s1")]);

    let gravity = fleet.rebuild_gravity(1).await;
    assert!(gravity.success);
    assert_eq!(gravity.message, "Gravities updated successfully");

    let resume = fleet.resume(1).await;
    assert!(resume.success);
    assert_eq!(resume.message, "DNS blocking resumed successfully");
}

#[tokio::test]
async fn test_action_on_unknown_id_is_attributed_to_unknown_instance() {
    let (fleet, _store) = fleet(Vec::new());
    let status = fleet.resume(7).await;
    assert!(!status.success);
    assert_eq!(status.instance, "Unknown instance");
    assert_eq!(status.instance_status, None);
}

// ── Reference sync ──────────────────────────────────────────────────

async fn mount_reference_groups(server: &MockServer, names: &[&str]) {
    let groups: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(id, name)| json!({ "name": name, "comment": null, "enabled": true, "id": id }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "groups": groups })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sync_continues_after_failed_upsert() {
    let reference = MockServer::start().await;
    mount_session_valid(&reference, "ref").await;
    mount_reference_groups(&reference, &["one", "two", "three"]).await;

    let target = MockServer::start().await;
    mount_session_valid(&target, "tgt").await;
    Mock::given(method("PUT"))
        .and(path("/api/groups/one"))
        .respond_with(processed_ok())
        .expect(1)
        .mount(&target)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/groups/two"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "processed": { "success": [], "errors": [{ "item": "two", "error": "boom" }] }
        })))
        .expect(1)
        .mount(&target)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/groups/three"))
        .respond_with(processed_ok())
        .expect(1)
        .mount(&target)
        .await;

    let mut reference_instance = active(1, "ref", &reference, "ref");
    reference_instance.is_reference = true;
    let (fleet, _store) = fleet(vec![reference_instance, active(2, "tgt", &target, "tgt")]);

    let statuses = fleet.sync_from_reference(EntityKind::Groups).await;
    assert_eq!(statuses.len(), 1);
    assert!(!statuses[0].success);
    assert_eq!(statuses[0].instance, "tgt");
    assert_eq!(statuses[0].message, "Failed to update groups");
}

#[tokio::test]
async fn test_sync_skips_inactive_instances_without_network_calls() {
    let a = MockServer::start().await;
    mount_session_valid(&a, "sa").await;
    mount_reference_groups(&a, &["Default", "Kids"]).await;

    let b = MockServer::start().await;
    mount_session_valid(&b, "sb").await;
    Mock::given(method("PUT"))
        .respond_with(processed_ok())
        .expect(2)
        .mount(&b)
        .await;

    let c = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&c)
        .await;

    let mut reference = active(1, "A", &a, "sa");
    reference.is_reference = true;
    let unreachable = fresh(3, "C", &c.uri());
    let (fleet, _store) = fleet(vec![reference, active(2, "B", &b, "sb"), unreachable]);

    let statuses = fleet.sync_from_reference(EntityKind::Groups).await;
    assert_eq!(statuses.len(), 2);

    let b_status = by_instance(&statuses, "B");
    assert!(b_status.success);
    assert_eq!(b_status.message, "Groups updated successfully");

    let c_status = by_instance(&statuses, "C");
    assert!(!c_status.success);
    assert_eq!(c_status.message, "Instance is not active");
    assert_eq!(c_status.instance_status, Some(InstanceStatus::Unreachable));
}

#[tokio::test]
async fn test_sync_without_reference_fails_once() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let (fleet, _store) = fleet(vec![active(1, "a", &server, "s"), active(2, "b", &server, "s")]);

    let statuses = fleet.sync_from_reference(EntityKind::Domains).await;
    assert_eq!(statuses.len(), 1);
    assert!(!statuses[0].success);
    assert_eq!(statuses[0].instance, "Unknown instance");
    assert_eq!(statuses[0].message, "Reference instance not found");
}

#[tokio::test]
async fn test_sync_aborts_when_reference_lacks_collection() {
    let reference = MockServer::start().await;
    mount_session_valid(&reference, "ref").await;
    Mock::given(method("GET"))
        .and(path("/api/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "took": 0.0 })))
        .mount(&reference)
        .await;

    let target = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(processed_ok())
        .expect(0)
        .mount(&target)
        .await;

    let mut reference_instance = active(1, "ref", &reference, "ref");
    reference_instance.is_reference = true;
    let (fleet, _store) = fleet(vec![reference_instance, active(2, "tgt", &target, "tgt")]);

    let statuses = fleet.sync_from_reference(EntityKind::Lists).await;
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].instance, "ref");
    assert_eq!(statuses[0].message, "Couldn't get the lists from the reference");
}

#[tokio::test]
async fn test_sync_all_runs_every_kind() {
    let reference = MockServer::start().await;
    mount_session_valid(&reference, "ref").await;
    for collection in ["groups", "lists", "domains", "clients"] {
        Mock::given(method("GET"))
            .and(path(format!("/api/{collection}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ collection: [] })))
            .mount(&reference)
            .await;
    }

    let target = MockServer::start().await;
    mount_session_valid(&target, "tgt").await;

    let mut reference_instance = active(1, "ref", &reference, "ref");
    reference_instance.is_reference = true;
    let (fleet, _store) = fleet(vec![reference_instance, active(2, "tgt", &target, "tgt")]);

    let statuses = fleet.sync_all().await;
    let messages: Vec<_> = statuses.iter().map(|s| s.message.as_str()).collect();
    assert_eq!(
        messages,
        [
            "Groups updated successfully",
            "Lists updated successfully",
            "Domains updated successfully",
            "Clients updated successfully"
        ]
    );
}

// ── Instance management ─────────────────────────────────────────────

#[tokio::test]
async fn test_first_added_instance_becomes_reference() {
    let server = MockServer::start().await;
    mount_login(&server, "s").await;

    let (fleet, _store) = fleet(Vec::new());

    let first = fleet
        .add_instance(NewInstance {
            name: "first".into(),
            url: server.uri(),
            api_key: "k".into(),
            is_reference: false,
        })
        .await
        .unwrap();
    assert_eq!(first.id, 1);
    assert!(first.is_reference);
    assert_eq!(first.status, InstanceStatus::Active);

    let second = fleet
        .add_instance(NewInstance {
            name: "second".into(),
            url: server.uri(),
            api_key: "k".into(),
            is_reference: true,
        })
        .await
        .unwrap();
    assert_eq!(second.id, 2);

    let stored = fleet.instances().await.unwrap();
    assert_eq!(reference_ids(&stored), vec![2]);
}

#[tokio::test]
async fn test_add_rejects_invalid_url() {
    let (fleet, store) = fleet(Vec::new());
    let err = fleet
        .add_instance(NewInstance {
            name: "x".into(),
            url: "not a url".into(),
            api_key: "k".into(),
            is_reference: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, pifleet_core::CoreError::Validation { .. }));
    assert_eq!(store.writes(), 0);
}

#[tokio::test]
async fn test_removing_reference_promotes_first_remaining() {
    let url = closed_url();
    let mut a = fresh(1, "a", &url);
    a.is_reference = true;
    let (fleet, _store) = fleet(vec![a, fresh(2, "b", &url), fresh(3, "c", &url)]);

    let removed = fleet.remove_instance(1).await.unwrap();
    assert_eq!(removed.name, "a");
    assert_eq!(reference_ids(&fleet.instances().await.unwrap()), vec![2]);

    fleet.remove_instance(3).await.unwrap();
    fleet.remove_instance(2).await.unwrap();
    assert!(fleet.instances().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clearing_reference_promotes_another() {
    let url = closed_url();
    let mut a = fresh(1, "a", &url);
    a.is_reference = true;
    let (fleet, _store) = fleet(vec![a, fresh(2, "b", &url)]);

    fleet
        .edit_instance(
            1,
            InstanceEdit {
                is_reference: Some(false),
                ..InstanceEdit::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(reference_ids(&fleet.instances().await.unwrap()), vec![2]);

    fleet.set_reference(1).await.unwrap();
    assert_eq!(reference_ids(&fleet.instances().await.unwrap()), vec![1]);
}

#[tokio::test]
async fn test_sole_reference_cannot_be_cleared() {
    let mut a = fresh(1, "a", &closed_url());
    a.is_reference = true;
    let (fleet, store) = fleet(vec![a]);

    let err = fleet
        .edit_instance(
            1,
            InstanceEdit {
                is_reference: Some(false),
                ..InstanceEdit::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, pifleet_core::CoreError::Validation { .. }));
    assert_eq!(store.writes(), 0);
    assert_eq!(reference_ids(&fleet.instances().await.unwrap()), vec![1]);
}

#[tokio::test]
async fn test_add_restores_missing_reference() {
    let server = MockServer::start().await;
    mount_login(&server, "s").await;

    // A collection edited by hand so that nothing is flagged.
    let (fleet, _store) = fleet(vec![fresh(1, "a", &closed_url())]);

    let added = fleet
        .add_instance(NewInstance {
            name: "b".into(),
            url: server.uri(),
            api_key: "k".into(),
            is_reference: false,
        })
        .await
        .unwrap();
    assert!(!added.is_reference);

    let stored = fleet.instances().await.unwrap();
    assert_eq!(reference_ids(&stored), vec![1]);
}

#[tokio::test]
async fn test_changing_url_reauthenticates() {
    let old = MockServer::start().await;
    let new = MockServer::start().await;
    mount_login(&new, "new-sid").await;

    let (fleet, _store) = fleet(vec![active(1, "a", &old, "old-sid")]);

    let edited = fleet
        .edit_instance(
            1,
            InstanceEdit {
                url: Some(new.uri()),
                name: Some("renamed".into()),
                ..InstanceEdit::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.name, "renamed");
    assert_eq!(edited.sid, "new-sid");
    assert_eq!(edited.status, InstanceStatus::Active);

    let stored = fleet.instance(1).await.unwrap();
    assert_eq!(stored.url, new.uri());
    assert_eq!(stored.sid, "new-sid");
}

// ── Stats & background refresh ──────────────────────────────────────

#[tokio::test]
async fn test_stats_returns_summary_and_status() {
    let server = MockServer::start().await;
    mount_session_valid(&server, "s1").await;
    Mock::given(method("GET"))
        .and(path("/api/stats/summary"))
        .and(header("sid", "s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "queries": { "total": 10, "blocked": 4, "percent_blocked": 40.0 },
            "clients": { "active": 2, "total": 3 },
            "gravity": { "domains_being_blocked": 99, "last_update": 0 }
        })))
        .mount(&server)
        .await;

    let (fleet, _store) = fleet(vec![active(1, "den", &server, "s1")]);

    let (summary, status) = fleet.stats(1).await.unwrap();
    assert_eq!(summary.queries.blocked, 4);
    assert_eq!(status, InstanceStatus::Active);
}

#[tokio::test]
async fn test_refresh_task_stops_on_cancel() {
    let server = MockServer::start().await;
    mount_login(&server, "s").await;

    let (fleet, store) = fleet(vec![fresh(1, "a", &server.uri())]);
    let cancel = CancellationToken::new();
    let handle = fleet.spawn_refresh_task(Duration::from_millis(20), cancel.clone());

    tokio::time::timeout(Duration::from_secs(5), async {
        while store.snapshot().await[0].status != InstanceStatus::Active {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}
