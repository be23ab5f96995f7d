use actix_web::{test, App};
use lostfound::repo::inmem::InMemRepo;
use lostfound::{config, AppState, SESSION_HEADER};
use serde_json::{json, Value};
use std::sync::Arc;

fn state() -> actix_web::web::Data<AppState> {
    actix_web::web::Data::new(AppState::new(Arc::new(InMemRepo::new())))
}

fn report(kind: &str, item: &str, location: &str) -> Value {
    json!({"kind": kind, "itemName": item, "location": location, "description": ""})
}

fn post_report(session: &str, body: &Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/v1/reports")
        .insert_header((SESSION_HEADER, session))
        .set_json(body)
}

fn get(session: &str, uri: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri).insert_header((SESSION_HEADER, session))
}

fn delete(session: &str, uri: &str) -> test::TestRequest {
    test::TestRequest::delete().uri(uri).insert_header((SESSION_HEADER, session))
}

fn item_names(list: &Value) -> Vec<&str> {
    list.as_array().unwrap().iter().map(|r| r["itemName"].as_str().unwrap()).collect()
}

macro_rules! open_session {
    ($app:expr) => {{
        let req = test::TestRequest::post().uri("/api/v1/sessions").to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), 201);
        let body: Value = test::read_body_json(resp).await;
        body["sessionId"].as_str().unwrap().to_string()
    }};
}

#[actix_web::test]
async fn single_report_is_listed_at_position_zero() {
    let app = test::init_service(App::new().app_data(state()).configure(config)).await;
    let s = open_session!(app);

    // empty to start
    let list: Value = test::call_and_read_body_json(&app, get(&s, "/api/v1/reports").to_request()).await;
    assert!(list.as_array().unwrap().is_empty());

    let resp = test::call_service(&app, post_report(&s, &report("lost", "Wallet", "Cafeteria")).to_request()).await;
    assert_eq!(resp.status(), 201);
    assert!(test::read_body(resp).await.is_empty());

    let list: Value = test::call_and_read_body_json(&app, get(&s, "/api/v1/reports").to_request()).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["kind"], "lost");
    assert_eq!(list[0]["itemName"], "Wallet");
    assert_eq!(list[0]["location"], "Cafeteria");
    assert_eq!(list[0]["description"], "");
    assert!(list[0]["createdAt"].is_string());
    assert!(list[0]["id"].is_string());
}

#[actix_web::test]
async fn newest_first_and_delete_by_position_shifts() {
    let app = test::init_service(App::new().app_data(state()).configure(config)).await;
    let s = open_session!(app);

    for item in ["A", "B", "C"] {
        let resp = test::call_service(&app, post_report(&s, &report("found", item, "Hall")).to_request()).await;
        assert_eq!(resp.status(), 201);
    }
    let list: Value = test::call_and_read_body_json(&app, get(&s, "/api/v1/reports").to_request()).await;
    assert_eq!(item_names(&list), vec!["C", "B", "A"]);

    let resp = test::call_service(&app, delete(&s, "/api/v1/reports/1").to_request()).await;
    assert_eq!(resp.status(), 204);

    let list: Value = test::call_and_read_body_json(&app, get(&s, "/api/v1/reports").to_request()).await;
    assert_eq!(item_names(&list), vec!["C", "A"]);

    let count: Value = test::call_and_read_body_json(&app, get(&s, "/api/v1/reports/count").to_request()).await;
    assert_eq!(count["count"], 2);
}

#[actix_web::test]
async fn blank_required_fields_are_rejected_without_storing() {
    let app = test::init_service(App::new().app_data(state()).configure(config)).await;
    let s = open_session!(app);

    let resp = test::call_service(&app, post_report(&s, &report("lost", "", "Cafeteria")).to_request()).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation failed");
    let fields: Vec<&str> = body["fields"].as_array().unwrap().iter().map(|f| f["field"].as_str().unwrap()).collect();
    assert_eq!(fields, vec!["itemName"]);

    // whitespace only, both missing
    let resp = test::call_service(&app, post_report(&s, &report("found", "  ", "\t")).to_request()).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["fields"].as_array().unwrap().len(), 2);

    // fields absent altogether
    let resp = test::call_service(&app, post_report(&s, &json!({"kind": "lost"})).to_request()).await;
    assert_eq!(resp.status(), 400);

    let count: Value = test::call_and_read_body_json(&app, get(&s, "/api/v1/reports/count").to_request()).await;
    assert_eq!(count["count"], 0);
}

#[actix_web::test]
async fn malformed_bodies_are_bad_requests() {
    let app = test::init_service(App::new().app_data(state()).configure(config)).await;
    let s = open_session!(app);

    let resp = test::call_service(&app, post_report(&s, &report("stolen", "Bike", "Rack")).to_request()).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("invalid report body"));

    let resp = test::call_service(&app, post_report(&s, &json!({"itemName": "Bike", "location": "Rack"})).to_request()).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn out_of_range_positions_leave_the_list_alone() {
    let app = test::init_service(App::new().app_data(state()).configure(config)).await;
    let s = open_session!(app);

    // empty store
    let resp = test::call_service(&app, delete(&s, "/api/v1/reports/0").to_request()).await;
    assert_eq!(resp.status(), 404);

    test::call_service(&app, post_report(&s, &report("lost", "Keys", "Lab")).to_request()).await;

    for uri in ["/api/v1/reports/1", "/api/v1/reports/-1", "/api/v1/reports/99"] {
        let resp = test::call_service(&app, delete(&s, uri).to_request()).await;
        assert_eq!(resp.status(), 404, "{uri}");
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("out of range"));
    }

    // `count` and `by-id` are fixed segments, but still non-integer positions
    for uri in ["/api/v1/reports/first", "/api/v1/reports/count", "/api/v1/reports/by-id"] {
        let resp = test::call_service(&app, delete(&s, uri).to_request()).await;
        assert_eq!(resp.status(), 400, "{uri}");
    }

    let list: Value = test::call_and_read_body_json(&app, get(&s, "/api/v1/reports").to_request()).await;
    assert_eq!(item_names(&list), vec!["Keys"]);
}

#[actix_web::test]
async fn delete_by_id_survives_position_shifts() {
    let app = test::init_service(App::new().app_data(state()).configure(config)).await;
    let s = open_session!(app);

    test::call_service(&app, post_report(&s, &report("lost", "Umbrella", "Lobby")).to_request()).await;
    let list: Value = test::call_and_read_body_json(&app, get(&s, "/api/v1/reports").to_request()).await;
    let id = list[0]["id"].as_str().unwrap().to_string();

    test::call_service(&app, post_report(&s, &report("found", "Scarf", "Gym")).to_request()).await;

    let uri = format!("/api/v1/reports/by-id/{id}");
    let resp = test::call_service(&app, delete(&s, &uri).to_request()).await;
    assert_eq!(resp.status(), 204);
    let resp = test::call_service(&app, delete(&s, &uri).to_request()).await;
    assert_eq!(resp.status(), 404);

    let list: Value = test::call_and_read_body_json(&app, get(&s, "/api/v1/reports").to_request()).await;
    assert_eq!(item_names(&list), vec!["Scarf"]);
}

#[actix_web::test]
async fn sessions_are_isolated() {
    let app = test::init_service(App::new().app_data(state()).configure(config)).await;
    let alice = open_session!(app);
    let bob = open_session!(app);

    test::call_service(&app, post_report(&alice, &report("lost", "Phone", "Bus stop")).to_request()).await;

    let list: Value = test::call_and_read_body_json(&app, get(&bob, "/api/v1/reports").to_request()).await;
    assert!(list.as_array().unwrap().is_empty());
    let resp = test::call_service(&app, delete(&bob, "/api/v1/reports/0").to_request()).await;
    assert_eq!(resp.status(), 404);

    let list: Value = test::call_and_read_body_json(&app, get(&alice, "/api/v1/reports").to_request()).await;
    assert_eq!(item_names(&list), vec!["Phone"]);
}

#[actix_web::test]
async fn session_header_is_required_and_checked() {
    let app = test::init_service(App::new().app_data(state()).configure(config)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/reports").to_request()).await;
    assert_eq!(resp.status(), 400);

    let resp = test::call_service(&app, get("not-a-uuid", "/api/v1/reports").to_request()).await;
    assert_eq!(resp.status(), 400);

    let unknown = uuid::Uuid::new_v4().to_string();
    let resp = test::call_service(&app, get(&unknown, "/api/v1/reports").to_request()).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("session"));
}

#[actix_web::test]
async fn closing_a_session_discards_its_reports() {
    let app = test::init_service(App::new().app_data(state()).configure(config)).await;
    let s = open_session!(app);
    test::call_service(&app, post_report(&s, &report("found", "Glasses", "Library")).to_request()).await;

    let close = |id: &str| test::TestRequest::delete().uri(&format!("/api/v1/sessions/{id}")).to_request();
    let resp = test::call_service(&app, close(&s)).await;
    assert_eq!(resp.status(), 204);
    let resp = test::call_service(&app, close(&s)).await;
    assert_eq!(resp.status(), 404);

    let resp = test::call_service(&app, get(&s, "/api/v1/reports").to_request()).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn session_cap_returns_service_unavailable() {
    let data = actix_web::web::Data::new(AppState::new(Arc::new(InMemRepo::with_max_sessions(1))));
    let app = test::init_service(App::new().app_data(data).configure(config)).await;
    let _first = open_session!(app);

    let resp = test::call_service(&app, test::TestRequest::post().uri("/api/v1/sessions").to_request()).await;
    assert_eq!(resp.status(), 503);
}

#[actix_web::test]
async fn metrics_endpoint_is_absent_without_recorder() {
    let app = test::init_service(App::new().app_data(state()).configure(config)).await;
    let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
    assert_eq!(resp.status(), 404);
}
