//! End-to-end HTTP behaviour: login, CRUD, paging and links through the
//! real services and the in-memory store.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use backend::Trace;
use backend::domain::ports::FixtureLoginService;
use backend::inbound::http::configure_extractors;
use backend::inbound::http::state::{ApiEndpoints, HttpState, api_scope};
use backend::outbound::persistence::InMemoryStore;
use mockable::DefaultClock;
use pagination::PageLimits;
use rstest::rstest;
use serde_json::{Value, json};

async fn app() -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
{
    let endpoints = ApiEndpoints::from_store(Arc::new(InMemoryStore::new()), Arc::new(DefaultClock));
    let state = web::Data::new(HttpState::new(Arc::new(FixtureLoginService)));
    let limits = PageLimits::new(2, 5).expect("valid limits");
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    test::init_service(
        App::new()
            .configure(configure_extractors)
            .wrap(Trace)
            .service(api_scope(state, limits, endpoints).wrap(session)),
    )
    .await
}

async fn login<S>(app: &S, username: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({"username": username, "password": "password"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

async fn send<S>(app: &S, request: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(app, request.to_request()).await;
    let status = res.status();
    let body = test::read_body(res).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[actix_web::test]
async fn records_round_trip_with_concurrency_tokens() {
    let app = app().await;
    let admin = login(&app, "admin").await;

    let (status, created) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/equipment-groups")
            .cookie(admin.clone())
            .set_json(json!({"name": "Home Gym"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created, json!({"id": 1}));

    let (status, record) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/equipment-groups/1")
            .cookie(admin.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record.get("name"), Some(&json!("Home Gym")));
    let token = record
        .get("concurrencyToken")
        .and_then(Value::as_str)
        .expect("token")
        .to_owned();

    let update = |name: &str| {
        test::TestRequest::put()
            .uri("/api/v1/equipment-groups/1")
            .cookie(admin.clone())
            .set_json(json!({"concurrencyToken": token, "name": name}))
    };
    let (status, updated) = send(&app, update("Basement Gym")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated, json!({"updated": true}));

    let (status, stale) = send(&app, update("Attic Gym")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(stale.get("code"), Some(&json!("concurrency_conflict")));
    assert_eq!(stale.get("entity"), Some(&json!("EquipmentGroup")));
    assert!(stale.get("traceId").is_some());

    let (status, deleted) = send(
        &app,
        test::TestRequest::delete()
            .uri("/api/v1/equipment-groups/1")
            .cookie(admin.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"deleted": true}));

    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/equipment-groups/1")
            .cookie(admin),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn lists_are_paged_and_clamped() {
    let app = app().await;
    let admin = login(&app, "admin").await;
    for name in ["Chest", "Back", "Legs"] {
        let (status, _) = send(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/muscle-groups")
                .cookie(admin.clone())
                .set_json(json!({"name": name, "bodyRegion": "upper"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, default_page) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/muscle-groups?sortBy=name")
            .cookie(admin.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(default_page.get("pageSize"), Some(&json!(2)));
    assert_eq!(default_page.get("totalItems"), Some(&json!(3)));
    assert_eq!(default_page.get("totalPages"), Some(&json!(2)));
    let names: Vec<_> = default_page
        .get("data")
        .and_then(Value::as_array)
        .expect("data")
        .iter()
        .filter_map(|record| record.get("name").and_then(Value::as_str))
        .collect();
    assert_eq!(names, ["Back", "Chest"]);

    let (_, clamped) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/muscle-groups?pageSize=50")
            .cookie(admin),
    )
    .await;
    assert_eq!(clamped.get("pageSize"), Some(&json!(5)));
    assert_eq!(clamped.get("totalPages"), Some(&json!(1)));
}

#[rstest]
#[case::anonymous(None, StatusCode::UNAUTHORIZED)]
#[case::member(Some("athlete"), StatusCode::FORBIDDEN)]
#[actix_web::test]
async fn catalogue_writes_require_an_administrator(
    #[case] username: Option<&str>,
    #[case] expected: StatusCode,
) {
    let app = app().await;
    let mut request = test::TestRequest::post()
        .uri("/api/v1/exercise-types")
        .set_json(json!({"name": "Squat"}));
    if let Some(username) = username {
        request = request.cookie(login(&app, username).await);
    }

    let (status, body) = send(&app, request).await;

    assert_eq!(status, expected);
    assert_eq!(body.get("code"), Some(&json!("unauthorized")));
}

#[rstest]
#[case::member_empty_body(Some("athlete"), json!({}), StatusCode::FORBIDDEN, "unauthorized")]
#[case::anonymous_misspelt_body(None, json!({"nme": 3}), StatusCode::UNAUTHORIZED, "unauthorized")]
#[case::admin_empty_body(Some("admin"), json!({}), StatusCode::BAD_REQUEST, "validation_failed")]
#[actix_web::test]
async fn bodies_are_read_only_after_the_caller_is_authorized(
    #[case] username: Option<&str>,
    #[case] payload: Value,
    #[case] expected: StatusCode,
    #[case] code: &str,
) {
    let app = app().await;
    let mut request = test::TestRequest::post()
        .uri("/api/v1/equipment-groups")
        .set_json(payload);
    if let Some(username) = username {
        request = request.cookie(login(&app, username).await);
    }

    let (status, body) = send(&app, request).await;

    assert_eq!(status, expected);
    assert_eq!(body.get("code"), Some(&json!(code)));
}

#[actix_web::test]
async fn missing_fields_are_reported_per_field() {
    let app = app().await;
    let athlete = login(&app, "athlete").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/workout-sessions")
            .cookie(athlete)
            .set_json(json!({"durationMinutes": "long"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.get("code"), Some(&json!("validation_failed")));
    let fields = body.get("fieldErrors").and_then(Value::as_object).expect("fieldErrors");
    assert_eq!(fields.keys().collect::<Vec<_>>(), ["durationMinutes"]);
}

#[actix_web::test]
async fn validation_failures_list_each_field() {
    let app = app().await;
    let admin = login(&app, "admin").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/workout-sessions")
            .cookie(admin)
            .set_json(json!({
                "title": "  ",
                "performedAt": "2024-05-04T07:30:00Z",
                "durationMinutes": 0
            })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.get("code"), Some(&json!("validation_failed")));
    let fields = body.get("fieldErrors").and_then(Value::as_object).expect("fieldErrors");
    assert!(fields.contains_key("title"));
    assert!(fields.contains_key("durationMinutes"));
}

#[actix_web::test]
async fn members_link_exercises_to_their_own_sessions() {
    let app = app().await;
    let admin = login(&app, "admin").await;
    let athlete = login(&app, "athlete").await;

    let (_, squat) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/exercise-types")
            .cookie(admin)
            .set_json(json!({"name": "Squat"})),
    )
    .await;
    let (_, exercise) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/user-exercises")
            .cookie(athlete.clone())
            .set_json(json!({"name": "Goblet squat", "exerciseTypeId": squat.get("id")})),
    )
    .await;
    let (status, workout) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/workout-sessions")
            .cookie(athlete.clone())
            .set_json(json!({"title": "Leg day", "performedAt": "2024-05-04T07:30:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let pair = format!(
        "/api/v1/relations/workout-session-exercises/{}/{}",
        workout.get("id").and_then(Value::as_i64).expect("session id"),
        exercise.get("id").and_then(Value::as_i64).expect("exercise id"),
    );

    let (status, attached) = send(
        &app,
        test::TestRequest::post().uri(&pair).cookie(athlete.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(attached, json!({"attached": true}));

    let (status, again) = send(
        &app,
        test::TestRequest::post().uri(&pair).cookie(athlete.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(again.get("code"), Some(&json!("duplicate_relationship")));

    let (status, linked) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/relations/workout-session-exercises/1")
            .cookie(athlete.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(linked, json!([1]));

    let (status, detached) = send(&app, test::TestRequest::delete().uri(&pair).cookie(athlete)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detached, json!({"detached": true}));
}

#[actix_web::test]
async fn malformed_bodies_use_the_error_envelope() {
    let app = app().await;
    let admin = login(&app, "admin").await;

    let (status, body) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/equipment")
            .cookie(admin)
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.get("code"), Some(&json!("bad_request")));
}
