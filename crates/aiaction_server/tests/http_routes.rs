use aiaction_core::{Clock, ManualClock, Repositories, UpcomingPolicy};
use aiaction_server::handlers::timer::TimerState;
use aiaction_server::handlers::REQUEST_ID_HEADER;
use aiaction_server::router;
use aiaction_server::state::{AppState, DEFAULT_REQUEST_TIMEOUT};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app_with_timeout(clock: Arc<ManualClock>, request_timeout: Duration) -> Router {
    let clock: Arc<dyn Clock> = clock;
    let repos = Repositories::in_memory(clock.clone());
    let state = AppState::new(
        repos,
        clock,
        UpcomingPolicy::Stored,
        request_timeout,
        "memory",
    )
    .unwrap();
    router(Arc::new(state))
}

fn app() -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
    ));
    (app_with_timeout(clock.clone(), DEFAULT_REQUEST_TIMEOUT), clock)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn htmx_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("HX-Request", "true")
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("HX-Request", "true")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn healthz_reports_backend_and_version() {
    let (app, _) = app();
    let (status, body) = send(&app, get("/healthz")).await;
    assert_eq!(status, StatusCode::OK);

    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["status"], "ok");
    assert_eq!(value["backend"], "memory");
    assert_eq!(value["version"], aiaction_core::core_version());
}

#[tokio::test]
async fn every_response_carries_a_request_id() {
    let (app, _) = app();
    let response = app.clone().oneshot(get("/healthz")).await.unwrap();
    let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
    assert_eq!(id.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn timeline_renders_full_page_or_fragment() {
    let (app, _) = app();

    let (status, page) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("<html"));
    assert!(page.contains("Generative AI for Scientific Discovery"));
    assert!(page.contains("Reinforcement Learning from Human Feedback"));

    let (status, fragment) = send(&app, htmx_get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!fragment.contains("<html"));
    assert!(fragment.contains("Ethical Considerations in AI Development"));
}

#[tokio::test]
async fn add_event_validates_and_rerenders_timeline() {
    let (app, _) = app();

    let (status, body) = send(
        &app,
        post_form(
            "/events/add",
            "title=Agents+in+Practice&speaker=Lee&description=Hands-on&date=2025-04-10&time=18%3A00",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Agents in Practice"));
    assert!(body.contains("Thu, Apr 10 2025"));

    let (status, _) = send(
        &app,
        post_form("/events/add", "title=Missing&speaker=Lee&description=x&date=2025-04-10"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post_form(
            "/events/add",
            "title=Bad&speaker=Lee&description=x&date=10%2F04%2F2025&time=18%3A00",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        post_form(
            "/events/add",
            "title=Far&speaker=Lee&description=x&date=2300-01-01&time=18%3A00",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("supported range"));
}

#[tokio::test]
async fn update_event_moves_it_and_reports_unknown_ids() {
    let (app, _) = app();

    let (status, body) = send(
        &app,
        post_form(
            "/events/1/update",
            "title=Rescheduled&speaker=Dr.+Alex+Chen&description=Moved&date=2025-02-01&time=18%3A00",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let past_section = body.split("<h2 class=\"h5\">Past</h2>").nth(1).unwrap();
    assert!(past_section.contains("Rescheduled"));

    let (status, _) = send(
        &app,
        post_form(
            "/events/99/update",
            "title=Ghost&speaker=x&description=x&date=2025-02-01&time=18%3A00",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn timer_counts_down_between_requests() {
    let (app, clock) = app();

    let (status, panel) = send(&app, post_form("/timer/reset", "minutes=10")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(panel.contains("10:00"));
    assert!(!panel.contains("<html"));

    let (status, _) = send(&app, post_form("/timer/start", "")).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(Duration::from_secs(3 * 60));
    let (status, body) = send(&app, get("/timer/state")).await;
    assert_eq!(status, StatusCode::OK);
    let state: TimerState = serde_json::from_str(&body).unwrap();
    assert!(state.is_running);
    assert_eq!(state.display, "07:00");
    assert_eq!(state.duration_secs, 600);

    send(&app, post_form("/timer/pause", "")).await;
    clock.advance(Duration::from_secs(60));
    let (_, body) = send(&app, get("/timer/state")).await;
    let state: TimerState = serde_json::from_str(&body).unwrap();
    assert!(!state.is_running);
    assert_eq!(state.remaining_ms, 7 * 60 * 1000);
}

#[tokio::test]
async fn timer_reset_rejects_bad_minutes() {
    let (app, _) = app();
    for body in ["minutes=abc", "minutes=0", "minutes=241", ""] {
        let (status, _) = send(&app, post_form("/timer/reset", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body `{body}`");
    }
}

#[tokio::test]
async fn notes_page_through_and_save() {
    let (app, _) = app();

    let (status, body) = send(&app, get("/notes")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Introduction to the talk"));
    assert!(body.contains("Page 1 of 10"));

    let (status, body) = send(
        &app,
        post_form("/notes/3", "content=Demo+time&total_pages=10"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Demo time"));

    let (_, body) = send(&app, htmx_get("/notes/3")).await;
    assert!(body.contains("Demo time"));
    assert!(body.contains("Page 3 of 10"));

    let (status, _) = send(&app, get("/notes/0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, post_form("/notes/2", "content=x&total_pages=lots")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn question_queue_flow() {
    let (app, _) = app();

    let (status, body) = send(
        &app,
        post_form("/questions", "name=&content=How+do+evals+work%3F"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Anonymous"));
    assert!(body.contains("How do evals work?"));

    let (status, body) = send(
        &app,
        post_form("/questions", "name=Eve&content=%3Cscript%3Ealert(1)%3C%2Fscript%3E"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("&lt;script&gt;"));
    assert!(!body.contains("<script>alert"));

    let (status, _) = send(&app, post_form("/questions", "name=Eve&content=+++")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, post_form("/questions/1/answer", "")).await;
    assert_eq!(status, StatusCode::OK);
    let answered_section = body.split("Answered</h2>").nth(1).unwrap();
    assert!(answered_section.contains("How do evals work?"));

    let (status, _) = send(&app, post_form("/questions/99/answer", "")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn static_script_is_served() {
    let (app, _) = app();
    let response = app.clone().oneshot(get("/static/js/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
    assert!(content_type
        .to_str()
        .unwrap()
        .starts_with("application/javascript"));
}

#[tokio::test]
async fn expired_request_deadline_maps_to_gateway_timeout() {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
    ));
    let app = app_with_timeout(clock, Duration::ZERO);

    let (status, _) = send(&app, get("/timer/state")).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}
