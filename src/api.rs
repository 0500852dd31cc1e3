// Fee Ledger - REST API with Axum
//
// Local JSON adapter over FeeLedger for a browser front end. The router lives
// in the library so tests can drive it without binding a socket.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::auth::LoginGate;
use crate::error::LedgerError;
use crate::ledger::{ClassSummary, Totals};
use crate::reminder::Reminder;
use crate::service::FeeLedger;
use crate::student::{StudentDraft, StudentRecord};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    ledger: Arc<Mutex<FeeLedger>>,
    gate: Arc<Mutex<LoginGate>>,
}

impl AppState {
    pub fn new(ledger: FeeLedger, gate: LoginGate) -> Self {
        AppState {
            ledger: Arc::new(Mutex::new(ledger)),
            gate: Arc::new(Mutex::new(gate)),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, FeeLedger> {
        // Every handler finishes its mutation before releasing the lock, so a
        // poisoned guard still holds a consistent ledger.
        self.ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn gate(&self) -> MutexGuard<'_, LoginGate> {
        self.gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn fail(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// LedgerError mapped to a status code.
pub struct ApiError(LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            LedgerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::EmptyInput => StatusCode::CONFLICT,
            LedgerError::StorageCorrupt(_)
            | LedgerError::Storage(_)
            | LedgerError::Serialization(_) => {
                error!("Ledger storage failure: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(ApiResponse::<()>::fail(self.0.to_string()))).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// A draft body that fails to parse (wrong types, missing fields) is the
/// operator's input error, same as one that fails validation.
fn draft_body(payload: Result<Json<StudentDraft>, JsonRejection>) -> Result<StudentDraft, ApiError> {
    payload
        .map(|Json(draft)| draft)
        .map_err(|rejection| ApiError(LedgerError::invalid(rejection.body_text())))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    totals: Totals,
    by_class: Vec<ClassSummary>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// POST /api/login - Compare against the shared password
async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    if state.gate().attempt(&req.password, Utc::now()) {
        (StatusCode::OK, Json(ApiResponse::ok(true))).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<bool>::fail("Incorrect password".to_string())),
        )
            .into_response()
    }
}

/// GET /api/students?q= - Search students by name (empty query lists all)
async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Vec<StudentRecord>> {
    Ok(Json(ApiResponse::ok(state.ledger().search_students(&params.q))))
}

/// POST /api/students - Add a student
async fn add_student(
    State(state): State<AppState>,
    payload: Result<Json<StudentDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<StudentRecord>>), ApiError> {
    let draft = draft_body(payload)?;
    let record = state.ledger().add_student(&draft)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(record))))
}

/// GET /api/students/:id
async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StudentRecord> {
    let record = state
        .ledger()
        .student(&id)
        .ok_or(LedgerError::NotFound(id))?;
    Ok(Json(ApiResponse::ok(record)))
}

/// PUT /api/students/:id - Replace a student's details
async fn edit_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StudentDraft>, JsonRejection>,
) -> ApiResult<StudentRecord> {
    let draft = draft_body(payload)?;
    let record = state.ledger().edit_student(&id, &draft)?;
    Ok(Json(ApiResponse::ok(record)))
}

/// DELETE /api/students/:id
async fn remove_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<String> {
    state.ledger().remove_student(&id)?;
    Ok(Json(ApiResponse::ok(id)))
}

/// GET /api/stats - Totals plus the per-class chart data
async fn get_stats(State(state): State<AppState>) -> ApiResult<StatsResponse> {
    let ledger = state.ledger();
    Ok(Json(ApiResponse::ok(StatsResponse {
        totals: ledger.totals(),
        by_class: ledger.class_breakdown(),
    })))
}

/// GET /api/classes - The class options, in display order
async fn get_classes(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    Ok(Json(ApiResponse::ok(state.ledger().class_options().to_vec())))
}

/// GET /api/classes/:class/students
async fn class_students(
    State(state): State<AppState>,
    Path(class_grade): Path<String>,
) -> ApiResult<Vec<StudentRecord>> {
    Ok(Json(ApiResponse::ok(
        state.ledger().students_in_class(&class_grade),
    )))
}

/// GET /api/due - Students with pending fees
async fn get_due(State(state): State<AppState>) -> ApiResult<Vec<StudentRecord>> {
    Ok(Json(ApiResponse::ok(state.ledger().due_students())))
}

/// GET /api/reminder - WhatsApp text and link (409 when nobody owes)
async fn get_reminder(State(state): State<AppState>) -> ApiResult<Reminder> {
    let reminder = state.ledger().reminder()?;
    Ok(Json(ApiResponse::ok(reminder)))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/login", post(login))
        .route("/students", get(list_students).post(add_student))
        .route(
            "/students/:id",
            put(edit_student).get(get_student).delete(remove_student),
        )
        .route("/stats", get(get_stats))
        .route("/classes", get(get_classes))
        .route("/classes/:class/students", get(class_students))
        .route("/due", get(get_due))
        .route("/reminder", get(get_reminder))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryBlobStore;
    use crate::service::LedgerSettings;
    use crate::store::{StudentStore, DEFAULT_STORAGE_KEY};
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let store = StudentStore::open(Box::new(MemoryBlobStore::new()), DEFAULT_STORAGE_KEY);
        let ledger = FeeLedger::new(store, LedgerSettings::default());
        router(AppState::new(ledger, LoginGate::new("secret")))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn rahul() -> Value {
        json!({"name": "Rahul Patil", "classGrade": "7th", "totalFees": 5000, "paidFees": 3000})
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], "OK");
    }

    #[tokio::test]
    async fn test_login() {
        let app = app();

        let (status, _) = send(&app, Method::POST, "/api/login", Some(json!({"password": "secret"}))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::POST, "/api/login", Some(json!({"password": "nope"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_add_then_stats() {
        let app = app();

        let (status, body) = send(&app, Method::POST, "/api/students", Some(rahul())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["dueFees"], 2000.0);

        let (status, body) = send(&app, Method::GET, "/api/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["totals"]["count"], 1);
        assert_eq!(body["data"]["totals"]["collected"], 3000.0);
        assert_eq!(body["data"]["totals"]["due"], 2000.0);
        assert_eq!(body["data"]["byClass"].as_array().unwrap().len(), 6);
        assert_eq!(body["data"]["byClass"][2]["className"], "7th");
        assert_eq!(body["data"]["byClass"][2]["studentCount"], 1);
    }

    #[tokio::test]
    async fn test_invalid_draft_is_bad_request() {
        let body = json!({"name": "", "classGrade": "7th", "totalFees": 10, "paidFees": 0});
        let (status, body) = send(&app(), Method::POST, "/api/students", Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_unparsable_draft_is_bad_request() {
        let app = app();

        let text_fee = json!({"name": "Rahul", "classGrade": "7th", "totalFees": "abc", "paidFees": 0});
        let (status, body) = send(&app, Method::POST, "/api/students", Some(text_fee)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().starts_with("invalid input"));

        let no_class = json!({"name": "Rahul", "totalFees": 10, "paidFees": 0});
        let (status, body) = send(&app, Method::POST, "/api/students", Some(no_class)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (_, created) = send(&app, Method::POST, "/api/students", Some(rahul())).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();
        let no_paid = json!({"name": "Rahul", "classGrade": "7th", "totalFees": 10});
        let (status, _) = send(&app, Method::PUT, &format!("/api/students/{}", id), Some(no_paid)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_edit_and_delete_unknown_id() {
        let app = app();

        let (status, _) = send(&app, Method::PUT, "/api/students/missing", Some(rahul())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, "/api/students/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_edit_then_delete() {
        let app = app();
        let (_, created) = send(&app, Method::POST, "/api/students", Some(rahul())).await;
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let paid_up = json!({"name": "Rahul Patil", "classGrade": "7th", "totalFees": 5000, "paidFees": 5000});
        let (status, body) = send(&app, Method::PUT, &format!("/api/students/{}", id), Some(paid_up)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["dueFees"], 0.0);

        let (status, _) = send(&app, Method::DELETE, &format!("/api/students/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&app, Method::GET, "/api/students", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_search_and_class_listing() {
        let app = app();
        send(&app, Method::POST, "/api/students", Some(rahul())).await;
        let sneha = json!({"name": "Sneha More", "classGrade": "9th", "totalFees": 4000, "paidFees": 4000});
        send(&app, Method::POST, "/api/students", Some(sneha)).await;

        let (_, body) = send(&app, Method::GET, "/api/students?q=SNEHA", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (_, body) = send(&app, Method::GET, "/api/classes/7th/students", None).await;
        assert_eq!(body["data"][0]["name"], "Rahul Patil");

        let (_, body) = send(&app, Method::GET, "/api/due", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reminder_requires_due_students() {
        let app = app();

        let (status, _) = send(&app, Method::GET, "/api/reminder", None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        send(&app, Method::POST, "/api/students", Some(rahul())).await;
        let (status, body) = send(&app, Method::GET, "/api/reminder", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"]["text"],
            "Following students have pending fees: Rahul Patil(7th)"
        );
        assert!(body["data"]["link"]
            .as_str()
            .unwrap()
            .starts_with("https://wa.me/919834252755?text="));
    }
}
