use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use fzu_ics_core::{
    auth::Authenticator,
    ics::CalendarSynthesizer,
    portal::jwch::JwchPortal,
    session::SessionStore,
    types::{Credentials, IcsOptions},
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// 应用状态
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<Authenticator<JwchPortal>>,
}

/// 健康检查响应
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// 错误响应
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// 讲座日历请求参数
#[derive(Deserialize)]
struct LectureCalendarQuery {
    uid: Option<String>,
    password: Option<String>,
}

pub fn create_app() -> Router {
    let store = Arc::new(SessionStore::new());
    let authenticator = Arc::new(Authenticator::new(JwchPortal::new(), store));
    let state = AppState { authenticator };

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/v1/lecture/calendar", get(lecture_calendar_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// 根路径处理器
async fn root_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "FZU Lecture Calendar Service",
        "version": "0.1.0",
        "description": "Rust implementation of the FZU lecture calendar export service",
        "endpoints": {
            "health": "/health",
            "calendar": "/v1/lecture/calendar"
        }
    }))
}

/// 健康检查处理器
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// 讲座日历处理器
async fn lecture_calendar_handler(
    Query(params): Query<LectureCalendarQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let uid = required_param(params.uid, "uid")?;
    let password = required_param(params.password, "password")?;

    tracing::info!(user = %uid, "lecture calendar requested");

    let credentials = Credentials {
        user_id: uid.clone(),
        password,
    };
    let handle = state.authenticator.login(&credentials).await?;

    let options = IcsOptions {
        calendar_name: Some(format!("福州大学讲座 [{}]", uid)),
        ..Default::default()
    };
    let synthesizer = CalendarSynthesizer::new(options);
    let calendar = synthesizer.synthesize_for(&handle).await?;

    Ok((
        StatusCode::OK,
        [("Content-Type", "text/calendar; charset=utf-8")],
        calendar,
    )
        .into_response())
}

fn required_param(value: Option<String>, name: &str) -> Result<String, AppError> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| {
        AppError(fzu_ics_core::Error::Validation(format!(
            "missing required parameter: {}",
            name
        )))
    })
}

/// 应用错误类型
#[derive(Debug)]
struct AppError(fzu_ics_core::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self.0 {
            fzu_ics_core::Error::Validation(_) => (StatusCode::BAD_REQUEST, "参数错误"),
            fzu_ics_core::Error::Authentication(_) => (StatusCode::FORBIDDEN, "认证失败"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "内部服务器错误"),
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
            message: self.0.to_string(),
        });

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<fzu_ics_core::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
