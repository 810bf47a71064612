//! HTTP 请求处理
//!
//! 处理器只负责解析请求和序列化结果，分析逻辑全部在编排层。

use crate::models::{AnalysisRequest, ErrorKind};
use crate::orchestrator::ReportAssembler;
use crate::server::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// 请求处理错误
///
/// 只有请求本身不合法时才会返回错误；服务失败总是以 200 + 错误描述返回。
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("请求体无效: {}", .0.body_text())]
    InvalidBody(#[from] JsonRejection),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        warn!("⚠️ 拒绝请求: {}", self);
        let body = json!({
            "error_kind": ErrorKind::InvalidInput,
            "message": self.to_string(),
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// `POST /api/v1/essay`
pub async fn analyze_essay(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<JsonValue>, HandlerError> {
    let Json(request) = payload?;
    debug!("收到分析请求 ({} 字符)", request.text.chars().count());

    let report = state.orchestrator.run(&request.text).await;
    Ok(Json(ReportAssembler::merge(&request.text, &report)))
}

/// `GET /health`
pub async fn health() -> Json<JsonValue> {
    Json(json!({ "status": "ok" }))
}

/// `GET /api/v1/providers/reachability`
pub async fn reachability(State(state): State<AppState>) -> Json<JsonValue> {
    let outcomes = state.orchestrator.check_reachability(&state.executor).await;
    let by_field: BTreeMap<&'static str, _> = outcomes
        .into_iter()
        .map(|(provider, outcome)| (provider.field_name(), outcome))
        .collect();
    Json(json!(by_field))
}
