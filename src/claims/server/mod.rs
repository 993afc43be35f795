// SPDX-License-Identifier: MIT

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::claims::context::{AnswerError, AppContext};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub response: String,
}

/// Error body shaped as `{"detail": ...}`
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl From<AnswerError> for ApiError {
    fn from(err: AnswerError) -> Self {
        let status = match &err {
            AnswerError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            AnswerError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/ask", post(ask))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(ctx: Arc<AppContext>, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(ctx)).await
}

async fn ping() -> Json<Value> {
    Json(json!({ "status": "InsuranceBot is alive" }))
}

async fn ask(
    State(ctx): State<Arc<AppContext>>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    match ctx.answer(&payload.query).await {
        Ok(response) => Ok(Json(AskResponse { response })),
        Err(e) => {
            log::error!("Query failed: {}", e);
            Err(e.into())
        }
    }
}
