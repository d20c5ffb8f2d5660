use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::app_state::AppState;
use crate::models::update::InboundUpdate;
use crate::services::commands;

/// POST /webhook — one chat update in, optionally one reply out.
///
/// The reply rides the HTTP response (webhook answer-inline mode). Updates
/// the bot ignores are acknowledged with 200 and an empty body.
pub async fn receive_update(
    State(state): State<AppState>,
    Json(update): Json<InboundUpdate>,
) -> Response {
    match commands::handle_update(&state, &update).await {
        Some(reply) => Json(reply).into_response(),
        None => StatusCode::OK.into_response(),
    }
}
