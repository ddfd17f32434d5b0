use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::{
    collector::{self, RequestContext, SubscribePayload},
    web::{types::ApiResponse, WebResult},
    AppState,
};

const COLLECTED_MESSAGE: &str = "Email collected successfully.";

/// `POST /api/subscribe`
///
/// Rejected bodies are turned into a 400 by the response mapper instead of axum's plain-text
/// rejection, so every answer of this route has the same JSON shape.
/// A body without a JSON content type is not read and counts as an empty payload.
#[tracing::instrument(name = "Subscribe request", skip_all)]
pub async fn subscribe(
    State(app_state): State<AppState>,
    ctx: RequestContext,
    payload: Result<Json<SubscribePayload>, JsonRejection>,
) -> WebResult<(StatusCode, Json<ApiResponse>)> {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(JsonRejection::MissingJsonContentType(_)) => SubscribePayload::default(),
        Err(rejection) => return Err(rejection.into()),
    };

    collector::submit(app_state.store(), payload, ctx).await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(COLLECTED_MESSAGE))))
}
