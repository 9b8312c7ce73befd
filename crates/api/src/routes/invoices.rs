use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use invoicify_core::document::Currency;
use invoicify_core::mutation::{MutateRequest, MutationResponse};
use invoicify_core::{Invoice, InvoiceId, InvoiceView};
use invoicify_export::ExportFormat;

use crate::auth::{CurrentUser, MaybeUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/invoices", get(list_invoices).post(create_invoice))
        .route(
            "/v1/invoices/{id}",
            get(get_invoice).patch(save_invoice).delete(delete_invoice),
        )
        .route("/v1/invoices/{id}/draft", put(save_draft))
        .route("/v1/invoices/{id}/mutate", post(mutate_invoice))
        .route("/v1/invoices/{id}/export", get(export_invoice))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListItem {
    #[serde(flatten)]
    invoice: Invoice,
    share_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewResponse {
    #[serde(flatten)]
    view: InvoiceView,
    share_url: String,
}

#[derive(Debug, Deserialize)]
struct ExportParams {
    #[serde(default)]
    format: ExportFormat,
    currency: Option<Currency>,
}

async fn list_invoices(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Value>> {
    let base = &state.config().public_base_url;
    let invoices: Vec<ListItem> = state
        .service()
        .list_for(&user)
        .await?
        .into_iter()
        .map(|invoice| {
            let share_url = invoice
                .invoice_id()
                .map(|id| id.share_url(base))
                .unwrap_or_default();
            ListItem { invoice, share_url }
        })
        .collect();

    Ok(Json(json!({ "invoices": invoices })))
}

async fn create_invoice(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<(StatusCode, Json<Invoice>)> {
    let invoice = state.service().create(&user).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

async fn get_invoice(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
) -> ApiResult<Json<ViewResponse>> {
    let id = InvoiceId::parse(&id)?;
    let view = state.service().view(&id, viewer.user()).await?;
    Ok(Json(ViewResponse {
        view,
        share_url: id.share_url(&state.config().public_base_url),
    }))
}

async fn save_invoice(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    WithRejection(Json(patch), _): WithRejection<Json<Value>, ApiError>,
) -> ApiResult<Json<Invoice>> {
    let id = InvoiceId::parse(&id)?;
    let invoice = state.service().save(&user, &id, patch).await?;
    Ok(Json(invoice))
}

/// Queue a draft edit. The write lands once the invoice has been quiet for
/// the debounce window.
async fn save_draft(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    WithRejection(Json(patch), _): WithRejection<Json<Value>, ApiError>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let id = InvoiceId::parse(&id)?;
    let autosaver = state.autosaver();
    autosaver.schedule(user, id, patch).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "status": "scheduled",
            "debounceMs": autosaver.delay().as_millis() as u64,
        })),
    ))
}

async fn mutate_invoice(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    WithRejection(Json(request), _): WithRejection<Json<MutateRequest>, ApiError>,
) -> ApiResult<Json<MutationResponse>> {
    let id = InvoiceId::parse(&id)?;
    let response = state.service().apply(&user, &id, request.mutations).await?;
    Ok(Json(response))
}

async fn delete_invoice(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = InvoiceId::parse(&id)?;
    state.service().delete(&user, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn export_invoice(
    State(state): State<AppState>,
    _viewer: MaybeUser,
    Path(id): Path<String>,
    WithRejection(Query(params), _): WithRejection<Query<ExportParams>, ApiError>,
) -> ApiResult<Response> {
    let id = InvoiceId::parse(&id)?;
    let invoice = state.service().get(&id).await?;
    let currency = params.currency.unwrap_or(invoice.currency);

    let export = invoicify_export::export(&invoice, params.format, currency)?;
    let disposition = format!("attachment; filename=\"{}\"", export.filename);
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| ApiError::Internal(format!("bad export filename: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(export.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response())
}
