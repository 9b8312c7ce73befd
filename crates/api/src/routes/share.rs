use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use invoicify_core::{InvoiceId, ServiceError};
use invoicify_export::{render_html, render_not_found, ShareView};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/invoice/{id}/text", get(share_page))
}

/// Public read-only page. Unknown or malformed ids get the static
/// not-found page rather than a JSON error.
async fn share_page(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let Ok(id) = InvoiceId::parse(&id) else {
        return Ok(not_found());
    };

    let invoice = match state.service().get(&id).await {
        Ok(invoice) => invoice,
        Err(ServiceError::NotFound(_)) => return Ok(not_found()),
        Err(e) => return Err(e.into()),
    };

    let html = render_html(&ShareView::from_invoice(&invoice, invoice.currency))?;
    Ok(Html(html).into_response())
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(render_not_found())).into_response()
}
