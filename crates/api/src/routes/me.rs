use axum::{routing::get, Json, Router};
use invoicify_core::User;

use crate::auth::CurrentUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/me", get(me))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}
