pub mod health;
pub mod invoices;
pub mod listen;
pub mod me;
pub mod share;

use axum::Router;

use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(me::routes())
        .merge(invoices::routes())
        .merge(listen::routes())
        .merge(share::routes())
        .with_state(state)
}
