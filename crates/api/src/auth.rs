use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use invoicify_core::User;

use crate::error::ApiError;
use crate::state::AppState;

/// Caller identified by a verified bearer token. Rejects with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Caller if a bearer token was sent. A token that is present but invalid is
/// still a 401; a missing header yields `None`.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

async fn bearer_user(parts: &mut Parts, state: &AppState) -> Result<User, ApiError> {
    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Unauthorized)?;

    state.tokens().verify(bearer.token()).map_err(|e| {
        tracing::warn!("rejected bearer token: {e}");
        ApiError::Unauthorized
    })
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        bearer_user(parts, state).await.map(CurrentUser)
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !parts.headers.contains_key(AUTHORIZATION) {
            return Ok(MaybeUser(None));
        }
        bearer_user(parts, state).await.map(|user| MaybeUser(Some(user)))
    }
}
