// Request extractors for the logged-in user. The backend issued the token at
// OTP verification; this frontend only checks the presented bearer token
// against the persisted session and loads the stored profile blob.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use tracing::warn;

use crate::{error::AppError, models::UserProfile, AppState};

/// Extracted in handlers that require a logged-in user.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub token: String,
    pub profile: UserProfile,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let stored_token = app_state
            .session
            .auth_token()
            .ok_or_else(|| AppError::Unauthorized("Please log in to continue".into()))?;

        // An explicit bearer token must match the active session; without
        // one, the persisted session is ambient (the localStorage analog).
        if let Ok(TypedHeader(Authorization(bearer))) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
        {
            if bearer.token() != stored_token {
                warn!("Presented token does not match the active session");
                return Err(AppError::Unauthorized("Session expired, log in again".into()));
            }
        }

        let profile = app_state
            .session
            .profile()
            .ok_or_else(|| AppError::Unauthorized("Session expired, log in again".into()))?;

        Ok(AuthenticatedUser {
            token: stored_token,
            profile,
        })
    }
}

/// Page variant: never rejects, pages render the logged-out chrome instead.
pub struct MaybeUser(pub Option<AuthenticatedUser>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(_parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let user = app_state
            .session
            .auth_token()
            .zip(app_state.session.profile())
            .map(|(token, profile)| AuthenticatedUser { token, profile });
        Ok(MaybeUser(user))
    }
}
