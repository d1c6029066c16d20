// Handlers for the OTP login flow. The backend issues and verifies OTPs;
// these handlers only validate input shape and manage the local session.

use axum::{
    extract::{Form, State},
    response::{IntoResponse, Json, Redirect},
};
use serde::Deserialize;
use serde_json::json;

use crate::{error::AppError, validate, AppState};

#[derive(Debug, Deserialize)]
pub struct SendOtpForm {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpForm {
    pub phone: String,
    pub otp: String,
}

// POST /auth/send-otp
pub async fn send_otp(
    State(app_state): State<AppState>,
    Form(form): Form<SendOtpForm>,
) -> Result<impl IntoResponse, AppError> {
    let phone = validate::validate_phone(&form.phone)?;
    tracing::info!("Requesting OTP for ******{}", &phone[phone.len() - 4..]);

    app_state.backend.send_otp(&phone).await?;
    Ok(Json(json!({ "success": true, "message": "OTP sent" })))
}

// POST /auth/verify
pub async fn verify_otp(
    State(app_state): State<AppState>,
    Form(form): Form<VerifyOtpForm>,
) -> Result<impl IntoResponse, AppError> {
    let phone = validate::validate_phone(&form.phone)?;
    let otp = validate::validate_otp(&form.otp)?;

    let auth = app_state.backend.verify_otp(&phone, &otp).await?;
    tracing::info!("Login verified for user {}", auth.profile.id);
    app_state.session.set_session(&auth.token, &auth.profile);

    Ok(Redirect::to("/"))
}

// POST /auth/logout
pub async fn logout(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = app_state.session.auth_token() {
        // Best-effort: the local session is cleared even if the backend call
        // fails, matching the stateless-token contract.
        if let Err(e) = app_state.backend.logout(&token).await {
            tracing::warn!("Backend logout failed: {}", e);
        }
    }
    app_state.session.clear_session();
    Ok(Redirect::to("/"))
}
