// Handlers for the JSON API backing the interactive pieces of the pages.
// Business logic lives in the backend; these handlers validate input, call
// through the typed client, and shape the response.

use axum::{
    extract::{Json as JsonExtract, Path, Query, State},
    response::{IntoResponse, Json},
};
use cached::{Cached, TimedSizedCache};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::{
    error::AppError,
    filters::ListingFilters,
    models::{partition_bids, Brand, City, FuelType, ListingStatus},
    session::AuthenticatedUser,
    wizard::{DraftUpdate, SellDraft},
    AppState,
};

// --- Response wrappers ---

#[derive(Serialize)]
struct GenericResponse {
    success: bool,
    message: Option<String>,
    id: Option<String>,
    error: Option<String>,
}

impl GenericResponse {
    fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            id: None,
            error: None,
        }
    }

    fn created(message: &str, id: String) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            id: Some(id),
            error: None,
        }
    }
}

// --- Request structs ---

/// Filter inputs arrive as strings straight from form controls; blanks and
/// unparsable numbers count as unset rather than failing the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub city: Option<String>,
    pub brand: Option<String>,
    pub fuel_type: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub max_year: Option<String>,
}

impl ListingQuery {
    pub fn filters(&self) -> ListingFilters {
        ListingFilters {
            search: self.search.clone(),
            city: self.city.clone(),
            brand: self.brand.clone(),
            fuel_type: self.fuel_type.as_deref().and_then(FuelType::parse),
            min_price: self.min_price.as_deref().and_then(|s| s.trim().parse().ok()),
            max_price: self.max_price.as_deref().and_then(|s| s.trim().parse().ok()),
            max_year: self.max_year.as_deref().and_then(|s| s.trim().parse().ok()),
        }
    }
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ListingStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailOtpRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct VariantsQuery {
    pub year: u16,
}

#[derive(Deserialize)]
pub struct SuggestQuery {
    pub q: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadQuery {
    pub file_name: String,
}

// --- Listings ---

pub async fn list_cars(
    State(app_state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);
    tracing::info!("API call: list_cars page={} limit={}", page, limit);

    let listings = app_state.backend.list_cars(page, limit).await?;
    // Filters run client-side over the fetched page, as the browse UI does
    let filtered = query.filters().apply(&listings);
    Ok(Json(filtered))
}

pub async fn car_detail(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("API call: car_detail id={}", id);
    let listing = app_state.backend.car_detail(&id).await?;
    Ok(Json(listing))
}

pub async fn update_car(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    JsonExtract(draft): JsonExtract<SellDraft>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("API call: update_car id={}", id);
    app_state.backend.update_car(&user.token, &id, &draft).await?;
    Ok(Json(GenericResponse::ok("Listing updated")))
}

pub async fn update_car_status(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    JsonExtract(request): JsonExtract<StatusUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("API call: update_car_status id={} -> {:?}", id, request.status);
    app_state
        .backend
        .update_car_status(&user.token, &id, request.status)
        .await?;
    Ok(Json(GenericResponse::ok("Status updated")))
}

// --- Bids ---

pub async fn car_bids(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bids = app_state.backend.bids_for_car(&user.token, &id).await?;
    Ok(Json(partition_bids(&bids)))
}

pub async fn accept_bid(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.backend.accept_bid(&user.token, &id).await?;
    Ok(Json(GenericResponse::ok("Bid accepted")))
}

pub async fn reject_bid(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.backend.reject_bid(&user.token, &id).await?;
    Ok(Json(GenericResponse::ok("Bid rejected")))
}

// --- Sell wizard draft ---

pub async fn get_sell_draft(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let draft = app_state.session.sell_draft().unwrap_or_default();
    Ok(Json(draft))
}

pub async fn update_sell_draft(
    State(app_state): State<AppState>,
    JsonExtract(update): JsonExtract<DraftUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let mut draft: SellDraft = app_state.session.sell_draft().unwrap_or_default();
    draft.apply(update);
    app_state.session.save_sell_draft(&draft);
    Ok(Json(draft))
}

pub async fn discard_sell_draft(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    app_state.session.clear_sell_draft();
    Ok(Json(GenericResponse::ok("Draft discarded")))
}

/// Final wizard step: validate the draft, hand it to the backend, clear the
/// persisted copy, and point the client at the tracking view. A backend
/// failure leaves the draft in place so the user stays on the final step.
pub async fn submit_sell_draft(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let draft = app_state
        .session
        .sell_draft()
        .ok_or_else(|| AppError::Validation("Nothing to submit yet".to_string()))?;
    draft.validate_for_submit()?;

    let car_id = app_state.backend.create_car(&user.token, &draft).await?;
    app_state.session.clear_sell_draft();
    tracing::info!("Sell draft submitted, car id {}", car_id);

    Ok(Json(GenericResponse::created(
        "Car submitted for inspection",
        car_id,
    )))
}

// --- Wishlist ---

pub async fn wishlist(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let listings = app_state.backend.wishlist(&user.token).await?;
    Ok(Json(listings))
}

pub async fn wishlist_add(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(car_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.backend.wishlist_add(&user.token, &car_id).await?;
    Ok(Json(GenericResponse::ok("Added to wishlist")))
}

pub async fn wishlist_remove(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(car_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .backend
        .wishlist_remove(&user.token, &car_id)
        .await?;
    Ok(Json(GenericResponse::ok("Removed from wishlist")))
}

pub async fn wishlist_clear(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    app_state.backend.wishlist_clear(&user.token).await?;
    Ok(Json(GenericResponse::ok("Wishlist cleared")))
}

pub async fn wishlist_count(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let count = app_state.backend.wishlist_count(&user.token).await?;
    Ok(Json(serde_json::json!({ "count": count })))
}

// --- Profile ---

pub async fn get_profile(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    // Refresh from the backend so edits made elsewhere show up
    let profile = app_state.backend.profile(&user.token).await?;
    app_state.session.set_session(&user.token, &profile);
    Ok(Json(profile))
}

pub async fn update_profile(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    JsonExtract(request): JsonExtract<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = app_state
        .backend
        .update_profile(
            &user.token,
            request.name.as_deref(),
            request.email.as_deref(),
        )
        .await?;
    app_state.session.set_session(&user.token, &profile);
    Ok(Json(profile))
}

pub async fn send_email_otp(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    JsonExtract(request): JsonExtract<EmailOtpRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !request.email.contains('@') {
        return Err(AppError::Validation("Enter a valid email address".to_string()));
    }
    app_state
        .backend
        .send_email_otp(&user.token, &request.email)
        .await?;
    Ok(Json(GenericResponse::ok("Verification OTP sent")))
}

pub async fn delete_account(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    app_state.backend.delete_account(&user.token).await?;
    app_state.session.clear_session();
    app_state.session.clear_sell_draft();
    tracing::info!("Account deleted for user {}", user.profile.id);
    Ok(Json(GenericResponse::ok("Account deleted")))
}

// --- Lookups ---

// Brand and active-city lists change rarely; cache them for ten minutes so
// the wizard's cascading selects don't hammer the backend.
static BRAND_CACHE: Lazy<Mutex<TimedSizedCache<&'static str, Vec<Brand>>>> =
    Lazy::new(|| Mutex::new(TimedSizedCache::with_size_and_lifespan(1, 600)));
static CITY_CACHE: Lazy<Mutex<TimedSizedCache<&'static str, Vec<City>>>> =
    Lazy::new(|| Mutex::new(TimedSizedCache::with_size_and_lifespan(1, 600)));

pub async fn get_brands(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if let Ok(mut cache) = BRAND_CACHE.lock() {
        if let Some(brands) = cache.cache_get(&"all") {
            return Ok(Json(brands.clone()));
        }
    }
    let brands = app_state.backend.brands().await?;
    if let Ok(mut cache) = BRAND_CACHE.lock() {
        cache.cache_set("all", brands.clone());
    }
    Ok(Json(brands))
}

pub async fn get_models(
    State(app_state): State<AppState>,
    Path(brand_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let models = app_state.backend.models_for_brand(&brand_id).await?;
    Ok(Json(models))
}

pub async fn get_years(
    State(app_state): State<AppState>,
    Path(model_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let years = app_state.backend.years_for_model(&model_id).await?;
    Ok(Json(years))
}

pub async fn get_variants(
    State(app_state): State<AppState>,
    Path(model_id): Path<String>,
    Query(query): Query<VariantsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let variants = app_state
        .backend
        .variants_for_model(&model_id, query.year)
        .await?;
    Ok(Json(variants))
}

pub async fn get_active_cities(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if let Ok(mut cache) = CITY_CACHE.lock() {
        if let Some(cities) = cache.cache_get(&"active") {
            return Ok(Json(cities.clone()));
        }
    }
    let cities = app_state.backend.active_cities().await?;
    if let Ok(mut cache) = CITY_CACHE.lock() {
        cache.cache_set("active", cities.clone());
    }
    Ok(Json(cities))
}

pub async fn suggest_cities(
    State(app_state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<impl IntoResponse, AppError> {
    let cities = app_state.backend.city_suggestions(&query.q).await?;
    Ok(Json(cities))
}

// --- Uploads ---

/// Takes the raw file bytes, asks the backend for a presigned URL pair, and
/// PUTs the bytes straight to the returned URL. Responds with the public URL
/// the client records in the draft photos.
pub async fn upload_photo(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<UploadQuery>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, AppError> {
    if query.file_name.trim().is_empty() {
        return Err(AppError::Validation("File name is required".to_string()));
    }
    if body.is_empty() {
        return Err(AppError::Validation("File is empty".to_string()));
    }
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let presigned = app_state
        .backend
        .upload_url(&user.token, &query.file_name, &content_type)
        .await?;
    app_state
        .backend
        .upload_file(&presigned.upload_url, &content_type, body.to_vec())
        .await?;

    Ok(Json(serde_json::json!({ "publicUrl": presigned.public_url })))
}
