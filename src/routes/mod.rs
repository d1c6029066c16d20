// Route definitions

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::AppState;

mod api;
mod auth;
mod pages;

pub fn create_router(app_state: AppState) -> Router {
    // JSON API. Handlers expect AppState via the State extractor; the
    // authenticated ones additionally extract the bearer session.
    let api_router = Router::new()
        .route("/cars", get(api::list_cars))
        .route("/cars/:id", get(api::car_detail))
        .route("/cars/:id", put(api::update_car))
        .route("/cars/:id/status", put(api::update_car_status))
        .route("/cars/:id/bids", get(api::car_bids))
        .route("/bids/:id/accept", post(api::accept_bid))
        .route("/bids/:id/reject", post(api::reject_bid))
        .route("/sell/draft", get(api::get_sell_draft))
        .route("/sell/draft", post(api::update_sell_draft))
        .route("/sell/draft", delete(api::discard_sell_draft))
        .route("/sell/submit", post(api::submit_sell_draft))
        .route("/wishlist", get(api::wishlist))
        .route("/wishlist", delete(api::wishlist_clear))
        .route("/wishlist/count", get(api::wishlist_count))
        .route("/wishlist/:car_id", post(api::wishlist_add))
        .route("/wishlist/:car_id", delete(api::wishlist_remove))
        .route("/profile", get(api::get_profile))
        .route("/profile", put(api::update_profile))
        .route("/profile", delete(api::delete_account))
        .route("/profile/email-otp", post(api::send_email_otp))
        .route("/brands", get(api::get_brands))
        .route("/brands/:id/models", get(api::get_models))
        .route("/models/:id/years", get(api::get_years))
        .route("/models/:id/variants", get(api::get_variants))
        .route("/cities", get(api::get_active_cities))
        .route("/cities/suggest", get(api::suggest_cities))
        .route("/uploads", post(api::upload_photo))
        .with_state(app_state.clone());

    Router::new()
        // Server-rendered pages
        .route("/", get(pages::browse_page))
        .route("/cars/:id", get(pages::car_detail_page))
        .route("/cars/:id/bids", get(pages::bids_page))
        .route("/sell", get(pages::sell_page))
        .route("/login", get(pages::login_page))
        .route("/profile", get(pages::profile_page))
        .route("/wishlist", get(pages::wishlist_page))
        // Auth flow (form posts)
        .route("/auth/send-otp", post(auth::send_otp))
        .route("/auth/verify", post(auth::verify_otp))
        .route("/auth/logout", post(auth::logout))
        // Nest the API router which already has state
        .nest("/api", api_router)
        .with_state(app_state)
}
