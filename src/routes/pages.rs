// Server-rendered pages. Handlers fetch display projections from the
// backend, run the view-state modules (gallery, wizard, filters), and hand
// precomputed values to the askama templates.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    error::AppError,
    gallery::Gallery,
    models::{format_price_inr, Bid, Listing},
    routes::api::ListingQuery,
    session::MaybeUser,
    wizard::SellWizard,
    AppState,
};

// --- Shared view rows ---

struct ListingCard {
    id: String,
    name: String,
    year: u16,
    price_label: String,
    image: String,
    fuel_label: &'static str,
    transmission_label: &'static str,
    km_driven: u32,
    city: String,
    wishlisted: bool,
}

fn listing_card(listing: &Listing, placeholder: &str) -> ListingCard {
    ListingCard {
        id: listing.id.clone(),
        name: listing.name.clone(),
        year: listing.year,
        price_label: listing.price_label(),
        image: listing.primary_image_or(placeholder).to_string(),
        fuel_label: listing.fuel_type.label(),
        transmission_label: listing.transmission.label(),
        km_driven: listing.km_driven,
        city: listing.city.clone(),
        wishlisted: listing.wishlisted,
    }
}

fn render<T: Template>(template: T) -> Result<Response, AppError> {
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Failed to render template: {}", e);
            Err(AppError::Internal(anyhow::Error::new(e)))
        }
    }
}

// --- Browse page ---

#[derive(Template)]
#[template(path = "browse.html")]
struct BrowseTemplate {
    logged_in: bool,
    cards: Vec<ListingCard>,
    cities: Vec<String>,
    error: Option<String>,
    search: String,
    city: String,
    brand: String,
    fuel_type: String,
    min_price: String,
    max_price: String,
    max_year: String,
}

pub async fn browse_page(
    State(app_state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<ListingQuery>,
) -> Result<Response, AppError> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);

    // Listings and the city filter options are independent fetches
    let (listings_result, cities_result) = futures::join!(
        app_state.backend.list_cars(page, limit),
        app_state.backend.active_cities()
    );

    let active_cities = match cities_result {
        Ok(cities) => cities,
        Err(e) => {
            tracing::debug!("Active city fetch failed: {}", e);
            Vec::new()
        }
    };

    // The remembered filter is stored as a city id. An explicit non-empty
    // city updates it, an explicit empty city clears it, and an absent
    // parameter falls back to the stored choice.
    let mut query = query;
    match query.city.as_deref() {
        Some("") => app_state.session.clear_selected_city(),
        Some(name) => {
            if let Some(city) = active_cities
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(name))
            {
                app_state.session.set_selected_city(&city.id);
            }
        }
        None => {
            query.city = app_state.session.selected_city().and_then(|id| {
                active_cities.iter().find(|c| c.id == id).map(|c| c.name.clone())
            });
        }
    }

    let cities: Vec<String> = active_cities.into_iter().map(|c| c.name).collect();

    // A failed fetch degrades to an inline banner, never a dead process
    let (cards, error) = match listings_result {
        Ok(listings) => {
            let filtered = query.filters().apply(&listings);
            let cards = filtered
                .iter()
                .map(|l| listing_card(l, &app_state.settings.placeholder_image))
                .collect();
            (cards, None)
        }
        Err(e) => {
            tracing::warn!("Browse fetch failed: {}", e);
            (Vec::new(), Some(AppError::from(e).to_string()))
        }
    };

    render(BrowseTemplate {
        logged_in: user.is_some(),
        cards,
        cities,
        error,
        search: query.search.clone().unwrap_or_default(),
        city: query.city.clone().unwrap_or_default(),
        brand: query.brand.clone().unwrap_or_default(),
        fuel_type: query.fuel_type.clone().unwrap_or_default(),
        min_price: query.min_price.clone().unwrap_or_default(),
        max_price: query.max_price.clone().unwrap_or_default(),
        max_year: query.max_year.clone().unwrap_or_default(),
    })
}

// --- Car detail page (gallery) ---

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    /// Flat slide index selected via prev/next links.
    pub slide: Option<usize>,
    /// Category tab click; jumps to that category's first slide.
    pub category: Option<usize>,
    /// Thumbnail click; jumps to the first slide showing this image.
    pub image: Option<String>,
}

struct CategoryTab {
    label: String,
    href: String,
    active: bool,
}

struct Thumb {
    image: String,
    href: String,
    active: bool,
}

#[derive(Template)]
#[template(path = "car_detail.html")]
struct CarDetailTemplate {
    logged_in: bool,
    id: String,
    name: String,
    year: u16,
    price_label: String,
    city: String,
    km_driven: u32,
    fuel_label: &'static str,
    transmission_label: &'static str,
    ownership_label: &'static str,
    status_label: &'static str,
    wishlisted: bool,
    current_image: String,
    slide_position: usize,
    slide_count: usize,
    show_controls: bool,
    prev_href: String,
    next_href: String,
    category_tabs: Vec<CategoryTab>,
    thumbs: Vec<Thumb>,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    message: String,
}

fn not_found_page(message: &str) -> Result<Response, AppError> {
    let template = NotFoundTemplate {
        message: message.to_string(),
    };
    match template.render() {
        Ok(html) => Ok((StatusCode::NOT_FOUND, Html(html)).into_response()),
        Err(e) => Err(AppError::Internal(anyhow::Error::new(e))),
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    message: String,
}

/// Full-page variant of the browse banner for pages that have nothing to
/// render without their fetch. Keeps the error's own status code.
fn error_page(error: &AppError) -> Result<Response, AppError> {
    let template = ErrorTemplate {
        message: error.public_message(),
    };
    match template.render() {
        Ok(html) => Ok((error.status_code(), Html(html)).into_response()),
        Err(e) => Err(AppError::Internal(anyhow::Error::new(e))),
    }
}

pub async fn car_detail_page(
    State(app_state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
    Query(query): Query<GalleryQuery>,
) -> Result<Response, AppError> {
    let listing = match app_state.backend.car_detail(&id).await {
        Ok(listing) => listing,
        // Only an absent id renders the not-found placeholder; a failed
        // request keeps its own status and message
        Err(e) if e.is_not_found() => {
            return not_found_page("We couldn't find that car. It may have been sold or delisted.");
        }
        Err(e) => {
            tracing::warn!("Car detail fetch failed for {}: {}", id, e);
            return error_page(&AppError::from(e));
        }
    };

    let mut gallery = Gallery::from_categories(
        &listing.image_categories,
        &app_state.settings.placeholder_image,
    );
    if let Some(ref image) = query.image {
        gallery.select_by_image(image);
    } else if let Some(category) = query.category {
        gallery.select_category(category);
    } else if let Some(slide) = query.slide {
        gallery.select(slide);
    }

    let slide_href = |index: usize| format!("/cars/{}?slide={}", id, index);

    let mut forward = gallery.clone();
    forward.next();
    let mut backward = gallery.clone();
    backward.previous();

    let category_tabs = gallery
        .category_labels()
        .iter()
        .enumerate()
        .map(|(index, label)| CategoryTab {
            label: label.clone(),
            href: format!("/cars/{}?category={}", id, index),
            active: gallery.current_category() == index,
        })
        .collect();

    let thumbs = gallery
        .slides()
        .iter()
        .enumerate()
        .map(|(index, slide)| Thumb {
            image: slide.image.clone(),
            href: slide_href(index),
            active: index == gallery.current_index(),
        })
        .collect();

    render(CarDetailTemplate {
        logged_in: user.is_some(),
        id: listing.id.clone(),
        name: listing.name.clone(),
        year: listing.year,
        price_label: listing.price_label(),
        city: listing.city.clone(),
        km_driven: listing.km_driven,
        fuel_label: listing.fuel_type.label(),
        transmission_label: listing.transmission.label(),
        ownership_label: listing.ownership.label(),
        status_label: listing.status.label(),
        wishlisted: listing.wishlisted,
        current_image: gallery.current().image.clone(),
        slide_position: gallery.current_index() + 1,
        slide_count: gallery.len(),
        show_controls: gallery.show_controls(),
        prev_href: slide_href(backward.current_index()),
        next_href: slide_href(forward.current_index()),
        category_tabs,
        thumbs,
    })
}

// --- Seller bids page ---

struct BidRow {
    id: String,
    buyer_name: String,
    amount_label: String,
    placed_on: String,
}

fn bid_row(bid: &Bid) -> BidRow {
    BidRow {
        id: bid.id.clone(),
        buyer_name: bid.buyer_name.clone(),
        amount_label: format_price_inr(bid.amount),
        placed_on: bid.placed_at.format("%d %b %Y").to_string(),
    }
}

#[derive(Template)]
#[template(path = "bids.html")]
struct BidsTemplate {
    logged_in: bool,
    car_id: String,
    pending: Vec<BidRow>,
    accepted: Vec<BidRow>,
    rejected: Vec<BidRow>,
    error: Option<String>,
}

pub async fn bids_page(
    State(app_state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let Some(user) = user else {
        return Ok(Redirect::to("/login").into_response());
    };

    let (partitions, error) = match app_state.backend.bids_for_car(&user.token, &id).await {
        Ok(bids) => (crate::models::partition_bids(&bids), None),
        Err(e) => {
            tracing::warn!("Bid fetch failed for {}: {}", id, e);
            (Default::default(), Some(AppError::from(e).to_string()))
        }
    };

    render(BidsTemplate {
        logged_in: true,
        car_id: id,
        pending: partitions.pending.iter().map(bid_row).collect(),
        accepted: partitions.accepted.iter().map(bid_row).collect(),
        rejected: partitions.rejected.iter().map(bid_row).collect(),
        error,
    })
}

// --- Sell wizard page ---

#[derive(Debug, Deserialize)]
pub struct SellQuery {
    pub step: Option<u8>,
}

#[derive(Template)]
#[template(path = "sell.html")]
struct SellTemplate {
    logged_in: bool,
    step: u8,
    total_steps: u8,
    is_first: bool,
    is_final: bool,
    brand: String,
    model: String,
    variant: String,
    year: String,
    km_driven: String,
    city: String,
    registration_number: String,
    phone: String,
    description: String,
    photo_count: usize,
}

pub async fn sell_page(
    State(app_state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<SellQuery>,
) -> Result<Response, AppError> {
    if user.is_none() {
        return Ok(Redirect::to("/login").into_response());
    }

    let draft = app_state.session.sell_draft().unwrap_or_default();
    let mut wizard = SellWizard::with_draft(draft);
    if let Some(step) = query.step {
        wizard.go_to(step);
    }

    let draft = &wizard.draft;
    render(SellTemplate {
        logged_in: true,
        step: wizard.step(),
        total_steps: wizard.total_steps(),
        is_first: wizard.step() == 1,
        is_final: wizard.step() == wizard.total_steps(),
        brand: draft.brand.clone().unwrap_or_default(),
        model: draft.model.clone().unwrap_or_default(),
        variant: draft.variant.clone().unwrap_or_default(),
        year: draft.year.map(|y| y.to_string()).unwrap_or_default(),
        km_driven: draft.km_driven.map(|k| k.to_string()).unwrap_or_default(),
        city: draft.city.clone().unwrap_or_default(),
        registration_number: draft.registration_number.clone().unwrap_or_default(),
        phone: draft.phone.clone().unwrap_or_default(),
        description: draft.description.clone().unwrap_or_default(),
        photo_count: draft.photos.len(),
    })
}

// --- Login page ---

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {}

pub async fn login_page(MaybeUser(user): MaybeUser) -> Result<Response, AppError> {
    if user.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    render(LoginTemplate {})
}

// --- Profile page ---

#[derive(Template)]
#[template(path = "profile.html")]
struct ProfileTemplate {
    logged_in: bool,
    name: String,
    phone: String,
    email: String,
}

pub async fn profile_page(MaybeUser(user): MaybeUser) -> Result<Response, AppError> {
    let Some(user) = user else {
        return Ok(Redirect::to("/login").into_response());
    };
    render(ProfileTemplate {
        logged_in: true,
        name: user.profile.name.clone().unwrap_or_default(),
        phone: user.profile.phone.clone(),
        email: user.profile.email.clone().unwrap_or_default(),
    })
}

// --- Wishlist page ---

#[derive(Template)]
#[template(path = "wishlist.html")]
struct WishlistTemplate {
    logged_in: bool,
    cards: Vec<ListingCard>,
    error: Option<String>,
}

pub async fn wishlist_page(
    State(app_state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, AppError> {
    let Some(user) = user else {
        return Ok(Redirect::to("/login").into_response());
    };

    let (cards, error) = match app_state.backend.wishlist(&user.token).await {
        Ok(listings) => (
            listings
                .iter()
                .map(|l| listing_card(l, &app_state.settings.placeholder_image))
                .collect(),
            None,
        ),
        Err(e) => {
            tracing::warn!("Wishlist fetch failed: {}", e);
            (Vec::new(), Some(AppError::from(e).to_string()))
        }
    };

    render(WishlistTemplate {
        logged_in: true,
        cards,
        error,
    })
}
