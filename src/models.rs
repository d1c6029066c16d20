// Display projections of backend data, plus the shared enum -> label tables.
// These are projections only: the backend owns the authoritative records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Shared enums ---
//
// Label lookups live here and nowhere else, so every page renders the same
// wording for the same value.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Petrol,
    Diesel,
    Cng,
    Electric,
    Hybrid,
}

impl FuelType {
    /// Parses the wire/form spelling; unknown values count as unset.
    pub fn parse(value: &str) -> Option<FuelType> {
        match value.trim().to_lowercase().as_str() {
            "petrol" => Some(FuelType::Petrol),
            "diesel" => Some(FuelType::Diesel),
            "cng" => Some(FuelType::Cng),
            "electric" => Some(FuelType::Electric),
            "hybrid" => Some(FuelType::Hybrid),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FuelType::Petrol => "Petrol",
            FuelType::Diesel => "Diesel",
            FuelType::Cng => "CNG",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Manual,
    Automatic,
}

impl Transmission {
    pub fn label(&self) -> &'static str {
        match self {
            Transmission::Manual => "Manual",
            Transmission::Automatic => "Automatic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
    First,
    Second,
    Third,
    #[serde(rename = "fourth_plus")]
    FourthPlus,
}

impl Ownership {
    pub fn label(&self) -> &'static str {
        match self {
            Ownership::First => "1st Owner",
            Ownership::Second => "2nd Owner",
            Ownership::Third => "3rd Owner",
            Ownership::FourthPlus => "4th Owner or more",
        }
    }
}

/// Seller-side lifecycle of a listing: add car -> inspection -> valuation ->
/// live -> sold. Transitions happen in the backend; the frontend only labels
/// the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Draft,
    Inspection,
    Valuation,
    Live,
    Sold,
}

impl ListingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ListingStatus::Draft => "Draft",
            ListingStatus::Inspection => "Inspection scheduled",
            ListingStatus::Valuation => "Under valuation",
            ListingStatus::Live => "Live",
            ListingStatus::Sold => "Sold",
        }
    }
}

// --- Listings ---

/// One named group of photos, e.g. "Exterior" or "Tyres".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageCategory {
    pub label: String,
    pub images: Vec<String>,
}

/// A single car for sale, as displayed to buyers. Canonical shape: the
/// formatted price string is what pages render, the numeric price is what
/// filters compare against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub name: String,
    pub year: u16,
    pub price_display: Option<String>,
    pub price: Option<u64>,
    pub primary_image: Option<String>,
    #[serde(default)]
    pub image_categories: Vec<ImageCategory>,
    pub fuel_type: FuelType,
    pub transmission: Transmission,
    pub ownership: Ownership,
    pub km_driven: u32,
    pub city: String,
    #[serde(default)]
    pub wishlisted: bool,
    pub status: ListingStatus,
}

impl Listing {
    /// The card image, with the configured placeholder as fallback.
    pub fn primary_image_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.primary_image.as_deref().unwrap_or(placeholder)
    }

    /// Preformatted price when the backend sent one, otherwise formatted
    /// from the numeric price, otherwise a fixed fallback.
    pub fn price_label(&self) -> String {
        if let Some(ref display) = self.price_display {
            if !display.is_empty() {
                return display.clone();
            }
        }
        match self.price {
            Some(amount) => format_price_inr(amount),
            None => "Price on request".to_string(),
        }
    }

    /// Categories that actually carry photos. Empty categories are dropped
    /// before they ever reach the gallery.
    pub fn displayable_categories(&self) -> Vec<ImageCategory> {
        self.image_categories
            .iter()
            .filter(|c| !c.images.is_empty())
            .cloned()
            .collect()
    }
}

/// Formats a rupee amount into the Lakh/Crore display convention.
pub fn format_price_inr(amount: u64) -> String {
    const LAKH: u64 = 100_000;
    const CRORE: u64 = 10_000_000;
    if amount >= CRORE {
        format!("\u{20b9} {:.2} Crore", amount as f64 / CRORE as f64)
    } else if amount >= LAKH {
        format!("\u{20b9} {:.2} Lakh", amount as f64 / LAKH as f64)
    } else {
        format!("\u{20b9} {}", group_inr(amount))
    }
}

// Indian digit grouping: last three digits, then groups of two.
fn group_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let head_bytes = head.as_bytes();
    let mut end = head_bytes.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

// --- Bids ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    Pending,
    Accepted,
    Rejected,
}

impl BidStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BidStatus::Pending => "Pending",
            BidStatus::Accepted => "Accepted",
            BidStatus::Rejected => "Rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: String,
    pub buyer_name: String,
    pub amount: u64,
    pub status: BidStatus,
    pub placed_at: DateTime<Utc>,
}

/// Bids split into the three partitions the seller page displays.
#[derive(Debug, Default, Serialize)]
pub struct BidPartitions {
    pub pending: Vec<Bid>,
    pub accepted: Vec<Bid>,
    pub rejected: Vec<Bid>,
}

pub fn partition_bids(bids: &[Bid]) -> BidPartitions {
    let mut partitions = BidPartitions::default();
    for bid in bids {
        match bid.status {
            BidStatus::Pending => partitions.pending.push(bid.clone()),
            BidStatus::Accepted => partitions.accepted.push(bid.clone()),
            BidStatus::Rejected => partitions.rejected.push(bid.clone()),
        }
    }
    partitions
}

// --- Account & lookups ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub phone: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandModel {
    pub id: String,
    pub brand_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub model_id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bid(id: &str, status: BidStatus) -> Bid {
        Bid {
            id: id.to_string(),
            buyer_name: "Buyer".to_string(),
            amount: 450_000,
            status,
            placed_at: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn format_price_uses_lakh_and_crore_bands() {
        assert_eq!(format_price_inr(550_000), "\u{20b9} 5.50 Lakh");
        assert_eq!(format_price_inr(12_000_000), "\u{20b9} 1.20 Crore");
        assert_eq!(format_price_inr(45_000), "\u{20b9} 45,000");
        assert_eq!(format_price_inr(999), "\u{20b9} 999");
    }

    #[test]
    fn group_inr_uses_indian_grouping() {
        assert_eq!(group_inr(1_234_567), "12,34,567");
        assert_eq!(group_inr(99_999), "99,999");
    }

    #[test]
    fn price_label_prefers_display_string() {
        let mut listing = sample_listing();
        listing.price_display = Some("\u{20b9} 5 Lakh".to_string());
        listing.price = Some(480_000);
        assert_eq!(listing.price_label(), "\u{20b9} 5 Lakh");

        listing.price_display = None;
        assert_eq!(listing.price_label(), "\u{20b9} 4.80 Lakh");

        listing.price = None;
        assert_eq!(listing.price_label(), "Price on request");
    }

    #[test]
    fn displayable_categories_drops_empty_groups() {
        let mut listing = sample_listing();
        listing.image_categories = vec![
            ImageCategory {
                label: "Exterior".to_string(),
                images: vec!["a.jpg".to_string()],
            },
            ImageCategory {
                label: "Interior".to_string(),
                images: vec![],
            },
        ];
        let shown = listing.displayable_categories();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].label, "Exterior");
    }

    #[test]
    fn partition_bids_splits_by_status() {
        let bids = vec![
            bid("1", BidStatus::Pending),
            bid("2", BidStatus::Accepted),
            bid("3", BidStatus::Pending),
            bid("4", BidStatus::Rejected),
        ];
        let partitions = partition_bids(&bids);
        assert_eq!(partitions.pending.len(), 2);
        assert_eq!(partitions.accepted.len(), 1);
        assert_eq!(partitions.rejected.len(), 1);
        assert_eq!(partitions.pending[0].id, "1");
    }

    fn sample_listing() -> Listing {
        Listing {
            id: "car-1".to_string(),
            name: "Maruti Swift VXI".to_string(),
            year: 2020,
            price_display: None,
            price: None,
            primary_image: None,
            image_categories: vec![],
            fuel_type: FuelType::Petrol,
            transmission: Transmission::Manual,
            ownership: Ownership::First,
            km_driven: 42_000,
            city: "Pune".to_string(),
            wishlisted: false,
            status: ListingStatus::Live,
        }
    }
}
