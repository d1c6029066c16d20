// Client-side listing filters. Applied over the already-fetched page of
// listings on every change; the backend only sees page/limit parameters.

use serde::{Deserialize, Serialize};

use crate::models::{FuelType, Listing};

/// The filter set the browse page offers. Every field is optional; an unset
/// (or empty) field matches everything.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingFilters {
    pub search: Option<String>,
    pub city: Option<String>,
    pub brand: Option<String>,
    pub fuel_type: Option<FuelType>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub max_year: Option<u16>,
}

impl ListingFilters {
    pub fn is_unset(&self) -> bool {
        !provided(&self.search)
            && !provided(&self.city)
            && !provided(&self.brand)
            && self.fuel_type.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.max_year.is_none()
    }

    /// Conjunction of every provided criterion. Search is a case-insensitive
    /// substring over the display name; city and brand are case-insensitive
    /// exact matches; numeric bounds are inclusive.
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(term) = provided_value(&self.search) {
            if !listing.name.to_lowercase().contains(&term.to_lowercase()) {
                return false;
            }
        }
        if let Some(city) = provided_value(&self.city) {
            if !listing.city.eq_ignore_ascii_case(city) {
                return false;
            }
        }
        if let Some(brand) = provided_value(&self.brand) {
            // Listing names lead with the brand ("Maruti Swift VXI")
            if !listing
                .name
                .to_lowercase()
                .starts_with(&brand.to_lowercase())
            {
                return false;
            }
        }
        if let Some(fuel) = self.fuel_type {
            if listing.fuel_type != fuel {
                return false;
            }
        }
        if let Some(min_price) = self.min_price {
            match listing.price {
                Some(price) if price >= min_price => {}
                _ => return false,
            }
        }
        if let Some(max_price) = self.max_price {
            match listing.price {
                Some(price) if price <= max_price => {}
                _ => return false,
            }
        }
        if let Some(max_year) = self.max_year {
            if listing.year > max_year {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, listings: &[Listing]) -> Vec<Listing> {
        listings
            .iter()
            .filter(|l| self.matches(l))
            .cloned()
            .collect()
    }
}

fn provided(field: &Option<String>) -> bool {
    provided_value(field).is_some()
}

fn provided_value(field: &Option<String>) -> Option<&str> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListingStatus, Ownership, Transmission};

    fn listing(name: &str, price: u64, year: u16, city: &str) -> Listing {
        Listing {
            id: name.to_string(),
            name: name.to_string(),
            year,
            price_display: None,
            price: Some(price),
            primary_image: None,
            image_categories: vec![],
            fuel_type: FuelType::Petrol,
            transmission: Transmission::Manual,
            ownership: Ownership::First,
            km_driven: 30_000,
            city: city.to_string(),
            wishlisted: false,
            status: ListingStatus::Live,
        }
    }

    fn sample() -> Vec<Listing> {
        vec![
            listing("Maruti Swift VXI", 500_000, 2020, "Pune"),
            listing("Hyundai Creta SX", 1_500_000, 2022, "Delhi"),
        ]
    }

    #[test]
    fn no_filters_is_identity() {
        let listings = sample();
        let filters = ListingFilters::default();
        assert!(filters.is_unset());
        let result = filters.apply(&listings);
        assert_eq!(result.len(), listings.len());
        assert_eq!(result[0].id, listings[0].id);
    }

    #[test]
    fn max_price_keeps_cheaper_listing_only() {
        let filters = ListingFilters {
            max_price: Some(1_000_000),
            ..Default::default()
        };
        let result = filters.apply(&sample());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Maruti Swift VXI");
    }

    #[test]
    fn criteria_are_conjoined() {
        let filters = ListingFilters {
            city: Some("pune".to_string()),
            max_price: Some(1_000_000),
            max_year: Some(2021),
            ..Default::default()
        };
        assert_eq!(filters.apply(&sample()).len(), 1);

        let filters = ListingFilters {
            city: Some("Delhi".to_string()),
            max_price: Some(1_000_000),
            ..Default::default()
        };
        assert!(filters.apply(&sample()).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let filters = ListingFilters {
            search: Some("swift".to_string()),
            ..Default::default()
        };
        let result = filters.apply(&sample());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Maruti Swift VXI");
    }

    #[test]
    fn blank_strings_count_as_unset() {
        let filters = ListingFilters {
            search: Some("   ".to_string()),
            city: Some(String::new()),
            ..Default::default()
        };
        assert!(filters.is_unset());
        assert_eq!(filters.apply(&sample()).len(), 2);
    }

    #[test]
    fn listing_without_price_fails_price_bounds() {
        let mut unpriced = listing("Tata Nexon XZ", 0, 2021, "Mumbai");
        unpriced.price = None;
        let filters = ListingFilters {
            max_price: Some(2_000_000),
            ..Default::default()
        };
        assert!(!filters.matches(&unpriced));
    }
}
