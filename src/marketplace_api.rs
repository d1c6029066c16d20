// Thin client for the marketplace backend. Every endpoint answers with the
// {code, message, data} envelope; normalization into Result happens in one
// place so call sites never probe optional fields. No retry, no dedup, no
// timeout beyond reqwest defaults: a failed call surfaces as one error.

use std::sync::Arc;

use anyhow::anyhow;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::models::{Bid, Brand, BrandModel, City, Listing, ListingStatus, UserProfile, Variant};
use crate::wizard::SellDraft;

const FALLBACK_ERROR: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-200 envelope; carries the envelope code and the server message
    /// or the fallback string.
    #[error("{message}")]
    Upstream { code: u16, message: String },
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(anyhow::Error),
}

impl ApiError {
    /// True only for an upstream 404: the id does not exist, as opposed to
    /// the request itself failing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Upstream { code: 404, .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The wire envelope every backend endpoint uses. `code == 200` is the
/// success discriminator across all call sites.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Success with a payload, or the upstream message.
    pub fn into_result(self) -> ApiResult<T> {
        if self.code != 200 {
            return Err(ApiError::Upstream {
                code: self.code,
                message: self.message.unwrap_or_else(|| FALLBACK_ERROR.to_string()),
            });
        }
        self.data
            .ok_or_else(|| ApiError::Decode(anyhow!("success envelope carried no data")))
    }

    /// Success acknowledgement; a missing payload is fine.
    pub fn ack(self) -> ApiResult<()> {
        if self.code != 200 {
            return Err(ApiError::Upstream {
                code: self.code,
                message: self.message.unwrap_or_else(|| FALLBACK_ERROR.to_string()),
            });
        }
        Ok(())
    }
}

// --- Wire-only payloads ---

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub profile: UserProfile,
}

#[derive(Debug, Deserialize)]
struct CreatedId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct WishlistCount {
    count: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    pub upload_url: String,
    pub public_url: String,
}

// --- Client ---

pub struct BackendClient {
    http: Arc<Client>,
    base_url: String,
}

impl BackendClient {
    pub fn new(http: Arc<Client>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let envelope: Envelope<T> = request.send().await?.json().await?;
        envelope.into_result()
    }

    async fn acknowledge(&self, request: RequestBuilder) -> ApiResult<()> {
        let envelope: Envelope<serde_json::Value> = request.send().await?.json().await?;
        envelope.ack()
    }

    // --- Auth ---

    pub async fn send_otp(&self, phone: &str) -> ApiResult<()> {
        let request = self
            .http
            .post(self.url("/auth/send-otp"))
            .json(&json!({ "phone": phone }));
        self.acknowledge(request).await
    }

    pub async fn verify_otp(&self, phone: &str, otp: &str) -> ApiResult<AuthSession> {
        let request = self
            .http
            .post(self.url("/auth/verify"))
            .json(&json!({ "phone": phone, "otp": otp }));
        self.fetch(request).await
    }

    pub async fn logout(&self, token: &str) -> ApiResult<()> {
        let request = self.http.post(self.url("/auth/logout")).bearer_auth(token);
        self.acknowledge(request).await
    }

    // --- Listings ---

    pub async fn list_cars(&self, page: u32, limit: u32) -> ApiResult<Vec<Listing>> {
        let request = self
            .http
            .get(self.url("/cars"))
            .query(&[("page", page), ("limit", limit)]);
        self.fetch(request).await
    }

    pub async fn car_detail(&self, id: &str) -> ApiResult<Listing> {
        let request = self.http.get(self.url(&format!("/cars/{}", id)));
        self.fetch(request).await
    }

    pub async fn create_car(&self, token: &str, draft: &SellDraft) -> ApiResult<String> {
        let request = self
            .http
            .post(self.url("/cars"))
            .bearer_auth(token)
            .json(draft);
        let created: CreatedId = self.fetch(request).await?;
        Ok(created.id)
    }

    pub async fn update_car(&self, token: &str, id: &str, draft: &SellDraft) -> ApiResult<()> {
        let request = self
            .http
            .put(self.url(&format!("/cars/{}", id)))
            .bearer_auth(token)
            .json(draft);
        self.acknowledge(request).await
    }

    pub async fn update_car_status(
        &self,
        token: &str,
        id: &str,
        status: ListingStatus,
    ) -> ApiResult<()> {
        let request = self
            .http
            .put(self.url(&format!("/cars/{}/status", id)))
            .bearer_auth(token)
            .json(&json!({ "status": status }));
        self.acknowledge(request).await
    }

    // --- Bids (backend-authoritative) ---

    pub async fn bids_for_car(&self, token: &str, car_id: &str) -> ApiResult<Vec<Bid>> {
        let request = self
            .http
            .get(self.url(&format!("/cars/{}/bids", car_id)))
            .bearer_auth(token);
        self.fetch(request).await
    }

    pub async fn accept_bid(&self, token: &str, bid_id: &str) -> ApiResult<()> {
        let request = self
            .http
            .post(self.url(&format!("/bids/{}/accept", bid_id)))
            .bearer_auth(token);
        self.acknowledge(request).await
    }

    pub async fn reject_bid(&self, token: &str, bid_id: &str) -> ApiResult<()> {
        let request = self
            .http
            .post(self.url(&format!("/bids/{}/reject", bid_id)))
            .bearer_auth(token);
        self.acknowledge(request).await
    }

    // --- Wishlist ---

    pub async fn wishlist(&self, token: &str) -> ApiResult<Vec<Listing>> {
        let request = self.http.get(self.url("/wishlist")).bearer_auth(token);
        self.fetch(request).await
    }

    pub async fn wishlist_add(&self, token: &str, car_id: &str) -> ApiResult<()> {
        let request = self
            .http
            .post(self.url(&format!("/wishlist/{}", car_id)))
            .bearer_auth(token);
        self.acknowledge(request).await
    }

    pub async fn wishlist_remove(&self, token: &str, car_id: &str) -> ApiResult<()> {
        let request = self
            .http
            .delete(self.url(&format!("/wishlist/{}", car_id)))
            .bearer_auth(token);
        self.acknowledge(request).await
    }

    pub async fn wishlist_clear(&self, token: &str) -> ApiResult<()> {
        let request = self.http.delete(self.url("/wishlist")).bearer_auth(token);
        self.acknowledge(request).await
    }

    pub async fn wishlist_count(&self, token: &str) -> ApiResult<u32> {
        let request = self.http.get(self.url("/wishlist/count")).bearer_auth(token);
        let count: WishlistCount = self.fetch(request).await?;
        Ok(count.count)
    }

    // --- Profile ---

    pub async fn profile(&self, token: &str) -> ApiResult<UserProfile> {
        let request = self.http.get(self.url("/profile")).bearer_auth(token);
        self.fetch(request).await
    }

    pub async fn update_profile(
        &self,
        token: &str,
        name: Option<&str>,
        email: Option<&str>,
    ) -> ApiResult<UserProfile> {
        let request = self
            .http
            .put(self.url("/profile"))
            .bearer_auth(token)
            .json(&json!({ "name": name, "email": email }));
        self.fetch(request).await
    }

    pub async fn send_email_otp(&self, token: &str, email: &str) -> ApiResult<()> {
        let request = self
            .http
            .post(self.url("/profile/email-otp"))
            .bearer_auth(token)
            .json(&json!({ "email": email }));
        self.acknowledge(request).await
    }

    pub async fn delete_account(&self, token: &str) -> ApiResult<()> {
        let request = self.http.delete(self.url("/profile")).bearer_auth(token);
        self.acknowledge(request).await
    }

    // --- Lookups ---

    pub async fn brands(&self) -> ApiResult<Vec<Brand>> {
        let request = self.http.get(self.url("/lookups/brands"));
        self.fetch(request).await
    }

    pub async fn models_for_brand(&self, brand_id: &str) -> ApiResult<Vec<BrandModel>> {
        let request = self
            .http
            .get(self.url(&format!("/lookups/brands/{}/models", brand_id)));
        self.fetch(request).await
    }

    pub async fn years_for_model(&self, model_id: &str) -> ApiResult<Vec<u16>> {
        let request = self
            .http
            .get(self.url(&format!("/lookups/models/{}/years", model_id)));
        self.fetch(request).await
    }

    pub async fn variants_for_model(&self, model_id: &str, year: u16) -> ApiResult<Vec<Variant>> {
        let request = self
            .http
            .get(self.url(&format!("/lookups/models/{}/variants", model_id)))
            .query(&[("year", year)]);
        self.fetch(request).await
    }

    pub async fn city_suggestions(&self, query: &str) -> ApiResult<Vec<City>> {
        let request = self
            .http
            .get(self.url("/cities/suggest"))
            .query(&[("q", query)]);
        self.fetch(request).await
    }

    pub async fn active_cities(&self) -> ApiResult<Vec<City>> {
        let request = self.http.get(self.url("/cities/active"));
        self.fetch(request).await
    }

    // --- Uploads ---

    /// Asks the backend for a presigned URL pair for one file.
    pub async fn upload_url(
        &self,
        token: &str,
        file_name: &str,
        content_type: &str,
    ) -> ApiResult<PresignedUpload> {
        let request = self
            .http
            .post(self.url("/uploads/presign"))
            .bearer_auth(token)
            .json(&json!({ "fileName": file_name, "contentType": content_type }));
        self.fetch(request).await
    }

    /// Direct PUT of the file bytes to the presigned URL (not enveloped;
    /// this talks to the storage service, not the backend).
    pub async fn upload_file(
        &self,
        upload_url: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<()> {
        self.http
            .put(upload_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_yields_data() {
        let envelope: Envelope<Vec<String>> = serde_json::from_str(
            r#"{"code": 200, "message": "OK", "data": ["a", "b"]}"#,
        )
        .expect("deserialize");
        assert_eq!(envelope.into_result().unwrap(), ["a", "b"]);
    }

    #[test]
    fn non_200_envelope_yields_server_message() {
        let envelope: Envelope<Vec<String>> = serde_json::from_str(
            r#"{"code": 401, "message": "OTP expired", "data": null}"#,
        )
        .expect("deserialize");
        match envelope.into_result() {
            Err(ApiError::Upstream { code, message }) => {
                assert_eq!(code, 401);
                assert_eq!(message, "OTP expired");
            }
            other => panic!("expected upstream error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn only_an_upstream_404_counts_as_not_found() {
        let absent: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"code": 404, "message": "No such car", "data": null}"#)
                .expect("deserialize");
        let failed: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"code": 500, "message": "boom", "data": null}"#)
                .expect("deserialize");
        assert!(absent.into_result().unwrap_err().is_not_found());
        assert!(!failed.into_result().unwrap_err().is_not_found());
    }

    #[test]
    fn missing_message_falls_back_to_fixed_string() {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"code": 500, "message": null, "data": null}"#)
                .expect("deserialize");
        match envelope.into_result() {
            Err(ApiError::Upstream { message, .. }) => assert_eq!(message, FALLBACK_ERROR),
            other => panic!("expected upstream error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn ack_tolerates_missing_data() {
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(r#"{"code": 200, "message": "OK", "data": null}"#)
                .expect("deserialize");
        assert!(envelope.ack().is_ok());
    }

    #[test]
    fn success_without_data_is_a_decode_error() {
        let envelope: Envelope<Vec<String>> =
            serde_json::from_str(r#"{"code": 200, "message": "OK", "data": null}"#)
                .expect("deserialize");
        assert!(matches!(envelope.into_result(), Err(ApiError::Decode(_))));
    }
}
