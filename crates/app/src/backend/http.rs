//! JSON-over-HTTP backend adapter.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;
use vitrine::{
    cart::{CartItem, Quantity},
    watches::{Gender, Watch, WatchDetails, WatchId, WatchImages},
};

use crate::{
    backend::{BackendError, StorefrontBackend},
    identity::UserId,
};

/// Backend reached over HTTP. Image buffers travel as base64 strings.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    http: Client,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`, e.g. `"http://localhost:8080"`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(request: RequestBuilder, action: &str) -> Result<Response, BackendError> {
        Self::check(request.send().await?, action).await
    }

    async fn check(response: Response, action: &str) -> Result<Response, BackendError> {
        let status = response.status();

        debug!(action, %status, "backend responded");

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();

        Err(status_error(status, action, &text))
    }

    async fn fetch<T: DeserializeOwned>(
        request: RequestBuilder,
        action: &str,
    ) -> Result<T, BackendError> {
        Ok(Self::send(request, action).await?.json().await?)
    }

    async fn fetch_watches(
        request: RequestBuilder,
        action: &str,
    ) -> Result<Vec<Watch>, BackendError> {
        let wire: Vec<WireWatch> = Self::fetch(request, action).await?;

        wire.into_iter().map(Watch::try_from).collect()
    }
}

/// Map a non-success status to an error. Client errors are rejections, anything else is
/// unexpected.
fn status_error(status: StatusCode, action: &str, body: &str) -> BackendError {
    let message = format!("{action} failed with status {status}: {body}");

    if status.is_client_error() {
        BackendError::Rejected(message)
    } else {
        BackendError::UnexpectedResponse(message)
    }
}

#[async_trait]
impl StorefrontBackend for HttpBackend {
    async fn add_watch(&self, details: WatchDetails) -> Result<WatchId, BackendError> {
        let request = self
            .http
            .post(self.url("/watches"))
            .json(&WireDetails::from(&details));

        let created: Created = Self::fetch(request, "addWatch").await?;

        Ok(WatchId::new(created.id))
    }

    async fn update_watch(&self, id: WatchId, details: WatchDetails) -> Result<(), BackendError> {
        let request = self
            .http
            .put(self.url(&format!("/watches/{id}")))
            .json(&WireDetails::from(&details));

        Self::send(request, "updateWatch").await?;

        Ok(())
    }

    async fn delete_watch(&self, id: WatchId) -> Result<(), BackendError> {
        let request = self.http.delete(self.url(&format!("/watches/{id}")));

        Self::send(request, "deleteWatch").await?;

        Ok(())
    }

    async fn get_all_watches(&self) -> Result<Vec<Watch>, BackendError> {
        Self::fetch_watches(self.http.get(self.url("/watches")), "getAllWatches").await
    }

    async fn get_featured_watches(&self) -> Result<Vec<Watch>, BackendError> {
        Self::fetch_watches(
            self.http.get(self.url("/watches/featured")),
            "getFeaturedWatches",
        )
        .await
    }

    async fn get_watch(&self, id: WatchId) -> Result<Option<Watch>, BackendError> {
        let response = self
            .http
            .get(self.url(&format!("/watches/{id}")))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check(response, "getWatch").await?;

        let wire: WireWatch = response.json().await?;

        Watch::try_from(wire).map(Some)
    }

    async fn search_watches(&self, term: String) -> Result<Vec<Watch>, BackendError> {
        let request = self
            .http
            .get(self.url("/watches/search"))
            .query(&[("term", term)]);

        Self::fetch_watches(request, "searchWatches").await
    }

    async fn add_to_cart(
        &self,
        user: UserId,
        watch: WatchId,
        quantity: Quantity,
    ) -> Result<(), BackendError> {
        let request = self
            .http
            .post(self.url(&format!("/carts/{user}/items")))
            .json(&CartItem {
                watch_id: watch,
                quantity,
            });

        Self::send(request, "addToCart").await?;

        Ok(())
    }

    async fn remove_from_cart(&self, user: UserId, watch: WatchId) -> Result<(), BackendError> {
        let request = self
            .http
            .delete(self.url(&format!("/carts/{user}/items/{watch}")));

        Self::send(request, "removeFromCart").await?;

        Ok(())
    }

    async fn update_cart_item_quantity(
        &self,
        user: UserId,
        watch: WatchId,
        quantity: Quantity,
    ) -> Result<(), BackendError> {
        let request = self
            .http
            .put(self.url(&format!("/carts/{user}/items/{watch}")))
            .json(&QuantityBody { quantity });

        Self::send(request, "updateCartItemQuantity").await?;

        Ok(())
    }

    async fn get_cart(&self, user: UserId) -> Result<Vec<CartItem>, BackendError> {
        Self::fetch(self.http.get(self.url(&format!("/carts/{user}"))), "getCart").await
    }

    async fn get_cart_total(&self, user: UserId) -> Result<u64, BackendError> {
        let total: Total = Self::fetch(
            self.http.get(self.url(&format!("/carts/{user}/total"))),
            "getCartTotal",
        )
        .await?;

        Ok(total.total)
    }

    async fn clear_cart(&self, user: UserId) -> Result<(), BackendError> {
        Self::send(
            self.http.delete(self.url(&format!("/carts/{user}"))),
            "clearCart",
        )
        .await?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Created {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct Total {
    total: u64,
}

#[derive(Debug, Serialize)]
struct QuantityBody {
    quantity: Quantity,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireDetails<'a> {
    name: &'a str,
    company: &'a str,
    model_number: &'a str,
    price: u64,
    gender: &'a str,
    description: &'a str,
    images: Vec<String>,
    is_featured: bool,
}

impl<'a> From<&'a WatchDetails> for WireDetails<'a> {
    fn from(details: &'a WatchDetails) -> Self {
        Self {
            name: &details.name,
            company: &details.company,
            model_number: &details.model_number,
            price: details.price,
            gender: details.gender.as_str(),
            description: &details.description,
            images: details.images.iter().map(|image| BASE64.encode(image)).collect(),
            is_featured: details.is_featured,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireWatch {
    id: u64,
    name: String,
    description: String,
    company: String,
    model_number: String,
    gender: String,
    price: u64,
    is_featured: bool,
    images: Vec<String>,
}

impl TryFrom<WireWatch> for Watch {
    type Error = BackendError;

    fn try_from(wire: WireWatch) -> Result<Self, Self::Error> {
        let images = wire
            .images
            .iter()
            .map(|image| {
                BASE64.decode(image).map_err(|error| {
                    BackendError::UnexpectedResponse(format!(
                        "watch {} has an undecodable image: {error}",
                        wire.id
                    ))
                })
            })
            .collect::<Result<WatchImages, _>>()?;

        Ok(Watch {
            id: WatchId::new(wire.id),
            name: wire.name,
            description: wire.description,
            company: wire.company,
            model_number: wire.model_number,
            gender: Gender::from(wire.gender),
            price: wire.price,
            is_featured: wire.is_featured,
            images,
        })
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn client_errors_are_rejections() {
        for status in [StatusCode::BAD_REQUEST, StatusCode::NOT_FOUND, StatusCode::CONFLICT] {
            let error = status_error(status, "getWatch", "bad id");

            assert!(
                matches!(&error, BackendError::Rejected(message) if message.contains("bad id")),
                "{status} mapped to {error:?}"
            );
        }
    }

    #[test]
    fn server_and_other_statuses_are_unexpected() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::PERMANENT_REDIRECT,
        ] {
            assert!(
                matches!(
                    status_error(status, "getCart", ""),
                    BackendError::UnexpectedResponse(_)
                ),
                "{status} should be unexpected"
            );
        }
    }

    fn wire_watch(images: Vec<String>) -> WireWatch {
        WireWatch {
            id: 4,
            name: "Nova".to_string(),
            description: "Field watch".to_string(),
            company: "Tudor".to_string(),
            model_number: "TD-4".to_string(),
            gender: "Unisex".to_string(),
            price: 3_100,
            is_featured: false,
            images,
        }
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let backend = HttpBackend::new("http://localhost:8080/");

        assert_eq!(backend.url("/watches"), "http://localhost:8080/watches");
    }

    #[test]
    fn wire_watch_decodes_base64_images() -> TestResult {
        let watch = Watch::try_from(wire_watch(vec![BASE64.encode([0xFF, 0xD8, 0xFF])]))?;

        assert_eq!(watch.id, WatchId::new(4));
        assert_eq!(watch.gender, Gender::Unisex);
        assert_eq!(watch.main_image(), Some([0xFF_u8, 0xD8, 0xFF].as_slice()));

        Ok(())
    }

    #[test]
    fn undecodable_image_is_an_unexpected_response() {
        let result = Watch::try_from(wire_watch(vec!["***".to_string()]));

        assert!(matches!(result, Err(BackendError::UnexpectedResponse(_))));
    }

    #[test]
    fn details_serialize_with_camel_case_and_base64() -> TestResult {
        let details = WatchDetails {
            name: "Aria".to_string(),
            company: "Omega".to_string(),
            model_number: "OM-1".to_string(),
            price: 5_000,
            gender: Gender::Women,
            description: "Dress watch".to_string(),
            images: smallvec![vec![1, 2, 3]],
            is_featured: true,
        };

        let json = serde_json::to_value(WireDetails::from(&details))?;

        assert_eq!(json["modelNumber"], "OM-1");
        assert_eq!(json["gender"], "Women");
        assert_eq!(json["isFeatured"], true);
        assert_eq!(json["images"][0], "AQID");

        Ok(())
    }

    #[test]
    fn cart_item_body_uses_backend_field_names() -> TestResult {
        let json = serde_json::to_value(CartItem {
            watch_id: WatchId::new(2),
            quantity: Quantity::new(3)?,
        })?;

        assert_eq!(json, serde_json::json!({ "watchId": 2, "quantity": 3 }));

        Ok(())
    }
}
