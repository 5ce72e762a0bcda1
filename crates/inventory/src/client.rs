use std::time::{Duration, Instant};

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use frontdesk_core::config::InventoryConfig;
use frontdesk_core::domain::room::{Room, RoomSource};
use frontdesk_core::inventory::{AvailabilityQuery, InventoryError, InventoryProvider};

use crate::amenities::room_amenities;
use crate::models::{DataEnvelope, HotelOffers, HotelSummary, Offer, TokenResponse};

const TOKEN_PATH: &str = "/security/oauth2/token";
const HOTELS_BY_CITY_PATH: &str = "/reference-data/locations/hotels/by-city";
const HOTEL_OFFERS_PATH: &str = "/shopping/hotel-offers";
const OFFERS_PER_HOTEL: usize = 5;
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;
const DEFAULT_ROOM_TYPE: &str = "Standard Room";
const DEFAULT_DESCRIPTION: &str = "Comfortable room";
const DEFAULT_CURRENCY: &str = "USD";
const DEFAULT_BEDS: u32 = 2;

/// Which hotel in a city listing is "ours": the exact property id, else the first
/// hotel of the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertySelector {
    pub hotel_id: String,
    pub chain_code: String,
    pub hotel_name: String,
}

impl PropertySelector {
    pub fn pick<'a>(&self, hotels: &'a [HotelSummary]) -> Option<&'a HotelSummary> {
        hotels.iter().find(|hotel| hotel.hotel_id == self.hotel_id).or_else(|| {
            hotels.iter().find(|hotel| hotel.chain_code.as_deref() == Some(&self.chain_code))
        })
    }
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct InventoryClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    api_secret: SecretString,
    property: PropertySelector,
    city_code: String,
    radius: u32,
    request_timeout: Duration,
    token_timeout: Duration,
    token: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for InventoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryClient")
            .field("base_url", &self.base_url)
            .field("property", &self.property)
            .field("city_code", &self.city_code)
            .finish_non_exhaustive()
    }
}

impl InventoryClient {
    /// Fails with [`InventoryError::NotConfigured`] unless both credentials are present.
    pub fn from_config(
        config: &InventoryConfig,
        hotel_name: impl Into<String>,
    ) -> Result<Self, InventoryError> {
        let (Some(api_key), Some(api_secret)) = (&config.api_key, &config.api_secret) else {
            return Err(InventoryError::NotConfigured);
        };
        if !config.is_configured() {
            return Err(InventoryError::NotConfigured);
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|error| {
                InventoryError::Http(format!("failed to build HTTP client: {error}"))
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.clone(),
            api_secret: api_secret.clone(),
            property: PropertySelector {
                hotel_id: config.hotel_id.clone(),
                chain_code: config.chain_code.clone(),
                hotel_name: hotel_name.into(),
            },
            city_code: config.city_code.clone(),
            radius: config.radius,
            request_timeout: Duration::from_secs(config.timeout_secs),
            token_timeout: Duration::from_secs(config.token_timeout_secs),
            token: Mutex::new(None),
        })
    }

    pub fn city_code(&self) -> &str {
        &self.city_code
    }

    /// Cached bearer token, refreshed a minute before the provider says it expires.
    pub async fn access_token(&self) -> Result<String, InventoryError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|token| Instant::now() < token.expires_at) {
            return Ok(token.value.clone());
        }

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.api_key.expose_secret()),
            ("client_secret", self.api_secret.expose_secret()),
        ];
        let response = self
            .http
            .post(format!("{}{TOKEN_PATH}", self.base_url))
            .form(&form)
            .timeout(self.token_timeout)
            .send()
            .await
            .map_err(|error| InventoryError::Authentication(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InventoryError::Authentication(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|error| {
                InventoryError::Authentication(format!("malformed token response: {error}"))
            })?;
        let lifetime = token.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS);
        debug!(
            event_name = "inventory.token_refreshed",
            lifetime_secs = lifetime,
            "access token refreshed"
        );

        let value = token.access_token;
        *cached = Some(CachedToken {
            value: value.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });
        Ok(value)
    }

    pub async fn search_hotels_by_city(
        &self,
        city_code: &str,
    ) -> Result<Vec<HotelSummary>, InventoryError> {
        let radius = self.radius.to_string();
        let params = [("cityCode", city_code), ("radius", radius.as_str()), ("radiusUnit", "MILE")];
        let envelope: DataEnvelope<HotelSummary> = self.get(HOTELS_BY_CITY_PATH, &params).await?;
        Ok(envelope.data)
    }

    pub async fn hotel_offers(
        &self,
        hotel_ids: &[String],
        query: &AvailabilityQuery,
    ) -> Result<Vec<HotelOffers>, InventoryError> {
        let hotel_ids = hotel_ids.join(",");
        let check_in = query.check_in.format("%Y-%m-%d").to_string();
        let check_out = query.check_out.format("%Y-%m-%d").to_string();
        let adults = query.adults.to_string();
        let params = [
            ("hotelIds", hotel_ids.as_str()),
            ("checkInDate", check_in.as_str()),
            ("checkOutDate", check_out.as_str()),
            ("adults", adults.as_str()),
            ("roomQuantity", "1"),
        ];
        let envelope: DataEnvelope<HotelOffers> = self.get(HOTEL_OFFERS_PATH, &params).await?;
        Ok(envelope.data)
    }

    /// Rooms offered by the configured property in `city_code` for the query's stay.
    /// An empty list means the property was not found or has no offers.
    pub async fn property_rooms(
        &self,
        city_code: &str,
        query: &AvailabilityQuery,
    ) -> Result<Vec<Room>, InventoryError> {
        let hotels = self.search_hotels_by_city(city_code).await?;
        let Some(hotel) = self.property.pick(&hotels) else {
            info!(
                event_name = "inventory.property_not_listed",
                city_code,
                listed = hotels.len(),
                "configured property missing from city listing"
            );
            return Ok(Vec::new());
        };

        let offers = self.hotel_offers(std::slice::from_ref(&hotel.hotel_id), query).await?;
        let nights = query.nights();
        let rooms = offers
            .iter()
            .flat_map(|hotel_offers| hotel_offers.offers.iter().take(OFFERS_PER_HOTEL))
            .map(|offer| offer_to_room(offer, &self.property.hotel_name, nights))
            .collect::<Vec<_>>();

        info!(
            event_name = "inventory.rooms_fetched",
            hotel_id = %hotel.hotel_id,
            check_in = %query.check_in,
            check_out = %query.check_out,
            rooms = rooms.len(),
            "provider offers converted"
        );
        Ok(rooms)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, InventoryError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .query(params)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|error| InventoryError::Http(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                event_name = "inventory.request_failed",
                path,
                status = status.as_u16(),
                "provider rejected request"
            );
            return Err(InventoryError::Status { status: status.as_u16(), body });
        }

        response.json().await.map_err(|error| InventoryError::Decode(error.to_string()))
    }
}

/// Provider totals cover the whole stay; the room carries the nightly share.
fn offer_to_room(offer: &Offer, hotel_name: &str, nights: u32) -> Room {
    let room = &offer.room;
    let total = offer.price.total_amount().unwrap_or(Decimal::ZERO);
    let price_per_night = (total / Decimal::from(nights.max(1))).round_dp(2);

    Room {
        id: offer.id.chars().take(6).collect(),
        room_type: room
            .type_estimated
            .category
            .clone()
            .unwrap_or_else(|| DEFAULT_ROOM_TYPE.to_owned()),
        description: room.description_text().unwrap_or(DEFAULT_DESCRIPTION).to_owned(),
        price_per_night,
        capacity: room.type_estimated.beds.unwrap_or(DEFAULT_BEDS),
        amenities: room_amenities(room.description_text(), room.type_estimated.bed_type.as_deref()),
        available: true,
        source: RoomSource::Provider,
        hotel_name: Some(hotel_name.to_owned()),
        currency: Some(offer.price.currency.clone().unwrap_or_else(|| DEFAULT_CURRENCY.to_owned())),
    }
}

#[async_trait]
impl InventoryProvider for InventoryClient {
    fn is_configured(&self) -> bool {
        true
    }

    async fn search_rooms(&self, query: &AvailabilityQuery) -> Result<Vec<Room>, InventoryError> {
        self.property_rooms(&self.city_code, query).await
    }

    async fn check_connection(&self) -> Result<(), InventoryError> {
        self.access_token().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use frontdesk_core::config::{AppConfig, InventoryConfig};
    use frontdesk_core::domain::room::RoomSource;
    use frontdesk_core::inventory::{AvailabilityQuery, InventoryError, InventoryProvider};

    use super::{InventoryClient, PropertySelector};
    use crate::models::HotelSummary;

    fn config(base_url: &str) -> InventoryConfig {
        let mut config = AppConfig::default().inventory;
        config.api_key = Some(SecretString::from("key-123"));
        config.api_secret = Some(SecretString::from("secret-456"));
        config.base_url = base_url.to_owned();
        config
    }

    fn query() -> AvailabilityQuery {
        AvailabilityQuery::new(
            NaiveDate::from_ymd_opt(2026, 11, 2).expect("date"),
            NaiveDate::from_ymd_opt(2026, 11, 4).expect("date"),
            2,
        )
    }

    async fn mount_token(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/security/oauth2/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=key-123"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "tok-1", "expires_in": 1799})),
            )
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[test]
    fn missing_credentials_mean_not_configured() {
        let mut config = AppConfig::default().inventory;
        config.api_key = Some(SecretString::from("key-only"));

        let result = InventoryClient::from_config(&config, "Test Hotel");
        assert!(matches!(result, Err(InventoryError::NotConfigured)));
    }

    #[test]
    fn property_selector_prefers_exact_id_then_chain() {
        let selector = PropertySelector {
            hotel_id: "HYCLTCHA".to_owned(),
            chain_code: "HY".to_owned(),
            hotel_name: "Test Hotel".to_owned(),
        };
        let hotel = |id: &str, chain: &str| HotelSummary {
            hotel_id: id.to_owned(),
            chain_code: Some(chain.to_owned()),
            name: None,
        };

        let exact = vec![hotel("HYCLT001", "HY"), hotel("HYCLTCHA", "HY")];
        assert_eq!(selector.pick(&exact).map(|h| h.hotel_id.as_str()), Some("HYCLTCHA"));

        let chain_only = vec![hotel("MCCLT001", "MC"), hotel("HYCLT002", "HY")];
        assert_eq!(selector.pick(&chain_only).map(|h| h.hotel_id.as_str()), Some("HYCLT002"));

        assert!(selector.pick(&[hotel("MCCLT001", "MC")]).is_none());
    }

    #[tokio::test]
    async fn property_offers_become_provider_rooms() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;

        Mock::given(method("GET"))
            .and(path("/reference-data/locations/hotels/by-city"))
            .and(query_param("cityCode", "CLT"))
            .and(query_param("radiusUnit", "MILE"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"hotelId": "MCCLT001", "chainCode": "MC"},
                    {"hotelId": "HYCLTCHA", "chainCode": "HY"}
                ]
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/shopping/hotel-offers"))
            .and(query_param("hotelIds", "HYCLTCHA"))
            .and(query_param("checkInDate", "2026-11-02"))
            .and(query_param("checkOutDate", "2026-11-04"))
            .and(query_param("adults", "2"))
            .and(query_param("roomQuantity", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{
                    "hotel": {"hotelId": "HYCLTCHA"},
                    "offers": [
                        {
                            "id": "OFFER12345XYZ",
                            "room": {
                                "typeEstimated": {"category": "DELUXE_ROOM", "beds": 1, "bedType": "KING"},
                                "description": {"text": "King room with coffee maker and TV"}
                            },
                            "price": {"currency": "USD", "total": "310.00"}
                        },
                        {"id": "OFFER2", "room": {}, "price": {"total": "200.00"}}
                    ]
                }]
            })))
            .mount(&server)
            .await;

        let client =
            InventoryClient::from_config(&config(&server.uri()), "Hyatt House Charlotte Airport")
                .expect("client");
        let rooms = client.search_rooms(&query()).await.expect("rooms");

        assert_eq!(rooms.len(), 2);
        let first = &rooms[0];
        assert_eq!(first.id, "OFFER1");
        assert_eq!(first.room_type, "DELUXE_ROOM");
        assert_eq!(first.price_per_night, Decimal::new(15500, 2));
        assert_eq!(first.capacity, 1);
        assert_eq!(first.source, RoomSource::Provider);
        assert_eq!(first.hotel_name.as_deref(), Some("Hyatt House Charlotte Airport"));
        assert_eq!(first.amenities, vec!["Free WiFi", "Flat-screen TV", "Coffee maker", "KING bed"]);

        let second = &rooms[1];
        assert_eq!(second.room_type, "Standard Room");
        assert_eq!(second.description, "Comfortable room");
        assert_eq!(second.capacity, 2);
        assert_eq!(second.currency.as_deref(), Some("USD"));
    }

    #[tokio::test]
    async fn token_is_cached_between_calls() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/reference-data/locations/hotels/by-city"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let client = InventoryClient::from_config(&config(&server.uri()), "Test Hotel").expect("client");
        assert!(client.search_rooms(&query()).await.expect("first search").is_empty());
        assert!(client.search_rooms(&query()).await.expect("second search").is_empty());
        client.check_connection().await.expect("connection check");
    }

    #[tokio::test]
    async fn rejected_credentials_surface_as_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/security/oauth2/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let client = InventoryClient::from_config(&config(&server.uri()), "Test Hotel").expect("client");
        let error = client.check_connection().await.expect_err("auth should fail");

        assert!(matches!(error, InventoryError::Authentication(message) if message.contains("401")));
    }

    #[tokio::test]
    async fn upstream_failure_is_reported_with_status() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;
        Mock::given(method("GET"))
            .and(path("/reference-data/locations/hotels/by-city"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = InventoryClient::from_config(&config(&server.uri()), "Test Hotel").expect("client");
        let error = client.search_rooms(&query()).await.expect_err("search should fail");

        assert_eq!(error, InventoryError::Status { status: 500, body: "boom".to_owned() });
    }
}
