use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// One entry of the hotels-by-city listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelSummary {
    #[serde(rename = "hotelId")]
    pub hotel_id: String,
    #[serde(rename = "chainCode", default)]
    pub chain_code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Offers returned for one hotel.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct HotelOffers {
    #[serde(default)]
    pub hotel: OfferHotel,
    #[serde(default)]
    pub offers: Vec<Offer>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OfferHotel {
    #[serde(rename = "hotelId", default)]
    pub hotel_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Offer {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub room: OfferRoom,
    #[serde(default)]
    pub price: OfferPrice,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OfferRoom {
    #[serde(rename = "typeEstimated", default)]
    pub type_estimated: TypeEstimated,
    #[serde(default)]
    pub description: Option<TextBlock>,
}

impl OfferRoom {
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_ref().and_then(|block| block.text.as_deref())
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TypeEstimated {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub beds: Option<u32>,
    #[serde(rename = "bedType", default)]
    pub bed_type: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OfferPrice {
    #[serde(default)]
    pub currency: Option<String>,
    /// The provider sends amounts as strings; numbers are accepted too.
    #[serde(default)]
    pub total: Option<Value>,
}

impl OfferPrice {
    pub fn total_amount(&self) -> Option<Decimal> {
        match self.total.as_ref()? {
            Value::String(raw) => Decimal::from_str(raw.trim()).ok(),
            Value::Number(number) => Decimal::from_str(&number.to_string()).ok(),
            _ => None,
        }
    }
}
