//! Live room offers for the hotel property.
//!
//! [`InventoryClient`] speaks the provider's OAuth client-credentials flow, locates the
//! configured property among the hotels of a city, and turns its offers into
//! [`frontdesk_core::Room`] values tagged as provider-sourced. Callers decide what to do
//! when the provider is unavailable; the chat and phone paths fall back to static rooms.

pub mod amenities;
pub mod client;
pub mod models;

pub use client::{InventoryClient, PropertySelector};
pub use models::{HotelOffers, HotelSummary};
