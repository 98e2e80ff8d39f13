//! HTTP clients for the two upstream services: the CTIS public API and
//! the Nominatim geocoder.

pub mod ctis;
pub mod geocoding;
pub mod types;

pub use ctis::CtisClient;
pub use geocoding::GeocodingClient;
