//! Nominatim client used by the coordinate-enrichment task.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::debug;

use super::types::GeocodeHit;

pub struct GeocodingClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeocodingClient {
    /// `contact` (an email or URL) is embedded in the User-Agent, as the
    /// Nominatim usage policy requires for identification.
    pub fn new(base_url: &str, contact: Option<&str>, timeout: Duration) -> Result<Self> {
        let agent = match contact {
            Some(contact) => format!("ctis-scraper/{} ({contact})", env!("CARGO_PKG_VERSION")),
            None => format!("ctis-scraper/{}", env!("CARGO_PKG_VERSION")),
        };
        let client = reqwest::Client::builder()
            .user_agent(agent)
            .timeout(timeout)
            .build()
            .context("failed to build geocoding http client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a structured address to coordinates. `None` means the
    /// geocoder had no usable match; transport failures are errors.
    pub async fn lookup(
        &self,
        street: &str,
        city: Option<&str>,
        postcode: Option<&str>,
        country: Option<&str>,
    ) -> Result<Option<(f64, f64)>> {
        let url = format!("{}/search", self.base_url);
        let mut query: Vec<(&str, &str)> = vec![("street", street)];
        if let Some(city) = city {
            query.push(("city", city));
        }
        if let Some(postcode) = postcode {
            query.push(("postalcode", postcode));
        }
        if let Some(country) = country {
            query.push(("country", country));
        }
        query.push(("format", "json"));
        query.push(("limit", "1"));

        let hits: Vec<GeocodeHit> = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .with_context(|| format!("geocoding request to {url} failed"))?
            .error_for_status()
            .context("geocoding request rejected")?
            .json()
            .await
            .context("invalid geocoding response")?;

        let Some(hit) = hits.into_iter().next() else {
            debug!(street, ?city, ?country, "no geocoder match");
            return Ok(None);
        };
        match (hit.lat.parse::<f64>(), hit.lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => Ok(Some((lat, lon))),
            _ => {
                debug!(lat = %hit.lat, lon = %hit.lon, "unparseable coordinates from geocoder");
                Ok(None)
            }
        }
    }
}
