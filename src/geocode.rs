//! Coordinate enrichment for stored locations.

use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

use crate::api::GeocodingClient;
use crate::db::locations;

/// Counts for one coordinate-update run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeocodeReport {
    pub attempted: u64,
    pub geocoded: u64,
    pub failed: u64,
}

/// Geocode every location never offered to the geocoder before.
///
/// Each row commits on its own, so an aborted run keeps its progress;
/// rows never reached stay pending and are picked up next time. A miss
/// marks the row so it is not retried.
pub async fn run(
    conn: &Connection,
    client: &GeocodingClient,
    limit: Option<u32>,
    delay: Duration,
) -> Result<GeocodeReport> {
    let pending =
        locations::list_pending_geocode(conn, limit).context("listing pending locations")?;
    info!(pending = pending.len() as u64, "starting coordinate update");

    let mut report = GeocodeReport::default();
    for (index, location) in pending.iter().enumerate() {
        // Nominatim rate policy: pause between requests.
        if index > 0 {
            tokio::time::sleep(delay).await;
        }
        report.attempted += 1;

        let hit = client
            .lookup(
                &location.address,
                location.city.as_deref(),
                location.postcode.as_deref(),
                location.country.as_deref(),
            )
            .await?;
        match hit {
            Some((latitude, longitude)) => {
                locations::set_coordinates(conn, location.id, latitude, longitude)?;
                report.geocoded += 1;
            }
            None => {
                locations::mark_ungeocodeable(conn, location.id)?;
                report.failed += 1;
            }
        }
    }

    info!(
        attempted = report.attempted,
        geocoded = report.geocoded,
        failed = report.failed,
        "coordinate update finished"
    );
    Ok(report)
}
