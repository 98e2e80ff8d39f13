//! The scrape run: walk every search page, reconcile every trial.

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::api::types::TrialOverview;
use crate::api::CtisClient;
use crate::db::{self, update_history};
use crate::ingest::{self, Disposition};

/// Counts for one scrape run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    pub inserted: u64,
    pub updated: u64,
    pub unchanged: u64,
    pub failed: u64,
}

/// Run a full reconciliation pass and record its outcome in
/// `update_history`. With `fresh`, previously scraped trial data is
/// cleared first; locations (and their coordinates) survive.
pub async fn run(conn: &mut Connection, client: &CtisClient, fresh: bool) -> Result<ScrapeReport> {
    match scrape_all(conn, client, fresh).await {
        Ok(report) => {
            update_history::record(conn, "Update successful")
                .context("recording run outcome")?;
            info!(
                inserted = report.inserted,
                updated = report.updated,
                unchanged = report.unchanged,
                failed = report.failed,
                "scrape finished"
            );
            Ok(report)
        }
        Err(err) => {
            if let Err(record_err) =
                update_history::record(conn, &format!("Update failed - {err}"))
            {
                warn!(error = %record_err, "could not record failed run");
            }
            Err(err)
        }
    }
}

async fn scrape_all(
    conn: &mut Connection,
    client: &CtisClient,
    fresh: bool,
) -> Result<ScrapeReport> {
    if fresh {
        db::clear_trial_data(conn).context("clearing trial data")?;
        info!("cleared previously scraped trial data");
    }

    let total = client.total_records().await?;
    info!(total, "starting scrape");

    let mut report = ScrapeReport::default();
    let mut page = 1u32;
    loop {
        let response = client.search_page(page).await?;

        for overview in &response.data {
            match process_overview(conn, client, overview).await {
                Ok(Disposition::New) => report.inserted += 1,
                Ok(Disposition::Changed) => report.updated += 1,
                Ok(Disposition::Unchanged) => report.unchanged += 1,
                Err(err) => {
                    warn!(
                        ct_number = %overview.ct_number,
                        error = %err,
                        "trial failed"
                    );
                    report.failed += 1;
                }
            }
        }

        info!(page, trials = response.data.len() as u64, "processed search page");
        if !response.pagination.next_page {
            break;
        }
        page += 1;
    }

    Ok(report)
}

/// Reconcile one overview row. The full-trial fetch is skipped when the
/// stored `last_updated_in_ctis` already matches.
async fn process_overview(
    conn: &mut Connection,
    client: &CtisClient,
    overview: &TrialOverview,
) -> Result<Disposition> {
    if ingest::disposition(conn, overview)? == Disposition::Unchanged {
        return Ok(Disposition::Unchanged);
    }
    let full = client.full_trial(&overview.ct_number).await?;
    Ok(ingest::upsert_trial(conn, overview, &full)?)
}
