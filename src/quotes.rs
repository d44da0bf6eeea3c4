use std::future::Future;

use sqlx::{Connection, postgres::PgConnection};

use crate::{
    alphavantage::{api_caller, response::DailyTimeSeries},
    config::Config,
    model::{self, LoadSummary, PriceObservation, QuotesError, RowOutcome},
    store::{
        postgres::{self, RetryPolicy},
        stock_data,
    },
};

/// Pulls the daily series for the configured symbol and loads it into Postgres.
pub async fn pull_and_save(config: &Config) -> model::Result<LoadSummary> {
    pull_and_save_with(config, &RetryPolicy::default(), || postgres::connect(&config.db)).await
}

/// Same as [`pull_and_save`] with the connection step supplied by the caller.
pub async fn pull_and_save_with<F, Fut>(
    config: &Config,
    policy: &RetryPolicy,
    connect: F,
) -> model::Result<LoadSummary>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PgConnection, sqlx::Error>>,
{
    // Nothing touches the database unless the fetch produced a series.
    let series = api_caller::daily_time_series(
        &config.api_base_url,
        &config.symbol,
        &config.api_key,
        config.output_size,
    )
    .await?;
    log::info!(
        "Fetched {} daily records for {}",
        series.len(),
        config.symbol
    );

    let mut summary = LoadSummary::new(&config.symbol);
    let observations = parse_series(&config.symbol, &series, &mut summary);

    let mut conn = postgres::connect_with_retry(policy, connect)
        .await
        .map_err(|(attempts, source)| QuotesError::DatabaseUnavailable { attempts, source })?;

    stock_data::create_table(&mut conn).await?;
    for outcome in stock_data::save_observations(&mut conn, &observations).await? {
        summary.record(outcome);
    }
    conn.close().await?;

    Ok(summary)
}

// Converts the raw series; rows that fail to parse are recorded as skipped.
fn parse_series(
    symbol: &str,
    series: &DailyTimeSeries,
    summary: &mut LoadSummary,
) -> Vec<PriceObservation> {
    let mut observations = Vec::with_capacity(series.len());
    for (date, fields) in series {
        match PriceObservation::from_daily_bar(symbol, date, fields) {
            Ok(obs) => observations.push(obs),
            Err(reason) => {
                log::error!("Failed to process row {}: {}", date, reason);
                summary.record(RowOutcome::Skipped {
                    date: date.clone(),
                    reason,
                });
            }
        }
    }
    observations
}
