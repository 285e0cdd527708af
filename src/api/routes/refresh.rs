use std::time::Duration;

use axum::extract::State;
use axum::Json;
use tokio::time::interval;
use tracing::{error, info};

use crate::api::state::{AppState, RefreshOutcome};
use crate::api::ApiError;

pub async fn refresh(State(state): State<AppState>) -> Result<Json<RefreshOutcome>, ApiError> {
    let outcome = state.refresh().await?;
    info!(
        "Manual refresh: dataset {} (changed: {})",
        outcome.dataset_id, outcome.changed
    );
    Ok(Json(outcome))
}

/// Reload the export on a fixed schedule until the task is dropped.
///
/// The first tick fires immediately, so the cache is warm before the
/// first request arrives.
pub async fn run_periodic(state: AppState, every: Duration) {
    let mut ticker = interval(every);

    info!("Starting periodic refresh every {:?}", every);

    loop {
        ticker.tick().await;

        match state.refresh().await {
            Ok(outcome) if outcome.changed => {
                info!(
                    "Periodic refresh loaded dataset {} ({} ranked decks)",
                    outcome.dataset_id, outcome.ranked_decks
                );
            }
            Ok(_) => {}
            Err(e) => {
                error!("Periodic refresh failed: {}", e);
            }
        }
    }
}
