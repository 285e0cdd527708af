use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::api::ApiError;
use crate::calculate::{AggregateError, MetaAggregator};
use crate::config::AppConfig;
use crate::storage::{read_match_records, DerivedReport, StorageConfig};

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<StorageConfig>,
    pub config: Arc<AppConfig>,
    pub aggregator: Arc<MetaAggregator>,
    pub cache: Arc<RwLock<Option<Arc<DerivedReport>>>>,
}

/// What a reload of the matchup export did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshOutcome {
    pub dataset_id: String,
    /// False when the export was byte-identical to the cached one
    pub changed: bool,
    pub ranked_decks: usize,
    pub skipped_records: usize,
}

impl RefreshOutcome {
    fn for_report(report: &DerivedReport, changed: bool) -> Self {
        Self {
            dataset_id: report.dataset_id.to_string(),
            changed,
            ranked_decks: report.result.deck_count(),
            skipped_records: report.result.skipped_records,
        }
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, AggregateError> {
        let aggregator = MetaAggregator::new(config.aggregation.clone())?;
        Ok(Self {
            storage: Arc::new(StorageConfig::new(config.data_dir.clone())),
            config: Arc::new(config),
            aggregator: Arc::new(aggregator),
            cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Serve a previously derived snapshot until the next refresh.
    pub async fn seed(&self, report: DerivedReport) {
        debug!("Seeding report cache with dataset {}", report.dataset_id);
        *self.cache.write().await = Some(Arc::new(report));
    }

    /// The cached report, loading the export on first use.
    pub async fn current_report(&self) -> Result<Arc<DerivedReport>, ApiError> {
        {
            let cache = self.cache.read().await;
            if let Some(report) = cache.as_ref() {
                return Ok(Arc::clone(report));
            }
        }

        self.refresh().await?;
        self.cache
            .read()
            .await
            .clone()
            .ok_or_else(|| ApiError::NoData("no report has been computed".to_string()))
    }

    /// Re-read the export and re-aggregate if its contents changed.
    pub async fn refresh(&self) -> Result<RefreshOutcome, ApiError> {
        let path = self.storage.dataset_path(&self.config.dataset);
        let loaded = read_match_records(&path, self.aggregator.config().strict)?;

        let mut cache = self.cache.write().await;
        if let Some(current) = cache.as_ref() {
            if current.dataset_id == loaded.id {
                debug!("Dataset {} unchanged, keeping cached report", loaded.id);
                return Ok(RefreshOutcome::for_report(current, false));
            }
        }

        let result = self.aggregator.aggregate_dataset(&loaded.dataset)?;
        let report = DerivedReport::new(loaded.id, self.config.dataset.clone(), result);
        info!(
            "Aggregated dataset {}: {} ranked decks, {} skipped records",
            report.dataset_id,
            report.result.deck_count(),
            report.result.skipped_records
        );

        let outcome = RefreshOutcome::for_report(&report, true);
        *cache = Some(Arc::new(report));
        Ok(outcome)
    }
}
