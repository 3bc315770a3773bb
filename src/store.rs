//! Editor persistence: the `ChartDataStore` interface plus an in-memory
//! implementation.
//!
//! The browser-side editor script is the only writer in production; the
//! server exposes the upsert/fetch routes and calls through this trait.
//! Uniqueness key is `(chart_id, presentation_id)`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChartRecord {
    pub chart_id: String,
    pub presentation_id: String,
    pub payload: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ChartDataUpsert {
    pub chart_id: String,
    pub presentation_id: String,
    pub payload: serde_json::Value,
}

#[async_trait]
pub trait ChartDataStore: Send + Sync {
    async fn upsert(&self, record: ChartDataUpsert) -> Result<DateTime<Utc>, ServiceError>;
    async fn for_presentation(
        &self,
        presentation_id: &str,
    ) -> Result<Vec<ChartRecord>, ServiceError>;
}

/// Concurrent in-memory store keyed by `(chart_id, presentation_id)`.
#[derive(Default)]
pub struct InMemoryChartStore {
    records: DashMap<(String, String), ChartRecord>,
}

impl InMemoryChartStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChartDataStore for InMemoryChartStore {
    async fn upsert(&self, record: ChartDataUpsert) -> Result<DateTime<Utc>, ServiceError> {
        let updated_at = Utc::now();
        self.records.insert(
            (record.chart_id.clone(), record.presentation_id.clone()),
            ChartRecord {
                chart_id: record.chart_id,
                presentation_id: record.presentation_id,
                payload: record.payload,
                updated_at,
            },
        );
        Ok(updated_at)
    }

    async fn for_presentation(
        &self,
        presentation_id: &str,
    ) -> Result<Vec<ChartRecord>, ServiceError> {
        let mut records: Vec<ChartRecord> = self
            .records
            .iter()
            .filter(|entry| entry.key().1 == presentation_id)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| a.chart_id.cmp(&b.chart_id));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn upsert_replaces_by_composite_key() {
        let store = InMemoryChartStore::new();
        let first = ChartDataUpsert {
            chart_id: "chart_a".into(),
            presentation_id: "pres-1".into(),
            payload: json!({ "labels": ["a"], "values": [1.0] }),
        };
        store.upsert(first).await.unwrap();
        store
            .upsert(ChartDataUpsert {
                chart_id: "chart_a".into(),
                presentation_id: "pres-1".into(),
                payload: json!({ "labels": ["b"], "values": [2.0] }),
            })
            .await
            .unwrap();

        let records = store.for_presentation("pres-1").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].payload["labels"][0], "b");
    }

    #[tokio::test]
    async fn fetch_is_scoped_to_the_presentation() {
        let store = InMemoryChartStore::new();
        for (chart, pres) in [("chart_a", "pres-1"), ("chart_b", "pres-1"), ("chart_a", "pres-2")] {
            store
                .upsert(ChartDataUpsert {
                    chart_id: chart.into(),
                    presentation_id: pres.into(),
                    payload: json!({}),
                })
                .await
                .unwrap();
        }
        assert_eq!(store.for_presentation("pres-1").await.unwrap().len(), 2);
        assert_eq!(store.for_presentation("pres-2").await.unwrap().len(), 1);
        assert!(store.for_presentation("ghost").await.unwrap().is_empty());
    }
}
