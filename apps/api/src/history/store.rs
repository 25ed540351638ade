//! History store: a best-effort, device-local cache of saved itineraries.
//!
//! Records are keyed by plan title: saving a plan whose title already exists
//! replaces that record in place (same id, fresh timestamp). New titles are
//! prepended and the list is capped at [`HISTORY_CAP`] entries.
//!
//! The file backend reads the whole list at startup and rewrites it after every
//! mutation. A missing or unparseable file yields an empty history.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::document::model::{TourKind, TourPlan};
use crate::document::quotation::Quotation;

pub const HISTORY_CAP: usize = 50;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("History I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("History serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub plan: TourPlan,
    #[serde(alias = "type")]
    pub kind: TourKind,
    #[serde(default)]
    pub quotation: Option<Quotation>,
}

/// Lightweight listing entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub kind: TourKind,
    pub day_count: usize,
    pub has_quotation: bool,
}

impl From<&HistoryRecord> for HistorySummary {
    fn from(record: &HistoryRecord) -> Self {
        HistorySummary {
            id: record.id,
            timestamp: record.timestamp,
            title: record.plan.main_title.clone(),
            kind: record.kind,
            day_count: record.plan.days.len(),
            has_quotation: record.quotation.is_some(),
        }
    }
}

/// Persisted history. Carried in `AppState` as `Arc<dyn HistoryStore>`.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Up to `n` records, newest first.
    async fn list_recent(&self, n: usize) -> Vec<HistoryRecord>;

    async fn get(&self, id: Uuid) -> Option<HistoryRecord>;

    /// Saves `plan` keyed by its title and returns the stored record.
    async fn upsert(
        &self,
        plan: TourPlan,
        kind: TourKind,
        quotation: Option<Quotation>,
    ) -> Result<HistoryRecord, HistoryError>;

    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, HistoryError>;

    /// Writes `quotation` into the record titled `title`, if any.
    async fn attach_quotation(
        &self,
        title: &str,
        quotation: &Quotation,
    ) -> Result<bool, HistoryError>;
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory list with the upsert rules
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryList {
    records: Vec<HistoryRecord>,
}

impl HistoryList {
    pub fn new(records: Vec<HistoryRecord>) -> Self {
        HistoryList { records }
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn upsert(
        &mut self,
        plan: TourPlan,
        kind: TourKind,
        quotation: Option<Quotation>,
        now: DateTime<Utc>,
    ) -> HistoryRecord {
        let existing = self
            .records
            .iter()
            .position(|r| r.plan.main_title == plan.main_title);

        let record = HistoryRecord {
            id: existing.map(|i| self.records[i].id).unwrap_or_else(Uuid::new_v4),
            timestamp: now,
            plan,
            kind,
            quotation,
        };

        match existing {
            Some(i) => self.records[i] = record.clone(),
            None => {
                self.records.insert(0, record.clone());
                self.records.truncate(HISTORY_CAP);
            }
        }
        record
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    pub fn attach_quotation(&mut self, title: &str, quotation: &Quotation) -> bool {
        let mut touched = false;
        for record in self.records.iter_mut().filter(|r| r.plan.main_title == title) {
            record.quotation = Some(quotation.clone());
            touched = true;
        }
        touched
    }
}

// ────────────────────────────────────────────────────────────────────────────
// JSON file backend
// ────────────────────────────────────────────────────────────────────────────

pub struct JsonFileHistory {
    path: PathBuf,
    list: Mutex<HistoryList>,
}

impl JsonFileHistory {
    /// Loads the history file. Never fails: unreadable content degrades to empty.
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<HistoryRecord>>(&bytes) {
                Ok(records) => records,
                Err(e) => {
                    warn!("History file {} is unreadable, starting empty: {e}", path.display());
                    Vec::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                warn!("Could not read history file {}: {e}", path.display());
                Vec::new()
            }
        };
        info!("History loaded: {} records from {}", records.len(), path.display());

        JsonFileHistory {
            path,
            list: Mutex::new(HistoryList::new(records)),
        }
    }

    async fn persist(&self, list: &HistoryList) -> Result<(), HistoryError> {
        let json = serde_json::to_vec(list.records())?;
        tokio::fs::write(&self.path, json).await?;
        debug!("History persisted ({} records)", list.records().len());
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistory {
    async fn list_recent(&self, n: usize) -> Vec<HistoryRecord> {
        let list = self.list.lock().await;
        list.records().iter().take(n).cloned().collect()
    }

    async fn get(&self, id: Uuid) -> Option<HistoryRecord> {
        let list = self.list.lock().await;
        list.records().iter().find(|r| r.id == id).cloned()
    }

    async fn upsert(
        &self,
        plan: TourPlan,
        kind: TourKind,
        quotation: Option<Quotation>,
    ) -> Result<HistoryRecord, HistoryError> {
        let mut list = self.list.lock().await;
        let record = list.upsert(plan, kind, quotation, Utc::now());
        self.persist(&list).await?;
        Ok(record)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, HistoryError> {
        let mut list = self.list.lock().await;
        let removed = list.delete(id);
        if removed {
            self.persist(&list).await?;
        }
        Ok(removed)
    }

    async fn attach_quotation(
        &self,
        title: &str,
        quotation: &Quotation,
    ) -> Result<bool, HistoryError> {
        let mut list = self.list.lock().await;
        let touched = list.attach_quotation(title, quotation);
        if touched {
            self.persist(&list).await?;
        }
        Ok(touched)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::tests::make_plan;
    use chrono::Duration;

    fn titled(title: &str) -> TourPlan {
        let mut plan = make_plan(1);
        plan.main_title = title.to_string();
        plan
    }

    // ── list rules ──────────────────────────────────────────────────────────

    #[test]
    fn test_upsert_same_title_replaces_in_place() {
        let t0 = Utc::now();
        let mut list = HistoryList::default();
        let first = list.upsert(titled("A"), TourKind::Domestic, None, t0);
        list.upsert(titled("B"), TourKind::Domestic, None, t0);

        let mut edited = titled("A");
        edited.marketing_subtitle = "edited".to_string();
        let later = t0 + Duration::seconds(5);
        let second = list.upsert(edited, TourKind::International, None, later);

        assert_eq!(list.records().len(), 2);
        assert_eq!(second.id, first.id);
        // "A" keeps its slot behind the newer "B".
        assert_eq!(list.records()[1].id, first.id);
        assert_eq!(list.records()[1].timestamp, later);
        assert_eq!(list.records()[1].plan.marketing_subtitle, "edited");
        assert_eq!(list.records()[1].kind, TourKind::International);
    }

    #[test]
    fn test_fifty_one_titles_keep_fifty_most_recent() {
        let mut list = HistoryList::default();
        for i in 0..51 {
            list.upsert(titled(&format!("T{i}")), TourKind::Domestic, None, Utc::now());
        }
        assert_eq!(list.records().len(), HISTORY_CAP);
        assert_eq!(list.records()[0].plan.main_title, "T50");
        assert!(list.records().iter().all(|r| r.plan.main_title != "T0"));
    }

    #[test]
    fn test_delete_and_attach_quotation() {
        let mut list = HistoryList::default();
        let a = list.upsert(titled("A"), TourKind::Domestic, None, Utc::now());
        let quotation = Quotation::from_items(vec![], 1000.0);

        assert!(list.attach_quotation("A", &quotation));
        assert!(!list.attach_quotation("missing", &quotation));
        assert_eq!(list.records()[0].quotation.as_ref(), Some(&quotation));

        assert!(list.delete(a.id));
        assert!(!list.delete(a.id));
        assert!(list.records().is_empty());
    }

    // ── file backend ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_file_history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let store = JsonFileHistory::open(&path).await;
        let saved = store.upsert(titled("Kyoto 5D"), TourKind::International, None).await.unwrap();

        let reopened = JsonFileHistory::open(&path).await;
        let records = reopened.list_recent(10).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, saved.id);
        assert_eq!(reopened.get(saved.id).await.unwrap().kind, TourKind::International);
    }

    #[tokio::test]
    async fn test_corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let store = JsonFileHistory::open(&path).await;
        assert!(store.list_recent(50).await.is_empty());
        store.upsert(titled("Fresh"), TourKind::Domestic, None).await.unwrap();
        assert_eq!(JsonFileHistory::open(&path).await.list_recent(50).await.len(), 1);
    }

    #[tokio::test]
    async fn test_reads_records_with_legacy_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let id = Uuid::new_v4();
        let legacy = serde_json::json!([{
            "id": id,
            "timestamp": "2026-01-02T03:04:05Z",
            "type": "INTERNATIONAL",
            "plan": {
                "mainTitle": "Seoul 4D",
                "days": [{
                    "day": 1, "title": "Arrive", "description": "Myeongdong",
                    "imageUrl": "seoul", "imagePosition": "left", "imageCount": 2,
                    "customImages": ["data:image/png;base64,AAAA"]
                }]
            }
        }]);
        tokio::fs::write(&path, legacy.to_string()).await.unwrap();

        let record = JsonFileHistory::open(&path).await.get(id).await.unwrap();
        assert_eq!(record.kind, TourKind::International);
        assert_eq!(record.plan.days[0].images.len(), 1);
        assert_eq!(record.plan.days[0].image_keyword, "seoul");
    }

    #[tokio::test]
    async fn test_list_recent_limits_count() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileHistory::open(dir.path().join("h.json")).await;
        for i in 0..5 {
            store.upsert(titled(&format!("P{i}")), TourKind::Domestic, None).await.unwrap();
        }
        let recent = store.list_recent(3).await;
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].plan.main_title, "P4");
        assert!(store.delete(recent[0].id).await.unwrap());
        assert_eq!(store.list_recent(10).await.len(), 4);
    }
}
