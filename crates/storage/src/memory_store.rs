//! In-memory storage implementation using DashMap
//!
//! Records are never removed. A secondary index maps
//! `(user_id, dedup_fingerprint)` to the id of the single live record holding
//! that fingerprint; both insert and soft-delete go through the index entry
//! lock first, then touch the record map.

use crate::traits::{MetricStorage, Storage, StorageError, StorageResult, StorageStats};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};
use vitals_types::{MetricQuery, MetricRecord, SortOrder};

type LiveKey = (String, String);

/// In-memory storage for metric records
#[derive(Clone, Default)]
pub struct MemoryStore {
	records: Arc<DashMap<String, MetricRecord>>,
	live_index: Arc<DashMap<LiveKey, String>>,
}

impl MemoryStore {
	/// Create a new memory store instance
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of records held, deleted ones included
	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	fn live_key(user_id: &str, fingerprint: &str) -> LiveKey {
		(user_id.to_string(), fingerprint.to_string())
	}

	fn collect_live<F>(&self, predicate: F) -> Vec<MetricRecord>
	where
		F: Fn(&MetricRecord) -> bool,
	{
		self.records
			.iter()
			.filter_map(|entry| {
				let record = entry.value();
				if record.is_live() && predicate(record) {
					Some(record.clone())
				} else {
					None
				}
			})
			.collect()
	}
}

#[async_trait]
impl MetricStorage for MemoryStore {
	async fn insert_metric(&self, record: MetricRecord) -> StorageResult<MetricRecord> {
		let key = Self::live_key(&record.user_id, &record.dedup_fingerprint);

		match self.live_index.entry(key) {
			Entry::Occupied(_) => Err(StorageError::Conflict {
				user_id: record.user_id,
				fingerprint: record.dedup_fingerprint,
			}),
			Entry::Vacant(slot) => {
				self.records.insert(record.id.clone(), record.clone());
				slot.insert(record.id.clone());
				info!(
					"Stored metric {} ({}) for user {}",
					record.id, record.type_code, record.user_id
				);
				Ok(record)
			},
		}
	}

	async fn find_live_by_fingerprint(
		&self,
		user_id: &str,
		fingerprint: &str,
	) -> StorageResult<Option<MetricRecord>> {
		let record_id = match self.live_index.get(&Self::live_key(user_id, fingerprint)) {
			Some(entry) => entry.value().clone(),
			None => return Ok(None),
		};

		Ok(self
			.records
			.get(&record_id)
			.filter(|record| record.is_live())
			.map(|record| record.clone()))
	}

	async fn get_metric(&self, record_id: &str) -> StorageResult<Option<MetricRecord>> {
		Ok(self.records.get(record_id).map(|record| record.clone()))
	}

	async fn query_metrics(&self, query: &MetricQuery) -> StorageResult<Vec<MetricRecord>> {
		let mut records = self.collect_live(|record| query.matches(record));

		match query.order {
			SortOrder::Asc => records.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at)),
			SortOrder::Desc => records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at)),
		}
		records.truncate(query.limit);

		Ok(records)
	}

	async fn soft_delete_metric(&self, user_id: &str, record_id: &str) -> StorageResult<bool> {
		let fingerprint = match self.records.get(record_id) {
			Some(record) if record.user_id == user_id && record.is_live() => {
				record.dedup_fingerprint.clone()
			},
			_ => return Ok(false),
		};

		match self.live_index.entry(Self::live_key(user_id, &fingerprint)) {
			Entry::Occupied(slot) if slot.get() == record_id => {
				let flipped = self
					.records
					.get_mut(record_id)
					.map(|mut record| record.mark_deleted())
					.unwrap_or(false);
				slot.remove();
				if flipped {
					debug!("Soft-deleted metric {} for user {}", record_id, user_id);
				}
				Ok(flipped)
			},
			// Lost a race with a concurrent delete of the same record
			_ => Ok(false),
		}
	}

	async fn list_for_trend(
		&self,
		user_id: &str,
		type_code: &str,
		since: Option<DateTime<Utc>>,
	) -> StorageResult<Vec<MetricRecord>> {
		let mut records = self.collect_live(|record| {
			record.user_id == user_id
				&& record.type_code == type_code
				&& since.map_or(true, |start| record.recorded_at >= start)
		});
		records.sort_by(|a, b| a.recorded_at.cmp(&b.recorded_at));
		Ok(records)
	}
}

#[async_trait]
impl Storage for MemoryStore {
	async fn health_check(&self) -> StorageResult<bool> {
		// For in-memory storage, just check if the maps are accessible
		Ok(true)
	}

	async fn stats(&self) -> StorageResult<StorageStats> {
		let mut stats = StorageStats::default();
		let mut users = HashSet::new();
		let mut live_by_type: BTreeMap<String, usize> = BTreeMap::new();

		for entry in self.records.iter() {
			let record = entry.value();
			stats.total_records += 1;
			users.insert(record.user_id.clone());
			if record.is_live() {
				stats.live_records += 1;
				*live_by_type.entry(record.type_code.clone()).or_default() += 1;
			}
		}

		stats.distinct_users = users.len();
		stats.live_by_type = live_by_type;
		Ok(stats)
	}

	async fn close(&self) -> StorageResult<()> {
		// For memory store, there's nothing to close
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::{Duration, TimeZone};
	use vitals_types::{MetricValue, NewMetric};

	fn record(user: &str, type_code: &str, value: f64, minutes: i64) -> MetricRecord {
		MetricRecord::new(NewMetric {
			user_id: user.to_string(),
			type_code: type_code.to_string(),
			value: MetricValue::Number(value),
			unit: None,
			recorded_at: Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
				+ Duration::minutes(minutes),
			source: "scale".to_string(),
			metadata: None,
			tags: None,
		})
	}

	#[tokio::test]
	async fn test_insert_conflicts_on_live_fingerprint() {
		let store = MemoryStore::new();
		let first = store
			.insert_metric(record("u1", "body/weight", 70.0, 0))
			.await
			.unwrap();

		let duplicate = record("u1", "body/weight", 70.0, 0);
		assert_ne!(duplicate.id, first.id);
		let result = store.insert_metric(duplicate).await;
		assert!(matches!(result, Err(StorageError::Conflict { .. })));

		let found = store
			.find_live_by_fingerprint("u1", &first.dedup_fingerprint)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(found.id, first.id);
		assert_eq!(store.len(), 1);
	}

	#[tokio::test]
	async fn test_same_fingerprint_for_other_user_is_independent() {
		let store = MemoryStore::new();
		store
			.insert_metric(record("u1", "body/weight", 70.0, 0))
			.await
			.unwrap();
		store
			.insert_metric(record("u2", "body/weight", 70.0, 0))
			.await
			.unwrap();
		assert_eq!(store.len(), 2);
	}

	#[tokio::test]
	async fn test_soft_delete_frees_fingerprint() {
		let store = MemoryStore::new();
		let first = store
			.insert_metric(record("u1", "body/weight", 70.0, 0))
			.await
			.unwrap();

		assert!(!store.soft_delete_metric("u2", &first.id).await.unwrap());
		assert!(store.soft_delete_metric("u1", &first.id).await.unwrap());
		assert!(!store.soft_delete_metric("u1", &first.id).await.unwrap());
		assert!(!store.soft_delete_metric("u1", "missing").await.unwrap());

		let kept = store.get_metric(&first.id).await.unwrap().unwrap();
		assert!(kept.deleted);
		assert!(store
			.find_live_by_fingerprint("u1", &first.dedup_fingerprint)
			.await
			.unwrap()
			.is_none());

		let second = store
			.insert_metric(record("u1", "body/weight", 70.0, 0))
			.await
			.unwrap();
		assert_ne!(second.id, first.id);
	}

	#[tokio::test]
	async fn test_query_filters_sorts_and_limits() {
		let store = MemoryStore::new();
		for (i, value) in [70.0, 70.5, 71.0, 71.5].iter().enumerate() {
			store
				.insert_metric(record("u1", "body/weight", *value, i as i64 * 60))
				.await
				.unwrap();
		}
		store
			.insert_metric(record("u1", "medical/uric_acid", 300.0, 0))
			.await
			.unwrap();
		store
			.insert_metric(record("u2", "body/weight", 90.0, 0))
			.await
			.unwrap();

		let mut query = MetricQuery::for_user("u1");
		query.type_code = Some("body/weight".into());
		let desc = store.query_metrics(&query).await.unwrap();
		assert_eq!(desc.len(), 4);
		assert_eq!(desc[0].value, MetricValue::Number(71.5));

		query.order = SortOrder::Asc;
		query.limit = 2;
		let asc = store.query_metrics(&query).await.unwrap();
		assert_eq!(asc.len(), 2);
		assert_eq!(asc[0].value, MetricValue::Number(70.0));

		query.limit = 20;
		query.start_time = Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());
		query.end_time = Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
		let window = store.query_metrics(&query).await.unwrap();
		assert_eq!(window.len(), 2);

		query.source = Some("manual".into());
		assert!(store.query_metrics(&query).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_list_for_trend_is_ascending_and_live_only() {
		let store = MemoryStore::new();
		let late = store
			.insert_metric(record("u1", "body/weight", 72.0, 120))
			.await
			.unwrap();
		store
			.insert_metric(record("u1", "body/weight", 70.0, 0))
			.await
			.unwrap();
		let dropped = store
			.insert_metric(record("u1", "body/weight", 99.0, 60))
			.await
			.unwrap();
		store.soft_delete_metric("u1", &dropped.id).await.unwrap();

		let records = store.list_for_trend("u1", "body/weight", None).await.unwrap();
		assert_eq!(records.len(), 2);
		assert_eq!(records[1].id, late.id);

		let since = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
		let recent = store
			.list_for_trend("u1", "body/weight", Some(since))
			.await
			.unwrap();
		assert_eq!(recent.len(), 1);
	}

	#[tokio::test]
	async fn test_concurrent_duplicate_inserts_keep_one_live_record() {
		let store = MemoryStore::new();
		let mut handles = Vec::new();
		for _ in 0..16 {
			let store = store.clone();
			handles.push(tokio::spawn(async move {
				store
					.insert_metric(record("u1", "body/weight", 70.0, 0))
					.await
					.is_ok()
			}));
		}

		let mut inserted = 0;
		for handle in handles {
			if handle.await.unwrap() {
				inserted += 1;
			}
		}
		assert_eq!(inserted, 1);
		assert_eq!(store.stats().await.unwrap().live_records, 1);
	}

	#[tokio::test]
	async fn test_stats_counts() {
		let store = MemoryStore::new();
		let a = store
			.insert_metric(record("u1", "body/weight", 70.0, 0))
			.await
			.unwrap();
		store
			.insert_metric(record("u2", "medical/uric_acid", 300.0, 0))
			.await
			.unwrap();
		store.soft_delete_metric("u1", &a.id).await.unwrap();

		let stats = store.stats().await.unwrap();
		assert_eq!(stats.total_records, 2);
		assert_eq!(stats.live_records, 1);
		assert_eq!(stats.distinct_users, 2);
		assert_eq!(stats.live_by_type.get("medical/uric_acid"), Some(&1));
		assert!(stats.live_by_type.get("body/weight").is_none());
		assert!(store.health_check().await.unwrap());
	}
}
