//! Trend aggregation
//!
//! Groups a time-ordered record sequence into calendar buckets, averages each
//! bucket and fits a least-squares line through the bucket averages.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde_json::Value;
use vitals_types::{
	AggregationError, GroupBy, MetricRecord, MetricValue, TrendPoint, TrendStats, TrendSummary,
};

/// Bucket key for a timestamp: `YYYY-MM-DD`, `YYYY-Www` or `YYYY-MM`.
///
/// Week keys use the ISO week-numbering year so that late-December days
/// belonging to week 1 land in the following year's bucket.
pub fn bucket_key(ts: &DateTime<Utc>, group_by: GroupBy) -> String {
	match group_by {
		GroupBy::Day => ts.format("%Y-%m-%d").to_string(),
		GroupBy::Week => {
			let week = ts.iso_week();
			format!("{}-W{:02}", week.year(), week.week())
		},
		GroupBy::Month => ts.format("%Y-%m").to_string(),
	}
}

/// Numeric value of a record for aggregation
pub fn extract_value(
	record: &MetricRecord,
	metric_field: Option<&str>,
) -> Result<f64, AggregationError> {
	let non_numeric = || AggregationError::NonNumericValue {
		record_id: record.id.clone(),
	};

	match (&record.value, metric_field) {
		(MetricValue::Number(n), _) => Ok(*n),
		(MetricValue::Structured(map), Some(field)) if !map.is_empty() => match map.get(field) {
			None | Some(Value::Null) => Err(AggregationError::MissingField {
				field: field.to_string(),
				record_id: record.id.clone(),
			}),
			Some(Value::Number(n)) => n.as_f64().ok_or_else(non_numeric),
			Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| non_numeric()),
			Some(_) => Err(non_numeric()),
		},
		(MetricValue::Text(s), _) => s.trim().parse::<f64>().map_err(|_| non_numeric()),
		(MetricValue::Structured(_), _) => Err(non_numeric()),
	}
}

/// Ordinary least-squares slope of `ys` against their index
pub fn ols_slope(ys: &[f64]) -> f64 {
	let n = ys.len();
	if n < 2 {
		return 0.0;
	}

	let n_f = n as f64;
	let x_mean = (n_f - 1.0) / 2.0;
	let y_mean = ys.iter().sum::<f64>() / n_f;

	let mut numerator = 0.0;
	let mut denominator = 0.0;
	for (i, y) in ys.iter().enumerate() {
		let dx = i as f64 - x_mean;
		numerator += dx * (y - y_mean);
		denominator += dx * dx;
	}

	if denominator == 0.0 {
		0.0
	} else {
		numerator / denominator
	}
}

/// Aggregate records into a trend summary. The first record whose value
/// cannot be extracted aborts the whole computation.
pub fn summarize(
	records: &[MetricRecord],
	metric_field: Option<&str>,
	group_by: GroupBy,
) -> Result<TrendSummary, AggregationError> {
	if records.is_empty() {
		return Ok(TrendSummary::empty());
	}

	let mut buckets: BTreeMap<String, (f64, usize)> = BTreeMap::new();
	for record in records {
		let value = extract_value(record, metric_field)?;
		let bucket = buckets
			.entry(bucket_key(&record.recorded_at, group_by))
			.or_insert((0.0, 0));
		bucket.0 += value;
		bucket.1 += 1;
	}

	let points: Vec<TrendPoint> = buckets
		.into_iter()
		.map(|(time_bucket, (total, count))| TrendPoint {
			time_bucket,
			average: total / count as f64,
			count,
		})
		.collect();
	let averages: Vec<f64> = points.iter().map(|p| p.average).collect();

	Ok(TrendSummary {
		stats: TrendStats {
			slope: ols_slope(&averages),
			count: records.len(),
		},
		points,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use serde_json::json;
	use vitals_types::NewMetric;

	fn record_at(value: MetricValue, y: i32, m: u32, d: u32, h: u32) -> MetricRecord {
		MetricRecord::new(NewMetric {
			user_id: "u1".into(),
			type_code: "body/weight".into(),
			value,
			unit: None,
			recorded_at: Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(),
			source: "test".into(),
			metadata: None,
			tags: None,
		})
	}

	#[test]
	fn test_bucket_keys() {
		let ts = Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap();
		assert_eq!(bucket_key(&ts, GroupBy::Day), "2024-03-05");
		assert_eq!(bucket_key(&ts, GroupBy::Week), "2024-W10");
		assert_eq!(bucket_key(&ts, GroupBy::Month), "2024-03");

		// 2024-12-30 is in ISO week 1 of 2025
		let year_end = Utc.with_ymd_and_hms(2024, 12, 30, 0, 0, 0).unwrap();
		assert_eq!(bucket_key(&year_end, GroupBy::Week), "2025-W01");
	}

	#[test]
	fn test_day_bucket_average() {
		let records = vec![
			record_at(MetricValue::Number(70.0), 2024, 3, 1, 8),
			record_at(MetricValue::Number(72.0), 2024, 3, 1, 20),
		];
		let summary = summarize(&records, None, GroupBy::Day).unwrap();
		assert_eq!(
			summary.points,
			vec![TrendPoint {
				time_bucket: "2024-03-01".into(),
				average: 71.0,
				count: 2
			}]
		);
		assert_eq!(summary.stats.slope, 0.0);
		assert_eq!(summary.stats.count, 2);
	}

	#[test]
	fn test_slope_over_buckets() {
		let records = vec![
			record_at(MetricValue::Number(1.0), 2024, 3, 1, 8),
			record_at(MetricValue::Number(2.0), 2024, 3, 2, 8),
			record_at(MetricValue::Number(3.0), 2024, 3, 3, 8),
		];
		let summary = summarize(&records, None, GroupBy::Day).unwrap();
		assert!((summary.stats.slope - 1.0).abs() < 1e-9);

		let flat = vec![
			record_at(MetricValue::Number(5.0), 2024, 3, 1, 8),
			record_at(MetricValue::Number(5.0), 2024, 3, 2, 8),
		];
		assert_eq!(summarize(&flat, None, GroupBy::Day).unwrap().stats.slope, 0.0);
	}

	#[test]
	fn test_ols_slope_degenerate_inputs() {
		assert_eq!(ols_slope(&[]), 0.0);
		assert_eq!(ols_slope(&[3.0]), 0.0);
		assert!((ols_slope(&[2.0, 0.0]) + 2.0).abs() < 1e-9);
	}

	#[test]
	fn test_empty_input_yields_empty_summary() {
		assert_eq!(
			summarize(&[], None, GroupBy::Week).unwrap(),
			TrendSummary::empty()
		);
	}

	#[test]
	fn test_extraction_priority() {
		let structured = record_at(
			MetricValue::Structured(json!({"distance_km": 5.2}).as_object().cloned().unwrap()),
			2024,
			3,
			1,
			8,
		);
		assert_eq!(extract_value(&structured, Some("distance_km")).unwrap(), 5.2);
		assert!(matches!(
			extract_value(&structured, Some("pace")),
			Err(AggregationError::MissingField { .. })
		));
		assert!(matches!(
			extract_value(&structured, None),
			Err(AggregationError::NonNumericValue { .. })
		));

		let text = record_at(MetricValue::Text(" 5.4 ".into()), 2024, 3, 1, 8);
		assert_eq!(extract_value(&text, None).unwrap(), 5.4);

		let prose = record_at(MetricValue::Text("high".into()), 2024, 3, 1, 8);
		assert!(matches!(
			extract_value(&prose, None),
			Err(AggregationError::NonNumericValue { .. })
		));
	}

	#[test]
	fn test_empty_structured_value_is_non_numeric() {
		let empty = record_at(MetricValue::Structured(Default::default()), 2024, 3, 1, 8);
		assert!(matches!(
			extract_value(&empty, Some("distance_km")),
			Err(AggregationError::NonNumericValue { .. })
		));
	}

	#[test]
	fn test_first_failure_aborts() {
		let records = vec![
			record_at(MetricValue::Number(1.0), 2024, 3, 1, 8),
			record_at(MetricValue::Text("n/a".into()), 2024, 3, 2, 8),
		];
		assert!(summarize(&records, None, GroupBy::Day).is_err());
	}
}
