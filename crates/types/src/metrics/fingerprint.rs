//! Deduplication fingerprint
//!
//! SHA-256 over a canonical JSON document. Object keys are sorted at every
//! depth before serializing, so caller-supplied key order never changes the
//! digest.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};

use super::MetricValue;

/// Hex-encoded fingerprint of the identity fields of an ingestion payload
pub fn compute_fingerprint(
	user_id: &str,
	type_code: &str,
	recorded_at: &DateTime<Utc>,
	value: &MetricValue,
	metadata: Option<&Map<String, Value>>,
) -> String {
	let canonical = json!({
		"user_id": user_id,
		"type": type_code,
		"recorded_at": recorded_at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
		"value": value,
		"metadata": metadata.cloned().unwrap_or_default(),
	});

	let mut hasher = Sha256::new();
	hasher.update(canonicalize(canonical).to_string().as_bytes());
	hex::encode(hasher.finalize())
}

fn canonicalize(value: Value) -> Value {
	match value {
		Value::Object(map) => {
			let mut entries: Vec<(String, Value)> = map.into_iter().collect();
			entries.sort_by(|a, b| a.0.cmp(&b.0));
			Value::Object(
				entries
					.into_iter()
					.map(|(key, value)| (key, canonicalize(value)))
					.collect(),
			)
		},
		Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
		other => other,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	fn at() -> DateTime<Utc> {
		Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
	}

	fn map(value: Value) -> Map<String, Value> {
		value.as_object().cloned().unwrap()
	}

	#[test]
	fn test_metadata_key_order_is_irrelevant() {
		let a = map(serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap());
		let b = map(serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap());
		let value = MetricValue::Number(70.5);

		assert_eq!(
			compute_fingerprint("u1", "body/weight", &at(), &value, Some(&a)),
			compute_fingerprint("u1", "body/weight", &at(), &value, Some(&b)),
		);
	}

	#[test]
	fn test_missing_metadata_equals_empty_metadata() {
		let value = MetricValue::Number(1.0);
		let empty = Map::new();
		assert_eq!(
			compute_fingerprint("u1", "t", &at(), &value, None),
			compute_fingerprint("u1", "t", &at(), &value, Some(&empty)),
		);
	}

	#[test]
	fn test_identity_fields_change_fingerprint() {
		let value = MetricValue::Number(1.0);
		let base = compute_fingerprint("u1", "t", &at(), &value, None);

		assert_ne!(base, compute_fingerprint("u2", "t", &at(), &value, None));
		assert_ne!(base, compute_fingerprint("u1", "t2", &at(), &value, None));
		assert_ne!(
			base,
			compute_fingerprint("u1", "t", &(at() + chrono::Duration::seconds(1)), &value, None)
		);
		assert_ne!(
			base,
			compute_fingerprint("u1", "t", &at(), &MetricValue::Number(2.0), None)
		);
	}

	#[test]
	fn test_fingerprint_is_hex_sha256() {
		let fp = compute_fingerprint("u1", "t", &at(), &MetricValue::Text("x".into()), None);
		assert_eq!(fp.len(), 64);
		assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
	}
}
