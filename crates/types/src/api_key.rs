//! API key holder for the optional `x-api-key` gate
//!
//! The key is zeroized when dropped and never printed by `Debug`,
//! `Display` or `Serialize`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ApiKey {
	inner: String,
}

impl ApiKey {
	pub fn new(key: impl Into<String>) -> Self {
		Self { inner: key.into() }
	}

	/// Expose the raw key. Only the auth layer should need this.
	pub fn expose(&self) -> &str {
		&self.inner
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	/// Compare a presented header value against the key in constant time
	pub fn matches(&self, presented: &str) -> bool {
		constant_time_eq(self.inner.as_bytes(), presented.as_bytes())
	}
}

impl fmt::Debug for ApiKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ApiKey").field("inner", &"[REDACTED]").finish()
	}
}

impl fmt::Display for ApiKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[REDACTED]")
	}
}

impl From<String> for ApiKey {
	fn from(key: String) -> Self {
		Self::new(key)
	}
}

impl From<&str> for ApiKey {
	fn from(key: &str) -> Self {
		Self::new(key)
	}
}

impl Serialize for ApiKey {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str("[REDACTED]")
	}
}

impl<'de> Deserialize<'de> for ApiKey {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(ApiKey::new)
	}
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	if a.len() != b.len() {
		return false;
	}

	let mut result = 0u8;
	for (x, y) in a.iter().zip(b.iter()) {
		result |= x ^ y;
	}
	result == 0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_matches_exact_key_only() {
		let key = ApiKey::from("k-123");
		assert!(key.matches("k-123"));
		assert!(!key.matches("k-124"));
		assert!(!key.matches("k-1234"));
		assert!(!key.matches(""));
	}

	#[test]
	fn test_key_is_redacted() {
		let key = ApiKey::from("super-secret");
		assert_eq!(format!("{}", key), "[REDACTED]");
		assert!(!format!("{:?}", key).contains("super-secret"));
		assert_eq!(serde_json::to_string(&key).unwrap(), "\"[REDACTED]\"");
	}

	#[test]
	fn test_deserialize_keeps_value() {
		let key: ApiKey = serde_json::from_str("\"from-config\"").unwrap();
		assert_eq!(key.expose(), "from-config");
	}
}
