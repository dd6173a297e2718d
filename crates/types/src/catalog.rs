//! Compiled-in catalog of supported metric types
//!
//! The catalog is read-only at runtime. Unknown type codes are still
//! accepted at ingestion; the catalog only supplies display metadata and a
//! default unit.

use serde::Serialize;
#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Shape a metric type's value is expected to take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ValueSchema {
	Number,
	Text,
	Object,
}

/// Catalog entry describing a metric type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MetricType {
	pub type_code: &'static str,
	pub name: &'static str,
	pub unit: Option<&'static str>,
	pub description: &'static str,
	pub value_schema: ValueSchema,
}

static CATALOG: &[MetricType] = &[
	MetricType {
		type_code: "body/weight",
		name: "Body weight",
		unit: Some("kg"),
		description: "Body weight",
		value_schema: ValueSchema::Number,
	},
	MetricType {
		type_code: "body/body_fat_rate",
		name: "Body fat rate",
		unit: Some("%"),
		description: "Body fat percentage",
		value_schema: ValueSchema::Number,
	},
	MetricType {
		type_code: "medical/blood_glucose",
		name: "Fasting blood glucose",
		unit: Some("mmol/L"),
		description: "Fasting blood glucose",
		value_schema: ValueSchema::Number,
	},
	MetricType {
		type_code: "medical/uric_acid",
		name: "Uric acid",
		unit: Some("umol/L"),
		description: "Serum uric acid",
		value_schema: ValueSchema::Number,
	},
	MetricType {
		type_code: "medical/creatinine",
		name: "Creatinine",
		unit: Some("umol/L"),
		description: "Serum creatinine",
		value_schema: ValueSchema::Number,
	},
	MetricType {
		type_code: "sport/running_session",
		name: "Running session",
		unit: None,
		description: "A single running workout",
		value_schema: ValueSchema::Object,
	},
];

/// All catalog entries, in declaration order
pub fn list_metric_types() -> &'static [MetricType] {
	CATALOG
}

/// Look up a catalog entry by type code
pub fn get_metric_type(type_code: &str) -> Option<&'static MetricType> {
	CATALOG.iter().find(|entry| entry.type_code == type_code)
}

/// Default unit for a type code, if the catalog knows one
pub fn default_unit(type_code: &str) -> Option<&'static str> {
	get_metric_type(type_code).and_then(|entry| entry.unit)
}
