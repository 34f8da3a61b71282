//! The structured record produced by the extraction stage.
//!
//! Screenshots are read by a vision model, so field types are unreliable:
//! counts arrive as `19200`, `"19,200"` or `null`, insights as a string or a
//! list. Every leaf field parses leniently and unparseable values become
//! absent rather than errors. Unknown keys are kept so the raw record can be
//! replayed to later stages without loss.

use crate::prompts::PromptValues;
use derive_getters::Getters;
use scaleplan_error::{WorkflowError, WorkflowErrorKind, WorkflowResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Brand identity block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandIdentity {
    /// Brand name as shown
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Product category
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Branding and positioning observations
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub visual_notes: Option<String>,
    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A competitor named in the screenshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    /// Competitor name
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Relationship to the brand, e.g. "Primary competitor"
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Pricing block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    /// Average final price of the top three SKUs
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub average_final_price: Option<Number>,
    /// Per-SKU entries and other fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Promotions block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Promotions {
    /// Number of active vouchers
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub vouchers_active: Option<Number>,
    /// Voucher descriptions
    #[serde(default, deserialize_with = "lenient::texts", skip_serializing_if = "Vec::is_empty")]
    pub voucher_examples: Vec<String>,
    /// Promotions other than vouchers
    #[serde(default, deserialize_with = "lenient::texts", skip_serializing_if = "Vec::is_empty")]
    pub non_voucher_promos: Vec<String>,
    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Content block; each platform names its video count differently.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Shopee video count
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub shopee_videos_count: Option<Number>,
    /// TikTok Shop video count
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub videos_published: Option<Number>,
    /// Lazada LazLook video count
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub lazlook_videos_count: Option<Number>,
    /// Live selling sessions
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub live_sessions_count: Option<Number>,
    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Content {
    /// The first video count present, whatever the platform calls it.
    pub fn videos(&self) -> Option<&Number> {
        self.shopee_videos_count
            .as_ref()
            .or(self.videos_published.as_ref())
            .or(self.lazlook_videos_count.as_ref())
    }
}

/// The featured brand's metrics on one platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandMetrics {
    /// Shop name
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    /// Follower count
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub followers: Option<Number>,
    /// Review count
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub reviews_count: Option<Number>,
    /// Average rating
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub avg_rating: Option<Number>,
    /// Shop badge, e.g. "Mall"
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub shop_badge: Option<String>,
    /// Video count reported at the top level (TikTok Shop)
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub videos_published: Option<Number>,
    /// Pricing
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    /// Promotions
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub promotions: Option<Promotions>,
    /// Content
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BrandMetrics {
    /// Video count from the content block, else the top-level count.
    pub fn videos(&self) -> Option<&Number> {
        self.content
            .as_ref()
            .and_then(Content::videos)
            .or(self.videos_published.as_ref())
    }
}

/// The main competitor's metrics on one platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitorMetrics {
    /// Competitor name
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub competitor_name: Option<String>,
    /// Follower count
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub followers: Option<Number>,
    /// Review count
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub reviews_count: Option<Number>,
    /// Average rating
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub avg_rating: Option<Number>,
    /// Pricing
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
    /// Number of active vouchers
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub vouchers_active: Option<Number>,
    /// Video count
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub videos_published: Option<Number>,
    /// Live selling sessions
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub live_sessions_count: Option<Number>,
    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Brand and competitor metrics for one platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformData {
    /// The featured brand
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub brand_metrics: Option<BrandMetrics>,
    /// The main competitor
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    pub competitor_metrics: Option<CompetitorMetrics>,
    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Data-quality markers reported by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    /// High, Medium or Low
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub completeness: Option<String>,
    /// What was not visible
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub missing_data_notes: Option<String>,
    /// High, Medium or Low
    #[serde(default, deserialize_with = "lenient::text", skip_serializing_if = "Option::is_none")]
    pub confidence_level: Option<String>,
    /// Fields not modeled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Normalized extraction result; the single source of truth for every later stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters)]
pub struct ExtractedRecord {
    /// Screenshot count, platforms identified, timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extraction_metadata: Option<Value>,
    /// Brand identity
    brand: BrandIdentity,
    /// Competitors in the order the extractor listed them
    #[serde(default, deserialize_with = "lenient::competitors", skip_serializing_if = "Vec::is_empty")]
    competitors: Vec<Competitor>,
    /// Metrics keyed by platform (`shopee`, `lazada`, `tiktok`, ...)
    #[serde(default, deserialize_with = "lenient::platforms")]
    platform_data: BTreeMap<String, PlatformData>,
    /// Comparative observations
    #[serde(default, deserialize_with = "lenient::texts", skip_serializing_if = "Vec::is_empty")]
    competitive_insights: Vec<String>,
    /// Data-quality markers
    #[serde(default, deserialize_with = "lenient::object", skip_serializing_if = "Option::is_none")]
    data_quality: Option<DataQuality>,
    /// Fields not modeled above
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Parses the extraction stage's raw completion.
///
/// # Errors
///
/// Returns [`WorkflowErrorKind::MalformedExtraction`] carrying `raw` when the
/// text is not a JSON object, or lacks a `brand` object or a `platform_data`
/// object.
pub fn parse_extraction(raw: &str) -> WorkflowResult<ExtractedRecord> {
    let malformed = |reason: String| {
        warn!(reason = %reason, raw_len = raw.len(), "Malformed extraction");
        WorkflowError::new(WorkflowErrorKind::MalformedExtraction {
            reason,
            raw: raw.to_string(),
        })
    };

    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| malformed(format!("response is not valid JSON: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| malformed("response is not a JSON object".to_string()))?;
    if !object.get("brand").is_some_and(Value::is_object) {
        return Err(malformed("missing brand identity object".to_string()));
    }
    if !object.get("platform_data").is_some_and(Value::is_object) {
        return Err(malformed("missing platform_data object".to_string()));
    }

    let record: ExtractedRecord =
        serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
    debug!(
        brand = record.brand.name.as_deref().unwrap_or("unknown"),
        platforms = ?record.platform_data.keys().collect::<Vec<_>>(),
        "Parsed extraction"
    );
    Ok(record)
}

impl ExtractedRecord {
    /// Accepts a record supplied by a client rather than by the extractor.
    ///
    /// Only a `brand` object is required; `platform_data` may be absent.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `value` is not an object or has no `brand` object.
    pub fn from_json(value: Value) -> WorkflowResult<Self> {
        let Some(object) = value.as_object() else {
            return Err(WorkflowError::validation("extractedData must be a JSON object"));
        };
        if !object.get("brand").is_some_and(Value::is_object) {
            return Err(WorkflowError::validation(
                "extractedData.brand is required",
            ));
        }
        serde_json::from_value(value)
            .map_err(|e| WorkflowError::validation(format!("invalid extractedData: {}", e)))
    }

    /// Requires a brand name, without which no plan can be titled.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming `extractedData.brand.name`.
    pub fn check_plan_ready(&self) -> WorkflowResult<()> {
        match self.brand.name.as_deref() {
            Some(name) if !name.trim().is_empty() => Ok(()),
            _ => Err(WorkflowError::validation(
                "extractedData.brand.name is required",
            )),
        }
    }

    /// Soft gaps worth reporting alongside a plan.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.brand.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            warnings.push("brand.name".to_string());
        }
        if self
            .brand
            .category
            .as_deref()
            .is_none_or(|c| c.trim().is_empty())
        {
            warnings.push("brand.category".to_string());
        }
        if self.platform_data.is_empty() {
            warnings.push("platform_data (none provided)".to_string());
        }
        warnings
    }

    /// The main comparison brand: the first listed competitor, else Shopee's competitor metrics.
    pub fn primary_competitor(&self) -> Option<&str> {
        self.competitors
            .first()
            .and_then(|c| c.name.as_deref())
            .or_else(|| {
                self.platform_data
                    .get("shopee")
                    .and_then(|p| p.competitor_metrics.as_ref())
                    .and_then(|c| c.competitor_name.as_deref())
            })
            .filter(|name| !name.trim().is_empty())
    }

    /// Placeholder values drawn from this record.
    pub fn prompt_values(&self) -> PromptValues {
        PromptValues::new(
            self.brand.name.clone(),
            self.brand.category.clone(),
            self.primary_competitor().map(str::to_string),
        )
    }

    /// The record as JSON, unknown fields included.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Lenient field parsers used by the record's serde attributes.
mod lenient {
    use super::*;

    /// Numbers, or numeric strings with thousands separators, currency signs or spaces.
    pub(super) fn number<'de, D>(deserializer: D) -> Result<Option<Number>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => Some(n),
            Value::String(s) => parse_number(&s),
            _ => None,
        })
    }

    pub(super) fn parse_number(text: &str) -> Option<Number> {
        let cleaned: String = text
            .chars()
            .filter(|c| !matches!(c, ',' | '₱' | '$' | ' ' | '\u{a0}'))
            .collect();
        if cleaned.is_empty() {
            return None;
        }
        if let Ok(n) = cleaned.parse::<u64>() {
            return Some(Number::from(n));
        }
        if let Ok(n) = cleaned.parse::<i64>() {
            return Some(Number::from(n));
        }
        cleaned.parse::<f64>().ok().and_then(Number::from_f64)
    }

    /// Strings kept as-is; numbers and booleans stringified; empty strings absent.
    pub(super) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(as_text(Value::deserialize(deserializer)?))
    }

    fn as_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// A single string or a list of them.
    pub(super) fn texts<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items.into_iter().filter_map(as_text).collect(),
            other => as_text(other).into_iter().collect(),
        })
    }

    /// Nested blocks; anything but an object is absent.
    pub(super) fn object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match Value::deserialize(deserializer)? {
            value @ Value::Object(_) => serde_json::from_value(value)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }

    /// Competitor objects, bare names, or a single competitor.
    pub(super) fn competitors<'de, D>(deserializer: D) -> Result<Vec<Competitor>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = match Value::deserialize(deserializer)? {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            single => vec![single],
        };
        items
            .into_iter()
            .filter_map(|item| match item {
                value @ Value::Object(_) => Some(
                    serde_json::from_value::<Competitor>(value).map_err(serde::de::Error::custom),
                ),
                other => as_text(other).map(|name| {
                    Ok(Competitor {
                        name: Some(name),
                        ..Competitor::default()
                    })
                }),
            })
            .collect()
    }

    /// Platform map; platforms whose value is not an object are dropped.
    pub(super) fn platforms<'de, D>(
        deserializer: D,
    ) -> Result<BTreeMap<String, PlatformData>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Value::Object(entries) = Value::deserialize(deserializer)? else {
            return Ok(BTreeMap::new());
        };
        entries
            .into_iter()
            .filter(|(_, value)| value.is_object())
            .map(|(key, value)| {
                serde_json::from_value::<PlatformData>(value)
                    .map(|data| (key, data))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}
