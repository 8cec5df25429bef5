//! Input and output records exchanged with the host page.

use serde::{Deserialize, Deserializer, Serialize};

/// One tracked collection as supplied by the data provider.
///
/// Field names follow the canonical camelCase form; the aliases accept the
/// payload shape served by the collections API (`floorEth`, `change24hPct`,
/// `image`, `link`).
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRecord {
	/// Display name shown inside the bubble.
	pub name: String,
	/// Floor price in ETH.
	#[serde(default, alias = "floorEth", deserialize_with = "lenient_number")]
	pub floor_price: f64,
	/// Percentage change over the selected period. Any sign.
	#[serde(default, alias = "change24hPct", deserialize_with = "lenient_number")]
	pub change_pct: f64,
	/// Optional avatar image.
	#[serde(default, alias = "image")]
	pub image_url: Option<String>,
	/// Optional page opened when the bubble is tapped.
	#[serde(default, alias = "link")]
	pub external_link: Option<String>,
}

impl CollectionRecord {
	/// Absolute change, with non-finite values collapsed to zero.
	pub fn magnitude(&self) -> f64 {
		if self.change_pct.is_finite() {
			self.change_pct.abs()
		} else {
			0.0
		}
	}
}

/// Published per-node state, ready for projection to screen coordinates.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BubbleFrame {
	/// Display name.
	pub name: String,
	/// Floor price in ETH.
	pub floor_price: f64,
	/// Percentage change.
	pub change_pct: f64,
	/// Avatar image.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub image_url: Option<String>,
	/// Collection page.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub external_link: Option<String>,
	/// Center x, in surface pixels.
	pub x: f64,
	/// Center y, in surface pixels.
	pub y: f64,
	/// Radius, in pixels.
	pub radius: f64,
}

/// Accepts numbers, numeric strings and null. Anything unparseable becomes 0.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
	D: Deserializer<'de>,
{
	let value = serde_json::Value::deserialize(deserializer)?;
	let parsed = match value {
		serde_json::Value::Number(n) => n.as_f64(),
		serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
		_ => None,
	};
	Ok(parsed.filter(|v| v.is_finite()).unwrap_or(0.0))
}
