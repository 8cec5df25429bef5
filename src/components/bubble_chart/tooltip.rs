//! Hover tooltip content and sparkline geometry.

use std::collections::HashMap;

use super::types::CollectionRecord;

/// Source of historical floor prices, keyed by collection name.
pub trait PriceHistory {
	/// Ordered series, oldest first. `None` when unknown.
	fn series(&self, name: &str) -> Option<&[f64]>;
}

/// In-memory price history loaded alongside the dataset.
#[derive(Clone, Debug, Default)]
pub struct StaticHistory {
	series: HashMap<String, Vec<f64>>,
}

impl StaticHistory {
	/// History from a name-to-series map.
	pub fn new(series: HashMap<String, Vec<f64>>) -> Self {
		Self { series }
	}
}

impl PriceHistory for StaticHistory {
	fn series(&self, name: &str) -> Option<&[f64]> {
		self.series.get(name).map(Vec::as_slice)
	}
}

/// Signed percentage as shown to users, e.g. `+6.9%`, `-10%`, `0%`.
pub fn format_change(change_pct: f64) -> String {
	let sign = if change_pct > 0.0 { "+" } else { "" };
	format!("{sign}{change_pct}%")
}

/// Tooltip text lines for a collection.
pub fn tooltip_lines(record: &CollectionRecord) -> Vec<String> {
	vec![
		record.name.clone(),
		format!("Floor: {} ETH", record.floor_price),
		format!("24h: {}", format_change(record.change_pct)),
	]
}

/// Project a series onto a `width` x `height` box, y growing downward.
///
/// Non-finite samples are skipped. Flat series are drawn along the middle.
/// Fewer than two usable samples yield no points.
pub fn sparkline_points(series: &[f64], width: f64, height: f64) -> Vec<(f64, f64)> {
	let values: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
	if values.len() < 2 {
		return Vec::new();
	}
	let (min, max) = values
		.iter()
		.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
	let span = max - min;
	let step = width / (values.len() - 1) as f64;

	values
		.iter()
		.enumerate()
		.map(|(i, &v)| {
			let t = if span > 0.0 { (v - min) / span } else { 0.5 };
			(i as f64 * step, height * (1.0 - t))
		})
		.collect()
}
