//! bubble-chart: Interactive physics-driven bubble chart for NFT collections.
//!
//! This crate provides a WASM-based canvas component that shows each collection
//! as a bubble sized by its price change, with a collision-free force layout,
//! drag-to-pin interaction and hover tooltips.

use std::collections::HashMap;

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::bubble_chart::{
	BubbleChartCanvas, BubbleFrame, ChartConfig, CollectionRecord, PriceHistory, StaticHistory,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("bubble-chart: logging initialized");
}

/// Text of the `<script>` element with the given id.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load collections from a script element with id="collections-data".
/// Expected format: JSON array of `{ name, floorPrice, changePct, imageUrl?, externalLink? }`
fn load_collections() -> Option<Vec<CollectionRecord>> {
	let json_text = script_text("collections-data")?;

	match serde_json::from_str::<Vec<CollectionRecord>>(&json_text) {
		Ok(records) => {
			info!("bubble-chart: loaded {} collections", records.len());
			Some(records)
		}
		Err(e) => {
			warn!("bubble-chart: failed to parse collections: {}", e);
			None
		}
	}
}

/// Load price history from a script element with id="collections-history".
/// Expected format: JSON object mapping collection name to a series, oldest first.
fn load_history() -> Option<StaticHistory> {
	let json_text = script_text("collections-history")?;

	match serde_json::from_str::<HashMap<String, Vec<f64>>>(&json_text) {
		Ok(series) => {
			info!("bubble-chart: loaded history for {} collections", series.len());
			Some(StaticHistory::new(series))
		}
		Err(e) => {
			warn!("bubble-chart: failed to parse history: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads collections from the DOM and renders the bubble chart.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let records = load_collections().unwrap_or_default();
	let history = load_history().unwrap_or_default();
	let data = Signal::derive(move || records.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="NFT Collection Bubbles" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="bubble-chart">
			<div class="chart-header">
				<h1>"Collections"</h1>
				<p class="subtitle">"Bubble size follows the 24h change. Hold or drag to move, tap to open."</p>
			</div>
			<BubbleChartCanvas data=data history=history />
		</div>
	}
}
