//! Physics-driven bubble chart for collection price changes.
//!
//! Renders one bubble per collection on an HTML canvas with:
//! - Bubble area following the magnitude of the price change
//! - Green / red / slate gradients by sign of the change
//! - Collision-free force layout kept inside the visible surface
//! - Press-and-hold or move-to-drag, tap to open the collection page
//! - Hover tooltip with an optional price sparkline
//!
//! # Example
//!
//! ```ignore
//! use bubble_chart::{BubbleChartCanvas, CollectionRecord};
//!
//! let data = vec![
//!     CollectionRecord { name: "Pudgy Penguins".into(), floor_price: 4.84, change_pct: 6.9, ..Default::default() },
//!     CollectionRecord { name: "Azuki".into(), floor_price: 1.72, change_pct: -2.4, ..Default::default() },
//! ];
//!
//! view! { <BubbleChartCanvas data=Signal::derive(move || data.clone()) /> }
//! ```

mod component;
pub mod drag;
mod render;
pub mod scale;
pub mod simulation;
pub mod state;
pub mod theme;
pub mod tooltip;
mod types;
pub mod viewport;

pub use component::BubbleChartCanvas;
pub use scale::RadiusScale;
pub use state::{ChartConfig, ChartState, NodeStore};
pub use theme::Theme;
pub use tooltip::{PriceHistory, StaticHistory};
pub use types::{BubbleFrame, CollectionRecord};
