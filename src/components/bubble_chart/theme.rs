//! Visual theming for the bubble chart.
//!
//! Bubble colors encode the sign of a collection's change: green for gains,
//! red for losses, slate for flat.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Opacity, 0.0 to 1.0.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with explicit opacity.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color at a different opacity.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// CSS color string: hex when opaque, `rgba(...)` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Direction of a collection's price change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trend {
	/// Positive change.
	Up,
	/// Negative change.
	Down,
	/// No change.
	Flat,
}

impl Trend {
	/// Classify a change. NaN counts as flat.
	pub fn of(change_pct: f64) -> Self {
		if change_pct > 0.0 {
			Trend::Up
		} else if change_pct < 0.0 {
			Trend::Down
		} else {
			Trend::Flat
		}
	}
}

/// Fill and label colors for one trend.
#[derive(Clone, Debug)]
pub struct TrendStyle {
	/// Gradient start (top-left).
	pub from: Color,
	/// Gradient end (bottom-right).
	pub to: Color,
	/// Color of the percentage label.
	pub label: Color,
}

/// Surface and bubble decoration.
#[derive(Clone, Debug)]
pub struct SurfaceStyle {
	/// Fill behind the bubbles.
	pub background: Color,
	/// Corner radius of the surface, in pixels.
	pub corner_radius: f64,
	/// Drop shadow under each bubble.
	pub shadow: Color,
	/// Blur of the drop shadow, in pixels.
	pub shadow_blur: f64,
	/// Vertical offset of the drop shadow, in pixels.
	pub shadow_offset_y: f64,
	/// Thin inner ring around each bubble.
	pub rim: Color,
	/// Label color.
	pub text: Color,
	/// Shadow behind labels.
	pub text_shadow: Color,
}

/// Tooltip panel style.
#[derive(Clone, Debug)]
pub struct TooltipStyle {
	/// Panel fill.
	pub background: Color,
	/// Panel outline.
	pub border: Color,
	/// Text color.
	pub text: Color,
	/// CSS font shorthand for every line.
	pub font: &'static str,
	/// Inner padding, in pixels.
	pub padding: f64,
	/// Distance between text baselines, in pixels.
	pub line_height: f64,
	/// Height of the sparkline box, in pixels.
	pub sparkline_height: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Bubbles with a positive change.
	pub up: TrendStyle,
	/// Bubbles with a negative change.
	pub down: TrendStyle,
	/// Bubbles with no change.
	pub flat: TrendStyle,
	/// Surface and bubble decoration.
	pub surface: SurfaceStyle,
	/// Hover tooltip.
	pub tooltip: TooltipStyle,
	/// Hover ring color.
	pub ring: Color,
}

impl Theme {
	/// Dark surface with green/red gradient bubbles (default)
	pub fn default_theme() -> Self {
		Self {
			up: TrendStyle {
				from: Color::rgb(11, 214, 94),
				to: Color::rgb(46, 229, 139),
				label: Color::rgb(201, 255, 216),
			},
			down: TrendStyle {
				from: Color::rgb(255, 77, 77),
				to: Color::rgb(255, 116, 116),
				label: Color::rgb(255, 224, 224),
			},
			flat: TrendStyle {
				from: Color::rgb(68, 68, 85),
				to: Color::rgb(102, 102, 119),
				label: Color::rgb(223, 227, 234),
			},
			surface: SurfaceStyle {
				background: Color::rgb(15, 17, 21),
				corner_radius: 20.0,
				shadow: Color::rgba(0, 0, 0, 0.45),
				shadow_blur: 40.0,
				shadow_offset_y: 12.0,
				rim: Color::rgba(255, 255, 255, 0.25),
				text: Color::rgb(255, 255, 255),
				text_shadow: Color::rgba(0, 0, 0, 0.45),
			},
			tooltip: TooltipStyle {
				background: Color::rgba(20, 23, 29, 0.94),
				border: Color::rgba(255, 255, 255, 0.08),
				text: Color::rgb(230, 233, 239),
				font: "12px sans-serif",
				padding: 8.0,
				line_height: 16.0,
				sparkline_height: 28.0,
			},
			ring: Color::rgba(255, 255, 255, 0.8),
		}
	}

	/// Style for a given change.
	pub fn trend(&self, change_pct: f64) -> &TrendStyle {
		match Trend::of(change_pct) {
			Trend::Up => &self.up,
			Trend::Down => &self.down,
			Trend::Flat => &self.flat,
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
