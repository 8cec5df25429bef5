//! Bubble sizing.
//!
//! Radii follow a square-root scale so that bubble *area*, not radius, tracks
//! the magnitude of a collection's price change. Both ends of the range scale
//! linearly with the viewport width relative to [`RadiusScale::reference_width`],
//! which keeps the composition proportionate from phones to desktops.
//!
//! Label text has its own legibility floor ([`MIN_FONT_PX`]). The floor is
//! applied to font sizes only; radii are never inflated to fit text.

/// Smallest font size used for any bubble label, in pixels.
pub const MIN_FONT_PX: f64 = 11.0;

/// Square-root radius scale, responsive to viewport width.
#[derive(Clone, Debug, PartialEq)]
pub struct RadiusScale {
	/// Radius for zero magnitude at the reference width.
	pub min_radius: f64,
	/// Radius for the dataset's largest magnitude at the reference width.
	pub max_radius: f64,
	/// Width at which `min_radius`/`max_radius` apply unscaled.
	pub reference_width: f64,
	/// Global size multiplier applied on top of the width scaling.
	pub size_multiplier: f64,
}

impl Default for RadiusScale {
	fn default() -> Self {
		Self {
			min_radius: 26.0,
			max_radius: 90.0,
			reference_width: 1100.0,
			size_multiplier: 1.0,
		}
	}
}

impl RadiusScale {
	/// Map a change magnitude to a display radius.
	///
	/// `dataset_max` is the largest magnitude in the current dataset. A zero,
	/// negative or non-finite maximum is replaced by 1 so the scale never
	/// degenerates. Magnitudes are clamped into `[0, dataset_max]`.
	pub fn map(&self, magnitude: f64, viewport_width: f64, dataset_max: f64) -> f64 {
		let domain_max = if dataset_max.is_finite() && dataset_max > 0.0 {
			dataset_max
		} else {
			1.0
		};
		let magnitude = if magnitude.is_finite() {
			magnitude.clamp(0.0, domain_max)
		} else {
			0.0
		};

		let factor = self.width_factor(viewport_width) * self.size_multiplier;
		let (lo, hi) = (self.min_radius * factor, self.max_radius * factor);
		let t = (magnitude / domain_max).sqrt();

		(lo + (hi - lo) * t).max(f64::EPSILON)
	}

	fn width_factor(&self, viewport_width: f64) -> f64 {
		if viewport_width.is_finite() && viewport_width > 0.0 && self.reference_width > 0.0 {
			viewport_width / self.reference_width
		} else {
			1.0
		}
	}
}

/// Font sizes for the three label lines of a bubble.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelFonts {
	/// Collection name, in pixels.
	pub name: f64,
	/// Floor price line, in pixels.
	pub floor: f64,
	/// Percentage change line, in pixels.
	pub change: f64,
}

impl LabelFonts {
	/// Font sizes for a bubble of the given radius.
	pub fn for_radius(radius: f64) -> Self {
		Self {
			name: (radius / 4.5).min(16.0).max(MIN_FONT_PX),
			floor: (radius / 6.5).max(MIN_FONT_PX),
			change: (radius / 6.2).max(MIN_FONT_PX),
		}
	}

	/// CSS font shorthand for the name line.
	pub fn name_css(&self) -> String {
		format!("700 {}px sans-serif", self.name)
	}

	/// CSS font shorthand for the floor price line.
	pub fn floor_css(&self) -> String {
		format!("{}px sans-serif", self.floor)
	}

	/// CSS font shorthand for the change line.
	pub fn change_css(&self) -> String {
		format!("700 {}px sans-serif", self.change)
	}
}
