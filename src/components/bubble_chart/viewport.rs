//! Viewport measurement and change tracking.
//!
//! The chart fills the horizontal space of its surface and the vertical space
//! left below the surface's top edge, minus a fixed bottom gap. Measurements
//! arrive on mount and on every resize; only *changes* are republished, so the
//! simulation is not restarted by repeated identical observations.

use web_sys::{Element, Window};

/// Pixel dimensions of the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Width in pixels.
	pub width: f64,
	/// Height in pixels.
	pub height: f64,
}

impl Viewport {
	/// Viewport of the given size.
	pub fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// Both dimensions finite and strictly positive.
	pub fn is_valid(&self) -> bool {
		self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
	}

	/// Center point.
	pub fn center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}

	/// Clamp a circle center so the whole circle stays inside the viewport.
	///
	/// When the circle is wider than the viewport on an axis it is centered on
	/// that axis instead.
	pub fn clamp_center(&self, x: f64, y: f64, radius: f64) -> (f64, f64) {
		(
			clamp_axis(x, radius, self.width),
			clamp_axis(y, radius, self.height),
		)
	}
}

fn clamp_axis(value: f64, radius: f64, extent: f64) -> f64 {
	let (lo, hi) = (radius, extent - radius);
	if hi < lo {
		return extent / 2.0;
	}
	if value.is_nan() {
		return extent / 2.0;
	}
	value.clamp(lo, hi)
}

/// Viewport tracking options.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewportConfig {
	/// Space kept free below the chart, in pixels.
	pub bottom_gap: f64,
}

impl Default for ViewportConfig {
	fn default() -> Self {
		Self { bottom_gap: 20.0 }
	}
}

/// Raw numbers read from the DOM.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
	/// Surface box width, if the surface is attached and laid out.
	pub surface_width: Option<f64>,
	/// Distance from the top of the window to the surface.
	pub surface_top: f64,
	/// `window.innerWidth`.
	pub window_width: f64,
	/// `window.innerHeight`.
	pub window_height: f64,
}

/// Turns measurements into viewport updates, republishing only on change.
#[derive(Clone, Debug, Default)]
pub struct ViewportTracker {
	config: ViewportConfig,
	current: Option<Viewport>,
}

impl ViewportTracker {
	/// Tracker with nothing published yet.
	pub fn new(config: ViewportConfig) -> Self {
		Self {
			config,
			current: None,
		}
	}

	/// Last published viewport.
	pub fn current(&self) -> Option<Viewport> {
		self.current
	}

	/// Derive the viewport from a measurement.
	///
	/// Returns `Some` only when the result is valid and differs from the last
	/// published viewport. Invalid measurements are ignored and leave the
	/// previous viewport in place.
	pub fn observe(&mut self, m: Measurement) -> Option<Viewport> {
		let width = m
			.surface_width
			.filter(|w| w.is_finite() && *w > 0.0)
			.unwrap_or(m.window_width);
		let height = m.window_height - m.surface_top.max(0.0) - self.config.bottom_gap;
		let next = Viewport::new(width.floor(), height.floor());

		if !next.is_valid() {
			log::debug!("viewport: ignoring unusable measurement {:?}", m);
			return None;
		}
		if self.current == Some(next) {
			return None;
		}
		self.current = Some(next);
		Some(next)
	}
}

/// Read the current surface and window dimensions.
///
/// Returns `None` when the window size is not available yet.
pub fn measure(window: &Window, surface: &Element) -> Option<Measurement> {
	let window_width = window.inner_width().ok()?.as_f64()?;
	let window_height = window.inner_height().ok()?.as_f64()?;
	let rect = surface.get_bounding_client_rect();
	Some(Measurement {
		surface_width: Some(rect.width()),
		surface_top: rect.top(),
		window_width,
		window_height,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	fn measurement(width: f64, top: f64, window_height: f64) -> Measurement {
		Measurement {
			surface_width: Some(width),
			surface_top: top,
			window_width: 1400.0,
			window_height,
		}
	}

	#[test]
	fn height_fills_space_below_surface() {
		let mut tracker = ViewportTracker::default();
		let vp = tracker.observe(measurement(1100.0, 120.0, 700.0)).unwrap();
		assert_eq!(vp, Viewport::new(1100.0, 560.0));
	}

	#[test]
	fn identical_measurements_publish_once() {
		let mut tracker = ViewportTracker::default();
		assert!(tracker.observe(measurement(1100.0, 120.0, 700.0)).is_some());
		assert!(tracker.observe(measurement(1100.0, 120.0, 700.0)).is_none());
		assert!(tracker.observe(measurement(1100.4, 120.0, 700.0)).is_none());
		assert_eq!(
			tracker.observe(measurement(600.0, 120.0, 700.0)),
			Some(Viewport::new(600.0, 560.0))
		);
	}

	#[test]
	fn unattached_surface_falls_back_to_window_width() {
		let mut tracker = ViewportTracker::default();
		let vp = tracker
			.observe(Measurement {
				surface_width: Some(0.0),
				surface_top: 0.0,
				window_width: 800.0,
				window_height: 620.0,
			})
			.unwrap();
		assert_eq!(vp, Viewport::new(800.0, 600.0));
	}

	#[test]
	fn invalid_measurement_is_deferred() {
		let mut tracker = ViewportTracker::default();
		assert!(tracker.observe(measurement(1100.0, 700.0, 700.0)).is_none());
		assert_eq!(tracker.current(), None);

		tracker.observe(measurement(1100.0, 100.0, 700.0));
		assert!(tracker.observe(measurement(1100.0, 700.0, 700.0)).is_none());
		assert_eq!(tracker.current(), Some(Viewport::new(1100.0, 580.0)));
	}

	#[test]
	fn clamp_keeps_circle_inside() {
		let vp = Viewport::new(600.0, 560.0);
		assert_eq!(vp.clamp_center(-50.0, 900.0, 40.0), (40.0, 520.0));
		assert_eq!(vp.clamp_center(300.0, 200.0, 40.0), (300.0, 200.0));
		// wider than the viewport: centered
		assert_eq!(vp.clamp_center(10.0, 10.0, 400.0), (300.0, 280.0));
	}
}
