//! Pointer gesture tracking for bubble dragging.
//!
//! A gesture starts on pointer-down over a bubble and ends on pointer-up,
//! pointer-cancel, or the first move event reporting no engaged buttons.
//! Gestures that moved past [`DragConfig::move_threshold`] or lasted longer
//! than [`DragConfig::hold_ms`] count as drags: the click the browser fires
//! afterwards is swallowed once. Short, still gestures are taps; the click
//! that follows opens the link of the bubble that was pressed, wherever it
//! has drifted to since.
//!
//! Timestamps are supplied by the caller, in milliseconds, so
//! the controller stays free of DOM types.

/// Gesture thresholds.
#[derive(Clone, Debug, PartialEq)]
pub struct DragConfig {
	/// Press duration after which a gesture is a hold, in milliseconds.
	pub hold_ms: f64,
	/// Pointer travel after which a gesture is a drag, in pixels.
	pub move_threshold: f64,
}

impl Default for DragConfig {
	fn default() -> Self {
		Self {
			hold_ms: 250.0,
			move_threshold: 3.0,
		}
	}
}

#[derive(Clone, Debug)]
struct Gesture {
	pointer_id: i32,
	node: usize,
	start: (f64, f64),
	started_at: f64,
	moved: bool,
}

impl Gesture {
	fn held(&self, now: f64, config: &DragConfig) -> bool {
		now - self.started_at > config.hold_ms
	}
}

/// How a gesture finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
	/// Short and still: the click should navigate.
	Tap,
	/// Moved or held: the click is suppressed.
	Drag,
}

/// A finished gesture, returned so the caller can release the node's pin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureEnd {
	/// Node the gesture started on.
	pub node: usize,
	/// Tap or drag.
	pub kind: GestureKind,
}

/// Result of a pointer-move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragUpdate {
	/// Nothing to do: no gesture, another pointer, or still under threshold.
	Idle,
	/// Pin `node` at the pointer position.
	Pin {
		/// Dragged node.
		node: usize,
		/// Pointer x, in surface pixels.
		x: f64,
		/// Pointer y, in surface pixels.
		y: f64,
	},
	/// The pointer lost its buttons; treat as release.
	Released(GestureEnd),
}

/// Single-gesture drag state machine.
#[derive(Clone, Debug, Default)]
pub struct DragController {
	config: DragConfig,
	gesture: Option<Gesture>,
	suppress_click: bool,
	last_tap: Option<usize>,
}

impl DragController {
	/// Idle controller with the given thresholds.
	pub fn new(config: DragConfig) -> Self {
		Self {
			config,
			gesture: None,
			suppress_click: false,
			last_tap: None,
		}
	}

	/// Whether a gesture is in progress.
	pub fn is_active(&self) -> bool {
		self.gesture.is_some()
	}

	/// Start a gesture on `node`.
	///
	/// Any gesture still in progress is torn down first and returned so its
	/// pin can be released. A stale click suppression or tap from an earlier
	/// gesture that never produced a click is dropped.
	pub fn pointer_down(
		&mut self,
		pointer_id: i32,
		node: usize,
		x: f64,
		y: f64,
		now: f64,
	) -> Option<GestureEnd> {
		let previous = self.finish(now, false);
		self.clear_click();
		self.gesture = Some(Gesture {
			pointer_id,
			node,
			start: (x, y),
			started_at: now,
			moved: false,
		});
		previous
	}

	/// Track pointer movement. `buttons` is the event's button bitmask.
	pub fn pointer_move(&mut self, pointer_id: i32, x: f64, y: f64, buttons: u16, now: f64) -> DragUpdate {
		let Some(gesture) = self.gesture.as_mut() else {
			return DragUpdate::Idle;
		};
		if gesture.pointer_id != pointer_id {
			return DragUpdate::Idle;
		}
		if buttons == 0 {
			return match self.finish(now, false) {
				Some(end) => DragUpdate::Released(end),
				None => DragUpdate::Idle,
			};
		}

		if !gesture.moved {
			let (dx, dy) = (x - gesture.start.0, y - gesture.start.1);
			if (dx * dx + dy * dy).sqrt() <= self.config.move_threshold {
				return DragUpdate::Idle;
			}
			gesture.moved = true;
		}

		DragUpdate::Pin {
			node: gesture.node,
			x,
			y,
		}
	}

	/// End the gesture for `pointer_id`. Other pointers are ignored.
	pub fn pointer_up(&mut self, pointer_id: i32, now: f64) -> Option<GestureEnd> {
		match &self.gesture {
			Some(g) if g.pointer_id == pointer_id => self.finish(now, true),
			_ => None,
		}
	}

	/// End whatever gesture is active: pointer-cancel, lost capture, unmount.
	/// A cancelled tap does not navigate.
	pub fn cancel(&mut self, now: f64) -> Option<GestureEnd> {
		self.finish(now, false)
	}

	/// Forget any pending tap or suppression. Called on a press that missed
	/// every bubble.
	pub fn clear_click(&mut self) {
		self.suppress_click = false;
		self.last_tap = None;
	}

	/// Consume a click. Returns the tapped node when the click should navigate.
	pub fn take_click(&mut self) -> Option<usize> {
		if self.suppress_click {
			self.suppress_click = false;
			return None;
		}
		self.last_tap.take()
	}

	/// `clickable` is set only for a real pointer-up, the one ending that is
	/// followed by a browser click.
	fn finish(&mut self, now: f64, clickable: bool) -> Option<GestureEnd> {
		let gesture = self.gesture.take()?;
		let kind = if gesture.moved || gesture.held(now, &self.config) {
			self.suppress_click = true;
			GestureKind::Drag
		} else {
			if clickable {
				self.last_tap = Some(gesture.node);
			}
			GestureKind::Tap
		};
		Some(GestureEnd {
			node: gesture.node,
			kind,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const PRIMARY: u16 = 1;

	#[test]
	fn tap_allows_navigation() {
		let mut drag = DragController::default();
		drag.pointer_down(1, 0, 100.0, 100.0, 0.0);
		assert_eq!(drag.pointer_move(1, 101.0, 100.0, PRIMARY, 20.0), DragUpdate::Idle);
		let end = drag.pointer_up(1, 80.0).unwrap();
		assert_eq!(end, GestureEnd { node: 0, kind: GestureKind::Tap });
		assert_eq!(drag.take_click(), Some(0));
		// one navigation per tap
		assert_eq!(drag.take_click(), None);
	}

	#[test]
	fn movement_suppresses_exactly_one_click() {
		let mut drag = DragController::default();
		drag.pointer_down(1, 2, 100.0, 100.0, 0.0);
		assert_eq!(
			drag.pointer_move(1, 120.0, 110.0, PRIMARY, 30.0),
			DragUpdate::Pin { node: 2, x: 120.0, y: 110.0 }
		);
		// once moved, small moves keep pinning
		assert_eq!(
			drag.pointer_move(1, 121.0, 110.0, PRIMARY, 40.0),
			DragUpdate::Pin { node: 2, x: 121.0, y: 110.0 }
		);
		assert_eq!(drag.pointer_up(1, 60.0).unwrap().kind, GestureKind::Drag);
		assert_eq!(drag.take_click(), None);

		drag.pointer_down(1, 2, 100.0, 100.0, 100.0);
		drag.pointer_up(1, 150.0);
		assert_eq!(drag.take_click(), Some(2));
	}

	#[test]
	fn long_hold_suppresses_click() {
		let mut drag = DragController::default();
		drag.pointer_down(1, 0, 10.0, 10.0, 1000.0);
		assert_eq!(drag.pointer_up(1, 1300.0).unwrap().kind, GestureKind::Drag);
		assert_eq!(drag.take_click(), None);
	}

	#[test]
	fn lost_buttons_release_the_gesture() {
		let mut drag = DragController::default();
		drag.pointer_down(7, 1, 0.0, 0.0, 0.0);
		drag.pointer_move(7, 50.0, 0.0, PRIMARY, 10.0);
		assert_eq!(
			drag.pointer_move(7, 60.0, 0.0, 0, 20.0),
			DragUpdate::Released(GestureEnd { node: 1, kind: GestureKind::Drag })
		);
		assert!(!drag.is_active());
		assert_eq!(drag.pointer_up(7, 30.0), None);
	}

	#[test]
	fn other_pointers_are_ignored() {
		let mut drag = DragController::default();
		drag.pointer_down(1, 0, 0.0, 0.0, 0.0);
		assert_eq!(drag.pointer_move(2, 90.0, 90.0, PRIMARY, 10.0), DragUpdate::Idle);
		assert_eq!(drag.pointer_up(2, 20.0), None);
		assert!(drag.is_active());
		assert_eq!(drag.pointer_up(1, 30.0).map(|end| end.node), Some(0));
	}

	#[test]
	fn new_pointer_down_tears_down_previous_gesture() {
		let mut drag = DragController::default();
		drag.pointer_down(1, 0, 0.0, 0.0, 0.0);
		drag.pointer_move(1, 40.0, 0.0, PRIMARY, 10.0);
		let previous = drag.pointer_down(2, 3, 5.0, 5.0, 20.0).unwrap();
		assert_eq!(previous, GestureEnd { node: 0, kind: GestureKind::Drag });
		// the suppression left by the torn-down gesture does not leak
		let end = drag.pointer_up(2, 40.0).unwrap();
		assert_eq!(end, GestureEnd { node: 3, kind: GestureKind::Tap });
		assert_eq!(drag.take_click(), Some(3));
	}

	#[test]
	fn cancel_ends_gesture() {
		let mut drag = DragController::default();
		assert_eq!(drag.cancel(0.0), None);
		drag.pointer_down(1, 4, 0.0, 0.0, 0.0);
		assert_eq!(drag.cancel(10.0), Some(GestureEnd { node: 4, kind: GestureKind::Tap }));
		assert!(!drag.is_active());
	}

	#[test]
	fn click_without_gesture_does_nothing() {
		let mut drag = DragController::default();
		assert_eq!(drag.take_click(), None);

		// a cancelled tap leaves nothing to navigate to
		drag.pointer_down(1, 5, 0.0, 0.0, 0.0);
		drag.cancel(10.0);
		assert_eq!(drag.take_click(), None);

		drag.pointer_down(1, 5, 0.0, 0.0, 20.0);
		drag.pointer_up(1, 30.0);
		drag.clear_click();
		assert_eq!(drag.take_click(), None);
	}
}
