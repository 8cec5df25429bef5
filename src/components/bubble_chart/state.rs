//! Chart state: the node store and the coordinator that feeds it.
//!
//! [`NodeStore`] is the single owned arena of simulation nodes, indexed by
//! input order. Every mutation path (simulation tick, drag, resize, new data)
//! goes through [`ChartState`], which finishes each step with a publish so the
//! renderer sees whole updates only.
//!
//! Lifecycle:
//! - new dataset: store rebuilt; engine restarted if the node count changed,
//!   otherwise reheated
//! - viewport width change: radii recomputed in place, positions kept
//! - any viewport change: nodes re-clamped, engine restarted

use std::collections::HashSet;
use std::f64::consts::PI;

use log::{debug, info};

use super::drag::{DragConfig, DragController, DragUpdate, GestureEnd, GestureKind};
use super::scale::RadiusScale;
use super::simulation::{Engine, SimulationConfig};
use super::types::{BubbleFrame, CollectionRecord};
use super::viewport::{Viewport, ViewportConfig};

/// One simulated bubble.
#[derive(Clone, Debug)]
pub struct SimulationNode {
	/// Input record this node was built from.
	pub record: CollectionRecord,
	/// Center x, in surface pixels.
	pub x: f64,
	/// Center y, in surface pixels.
	pub y: f64,
	/// Horizontal velocity, in pixels per tick.
	pub vx: f64,
	/// Vertical velocity, in pixels per tick.
	pub vy: f64,
	/// Radius, in pixels.
	pub radius: f64,
	/// Fixed position while dragged.
	pub pin: Option<(f64, f64)>,
}

impl SimulationNode {
	fn new(record: CollectionRecord) -> Self {
		Self {
			record,
			x: 0.0,
			y: 0.0,
			vx: 0.0,
			vy: 0.0,
			radius: 1.0,
			pin: None,
		}
	}

	fn contains(&self, x: f64, y: f64) -> bool {
		let (dx, dy) = (self.x - x, self.y - y);
		dx * dx + dy * dy <= self.radius * self.radius
	}

	fn clamp_into(&mut self, viewport: Viewport) {
		let (x, y) = viewport.clamp_center(self.x, self.y, self.radius);
		self.x = x;
		self.y = y;
		if let Some((px, py)) = self.pin {
			let pinned = viewport.clamp_center(px, py, self.radius);
			self.pin = Some(pinned);
			(self.x, self.y) = pinned;
		}
	}

	#[cfg(test)]
	pub(super) fn for_test(x: f64, y: f64, radius: f64) -> Self {
		Self {
			x,
			y,
			radius,
			..Self::new(CollectionRecord::default())
		}
	}
}

/// Arena of simulation nodes, one per input record, in input order.
#[derive(Clone, Debug, Default)]
pub struct NodeStore {
	nodes: Vec<SimulationNode>,
	max_magnitude: f64,
	revision: u64,
	seeded: bool,
}

impl NodeStore {
	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the store holds no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// All nodes, in input order.
	pub fn nodes(&self) -> &[SimulationNode] {
		&self.nodes
	}

	pub(super) fn nodes_mut(&mut self) -> &mut [SimulationNode] {
		&mut self.nodes
	}

	/// Bumped on every publish.
	pub fn revision(&self) -> u64 {
		self.revision
	}

	/// Whether nodes have been given starting positions in a viewport.
	pub fn is_seeded(&self) -> bool {
		self.seeded
	}

	/// Replace all nodes with fresh ones for `records`.
	///
	/// With a viewport, radii are sized for its width and nodes are seeded
	/// around its center; without one both wait for [`Self::seed_positions`].
	pub fn rebuild(
		&mut self,
		records: &[CollectionRecord],
		viewport: Option<Viewport>,
		scale: &RadiusScale,
		spacing: f64,
	) {
		self.nodes = records.iter().cloned().map(SimulationNode::new).collect();
		self.max_magnitude = records
			.iter()
			.map(CollectionRecord::magnitude)
			.fold(0.0, f64::max);
		self.seeded = false;

		match viewport.filter(Viewport::is_valid) {
			Some(vp) => {
				self.update_radii(vp.width, scale);
				self.seed_positions(vp, spacing);
			}
			None => self.update_radii(scale.reference_width, scale),
		}
	}

	/// Place nodes on a sunflower spiral around the viewport center.
	pub fn seed_positions(&mut self, viewport: Viewport, spacing: f64) {
		let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
		let (cx, cy) = viewport.center();
		for (i, node) in self.nodes.iter_mut().enumerate() {
			let r = spacing * (0.5 + i as f64).sqrt();
			let angle = i as f64 * golden_angle;
			node.x = cx + r * angle.cos();
			node.y = cy + r * angle.sin();
			node.vx = 0.0;
			node.vy = 0.0;
			node.clamp_into(viewport);
		}
		self.seeded = true;
	}

	/// Recompute radii for a new width. Positions and pins are kept.
	pub fn update_radii(&mut self, viewport_width: f64, scale: &RadiusScale) {
		for node in &mut self.nodes {
			node.radius = scale.map(node.record.magnitude(), viewport_width, self.max_magnitude);
		}
	}

	/// Clamp every node (and pin) into the viewport.
	pub fn clamp_all(&mut self, viewport: Viewport) {
		for node in &mut self.nodes {
			node.clamp_into(viewport);
		}
	}

	/// Pin `index` at the clamped point and move it there.
	pub fn pin(&mut self, index: usize, x: f64, y: f64, viewport: Viewport) {
		let Some(node) = self.nodes.get_mut(index) else {
			return;
		};
		let pinned = viewport.clamp_center(x, y, node.radius);
		node.pin = Some(pinned);
		(node.x, node.y) = pinned;
		node.vx = 0.0;
		node.vy = 0.0;
	}

	/// Release the pin on `index`. The node resumes from where it is.
	pub fn unpin(&mut self, index: usize) {
		if let Some(node) = self.nodes.get_mut(index) {
			node.pin = None;
		}
	}

	/// Mark the current positions as a complete update.
	pub fn publish(&mut self) {
		self.revision = self.revision.wrapping_add(1);
	}

	/// Topmost node under a point. Later nodes draw on top.
	pub fn node_at(&self, x: f64, y: f64) -> Option<usize> {
		self.nodes.iter().rposition(|n| n.contains(x, y))
	}

	/// Published per-node output.
	pub fn frames(&self) -> Vec<BubbleFrame> {
		self.nodes
			.iter()
			.map(|n| BubbleFrame {
				name: n.record.name.clone(),
				floor_price: n.record.floor_price,
				change_pct: n.record.change_pct,
				image_url: n.record.image_url.clone(),
				external_link: n.record.external_link.clone(),
				x: n.x,
				y: n.y,
				radius: n.radius,
			})
			.collect()
	}

	/// Distinct image URLs, in first-seen order.
	pub fn image_urls(&self) -> Vec<String> {
		let mut seen = HashSet::new();
		self.nodes
			.iter()
			.filter_map(|n| n.record.image_url.clone())
			.filter(|url| !url.is_empty() && seen.insert(url.clone()))
			.collect()
	}
}

/// Hover tracking with a smoothed ring intensity per node.
///
/// Intensities ease toward 1 for the hovered node and decay toward 0 for the
/// rest, using `value += (target - value) * (1 - e^(-speed * dt))`.
#[derive(Clone, Debug, Default)]
pub struct HoverState {
	/// Node under the pointer.
	pub hovered: Option<usize>,
	intensity: Vec<f64>,
}

impl HoverState {
	const FADE_IN_SPEED: f64 = 10.0;
	const FADE_OUT_SPEED: f64 = 6.0;

	fn reset(&mut self, len: usize) {
		self.hovered = None;
		self.intensity = vec![0.0; len];
	}

	/// Change the hovered node.
	pub fn set(&mut self, node: Option<usize>) {
		self.hovered = node;
	}

	/// Ring intensity of `index`, 0.0 to 1.0.
	pub fn intensity(&self, index: usize) -> f64 {
		self.intensity.get(index).copied().unwrap_or(0.0)
	}

	/// Advance the animation. Returns `true` while anything is still fading.
	pub fn tick(&mut self, dt: f64) -> bool {
		let fade_in = 1.0 - (-Self::FADE_IN_SPEED * dt).exp();
		let fade_out = (-Self::FADE_OUT_SPEED * dt).exp();
		let mut animating = false;
		for (i, value) in self.intensity.iter_mut().enumerate() {
			let before = *value;
			if self.hovered == Some(i) {
				*value += (1.0 - *value) * fade_in;
				if *value > 0.995 {
					*value = 1.0;
				}
			} else {
				*value *= fade_out;
				if *value < 0.005 {
					*value = 0.0;
				}
			}
			animating |= *value != before;
		}
		animating
	}
}

/// Aggregated chart configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChartConfig {
	/// Bubble sizing.
	pub radius: RadiusScale,
	/// Physics constants.
	pub simulation: SimulationConfig,
	/// Gesture thresholds.
	pub drag: DragConfig,
	/// Surface measurement.
	pub viewport: ViewportConfig,
}

/// Something the host must act on after a gesture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChartAction {
	/// Open this link in a new tab.
	Navigate(String),
}

/// Owns the node store, the engine, the drag controller and hover state.
#[derive(Debug, Default)]
pub struct ChartState {
	/// Simulated bubbles.
	pub store: NodeStore,
	/// Hover target and ring fades.
	pub hover: HoverState,
	engine: Engine,
	drag: DragController,
	viewport: Option<Viewport>,
	config: ChartConfig,
}

impl ChartState {
	/// Empty chart waiting for data and a viewport.
	pub fn new(config: ChartConfig) -> Self {
		Self {
			drag: DragController::new(config.drag.clone()),
			config,
			..Self::default()
		}
	}

	/// Last applied viewport.
	pub fn viewport(&self) -> Option<Viewport> {
		self.viewport
	}

	/// Simulation slot.
	pub fn engine(&self) -> &Engine {
		&self.engine
	}

	/// Whether a gesture is in progress.
	pub fn is_dragging(&self) -> bool {
		self.drag.is_active()
	}

	/// Replace the dataset. A gesture in progress is cancelled first, and a
	/// pending tap is dropped since node indices change.
	pub fn set_data(&mut self, records: &[CollectionRecord], now: f64) {
		if self.drag.is_active() {
			debug!("dataset replaced mid-gesture");
			self.cancel_gesture(now);
		}
		self.drag.clear_click();
		let previous_len = self.store.len();
		self.store.rebuild(
			records,
			self.viewport,
			&self.config.radius,
			self.config.simulation.initial_spacing,
		);
		self.hover.reset(self.store.len());
		self.store.publish();
		info!("chart: {} collections", records.len());

		let warm = self.engine.simulation().is_some_and(|s| s.node_count() == self.store.len());
		if previous_len == self.store.len() && warm {
			if let Some(sim) = self.engine.simulation_mut() {
				sim.set_alpha_target(0.0);
				sim.reheat(1.0);
			}
		} else {
			self.restart_engine();
		}
	}

	/// Apply a new viewport. Identical viewports are ignored.
	pub fn set_viewport(&mut self, viewport: Viewport) {
		if !viewport.is_valid() || self.viewport == Some(viewport) {
			return;
		}
		let width_changed = self.viewport.map(|v| v.width) != Some(viewport.width);
		self.viewport = Some(viewport);
		debug!("chart: viewport {}x{}", viewport.width, viewport.height);

		if width_changed {
			self.store.update_radii(viewport.width, &self.config.radius);
		}
		if self.store.is_seeded() {
			self.store.clamp_all(viewport);
		} else {
			self.store
				.seed_positions(viewport, self.config.simulation.initial_spacing);
		}
		self.store.publish();
		self.restart_engine();
	}

	fn restart_engine(&mut self) {
		self.engine
			.restart(&self.config.simulation, self.viewport, self.store.len());
		if self.drag.is_active() {
			self.set_drag_energy(true);
		}
	}

	/// Advance the simulation and publish. Returns whether anything moved.
	pub fn tick(&mut self) -> bool {
		let moved = self.engine.tick(&mut self.store);
		if moved {
			self.store.publish();
		}
		moved
	}

	/// Advance hover fades. Returns whether a redraw is needed.
	pub fn tick_hover(&mut self, dt: f64) -> bool {
		self.hover.tick(dt)
	}

	/// Update hover from a pointer position. Ignored while dragging.
	pub fn hover_at(&mut self, x: f64, y: f64) {
		if !self.drag.is_active() {
			self.hover.set(self.store.node_at(x, y));
		}
	}

	/// Pointer left the surface.
	pub fn clear_hover(&mut self) {
		self.hover.set(None);
	}

	/// Pointer-down on the surface. Returns whether a gesture started.
	pub fn begin_gesture(&mut self, pointer_id: i32, x: f64, y: f64, now: f64) -> bool {
		let Some(node) = self.store.node_at(x, y) else {
			self.drag.clear_click();
			return false;
		};
		if let Some(previous) = self.drag.pointer_down(pointer_id, node, x, y, now) {
			self.release(previous);
		}
		self.hover.set(Some(node));
		debug!("gesture started on {}", self.store.nodes()[node].record.name);
		true
	}

	/// Pointer-move. Returns `false` once the gesture has ended.
	pub fn drag_to(&mut self, pointer_id: i32, x: f64, y: f64, buttons: u16, now: f64) -> bool {
		match self.drag.pointer_move(pointer_id, x, y, buttons, now) {
			DragUpdate::Idle => self.drag.is_active(),
			DragUpdate::Pin { node, x, y } => {
				let Some(viewport) = self.viewport else {
					return true;
				};
				self.store.pin(node, x, y, viewport);
				self.set_drag_energy(true);
				self.store.publish();
				true
			}
			DragUpdate::Released(end) => {
				self.release(end);
				false
			}
		}
	}

	/// Pointer-up for `pointer_id`.
	pub fn end_gesture(&mut self, pointer_id: i32, now: f64) -> Option<GestureKind> {
		let end = self.drag.pointer_up(pointer_id, now)?;
		self.release(end);
		Some(end.kind)
	}

	/// Forced end: pointer-cancel, lost capture, unmount.
	pub fn cancel_gesture(&mut self, now: f64) {
		if let Some(end) = self.drag.cancel(now) {
			self.release(end);
		}
	}

	fn release(&mut self, end: GestureEnd) {
		self.store.unpin(end.node);
		self.set_drag_energy(false);
		self.store.publish();
		debug!("gesture ended on node {} ({:?})", end.node, end.kind);
	}

	fn set_drag_energy(&mut self, dragging: bool) {
		let target = if dragging {
			self.config.simulation.drag_alpha_target
		} else {
			0.0
		};
		if let Some(sim) = self.engine.simulation_mut() {
			sim.set_alpha_target(target);
			sim.reheat(target);
		}
	}

	/// A click landed on the surface. Returns the navigation for the bubble
	/// that was tapped, if the click was not swallowed by a preceding drag.
	///
	/// The bubble is the one pressed, not the one under the click point:
	/// bubbles keep moving between pointer-down and click.
	pub fn click(&mut self) -> Option<ChartAction> {
		let index = self.drag.take_click()?;
		self.store
			.nodes()
			.get(index)?
			.record
			.external_link
			.clone()
			.filter(|link| !link.is_empty() && link != "#")
			.map(ChartAction::Navigate)
	}

	/// Stop everything. Called when the surface goes away.
	pub fn shutdown(&mut self) {
		self.cancel_gesture(0.0);
		self.engine.stop();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(name: &str, change_pct: f64, link: Option<&str>) -> CollectionRecord {
		CollectionRecord {
			name: name.into(),
			floor_price: 0.1,
			change_pct,
			image_url: None,
			external_link: link.map(str::to_string),
		}
	}

	fn two_records() -> Vec<CollectionRecord> {
		vec![
			record("A", 50.0, Some("https://example.com/a")),
			record("B", -10.0, None),
		]
	}

	fn chart(vp: Viewport, records: &[CollectionRecord]) -> ChartState {
		let mut chart = ChartState::new(ChartConfig::default());
		chart.set_viewport(vp);
		chart.set_data(records, 0.0);
		chart
	}

	fn settle(chart: &mut ChartState) {
		let mut ticks = 0;
		while chart.tick() {
			ticks += 1;
			assert!(ticks < 2000);
		}
	}

	fn node_pos(chart: &ChartState, i: usize) -> (f64, f64) {
		let n = &chart.store.nodes()[i];
		(n.x, n.y)
	}

	#[test]
	fn one_node_per_record_in_order() {
		let chart = chart(Viewport::new(1100.0, 560.0), &two_records());
		let names: Vec<_> = chart.store.nodes().iter().map(|n| n.record.name.as_str()).collect();
		assert_eq!(names, ["A", "B"]);
		assert!(chart.engine().is_running());
	}

	#[test]
	fn empty_dataset_does_not_start_engine() {
		let chart = chart(Viewport::new(1100.0, 560.0), &[]);
		assert!(chart.store.is_empty());
		assert!(!chart.engine().is_running());
	}

	#[test]
	fn data_before_viewport_defers_start() {
		let mut chart = ChartState::new(ChartConfig::default());
		chart.set_data(&two_records(), 0.0);
		assert!(!chart.engine().is_running());
		assert!(!chart.store.is_seeded());

		let vp = Viewport::new(1100.0, 560.0);
		chart.set_viewport(vp);
		assert!(chart.engine().is_running());
		assert!(chart.store.is_seeded());
		for n in chart.store.nodes() {
			assert!(n.x >= n.radius && n.x <= vp.width - n.radius);
		}
	}

	#[test]
	fn identical_viewport_does_not_restart() {
		let vp = Viewport::new(1100.0, 560.0);
		let mut chart = chart(vp, &two_records());
		let generation = chart.engine().generation();
		chart.set_viewport(vp);
		assert_eq!(chart.engine().generation(), generation);
		chart.set_viewport(Viewport::new(1100.0, 500.0));
		assert_eq!(chart.engine().generation(), generation + 1);
	}

	#[test]
	fn resize_reclamps_and_keeps_radius_order() {
		let mut chart = chart(Viewport::new(1100.0, 560.0), &two_records());
		settle(&mut chart);

		// push B against the right edge so the narrower viewport must move it
		let right = 1100.0 - chart.store.nodes()[1].radius;
		chart.store.nodes_mut()[1].x = right;

		let narrow = Viewport::new(600.0, 560.0);
		chart.set_viewport(narrow);
		let (a, b) = (&chart.store.nodes()[0], &chart.store.nodes()[1]);
		assert!(a.radius > b.radius);
		assert!((a.radius - 90.0 * 600.0 / 1100.0).abs() < 1e-9);
		for n in chart.store.nodes() {
			assert!(n.x >= n.radius && n.x <= narrow.width - n.radius);
			assert!(n.y >= n.radius && n.y <= narrow.height - n.radius);
		}
		assert_eq!(chart.store.nodes()[1].x, 600.0 - chart.store.nodes()[1].radius);
	}

	#[test]
	fn same_size_dataset_reheats_instead_of_restarting() {
		let mut chart = chart(Viewport::new(1100.0, 560.0), &two_records());
		settle(&mut chart);
		let generation = chart.engine().generation();

		chart.set_data(&[record("C", 5.0, None), record("D", 1.0, None)], 0.0);
		assert_eq!(chart.engine().generation(), generation);
		assert!(chart.tick());

		chart.set_data(&[record("E", 5.0, None)], 0.0);
		assert_eq!(chart.engine().generation(), generation + 1);
	}

	#[test]
	fn drag_pins_node_to_clamped_pointer() {
		let vp = Viewport::new(1100.0, 560.0);
		let mut chart = chart(vp, &two_records());
		settle(&mut chart);

		let (ax, ay) = node_pos(&chart, 0);
		assert!(chart.begin_gesture(1, ax, ay, 0.0));
		assert!(chart.drag_to(1, 100.0, 100.0, 1, 8.0));
		assert!(chart.drag_to(1, 500.0, 300.0, 1, 16.0));
		chart.tick();
		assert_eq!(node_pos(&chart, 0), (500.0, 300.0));

		// pointer outside the viewport: node stays fully visible
		chart.drag_to(1, 2000.0, -40.0, 1, 32.0);
		chart.tick();
		let r = chart.store.nodes()[0].radius;
		assert_eq!(node_pos(&chart, 0), (1100.0 - r, r));
		assert!(!chart.engine().simulation().unwrap().is_settled());

		assert_eq!(chart.end_gesture(1, 48.0), Some(GestureKind::Drag));
		assert!(chart.store.nodes()[0].pin.is_none());
	}

	#[test]
	fn released_node_moves_when_perturbed() {
		let vp = Viewport::new(1100.0, 560.0);
		let mut chart = chart(vp, &two_records());
		settle(&mut chart);

		let (ax, ay) = node_pos(&chart, 0);
		chart.begin_gesture(1, ax, ay, 0.0);
		chart.drag_to(1, 100.0, 100.0, 1, 8.0);
		chart.drag_to(1, 400.0, 280.0, 1, 16.0);
		chart.end_gesture(1, 32.0);
		assert_eq!(node_pos(&chart, 0), (400.0, 280.0));

		// drop B right on top of A: the free node A must be pushed away
		chart.store.nodes_mut()[1].x = 410.0;
		chart.store.nodes_mut()[1].y = 280.0;
		for _ in 0..5 {
			chart.tick();
		}
		assert_ne!(node_pos(&chart, 0), (400.0, 280.0));
	}

	#[test]
	fn tap_navigates_and_drag_does_not() {
		let vp = Viewport::new(1100.0, 560.0);
		let mut chart = chart(vp, &two_records());
		settle(&mut chart);
		let (ax, ay) = node_pos(&chart, 0);

		chart.begin_gesture(1, ax, ay, 0.0);
		assert_eq!(chart.end_gesture(1, 60.0), Some(GestureKind::Tap));
		assert_eq!(
			chart.click(),
			Some(ChartAction::Navigate("https://example.com/a".into()))
		);

		chart.begin_gesture(1, ax, ay, 100.0);
		chart.drag_to(1, ax + 30.0, ay, 1, 120.0);
		chart.end_gesture(1, 140.0);
		assert_eq!(chart.click(), None);

		// a later tap navigates again
		let (nx, ny) = node_pos(&chart, 0);
		chart.begin_gesture(1, nx, ny, 200.0);
		chart.end_gesture(1, 220.0);
		assert!(chart.click().is_some());
	}

	#[test]
	fn tap_follows_the_pressed_bubble_while_it_moves() {
		let records = vec![
			record("A", 50.0, Some("https://example.com/a")),
			record("B", -30.0, Some("https://example.com/b")),
			record("C", 10.0, Some("https://example.com/c")),
		];
		let mut chart = chart(Viewport::new(1100.0, 560.0), &records);
		for _ in 0..3 {
			chart.tick();
		}

		// press on B's rim, then let the layout keep moving before release
		let b = &chart.store.nodes()[1];
		let (px, py) = (b.x + b.radius * 0.95, b.y);
		assert!(chart.begin_gesture(1, px, py, 0.0));
		let press_node = chart.store.node_at(px, py);
		for _ in 0..10 {
			chart.tick();
		}
		assert_eq!(chart.end_gesture(1, 100.0), Some(GestureKind::Tap));
		assert_eq!(
			chart.click(),
			press_node.map(|i| ChartAction::Navigate(records[i].external_link.clone().unwrap()))
		);
		assert!(chart.click().is_none());
	}

	#[test]
	fn press_on_empty_space_clears_pending_tap() {
		let vp = Viewport::new(1100.0, 560.0);
		let mut chart = chart(vp, &two_records());
		settle(&mut chart);
		let (ax, ay) = node_pos(&chart, 0);
		chart.begin_gesture(1, ax, ay, 0.0);
		chart.end_gesture(1, 10.0);

		let empty = (0..vp.width as usize)
			.step_by(7)
			.map(|x| x as f64 + 1.0)
			.find(|&x| chart.store.node_at(x, 2.0).is_none())
			.unwrap();
		assert!(!chart.begin_gesture(2, empty, 2.0, 20.0));
		assert_eq!(chart.click(), None);
	}

	#[test]
	fn new_data_mid_gesture_releases_and_cools() {
		let vp = Viewport::new(1100.0, 560.0);
		let mut chart = chart(vp, &two_records());
		settle(&mut chart);
		let (ax, ay) = node_pos(&chart, 0);
		chart.begin_gesture(1, ax, ay, 0.0);
		chart.drag_to(1, 300.0, 300.0, 1, 10.0);
		assert!(chart.is_dragging());

		chart.set_data(&[record("C", 5.0, None), record("D", 1.0, None)], 50.0);
		assert!(!chart.is_dragging());
		assert!(chart.store.nodes().iter().all(|n| n.pin.is_none()));
		settle(&mut chart);
		assert!(chart.engine().simulation().unwrap().is_settled());
		assert_eq!(chart.click(), None);
	}

	#[test]
	fn node_without_link_does_not_navigate() {
		let vp = Viewport::new(1100.0, 560.0);
		let mut chart = chart(vp, &two_records());
		settle(&mut chart);
		let (bx, by) = node_pos(&chart, 1);
		chart.begin_gesture(1, bx, by, 0.0);
		chart.end_gesture(1, 10.0);
		assert_eq!(chart.click(), None);
	}

	#[test]
	fn lost_buttons_release_pin() {
		let vp = Viewport::new(1100.0, 560.0);
		let mut chart = chart(vp, &two_records());
		settle(&mut chart);
		let (ax, ay) = node_pos(&chart, 0);
		chart.begin_gesture(3, ax, ay, 0.0);
		chart.drag_to(3, 300.0, 300.0, 1, 10.0);
		assert!(chart.store.nodes()[0].pin.is_some());
		assert!(!chart.drag_to(3, 310.0, 300.0, 0, 20.0));
		assert!(chart.store.nodes()[0].pin.is_none());
		assert!(!chart.is_dragging());
	}

	#[test]
	fn shutdown_releases_everything() {
		let vp = Viewport::new(1100.0, 560.0);
		let mut chart = chart(vp, &two_records());
		settle(&mut chart);
		let (ax, ay) = node_pos(&chart, 0);
		chart.begin_gesture(1, ax, ay, 0.0);
		chart.drag_to(1, 200.0, 200.0, 1, 10.0);
		chart.shutdown();
		assert!(!chart.engine().is_running());
		assert!(chart.store.nodes()[0].pin.is_none());
		assert!(!chart.tick());
	}

	#[test]
	fn publish_bumps_revision_on_tick() {
		let mut chart = chart(Viewport::new(1100.0, 560.0), &two_records());
		let before = chart.store.revision();
		assert!(chart.tick());
		assert_eq!(chart.store.revision(), before + 1);
	}

	#[test]
	fn frames_mirror_nodes() {
		let chart = chart(Viewport::new(1100.0, 560.0), &two_records());
		let frames = chart.store.frames();
		assert_eq!(frames.len(), 2);
		assert_eq!(frames[0].name, "A");
		assert_eq!(frames[0].x, chart.store.nodes()[0].x);
		assert_eq!(frames[1].radius, chart.store.nodes()[1].radius);
	}

	#[test]
	fn hover_fades_in_and_out() {
		let mut chart = chart(Viewport::new(1100.0, 560.0), &two_records());
		settle(&mut chart);
		let (ax, ay) = node_pos(&chart, 0);
		chart.hover_at(ax, ay);
		assert_eq!(chart.hover.hovered, Some(0));
		for _ in 0..120 {
			chart.tick_hover(0.016);
		}
		assert_eq!(chart.hover.intensity(0), 1.0);
		chart.clear_hover();
		for _ in 0..120 {
			chart.tick_hover(0.016);
		}
		assert_eq!(chart.hover.intensity(0), 0.0);
		assert!(!chart.tick_hover(0.016));
	}

	#[test]
	fn image_urls_are_deduplicated() {
		let mut records = two_records();
		records[0].image_url = Some("a.png".into());
		records[1].image_url = Some("a.png".into());
		records.push(CollectionRecord {
			image_url: Some(String::new()),
			..Default::default()
		});
		let chart = chart(Viewport::new(1100.0, 560.0), &records);
		assert_eq!(chart.store.image_urls(), ["a.png"]);
	}
}
