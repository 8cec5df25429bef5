//! Per-tick forces.
//!
//! Forces write into node velocities (charge, collision, per-axis centering)
//! or translate positions directly (mean centering). Pinned nodes are never
//! moved by a force; during collision they act as immovable obstacles.

use std::f64::consts::TAU;

use super::super::state::SimulationNode;
use super::super::viewport::Viewport;

/// Pairs closer than this (squared) use a softened distance in the charge force.
const DISTANCE_MIN_SQ: f64 = 1.0;

/// Centering strategy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Centering {
	/// Translate free nodes so the centroid moves toward the viewport center.
	Mean {
		/// Share of the centroid offset removed per tick.
		strength: f64,
	},
	/// Pull each free node toward the center lines, independently per axis.
	Axis {
		/// Velocity gain per pixel of offset, scaled by alpha.
		strength: f64,
	},
}

/// Deterministic unit offset for coincident pairs.
fn jiggle(i: usize, j: usize) -> (f64, f64) {
	let angle = ((i as f64) * 0.618_034 + (j as f64) * 0.414_214 + 0.37) * TAU;
	(angle.cos() * 1e-6, angle.sin() * 1e-6)
}

pub(super) fn apply_centering(
	nodes: &mut [SimulationNode],
	viewport: Viewport,
	centering: Centering,
	alpha: f64,
) {
	if nodes.is_empty() {
		return;
	}
	let (cx, cy) = viewport.center();

	match centering {
		Centering::Mean { strength } => {
			let n = nodes.len() as f64;
			let (sx, sy) = nodes
				.iter()
				.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
			let (shift_x, shift_y) = ((sx / n - cx) * strength, (sy / n - cy) * strength);
			for node in nodes.iter_mut().filter(|n| n.pin.is_none()) {
				node.x -= shift_x;
				node.y -= shift_y;
			}
		}
		Centering::Axis { strength } => {
			for node in nodes.iter_mut().filter(|n| n.pin.is_none()) {
				node.vx += (cx - node.x) * strength * alpha;
				node.vy += (cy - node.y) * strength * alpha;
			}
		}
	}
}

/// Pairwise charge. Positive strength pushes nodes apart with a 1/d falloff.
pub(super) fn apply_charge(nodes: &mut [SimulationNode], strength: f64, alpha: f64) {
	if strength == 0.0 {
		return;
	}
	let count = nodes.len();
	for i in 0..count {
		if nodes[i].pin.is_some() {
			continue;
		}
		let (mut dvx, mut dvy) = (0.0, 0.0);
		for j in 0..count {
			if i == j {
				continue;
			}
			let (mut dx, mut dy) = (nodes[j].x - nodes[i].x, nodes[j].y - nodes[i].y);
			if dx == 0.0 && dy == 0.0 {
				(dx, dy) = jiggle(i, j);
			}
			let mut l = dx * dx + dy * dy;
			if l < DISTANCE_MIN_SQ {
				l = (DISTANCE_MIN_SQ * l).sqrt();
			}
			let w = strength * alpha / l;
			dvx -= dx * w;
			dvy -= dy * w;
		}
		nodes[i].vx += dvx;
		nodes[i].vy += dvy;
	}
}

/// Resolve overlaps between padded circles by adjusting velocities.
///
/// Uses predicted positions (`x + vx`) so corrections from earlier pairs in
/// the same pass are accounted for. The correction is split by squared
/// radius: the smaller node moves more. A pinned node takes none of it.
pub(super) fn apply_collision(
	nodes: &mut [SimulationNode],
	padding: f64,
	strength: f64,
	iterations: usize,
) {
	let count = nodes.len();
	for _ in 0..iterations {
		for i in 0..count {
			for j in (i + 1)..count {
				let (pin_i, pin_j) = (nodes[i].pin.is_some(), nodes[j].pin.is_some());
				if pin_i && pin_j {
					continue;
				}
				let (ri, rj) = (nodes[i].radius + padding, nodes[j].radius + padding);
				let r = ri + rj;
				let mut dx = (nodes[i].x + nodes[i].vx) - (nodes[j].x + nodes[j].vx);
				let mut dy = (nodes[i].y + nodes[i].vy) - (nodes[j].y + nodes[j].vy);
				let mut l = dx * dx + dy * dy;
				if l >= r * r {
					continue;
				}
				if l == 0.0 {
					(dx, dy) = jiggle(i, j);
					l = dx * dx + dy * dy;
				}
				let d = l.sqrt();
				let push = (r - d) / d * strength;
				dx *= push;
				dy *= push;

				let share_i = match (pin_i, pin_j) {
					(true, _) => 0.0,
					(_, true) => 1.0,
					_ => (rj * rj) / (ri * ri + rj * rj),
				};
				nodes[i].vx += dx * share_i;
				nodes[i].vy += dy * share_i;
				nodes[j].vx -= dx * (1.0 - share_i);
				nodes[j].vy -= dy * (1.0 - share_i);
			}
		}
	}
}

/// Apply velocity decay and move nodes. Pinned nodes snap to their pin.
pub(super) fn integrate(nodes: &mut [SimulationNode], velocity_decay: f64) {
	let keep = 1.0 - velocity_decay;
	for node in nodes {
		if let Some((px, py)) = node.pin {
			node.x = px;
			node.y = py;
			node.vx = 0.0;
			node.vy = 0.0;
			continue;
		}
		node.vx *= keep;
		node.vy *= keep;
		node.x += node.vx;
		node.y += node.vy;
	}
}

/// Clamp every node inside the viewport.
///
/// Velocity components pointing into a wall the node was clamped against
/// are dropped so the node does not keep pressing into it.
pub(super) fn clamp_to_bounds(nodes: &mut [SimulationNode], viewport: Viewport) {
	for node in nodes {
		let (x, y) = viewport.clamp_center(node.x, node.y, node.radius);
		if x != node.x {
			node.vx = 0.0;
		}
		if y != node.y {
			node.vy = 0.0;
		}
		node.x = x;
		node.y = y;
	}
}

/// Sum of absolute velocity components, a cheap energy proxy.
pub(super) fn kinetic_energy(nodes: &[SimulationNode]) -> f64 {
	nodes.iter().map(|n| n.vx.abs() + n.vy.abs()).sum()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(x: f64, y: f64, radius: f64) -> SimulationNode {
		SimulationNode::for_test(x, y, radius)
	}

	#[test]
	fn collision_pushes_overlapping_pair_apart() {
		let mut nodes = vec![node(100.0, 100.0, 20.0), node(110.0, 100.0, 20.0)];
		apply_collision(&mut nodes, 0.0, 1.0, 1);
		assert!(nodes[0].vx < 0.0);
		assert!(nodes[1].vx > 0.0);
		// equal radii split the correction evenly: 30px overlap -> 15px each
		assert!((nodes[0].vx + 15.0).abs() < 1e-9);
		assert!((nodes[1].vx - 15.0).abs() < 1e-9);
	}

	#[test]
	fn pinned_node_is_an_obstacle() {
		let mut nodes = vec![node(100.0, 100.0, 20.0), node(110.0, 100.0, 20.0)];
		nodes[0].pin = Some((100.0, 100.0));
		apply_collision(&mut nodes, 0.0, 1.0, 1);
		assert_eq!(nodes[0].vx, 0.0);
		assert!((nodes[1].vx - 30.0).abs() < 1e-9);
	}

	#[test]
	fn coincident_nodes_separate() {
		let mut nodes = vec![node(50.0, 50.0, 10.0), node(50.0, 50.0, 10.0)];
		apply_collision(&mut nodes, 0.0, 1.0, 2);
		integrate(&mut nodes, 0.0);
		let (dx, dy) = (nodes[0].x - nodes[1].x, nodes[0].y - nodes[1].y);
		assert!((dx * dx + dy * dy).sqrt() > 1.0);
	}

	#[test]
	fn positive_charge_repels() {
		let mut nodes = vec![node(100.0, 100.0, 5.0), node(200.0, 100.0, 5.0)];
		apply_charge(&mut nodes, 2.0, 1.0);
		assert!(nodes[0].vx < 0.0);
		assert!(nodes[1].vx > 0.0);
	}

	#[test]
	fn mean_centering_moves_centroid() {
		let vp = Viewport::new(400.0, 400.0);
		let mut nodes = vec![node(10.0, 10.0, 5.0), node(30.0, 50.0, 5.0)];
		apply_centering(&mut nodes, vp, Centering::Mean { strength: 1.0 }, 1.0);
		let cx = (nodes[0].x + nodes[1].x) / 2.0;
		let cy = (nodes[0].y + nodes[1].y) / 2.0;
		assert!((cx - 200.0).abs() < 1e-9);
		assert!((cy - 200.0).abs() < 1e-9);
	}

	#[test]
	fn axis_centering_accelerates_toward_center() {
		let vp = Viewport::new(400.0, 400.0);
		let mut nodes = vec![node(100.0, 300.0, 5.0)];
		apply_centering(&mut nodes, vp, Centering::Axis { strength: 0.1 }, 0.5);
		assert!((nodes[0].vx - 5.0).abs() < 1e-9);
		assert!((nodes[0].vy + 5.0).abs() < 1e-9);
	}

	#[test]
	fn clamp_drops_velocity_into_walls() {
		let vp = Viewport::new(200.0, 200.0);
		let mut nodes = vec![node(-5.0, 100.0, 20.0)];
		nodes[0].vx = -3.0;
		nodes[0].vy = 1.0;
		clamp_to_bounds(&mut nodes, vp);
		assert_eq!((nodes[0].x, nodes[0].y), (20.0, 100.0));
		assert_eq!(nodes[0].vx, 0.0);
		assert_eq!(nodes[0].vy, 1.0);
	}
}
