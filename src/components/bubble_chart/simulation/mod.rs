//! Force simulation driving bubble positions.
//!
//! Each tick cools the simulation temperature (`alpha`) toward its target,
//! applies centering, charge and collision, integrates velocities, and
//! finally clamps every node into the viewport. Once `alpha` drops below
//! [`SimulationConfig::alpha_min`] with a resting target, the simulation is
//! settled and stops moving nodes until something re-energizes it.
//!
//! [`Engine`] owns at most one [`ForceSimulation`] at a time. Starting a new
//! one always stops the previous instance first.

mod forces;

use log::{debug, info};

pub use forces::Centering;

use super::state::NodeStore;
use super::viewport::Viewport;

/// Tunable physics constants.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
	/// Pairwise charge; positive values push bubbles apart.
	pub charge: f64,
	/// How nodes are pulled toward the viewport center.
	pub centering: Centering,
	/// Extra spacing added to each radius during collision.
	pub collision_padding: f64,
	/// Share of each overlap resolved per collision pass.
	pub collision_strength: f64,
	/// Collision passes per tick.
	pub collision_iterations: usize,
	/// Fraction of velocity removed every tick.
	pub velocity_decay: f64,
	/// Alpha below which the simulation is settled.
	pub alpha_min: f64,
	/// Per-tick fraction by which alpha approaches its target.
	pub alpha_decay: f64,
	/// Alpha target while a bubble is being dragged.
	pub drag_alpha_target: f64,
	/// Spacing of the initial spiral placement, in pixels.
	pub initial_spacing: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min: f64 = 0.001;
		Self {
			charge: 2.0,
			centering: Centering::Mean { strength: 1.0 },
			collision_padding: 4.0,
			collision_strength: 1.0,
			collision_iterations: 2,
			velocity_decay: 0.4,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			drag_alpha_target: 0.3,
			initial_spacing: 24.0,
		}
	}
}

/// A running simulation bound to one viewport and node count.
#[derive(Clone, Debug)]
pub struct ForceSimulation {
	config: SimulationConfig,
	viewport: Viewport,
	node_count: usize,
	alpha: f64,
	alpha_target: f64,
	energy: f64,
	ticks: u64,
}

impl ForceSimulation {
	/// Start a simulation, or `None` when there is nothing to simulate or the
	/// viewport is unusable.
	pub fn start(config: SimulationConfig, viewport: Viewport, node_count: usize) -> Option<Self> {
		if node_count == 0 || !viewport.is_valid() {
			return None;
		}
		Some(Self {
			config,
			viewport,
			node_count,
			alpha: 1.0,
			alpha_target: 0.0,
			energy: 0.0,
			ticks: 0,
		})
	}

	/// Current temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Viewport the simulation was started for.
	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	/// Node count the simulation was started for.
	pub fn node_count(&self) -> usize {
		self.node_count
	}

	/// Velocity magnitude summed over all nodes after the last tick.
	pub fn energy(&self) -> f64 {
		self.energy
	}

	/// Ticks run since start.
	pub fn ticks(&self) -> u64 {
		self.ticks
	}

	/// Temperature that alpha decays toward.
	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target.clamp(0.0, 1.0);
	}

	/// Raise the temperature back to `alpha`.
	pub fn reheat(&mut self, alpha: f64) {
		self.alpha = self.alpha.max(alpha.clamp(0.0, 1.0));
	}

	/// Cooled below `alpha_min` and not being held warm.
	pub fn is_settled(&self) -> bool {
		self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min
	}

	/// Advance one step. Returns `false` when settled and nothing moved.
	///
	/// The store is left untouched if its node count no longer matches the
	/// count this simulation was started for.
	pub fn tick(&mut self, store: &mut NodeStore) -> bool {
		if self.is_settled() || store.len() != self.node_count {
			return false;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		let alpha = self.alpha;
		let cfg = &self.config;
		let nodes = store.nodes_mut();

		forces::apply_centering(nodes, self.viewport, cfg.centering, alpha);
		forces::apply_charge(nodes, cfg.charge, alpha);
		forces::apply_collision(
			nodes,
			cfg.collision_padding,
			cfg.collision_strength,
			cfg.collision_iterations,
		);
		forces::integrate(nodes, cfg.velocity_decay);
		forces::clamp_to_bounds(nodes, self.viewport);

		self.energy = forces::kinetic_energy(nodes);
		self.ticks += 1;
		if self.is_settled() {
			debug!(
				"simulation settled after {} ticks (energy {:.4})",
				self.ticks, self.energy
			);
		}
		true
	}
}

/// Slot holding the single live simulation, if any.
#[derive(Debug, Default)]
pub struct Engine {
	current: Option<ForceSimulation>,
	generation: u64,
}

impl Engine {
	/// Whether a simulation is alive.
	pub fn is_running(&self) -> bool {
		self.current.is_some()
	}

	/// Incremented on every successful start.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// The live simulation, if any.
	pub fn simulation(&self) -> Option<&ForceSimulation> {
		self.current.as_ref()
	}

	/// Mutable access to the live simulation.
	pub fn simulation_mut(&mut self) -> Option<&mut ForceSimulation> {
		self.current.as_mut()
	}

	/// Stop the current simulation. Idempotent.
	pub fn stop(&mut self) {
		if let Some(sim) = self.current.take() {
			debug!("engine stopped after {} ticks", sim.ticks());
		}
	}

	/// Stop any running simulation, then start a new one.
	///
	/// Leaves the engine stopped when the store is empty or the viewport is
	/// missing or invalid. Returns whether a simulation is now running.
	pub fn restart(
		&mut self,
		config: &SimulationConfig,
		viewport: Option<Viewport>,
		node_count: usize,
	) -> bool {
		self.stop();
		let Some(viewport) = viewport else {
			debug!("engine start deferred: no viewport yet");
			return false;
		};
		match ForceSimulation::start(config.clone(), viewport, node_count) {
			Some(sim) => {
				self.generation += 1;
				info!(
					"engine started: {} nodes in {}x{}",
					node_count, viewport.width, viewport.height
				);
				self.current = Some(sim);
				true
			}
			None => {
				debug!(
					"engine not started: {} nodes, viewport {}x{}",
					node_count, viewport.width, viewport.height
				);
				false
			}
		}
	}

	/// Advance the running simulation. Returns whether positions changed.
	pub fn tick(&mut self, store: &mut NodeStore) -> bool {
		match self.current.as_mut() {
			Some(sim) => sim.tick(store),
			None => false,
		}
	}
}
