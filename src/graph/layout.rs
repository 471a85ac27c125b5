//! Force-directed layout with simulated cooling.
//!
//! Every step applies four forces (link springs, pairwise charge, centering,
//! collision), integrates velocities and lowers `alpha`. The caller drives one
//! step per animation frame; nothing here loops to completion.

use std::f64::consts::PI;

use log::debug;
use serde::Deserialize;

use super::model::GraphModel;

/// Simulation parameters.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Rest length of the link springs.
	pub link_distance: f64,
	/// Pairwise charge. Negative values repel.
	pub charge_strength: f64,
	/// Collision radius of a node; two nodes keep `2 * collision_radius` apart.
	pub collision_radius: f64,
	/// Fraction of the centroid offset removed per step.
	pub center_strength: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub velocity_decay: f64,
	/// Alpha the simulation is held at while a node is being dragged.
	pub drag_alpha_target: f64,
	/// Mean per-node displacement below which a cooled layout counts as settled.
	pub settle_threshold: f64,
	/// Radius of the circle unplaced nodes start on.
	pub initial_radius: f64,
	pub seed: u64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			link_distance: 100.0,
			charge_strength: -300.0,
			collision_radius: 40.0,
			center_strength: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			drag_alpha_target: 0.3,
			settle_threshold: 0.01,
			initial_radius: 100.0,
			seed: 0x9E37_79B9_7F4A_7C15,
		}
	}
}

/// Outcome of a single simulation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
	pub alpha: f64,
	/// Sum of the distances every node travelled during the step.
	pub displacement: f64,
	pub converged: bool,
}

#[derive(Clone, Copy, Debug)]
struct Spring {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
}

#[derive(Clone, Debug)]
pub struct ForceLayoutEngine {
	config: LayoutConfig,
	center: (f64, f64),
	alpha: f64,
	alpha_target: f64,
	velocities: Vec<(f64, f64)>,
	springs: Vec<Spring>,
	rng: XorShift64Star,
	converged: bool,
}

impl ForceLayoutEngine {
	pub fn new(model: &GraphModel, config: LayoutConfig, center: (f64, f64)) -> Self {
		let endpoints = model.link_endpoints();
		let mut degree = vec![0usize; model.nodes().len()];
		for &(s, t) in &endpoints {
			degree[s] += 1;
			degree[t] += 1;
		}

		// Self-links carry no geometric information and would blow up the spring.
		let springs = endpoints
			.into_iter()
			.filter(|(s, t)| s != t)
			.map(|(source, target)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				Spring {
					source,
					target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		let rng = XorShift64Star::new(config.seed);
		Self {
			config,
			center,
			alpha: 1.0,
			alpha_target: 0.0,
			velocities: vec![(0.0, 0.0); model.nodes().len()],
			springs,
			rng,
			converged: false,
		}
	}

	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn is_running(&self) -> bool {
		!self.converged
	}

	pub fn set_center(&mut self, x: f64, y: f64) {
		self.center = (x, y);
	}

	/// Give every node without a finite position a starting point on a circle
	/// around the center. Pinned nodes start at their pin.
	pub fn place_unplaced(&mut self, model: &mut GraphModel) {
		let (cx, cy) = self.center;
		let radius = self.config.initial_radius;
		let nodes = model.nodes_mut();
		let n = nodes.len().max(1) as f64;
		for (i, node) in nodes.iter_mut().enumerate() {
			if let Some(fx) = node.fx {
				node.x = fx;
			}
			if let Some(fy) = node.fy {
				node.y = fy;
			}
			if node.is_placed() {
				continue;
			}
			let angle = (i as f64) * 2.0 * PI / n;
			node.x = cx + radius * angle.cos();
			node.y = cy + radius * angle.sin();
		}
	}

	/// Full re-layout from the current positions.
	pub fn restart(&mut self) {
		self.alpha = 1.0;
		self.converged = false;
	}

	/// Keep the simulation warm, e.g. while the user drags a node.
	pub fn reheat(&mut self, target: f64) {
		self.alpha_target = target;
		self.converged = false;
	}

	/// Let the simulation cool down again.
	pub fn release(&mut self) {
		self.alpha_target = 0.0;
	}

	pub fn step(&mut self, model: &mut GraphModel) -> StepReport {
		let nodes = model.nodes_mut();
		if nodes.is_empty() {
			self.converged = true;
			return StepReport {
				alpha: self.alpha,
				displacement: 0.0,
				converged: true,
			};
		}

		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		let alpha = self.alpha;
		let before: Vec<(f64, f64)> = nodes.iter().map(|n| (n.x, n.y)).collect();
		let mut pos = before.clone();

		self.apply_springs(&pos, alpha);
		self.apply_charge(&pos, alpha);
		self.apply_centering(&mut pos);
		self.apply_collision(&pos);

		let keep = 1.0 - self.config.velocity_decay;
		let mut displacement = 0.0;
		for (i, node) in nodes.iter_mut().enumerate() {
			let v = &mut self.velocities[i];
			match node.fx {
				Some(fx) => {
					node.x = fx;
					v.0 = 0.0;
				}
				None => {
					v.0 *= keep;
					node.x = pos[i].0 + v.0;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					v.1 = 0.0;
				}
				None => {
					v.1 *= keep;
					node.y = pos[i].1 + v.1;
				}
			}
			displacement += (node.x - before[i].0).hypot(node.y - before[i].1);
		}

		let mean = displacement / nodes.len() as f64;
		let settled = self.alpha_target < self.config.alpha_min && mean < self.config.settle_threshold;
		if !self.converged && (alpha < self.config.alpha_min || settled) {
			debug!("Layout converged at alpha {alpha:.4} (mean displacement {mean:.4})");
			self.converged = true;
		}

		StepReport {
			alpha,
			displacement,
			converged: self.converged,
		}
	}

	fn apply_springs(&mut self, pos: &[(f64, f64)], alpha: f64) {
		let distance = self.config.link_distance;
		for k in 0..self.springs.len() {
			let Spring {
				source,
				target,
				strength,
				bias,
			} = self.springs[k];
			let (vs, vt) = (self.velocities[source], self.velocities[target]);
			let mut dx = pos[target].0 + vt.0 - pos[source].0 - vs.0;
			let mut dy = pos[target].1 + vt.1 - pos[source].1 - vs.1;
			if dx == 0.0 {
				dx = self.rng.jiggle();
			}
			if dy == 0.0 {
				dy = self.rng.jiggle();
			}
			let len = dx.hypot(dy);
			let pull = (len - distance) / len * alpha * strength;
			let (fx, fy) = (dx * pull, dy * pull);

			self.velocities[target].0 -= fx * bias;
			self.velocities[target].1 -= fy * bias;
			self.velocities[source].0 += fx * (1.0 - bias);
			self.velocities[source].1 += fy * (1.0 - bias);
		}
	}

	fn apply_charge(&mut self, pos: &[(f64, f64)], alpha: f64) {
		let strength = self.config.charge_strength;
		if strength == 0.0 {
			return;
		}
		let n = pos.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let mut dx = pos[j].0 - pos[i].0;
				let mut dy = pos[j].1 - pos[i].1;
				if dx == 0.0 {
					dx = self.rng.jiggle();
				}
				if dy == 0.0 {
					dy = self.rng.jiggle();
				}
				let mut l = dx * dx + dy * dy;
				// Softens the singularity for nearly coincident nodes.
				if l < 1.0 {
					l = l.sqrt();
				}
				let w = strength * alpha / l;
				self.velocities[i].0 += dx * w;
				self.velocities[i].1 += dy * w;
				self.velocities[j].0 -= dx * w;
				self.velocities[j].1 -= dy * w;
			}
		}
	}

	fn apply_centering(&self, pos: &mut [(f64, f64)]) {
		let n = pos.len() as f64;
		let (sx, sy) = pos
			.iter()
			.fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
		let shift_x = (sx / n - self.center.0) * self.config.center_strength;
		let shift_y = (sy / n - self.center.1) * self.config.center_strength;
		for p in pos.iter_mut() {
			p.0 -= shift_x;
			p.1 -= shift_y;
		}
	}

	fn apply_collision(&mut self, pos: &[(f64, f64)]) {
		let min_sep = 2.0 * self.config.collision_radius;
		if min_sep <= 0.0 {
			return;
		}
		let n = pos.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (vi, vj) = (self.velocities[i], self.velocities[j]);
				let mut dx = (pos[i].0 + vi.0) - (pos[j].0 + vj.0);
				let mut dy = (pos[i].1 + vi.1) - (pos[j].1 + vj.1);
				let mut l = dx * dx + dy * dy;
				if l >= min_sep * min_sep {
					continue;
				}
				if dx == 0.0 {
					dx = self.rng.jiggle();
					l += dx * dx;
				}
				if dy == 0.0 {
					dy = self.rng.jiggle();
					l += dy * dy;
				}
				let d = l.sqrt();
				let push = (min_sep - d) / d * 0.5;
				self.velocities[i].0 += dx * push;
				self.velocities[i].1 += dy * push;
				self.velocities[j].0 -= dx * push;
				self.velocities[j].1 -= dy * push;
			}
		}
	}
}

#[derive(Debug, Clone)]
struct XorShift64Star {
	state: u64,
}

impl XorShift64Star {
	fn new(seed: u64) -> Self {
		Self { state: seed.max(1) }
	}

	fn next_u64(&mut self) -> u64 {
		let mut x = self.state;
		x ^= x >> 12;
		x ^= x << 25;
		x ^= x >> 27;
		self.state = x;
		x.wrapping_mul(0x2545F4914F6CDD1D_u64)
	}

	fn next_f64_unit(&mut self) -> f64 {
		let u = self.next_u64() >> 11;
		(u as f64) / ((1u64 << 53) as f64)
	}

	/// Tiny non-zero offset used to pull coincident points apart.
	fn jiggle(&mut self) -> f64 {
		let j = (self.next_f64_unit() - 0.5) * 1e-6;
		if j == 0.0 { 1e-7 } else { j }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::model::tests::model;

	fn engine(model: &mut GraphModel, config: LayoutConfig) -> ForceLayoutEngine {
		let mut engine = ForceLayoutEngine::new(model, config, (400.0, 350.0));
		engine.place_unplaced(model);
		engine
	}

	#[test]
	fn place_unplaced_seeds_finite_positions_and_respects_pins() {
		let mut m = model(&[1, 2, 3], &[(1, 2)]);
		m.nodes_mut()[2].fx = Some(5.0);
		m.nodes_mut()[2].fy = Some(6.0);
		engine(&mut m, LayoutConfig::default());

		assert!(m.nodes().iter().all(|n| n.is_placed()));
		let first = &m.nodes()[0];
		assert!((first.x - 500.0).abs() < 1e-9 && (first.y - 350.0).abs() < 1e-9);
		let pinned = &m.nodes()[2];
		assert_eq!((pinned.x, pinned.y), (5.0, 6.0));
	}

	#[test]
	fn displacement_trends_to_zero_on_connected_graph() {
		let mut m = model(&[1, 2, 3, 4, 5, 6], &[(1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 1), (1, 4)]);
		let mut engine = engine(&mut m, LayoutConfig::default());

		let mut history = Vec::new();
		let mut steps = 0;
		while engine.is_running() && steps < 1000 {
			history.push(engine.step(&mut m).displacement);
			steps += 1;
		}

		assert!(!engine.is_running(), "layout never converged");
		assert!(steps <= 301, "took {steps} steps");
		let window = 10.min(history.len());
		let early: f64 = history[..window].iter().sum::<f64>() / window as f64;
		let late: f64 = history[history.len() - window..].iter().sum::<f64>() / window as f64;
		assert!(late < early * 0.05, "early {early}, late {late}");
		assert!(history.last().unwrap() / 6.0 < 1.0);
		assert!(m.nodes().iter().all(|n| n.x.is_finite() && n.y.is_finite()));
	}

	#[test]
	fn pinned_node_never_moves() {
		let mut m = model(&[1, 2, 3], &[(1, 2), (2, 3)]);
		let mut engine = engine(&mut m, LayoutConfig::default());
		m.pin(2, 0.0, 0.0).unwrap();

		let start: Vec<(f64, f64)> = m.nodes().iter().map(|n| (n.x, n.y)).collect();
		for _ in 0..100 {
			engine.step(&mut m);
			let pinned = m.find_node(2).unwrap();
			assert_eq!((pinned.x, pinned.y), (0.0, 0.0));
		}
		let moved = &m.nodes()[0];
		assert_ne!((moved.x, moved.y), start[0]);
	}

	#[test]
	fn single_axis_pin_leaves_other_axis_free() {
		let mut m = model(&[1, 2, 3], &[(1, 2)]);
		let mut engine = engine(&mut m, LayoutConfig::default());
		let (x0, y0) = (m.nodes()[0].x, m.nodes()[0].y);
		m.nodes_mut()[0].fx = Some(x0);

		for _ in 0..50 {
			engine.step(&mut m);
			assert_eq!(m.nodes()[0].x, x0);
		}
		assert!(m.nodes()[0].y.is_finite());
		assert_ne!(m.nodes()[0].y, y0);
		assert!(m.nodes()[0].fy.is_none());
	}

	#[test]
	fn collision_keeps_nodes_apart() {
		let mut m = model(&[1, 2], &[]);
		m.nodes_mut()[0].x = 0.0;
		m.nodes_mut()[0].y = 0.0;
		m.nodes_mut()[1].x = 10.0;
		m.nodes_mut()[1].y = 0.0;
		let config = LayoutConfig {
			charge_strength: 0.0,
			center_strength: 0.0,
			..LayoutConfig::default()
		};
		let mut engine = engine(&mut m, config);
		for _ in 0..50 {
			engine.step(&mut m);
		}

		let (a, b) = (&m.nodes()[0], &m.nodes()[1]);
		assert!((a.x - b.x).hypot(a.y - b.y) >= 80.0);
	}

	#[test]
	fn reheat_wakes_a_converged_layout() {
		let mut m = model(&[1, 2], &[(1, 2)]);
		let mut engine = engine(&mut m, LayoutConfig::default());
		while engine.is_running() {
			engine.step(&mut m);
		}

		engine.reheat(0.3);
		assert!(engine.is_running());
		for _ in 0..400 {
			engine.step(&mut m);
		}
		assert!(engine.is_running());
		assert!((engine.alpha() - 0.3).abs() < 0.01);

		engine.release();
		assert_eq!(engine.alpha_target(), 0.0);
	}

	#[test]
	fn empty_graph_is_converged_immediately() {
		let mut m = model(&[], &[]);
		let mut engine = engine(&mut m, LayoutConfig::default());
		let report = engine.step(&mut m);
		assert!(report.converged);
		assert_eq!(report.displacement, 0.0);
	}
}
