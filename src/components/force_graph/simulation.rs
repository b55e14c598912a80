//! Velocity-Verlet force simulation with alpha cooling.
//!
//! Forces run in a fixed order each tick: link springs, many-body repulsion,
//! then collision. Every force only adjusts velocities; positions are
//! integrated once at the end of the tick, where pinned nodes are snapped to
//! their pin instead.

use std::collections::HashMap;
use std::f64::consts::PI;

use super::types::GraphLink;

/// Index of a node inside a [`Simulation`]. Carries no ownership.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub usize);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Pin {
	#[default]
	Free,
	PinnedAt(f64, f64),
}

#[derive(Clone, Debug)]
pub struct SimNode {
	pub id: String,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub pin: Pin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedLink {
	pub source: NodeHandle,
	pub target: NodeHandle,
}

/// Endpoints of a link after id lookup. `None` marks an id with no node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LinkEnds {
	pub source: Option<NodeHandle>,
	pub target: Option<NodeHandle>,
}

impl LinkEnds {
	pub fn resolved(&self) -> Option<ResolvedLink> {
		Some(ResolvedLink {
			source: self.source?,
			target: self.target?,
		})
	}
}

/// Maps node ids to handles. A repeated id resolves to its last node.
pub fn index_nodes<'a>(ids: impl IntoIterator<Item = &'a str>) -> HashMap<String, NodeHandle> {
	ids.into_iter()
		.enumerate()
		.map(|(i, id)| (id.to_string(), NodeHandle(i)))
		.collect()
}

pub fn resolve_link(index: &HashMap<String, NodeHandle>, link: &GraphLink) -> LinkEnds {
	LinkEnds {
		source: link.source.id().and_then(|id| index.get(id).copied()),
		target: link.target.id().and_then(|id| index.get(id).copied()),
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
	pub link_distance: f64,
	pub link_strength: f64,
	/// Many-body strength; negative repels.
	pub charge: f64,
	/// Lower bound on squared distance in the many-body force.
	pub charge_distance_min2: f64,
	/// Extra room added to each display radius by the collision force.
	pub collide_margin: f64,
	pub collide_strength: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Alpha target while a node is being dragged.
	pub reheat_target: f64,
}

impl Default for SimulationConfig {
	fn default() -> Self {
		let alpha_min = 0.001_f64;
		Self {
			link_distance: 150.0,
			link_strength: 1.0,
			charge: -500.0,
			charge_distance_min2: 1.0,
			collide_margin: 5.0,
			collide_strength: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			reheat_target: 0.3,
		}
	}
}

const INITIAL_RADIUS: f64 = 10.0;

// Deterministic LCG used only to separate coincident points.
#[derive(Clone, Debug)]
struct Lcg(u64);

impl Lcg {
	const A: u64 = 1_664_525;
	const C: u64 = 1_013_904_223;
	const M: u64 = 1 << 32;

	fn next(&mut self) -> f64 {
		self.0 = (Self::A.wrapping_mul(self.0).wrapping_add(Self::C)) % Self::M;
		self.0 as f64 / Self::M as f64
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

pub struct Simulation {
	nodes: Vec<SimNode>,
	links: Vec<ResolvedLink>,
	link_bias: Vec<f64>,
	collide_radii: Vec<f64>,
	config: SimulationConfig,
	alpha: f64,
	alpha_target: f64,
	running: bool,
	lcg: Lcg,
}

impl Simulation {
	/// Lays nodes out on a phyllotaxis spiral and starts the simulation hot.
	/// `radii` are display radii, indexed like `ids`.
	pub fn new(
		ids: Vec<String>,
		links: Vec<ResolvedLink>,
		radii: &[f64],
		config: SimulationConfig,
	) -> Self {
		let initial_angle = PI * (3.0 - 5.0_f64.sqrt());
		let nodes: Vec<SimNode> = ids
			.into_iter()
			.enumerate()
			.map(|(i, id)| {
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * initial_angle;
				SimNode {
					id,
					x: radius * angle.cos(),
					y: radius * angle.sin(),
					vx: 0.0,
					vy: 0.0,
					pin: Pin::Free,
				}
			})
			.collect();

		let mut count = vec![0usize; nodes.len()];
		for link in &links {
			count[link.source.0] += 1;
			count[link.target.0] += 1;
		}
		let link_bias = links
			.iter()
			.map(|l| count[l.source.0] as f64 / (count[l.source.0] + count[l.target.0]) as f64)
			.collect();

		let collide_radii = (0..nodes.len())
			.map(|i| radii.get(i).copied().unwrap_or(0.0) + config.collide_margin)
			.collect();

		Self {
			nodes,
			links,
			link_bias,
			collide_radii,
			config,
			alpha: 1.0,
			alpha_target: 0.0,
			running: true,
			lcg: Lcg(1),
		}
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn node(&self, handle: NodeHandle) -> Option<&SimNode> {
		self.nodes.get(handle.0)
	}

	pub fn links(&self) -> &[ResolvedLink] {
		&self.links
	}

	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	#[cfg(test)]
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	#[cfg(test)]
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	#[cfg(test)]
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Resumes stepping. Alpha is left untouched; raise the target to reheat.
	pub fn restart(&mut self) {
		self.running = true;
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	pub fn pin(&mut self, handle: NodeHandle, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(handle.0) {
			node.pin = Pin::PinnedAt(x, y);
		}
	}

	pub fn unpin(&mut self, handle: NodeHandle) {
		if let Some(node) = self.nodes.get_mut(handle.0) {
			node.pin = Pin::Free;
		}
	}

	/// Advances one tick if running, then stops once alpha has cooled below
	/// `alpha_min`. Returns whether a tick happened.
	pub fn step(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.tick();
		if self.alpha < self.config.alpha_min {
			self.running = false;
		}
		true
	}

	/// Runs a single tick regardless of the running flag.
	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

		self.apply_links();
		self.apply_many_body();
		self.apply_collide();

		let keep = 1.0 - self.config.velocity_decay;
		for node in &mut self.nodes {
			match node.pin {
				Pin::Free => {
					node.vx *= keep;
					node.vy *= keep;
					node.x += node.vx;
					node.y += node.vy;
				}
				Pin::PinnedAt(fx, fy) => {
					node.x = fx;
					node.y = fy;
					node.vx = 0.0;
					node.vy = 0.0;
				}
			}
		}
	}

	fn apply_links(&mut self) {
		let (distance, strength, alpha) = (
			self.config.link_distance,
			self.config.link_strength,
			self.alpha,
		);
		for (link, &bias) in self.links.iter().zip(&self.link_bias) {
			let (s, t) = (link.source.0, link.target.0);
			let (src, tgt) = (&self.nodes[s], &self.nodes[t]);
			let mut x = tgt.x + tgt.vx - src.x - src.vx;
			let mut y = tgt.y + tgt.vy - src.y - src.vy;
			if x == 0.0 {
				x = self.lcg.jiggle();
			}
			if y == 0.0 {
				y = self.lcg.jiggle();
			}
			let l = (x * x + y * y).sqrt();
			let l = (l - distance) / l * alpha * strength;
			let (x, y) = (x * l, y * l);

			self.nodes[t].vx -= x * bias;
			self.nodes[t].vy -= y * bias;
			self.nodes[s].vx += x * (1.0 - bias);
			self.nodes[s].vy += y * (1.0 - bias);
		}
	}

	fn apply_many_body(&mut self) {
		let n = self.nodes.len();
		let weight = self.config.charge * self.alpha;
		let min2 = self.config.charge_distance_min2;
		for i in 0..n {
			let (mut dvx, mut dvy) = (0.0, 0.0);
			for j in 0..n {
				if i == j {
					continue;
				}
				let mut x = self.nodes[j].x - self.nodes[i].x;
				let mut y = self.nodes[j].y - self.nodes[i].y;
				let mut l = x * x + y * y;
				if x == 0.0 {
					x = self.lcg.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.lcg.jiggle();
					l += y * y;
				}
				if l < min2 {
					l = (min2 * l).sqrt();
				}
				dvx += x * weight / l;
				dvy += y * weight / l;
			}
			self.nodes[i].vx += dvx;
			self.nodes[i].vy += dvy;
		}
	}

	fn apply_collide(&mut self) {
		let n = self.nodes.len();
		let strength = self.config.collide_strength;
		for i in 0..n {
			let ri = self.collide_radii[i];
			let ri2 = ri * ri;
			let xi = self.nodes[i].x + self.nodes[i].vx;
			let yi = self.nodes[i].y + self.nodes[i].vy;
			for j in (i + 1)..n {
				let rj = self.collide_radii[j];
				let r = ri + rj;
				let other = &self.nodes[j];
				let mut x = xi - other.x - other.vx;
				let mut y = yi - other.y - other.vy;
				let mut l = x * x + y * y;
				if l >= r * r {
					continue;
				}
				if x == 0.0 {
					x = self.lcg.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.lcg.jiggle();
					l += y * y;
				}
				let l = l.sqrt();
				let k = (r - l) / l * strength;
				let (x, y) = (x * k, y * k);
				let share = rj * rj / (ri2 + rj * rj);

				self.nodes[i].vx += x * share;
				self.nodes[i].vy += y * share;
				self.nodes[j].vx -= x * (1.0 - share);
				self.nodes[j].vy -= y * (1.0 - share);
			}
		}
	}
}
