use std::collections::HashMap;

use log::{debug, warn};

use super::scale::RadiusScale;
use super::simulation::{
	LinkEnds, NodeHandle, Simulation, SimulationConfig, index_nodes, resolve_link,
};
use super::types::{GraphData, GraphLink, GraphNode};

pub const LABEL_OFFSET: f64 = 10.0;
pub const TOOLTIP_OFFSET: f64 = 15.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Counts incident links per id. Every node starts at zero; a self-loop
/// counts twice.
pub fn degree_map(nodes: &[GraphNode], links: &[GraphLink]) -> HashMap<String, usize> {
	let mut degrees: HashMap<String, usize> = nodes.iter().map(|n| (n.id.clone(), 0)).collect();
	for link in links {
		for id in [link.source.id(), link.target.id()].into_iter().flatten() {
			*degrees.entry(id.to_string()).or_insert(0) += 1;
		}
	}
	degrees
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LinkLine {
	pub ends: LinkEnds,
	pub from: Point,
	pub to: Point,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeCircle {
	pub id: String,
	pub radius: f64,
	pub center: Point,
	pub label: Point,
}

/// Coordinates of every visual element as of the last completed tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub lines: Vec<LinkLine>,
	pub circles: Vec<NodeCircle>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tooltip {
	pub text: String,
	pub visible: bool,
	pub left: f64,
	pub top: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClientRect {
	pub left: f64,
	pub top: f64,
	pub width: f64,
	pub height: f64,
}

/// A `viewBox` of the container's size centred on the origin, fitted into
/// the element with `xMidYMid meet`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub fn min_x(&self) -> f64 {
		-self.width / 2.0
	}

	pub fn min_y(&self) -> f64 {
		-self.height / 2.0
	}

	pub fn view_box(&self) -> String {
		format!("{} {} {} {}", self.min_x(), self.min_y(), self.width, self.height)
	}

	pub fn to_scene(&self, client: Point, rect: ClientRect) -> Point {
		let scale = (rect.width / self.width).min(rect.height / self.height);
		if !scale.is_finite() || scale <= 0.0 {
			return Point::new(client.x - rect.left, client.y - rect.top);
		}
		let (ox, oy) = (
			(rect.width - self.width * scale) / 2.0,
			(rect.height - self.height * scale) / 2.0,
		);
		Point::new(
			(client.x - rect.left - ox) / scale + self.min_x(),
			(client.y - rect.top - oy) / scale + self.min_y(),
		)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragGesture {
	pub node: NodeHandle,
	pub start: Point,
	pub node_start: Point,
}

pub struct ForceGraphState {
	pub simulation: Simulation,
	pub scene: Scene,
	pub tooltip: Tooltip,
	pub viewport: Viewport,
	drags: HashMap<i32, DragGesture>,
	dirty: bool,
	torn_down: bool,
}

impl ForceGraphState {
	/// Builds a fresh simulation over copies of `data`. Returns `None` when
	/// there is nothing to draw or the container has not been measured yet.
	pub fn new(data: &GraphData, width: f64, height: f64) -> Option<Self> {
		Self::with_config(data, width, height, SimulationConfig::default(), RadiusScale::default())
	}

	pub fn with_config(
		data: &GraphData,
		width: f64,
		height: f64,
		config: SimulationConfig,
		scale: RadiusScale,
	) -> Option<Self> {
		if data.nodes.is_empty() || width <= 0.0 || height <= 0.0 {
			return None;
		}
		let nodes = data.nodes.clone();
		let links = data.links.clone();

		let degrees = degree_map(&nodes, &links);
		let radii: Vec<f64> = nodes
			.iter()
			.map(|n| scale.radius(degrees.get(&n.id).copied().unwrap_or(0)))
			.collect();

		let index = index_nodes(nodes.iter().map(|n| n.id.as_str()));
		let mut resolved = Vec::with_capacity(links.len());
		let lines: Vec<LinkLine> = links
			.iter()
			.map(|link| {
				let ends = resolve_link(&index, link);
				match ends.resolved() {
					Some(r) => resolved.push(r),
					None => warn!(
						"link {:?} -> {:?} references an unknown node",
						link.source.id(),
						link.target.id()
					),
				}
				LinkLine {
					ends,
					..LinkLine::default()
				}
			})
			.collect();

		let circles = nodes
			.iter()
			.zip(&radii)
			.map(|(node, &radius)| NodeCircle {
				id: node.id.clone(),
				radius,
				center: Point::default(),
				label: Point::default(),
			})
			.collect();

		let ids = nodes.into_iter().map(|n| n.id).collect();
		let simulation = Simulation::new(ids, resolved, &radii, config);
		debug!(
			"force graph ready: {} nodes, {} links ({} resolved)",
			simulation.nodes().len(),
			lines.len(),
			simulation.links().len()
		);

		let mut state = Self {
			simulation,
			scene: Scene { lines, circles },
			tooltip: Tooltip::default(),
			viewport: Viewport { width, height },
			drags: HashMap::new(),
			dirty: true,
			torn_down: false,
		};
		state.sync_scene();
		Some(state)
	}

	/// Advances the simulation by one tick when it is running and mirrors the
	/// new positions into the scene.
	pub fn step(&mut self) -> bool {
		if self.torn_down || !self.simulation.step() {
			return false;
		}
		self.sync_scene();
		true
	}

	/// Reports and clears pending hover/drag changes that need a repaint.
	pub fn take_dirty(&mut self) -> bool {
		std::mem::take(&mut self.dirty)
	}

	fn position(&self, handle: Option<NodeHandle>) -> Point {
		handle
			.and_then(|h| self.simulation.node(h))
			.map(|n| Point::new(n.x, n.y))
			.unwrap_or_default()
	}

	fn sync_scene(&mut self) {
		let positions: Vec<(Point, Point)> = self
			.scene
			.lines
			.iter()
			.map(|line| (self.position(line.ends.source), self.position(line.ends.target)))
			.collect();
		for (line, (from, to)) in self.scene.lines.iter_mut().zip(positions) {
			line.from = from;
			line.to = to;
		}
		for (circle, node) in self.scene.circles.iter_mut().zip(self.simulation.nodes()) {
			circle.center = Point::new(node.x, node.y);
			circle.label = Point::new(node.x + LABEL_OFFSET, node.y);
		}
	}

	pub fn hover_enter(&mut self, handle: NodeHandle) {
		if let Some(node) = self.simulation.node(handle) {
			self.tooltip.text = node.id.clone();
			self.tooltip.visible = true;
			self.dirty = true;
		}
	}

	/// Tracks the pointer, given relative to the graph container.
	pub fn hover_move(&mut self, x: f64, y: f64) {
		self.tooltip.left = x + TOOLTIP_OFFSET;
		self.tooltip.top = y + TOOLTIP_OFFSET;
		self.dirty = true;
	}

	pub fn hover_leave(&mut self) {
		self.tooltip.visible = false;
		self.dirty = true;
	}

	/// Pins `handle` where it is. The first gesture reheats the simulation.
	pub fn drag_start(&mut self, pointer_id: i32, handle: NodeHandle, pointer: Point) {
		if self.torn_down {
			return;
		}
		let Some(node) = self.simulation.node(handle) else {
			return;
		};
		let node_start = Point::new(node.x, node.y);
		if self.drags.is_empty() {
			let target = self.simulation.config().reheat_target;
			self.simulation.set_alpha_target(target);
			self.simulation.restart();
		}
		self.simulation.pin(handle, node_start.x, node_start.y);
		self.drags.insert(
			pointer_id,
			DragGesture {
				node: handle,
				start: pointer,
				node_start,
			},
		);
		self.dirty = true;
	}

	pub fn drag_move(&mut self, pointer_id: i32, pointer: Point) {
		let Some(drag) = self.drags.get(&pointer_id).copied() else {
			return;
		};
		let (x, y) = (
			drag.node_start.x + pointer.x - drag.start.x,
			drag.node_start.y + pointer.y - drag.start.y,
		);
		self.simulation.pin(drag.node, x, y);
	}

	/// Releases the node held by `pointer_id`; the last gesture lets the
	/// simulation cool again.
	pub fn drag_end(&mut self, pointer_id: i32) -> Option<NodeHandle> {
		let drag = self.drags.remove(&pointer_id)?;
		if self.drags.is_empty() {
			self.simulation.set_alpha_target(0.0);
		}
		self.simulation.unpin(drag.node);
		self.dirty = true;
		Some(drag.node)
	}

	pub fn is_dragging(&self) -> bool {
		!self.drags.is_empty()
	}

	pub fn cursor(&self, handle: NodeHandle) -> &'static str {
		if self.drags.values().any(|d| d.node == handle) {
			"grabbing"
		} else {
			"grab"
		}
	}

	/// Halts the simulation for good and hides the tooltip.
	pub fn teardown(&mut self) {
		self.simulation.stop();
		self.drags.clear();
		self.tooltip.visible = false;
		self.torn_down = true;
	}

	pub fn is_torn_down(&self) -> bool {
		self.torn_down
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::simulation::Pin;
	use crate::components::force_graph::types::LinkEnd;

	fn node(id: &str) -> GraphNode {
		GraphNode { id: id.to_string() }
	}

	fn triangle() -> GraphData {
		GraphData {
			nodes: vec![node("A"), node("B"), node("C")],
			links: vec![
				GraphLink::new("A", "B"),
				GraphLink::new("A", "B"),
				GraphLink::new("A", "C"),
			],
			sample_quotes: vec![],
		}
	}

	fn centers(state: &ForceGraphState) -> Vec<Point> {
		state.scene.circles.iter().map(|c| c.center).collect()
	}

	#[test]
	fn degrees_count_both_endpoints() {
		let mut data = triangle();
		data.links.push(GraphLink::new("C", "C"));
		data.links.push(GraphLink::new("A", "Ghost"));
		let degrees = degree_map(&data.nodes, &data.links);
		assert_eq!(degrees["A"], 4);
		assert_eq!(degrees["B"], 2);
		assert_eq!(degrees["C"], 3);
		assert_eq!(degrees["Ghost"], 1);
	}

	#[test]
	fn radii_follow_degree() {
		let state = ForceGraphState::new(&triangle(), 800.0, 600.0).unwrap();
		let radii: Vec<f64> = state.scene.circles.iter().map(|c| c.radius).collect();
		assert_eq!(radii, vec![17.0, 14.0, 11.0]);
	}

	#[test]
	fn empty_or_unmeasured_input_renders_nothing() {
		assert!(ForceGraphState::new(&GraphData::default(), 800.0, 600.0).is_none());
		assert!(ForceGraphState::new(&triangle(), 0.0, 600.0).is_none());
		assert!(ForceGraphState::new(&triangle(), 800.0, 0.0).is_none());
	}

	#[test]
	fn does_not_touch_input() {
		let data = triangle();
		let copy = data.clone();
		let mut state = ForceGraphState::new(&data, 800.0, 600.0).unwrap();
		for _ in 0..10 {
			state.step();
		}
		assert_eq!(data, copy);
	}

	#[test]
	fn tick_moves_lines_circles_and_labels_together() {
		let mut state = ForceGraphState::new(&triangle(), 800.0, 600.0).unwrap();
		assert!(state.step());
		let a = state.scene.circles[0].center;
		let c = state.scene.circles[2].center;
		assert_eq!(state.scene.lines[2].from, a);
		assert_eq!(state.scene.lines[2].to, c);
		assert_eq!(state.scene.circles[0].label, Point::new(a.x + LABEL_OFFSET, a.y));
	}

	#[test]
	fn unknown_endpoints_fall_back_to_origin() {
		let mut data = triangle();
		data.links.push(GraphLink::new("A", "Nobody"));
		let mut state = ForceGraphState::new(&data, 800.0, 600.0).unwrap();
		assert_eq!(state.simulation.links().len(), 3);
		for _ in 0..5 {
			state.step();
		}
		let line = &state.scene.lines[3];
		assert_eq!(line.to, Point::default());
		assert_eq!(line.from, state.scene.circles[0].center);
	}

	#[test]
	fn id_and_object_endpoints_simulate_identically() {
		let by_id = triangle();
		let mut by_object = triangle();
		for link in &mut by_object.links {
			link.source = LinkEnd::Node {
				id: link.source.id().map(str::to_string),
			};
			link.target = LinkEnd::Node {
				id: link.target.id().map(str::to_string),
			};
		}

		let mut a = ForceGraphState::new(&by_id, 800.0, 600.0).unwrap();
		let mut b = ForceGraphState::new(&by_object, 800.0, 600.0).unwrap();
		for _ in 0..50 {
			a.step();
			b.step();
		}
		assert_eq!(centers(&a), centers(&b));
	}

	#[test]
	fn drag_pins_until_release() {
		let mut state = ForceGraphState::new(&triangle(), 800.0, 600.0).unwrap();
		while state.step() {}
		assert!(!state.simulation.is_running());

		let b = NodeHandle(1);
		let start = state.scene.circles[1].center;
		state.drag_start(1, b, Point::new(5.0, 5.0));
		assert!(state.simulation.is_running());
		assert_eq!(state.simulation.alpha_target(), 0.3);
		assert_eq!(state.cursor(b), "grabbing");
		assert_eq!(state.cursor(NodeHandle(0)), "grab");

		state.drag_move(1, Point::new(45.0, -15.0));
		let held = Point::new(start.x + 45.0 - 5.0, start.y + -15.0 - 5.0);
		for _ in 0..20 {
			state.step();
			assert_eq!(state.scene.circles[1].center, held);
		}

		assert_eq!(state.drag_end(1), Some(b));
		assert_eq!(state.simulation.node(b).unwrap().pin, Pin::Free);
		assert_eq!(state.simulation.alpha_target(), 0.0);
		assert_eq!(state.cursor(b), "grab");

		state.step();
		assert_ne!(state.scene.circles[1].center, held);
	}

	#[test]
	fn concurrent_drags_keep_simulation_warm() {
		let mut state = ForceGraphState::new(&triangle(), 800.0, 600.0).unwrap();
		state.drag_start(1, NodeHandle(0), Point::default());
		state.drag_start(2, NodeHandle(2), Point::default());
		state.drag_end(1);
		assert_eq!(state.simulation.alpha_target(), 0.3);
		assert!(state.is_dragging());
		state.drag_end(2);
		assert_eq!(state.simulation.alpha_target(), 0.0);
		assert!(!state.is_dragging());
		assert_eq!(state.drag_end(2), None);
	}

	#[test]
	fn tooltip_follows_hover() {
		let mut state = ForceGraphState::new(&triangle(), 800.0, 600.0).unwrap();
		state.take_dirty();
		state.hover_enter(NodeHandle(2));
		state.hover_move(100.0, 40.0);
		assert!(state.take_dirty());
		assert_eq!(state.tooltip.text, "C");
		assert!(state.tooltip.visible);
		assert_eq!((state.tooltip.left, state.tooltip.top), (115.0, 55.0));

		state.hover_leave();
		assert!(!state.tooltip.visible);
	}

	#[test]
	fn teardown_freezes_positions() {
		let mut state = ForceGraphState::new(&triangle(), 800.0, 600.0).unwrap();
		state.step();
		state.hover_enter(NodeHandle(1));
		state.teardown();
		let frozen = centers(&state);
		assert!(!state.tooltip.visible);

		assert!(!state.step());
		state.drag_start(1, NodeHandle(0), Point::default());
		assert!(!state.step());
		assert_eq!(centers(&state), frozen);
		assert!(state.is_torn_down());
	}

	#[test]
	fn client_points_map_into_view_box() {
		let viewport = Viewport {
			width: 800.0,
			height: 600.0,
		};
		assert_eq!(viewport.view_box(), "-400 -300 800 600");

		let rect = ClientRect {
			left: 10.0,
			top: 20.0,
			width: 400.0,
			height: 600.0,
		};
		// Scaled by 0.5 and letterboxed vertically by 150px.
		let p = viewport.to_scene(Point::new(210.0, 320.0), rect);
		assert_eq!(p, Point::new(0.0, 0.0));
		let p = viewport.to_scene(Point::new(10.0, 170.0), rect);
		assert_eq!(p, Point::new(-400.0, -300.0));
	}
}
