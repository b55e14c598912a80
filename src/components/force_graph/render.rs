use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

use super::simulation::NodeHandle;
use super::state::ForceGraphState;

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const NODE_FILL: &str = "#1e40af";
const NODE_ATTR: &str = "data-node";

/// The DOM mirror of a [`ForceGraphState`]: one `<line>`, `<circle>` and
/// `<text>` per scene element plus the tooltip overlay.
pub struct SvgScene {
	svg: Element,
	lines: Vec<Element>,
	circles: Vec<Element>,
	labels: Vec<Element>,
	cursors: Vec<&'static str>,
	tooltip: HtmlElement,
	tooltip_text: Element,
}

fn svg_el(document: &Document, tag: &str, attrs: &[(&str, &str)]) -> Result<Element, JsValue> {
	let el = document.create_element_ns(Some(SVG_NS), tag)?;
	for (name, value) in attrs {
		el.set_attribute(name, value)?;
	}
	Ok(el)
}

/// Reads the node index stamped on a circle by [`SvgScene::build`].
pub fn node_index(el: &Element) -> Option<usize> {
	el.get_attribute(NODE_ATTR)?.parse().ok()
}

impl SvgScene {
	pub fn build(
		document: &Document,
		container: &HtmlElement,
		state: &ForceGraphState,
	) -> Result<Self, JsValue> {
		let (height, view_box) = (state.viewport.height.to_string(), state.viewport.view_box());
		let svg = svg_el(
			document,
			"svg",
			&[
				("width", "100%"),
				("height", height.as_str()),
				("viewBox", view_box.as_str()),
				("preserveAspectRatio", "xMidYMid meet"),
				("style", "display: block; margin: 0 auto;"),
			],
		)?;

		let link_group = svg_el(document, "g", &[("stroke", "#ccc"), ("stroke-opacity", "0.7")])?;
		let lines = state
			.scene
			.lines
			.iter()
			.map(|_| {
				let line = svg_el(document, "line", &[("stroke-width", "1.5")])?;
				link_group.append_child(&line)?;
				Ok::<_, JsValue>(line)
			})
			.collect::<Result<Vec<_>, JsValue>>()?;

		let node_group = svg_el(document, "g", &[("stroke", "#fff"), ("stroke-width", "1.5")])?;
		let circles = state
			.scene
			.circles
			.iter()
			.enumerate()
			.map(|(i, c)| {
				let (r, index) = (c.radius.to_string(), i.to_string());
				let circle = svg_el(
					document,
					"circle",
					&[
						("r", r.as_str()),
						("fill", NODE_FILL),
						("style", "cursor: grab; touch-action: none;"),
						(NODE_ATTR, index.as_str()),
					],
				)?;
				node_group.append_child(&circle)?;
				Ok::<_, JsValue>(circle)
			})
			.collect::<Result<Vec<_>, JsValue>>()?;

		let label_group = svg_el(document, "g", &[])?;
		let labels = state
			.scene
			.circles
			.iter()
			.map(|c| {
				let text = svg_el(
					document,
					"text",
					&[
						("font-size", "13"),
						("fill", "#000"),
						("dy", "0.35em"),
						("style", "pointer-events: none; user-select: none;"),
					],
				)?;
				text.set_text_content(Some(c.id.as_str()));
				label_group.append_child(&text)?;
				Ok::<_, JsValue>(text)
			})
			.collect::<Result<Vec<_>, JsValue>>()?;

		svg.append_child(&link_group)?;
		svg.append_child(&node_group)?;
		svg.append_child(&label_group)?;
		container.append_child(&svg)?;

		let tooltip: HtmlElement = document.create_element("div")?.dyn_into()?;
		tooltip.set_attribute(
			"style",
			"position: absolute; padding: 6px 10px; background: rgba(0,0,0,0.85); \
			 color: #fff; border-radius: 6px; pointer-events: none; font-size: 13px; \
			 opacity: 0; transition: opacity 0.3s ease;",
		)?;
		let tooltip_text = document.create_element("strong")?;
		tooltip.append_child(&tooltip_text)?;
		container.append_child(&tooltip)?;

		let cursors = vec!["grab"; circles.len()];
		let mut scene = Self {
			svg,
			lines,
			circles,
			labels,
			cursors,
			tooltip,
			tooltip_text,
		};
		scene.render(state)?;
		Ok(scene)
	}

	pub fn svg(&self) -> &Element {
		&self.svg
	}

	/// Writes the latest tick's coordinates, cursors and tooltip to the DOM.
	pub fn render(&mut self, state: &ForceGraphState) -> Result<(), JsValue> {
		self.draw_links(state)?;
		self.draw_nodes(state)?;
		self.draw_tooltip(state)
	}

	fn draw_links(&self, state: &ForceGraphState) -> Result<(), JsValue> {
		for (el, line) in self.lines.iter().zip(&state.scene.lines) {
			el.set_attribute("x1", &line.from.x.to_string())?;
			el.set_attribute("y1", &line.from.y.to_string())?;
			el.set_attribute("x2", &line.to.x.to_string())?;
			el.set_attribute("y2", &line.to.y.to_string())?;
		}
		Ok(())
	}

	fn draw_nodes(&mut self, state: &ForceGraphState) -> Result<(), JsValue> {
		let circles = self.circles.iter().zip(&self.labels).zip(&state.scene.circles);
		for (i, ((circle, label), node)) in circles.enumerate() {
			circle.set_attribute("cx", &node.center.x.to_string())?;
			circle.set_attribute("cy", &node.center.y.to_string())?;
			label.set_attribute("x", &node.label.x.to_string())?;
			label.set_attribute("y", &node.label.y.to_string())?;

			let cursor = state.cursor(NodeHandle(i));
			if self.cursors[i] != cursor {
				circle.set_attribute("style", &format!("cursor: {cursor}; touch-action: none;"))?;
				self.cursors[i] = cursor;
			}
		}
		Ok(())
	}

	fn draw_tooltip(&self, state: &ForceGraphState) -> Result<(), JsValue> {
		let tip = &state.tooltip;
		let style = self.tooltip.style();
		if tip.visible {
			self.tooltip_text.set_text_content(Some(tip.text.as_str()));
			style.set_property("left", &format!("{}px", tip.left))?;
			style.set_property("top", &format!("{}px", tip.top))?;
			style.set_property("opacity", "1")
		} else {
			style.set_property("opacity", "0")
		}
	}

	/// Detaches the svg and tooltip from the container.
	pub fn remove(&self) {
		self.tooltip.remove();
		self.svg.remove();
	}
}
