use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, EventTarget, HtmlElement, PointerEvent, Window};

use super::render::{SvgScene, node_index};
use super::simulation::NodeHandle;
use super::state::{ClientRect, ForceGraphState, Point};
use super::types::GraphData;

/// An event listener that unregisters itself when dropped.
pub struct Listener {
	target: EventTarget,
	event: &'static str,
	callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
	pub fn new(
		target: &EventTarget,
		event: &'static str,
		f: impl FnMut(Event) + 'static,
	) -> Result<Self, JsValue> {
		let callback = Closure::<dyn FnMut(Event)>::new(f);
		target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
		Ok(Self {
			target: target.clone(),
			event,
			callback,
		})
	}
}

impl Drop for Listener {
	fn drop(&mut self) {
		if let Err(err) = self
			.target
			.remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref())
		{
			warn!("failed to remove {} listener: {err:?}", self.event);
		}
	}
}

type Frame = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Everything one mounted graph owns. Dropping it stops the simulation,
/// cancels the pending frame and removes the svg and tooltip.
pub struct GraphHandle {
	window: Window,
	state: Rc<RefCell<ForceGraphState>>,
	scene: Rc<RefCell<SvgScene>>,
	animate: Frame,
	frame_id: Rc<Cell<Option<i32>>>,
	_listeners: Vec<Listener>,
}

fn client_rect(el: &Element) -> ClientRect {
	let rect = el.get_bounding_client_rect();
	ClientRect {
		left: rect.left(),
		top: rect.top(),
		width: rect.width(),
		height: rect.height(),
	}
}

fn target_node(ev: &Event) -> Option<NodeHandle> {
	let el: Element = ev.target()?.dyn_into().ok()?;
	node_index(&el).map(NodeHandle)
}

impl GraphHandle {
	/// Builds the simulation and svg for `data` inside `container`. Returns
	/// `Ok(None)` when there is nothing to show yet.
	pub fn mount(
		container: &HtmlElement,
		data: &GraphData,
		width: f64,
		height: f64,
	) -> Result<Option<Self>, JsValue> {
		let Some(state) = ForceGraphState::new(data, width, height) else {
			return Ok(None);
		};
		let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
		let document = window
			.document()
			.ok_or_else(|| JsValue::from_str("no document"))?;
		debug!("mounting force graph at {width}x{height}");

		let scene = SvgScene::build(&document, container, &state)?;
		let svg: EventTarget = scene.svg().clone().into();
		let svg_el = scene.svg().clone();
		let state = Rc::new(RefCell::new(state));
		let scene = Rc::new(RefCell::new(scene));
		let mut listeners = Vec::new();

		let state_pd = state.clone();
		listeners.push(Listener::new(&svg, "pointerdown", move |ev| {
			let (Some(handle), Some(ev)) = (target_node(&ev), ev.dyn_ref::<PointerEvent>()) else {
				return;
			};
			ev.prevent_default();
			let mut s = state_pd.borrow_mut();
			let client = Point::new(ev.client_x() as f64, ev.client_y() as f64);
			let pointer = s.viewport.to_scene(client, client_rect(&svg_el));
			s.drag_start(ev.pointer_id(), handle, pointer);
		})?);

		let (state_dm, svg_dm) = (state.clone(), scene.borrow().svg().clone());
		listeners.push(Listener::new(&window, "pointermove", move |ev| {
			let Some(ev) = ev.dyn_ref::<PointerEvent>() else {
				return;
			};
			let mut s = state_dm.borrow_mut();
			if !s.is_dragging() {
				return;
			}
			let client = Point::new(ev.client_x() as f64, ev.client_y() as f64);
			let pointer = s.viewport.to_scene(client, client_rect(&svg_dm));
			s.drag_move(ev.pointer_id(), pointer);
		})?);

		for event in ["pointerup", "pointercancel"] {
			let state_de = state.clone();
			listeners.push(Listener::new(&window, event, move |ev| {
				if let Some(ev) = ev.dyn_ref::<PointerEvent>() {
					state_de.borrow_mut().drag_end(ev.pointer_id());
				}
			})?);
		}

		let state_ho = state.clone();
		listeners.push(Listener::new(&svg, "pointerover", move |ev| {
			if let Some(handle) = target_node(&ev) {
				state_ho.borrow_mut().hover_enter(handle);
			}
		})?);

		let state_hm = state.clone();
		let container_hm = container.clone();
		listeners.push(Listener::new(&svg, "pointermove", move |ev| {
			let Some(ev) = ev.dyn_ref::<PointerEvent>() else {
				return;
			};
			if target_node(ev).is_none() {
				return;
			}
			let rect = client_rect(&container_hm);
			state_hm.borrow_mut().hover_move(
				ev.client_x() as f64 - rect.left,
				ev.client_y() as f64 - rect.top,
			);
		})?);

		let state_hl = state.clone();
		listeners.push(Listener::new(&svg, "pointerout", move |ev| {
			if target_node(&ev).is_some() {
				state_hl.borrow_mut().hover_leave();
			}
		})?);

		let animate: Frame = Rc::new(RefCell::new(None));
		let frame_id = Rc::new(Cell::new(None));
		let (state_anim, scene_anim, animate_inner, frame_anim) = (
			state.clone(),
			scene.clone(),
			animate.clone(),
			frame_id.clone(),
		);
		*animate.borrow_mut() = Some(Closure::new(move || {
			frame_anim.set(None);
			{
				let mut s = state_anim.borrow_mut();
				if s.is_torn_down() {
					return;
				}
				let stepped = s.step();
				if stepped || s.take_dirty() {
					if let Err(err) = scene_anim.borrow_mut().render(&s) {
						error!("force graph render failed: {err:?}");
					}
				}
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				frame_anim.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(cb) = animate.borrow().as_ref() {
			frame_id.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}

		Ok(Some(Self {
			window,
			state,
			scene,
			animate,
			frame_id,
			_listeners: listeners,
		}))
	}
}

impl Drop for GraphHandle {
	fn drop(&mut self) {
		self.state.borrow_mut().teardown();
		if let Some(id) = self.frame_id.take() {
			let _ = self.window.cancel_animation_frame(id);
		}
		self.animate.borrow_mut().take();
		self.scene.borrow().remove();
		debug!("force graph torn down");
	}
}

/// Force-directed character graph. Nodes grow with their degree and can be
/// dragged; the layout is rebuilt whenever `data` or the container size
/// changes.
#[component]
pub fn ForceGraph(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = 600.0)] height: f64,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let (size, set_size) = signal((0.0_f64, 0.0_f64));
	let graph = StoredValue::new_local(None::<GraphHandle>);
	let resize = StoredValue::new_local(None::<Listener>);

	Effect::new(move |_| {
		let Some(container) = container_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};
		let container: HtmlElement = container.into();
		let measure = move || {
			set_size.set((
				container.client_width() as f64,
				container.client_height() as f64,
			))
		};
		measure();
		match Listener::new(&window, "resize", move |_| measure()) {
			Ok(listener) => resize.set_value(Some(listener)),
			Err(err) => error!("failed to watch window resize: {err:?}"),
		}
	});

	Effect::new(move |_| {
		let (width, height) = size.get();
		let data = data.get();
		// The previous graph must be gone before its replacement is built.
		graph.set_value(None);
		let Some(container) = container_ref.get_untracked() else {
			return;
		};
		match GraphHandle::mount(&container.into(), &data, width, height) {
			Ok(handle) => graph.set_value(handle),
			Err(err) => error!("failed to mount force graph: {err:?}"),
		}
	});

	on_cleanup(move || {
		graph.try_update_value(|g| drop(g.take()));
		resize.try_update_value(|r| drop(r.take()));
	});

	view! {
		<div
			node_ref=container_ref
			class="force-graph"
			style=format!(
				"position: relative; width: 100%; height: {height}px; border: 1px solid #d1d5db; border-radius: 4px; background: #fff;",
			)
		>
			<div
				class="force-graph-credit"
				style="position: absolute; bottom: 8px; left: 0; right: 0; text-align: center; font-size: 12px; color: #6b7280; pointer-events: none; user-select: none;"
			>
				"Drag characters to rearrange. Bigger circles interact more."
			</div>
		</div>
	}
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
	use wasm_bindgen_test::*;

	use super::*;
	use crate::components::force_graph::types::{GraphLink, GraphNode};

	wasm_bindgen_test_configure!(run_in_browser);

	fn detached_container() -> HtmlElement {
		web_sys::window()
			.unwrap()
			.document()
			.unwrap()
			.create_element("div")
			.unwrap()
			.dyn_into()
			.unwrap()
	}

	fn pair() -> GraphData {
		GraphData {
			nodes: vec![
				GraphNode { id: "Romeo".to_string() },
				GraphNode { id: "Juliet".to_string() },
			],
			links: vec![GraphLink::new("Romeo", "Juliet")],
			sample_quotes: vec![],
		}
	}

	#[wasm_bindgen_test]
	fn dropping_the_handle_unmounts_everything() {
		let container = detached_container();
		let handle = GraphHandle::mount(&container, &pair(), 400.0, 300.0)
			.unwrap()
			.unwrap();
		assert_eq!(container.child_element_count(), 2);
		assert!(container.query_selector("svg").unwrap().is_some());

		let (state, animate) = (handle.state.clone(), handle.animate.clone());
		assert!(animate.borrow().is_some());
		drop(handle);

		assert_eq!(container.child_element_count(), 0);
		assert!(container.query_selector("svg").unwrap().is_none());
		assert!(state.borrow().is_torn_down());
		assert!(animate.borrow().is_none());
	}

	#[wasm_bindgen_test]
	fn empty_graph_mounts_nothing() {
		let container = detached_container();
		let handle = GraphHandle::mount(&container, &GraphData::default(), 400.0, 300.0).unwrap();
		assert!(handle.is_none());
		assert_eq!(container.child_element_count(), 0);
	}
}
