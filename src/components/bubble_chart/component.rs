//! Leptos component wrapping the bubble chart canvas.
//!
//! The component creates an HTML canvas element, measures it against the window
//! and runs a `requestAnimationFrame` loop that ticks the simulation and redraws
//! when something changed. Pointer-down on a bubble installs window-level
//! listeners for the rest of the gesture; they are removed when it ends.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, MouseEvent, PointerEvent,
	ResizeObserver, Window,
};

use super::render::{self, AvatarCache};
use super::state::{ChartAction, ChartConfig, ChartState};
use super::theme::Theme;
use super::tooltip::{PriceHistory, StaticHistory};
use super::types::CollectionRecord;
use super::viewport::{ViewportTracker, measure};

/// Seconds per animation frame, for hover fades.
const FRAME_DT: f64 = 0.016;

type Shared<T> = Rc<RefCell<T>>;

/// Chart state plus everything needed to draw it.
struct ChartContext {
	state: ChartState,
	theme: Theme,
	avatars: AvatarCache,
	history: Box<dyn PriceHistory>,
	tracker: ViewportTracker,
	drawn_revision: Option<u64>,
	drawn_avatars: usize,
}

impl ChartContext {
	/// Swap in a new dataset. Listeners of a gesture cut short by the swap
	/// are removed along with it.
	fn load(&mut self, records: &[CollectionRecord], gestures: &RefCell<GestureSlot>) {
		self.state.set_data(records, js_sys::Date::now());
		gestures.borrow_mut().end();
		self.avatars.sync(&self.state.store.image_urls());
	}

	fn draw(&mut self, ctx: &CanvasRenderingContext2d, fading: bool) {
		let revision = self.state.store.revision();
		let loaded = self.avatars.loaded();
		if !fading && self.drawn_revision == Some(revision) && self.drawn_avatars == loaded {
			return;
		}
		render::render(
			&self.state,
			ctx,
			&self.theme,
			&self.avatars,
			self.history.as_ref(),
		);
		self.drawn_revision = Some(revision);
		self.drawn_avatars = loaded;
	}
}

/// Inline style of the canvas. Called through `HtmlElement` so the DOM
/// accessor is used rather than the view builder's `style` attribute method.
fn set_style(canvas: &HtmlCanvasElement, property: &str, value: &str) {
	let _ = HtmlElement::style(canvas).set_property(property, value);
}

fn local_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Measure the canvas and resize it when the viewport changed.
fn remeasure(context: &RefCell<Option<ChartContext>>, canvas: &HtmlCanvasElement) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let Some(m) = measure(&window, canvas) else {
		return;
	};
	let mut guard = context.borrow_mut();
	let Some(c) = guard.as_mut() else {
		return;
	};
	let Some(viewport) = c.tracker.observe(m) else {
		return;
	};
	canvas.set_width(viewport.width as u32);
	canvas.set_height(viewport.height as u32);
	set_style(canvas, "height", &format!("{}px", viewport.height));
	c.state.set_viewport(viewport);
	// resizing clears the bitmap
	c.drawn_revision = None;
}

/// Window and canvas listeners for one in-flight gesture.
struct GestureListeners {
	window: Window,
	canvas: HtmlCanvasElement,
	pointer_id: i32,
	on_move: Closure<dyn FnMut(PointerEvent)>,
	on_up: Closure<dyn FnMut(PointerEvent)>,
	on_cancel: Closure<dyn FnMut(PointerEvent)>,
}

impl GestureListeners {
	fn attach(
		canvas: &HtmlCanvasElement,
		pointer_id: i32,
		context: &Shared<Option<ChartContext>>,
		slot: &Shared<GestureSlot>,
	) -> Option<Self> {
		let window = web_sys::window()?;

		let (context_mv, slot_mv, canvas_mv) = (context.clone(), slot.clone(), canvas.clone());
		let on_move = Closure::<dyn FnMut(PointerEvent)>::new(move |ev: PointerEvent| {
			if ev.pointer_id() != pointer_id {
				return;
			}
			let (x, y) = local_point(&canvas_mv, &ev);
			let active = match *context_mv.borrow_mut() {
				Some(ref mut c) => {
					c.state
						.drag_to(pointer_id, x, y, ev.buttons(), js_sys::Date::now())
				}
				None => false,
			};
			if !active {
				slot_mv.borrow_mut().end();
			}
		});

		let (context_up, slot_up) = (context.clone(), slot.clone());
		let on_up = Closure::<dyn FnMut(PointerEvent)>::new(move |ev: PointerEvent| {
			if ev.pointer_id() != pointer_id {
				return;
			}
			if let Some(ref mut c) = *context_up.borrow_mut() {
				c.state.end_gesture(pointer_id, js_sys::Date::now());
			}
			slot_up.borrow_mut().end();
		});

		let (context_cn, slot_cn) = (context.clone(), slot.clone());
		let on_cancel = Closure::<dyn FnMut(PointerEvent)>::new(move |ev: PointerEvent| {
			if ev.pointer_id() != pointer_id {
				return;
			}
			if let Some(ref mut c) = *context_cn.borrow_mut() {
				c.state.cancel_gesture(js_sys::Date::now());
			}
			slot_cn.borrow_mut().end();
		});

		let _ = window
			.add_event_listener_with_callback("pointermove", on_move.as_ref().unchecked_ref());
		let _ =
			window.add_event_listener_with_callback("pointerup", on_up.as_ref().unchecked_ref());
		let _ = window
			.add_event_listener_with_callback("pointercancel", on_cancel.as_ref().unchecked_ref());
		let _ = canvas.add_event_listener_with_callback(
			"lostpointercapture",
			on_cancel.as_ref().unchecked_ref(),
		);
		let _ = canvas.set_pointer_capture(pointer_id);

		Some(Self {
			window,
			canvas: canvas.clone(),
			pointer_id,
			on_move,
			on_up,
			on_cancel,
		})
	}

	/// Remove every listener and release capture. Safe to call twice.
	fn detach(&self) {
		let _ = self.window.remove_event_listener_with_callback(
			"pointermove",
			self.on_move.as_ref().unchecked_ref(),
		);
		let _ = self
			.window
			.remove_event_listener_with_callback("pointerup", self.on_up.as_ref().unchecked_ref());
		let _ = self.window.remove_event_listener_with_callback(
			"pointercancel",
			self.on_cancel.as_ref().unchecked_ref(),
		);
		let _ = self.canvas.remove_event_listener_with_callback(
			"lostpointercapture",
			self.on_cancel.as_ref().unchecked_ref(),
		);
		if self.canvas.has_pointer_capture(self.pointer_id) {
			let _ = self.canvas.release_pointer_capture(self.pointer_id);
		}
	}
}

impl Drop for GestureListeners {
	fn drop(&mut self) {
		self.detach();
	}
}

/// At most one live gesture. A finished gesture's closures are kept in
/// `retired` until the next frame, since they may still be on the call stack.
#[derive(Default)]
struct GestureSlot {
	active: Option<GestureListeners>,
	retired: Option<GestureListeners>,
}

impl GestureSlot {
	fn start(&mut self, listeners: GestureListeners) {
		self.end();
		self.active = Some(listeners);
	}

	fn end(&mut self) {
		if let Some(listeners) = self.active.take() {
			listeners.detach();
			self.retired = Some(listeners);
		}
	}

	fn collect(&mut self) {
		self.retired = None;
	}
}

/// Handles released on unmount.
#[derive(Clone, Default)]
struct Runtime {
	context: Shared<Option<ChartContext>>,
	gestures: Shared<GestureSlot>,
	frame: Rc<Cell<Option<i32>>>,
	animate: Shared<Option<Closure<dyn FnMut()>>>,
	resize_cb: Shared<Option<Closure<dyn FnMut()>>>,
	observer: Shared<Option<ResizeObserver>>,
}

impl Runtime {
	fn teardown(&self) {
		let window = web_sys::window();
		if let (Some(window), Some(id)) = (&window, self.frame.take()) {
			let _ = window.cancel_animation_frame(id);
		}
		self.animate.borrow_mut().take();
		if let Some(observer) = self.observer.borrow_mut().take() {
			observer.disconnect();
		}
		if let Some(cb) = self.resize_cb.borrow_mut().take() {
			if let Some(window) = &window {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		*self.gestures.borrow_mut() = GestureSlot::default();
		if let Some(mut c) = self.context.borrow_mut().take() {
			c.state.shutdown();
		}
		debug!("bubble chart torn down");
	}
}

/// Renders collections as interactive, physics-driven bubbles on a canvas.
///
/// The canvas fills its container's width and the window height below its
/// top edge. Replacing `data` rebuilds the bubbles in place.
#[component]
pub fn BubbleChartCanvas(
	/// Collections to show, one bubble each.
	#[prop(into)]
	data: Signal<Vec<CollectionRecord>>,
	/// Sizing, physics and gesture tuning.
	#[prop(optional)]
	config: ChartConfig,
	/// Colors.
	#[prop(optional)]
	theme: Theme,
	/// Price series for the tooltip sparkline.
	#[prop(optional)]
	history: StaticHistory,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let runtime = Runtime::default();
	let teardown = StoredValue::new_local(runtime.clone());
	on_cleanup(move || {
		teardown.try_with_value(Runtime::teardown);
	});

	let rt = runtime.clone();
	let mut history = Some(history);
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if rt.context.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			warn!("bubble chart: 2d context unavailable");
			return;
		};

		let mut chart = ChartContext {
			tracker: ViewportTracker::new(config.viewport.clone()),
			state: ChartState::new(config.clone()),
			theme: theme.clone(),
			avatars: AvatarCache::default(),
			history: Box::new(history.take().unwrap_or_default()),
			drawn_revision: None,
			drawn_avatars: 0,
		};
		chart.load(&data.get_untracked(), &rt.gestures);
		*rt.context.borrow_mut() = Some(chart);
		remeasure(&rt.context, &canvas);

		let (context_rs, canvas_rs) = (rt.context.clone(), canvas.clone());
		let resize = Closure::<dyn FnMut()>::new(move || remeasure(&context_rs, &canvas_rs));
		let _ = window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref());
		if let Ok(observer) = ResizeObserver::new(resize.as_ref().unchecked_ref()) {
			observer.observe(&canvas);
			*rt.observer.borrow_mut() = Some(observer);
		}
		*rt.resize_cb.borrow_mut() = Some(resize);

		let (context_anim, gestures_anim, animate_inner, frame_inner) = (
			rt.context.clone(),
			rt.gestures.clone(),
			rt.animate.clone(),
			rt.frame.clone(),
		);
		*rt.animate.borrow_mut() = Some(Closure::new(move || {
			gestures_anim.borrow_mut().collect();
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				c.state.tick();
				let fading = c.state.tick_hover(FRAME_DT);
				c.draw(&ctx, fading);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				frame_inner.set(win.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
			}
		}));
		if let Some(ref cb) = *rt.animate.borrow() {
			rt.frame
				.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
		info!("bubble chart mounted");
	});

	let (context_data, gestures_data) = (runtime.context.clone(), runtime.gestures.clone());
	Effect::new(move |prev: Option<()>| {
		let records = data.get();
		// the mount effect loads the first dataset
		if prev.is_none() {
			return;
		}
		if let Some(ref mut c) = *context_data.borrow_mut() {
			c.load(&records, &gestures_data);
		}
	});

	let (context_pd, gestures_pd) = (runtime.context.clone(), runtime.gestures.clone());
	let on_pointerdown = move |ev: PointerEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_point(&canvas, &ev);
		let started = match *context_pd.borrow_mut() {
			Some(ref mut c) => c
				.state
				.begin_gesture(ev.pointer_id(), x, y, js_sys::Date::now()),
			None => false,
		};
		if !started {
			return;
		}
		if let Some(listeners) =
			GestureListeners::attach(&canvas, ev.pointer_id(), &context_pd, &gestures_pd)
		{
			gestures_pd.borrow_mut().start(listeners);
		}
	};

	let context_mm = runtime.context.clone();
	let on_pointermove = move |ev: PointerEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_point(&canvas, &ev);
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.state.hover_at(x, y);
			let cursor = if c.state.is_dragging() {
				"grabbing"
			} else if c.state.hover.hovered.is_some() {
				"grab"
			} else {
				"default"
			};
			set_style(&canvas, "cursor", cursor);
		}
	};

	let context_pl = runtime.context.clone();
	let on_pointerleave = move |_: PointerEvent| {
		if let Some(ref mut c) = *context_pl.borrow_mut() {
			c.state.clear_hover();
		}
	};

	let context_ck = runtime.context.clone();
	let on_click = move |_: MouseEvent| {
		let action = context_ck.borrow_mut().as_mut().and_then(|c| c.state.click());
		if let Some(ChartAction::Navigate(link)) = action {
			info!("opening {link}");
			if let Some(window) = web_sys::window() {
				let _ = window.open_with_url_and_target(&link, "_blank");
			}
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="bubble-chart-canvas"
			on:pointerdown=on_pointerdown
			on:pointermove=on_pointermove
			on:pointerleave=on_pointerleave
			on:click=on_click
			style="display: block; width: 100%; touch-action: none; cursor: default;"
		/>
	}
}
