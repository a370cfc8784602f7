mod dom;
mod render;
mod storage;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window};

use crate::account::TodoId;
use crate::app::{Renderers, Universe};
use crate::clock::SystemClock;
use crate::config::UniverseConfig;
use crate::render::{NullRenderer, Renderer, StereoRenderer};
use crate::storage::{MemoryStorage, Storage};
use crate::todos::Filter;

use self::dom::Dom;
use self::render::{GlRenderer, ParallaxBarrierRenderer};
use self::storage::LocalStorage;

type Shared = Rc<RefCell<Shell>>;

struct Shell {
    universe: Universe<Box<dyn Storage>, SystemClock>,
    dom: Dom,
    drag: Option<(i32, i32)>,
}

impl Shell {
    /// Regenerates every piece of UI derived from universe state.
    fn sync(&mut self) -> Result<(), JsValue> {
        let u = &mut self.universe;
        self.dom.show_session(u.session().current_user.as_deref());
        if let Some(view) = u.list_view() {
            self.dom.render_list(&view)?;
        }
        self.dom.show_view_mode(u.views().mode(), u.views().indicator())?;
        let fresh = u.notifier_mut().drain_pending();
        self.dom.show_notifications(&fresh, u.config().notification_ms)
    }

    fn resize(&mut self, window: &Window) -> Result<(), JsValue> {
        let w = window.inner_width()?.as_f64().unwrap_or(1.0);
        let h = window.inner_height()?.as_f64().unwrap_or(1.0);
        self.universe.resize(w as u32, h as u32);
        Ok(())
    }

    fn add_from_input(&mut self) {
        let text = self.dom.input_value("new-todo-input");
        if self.universe.add_todo(&text).is_ok() {
            self.dom.set_input_value("new-todo-input", "");
        }
    }

    fn save_from_input(&mut self, id: TodoId) {
        let text = self.dom.input_value(&format!("edit-input-{id}"));
        let _ = self.universe.save_edit(id, &text);
    }
}

/// An event subscription that unsubscribes when dropped.
struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn attach(target: &EventTarget, kind: &'static str, f: impl FnMut(Event) + 'static) -> Result<Self, JsValue> {
        let closure = Closure::wrap(Box::new(f) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            closure,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

/// Subscribes `handler` and re-syncs the UI after every event.
fn on(
    target: &EventTarget,
    kind: &'static str,
    shell: &Shared,
    handler: impl Fn(&mut Shell, &Event) + 'static,
) -> Result<Listener, JsValue> {
    let shell = shell.clone();
    Listener::attach(target, kind, move |event| {
        let Ok(mut shell) = shell.try_borrow_mut() else {
            return;
        };
        handler(&mut shell, &event);
        if let Err(err) = shell.sync() {
            log::error!("ui sync failed: {err:?}");
        }
    })
}

fn data_id(el: &Element) -> Option<TodoId> {
    el.get_attribute("data-id")?.parse().ok().map(TodoId)
}

fn is_enter(event: &Event) -> bool {
    event
        .dyn_ref::<KeyboardEvent>()
        .is_some_and(|k| k.key() == "Enter")
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

fn wire(shell: &Shared, window: &Window, canvas: &HtmlCanvasElement) -> Result<Vec<Listener>, JsValue> {
    let mut listeners = Vec::new();
    let dom_doc = shell.borrow().dom.document().clone();
    let by_id = |id: &str| dom_doc.get_element_by_id(id);

    let tabs = dom_doc.query_selector_all(".tab-btn")?;
    for i in 0..tabs.length() {
        if let Some(tab) = tabs.item(i) {
            listeners.push(on(&tab, "click", shell, |s, event| {
                let tab = event
                    .current_target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .and_then(|t| t.get_attribute("data-tab"));
                if let Some(tab) = tab {
                    s.dom.switch_auth_tab(&tab);
                }
            })?);
        }
    }

    if let Some(el) = by_id("demo-login") {
        listeners.push(on(&el, "click", shell, |s, _| {
            s.dom.set_input_value("login-username", "demo");
            s.dom.set_input_value("login-password", "demo");
            let _ = s.universe.demo_login();
        })?);
    }

    if let Some(el) = by_id("login-form") {
        listeners.push(on(&el, "submit", shell, |s, event| {
            event.prevent_default();
            let username = s.dom.input_value("login-username").trim().to_string();
            let password = s.dom.input_value("login-password");
            let _ = s.universe.login(&username, &password);
        })?);
    }

    if let Some(el) = by_id("register-form") {
        listeners.push(on(&el, "submit", shell, |s, event| {
            event.prevent_default();
            let username = s.dom.input_value("register-username").trim().to_string();
            let email = s.dom.input_value("register-email").trim().to_string();
            let password = s.dom.input_value("register-password");
            let confirm = s.dom.input_value("register-confirm");
            if s.universe.register(&username, &email, &password, &confirm).is_ok() {
                s.dom.switch_auth_tab("login");
                s.dom.reset_form("register-form");
            }
        })?);
    }

    if let Some(el) = by_id("add-todo-btn") {
        listeners.push(on(&el, "click", shell, |s, _| s.add_from_input())?);
    }
    if let Some(el) = by_id("new-todo-input") {
        listeners.push(on(&el, "keypress", shell, |s, event| {
            if is_enter(event) {
                s.add_from_input();
            }
        })?);
    }

    if let Some(el) = by_id("logout-btn") {
        listeners.push(on(&el, "click", shell, |s, _| {
            s.universe.logout();
            s.dom.reset_form("login-form");
            s.dom.reset_form("register-form");
            s.dom.switch_auth_tab("login");
        })?);
    }

    let filters = dom_doc.query_selector_all(".filter-btn")?;
    for i in 0..filters.length() {
        if let Some(btn) = filters.item(i) {
            listeners.push(on(&btn, "click", shell, |s, event| {
                let filter = event
                    .current_target()
                    .and_then(|t| t.dyn_into::<Element>().ok())
                    .and_then(|t| t.get_attribute("data-filter"))
                    .and_then(|f| f.parse::<Filter>().ok());
                if let Some(filter) = filter {
                    s.universe.set_filter(filter);
                }
            })?);
        }
    }

    if let Some(el) = by_id("toggle-3d") {
        listeners.push(on(&el, "click", shell, |s, _| {
            s.universe.toggle_view();
        })?);
    }

    if let Some(list) = by_id("todo-list") {
        listeners.push(on(&list, "click", shell, |s, event| {
            let Some(target) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|t| t.closest("[data-action]").ok().flatten())
            else {
                return;
            };
            let (Some(action), Some(id)) = (target.get_attribute("data-action"), data_id(&target)) else {
                return;
            };
            match action.as_str() {
                "toggle" => {
                    let _ = s.universe.toggle_todo(id);
                }
                "edit" => s.universe.begin_edit(id),
                "cancel" => s.universe.cancel_edit(),
                "save" => s.save_from_input(id),
                "delete" => {
                    let _ = s
                        .universe
                        .delete_todo(id, || confirm("Are you sure you want to delete this mission?"));
                }
                other => log::debug!("ignoring list action `{other}`"),
            }
        })?);
        listeners.push(on(&list, "keypress", shell, |s, event| {
            if !is_enter(event) {
                return;
            }
            let id = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .filter(|t| t.id().starts_with("edit-input-"))
                .and_then(|t| data_id(&t));
            if let Some(id) = id {
                s.save_from_input(id);
            }
        })?);
    }

    listeners.push(on(canvas, "mousedown", shell, |s, event| {
        if let Some(m) = event.dyn_ref::<MouseEvent>() {
            s.drag = Some((m.client_x(), m.client_y()));
        }
    })?);
    listeners.push(on(window, "mouseup", shell, |s, _| s.drag = None)?);
    listeners.push(on(canvas, "mousemove", shell, |s, event| {
        let (Some(m), Some((x, y))) = (event.dyn_ref::<MouseEvent>(), s.drag) else {
            return;
        };
        let height = web_sys::window()
            .and_then(|w| w.inner_height().ok())
            .and_then(|h| h.as_f64())
            .unwrap_or(1.0) as f32;
        s.universe
            .orbit((m.client_x() - x) as f32, (m.client_y() - y) as f32, height);
        s.drag = Some((m.client_x(), m.client_y()));
    })?);
    listeners.push(on(canvas, "wheel", shell, |s, event| {
        if let Some(w) = event.dyn_ref::<WheelEvent>() {
            event.prevent_default();
            s.universe.zoom(w.delta_y() as f32);
        }
    })?);

    listeners.push(on(window, "resize", shell, |s, _| {
        if let Some(window) = web_sys::window() {
            if let Err(err) = s.resize(&window) {
                log::warn!("resize failed: {err:?}");
            }
        }
    })?);

    Ok(listeners)
}

/// Repeating `requestAnimationFrame` callback with an explicit stop.
struct FrameLoop {
    callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
    request: Rc<Cell<Option<i32>>>,
}

fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or("no window")?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

impl FrameLoop {
    fn start(shell: Shared) -> Result<Self, JsValue> {
        // `f` holds the closure so it can re-request itself; `g` is the handle
        // kept for stopping.
        let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let g = f.clone();
        let request = Rc::new(Cell::new(None));
        let next = request.clone();

        *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_timestamp: f64| {
            if let Ok(mut shell) = shell.try_borrow_mut() {
                shell.universe.tick(js_sys::Date::now());
                let fresh = shell.universe.notifier_mut().drain_pending();
                if !fresh.is_empty() {
                    let lifetime = shell.universe.config().notification_ms;
                    let _ = shell.dom.show_notifications(&fresh, lifetime);
                }
            }
            if let Some(callback) = f.borrow().as_ref() {
                next.set(request_frame(callback).ok());
            }
        }) as Box<dyn FnMut(f64)>));

        let first = request_frame(g.borrow().as_ref().ok_or("frame callback missing")?)?;
        request.set(Some(first));
        Ok(Self { callback: g, request })
    }

    fn stop(&self) {
        if let (Some(window), Some(id)) = (web_sys::window(), self.request.take()) {
            let _ = window.cancel_animation_frame(id);
        }
        // Breaks the closure's self-reference.
        self.callback.borrow_mut().take();
    }
}

struct Running {
    _shell: Shared,
    frames: FrameLoop,
    listeners: Vec<Listener>,
}

thread_local! {
    static RUNNING: RefCell<Option<Running>> = const { RefCell::new(None) };
}

fn read_config(document: &web_sys::Document) -> UniverseConfig {
    document
        .get_element_by_id("universe-config")
        .and_then(|el| el.text_content())
        .map(|raw| UniverseConfig::from_json(&raw))
        .unwrap_or_default()
}

fn open_storage() -> Box<dyn Storage> {
    match LocalStorage::open() {
        Ok(storage) => Box::new(storage),
        Err(err) => {
            log::warn!("{err}; missions will not survive a reload");
            Box::new(MemoryStorage::new())
        }
    }
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Trace).ok();

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let config = read_config(&document);
    log::set_max_level(config.log_level().to_level_filter());

    let canvas = document
        .get_element_by_id("universe-canvas")
        .ok_or("canvas not found")?
        .dyn_into::<HtmlCanvasElement>()?;

    let normal: Box<dyn Renderer> = match GlRenderer::new(&canvas) {
        Ok(renderer) => Box::new(renderer),
        Err(err) => {
            log::error!("WebGL2 unavailable, running without the 3D scene: {err:?}");
            Box::new(NullRenderer::default())
        }
    };
    let stereo: Option<Box<dyn StereoRenderer>> = match ParallaxBarrierRenderer::new(&canvas, config.stereo()) {
        Ok(renderer) => Some(Box::new(renderer)),
        Err(err) => {
            log::warn!("parallax barrier renderer failed: {err:?}");
            None
        }
    };

    let renderers = Renderers {
        normal,
        stereo,
        device_pixel_ratio: window.device_pixel_ratio() as f32,
    };
    let universe = Universe::new(config, open_storage(), SystemClock, renderers, SmallRng::from_entropy());
    let shell = Rc::new(RefCell::new(Shell {
        universe,
        dom: Dom::new(document),
        drag: None,
    }));

    {
        let mut s = shell.borrow_mut();
        s.resize(&window)?;
        s.dom.switch_auth_tab("login");
        s.dom.hide_loading();
        s.sync()?;
    }

    let listeners = wire(&shell, &window, &canvas)?;
    let frames = FrameLoop::start(shell.clone())?;
    RUNNING.with(|running| {
        *running.borrow_mut() = Some(Running {
            _shell: shell,
            frames,
            listeners,
        })
    });
    log::info!("todo universe started");
    Ok(())
}

/// Stops the frame loop and removes every event listener.
#[wasm_bindgen]
pub fn shutdown() {
    let running = RUNNING.with(|running| running.borrow_mut().take());
    if let Some(running) = running {
        running.frames.stop();
        drop(running.listeners);
        log::info!("todo universe stopped");
    }
}
