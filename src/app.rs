use rand::rngs::SmallRng;

use crate::account::{AccountStore, Login, Todo, TodoId};
use crate::clock::Clock;
use crate::config::UniverseConfig;
use crate::error::{Result, UniverseError};
use crate::notify::{Notifier, Severity};
use crate::render::{Renderer, StereoRenderer};
use crate::render_loop::{QualityPolicy, RenderLoop, TickReport};
use crate::scene::decor::Decor;
use crate::scene::node::NodeTiming;
use crate::scene::registry::NodeRegistry;
use crate::scene::{Scene, Stage};
use crate::session::Session;
use crate::storage::Storage;
use crate::todos::{self, Filter, ListView};
use crate::view_mode::{Transition, ViewMode, ViewModeController};

/// Renderers handed to the controller. `stereo` is `None` when the parallax
/// barrier renderer could not be created.
pub struct Renderers {
    pub normal: Box<dyn Renderer>,
    pub stereo: Option<Box<dyn StereoRenderer>>,
    pub device_pixel_ratio: f32,
}

pub struct Universe<S, C> {
    config: UniverseConfig,
    clock: C,
    store: AccountStore<S>,
    session: Session,
    stage: Stage,
    views: ViewModeController,
    render_loop: RenderLoop,
    notifier: Notifier,
    rng: SmallRng,
}

impl<S: Storage, C: Clock> Universe<S, C> {
    pub fn new(config: UniverseConfig, storage: S, clock: C, renderers: Renderers, mut rng: SmallRng) -> Self {
        let store = AccountStore::load(storage, config.storage_key.clone(), clock.now());

        let mut scene = Scene::new(Decor::new(config.star_count, &mut rng));
        scene.nodes = NodeRegistry::new(NodeTiming {
            entrance_delay_ms: config.entrance_delay_ms,
            entrance_duration_ms: config.entrance_duration_ms,
            pulse_scale: config.pulse_scale,
            pulse_ms: config.pulse_ms,
        });

        let mut views = ViewModeController::new(
            renderers.normal,
            renderers.stereo,
            config.stereo(),
            config.parallax_rotate_speed,
        );
        views.set_pixel_ratio(renderers.device_pixel_ratio);
        let render_loop = RenderLoop::new(QualityPolicy::new(
            config.fps_floor,
            config.degraded_rotate_speed,
            renderers.device_pixel_ratio,
        ));
        let notifier = Notifier::new(config.notification_ms);

        Self {
            config,
            clock,
            store,
            session: Session::default(),
            stage: Stage::new(scene),
            views,
            render_loop,
            notifier,
            rng,
        }
    }

    fn notify(&mut self, severity: Severity, message: impl Into<String>) {
        let now = self.clock.now_ms();
        self.notifier.push(now, severity, message);
    }

    /// Surfaces a failure as a popup and hands it back.
    fn report<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            let now = self.clock.now_ms();
            self.notifier.error(now, err);
        }
        result
    }

    /// Writes the store; a failed write is reported but the in-memory change stays.
    fn persist(&mut self) {
        if let Err(err) = self.store.save() {
            log::error!("saving account data failed: {err}");
            let err = UniverseError::from(err);
            let now = self.clock.now_ms();
            self.notifier.error(now, &err);
        }
    }

    fn user(&self) -> Result<&str> {
        self.session.current_user.as_deref().ok_or(UniverseError::NoSession)
    }

    fn todos(&self) -> Result<&[Todo]> {
        let user = self.user()?;
        self.store
            .account(user)
            .map(|a| a.todos.as_slice())
            .ok_or(UniverseError::NoSession)
    }

    fn todos_mut(&mut self) -> Result<&mut Vec<Todo>> {
        let user = self.session.current_user.as_deref().ok_or(UniverseError::NoSession)?;
        self.store
            .account_mut(user)
            .map(|a| &mut a.todos)
            .ok_or(UniverseError::NoSession)
    }

    pub fn register(&mut self, username: &str, email: &str, password: &str, confirm: &str) -> Result<()> {
        let result = if password != confirm {
            Err(UniverseError::PasswordMismatch)
        } else {
            let now = self.clock.now();
            self.store.register(username, password, email, now)
        };
        self.report(result)?;
        self.notify(Severity::Success, "Registration successful!");
        Ok(())
    }

    /// Authenticates (creating unknown users) and opens a session with one
    /// scene node per existing todo.
    pub fn login(&mut self, username: &str, password: &str) -> Result<Login> {
        let now = self.clock.now();
        let result = self.store.authenticate(username, password, now);
        let login = self.report(result)?;
        if login == Login::Created {
            self.notify(
                Severity::Success,
                format!("Welcome {username}! Account created automatically."),
            );
        }
        self.open_session(username);
        Ok(login)
    }

    /// Shortcut for the seeded demo account.
    pub fn demo_login(&mut self) -> Result<Login> {
        self.login("demo", "demo")
    }

    fn open_session(&mut self, username: &str) {
        if self.session.is_active() {
            self.close_session();
        }
        self.session.begin(username);
        let now = self.clock.now_ms();
        let todos = self
            .store
            .account(username)
            .map(|a| a.todos.clone())
            .unwrap_or_default();
        for todo in &todos {
            self.stage.scene.nodes.create(todo, now, &mut self.rng);
        }
        if self.views.mode() == ViewMode::ParallaxBarrier {
            self.stage.scene.nodes.apply_depth_layout();
        }
        log::info!("`{username}` logged in with {} todos", todos.len());
        self.notify(Severity::Success, format!("Welcome back, {username}!"));
    }

    fn close_session(&mut self) {
        self.stage.scene.nodes.clear();
        self.session.reset();
    }

    pub fn logout(&mut self) {
        if let Some(user) = self.session.current_user.as_deref() {
            log::info!("`{user}` logged out");
        }
        self.close_session();
        self.notify(Severity::Info, "Logged out successfully.");
    }

    pub fn add_todo(&mut self, text: &str) -> Result<TodoId> {
        let now = self.clock.now();
        let result = self
            .todos_mut()
            .and_then(|list| todos::add(list, text, now).cloned());
        let todo = self.report(result)?;
        log::debug!("added todo {}", todo.id);

        self.stage
            .scene
            .nodes
            .create(&todo, self.clock.now_ms(), &mut self.rng);
        if self.views.mode() == ViewMode::ParallaxBarrier {
            self.stage.scene.nodes.apply_depth_layout();
        }
        self.persist();
        self.notify(Severity::Success, "Mission added successfully!");
        Ok(todo.id)
    }

    /// Flips completion; `Ok(false)` when the id is unknown.
    pub fn toggle_todo(&mut self, id: TodoId) -> Result<bool> {
        let result = self.todos_mut().map(|list| todos::toggle(list, id).cloned());
        let Some(todo) = self.report(result)? else {
            return Ok(false);
        };
        log::debug!("toggled todo {id} -> {}", todo.completed);

        self.stage.scene.nodes.update(&todo, self.clock.now_ms());
        self.persist();
        let status = if todo.completed { "completed" } else { "reactivated" };
        self.notify(Severity::Success, format!("Mission {status}!"));
        Ok(true)
    }

    /// Ignored without a session or for ids outside the user's list.
    pub fn begin_edit(&mut self, id: TodoId) {
        if self.todos().is_ok_and(|list| list.iter().any(|t| t.id == id)) {
            self.session.editing = Some(id);
        }
    }

    pub fn cancel_edit(&mut self) {
        self.session.editing = None;
    }

    /// Leaves edit mode. Blank text keeps the original wording.
    pub fn save_edit(&mut self, id: TodoId, text: &str) -> Result<bool> {
        let result = self.todos_mut().map(|list| todos::rename(list, id, text));
        let changed = self.report(result)?;
        self.session.editing = None;
        if changed {
            log::debug!("renamed todo {id}");
            self.persist();
            self.notify(Severity::Success, "Mission updated!");
        }
        Ok(changed)
    }

    /// Removes the todo once `confirm` agrees. Unknown ids are a no-op and
    /// do not prompt.
    pub fn delete_todo(&mut self, id: TodoId, confirm: impl FnOnce() -> bool) -> Result<bool> {
        let result = self.todos().map(|list| list.iter().any(|t| t.id == id));
        if !self.report(result)? || !confirm() {
            return Ok(false);
        }
        todos::remove(self.todos_mut()?, id);
        log::debug!("deleted todo {id}");

        self.stage.scene.nodes.remove(id);
        if self.session.editing == Some(id) {
            self.session.editing = None;
        }
        self.persist();
        self.notify(Severity::Info, "Mission deleted.");
        Ok(true)
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.session.filter = filter;
    }

    pub fn toggle_view(&mut self) -> Transition {
        let transition = self.views.toggle(&mut self.stage, &mut self.rng);
        // A missing stereo renderer is only logged; the mode change still happened.
        match transition.mode {
            ViewMode::ParallaxBarrier => self.notify(Severity::Success, "ParallaxBarrier 3D Mode Active!"),
            ViewMode::Normal => self.notify(Severity::Info, "Normal View Mode Active"),
        }
        transition
    }

    /// Current list markup source; `None` outside a session.
    pub fn list_view(&self) -> Option<ListView> {
        let todos = self.todos().ok()?;
        Some(ListView::build(todos, self.session.filter, self.session.editing))
    }

    pub fn tick(&mut self, now_ms: f64) -> TickReport {
        self.notifier.expire(now_ms);
        self.render_loop.tick(now_ms, &mut self.stage, &mut self.views)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.stage.camera.set_viewport(width as f32, height as f32);
        self.views.set_size(width, height);
    }

    /// Pointer-drag orbit, in pixels of movement over a viewport `height` tall.
    pub fn orbit(&mut self, dx: f32, dy: f32, height: f32) {
        let per_px = std::f32::consts::TAU / height.max(1.0);
        self.stage.controls.rotate(dx * per_px, dy * per_px);
    }

    pub fn zoom(&mut self, wheel_delta: f32) {
        self.stage.controls.dolly((wheel_delta * 0.001).exp());
    }

    pub fn config(&self) -> &UniverseConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &AccountStore<S> {
        &self.store
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn views(&self) -> &ViewModeController {
        &self.views
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }
}
