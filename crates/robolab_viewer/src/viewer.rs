//! Viewer lifecycle and frame loop
//!
//! [`RobotViewer`] owns the scene, camera, render backend, and every stage's
//! state. Hosts mount it on a surface, forward input events, queue commands,
//! and call [`RobotViewer::frame`] once per display refresh. Each frame runs
//! in a fixed order:
//!
//! 1. poll the gamepad
//! 2. apply queued commands
//! 3. update orbit controls
//! 4. locomotion, gait, poses, gestures, rotation damping, accessories, idle
//! 5. mini-game
//! 6. click and hover picking
//! 7. publish notifications
//! 8. render

use crate::accessory::Accessories;
use crate::command::{Accessory, Command, GameAction, MoveState, PoseName};
use crate::config::ViewerConfig;
use crate::error::Result;
use crate::game::{GamePhase, MiniGame};
use crate::gesture::{apply_pose, Gestures};
use crate::highlight::Highlighter;
use crate::idle::IdleMotion;
use crate::input::{AutoWalk, InputRouter, MovementState};
use crate::locomotion::Locomotion;
use crate::notify::Notification;
use crate::rig::{Dressing, Part, Rig};
use crate::targets::RotationTargets;
use crate::views;
use rand::rngs::StdRng;
use rand::SeedableRng;
use robolab_3d::render::{BloomPass, OutlinePass};
use robolab_3d::{
    pick_nearest, FrameDescription, HeadlessBackend, OrbitController, OrbitInput,
    PerspectiveCamera, PostProcessChain, RenderBackend, ResourceStats, SceneGraph, TimeUniform,
};
use robolab_core::{
    CommandQueue, CommandSender, Euler, ListenerRegistry, NotificationBus, SubscriptionHandle,
    Vec2, Vec3,
};
use robolab_platform::{
    GamepadSource, InputEvent, MouseButton, NullGamepad, PlatformError, PointerEvent, Viewport,
};

/// Input listeners a mounted viewer holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Keyboard,
    Pointer,
    Resize,
    Gamepad,
}

impl ListenerKind {
    pub const ALL: [ListenerKind; 4] = [
        ListenerKind::Keyboard,
        ListenerKind::Pointer,
        ListenerKind::Resize,
        ListenerKind::Gamepad,
    ];
}

/// State that only exists while mounted
struct Mounted {
    rig: Rig,
    targets: RotationTargets,
    accessories: Accessories,
    game: MiniGame,
    camera: PerspectiveCamera,
    orbit: OrbitController,
    chain: PostProcessChain,
    highlighter: Highlighter,
    idle: IdleMotion,
}

#[derive(Debug, Default)]
struct PointerState {
    position: Option<Vec2>,
    drag: Option<MouseButton>,
    hover_dirty: bool,
    click: Option<Vec2>,
}

/// The robot scene controller
pub struct RobotViewer<B: RenderBackend = HeadlessBackend, G: GamepadSource = NullGamepad> {
    config: ViewerConfig,
    backend: B,
    gamepad: G,
    scene: SceneGraph,
    mounted: Option<Mounted>,
    viewport: Viewport,

    commands: CommandQueue<Command>,
    notifications: NotificationBus<Notification>,
    outbox: Vec<Notification>,
    listeners: ListenerRegistry<ListenerKind>,

    input: InputRouter,
    auto_walk: AutoWalk,
    locomotion: Locomotion,
    gestures: Gestures,
    pending_poses: Vec<PoseName>,
    pointer: PointerState,
    orbit_input: OrbitInput,

    rng: StdRng,
    elapsed: f32,
    frame_count: u32,
    last_timestamp: Option<f64>,
    running: bool,
}

impl RobotViewer {
    /// Viewer on the headless backend with no gamepad
    pub fn headless(config: ViewerConfig) -> Result<Self> {
        Self::new(config, HeadlessBackend::new(), NullGamepad)
    }
}

impl<B: RenderBackend, G: GamepadSource> RobotViewer<B, G> {
    /// Create an unmounted viewer
    pub fn new(config: ViewerConfig, backend: B, gamepad: G) -> Result<Self> {
        config.validate()?;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let viewport = Viewport::new(config.render.width, config.render.height)?;
        let loco = &config.locomotion;

        Ok(Self {
            auto_walk: AutoWalk::new(loco.auto_walk_rate, loco.auto_walk_magnitude),
            gestures: Gestures::new(config.pose.salute_duration),
            backend,
            gamepad,
            scene: SceneGraph::new(),
            mounted: None,
            viewport,
            commands: CommandQueue::new(),
            notifications: NotificationBus::new(),
            outbox: Vec::new(),
            listeners: ListenerRegistry::new(),
            input: InputRouter::new(),
            locomotion: Locomotion::new(),
            pending_poses: Vec::new(),
            pointer: PointerState::default(),
            orbit_input: OrbitInput::default(),
            rng,
            elapsed: 0.0,
            frame_count: 0,
            last_timestamp: None,
            running: false,
            config,
        })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Build the scene and attach the render surface
    ///
    /// Mounting twice is a no-op. If the backend cannot attach, everything
    /// built so far is released and the error is returned.
    pub fn mount(&mut self, viewport: Viewport) -> Result<()> {
        if self.mounted.is_some() {
            tracing::debug!("mount ignored, already mounted");
            return Ok(());
        }
        if !viewport.is_valid() {
            return Err(PlatformError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            }
            .into());
        }

        let mounted = self.build_stage(viewport);
        if let Err(err) = self.backend.attach(viewport) {
            tracing::warn!(%err, backend = self.backend.name(), "render surface attach failed");
            self.scene.clear();
            self.backend.detach();
            return Err(err.into());
        }

        self.mounted = Some(mounted);
        self.viewport = viewport;
        for kind in ListenerKind::ALL {
            self.listeners.register(kind);
        }
        if self.commands.is_closed() {
            self.commands = CommandQueue::new();
        }
        self.running = true;
        self.last_timestamp = None;

        tracing::info!(
            backend = self.backend.name(),
            width = viewport.width,
            height = viewport.height,
            nodes = self.scene.len(),
            "viewer mounted"
        );
        Ok(())
    }

    fn build_stage(&mut self, viewport: Viewport) -> Mounted {
        let config = &self.config;
        let root = self.scene.root();
        Dressing::build(&mut self.scene, root);
        let (rig, targets) = Rig::build(&mut self.scene, root);
        let accessories = Accessories::build(&mut self.scene, &rig);
        let game = MiniGame::new(&mut self.scene, root, &config.game);

        let camera = views::build_camera(config, viewport.aspect());
        let orbit = views::build_orbit(config, &camera);

        let render = &config.render;
        let outline = OutlinePass {
            edge_color: config.outline_color(),
            edge_strength: render.outline_strength,
            ..Default::default()
        };
        let bloom = BloomPass {
            strength: render.bloom_strength,
            radius: render.bloom_radius,
            threshold: render.bloom_threshold,
            enabled: render.bloom_enabled,
        };
        let chain = PostProcessChain::new(config.clear_color(), outline, bloom);
        let highlighter = Highlighter::new(config.highlight_color(), render.highlight_intensity);
        let idle = IdleMotion::new(&config.idle, &mut self.rng);

        self.locomotion = Locomotion::new();
        self.gestures = Gestures::new(config.pose.salute_duration);
        self.auto_walk = AutoWalk::new(
            config.locomotion.auto_walk_rate,
            config.locomotion.auto_walk_magnitude,
        );
        self.input.clear();
        self.elapsed = 0.0;
        self.frame_count = 0;

        Mounted {
            rig,
            targets,
            accessories,
            game,
            camera,
            orbit,
            chain,
            highlighter,
            idle,
        }
    }

    /// Stop frames, remove listeners, release the scene, and detach
    ///
    /// Safe to call repeatedly and after a failed mount.
    pub fn unmount(&mut self) {
        let was_mounted = self.mounted.is_some();
        self.running = false;
        self.last_timestamp = None;

        let listeners = self.listeners.clear();
        if let Some(mut mounted) = self.mounted.take() {
            mounted.game.dispose(&mut self.scene);
            mounted.highlighter.reset();
        }
        let nodes = self.scene.clear();
        self.backend.detach();
        self.commands.close();
        self.notifications.clear();

        self.outbox.clear();
        self.pending_poses.clear();
        self.input.clear();
        self.pointer = PointerState::default();
        self.orbit_input.clear();

        if was_mounted {
            tracing::info!(nodes, listeners, "viewer unmounted");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Whether the host should schedule another frame
    pub fn wants_frame(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Frame loop
    // ========================================================================

    /// Run one frame at `timestamp` seconds
    ///
    /// The first frame after mount advances by zero.
    pub fn frame(&mut self, timestamp: f64) -> Result<()> {
        if !self.running {
            return Ok(());
        }
        let dt = match self.last_timestamp {
            Some(previous) => (timestamp - previous) as f32,
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp);
        self.tick(dt)
    }

    /// Run one frame with an explicit time step
    pub fn tick(&mut self, dt: f32) -> Result<()> {
        if self.mounted.is_none() {
            return Ok(());
        }
        let dt = self.sanitize_dt(dt);
        self.elapsed += dt;
        self.frame_count = self.frame_count.wrapping_add(1);

        self.poll_gamepad();
        for command in self.commands.drain() {
            self.apply_command(command);
        }
        self.update_camera(dt);
        self.update_character(dt);
        self.update_game(dt);
        self.update_picking();
        self.publish();
        self.render(dt)
    }

    fn sanitize_dt(&self, dt: f32) -> f32 {
        let max = self.config.max_frame_dt;
        if !dt.is_finite() || dt < 0.0 {
            tracing::warn!(dt, "invalid frame time, using zero");
            0.0
        } else if dt > max {
            tracing::warn!(dt, max, "frame time clamped");
            max
        } else {
            dt
        }
    }

    fn poll_gamepad(&mut self) {
        if !self.listeners.is_listening(ListenerKind::Gamepad) {
            return;
        }
        let snapshot = self.gamepad.poll();
        let actions = self
            .input
            .apply_gamepad(snapshot.as_ref(), self.config.input.gamepad_deadzone);
        if actions.salute {
            self.gestures.salute();
        }
        match actions.wave {
            Some(true) => self.gestures.start_wave(),
            Some(false) => self.gestures.stop_wave(),
            None => {}
        }
    }

    fn apply_command(&mut self, command: Command) {
        tracing::debug!(?command, "command");
        let Some(m) = self.mounted.as_mut() else {
            return;
        };
        match command {
            Command::SetView(view) => {
                views::apply_view(view, &self.config, &mut m.camera, &mut m.orbit);
            }
            Command::Pose(pose) => self.pending_poses.push(pose),
            Command::ToggleWave => self.gestures.toggle_wave(),
            Command::StartWave => self.gestures.start_wave(),
            Command::StopWave => self.gestures.stop_wave(),
            Command::Salute => self.gestures.salute(),
            Command::Speed(requested) => {
                let applied = self.locomotion.set_speed(requested, &self.config.locomotion);
                if applied != requested {
                    tracing::debug!(requested, applied, "speed clamped");
                }
            }
            Command::Accessory { accessory, enabled } => {
                m.accessories.set_enabled(accessory, enabled);
            }
            Command::Walk { active, pattern } => {
                if active {
                    self.auto_walk.start(pattern);
                } else {
                    self.auto_walk.stop();
                }
            }
            Command::Game(GameAction::Start) => {
                m.game.start(&mut self.scene, &self.config.game, &mut self.outbox);
            }
            Command::Game(GameAction::Stop) => m.game.stop(&mut self.scene),
            Command::Move { direction, state } => match state {
                Some(MoveState::Start) => self.input.set_button(direction, true),
                Some(MoveState::Stop) => self.input.set_button(direction, false),
                None => self
                    .input
                    .step(direction, self.config.locomotion.step_duration),
            },
        }
    }

    fn update_camera(&mut self, dt: f32) {
        let Some(m) = self.mounted.as_mut() else {
            return;
        };
        let pose = m.orbit.update(
            &self.orbit_input,
            self.viewport.height,
            m.camera.fov_radians(),
            dt,
        );
        if let Some(pose) = pose {
            m.camera.set_position(pose.position);
            m.camera.look_at(pose.target);
        }
        self.orbit_input.clear();
    }

    fn update_character(&mut self, dt: f32) {
        let Some(m) = self.mounted.as_mut() else {
            return;
        };
        let config = &self.config;

        // 1. velocity and position
        self.auto_walk.advance(dt);
        let direction = if self.input.has_intent() {
            self.input.intent()
        } else {
            self.auto_walk.direction()
        };
        self.locomotion.integrate(direction, &config.locomotion, dt);
        self.input.advance(dt);

        // 2. walk cycle
        self.locomotion.advance_gait(&config.locomotion, dt);
        self.locomotion.write_targets(&mut m.targets);
        if let Some(t) = self.scene.transform_mut(m.rig.node(Part::Root)) {
            *t = self.locomotion.root_transform();
        }

        // 3. poses
        for pose in self.pending_poses.drain(..) {
            apply_pose(pose, &config.pose, &mut m.targets, &mut self.gestures);
        }

        // 4. gestures
        self.gestures.update(&config.pose, &mut m.targets, dt);

        // 5. rotation damping
        m.targets
            .drive(&mut self.scene, &m.rig, config.pose.rotation_damping, dt);

        // 6. accessories
        m.accessories
            .update(&mut self.scene, &config.accessories, self.elapsed, dt);

        // 7. idle
        let chest_held = m.highlighter.hovered() == Some(Part::ChestLight);
        m.idle.update(
            &config.idle,
            &mut self.rng,
            &mut self.scene,
            &m.rig,
            self.elapsed,
            dt,
            chest_held,
        );
    }

    fn update_game(&mut self, dt: f32) {
        let Some(m) = self.mounted.as_mut() else {
            return;
        };
        let p = self.locomotion.position;
        m.game.update(
            &mut self.scene,
            &self.config.game,
            &mut self.rng,
            Vec3::new(p.x, 0.0, p.z),
            dt,
            &mut self.outbox,
        );
    }

    fn update_picking(&mut self) {
        let Some(m) = self.mounted.as_mut() else {
            return;
        };

        if let Some(click) = self.pointer.click.take() {
            let ray = m.camera.ray_from_ndc(self.viewport.to_ndc(click.x, click.y));
            m.game
                .click(&mut self.scene, &self.config.game, &ray, &mut self.outbox);
        }

        if std::mem::take(&mut self.pointer.hover_dirty) {
            let part = self.pointer.position.and_then(|pos| {
                let ray = m.camera.ray_from_ndc(self.viewport.to_ndc(pos.x, pos.y));
                let hit = pick_nearest(&self.scene, m.rig.mesh_nodes(), &ray)?;
                m.rig.part_of(hit.node)
            });
            if m
                .highlighter
                .set_hover(&mut self.scene, &m.rig, &mut m.chain, part)
            {
                self.outbox.push(Notification::PieceHover {
                    name: part.map(Part::name),
                });
            }
        }
    }

    fn publish(&mut self) {
        for notification in self.outbox.drain(..) {
            match notification {
                Notification::GameOver { score } => tracing::info!(score, "game over published"),
                _ => tracing::debug!(event = notification.event_name(), "notify"),
            }
            self.notifications.publish(&notification);
        }
    }

    fn render(&mut self, dt: f32) -> Result<()> {
        let Some(m) = self.mounted.as_ref() else {
            return Ok(());
        };
        let frame = FrameDescription::build(
            &self.scene,
            &m.camera,
            TimeUniform::new(self.elapsed, dt, self.frame_count),
            &m.chain,
        );
        self.backend.render(&frame)?;
        Ok(())
    }

    // ========================================================================
    // Host interface
    // ========================================================================

    /// A sender for queuing commands from elsewhere
    ///
    /// Senders stop delivering once the viewer unmounts.
    pub fn sender(&self) -> CommandSender<Command> {
        self.commands.sender()
    }

    /// Queue a command for the next frame
    pub fn dispatch(&mut self, command: Command) -> bool {
        self.commands.sender().send(command)
    }

    /// Parse and queue a named command; malformed payloads are dropped
    pub fn dispatch_named(&mut self, name: &str, payload: &serde_json::Value) -> bool {
        match Command::parse(name, payload) {
            Some(command) => self.dispatch(command),
            None => {
                tracing::debug!(name, %payload, "ignored unrecognized command");
                false
            }
        }
    }

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionHandle
    where
        F: FnMut(&Notification) + 'static,
    {
        self.notifications.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        self.notifications.unsubscribe(handle)
    }

    /// Route a host input event
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Keyboard(key) => {
                if self.listeners.is_listening(ListenerKind::Keyboard) {
                    self.input.handle_key(&key);
                }
            }
            InputEvent::Pointer(pointer) => {
                if self.listeners.is_listening(ListenerKind::Pointer) {
                    self.handle_pointer(pointer);
                }
            }
            InputEvent::Wheel { delta_y } => {
                if self.listeners.is_listening(ListenerKind::Pointer) && delta_y != 0.0 {
                    self.orbit_input.zoom += delta_y.signum();
                }
            }
        }
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        let game_active = self.mounted.as_ref().is_some_and(|m| m.game.is_active());
        match event {
            PointerEvent::Moved { x, y } => {
                let position = Vec2::new(x, y);
                if let (Some(button), Some(previous)) = (self.pointer.drag, self.pointer.position) {
                    let delta = position - previous;
                    match button {
                        MouseButton::Left => self.orbit_input.rotate = self.orbit_input.rotate + delta,
                        _ => self.orbit_input.pan = self.orbit_input.pan + delta,
                    }
                } else {
                    self.pointer.hover_dirty = true;
                }
                self.pointer.position = Some(position);
            }
            PointerEvent::ButtonPressed { button, x, y } => {
                let position = Vec2::new(x, y);
                self.pointer.position = Some(position);
                if button == MouseButton::Left && game_active {
                    self.pointer.click = Some(position);
                } else {
                    self.pointer.drag = Some(button);
                }
            }
            PointerEvent::ButtonReleased { .. } => self.pointer.drag = None,
            PointerEvent::Left => {
                self.pointer.position = None;
                self.pointer.drag = None;
                self.pointer.hover_dirty = true;
            }
        }
    }

    /// Resize the surface and camera aspect
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        let viewport = Viewport::new(width, height)?;
        self.viewport = viewport;
        if let Some(m) = self.mounted.as_mut() {
            m.camera.set_aspect(viewport.aspect());
            if self.listeners.is_listening(ListenerKind::Resize) {
                self.backend.resize(viewport)?;
            }
        }
        Ok(())
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn gamepad_mut(&mut self) -> &mut G {
        &mut self.gamepad
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn resource_stats(&self) -> ResourceStats {
        self.scene.stats()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifications.subscriber_count()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        self.mounted.as_ref().map(|m| &m.camera)
    }

    pub fn orbit(&self) -> Option<&OrbitController> {
        self.mounted.as_ref().map(|m| &m.orbit)
    }

    pub fn rig(&self) -> Option<&Rig> {
        self.mounted.as_ref().map(|m| &m.rig)
    }

    pub fn targets(&self) -> Option<&RotationTargets> {
        self.mounted.as_ref().map(|m| &m.targets)
    }

    /// Current local rotation of a rig part
    pub fn part_rotation(&self, part: Part) -> Option<Euler> {
        let m = self.mounted.as_ref()?;
        self.scene.transform(m.rig.node(part)).map(|t| t.rotation)
    }

    pub fn robot_position(&self) -> Vec3 {
        self.locomotion.position
    }

    pub fn robot_velocity(&self) -> Vec3 {
        self.locomotion.velocity
    }

    pub fn robot_facing(&self) -> f32 {
        self.locomotion.facing
    }

    pub fn speed_scale(&self) -> f32 {
        self.locomotion.speed_scale()
    }

    pub fn movement(&self) -> MovementState {
        self.input.movement()
    }

    pub fn is_auto_walking(&self) -> bool {
        self.auto_walk.active
    }

    pub fn is_waving(&self) -> bool {
        self.gestures.is_waving()
    }

    pub fn is_saluting(&self) -> bool {
        self.gestures.is_saluting()
    }

    pub fn accessory_blend(&self, accessory: Accessory) -> Option<f32> {
        self.mounted
            .as_ref()
            .map(|m| m.accessories.state(accessory).blend())
    }

    pub fn accessory_visible(&self, accessory: Accessory) -> bool {
        self.mounted.as_ref().is_some_and(|m| {
            self.scene
                .is_visible_in_tree(m.accessories.state(accessory).group)
        })
    }

    pub fn hovered(&self) -> Option<Part> {
        self.mounted.as_ref().and_then(|m| m.highlighter.hovered())
    }

    pub fn outline_selection(&self) -> Option<robolab_3d::NodeId> {
        self.mounted.as_ref().and_then(|m| m.chain.selection())
    }

    pub fn game_phase(&self) -> GamePhase {
        self.mounted
            .as_ref()
            .map_or(GamePhase::Inactive, |m| m.game.phase())
    }

    pub fn score(&self) -> u32 {
        self.mounted.as_ref().map_or(0, |m| m.game.score())
    }

    pub fn life(&self) -> (u32, u32) {
        self.mounted
            .as_ref()
            .map_or((self.config.game.life_max, self.config.game.life_max), |m| {
                m.game.life()
            })
    }

    pub fn projectile_count(&self) -> usize {
        self.mounted
            .as_ref()
            .map_or(0, |m| m.game.projectiles().len())
    }

    /// Place a projectile directly, bypassing the spawner
    #[cfg(test)]
    pub(crate) fn inject_projectile(&mut self, position: Vec3, velocity: Vec3, ttl: f32) -> Option<robolab_3d::NodeId> {
        let m = self.mounted.as_mut()?;
        Some(
            m.game
                .inject_projectile(&mut self.scene, &self.config.game, position, velocity, ttl),
        )
    }
}

impl<B: RenderBackend, G: GamepadSource> Drop for RobotViewer<B, G> {
    fn drop(&mut self) {
        self.unmount();
    }
}
