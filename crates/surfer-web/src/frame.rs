//! Per-frame driver: polls asset loads, advances the simulation state, and
//! hands the renderer one `FrameInputs` snapshot per animation frame.

use std::cell::RefCell;
use std::rc::Rc;

use instant::Instant;
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

use surfer_core::{
    AnimatedScalar, EquirectImage, FxPhase, LoadState, SceneModel, ScrollFx, ShipPose, TrailArena,
    UvScroll, ACCEL_EFFECT_LERP, CAMERA_BASE_FOV_DEG, EMISSIVE_ACTIVE_MAX, EMISSIVE_INITIAL,
    EMISSIVE_LERP_RATE_PER_SEC, EMISSIVE_RESTING, WORMHOLE1_OFFSET_SPEED, WORMHOLE2_OFFSET_SPEED,
};

use crate::input;
use crate::render::{FrameInputs, GpuState, ModelKind, ParticleInstance};

pub struct FrameContext {
    pub canvas: web::HtmlCanvasElement,
    pub gpu: GpuState<'static>,
    pub mouse: Rc<RefCell<input::MouseState>>,
    pub fx: Rc<RefCell<ScrollFx>>,

    pub ship_slot: Rc<RefCell<LoadState<SceneModel>>>,
    pub wormhole_slot: Rc<RefCell<LoadState<SceneModel>>>,
    pub env_slot: Rc<RefCell<LoadState<EquirectImage>>>,

    emissive: AnimatedScalar,
    boost: AnimatedScalar,
    fov: AnimatedScalar,
    ship: ShipPose,
    trail: TrailArena,
    wormhole_uv: [UvScroll; 2],
    rng: StdRng,
    instances: Vec<ParticleInstance>,

    last_instant: Instant,
    time_accum: f32,
}

impl FrameContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        canvas: web::HtmlCanvasElement,
        gpu: GpuState<'static>,
        mouse: Rc<RefCell<input::MouseState>>,
        fx: Rc<RefCell<ScrollFx>>,
        ship_slot: Rc<RefCell<LoadState<SceneModel>>>,
        wormhole_slot: Rc<RefCell<LoadState<SceneModel>>>,
        env_slot: Rc<RefCell<LoadState<EquirectImage>>>,
    ) -> Self {
        let mut emissive = AnimatedScalar::new(EMISSIVE_INITIAL);
        emissive.target = EMISSIVE_RESTING;
        Self {
            canvas,
            gpu,
            mouse,
            fx,
            ship_slot,
            wormhole_slot,
            env_slot,
            emissive,
            boost: AnimatedScalar::new(0.0),
            fov: AnimatedScalar::new(CAMERA_BASE_FOV_DEG),
            ship: ShipPose::new(),
            trail: TrailArena::new(),
            wormhole_uv: [
                UvScroll::new(WORMHOLE1_OFFSET_SPEED),
                UvScroll::new(WORMHOLE2_OFFSET_SPEED),
            ],
            rng: StdRng::from_entropy(),
            instances: Vec::new(),
            last_instant: Instant::now(),
            time_accum: 0.0,
        }
    }

    pub fn frame(&mut self) {
        let now = Instant::now();
        // Clamp dt so a backgrounded tab does not dump a huge step on resume
        let dt = (now - self.last_instant).as_secs_f32().min(0.1);
        self.last_instant = now;
        self.time_accum += dt;

        self.install_ready_assets();

        let now_ms = web::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0);
        let decaying = {
            let mut fx = self.fx.borrow_mut();
            fx.tick(now_ms);
            let targets = fx.targets();
            self.emissive.target = targets.emissive;
            self.boost.target = targets.boost_z;
            self.fov.target = targets.fov_deg;
            fx.phase() == FxPhase::Decaying
        };
        self.emissive.step_scaled(dt, EMISSIVE_LERP_RATE_PER_SEC);
        self.boost.step_fixed(ACCEL_EFFECT_LERP);
        self.fov.step_fixed(ACCEL_EFFECT_LERP);
        if decaying
            && self.emissive.settled(0.5)
            && self.boost.settled(0.05)
            && self.fov.settled(0.05)
        {
            self.fx.borrow_mut().settle();
        }

        let mouse_ndc = self.mouse.borrow().ndc;
        self.ship.update(mouse_ndc, self.boost.current);

        self.trail
            .emit_from_ship(&self.ship, self.emissive.current, dt, &mut self.rng);
        self.trail.update(dt);

        for uv in &mut self.wormhole_uv {
            uv.advance(dt);
        }

        self.instances.clear();
        for p in self.trail.iter() {
            self.instances.push(ParticleInstance {
                position: p.position.to_array(),
                scale: p.scale(),
                opacity: p.opacity(),
            });
        }

        // Normalized acceleration intensity for the speed-lines overlay
        let scroll_active = ((self.emissive.current - EMISSIVE_RESTING)
            / (EMISSIVE_ACTIVE_MAX - EMISSIVE_RESTING))
            .clamp(0.0, 1.0);

        self.gpu
            .resize_if_needed(self.canvas.width(), self.canvas.height());
        let inputs = FrameInputs {
            fov_deg: self.fov.current,
            time: self.time_accum,
            scroll_active,
            ship_position: self.ship.position,
            ship_rotation: self.ship.quat(),
            ship_emissive: self.emissive.current,
            wormhole_uv: [self.wormhole_uv[0].offset, self.wormhole_uv[1].offset],
            particles: &self.instances,
        };
        if let Err(e) = self.gpu.render(&inputs) {
            log::error!("render error: {:?}", e);
        }
    }

    fn install_ready_assets(&mut self) {
        if let Some(model) = self.ship_slot.borrow_mut().take_ready() {
            self.gpu.install_model(&model, ModelKind::Ship);
            // Fly-in starts only once there is a ship to fly in.
            self.ship.begin_intro();
        }
        if let Some(model) = self.wormhole_slot.borrow_mut().take_ready() {
            self.gpu.install_model(&model, ModelKind::Wormhole);
        }
        if let Some(image) = self.env_slot.borrow_mut().take_ready() {
            self.gpu.install_env(&image);
        }
    }
}

/// Drive `FrameContext::frame` from requestAnimationFrame until the window
/// goes away.
pub fn start_loop(mut ctx: FrameContext) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        ctx.frame();
        if let Some(w) = web::window() {
            let _ = w.request_animation_frame(
                tick_clone
                    .borrow()
                    .as_ref()
                    .unwrap()
                    .as_ref()
                    .unchecked_ref(),
            );
        }
    }) as Box<dyn FnMut()>));
    if let Some(w) = web::window() {
        let _ =
            w.request_animation_frame(tick.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}
