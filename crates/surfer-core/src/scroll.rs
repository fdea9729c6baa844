//! Scroll-driven acceleration effects as an explicit state machine.
//!
//! Scroll events arrive from the page at arbitrary times; the frame driver
//! ticks once per display refresh. Effects stay on only while qualifying
//! scroll deltas keep arriving within [`SCROLL_QUIET_WINDOW_MS`]; after that
//! the targets fall back to resting values and the animated scalars decay.

use crate::constants::*;

/// Which scroll direction arms the acceleration visuals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Down,
    Up,
    Both,
}

/// Compile-time choice, matching the page's downward hero scroll.
pub const EFFECT_SCROLL_DIRECTION: ScrollDirection = ScrollDirection::Down;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FxPhase {
    /// No recent qualifying scroll; all targets at rest.
    Resting,
    /// Qualifying scroll within the quiet window; boosted targets.
    Active,
    /// Quiet window expired; targets reset, scalars still converging.
    Decaying,
}

/// Interpolation targets owned by the state machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FxTargets {
    pub emissive: f32,
    pub boost_z: f32,
    pub fov_deg: f32,
}

impl FxTargets {
    pub fn resting() -> Self {
        Self {
            emissive: EMISSIVE_RESTING,
            boost_z: 0.0,
            fov_deg: CAMERA_BASE_FOV_DEG,
        }
    }

    fn boosted(emissive: f32) -> Self {
        Self {
            emissive,
            boost_z: -FORWARD_BOOST_AMOUNT,
            fov_deg: CAMERA_BASE_FOV_DEG - FOV_DECREASE_AMOUNT,
        }
    }
}

pub struct ScrollFx {
    phase: FxPhase,
    last_offset: f64,
    last_qualifying_ms: f64,
    targets: FxTargets,
}

impl ScrollFx {
    pub fn new(initial_offset: f64) -> Self {
        Self {
            phase: FxPhase::Resting,
            last_offset: initial_offset,
            last_qualifying_ms: f64::NEG_INFINITY,
            targets: FxTargets::resting(),
        }
    }

    pub fn phase(&self) -> FxPhase {
        self.phase
    }

    pub fn targets(&self) -> FxTargets {
        self.targets
    }

    pub fn is_active(&self) -> bool {
        self.phase == FxPhase::Active
    }

    /// Feed one scroll event (absolute page offset in CSS pixels).
    pub fn on_scroll(&mut self, offset: f64, now_ms: f64) {
        let delta = offset - self.last_offset;
        self.last_offset = offset;

        let qualifies = match EFFECT_SCROLL_DIRECTION {
            ScrollDirection::Down => delta > 0.0,
            ScrollDirection::Up => delta < 0.0,
            ScrollDirection::Both => delta != 0.0,
        };

        if qualifies {
            let emissive = if self.phase != FxPhase::Active {
                // Effects just switched on: jump to the ceiling.
                EMISSIVE_ACTIVE_MAX
            } else {
                // Already on: track scroll speed within the active band.
                let speed = (delta.abs() / SCROLL_SPEED_NORM_PX).min(1.0) as f32;
                EMISSIVE_ACTIVE_MIN + speed * (EMISSIVE_ACTIVE_MAX - EMISSIVE_ACTIVE_MIN)
            };
            self.targets =
                FxTargets::boosted(emissive.clamp(EMISSIVE_ACTIVE_MIN, EMISSIVE_ACTIVE_MAX));
            self.phase = FxPhase::Active;
            self.last_qualifying_ms = now_ms;
        } else {
            self.deactivate();
        }
    }

    /// Advance the quiet-window clock; call once per frame.
    pub fn tick(&mut self, now_ms: f64) {
        if self.phase == FxPhase::Active
            && now_ms - self.last_qualifying_ms > SCROLL_QUIET_WINDOW_MS
        {
            self.deactivate();
        }
    }

    /// Called by the frame driver once the animated scalars have converged
    /// back to rest, completing the Decaying -> Resting transition.
    pub fn settle(&mut self) {
        if self.phase == FxPhase::Decaying {
            self.phase = FxPhase::Resting;
        }
    }

    fn deactivate(&mut self) {
        self.targets = FxTargets::resting();
        if self.phase == FxPhase::Active {
            self.phase = FxPhase::Decaying;
        }
    }
}
