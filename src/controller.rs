// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The parameter controller.  Owns where we're looking (the viewport)
//! and what we're looking at (the Julia constant), applies discrete
//! commands to them, and raises the dirty flag whenever they change.

use log::debug;
use num::Complex;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::planes::Viewport;

/// Half-width of the uniform interval each drift step is drawn from.
pub const DRIFT_SPREAD: f64 = 0.0003;
/// Added to the imaginary drift so the constant wanders rather than
/// jitters in place.
pub const DRIFT_BIAS: f64 = -0.0001;

/// Discrete, one-shot commands.  Each arrives once per key press;
/// repeat handling belongs to whoever produces them.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Move the center left by one step of the x scale.
    PanLeft,
    /// Move the center right by one step of the x scale.
    PanRight,
    /// Move the center up by one step of the y scale.
    PanUp,
    /// Move the center down by one step of the y scale.
    PanDown,
    /// Multiply the scale by (1 + step).
    ZoomIn,
    /// Multiply the scale by (1 - step).
    ZoomOut,
    /// Regenerate without changing anything.
    Refresh,
    /// Write the current view out at high resolution.
    Export,
    /// Stop the session.
    Quit,
}

/// A read-only copy of the controller state, for status overlays.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Status {
    /// The logical point at the middle of the grid.
    pub center: (f64, f64),
    /// Logical half-extent per axis.
    pub scale: (f64, f64),
    /// The Julia constant.
    pub constant: Complex<f64>,
    /// The escape-time iteration cap.
    pub max_iterations: usize,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Center: ({},{}), Scale: ({},{}), maxIters: {}, cCoeff: {}",
            self.center.0,
            self.center.1,
            self.scale.0,
            self.scale.1,
            self.max_iterations,
            self.constant
        )
    }
}

/// The live view parameters, and the flag that says they changed.
///
/// Pans are kept as whole steps counted away from an origin, and the
/// center is recomputed from that count each time.  Undoing a pan
/// brings the count back to where it was, so the center comes back
/// bit for bit.  A zoom changes what a step is worth, so it folds the
/// count into a new origin first.
#[derive(Clone, Debug)]
pub struct ParameterController {
    viewport: Viewport,
    origin: (f64, f64),
    pans: (i64, i64),
    constant: Complex<f64>,
    step: f64,
    dirty: bool,
}

impl ParameterController {
    /// Starts dirty, so the first frame always gets drawn.
    pub fn new(viewport: Viewport, constant: Complex<f64>, step: f64) -> ParameterController {
        ParameterController {
            viewport,
            origin: viewport.center,
            pans: (0, 0),
            constant,
            step,
            dirty: true,
        }
    }

    /// The current viewport, by value.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The current Julia constant.
    pub fn constant(&self) -> Complex<f64> {
        self.constant
    }

    /// Replaces the Julia constant and marks the frame stale.
    pub fn set_constant(&mut self, constant: Complex<f64>) {
        self.constant = constant;
        self.dirty = true;
    }

    /// Whether anything changed since the last `take_dirty`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Hands the dirty flag to whoever is about to regenerate, and
    /// clears it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    fn pan(&mut self, dx: i64, dy: i64) {
        self.pans = (self.pans.0 + dx, self.pans.1 + dy);
        let (step, scale) = (self.step, self.viewport.scale);
        self.viewport.center = (
            self.origin.0 + (self.pans.0 as f64) * step * scale.0,
            self.origin.1 + (self.pans.1 as f64) * step * scale.1,
        );
    }

    fn zoom(&mut self, factor: f64) {
        self.origin = self.viewport.center;
        self.pans = (0, 0);
        self.viewport.scale.0 *= factor;
        self.viewport.scale.1 *= factor;
    }

    /// Applies a viewport command.  Pans move by a fraction of the
    /// current scale, so they feel the same at every zoom level.
    /// Export and Quit aren't ours and are ignored.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::PanLeft => self.pan(-1, 0),
            Command::PanRight => self.pan(1, 0),
            Command::PanUp => self.pan(0, -1),
            Command::PanDown => self.pan(0, 1),
            Command::ZoomIn => self.zoom(1.0 + self.step),
            Command::ZoomOut => self.zoom(1.0 - self.step),
            Command::Refresh => {}
            Command::Export | Command::Quit => return,
        }
        debug!(
            "{:?}: center {:?}, scale {:?}",
            command, self.viewport.center, self.viewport.scale
        );
        self.dirty = true;
    }

    /// Nudges the constant by a small random offset and marks the frame
    /// stale.  Touches nothing `apply` touches, so the two can run in
    /// either order.
    pub fn drift<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let spread = Uniform::new_inclusive(-DRIFT_SPREAD, DRIFT_SPREAD);
        let re = spread.sample(rng);
        let im = spread.sample(rng) + DRIFT_BIAS;
        self.constant += Complex::new(re, im);
        self.dirty = true;
    }

    /// A copy of the current state for display.
    pub fn status(&self, max_iterations: usize) -> Status {
        Status {
            center: self.viewport.center,
            scale: self.viewport.scale,
            constant: self.constant,
            max_iterations,
        }
    }
}
