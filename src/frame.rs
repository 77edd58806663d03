// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Frame regeneration.  A frame is always rebuilt from scratch out of
//! a `Snapshot`, a plain-value copy of everything the kernels need,
//! so the live view and a background export run exactly the same
//! code on exactly the same kind of input.

use crossbeam::thread::ScopedJoinHandle;
use image::Rgba;
use itertools::iproduct;
use log::info;
use num::Complex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::attractor::{self, Attractor, DensityHistogram, DensityPalette};
use crate::config::Kernel;
use crate::controller::ParameterController;
use crate::escape;
use crate::planes::{Pixel, Viewport};

/// One colored cell of the grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
    /// What to paint there.
    pub color: Rgba<u8>,
}

/// The knobs that don't change while you pan around.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderSettings {
    /// What fills the frame.
    pub kernel: Kernel,
    /// Escape-time iteration cap.
    pub max_iterations: usize,
    /// Chaos-game steps per attractor frame, whatever the grid size.
    pub samples: usize,
    /// Where every attractor regeneration starts its generator.
    pub seed: u64,
    /// Escape-time worker threads.
    pub threads: usize,
}

/// Everything a regeneration reads, copied by value.  Nothing in here
/// points back at live state, so a snapshot can be handed to another
/// thread while the live state keeps changing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// Where we were looking.
    pub viewport: Viewport,
    /// The Julia constant at the time.
    pub constant: Complex<f64>,
    /// How to render it.
    pub settings: RenderSettings,
}

impl Snapshot {
    /// Copies the controller's current state.
    pub fn capture(controller: &ParameterController, settings: &RenderSettings) -> Snapshot {
        Snapshot {
            viewport: controller.viewport(),
            constant: controller.constant(),
            settings: *settings,
        }
    }

    /// The same picture on a grid `factor` times larger per side.
    pub fn enlarged(&self, factor: usize) -> Snapshot {
        Snapshot {
            viewport: self.viewport.enlarged(factor),
            ..*self
        }
    }
}

/// Builds a complete frame for `snapshot`.
pub fn render(snapshot: &Snapshot) -> Vec<Point> {
    regenerate(snapshot).0
}

/// Builds a complete frame, plus the histogram behind it when the
/// kernel is an attractor.
pub fn regenerate(snapshot: &Snapshot) -> (Vec<Point>, Option<DensityHistogram>) {
    let settings = &snapshot.settings;
    match settings.kernel {
        Kernel::Julia => (
            render_escape(
                &snapshot.viewport,
                snapshot.constant,
                settings.max_iterations,
                settings.threads,
            ),
            None,
        ),
        Kernel::Attractor(which) => {
            let histogram = histogram(&snapshot.viewport, which, settings.samples, settings.seed);
            (paint_histogram(&histogram), Some(histogram))
        }
    }
}

/// Splits the grid into vertical bands, one per thread, and colors
/// every cell once.
fn render_escape(viewport: &Viewport, c: Complex<f64>, limit: usize, threads: usize) -> Vec<Point> {
    let viewport = *viewport;
    let threads = threads.max(1).min(viewport.width);
    let band = (viewport.width + threads - 1) / threads;

    crossbeam::scope(|spawner| {
        let handles: Vec<ScopedJoinHandle<Vec<Point>>> = (0..threads)
            .map(|t| {
                let columns = (t * band)..((t + 1) * band).min(viewport.width);
                spawner.spawn(move |_| {
                    iproduct!(columns, 0..viewport.height)
                        .map(|(x, y)| Point {
                            x,
                            y,
                            color: escape::color_at(viewport.pixel_to_point(&Pixel(x, y)), c, limit),
                        })
                        .collect()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| handle.join().expect("escape-time worker panicked"))
            .collect()
    })
    .expect("escape-time worker panicked")
}

/// The density field for an attractor.  The generator is reseeded
/// every time, so the same snapshot always bins the same samples.
pub fn histogram(viewport: &Viewport, which: Attractor, samples: usize, seed: u64) -> DensityHistogram {
    let mut rng = StdRng::seed_from_u64(seed);
    attractor::accumulate(&which.ifs(), viewport, samples, &mut rng)
}

fn paint_histogram(histogram: &DensityHistogram) -> Vec<Point> {
    let palette = DensityPalette::default();
    let max = histogram.max();
    histogram
        .iter()
        .map(|(Pixel(x, y), count)| Point {
            x,
            y,
            color: palette.color(count, max),
        })
        .collect()
}

/// The frame on display.  Replaced wholesale on every regeneration,
/// never patched.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    points: Vec<Point>,
    histogram: Option<DensityHistogram>,
    generation: u64,
}

impl FrameBuffer {
    /// An empty buffer that has never been generated.
    pub fn new() -> FrameBuffer {
        FrameBuffer::default()
    }

    /// Regenerates if, and only if, the controller says something
    /// changed since last time.  Returns whether it did.
    pub fn refresh(&mut self, controller: &mut ParameterController, settings: &RenderSettings) -> bool {
        if !controller.take_dirty() {
            return false;
        }
        info!("Generating fractal...");
        let (points, histogram) = regenerate(&Snapshot::capture(controller, settings));
        self.points = points;
        self.histogram = histogram;
        self.generation += 1;
        info!("Fractal updated.");
        true
    }

    /// The current frame, one point per painted cell.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The density field behind the current frame, for attractor kernels.
    pub fn histogram(&self) -> Option<&DensityHistogram> {
        self.histogram.as_ref()
    }

    /// How many times the buffer has been rebuilt.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
