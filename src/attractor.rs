// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The attractor kernel: a chaos game over a weighted set of affine
//! maps.
//!
//! Where the escape-time kernel asks one question per pixel, this one
//! wanders.  A single point is pushed through a randomly chosen map
//! over and over, and every place it lands is binned into a grid cell.
//! After enough steps the bins approximate the invariant density of
//! the attractor, and that density is what we paint.  The run starts
//! at the origin and nothing is thrown away, so the first few (still
//! converging) samples are binned along with the rest.

use image::Rgba;
use rand::Rng;

use crate::errors::ConfigError;
use crate::planes::{Pixel, Viewport};

/// How far the weights may drift from summing to one.
const WEIGHT_TOLERANCE: f64 = 1e-6;

/// x′ = ax + by + e, y′ = cx + dy + f, chosen with probability `weight`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AffineMap {
    /// x's contribution to x′.
    pub a: f64,
    /// y's contribution to x′.
    pub b: f64,
    /// x's contribution to y′.
    pub c: f64,
    /// y's contribution to y′.
    pub d: f64,
    /// Translation along x.
    pub e: f64,
    /// Translation along y.
    pub f: f64,
    /// Selection probability.
    pub weight: f64,
}

impl AffineMap {
    /// Moves one point.
    #[inline]
    pub fn apply(&self, (x, y): (f64, f64)) -> (f64, f64) {
        (
            self.a * x + self.b * y + self.e,
            self.c * x + self.d * y + self.f,
        )
    }
}

/// An ordered set of affine maps whose weights sum to one.  The order
/// matters: it decides which map wins a draw that lands exactly on a
/// cumulative boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct Ifs {
    maps: Vec<AffineMap>,
    cumulative: Vec<f64>,
}

impl Ifs {
    /// Takes the maps in selection order.  Fails if there are none, if
    /// any weight is negative or not finite, or if they don't sum to 1.
    pub fn new(maps: Vec<AffineMap>) -> Result<Ifs, ConfigError> {
        if maps.is_empty() {
            return Err(ConfigError::InvalidWeights("no maps".to_string()));
        }
        if let Some(bad) = maps.iter().find(|m| !m.weight.is_finite() || m.weight < 0.0) {
            return Err(ConfigError::InvalidWeights(format!(
                "weight {} is not a probability",
                bad.weight
            )));
        }
        let total: f64 = maps.iter().map(|m| m.weight).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::InvalidWeights(format!(
                "weights sum to {}, not 1",
                total
            )));
        }
        Ok(Ifs::from_checked(maps))
    }

    fn from_checked(maps: Vec<AffineMap>) -> Ifs {
        let cumulative = maps
            .iter()
            .scan(0.0, |acc, m| {
                *acc += m.weight;
                Some(*acc)
            })
            .collect();
        Ifs { maps, cumulative }
    }

    /// Barnsley's fern.
    pub fn fern() -> Ifs {
        #[rustfmt::skip]
        let maps = vec![
            AffineMap { a: 0.0,   b: 0.0,   c: 0.0,   d: 0.16, e: 0.0, f: 0.0,  weight: 0.01 },
            AffineMap { a: 0.85,  b: 0.04,  c: -0.04, d: 0.85, e: 0.0, f: 1.6,  weight: 0.85 },
            AffineMap { a: 0.2,   b: -0.26, c: 0.23,  d: 0.22, e: 0.0, f: 1.6,  weight: 0.07 },
            AffineMap { a: -0.15, b: 0.28,  c: 0.26,  d: 0.24, e: 0.0, f: 0.44, weight: 0.07 },
        ];
        Ifs::from_checked(maps)
    }

    /// Sierpinski's triangle: three half-size copies.
    pub fn sierpinski() -> Ifs {
        let third = 1.0 / 3.0;
        let half = |e, f| AffineMap {
            a: 0.5,
            b: 0.0,
            c: 0.0,
            d: 0.5,
            e,
            f,
            weight: third,
        };
        Ifs::from_checked(vec![half(0.0, 0.0), half(0.5, 0.0), half(0.25, 0.5)])
    }

    /// The maps, in selection order.
    pub fn maps(&self) -> &[AffineMap] {
        &self.maps
    }

    /// Given a draw `r` in [0, 1), pick the first map whose cumulative
    /// weight exceeds it.  Rounding can leave the last cumulative value
    /// a hair under 1, so anything past the end goes to the last map.
    pub fn select(&self, r: f64) -> usize {
        self.cumulative
            .iter()
            .position(|&edge| edge > r)
            .unwrap_or(self.maps.len() - 1)
    }

    /// One step of the chain.
    pub fn step<R: Rng + ?Sized>(&self, point: (f64, f64), rng: &mut R) -> (f64, f64) {
        let r: f64 = rng.gen();
        self.maps[self.select(r)].apply(point)
    }
}

/// Visit counts per grid cell.  Cells are clipped to the grid before
/// they get here, so the store is a flat buffer of `width * height`
/// counters and never grows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DensityHistogram {
    width: usize,
    height: usize,
    counts: Vec<u32>,
    max: u32,
}

impl DensityHistogram {
    /// An all-zero grid of `width` x `height` cells.
    pub fn new(width: usize, height: usize) -> DensityHistogram {
        DensityHistogram {
            width,
            height,
            counts: vec![0u32; width * height],
            max: 0,
        }
    }

    fn offset(&self, pixel: Pixel) -> Option<usize> {
        if pixel.0 < self.width && pixel.1 < self.height {
            Some(pixel.1 * self.width + pixel.0)
        } else {
            None
        }
    }

    /// Count one more visit to `pixel`.  Cells outside the grid are
    /// ignored.
    pub fn increment(&mut self, pixel: Pixel) {
        if let Some(offset) = self.offset(pixel) {
            let count = self.counts[offset].saturating_add(1);
            self.counts[offset] = count;
            if count > self.max {
                self.max = count;
            }
        }
    }

    /// Visits to `pixel` so far; zero for cells off the grid.
    pub fn count(&self, pixel: Pixel) -> u32 {
        self.offset(pixel).map(|o| self.counts[o]).unwrap_or(0)
    }

    /// The busiest cell's count, which every other count is measured
    /// against.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Every visited cell and its count, row by row.
    pub fn iter<'a>(&'a self) -> impl Iterator<Item = (Pixel, u32)> + 'a {
        let width = self.width;
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &count)| count > 0)
            .map(move |(i, &count)| (Pixel(i % width, i / width), count))
    }

    /// The raw counters, row-major.
    pub fn as_slice(&self) -> &[u32] {
        &self.counts
    }
}

/// Runs the chaos game for `samples` steps from the origin and bins
/// every landing point that falls on the grid described by `viewport`.
pub fn accumulate<R: Rng + ?Sized>(
    ifs: &Ifs,
    viewport: &Viewport,
    samples: usize,
    rng: &mut R,
) -> DensityHistogram {
    let mut histogram = DensityHistogram::new(viewport.width, viewport.height);
    let mut point = (0.0, 0.0);
    for _ in 0..samples {
        point = ifs.step(point, rng);
        if let Some(pixel) = viewport.point_to_pixel(point.0, point.1) {
            histogram.increment(pixel);
        }
    }
    histogram
}

/// Maps a normalized density onto a tinted ramp.  The exponent is
/// below one so that sparsely visited cells still show up.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DensityPalette {
    /// Gamma applied to the normalized density.
    pub exponent: f64,
    /// The color of the busiest cell.
    pub tint: [u8; 3],
}

impl Default for DensityPalette {
    fn default() -> Self {
        DensityPalette {
            exponent: 0.3,
            tint: [90, 255, 140],
        }
    }
}

impl DensityPalette {
    /// Colors a cell visited `count` times out of a busiest `max`.
    /// An empty histogram paints nothing.
    pub fn color(&self, count: u32, max: u32) -> Rgba<u8> {
        if max == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        let intensity = (f64::from(count) / f64::from(max)).powf(self.exponent);
        let channel = |top: u8| (intensity * f64::from(top)).round() as u8;
        Rgba([
            channel(self.tint[0]),
            channel(self.tint[1]),
            channel(self.tint[2]),
            0xFF,
        ])
    }
}

/// The attractors we know how to draw, and where each one sits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Attractor {
    /// Barnsley's fern.
    Fern,
    /// Sierpinski's triangle.
    Sierpinski,
}

impl Attractor {
    /// The map set that draws it.
    pub fn ifs(self) -> Ifs {
        match self {
            Attractor::Fern => Ifs::fern(),
            Attractor::Sierpinski => Ifs::sierpinski(),
        }
    }

    /// A center and scale that frame the whole attractor on a
    /// `width` x `height` grid without stretching it.  The y scale is
    /// negative so the picture comes out upright.
    pub fn default_view(self, width: usize, height: usize) -> ((f64, f64), (f64, f64)) {
        let aspect = (width as f64) / (height as f64);
        match self {
            Attractor::Fern => ((0.25, 5.0), (5.25 * aspect, -5.25)),
            Attractor::Sierpinski => ((0.5, 0.5), (0.6 * aspect, -0.6)),
        }
    }
}
