// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time kernel for the Julia family z ← z² + c.
//!
//! Each point of the logical plane is fed in as z₀, squared and
//! shifted by the constant until it either escapes past radius 2 or
//! runs out of iterations.  Once |z| exceeds 2 the orbit can only run
//! away, so a radius of 2 is enough to call it.

use image::Rgba;
use num::Complex;

/// Interior points are left transparent.
pub const INTERIOR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// This is our classic iterator function, which either returns the
/// iteration at which `z` escaped, or nothing at all if the orbit
/// stayed bounded for `limit` steps.  Escape is tested before each
/// squaring, so a starting point already outside the radius escapes
/// at iteration 0.
pub fn iterate(z: Complex<f64>, c: Complex<f64>, limit: usize) -> Option<usize> {
    let mut z = z;
    for i in 0..limit {
        if z.norm_sqr() > 4.0 {
            return Some(i);
        }
        z = z * z + c;
    }
    None
}

/// Turns an escape iteration into a color.  The channels are small
/// multiples of `k` wrapped at 255, so bands repeat with a period of
/// 255 iterations.
pub fn palette(k: usize) -> Rgba<u8> {
    Rgba([
        ((3 * k + 17) % 0xFF) as u8,
        ((2 * k + 1) % 0xFF) as u8,
        ((k + 1) % 0xFF) as u8,
        0xFF,
    ])
}

/// Classify and color one logical point.
pub fn color_at(z: Complex<f64>, c: Complex<f64>, limit: usize) -> Rgba<u8> {
    match iterate(z, c, limit) {
        Some(k) => palette(k),
        None => INTERIOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_constant_keeps_the_unit_disk() {
        let c = Complex::new(0.0, 0.0);
        for &z in [
            Complex::new(0.0, 0.0),
            Complex::new(1.0, 0.0),
            Complex::new(0.5, -0.5),
            Complex::new(0.0, -0.999),
        ]
        .iter()
        {
            assert_eq!(iterate(z, c, 1), None, "{} escaped", z);
            assert_eq!(iterate(z, c, 500), None, "{} escaped", z);
        }
    }

    #[test]
    fn zero_constant_never_escapes_first_inside_two() {
        // With c = 0, |z| < 2 is never caught on the first check; whether
        // it escapes later depends on |z| > 1.
        let c = Complex::new(0.0, 0.0);
        for &z in [Complex::new(0.0, 1.999), Complex::new(-1.2, 1.2)].iter() {
            assert_eq!(iterate(z, c, 1), None);
            assert_ne!(iterate(z, c, 50), Some(0));
        }
    }

    #[test]
    fn zero_constant_releases_everything_past_two() {
        let c = Complex::new(0.0, 0.0);
        for &z in [
            Complex::new(2.001, 0.0),
            Complex::new(0.0, -3.0),
            Complex::new(1.5, 1.5),
        ]
        .iter()
        {
            assert_eq!(iterate(z, c, 1), Some(0));
            assert_eq!(iterate(z, c, 10_000), Some(0));
        }
    }

    #[test]
    fn minus_one_cycles_forever() {
        let c = Complex::new(-1.0, 0.0);
        let z = Complex::new(0.0, 0.0);
        for &limit in [1, 2, 3, 100, 10_000].iter() {
            assert_eq!(iterate(z, c, limit), None);
        }
    }

    #[test]
    fn three_escapes_immediately() {
        let z = Complex::new(3.0, 0.0);
        for &c in [
            Complex::new(0.0, 0.0),
            Complex::new(-0.9, 0.1),
            Complex::new(0.3, -0.6),
        ]
        .iter()
        {
            assert_eq!(iterate(z, c, 1), Some(0));
        }
    }

    #[test]
    fn slow_escape_is_counted() {
        // 1.5 → 2.25: escapes on the check after the first squaring.
        assert_eq!(iterate(Complex::new(1.5, 0.0), Complex::new(0.0, 0.0), 10), Some(1));
        assert_eq!(iterate(Complex::new(1.5, 0.0), Complex::new(0.0, 0.0), 1), None);
    }

    #[test]
    fn palette_repeats_and_bands() {
        for k in 0..600 {
            assert_eq!(palette(k), palette(k + 255));
            assert_eq!(palette(k).0[3], 0xFF);
        }
        assert_ne!(palette(0), palette(1));
        assert_eq!(palette(0), Rgba([17, 1, 1, 0xFF]));
    }

    #[test]
    fn interior_is_transparent() {
        let c = Complex::new(-1.0, 0.0);
        assert_eq!(color_at(Complex::new(0.0, 0.0), c, 64), INTERIOR);
        assert_eq!(color_at(Complex::new(5.0, 0.0), c, 64), palette(0));
    }
}
