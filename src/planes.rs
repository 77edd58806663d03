//! Contains the Viewport, which describes a relationship between a
//! rectangle on the integral plane with an origin at 0,0, and a
//! rectangle on the real plane described by a center and a pair of
//! half-extents.  Unlike a corner-to-corner mapping, a center/scale
//! pair can be panned and zoomed with one multiply each, and a
//! negative scale flips an axis for free.
use num::Complex;

use crate::errors::ConfigError;

/// The one formula everything else is built on.  Takes a value
/// measured against one center and half-extent and re-expresses it
/// against another.  Swap the pairs to go back the other way.
///
/// `from_scale` must not be zero; nothing here checks.
#[inline]
pub fn remap(value: f64, from_center: f64, from_scale: f64, to_center: f64, to_scale: f64) -> f64 {
    (value - from_center) * (to_scale / from_scale) + to_center
}

/// Describes the x, y of a cell on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pixel(pub usize, pub usize);

/// The active rectangle of the logical plane, and the grid it's drawn
/// onto.  `center` lands on the middle of the grid; `scale` is how far
/// the logical plane reaches from the center to the grid's edge, per
/// axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Width of the integral plane, in cells.
    pub width: usize,
    /// Height of the integral plane, in cells.
    pub height: usize,
    /// The logical point at the middle of the grid.
    pub center: (f64, f64),
    /// Logical half-extent per grid half-dimension.
    pub scale: (f64, f64),
}

impl Viewport {
    /// Constructor.  Rejects the shapes that would make `remap`
    /// divide by zero.
    pub fn new(
        width: usize,
        height: usize,
        center: (f64, f64),
        scale: (f64, f64),
    ) -> Result<Viewport, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyGrid(width, height));
        }
        let usable = |s: f64| s.is_finite() && s != 0.0;
        if !usable(scale.0) || !usable(scale.1) {
            return Err(ConfigError::BadScale(scale.0, scale.1));
        }
        Ok(Viewport {
            width,
            height,
            center,
            scale,
        })
    }

    /// The same logical rectangle drawn onto a grid `factor` times
    /// larger on each side.
    pub fn enlarged(&self, factor: usize) -> Viewport {
        Viewport {
            width: self.width * factor,
            height: self.height * factor,
            ..*self
        }
    }

    fn grid_half(&self) -> (f64, f64) {
        ((self.width as f64) / 2.0, (self.height as f64) / 2.0)
    }

    /// Given a cell on the integral plane, return the logical point
    /// it stands for, as a complex number.
    pub fn pixel_to_point(&self, pixel: &Pixel) -> Complex<f64> {
        let (hw, hh) = self.grid_half();
        Complex::new(
            remap(pixel.0 as f64, hw, hw, self.center.0, self.scale.0),
            remap(pixel.1 as f64, hh, hh, self.center.1, self.scale.1),
        )
    }

    /// Given a logical point, find the cell it falls into, or `None`
    /// if it falls off the grid.  Off-grid points are never clamped
    /// onto the border.
    pub fn point_to_pixel(&self, x: f64, y: f64) -> Option<Pixel> {
        let (hw, hh) = self.grid_half();
        let left = remap(x, self.center.0, self.scale.0, hw, hw).floor();
        let top = remap(y, self.center.1, self.scale.1, hh, hh).floor();
        if !(left >= 0.0 && left < (self.width as f64) && top >= 0.0 && top < (self.height as f64))
        {
            return None;
        }
        Some(Pixel(left as usize, top as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
    }

    #[test]
    fn remap_is_self_inverse() {
        let cases = [
            (0.0, 0.0, 1.0, 512.0, 512.0),
            (123.5, -0.75, 0.001, 384.0, 384.0),
            (-7.25, 3.0, -2.5, 10.0, 1e6),
            (1e-3, 1e3, 1e-3, -1e3, 7.0),
        ];
        for &(x, a, b, c, d) in cases.iter() {
            let there = remap(x, a, b, c, d);
            assert!(close(remap(there, c, d, a, b), x), "{} -> {}", x, there);
        }
    }

    #[test]
    fn viewport_fails_on_bad_shape() {
        assert_eq!(
            Viewport::new(0, 4, (0.0, 0.0), (1.0, 1.0)),
            Err(ConfigError::EmptyGrid(0, 4))
        );
        assert!(Viewport::new(4, 4, (0.0, 0.0), (0.0, 1.0)).is_err());
        assert!(Viewport::new(4, 4, (0.0, 0.0), (1.0, std::f64::NAN)).is_err());
    }

    #[test]
    fn viewport_passes_on_good_shape() {
        let vp = Viewport::new(4, 3, (0.0, 0.0), (1.0, -1.0)).unwrap();
        assert_eq!((vp.width, vp.height), (4, 3));
        assert_eq!(vp.scale, (1.0, -1.0));
    }

    #[test]
    fn pixel_to_point_on_mixed_planes() {
        let vp = Viewport::new(4, 4, (0.0, 0.0), (2.0, 2.0)).unwrap();
        assert_eq!(vp.pixel_to_point(&Pixel(2, 2)), Complex::new(0.0, 0.0));
        assert_eq!(vp.pixel_to_point(&Pixel(0, 0)), Complex::new(-2.0, -2.0));
        assert_eq!(vp.pixel_to_point(&Pixel(4, 4)), Complex::new(2.0, 2.0));
    }

    #[test]
    fn pixel_to_point_follows_the_center() {
        let vp = Viewport::new(640, 480, (-0.5, 0.25), (1.0, 1.0)).unwrap();
        assert_eq!(vp.pixel_to_point(&Pixel(320, 240)), Complex::new(-0.5, 0.25));
        assert_eq!(vp.pixel_to_point(&Pixel(0, 0)), Complex::new(-1.5, -0.75));
    }

    #[test]
    fn point_to_pixel_maps_on_large_mixed_planes() {
        let vp = Viewport::new(640, 640, (0.0, 0.0), (2.0, 2.0)).unwrap();
        assert_eq!(vp.point_to_pixel(0.0, 0.0), Some(Pixel(320, 320)));
        assert_eq!(vp.point_to_pixel(-2.0, -2.0), Some(Pixel(0, 0)));
        assert_eq!(vp.point_to_pixel(1.0, 1.99), Some(Pixel(480, 638)));
    }

    #[test]
    fn point_to_pixel_drops_points_off_the_grid() {
        let vp = Viewport::new(640, 640, (0.0, 0.0), (2.0, 2.0)).unwrap();
        assert_eq!(vp.point_to_pixel(2.0, 2.0), None);
        assert_eq!(vp.point_to_pixel(-2.01, 0.0), None);
        assert_eq!(vp.point_to_pixel(0.0, 1e9), None);
        assert_eq!(vp.point_to_pixel(std::f64::NAN, 0.0), None);
    }

    #[test]
    fn negative_scale_flips_the_axis() {
        let vp = Viewport::new(10, 10, (0.0, 5.0), (5.0, -5.0)).unwrap();
        assert_eq!(vp.point_to_pixel(0.0, 9.9), Some(Pixel(5, 0)));
        assert_eq!(vp.point_to_pixel(0.0, 0.1), Some(Pixel(5, 9)));
    }

    #[test]
    fn enlarged_keeps_the_logical_rectangle() {
        let vp = Viewport::new(8, 6, (0.1, 0.2), (1.5, 1.0)).unwrap();
        let big = vp.enlarged(5);
        assert_eq!((big.width, big.height), (40, 30));
        assert_eq!(big.pixel_to_point(&Pixel(20, 15)), vp.pixel_to_point(&Pixel(4, 3)));
    }
}
