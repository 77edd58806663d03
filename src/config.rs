// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Startup configuration: the defaults, the clap argument table both
//! binaries share, and the conversion from one to the other.

use clap::{App, Arg, ArgMatches};
use num::Complex;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use crate::attractor::Attractor;
use crate::errors::ConfigError;
use crate::planes::Viewport;

/// Grid width, in cells.
pub const DEFAULT_WIDTH: usize = 1024;
/// Grid height, in cells.
pub const DEFAULT_HEIGHT: usize = 768;
/// Escape-time iteration cap.
pub const DEFAULT_ITERATIONS: usize = 10_000;
/// Export resolution multiplier.
pub const DEFAULT_MULTIPLIER: usize = 5;
/// Chaos-game steps per attractor frame.
pub const DEFAULT_SAMPLES: usize = 2_000_000;
/// Pan fraction and zoom step.
pub const DEFAULT_STEP: f64 = 0.3;
/// The Julia constant a session starts with.
pub const DEFAULT_CONSTANT: (f64, f64) = (-0.008, 0.85);
/// Export worker threads.
pub const DEFAULT_EXPORT_WORKERS: usize = 2;

/// Which kernel fills the frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Kernel {
    /// Escape time under z ← z² + c.
    Julia,
    /// Chaos-game density of one of the known attractors.
    Attractor(Attractor),
}

impl FromStr for Kernel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Kernel, ConfigError> {
        match s {
            "julia" => Ok(Kernel::Julia),
            "fern" => Ok(Kernel::Attractor(Attractor::Fern)),
            "sierpinski" => Ok(Kernel::Attractor(Attractor::Sierpinski)),
            _ => Err(ConfigError::Unparsable("kernel", s.to_string())),
        }
    }
}

impl Kernel {
    /// Where a fresh session starts looking.
    pub fn default_view(self, width: usize, height: usize) -> ((f64, f64), (f64, f64)) {
        match self {
            Kernel::Julia => ((0.0, 0.0), (1.0, 1.0)),
            Kernel::Attractor(a) => a.default_view(width, height),
        }
    }
}

/// Everything a session is started with.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Grid width, in cells.
    pub width: usize,
    /// Grid height, in cells.
    pub height: usize,
    /// Starting center; `None` picks the kernel's own framing.
    pub center: Option<(f64, f64)>,
    /// Starting scale; `None` picks the kernel's own framing.
    pub scale: Option<(f64, f64)>,
    /// The Julia constant.
    pub constant: Complex<f64>,
    /// What fills the frame.
    pub kernel: Kernel,
    /// Escape-time iteration cap.
    pub max_iterations: usize,
    /// Chaos-game steps per attractor frame.
    pub samples: usize,
    /// Seeds both the attractor and the drift.  `None` means a fresh
    /// seed per session.
    pub seed: Option<u64>,
    /// Fraction of the scale moved per pan, and the zoom factor step.
    pub step: f64,
    /// Drift the Julia constant every frame.
    pub animate: bool,
    /// How many times larger than the grid an export is, per side.
    pub multiplier: usize,
    /// Where exports are written.  Created on first export.
    pub output_dir: PathBuf,
    /// Escape-time worker threads.
    pub threads: usize,
    /// Export worker threads.
    pub export_workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            center: None,
            scale: None,
            constant: Complex::new(DEFAULT_CONSTANT.0, DEFAULT_CONSTANT.1),
            kernel: Kernel::Julia,
            max_iterations: DEFAULT_ITERATIONS,
            samples: DEFAULT_SAMPLES,
            seed: None,
            step: DEFAULT_STEP,
            animate: false,
            multiplier: DEFAULT_MULTIPLIER,
            output_dir: std::env::temp_dir(),
            threads: num_cpus::get(),
            export_workers: DEFAULT_EXPORT_WORKERS,
        }
    }
}

impl Config {
    /// The starting viewport, checked.
    pub fn viewport(&self) -> Result<Viewport, ConfigError> {
        let (center, scale) = self.kernel.default_view(self.width, self.height);
        Viewport::new(
            self.width,
            self.height,
            self.center.unwrap_or(center),
            self.scale.unwrap_or(scale),
        )
    }

    /// Everything that has to hold before the first frame.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewport()?;
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if self.multiplier == 0 {
            return Err(ConfigError::ZeroMultiplier);
        }
        Ok(())
    }

    /// Overlays whatever the user passed on top of the defaults.
    pub fn from_matches(matches: &ArgMatches) -> Result<Config, ConfigError> {
        let mut config = Config::default();
        if let Some(size) = matches.value_of(SIZE) {
            let (width, height) = parse_pair(size, 'x').ok_or_else(|| unparsable(SIZE, size))?;
            config.width = width;
            config.height = height;
        }
        if let Some(center) = matches.value_of(CENTER) {
            config.center = Some(parse_pair(center, ',').ok_or_else(|| unparsable(CENTER, center))?);
        }
        if let Some(scale) = matches.value_of(SCALE) {
            config.scale = Some(parse_pair(scale, ',').ok_or_else(|| unparsable(SCALE, scale))?);
        }
        if let Some(constant) = matches.value_of(CONSTANT) {
            config.constant = parse_complex(constant).ok_or_else(|| unparsable(CONSTANT, constant))?;
        }
        if let Some(kernel) = matches.value_of(KERNEL) {
            config.kernel = kernel.parse()?;
        }
        if let Some(n) = matches.value_of(ITERATIONS) {
            config.max_iterations = parse_one(ITERATIONS, n)?;
        }
        if let Some(n) = matches.value_of(SAMPLES) {
            config.samples = parse_one(SAMPLES, n)?;
        }
        if let Some(n) = matches.value_of(SEED) {
            config.seed = Some(parse_one(SEED, n)?);
        }
        if let Some(n) = matches.value_of(MULTIPLIER) {
            config.multiplier = parse_one(MULTIPLIER, n)?;
        }
        if let Some(n) = matches.value_of(THREADS) {
            config.threads = parse_one(THREADS, n)?;
        }
        if let Some(dir) = matches.value_of(OUTPUT_DIR) {
            config.output_dir = PathBuf::from(dir);
        }
        config.animate = matches.is_present(ANIMATE);
        config.validate()?;
        Ok(config)
    }
}

fn unparsable(what: &'static str, s: &str) -> ConfigError {
    ConfigError::Unparsable(what, s.to_string())
}

fn parse_one<T: FromStr>(what: &'static str, s: &str) -> Result<T, ConfigError> {
    T::from_str(s).map_err(|_| unparsable(what, s))
}

/// Splits `s` at the first `separator` and parses both halves, as in
/// `1024x768` or `-0.5,0.25`.
pub fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let index = s.find(separator)?;
    let left = s[..index].parse().ok()?;
    let right = s[index + separator.len_utf8()..].parse().ok()?;
    Some((left, right))
}

/// A pair of floats read as `re,im`.
pub fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex::new(re, im))
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    parse_pair::<T>(s, separator)
        .map(|_| ())
        .ok_or_else(|| err.to_string())
}

/// clap validator for a bounded count.  `what` names it in messages.
fn validate_range<T>(s: &str, range: RangeInclusive<T>, what: &str) -> Result<(), String>
where
    T: FromStr + PartialOrd + Display,
{
    let n: T = s
        .parse()
        .map_err(|_| format!("Could not parse {}", what.to_lowercase()))?;
    if range.contains(&n) {
        Ok(())
    } else {
        Err(format!(
            "{} must be between {} and {}",
            what,
            range.start(),
            range.end()
        ))
    }
}

const SIZE: &str = "size";
const CENTER: &str = "center";
const SCALE: &str = "scale";
const CONSTANT: &str = "constant";
const KERNEL: &str = "kernel";
const ITERATIONS: &str = "iterations";
const SAMPLES: &str = "samples";
const SEED: &str = "seed";
const MULTIPLIER: &str = "multiplier";
const OUTPUT_DIR: &str = "output-dir";
const THREADS: &str = "threads";
const ANIMATE: &str = "animate";

/// The argument table.  Both binaries take the same flags; only the
/// name and blurb differ.
pub fn app<'a, 'b>(name: &'static str, about: &'static str) -> App<'a, 'b> {
    App::new(name)
        .version(env!("CARGO_PKG_VERSION"))
        .about(about)
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse grid size"))
                .help("Grid size, WIDTHxHEIGHT [default: 1024x768]"),
        )
        .arg(
            Arg::with_name(CENTER)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center"))
                .help("Logical point at the middle of the grid, X,Y"),
        )
        .arg(
            Arg::with_name(SCALE)
                .long(SCALE)
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse scale"))
                .help("Logical half-extent of the grid, X,Y"),
        )
        .arg(
            Arg::with_name(CONSTANT)
                .long(CONSTANT)
                .short("k")
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse Julia constant"))
                .help("Julia constant, RE,IM [default: -0.008,0.85]"),
        )
        .arg(
            Arg::with_name(KERNEL)
                .long(KERNEL)
                .takes_value(true)
                .possible_values(&["julia", "fern", "sierpinski"])
                .help("What to draw [default: julia]"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(&s, 1..=1_000_000, "Iteration count")
                })
                .help("Escape-time iteration cap [default: 10000]"),
        )
        .arg(
            Arg::with_name(SAMPLES)
                .long(SAMPLES)
                .takes_value(true)
                .validator(move |s| {
                    validate_range(&s, 1..=1_000_000_000, "Sample count")
                })
                .help("Chaos-game steps per attractor frame [default: 2000000]"),
        )
        .arg(
            Arg::with_name(SEED)
                .long(SEED)
                .takes_value(true)
                .validator(|s| {
                    u64::from_str(&s)
                        .map(|_| ())
                        .map_err(|_| "Could not parse seed".to_string())
                })
                .help("Random seed for attractors and drift"),
        )
        .arg(
            Arg::with_name(MULTIPLIER)
                .long(MULTIPLIER)
                .short("m")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(&s, 1..=64, "Export multiplier")
                })
                .help("Export resolution multiplier [default: 5]"),
        )
        .arg(
            Arg::with_name(OUTPUT_DIR)
                .long(OUTPUT_DIR)
                .short("o")
                .takes_value(true)
                .help("Directory exported images are written to"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(&s, 1..=1024, "Thread count")
                })
                .help("Number of threads to use in the escape-time solver"),
        )
        .arg(
            Arg::with_name(ANIMATE)
                .long(ANIMATE)
                .short("a")
                .help("Let the Julia constant drift every frame"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, String> {
        let mut argv = vec!["test"];
        argv.extend_from_slice(args);
        let matches = app("test", "test")
            .get_matches_from_safe(argv)
            .map_err(|e| e.to_string())?;
        Config::from_matches(&matches).map_err(|e| e.to_string())
    }

    #[test]
    fn defaults_match_the_reference_viewer() {
        let config = parse(&[]).unwrap();
        assert_eq!((config.width, config.height), (1024, 768));
        assert_eq!(config.max_iterations, 10_000);
        assert_eq!(config.multiplier, 5);
        assert_eq!(config.constant, Complex::new(-0.008, 0.85));
        assert_eq!(config.kernel, Kernel::Julia);
        assert!(!config.animate);
        let vp = config.viewport().unwrap();
        assert_eq!((vp.center, vp.scale), ((0.0, 0.0), (1.0, 1.0)));
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "--size", "64x48", "--center", "-0.5,0.25", "--constant", "-1,0", "-i", "200",
            "--kernel", "fern", "--seed", "9", "-m", "2", "--animate",
        ])
        .unwrap();
        assert_eq!((config.width, config.height), (64, 48));
        assert_eq!(config.center, Some((-0.5, 0.25)));
        assert_eq!(config.constant, Complex::new(-1.0, 0.0));
        assert_eq!(config.max_iterations, 200);
        assert_eq!(config.kernel, Kernel::Attractor(Attractor::Fern));
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.multiplier, 2);
        assert!(config.animate);
    }

    #[test]
    fn attractors_frame_themselves() {
        let config = parse(&["--size", "40x30", "--kernel", "fern"]).unwrap();
        let vp = config.viewport().unwrap();
        assert_eq!(vp.center, (0.25, 5.0));
        assert!(vp.scale.1 < 0.0);
    }

    #[test]
    fn bad_values_are_refused() {
        assert!(parse(&["--size", "64by48"]).is_err());
        assert!(parse(&["--size", "0x48"]).is_err());
        assert!(parse(&["--scale", "0,1"]).is_err());
        assert!(parse(&["-m", "0"]).is_err());
        assert!(parse(&["--kernel", "mandelbrot"]).is_err());
        assert!(parse(&["--iterations", "lots"]).is_err());
    }

    #[test]
    fn pairs_parse() {
        assert_eq!(parse_pair::<usize>("10x20", 'x'), Some((10, 20)));
        assert_eq!(parse_pair::<f64>("1.5,", ','), None);
        assert_eq!(parse_complex("0.25,-1"), Some(Complex::new(0.25, -1.0)));
        assert_eq!(parse_complex("0.25"), None);
    }

    #[test]
    fn ranges_name_what_they_check() {
        assert_eq!(validate_range("64", 1..=64, "Export multiplier"), Ok(()));
        assert_eq!(
            validate_range("0", 1..=64, "Export multiplier"),
            Err("Export multiplier must be between 1 and 64".to_string())
        );
        assert_eq!(
            validate_range("five", 1..=64, "Export multiplier"),
            Err("Could not parse export multiplier".to_string())
        );
    }
}
