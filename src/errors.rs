// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error types.  Only two things can go wrong: the user hands us a
//! configuration we can't render, or an export can't reach the disk.
//! Everything else assumes its preconditions were checked here.

use failure::Fail;
use std::io;

/// Rejected at startup, before any frame is generated.
#[derive(Debug, Fail, PartialEq)]
pub enum ConfigError {
    /// The grid must have at least one cell.
    #[fail(display = "grid dimensions must be positive, got {}x{}", _0, _1)]
    EmptyGrid(usize, usize),

    /// A zero scale would divide by zero in every remap.
    #[fail(display = "viewport scale must be finite and nonzero, got ({}, {})", _0, _1)]
    BadScale(f64, f64),

    /// Nothing could ever escape.
    #[fail(display = "iteration cap must be at least 1")]
    ZeroIterations,

    /// An export must be at least as large as the frame.
    #[fail(display = "export multiplier must be at least 1")]
    ZeroMultiplier,

    /// IFS weights must be non-negative and sum to one.
    #[fail(display = "IFS weights are invalid: {}", _0)]
    InvalidWeights(String),

    /// A command-line value that made it past clap but still makes no sense.
    #[fail(display = "could not parse {}: {:?}", _0, _1)]
    Unparsable(&'static str, String),
}

/// Raised by a background export.  Logged, handed back through the
/// export handle, and never retried.
#[derive(Debug, Fail)]
pub enum ExportError {
    /// The directory or file could not be created or written.
    #[fail(display = "I/O error: {}", _0)]
    Io(#[cause] io::Error),

    /// The PNG encoder gave up.
    #[fail(display = "could not encode image: {}", _0)]
    Encode(String),

    /// No worker ever answered.
    #[fail(display = "export worker exited before finishing")]
    Abandoned,
}

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<image::ImageError> for ExportError {
    fn from(err: image::ImageError) -> Self {
        ExportError::Encode(err.to_string())
    }
}
