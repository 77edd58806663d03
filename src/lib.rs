#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fractal explorer core
//!
//! Two kinds of pictures come out of here.  The first is the Julia
//! family: every point of the plane is fed through z ← z² + c and
//! colored by how quickly it runs off to infinity, if it does.  Let c
//! wander a little each frame and the set breathes.  The second is the
//! attractor of an iterated function system: a single point hops
//! between a handful of weighted affine maps, and the density of the
//! places it lands draws the shape (a fern, a triangle).
//!
//! Around those two kernels sits just enough machinery to explore
//! them: a viewport that can be panned and zoomed, a controller that
//! turns key presses into viewport changes and raises a dirty flag, a
//! frame buffer that only regenerates when that flag is up, and an
//! exporter that re-renders a copy of the current view at higher
//! resolution on a worker thread and writes it out as a PNG.
//!
//! Windows, input devices and on-screen text belong to the host.  The
//! core takes commands in and hands colored points out.

pub mod attractor;
pub mod config;
pub mod controller;
pub mod errors;
pub mod escape;
pub mod export;
pub mod frame;
pub mod planes;
pub mod session;

pub use config::{Config, Kernel};
pub use controller::{Command, ParameterController, Status};
pub use frame::{FrameBuffer, Point, Snapshot};
pub use planes::{remap, Viewport};
pub use session::{EventSource, FrameSink, Session, Signal};
