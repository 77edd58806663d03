// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The frame-stepped driver.  One thread owns everything here: it
//! takes a frame's worth of commands, applies them, drifts the
//! constant if asked to, regenerates at most once, and hands the
//! result to whoever is presenting it.  The only work that leaves this
//! thread is an export, and that leaves as a copy.
//!
//! Nothing in here ends the process.  A Quit comes back out as
//! `Signal::Terminate` and the host decides what that means.

use log::{debug, error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::io::BufRead;

use crate::config::{Config, Kernel};
use crate::controller::{Command, ParameterController, Status};
use crate::errors::ConfigError;
use crate::export::{ExportHandle, Exporter};
use crate::frame::{FrameBuffer, RenderSettings, Snapshot};

/// What the host should do after a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Signal {
    /// Keep stepping.
    Continue,
    /// A Quit came through; stop.
    Terminate,
}

/// Where commands come from.  Each call yields one frame's worth;
/// `None` means there will never be more.
pub trait EventSource {
    /// The next frame's commands, in the order they were issued.
    fn poll(&mut self) -> Option<Vec<Command>>;
}

/// Where regenerated frames go.
pub trait FrameSink {
    /// Shows a freshly regenerated frame.
    fn present(&mut self, frame: &FrameBuffer, status: &Status);
}

impl<F: FnMut(&FrameBuffer, &Status)> FrameSink for F {
    fn present(&mut self, frame: &FrameBuffer, status: &Status) {
        self(frame, status)
    }
}

/// The reference viewer's key bindings.
pub fn command_for_key(key: char) -> Option<Command> {
    match key {
        'a' => Some(Command::PanLeft),
        'd' => Some(Command::PanRight),
        'w' => Some(Command::PanUp),
        's' => Some(Command::PanDown),
        'q' => Some(Command::ZoomIn),
        'e' => Some(Command::ZoomOut),
        'u' => Some(Command::Refresh),
        'p' => Some(Command::Export),
        'z' => Some(Command::Quit),
        _ => None,
    }
}

/// Reads one line per frame and treats each character as a key press.
pub struct LineSource<R> {
    reader: R,
}

impl<R: BufRead> LineSource<R> {
    /// Wraps a line-oriented reader, usually stdin.
    pub fn new(reader: R) -> Self {
        LineSource { reader }
    }
}

impl<R: BufRead> EventSource for LineSource<R> {
    fn poll(&mut self) -> Option<Vec<Command>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.chars().filter_map(command_for_key).collect()),
            Err(err) => {
                error!("Could not read commands: {}", err);
                None
            }
        }
    }
}

/// A canned list of frames.  Runs dry after the last one.
#[derive(Debug, Default)]
pub struct Script {
    frames: VecDeque<Vec<Command>>,
}

impl Script {
    /// One entry per frame.
    pub fn new<I: IntoIterator<Item = Vec<Command>>>(frames: I) -> Self {
        Script {
            frames: frames.into_iter().collect(),
        }
    }
}

impl EventSource for Script {
    fn poll(&mut self) -> Option<Vec<Command>> {
        self.frames.pop_front()
    }
}

/// One explorer: the controller, the frame on display, and the export
/// pool, driven a frame at a time.
pub struct Session {
    controller: ParameterController,
    frame: FrameBuffer,
    settings: RenderSettings,
    exporter: Exporter,
    animate: bool,
    rng: StdRng,
}

impl Session {
    /// Validates `config` and starts the export workers.  Nothing is
    /// drawn until the first step.
    pub fn new(config: &Config) -> Result<Session, ConfigError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let settings = RenderSettings {
            kernel: config.kernel,
            max_iterations: config.max_iterations,
            samples: config.samples,
            seed,
            threads: config.threads,
        };
        let controller = ParameterController::new(config.viewport()?, config.constant, config.step);
        let exporter = Exporter::new(config.export_workers, config.output_dir.clone(), config.multiplier)?;
        info!(
            "{:?} on a {}x{} grid, seed {}",
            config.kernel, config.width, config.height, seed
        );
        Ok(Session {
            controller,
            frame: FrameBuffer::new(),
            settings,
            exporter,
            animate: config.animate,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Runs one frame.  Commands are applied in order; a Quit stops
    /// the frame where it stands.
    pub fn step(&mut self, commands: &[Command]) -> Signal {
        for &command in commands {
            match command {
                Command::Quit => return Signal::Terminate,
                Command::Export => {
                    self.export();
                }
                other => self.controller.apply(other),
            }
        }
        if self.animate && self.settings.kernel == Kernel::Julia {
            self.controller.drift(&mut self.rng);
            debug!("Drifted to {}", self.controller.constant());
        }
        self.frame.refresh(&mut self.controller, &self.settings);
        Signal::Continue
    }

    /// Hands a copy of the current view to the export pool.
    pub fn export(&mut self) -> ExportHandle {
        self.exporter
            .submit(Snapshot::capture(&self.controller, &self.settings))
    }

    /// Steps until told to quit or the source runs dry.  The first
    /// frame is drawn before any input is read.
    pub fn run<S, K>(&mut self, source: &mut S, sink: &mut K)
    where
        S: EventSource + ?Sized,
        K: FrameSink + ?Sized,
    {
        let mut commands = Vec::new();
        loop {
            let seen = self.frame.generation();
            if self.step(&commands) == Signal::Terminate {
                info!("Quit");
                return;
            }
            if self.frame.generation() != seen {
                sink.present(&self.frame, &self.status());
            }
            commands = match source.poll() {
                Some(commands) => commands,
                None => {
                    info!("Out of input");
                    return;
                }
            };
        }
    }

    /// What the status overlay would show right now.
    pub fn status(&self) -> Status {
        self.controller.status(self.settings.max_iterations)
    }

    /// The frame on display.
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }
}
