// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! High-resolution export.
//!
//! An export is a `Snapshot` sent down a channel to a small pool of
//! worker threads.  The snapshot is moved, not borrowed, so the
//! interactive thread is free to keep panning while a worker spends
//! several seconds re-rendering the old view at five times the
//! resolution.  Each job writes its own uniquely named PNG; the
//! workers share nothing but the queue.

use chrono::Local;
use crossbeam::channel::{self, Receiver, Sender};
use image::png::PNGEncoder;
use image::{ColorType, RgbaImage};
use log::{error, info};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::thread;

use crate::errors::{ConfigError, ExportError};
use crate::frame::{self, Point, Snapshot};

const FILE_PREFIX: &str = "fractal_";
const FILE_EXTENSION: &str = "png";
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Paints points onto a transparent canvas.  Cells without a point
/// stay transparent black.
pub fn rasterize(points: &[Point], width: usize, height: usize) -> RgbaImage {
    let mut canvas = RgbaImage::new(width as u32, height as u32);
    for p in points {
        canvas.put_pixel(p.x as u32, p.y as u32, p.color);
    }
    canvas
}

fn write_png(output: File, canvas: &RgbaImage) -> Result<(), ExportError> {
    let encoder = PNGEncoder::new(BufWriter::new(output));
    encoder.encode(canvas, canvas.width(), canvas.height(), ColorType::RGBA(8))?;
    Ok(())
}

/// Opens `<dir>/fractal_<stamp>.png` for writing, refusing to clobber
/// anything.  If that name is taken, `-1`, `-2`, ... are tried in turn.
/// `create_new` makes the claim atomic, so two workers that finish in
/// the same second still end up with two files.
pub fn create_unique(dir: &Path, stamp: &str) -> io::Result<(File, PathBuf)> {
    let mut attempt = 0usize;
    loop {
        let name = match attempt {
            0 => format!("{}{}.{}", FILE_PREFIX, stamp, FILE_EXTENSION),
            n => format!("{}{}-{}.{}", FILE_PREFIX, stamp, n, FILE_EXTENSION),
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(ref e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Renders `snapshot` at `multiplier` times its resolution and writes
/// it under `dir`.  Runs on whatever thread calls it.
/// The file is claimed before anything is rendered, so a directory
/// that can't be written fails fast.
pub fn export_snapshot(snapshot: &Snapshot, multiplier: usize, dir: &Path) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let stamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let (file, path) = create_unique(dir, &stamp)?;

    let snapshot = snapshot.enlarged(multiplier);
    let viewport = snapshot.viewport;
    let canvas = rasterize(&frame::render(&snapshot), viewport.width, viewport.height);
    write_png(file, &canvas)?;
    Ok(path)
}

type Outcome = Result<PathBuf, ExportError>;

struct Job {
    snapshot: Snapshot,
    reply: Sender<Outcome>,
}

/// The far end of a submitted export.  Dropping it is fine; the
/// worker logs the outcome either way.
pub struct ExportHandle {
    outcome: Receiver<Outcome>,
}

impl ExportHandle {
    /// Blocks until the export lands on disk or fails.
    pub fn wait(self) -> Outcome {
        self.outcome.recv().unwrap_or(Err(ExportError::Abandoned))
    }
}

/// A fixed pool of export workers fed from one queue.
pub struct Exporter {
    queue: Sender<Job>,
}

impl Exporter {
    /// Starts `workers` threads.  They live until the exporter is
    /// dropped and the queue drains; nobody joins them, so a process
    /// that exits mid-export simply abandons the file.
    pub fn new<P: Into<PathBuf>>(workers: usize, dir: P, multiplier: usize) -> Result<Exporter, ConfigError> {
        if multiplier == 0 {
            return Err(ConfigError::ZeroMultiplier);
        }
        let dir = dir.into();
        let (queue, jobs) = channel::unbounded::<Job>();
        for _ in 0..workers.max(1) {
            let jobs = jobs.clone();
            let dir = dir.clone();
            thread::spawn(move || {
                for job in jobs.iter() {
                    let outcome = export_snapshot(&job.snapshot, multiplier, &dir);
                    match outcome {
                        Ok(ref path) => info!("Image saved: {}", path.display()),
                        Err(ref err) => error!("Failed to save image: {}", err),
                    }
                    // The submitter may have stopped listening.
                    let _ = job.reply.send(outcome);
                }
            });
        }
        Ok(Exporter { queue })
    }

    /// Queues `snapshot` for export and returns at once.
    pub fn submit(&self, snapshot: Snapshot) -> ExportHandle {
        let (reply, outcome) = channel::bounded(1);
        info!("Saving image ...");
        if self.queue.send(Job { snapshot, reply }).is_err() {
            error!("Failed to save image: no export workers are running");
        }
        ExportHandle { outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Kernel;
    use crate::controller::{Command, ParameterController};
    use crate::frame::RenderSettings;
    use crate::planes::Viewport;
    use num::Complex;

    fn settings() -> RenderSettings {
        RenderSettings {
            kernel: Kernel::Julia,
            max_iterations: 40,
            samples: 1000,
            seed: 1,
            threads: 2,
        }
    }

    fn controller() -> ParameterController {
        let vp = Viewport::new(16, 12, (0.0, 0.0), (1.5, 1.0)).unwrap();
        ParameterController::new(vp, Complex::new(-0.8, 0.156), 0.3)
    }

    fn decode(path: &Path) -> RgbaImage {
        image::open(path).unwrap().to_rgba()
    }

    #[test]
    fn export_writes_an_enlarged_png() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::capture(&controller(), &settings());
        let path = export_snapshot(&snapshot, 3, dir.path()).unwrap();

        let name = path.file_name().unwrap().to_str().unwrap().to_string();
        assert!(name.starts_with("fractal_"));
        assert!(name.ends_with(".png"));
        // fractal_YYYYMMDD-HHMMSS.png
        assert_eq!(name.len(), "fractal_".len() + 15 + ".png".len());
        assert_eq!(&name[16..17], "-");

        let picture = decode(&path);
        assert_eq!(picture.dimensions(), (48, 36));
        let expected = rasterize(&frame::render(&snapshot.enlarged(3)), 48, 36);
        assert_eq!(picture.into_raw(), expected.into_raw());
    }

    #[test]
    fn names_never_collide() {
        let dir = tempfile::tempdir().unwrap();
        let (_, first) = create_unique(dir.path(), "20260101-000000").unwrap();
        let (_, second) = create_unique(dir.path(), "20260101-000000").unwrap();
        let (_, third) = create_unique(dir.path(), "20260101-000000").unwrap();
        assert!(first.ends_with("fractal_20260101-000000.png"));
        assert!(second.ends_with("fractal_20260101-000000-1.png"));
        assert!(third.ends_with("fractal_20260101-000000-2.png"));
    }

    #[test]
    fn zero_multiplier_is_refused() {
        assert!(Exporter::new(1, "/tmp", 0).is_err());
    }

    #[test]
    fn unwritable_directory_is_reported_not_fatal() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let exporter = Exporter::new(1, blocker.path(), 1).unwrap();
        let snapshot = Snapshot::capture(&controller(), &settings());
        assert!(exporter.submit(snapshot).wait().is_err());
        // The pool is still there for the next one.
        let dir = tempfile::tempdir().unwrap();
        assert!(export_snapshot(&snapshot, 1, dir.path()).is_ok());
        assert!(exporter.submit(snapshot).wait().is_err());
    }

    #[test]
    fn unwritable_directory_fails_before_rendering() {
        // A render at this size would never finish, so only an early
        // failure comes back.
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let snapshot = Snapshot::capture(&controller(), &settings());
        match export_snapshot(&snapshot, 1 << 20, blocker.path()) {
            Err(ExportError::Io(_)) => {}
            other => panic!("expected an I/O error, got {:?}", other),
        }
    }

    #[test]
    fn export_sees_the_state_at_submission() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(2, dir.path(), 2).unwrap();
        let mut live = controller();
        let before = Snapshot::capture(&live, &settings());
        let handle = exporter.submit(before);

        live.apply(Command::PanLeft);
        live.apply(Command::ZoomOut);
        live.set_constant(Complex::new(0.285, 0.01));
        let after = Snapshot::capture(&live, &settings());

        let picture = decode(&handle.wait().unwrap()).into_raw();
        let old = rasterize(&frame::render(&before.enlarged(2)), 32, 24).into_raw();
        let new = rasterize(&frame::render(&after.enlarged(2)), 32, 24).into_raw();
        assert_eq!(picture, old);
        assert_ne!(picture, new);
    }

    #[test]
    fn concurrent_exports_keep_their_own_files() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(3, dir.path(), 1).unwrap();
        let mut live = controller();
        let handles: Vec<ExportHandle> = (0..4)
            .map(|_| {
                live.apply(Command::PanRight);
                exporter.submit(Snapshot::capture(&live, &settings()))
            })
            .collect();
        let mut paths: Vec<PathBuf> = handles.into_iter().map(|h| h.wait().unwrap()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 4);
    }
}
