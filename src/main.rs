// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Headless explorer.  Reads one line of key presses per frame from
//! stdin (a/d/w/s pan, q/e zoom, u refresh, p export, z quit) and logs
//! a status line for every frame it regenerates.

use env_logger::Env;
use fractview::config::{self, Config};
use fractview::session::LineSource;
use fractview::{FrameBuffer, Session, Status};
use log::info;
use std::io;

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let matches = config::app("fractview", "Julia set and IFS attractor explorer").get_matches();
    let session = Config::from_matches(&matches).and_then(|config| Session::new(&config));
    let mut session = match session {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Startup failure: {}", e);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut source = LineSource::new(stdin.lock());
    session.run(&mut source, &mut |frame: &FrameBuffer, status: &Status| {
        info!("Frame {}: {} points", frame.generation(), frame.points().len());
        info!("{}", status);
    });
}
