// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Batch export: renders the configured view once, at the export
//! multiplier, waits for the file, prints its path and exits.

use env_logger::Env;
use fractview::config::{self, Config};
use fractview::Session;

fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let matches = config::app("render", "Render one high-resolution fractal image").get_matches();
    let session = Config::from_matches(&matches).and_then(|config| Session::new(&config));
    let mut session = match session {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Startup failure: {}", e);
            std::process::exit(1);
        }
    };

    match session.export().wait() {
        Ok(path) => println!("{}", path.display()),
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
    }
}
