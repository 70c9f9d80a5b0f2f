//! Teecast binary: wire the demo graph and run it until it stops.

use std::process;

use teecast::engine::gst::GstEngine;
use teecast::{run, Settings};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let engine = match GstEngine::new() {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!("failed to initialize the media engine: {err}");
            process::exit(-1);
        }
    };

    if let Err(err) = run(engine, &Settings::default()) {
        tracing::error!("pipeline failed: {err}");
        process::exit(-1);
    }
}
