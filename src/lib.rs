//! # Teecast
//!
//! A small demonstration of a branching media pipeline: a synthetic video
//! source feeds a tee, which splits the stream into two independently
//! queued branches: one ending in a display sink, one in a file sink.
//!
//! The heavy lifting (buffer scheduling, pad negotiation, element threading)
//! is delegated entirely to an external graph-execution engine, consumed
//! through the [`engine::Engine`] trait. The default backend wraps GStreamer
//! (feature `gst`, enabled by default); [`engine::mock::MockEngine`] provides
//! a scripted in-memory engine for tests.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use teecast::engine::gst::GstEngine;
//! use teecast::{run, Settings};
//!
//! let engine = GstEngine::new()?;
//! run(engine, &Settings::default())?;
//! ```
//!
//! The process blocks until a pipeline error is reported on the bus (or the
//! process is terminated externally), then tears the graph down: dynamic tee
//! pads are released, the graph is brought back to the null state, and the
//! container is dropped.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod control;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod settings;

pub use control::{RunController, StopHandle};
pub use error::{Error, Result};
pub use pipeline::{run, TeePipeline};
pub use settings::{Settings, TestPattern};
