//! The graph-execution engine boundary.
//!
//! Everything hard about running a media pipeline (buffer scheduling, pad
//! negotiation, per-element threading) lives inside an external engine.
//! This module defines the narrow surface the rest of the crate needs from
//! it: create stages, add them to a container, link them, request and
//! release dynamic pads, change the graph state, and subscribe to error
//! events from the engine's message bus.
//!
//! Two implementations exist:
//!
//! - [`gst::GstEngine`] wraps GStreamer (feature `gst`).
//! - [`mock::MockEngine`] is a scripted in-memory engine for tests.

use std::fmt;
use std::path::PathBuf;

use crate::error::Result;

#[cfg(feature = "gst")]
pub mod gst;
pub mod mock;

/// The kinds of stage the pipeline is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// Synthetic video generator.
    VideoTestSource,
    /// Splitter duplicating one input to N requested outputs.
    Tee,
    /// Decoupling buffer queue (gives each branch its own thread).
    Queue,
    /// Display sink, auto-detected for the platform.
    AutoVideoSink,
    /// Sink writing the stream to a file.
    FileSink,
}

impl StageKind {
    /// The engine factory name for this kind.
    pub fn factory_name(self) -> &'static str {
        match self {
            StageKind::VideoTestSource => "videotestsrc",
            StageKind::Tee => "tee",
            StageKind::Queue => "queue",
            StageKind::AutoVideoSink => "autovideosink",
            StageKind::FileSink => "filesink",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.factory_name())
    }
}

/// Coarse graph states used by the driver.
///
/// The demo only ever moves NULL -> PLAYING -> NULL; no intermediate state
/// is held deliberately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphState {
    /// Fully stopped, no resources committed.
    #[default]
    Null,
    /// Running: data flows through every branch.
    Playing,
}

/// A typed property value handed to [`Engine::set_property`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// String value, including enum nicks (e.g. a test pattern name).
    Str(String),
    /// Integer value.
    Int(i32),
    /// Filesystem path (e.g. a file sink destination).
    Path(PathBuf),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Str(s) => f.write_str(s),
            PropertyValue::Int(i) => write!(f, "{i}"),
            PropertyValue::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

/// An error event reported asynchronously by a stage over the engine's bus.
#[derive(Debug, Clone)]
pub struct StageError {
    /// Name of the stage that reported the error.
    pub stage: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional diagnostic detail, when the engine provides any.
    pub detail: Option<String>,
}

/// Handler invoked on the engine's dispatch thread for each bus error.
pub type ErrorHandler = Box<dyn FnMut(StageError) + Send + 'static>;

/// The black-box graph-execution engine.
///
/// Implementations own the graph container. Dropping the engine releases
/// the container and everything still attached to it, which is why the
/// driver consumes the engine by value and relies on `Drop` for the final
/// "release the container" step of teardown.
pub trait Engine {
    /// Handle to a stage owned by the engine's container.
    type Stage: Clone;
    /// Handle to a connection point on a stage.
    type Pad: Clone + PartialEq;

    /// Instantiate a stage of the given kind under the given name.
    fn create_stage(&mut self, kind: StageKind, name: &str) -> Result<Self::Stage>;

    /// Set a configuration property on a stage.
    fn set_property(
        &mut self,
        stage: &Self::Stage,
        property: &str,
        value: PropertyValue,
    ) -> Result<()>;

    /// Add a stage to the graph container.
    fn add_stage(&mut self, stage: &Self::Stage) -> Result<()>;

    /// Link two stages through their static pads.
    fn link_stages(&mut self, upstream: &Self::Stage, downstream: &Self::Stage) -> Result<()>;

    /// Request a dynamic output pad from a stage.
    ///
    /// Every successful request returns a pad with an identifier distinct
    /// from all pads previously requested from the same stage.
    fn request_output_pad(&mut self, stage: &Self::Stage) -> Result<Self::Pad>;

    /// Look up the static input pad of a stage.
    fn input_pad(&self, stage: &Self::Stage) -> Result<Self::Pad>;

    /// Link an output pad to an input pad.
    fn link_pads(&mut self, src: &Self::Pad, dst: &Self::Pad) -> Result<()>;

    /// Release a previously requested dynamic pad back to its owning stage.
    ///
    /// Each pad must be released exactly once, and only after the graph
    /// has stopped running.
    fn release_output_pad(&mut self, stage: &Self::Stage, pad: &Self::Pad) -> Result<()>;

    /// Subscribe a handler to error events on the engine's message bus.
    ///
    /// The handler runs on an engine-managed thread; it must only touch
    /// state that is safe to share across threads.
    fn subscribe_errors(&mut self, handler: ErrorHandler) -> Result<()>;

    /// Transition the graph to the given state.
    fn set_state(&mut self, state: GraphState) -> Result<()>;

    /// Name of a stage, for diagnostics.
    fn stage_name(&self, stage: &Self::Stage) -> String;

    /// Name of a pad, for diagnostics.
    fn pad_name(&self, pad: &Self::Pad) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_names_match_engine_registry() {
        assert_eq!(StageKind::VideoTestSource.factory_name(), "videotestsrc");
        assert_eq!(StageKind::Tee.factory_name(), "tee");
        assert_eq!(StageKind::Queue.factory_name(), "queue");
        assert_eq!(StageKind::AutoVideoSink.factory_name(), "autovideosink");
        assert_eq!(StageKind::FileSink.factory_name(), "filesink");
    }

    #[test]
    fn property_values_display_plainly() {
        assert_eq!(PropertyValue::Str("snow".into()).to_string(), "snow");
        assert_eq!(PropertyValue::Int(1).to_string(), "1");
        assert_eq!(
            PropertyValue::Path("out/output.mp4".into()).to_string(),
            "out/output.mp4"
        );
    }
}
