//! Error types for Teecast.

use crate::engine::{GraphState, StageKind};
use thiserror::Error;

/// Result type alias using Teecast's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pipeline construction and lifecycle operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A stage could not be instantiated by the engine's factory.
    #[error("failed to create {kind} stage `{name}`")]
    CreateStage {
        /// The kind of stage requested.
        kind: StageKind,
        /// The name the stage would have carried.
        name: String,
    },

    /// A property could not be set on a stage.
    #[error("failed to set property `{property}` on `{stage}`: {reason}")]
    SetProperty {
        /// The stage the property was set on.
        stage: String,
        /// The property name.
        property: String,
        /// Engine-reported reason.
        reason: String,
    },

    /// A stage could not be added to the graph container.
    #[error("failed to add `{stage}` to the pipeline")]
    AddStage {
        /// The stage that could not be added.
        stage: String,
    },

    /// A static link between two stages failed.
    #[error("failed to link `{upstream}` to `{downstream}`")]
    Link {
        /// Name of the upstream stage.
        upstream: String,
        /// Name of the downstream stage.
        downstream: String,
    },

    /// A dynamic output pad could not be requested from a stage.
    #[error("no request pad available on `{stage}`")]
    RequestPad {
        /// The stage the pad was requested from.
        stage: String,
    },

    /// A static input pad was missing on a stage.
    #[error("missing input pad on `{stage}`")]
    MissingPad {
        /// The stage the pad was looked up on.
        stage: String,
    },

    /// Linking two pads failed.
    #[error("failed to link pad `{src}` to pad `{dst}`: {reason}")]
    PadLink {
        /// Name of the source pad.
        src: String,
        /// Name of the destination pad.
        dst: String,
        /// Engine-reported reason.
        reason: String,
    },

    /// A dynamic pad was released more than once.
    #[error("pad `{pad}` already released on `{stage}`")]
    PadAlreadyReleased {
        /// The stage owning the pad.
        stage: String,
        /// The pad name.
        pad: String,
    },

    /// A graph state transition was rejected by the engine.
    #[error("state change to {state:?} failed: {reason}")]
    StateChange {
        /// The target state.
        state: GraphState,
        /// Engine-reported reason.
        reason: String,
    },

    /// Opaque engine-level failure (initialization, bus access, ...).
    #[error("engine error: {0}")]
    Engine(String),

    /// I/O error (bus watcher thread spawn).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
