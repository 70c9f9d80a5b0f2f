//! GStreamer backend for the [`Engine`] trait.
//!
//! Wraps a `gst::Pipeline` as the graph container. Bus errors are watched
//! from a dedicated thread iterating the pipeline bus; the thread winds
//! down when the bus is put into flushing mode on drop.

use std::thread;

use gstreamer as gst;
use gstreamer::prelude::*;

use crate::engine::{Engine, ErrorHandler, GraphState, PropertyValue, StageError, StageKind};
use crate::error::{Error, Result};

/// Engine implementation over GStreamer.
///
/// Dropping the engine stops the bus watcher, forces the pipeline to the
/// null state and releases the container.
pub struct GstEngine {
    pipeline: gst::Pipeline,
    watcher: Option<BusWatcher>,
}

struct BusWatcher {
    bus: gst::Bus,
    thread: thread::JoinHandle<()>,
}

impl GstEngine {
    /// Initialize GStreamer and create an empty pipeline container.
    pub fn new() -> Result<Self> {
        gst::init().map_err(|e| Error::Engine(e.to_string()))?;
        let pipeline = gst::Pipeline::builder().name("teecast").build();
        Ok(Self {
            pipeline,
            watcher: None,
        })
    }

    /// Access the underlying pipeline (for diagnostics and smoke tests).
    pub fn pipeline(&self) -> &gst::Pipeline {
        &self.pipeline
    }
}

impl Engine for GstEngine {
    type Stage = gst::Element;
    type Pad = gst::Pad;

    fn create_stage(&mut self, kind: StageKind, name: &str) -> Result<Self::Stage> {
        gst::ElementFactory::make(kind.factory_name())
            .name(name)
            .build()
            .map_err(|_| Error::CreateStage {
                kind,
                name: name.to_string(),
            })
    }

    fn set_property(
        &mut self,
        stage: &Self::Stage,
        property: &str,
        value: PropertyValue,
    ) -> Result<()> {
        if stage.find_property(property).is_none() {
            return Err(Error::SetProperty {
                stage: stage.name().to_string(),
                property: property.to_string(),
                reason: "no such property".to_string(),
            });
        }
        match value {
            PropertyValue::Str(s) => stage.set_property_from_str(property, &s),
            PropertyValue::Int(i) => stage.set_property(property, i),
            PropertyValue::Path(p) => {
                stage.set_property(property, p.to_string_lossy().as_ref())
            }
        }
        Ok(())
    }

    fn add_stage(&mut self, stage: &Self::Stage) -> Result<()> {
        self.pipeline.add(stage).map_err(|_| Error::AddStage {
            stage: stage.name().to_string(),
        })
    }

    fn link_stages(&mut self, upstream: &Self::Stage, downstream: &Self::Stage) -> Result<()> {
        upstream.link(downstream).map_err(|_| Error::Link {
            upstream: upstream.name().to_string(),
            downstream: downstream.name().to_string(),
        })
    }

    fn request_output_pad(&mut self, stage: &Self::Stage) -> Result<Self::Pad> {
        stage
            .request_pad_simple("src_%u")
            .ok_or_else(|| Error::RequestPad {
                stage: stage.name().to_string(),
            })
    }

    fn input_pad(&self, stage: &Self::Stage) -> Result<Self::Pad> {
        stage.static_pad("sink").ok_or_else(|| Error::MissingPad {
            stage: stage.name().to_string(),
        })
    }

    fn link_pads(&mut self, src: &Self::Pad, dst: &Self::Pad) -> Result<()> {
        src.link(dst).map(|_| ()).map_err(|e| Error::PadLink {
            src: src.name().to_string(),
            dst: dst.name().to_string(),
            reason: format!("{e:?}"),
        })
    }

    fn release_output_pad(&mut self, stage: &Self::Stage, pad: &Self::Pad) -> Result<()> {
        stage.release_request_pad(pad);
        Ok(())
    }

    fn subscribe_errors(&mut self, mut handler: ErrorHandler) -> Result<()> {
        if self.watcher.is_some() {
            return Err(Error::Engine("bus watcher already installed".into()));
        }
        let bus = self
            .pipeline
            .bus()
            .ok_or_else(|| Error::Engine("pipeline has no bus".into()))?;

        let watch_bus = bus.clone();
        let thread = thread::Builder::new()
            .name("teecast-bus".into())
            .spawn(move || {
                // Ends when the bus is set to flushing: timed_pop then
                // returns None and the iterator terminates.
                for msg in watch_bus.iter_timed(gst::ClockTime::NONE) {
                    if let gst::MessageView::Error(err) = msg.view() {
                        handler(StageError {
                            stage: err
                                .src()
                                .map(|s| s.name().to_string())
                                .unwrap_or_else(|| "<unknown>".to_string()),
                            message: err.error().to_string(),
                            detail: err.debug().map(|d| d.to_string()),
                        });
                    }
                }
            })?;

        self.watcher = Some(BusWatcher { bus, thread });
        Ok(())
    }

    fn set_state(&mut self, state: GraphState) -> Result<()> {
        let target = match state {
            GraphState::Null => gst::State::Null,
            GraphState::Playing => gst::State::Playing,
        };
        self.pipeline
            .set_state(target)
            .map(|_| ())
            .map_err(|e| Error::StateChange {
                state,
                reason: e.to_string(),
            })
    }

    fn stage_name(&self, stage: &Self::Stage) -> String {
        stage.name().to_string()
    }

    fn pad_name(&self, pad: &Self::Pad) -> String {
        pad.name().to_string()
    }
}

impl Drop for GstEngine {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.bus.set_flushing(true);
            let _ = watcher.thread.join();
        }
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}
