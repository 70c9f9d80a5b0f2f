//! Pipeline wiring and lifecycle driver.
//!
//! Builds the fixed six-stage graph
//!
//! ```text
//!                        /-> queue-display -> sink-display (window)
//! videosrc -> tee ------+
//!                        \-> queue-file    -> sink-file (output.mp4)
//! ```
//!
//! then runs it until a stage reports an error (or the process is killed)
//! and tears it down: dynamic tee pads released exactly once, graph back
//! to null, container dropped.

use crate::control::RunController;
use crate::engine::{Engine, GraphState, PropertyValue, StageKind};
use crate::error::Result;
use crate::settings::Settings;

/// The assembled pipeline, ready to run.
///
/// Construction goes through [`TeePipeline::build`], which performs stage
/// creation, configuration, static assembly and the dynamic tee connection
/// in one pass; any failure aborts the build and drops the engine, which
/// releases the container and everything attached to it.
pub struct TeePipeline<E: Engine> {
    engine: E,
    tee: E::Stage,
    display_pad: E::Pad,
    file_pad: E::Pad,
    controller: RunController,
}

impl<E: Engine> std::fmt::Debug for TeePipeline<E>
where
    E::Stage: std::fmt::Debug,
    E::Pad: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeePipeline")
            .field("tee", &self.tee)
            .field("display_pad", &self.display_pad)
            .field("file_pad", &self.file_pad)
            .finish_non_exhaustive()
    }
}

impl<E: Engine> TeePipeline<E> {
    /// Create, configure and assemble the graph, then connect the tee.
    ///
    /// The splitter's two output pads are requested dynamically and linked
    /// to the queues' static input pads. If either link fails, both pads
    /// are released before the error propagates, so the failure path does
    /// not strand request pads on the tee.
    pub fn build(mut engine: E, settings: &Settings) -> Result<Self> {
        let src = engine.create_stage(StageKind::VideoTestSource, "videosrc")?;
        let tee = engine.create_stage(StageKind::Tee, "tee")?;
        let queue_display = engine.create_stage(StageKind::Queue, "queue-display")?;
        let sink_display = engine.create_stage(StageKind::AutoVideoSink, "sink-display")?;
        let queue_file = engine.create_stage(StageKind::Queue, "queue-file")?;
        let sink_file = engine.create_stage(StageKind::FileSink, "sink-file")?;

        engine.set_property(
            &src,
            "pattern",
            PropertyValue::Str(settings.pattern.as_str().to_string()),
        )?;
        // The destination path is not validated here; an unwritable path
        // surfaces later as a runtime error from the sink.
        engine.set_property(
            &sink_file,
            "location",
            PropertyValue::Path(settings.output.clone()),
        )?;

        for stage in [
            &src,
            &tee,
            &queue_display,
            &sink_display,
            &queue_file,
            &sink_file,
        ] {
            engine.add_stage(stage)?;
        }

        engine.link_stages(&src, &tee)?;
        engine.link_stages(&queue_display, &sink_display)?;
        engine.link_stages(&queue_file, &sink_file)?;

        let display_pad = engine.request_output_pad(&tee)?;
        tracing::info!(
            "obtained request pad {} for the display branch",
            engine.pad_name(&display_pad)
        );
        let file_pad = engine.request_output_pad(&tee)?;
        tracing::info!(
            "obtained request pad {} for the file branch",
            engine.pad_name(&file_pad)
        );

        let linked = Self::link_branches(
            &mut engine,
            &display_pad,
            &queue_display,
            &file_pad,
            &queue_file,
        );
        if let Err(e) = linked {
            let _ = engine.release_output_pad(&tee, &display_pad);
            let _ = engine.release_output_pad(&tee, &file_pad);
            return Err(e);
        }

        Ok(Self {
            engine,
            tee,
            display_pad,
            file_pad,
            controller: RunController::new(),
        })
    }

    fn link_branches(
        engine: &mut E,
        display_pad: &E::Pad,
        queue_display: &E::Stage,
        file_pad: &E::Pad,
        queue_file: &E::Stage,
    ) -> Result<()> {
        let display_in = engine.input_pad(queue_display)?;
        engine.link_pads(display_pad, &display_in)?;
        let file_in = engine.input_pad(queue_file)?;
        engine.link_pads(file_pad, &file_in)?;
        Ok(())
    }

    /// Handle that stops a running pipeline from another thread.
    pub fn stop_handle(&self) -> crate::control::StopHandle {
        self.controller.handle()
    }

    /// Start playback and block until the run controller is stopped.
    ///
    /// A bus error from any stage is logged with its source and detail and
    /// stops the controller; that is the only recovery behavior, with no
    /// retry and no partial restart.
    pub fn run(&mut self) -> Result<()> {
        let stop = self.controller.handle();
        self.engine.subscribe_errors(Box::new(move |err| {
            match &err.detail {
                Some(detail) => tracing::error!(
                    stage = %err.stage,
                    detail = %detail,
                    "error received from {}: {}", err.stage, err.message
                ),
                None => tracing::error!(
                    stage = %err.stage,
                    "error received from {}: {}", err.stage, err.message
                ),
            }
            stop.stop();
        }))?;

        // A rejected play transition always comes with a stage error on
        // the bus (the stage posts it before failing the transition), so
        // the handler above stops the controller. Treating the rejection
        // as fatal here would turn a runtime stage error into a setup
        // failure and the wrong exit code.
        match self.engine.set_state(GraphState::Playing) {
            Ok(()) => tracing::info!("pipeline playing"),
            Err(err) => tracing::warn!("play transition rejected: {err}"),
        }
        self.controller.wait();
        Ok(())
    }

    /// Release the dynamic tee pads, stop the graph and drop the container.
    pub fn teardown(mut self) -> Result<()> {
        for pad in [&self.display_pad, &self.file_pad] {
            self.engine.release_output_pad(&self.tee, pad)?;
            tracing::debug!(
                "released pad {} back to {}",
                self.engine.pad_name(pad),
                self.engine.stage_name(&self.tee)
            );
        }
        tracing::info!("stopping pipeline");
        self.engine.set_state(GraphState::Null)?;
        Ok(())
        // self.engine drops here, releasing the container.
    }
}

/// Build the graph, run it to completion, then tear it down.
///
/// A runtime stage error ends the run but still counts as a normal
/// shutdown: it is logged, teardown proceeds, and `Ok(())` is returned.
/// That includes a rejected play transition, which the engine always pairs
/// with a stage error on the bus. Only construction, linking and teardown
/// failures propagate as errors (and map to a non-zero process exit).
pub fn run<E: Engine>(engine: E, settings: &Settings) -> Result<()> {
    let mut pipeline = TeePipeline::build(engine, settings)?;
    let outcome = pipeline.run();
    let teardown = pipeline.teardown();
    outcome.and(teardown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockEngine;

    #[test]
    fn build_requests_two_distinct_tee_pads() {
        let pipeline = TeePipeline::build(MockEngine::new(), &Settings::default()).unwrap();
        assert_ne!(pipeline.display_pad, pipeline.file_pad);
    }
}
