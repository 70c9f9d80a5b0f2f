//! Scripted in-memory engine for tests.
//!
//! [`MockEngine`] records every operation performed against it and can be
//! scripted to fail at specific points (stage creation, static linking,
//! pad linking) or to report a stage error shortly after the graph reaches
//! the playing state. Tests assert over the shared [`OpLog`], which stays
//! valid after the engine itself has been dropped.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::engine::{Engine, ErrorHandler, GraphState, PropertyValue, StageError, StageKind};
use crate::error::{Error, Result};

/// A stage handle produced by [`MockEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockStage {
    /// Kind the stage was created as.
    pub kind: StageKind,
    /// Name the stage was created under.
    pub name: String,
}

/// A pad handle produced by [`MockEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPad {
    /// Owning stage name.
    pub stage: String,
    /// Pad name, unique per stage (`src_0`, `src_1`, ... or `sink`).
    pub name: String,
}

/// One recorded engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    /// A stage was created.
    Create(StageKind, String),
    /// A property was set on a stage.
    SetProperty(String, String, String),
    /// A stage was added to the container.
    Add(String),
    /// Two stages were linked statically.
    Link(String, String),
    /// A dynamic pad was requested.
    RequestPad(String, String),
    /// Two pads were linked.
    LinkPads(String, String),
    /// A dynamic pad was released.
    ReleasePad(String, String),
    /// An error handler was subscribed.
    Subscribe,
    /// The graph changed state.
    SetState(GraphState),
    /// A scripted error was dispatched to the handler.
    ErrorDispatched(String),
    /// The engine (and with it the container) was dropped.
    Released,
}

/// Shared, clonable view of the operations performed on a [`MockEngine`].
#[derive(Clone, Default)]
pub struct OpLog {
    ops: Arc<Mutex<Vec<Op>>>,
}

impl OpLog {
    fn record(&self, op: Op) {
        self.ops.lock().unwrap().push(op);
    }

    /// Snapshot of all recorded operations, in order.
    pub fn snapshot(&self) -> Vec<Op> {
        self.ops.lock().unwrap().clone()
    }

    /// Number of recorded operations matching the predicate.
    pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.ops.lock().unwrap().iter().filter(|op| pred(op)).count()
    }

    /// Position of the first operation matching the predicate.
    pub fn position(&self, pred: impl Fn(&Op) -> bool) -> Option<usize> {
        self.ops.lock().unwrap().iter().position(pred)
    }
}

/// Scripted engine for exercising the pipeline driver without GStreamer.
pub struct MockEngine {
    log: OpLog,
    fail_create: HashSet<StageKind>,
    fail_link: Option<(String, String)>,
    fail_pad_links: bool,
    reject_play: bool,
    errors_on_play: Vec<StageError>,
    handler: Arc<Mutex<Option<ErrorHandler>>>,
    next_pad: u32,
    released_pads: HashSet<(String, String)>,
    injectors: Vec<thread::JoinHandle<()>>,
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEngine {
    /// Create an engine that succeeds at everything.
    pub fn new() -> Self {
        Self {
            log: OpLog::default(),
            fail_create: HashSet::new(),
            fail_link: None,
            fail_pad_links: false,
            reject_play: false,
            errors_on_play: Vec::new(),
            handler: Arc::new(Mutex::new(None)),
            next_pad: 0,
            released_pads: HashSet::new(),
            injectors: Vec::new(),
        }
    }

    /// Fail factory lookups for the given stage kind.
    pub fn fail_creating(mut self, kind: StageKind) -> Self {
        self.fail_create.insert(kind);
        self
    }

    /// Fail the static link between the two named stages.
    pub fn fail_linking(mut self, upstream: &str, downstream: &str) -> Self {
        self.fail_link = Some((upstream.to_string(), downstream.to_string()));
        self
    }

    /// Fail every pad-to-pad link.
    pub fn fail_pad_links(mut self) -> Self {
        self.fail_pad_links = true;
        self
    }

    /// Report the given stage error shortly after the graph starts playing.
    pub fn error_after_play(mut self, error: StageError) -> Self {
        self.errors_on_play.push(error);
        self
    }

    /// Reject the transition to the playing state.
    ///
    /// Scripted errors still fire, mirroring an engine whose stages post
    /// their error on the bus before failing the transition.
    pub fn reject_play(mut self) -> Self {
        self.reject_play = true;
        self
    }

    /// Handle to the operation log; survives the engine being dropped.
    pub fn log(&self) -> OpLog {
        self.log.clone()
    }
}

impl Engine for MockEngine {
    type Stage = MockStage;
    type Pad = MockPad;

    fn create_stage(&mut self, kind: StageKind, name: &str) -> Result<Self::Stage> {
        if self.fail_create.contains(&kind) {
            return Err(Error::CreateStage {
                kind,
                name: name.to_string(),
            });
        }
        self.log.record(Op::Create(kind, name.to_string()));
        Ok(MockStage {
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
        self.log.record(Op::SetProperty(
            stage.name.clone(),
            property.to_string(),
            value.to_string(),
        ));
        Ok(())
    }

    fn add_stage(&mut self, stage: &Self::Stage) -> Result<()> {
        self.log.record(Op::Add(stage.name.clone()));
        Ok(())
    }

    fn link_stages(&mut self, upstream: &Self::Stage, downstream: &Self::Stage) -> Result<()> {
        if let Some((a, b)) = &self.fail_link {
            if *a == upstream.name && *b == downstream.name {
                return Err(Error::Link {
                    upstream: upstream.name.clone(),
                    downstream: downstream.name.clone(),
                });
            }
        }
        self.log
            .record(Op::Link(upstream.name.clone(), downstream.name.clone()));
        Ok(())
    }

    fn request_output_pad(&mut self, stage: &Self::Stage) -> Result<Self::Pad> {
        let name = format!("src_{}", self.next_pad);
        self.next_pad += 1;
        self.log
            .record(Op::RequestPad(stage.name.clone(), name.clone()));
        Ok(MockPad {
            stage: stage.name.clone(),
            name,
        })
    }

    fn input_pad(&self, stage: &Self::Stage) -> Result<Self::Pad> {
        Ok(MockPad {
            stage: stage.name.clone(),
            name: "sink".to_string(),
        })
    }

    fn link_pads(&mut self, src: &Self::Pad, dst: &Self::Pad) -> Result<()> {
        if self.fail_pad_links {
            return Err(Error::PadLink {
                src: src.name.clone(),
                dst: dst.name.clone(),
                reason: "scripted failure".to_string(),
            });
        }
        self.log
            .record(Op::LinkPads(src.name.clone(), dst.name.clone()));
        Ok(())
    }

    fn release_output_pad(&mut self, stage: &Self::Stage, pad: &Self::Pad) -> Result<()> {
        let key = (stage.name.clone(), pad.name.clone());
        if !self.released_pads.insert(key) {
            return Err(Error::PadAlreadyReleased {
                stage: stage.name.clone(),
                pad: pad.name.clone(),
            });
        }
        self.log
            .record(Op::ReleasePad(stage.name.clone(), pad.name.clone()));
        Ok(())
    }

    fn subscribe_errors(&mut self, handler: ErrorHandler) -> Result<()> {
        *self.handler.lock().unwrap() = Some(handler);
        self.log.record(Op::Subscribe);
        Ok(())
    }

    fn set_state(&mut self, state: GraphState) -> Result<()> {
        self.log.record(Op::SetState(state));

        if state == GraphState::Playing && !self.errors_on_play.is_empty() {
            let errors = std::mem::take(&mut self.errors_on_play);
            let handler = Arc::clone(&self.handler);
            let log = self.log.clone();
            self.injectors.push(thread::spawn(move || {
                thread::sleep(Duration::from_millis(10));
                let mut guard = handler.lock().unwrap();
                if let Some(handler) = guard.as_mut() {
                    for error in errors {
                        log.record(Op::ErrorDispatched(error.stage.clone()));
                        handler(error);
                    }
                }
            }));
        }

        if state == GraphState::Playing && self.reject_play {
            return Err(Error::StateChange {
                state,
                reason: "scripted failure".to_string(),
            });
        }
        Ok(())
    }

    fn stage_name(&self, stage: &Self::Stage) -> String {
        stage.name.clone()
    }

    fn pad_name(&self, pad: &Self::Pad) -> String {
        pad.name.clone()
    }
}

impl Drop for MockEngine {
    fn drop(&mut self) {
        for injector in self.injectors.drain(..) {
            let _ = injector.join();
        }
        self.log.record(Op::Released);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_pads_get_distinct_names() {
        let mut engine = MockEngine::new();
        let tee = engine.create_stage(StageKind::Tee, "tee").unwrap();
        let a = engine.request_output_pad(&tee).unwrap();
        let b = engine.request_output_pad(&tee).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.name, "src_0");
        assert_eq!(b.name, "src_1");
    }

    #[test]
    fn double_release_is_rejected() {
        let mut engine = MockEngine::new();
        let tee = engine.create_stage(StageKind::Tee, "tee").unwrap();
        let pad = engine.request_output_pad(&tee).unwrap();
        engine.release_output_pad(&tee, &pad).unwrap();
        assert!(matches!(
            engine.release_output_pad(&tee, &pad),
            Err(Error::PadAlreadyReleased { .. })
        ));
    }

    #[test]
    fn repeated_play_transitions_keep_every_injector_joined() {
        let mut engine = MockEngine::new().error_after_play(StageError {
            stage: "sink-file".into(),
            message: "resource not writable".into(),
            detail: None,
        });
        let log = engine.log();

        engine
            .subscribe_errors(Box::new(|_| {}))
            .unwrap();
        engine.set_state(GraphState::Playing).unwrap();
        engine.set_state(GraphState::Playing).unwrap();

        // Drop joins every spawned injector before the container goes away,
        // so the dispatch is in the log by the time Released is.
        drop(engine);
        assert_eq!(log.count(|op| matches!(op, Op::ErrorDispatched(_))), 1);
        assert_eq!(log.snapshot().last(), Some(&Op::Released));
    }

    #[test]
    fn drop_records_release_of_the_container() {
        let engine = MockEngine::new();
        let log = engine.log();
        drop(engine);
        assert_eq!(log.snapshot(), vec![Op::Released]);
    }
}
