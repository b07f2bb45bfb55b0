//! Re-evaluation driven by stream changes.
//!
//! The reactor owns a project, the live stream registry and the latest
//! value. Recording a stream value schedules one reevaluation; `react`
//! performs the scheduled ones in recording order. Recording and reacting
//! both take `&mut self`, so a registry never changes mid-evaluation.

use crate::errors::{ProjectError, ReactorError};
use crate::project::Project;
use rill_analysis::Analysis;
use rill_eval::{EvalConfig, StreamRegistry, Value};
use rill_ir::{Name, NodeId};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// The outcome of one stream change.
#[derive(Clone, Debug)]
pub struct Reevaluation {
    pub stream: Name,
    /// Every node of the main source whose value may have changed.
    pub affected: FxHashSet<NodeId>,
    /// Whether the program actually ran again. When nothing it produces
    /// depends on the stream the previous value is reused.
    pub rerun: bool,
    pub value: Value,
}

pub struct Reactor {
    project: Project,
    streams: StreamRegistry,
    config: EvalConfig,
    analysis: Arc<Analysis>,
    latest: Option<Value>,
}

impl Reactor {
    /// A reactor over the standard streams.
    pub fn new(project: Project) -> Reactor {
        let streams = StreamRegistry::standard(project.interner());
        Reactor::with_streams(project, streams)
    }

    /// A reactor over `streams`; the project is re-bound to their
    /// signatures so analysis resolves the same names the evaluator binds.
    pub fn with_streams(project: Project, streams: StreamRegistry) -> Reactor {
        let project = project.with_streams(streams.signatures());
        Reactor {
            project,
            streams,
            config: EvalConfig::default(),
            analysis: Arc::new(Analysis::empty()),
            latest: None,
        }
    }

    /// Limits for every evaluation. The step limit always applies.
    #[must_use]
    pub fn with_config(mut self, config: EvalConfig) -> Reactor {
        self.config = config;
        self
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn streams(&self) -> &StreamRegistry {
        &self.streams
    }

    pub fn analysis(&self) -> &Arc<Analysis> {
        &self.analysis
    }

    pub fn latest(&self) -> Option<&Value> {
        self.latest.as_ref()
    }

    /// Analyze and evaluate from scratch with the current stream values.
    #[tracing::instrument(level = "debug", skip_all, fields(project = self.project.name()))]
    pub fn start(&mut self) -> Result<&Value, ReactorError> {
        self.analysis = self.project.analyze(self.project.main().name())?;
        let value = self.evaluate(None)?;
        Ok(self.latest.insert(value))
    }

    /// Swap in an edited project and start again. Pending stream changes
    /// are kept.
    pub fn edit(&mut self, project: Project) -> Result<&Value, ReactorError> {
        self.project = project.with_streams(self.streams.signatures());
        self.start()
    }

    fn evaluate(&self, trigger: Option<Name>) -> Result<Value, ProjectError> {
        self.project
            .evaluate(self.config, &self.streams.bindings(), trigger)
    }

    fn stream(&self, name: &str) -> Result<rill_eval::StreamId, ReactorError> {
        self.project
            .interner()
            .get(name)
            .and_then(|name| self.streams.lookup(name))
            .ok_or_else(|| ReactorError::UnknownStream(name.to_owned()))
    }

    /// Record a new value on stream `name`. Returns whether it was kept;
    /// stopped streams drop values.
    pub fn record(&mut self, name: &str, value: Value) -> Result<bool, ReactorError> {
        let id = self
            .stream(name)
            .inspect_err(|_| tracing::warn!(stream = name, "value for unknown stream"))?;
        Ok(self.streams.record(id, value))
    }

    pub fn start_stream(&mut self, name: &str) -> Result<(), ReactorError> {
        let id = self.stream(name)?;
        self.streams.start(id);
        Ok(())
    }

    pub fn stop_stream(&mut self, name: &str) -> Result<(), ReactorError> {
        let id = self.stream(name)?;
        self.streams.stop(id);
        Ok(())
    }

    pub fn has_pending(&self) -> bool {
        self.streams.has_pending()
    }

    /// Perform every scheduled reevaluation, one per recorded change.
    pub fn react(&mut self) -> Result<Vec<Reevaluation>, ReactorError> {
        let Some(mut latest) = self.latest.clone() else {
            return Err(ReactorError::NotStarted);
        };
        let root = self.project.main().ast().root();
        // Borrowed sources are not part of this graph; anything borrowing
        // always runs again.
        let borrows = self.project.has_borrows(self.project.main().name());

        let mut reevaluations = Vec::new();
        for change in self.streams.take_pending() {
            let affected = self.analysis.affected_by_stream(change.name);
            let rerun = borrows || affected.contains(&root);
            if rerun {
                latest = self.evaluate(Some(change.name))?;
            }
            tracing::debug!(
                stream = self.project.interner().lookup(change.name),
                affected = affected.len(),
                rerun,
                "reevaluated"
            );
            reevaluations.push(Reevaluation {
                stream: change.name,
                affected,
                rerun,
                value: latest.clone(),
            });
        }
        self.latest = Some(latest);
        Ok(reevaluations)
    }
}
