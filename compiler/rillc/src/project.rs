//! Projects: named sources analyzed and evaluated together.
//!
//! A project is immutable apart from its analysis caches. Every edit builds
//! a new project sharing the interner, so cached analyses never outlive the
//! trees they describe.

mod persist;

pub use persist::{SerializedProject, SerializedSource};

use crate::errors::ProjectError;
use crate::parser::SourceParser;
use crate::source::Source;
use rill_analysis::{Analysis, Analyzer, SourceLookup, SourceType};
use rill_eval::{
    EvalConfig, EvaluationInputs, Evaluator, NativeRegistry, RunOutcome, StreamRegistry,
    StreamSignature, Value,
};
use rill_ir::ast::NodeKind;
use rill_ir::{Name, SharedInterner};
use std::cell::RefCell;
use std::sync::Arc;
use uuid::Uuid;

/// Where one source's analysis stands.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum AnalysisStatus {
    Unanalyzed,
    /// Analysis is on the stack; asking again returns an empty analysis.
    Analyzing,
    Analyzed,
}

#[derive(Clone, Debug)]
enum AnalysisState {
    Unanalyzed,
    Analyzing,
    Analyzed(Arc<Analysis>),
}

#[derive(Debug)]
pub struct Project {
    id: Uuid,
    name: String,
    sources: Vec<Source>,
    interner: SharedInterner,
    natives: Arc<NativeRegistry>,
    streams: Arc<[StreamSignature]>,
    /// Parallel to `sources`.
    states: Vec<RefCell<AnalysisState>>,
}

impl Project {
    /// A project over already parsed sources. The first source is the one
    /// the project evaluates.
    pub fn new(
        name: impl Into<String>,
        sources: Vec<Source>,
        interner: SharedInterner,
    ) -> Result<Project, ProjectError> {
        let natives = Arc::new(NativeRegistry::standard(&interner));
        let streams: Arc<[StreamSignature]> = StreamRegistry::standard(&interner).signatures().into();
        Project::assemble(Uuid::new_v4(), name.into(), sources, interner, natives, streams)
    }

    /// Parse `(name, text)` pairs into a new project with its own interner.
    pub fn parse(
        name: impl Into<String>,
        texts: &[(&str, &str)],
        parser: &dyn SourceParser,
    ) -> Result<Project, ProjectError> {
        let interner = SharedInterner::new();
        let sources = texts
            .iter()
            .map(|(name, text)| Source::parse(*name, *text, parser, &interner))
            .collect::<Result<Vec<_>, _>>()?;
        Project::new(name, sources, interner)
    }

    fn assemble(
        id: Uuid,
        name: String,
        sources: Vec<Source>,
        interner: SharedInterner,
        natives: Arc<NativeRegistry>,
        streams: Arc<[StreamSignature]>,
    ) -> Result<Project, ProjectError> {
        if sources.is_empty() {
            return Err(ProjectError::Empty);
        }
        for (index, source) in sources.iter().enumerate() {
            if sources[..index].iter().any(|other| other.name() == source.name()) {
                return Err(ProjectError::DuplicateSource(source.name().to_owned()));
            }
        }
        let states = sources
            .iter()
            .map(|_| RefCell::new(AnalysisState::Unanalyzed))
            .collect();
        Ok(Project {
            id,
            name,
            sources,
            interner,
            natives,
            streams,
            states,
        })
    }

    /// The same project with different sources and fresh caches.
    fn edited(&self, sources: Vec<Source>) -> Result<Project, ProjectError> {
        Project::assemble(
            self.id,
            self.name.clone(),
            sources,
            self.interner.clone(),
            Arc::clone(&self.natives),
            Arc::clone(&self.streams),
        )
    }

    /// Replace the stream signatures names resolve against.
    #[must_use]
    pub fn with_streams(self, streams: Vec<StreamSignature>) -> Project {
        let states = self
            .sources
            .iter()
            .map(|_| RefCell::new(AnalysisState::Unanalyzed))
            .collect();
        Project {
            streams: streams.into(),
            states,
            ..self
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// The source the project evaluates.
    pub fn main(&self) -> &Source {
        // `assemble` rejects empty projects.
        &self.sources[0]
    }

    pub fn source(&self, name: &str) -> Option<&Source> {
        self.sources.iter().find(|source| source.name() == name)
    }

    fn index_of(&self, name: &str) -> Result<usize, ProjectError> {
        self.sources
            .iter()
            .position(|source| source.name() == name)
            .ok_or_else(|| ProjectError::UnknownSource(name.to_owned()))
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    pub fn natives(&self) -> &Arc<NativeRegistry> {
        &self.natives
    }

    pub fn streams(&self) -> &[StreamSignature] {
        &self.streams
    }

    // Edits

    /// Replace the text of source `name`, keeping its caret where possible.
    pub fn with_source(
        &self,
        name: &str,
        text: &str,
        parser: &dyn SourceParser,
    ) -> Result<Project, ProjectError> {
        let index = self.index_of(name)?;
        let caret = self.sources[index].caret();
        let replacement = Source::parse(name, text, parser, &self.interner)?.with_caret(caret);
        let mut sources = self.sources.clone();
        sources[index] = replacement;
        self.edited(sources)
    }

    pub fn with_caret(&self, name: &str, caret: usize) -> Result<Project, ProjectError> {
        let index = self.index_of(name)?;
        let mut sources = self.sources.clone();
        sources[index] = sources[index].clone().with_caret(caret);
        self.edited(sources)
    }

    /// Append a source.
    pub fn with_new_source(
        &self,
        name: &str,
        text: &str,
        parser: &dyn SourceParser,
    ) -> Result<Project, ProjectError> {
        if self.source(name).is_some() {
            return Err(ProjectError::DuplicateSource(name.to_owned()));
        }
        let mut sources = self.sources.clone();
        sources.push(Source::parse(name, text, parser, &self.interner)?);
        self.edited(sources)
    }

    pub fn without_source(&self, name: &str) -> Result<Project, ProjectError> {
        let index = self.index_of(name)?;
        let mut sources = self.sources.clone();
        sources.remove(index);
        self.edited(sources)
    }

    // Analysis

    pub fn status(&self, name: &str) -> Result<AnalysisStatus, ProjectError> {
        let index = self.index_of(name)?;
        Ok(match &*self.states[index].borrow() {
            AnalysisState::Unanalyzed => AnalysisStatus::Unanalyzed,
            AnalysisState::Analyzing => AnalysisStatus::Analyzing,
            AnalysisState::Analyzed(_) => AnalysisStatus::Analyzed,
        })
    }

    /// Analyze source `name`, or return its cached analysis.
    pub fn analyze(&self, name: &str) -> Result<Arc<Analysis>, ProjectError> {
        let index = self.index_of(name)?;
        Ok(self.analyze_index(index))
    }

    /// Analyze every source, in order.
    pub fn analyze_all(&self) -> Vec<Arc<Analysis>> {
        (0..self.sources.len())
            .map(|index| self.analyze_index(index))
            .collect()
    }

    /// Whether any source has a blocking conflict.
    pub fn is_blocked(&self) -> bool {
        self.analyze_all().iter().any(|analysis| analysis.is_blocked())
    }

    fn analyze_index(&self, index: usize) -> Arc<Analysis> {
        let state = self.states[index].replace(AnalysisState::Analyzing);
        match state {
            AnalysisState::Analyzed(analysis) => {
                self.states[index].replace(AnalysisState::Analyzed(Arc::clone(&analysis)));
                return analysis;
            }
            AnalysisState::Analyzing => {
                tracing::debug!(source = self.sources[index].name(), "re-entered analysis");
                return Arc::new(Analysis::empty());
            }
            AnalysisState::Unanalyzed => {}
        }

        let source = &self.sources[index];
        let analysis = Arc::new(
            Analyzer::new(source.ast(), &self.natives, &self.streams)
                .with_lookup(self)
                .analyze(),
        );
        tracing::debug!(
            source = source.name(),
            conflicts = analysis.conflicts().len(),
            "analyzed source"
        );
        self.states[index].replace(AnalysisState::Analyzed(Arc::clone(&analysis)));
        analysis
    }

    // Evaluation

    /// Evaluate the main source with the given stream values. `trigger` is
    /// the stream whose change caused this evaluation, if any.
    pub fn evaluate(
        &self,
        config: EvalConfig,
        streams: &[(Name, Value)],
        trigger: Option<Name>,
    ) -> Result<Value, ProjectError> {
        self.evaluate_source(self.main().name(), config, streams, trigger)
    }

    /// Evaluate one source, evaluating the sources it borrows first.
    #[tracing::instrument(level = "debug", skip(self, config, streams))]
    pub fn evaluate_source(
        &self,
        name: &str,
        config: EvalConfig,
        streams: &[(Name, Value)],
        trigger: Option<Name>,
    ) -> Result<Value, ProjectError> {
        let index = self.index_of(name)?;
        let mut run = Run {
            project: self,
            config,
            streams,
            trigger,
            visiting: Vec::new(),
            values: vec![None; self.sources.len()],
        };
        run.value_of(index)
    }

    /// Names of the sources `source` borrows directly.
    fn borrows(&self, source: &Source) -> Vec<Name> {
        let ast = source.ast();
        ast.descendants(ast.root())
            .into_iter()
            .filter_map(|node| match ast.kind(node) {
                Some(NodeKind::Borrow { source }) => Some(*source),
                _ => None,
            })
            .collect()
    }

    /// Whether `source` borrows anything at all.
    pub fn has_borrows(&self, name: &str) -> bool {
        self.source(name)
            .is_some_and(|source| !self.borrows(source).is_empty())
    }

    fn index_of_name(&self, name: Name) -> Option<usize> {
        let text = self.interner.lookup(name);
        self.sources.iter().position(|source| source.name() == text)
    }
}

impl SourceLookup for Project {
    fn source_type(&self, source: Name) -> SourceType {
        let Some(index) = self.index_of_name(source) else {
            return SourceType::Missing;
        };
        if matches!(*self.states[index].borrow(), AnalysisState::Analyzing) {
            return SourceType::Analyzing;
        }
        let analysis = self.analyze_index(index);
        SourceType::Resolved(analysis.type_of(self.sources[index].ast().root()))
    }
}

/// One evaluation of a source and everything it borrows.
struct Run<'p> {
    project: &'p Project,
    config: EvalConfig,
    streams: &'p [(Name, Value)],
    trigger: Option<Name>,
    /// Sources being evaluated, outermost first.
    visiting: Vec<usize>,
    /// Values of sources already evaluated in this run.
    values: Vec<Option<Value>>,
}

impl Run<'_> {
    fn value_of(&mut self, index: usize) -> Result<Value, ProjectError> {
        if let Some(value) = &self.values[index] {
            return Ok(value.clone());
        }
        let project = self.project;
        let source = &project.sources[index];
        if self.visiting.contains(&index) {
            return Err(ProjectError::BorrowCycle(source.name().to_owned()));
        }
        self.visiting.push(index);

        let mut borrowed = Vec::new();
        for name in project.borrows(source) {
            // Missing sources surface as exceptions at the borrow.
            if let Some(dependency) = project.index_of_name(name) {
                borrowed.push((name, self.value_of(dependency)?));
            }
        }

        let mut evaluator = Evaluator::builder(Arc::clone(source.ast()))
            .natives(Arc::clone(&project.natives))
            .config(self.config)
            .build();
        let outcome = evaluator.evaluate(EvaluationInputs {
            streams: self.streams.to_vec(),
            borrowed,
            trigger: self.trigger,
        })?;
        self.visiting.pop();

        let value = match outcome {
            RunOutcome::Finished(value) => value,
            RunOutcome::Suspended => return Err(ProjectError::Suspended(source.name().to_owned())),
        };
        tracing::debug!(source = source.name(), %value, "evaluated source");
        self.values[index] = Some(value.clone());
        Ok(value)
    }
}
