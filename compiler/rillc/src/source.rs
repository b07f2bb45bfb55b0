//! One named source of a project.

use crate::errors::ProjectError;
use crate::parser::SourceParser;
use rill_ir::{Ast, SharedInterner};
use std::sync::Arc;

/// Source text, its tree, and where the caret is.
///
/// The tree is shared with every evaluator running it and replaced, never
/// mutated, when the text changes.
#[derive(Clone, Debug)]
pub struct Source {
    name: String,
    text: String,
    ast: Arc<Ast>,
    caret: usize,
}

impl Source {
    pub fn parse(
        name: impl Into<String>,
        text: impl Into<String>,
        parser: &dyn SourceParser,
        interner: &SharedInterner,
    ) -> Result<Source, ProjectError> {
        let name = name.into();
        let text = text.into();
        let ast = parser
            .parse(&text, interner)
            .map_err(|error| ProjectError::Parse {
                name: name.clone(),
                error,
            })?;
        Ok(Source {
            name,
            text,
            ast: Arc::new(ast),
            caret: 0,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ast(&self) -> &Arc<Ast> {
        &self.ast
    }

    /// Caret position in characters, at most the text's length.
    pub fn caret(&self) -> usize {
        self.caret
    }

    #[must_use]
    pub fn with_caret(mut self, caret: usize) -> Source {
        self.caret = caret.min(self.text.chars().count());
        self
    }
}
