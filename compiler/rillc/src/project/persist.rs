//! Persisted form of a project.
//!
//! Only what a person wrote is saved: source names, text and caret
//! positions, plus the project's stable id. Trees, analyses and values are
//! rebuilt on load.

use super::Project;
use crate::errors::ProjectError;
use crate::parser::SourceParser;
use crate::source::Source;
use rill_ir::SharedInterner;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedProject {
    pub id: Uuid,
    pub name: String,
    pub sources: Vec<SerializedSource>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedSource {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub caret: usize,
}

impl Project {
    pub fn serialize(&self) -> SerializedProject {
        SerializedProject {
            id: self.id,
            name: self.name.clone(),
            sources: self
                .sources
                .iter()
                .map(|source| SerializedSource {
                    name: source.name().to_owned(),
                    code: source.text().to_owned(),
                    caret: source.caret(),
                })
                .collect(),
        }
    }

    /// Rebuild a project, parsing every source again. The id is kept.
    pub fn deserialize(
        serialized: SerializedProject,
        parser: &dyn SourceParser,
    ) -> Result<Project, ProjectError> {
        let interner = SharedInterner::new();
        let sources = serialized
            .sources
            .into_iter()
            .map(|source| {
                Ok(Source::parse(source.name, source.code, parser, &interner)?.with_caret(source.caret))
            })
            .collect::<Result<Vec<_>, ProjectError>>()?;
        let mut project = Project::new(serialized.name, sources, interner)?;
        project.id = serialized.id;
        Ok(project)
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(&self.serialize())?)
    }

    pub fn from_json(json: &str, parser: &dyn SourceParser) -> Result<Project, ProjectError> {
        let serialized: SerializedProject = serde_json::from_str(json)?;
        Project::deserialize(serialized, parser)
    }
}
