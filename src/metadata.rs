//! State persisted in the destination root between runs
//!
//! The answers file is the prior-answer baseline of `update`; the manifest
//! records the digest of every file as last rendered so `update` can tell
//! local edits apart from template changes.

use crate::answers::AnswerSet;
use crate::config::Question;
use crate::constants::{ANSWERS_FILE, MANIFEST_FILE};
use crate::error::{Error, Result};
use crate::ioutils::atomic_write;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswersFile {
    /// Template root the destination was generated from.
    #[serde(rename = "_src_path")]
    pub src_path: String,
    /// Version of stencil that wrote the file.
    #[serde(rename = "_version")]
    pub version: String,
    #[serde(flatten)]
    pub answers: IndexMap<String, serde_json::Value>,
}

impl AnswersFile {
    /// Builds the persisted form of `answers`, leaving secrets out.
    pub fn new(
        template_root: &Path,
        answers: &AnswerSet,
        questions: &IndexMap<String, Question>,
    ) -> Self {
        let answers = answers
            .iter()
            .filter(|(name, _)| !questions.get(*name).is_some_and(Question::is_secret))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Self {
            src_path: template_root.display().to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            answers,
        }
    }

    pub fn path<P: AsRef<Path>>(output_root: P) -> PathBuf {
        output_root.as_ref().join(ANSWERS_FILE)
    }

    pub fn load<P: AsRef<Path>>(output_root: P) -> Result<Self> {
        let path = Self::path(&output_root);
        if !path.is_file() {
            return Err(Error::AnswersFileNotFound {
                output_dir: output_root.as_ref().display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, output_root: P) -> Result<()> {
        let serialized = serde_yaml::to_string(self)?;
        atomic_write(serialized.as_bytes(), Self::path(output_root), None)
    }

    /// The stored answers as a prior baseline.
    pub fn to_answer_set(&self) -> AnswerSet {
        AnswerSet::from_values(self.answers.clone())
    }
}

/// Digest of every file as last rendered, keyed by `/`-separated relative path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub generated_at: DateTime<Utc>,
    pub files: BTreeMap<String, String>,
}

impl Manifest {
    pub fn new(files: BTreeMap<String, String>) -> Self {
        Self { generated_at: Utc::now(), files }
    }

    pub fn path<P: AsRef<Path>>(output_root: P) -> PathBuf {
        output_root.as_ref().join(MANIFEST_FILE)
    }

    /// Loads the manifest, or an empty one when none was written.
    pub fn load<P: AsRef<Path>>(output_root: P) -> Result<Self> {
        let path = Self::path(output_root);
        if !path.is_file() {
            log::debug!("No manifest at '{}', treating every file as new", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, output_root: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        atomic_write(serialized.as_bytes(), Self::path(output_root), None)
    }

    pub fn digest(&self, relative: &str) -> Option<&str> {
        self.files.get(relative).map(String::as_str)
    }
}
