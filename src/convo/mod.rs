//! Conversation scripts
//!
//! A [`Convo`] is one scripted exchange between a user and the bot. Each
//! convo becomes exactly one test case. Convos come from a [`ConvoSource`],
//! usually a [`ConvoReader`] scanning a directory of YAML files.

mod executor;
mod reader;
mod scenario;

use std::path::{Path, PathBuf};

pub use executor::{assert_reply, AssertFn, FailFn};
pub use reader::ConvoReader;
pub use scenario::{ConvoFile, ConvoStep, ReplyExpectation};

use crate::common::config::ConvoConfig;
use crate::common::{Error, Result};

/// A parsed conversation
#[derive(Debug, Clone, PartialEq)]
pub struct Convo {
    pub name: String,
    pub description: Option<String>,
    /// File the convo was read from
    pub filename: PathBuf,
    pub steps: Vec<ConvoStep>,
}

impl Convo {
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<PathBuf>,
        steps: Vec<ConvoStep>,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            filename: filename.into(),
            steps,
        }
    }

    /// Parse a YAML conversation script read from `path`
    ///
    /// Unnamed convos are named after the file, minus the default
    /// conversation suffixes.
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self> {
        Self::parse(content, path, &ConvoConfig::default().extensions)
    }

    /// Like [`Convo::from_yaml`], stripping `extensions` for the default name
    pub fn parse(content: &str, path: &Path, extensions: &[String]) -> Result<Self> {
        let parse_error = |error: String| Error::ConvoParse {
            path: path.display().to_string(),
            error,
        };

        let file: ConvoFile =
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;

        for (i, step) in file.steps.iter().enumerate() {
            if let ConvoStep::Me {
                text: None,
                payload: None,
                ..
            } = step
            {
                return Err(parse_error(format!(
                    "step {} ('me') needs either 'text' or 'payload'",
                    i + 1
                )));
            }
        }

        let name = match file.name {
            Some(name) => name,
            None => default_name(path, extensions),
        };

        Ok(Self {
            name,
            description: file.description,
            filename: path.to_path_buf(),
            steps: file.steps,
        })
    }
}

/// File name without its conversation suffix
///
/// The longest matching entry of `extensions` is stripped; files matching
/// none of them lose only their last extension.
fn default_name(path: &Path, extensions: &[String]) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stripped = extensions
        .iter()
        .filter_map(|ext| {
            let suffix = format!(".{}", ext.trim_start_matches('.'));
            file_name.strip_suffix(suffix.as_str())
        })
        .filter(|stem| !stem.is_empty())
        .min_by_key(|stem| stem.len());

    match stripped {
        Some(stem) => stem.to_string(),
        None => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(file_name),
    }
}

/// Anything that can produce the ordered list of conversations for a suite
pub trait ConvoSource: Send + Sync {
    fn read_convos(&self) -> Result<Vec<Convo>>;
}

/// A fixed, in-memory set of conversations
#[derive(Debug, Clone, Default)]
pub struct StaticConvos(pub Vec<Convo>);

impl ConvoSource for StaticConvos {
    fn read_convos(&self) -> Result<Vec<Convo>> {
        Ok(self.0.clone())
    }
}
