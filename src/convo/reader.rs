//! Directory-based conversation discovery

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Convo, ConvoSource};
use crate::common::config::ConvoConfig;
use crate::common::{Error, Result};

/// Reads every conversation file below a directory
#[derive(Debug, Clone)]
pub struct ConvoReader {
    dir: PathBuf,
    extensions: Vec<String>,
}

impl ConvoReader {
    pub fn new(config: &ConvoConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            extensions: config.extensions.clone(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn is_convo_file(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        self.extensions
            .iter()
            .any(|ext| file_name.ends_with(&format!(".{}", ext.trim_start_matches('.'))))
    }

    fn collect_files(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        let entries = std::fs::read_dir(dir).map_err(|e| Error::FileRead {
            path: dir.display().to_string(),
            error: e.to_string(),
        })?;

        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                self.collect_files(&path, files)?;
            } else if self.is_convo_file(&path) {
                files.push(path);
            }
        }
        Ok(())
    }

    /// Conversation files below the directory, in sorted path order
    pub fn files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Err(Error::Config(format!(
                "Convo directory '{}' not found. Set [convos] dir or TESTMYBOT_CONVO_DIR",
                self.dir.display()
            )));
        }

        let mut files = Vec::new();
        self.collect_files(&self.dir, &mut files)?;
        files.sort();
        Ok(files)
    }
}

impl ConvoSource for ConvoReader {
    fn read_convos(&self) -> Result<Vec<Convo>> {
        self.files()?
            .into_iter()
            .map(|path| {
                let content = std::fs::read_to_string(&path).map_err(|e| Error::FileRead {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })?;
                let convo = Convo::parse(&content, &path, &self.extensions)?;
                debug!(convo = %convo.name, file = %path.display(), "read convo");
                Ok(convo)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn reader(dir: &Path) -> ConvoReader {
        ConvoReader::new(&ConvoConfig {
            dir: dir.to_path_buf(),
            ..ConvoConfig::default()
        })
    }

    #[test]
    fn test_reads_nested_files_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "b.convo.yml", "name: second\nsteps: []\n");
        write(tmp.path(), "a.convo.yaml", "name: first\nsteps: []\n");
        write(tmp.path(), "nested/c.convo.yml", "steps: []\n");
        write(tmp.path(), "notes.yml", "not a convo");
        write(tmp.path(), "README.md", "# convos");

        let convos = reader(tmp.path()).read_convos().unwrap();
        let names: Vec<&str> = convos.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "c"]);
    }

    #[test]
    fn test_missing_dir_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = reader(&tmp.path().join("nope")).read_convos().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_parse_error_names_file() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "broken.convo.yml", "steps: [\n");

        match reader(tmp.path()).read_convos() {
            Err(Error::ConvoParse { path, .. }) => assert!(path.ends_with("broken.convo.yml")),
            other => panic!("expected ConvoParse, got {other:?}"),
        }
    }

    #[test]
    fn test_misspelled_expectation_is_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "typo.convo.yml",
            "steps:\n  - action: me\n    text: hi\n  - action: bot\n    expect:\n      contians: Goodbye\n",
        );

        match reader(tmp.path()).read_convos() {
            Err(Error::ConvoParse { path, error }) => {
                assert!(path.ends_with("typo.convo.yml"));
                assert!(error.contains("contians"));
            }
            other => panic!("expected ConvoParse, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_extension() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "v1.2.chat", "steps: []\n");
        let reader = ConvoReader::new(&ConvoConfig {
            dir: tmp.path().to_path_buf(),
            extensions: vec![".chat".to_string()],
        });
        assert_eq!(reader.dir(), tmp.path());
        let convos = reader.read_convos().unwrap();
        assert_eq!(convos.len(), 1);
        assert_eq!(convos[0].name, "v1.2");
    }
}
