use crate::core::error::PipelineError;
use crate::io::config::FilesConfig;
use crate::io::error::SourceError;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Input files of a run, split by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFiles {
    pub trade_repositories: Vec<PathBuf>,
    pub reference: PathBuf,
}

/// Walk `root` and collect every file whose name is listed in `files`.
///
/// Files named `files.reference` form the registry bucket, every other
/// listed name is a trade repository. Walk order is sorted by file name so
/// the repository order, and therefore which duplicate wins, is stable.
///
/// # Errors
///
/// [`PipelineError::Configuration`] when the registry is found zero or
/// several times. No trade repository is not an error here; the
/// deduplicator rejects that.
pub fn resolve(root: &Path, files: &FilesConfig) -> Result<ResolvedFiles, SourceError> {
    let mut trade_repositories = Vec::new();
    let mut references = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| SourceError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if !files.names.iter().any(|n| n == name) {
            continue;
        }
        if name == files.reference {
            references.push(entry.into_path());
        } else {
            trade_repositories.push(entry.into_path());
        }
    }

    let reference = match references.len() {
        0 => {
            return Err(PipelineError::configuration(format!(
                "no reference registry `{}` found under {}",
                files.reference,
                root.display()
            ))
            .into())
        }
        1 => references.remove(0),
        n => {
            return Err(PipelineError::configuration(format!(
                "{} reference registries `{}` found under {}",
                n,
                files.reference,
                root.display()
            ))
            .into())
        }
    };

    debug!(
        "resolved {} trade repositories and registry {}",
        trade_repositories.len(),
        reference.display()
    );

    Ok(ResolvedFiles {
        trade_repositories,
        reference,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn files_config() -> FilesConfig {
        FilesConfig {
            names: vec!["TR1.csv".into(), "TR2.csv".into(), "GLEIF.csv".into()],
            reference: "GLEIF.csv".into(),
        }
    }

    #[test]
    fn test_partitions_files() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        fs::write(data.join("TR1.csv"), "").unwrap();
        fs::write(data.join("TR2.csv"), "").unwrap();
        fs::write(data.join("GLEIF.csv"), "").unwrap();
        fs::write(data.join("unrelated.csv"), "").unwrap();

        let resolved = resolve(dir.path(), &files_config()).unwrap();
        assert_eq!(resolved.reference, data.join("GLEIF.csv"));
        assert_eq!(
            resolved.trade_repositories,
            vec![data.join("TR1.csv"), data.join("TR2.csv")]
        );
    }

    #[test]
    fn test_missing_reference() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("TR1.csv"), "").unwrap();

        let err = resolve(dir.path(), &files_config()).unwrap_err();
        assert!(matches!(
            err,
            SourceError::Pipeline(PipelineError::Configuration(_))
        ));
    }

    #[test]
    fn test_several_references() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("a").join("GLEIF.csv"), "").unwrap();
        fs::write(dir.path().join("b").join("GLEIF.csv"), "").unwrap();

        let err = resolve(dir.path(), &files_config()).unwrap_err();
        assert!(err.to_string().contains("2 reference registries"));
    }

    #[test]
    fn test_no_trade_repository_is_resolved_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("GLEIF.csv"), "").unwrap();

        let resolved = resolve(dir.path(), &files_config()).unwrap();
        assert!(resolved.trade_repositories.is_empty());
    }
}
