use std::path::Path;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::debug;
use tracing::info;

use crate::application::RuntimeConfig;
use crate::application::data::{Cleanup, Report};
use crate::config::{QueryConfig, QueryConfigError};
use crate::ext::BestEffortPathExt;
use crate::filesystem::{
    Deletion, FileSystem, QueryError, find_dir_to_delete, render_tree, sum_dirs_up_to_threshold,
};
use crate::transcript::{BuildError, build_file_system};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let (fs, query_config) = Self::build(&app_config).await?;

        if app_config.print_tree {
            let colored = supports_color::on(supports_color::Stream::Stdout).is_some();
            print!("{}", render_tree(&fs, colored));
        }

        let report = Self::analyze(&fs, &query_config).context(QuerySnafu)?;
        println!("{report}");

        Ok(())
    }

    /// Reads the transcript and replays it into a tree sized by the resolved config
    pub async fn build(
        app_config: &RuntimeConfig,
    ) -> Result<(FileSystem, QueryConfig), ApplicationError> {
        let query_config = Self::resolve_query_config(app_config).await?;
        debug!("Using query config: {:?}", query_config);

        let transcript = Self::read_transcript(&app_config.input).await?;
        let fs = build_file_system(transcript.lines(), query_config.disk_capacity).context(
            BuildSnafu {
                file_path: app_config.input.best_effort_path_display(),
            },
        )?;
        info!(
            "Rebuilt {} directories holding {} of {} bytes",
            fs.dir_count(),
            fs.used_space(),
            fs.disk_capacity()
        );

        Ok((fs, query_config))
    }

    pub fn analyze(fs: &FileSystem, query_config: &QueryConfig) -> Result<Report, QueryError> {
        let bounded_sum = sum_dirs_up_to_threshold(fs, fs.root(), query_config.size_threshold)?;
        info!(
            "Directories up to {} bytes add up to {}",
            query_config.size_threshold, bounded_sum
        );

        let cleanup = match find_dir_to_delete(fs, query_config.required_free_space)? {
            Deletion::NotNeeded { free_space } => Cleanup::NotNeeded { free_space },
            Deletion::Delete {
                dir,
                size,
                space_needed,
            } => {
                debug!("Deleting {size} bytes covers the {space_needed} bytes needed");
                Cleanup::Delete {
                    path: fs.path_of(dir),
                    size,
                }
            }
        };

        Ok(Report {
            size_threshold: query_config.size_threshold,
            bounded_sum,
            cleanup,
        })
    }

    async fn resolve_query_config(
        app_config: &RuntimeConfig,
    ) -> Result<QueryConfig, ApplicationError> {
        let base = match &app_config.config {
            Some(path) => QueryConfig::from_path(path).await.context(ConfigSnafu)?,
            None => QueryConfig::default(),
        };

        Ok(base.with_overrides(
            app_config.disk_capacity,
            app_config.required_free_space,
            app_config.size_threshold,
        ))
    }

    async fn read_transcript(path: &Path) -> Result<String, ApplicationError> {
        debug!("Reading transcript: {}", path.best_effort_path_display());
        let bytes = compio::fs::read(path).await.context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        debug!("Successfully read transcript: {} bytes", bytes.len());

        String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.best_effort_path_display(),
        })
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: QueryConfigError },
    #[snafu(display("Failed to read the transcript: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Transcript {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to rebuild the directory tree from {}", file_path))]
    BuildError {
        file_path: String,
        source: BuildError,
    },
    #[snafu(display("Critical failure encountered while querying directory sizes"))]
    QueryError { source: QueryError },
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use tempfile::NamedTempFile;

    use super::*;

    const SAMPLE: &str = include_str!("../../fixtures/sample_transcript.txt");

    fn transcript_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(file, "{}", contents).expect("Failed to write to temp file");
        file
    }

    fn runtime_config(input: &Path) -> RuntimeConfig {
        RuntimeConfig {
            input: input.to_path_buf(),
            ..RuntimeConfig::default()
        }
    }

    #[compio::test]
    async fn sample_transcript_produces_expected_report() {
        let file = transcript_file(SAMPLE);
        let (fs, query_config) = Application::build(&runtime_config(file.path()))
            .await
            .unwrap();

        let report = Application::analyze(&fs, &query_config).unwrap();
        assert_eq!(
            report,
            Report {
                size_threshold: 100_000,
                bounded_sum: 95_437,
                cleanup: Cleanup::Delete {
                    path: "/d".to_string(),
                    size: 24_933_642,
                },
            }
        );
    }

    #[compio::test]
    async fn empty_transcript_reports_zero_sum() {
        let file = transcript_file("");
        let (fs, query_config) = Application::build(&runtime_config(file.path()))
            .await
            .unwrap();

        assert_eq!(fs.used_space(), 0);
        let report = Application::analyze(&fs, &query_config).unwrap();
        assert_eq!(report.bounded_sum, 0);
        assert_eq!(
            report.cleanup,
            Cleanup::NotNeeded {
                free_space: 70_000_000
            }
        );
    }

    #[compio::test]
    async fn overrides_are_applied_over_config_file() {
        let file = transcript_file(SAMPLE);
        let mut config_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(config_file, "sizeThreshold: 584\ndiskCapacity: 1").unwrap();

        let app_config = RuntimeConfig {
            config: Some(config_file.path().to_path_buf()),
            disk_capacity: Some(70_000_000),
            ..runtime_config(file.path())
        };
        let (fs, query_config) = Application::build(&app_config).await.unwrap();

        assert_eq!(query_config.size_threshold, 584);
        assert_eq!(fs.disk_capacity(), 70_000_000);
        let report = Application::analyze(&fs, &query_config).unwrap();
        assert_eq!(report.bounded_sum, 584);
    }

    #[compio::test]
    async fn missing_transcript_is_a_read_error() {
        let app_config = runtime_config(&PathBuf::from("/this/path/does/not/exist.txt"));
        let result = Application::build(&app_config).await;

        match result {
            Err(err @ ApplicationError::ReadError { .. }) => {
                assert!(err.to_string().contains("/this/path/does/not/exist.txt"));
            }
            other => panic!("Expected ReadError, got {:?}", other.map(|_| ())),
        }
    }

    #[compio::test]
    async fn malformed_transcript_is_a_build_error() {
        let file = transcript_file("$ cd /\n$ cd ..\n");
        let result = Application::build(&runtime_config(file.path())).await;

        assert!(matches!(result, Err(ApplicationError::BuildError { .. })));
    }

    #[compio::test]
    async fn overfull_disk_is_a_query_error() {
        let file = transcript_file("$ ls\n500 big\n");
        let app_config = RuntimeConfig {
            disk_capacity: Some(100),
            required_free_space: Some(600),
            ..runtime_config(file.path())
        };
        let (fs, query_config) = Application::build(&app_config).await.unwrap();

        assert!(matches!(
            Application::analyze(&fs, &query_config),
            Err(QueryError::NoEligibleDirectory { space_needed: 1_000 })
        ));
    }

    #[compio::test]
    async fn run_prints_report_for_sample() {
        let file = transcript_file(SAMPLE);
        let app_config = RuntimeConfig {
            print_tree: true,
            ..runtime_config(file.path())
        };

        assert!(Application::run(app_config).await.is_ok());
    }
}
