use std::{borrow::Cow, io::Cursor, path::Path};

use compio::{fs::File, io::AsyncReadExt, io::BufReader};
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::debug;

use crate::ext::BestEffortPathExt;

pub const DEFAULT_DISK_CAPACITY: u64 = 70_000_000;
pub const DEFAULT_REQUIRED_FREE_SPACE: u64 = 30_000_000;
pub const DEFAULT_SIZE_THRESHOLD: u64 = 100_000;

const DISK_CAPACITY_KEY: &str = "diskCapacity";
const REQUIRED_FREE_SPACE_KEY: &str = "requiredFreeSpace";
const SIZE_THRESHOLD_KEY: &str = "sizeThreshold";

/// Constants used by the size queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// Total capacity of the disk the transcript was taken on
    pub disk_capacity: u64,
    /// Free space that has to be available after the cleanup
    pub required_free_space: u64,
    /// Largest directory size still counted by the bounded sum
    pub size_threshold: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            disk_capacity: DEFAULT_DISK_CAPACITY,
            required_free_space: DEFAULT_REQUIRED_FREE_SPACE,
            size_threshold: DEFAULT_SIZE_THRESHOLD,
        }
    }
}

impl QueryConfig {
    pub async fn from_path(path: &Path) -> Result<Self, QueryConfigError> {
        debug!("Opening config file: {}", path.best_effort_path_display());
        let file = File::open(path).await.context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;

        let cursor = Cursor::new(file);
        let mut reader = BufReader::new(cursor);
        let res = reader.read_to_string(String::new()).await;
        match res.0 {
            Ok(n) => debug!("Successfully read config file: {n} bytes"),
            _ => {
                res.0.context(ReadSnafu {
                    file_path: path.best_effort_path_display(),
                })?;
            }
        }
        res.1.as_str().try_into()
    }

    /// Replaces every value for which an override is given
    pub fn with_overrides(
        self,
        disk_capacity: Option<u64>,
        required_free_space: Option<u64>,
        size_threshold: Option<u64>,
    ) -> Self {
        Self {
            disk_capacity: disk_capacity.unwrap_or(self.disk_capacity),
            required_free_space: required_free_space.unwrap_or(self.required_free_space),
            size_threshold: size_threshold.unwrap_or(self.size_threshold),
        }
    }

    fn read_value(
        top_level: &LinkedHashMap<Yaml, Yaml>,
        key: &'static str,
        default: u64,
    ) -> Result<u64, QueryConfigError> {
        match top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key)))) {
            None => Ok(default),
            Some(Yaml::Value(Scalar::Integer(value))) => {
                u64::try_from(*value).map_err(|_| QueryConfigError::InvalidValue {
                    key,
                    found: value.to_string(),
                })
            }
            Some(other) => Err(QueryConfigError::InvalidValue {
                key,
                found: format!("{other:?}"),
            }),
        }
    }
}

impl TryFrom<&str> for QueryConfig {
    type Error = QueryConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let contents = contents_vec
            .first()
            .ok_or(QueryConfigError::MalformedConfig)?;

        let top_level = contents
            .as_mapping()
            .ok_or(QueryConfigError::TopLevelNotMap)?;

        for key in top_level.keys() {
            match key.as_str() {
                Some(DISK_CAPACITY_KEY | REQUIRED_FREE_SPACE_KEY | SIZE_THRESHOLD_KEY) => {}
                _ => debug!("Skipping unknown config entry: {:?}", key),
            }
        }

        let config = QueryConfig {
            disk_capacity: Self::read_value(top_level, DISK_CAPACITY_KEY, DEFAULT_DISK_CAPACITY)?,
            required_free_space: Self::read_value(
                top_level,
                REQUIRED_FREE_SPACE_KEY,
                DEFAULT_REQUIRED_FREE_SPACE,
            )?,
            size_threshold: Self::read_value(
                top_level,
                SIZE_THRESHOLD_KEY,
                DEFAULT_SIZE_THRESHOLD,
            )?,
        };
        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum QueryConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted config file"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Expected a non-negative integer for '{}', found {}", key, found))]
    InvalidValue { key: &'static str, found: String },
}
