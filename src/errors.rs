use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IpolError {
    NoChannelsFound(String),
    MissingTimeAttribute(String),
    OutOfRange { time: f64, min: f64, max: f64 },
    DegenerateInterval { lower: f64, upper: f64 },
    InvalidQueryTime(String),
    InvalidSampleTime { row: usize, time: f64 },
    EmptySeries,
    EmptyFile,
    NoRows,
    UnsupportedFormat(String),
    Config(String),
    Terminal(String),
    Logic(String),
    Format(String),
    FileNotFound(PathBuf),
    IO(String),
}

impl IpolError {
    /// Range conditions are reported as warnings: the query was valid but no
    /// value can be given for it.
    pub fn is_warning(&self) -> bool {
        matches!(self, IpolError::OutOfRange { .. })
    }
}

impl std::fmt::Display for IpolError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self {
            IpolError::NoChannelsFound(keyword) => write!(
                f,
                "No columns with '{}' in their name found in the uploaded file.",
                keyword
            ),
            IpolError::MissingTimeAttribute(name) => {
                write!(f, "The data must contain a '{}' column.", name)
            }
            IpolError::OutOfRange { time, min, max } => write!(
                f,
                "Entered time {} is outside the valid range ({} to {}).",
                time, min, max
            ),
            IpolError::DegenerateInterval { lower, upper } => write!(
                f,
                "Unable to interpolate over the degenerate interval [{}, {}]",
                lower, upper
            ),
            IpolError::InvalidQueryTime(_) => {
                write!(f, "Please enter a valid numerical value for time.")
            }
            IpolError::InvalidSampleTime { row, time } => write!(
                f,
                "Sample [{}] has a time [{}] that is not a finite number",
                row, time
            ),
            IpolError::EmptySeries => write!(f, "The series does not contain any samples"),
            IpolError::EmptyFile => write!(f, "The file is empty, a header row is required"),
            IpolError::NoRows => write!(f, "The file contains a header but no data rows"),
            IpolError::UnsupportedFormat(ext) => write!(
                f,
                "Unsupported file format [.{}], save the spreadsheet as xlsx or CSV",
                ext
            ),
            IpolError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            IpolError::Terminal(msg) => write!(f, "Terminal registered an error: {}", msg),
            IpolError::Logic(msg) => write!(f, "{}", msg),
            IpolError::Format(msg) => write!(f, "Invalid format: {}", msg),
            IpolError::FileNotFound(path_buf) => {
                write!(f, "File not found or does not exist: {:#?}", path_buf)
            }
            IpolError::IO(msg) => write!(f, "Input / output error: {}", msg),
        }
    }
}

impl std::error::Error for IpolError {}

impl std::convert::From<std::io::Error> for IpolError {
    fn from(e: std::io::Error) -> Self {
        Self::IO(e.to_string())
    }
}

impl std::convert::From<csv::Error> for IpolError {
    fn from(e: csv::Error) -> Self {
        match e.kind() {
            csv::ErrorKind::Io(_) => Self::IO(e.to_string()),
            _ => Self::Format(e.to_string()),
        }
    }
}

impl std::convert::From<serde_json::Error> for IpolError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
