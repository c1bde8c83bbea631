//! Writing instruments to disk as JSON or XML.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::FinvError;
use crate::models::Instrument;

type Encoder = fn(&Instrument) -> Result<String, FinvError>;

/// Output format of an export.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Xml,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Xml => "xml",
        }
    }

    fn encoder(&self) -> Encoder {
        match self {
            ExportFormat::Json => to_json,
            ExportFormat::Xml => to_xml,
        }
    }

    /// Serialize `instrument` in this format.
    pub fn encode(&self, instrument: &Instrument) -> Result<String, FinvError> {
        (self.encoder())(instrument)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = FinvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "xml" => Ok(ExportFormat::Xml),
            other => Err(FinvError::InvalidInput(format!(
                "unknown export format: {}",
                other
            ))),
        }
    }
}

fn to_json(instrument: &Instrument) -> Result<String, FinvError> {
    Ok(serde_json::to_string_pretty(instrument)?)
}

fn to_xml(instrument: &Instrument) -> Result<String, FinvError> {
    quick_xml::se::to_string(instrument).map_err(|e| FinvError::Export(e.to_string()))
}

/// Write `instrument` to `<dir>/<SYMBOL>.<ext>` and return the path.
///
/// The directory is created when missing; an existing file is overwritten.
pub fn export(
    instrument: &Instrument,
    format: ExportFormat,
    dir: impl AsRef<Path>,
) -> Result<PathBuf, FinvError> {
    let dir = dir.as_ref();
    let contents = format.encode(instrument)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.{}", file_stem(instrument.symbol()), format.extension()));
    fs::write(&path, contents)?;

    info!("Exported {} to {}", instrument.symbol(), path.display());
    Ok(path)
}

/// Symbol with path separators replaced so it stays a single file name.
fn file_stem(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}
