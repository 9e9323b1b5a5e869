//! CSV loader for income-source lists.
//!
//! ## CSV Format
//!
//! Headers are matched by name, so column order does not matter.
//!
//! | Column | Required | Notes |
//! |------------------|----------|--------------------------------------------------|
//! | `id` | yes | Caller's label, echoed in the summary |
//! | `type` | yes | An income type, e.g. `salary`, `lottery` |
//! | `amount` | yes | Dong per payment; `20,000,000` is accepted |
//! | `frequency` | yes | `monthly`, `yearly` or `one_time` |
//! | `is_from_family` | no | `true`/`false`, `yes`/`no`, `1`/`0`; empty is false |
//! | `is_gov_bond` | no | Same as above |
//! | `business_sector`| no | `distribution`, `services`, `production_transport`, `other` |
//!
//! ### Example
//!
//! ```csv
//! id,type,amount,frequency,is_from_family
//! job,salary,"30,000,000",monthly,
//! house,inheritance_gift,2000000000,one_time,true
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use pit_core::{BusinessSector, Frequency, IncomeSource, IncomeType, InputError, SourceFlags};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::amount::{ParseAmountError, parse_amount};

/// Row as it appears in the file, before validation.
#[derive(Debug, Deserialize)]
struct CsvRow {
    id: String,
    #[serde(rename = "type")]
    income_type: String,
    amount: String,
    frequency: String,
    #[serde(default)]
    is_from_family: Option<String>,
    #[serde(default)]
    is_gov_bond: Option<String>,
    #[serde(default)]
    business_sector: Option<String>,
}

/// Errors that can occur while loading income sources.
///
/// `row` is the 1-based data row; the header is row 0.
#[derive(Debug, Error)]
pub enum SourceLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structural problem: missing required column, wrong field count, etc.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    #[error("row {row}: {source}")]
    Amount {
        row: usize,
        #[source]
        source: ParseAmountError,
    },

    #[error("row {row}: {source}")]
    Field {
        row: usize,
        #[source]
        source: InputError,
    },

    #[error("row {row}: invalid value '{value}' for {column}; expected true or false")]
    Flag {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: source id is empty")]
    MissingId { row: usize },
}

impl SourceLoadError {
    /// Data row the error was found on, if it is row-specific.
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::Amount { row, .. }
            | Self::Field { row, .. }
            | Self::Flag { row, .. }
            | Self::MissingId { row } => Some(*row),
            Self::Parse(err) => err.position().map(|p| p.line() as usize - 1),
            Self::Io { .. } => None,
        }
    }
}

fn parse_flag(
    value: Option<&str>,
    column: &'static str,
    row: usize,
) -> Result<bool, SourceLoadError> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("no") | Some("0") => Ok(false),
        Some("true") | Some("yes") | Some("1") => Ok(true),
        Some(_) => Err(SourceLoadError::Flag {
            row,
            column,
            value: value.unwrap_or_default().to_string(),
        }),
    }
}

fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<IncomeSource, SourceLoadError> {
    let field = |source: InputError| SourceLoadError::Field {
        row: row_number,
        source,
    };

    if row.id.trim().is_empty() {
        return Err(SourceLoadError::MissingId { row: row_number });
    }

    let income_type = IncomeType::try_from(row.income_type.as_str()).map_err(field)?;
    let frequency = Frequency::try_from(row.frequency.as_str()).map_err(field)?;
    let amount = parse_amount(&row.amount).map_err(|source| SourceLoadError::Amount {
        row: row_number,
        source,
    })?;

    let business_sector = match row.business_sector.as_deref().map(str::trim) {
        None | Some("") => BusinessSector::default(),
        Some(sector) => BusinessSector::try_from(sector).map_err(field)?,
    };

    let flags = SourceFlags {
        is_from_family: parse_flag(row.is_from_family.as_deref(), "is_from_family", row_number)?,
        is_gov_bond: parse_flag(row.is_gov_bond.as_deref(), "is_gov_bond", row_number)?,
        business_sector,
    };

    let source = IncomeSource::new(row.id.trim(), income_type, amount, frequency).with_flags(flags);
    source.validate().map_err(field)?;
    Ok(source)
}

/// Loader for income-source CSV data.
pub struct IncomeSourceLoader;

impl IncomeSourceLoader {
    /// Parses income sources from any reader. Rows are returned in file
    /// order; the first invalid row stops the load.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<IncomeSource>, SourceLoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(false)
            .from_reader(reader);

        let sources = reader
            .deserialize::<CsvRow>()
            .enumerate()
            .map(|(idx, result)| convert_row(result?, idx + 1))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = sources.len(), "loaded income sources");
        Ok(sources)
    }
}

/// Parses income sources from CSV text.
pub fn load_from_str(input: &str) -> Result<Vec<IncomeSource>, SourceLoadError> {
    IncomeSourceLoader::parse(input.as_bytes())
}

/// Reads `path` and delegates to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<IncomeSource>, SourceLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SourceLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}
