use crate::config::Config;
use crate::errors::IpolError;
use crate::normalize::normalize_identifier;
use crate::series::Series;
use crate::xlsx::read_xlsx_rows;
use log::{debug, info};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceFormat {
    /// Delimited text with the given field delimiter.
    Delimited(u8),
    Xlsx,
}

// Guess the file format from the extension.
fn source_format(path: &Path, config: &Config) -> Result<SourceFormat, IpolError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "xlsx" | "xlsm" => Ok(SourceFormat::Xlsx),
        "xls" | "ods" => Err(IpolError::UnsupportedFormat(ext)),
        _ => match config.delimiter {
            Some(d) => Ok(SourceFormat::Delimited(d as u8)),
            None if ext == "tsv" || ext == "tab" => Ok(SourceFormat::Delimited(b'\t')),
            None => Ok(SourceFormat::Delimited(b',')),
        },
    }
}

fn parse_cell(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}

// Turn a header and (line number, cells) records into a series. Shared by
// the delimited and the xlsx readers so both apply the same cell rules.
fn series_from_records<I>(headers: &[String], records: I, config: &Config) -> Result<Series, IpolError>
where
    I: Iterator<Item = Result<(usize, Vec<String>), IpolError>>,
{
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IpolError::EmptyFile);
    }
    let attributes: Vec<String> = headers.iter().map(|h| normalize_identifier(h)).collect();
    debug!("Normalized column names: {:?}", attributes);
    for (i, a) in attributes.iter().enumerate() {
        if attributes[..i].contains(a) {
            return Err(IpolError::Format(format!(
                "Column [{}] appears more than once after normalizing the headers",
                a
            )));
        }
    }

    let time_idx = attributes
        .iter()
        .position(|a| *a == config.time_attribute)
        .ok_or_else(|| IpolError::MissingTimeAttribute(config.time_attribute.clone()))?;
    let is_channel: Vec<bool> = attributes
        .iter()
        .enumerate()
        .map(|(i, a)| i != time_idx && a.contains(&config.channel_keyword))
        .collect();
    let width = attributes.len();

    let mut series = Series::new(attributes);
    for record in records {
        let (line, mut cells) = record?;
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        if cells.len() > width {
            if cells[width..].iter().any(|c| !c.trim().is_empty()) {
                return Err(IpolError::Format(format!(
                    "Expected {} fields on line {}, found {}",
                    width,
                    line,
                    cells.len()
                )));
            }
            cells.truncate(width);
        }
        // spreadsheets leave out trailing empty cells
        cells.resize(width, String::new());

        let mut values = Vec::with_capacity(width);
        for (j, cell) in cells.iter().enumerate() {
            let value = match parse_cell(cell) {
                Some(v) => v,
                None if j == time_idx => {
                    return Err(IpolError::Format(format!(
                        "Expected a numerical time on line {}, found [{}]",
                        line, cell
                    )));
                }
                None if is_channel[j] && !cell.trim().is_empty() => {
                    return Err(IpolError::Format(format!(
                        "Expected a numerical value in column [{}] on line {}, found [{}]",
                        series.attributes()[j],
                        line,
                        cell
                    )));
                }
                None => std::f64::NAN,
            };
            values.push(value);
        }
        if !values[time_idx].is_finite() {
            return Err(IpolError::Format(format!(
                "Expected a finite time on line {}, found [{}]",
                line, cells[time_idx]
            )));
        }
        series.push(values)?;
    }

    if series.is_empty() {
        return Err(IpolError::NoRows);
    }
    Ok(series)
}

/// Read a delimited table with a header row into a [`Series`].
///
/// Headers are normalized. The time column must be present and every time
/// cell must hold a finite number. Channel cells may be empty (stored as
/// `NaN`) but must otherwise be numeric. Cells of all other columns that are
/// not numeric are stored as `NaN`.
pub fn read_series<R: Read>(rdr: R, delimiter: u8, config: &Config) -> Result<Series, IpolError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(rdr);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_owned()).collect();
    let records = rdr.records().enumerate().map(|(i, record)| -> Result<(usize, Vec<String>), IpolError> {
        let record = record?;
        // header is line 1
        Ok((i + 2, record.iter().map(|c| c.to_owned()).collect()))
    });
    series_from_records(&headers, records, config)
}

/// Read the first worksheet of an xlsx workbook into a [`Series`]. The first
/// non-empty row holds the headers; cell rules are those of [`read_series`].
pub fn read_xlsx_series(data: &[u8], config: &Config) -> Result<Series, IpolError> {
    let rows = read_xlsx_rows(data)?;
    let header_idx = match rows
        .iter()
        .position(|r| r.iter().any(|c| !c.trim().is_empty()))
    {
        Some(idx) => idx,
        None => return Err(IpolError::EmptyFile),
    };
    let records = rows
        .iter()
        .enumerate()
        .skip(header_idx + 1)
        .map(|(i, r)| Ok((i + 1, r.clone())));
    series_from_records(&rows[header_idx], records, config)
}

/// Load a time series from a CSV, TSV or xlsx file.
pub async fn load_series(path_buf: PathBuf, config: &Config) -> Result<Series, IpolError> {
    if !path_buf.is_file() {
        return Err(IpolError::FileNotFound(path_buf));
    }
    let format = source_format(&path_buf, config)?;
    let path: async_std::path::PathBuf = path_buf.clone().into();
    let bytes = async_std::fs::read(&path).await?;
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(IpolError::EmptyFile);
    }
    let series = match format {
        SourceFormat::Delimited(delimiter) => read_series(bytes.as_slice(), delimiter, config)?,
        SourceFormat::Xlsx => read_xlsx_series(&bytes, config)?,
    };
    info!(
        "Loaded {} samples with columns {:?} from {}",
        series.len(),
        series.attributes(),
        path_buf.display()
    );
    Ok(series)
}
