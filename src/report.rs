use crate::config::Config;
use crate::engine::{ChannelValue, QueryResult};
use crate::errors::IpolError;
use crate::series::Series;

pub fn format_value(cv: &ChannelValue, time: f64, config: &Config) -> String {
    format!(
        "Calculated {} at {} seconds is {:.*} {}",
        cv.channel, time, config.precision, cv.value, config.unit
    )
}

/// One line per channel.
pub fn format_result(res: &QueryResult, config: &Config) -> Vec<String> {
    res.values
        .iter()
        .map(|cv| format_value(cv, res.time, config))
        .collect()
}

/// Render a query result as text lines, or as a single line of JSON.
pub fn render(res: &QueryResult, config: &Config, json: bool) -> Result<Vec<String>, IpolError> {
    if json {
        let text = serde_json::to_string(res)
            .map_err(|e| IpolError::Format(e.to_string()))?;
        return Ok(vec![text]);
    }
    Ok(format_result(res, config))
}

/// Column names followed by the first `n` rows, right aligned.
pub fn preview(series: &Series, n: usize) -> String {
    let attributes = series.attributes();
    let cells: Vec<Vec<String>> = series
        .rows()
        .take(n)
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = attributes.iter().map(|a| a.len()).collect();
    for row in &cells {
        for (w, c) in widths.iter_mut().zip(row) {
            *w = (*w).max(c.len());
        }
    }

    let mut out = format!("Column names: {:?}\n", attributes);
    let line = |fields: &[String]| -> String {
        fields
            .iter()
            .zip(&widths)
            .map(|(f, w)| format!("{:>width$}", f, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };
    out.push_str(&line(attributes));
    out.push('\n');
    for row in &cells {
        out.push_str(&line(row.as_slice()));
        out.push('\n');
    }
    if series.len() > n {
        out.push_str(&format!("... {} more rows\n", series.len() - n));
    }
    out
}
