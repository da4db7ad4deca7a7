mod config;
pub use config::*;
mod engine;
pub use engine::*;
mod errors;
pub use errors::*;
mod ipol;
pub use ipol::*;
mod loader;
pub use loader::*;
mod normalize;
pub use normalize::*;
pub mod report;
mod series;
pub use series::*;
mod xlsx;
pub use xlsx::read_xlsx_rows;

use console::Term;
use log::debug;

pub fn question(term: &Term, msg: &str) -> Result<String, IpolError> {
    if let Err(e) = term.write_str(&format!("{}: ", msg)) {
        return Err(IpolError::Terminal(e.to_string()));
    }
    term.read_line()
        .map_err(|e| IpolError::Terminal(e.to_string()))
}

/// Parse a query time typed by the user.
pub fn parse_time(text: &str) -> Result<f64, IpolError> {
    let time = text.trim().parse::<f64>().map_err(|e| {
        debug!("Unable to parse time [{}]: {}", text.trim(), e);
        IpolError::InvalidQueryTime(text.trim().to_owned())
    })?;
    if time.is_nan() {
        return Err(IpolError::InvalidQueryTime(text.trim().to_owned()));
    }
    Ok(time)
}

/// Whether an answer typed at the prompt ends the session.
pub fn is_quit(answer: &str) -> bool {
    match answer.trim().to_lowercase().as_str() {
        "" | "q" | "quit" | "exit" => true,
        _ => false,
    }
}
