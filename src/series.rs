use crate::errors::IpolError;
use serde::{Deserialize, Serialize};

/// A table of samples: one row per sample, one column per attribute.
///
/// Attribute identifiers are expected to be normalized already (see
/// [`normalize_identifier`](crate::normalize_identifier)). Missing cells are
/// stored as `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    attributes: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl Series {
    pub fn new(attributes: Vec<String>) -> Self {
        Series {
            attributes,
            rows: vec![],
        }
    }

    // Add a sample, one value per attribute in header order.
    pub fn push(&mut self, values: Vec<f64>) -> Result<(), IpolError> {
        if values.len() != self.attributes.len() {
            return Err(IpolError::Format(format!(
                "Mismatch between the number of attributes [{}] and the number of values [{}]",
                self.attributes.len(),
                values.len()
            )));
        }
        self.rows.push(values);
        Ok(())
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Column index of the attribute `name`.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a == name)
    }

    /// All attributes satisfying `predicate`, in header order.
    pub fn attributes_where<P>(&self, predicate: P) -> Vec<&str>
    where
        P: Fn(&str) -> bool,
    {
        self.attributes
            .iter()
            .map(|a| a.as_str())
            .filter(|a| predicate(a))
            .collect()
    }

    /// Attributes whose identifier contains `keyword`.
    pub fn channels(&self, keyword: &str) -> Vec<&str> {
        self.attributes_where(|a| a.contains(keyword))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, idx: usize) -> Option<&[f64]> {
        self.rows.get(idx).map(|r| r.as_slice())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        self.rows.get(row).and_then(|r| r.get(column)).copied()
    }

    /// All values of the attribute `name` in row order.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.position(name)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }
}
