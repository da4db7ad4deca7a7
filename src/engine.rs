use crate::errors::IpolError;
use crate::ipol::interpolate_linear;
use crate::series::Series;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Method {
    /// The query time matched a sample time.
    Exact,
    /// Linear interpolation between the samples at `lower` and `upper`.
    Interpolated { lower: f64, upper: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelValue {
    pub channel: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub time: f64,
    pub method: Method,
    pub values: Vec<ChannelValue>,
}

impl QueryResult {
    pub fn get(&self, channel: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|cv| cv.channel == channel)
            .map(|cv| cv.value)
    }
}

/// Looks up channel values at arbitrary times in a [`Series`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    pub time_attribute: String,
    pub channel_keyword: String,
}

impl Engine {
    pub fn new(time_attribute: &str, channel_keyword: &str) -> Self {
        Self {
            time_attribute: time_attribute.to_owned(),
            channel_keyword: channel_keyword.to_owned(),
        }
    }

    /// Resolve the time attribute and the channels of `series` and order its
    /// samples by time. The series itself is left untouched.
    ///
    /// Every sample time must be finite.
    pub fn prepare<'a>(&self, series: &'a Series) -> Result<PreparedSeries<'a>, IpolError> {
        let time_idx = series
            .position(&self.time_attribute)
            .ok_or_else(|| IpolError::MissingTimeAttribute(self.time_attribute.clone()))?;

        let channels: Vec<(String, usize)> = series
            .channels(&self.channel_keyword)
            .into_iter()
            .filter(|name| *name != self.time_attribute)
            .filter_map(|name| series.position(name).map(|idx| (name.to_owned(), idx)))
            .collect();
        if channels.is_empty() {
            return Err(IpolError::NoChannelsFound(self.channel_keyword.clone()));
        }
        if series.is_empty() {
            return Err(IpolError::EmptySeries);
        }

        let times: Vec<f64> = series.rows().map(|r| r[time_idx]).collect();
        if let Some(row) = times.iter().position(|t| !t.is_finite()) {
            return Err(IpolError::InvalidSampleTime {
                row,
                time: times[row],
            });
        }

        let mut order: Vec<usize> = (0..series.len()).collect();
        if times.windows(2).all(|w| w[0] <= w[1]) {
            debug!("Series of {} samples is already sorted by time", times.len());
        } else {
            debug!("Sorting series of {} samples by time", times.len());
            // sort_by is stable: equal times (0.0 and -0.0 included) keep
            // their original row order. All times are finite here.
            order.sort_by(|a, b| {
                times[*a]
                    .partial_cmp(&times[*b])
                    .unwrap_or(Ordering::Equal)
            });
        }
        let times = order.iter().map(|i| times[*i]).collect();

        Ok(PreparedSeries {
            series,
            order,
            times,
            channels,
        })
    }

    pub fn interpolate(&self, series: &Series, time: f64) -> Result<QueryResult, IpolError> {
        self.prepare(series)?.query(time)
    }
}

/// A series with its channels resolved and its samples ordered by time, ready
/// to answer any number of queries.
#[derive(Debug, Clone)]
pub struct PreparedSeries<'a> {
    series: &'a Series,
    // row indices of `series` in ascending time order
    order: Vec<usize>,
    // sample times in ascending order
    times: Vec<f64>,
    channels: Vec<(String, usize)>,
}

impl<'a> PreparedSeries<'a> {
    pub fn channels(&self) -> Vec<&str> {
        self.channels.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn min_time(&self) -> f64 {
        self.times[0]
    }

    pub fn max_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    fn sample(&self, sorted_idx: usize) -> Result<&'a [f64], IpolError> {
        self.order
            .get(sorted_idx)
            .and_then(|row| self.series.row(*row))
            .ok_or_else(|| {
                IpolError::Logic(format!("Expected a sample at sorted index [{}]", sorted_idx))
            })
    }

    pub fn query(&self, time: f64) -> Result<QueryResult, IpolError> {
        if time.is_nan() {
            return Err(IpolError::InvalidQueryTime(time.to_string()));
        }

        // first sample with a time >= query
        let first_ge = self.times.partition_point(|t| *t < time);
        if first_ge < self.times.len() && self.times[first_ge] == time {
            let row = self.sample(first_ge)?;
            let values = self
                .channels
                .iter()
                .map(|(channel, idx)| ChannelValue {
                    channel: channel.clone(),
                    value: row[*idx],
                })
                .collect();
            return Ok(QueryResult {
                time,
                method: Method::Exact,
                values,
            });
        }

        let (min, max) = (self.min_time(), self.max_time());
        if time < min || time > max {
            return Err(IpolError::OutOfRange { time, min, max });
        }

        // first sample with a time > query; the one before it is the last
        // sample with a time <= query
        let upper_idx = self.times.partition_point(|t| *t <= time);
        if upper_idx == 0 || upper_idx >= self.times.len() {
            return Err(IpolError::Logic(format!(
                "No bracketing samples found for time {} in range ({} to {})",
                time, min, max
            )));
        }
        let lower_idx = upper_idx - 1;
        let (t0, t1) = (self.times[lower_idx], self.times[upper_idx]);
        let (lower, upper) = (self.sample(lower_idx)?, self.sample(upper_idx)?);

        let mut values = Vec::with_capacity(self.channels.len());
        for (channel, idx) in &self.channels {
            let value = interpolate_linear(time, t0, t1, lower[*idx], upper[*idx])?;
            values.push(ChannelValue {
                channel: channel.clone(),
                value,
            });
        }
        Ok(QueryResult {
            time,
            method: Method::Interpolated {
                lower: t0,
                upper: t1,
            },
            values,
        })
    }

    pub fn query_many(&self, times: &[f64]) -> Vec<Result<QueryResult, IpolError>> {
        times.iter().map(|t| self.query(*t)).collect()
    }
}
