//! Aggregates over the visible page.
//!
//! Both [`PageStats`] and [`TrendSeries`] are computed from the readings on
//! the *current page*, not from the whole active dataset. Moving to another
//! page changes the means; consumers that want day-wide figures should
//! compute them from [`ReadingView::active_dataset`](crate::ReadingView::active_dataset).

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use greenwatch_types::Reading;

/// Means and extremes over one page of readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageStats {
    /// Number of readings the figures were computed from.
    pub count: usize,
    /// Mean temperature in °C.
    pub mean_temperature: f64,
    /// Mean relative humidity in percent.
    pub mean_humidity: f64,
    /// Lowest temperature on the page.
    pub min_temperature: f64,
    /// Highest temperature on the page.
    pub max_temperature: f64,
}

impl PageStats {
    /// Compute statistics for `readings`. `None` for an empty slice.
    pub fn from_readings(readings: &[Reading]) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }

        let mut temp_sum = 0.0;
        let mut hum_sum = 0.0;
        let mut min_temperature = f64::INFINITY;
        let mut max_temperature = f64::NEG_INFINITY;

        for r in readings {
            temp_sum += r.temperature;
            hum_sum += r.humidity;
            min_temperature = min_temperature.min(r.temperature);
            max_temperature = max_temperature.max(r.temperature);
        }

        let n = readings.len() as f64;
        Some(Self {
            count: readings.len(),
            mean_temperature: temp_sum / n,
            mean_humidity: hum_sum / n,
            min_temperature,
            max_temperature,
        })
    }
}

/// Chart-ready series for the visible page, oldest first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendSeries {
    /// Timestamps of the points.
    #[serde(with = "rfc3339_labels")]
    pub labels: Vec<OffsetDateTime>,
    /// Temperature per point, in °C.
    pub temperature: Vec<f64>,
    /// Relative humidity per point, in percent.
    pub humidity: Vec<f64>,
}

impl TrendSeries {
    /// Build a series from newest-first readings. `None` for an empty slice.
    pub fn from_readings(readings: &[Reading]) -> Option<Self> {
        if readings.is_empty() {
            return None;
        }

        let mut series = Self {
            labels: Vec::with_capacity(readings.len()),
            temperature: Vec::with_capacity(readings.len()),
            humidity: Vec::with_capacity(readings.len()),
        };
        for r in readings.iter().rev() {
            series.labels.push(r.timestamp);
            series.temperature.push(r.temperature);
            series.humidity.push(r.humidity);
        }
        Some(series)
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

mod rfc3339_labels {
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    pub fn serialize<S: Serializer>(
        labels: &[OffsetDateTime],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let formatted = labels
            .iter()
            .map(|t| t.format(&Rfc3339))
            .collect::<Result<Vec<_>, _>>()
            .map_err(S::Error::custom)?;
        serializer.collect_seq(formatted)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<OffsetDateTime>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|s| OffsetDateTime::parse(s, &Rfc3339).map_err(D::Error::custom))
            .collect()
    }
}
