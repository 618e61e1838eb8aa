use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use super::error::DashboardError;

// ---------------------------------------------------------------------------
// Parameter – the fixed set of measured quantities
// ---------------------------------------------------------------------------

/// One of the five water-quality measurements carried by every site file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Parameter {
    Conductivity,
    No3,
    Temp,
    Turbidity,
    Level,
}

impl Parameter {
    /// All parameters, in the order they are offered in the selector.
    pub const ALL: [Parameter; 5] = [
        Parameter::Conductivity,
        Parameter::No3,
        Parameter::Temp,
        Parameter::Turbidity,
        Parameter::Level,
    ];

    /// Column header used for this parameter in the source files.
    pub fn column_name(self) -> &'static str {
        match self {
            Parameter::Conductivity => "Conductivity",
            Parameter::No3 => "NO3",
            Parameter::Temp => "Temp",
            Parameter::Turbidity => "Turbidity",
            Parameter::Level => "Level",
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Parameter {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.column_name() == s)
            .ok_or_else(|| DashboardError::UnknownParameter(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Observation – one row of a site file
// ---------------------------------------------------------------------------

/// A single timestamped reading from one site.  Missing values are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    /// Site identifier derived from the source file name.
    pub site: String,
    pub conductivity: Option<f64>,
    pub no3: Option<f64>,
    pub temp: Option<f64>,
    pub turbidity: Option<f64>,
    pub level: Option<f64>,
}

impl Observation {
    /// An observation with every measurement missing.
    pub fn empty(timestamp: NaiveDateTime, site: impl Into<String>) -> Self {
        Observation {
            timestamp,
            site: site.into(),
            conductivity: None,
            no3: None,
            temp: None,
            turbidity: None,
            level: None,
        }
    }

    pub fn value(&self, parameter: Parameter) -> Option<f64> {
        match parameter {
            Parameter::Conductivity => self.conductivity,
            Parameter::No3 => self.no3,
            Parameter::Temp => self.temp,
            Parameter::Turbidity => self.turbidity,
            Parameter::Level => self.level,
        }
    }

    pub fn set_value(&mut self, parameter: Parameter, value: Option<f64>) {
        let slot = match parameter {
            Parameter::Conductivity => &mut self.conductivity,
            Parameter::No3 => &mut self.no3,
            Parameter::Temp => &mut self.temp,
            Parameter::Turbidity => &mut self.turbidity,
            Parameter::Level => &mut self.level,
        };
        *slot = value;
    }
}

// ---------------------------------------------------------------------------
// WaterQualityDataset – the unified, read-only table
// ---------------------------------------------------------------------------

/// All observations from every readable source, in concatenation order.
#[derive(Debug, Clone, Default)]
pub struct WaterQualityDataset {
    pub observations: Vec<Observation>,
    /// Sorted set of site identifiers present in `observations`.
    pub sites: BTreeSet<String>,
}

impl WaterQualityDataset {
    /// Build the site index from the concatenated observations.
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let sites = observations.iter().map(|o| o.site.clone()).collect();
        WaterQualityDataset {
            observations,
            sites,
        }
    }

    /// Latest timestamp over the whole dataset, across all sites.
    pub fn max_timestamp(&self) -> Option<NaiveDateTime> {
        self.observations.iter().map(|o| o.timestamp).max()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn parameter_names_round_trip_through_from_str() {
        for p in Parameter::ALL {
            assert_eq!(p.column_name().parse::<Parameter>().unwrap(), p);
        }
        assert_eq!(Parameter::No3.to_string(), "NO3");
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let err = "pH".parse::<Parameter>().unwrap_err();
        assert_eq!(err, DashboardError::UnknownParameter("pH".to_string()));
        // Column names are case-sensitive.
        assert!("temp".parse::<Parameter>().is_err());
    }

    #[test]
    fn set_value_updates_only_the_named_field() {
        let mut obs = Observation::empty(at(1, 0), "a");
        obs.set_value(Parameter::Turbidity, Some(4.5));
        assert_eq!(obs.value(Parameter::Turbidity), Some(4.5));
        assert_eq!(obs.value(Parameter::Temp), None);
    }

    #[test]
    fn dataset_indexes_sites_and_latest_timestamp() {
        let ds = WaterQualityDataset::from_observations(vec![
            Observation::empty(at(2, 0), "tully"),
            Observation::empty(at(5, 6), "mulgrave"),
            Observation::empty(at(3, 0), "tully"),
        ]);
        assert_eq!(ds.len(), 3);
        assert_eq!(
            ds.sites.iter().cloned().collect::<Vec<_>>(),
            vec!["mulgrave".to_string(), "tully".to_string()]
        );
        assert_eq!(ds.max_timestamp(), Some(at(5, 6)));
    }

    #[test]
    fn empty_dataset_has_no_max_timestamp() {
        let ds = WaterQualityDataset::default();
        assert!(ds.is_empty());
        assert_eq!(ds.max_timestamp(), None);
    }
}
