//! Configuration for collocation runs.

use serde::{Deserialize, Serialize};

use crate::types::is_base_column;

/// Default search radius in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 25.0;

/// Configuration for the collocation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollocationConfig {
    /// Search radius around each point in kilometers.
    pub radius_km: f64,

    /// Variables to extract from the matched cell.
    pub variables: Vec<String>,

    /// Match (point, file) pairs on the rayon thread pool.
    pub parallel: bool,
}

impl Default for CollocationConfig {
    fn default() -> Self {
        Self {
            radius_km: DEFAULT_RADIUS_KM,
            variables: Vec::new(),
            parallel: false,
        }
    }
}

impl CollocationConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("COLLOCATION_RADIUS_KM") {
            if let Ok(radius) = val.parse() {
                config.radius_km = radius;
            }
        }

        if let Ok(val) = std::env::var("COLLOCATION_VARIABLES") {
            config.variables = parse_variable_list(&val);
        }

        if let Ok(val) = std::env::var("COLLOCATION_PARALLEL") {
            config.parallel = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Set the search radius.
    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = radius_km;
        self
    }

    /// Set the variables to extract.
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable parallel matching.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.radius_km.is_finite() || self.radius_km <= 0.0 {
            return Err(format!("radius_km must be > 0, got {}", self.radius_km));
        }

        if self.variables.iter().any(|v| v.trim().is_empty()) {
            return Err("variable names must not be empty".to_string());
        }

        if let Some(name) = self.variables.iter().find(|v| is_base_column(v)) {
            return Err(format!("variable '{}' clashes with a table column", name));
        }

        Ok(())
    }
}

/// Split a comma-separated variable list, dropping blanks.
pub fn parse_variable_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}
