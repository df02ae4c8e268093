//! Session configuration.
//!
//! All fields have defaults, so an empty TOML document is a valid config.

use crate::error::{Result, ZipError};
use zipscope_types::record::DEFAULT_CODE_WIDTH;

/// Tunables for a lookup session.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Width postal codes are zero-padded to.
    #[serde(default = "Config::default_code_width")]
    pub code_width: usize,

    /// Radius used by searches until the caller picks another one.
    #[serde(default = "Config::default_radius_km")]
    pub default_radius_km: f64,

    /// Bucket edges of the distance histogram, strictly ascending.
    #[serde(default = "Config::default_histogram_edges_km")]
    pub histogram_edges_km: Vec<f64>,

    /// Heat weight contributed by each occurrence of a code in a highlight list.
    #[serde(default = "Config::default_highlight_weight")]
    pub highlight_weight: f64,

    /// Heat weight of every hit in the heat layer of a query result.
    #[serde(default = "Config::default_result_heat_weight")]
    pub result_heat_weight: f64,
}

impl Config {
    const fn default_code_width() -> usize {
        DEFAULT_CODE_WIDTH
    }

    const fn default_radius_km() -> f64 {
        10.0
    }

    fn default_histogram_edges_km() -> Vec<f64> {
        vec![0.0, 5.0, 10.0, 20.0, 30.0, 50.0, 100.0]
    }

    const fn default_highlight_weight() -> f64 {
        0.3
    }

    const fn default_result_heat_weight() -> f64 {
        0.8
    }

    pub fn with_code_width(mut self, width: usize) -> Self {
        self.code_width = width;
        self
    }

    pub fn with_default_radius_km(mut self, radius_km: f64) -> Self {
        self.default_radius_km = radius_km;
        self
    }

    pub fn with_histogram_edges_km(mut self, edges: Vec<f64>) -> Self {
        self.histogram_edges_km = edges;
        self
    }

    pub fn with_highlight_weight(mut self, weight: f64) -> Self {
        self.highlight_weight = weight;
        self
    }

    pub fn with_result_heat_weight(mut self, weight: f64) -> Self {
        self.result_heat_weight = weight;
        self
    }

    /// Check the invariants the rest of the crate relies on.
    pub fn validate(&self) -> Result<()> {
        // Prefix groups descend four levels before the full code.
        if self.code_width < 5 {
            return Err(ZipError::Config(format!(
                "code_width must be at least 5, got {}",
                self.code_width
            )));
        }

        if !self.default_radius_km.is_finite() || self.default_radius_km < 0.0 {
            return Err(ZipError::Config(format!(
                "default_radius_km must be a finite, non-negative number, got {}",
                self.default_radius_km
            )));
        }

        if self.histogram_edges_km.len() < 2 {
            return Err(ZipError::Config(
                "histogram_edges_km needs at least two edges".to_string(),
            ));
        }
        if self.histogram_edges_km.iter().any(|edge| !edge.is_finite())
            || self.histogram_edges_km.windows(2).any(|w| w[0] >= w[1])
        {
            return Err(ZipError::Config(format!(
                "histogram_edges_km must be finite and strictly ascending, got {:?}",
                self.histogram_edges_km
            )));
        }

        if !self.highlight_weight.is_finite() || self.highlight_weight <= 0.0 {
            return Err(ZipError::Config(format!(
                "highlight_weight must be positive, got {}",
                self.highlight_weight
            )));
        }
        if self.highlight_weight > 1.0 {
            log::warn!(
                "highlight_weight {} saturates the heatmap with a single occurrence",
                self.highlight_weight
            );
        }

        if !self.result_heat_weight.is_finite()
            || self.result_heat_weight <= 0.0
            || self.result_heat_weight > 1.0
        {
            return Err(ZipError::Config(format!(
                "result_heat_weight must be in (0, 1], got {}",
                self.result_heat_weight
            )));
        }

        Ok(())
    }

    /// Parse and validate a TOML document.
    ///
    /// ```
    /// use zipscope::Config;
    ///
    /// let config = Config::from_toml_str("default_radius_km = 25.0").unwrap();
    /// assert_eq!(config.default_radius_km, 25.0);
    /// assert_eq!(config.code_width, 5);
    /// ```
    #[cfg(feature = "toml")]
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a TOML file.
    #[cfg(feature = "toml")]
    pub fn from_toml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            code_width: Self::default_code_width(),
            default_radius_km: Self::default_radius_km(),
            histogram_edges_km: Self::default_histogram_edges_km(),
            highlight_weight: Self::default_highlight_weight(),
            result_heat_weight: Self::default_result_heat_weight(),
        }
    }
}
