use std::path::{Path, PathBuf};

use crate::FixupError;

pub const DEFAULT_OUTPUT_FILE_NAME: &str = "output.gcode";
pub const DEFAULT_ZHOP: f64 = 10.0;
pub const MAX_PRIME_AMOUNT: f64 = 400.0;

/// Settings for one fixup run. Built once up front and passed by reference
/// into the processing entry points.
#[derive(Debug, Clone, PartialEq)]
pub struct FixupConfig {
    /// Extra extrusion pushed at the start of every layer after layer 0.
    pub prime_amount: f64,

    /// How far above the next layer's height the travel move to that layer
    /// should go. 0.0 disables hopping.
    pub zhop: f64,

    pub output_directory: PathBuf,
    pub output_file_name: String,
}

impl Default for FixupConfig {
    fn default() -> Self {
        Self {
            prime_amount: 0.0,
            zhop: DEFAULT_ZHOP,
            output_directory: PathBuf::from("."),
            output_file_name: DEFAULT_OUTPUT_FILE_NAME.to_owned(),
        }
    }
}

impl FixupConfig {
    pub fn new(prime_amount: f64) -> Self {
        Self {
            prime_amount,
            ..Default::default()
        }
    }

    pub fn with_zhop(mut self, zhop: f64) -> Self {
        self.zhop = zhop;
        self
    }

    pub fn with_output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_directory = dir.into();
        self
    }

    pub fn with_output_file_name(mut self, name: impl Into<String>) -> Self {
        self.output_file_name = name.into();
        self
    }

    pub fn output_path(&self) -> PathBuf {
        Path::new(&self.output_directory).join(&self.output_file_name)
    }

    pub fn hop_enabled(&self) -> bool {
        self.zhop > 0.0
    }

    pub(crate) fn check_prime_amount(&self) -> Result<(), FixupError> {
        // NaN compares false against everything, so spell out the rejection.
        if self.prime_amount.is_nan() || self.prime_amount > MAX_PRIME_AMOUNT {
            return Err(FixupError::PrimeOutOfRange {
                amount: self.prime_amount,
                max: MAX_PRIME_AMOUNT,
            });
        }
        Ok(())
    }

    /// Checks every value that doesn't depend on the input document.
    pub fn validate(&self) -> Result<(), FixupError> {
        self.check_prime_amount()?;
        if self.zhop.is_nan() || self.zhop < 0.0 {
            return Err(FixupError::InvalidHop(self.zhop));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let config = FixupConfig::new(0.4);
        assert_eq!(config.zhop, 10.0);
        assert_eq!(config.output_file_name, "output.gcode");
        assert!(config.hop_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn output_path_joins_directory_and_name() {
        let config = FixupConfig::new(1.0)
            .with_output_directory("/tmp/prints")
            .with_output_file_name("part.gcode");
        assert_eq!(config.output_path(), PathBuf::from("/tmp/prints/part.gcode"));
    }

    #[test]
    fn prime_amount_limit_is_inclusive() {
        assert!(FixupConfig::new(400.0).validate().is_ok());
        assert!(matches!(
            FixupConfig::new(400.01).validate(),
            Err(FixupError::PrimeOutOfRange { .. })
        ));
        assert!(matches!(
            FixupConfig::new(f64::NAN).validate(),
            Err(FixupError::PrimeOutOfRange { .. })
        ));
    }

    #[test]
    fn zero_hop_disables_hopping() {
        let config = FixupConfig::new(1.0).with_zhop(0.0);
        assert!(!config.hop_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn negative_hop_is_rejected() {
        assert!(matches!(
            FixupConfig::new(1.0).with_zhop(-2.0).validate(),
            Err(FixupError::InvalidHop(_))
        ));
    }
}
