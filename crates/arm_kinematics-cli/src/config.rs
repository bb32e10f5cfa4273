//! Configuration for the `arm-fk` binary.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then
//! command-line flags (applied in `main`).

use std::path::{Path, PathBuf};

use arm_kinematics::expr::ZERO_TOLERANCE;
use arm_kinematics::{ArmParameters, Hold, Plane};
use color_eyre::{Result, eyre::WrapErr, eyre::ensure};
use serde::{Deserialize, Serialize};

/// Complete run configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Fixed link geometry
    pub arm: ArmParameters,
    /// Joint sweep for the path plot
    pub sweep: SweepConfig,
    /// Figure output
    pub plot: PlotConfig,
}

/// Which joint to sweep and how
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SweepConfig {
    /// Joint name in the chain
    pub joint: String,
    /// Domain start; degrees for revolute joints, meters for prismatic ones
    pub from: f64,
    /// Domain end, same units as `from`
    pub to: f64,
    pub samples: usize,
    pub plane: Plane,
    /// Value of the joints that are not swept
    pub hold: Hold,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            joint: "turret".to_string(),
            from: -90.0,
            to: 90.0,
            samples: 100,
            plane: Plane::XY,
            hold: Hold::Zero,
        }
    }
}

/// SVG figure settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlotConfig {
    pub enabled: bool,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output: PathBuf::from("end_effector_path.svg"),
            width: 800,
            height: 600,
        }
    }
}

impl Config {
    /// Defaults, or the contents of `path` when given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Read a YAML configuration file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .wrap_err_with(|| format!("Failed to parse config file {}", path.display()))?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject arm geometry the symbolic kernel cannot represent
    pub fn validate(&self) -> Result<()> {
        let length = self.arm.arm_length;
        ensure!(length.is_finite(), "Arm length {} is not finite", length);
        ensure!(
            length == 0.0 || length.abs() >= ZERO_TOLERANCE,
            "Arm length {} is below the resolution {} of the symbolic kernel",
            length,
            ZERO_TOLERANCE
        );
        ensure!(
            self.arm.elbow_twist.is_finite(),
            "Elbow twist {} is not finite",
            self.arm.elbow_twist
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_log::test;

    #[test]
    fn test_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.arm, ArmParameters::default());
        assert_eq!(config.sweep.joint, "turret");
        assert_eq!(config.sweep.from, -90.0);
        assert_eq!(config.sweep.to, 90.0);
        assert!(config.plot.enabled);
        assert_eq!(config.plot.output, PathBuf::from("end_effector_path.svg"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("arm.yaml");
        std::fs::write(
            &path,
            r#"arm:
  arm_length: 0.75
sweep:
  joint: wrist
  from: -30.0
  to: 45.0
  plane: xz
  hold: symbolic
"#,
        )?;

        let config = Config::load(Some(path.as_path()))?;
        assert_eq!(config.arm.arm_length, 0.75);
        assert_eq!(config.arm.elbow_twist, std::f64::consts::FRAC_PI_2);
        assert_eq!(config.sweep.joint, "wrist");
        assert_eq!(config.sweep.from, -30.0);
        assert_eq!(config.sweep.to, 45.0);
        assert_eq!(config.sweep.plane, Plane::XZ);
        assert_eq!(config.sweep.hold, Hold::Symbolic);
        assert_eq!(config.sweep.samples, 100);
        assert_eq!(config.plot, PlotConfig::default());

        Ok(())
    }

    #[test]
    fn test_validate_arm_length() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.arm.arm_length = 0.0;
        assert!(config.validate().is_ok());

        config.arm.arm_length = 1e-13;
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("below the resolution"));

        config.arm.arm_length = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let error = Config::load(Some(Path::new("/nonexistent/arm.yaml"))).unwrap_err();
        assert!(format!("{:#}", error).contains("Failed to read config file"));
    }

    #[test]
    fn test_invalid_yaml() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("broken.yaml");
        std::fs::write(&path, "sweep:\n  samples: many\n")?;

        let error = Config::load(Some(path.as_path())).unwrap_err();
        assert!(format!("{:#}", error).contains("Failed to parse config file"));

        Ok(())
    }
}
