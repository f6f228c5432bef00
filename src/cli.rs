//! Command-line arguments and settings resolution.

use std::path::PathBuf;

use clap::Parser;

use drivecycle::config::EngineConfig;
use drivecycle::engine::Granularity;
use drivecycle::error::LoadError;

/// Expand a drive-cycle config into a current-vs-time profile.
#[derive(Debug, Parser)]
#[command(name = "drivecycle", version, about, long_about = None)]
pub struct Cli {
    /// Cycle config JSON (subCycles, driveCycles, calendarRules, dates)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Engine settings TOML file
    #[arg(short, long, conflicts_with = "preset")]
    pub settings: Option<PathBuf>,

    /// Built-in settings preset (preview, overview, calendar_exact)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Override the nominal voltage (V)
    #[arg(long)]
    pub nominal_voltage: Option<f64>,

    /// Override the nominal capacity (Ah)
    #[arg(long)]
    pub nominal_capacity: Option<f64>,

    /// Override the output point cap
    #[arg(long)]
    pub max_points: Option<usize>,

    /// Write the profile as Time,Current CSV
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Write the per-day schedule CSV
    #[arg(long, value_name = "PATH")]
    pub schedule_csv: Option<PathBuf>,

    /// Write the per-step simulation table CSV
    #[arg(long, value_name = "PATH")]
    pub steps_csv: Option<PathBuf>,

    /// Write the cycle config back as pretty JSON
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Print period windows at this granularity (day, month, year)
    #[arg(short, long)]
    pub granularity: Option<Granularity>,

    /// Exit with an error if the config has validation problems
    #[arg(long)]
    pub strict: bool,

    /// Start the REST API server instead of printing a report
    #[cfg(feature = "api")]
    #[arg(long)]
    pub serve: bool,

    /// API server port
    #[cfg(feature = "api")]
    #[arg(long, default_value_t = 3000)]
    pub port: u16,

    /// Open the interactive terminal preview
    #[cfg(feature = "tui")]
    #[arg(long)]
    pub tui: bool,
}

impl Cli {
    /// Resolves engine settings: `--settings`, then `--preset`, then the
    /// preview default, with command-line overrides applied last.
    ///
    /// Returns the settings and a display name for them.
    ///
    /// # Errors
    ///
    /// Returns a `LoadError` if the settings file cannot be loaded or the
    /// preset is unknown.
    pub fn engine_settings(&self) -> Result<(EngineConfig, String), LoadError> {
        let (mut settings, name) = if let Some(path) = &self.settings {
            (EngineConfig::from_toml_file(path)?, "custom".to_string())
        } else if let Some(name) = &self.preset {
            (EngineConfig::from_preset(name)?, name.clone())
        } else {
            (EngineConfig::preview(), "preview".to_string())
        };

        if let Some(v) = self.nominal_voltage {
            settings.battery.nominal_voltage = v;
        }
        if let Some(c) = self.nominal_capacity {
            settings.battery.nominal_capacity = c;
        }
        if let Some(n) = self.max_points {
            settings.output.max_points = n;
        }
        Ok((settings, name))
    }
}
