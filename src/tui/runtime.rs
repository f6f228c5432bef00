//! Preview state: one expansion run browsed period by period.

use crate::config::EngineConfig;
use crate::engine::{Engine, Granularity, Period, Profile, ProfileReport, ProfileStats};
use crate::model::CycleConfig;

/// TUI application state.
pub struct App {
    /// Config being previewed (kept for preset switches).
    config: CycleConfig,
    /// Settings of the latest run.
    settings: EngineConfig,
    /// Result of the latest run.
    pub report: ProfileReport,
    /// Name of the active settings preset, or `"custom"`.
    pub settings_name: String,
    pub granularity: Granularity,
    /// Periods of the horizon at the current granularity.
    pub periods: Vec<Period>,
    /// Index into `periods`.
    pub selected: usize,
    /// Profile of the selected period, rebased to its start.
    pub slice: Profile,
    /// Statistics of `slice`.
    pub slice_stats: ProfileStats,
    /// Whether the user has requested quit.
    pub quit: bool,
}

impl App {
    /// Runs the engine once and selects the first day.
    pub fn new(config: CycleConfig, settings: EngineConfig, settings_name: &str) -> Self {
        let report = Engine::new(settings.clone()).run(&config);
        let mut app = Self {
            config,
            settings,
            report,
            settings_name: settings_name.to_string(),
            granularity: Granularity::Day,
            periods: Vec::new(),
            selected: 0,
            slice: Profile::default(),
            slice_stats: ProfileStats::default(),
            quit: false,
        };
        app.refresh_periods();
        app
    }

    fn refresh_periods(&mut self) {
        self.periods = self.report.periods(self.granularity);
        self.selected = self.selected.min(self.periods.len().saturating_sub(1));
        self.refresh_slice();
    }

    fn refresh_slice(&mut self) {
        self.slice = match self.periods.get(self.selected) {
            Some(period) => self.report.profile.slice(period),
            None => self.report.profile.clone(),
        };
        self.slice_stats = ProfileStats::from_profile(&self.slice);
    }

    /// Switches granularity and keeps the selection on the period that
    /// contains the previously selected start.
    pub fn set_granularity(&mut self, granularity: Granularity) {
        if granularity == self.granularity {
            return;
        }
        let anchor = self.selected_period().map_or(0.0, |p| p.start_time);
        self.granularity = granularity;
        self.periods = self.report.periods(granularity);
        self.selected = self
            .periods
            .iter()
            .position(|p| p.contains(anchor))
            .unwrap_or(0);
        self.refresh_slice();
    }

    pub fn next_period(&mut self) {
        if self.selected + 1 < self.periods.len() {
            self.selected += 1;
            self.refresh_slice();
        }
    }

    pub fn prev_period(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.refresh_slice();
        }
    }

    /// Re-runs the expansion under a named settings preset.
    ///
    /// The preset picks the overflow and output policies; battery
    /// parameters, dynamic timestep and point cap carry over from the
    /// current settings. Unknown names are ignored.
    pub fn switch_preset(&mut self, name: &str) {
        let Ok(preset) = EngineConfig::from_preset(name) else {
            return;
        };
        let mut settings = self.settings.clone();
        settings.expansion.day_overflow = preset.expansion.day_overflow;
        settings.output.policy = preset.output.policy;
        self.report = Engine::new(settings.clone()).run(&self.config);
        self.settings = settings;
        self.settings_name = name.to_string();
        self.refresh_periods();
    }

    pub fn settings(&self) -> &EngineConfig {
        &self.settings
    }

    pub fn selected_period(&self) -> Option<&Period> {
        self.periods.get(self.selected)
    }

    /// Step-shaped chart points: each current is held over its interval.
    pub fn chart_data(&self) -> Vec<(f64, f64)> {
        let mut out = Vec::with_capacity(self.slice.len() * 2);
        let mut prev = None;
        for (t, i) in self.slice.points() {
            if let Some(p) = prev {
                out.push((p, i));
            }
            out.push((t, i));
            prev = Some(t);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::{DriveCycle, DriveCycleSegment, Step, SubCycle};

    fn config() -> CycleConfig {
        CycleConfig {
            sub_cycles: vec![SubCycle::new("SC1", vec![Step::fixed(10.0, "A", 3600.0)])],
            drive_cycles: vec![DriveCycle::new("DC1", vec![DriveCycleSegment::new("SC1", 1)])],
            default_drive_cycle_id: Some("DC1".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 30),
            end_date: NaiveDate::from_ymd_opt(2024, 2, 2),
            ..CycleConfig::default()
        }
    }

    fn app() -> App {
        App::new(config(), EngineConfig::preview(), "preview")
    }

    #[test]
    fn starts_on_first_day() {
        let app = app();
        assert_eq!(app.periods.len(), 4);
        assert_eq!(app.selected, 0);
        assert_eq!(app.slice.time, vec![0.0, 3600.0]);
        assert_eq!(app.slice_stats.peak_charge_a, 10.0);
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut app = app();
        app.prev_period();
        assert_eq!(app.selected, 0);
        for _ in 0..10 {
            app.next_period();
        }
        assert_eq!(app.selected, 3);
        assert_eq!(app.selected_period().map(|p| p.label.as_str()), Some("Feb 02, 2024"));
    }

    #[test]
    fn granularity_switch_keeps_anchor() {
        let mut app = app();
        app.next_period();
        app.next_period();
        app.set_granularity(Granularity::Month);
        assert_eq!(app.periods.len(), 2);
        assert_eq!(app.selected, 1);
        app.set_granularity(Granularity::Day);
        assert_eq!(app.selected, 2);
    }

    #[test]
    fn chart_data_holds_current_over_interval() {
        let app = app();
        assert_eq!(
            app.chart_data(),
            vec![(0.0, 0.0), (0.0, 10.0), (3600.0, 10.0)]
        );
    }

    #[test]
    fn switch_preset_reruns() {
        let mut app = app();
        app.switch_preset("overview");
        assert_eq!(app.settings_name, "overview");
        app.switch_preset("bogus");
        assert_eq!(app.settings_name, "overview");
        assert_eq!(app.periods.len(), 4);
    }

    #[test]
    fn switch_preset_keeps_battery_and_cap_overrides() {
        let mut settings = EngineConfig::preview();
        settings.battery.nominal_voltage = 7.4;
        settings.output.max_points = 1000;
        let cfg = CycleConfig {
            sub_cycles: vec![SubCycle::new("SC1", vec![Step::fixed(740.0, "W", 3600.0)])],
            ..config()
        };
        let mut app = App::new(cfg, settings, "custom");
        assert_eq!(app.slice_stats.peak_charge_a, 100.0);

        app.switch_preset("overview");
        assert_eq!(app.settings().battery.nominal_voltage, 7.4);
        assert_eq!(app.settings().output.max_points, 1000);
        assert_eq!(app.settings().output.policy, crate::config::OutputPolicy::Downsample);
        assert_eq!(app.slice_stats.peak_charge_a, 100.0);
    }
}
