//! Post-hoc summary statistics of a current profile.

use std::fmt;

use serde::Serialize;

use super::sequence::Profile;

/// Aggregate figures derived from a finished profile.
///
/// Computed from the capped arrays, so a truncated profile reports only
/// the retained horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    /// Last time value (s).
    pub duration_s: f64,
    /// Number of points including the origin.
    pub point_count: usize,
    /// Most positive current (A).
    pub peak_charge_a: f64,
    /// Most negative current (A).
    pub peak_discharge_a: f64,
    /// Largest current magnitude (A).
    pub peak_abs_a: f64,
    /// Signed charge, `Σ I·Δt / 3600` (Ah).
    pub net_charge_ah: f64,
    /// Charge throughput, `Σ |I|·Δt / 3600` (Ah).
    pub throughput_ah: f64,
}

impl ProfileStats {
    /// Computes all statistics in one pass over `profile`.
    pub fn from_profile(profile: &Profile) -> Self {
        if profile.is_empty() {
            return Self::default();
        }

        let mut peak_charge = f64::NEG_INFINITY;
        let mut peak_discharge = f64::INFINITY;
        let mut net = 0.0;
        let mut throughput = 0.0;
        let mut prev_time = None;

        for (t, i) in profile.points() {
            peak_charge = peak_charge.max(i);
            peak_discharge = peak_discharge.min(i);
            if let Some(prev) = prev_time {
                let dt = t - prev;
                net += i * dt;
                throughput += i.abs() * dt;
            }
            prev_time = Some(t);
        }

        Self {
            duration_s: profile.end_time(),
            point_count: profile.len(),
            peak_charge_a: peak_charge,
            peak_discharge_a: peak_discharge,
            peak_abs_a: peak_charge.abs().max(peak_discharge.abs()),
            net_charge_ah: net / 3600.0,
            throughput_ah: throughput / 3600.0,
        }
    }
}

impl fmt::Display for ProfileStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Profile Statistics ---")?;
        writeln!(
            f,
            "Duration:          {:.1} s ({:.2} days)",
            self.duration_s,
            self.duration_s / 86_400.0
        )?;
        writeln!(f, "Points:            {}", self.point_count)?;
        writeln!(f, "Peak charge:       {:.3} A", self.peak_charge_a)?;
        writeln!(f, "Peak discharge:    {:.3} A", self.peak_discharge_a)?;
        writeln!(f, "Peak |current|:    {:.3} A", self.peak_abs_a)?;
        writeln!(f, "Net charge:        {:.3} Ah", self.net_charge_ah)?;
        write!(f, "Throughput:        {:.3} Ah", self.throughput_ah)
    }
}
