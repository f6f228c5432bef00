//! Global clock and bounded `(time, current)` accumulation.

use serde::{Deserialize, Serialize};

use super::period::Period;
use super::step::Sample;
use super::warnings::WarningKind;
use crate::config::{OutputConfig, OutputPolicy};

/// Padding shorter than this is absorbed into the clock without a sample.
const PAD_EPSILON: f64 = 1e-9;

/// Parallel time (s) and current (A) arrays.
///
/// Point `i > 0` carries `current[i]` over `(time[i-1], time[i]]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub time: Vec<f64>,
    pub current: Vec<f64>,
}

impl Profile {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Iterates `(time, current)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time.iter().copied().zip(self.current.iter().copied())
    }

    /// Last time value, or zero for an empty profile.
    pub fn end_time(&self) -> f64 {
        self.time.last().copied().unwrap_or(0.0)
    }

    /// Points with `time` in `[start_time, end_time)`, rebased to the period start.
    pub fn slice(&self, period: &Period) -> Profile {
        let mut out = Profile::default();
        for (t, c) in self.points() {
            if period.contains(t) {
                out.time.push(t - period.start_time);
                out.current.push(c);
            }
        }
        out
    }
}

/// Owns the running clock and the output arrays for one run.
#[derive(Debug, Clone)]
pub struct SequenceBuilder {
    clock: f64,
    profile: Profile,
    max_points: usize,
    policy: OutputPolicy,
    produced: usize,
}

impl SequenceBuilder {
    /// Starts a sequence at `(0, 0)`.
    pub fn new(output: &OutputConfig) -> Self {
        let mut builder = Self {
            clock: 0.0,
            profile: Profile::default(),
            max_points: output.max_points.max(2),
            policy: output.policy,
            produced: 0,
        };
        builder.push(0.0, 0.0);
        builder
    }

    /// Current global time in seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Points generated so far, including any that were dropped.
    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Advances the clock by `sample.dt` and records the point.
    pub fn append(&mut self, sample: Sample) {
        self.clock += sample.dt;
        self.push(self.clock, sample.current);
    }

    /// Fills with zero current up to `end`; no-op if the clock is past it.
    pub fn pad_to(&mut self, end: f64) {
        if self.clock >= end {
            return;
        }
        let gap = end - self.clock;
        self.clock = end;
        if gap > PAD_EPSILON {
            self.push(end, 0.0);
        }
    }

    fn push(&mut self, time: f64, current: f64) {
        self.produced += 1;
        if self.policy == OutputPolicy::Truncate && self.profile.len() >= self.max_points {
            return;
        }
        self.profile.time.push(time);
        self.profile.current.push(current);
    }

    /// Applies the output policy and returns the profile, plus a warning
    /// when points were dropped.
    pub fn finish(self) -> (Profile, Option<WarningKind>) {
        let (produced, policy) = (self.produced, self.policy);
        let profile = match policy {
            OutputPolicy::Truncate => self.profile,
            OutputPolicy::Downsample => downsample(self.profile, self.max_points),
        };
        let warning = (produced > profile.len()).then(|| WarningKind::OutputCapped {
            kept: profile.len(),
            produced,
            policy,
        });
        (profile, warning)
    }
}

/// Evenly strided subset of at most `max_points` points, keeping both ends.
fn downsample(profile: Profile, max_points: usize) -> Profile {
    let n = profile.len();
    if n <= max_points {
        return profile;
    }
    let last = n - 1;
    let slots = max_points - 1;
    let mut out = Profile {
        time: Vec::with_capacity(max_points),
        current: Vec::with_capacity(max_points),
    };
    for j in 0..max_points {
        let i = j * last / slots;
        out.time.push(profile.time[i]);
        out.current.push(profile.current[i]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(max_points: usize, policy: OutputPolicy) -> OutputConfig {
        OutputConfig { max_points, policy }
    }

    #[test]
    fn starts_at_origin() {
        let (p, w) = SequenceBuilder::new(&OutputConfig::default()).finish();
        assert_eq!(p.time, vec![0.0]);
        assert_eq!(p.current, vec![0.0]);
        assert!(w.is_none());
    }

    #[test]
    fn append_then_pad_completes_day() {
        let mut b = SequenceBuilder::new(&OutputConfig::default());
        b.append(Sample::new(3600.0, 10.0));
        b.pad_to(86_400.0);
        assert_eq!(b.clock(), 86_400.0);
        let (p, _) = b.finish();
        assert_eq!(
            p.points().collect::<Vec<_>>(),
            vec![(0.0, 0.0), (3600.0, 10.0), (86_400.0, 0.0)]
        );
    }

    #[test]
    fn pad_is_noop_past_end() {
        let mut b = SequenceBuilder::new(&OutputConfig::default());
        b.append(Sample::new(90_000.0, 1.0));
        b.pad_to(86_400.0);
        assert_eq!(b.clock(), 90_000.0);
        assert_eq!(b.finish().0.len(), 2);
    }

    #[test]
    fn truncate_stops_at_cap() {
        let mut b = SequenceBuilder::new(&output(3, OutputPolicy::Truncate));
        for _ in 0..5 {
            b.append(Sample::new(1.0, 2.0));
        }
        assert_eq!(b.clock(), 5.0);
        let (p, w) = b.finish();
        assert_eq!(p.time, vec![0.0, 1.0, 2.0]);
        assert_eq!(
            w,
            Some(WarningKind::OutputCapped {
                kept: 3,
                produced: 6,
                policy: OutputPolicy::Truncate,
            })
        );
    }

    #[test]
    fn downsample_keeps_first_and_last() {
        let mut b = SequenceBuilder::new(&output(4, OutputPolicy::Downsample));
        for i in 1..=9 {
            b.append(Sample::new(1.0, i as f64));
        }
        let (p, w) = b.finish();
        assert_eq!(p.len(), 4);
        assert_eq!(p.time.first(), Some(&0.0));
        assert_eq!(p.time.last(), Some(&9.0));
        assert!(p.time.windows(2).all(|w| w[0] < w[1]));
        assert!(w.is_some());
    }

    #[test]
    fn slice_rebases_to_period_start() {
        let profile = Profile {
            time: vec![0.0, 3600.0, 86_400.0, 90_000.0, 172_800.0],
            current: vec![0.0, 10.0, 0.0, 5.0, 0.0],
        };
        let day2 = Period {
            label: "Jan 02, 2024".to_string(),
            start_time: 86_400.0,
            end_time: 172_800.0,
        };
        let s = profile.slice(&day2);
        assert_eq!(s.time, vec![0.0, 3600.0]);
        assert_eq!(s.current, vec![0.0, 5.0]);
    }
}
