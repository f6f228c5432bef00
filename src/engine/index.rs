//! Immutable id → entity lookup built once per run.

use std::collections::HashMap;

use crate::error::LookupError;
use crate::model::{CycleConfig, DriveCycle, SubCycle};

/// Borrowed index of a config's sub-cycles and drive cycles.
///
/// When ids repeat, the later declaration wins, matching how the editor
/// resolved its own lookups.
#[derive(Debug, Clone)]
pub struct CycleIndex<'a> {
    sub_cycles: HashMap<&'a str, &'a SubCycle>,
    drive_cycles: HashMap<&'a str, &'a DriveCycle>,
}

impl<'a> CycleIndex<'a> {
    pub fn new(config: &'a CycleConfig) -> Self {
        Self {
            sub_cycles: config
                .sub_cycles
                .iter()
                .map(|s| (s.id.as_str(), s))
                .collect(),
            drive_cycles: config
                .drive_cycles
                .iter()
                .map(|d| (d.id.as_str(), d))
                .collect(),
        }
    }

    /// Looks up a sub-cycle by id.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::SubCycle`] if no sub-cycle has this id.
    pub fn sub_cycle(&self, id: &str) -> Result<&'a SubCycle, LookupError> {
        self.sub_cycles
            .get(id)
            .copied()
            .ok_or_else(|| LookupError::SubCycle(id.to_string()))
    }

    /// Looks up a drive cycle by id.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::DriveCycle`] if no drive cycle has this id.
    pub fn drive_cycle(&self, id: &str) -> Result<&'a DriveCycle, LookupError> {
        self.drive_cycles
            .get(id)
            .copied()
            .ok_or_else(|| LookupError::DriveCycle(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Step;

    #[test]
    fn lookups_return_typed_misses() {
        let cfg = CycleConfig {
            sub_cycles: vec![SubCycle::new("SC1", vec![])],
            drive_cycles: vec![DriveCycle::new("DC1", vec![])],
            ..CycleConfig::default()
        };
        let index = CycleIndex::new(&cfg);
        assert_eq!(index.sub_cycle("SC1").map(|s| s.id.as_str()), Ok("SC1"));
        assert_eq!(
            index.sub_cycle("SC2"),
            Err(LookupError::SubCycle("SC2".to_string()))
        );
        assert_eq!(
            index.drive_cycle("nope"),
            Err(LookupError::DriveCycle("nope".to_string()))
        );
    }

    #[test]
    fn later_duplicate_wins() {
        let cfg = CycleConfig {
            sub_cycles: vec![
                SubCycle::new("SC1", vec![]),
                SubCycle::new("SC1", vec![Step::fixed(1.0, "A", 1.0)]),
            ],
            ..CycleConfig::default()
        };
        let index = CycleIndex::new(&cfg);
        assert_eq!(index.sub_cycle("SC1").map(|s| s.steps.len()), Ok(1));
    }
}
