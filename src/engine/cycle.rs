//! Sub-cycle and drive-cycle expansion with per-run memoisation.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use super::index::CycleIndex;
use super::step::{Sample, SkipTally, StepExpander};
use super::warnings::{WarningKind, Warnings};
use crate::error::LookupError;

/// Flat sample sequence of a sub-cycle or drive cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expansion {
    pub samples: Vec<Sample>,
    /// Sum of sample durations (seconds).
    pub duration: f64,
}

impl Expansion {
    fn push_all(&mut self, other: &Expansion) {
        self.samples.extend_from_slice(&other.samples);
        self.duration += other.duration;
    }
}

/// Expands sub-cycles and drive cycles, each at most once per run.
///
/// Results are shared through `Rc` so a drive cycle used on hundreds of
/// days is materialised once.
pub struct CycleExpander<'a> {
    index: CycleIndex<'a>,
    steps: StepExpander,
    sub_cycles: HashMap<String, Rc<Expansion>>,
    drive_cycles: HashMap<String, Result<Rc<Expansion>, LookupError>>,
    skipped: SkipTally,
}

impl<'a> CycleExpander<'a> {
    pub fn new(index: CycleIndex<'a>, steps: StepExpander) -> Self {
        Self {
            index,
            steps,
            sub_cycles: HashMap::new(),
            drive_cycles: HashMap::new(),
            skipped: SkipTally::default(),
        }
    }

    /// Skipped steps so far, each distinct step counted once.
    pub fn skipped(&self) -> &SkipTally {
        &self.skipped
    }

    /// Expands a sub-cycle's steps in order.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::SubCycle`] if `id` is not declared.
    pub fn expand_sub_cycle(
        &mut self,
        id: &str,
        warnings: &mut Warnings,
    ) -> Result<Rc<Expansion>, LookupError> {
        if let Some(hit) = self.sub_cycles.get(id) {
            return Ok(Rc::clone(hit));
        }

        let sub_cycle = self.index.sub_cycle(id)?;
        let mut samples = Vec::new();
        for step in &sub_cycle.steps {
            if let Err(reason) = self.steps.expand_into(step, &mut samples, warnings) {
                self.skipped.add(reason);
            }
        }
        let duration = samples.iter().map(|s| s.dt).sum();
        trace!(sub_cycle = id, samples = samples.len(), duration, "expanded sub-cycle");

        let expansion = Rc::new(Expansion { samples, duration });
        self.sub_cycles.insert(id.to_string(), Rc::clone(&expansion));
        Ok(expansion)
    }

    /// Expands a drive cycle's segments, repeating each sub-cycle as declared.
    ///
    /// A missing sub-cycle fails the whole drive cycle and records a
    /// warning; the failure is cached like a success.
    ///
    /// # Errors
    ///
    /// Returns a [`LookupError`] naming the missing drive cycle or sub-cycle.
    pub fn expand_drive_cycle(
        &mut self,
        id: &str,
        warnings: &mut Warnings,
    ) -> Result<Rc<Expansion>, LookupError> {
        if let Some(hit) = self.drive_cycles.get(id) {
            return hit.clone();
        }
        let result = self.build_drive_cycle(id, warnings);
        self.drive_cycles.insert(id.to_string(), result.clone());
        result
    }

    fn build_drive_cycle(
        &mut self,
        id: &str,
        warnings: &mut Warnings,
    ) -> Result<Rc<Expansion>, LookupError> {
        let drive_cycle = self.index.drive_cycle(id)?;
        let mut expansion = Expansion::default();
        for segment in &drive_cycle.segments {
            let sub = match self.expand_sub_cycle(&segment.sub_cycle_id, warnings) {
                Ok(sub) => sub,
                Err(e) => {
                    warnings.emit(WarningKind::MissingSubCycle {
                        drive_cycle: id.to_string(),
                        sub_cycle: segment.sub_cycle_id.clone(),
                    });
                    return Err(e);
                }
            };
            for _ in 0..segment.repetitions {
                expansion.push_all(&sub);
            }
        }
        trace!(
            drive_cycle = id,
            samples = expansion.samples.len(),
            duration = expansion.duration,
            "expanded drive cycle"
        );
        Ok(Rc::new(expansion))
    }
}
