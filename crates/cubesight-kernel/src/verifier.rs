//! [`MappingVerifier`] – static consistency check of the mapping tables.
//!
//! Reconstruction is only correct if, across the default and the three
//! phase mappings, every non-center facelet is written by exactly one
//! `(phase, sample)` pair.  The verifier runs once when an assembler is
//! built, never per reconstruction.  Every registered [`CoverageRule`] is
//! evaluated in order; the first violation returns a
//! [`CubeError::MappingConsistency`].
//!
//! Built-in rules:
//! - [`LengthRule`] – each mapping is as long as its orientation's pixel map.
//! - [`NoCenterRule`] – centers are pre-resolved and never written.
//! - [`WriteOnceRule`] – no facelet is written by two slots.
//! - [`FullCoverageRule`] – no non-center facelet is left unwritten.

use std::collections::HashMap;

use cubesight_perception::PixelMaps;
use cubesight_types::{CubeError, Facelet, Orientation};

use crate::mapping::MappingTables;

// ────────────────────────────────────────────────────────────────────────────
// Rule trait
// ────────────────────────────────────────────────────────────────────────────

/// A single invariant the tables must satisfy.
pub trait CoverageRule: Send + Sync {
    /// Human-readable name used in fault messages.
    fn name(&self) -> &str;

    /// Return `Ok(())` when the tables satisfy the invariant.
    fn check(&self, tables: &MappingTables, maps: &PixelMaps) -> Result<(), CubeError>;
}

// ────────────────────────────────────────────────────────────────────────────
// MappingVerifier
// ────────────────────────────────────────────────────────────────────────────

/// Rule engine over [`MappingTables`].
///
/// # Example
///
/// ```
/// use cubesight_kernel::{MappingTables, MappingVerifier};
/// use cubesight_perception::PixelMaps;
///
/// let verifier = MappingVerifier::standard();
/// assert!(verifier.verify(&MappingTables::standard(), &PixelMaps::default()).is_ok());
/// ```
#[derive(Default)]
pub struct MappingVerifier {
    rules: Vec<Box<dyn CoverageRule>>,
}

impl MappingVerifier {
    /// A verifier with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// A verifier with all built-in rules.
    pub fn standard() -> Self {
        let mut v = Self::new();
        v.add_rule(Box::new(LengthRule));
        v.add_rule(Box::new(NoCenterRule));
        v.add_rule(Box::new(WriteOnceRule));
        v.add_rule(Box::new(FullCoverageRule));
        v
    }

    /// Register a rule.  Rules are evaluated in insertion order.
    pub fn add_rule(&mut self, rule: Box<dyn CoverageRule>) {
        self.rules.push(rule);
    }

    /// Check `tables` against every registered rule.
    pub fn verify(&self, tables: &MappingTables, maps: &PixelMaps) -> Result<(), CubeError> {
        for rule in &self.rules {
            rule.check(tables, maps)?;
            tracing::trace!(rule = rule.name(), "mapping rule passed");
        }
        Ok(())
    }
}

impl MappingTables {
    /// Run the standard [`MappingVerifier`] against these tables.
    pub fn validate(&self, maps: &PixelMaps) -> Result<(), CubeError> {
        MappingVerifier::standard().verify(self, maps)
    }
}

fn violation(rule: &str, details: String) -> CubeError {
    CubeError::MappingConsistency(format!("[{rule}] {details}"))
}

/// `(orientation, sample index)` of every write, keyed by facelet.
fn writers(tables: &MappingTables) -> HashMap<Facelet, Vec<(Orientation, usize)>> {
    let mut writers: HashMap<Facelet, Vec<(Orientation, usize)>> = HashMap::new();
    for orientation in Orientation::ALL {
        let mapping = tables.for_orientation(orientation);
        for (i, slot) in mapping.slots().iter().enumerate() {
            if let Some(f) = slot.facelet() {
                writers.entry(f).or_default().push((orientation, i));
            }
        }
    }
    writers
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in rules
// ────────────────────────────────────────────────────────────────────────────

/// Each mapping must pair one-to-one with its pixel map.
pub struct LengthRule;

impl CoverageRule for LengthRule {
    fn name(&self) -> &str {
        "length"
    }

    fn check(&self, tables: &MappingTables, maps: &PixelMaps) -> Result<(), CubeError> {
        for orientation in Orientation::ALL {
            let slots = tables.for_orientation(orientation).len();
            let points = maps.for_orientation(orientation).len();
            if slots != points {
                return Err(violation(
                    self.name(),
                    format!("{orientation} mapping has {slots} slots but its pixel map has {points} points"),
                ));
            }
        }
        Ok(())
    }
}

/// Centers are resolved up front and must never be written.
pub struct NoCenterRule;

impl CoverageRule for NoCenterRule {
    fn name(&self) -> &str {
        "no_center"
    }

    fn check(&self, tables: &MappingTables, _maps: &PixelMaps) -> Result<(), CubeError> {
        for orientation in Orientation::ALL {
            if let Some(f) = tables
                .for_orientation(orientation)
                .written()
                .find(|f| f.is_center())
            {
                return Err(violation(
                    self.name(),
                    format!("{orientation} mapping writes center {f}"),
                ));
            }
        }
        Ok(())
    }
}

/// No facelet may be written twice, within a phase or across phases.
pub struct WriteOnceRule;

impl CoverageRule for WriteOnceRule {
    fn name(&self) -> &str {
        "write_once"
    }

    fn check(&self, tables: &MappingTables, _maps: &PixelMaps) -> Result<(), CubeError> {
        let writers = writers(tables);
        for f in Facelet::all() {
            if let Some(w) = writers.get(&f).filter(|w| w.len() > 1) {
                let sites: Vec<String> = w.iter().map(|(o, i)| format!("{o}[{i}]")).collect();
                return Err(violation(
                    self.name(),
                    format!("{f} is written {} times ({})", w.len(), sites.join(", ")),
                ));
            }
        }
        Ok(())
    }
}

/// Every non-center facelet must be written by some phase.
pub struct FullCoverageRule;

impl CoverageRule for FullCoverageRule {
    fn name(&self) -> &str {
        "full_coverage"
    }

    fn check(&self, tables: &MappingTables, _maps: &PixelMaps) -> Result<(), CubeError> {
        let writers = writers(tables);
        let missing: Vec<String> = Facelet::all()
            .filter(|f| !f.is_center() && !writers.contains_key(f))
            .map(|f| f.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(violation(
                self.name(),
                format!("never written: {}", missing.join(" ")),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{ObservationMapping, Slot};
    use cubesight_perception::PixelMap;

    fn assert_rule_fails(result: Result<(), CubeError>, rule: &str) {
        match result {
            Err(CubeError::MappingConsistency(msg)) => {
                assert!(msg.starts_with(&format!("[{rule}]")), "unexpected message: {msg}")
            }
            other => panic!("expected {rule} violation, got {other:?}"),
        }
    }

    #[test]
    fn standard_tables_pass() {
        MappingVerifier::standard()
            .verify(&MappingTables::standard(), &PixelMaps::default())
            .unwrap();
    }

    #[test]
    fn validate_uses_standard_rules() {
        let mut tables = MappingTables::standard();
        tables.default = ObservationMapping::new(Vec::new());
        assert!(tables.validate(&PixelMaps::default()).is_err());
        assert!(MappingTables::standard().validate(&PixelMaps::default()).is_ok());
    }

    #[test]
    fn empty_verifier_always_passes() {
        let empty = MappingTables::from_tokens("", "", "", "").unwrap();
        assert!(MappingVerifier::new().verify(&empty, &PixelMaps::default()).is_ok());
    }

    #[test]
    fn duplicate_write_across_phases_rejected() {
        let mut tables = MappingTables::standard();
        let mut slots = tables.ud.slots().to_vec();
        // U1 is already written by the default phase.
        slots[0] = Slot::Write("U1".parse().unwrap());
        tables.ud = ObservationMapping::new(slots);
        assert_rule_fails(
            MappingVerifier::standard().verify(&tables, &PixelMaps::default()),
            "write_once",
        );
    }

    #[test]
    fn dropped_write_rejected() {
        let mut tables = MappingTables::standard();
        let mut slots = tables.ud.slots().to_vec();
        slots[9] = Slot::Skip; // was L2
        tables.ud = ObservationMapping::new(slots);
        let err = MappingVerifier::standard()
            .verify(&tables, &PixelMaps::default())
            .unwrap_err();
        assert!(err.to_string().contains("L2"));
        assert_rule_fails(Err(err), "full_coverage");
    }

    #[test]
    fn center_write_rejected() {
        let mut tables = MappingTables::standard();
        let mut slots = tables.lr.slots().to_vec();
        slots[0] = Slot::Write("D5".parse().unwrap());
        tables.lr = ObservationMapping::new(slots);
        assert_rule_fails(
            MappingVerifier::standard().verify(&tables, &PixelMaps::default()),
            "no_center",
        );
    }

    #[test]
    fn pixel_map_length_mismatch_rejected() {
        let mut maps = PixelMaps::default();
        maps.fb = PixelMap::new(maps.fb.points()[..23].to_vec());
        assert_rule_fails(
            MappingVerifier::standard().verify(&MappingTables::standard(), &maps),
            "length",
        );
    }

    #[test]
    fn first_failing_rule_short_circuits() {
        // Both a length mismatch and a missing write: length is checked first.
        let mut tables = MappingTables::standard();
        tables.ud = ObservationMapping::new(Vec::new());
        assert_rule_fails(
            MappingVerifier::standard().verify(&tables, &PixelMaps::default()),
            "length",
        );
    }
}
