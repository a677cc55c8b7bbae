//! One-dimensional point distributions along block edges.
//!
//! A [`Distribution`] turns a division count `N` into `N + 1` parametric
//! positions on `[0, 1]`, strictly increasing, with `p[0] = 0` and `p[N] = 1`.
//! Two strategies are provided:
//!
//! - [`UniformGrading`]: `p[i] = i / N`.
//! - [`PiecewiseGrading`]: the edge is split into sections by length
//!   fraction; inside each section cell sizes follow a geometric progression
//!   whose last/first size ratio is the section's expansion ratio.
//!
//! [`EdgeGrading`] is the serializable form used in block descriptions and
//! dispatches to one of the strategies.

use crate::mesh_error::MeshError;
use serde::{Deserialize, Serialize};

/// Tolerance on the sum of section fractions.
pub const FRACTION_TOLERANCE: f64 = 1e-6;

/// Strategy producing parametric positions along an edge.
pub trait Distribution {
    /// Returns `divisions + 1` positions on `[0, 1]`.
    fn parametric(&self, divisions: usize) -> Result<Vec<f64>, MeshError>;
}

/// Equal spacing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UniformGrading;

impl Distribution for UniformGrading {
    fn parametric(&self, divisions: usize) -> Result<Vec<f64>, MeshError> {
        if divisions == 0 {
            return Err(MeshError::InvalidGrading(
                "division count must be at least 1".into(),
            ));
        }
        let n = divisions as f64;
        Ok((0..=divisions).map(|i| i as f64 / n).collect())
    }
}

/// One section of a piecewise grading.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradingSection {
    /// Share of the edge length covered by this section.
    pub fraction: f64,
    /// Number of cells in this section.
    pub divisions: usize,
    /// Ratio of the last to the first cell size in this section.
    pub expansion: f64,
}

/// Piecewise-geometric spacing.
#[derive(Clone, Debug, PartialEq)]
pub struct PiecewiseGrading {
    sections: Vec<GradingSection>,
}

impl PiecewiseGrading {
    /// Validate and wrap a section list.
    pub fn new(sections: Vec<GradingSection>) -> Result<Self, MeshError> {
        if sections.is_empty() {
            return Err(MeshError::InvalidGrading("no grading sections".into()));
        }
        let mut total = 0.0;
        for (idx, s) in sections.iter().enumerate() {
            if s.divisions < 1 {
                return Err(MeshError::InvalidGrading(format!(
                    "section {idx} has {} divisions, expected at least 1",
                    s.divisions
                )));
            }
            if !s.expansion.is_finite() || s.expansion <= 0.0 {
                return Err(MeshError::InvalidGrading(format!(
                    "section {idx} has non-positive expansion ratio {}",
                    s.expansion
                )));
            }
            if !s.fraction.is_finite() || s.fraction <= 0.0 {
                return Err(MeshError::InvalidGrading(format!(
                    "section {idx} has non-positive length fraction {}",
                    s.fraction
                )));
            }
            total += s.fraction;
        }
        if (total - 1.0).abs() > FRACTION_TOLERANCE {
            return Err(MeshError::InvalidGrading(format!(
                "section fractions sum to {total}, expected 1"
            )));
        }
        Ok(Self { sections })
    }

    /// A single section spanning the whole edge.
    pub fn single(divisions: usize, expansion: f64) -> Result<Self, MeshError> {
        Self::new(vec![GradingSection {
            fraction: 1.0,
            divisions,
            expansion,
        }])
    }

    pub fn sections(&self) -> &[GradingSection] {
        &self.sections
    }

    /// Total number of cells over all sections.
    pub fn total_divisions(&self) -> usize {
        self.sections.iter().map(|s| s.divisions).sum()
    }
}

/// Positions `0..=n` of a geometric progression with last/first ratio
/// `expansion`, normalised to `[0, 1]`.
fn geometric(n: usize, expansion: f64) -> Vec<f64> {
    if n == 1 || (expansion - 1.0).abs() < 1e-12 {
        return (0..=n).map(|i| i as f64 / n as f64).collect();
    }
    let r = expansion.powf(1.0 / (n as f64 - 1.0));
    let denom = 1.0 - r.powi(n as i32);
    let mut out: Vec<f64> = (0..=n).map(|i| (1.0 - r.powi(i as i32)) / denom).collect();
    out[n] = 1.0;
    out
}

impl Distribution for PiecewiseGrading {
    fn parametric(&self, divisions: usize) -> Result<Vec<f64>, MeshError> {
        let total = self.total_divisions();
        if total != divisions {
            return Err(MeshError::InvalidGrading(format!(
                "section divisions sum to {total}, expected {divisions}"
            )));
        }
        let mut out = Vec::with_capacity(divisions + 1);
        out.push(0.0);
        let mut start = 0.0;
        for s in &self.sections {
            let local = geometric(s.divisions, s.expansion);
            out.extend(local[1..].iter().map(|t| start + s.fraction * t));
            start += s.fraction;
        }
        // absorb fraction round-off so the edge ends exactly at 1
        if let Some(last) = out.last_mut() {
            *last = 1.0;
        }
        Ok(out)
    }
}

/// Grading of one block edge as written in a description.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeGrading {
    /// Equal spacing.
    #[default]
    Uniform,
    /// A single expansion ratio over the whole edge.
    Simple(f64),
    /// Sections as `(fraction, divisions, expansion)`.
    Piecewise(Vec<GradingSection>),
}

impl EdgeGrading {
    /// Check this grading against the edge's division count.
    pub fn validate(&self, divisions: usize) -> Result<(), MeshError> {
        self.parametric(divisions).map(|_| ())
    }
}

impl Distribution for EdgeGrading {
    fn parametric(&self, divisions: usize) -> Result<Vec<f64>, MeshError> {
        match self {
            EdgeGrading::Uniform => UniformGrading.parametric(divisions),
            EdgeGrading::Simple(expansion) => {
                PiecewiseGrading::single(divisions, *expansion)?.parametric(divisions)
            }
            EdgeGrading::Piecewise(sections) => {
                PiecewiseGrading::new(sections.clone())?.parametric(divisions)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn uniform_positions() {
        let p = UniformGrading.parametric(4).unwrap();
        assert_eq!(p, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn expansion_ratio_is_last_over_first() {
        let p = EdgeGrading::Simple(4.0).parametric(5).unwrap();
        let first = p[1] - p[0];
        let last = p[5] - p[4];
        assert!((last / first - 4.0).abs() < 1e-10);
    }

    #[test]
    fn piecewise_honours_fractions() {
        let g = EdgeGrading::Piecewise(vec![
            GradingSection {
                fraction: 0.2,
                divisions: 3,
                expansion: 2.0,
            },
            GradingSection {
                fraction: 0.8,
                divisions: 5,
                expansion: 0.5,
            },
        ]);
        let p = g.parametric(8).unwrap();
        assert_eq!(p.len(), 9);
        assert!((p[3] - 0.2).abs() < 1e-12);
        assert_eq!(p[8], 1.0);
    }

    #[test]
    fn rejects_bad_sections() {
        let bad_sum = EdgeGrading::Piecewise(vec![GradingSection {
            fraction: 0.9,
            divisions: 2,
            expansion: 1.0,
        }]);
        assert!(matches!(
            bad_sum.parametric(2),
            Err(MeshError::InvalidGrading(_))
        ));
        assert!(EdgeGrading::Simple(0.0).parametric(2).is_err());
        assert!(EdgeGrading::Simple(-1.0).parametric(2).is_err());
        assert!(UniformGrading.parametric(0).is_err());
        let mismatch = EdgeGrading::Simple(2.0);
        assert!(PiecewiseGrading::single(3, 2.0).unwrap().parametric(4).is_err());
        assert!(mismatch.validate(3).is_ok());
    }

    proptest! {
        #[test]
        fn positions_are_monotone_and_bounded(n in 1usize..40, e in 0.05f64..20.0) {
            let p = EdgeGrading::Simple(e).parametric(n).unwrap();
            prop_assert_eq!(p.len(), n + 1);
            prop_assert_eq!(p[0], 0.0);
            prop_assert_eq!(p[n], 1.0);
            for w in p.windows(2) {
                prop_assert!(w[1] > w[0]);
            }
        }
    }
}
