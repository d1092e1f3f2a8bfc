use serde::{Deserialize, Serialize};

/// Elastic averaging scheme used to combine phase moduli into rock moduli.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AveragingScheme {
    /// Upper bound: arithmetic mean of moduli (iso-strain)
    Voigt,
    /// Lower bound: harmonic mean of moduli (iso-stress)
    Reuss,
    /// Mean of the Voigt and Reuss bounds
    #[default]
    VoigtReussHill,
}

impl AveragingScheme {
    /// Average `moduli` with `volume_fractions` (same length, fractions sum to one).
    pub fn average(self, volume_fractions: &[f64], moduli: &[f64]) -> f64 {
        match self {
            AveragingScheme::Voigt => voigt(volume_fractions, moduli),
            AveragingScheme::Reuss => reuss(volume_fractions, moduli),
            AveragingScheme::VoigtReussHill => {
                0.5 * (voigt(volume_fractions, moduli) + reuss(volume_fractions, moduli))
            }
        }
    }
}

pub fn voigt(volume_fractions: &[f64], values: &[f64]) -> f64 {
    volume_fractions.iter().zip(values).map(|(phi, m)| phi * m).sum()
}

pub fn reuss(volume_fractions: &[f64], values: &[f64]) -> f64 {
    let compliance: f64 = volume_fractions
        .iter()
        .zip(values)
        .filter(|(phi, _)| **phi > 0.0)
        .map(|(phi, m)| phi / m)
        .sum();
    1.0 / compliance
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use more_asserts::{assert_gt, assert_lt};

    #[test]
    fn test_single_phase_is_identity() {
        for scheme in [AveragingScheme::Voigt, AveragingScheme::Reuss, AveragingScheme::VoigtReussHill] {
            assert_relative_eq!(scheme.average(&[1.0], &[250.0e9]), 250.0e9);
        }
    }

    #[test]
    fn test_bounds_bracket_hill() {
        let phi = [0.7, 0.3];
        let moduli = [250.0e9, 160.0e9];
        let v = AveragingScheme::Voigt.average(&phi, &moduli);
        let r = AveragingScheme::Reuss.average(&phi, &moduli);
        let h = AveragingScheme::VoigtReussHill.average(&phi, &moduli);

        assert_relative_eq!(v, 223.0e9);
        assert_relative_eq!(r, 1.0 / (0.7 / 250.0e9 + 0.3 / 160.0e9));
        assert_gt!(v, h);
        assert_lt!(r, h);
    }

    #[test]
    fn test_absent_phase_does_not_poison_reuss() {
        let r = reuss(&[1.0, 0.0], &[100.0, 0.0]);
        assert_relative_eq!(r, 100.0);
    }
}
