use crate::averaging::{AveragingScheme, voigt};
use crate::eos::{PhaseState, phase_state};
use crate::error::{MantleError, Result};
use crate::mineral::{MineralEndMember, validate_fractions};
use serde::{Deserialize, Serialize};

/// How the fractions handed to the builder are to be read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FractionKind {
    #[default]
    Volume,
    /// Converted to volume fractions at every state from the phase molar volumes
    Molar,
}

/// A rock: an ordered, named mixture of minerals.
///
/// Fractions are validated once by the builder; the composite is never
/// mutated afterwards, so the same value can be evaluated any number of times.
#[derive(Clone, Debug, PartialEq)]
pub struct Composite {
    name: String,
    constituents: Vec<(MineralEndMember, f64)>,
    fraction_kind: FractionKind,
    averaging: AveragingScheme,
}

/// Build a rock from minerals and their volume fractions.
pub fn build_composite(members: Vec<(MineralEndMember, f64)>, name: &str) -> Result<Composite> {
    build(members, name, FractionKind::Volume)
}

/// Build a rock from minerals and their molar fractions.
pub fn build_composite_molar(members: Vec<(MineralEndMember, f64)>, name: &str) -> Result<Composite> {
    build(members, name, FractionKind::Molar)
}

fn build(members: Vec<(MineralEndMember, f64)>, name: &str, fraction_kind: FractionKind) -> Result<Composite> {
    let fractions: Vec<f64> = members.iter().map(|(_, x)| *x).collect();
    validate_fractions(&fractions, name)?;
    Ok(Composite {
        name: name.to_string(),
        constituents: members,
        fraction_kind,
        averaging: AveragingScheme::default(),
    })
}

impl Composite {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constituents(&self) -> &[(MineralEndMember, f64)] {
        &self.constituents
    }

    pub fn fraction_kind(&self) -> FractionKind {
        self.fraction_kind
    }

    pub fn averaging(&self) -> AveragingScheme {
        self.averaging
    }

    pub fn with_averaging(mut self, averaging: AveragingScheme) -> Self {
        self.averaging = averaging;
        self
    }

    /// Evaluate every constituent at (P, T) and combine them.
    pub fn state_at(&self, pressure_pa: f64, temperature_k: f64) -> Result<CompositeState> {
        let phases = self
            .constituents
            .iter()
            .map(|(mineral, _)| phase_state(mineral.id(), mineral.params(), pressure_pa, temperature_k))
            .collect::<Result<Vec<PhaseState>>>()?;

        let volume_fractions = self.volume_fractions(&phases)?;
        let scheme = self.averaging;
        let collect = |field: fn(&PhaseState) -> f64| -> Vec<f64> { phases.iter().map(field).collect() };

        let density = voigt(&volume_fractions, &collect(|p| p.density_kg_m3));
        let k_s = scheme.average(&volume_fractions, &collect(|p| p.adiabatic_bulk_modulus_pa));
        let k_t = scheme.average(&volume_fractions, &collect(|p| p.isothermal_bulk_modulus_pa));
        let g = scheme.average(&volume_fractions, &collect(|p| p.shear_modulus_pa));
        let alpha = voigt(&volume_fractions, &collect(|p| p.thermal_expansivity_per_k));
        let gamma = voigt(&volume_fractions, &collect(|p| p.gruneisen));

        Ok(CompositeState {
            pressure_pa,
            temperature_k,
            phases,
            volume_fractions,
            density_kg_m3: density,
            adiabatic_bulk_modulus_pa: k_s,
            isothermal_bulk_modulus_pa: k_t,
            shear_modulus_pa: g,
            thermal_expansivity_per_k: alpha,
            gruneisen: gamma,
        })
    }

    fn volume_fractions(&self, phases: &[PhaseState]) -> Result<Vec<f64>> {
        let fractions = self.constituents.iter().map(|(_, x)| *x);
        match self.fraction_kind {
            FractionKind::Volume => Ok(fractions.collect()),
            FractionKind::Molar => {
                let volumes: Vec<f64> = fractions
                    .zip(phases)
                    .map(|(n, phase)| n * phase.molar_volume_m3)
                    .collect();
                let total: f64 = volumes.iter().sum();
                if total <= 0.0 {
                    return Err(MantleError::Evaluation(format!(
                        "{}: zero total volume",
                        self.name
                    )));
                }
                Ok(volumes.into_iter().map(|v| v / total).collect())
            }
        }
    }
}

/// The averaged state of a rock at one (P, T).
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeState {
    pub pressure_pa: f64,
    pub temperature_k: f64,
    pub phases: Vec<PhaseState>,
    pub volume_fractions: Vec<f64>,
    pub density_kg_m3: f64,
    pub adiabatic_bulk_modulus_pa: f64,
    pub isothermal_bulk_modulus_pa: f64,
    pub shear_modulus_pa: f64,
    pub thermal_expansivity_per_k: f64,
    pub gruneisen: f64,
}

impl CompositeState {
    /// v_p = sqrt((K_S + 4/3 G) / rho)
    pub fn p_wave_velocity(&self) -> f64 {
        ((self.adiabatic_bulk_modulus_pa + 4.0 / 3.0 * self.shear_modulus_pa) / self.density_kg_m3).sqrt()
    }

    /// v_s = sqrt(G / rho)
    pub fn s_wave_velocity(&self) -> f64 {
        (self.shear_modulus_pa / self.density_kg_m3).sqrt()
    }

    /// v_phi = sqrt(K_S / rho)
    pub fn bulk_sound_velocity(&self) -> f64 {
        (self.adiabatic_bulk_modulus_pa / self.density_kg_m3).sqrt()
    }
}
