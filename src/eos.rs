//! Thermo-elastic state of a single phase at (P, T).
//!
//! High-temperature third-order Birch-Murnaghan: the 300 K reference volume
//! and moduli are shifted to temperature first (thermal expansion, linear
//! dK/dT and dG/dT), then compressed isothermally to the target pressure.

use crate::constants::{
    MAX_EULERIAN_STRAIN, REFERENCE_TEMPERATURE_K, STRAIN_SOLVER_ITERATIONS,
    STRAIN_SOLVER_TOLERANCE_PA,
};
use crate::error::{MantleError, Result};
use crate::mineral::EndMemberParams;

/// Everything the evaluator needs from one phase at one (P, T).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseState {
    pub pressure_pa: f64,
    pub temperature_k: f64,
    pub molar_volume_m3: f64,
    pub density_kg_m3: f64,
    pub isothermal_bulk_modulus_pa: f64,
    pub adiabatic_bulk_modulus_pa: f64,
    pub shear_modulus_pa: f64,
    pub thermal_expansivity_per_k: f64,
    pub gruneisen: f64,
}

/// Reference parameters after the thermal shift, before compression.
struct HotReference {
    v0: f64,
    k0: f64,
    g0: f64,
}

impl HotReference {
    fn at(params: &EndMemberParams, temperature_k: f64) -> Self {
        let dt = temperature_k - REFERENCE_TEMPERATURE_K;
        Self {
            v0: params.v0_m3_mol * (params.alpha0_per_k * dt).exp(),
            k0: params.k0_pa + params.dk_dt_pa_k * dt,
            g0: params.g0_pa + params.dg_dt_pa_k * dt,
        }
    }
}

fn bm3_pressure(f: f64, k0: f64, k0_prime: f64) -> f64 {
    3.0 * k0 * f * (1.0 + 2.0 * f).powf(2.5) * (1.0 + 1.5 * (k0_prime - 4.0) * f)
}

fn bm3_bulk_modulus(f: f64, k0: f64, k0_prime: f64) -> f64 {
    (1.0 + 2.0 * f).powf(2.5)
        * (k0 + (3.0 * k0 * k0_prime - 5.0 * k0) * f
            + 13.5 * (k0 * k0_prime - 4.0 * k0) * f * f)
}

fn bm3_shear_modulus(f: f64, k0: f64, k0_prime: f64, g0: f64, g0_prime: f64) -> f64 {
    (1.0 + 2.0 * f).powf(2.5)
        * (g0 + (3.0 * k0 * g0_prime - 5.0 * g0) * f
            + (6.0 * k0 * g0_prime - 24.0 * k0 - 14.0 * g0 + 4.5 * k0 * k0_prime) * f * f)
}

/// Bisection on Eulerian strain; P(f) is monotonic over [0, MAX_EULERIAN_STRAIN]
/// for the parameter ranges in the database.
fn solve_strain(pressure_pa: f64, k0: f64, k0_prime: f64) -> Option<f64> {
    let mut low = 0.0;
    let mut high = MAX_EULERIAN_STRAIN;
    if bm3_pressure(high, k0, k0_prime) < pressure_pa {
        return None;
    }
    for _ in 0..STRAIN_SOLVER_ITERATIONS {
        let mid = 0.5 * (low + high);
        let residual = bm3_pressure(mid, k0, k0_prime) - pressure_pa;
        if residual.abs() < STRAIN_SOLVER_TOLERANCE_PA {
            return Some(mid);
        }
        if residual < 0.0 {
            low = mid;
        } else {
            high = mid;
        }
    }
    Some(0.5 * (low + high))
}

fn check_domain(name: &str, params: &EndMemberParams, pressure_pa: f64, temperature_k: f64) -> Result<()> {
    if !pressure_pa.is_finite() || pressure_pa < 0.0 || pressure_pa > params.max_pressure_pa {
        return Err(MantleError::Evaluation(format!(
            "{}: pressure {:.3e} Pa outside [0, {:.3e}] Pa",
            name, pressure_pa, params.max_pressure_pa
        )));
    }
    if !temperature_k.is_finite()
        || temperature_k < params.min_temperature_k
        || temperature_k > params.max_temperature_k
    {
        return Err(MantleError::Evaluation(format!(
            "{}: temperature {:.1} K outside [{:.1}, {:.1}] K",
            name, temperature_k, params.min_temperature_k, params.max_temperature_k
        )));
    }
    Ok(())
}

/// Evaluate one phase at (P, T).
///
/// `name` only labels error messages.
pub fn phase_state(
    name: &str,
    params: &EndMemberParams,
    pressure_pa: f64,
    temperature_k: f64,
) -> Result<PhaseState> {
    check_domain(name, params, pressure_pa, temperature_k)?;

    let hot = HotReference::at(params, temperature_k);
    if hot.k0 <= 0.0 || hot.g0 <= 0.0 {
        return Err(MantleError::Evaluation(format!(
            "{}: moduli vanish at {:.1} K",
            name, temperature_k
        )));
    }

    let f = solve_strain(pressure_pa, hot.k0, params.k0_prime).ok_or_else(|| {
        MantleError::Evaluation(format!(
            "{}: no compression reaches {:.3e} Pa",
            name, pressure_pa
        ))
    })?;

    let volume = hot.v0 * (1.0 + 2.0 * f).powf(-1.5);
    let k_t = bm3_bulk_modulus(f, hot.k0, params.k0_prime);
    let g = bm3_shear_modulus(f, hot.k0, params.k0_prime, hot.g0, params.g0_prime);
    if k_t <= 0.0 || g <= 0.0 {
        return Err(MantleError::Evaluation(format!(
            "{}: non-positive modulus at {:.3e} Pa, {:.1} K",
            name, pressure_pa, temperature_k
        )));
    }

    let alpha = params.alpha0_per_k * (volume / hot.v0).powf(params.anderson_gruneisen);
    let gamma = params.gruneisen0 * (volume / params.v0_m3_mol).powf(params.q);
    let k_s = k_t * (1.0 + alpha * gamma * temperature_k);

    Ok(PhaseState {
        pressure_pa,
        temperature_k,
        molar_volume_m3: volume,
        density_kg_m3: params.molar_mass_kg_mol / volume,
        isothermal_bulk_modulus_pa: k_t,
        adiabatic_bulk_modulus_pa: k_s,
        shear_modulus_pa: g,
        thermal_expansivity_per_k: alpha,
        gruneisen: gamma,
    })
}
