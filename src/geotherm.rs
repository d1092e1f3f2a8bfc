//! Adiabatic (isentropic) temperature profiles through a rock.

use crate::composite::Composite;
use crate::constants::ADIABAT_MAX_STEP_PA;
use crate::error::{MantleError, Result};

/// dT/dP along an isentrope: gamma * T / K_S
fn adiabatic_gradient(composite: &Composite, pressure_pa: f64, temperature_k: f64) -> Result<f64> {
    let state = composite.state_at(pressure_pa, temperature_k)?;
    Ok(state.gruneisen * temperature_k / state.adiabatic_bulk_modulus_pa)
}

/// One fourth-order Runge-Kutta step from `p` to `p + dp`.
fn rk4_step(composite: &Composite, p: f64, t: f64, dp: f64) -> Result<f64> {
    let k1 = adiabatic_gradient(composite, p, t)?;
    let k2 = adiabatic_gradient(composite, p + 0.5 * dp, t + 0.5 * dp * k1)?;
    let k3 = adiabatic_gradient(composite, p + 0.5 * dp, t + 0.5 * dp * k2)?;
    let k4 = adiabatic_gradient(composite, p + dp, t + dp * k3)?;
    Ok(t + dp / 6.0 * (k1 + 2.0 * k2 + 2.0 * k3 + k4))
}

/// Temperatures along an adiabat through `composite`, pinned to `t0` at `pressures[0]`.
///
/// Each interval between consecutive pressures is split so that no step exceeds
/// `ADIABAT_MAX_STEP_PA`. Pressures may decrease; the integration simply runs
/// the other way.
pub fn adiabatic_temperatures(pressures: &[f64], t0: f64, composite: &Composite) -> Result<Vec<f64>> {
    let Some(&first) = pressures.first() else {
        return Ok(Vec::new());
    };
    if !t0.is_finite() || t0 <= 0.0 {
        return Err(MantleError::Evaluation(format!(
            "adiabat anchor temperature {} K is not physical",
            t0
        )));
    }

    let mut temperatures = Vec::with_capacity(pressures.len());
    temperatures.push(t0);

    let mut p = first;
    let mut t = t0;
    for &target in &pressures[1..] {
        let span = target - p;
        let steps = (span.abs() / ADIABAT_MAX_STEP_PA).ceil().max(1.0) as usize;
        let dp = span / steps as f64;
        for _ in 0..steps {
            t = rk4_step(composite, p, t, dp)?;
            p += dp;
        }
        // land exactly on the requested pressure
        p = target;
        temperatures.push(t);
    }
    Ok(temperatures)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::build_composite;
    use crate::math_utils::linspace;
    use crate::mineral::default_database;
    use more_asserts::{assert_gt, assert_lt};

    fn rock() -> Composite {
        let db = default_database();
        build_composite(
            vec![
                (db.mineral("mg_fe_perovskite", &[0.9, 0.1, 0.0]).unwrap(), 0.8),
                (db.mineral("ferropericlase", &[0.8, 0.2]).unwrap(), 0.2),
            ],
            "rock",
        )
        .unwrap()
    }

    #[test]
    fn test_adiabat_is_pinned_and_rising() {
        let pressures = linspace(28.0e9, 125.0e9, 20);
        let temps = adiabatic_temperatures(&pressures, 1900.0, &rock()).unwrap();

        assert_eq!(temps.len(), 20);
        assert_eq!(temps[0], 1900.0);
        for pair in temps.windows(2) {
            assert_gt!(pair[1], pair[0]);
        }
        // lower-mantle adiabats gain a few hundred kelvin, not thousands
        assert_gt!(temps[19] - temps[0], 150.0);
        assert_lt!(temps[19] - temps[0], 1000.0);
    }

    #[test]
    fn test_hotter_anchor_stays_hotter() {
        let pressures = linspace(28.0e9, 125.0e9, 10);
        let cool = adiabatic_temperatures(&pressures, 1900.0, &rock()).unwrap();
        let hot = adiabatic_temperatures(&pressures, 2250.0, &rock()).unwrap();
        for (c, h) in cool.iter().zip(&hot) {
            assert_gt!(*h, *c);
        }
    }

    #[test]
    fn test_reverse_integration_returns_to_anchor() {
        let down = [30.0e9, 100.0e9];
        let temps = adiabatic_temperatures(&down, 2000.0, &rock()).unwrap();
        let up = [100.0e9, 30.0e9];
        let back = adiabatic_temperatures(&up, temps[1], &rock()).unwrap();
        assert!((back[1] - 2000.0).abs() < 0.5);
    }

    #[test]
    fn test_edge_cases() {
        assert!(adiabatic_temperatures(&[], 1900.0, &rock()).unwrap().is_empty());
        assert_eq!(adiabatic_temperatures(&[40.0e9], 1900.0, &rock()).unwrap(), vec![1900.0]);
        assert!(adiabatic_temperatures(&[40.0e9, 50.0e9], -5.0, &rock()).is_err());
        assert!(adiabatic_temperatures(&[40.0e9, 200.0e9], 1900.0, &rock()).is_err());
    }
}
