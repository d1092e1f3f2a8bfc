//! Lower-mantle scenarios: a reference rock on an adiabat, a handful of
//! perturbations of it, and how far each perturbation moves the seismic
//! properties.

use crate::composite::{Composite, build_composite_molar};
use crate::deviation::{DeviationSeries, deviation};
use crate::error::{MantleError, Result};
use crate::evaluator::evaluate;
use crate::geotherm::adiabatic_temperatures;
use crate::json_parser::JsonParser;
use crate::math_utils::linspace;
use crate::mineral::default_database;
use crate::property::{Property, PropertySeries, SampleGrid};
use crate::seismic::SeismicModel;
use crate::temp_utils::m_to_km;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Properties every scenario run produces
pub const SCENARIO_PROPERTIES: [Property; 5] = [
    Property::Temperature,
    Property::Density,
    Property::PWaveVelocity,
    Property::SWaveVelocity,
    Property::BulkSoundVelocity,
];

/// Properties read from the seismic reference model for comparison
pub const OBSERVED_PROPERTIES: [Property; 3] = [
    Property::Density,
    Property::PWaveVelocity,
    Property::SWaveVelocity,
];

/// Two-phase perovskite + ferropericlase rock.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LowerMantleComposition {
    /// molar fraction of perovskite; ferropericlase makes up the rest
    pub perovskite_fraction: f64,
    pub perovskite_iron: f64,
    pub perovskite_aluminum: f64,
    pub ferropericlase_iron: f64,
}

impl LowerMantleComposition {
    /// Simplified Fe partitioning: the same delta goes to both phases.
    pub fn with_iron_delta(&self, iron_delta: f64) -> Self {
        Self {
            perovskite_iron: self.perovskite_iron + iron_delta,
            ferropericlase_iron: self.ferropericlase_iron + iron_delta,
            ..self.clone()
        }
    }

    pub fn with_perovskite_fraction(&self, perovskite_fraction: f64) -> Self {
        Self {
            perovskite_fraction,
            ..self.clone()
        }
    }
}

/// Build a fresh rock for `composition`.
///
/// Every call constructs new minerals; nothing is shared between rocks.
pub fn lower_mantle_rock(composition: &LowerMantleComposition, name: &str) -> Result<Composite> {
    let db = default_database();
    let magnesium = 1.0 - composition.perovskite_iron - composition.perovskite_aluminum;
    let perovskite = db.mineral(
        "mg_fe_perovskite",
        &[magnesium, composition.perovskite_iron, composition.perovskite_aluminum],
    )?;
    let ferropericlase = db.mineral(
        "ferropericlase",
        &[1.0 - composition.ferropericlase_iron, composition.ferropericlase_iron],
    )?;
    build_composite_molar(
        vec![
            (perovskite, composition.perovskite_fraction),
            (ferropericlase, 1.0 - composition.perovskite_fraction),
        ],
        name,
    )
}

/// A change applied on top of the reference scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    pub label: String,
    #[serde(default)]
    pub potential_temperature_k: Option<f64>,
    #[serde(default)]
    pub iron_delta: Option<f64>,
    #[serde(default)]
    pub perovskite_fraction: Option<f64>,
}

impl Perturbation {
    fn apply(&self, base: &LowerMantleComposition) -> LowerMantleComposition {
        let mut composition = base.clone();
        if let Some(delta) = self.iron_delta {
            composition = composition.with_iron_delta(delta);
        }
        if let Some(fraction) = self.perovskite_fraction {
            composition = composition.with_perovskite_fraction(fraction);
        }
        composition
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub name: String,
    pub min_depth_m: f64,
    pub max_depth_m: f64,
    pub samples: usize,
    /// temperature pinned at the shallowest sample
    pub potential_temperature_k: f64,
    pub composition: LowerMantleComposition,
    #[serde(default)]
    pub perturbations: Vec<Perturbation>,
}

impl ScenarioConfig {
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let config: ScenarioConfig = JsonParser::from_file(file_path)?;
        config.check()?;
        Ok(config)
    }

    pub fn from_json_str(json_str: &str) -> Result<Self> {
        let config: ScenarioConfig = JsonParser::from_str(json_str)?;
        config.check()?;
        Ok(config)
    }

    /// The scenarios shipped in `src/scenarios.json`
    pub fn embedded() -> Result<Self> {
        Self::from_json_str(include_str!("scenarios.json"))
    }

    pub fn depths(&self) -> Vec<f64> {
        linspace(self.min_depth_m, self.max_depth_m, self.samples)
    }

    fn check(&self) -> Result<()> {
        if self.samples == 0 || self.min_depth_m > self.max_depth_m {
            return Err(MantleError::Evaluation(format!(
                "{}: need at least one sample over an ascending depth range",
                self.name
            )));
        }
        Ok(())
    }
}

/// One rock evaluated along one adiabat.
#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioRun {
    pub label: String,
    pub composition: LowerMantleComposition,
    pub potential_temperature_k: f64,
    pub series: PropertySeries,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PerturbedRun {
    pub run: ScenarioRun,
    /// relative to the reference run
    pub deviation: DeviationSeries,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScenarioOutcome {
    pub name: String,
    pub seismic_model: String,
    pub depths_m: Vec<f64>,
    pub pressures_pa: Vec<f64>,
    pub observed: PropertySeries,
    pub reference: ScenarioRun,
    pub perturbed: Vec<PerturbedRun>,
}

/// Evaluate a rock along the adiabat anchored at `potential_temperature_k`.
pub fn run_on_adiabat(
    label: &str,
    composition: &LowerMantleComposition,
    pressures_pa: &[f64],
    potential_temperature_k: f64,
) -> Result<ScenarioRun> {
    let rock = lower_mantle_rock(composition, label)?;
    let temperatures = adiabatic_temperatures(pressures_pa, potential_temperature_k, &rock)?;
    let grid = SampleGrid::new(pressures_pa.to_vec(), temperatures)?;
    let series = evaluate(&rock, &grid, &SCENARIO_PROPERTIES)?;
    Ok(ScenarioRun {
        label: label.to_string(),
        composition: composition.clone(),
        potential_temperature_k,
        series,
    })
}

/// Run the reference scenario and every perturbation against `seismic`.
pub fn run_scenarios(config: &ScenarioConfig, seismic: &dyn SeismicModel) -> Result<ScenarioOutcome> {
    let depths = config.depths();
    let pressures = seismic.pressures(&depths)?;
    info!(
        "{}: {} samples from {:.0} to {:.0} km on {}",
        config.name,
        depths.len(),
        m_to_km(config.min_depth_m),
        m_to_km(config.max_depth_m),
        seismic.name()
    );

    let reference = run_on_adiabat(
        &config.name,
        &config.composition,
        &pressures,
        config.potential_temperature_k,
    )?;

    let mut perturbed = Vec::with_capacity(config.perturbations.len());
    for perturbation in &config.perturbations {
        let composition = perturbation.apply(&config.composition);
        let t0 = perturbation
            .potential_temperature_k
            .unwrap_or(config.potential_temperature_k);
        info!("{}: perturbation '{}'", config.name, perturbation.label);
        let run = run_on_adiabat(&perturbation.label, &composition, &pressures, t0)?;
        let relative = deviation(&run.series, &reference.series)?;
        perturbed.push(PerturbedRun {
            run,
            deviation: relative,
        });
    }

    let observed = seismic.evaluate(&OBSERVED_PROPERTIES, &depths)?;

    Ok(ScenarioOutcome {
        name: config.name.clone(),
        seismic_model: seismic.name().to_string(),
        depths_m: depths,
        pressures_pa: pressures,
        observed,
        reference,
        perturbed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seismic::Prem;
    use more_asserts::{assert_gt, assert_lt};

    fn base() -> LowerMantleComposition {
        ScenarioConfig::embedded().unwrap().composition
    }

    #[test]
    fn test_embedded_config() {
        let config = ScenarioConfig::embedded().unwrap();
        assert_eq!(config.samples, 20);
        assert_eq!(config.depths().len(), 20);
        assert_eq!(config.perturbations.len(), 3);
    }

    #[test]
    fn test_iron_delta_hits_both_phases() {
        let shifted = base().with_iron_delta(0.05);
        assert!((shifted.perovskite_iron - (base().perovskite_iron + 0.05)).abs() < 1e-12);
        assert!((shifted.ferropericlase_iron - (base().ferropericlase_iron + 0.05)).abs() < 1e-12);
        assert_eq!(shifted.perovskite_aluminum, base().perovskite_aluminum);
    }

    #[test]
    fn test_rock_factory_returns_independent_values() {
        let a = lower_mantle_rock(&base(), "a").unwrap();
        let b = lower_mantle_rock(&base(), "b").unwrap();
        assert_eq!(a.constituents(), b.constituents());
        assert_ne!(a.name(), b.name());
    }

    #[test]
    fn test_bad_composition_is_rejected() {
        let too_much = base().with_perovskite_fraction(1.2);
        assert!(matches!(
            lower_mantle_rock(&too_much, "bad"),
            Err(MantleError::InvalidComposition(_))
        ));
        let too_much_iron = base().with_iron_delta(0.95);
        assert!(lower_mantle_rock(&too_much_iron, "bad").is_err());
    }

    #[test]
    fn test_iron_enrichment_densifies_and_slows() {
        let config = ScenarioConfig::embedded().unwrap();
        let outcome = run_scenarios(&config, &Prem::new()).unwrap();
        let iron = outcome
            .perturbed
            .iter()
            .find(|p| p.run.label.starts_with("iron"))
            .unwrap();

        let drho = iron.deviation.get(Property::Density).unwrap();
        let dvs = iron.deviation.get(Property::SWaveVelocity).unwrap();
        for (rho, vs) in drho.iter().zip(dvs) {
            assert_gt!(*rho, 0.0);
            assert_lt!(*vs, 0.0);
        }
    }

    #[test]
    fn test_config_rejects_empty_sampling() {
        let json = include_str!("scenarios.json").replace("\"samples\": 20", "\"samples\": 0");
        assert!(ScenarioConfig::from_json_str(&json).is_err());
    }
}
