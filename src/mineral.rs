// src/mineral.rs - Mineral end-members, solid solutions and the embedded database

use crate::constants::FRACTION_SUM_TOLERANCE;
use crate::error::{MantleError, Result};
use crate::json_parser::JsonParser;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Thermo-elastic parameters of one pure phase at the 300 K reference state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EndMemberParams {
    pub formula: String,
    pub molar_mass_kg_mol: f64,
    pub v0_m3_mol: f64,
    pub k0_pa: f64,
    pub k0_prime: f64,
    pub g0_pa: f64,
    pub g0_prime: f64,
    pub dk_dt_pa_k: f64,
    pub dg_dt_pa_k: f64,
    pub alpha0_per_k: f64,
    /// isothermal Anderson-Grüneisen parameter, sets how alpha falls with compression
    pub anderson_gruneisen: f64,
    pub gruneisen0: f64,
    pub q: f64,
    pub max_pressure_pa: f64,
    pub min_temperature_k: f64,
    pub max_temperature_k: f64,
}

impl EndMemberParams {
    /// Ideal (linear) mixing of several phases on one site.
    ///
    /// Numeric parameters are molar-fraction weighted; the valid domain is the
    /// intersection of the members' domains.
    fn mix(members: &[(String, EndMemberParams)], fractions: &[f64]) -> EndMemberParams {
        let weighted = |field: fn(&EndMemberParams) -> f64| -> f64 {
            members
                .iter()
                .zip(fractions)
                .map(|((_, params), x)| field(params) * x)
                .sum()
        };

        let formula = members
            .iter()
            .zip(fractions)
            .filter(|(_, x)| **x > 0.0)
            .map(|((_, params), x)| format!("{:.3}{}", x, params.formula))
            .collect::<Vec<_>>()
            .join("+");

        EndMemberParams {
            formula,
            molar_mass_kg_mol: weighted(|p| p.molar_mass_kg_mol),
            v0_m3_mol: weighted(|p| p.v0_m3_mol),
            k0_pa: weighted(|p| p.k0_pa),
            k0_prime: weighted(|p| p.k0_prime),
            g0_pa: weighted(|p| p.g0_pa),
            g0_prime: weighted(|p| p.g0_prime),
            dk_dt_pa_k: weighted(|p| p.dk_dt_pa_k),
            dg_dt_pa_k: weighted(|p| p.dg_dt_pa_k),
            alpha0_per_k: weighted(|p| p.alpha0_per_k),
            anderson_gruneisen: weighted(|p| p.anderson_gruneisen),
            gruneisen0: weighted(|p| p.gruneisen0),
            q: weighted(|p| p.q),
            max_pressure_pa: members
                .iter()
                .map(|(_, p)| p.max_pressure_pa)
                .fold(f64::INFINITY, f64::min),
            min_temperature_k: members
                .iter()
                .map(|(_, p)| p.min_temperature_k)
                .fold(f64::NEG_INFINITY, f64::max),
            max_temperature_k: members
                .iter()
                .map(|(_, p)| p.max_temperature_k)
                .fold(f64::INFINITY, f64::min),
        }
    }
}

/// A named set of pure end-members that share one mixing site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolidSolutionModel {
    pub site: String,
    pub end_members: Vec<String>,
}

/// Check a fraction vector: non-empty, every entry finite and non-negative,
/// sum within `FRACTION_SUM_TOLERANCE` of one.
pub fn validate_fractions(fractions: &[f64], context: &str) -> Result<()> {
    if fractions.is_empty() {
        return Err(MantleError::InvalidComposition(format!(
            "{}: no fractions given",
            context
        )));
    }
    if let Some(bad) = fractions.iter().find(|x| !x.is_finite() || **x < 0.0) {
        return Err(MantleError::InvalidComposition(format!(
            "{}: fraction {} is negative or not finite",
            context, bad
        )));
    }
    let sum: f64 = fractions.iter().sum();
    if (sum - 1.0).abs() > FRACTION_SUM_TOLERANCE {
        return Err(MantleError::InvalidComposition(format!(
            "{}: fractions sum to {}, expected 1",
            context, sum
        )));
    }
    Ok(())
}

/// A mineral with a fixed site occupancy.
///
/// Built once from a solid-solution model (or a single pure phase) and never
/// changed afterwards; the mixed parameters are computed at construction.
#[derive(Clone, Debug, PartialEq)]
pub struct MineralEndMember {
    id: String,
    site: String,
    members: Vec<(String, EndMemberParams)>,
    fractions: Vec<f64>,
    params: EndMemberParams,
}

impl MineralEndMember {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }

    /// (end-member id, fraction) pairs in model order
    pub fn occupancy(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.members
            .iter()
            .zip(&self.fractions)
            .map(|((name, _), x)| (name.as_str(), *x))
    }

    /// Effective parameters of the mixed phase
    pub fn params(&self) -> &EndMemberParams {
        &self.params
    }
}

#[derive(Debug, Deserialize)]
struct MineralDatabaseFile {
    end_members: HashMap<String, EndMemberParams>,
    #[serde(default)]
    solid_solutions: HashMap<String, SolidSolutionModel>,
}

/// Pure phases and solid-solution models, keyed by identifier.
#[derive(Debug, Clone)]
pub struct MineralDatabase {
    end_members: HashMap<String, EndMemberParams>,
    solid_solutions: HashMap<String, SolidSolutionModel>,
}

impl MineralDatabase {
    pub fn from_json_str(json_str: &str) -> Result<Self> {
        let file: MineralDatabaseFile = JsonParser::from_str(json_str)?;
        Self::from_parts(file)
    }

    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let file: MineralDatabaseFile = JsonParser::from_file(file_path)?;
        Self::from_parts(file)
    }

    fn from_parts(file: MineralDatabaseFile) -> Result<Self> {
        for (name, model) in &file.solid_solutions {
            if model.end_members.is_empty() {
                return Err(MantleError::InvalidComposition(format!(
                    "solid solution '{}' lists no end-members",
                    name
                )));
            }
            if let Some(missing) = model
                .end_members
                .iter()
                .find(|id| !file.end_members.contains_key(*id))
            {
                return Err(MantleError::InvalidComposition(format!(
                    "solid solution '{}' refers to unknown end-member '{}'",
                    name, missing
                )));
            }
        }
        Ok(Self {
            end_members: file.end_members,
            solid_solutions: file.solid_solutions,
        })
    }

    pub fn end_member(&self, id: &str) -> Result<&EndMemberParams> {
        self.end_members
            .get(id)
            .ok_or_else(|| MantleError::InvalidComposition(format!("unknown end-member '{}'", id)))
    }

    pub fn solid_solution(&self, id: &str) -> Result<&SolidSolutionModel> {
        self.solid_solutions
            .get(id)
            .ok_or_else(|| MantleError::InvalidComposition(format!("unknown solid solution '{}'", id)))
    }

    /// Set the composition of a solid solution and freeze it as a mineral.
    ///
    /// `fractions` follow the model's end-member order and must sum to one.
    pub fn mineral(&self, solution_id: &str, fractions: &[f64]) -> Result<MineralEndMember> {
        let model = self.solid_solution(solution_id)?;
        if fractions.len() != model.end_members.len() {
            return Err(MantleError::InvalidComposition(format!(
                "{}: expected {} site fractions, got {}",
                solution_id,
                model.end_members.len(),
                fractions.len()
            )));
        }
        validate_fractions(fractions, solution_id)?;

        let members = model
            .end_members
            .iter()
            .map(|id| -> Result<(String, EndMemberParams)> {
                Ok((id.clone(), self.end_member(id)?.clone()))
            })
            .collect::<Result<Vec<_>>>()?;
        let params = EndMemberParams::mix(&members, fractions);

        Ok(MineralEndMember {
            id: solution_id.to_string(),
            site: model.site.clone(),
            members,
            fractions: fractions.to_vec(),
            params,
        })
    }

    /// A pure phase as a single-member mineral.
    pub fn pure(&self, end_member_id: &str) -> Result<MineralEndMember> {
        let params = self.end_member(end_member_id)?.clone();
        Ok(MineralEndMember {
            id: end_member_id.to_string(),
            site: String::from("pure"),
            members: vec![(end_member_id.to_string(), params.clone())],
            fractions: vec![1.0],
            params,
        })
    }
}

/// The database shipped in `src/minerals.json`
pub static MINERAL_DATABASE: Lazy<MineralDatabase> = Lazy::new(|| {
    MineralDatabase::from_json_str(include_str!("minerals.json"))
        .expect("Failed to parse minerals.json")
});

pub fn default_database() -> &'static MineralDatabase {
    &MINERAL_DATABASE
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_embedded_database_loads() {
        let db = default_database();
        assert_eq!(db.end_member("periclase").unwrap().formula, "MgO");
        assert_eq!(db.solid_solution("ferropericlase").unwrap().end_members.len(), 2);
        assert!(db.end_member("unobtainium").is_err());
    }

    #[test]
    fn test_mineral_mixes_linearly() {
        let db = default_database();
        let fp = db.mineral("ferropericlase", &[0.8, 0.2]).unwrap();
        let mgo = db.end_member("periclase").unwrap();
        let feo = db.end_member("wuestite").unwrap();

        assert_relative_eq!(
            fp.params().v0_m3_mol,
            0.8 * mgo.v0_m3_mol + 0.2 * feo.v0_m3_mol,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            fp.params().molar_mass_kg_mol,
            0.8 * mgo.molar_mass_kg_mol + 0.2 * feo.molar_mass_kg_mol,
            max_relative = 1e-12
        );
        assert_eq!(fp.site(), "M");

        let occupancy: Vec<_> = fp.occupancy().collect();
        assert_eq!(occupancy, vec![("periclase", 0.8), ("wuestite", 0.2)]);
    }

    #[test]
    fn test_site_fractions_must_sum_to_one() {
        let db = default_database();
        let result = db.mineral("mg_fe_perovskite", &[0.8, 0.1, 0.0]);
        assert!(matches!(result, Err(MantleError::InvalidComposition(_))));

        let result = db.mineral("mg_fe_perovskite", &[1.1, -0.1, 0.0]);
        assert!(matches!(result, Err(MantleError::InvalidComposition(_))));

        let result = db.mineral("mg_fe_perovskite", &[0.5, 0.5]);
        assert!(matches!(result, Err(MantleError::InvalidComposition(_))));
    }

    #[test]
    fn test_pure_phase() {
        let capv = default_database().pure("ca_perovskite").unwrap();
        assert_eq!(capv.fractions(), &[1.0]);
        assert_eq!(capv.params().formula, "CaSiO3");
    }

    #[test]
    fn test_database_rejects_dangling_reference() {
        let json = r#"{
            "end_members": {},
            "solid_solutions": { "ghost": { "site": "A", "end_members": ["nothing"] } }
        }"#;
        assert!(MineralDatabase::from_json_str(json).is_err());
    }
}
