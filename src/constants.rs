pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const EARTH_RADIUS_M: f64 = EARTH_RADIUS_KM * KM_TO_M;
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11; // m³/(kg·s²)

// Unit conversions
pub const KM_TO_M: f64 = 1000.0;
pub const GPA_TO_PA: f64 = 1.0e9;
pub const G_CM3_TO_KG_M3: f64 = 1000.0;
pub const KM_S_TO_M_S: f64 = 1000.0;

// Reference state for the thermo-elastic parameters in minerals.json
pub const REFERENCE_TEMPERATURE_K: f64 = 300.0;

// Tolerance for fraction vectors (site occupancies, rock fractions)
pub const FRACTION_SUM_TOLERANCE: f64 = 1.0e-6;

// Largest pressure step taken by the adiabat integrator
pub const ADIABAT_MAX_STEP_PA: f64 = 1.0 * GPA_TO_PA;

// Finite-strain root search
pub const MAX_EULERIAN_STRAIN: f64 = 0.5;
pub const STRAIN_SOLVER_ITERATIONS: usize = 200;
pub const STRAIN_SOLVER_TOLERANCE_PA: f64 = 1.0e-3;

// Lower-mantle sampling used by the default scenarios
pub const LOWER_MANTLE_TOP_DEPTH_M: f64 = 750.0e3;
pub const LOWER_MANTLE_BOTTOM_DEPTH_M: f64 = 2700.0e3;
pub const LOWER_MANTLE_SAMPLES: usize = 20;
