//! Physical constants and unit-conversion factors.
//!
//! Nothing in here is read implicitly by the solver or the velocity
//! distribution; these are defaults for the explicit parameters those take.

// Boltzmann constant [J / K]
pub const KB: f64 = 1.380649e-23;

// atomic mass unit [kg]
pub const AMU: f64 = 1.66053906660e-27;

// caesium-133 mass [kg]
pub const M_CS133: f64 = 132.90545 * AMU;

// default vapour temperature [K]
pub const T_DEFAULT: f64 = 20.0;

// Doppler shift k v, with k in 2π m^-1 and v in m/s, is in 2π Hz; this takes
// it to 2π MHz, the frequency unit of every run parameter by default
pub const HZ_TO_MHZ: f64 = 1e-6;

// acceptable probability mass lost to truncation of the velocity grid
pub const TAIL_TOLERANCE: f64 = 1e-3;
