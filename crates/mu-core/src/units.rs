// mu-core/src/units.rs

use uom::si::f64::{
    Pressure as UomPressure, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature,
};

// Public canonical unit types (SI, f64)
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn atm(v: f64) -> Pressure {
    use uom::si::pressure::atmosphere;
    Pressure::new::<atmosphere>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kelvin_of(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    t.get::<kelvin>()
}

/// Dimensionless `p / p_ref`.
#[inline]
pub fn pressure_ratio(p: Pressure, p_ref: Pressure) -> f64 {
    use uom::si::ratio::ratio;
    let r: Ratio = p / p_ref;
    r.get::<ratio>()
}

pub mod constants {
    use super::*;

    /// Boltzmann constant [eV/K] (CODATA 2018).
    pub const BOLTZMANN_EV_PER_K: f64 = 8.617_333_262e-5;

    /// Reference pressure for gas-phase chemical potentials [atm].
    pub const STANDARD_PRESSURE_ATM: f64 = 1.0;

    #[inline]
    pub fn standard_pressure() -> Pressure {
        atm(STANDARD_PRESSURE_ATM)
    }

    /// k_B·T in eV.
    #[inline]
    pub fn thermal_energy_ev(t: Temperature) -> f64 {
        BOLTZMANN_EV_PER_K * kelvin_of(t)
    }
}
