// mf-core/src/units.rs

use uom::si::f64::{
    AngularVelocity as UomAngularVelocity, Energy as UomEnergy, Mass as UomMass,
    Power as UomPower, Ratio as UomRatio, Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type AngularSpeed = UomAngularVelocity;
pub type Energy = UomEnergy;
pub type Mass = UomMass;
pub type Power = UomPower;
pub type Ratio = UomRatio;
pub type Time = UomTime;

#[inline]
pub fn kw(v: f64) -> Power {
    use uom::si::power::kilowatt;
    Power::new::<kilowatt>(v)
}

#[inline]
pub fn mj(v: f64) -> Energy {
    use uom::si::energy::megajoule;
    Energy::new::<megajoule>(v)
}

#[inline]
pub fn kwh(v: f64) -> Energy {
    use uom::si::energy::kilowatt_hour;
    Energy::new::<kilowatt_hour>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn rpm(v: f64) -> AngularSpeed {
    use uom::si::angular_velocity::revolution_per_minute;
    AngularSpeed::new::<revolution_per_minute>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

#[inline]
pub fn to_kw(p: Power) -> f64 {
    use uom::si::power::kilowatt;
    p.get::<kilowatt>()
}

#[inline]
pub fn to_mj(e: Energy) -> f64 {
    use uom::si::energy::megajoule;
    e.get::<megajoule>()
}

#[inline]
pub fn to_kwh(e: Energy) -> f64 {
    use uom::si::energy::kilowatt_hour;
    e.get::<kilowatt_hour>()
}

#[inline]
pub fn to_kg(m: Mass) -> f64 {
    use uom::si::mass::kilogram;
    m.get::<kilogram>()
}

#[inline]
pub fn to_s(t: Time) -> f64 {
    use uom::si::time::second;
    t.get::<second>()
}

#[inline]
pub fn to_rpm(w: AngularSpeed) -> f64 {
    use uom::si::angular_velocity::revolution_per_minute;
    w.get::<revolution_per_minute>()
}

pub mod constants {
    /// Seconds per hour.
    pub const SECONDS_PER_HOUR: f64 = 3600.0;

    /// Seconds per day, used for self-discharge rates.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;

    /// g/kWh times kW divided by this gives kg/s.
    pub const G_PER_KWH_TIMES_KW_TO_KG_PER_S: f64 = 3.6e6;

    /// kWh expressed in kJ.
    pub const KJ_PER_KWH: f64 = 3600.0;

    /// kWh expressed in MJ.
    pub const MJ_PER_KWH: f64 = 3.6;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_round_trip() {
        assert!((to_kw(kw(1250.0)) - 1250.0).abs() < 1e-9);
        assert!((to_mj(mj(3.6)) - 3.6).abs() < 1e-12);
        assert!((to_kwh(kwh(1.0)) - 1.0).abs() < 1e-12);
        assert!((to_kg(kg(100.0)) - 100.0).abs() < 1e-12);
        assert!((to_s(s(60.0)) - 60.0).abs() < 1e-12);
        assert!((to_rpm(rpm(720.0)) - 720.0).abs() < 1e-9);
    }

    #[test]
    fn kwh_is_3600_kj() {
        let e = kwh(1.0);
        assert!((to_mj(e) - constants::MJ_PER_KWH).abs() < 1e-9);
    }
}
