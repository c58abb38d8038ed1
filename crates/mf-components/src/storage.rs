//! Electric energy storage: battery and supercapacitor.
//!
//! Bus-side power input is positive when charging and negative when
//! discharging. State of charge advances one timestep at a time; the
//! caller owns the stepping so it can interleave with dispatch decisions.

use crate::converter::PowerConverter;
use crate::error::{ComponentError, ComponentResult};
use crate::meta::{ComponentKind, ComponentMeta, PowerRole};
use mf_core::numeric::clamp;
use mf_core::units::constants::{KJ_PER_KWH, SECONDS_PER_DAY};

/// Outcome of advancing a storage by one timestep.
#[derive(Clone, Copy, Debug)]
pub struct SocStep {
    pub soc_next: f64,
    /// Bus-side power actually served after rate and window clipping, kW.
    pub achieved_power_kw: f64,
    /// Power into (positive) or out of (negative) the cells, kW.
    pub stored_power_kw: f64,
    pub saturated: bool,
}

/// Solved state-of-charge trajectory.
#[derive(Clone, Debug, Default)]
pub struct SocSeries {
    /// State of charge per time point, length T+1 including the initial
    /// value.
    pub soc: Vec<f64>,
    /// Bus-side power actually served after rate and window clipping, kW.
    pub achieved_power_kw: Vec<f64>,
    /// Power into the cells (positive) or out of the cells (negative), kW.
    pub stored_power_kw: Vec<f64>,
    /// Timesteps where the request had to be clipped at the SoC window.
    pub saturated: Vec<usize>,
}

#[derive(Clone, Debug)]
struct StorageParams {
    capacity_kwh: f64,
    eff_charging: f64,
    eff_discharging: f64,
    soe_min: f64,
    soe_max: f64,
    self_discharge_per_day: f64,
    max_charge_kw: f64,
    max_discharge_kw: f64,
    soc0: f64,
}

impl StorageParams {
    fn validate(&self, name: &str) -> ComponentResult<()> {
        let ok = self.capacity_kwh > 0.0
            && self.eff_charging > 0.0
            && self.eff_charging <= 1.0
            && self.eff_discharging > 0.0
            && self.eff_discharging <= 1.0
            && (0.0..1.0).contains(&self.soe_min)
            && self.soe_max > self.soe_min
            && self.soe_max <= 1.0
            && (self.soe_min..=self.soe_max).contains(&self.soc0)
            && self.self_discharge_per_day >= 0.0
            && self.max_charge_kw > 0.0
            && self.max_discharge_kw > 0.0;
        if ok {
            Ok(())
        } else {
            Err(ComponentError::Configuration {
                what: format!("storage '{name}' has inconsistent parameters"),
            })
        }
    }

    fn stored_from_bus(
        &self,
        converter: Option<&PowerConverter>,
        power_input_kw: f64,
    ) -> ComponentResult<f64> {
        let cell = match converter {
            Some(conv) => conv.power_output_from_input(power_input_kw)?.0,
            None => power_input_kw,
        };
        Ok(if cell >= 0.0 {
            cell * self.eff_charging
        } else {
            cell / self.eff_discharging
        })
    }

    fn bus_from_stored(
        &self,
        converter: Option<&PowerConverter>,
        stored_kw: f64,
    ) -> ComponentResult<f64> {
        let cell = if stored_kw >= 0.0 {
            stored_kw / self.eff_charging
        } else {
            stored_kw * self.eff_discharging
        };
        Ok(match converter {
            Some(conv) => conv.power_input_from_output(cell)?.0,
            None => cell,
        })
    }

    fn step(
        &self,
        name: &str,
        converter: Option<&PowerConverter>,
        soc: f64,
        requested_kw: f64,
        dt_s: f64,
        timestep: usize,
        strict: bool,
    ) -> ComponentResult<SocStep> {
        let rate_limited = clamp(requested_kw, -self.max_discharge_kw, self.max_charge_kw);
        let mut stored = self.stored_from_bus(converter, rate_limited)?;
        let mut achieved = rate_limited;
        let mut saturated = false;
        let dsoc = stored * dt_s / (self.capacity_kwh * KJ_PER_KWH);
        let unclipped = soc + dsoc;
        let mut next = unclipped;
        if unclipped > self.soe_max + 1e-12 || unclipped < self.soe_min - 1e-12 {
            if strict {
                return Err(ComponentError::StorageSaturation {
                    component: name.to_string(),
                    timestep,
                });
            }
            let bound = if unclipped > self.soe_max {
                self.soe_max
            } else {
                self.soe_min
            };
            stored = (bound - soc) * self.capacity_kwh * KJ_PER_KWH / dt_s;
            achieved = self.bus_from_stored(converter, stored)?;
            saturated = true;
            next = bound;
        }
        next -= self.self_discharge_per_day * dt_s / SECONDS_PER_DAY;
        next = clamp(next, self.soe_min, self.soe_max);
        Ok(SocStep {
            soc_next: next,
            achieved_power_kw: achieved,
            stored_power_kw: stored,
            saturated,
        })
    }

    fn soc_series(
        &self,
        name: &str,
        converter: Option<&PowerConverter>,
        power_input_kw: &[f64],
        dt_s: &[f64],
        strict: bool,
    ) -> ComponentResult<SocSeries> {
        if power_input_kw.len() != dt_s.len() {
            return Err(ComponentError::InvalidArg {
                what: "power series and timestep series lengths differ",
            });
        }
        let mut out = SocSeries {
            soc: Vec::with_capacity(power_input_kw.len() + 1),
            achieved_power_kw: Vec::with_capacity(power_input_kw.len()),
            stored_power_kw: Vec::with_capacity(power_input_kw.len()),
            saturated: Vec::new(),
        };
        let mut soc = self.soc0;
        out.soc.push(soc);
        for (t, (&requested, &dt)) in power_input_kw.iter().zip(dt_s).enumerate() {
            let step = self.step(name, converter, soc, requested, dt, t, strict)?;
            if step.saturated {
                out.saturated.push(t);
            }
            soc = step.soc_next;
            out.soc.push(soc);
            out.achieved_power_kw.push(step.achieved_power_kw);
            out.stored_power_kw.push(step.stored_power_kw);
        }
        Ok(out)
    }
}

#[derive(Clone, Debug)]
pub struct Battery {
    pub meta: ComponentMeta,
    pub rated_capacity_kwh: f64,
    pub charging_rate_c: f64,
    pub discharging_rate_c: f64,
    pub converter: Option<PowerConverter>,
    params: StorageParams,
}

impl Battery {
    pub fn new(
        name: &str,
        rated_capacity_kwh: f64,
        charging_rate_c: f64,
        discharging_rate_c: f64,
    ) -> ComponentResult<Self> {
        let params = StorageParams {
            capacity_kwh: rated_capacity_kwh,
            eff_charging: 0.975,
            eff_discharging: 0.975,
            soe_min: 0.0,
            soe_max: 1.0,
            self_discharge_per_day: 0.0,
            max_charge_kw: rated_capacity_kwh * charging_rate_c,
            max_discharge_kw: rated_capacity_kwh * discharging_rate_c,
            soc0: 0.8,
        };
        params.validate(name)?;
        let meta = ComponentMeta::new(
            name,
            ComponentKind::Battery,
            PowerRole::EnergyStorage,
            rated_capacity_kwh * discharging_rate_c,
        )?;
        Ok(Self {
            meta,
            rated_capacity_kwh,
            charging_rate_c,
            discharging_rate_c,
            converter: None,
            params,
        })
    }

    pub fn with_soc0(mut self, soc0: f64) -> ComponentResult<Self> {
        self.params.soc0 = soc0;
        self.params.validate(&self.meta.name)?;
        Ok(self)
    }

    pub fn with_efficiencies(
        mut self,
        eff_charging: f64,
        eff_discharging: f64,
    ) -> ComponentResult<Self> {
        self.params.eff_charging = eff_charging;
        self.params.eff_discharging = eff_discharging;
        self.params.validate(&self.meta.name)?;
        Ok(self)
    }

    pub fn with_soe_window(mut self, soe_min: f64, soe_max: f64) -> ComponentResult<Self> {
        self.params.soe_min = soe_min;
        self.params.soe_max = soe_max;
        self.params.validate(&self.meta.name)?;
        Ok(self)
    }

    pub fn with_self_discharge_per_day(mut self, fraction: f64) -> ComponentResult<Self> {
        self.params.self_discharge_per_day = fraction;
        self.params.validate(&self.meta.name)?;
        Ok(self)
    }

    /// Attach a grid converter; the component then reports as a battery
    /// system and its rating follows the converter.
    pub fn with_converter(mut self, converter: PowerConverter) -> Self {
        self.meta.kind = ComponentKind::BatterySystem;
        self.meta.rated_power = converter.meta.rated_power;
        self.converter = Some(converter);
        self
    }

    pub fn soc0(&self) -> f64 {
        self.params.soc0
    }

    pub fn soe_window(&self) -> (f64, f64) {
        (self.params.soe_min, self.params.soe_max)
    }

    pub fn max_charging_power_kw(&self) -> f64 {
        self.params.max_charge_kw
    }

    pub fn max_discharging_power_kw(&self) -> f64 {
        self.params.max_discharge_kw
    }

    /// Discharge power available at the bus without leaving the SoC
    /// window during one step of `dt_s`.
    pub fn available_discharge_power_kw(&self, soc: f64, dt_s: f64) -> f64 {
        let headroom_kw = (soc - self.params.soe_min).max(0.0) * self.rated_capacity_kwh
            * KJ_PER_KWH
            / dt_s;
        let stored = -headroom_kw.min(
            self.params.max_discharge_kw / self.params.eff_discharging,
        );
        match self.params.bus_from_stored(self.converter.as_ref(), stored) {
            Ok(bus) => (-bus).max(0.0).min(self.params.max_discharge_kw),
            Err(_) => 0.0,
        }
    }

    pub fn soc_series(
        &self,
        power_input_kw: &[f64],
        dt_s: &[f64],
        strict: bool,
    ) -> ComponentResult<SocSeries> {
        self.params.soc_series(
            &self.meta.name,
            self.converter.as_ref(),
            power_input_kw,
            dt_s,
            strict,
        )
    }

    /// Advance one timestep from `soc` with the requested bus power.
    pub fn step_soc(
        &self,
        soc: f64,
        requested_kw: f64,
        dt_s: f64,
        timestep: usize,
        strict: bool,
    ) -> ComponentResult<SocStep> {
        self.params.step(
            &self.meta.name,
            self.converter.as_ref(),
            soc,
            requested_kw,
            dt_s,
            timestep,
            strict,
        )
    }
}

#[derive(Clone, Debug)]
pub struct Supercapacitor {
    pub meta: ComponentMeta,
    pub rated_capacity_wh: f64,
    pub converter: Option<PowerConverter>,
    params: StorageParams,
}

impl Supercapacitor {
    pub fn new(
        name: &str,
        rated_capacity_wh: f64,
        rated_power_kw: f64,
    ) -> ComponentResult<Self> {
        let params = StorageParams {
            capacity_kwh: rated_capacity_wh / 1000.0,
            eff_charging: 0.995,
            eff_discharging: 0.995,
            soe_min: 0.0,
            soe_max: 1.0,
            self_discharge_per_day: 0.0,
            max_charge_kw: rated_power_kw,
            max_discharge_kw: rated_power_kw,
            soc0: 0.8,
        };
        params.validate(name)?;
        let meta = ComponentMeta::new(
            name,
            ComponentKind::Supercapacitor,
            PowerRole::EnergyStorage,
            rated_power_kw,
        )?;
        Ok(Self {
            meta,
            rated_capacity_wh,
            converter: None,
            params,
        })
    }

    pub fn with_soc0(mut self, soc0: f64) -> ComponentResult<Self> {
        self.params.soc0 = soc0;
        self.params.validate(&self.meta.name)?;
        Ok(self)
    }

    pub fn with_efficiencies(
        mut self,
        eff_charging: f64,
        eff_discharging: f64,
    ) -> ComponentResult<Self> {
        self.params.eff_charging = eff_charging;
        self.params.eff_discharging = eff_discharging;
        self.params.validate(&self.meta.name)?;
        Ok(self)
    }

    pub fn with_soe_window(mut self, soe_min: f64, soe_max: f64) -> ComponentResult<Self> {
        self.params.soe_min = soe_min;
        self.params.soe_max = soe_max;
        self.params.validate(&self.meta.name)?;
        Ok(self)
    }

    pub fn with_converter(mut self, converter: PowerConverter) -> Self {
        self.meta.kind = ComponentKind::SupercapacitorSystem;
        self.converter = Some(converter);
        self
    }

    pub fn soc0(&self) -> f64 {
        self.params.soc0
    }

    pub fn available_discharge_power_kw(&self, soc: f64, dt_s: f64) -> f64 {
        let headroom_kw = (soc - self.params.soe_min).max(0.0)
            * self.params.capacity_kwh
            * KJ_PER_KWH
            / dt_s;
        let stored = -headroom_kw.min(
            self.params.max_discharge_kw / self.params.eff_discharging,
        );
        match self.params.bus_from_stored(self.converter.as_ref(), stored) {
            Ok(bus) => (-bus).max(0.0).min(self.params.max_discharge_kw),
            Err(_) => 0.0,
        }
    }

    pub fn soc_series(
        &self,
        power_input_kw: &[f64],
        dt_s: &[f64],
        strict: bool,
    ) -> ComponentResult<SocSeries> {
        self.params.soc_series(
            &self.meta.name,
            self.converter.as_ref(),
            power_input_kw,
            dt_s,
            strict,
        )
    }

    /// Advance one timestep from `soc` with the requested bus power.
    pub fn step_soc(
        &self,
        soc: f64,
        requested_kw: f64,
        dt_s: f64,
        timestep: usize,
        strict: bool,
    ) -> ComponentResult<SocStep> {
        self.params.step(
            &self.meta.name,
            self.converter.as_ref(),
            soc,
            requested_kw,
            dt_s,
            timestep,
            strict,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::curve::EfficiencyCurve;

    fn battery_1000_kwh() -> Battery {
        Battery::new("battery 1", 1000.0, 1.0, 1.0)
            .unwrap()
            .with_soc0(0.5)
            .unwrap()
            .with_efficiencies(0.975, 0.975)
            .unwrap()
    }

    #[test]
    fn charging_moves_soc_up_with_efficiency() {
        // 500 kW for 100 s into 1000 kWh at 0.975
        let battery = battery_1000_kwh();
        let series = battery.soc_series(&[500.0], &[100.0], true).unwrap();
        let expected = 0.5 + 500.0 * 100.0 * 0.975 / (1000.0 * 3600.0);
        assert!((series.soc[1] - expected).abs() < 1e-9);
        assert!((series.soc[1] - 0.51354).abs() < 1e-4);
    }

    #[test]
    fn discharging_draws_more_from_the_cells() {
        let battery = battery_1000_kwh();
        let series = battery.soc_series(&[-300.0], &[600.0], true).unwrap();
        let expected = 0.5 - 300.0 * 600.0 / 0.975 / (1000.0 * 3600.0);
        assert!((series.soc[1] - expected).abs() < 1e-9);
    }

    #[test]
    fn c_rate_clips_the_request() {
        let battery = battery_1000_kwh();
        // 1 C on 1000 kWh allows 1000 kW; ask for 2000 kW.
        let series = battery.soc_series(&[2000.0], &[10.0], true).unwrap();
        assert!((series.achieved_power_kw[0] - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn saturation_is_an_error_in_strict_mode() {
        let battery = Battery::new("b", 10.0, 1.0, 1.0)
            .unwrap()
            .with_soc0(0.99)
            .unwrap();
        let err = battery.soc_series(&[10.0], &[3600.0], true).unwrap_err();
        assert!(matches!(err, ComponentError::StorageSaturation { timestep: 0, .. }));
    }

    #[test]
    fn saturation_clips_in_relaxed_mode() {
        let battery = Battery::new("b", 10.0, 1.0, 1.0)
            .unwrap()
            .with_soc0(0.99)
            .unwrap();
        let series = battery.soc_series(&[10.0], &[3600.0], false).unwrap();
        assert_eq!(series.saturated, vec![0]);
        assert!((series.soc[1] - 1.0).abs() < 1e-12);
        assert!(series.achieved_power_kw[0] < 10.0);
    }

    #[test]
    fn soe_window_is_respected() {
        let battery = Battery::new("b", 100.0, 1.0, 1.0)
            .unwrap()
            .with_soe_window(0.2, 0.9)
            .unwrap()
            .with_soc0(0.25)
            .unwrap();
        let series = battery.soc_series(&[-100.0], &[3600.0], false).unwrap();
        assert!((series.soc[1] - 0.2).abs() < 1e-12);
        assert_eq!(series.saturated, vec![0]);
    }

    #[test]
    fn self_discharge_drains_over_time() {
        let battery = Battery::new("b", 100.0, 1.0, 1.0)
            .unwrap()
            .with_soc0(0.5)
            .unwrap()
            .with_self_discharge_per_day(0.024)
            .unwrap();
        let series = battery.soc_series(&[0.0, 0.0], &[3600.0, 3600.0], true).unwrap();
        // 2.4% per day is 0.1% per hour.
        assert!((series.soc[1] - 0.499).abs() < 1e-9);
        assert!((series.soc[2] - 0.498).abs() < 1e-9);
    }

    #[test]
    fn converter_losses_apply_on_both_directions() {
        let converter = PowerConverter::new(
            ComponentMeta::new("conv", ComponentKind::PowerConverter, PowerRole::Transmission, 1000.0)
                .unwrap(),
            EfficiencyCurve::constant(0.97).unwrap(),
        );
        let battery = battery_1000_kwh().with_converter(converter);
        assert_eq!(battery.meta.kind, ComponentKind::BatterySystem);
        let series = battery.soc_series(&[500.0], &[100.0], true).unwrap();
        let expected = 0.5 + 500.0 * 0.97 * 0.975 * 100.0 / (1000.0 * 3600.0);
        assert!((series.soc[1] - expected).abs() < 1e-9);
    }

    #[test]
    fn available_discharge_power_respects_soc_headroom() {
        let battery = Battery::new("b", 100.0, 1.0, 1.0)
            .unwrap()
            .with_soe_window(0.2, 0.9)
            .unwrap()
            .with_soc0(0.25)
            .unwrap();
        // 5% of 100 kWh over one hour is 5 kW at the cells.
        let avail = battery.available_discharge_power_kw(0.25, 3600.0);
        assert!(avail <= 5.0 + 1e-9);
        assert!(avail > 4.0);
    }

    #[test]
    fn supercapacitor_uses_wh_capacity() {
        let cap = Supercapacitor::new("sc", 50_000.0, 500.0)
            .unwrap()
            .with_soc0(0.5)
            .unwrap();
        let series = cap.soc_series(&[100.0], &[60.0], true).unwrap();
        let expected = 0.5 + 100.0 * 60.0 * 0.995 / (50.0 * 3600.0);
        assert!((series.soc[1] - expected).abs() < 1e-9);
    }
}
