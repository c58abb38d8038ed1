//! Fuel, emission, energy and running-hour rollup over solved systems.

use crate::electric::ElectricPowerSystem;
use crate::error::MachineryError;
use crate::mechanical::MechanicalPropulsionSystem;
use crate::node::{ConsumerSlot, PtiPtoSlot, StorageSlot};
use mf_components::{EngineRunPoint, PowerSource};
use mf_fuel::{ConsumerClass, EmissionSpecies, FuelConsumption, FuelLibrary, ScalarOrSeries};
use mf_results::{
    duration_s, integrate, running_hours, Co2EmissionBreakdown, ComponentResultRow,
    IntegrationRule, MachineryResult, SolverWarning, TimeSteps,
};

/// Shared context of an aggregation pass.
pub struct Aggregation<'a> {
    pub steps: &'a TimeSteps,
    pub rule: IntegrationRule,
    pub fuels: &'a FuelLibrary,
}

impl<'a> Aggregation<'a> {
    fn integrate_kw_to_mj(&self, series_kw: &[f64]) -> Result<f64, MachineryError> {
        // kW integrated over seconds gives kJ.
        Ok(integrate(series_kw, self.steps, self.rule)? / 1000.0)
    }

    /// Integrate per-fuel flow rates (kg/s) into aggregated masses (kg).
    fn integrate_fuel(
        &self,
        rates: &FuelConsumption,
        n: usize,
    ) -> Result<FuelConsumption, MachineryError> {
        let mut fuels = Vec::with_capacity(rates.fuels.len());
        for fuel in &rates.fuels {
            let total = match &fuel.mass {
                ScalarOrSeries::Series(v) => integrate(v, self.steps, self.rule)?,
                ScalarOrSeries::Scalar(s) => *s * duration_s(self.steps, n),
            };
            fuels.push(fuel.with_mass(ScalarOrSeries::Scalar(total)));
        }
        Ok(FuelConsumption::new(fuels))
    }

    fn co2_breakdown(
        &self,
        rates: &FuelConsumption,
        consumer_class: Option<ConsumerClass>,
        n: usize,
    ) -> Result<Co2EmissionBreakdown, MachineryError> {
        let r = rates.co2_rate_breakdown(consumer_class, n)?;
        let well_to_tank = integrate(&r.well_to_tank, self.steps, self.rule)?;
        let tank_to_wake = integrate(&r.tank_to_wake, self.steps, self.rule)?;
        Ok(Co2EmissionBreakdown {
            well_to_tank,
            tank_to_wake,
            well_to_wake: well_to_tank + tank_to_wake,
            tank_to_wake_without_slip: integrate(
                &r.tank_to_wake_without_slip,
                self.steps,
                self.rule,
            )?,
            tank_to_wake_from_green_fuel: integrate(
                &r.tank_to_wake_from_green_fuel,
                self.steps,
                self.rule,
            )?,
        })
    }

    /// Fold one engine run point into the result and its component row.
    fn apply_engine_run(
        &self,
        res: &mut MachineryResult,
        row: &mut ComponentResultRow,
        run: &EngineRunPoint,
        consumer_class: Option<ConsumerClass>,
        n: usize,
    ) -> Result<(), MachineryError> {
        let fuel_total = self.integrate_fuel(&run.fuel_flow_rate_kg_per_s, n)?;
        let co2 = self.co2_breakdown(&run.fuel_flow_rate_kg_per_s, consumer_class, n)?;
        for (species, series_g_per_s) in &run.emissions_g_per_s {
            let kg = integrate(series_g_per_s, self.steps, self.rule)? / 1000.0;
            *res.total_emission_kg.entry(*species).or_insert(0.0) += kg;
            if *species == EmissionSpecies::Nox {
                row.nox_emission_kg = kg;
            }
        }
        row.fuel_consumption_kg = fuel_total.total();
        row.co2_emission_kg = co2.well_to_wake;
        row.multi_fuel_consumption_kg = fuel_total.clone();
        res.multi_fuel_consumption_total_kg =
            res.multi_fuel_consumption_total_kg.add(&fuel_total)?;
        res.co2_emission_total_kg.accumulate(&co2);
        Ok(())
    }
}

fn base_row(name: &str, kind: &str, rated: f64, unit: &str) -> ComponentResultRow {
    ComponentResultRow {
        name: name.to_string(),
        component_kind: kind.to_string(),
        rated_capacity: rated,
        rated_capacity_unit: unit.to_string(),
        ..Default::default()
    }
}

fn kind_name(kind: mf_components::ComponentKind) -> String {
    format!("{kind:?}")
}

// Efficiency between two ports, orientation-free: power flows towards the
// smaller magnitude, so the ratio is folded below one.
fn ratio_series(num: &[f64], den: &[f64]) -> Vec<f64> {
    num.iter()
        .zip(den)
        .map(|(a, b)| {
            if a.abs() > 0.0 && b.abs() > 0.0 {
                let ratio = (a / b).abs();
                if ratio > 1.0 {
                    1.0 / ratio
                } else {
                    ratio
                }
            } else {
                0.0
            }
        })
        .collect()
}

fn consumer_row(
    agg: &Aggregation,
    res: &mut MachineryResult,
    slot: &ConsumerSlot,
    switchboard_id: Option<u32>,
    shaftline_id: Option<u32>,
) -> Result<(), MachineryError> {
    let meta = slot.consumer.meta();
    let mut row = base_row(&meta.name, &kind_name(meta.kind), meta.rated_kw(), "kW");
    row.switchboard_id = switchboard_id;
    row.shaftline_id = shaftline_id;
    row.power_output_kw = slot.power_output_kw.clone();
    row.power_input_kw = slot.power_input_kw.clone();
    row.load_ratio = slot.load_ratio.clone();
    row.efficiency = slot.efficiency.clone();
    row.status = slot.power_input_kw.iter().map(|p| p.abs() > 0.0).collect();
    let energy_mj = agg.integrate_kw_to_mj(&slot.power_output_kw)?;
    if slot.consumer.is_propulsion() {
        res.energy_consumption_propulsion_total_mj += energy_mj;
    } else {
        res.energy_consumption_auxiliary_total_mj += energy_mj;
    }
    res.detail_result.push(row);
    Ok(())
}

fn storage_row(
    agg: &Aggregation,
    res: &mut MachineryResult,
    slot: &StorageSlot,
    switchboard_id: Option<u32>,
) -> Result<(), MachineryError> {
    let meta = slot.storage.meta();
    let (capacity, unit) = slot.storage.rated_capacity();
    let mut row = base_row(&meta.name, &kind_name(meta.kind), capacity, unit);
    row.switchboard_id = switchboard_id;
    row.power_input_kw = slot.power_input_kw.clone();
    row.power_output_kw = slot.stored_power_kw.clone();
    row.load_ratio = slot
        .power_input_kw
        .iter()
        .map(|p| meta.load_ratio(*p))
        .collect();
    row.efficiency = ratio_series(&slot.power_input_kw, &slot.stored_power_kw);
    row.status = slot.status.clone();
    row.soc = Some(slot.soc.clone());
    res.energy_stored_total_mj += agg.integrate_kw_to_mj(&slot.stored_power_kw)?;
    res.detail_result.push(row);
    Ok(())
}

fn pti_pto_row(
    agg: &Aggregation,
    res: &mut MachineryResult,
    slot: &PtiPtoSlot,
    electric_side: bool,
    switchboard_id: Option<u32>,
    shaftline_id: Option<u32>,
) -> Result<(), MachineryError> {
    let meta = slot.pti_pto.meta();
    let mut row = base_row(&meta.name, &kind_name(meta.kind), meta.rated_kw(), "kW");
    row.switchboard_id = switchboard_id;
    row.shaftline_id = shaftline_id;
    row.power_input_kw = slot.electric_power_kw.clone();
    row.power_output_kw = slot.shaft_power_kw.clone();
    row.load_ratio = slot
        .electric_power_kw
        .iter()
        .map(|p| meta.load_ratio(*p))
        .collect();
    row.efficiency = ratio_series(&slot.shaft_power_kw, &slot.electric_power_kw);
    let active: Vec<bool> = slot
        .electric_power_kw
        .iter()
        .map(|p| p.abs() > 0.0)
        .collect();
    row.status = active.clone();
    let hours = running_hours(&active, agg.steps);
    res.running_hours_pti_pto_total_hr += hours;
    row.running_hours_hr = hours;

    let pti_draw: Vec<f64> = slot.electric_power_kw.iter().map(|p| p.max(0.0)).collect();
    let pto_feed: Vec<f64> = slot.electric_power_kw.iter().map(|p| (-p).max(0.0)).collect();
    let pti_shaft: Vec<f64> = slot.shaft_power_kw.iter().map(|p| p.max(0.0)).collect();
    let pto_shaft: Vec<f64> = slot.shaft_power_kw.iter().map(|p| (-p).max(0.0)).collect();
    if electric_side {
        res.energy_consumption_electric_total_mj += agg.integrate_kw_to_mj(&pti_draw)?;
        res.energy_input_electric_total_mj += agg.integrate_kw_to_mj(&pto_feed)?;
    } else {
        res.energy_input_mechanical_total_mj += agg.integrate_kw_to_mj(&pti_shaft)?;
        res.energy_consumption_mechanical_total_mj += agg.integrate_kw_to_mj(&pto_shaft)?;
    }
    res.detail_result.push(row);
    Ok(())
}

/// Aggregate a solved electric power system.
pub fn aggregate_electric(
    system: &ElectricPowerSystem,
    agg: &Aggregation,
    warnings: Vec<SolverWarning>,
) -> Result<MachineryResult, MachineryError> {
    let n = system.timesteps().ok_or_else(|| MachineryError::InputShape {
        what: "system has not been solved".to_string(),
    })?;
    let mut res = MachineryResult::with_duration(duration_s(agg.steps, n));
    res.warnings = warnings;

    for swb in &system.switchboards {
        let swb_id = Some(swb.id.0);
        for slot in &swb.sources {
            let meta = slot.source.meta();
            let mut row = base_row(&meta.name, &kind_name(meta.kind), meta.rated_kw(), "kW");
            row.switchboard_id = swb_id;
            row.power_output_kw = slot.power_output_kw.clone();
            row.status = slot.status.clone();
            row.running_hours_hr = running_hours(&slot.status, agg.steps);
            match &slot.source {
                PowerSource::Genset(genset) => {
                    let run = genset.run_point(&slot.power_output_kw, agg.fuels)?;
                    row.power_input_kw = run.shaft_power_kw.clone();
                    row.load_ratio = run.genset_load_ratio.clone();
                    row.efficiency =
                        ratio_series(&slot.power_output_kw, &run.shaft_power_kw);
                    row.fuel_consumer_class = Some(format!("{:?}", genset.consumer_class()));
                    agg.apply_engine_run(
                        &mut res,
                        &mut row,
                        &run.engine,
                        Some(genset.consumer_class()),
                        n,
                    )?;
                    res.energy_input_mechanical_total_mj +=
                        agg.integrate_kw_to_mj(&run.shaft_power_kw)?;
                    res.running_hours_genset_total_hr += row.running_hours_hr;
                }
                PowerSource::Coges(coges) => {
                    let mut shaft = Vec::with_capacity(n);
                    for &p in &slot.power_output_kw {
                        shaft.push(coges.generator.shaft_power_from_electric(p)?.0);
                    }
                    let run = coges.run_point(&slot.power_output_kw, agg.fuels)?;
                    row.power_input_kw = shaft.clone();
                    row.load_ratio = run.load_ratio.clone();
                    row.efficiency = ratio_series(&slot.power_output_kw, &shaft);
                    row.fuel_consumer_class =
                        Some(format!("{:?}", coges.cogas.consumer_class()));
                    agg.apply_engine_run(
                        &mut res,
                        &mut row,
                        &run,
                        Some(coges.cogas.consumer_class()),
                        n,
                    )?;
                    res.energy_input_mechanical_total_mj += agg.integrate_kw_to_mj(&shaft)?;
                    res.running_hours_genset_total_hr += row.running_hours_hr;
                }
                PowerSource::FuelCellSystem(fc) => {
                    let run = fc.run_point(&slot.power_output_kw, agg.fuels)?;
                    row.power_input_kw = slot.power_output_kw.clone();
                    row.load_ratio = run.load_ratio.clone();
                    row.efficiency = run.efficiency.clone();
                    row.fuel_consumer_class = Some(format!("{:?}", fc.consumer_class()));
                    let fuel_total = agg.integrate_fuel(&run.fuel_flow_rate_kg_per_s, n)?;
                    let co2 = agg.co2_breakdown(
                        &run.fuel_flow_rate_kg_per_s,
                        Some(fc.consumer_class()),
                        n,
                    )?;
                    row.fuel_consumption_kg = fuel_total.total();
                    row.co2_emission_kg = co2.well_to_wake;
                    row.multi_fuel_consumption_kg = fuel_total.clone();
                    res.multi_fuel_consumption_total_kg =
                        res.multi_fuel_consumption_total_kg.add(&fuel_total)?;
                    res.co2_emission_total_kg.accumulate(&co2);
                    res.running_hours_fuel_cell_total_hr += row.running_hours_hr;
                }
                PowerSource::ShorePower(shore) => {
                    let mut grid = Vec::with_capacity(n);
                    for &p in &slot.power_output_kw {
                        grid.push(shore.grid_power_from_bus(p)?);
                    }
                    row.power_input_kw = grid.clone();
                    row.load_ratio = slot
                        .power_output_kw
                        .iter()
                        .map(|p| meta.load_ratio(*p))
                        .collect();
                    row.efficiency = ratio_series(&slot.power_output_kw, &grid);
                    res.energy_input_electric_total_mj += agg.integrate_kw_to_mj(&grid)?;
                }
            }
            res.detail_result.push(row);
        }
        for slot in &swb.consumers {
            consumer_row(agg, &mut res, slot, swb_id, None)?;
        }
        for slot in &swb.storages {
            storage_row(agg, &mut res, slot, swb_id)?;
        }
        for slot in &swb.pti_ptos {
            pti_pto_row(agg, &mut res, slot, true, swb_id, None)?;
        }
    }
    Ok(res)
}

/// Aggregate a solved mechanical propulsion system.
pub fn aggregate_mechanical(
    system: &MechanicalPropulsionSystem,
    agg: &Aggregation,
    warnings: Vec<SolverWarning>,
) -> Result<MachineryResult, MachineryError> {
    let n = system.timesteps().ok_or_else(|| MachineryError::InputShape {
        what: "system has not been solved".to_string(),
    })?;
    let mut res = MachineryResult::with_duration(duration_s(agg.steps, n));
    res.warnings = warnings;

    for line in &system.shaft_lines {
        let line_id = Some(line.id.0);
        for slot in &line.main_engines {
            let meta = &slot.engine.meta;
            let mut row = base_row(&meta.name, &kind_name(meta.kind), meta.rated_kw(), "kW");
            row.shaftline_id = line_id;
            row.power_output_kw = slot.power_output_kw.clone();
            // Power at the engine flange, before the gearbox if present.
            let mut engine_side = slot.power_output_kw.clone();
            if let Some(gearbox) = &slot.engine.gearbox {
                for p in engine_side.iter_mut() {
                    *p = gearbox.power_input_from_output(*p)?.0;
                }
            }
            row.power_input_kw = engine_side.clone();
            row.status = slot.status.clone();
            row.running_hours_hr = running_hours(&slot.status, agg.steps);
            row.fuel_consumer_class = Some(format!("{:?}", slot.engine.consumer_class()));
            let run = slot.engine.run_point(&slot.power_output_kw, agg.fuels)?;
            row.load_ratio = run.load_ratio.clone();
            row.efficiency = ratio_series(&slot.power_output_kw, &engine_side);
            agg.apply_engine_run(
                &mut res,
                &mut row,
                &run,
                Some(slot.engine.consumer_class()),
                n,
            )?;
            res.running_hours_main_engines_total_hr += row.running_hours_hr;
            res.detail_result.push(row);
        }
        for slot in &line.consumers {
            consumer_row(agg, &mut res, slot, None, line_id)?;
        }
        for slot in &line.pti_ptos {
            pti_pto_row(agg, &mut res, slot, false, None, line_id)?;
        }
    }
    Ok(res)
}
