//! Minimum-load power management table.
//!
//! Derives a per-timestep genset on/off pattern from the total demand: the
//! smallest leading set of sources whose combined capacity, derated by the
//! allowed load percentage, covers the demand is switched on. Shore power
//! and storages are left to explicit staging.

use mf_machinery::ElectricPowerSystem;

#[derive(Clone, Debug)]
pub struct PmsLoadTable {
    /// Source names in switching order.
    source_names: Vec<String>,
    /// Cumulative derated capacity after switching on source k.
    cumulative_capacity_kw: Vec<f64>,
}

impl PmsLoadTable {
    /// Build the table from the non-shore sources of an electric system,
    /// in declaration order.
    pub fn from_system(system: &ElectricPowerSystem) -> Self {
        let mut source_names = Vec::new();
        let mut cumulative_capacity_kw = Vec::new();
        let mut acc = 0.0;
        for swb in &system.switchboards {
            for slot in &swb.sources {
                if slot.source.is_shore_power() {
                    continue;
                }
                acc += slot.source.meta().rated_kw() * system.max_genset_load_fraction;
                source_names.push(slot.source.meta().name.clone());
                cumulative_capacity_kw.push(acc);
            }
        }
        Self {
            source_names,
            cumulative_capacity_kw,
        }
    }

    /// Number of sources needed to carry `demand_kw`. At least one source
    /// stays on; demand beyond the table turns everything on.
    pub fn sources_on_for(&self, demand_kw: f64) -> usize {
        let n = self.source_names.len();
        if n == 0 {
            return 0;
        }
        for (k, capacity) in self.cumulative_capacity_kw.iter().enumerate() {
            if demand_kw <= *capacity {
                return k + 1;
            }
        }
        n
    }

    /// On/off pattern per source for a demand series.
    pub fn status_for(&self, demand_kw: &[f64]) -> Vec<(String, Vec<bool>)> {
        let mut status: Vec<(String, Vec<bool>)> = self
            .source_names
            .iter()
            .map(|name| (name.clone(), Vec::with_capacity(demand_kw.len())))
            .collect();
        for &d in demand_kw {
            let on = self.sources_on_for(d);
            for (k, (_, series)) in status.iter_mut().enumerate() {
                series.push(k < on);
            }
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_components::{
        ComponentKind, ComponentMeta, ElectricMachine, Engine, EngineCycle, EngineVariant,
        Genset, NoxCalculationMethod, PowerConverter, PowerRole, PowerSource,
    };
    use mf_core::curve::{Curve, EfficiencyCurve};
    use mf_core::SwitchboardId;
    use mf_fuel::{FuelKind, FuelOrigin};
    use mf_machinery::Switchboard;
    use std::collections::BTreeMap;

    fn genset(name: &str, rated_kw: f64) -> PowerSource {
        let engine = Engine::new(
            ComponentMeta::new(
                &format!("{name} engine"),
                ComponentKind::AuxEngine,
                PowerRole::Source,
                rated_kw * 1.1,
            )
            .unwrap()
            .with_rated_speed_rpm(750.0),
            Curve::constant(200.0).unwrap(),
            FuelKind::Diesel,
            FuelOrigin::Fossil,
            EngineCycle::Diesel,
            NoxCalculationMethod::Tier2,
            BTreeMap::new(),
        )
        .unwrap();
        let generator = ElectricMachine::new(PowerConverter::new(
            ComponentMeta::new(
                &format!("{name} generator"),
                ComponentKind::Generator,
                PowerRole::Source,
                rated_kw,
            )
            .unwrap(),
            EfficiencyCurve::constant(0.95).unwrap(),
        ));
        PowerSource::Genset(
            Genset::new(name, EngineVariant::Single(engine), generator, None).unwrap(),
        )
    }

    fn two_genset_system() -> ElectricPowerSystem {
        let swb = Switchboard::new(
            SwitchboardId(1),
            vec![genset("genset 1", 1000.0), genset("genset 2", 1000.0)],
            vec![],
            vec![],
            vec![],
        )
        .unwrap();
        ElectricPowerSystem::new("plant", vec![swb], &[])
            .unwrap()
            .with_load_limits(0.8, 1.0, 0.0)
    }

    #[test]
    fn demand_below_first_capacity_keeps_one_on() {
        let table = PmsLoadTable::from_system(&two_genset_system());
        assert_eq!(table.sources_on_for(0.0), 1);
        assert_eq!(table.sources_on_for(700.0), 1);
    }

    #[test]
    fn demand_above_derated_capacity_adds_a_genset() {
        let table = PmsLoadTable::from_system(&two_genset_system());
        // 80% of 1000 kW is the first threshold.
        assert_eq!(table.sources_on_for(900.0), 2);
        assert_eq!(table.sources_on_for(5000.0), 2);
    }

    #[test]
    fn status_series_follows_demand() {
        let table = PmsLoadTable::from_system(&two_genset_system());
        let status = table.status_for(&[500.0, 1200.0]);
        assert_eq!(status[0].1, vec![true, true]);
        assert_eq!(status[1].1, vec![false, true]);
    }
}
