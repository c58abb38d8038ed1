//! Topology validation logic.

use crate::schema::{
    CurveDef, EngineDef, MachineDef, PropulsionType, SubsystemDef, SystemDef,
};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing section: {what}")]
    MissingSection { what: String },
}

pub fn validate_system(system: &SystemDef) -> Result<(), ValidationError> {
    for (field, value) in [
        (
            "maximum_allowed_genset_load_percentage",
            system.maximum_allowed_genset_load_percentage,
        ),
        (
            "maximum_allowed_fuel_cell_load_percentage",
            system.maximum_allowed_fuel_cell_load_percentage,
        ),
        (
            "average_base_load_percentage",
            system.average_base_load_percentage,
        ),
    ] {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
                reason: "must be a percentage in [0, 100]".to_string(),
            });
        }
    }

    match system.propulsion_type {
        PropulsionType::Electric => {
            if system.electric_system.is_none() {
                return Err(ValidationError::MissingSection {
                    what: "electric propulsion requires an electric_system".to_string(),
                });
            }
        }
        PropulsionType::Mechanical => {
            if system.mechanical_system.is_none() {
                return Err(ValidationError::MissingSection {
                    what: "mechanical propulsion requires a mechanical_system".to_string(),
                });
            }
        }
        PropulsionType::Hybrid => {
            if system.electric_system.is_none() || system.mechanical_system.is_none() {
                return Err(ValidationError::MissingSection {
                    what: "hybrid propulsion requires both an electric_system and a mechanical_system"
                        .to_string(),
                });
            }
        }
    }

    let mut names: HashSet<&str> = HashSet::new();
    let mut shaftline_ids: HashSet<u32> = HashSet::new();
    if let Some(mech) = &system.mechanical_system {
        let mut ids = HashSet::new();
        for line in &mech.shaftlines {
            if !ids.insert(line.id) {
                return Err(ValidationError::DuplicateId {
                    id: line.id.to_string(),
                    context: "shaftlines".to_string(),
                });
            }
            shaftline_ids.insert(line.id);
            for subsystem in &line.subsystems {
                validate_subsystem(subsystem, &mut names, &format!("shaft line {}", line.id))?;
                if matches!(
                    subsystem,
                    SubsystemDef::Genset { .. }
                        | SubsystemDef::FuelCellSystem { .. }
                        | SubsystemDef::Battery { .. }
                        | SubsystemDef::Supercapacitor { .. }
                        | SubsystemDef::ShorePower { .. }
                        | SubsystemDef::PropulsionDrive { .. }
                        | SubsystemDef::OtherLoad { .. }
                        | SubsystemDef::Coges { .. }
                ) {
                    return Err(ValidationError::InvalidValue {
                        field: format!("shaft line {} subsystem '{}'", line.id, subsystem.name()),
                        value: "electric subsystem".to_string(),
                        reason: "only main engines, mechanical loads and PTI/PTO attach to a shaft line"
                            .to_string(),
                    });
                }
            }
        }
    }

    if let Some(electric) = &system.electric_system {
        let mut swb_ids = HashSet::new();
        for swb in &electric.switchboards {
            if !swb_ids.insert(swb.id) {
                return Err(ValidationError::DuplicateId {
                    id: swb.id.to_string(),
                    context: "switchboards".to_string(),
                });
            }
            for subsystem in &swb.subsystems {
                validate_subsystem(subsystem, &mut names, &format!("switchboard {}", swb.id))?;
                match subsystem {
                    SubsystemDef::MainEngine { .. }
                    | SubsystemDef::PropellerLoad { .. }
                    | SubsystemDef::OtherMechanicalLoad { .. } => {
                        return Err(ValidationError::InvalidValue {
                            field: format!(
                                "switchboard {} subsystem '{}'",
                                swb.id,
                                subsystem.name()
                            ),
                            value: "mechanical subsystem".to_string(),
                            reason: "mechanical components attach to a shaft line".to_string(),
                        });
                    }
                    SubsystemDef::PtiPto { shaftline_id, name, .. } => {
                        if system.mechanical_system.is_some()
                            && !shaftline_ids.contains(shaftline_id)
                        {
                            return Err(ValidationError::MissingReference {
                                id: shaftline_id.to_string(),
                                context: format!("PTI/PTO '{name}' shaftline_id"),
                            });
                        }
                    }
                    _ => {}
                }
            }
        }
        for (i, tie) in electric.bus_ties.iter().enumerate() {
            for id in [tie.switchboards.0, tie.switchboards.1] {
                if !swb_ids.contains(&id) {
                    return Err(ValidationError::MissingReference {
                        id: id.to_string(),
                        context: format!("bus tie {} switchboards", i + 1),
                    });
                }
            }
        }
    }

    for storage in &system.fuel_storage {
        if !storage.capacity_kg.is_finite() || storage.capacity_kg < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "fuel_storage capacity_kg".to_string(),
                value: storage.capacity_kg.to_string(),
                reason: "must be non-negative and finite".to_string(),
            });
        }
    }

    Ok(())
}

fn validate_subsystem<'a>(
    subsystem: &'a SubsystemDef,
    names: &mut HashSet<&'a str>,
    context: &str,
) -> Result<(), ValidationError> {
    let name = subsystem.name();
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: format!("{context} subsystem name"),
            value: String::new(),
            reason: "must be non-empty".to_string(),
        });
    }
    if !names.insert(name) {
        return Err(ValidationError::DuplicateId {
            id: name.to_string(),
            context: context.to_string(),
        });
    }

    match subsystem {
        SubsystemDef::Genset {
            engine,
            generator,
            rectifier,
            ..
        } => {
            validate_engine(engine, name)?;
            validate_machine(generator, name)?;
            if let Some(rectifier) = rectifier {
                validate_machine(rectifier, name)?;
            }
        }
        SubsystemDef::FuelCellSystem {
            rated_power_kw,
            efficiency,
            converter,
            ..
        } => {
            validate_positive(*rated_power_kw, "rated_power_kw", name)?;
            validate_curve(efficiency, "efficiency", name)?;
            if let Some(converter) = converter {
                validate_machine(converter, name)?;
            }
        }
        SubsystemDef::Coges { cogas, generator, .. } => {
            validate_positive(cogas.rated_power_kw, "cogas rated_power_kw", name)?;
            validate_curve(&cogas.efficiency, "cogas efficiency", name)?;
            validate_machine(generator, name)?;
        }
        SubsystemDef::ShorePower {
            rated_power_kw,
            converter,
            ..
        } => {
            validate_positive(*rated_power_kw, "rated_power_kw", name)?;
            if let Some(converter) = converter {
                validate_machine(converter, name)?;
            }
        }
        SubsystemDef::Battery {
            rated_capacity_kwh,
            charging_rate_c,
            discharging_rate_c,
            soc0,
            eff_charging,
            eff_discharging,
            soe_min,
            soe_max,
            ..
        } => {
            validate_positive(*rated_capacity_kwh, "rated_capacity_kwh", name)?;
            validate_positive(*charging_rate_c, "charging_rate_c", name)?;
            validate_positive(*discharging_rate_c, "discharging_rate_c", name)?;
            for (field, value) in [
                ("soc0", *soc0),
                ("eff_charging", *eff_charging),
                ("eff_discharging", *eff_discharging),
                ("soe_min", *soe_min),
                ("soe_max", *soe_max),
            ] {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(ValidationError::InvalidValue {
                        field: format!("battery '{name}' {field}"),
                        value: value.to_string(),
                        reason: "must be in [0, 1]".to_string(),
                    });
                }
            }
            if soe_min >= soe_max {
                return Err(ValidationError::InvalidValue {
                    field: format!("battery '{name}' soe_min"),
                    value: soe_min.to_string(),
                    reason: "must be below soe_max".to_string(),
                });
            }
        }
        SubsystemDef::Supercapacitor {
            rated_capacity_wh,
            rated_power_kw,
            ..
        } => {
            validate_positive(*rated_capacity_wh, "rated_capacity_wh", name)?;
            validate_positive(*rated_power_kw, "rated_power_kw", name)?;
        }
        SubsystemDef::PropulsionDrive { components, .. }
        | SubsystemDef::OtherLoad { components, .. }
        | SubsystemDef::PtiPto { components, .. }
        | SubsystemDef::PropellerLoad { components, .. }
        | SubsystemDef::OtherMechanicalLoad { components, .. } => {
            if components.is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: format!("subsystem '{name}' components"),
                    value: "[]".to_string(),
                    reason: "a serial chain needs at least one component".to_string(),
                });
            }
            for machine in components {
                validate_machine(machine, name)?;
            }
        }
        SubsystemDef::MainEngine { engine, gearbox, .. } => {
            validate_engine(engine, name)?;
            if let Some(gearbox) = gearbox {
                validate_machine(gearbox, name)?;
            }
        }
    }
    Ok(())
}

fn validate_engine(engine: &EngineDef, subsystem: &str) -> Result<(), ValidationError> {
    validate_positive(engine.rated_power_kw, "engine rated_power_kw", subsystem)?;
    validate_curve(&engine.bsfc, "engine bsfc", subsystem)?;
    if let Some(pilot) = &engine.pilot {
        validate_curve(&pilot.bsfc, "pilot bsfc", subsystem)?;
        if !engine.additional_fuel_modes.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("engine of '{subsystem}'"),
                value: "pilot + additional_fuel_modes".to_string(),
                reason: "an engine is either dual-fuel or multi-fuel, not both".to_string(),
            });
        }
    }
    for mode in &engine.additional_fuel_modes {
        validate_curve(&mode.bsfc, "fuel mode bsfc", subsystem)?;
    }
    for curve in &engine.emission_curves {
        validate_curve(
            &CurveDef {
                points: curve.points.clone(),
            },
            "emission curve",
            subsystem,
        )?;
    }
    Ok(())
}

fn validate_machine(machine: &MachineDef, subsystem: &str) -> Result<(), ValidationError> {
    validate_positive(
        machine.rated_power_kw,
        &format!("'{}' rated_power_kw", machine.name),
        subsystem,
    )?;
    validate_curve(&machine.efficiency, &format!("'{}' efficiency", machine.name), subsystem)
}

fn validate_curve(curve: &CurveDef, field: &str, subsystem: &str) -> Result<(), ValidationError> {
    if curve.points.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: format!("{field} of '{subsystem}'"),
            value: "[]".to_string(),
            reason: "curve needs at least one point".to_string(),
        });
    }
    let mut xs: Vec<f64> = curve.points.iter().map(|p| p.x).collect();
    for (i, point) in curve.points.iter().enumerate() {
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(ValidationError::InvalidValue {
                field: format!("{field} of '{subsystem}' point {i}"),
                value: format!("({}, {})", point.x, point.y),
                reason: "must be finite".to_string(),
            });
        }
    }
    xs.sort_by(|a, b| a.partial_cmp(b).expect("finite x values"));
    for pair in xs.windows(2) {
        if pair[1] <= pair[0] {
            return Err(ValidationError::InvalidValue {
                field: format!("{field} of '{subsystem}'"),
                value: pair[0].to_string(),
                reason: "x values must be strictly increasing".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_positive(value: f64, field: &str, subsystem: &str) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("{field} of '{subsystem}'"),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }
    Ok(())
}
