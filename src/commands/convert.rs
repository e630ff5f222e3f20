//! `//convert`: unit conversion between length, mass, and temperature units.

use super::{CommandDef, ParamKind, ParamSpec};
use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Length,
    Mass,
    Temperature,
}

/// (unit, dimension, factor to the dimension's base unit)
const LINEAR_UNITS: &[(&str, Dimension, f64)] = &[
    ("m", Dimension::Length, 1.0),
    ("km", Dimension::Length, 1000.0),
    ("cm", Dimension::Length, 0.01),
    ("mm", Dimension::Length, 0.001),
    ("mi", Dimension::Length, 1609.344),
    ("yd", Dimension::Length, 0.9144),
    ("ft", Dimension::Length, 0.3048),
    ("in", Dimension::Length, 0.0254),
    ("kg", Dimension::Mass, 1.0),
    ("g", Dimension::Mass, 0.001),
    ("mg", Dimension::Mass, 0.000_001),
    ("lb", Dimension::Mass, 0.453_592_37),
    ("oz", Dimension::Mass, 0.028_349_523_125),
];

fn linear_unit(unit: &str) -> Option<(Dimension, f64)> {
    LINEAR_UNITS
        .iter()
        .find(|(name, _, _)| *name == unit)
        .map(|(_, dim, factor)| (*dim, *factor))
}

fn to_kelvin(value: f64, unit: &str) -> Option<f64> {
    match unit {
        "c" => Some(value + 273.15),
        "f" => Some((value - 32.0) * 5.0 / 9.0 + 273.15),
        "k" => Some(value),
        _ => None,
    }
}

fn from_kelvin(kelvin: f64, unit: &str) -> Option<f64> {
    match unit {
        "c" => Some(kelvin - 273.15),
        "f" => Some((kelvin - 273.15) * 9.0 / 5.0 + 32.0),
        "k" => Some(kelvin),
        _ => None,
    }
}

fn dimension_of(unit: &str) -> Option<Dimension> {
    if to_kelvin(0.0, unit).is_some() {
        return Some(Dimension::Temperature);
    }
    linear_unit(unit).map(|(dim, _)| dim)
}

/// Convert `value` between two units of the same dimension (case-insensitive).
pub fn convert_units(value: f64, from_unit: &str, to_unit: &str) -> Option<f64> {
    let from = from_unit.trim().to_ascii_lowercase();
    let to = to_unit.trim().to_ascii_lowercase();
    let dimension = dimension_of(&from)?;
    if dimension_of(&to)? != dimension {
        return None;
    }
    if dimension == Dimension::Temperature {
        return from_kelvin(to_kelvin(value, &from)?, &to);
    }
    let (_, from_factor) = linear_unit(&from)?;
    let (_, to_factor) = linear_unit(&to)?;
    Some(value * from_factor / to_factor)
}

pub fn definition() -> CommandDef {
    CommandDef::new("convert")
        .description("Convert units")
        .usage("//convert <value> <from_unit> <to_unit>")
        .param(ParamSpec::required("value", ParamKind::Float))
        .param(ParamSpec::required("from_unit", ParamKind::Str))
        .param(ParamSpec::required("to_unit", ParamKind::Str))
        .handler(|inv| {
            let value = inv.args.float("value").unwrap_or_default();
            let from = inv.args.str("from_unit").unwrap_or_default();
            let to = inv.args.str("to_unit").unwrap_or_default();
            let result = convert_units(value, from, to).ok_or_else(|| {
                CommandError::new(format!("Conversion from {from} to {to} not supported"))
            })?;
            Ok(Some(format!("{value} {from} = {result:.4} {to}")))
        })
}
