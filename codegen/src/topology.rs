//! Chooses the record shape for a parameter.

use epicsgen_dsl::param::{Conversion, Param};

/// The record-shape family generated for a parameter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Topology {
    /// Two options with keys 0 and 1 on a single-bit field.
    TwoState,
    /// Up to sixteen enumerated options.
    MultiState,
    /// A linear transform from raw integer to engineering units.
    ScaledAnalog,
    /// A raw integer with range bounds from the bit width.
    PlainInteger,
    /// A value computed from one or more other parameters. Wraps one of
    /// the other shapes.
    Derived,
}

/// Selects the topology for a parameter. A calculation expression makes the
/// parameter derived regardless of its underlying numeric shape.
pub fn select(param: &Param) -> Topology {
    if param.calc_read.is_some() || param.calc_write.is_some() {
        return Topology::Derived;
    }
    underlying(param)
}

/// Selects the value-encoding shape, ignoring any calculation wrapping.
/// Derived parameters use this for the record types of their read/write
/// nodes.
pub fn underlying(param: &Param) -> Topology {
    if !param.options.is_empty() {
        if param.options.len() == 2 && param.layout.width() == 1 {
            return Topology::TwoState;
        }
        return Topology::MultiState;
    }
    if param.scale.is_some() || param.offset_term.is_some() {
        return Topology::ScaledAnalog;
    }
    Topology::PlainInteger
}

/// Computes the raw value range for a bit width and signedness.
///
/// Sign-magnitude has two encodings of zero so its range is symmetric;
/// two's complement uses the remaining encoding for one more negative
/// value.
pub fn bounds(width: u8, conversion: Conversion) -> (i64, i64) {
    match conversion {
        Conversion::Unsigned => (0, (1i64 << width) - 1),
        Conversion::SignMagnitude => {
            let magnitude = (1i64 << (width - 1)) - 1;
            (-magnitude, magnitude)
        }
        Conversion::TwosComplement => (-(1i64 << (width - 1)), (1i64 << (width - 1)) - 1),
    }
}
