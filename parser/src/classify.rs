//! Classifies operand text into a literal format.
//!
//! Classification is an ordered set of checks where the first match wins:
//! 1. an IEC type prefix (`INT#`, `BOOL#`, ...)
//! 2. a radix or time prefix (`16#`, `T#`, `TOD#`, ...)
//! 3. a quoted string
//! 4. an integer, a real or a real with exponent
//! 5. `TRUE` or `FALSE`
//! 6. a variable name
use std::borrow::Cow;

use dsl::common::{IecType, LiteralFormat, Operand, TypedOperand};
use ironil_problems::Problem;
use phf::phf_map;

use crate::lexer::{is_identifier, shape, Shape};
use crate::literals::{parse, LiteralError};
use crate::token::physical_marker;

/// Type prefixes keyed by the upper case name without underscores.
static IEC_TYPES: phf::Map<&'static str, IecType> = phf_map! {
    "BOOL" => IecType::Bool,
    "SINT" => IecType::Sint,
    "USINT" => IecType::Usint,
    "BYTE" => IecType::Byte,
    "INT" => IecType::Int,
    "UINT" => IecType::Uint,
    "WORD" => IecType::Word,
    "DINT" => IecType::Dint,
    "UDINT" => IecType::Udint,
    "DWORD" => IecType::Dword,
    "LINT" => IecType::Lint,
    "ULINT" => IecType::Ulint,
    "LWORD" => IecType::Lword,
    "REAL" => IecType::Real,
    "LREAL" => IecType::Lreal,
    "TIME" => IecType::Time,
    "DATE" => IecType::Date,
    "TOD" => IecType::Tod,
    "DT" => IecType::Dt,
    "CHAR" => IecType::Char,
    "WCHAR" => IecType::Wchar,
    "STRING" => IecType::String,
    "WSTRING" => IecType::Wstring,
    "POINTER" => IecType::Pointer,
    "TABLE" => IecType::Table,
    "USER" => IecType::User,
    "REDGE" => IecType::REdge,
    "FEDGE" => IecType::FEdge,
    "TIMER" => IecType::Timer,
    "VAR" => IecType::Var,
    "PHY" => IecType::Phy,
};

/// Radix and time prefixes keyed by the upper case name without underscores.
static FORMAT_PREFIXES: phf::Map<&'static str, LiteralFormat> = phf_map! {
    "2" => LiteralFormat::Base2,
    "8" => LiteralFormat::Base8,
    "16" => LiteralFormat::Base16,
    "T" => LiteralFormat::Duration,
    "TIME" => LiteralFormat::Duration,
    "D" => LiteralFormat::Date,
    "DATE" => LiteralFormat::Date,
    "TOD" => LiteralFormat::TimeOfDay,
    "TIMEOFDAY" => LiteralFormat::TimeOfDay,
    "DT" => LiteralFormat::DateAndTime,
    "DATEANDTIME" => LiteralFormat::DateAndTime,
    "PHY" => LiteralFormat::Physical,
};

/// Operand text with the format and type determined by classification.
/// The text no longer has the prefixes.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub iec_type: IecType,
    pub format: LiteralFormat,
    pub text: String,
}

impl Classified {
    fn new(iec_type: IecType, format: LiteralFormat, text: impl Into<String>) -> Self {
        Self {
            iec_type,
            format,
            text: text.into(),
        }
    }

    /// Creates a classification of prefixed literal text. The value of such
    /// literals is case insensitive and may have `_` separators.
    fn prefixed(iec_type: IecType, format: LiteralFormat, text: &str) -> Self {
        Self::new(
            iec_type,
            format,
            text.replace('_', "").to_ascii_uppercase(),
        )
    }
}

/// Types that determine the format of the literal that follows them.
fn fixed_format(iec_type: IecType) -> Option<LiteralFormat> {
    match iec_type {
        IecType::Bool => Some(LiteralFormat::Boolean),
        IecType::Phy => Some(LiteralFormat::Physical),
        IecType::Tod => Some(LiteralFormat::TimeOfDay),
        IecType::Dt => Some(LiteralFormat::DateAndTime),
        IecType::Time => Some(LiteralFormat::Duration),
        IecType::Date => Some(LiteralFormat::Date),
        _ => None,
    }
}

/// The type that a format prefix implies when there is no explicit type.
fn implied_type(format: LiteralFormat) -> IecType {
    match format {
        LiteralFormat::Duration => IecType::Time,
        LiteralFormat::Date => IecType::Date,
        LiteralFormat::TimeOfDay => IecType::Tod,
        LiteralFormat::DateAndTime => IecType::Dt,
        LiteralFormat::Physical => IecType::Phy,
        _ => IecType::None,
    }
}

/// Splits `PREFIX#rest` into the normalized prefix and the rest.
fn split_prefix(text: &str) -> Option<(String, &str)> {
    let (prefix, rest) = text.split_once('#')?;
    if prefix.is_empty() {
        return None;
    }
    Some((prefix.replace('_', "").to_ascii_uppercase(), rest))
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2
        && ((text.starts_with('\'') && text.ends_with('\''))
            || (text.starts_with('"') && text.ends_with('"')))
}

/// Classifies the operand text.
///
/// An empty operand is classified as having no format. Any other text that
/// is not recognized is an error.
pub fn classify(operand: &str) -> Result<Classified, LiteralError> {
    let operand = operand.trim();
    let operand: Cow<str> = if operand.starts_with('%') {
        Cow::Owned(physical_marker(operand))
    } else {
        Cow::Borrowed(operand)
    };
    let mut text: &str = &operand;

    if text.is_empty() {
        return Ok(Classified::new(IecType::None, LiteralFormat::None, ""));
    }

    let mut iec_type = IecType::None;

    if let Some((prefix, rest)) = split_prefix(text) {
        if let Some(explicit) = IEC_TYPES.get(prefix.as_str()) {
            if let Some(format) = fixed_format(*explicit) {
                return Ok(Classified::prefixed(*explicit, format, rest));
            }
            iec_type = *explicit;
            text = rest;
        }
    }

    if let Some((prefix, rest)) = split_prefix(text) {
        if let Some(format) = FORMAT_PREFIXES.get(prefix.as_str()) {
            if iec_type == IecType::None {
                iec_type = implied_type(*format);
            }
            return Ok(Classified::prefixed(iec_type, *format, rest));
        }
    }

    if is_quoted(text) {
        return Ok(Classified::new(iec_type, LiteralFormat::String, text));
    }

    if text.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
        let compact = text.replace('_', "");
        let format = match shape(&compact) {
            Some(Shape::Integer) => Some(LiteralFormat::Integer),
            Some(Shape::Real) => Some(LiteralFormat::Real),
            Some(Shape::RealExp) => Some(LiteralFormat::RealExp),
            _ => None,
        };
        if let Some(format) = format {
            return Ok(Classified::new(iec_type, format, compact));
        }
    }

    if text.eq_ignore_ascii_case("TRUE") || text.eq_ignore_ascii_case("FALSE") {
        if iec_type == IecType::None {
            iec_type = IecType::Bool;
        }
        return Ok(Classified::new(
            iec_type,
            LiteralFormat::Boolean,
            text.to_ascii_uppercase(),
        ));
    }

    if is_identifier(text) {
        return Ok(Classified::new(iec_type, LiteralFormat::Variable, text));
    }

    Err(LiteralError::new(
        Problem::UnrecognizedLiteral,
        format!("'{}' is not a recognized literal or variable", operand),
    ))
}

/// Rejects times of day that are not on a 24 hour clock.
fn check_clock(typed: &TypedOperand) -> Result<(), LiteralError> {
    let hour = match &typed.operand {
        Operand::TimeOfDay(time) => time.hour,
        Operand::DateAndTime(date_time) => date_time.time.hour,
        _ => return Ok(()),
    };
    if hour > 23 {
        return Err(LiteralError::new(
            Problem::LiteralOutOfRange,
            format!("Hour {} is not a time of day (at most 23)", hour),
        ));
    }
    Ok(())
}

/// Classifies and then parses the operand text.
pub fn classify_and_parse(operand: &str) -> Result<TypedOperand, LiteralError> {
    let classified = classify(operand)?;
    let typed = parse(&classified)?;
    check_clock(&typed)?;
    Ok(typed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dsl::common::{LocationPrefix, PhysicalAddress, PhysicalLocation, SizePrefix};
    use dsl::time::{Date, DateAndTime, Duration, TimeOfDay};
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("16#FF")]
    #[case("8#377")]
    #[case("2#11111111")]
    #[case("2#1111_1111")]
    #[case("16#ff")]
    #[case("255")]
    fn classify_and_parse_when_radix_then_canonical_integer(#[case] text: &str) {
        let typed = classify_and_parse(text).unwrap();
        assert_eq!(TypedOperand::untyped(Operand::Integer(255)), typed);
        assert_eq!(LiteralFormat::Integer, typed.literal_format());
    }

    #[rstest]
    #[case("16#FF", LiteralFormat::Base16)]
    #[case("8#377", LiteralFormat::Base8)]
    #[case("2#1", LiteralFormat::Base2)]
    #[case("1.5e3", LiteralFormat::RealExp)]
    #[case("1.5", LiteralFormat::Real)]
    #[case("-7", LiteralFormat::Integer)]
    #[case("'text'", LiteralFormat::String)]
    #[case("Motor.Speed", LiteralFormat::Variable)]
    #[case("T#5S", LiteralFormat::Duration)]
    #[case("TIME#5S", LiteralFormat::Duration)]
    #[case("D#2023-01-01", LiteralFormat::Date)]
    #[case("TOD#12:00:00", LiteralFormat::TimeOfDay)]
    #[case("TIME_OF_DAY#12:00:00", LiteralFormat::TimeOfDay)]
    #[case("DT#2023-01-01-12:00:00", LiteralFormat::DateAndTime)]
    #[case("DATE_AND_TIME#2023-01-01-12:00:00", LiteralFormat::DateAndTime)]
    #[case("%IX1.0", LiteralFormat::Physical)]
    #[case("", LiteralFormat::None)]
    fn classify_when_text_then_format(#[case] text: &str, #[case] format: LiteralFormat) {
        assert_eq!(format, classify(text).unwrap().format);
    }

    #[test]
    fn classify_and_parse_when_typed_integer_then_type_and_value() {
        assert_eq!(
            TypedOperand::new(IecType::Int, Operand::Integer(5)),
            classify_and_parse("INT#5").unwrap()
        );
        assert_eq!(
            TypedOperand::new(IecType::Udint, Operand::Integer(255)),
            classify_and_parse("udint#16#FF").unwrap()
        );
    }

    #[test]
    fn classify_and_parse_when_edge_type_then_underscore_ignored() {
        assert_eq!(
            IecType::REdge,
            classify_and_parse("R_EDGE#1").unwrap().iec_type
        );
    }

    #[test]
    fn classify_and_parse_when_typed_real_then_real() {
        assert_eq!(
            TypedOperand::new(IecType::Lreal, Operand::Real(1500.0)),
            classify_and_parse("LREAL#1.5E3").unwrap()
        );
    }

    #[rstest]
    #[case("TRUE", true)]
    #[case("false", false)]
    #[case("BOOL#1", true)]
    #[case("BOOL#FALSE", false)]
    fn classify_and_parse_when_boolean_then_bool_type(#[case] text: &str, #[case] value: bool) {
        assert_eq!(
            TypedOperand::new(IecType::Bool, Operand::Boolean(value)),
            classify_and_parse(text).unwrap()
        );
    }

    #[test]
    fn classify_and_parse_when_duration_then_time_type() {
        assert_eq!(
            TypedOperand::new(IecType::Time, Operand::Duration(Duration::new(0, 1, 30, 0))),
            classify_and_parse("t#90s").unwrap()
        );
    }

    #[test]
    fn classify_and_parse_when_time_of_day_then_tod_type() {
        assert_eq!(
            TypedOperand::new(
                IecType::Tod,
                Operand::TimeOfDay(TimeOfDay::new(23, 59, 59, 999))
            ),
            classify_and_parse("TOD#23:59:59.999").unwrap()
        );
    }

    #[rstest]
    #[case("TOD#24:00:00")]
    #[case("TOD#12:60:00")]
    #[case("DT#2023-01-01-24:00:00")]
    fn classify_and_parse_when_not_a_clock_time_then_out_of_range(#[case] text: &str) {
        assert_eq!(
            Problem::LiteralOutOfRange,
            classify_and_parse(text).unwrap_err().problem
        );
    }

    #[test]
    fn classify_and_parse_when_date_and_time_then_dt_type() {
        assert_eq!(
            TypedOperand::new(
                IecType::Dt,
                Operand::DateAndTime(DateAndTime::new(
                    Date::new(2023, 1, 31),
                    TimeOfDay::new(8, 0, 0, 0)
                ))
            ),
            classify_and_parse("DT#2023-01-31-08:00:00").unwrap()
        );
    }

    #[test]
    fn classify_and_parse_when_address_then_physical_type() {
        assert_eq!(
            TypedOperand::new(
                IecType::Phy,
                Operand::Physical(PhysicalAddress {
                    prefix: LocationPrefix::Output,
                    width: SizePrefix::Byte,
                    location: PhysicalLocation::Address(12),
                })
            ),
            classify_and_parse("%QB12").unwrap()
        );
    }

    #[test]
    fn classify_and_parse_when_variable_then_case_kept() {
        assert_eq!(
            TypedOperand::untyped(Operand::Variable("Start_Button".to_string())),
            classify_and_parse("Start_Button").unwrap()
        );
    }

    #[test]
    fn classify_and_parse_when_digit_grouping_then_integer() {
        assert_eq!(
            Operand::Integer(1000),
            classify_and_parse("1_000").unwrap().operand
        );
    }

    #[rstest]
    #[case("16#-FF")]
    #[case("INT#2#-101")]
    fn classify_and_parse_when_signed_radix_then_number_conversion(#[case] text: &str) {
        assert_eq!(
            Problem::NumberConversion,
            classify_and_parse(text).unwrap_err().problem
        );
    }

    #[rstest]
    #[case("@X")]
    #[case("FOO#1")]
    #[case("1E5")]
    #[case("X Y")]
    fn classify_when_unrecognized_then_error(#[case] text: &str) {
        assert_eq!(
            Problem::UnrecognizedLiteral,
            classify(text).unwrap_err().problem
        );
    }

    proptest! {
        #[test]
        fn classify_and_parse_when_hex_prefix_then_decimal_value(value in 0i64..=i64::MAX) {
            prop_assert_eq!(
                Operand::Integer(value),
                classify_and_parse(&format!("16#{:X}", value)).unwrap().operand
            );
        }
    }
}
