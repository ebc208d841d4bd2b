//! Parsers that convert classified literal text into operand values.
//!
//! See section 2.2 of IEC 61131-3.
use dsl::{
    common::{
        LiteralFormat, LocationPrefix, Operand, PhysicalAddress, PhysicalLocation, SizePrefix,
        TypedOperand,
    },
    diagnostic::{Diagnostic, Label},
    time::{Date, DateAndTime, Duration, TimeOfDay},
};
use ironil_problems::Problem;
use logos::Logos;

use crate::classify::Classified;
use crate::lexer::DurationSegment;

/// The largest hour that fits in the hour field of times.
const MAX_HOUR: u64 = 254;

/// A problem with a literal. The problem does not have a position because
/// literals are parsed independently of the line they are on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralError {
    pub problem: Problem,
    pub message: String,
}

impl LiteralError {
    pub fn new(problem: Problem, message: impl Into<String>) -> Self {
        Self {
            problem,
            message: message.into(),
        }
    }

    pub fn into_diagnostic(self, label: impl FnOnce(String) -> Label) -> Diagnostic {
        Diagnostic::problem(self.problem, label(self.message))
    }
}

fn malformed(text: &str, expected: &str) -> LiteralError {
    LiteralError::new(
        Problem::MalformedLiteral,
        format!("'{}' is not a valid {}", text, expected),
    )
}

fn out_of_range(text: &str, limit: &str) -> LiteralError {
    LiteralError::new(
        Problem::LiteralOutOfRange,
        format!("'{}' is out of range ({})", text, limit),
    )
}

fn not_a_number(text: &str) -> LiteralError {
    LiteralError::new(
        Problem::NumberConversion,
        format!("'{}' is not a number", text),
    )
}

/// Parses the classified text into the operand value for the format.
pub fn parse(classified: &Classified) -> Result<TypedOperand, LiteralError> {
    let text = classified.text.as_str();
    let operand = match classified.format {
        LiteralFormat::Boolean => Operand::Boolean(parse_boolean(text)?),
        LiteralFormat::Integer
        | LiteralFormat::Base2
        | LiteralFormat::Base8
        | LiteralFormat::Base16 => {
            let radix = classified.format.radix().unwrap_or(10);
            Operand::Integer(parse_integer(text, radix)?)
        }
        LiteralFormat::Real | LiteralFormat::RealExp => Operand::Real(parse_real(text)?),
        LiteralFormat::Duration => Operand::Duration(parse_duration(text)?),
        LiteralFormat::Date => Operand::Date(parse_date(text)?),
        LiteralFormat::TimeOfDay => Operand::TimeOfDay(parse_time_of_day(text)?),
        LiteralFormat::DateAndTime => Operand::DateAndTime(parse_date_and_time(text)?),
        LiteralFormat::Physical => Operand::Physical(parse_physical(text)?),
        LiteralFormat::String => Operand::String(parse_string(text)),
        LiteralFormat::Variable => Operand::Variable(text.to_string()),
        LiteralFormat::None => Operand::None,
        LiteralFormat::JumpTarget | LiteralFormat::Call | LiteralFormat::VarDeclaration => {
            return Err(malformed(text, "literal"))
        }
    };
    Ok(TypedOperand::new(classified.iec_type, operand))
}

pub fn parse_boolean(text: &str) -> Result<bool, LiteralError> {
    match text.to_ascii_uppercase().as_str() {
        "0" | "FALSE" => Ok(false),
        "1" | "TRUE" => Ok(true),
        _ => Err(malformed(text, "boolean")),
    }
}

/// Parses an integer in the radix. Only decimal integers may have a sign.
pub fn parse_integer(text: &str, radix: u32) -> Result<i64, LiteralError> {
    if radix != 10 && text.starts_with(['+', '-']) {
        return Err(not_a_number(text));
    }
    i64::from_str_radix(text, radix).map_err(|_| not_a_number(text))
}

pub fn parse_real(text: &str) -> Result<f64, LiteralError> {
    text.parse::<f64>().map_err(|_| not_a_number(text))
}

/// Parses the part of a duration after the `T#` prefix, for example
/// `1H30M` or `90S`. Segments may be in any order and repeated segments
/// add together. The result carries overflow of each field into the next
/// larger field.
pub fn parse_duration(text: &str) -> Result<Duration, LiteralError> {
    let mut total: u64 = 0;
    let mut segments = 0;

    for segment in DurationSegment::lexer(text) {
        let milliseconds = match segment.map_err(|_| malformed(text, "duration"))? {
            DurationSegment::Hours(value) => value.saturating_mul(3_600_000),
            DurationSegment::Minutes(value) => value.saturating_mul(60_000),
            DurationSegment::Seconds(value) => value.saturating_mul(1_000),
            DurationSegment::Milliseconds(value) => value,
        };
        total = total.saturating_add(milliseconds);
        segments += 1;
    }

    if segments == 0 {
        return Err(malformed(text, "duration"));
    }

    let hour = total / 3_600_000;
    if hour > MAX_HOUR {
        return Err(out_of_range(text, "at most 254 hours"));
    }

    Ok(Duration::new(
        hour as u8,
        (total / 60_000 % 60) as u8,
        (total / 1_000 % 60) as u8,
        (total % 1_000) as u16,
    ))
}

fn parse_field(text: &str) -> Result<u64, LiteralError> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_a_number(text));
    }
    text.parse::<u64>().map_err(|_| not_a_number(text))
}

/// Parses a time of day `HH:MM:SS` with optional milliseconds after the
/// `.` (`.5` is 5 milliseconds).
pub fn parse_time_of_day(text: &str) -> Result<TimeOfDay, LiteralError> {
    let fields: Vec<&str> = text.split(':').collect();
    let [hour, minute, second] = fields.as_slice() else {
        return Err(malformed(text, "time of day"));
    };

    let (second, fraction) = match second.split_once('.') {
        Some((second, fraction)) => (second, fraction),
        None => (*second, ""),
    };

    let hour = parse_field(hour)?;
    let minute = parse_field(minute)?;
    let second = parse_field(second)?;
    let millisecond = if fraction.is_empty() {
        0
    } else {
        parse_field(fraction)?
    };

    if hour > MAX_HOUR {
        return Err(out_of_range(text, "hour at most 254"));
    }
    if minute > 59 {
        return Err(out_of_range(text, "minute at most 59"));
    }
    if second > 59 {
        return Err(out_of_range(text, "second at most 59"));
    }
    if millisecond > 999 {
        return Err(out_of_range(text, "millisecond at most 999"));
    }

    Ok(TimeOfDay::new(
        hour as u8,
        minute as u8,
        second as u8,
        millisecond as u16,
    ))
}

/// Parses a date `YYYY-MM-DD`. The day is not checked against the month.
pub fn parse_date(text: &str) -> Result<Date, LiteralError> {
    let fields: Vec<&str> = text.split('-').collect();
    let [year, month, day] = fields.as_slice() else {
        return Err(malformed(text, "date"));
    };

    let year = parse_field(year)?;
    let month = parse_field(month)?;
    let day = parse_field(day)?;

    if !(1..=u16::MAX as u64).contains(&year) {
        return Err(out_of_range(text, "year from 1 to 65535"));
    }
    if !(1..=12).contains(&month) {
        return Err(out_of_range(text, "month from 1 to 12"));
    }
    if !(1..=31).contains(&day) {
        return Err(out_of_range(text, "day from 1 to 31"));
    }

    Ok(Date::new(year as u16, month as u8, day as u8))
}

/// Parses a date and time `YYYY-MM-DD-HH:MM:SS[.fff]`.
pub fn parse_date_and_time(text: &str) -> Result<DateAndTime, LiteralError> {
    if text.as_bytes().get(10) != Some(&b'-') {
        return Err(malformed(text, "date and time"));
    }
    let date = parse_date(&text[..10])?;
    let time = parse_time_of_day(&text[11..])?;
    Ok(DateAndTime::new(date, time))
}

/// Parses a directly represented variable without the `%` (for example
/// `IX3.5`, `QB12` or `MD1.5`).
pub fn parse_physical(text: &str) -> Result<PhysicalAddress, LiteralError> {
    let mut chars = text.chars();
    let prefix = LocationPrefix::try_from(chars.next())
        .map_err(|_| malformed(text, "physical address"))?;

    let rest = chars.as_str();
    let (width, address) = match SizePrefix::try_from(rest.chars().next()) {
        Ok(width) => (width, &rest[1..]),
        Err(_) => (SizePrefix::Bit, rest),
    };

    if address.is_empty() {
        return Err(malformed(text, "physical address"));
    }

    let location = match width {
        SizePrefix::Bit => {
            let (byte, bit) = address
                .split_once('.')
                .ok_or_else(|| malformed(text, "bit address"))?;
            PhysicalLocation::Bit {
                byte: parse_address(byte)?,
                bit: parse_address(bit)?,
            }
        }
        SizePrefix::Byte | SizePrefix::Word => PhysicalLocation::Address(parse_address(address)?),
        SizePrefix::Double => PhysicalLocation::Real(parse_real(address)?),
    };

    Ok(PhysicalAddress {
        prefix,
        width,
        location,
    })
}

fn parse_address(text: &str) -> Result<u32, LiteralError> {
    let value = parse_field(text)?;
    u32::try_from(value).map_err(|_| out_of_range(text, "address at most 4294967295"))
}

/// Removes the quotes from a quoted string and trims the content.
pub fn parse_string(text: &str) -> String {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) if first == last && (first == '\'' || first == '"') => {
            chars.as_str().trim().to_string()
        }
        _ => text.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", false)]
    #[case("FALSE", false)]
    #[case("1", true)]
    #[case("true", true)]
    fn parse_boolean_when_valid_then_value(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(Ok(expected), parse_boolean(text));
    }

    #[test]
    fn parse_boolean_when_other_then_malformed() {
        assert_eq!(
            Problem::MalformedLiteral,
            parse_boolean("2").unwrap_err().problem
        );
    }

    #[rstest]
    #[case("FF", 16)]
    #[case("377", 8)]
    #[case("11111111", 2)]
    #[case("255", 10)]
    fn parse_integer_when_radix_then_255(#[case] text: &str, #[case] radix: u32) {
        assert_eq!(Ok(255), parse_integer(text, radix));
    }

    #[rstest]
    #[case("-FF", 16)]
    #[case("+377", 8)]
    #[case("-1", 2)]
    fn parse_integer_when_signed_radix_then_number_conversion(
        #[case] text: &str,
        #[case] radix: u32,
    ) {
        assert_eq!(
            Problem::NumberConversion,
            parse_integer(text, radix).unwrap_err().problem
        );
    }

    #[test]
    fn parse_integer_when_negative_decimal_then_value() {
        assert_eq!(Ok(-42), parse_integer("-42", 10));
    }

    #[test]
    fn parse_integer_when_invalid_digit_then_number_conversion() {
        assert_eq!(
            Problem::NumberConversion,
            parse_integer("129", 8).unwrap_err().problem
        );
    }

    #[rstest]
    #[case("90S", Duration::new(0, 1, 30, 0))]
    #[case("3700S", Duration::new(1, 1, 40, 0))]
    #[case("1H30M", Duration::new(1, 30, 0, 0))]
    #[case("30M1H", Duration::new(1, 30, 0, 0))]
    #[case("1500MS", Duration::new(0, 0, 1, 500))]
    #[case("1S1S", Duration::new(0, 0, 2, 0))]
    #[case("254H", Duration::new(254, 0, 0, 0))]
    fn parse_duration_when_valid_then_carried(#[case] text: &str, #[case] expected: Duration) {
        assert_eq!(Ok(expected), parse_duration(text));
    }

    #[rstest]
    #[case("")]
    #[case("15")]
    #[case("1.5S")]
    #[case("1X")]
    fn parse_duration_when_malformed_then_error(#[case] text: &str) {
        assert_eq!(
            Problem::MalformedLiteral,
            parse_duration(text).unwrap_err().problem
        );
    }

    #[test]
    fn parse_duration_when_too_many_hours_then_out_of_range() {
        assert_eq!(
            Problem::LiteralOutOfRange,
            parse_duration("255H").unwrap_err().problem
        );
    }

    #[rstest]
    #[case("23:59:59.999", TimeOfDay::new(23, 59, 59, 999))]
    #[case("12:30:00", TimeOfDay::new(12, 30, 0, 0))]
    #[case("12:30:00.5", TimeOfDay::new(12, 30, 0, 5))]
    #[case("12:30:00.05", TimeOfDay::new(12, 30, 0, 5))]
    #[case("01:02:03.040", TimeOfDay::new(1, 2, 3, 40))]
    fn parse_time_of_day_when_valid_then_value(#[case] text: &str, #[case] expected: TimeOfDay) {
        assert_eq!(Ok(expected), parse_time_of_day(text));
    }

    #[rstest]
    #[case("12:60:00", Problem::LiteralOutOfRange)]
    #[case("12:00:60", Problem::LiteralOutOfRange)]
    #[case("255:00:00", Problem::LiteralOutOfRange)]
    #[case("12:00:00.1234", Problem::LiteralOutOfRange)]
    #[case("12:00:00.1000", Problem::LiteralOutOfRange)]
    #[case("12:00", Problem::MalformedLiteral)]
    #[case("12:00:00:00", Problem::MalformedLiteral)]
    #[case("AB:00:00", Problem::NumberConversion)]
    fn parse_time_of_day_when_invalid_then_error(#[case] text: &str, #[case] problem: Problem) {
        assert_eq!(problem, parse_time_of_day(text).unwrap_err().problem);
    }

    #[test]
    fn parse_date_when_valid_then_value() {
        assert_eq!(Ok(Date::new(2023, 2, 31)), parse_date("2023-02-31"));
    }

    #[rstest]
    #[case("2023-13-01", Problem::LiteralOutOfRange)]
    #[case("2023-00-01", Problem::LiteralOutOfRange)]
    #[case("2023-01-32", Problem::LiteralOutOfRange)]
    #[case("0000-01-01", Problem::LiteralOutOfRange)]
    #[case("2023-01", Problem::MalformedLiteral)]
    fn parse_date_when_invalid_then_error(#[case] text: &str, #[case] problem: Problem) {
        assert_eq!(problem, parse_date(text).unwrap_err().problem);
    }

    #[test]
    fn parse_date_and_time_when_valid_then_both_parts() {
        assert_eq!(
            Ok(DateAndTime::new(
                Date::new(2023, 1, 31),
                TimeOfDay::new(12, 30, 15, 25)
            )),
            parse_date_and_time("2023-01-31-12:30:15.25")
        );
    }

    #[test]
    fn parse_date_and_time_when_no_separator_then_malformed() {
        assert_eq!(
            Problem::MalformedLiteral,
            parse_date_and_time("2023-01-31 12:30:15").unwrap_err().problem
        );
    }

    #[test]
    fn parse_physical_when_bit_then_byte_and_bit() {
        assert_eq!(
            Ok(PhysicalAddress {
                prefix: LocationPrefix::Input,
                width: SizePrefix::Bit,
                location: PhysicalLocation::Bit { byte: 3, bit: 5 },
            }),
            parse_physical("IX3.5")
        );
    }

    #[test]
    fn parse_physical_when_no_width_then_bit() {
        assert_eq!(
            PhysicalLocation::Bit { byte: 0, bit: 1 },
            parse_physical("Q0.1").unwrap().location
        );
    }

    #[test]
    fn parse_physical_when_byte_then_address() {
        assert_eq!(
            Ok(PhysicalAddress {
                prefix: LocationPrefix::Output,
                width: SizePrefix::Byte,
                location: PhysicalLocation::Address(12),
            }),
            parse_physical("QB12")
        );
    }

    #[test]
    fn parse_physical_when_double_then_real() {
        assert_eq!(
            PhysicalLocation::Real(1.5),
            parse_physical("MD1.5").unwrap().location
        );
    }

    #[rstest]
    #[case("ZX1.0", Problem::MalformedLiteral)]
    #[case("IX3", Problem::MalformedLiteral)]
    #[case("IW", Problem::MalformedLiteral)]
    #[case("IW1.2", Problem::NumberConversion)]
    fn parse_physical_when_invalid_then_error(#[case] text: &str, #[case] problem: Problem) {
        assert_eq!(problem, parse_physical(text).unwrap_err().problem);
    }

    #[rstest]
    #[case("'hello'", "hello")]
    #[case("\" padded \"", "padded")]
    #[case("''", "")]
    fn parse_string_when_quoted_then_content(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(expected, parse_string(text));
    }

    proptest! {
        #[test]
        fn parse_integer_when_any_radix_then_same_value(value in 0i64..=i64::MAX) {
            prop_assert_eq!(Ok(value), parse_integer(&format!("{:X}", value), 16));
            prop_assert_eq!(Ok(value), parse_integer(&format!("{:o}", value), 8));
            prop_assert_eq!(Ok(value), parse_integer(&format!("{:b}", value), 2));
        }

        #[test]
        fn parse_duration_when_seconds_then_fields_below_unit(seconds in 0u64..900_000) {
            let duration = parse_duration(&format!("{}S", seconds)).unwrap();
            prop_assert!(duration.minute < 60 && duration.second < 60);
            prop_assert_eq!(seconds * 1_000, duration.total_milliseconds());
        }
    }
}
