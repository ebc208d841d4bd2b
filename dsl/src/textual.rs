//! Textual rendering of parsed instructions.
//!
//! Operands render in IEC 61131-3 literal notation so that a listing can be
//! read back as IL (labels appear as their line number).
use std::fmt;

use crate::common::{
    Call, IecType, Instruction, LiteralFormat, Opcode, Operand, PhysicalAddress, PhysicalLocation,
    Program, VarBlock,
};
use crate::time::{Date, DateAndTime, Duration, TimeOfDay};

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for IecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for LiteralFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("T#")?;
        if self.total_milliseconds() == 0 {
            return f.write_str("0S");
        }
        if self.hour > 0 {
            write!(f, "{}H", self.hour)?;
        }
        if self.minute > 0 {
            write!(f, "{}M", self.minute)?;
        }
        if self.second > 0 {
            write!(f, "{}S", self.second)?;
        }
        if self.millisecond > 0 {
            write!(f, "{}MS", self.millisecond)?;
        }
        Ok(())
    }
}

fn write_clock(f: &mut fmt::Formatter<'_>, time: &TimeOfDay) -> fmt::Result {
    write!(
        f,
        "{:02}:{:02}:{:02}.{:03}",
        time.hour, time.minute, time.second, time.millisecond
    )
}

fn write_date(f: &mut fmt::Formatter<'_>, date: &Date) -> fmt::Result {
    write!(f, "{:04}-{:02}-{:02}", date.year, date.month, date.day)
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TOD#")?;
        write_clock(f, self)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("D#")?;
        write_date(f, self)
    }
}

impl fmt::Display for DateAndTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DT#")?;
        write_date(f, &self.date)?;
        f.write_str("-")?;
        write_clock(f, &self.time)
    }
}

impl fmt::Display for PhysicalAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}{}", self.prefix.letter(), self.width.letter())?;
        match self.location {
            PhysicalLocation::Bit { byte, bit } => write!(f, "{}.{}", byte, bit),
            PhysicalLocation::Address(address) => write!(f, "{}", address),
            PhysicalLocation::Real(value) => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function)?;
        for (index, arg) in self.arguments.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            if arg.is_formal() {
                let binding = if arg.output { "=>" } else { ":=" };
                write!(f, "{} {} ", arg.name, binding)?;
            }
            write!(f, "{}", arg.value.operand)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for VarBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, decl) in self.declarations.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            if decl.type_text.is_empty() {
                f.write_str(&decl.name)?;
            } else {
                write!(f, "{} : {}", decl.name, decl.type_text)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Boolean(true) => f.write_str("TRUE"),
            Operand::Boolean(false) => f.write_str("FALSE"),
            Operand::Integer(value) => write!(f, "{}", value),
            Operand::Real(value) => write!(f, "{:?}", value),
            Operand::Duration(value) => write!(f, "{}", value),
            Operand::Date(value) => write!(f, "{}", value),
            Operand::TimeOfDay(value) => write!(f, "{}", value),
            Operand::DateAndTime(value) => write!(f, "{}", value),
            Operand::Physical(value) => write!(f, "{}", value),
            Operand::String(value) => write!(f, "'{}'", value),
            Operand::Variable(name) => f.write_str(name),
            Operand::JumpTarget(line) => write!(f, "{}", line),
            Operand::Call(call) => write!(f, "{}", call),
            Operand::VarDeclaration(block) => write!(f, "{}", block),
            Operand::None => Ok(()),
        }
    }
}

impl Instruction {
    /// Returns the opcode as written in IL, including the modifiers, for
    /// example `JMPCN` or `AND(`.
    pub fn mnemonic(&self) -> String {
        let mut text = String::from(self.code.name());
        if self.conditional {
            text.push('C');
        }
        if self.negate {
            text.push('N');
        }
        if self.push {
            text.push('(');
        }
        text
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mnemonic())?;
        if !self.operand.is_none() {
            write!(f, " {}", self.operand)?;
        }
        Ok(())
    }
}

/// Returns one listing line for the instruction at the 1-indexed position,
/// for example `[0001] LDN X (type: NONE, format: VARIABLE, value: X)`.
pub fn listing_line(position: usize, instruction: &Instruction) -> String {
    format!(
        "[{:04}] {} (type: {}, format: {}, value: {})",
        position,
        instruction,
        instruction.iec_type,
        instruction.literal_format(),
        instruction.operand
    )
}

/// Returns the listing of the whole program, one line per instruction.
pub fn listing(program: &Program) -> Vec<String> {
    program
        .iter()
        .enumerate()
        .map(|(index, instruction)| listing_line(index + 1, instruction))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{CallArgument, LocationPrefix, SizePrefix, TypedOperand, VarDeclaration};

    #[test]
    fn listing_line_when_negated_load_then_matches_format() {
        let instruction = Instruction::new(Opcode::Ld, IecType::None, Operand::Variable("X".into()))
            .with_modifiers(false, true, false);

        assert_eq!(
            "[0001] LDN X (type: NONE, format: VARIABLE, value: X)",
            listing_line(1, &instruction)
        );
    }

    #[test]
    fn listing_line_when_end_then_empty_value() {
        assert_eq!(
            "[0012] END (type: NONE, format: NONE, value: )",
            listing_line(12, &Instruction::end())
        );
    }

    #[test]
    fn mnemonic_when_all_modifiers_then_suffixes_in_order() {
        let instruction = Instruction::new(Opcode::Jmp, IecType::None, Operand::JumpTarget(3))
            .with_modifiers(true, true, false);
        assert_eq!("JMPCN", instruction.mnemonic());

        let instruction = Instruction::new(Opcode::And, IecType::None, Operand::None)
            .with_modifiers(false, false, true);
        assert_eq!("AND(", instruction.mnemonic());
    }

    #[test]
    fn display_when_duration_then_omits_zero_fields() {
        assert_eq!("T#1H1M40S", Duration::new(1, 1, 40, 0).to_string());
        assert_eq!("T#0S", Duration::default().to_string());
        assert_eq!("T#250MS", Duration::new(0, 0, 0, 250).to_string());
    }

    #[test]
    fn display_when_date_and_time_then_padded() {
        let value = DateAndTime::new(Date::new(2023, 1, 5), TimeOfDay::new(7, 3, 9, 20));
        assert_eq!("DT#2023-01-05-07:03:09.020", value.to_string());
    }

    #[test]
    fn display_when_physical_then_percent_notation() {
        let bit = PhysicalAddress {
            prefix: LocationPrefix::Input,
            width: SizePrefix::Bit,
            location: PhysicalLocation::Bit { byte: 3, bit: 5 },
        };
        let byte = PhysicalAddress {
            prefix: LocationPrefix::Output,
            width: SizePrefix::Byte,
            location: PhysicalLocation::Address(12),
        };
        assert_eq!("%IX3.5", bit.to_string());
        assert_eq!("%QB12", byte.to_string());
    }

    #[test]
    fn display_when_call_then_bindings_rendered() {
        let call = Call {
            function: "MYFB".into(),
            formal: true,
            arguments: vec![
                CallArgument {
                    name: "A".into(),
                    output: false,
                    value: TypedOperand::untyped(Operand::Integer(1)),
                },
                CallArgument {
                    name: "Q".into(),
                    output: true,
                    value: TypedOperand::untyped(Operand::Variable("Y".into())),
                },
            ],
        };
        assert_eq!("MYFB(A := 1, Q => Y)", call.to_string());
    }

    #[test]
    fn display_when_var_block_then_name_and_type() {
        let block = VarBlock {
            output: false,
            declarations: vec![VarDeclaration::new("A", "INT"), VarDeclaration::new("B", "")],
        };
        assert_eq!("A : INT, B", block.to_string());
    }
}
