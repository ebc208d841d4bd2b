//! Instruction List program elements.
//!
//! A parsed program is a flat sequence of [`Instruction`]s. Each instruction
//! has an opcode, the modifiers of the opcode and one operand. The operand is
//! a sum type so that exactly one kind of value is ever present.
use serde::{Serialize, Serializer};

use crate::time::{Date, DateAndTime, Duration, TimeOfDay};

/// The name given to call arguments that are bound by position rather than
/// by parameter name.
pub const NOT_FORMAL: &str = "NOT_FORMAL";

/// Instruction operators.
///
/// See section 3.2.2 (table 52).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Opcode {
    /// Loads the (negated) value of the operand into the accumulator.
    Ld,
    /// Stores the (negated) accumulator into the operand.
    St,
    /// Sets the Boolean operand when the accumulator is TRUE.
    S,
    /// Resets the Boolean operand when the accumulator is TRUE.
    R,
    And,
    Or,
    Xor,
    Not,
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Ge,
    Eq,
    Ne,
    Le,
    Lt,
    /// Jump to a label.
    Jmp,
    /// Call of a function block or program.
    Cal,
    /// Return from the function or function block.
    Ret,
    /// Evaluates the deferred operation (the closing parenthesis).
    Pop,
    /// Variable declaration block.
    Var,
    /// Program end. Always the last instruction of a program.
    End,
}

impl Opcode {
    pub fn name(&self) -> &'static str {
        match self {
            Opcode::Ld => "LD",
            Opcode::St => "ST",
            Opcode::S => "S",
            Opcode::R => "R",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Xor => "XOR",
            Opcode::Not => "NOT",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Gt => "GT",
            Opcode::Ge => "GE",
            Opcode::Eq => "EQ",
            Opcode::Ne => "NE",
            Opcode::Le => "LE",
            Opcode::Lt => "LT",
            Opcode::Jmp => "JMP",
            Opcode::Cal => "CAL",
            Opcode::Ret => "RET",
            Opcode::Pop => "POP",
            Opcode::Var => "VAR",
            Opcode::End => "END",
        }
    }
}

/// Elementary data type names that may prefix a typed literal (for
/// example `INT#5`).
///
/// See section 2.3.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IecType {
    /// The operand does not have a type.
    #[default]
    None,
    Bool,
    Sint,
    Usint,
    Byte,
    Int,
    Uint,
    Word,
    Dint,
    Udint,
    Dword,
    Lint,
    Ulint,
    Lword,
    Real,
    Lreal,
    Time,
    Date,
    Tod,
    Dt,
    Char,
    Wchar,
    String,
    Wstring,
    Pointer,
    Table,
    User,
    REdge,
    FEdge,
    Timer,
    Var,
    Phy,
}

impl IecType {
    /// Returns the name of the type as written before the `#` of a typed
    /// literal.
    pub fn name(&self) -> &'static str {
        match self {
            IecType::None => "NONE",
            IecType::Bool => "BOOL",
            IecType::Sint => "SINT",
            IecType::Usint => "USINT",
            IecType::Byte => "BYTE",
            IecType::Int => "INT",
            IecType::Uint => "UINT",
            IecType::Word => "WORD",
            IecType::Dint => "DINT",
            IecType::Udint => "UDINT",
            IecType::Dword => "DWORD",
            IecType::Lint => "LINT",
            IecType::Ulint => "ULINT",
            IecType::Lword => "LWORD",
            IecType::Real => "REAL",
            IecType::Lreal => "LREAL",
            IecType::Time => "TIME",
            IecType::Date => "DATE",
            IecType::Tod => "TOD",
            IecType::Dt => "DT",
            IecType::Char => "CHAR",
            IecType::Wchar => "WCHAR",
            IecType::String => "STRING",
            IecType::Wstring => "WSTRING",
            IecType::Pointer => "POINTER",
            IecType::Table => "TABLE",
            IecType::User => "USER",
            IecType::REdge => "R_EDGE",
            IecType::FEdge => "F_EDGE",
            IecType::Timer => "TIMER",
            IecType::Var => "VAR",
            IecType::Phy => "PHY",
        }
    }
}

impl Serialize for IecType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// The shape of an operand as determined by classification.
///
/// The radix and exponential formats only exist between classification and
/// parsing. A parsed [`Operand`] always reports the canonical format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LiteralFormat {
    Boolean,
    Duration,
    Date,
    TimeOfDay,
    DateAndTime,
    Integer,
    Real,
    RealExp,
    Base2,
    Base8,
    Base16,
    Physical,
    String,
    Variable,
    JumpTarget,
    Call,
    VarDeclaration,
    None,
}

impl LiteralFormat {
    pub fn name(&self) -> &'static str {
        match self {
            LiteralFormat::Boolean => "BOOLEAN",
            LiteralFormat::Duration => "DURATION",
            LiteralFormat::Date => "DATE",
            LiteralFormat::TimeOfDay => "TIME_OF_DAY",
            LiteralFormat::DateAndTime => "DATE_AND_TIME",
            LiteralFormat::Integer => "INTEGER",
            LiteralFormat::Real => "REAL",
            LiteralFormat::RealExp => "REAL_EXP",
            LiteralFormat::Base2 => "BASE2",
            LiteralFormat::Base8 => "BASE8",
            LiteralFormat::Base16 => "BASE16",
            LiteralFormat::Physical => "PHYSICAL",
            LiteralFormat::String => "STRING",
            LiteralFormat::Variable => "VARIABLE",
            LiteralFormat::JumpTarget => "JUMP_TARGET",
            LiteralFormat::Call => "CALL",
            LiteralFormat::VarDeclaration => "VAR_DECLARATION",
            LiteralFormat::None => "NONE",
        }
    }

    /// Returns the radix for the integer formats.
    pub fn radix(&self) -> Option<u32> {
        match self {
            LiteralFormat::Integer => Some(10),
            LiteralFormat::Base2 => Some(2),
            LiteralFormat::Base8 => Some(8),
            LiteralFormat::Base16 => Some(16),
            _ => None,
        }
    }
}

/// Location prefix for directly represented variables.
///
/// See section 2.4.1.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LocationPrefix {
    /// Input location (`I`)
    Input,
    /// Output location (`Q`)
    Output,
    /// Memory location (`M`)
    Memory,
}

impl LocationPrefix {
    pub fn letter(&self) -> char {
        match self {
            LocationPrefix::Input => 'I',
            LocationPrefix::Output => 'Q',
            LocationPrefix::Memory => 'M',
        }
    }
}

impl TryFrom<Option<char>> for LocationPrefix {
    type Error = &'static str;

    fn try_from(value: Option<char>) -> Result<Self, Self::Error> {
        match value {
            Some('I') => Ok(LocationPrefix::Input),
            Some('Q') => Ok(LocationPrefix::Output),
            Some('M') => Ok(LocationPrefix::Memory),
            _ => Err("Value must be one of I, Q, M"),
        }
    }
}

/// Size prefix for directly represented variables. Defines how many bits
/// are associated with the variable.
///
/// See section 2.4.1.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SizePrefix {
    /// Single bit size (`X` or no size)
    Bit,
    /// 8-bit size (`B`)
    Byte,
    /// 16-bit size (`W`)
    Word,
    /// 32-bit size (`D`)
    Double,
}

impl SizePrefix {
    pub fn letter(&self) -> char {
        match self {
            SizePrefix::Bit => 'X',
            SizePrefix::Byte => 'B',
            SizePrefix::Word => 'W',
            SizePrefix::Double => 'D',
        }
    }
}

impl TryFrom<Option<char>> for SizePrefix {
    type Error = &'static str;

    fn try_from(value: Option<char>) -> Result<Self, Self::Error> {
        match value {
            Some('X') => Ok(SizePrefix::Bit),
            Some('B') => Ok(SizePrefix::Byte),
            Some('W') => Ok(SizePrefix::Word),
            Some('D') => Ok(SizePrefix::Double),
            _ => Err("Value must be one of X, B, W, D"),
        }
    }
}

/// The address part of a directly represented variable. Which variant is
/// present depends on the size prefix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalLocation {
    /// Bit addresses have a byte index and a bit index (`%IX3.5`).
    Bit { byte: u32, bit: u32 },
    /// Byte and word addresses have a single index (`%QB12`).
    Address(u32),
    /// Double addresses are written as a floating value (`%MD1.5`).
    Real(f64),
}

/// A directly represented variable such as `%IX3.5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhysicalAddress {
    pub prefix: LocationPrefix,
    pub width: SizePrefix,
    pub location: PhysicalLocation,
}

/// An operand together with the IEC type given by its typed literal prefix
/// (if any).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypedOperand {
    pub iec_type: IecType,
    pub operand: Operand,
}

impl TypedOperand {
    pub fn new(iec_type: IecType, operand: Operand) -> Self {
        Self { iec_type, operand }
    }

    pub fn untyped(operand: Operand) -> Self {
        Self {
            iec_type: IecType::None,
            operand,
        }
    }

    pub fn literal_format(&self) -> LiteralFormat {
        self.operand.literal_format()
    }
}

/// One argument of a call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallArgument {
    /// The parameter name, or [`NOT_FORMAL`] for positional arguments.
    pub name: String,
    /// True when the argument is bound with `=>` (an output).
    pub output: bool,
    pub value: TypedOperand,
}

impl CallArgument {
    pub fn is_formal(&self) -> bool {
        self.name != NOT_FORMAL
    }
}

/// A call of a function block (`CAL TON1(IN := X, PT := T#5S)`).
///
/// See section 3.2.3.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Call {
    /// The name of the called function block instance.
    pub function: String,
    /// True when the arguments are bound by parameter name.
    pub formal: bool,
    /// Arguments in the order they appear in the source.
    pub arguments: Vec<CallArgument>,
}

/// A single declared variable. Several variables may share the same type
/// text when declared together (`A, B : INT`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarDeclaration {
    pub name: String,
    /// The type and initializer text (for example `INT` or `INT:=5`).
    pub type_text: String,
}

impl VarDeclaration {
    pub fn new(name: impl Into<String>, type_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_text: type_text.into(),
        }
    }
}

/// A `VAR` or `VAR_OUTPUT` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarBlock {
    /// True for `VAR_OUTPUT`.
    pub output: bool,
    pub declarations: Vec<VarDeclaration>,
}

/// The value of an instruction operand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operand {
    Boolean(bool),
    /// Integers in any radix are kept as the value only.
    Integer(i64),
    /// Real values in plain and exponential notation.
    Real(f64),
    Duration(Duration),
    Date(Date),
    TimeOfDay(TimeOfDay),
    DateAndTime(DateAndTime),
    Physical(PhysicalAddress),
    String(String),
    Variable(String),
    /// The 1-indexed line of a jump or call target label.
    JumpTarget(u32),
    Call(Call),
    VarDeclaration(VarBlock),
    None,
}

impl Operand {
    /// Returns the canonical format of the operand.
    pub fn literal_format(&self) -> LiteralFormat {
        match self {
            Operand::Boolean(_) => LiteralFormat::Boolean,
            Operand::Integer(_) => LiteralFormat::Integer,
            Operand::Real(_) => LiteralFormat::Real,
            Operand::Duration(_) => LiteralFormat::Duration,
            Operand::Date(_) => LiteralFormat::Date,
            Operand::TimeOfDay(_) => LiteralFormat::TimeOfDay,
            Operand::DateAndTime(_) => LiteralFormat::DateAndTime,
            Operand::Physical(_) => LiteralFormat::Physical,
            Operand::String(_) => LiteralFormat::String,
            Operand::Variable(_) => LiteralFormat::Variable,
            Operand::JumpTarget(_) => LiteralFormat::JumpTarget,
            Operand::Call(_) => LiteralFormat::Call,
            Operand::VarDeclaration(_) => LiteralFormat::VarDeclaration,
            Operand::None => LiteralFormat::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Operand::None)
    }
}

/// One parsed IL statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instruction {
    pub code: Opcode,
    /// The `C` modifier: execute only when the accumulator is TRUE.
    pub conditional: bool,
    /// The `N` modifier: negate the operand (or the condition).
    pub negate: bool,
    /// The `(` modifier: defer the operation until the matching `)`.
    pub push: bool,
    pub iec_type: IecType,
    pub operand: Operand,
}

impl Instruction {
    /// Creates an instruction without modifiers.
    pub fn new(code: Opcode, iec_type: IecType, operand: Operand) -> Self {
        Self {
            code,
            conditional: false,
            negate: false,
            push: false,
            iec_type,
            operand,
        }
    }

    /// The instruction that terminates every program.
    pub fn end() -> Self {
        Instruction::new(Opcode::End, IecType::None, Operand::None)
    }

    pub fn with_modifiers(mut self, conditional: bool, negate: bool, push: bool) -> Self {
        self.conditional = conditional;
        self.negate = negate;
        self.push = push;
        self
    }

    pub fn literal_format(&self) -> LiteralFormat {
        self.operand.literal_format()
    }
}

/// A parsed program. The position of an instruction is its index; jump
/// targets refer to the 1-indexed position.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Program {
    pub instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Returns the number of instructions including the terminating `END`.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// Returns the instruction at the 1-indexed line, which is how jump
    /// targets address instructions.
    pub fn at_line(&self, line: u32) -> Option<&Instruction> {
        (line as usize)
            .checked_sub(1)
            .and_then(|index| self.instructions.get(index))
    }
}

impl std::ops::Index<usize> for Program {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Self::Output {
        &self.instructions[index]
    }
}

impl IntoIterator for Program {
    type Item = Instruction;
    type IntoIter = std::vec::IntoIter<Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.into_iter()
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}
