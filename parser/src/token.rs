//! Splits a line into the opcode and the operand.

/// The opcode and operand text of one instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The opcode in upper case, including modifiers (`JMPCN`, `AND(`).
    pub opcode: String,
    /// The trimmed operand text. Empty if the instruction has no operand.
    pub operand: String,
}

/// Splits the line on the first whitespace into the opcode and the operand.
pub fn normalize(text: &str) -> Token {
    let text = text.trim();
    let (opcode, operand) = match text.find(char::is_whitespace) {
        Some(index) => (&text[..index], text[index..].trim()),
        None => (text, ""),
    };

    Token {
        opcode: opcode.to_ascii_uppercase(),
        operand: physical_marker(operand),
    }
}

/// Replaces the `%` that starts a directly represented variable with the
/// `PHY#` type prefix so that addresses classify like other typed literals.
pub fn physical_marker(operand: &str) -> String {
    match operand.strip_prefix('%') {
        Some(address) => format!("PHY#{}", address),
        None => operand.to_string(),
    }
}
