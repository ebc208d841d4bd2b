//! Options that change how the parser treats the source.

/// Which instructions have an operand that names a label replaced by the
/// line of the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelSubstitution {
    /// Every operand that is exactly a label name is replaced. Operands of
    /// jumps and calls become jump targets and other operands become the
    /// line number (an integer literal).
    #[default]
    Everywhere,
    /// Only the operands of `JMP` and `CAL` instructions are replaced.
    JumpAndCallOnly,
}

#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub label_substitution: LabelSubstitution,
}

impl ParseOptions {
    pub fn with_label_substitution(mut self, label_substitution: LabelSubstitution) -> Self {
        self.label_substitution = label_substitution;
        self
    }
}
