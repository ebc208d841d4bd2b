//! Parser for `VAR` and `VAR_OUTPUT` declaration blocks.
//!
//! The loader has already rewritten the block so that each group of
//! declarations is a single word, for example `A,B=INT C=BOOL:=TRUE`.
use dsl::common::{VarBlock, VarDeclaration};

/// Parses the declarations of a block. The text may end with `END_VAR`
/// (in any case), which is ignored.
pub fn parse_var_block(text: &str, output: bool) -> VarBlock {
    let mut declarations = vec![];

    for group in text.split_whitespace() {
        if group.eq_ignore_ascii_case("END_VAR") {
            break;
        }

        match group.split_once('=') {
            Some((names, type_text)) => {
                declarations.extend(
                    names
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(|name| VarDeclaration::new(name, type_text)),
                );
            }
            None => declarations.push(VarDeclaration::new(group, "")),
        }
    }

    VarBlock {
        output,
        declarations,
    }
}
