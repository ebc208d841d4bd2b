//! Problem codes for IronIL. The definitions are generated from
//! `resources/problem-codes.csv` by the build script so that the codes,
//! categories and messages live in a single table.

include!(concat!(env!("OUT_DIR"), "/problems.rs"));

#[cfg(test)]
mod tests {
    use super::Problem;

    #[test]
    fn code_when_open_comment_then_returns_code() {
        assert_eq!("P0001", Problem::OpenComment.code());
    }

    #[test]
    fn category_when_call_binding_mismatch_then_call_binding() {
        assert_eq!("CallBinding", Problem::CallBindingMismatch.category());
    }

    #[test]
    fn message_when_undefined_label_then_not_empty() {
        assert!(!Problem::UndefinedLabel.message().is_empty());
    }
}
