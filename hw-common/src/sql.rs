//! SQL text helpers
//!
//! The remote endpoint only accepts a SQL string, so every value is
//! interpolated as a quoted literal.

/// Double embedded single quotes
pub fn escape(value: &str) -> String {
    value.replace('\'', "''")
}

/// Quote `value` as a SQL string literal
pub fn literal(value: &str) -> String {
    format!("'{}'", escape(value))
}

/// Comma-joined quoted literals for an `IN (...)` clause
pub fn in_list<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| literal(v.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_doubles_quotes() {
        assert_eq!(escape("Bahá'u'lláh"), "Bahá''u''lláh");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_literal() {
        assert_eq!(literal("it's"), "'it''s'");
        assert_eq!(literal(""), "''");
    }

    #[test]
    fn test_in_list() {
        assert_eq!(in_list(["a", "b'c"]), "'a','b''c'");
        assert_eq!(in_list(Vec::<String>::new()), "");
    }
}
