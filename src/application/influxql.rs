// Escaped InfluxQL statement builders
//
// Discovered locations and measurement names come back from the backing
// store and are untrusted. Statements embedding them must go through these
// builders; raw concatenation elsewhere is a contract violation.

use std::collections::BTreeSet;

/// Discovery statement for the distinct station locations.
pub const SHOW_LOCATIONS: &str = "SHOW TAG VALUES WITH KEY = \"location\"";

/// Escapes a value for embedding inside a single-quoted string literal.
pub fn escape_tag_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('"', "\\\"")
}

/// Escapes a name for embedding inside a double-quoted identifier.
pub fn escape_identifier(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Statement enumerating the measurement series recorded for one location.
pub fn show_measurements(location: &str) -> String {
    format!(
        "SHOW MEASUREMENTS WHERE \"location\" = '{}'",
        escape_tag_value(location)
    )
}

/// One batched statement fetching the latest value of every measurement for
/// a location. Batching keeps the round-trip count at one per location
/// instead of one per measurement.
pub fn select_last_batch(location: &str, measurements: &BTreeSet<String>) -> String {
    let location = escape_tag_value(location);
    measurements
        .iter()
        .map(|measurement| {
            format!(
                "SELECT LAST(*) FROM \"{}\" WHERE \"location\" = '{}'",
                escape_identifier(measurement),
                location
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_measurements_escapes_quotes() {
        let statement = show_measurements("Ort'1; DROP SERIES");
        assert_eq!(
            statement,
            "SHOW MEASUREMENTS WHERE \"location\" = 'Ort\\'1; DROP SERIES'"
        );
    }

    #[test]
    fn test_tag_value_escaping_never_terminates_the_literal() {
        let escaped = escape_tag_value(r#"a'b"c\d"#);
        // Every quote and backslash in the output carries its own escape.
        assert_eq!(escaped, r#"a\'b\"c\\d"#);
    }

    #[test]
    fn test_select_last_batch_joins_statements() {
        let measurements: BTreeSet<String> =
            ["Temp0", "Time"].iter().map(|m| m.to_string()).collect();
        let statement = select_last_batch("Ort1", &measurements);
        assert_eq!(
            statement,
            "SELECT LAST(*) FROM \"Temp0\" WHERE \"location\" = 'Ort1'; \
             SELECT LAST(*) FROM \"Time\" WHERE \"location\" = 'Ort1'"
        );
    }

    #[test]
    fn test_identifier_escaping_handles_embedded_quotes() {
        let measurements: BTreeSet<String> = [r#"Temp"0"#.to_string()].into_iter().collect();
        let statement = select_last_batch("Ort1", &measurements);
        assert!(statement.contains(r#"FROM "Temp\"0""#));
    }
}
