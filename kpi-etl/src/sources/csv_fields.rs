use csv::StringRecord;

/// Cell contents treated as a missing value, in addition to the empty field.
pub const NA_VALUES: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>",
    "#N/A", "#NA",
];

pub fn is_missing(s: &str) -> bool {
    NA_VALUES.contains(&s)
}

pub fn parse_optional_string(s: &str) -> Option<String> {
    if is_missing(s) {
        None
    } else {
        Some(s.to_string())
    }
}

/// `Ok(None)` for a missing marker, `Err` for text that is not a number.
pub fn parse_optional_f64(s: &str) -> Result<Option<f64>, String> {
    let trimmed = s.trim();
    if is_missing(trimmed) {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|e| format!("'{trimmed}' is not a number: {e}"))
}

pub fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_markers_parse_to_none() {
        for marker in ["", "NaN", "NA", "null", "<NA>"] {
            assert_eq!(parse_optional_f64(marker), Ok(None));
            assert_eq!(parse_optional_string(marker), None);
        }
    }

    #[test]
    fn numbers_are_trimmed_but_strings_are_not() {
        assert_eq!(parse_optional_f64(" 12.5 "), Ok(Some(12.5)));
        assert_eq!(parse_optional_string(" Onshore"), Some(" Onshore".to_string()));
        assert!(parse_optional_f64("twelve").is_err());
    }
}
