use metrics_interface_util::BackendError;

/// Longest instrument name OpenTelemetry accepts.
const MAX_NAME_LENGTH: usize = 255;

/// Checks an instrument name against the OpenTelemetry naming rules.
pub fn validate_name(name: &str) -> Result<(), BackendError> {
    let invalid = |reason| Err(BackendError::InvalidName { name: name.to_string(), reason });

    let mut chars = name.chars();
    match chars.next() {
        None => return invalid("name is empty"),
        Some(first) if !first.is_ascii_alphabetic() => {
            return invalid("name must start with an ASCII letter")
        }
        Some(_) => {}
    }

    if name.len() > MAX_NAME_LENGTH {
        return invalid("name is longer than 255 characters");
    }

    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/')) {
        return invalid("name may only contain ASCII alphanumerics, '_', '.', '-' and '/'");
    }

    Ok(())
}

/// Checks explicit histogram bucket boundaries.
pub fn validate_boundaries(boundaries: &[f64]) -> Result<(), BackendError> {
    let invalid =
        |reason| Err(BackendError::InvalidBoundaries { boundaries: boundaries.to_vec(), reason });

    if boundaries.iter().any(|b| !b.is_finite()) {
        return invalid("boundaries must be finite");
    }

    if boundaries.windows(2).any(|w| w[0] >= w[1]) {
        return invalid("boundaries must be strictly increasing");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_boundaries, validate_name};

    #[test]
    fn accepts_valid_names() {
        for name in ["requests", "has_total", "http.server-duration/seconds", "a1"] {
            assert!(validate_name(name).is_ok(), "{name} should be valid");
        }
        assert!(validate_name(&"a".repeat(255)).is_ok());
    }

    #[test]
    fn rejects_invalid_names() {
        let long = "a".repeat(256);
        for name in ["", "1st", "_private", "with space", "emoji😀", long.as_str()] {
            assert!(validate_name(name).is_err(), "{name} should be invalid");
        }
    }

    #[test]
    fn boundaries() {
        assert!(validate_boundaries(&[]).is_ok());
        assert!(validate_boundaries(&[0.1]).is_ok());
        assert!(validate_boundaries(&[-1.0, 0.0, 0.5, 10.0]).is_ok());

        assert!(validate_boundaries(&[1.0, 1.0]).is_err());
        assert!(validate_boundaries(&[2.0, 1.0]).is_err());
        assert!(validate_boundaries(&[0.0, f64::NAN]).is_err());
        assert!(validate_boundaries(&[0.0, f64::INFINITY]).is_err());
    }
}
