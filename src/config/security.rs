use crate::errors::XaiError;

// Directory values may legitimately be relative (`../data`), so traversal
// sequences are not rejected here.
const DANGEROUS_PATTERNS: &[&str] = &[
    "<script",
    "javascript:",
    "data:",
    "file:",
    "vbscript:",
];

pub fn validate_security_patterns(value: &serde_yaml::Value) -> Result<(), XaiError> {
    check_value(value, &[])
}

fn check_value(value: &serde_yaml::Value, path: &[String]) -> Result<(), XaiError> {
    match value {
        serde_yaml::Value::String(s) => {
            let lower = s.to_lowercase();
            for pattern in DANGEROUS_PATTERNS {
                if lower.contains(pattern) {
                    let path_str = if path.is_empty() { "root".to_string() } else { path.join(".") };
                    return Err(XaiError::Config(
                        format!("Dangerous pattern '{}' found at config path: {}", pattern, path_str)
                    ));
                }
            }
            Ok(())
        }
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let key = k.as_str().unwrap_or("unknown").to_string();
                let mut new_path = path.to_vec();
                new_path.push(key);
                check_value(v, &new_path)?;
            }
            Ok(())
        }
        serde_yaml::Value::Sequence(seq) => {
            for (i, v) in seq.iter().enumerate() {
                let mut new_path = path.to_vec();
                new_path.push(format!("[{}]", i));
                check_value(v, &new_path)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> serde_yaml::Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_safe_config_passes() {
        let yaml = parse("server:\n  public_url: https://xray.example.org\nstorage:\n  static_dir: ../static");
        assert!(validate_security_patterns(&yaml).is_ok());
    }

    #[test]
    fn test_javascript_uri_blocked() {
        let yaml = parse("server:\n  public_url: 'javascript:void(0)'");
        let err = validate_security_patterns(&yaml).unwrap_err();
        assert!(err.to_string().contains("server.public_url"));
    }

    #[test]
    fn test_file_uri_blocked() {
        let yaml = parse("model:\n  classifier_url: 'file:///etc/passwd'");
        assert!(validate_security_patterns(&yaml).is_err());
    }

    #[test]
    fn test_array_dangerous_pattern_blocked() {
        let yaml = parse("server:\n  cors_origins:\n    - '<script>alert(1)'");
        let err = validate_security_patterns(&yaml).unwrap_err();
        assert!(err.to_string().contains("[0]"));
    }

    #[test]
    fn test_numeric_values_pass() {
        let yaml = parse("server:\n  port: 5000");
        assert!(validate_security_patterns(&yaml).is_ok());
    }
}
