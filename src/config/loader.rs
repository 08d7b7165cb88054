//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::PipeguardConfig;
use super::secret::secret_string;
use crate::domain::{PipeguardError, Result};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into PipeguardConfig
/// 4. Applies environment variable overrides (PIPEGUARD_* prefix)
/// 5. Validates the configuration
///
/// The salt is usually supplied via `PIPEGUARD_PROTECTION_SALT` rather than
/// written into the file.
pub fn load_config(path: impl AsRef<Path>) -> Result<PipeguardConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(PipeguardError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        PipeguardError::Configuration(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: PipeguardConfig = toml::from_str(&contents)
        .map_err(|e| PipeguardError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate()?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. A referenced variable that is not set
/// is an error, collected across the whole file before reporting.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| {
        PipeguardError::Pattern(format!("Invalid substitution pattern: {e}"))
    })?;
    let mut lines = Vec::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(PipeguardError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Applies environment variable overrides using the PIPEGUARD_* prefix
///
/// Variables follow the pattern PIPEGUARD_<SECTION>_<KEY>, e.g.
/// PIPEGUARD_PROTECTION_SALT or PIPEGUARD_APPLICATION_LOG_LEVEL.
///
/// An override that cannot be parsed is fatal. Falling back to a default
/// here could silently turn strict mode off, so a bad value refuses to
/// load rather than degrade protection.
fn apply_env_overrides(config: &mut PipeguardConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("PIPEGUARD_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Protection overrides
    if let Ok(val) = std::env::var("PIPEGUARD_PROTECTION_SALT") {
        config.protection.salt = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("PIPEGUARD_PROTECTION_STRICT_MODE") {
        config.protection.strict_mode = parse_override("PIPEGUARD_PROTECTION_STRICT_MODE", &val)?;
    }
    if let Ok(val) = std::env::var("PIPEGUARD_PROTECTION_DIGEST_WIDTH") {
        config.protection.digest_width = parse_override("PIPEGUARD_PROTECTION_DIGEST_WIDTH", &val)?;
    }
    if let Ok(val) = std::env::var("PIPEGUARD_PROTECTION_CONFIDENCE_THRESHOLD") {
        config.protection.confidence_threshold =
            parse_override("PIPEGUARD_PROTECTION_CONFIDENCE_THRESHOLD", &val)?;
    }
    if let Ok(val) = std::env::var("PIPEGUARD_PROTECTION_PATTERN_TABLE") {
        config.protection.pattern_table = Some(val.into());
    }
    if let Ok(val) = std::env::var("PIPEGUARD_PROTECTION_AUDIT_ENABLED") {
        config.protection.audit.enabled =
            parse_override("PIPEGUARD_PROTECTION_AUDIT_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("PIPEGUARD_PROTECTION_AUDIT_LOG_PATH") {
        config.protection.audit.log_path = val.into();
    }

    // Logging overrides
    if let Ok(val) = std::env::var("PIPEGUARD_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("PIPEGUARD_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = std::env::var("PIPEGUARD_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}

/// Parse an override value, failing loudly instead of defaulting
fn parse_override<T: std::str::FromStr>(name: &str, val: &str) -> Result<T> {
    val.parse().map_err(|_| {
        PipeguardError::Configuration(format!("Invalid value for {name}: '{val}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Tests touching PIPEGUARD_PROTECTION_SALT must not interleave
    static SALT_ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("PIPEGUARD_TEST_VAR", "test_value");
        let input = "salt = \"${PIPEGUARD_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "salt = \"test_value\"");
        std::env::remove_var("PIPEGUARD_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("PIPEGUARD_MISSING_VAR");
        let input = "salt = \"${PIPEGUARD_MISSING_VAR}\"";
        assert!(substitute_env_vars(input).is_err());
    }

    #[test]
    fn test_substitute_skips_comments() {
        let input = "# reference ${PIPEGUARD_NOT_SET_ANYWHERE}\nname = \"pipeguard\"";
        let result = substitute_env_vars(input).unwrap();
        assert!(result.contains("${PIPEGUARD_NOT_SET_ANYWHERE}"));
    }

    #[test]
    fn test_parse_override_rejects_garbage() {
        assert!(parse_override::<bool>("PIPEGUARD_PROTECTION_STRICT_MODE", "yes").is_err());
        assert!(parse_override::<bool>("PIPEGUARD_PROTECTION_STRICT_MODE", "true").unwrap());
        assert_eq!(
            parse_override::<usize>("PIPEGUARD_PROTECTION_DIGEST_WIDTH", "16").unwrap(),
            16
        );
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(load_config("nonexistent.toml").is_err());
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
name = "pipeguard"
log_level = "info"

[protection]
salt = "a-long-enough-salt-value-here"
digest_width = 12
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.name, "pipeguard");
        assert_eq!(config.protection.digest_width, 12);
    }

    #[test]
    fn test_load_config_missing_salt_is_fatal() {
        let toml_content = r#"
[application]
log_level = "info"
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        // Make sure the env override cannot rescue the config
        let _guard = SALT_ENV_LOCK.lock().unwrap();
        std::env::remove_var("PIPEGUARD_PROTECTION_SALT");
        let err = load_config(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("salt"));
    }

    #[test]
    fn test_env_override_salt() {
        let toml_content = r#"
[application]
log_level = "info"
"#;
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let _guard = SALT_ENV_LOCK.lock().unwrap();
        std::env::set_var("PIPEGUARD_PROTECTION_SALT", "salt-from-env-0123456789");
        let config = load_config(temp_file.path()).unwrap();
        std::env::remove_var("PIPEGUARD_PROTECTION_SALT");

        let salt = config.protection.salt.unwrap();
        assert_eq!(salt.expose_secret(), "salt-from-env-0123456789");
    }
}
