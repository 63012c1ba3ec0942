//! Configuration commands.

use std::path::Path;

use crate::config::{AssistantConfig, Settings};
use crate::error::AssistantResult;

/// Renders the merged settings as TOML.
pub fn dump(settings: &Settings, path: &Path) -> AssistantResult<String> {
    let config = AssistantConfig {
        settings: settings.clone(),
    };
    Ok(format!("# config.toml ({})\n{}", path.display(), config.to_toml()?))
}

/// Checks every setting, failing on the first one that does not parse.
pub fn validate(settings: &Settings) -> AssistantResult<String> {
    settings.validate()?;
    Ok("Configuration is valid.".to_string())
}

/// Shows the configuration file path.
pub fn path(path: &Path) -> String {
    format!("config: {}", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssistantError;

    #[test]
    fn dump_has_header_and_settings() {
        let output = dump(&Settings::default(), Path::new("/etc/ca.toml")).unwrap();
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("# config.toml (/etc/ca.toml)"));
        assert_eq!(lines.next(), Some("[settings]"));
        assert!(output.contains("calendar-id = \"primary\""));
    }

    #[test]
    fn validate_reports_first_failure() {
        assert_eq!(validate(&Settings::default()).unwrap(), "Configuration is valid.");

        let settings = Settings {
            end_of_day: "half past never".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            validate(&settings).unwrap_err(),
            AssistantError::Parse { what: "time", .. }
        ));
    }

    #[test]
    fn path_line() {
        assert_eq!(path(Path::new("/tmp/config.toml")), "config: /tmp/config.toml");
    }
}
