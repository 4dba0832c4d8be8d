use std::env;

#[derive(Clone)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Clone)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    pub(crate) default_directive: String,
    pub(crate) show_targets: bool,
    /// Warnings captured during config parsing so they can be logged after tracing is initialized.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        let component = component.trim().to_string();
        let mut warnings = Vec::new();

        let service_name = env_string("SERVICE_NAME")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| component.clone());

        let environment = env_string("STAGE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        let default_directive = match env_string("LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
            Some(raw) => match parse_level(&raw) {
                Some(level) => level.to_string(),
                None => {
                    warnings.push(format!("LOG_LEVEL is invalid (value: {raw}); defaulting to info"));
                    "info".to_string()
                }
            },
            None => "info".to_string(),
        };

        let show_targets = match env_string("LOG_SHOW_TARGETS") {
            Some(raw) => env_bool(&raw).unwrap_or_else(|| {
                warnings.push(format!(
                    "LOG_SHOW_TARGETS is invalid (value: {raw}); defaulting to true"
                ));
                true
            }),
            None => true,
        };

        Self {
            service_context: ServiceContext {
                service_name,
                environment,
                component,
            },
            default_directive,
            show_targets,
            warnings,
        }
    }
}

fn parse_level(input: &str) -> Option<&'static str> {
    match input.trim().to_ascii_lowercase().as_str() {
        "error" => Some("error"),
        "warn" | "warning" => Some("warn"),
        "info" => Some("info"),
        "debug" => Some("debug"),
        "trace" => Some("trace"),
        _ => None,
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_levels_case_insensitively() {
        assert_eq!(parse_level(" WARNING "), Some("warn"));
        assert_eq!(parse_level("Debug"), Some("debug"));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn parses_boolean_flags() {
        assert_eq!(env_bool("Yes"), Some(true));
        assert_eq!(env_bool("off"), Some(false));
        assert_eq!(env_bool("maybe"), None);
    }
}
