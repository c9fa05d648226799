use crate::error::ProcessError;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration shared by every command an executor creates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Builder)]
#[serde(rename_all = "camelCase")]
#[builder(setter(into))]
pub struct ExecutorConfig {
    /// Have the kernel SIGKILL the child if this process dies first
    #[serde(default = "default_kill_on_parent_death")]
    #[builder(default = "default_kill_on_parent_death()")]
    pub kill_on_parent_death: bool,

    /// Binary invoked to adjust the scheduling priority of a running process
    #[serde(default = "default_renice_binary")]
    #[builder(default = "default_renice_binary()")]
    pub renice_binary: String,

    /// Niceness increment passed to the renice binary (negative raises priority)
    #[serde(default = "default_priority_adjustment")]
    #[builder(default = "default_priority_adjustment()")]
    pub priority_adjustment: i32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            kill_on_parent_death: default_kill_on_parent_death(),
            renice_binary: default_renice_binary(),
            priority_adjustment: default_priority_adjustment(),
        }
    }
}

impl ExecutorConfig {
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid
    pub fn validate(&self) -> Result<(), ProcessError> {
        if self.renice_binary.trim().is_empty() {
            return Err(ProcessError::Config(
                "renice_binary cannot be empty".to_string(),
            ));
        }

        if !(-20..=19).contains(&self.priority_adjustment) {
            return Err(ProcessError::Config(format!(
                "priority_adjustment {} is outside -20..=19",
                self.priority_adjustment
            )));
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_kill_on_parent_death() -> bool {
    true
}
fn default_renice_binary() -> String {
    "renice".to_string()
}
fn default_priority_adjustment() -> i32 {
    -10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExecutorConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.kill_on_parent_death);
        assert_eq!(config.renice_binary, "renice");
        assert_eq!(config.priority_adjustment, -10);
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let config = ExecutorConfig::builder().build().unwrap();
        assert_eq!(config, ExecutorConfig::default());

        let config = ExecutorConfig::builder()
            .kill_on_parent_death(false)
            .priority_adjustment(5)
            .build()
            .unwrap();
        assert!(!config.kill_on_parent_death);
        assert_eq!(config.priority_adjustment, 5);
        assert_eq!(config.renice_binary, "renice");
    }

    #[test]
    fn test_invalid_config() {
        let mut config = ExecutorConfig {
            renice_binary: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.renice_binary = "renice".to_string();
        config.priority_adjustment = -21;
        assert!(config.validate().is_err());

        config.priority_adjustment = 19;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: ExecutorConfig =
            serde_json::from_str(r#"{"priorityAdjustment": -5}"#).unwrap();
        assert_eq!(config.priority_adjustment, -5);
        assert!(config.kill_on_parent_death);
        assert_eq!(config.renice_binary, "renice");
    }

    #[test]
    fn test_serialization() {
        let config = ExecutorConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("killOnParentDeath"));
        let deserialized: ExecutorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }
}
