//! Runtime configuration.
//!
//! Stored per thread, like the rest of the runtime state. Set it before the
//! first `render()` on a thread; changing it mid-update takes effect on the
//! next pass.

use std::cell::RefCell;

/// Tunables for the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Upper bound on queued-update drain passes per outermost operation.
    pub max_update_passes: usize,
    /// Prefix marking a prop as an event handler (`on` + uppercase letter).
    pub handler_prefix: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_update_passes: 50,
            handler_prefix: "on".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// True if `key` names an event handler: the prefix followed by an ASCII
    /// uppercase letter. The test is case-sensitive.
    pub fn is_handler_key(&self, key: &str) -> bool {
        key.strip_prefix(self.handler_prefix.as_str())
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_uppercase())
    }
}

thread_local! {
    static CONFIG: RefCell<RuntimeConfig> = RefCell::new(RuntimeConfig::default());
}

/// Current configuration (cloned).
pub fn config() -> RuntimeConfig {
    CONFIG.with(|c| c.borrow().clone())
}

/// Replace the configuration for this thread.
pub fn set_config(config: RuntimeConfig) {
    CONFIG.with(|c| *c.borrow_mut() = config);
}

/// Restore the default configuration.
pub fn reset_config() {
    set_config(RuntimeConfig::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_key() {
        let cfg = RuntimeConfig::default();
        assert!(cfg.is_handler_key("onClick"));
        assert!(cfg.is_handler_key("onMouseDown"));
        assert!(!cfg.is_handler_key("onclick"));
        assert!(!cfg.is_handler_key("on"));
        assert!(!cfg.is_handler_key("one"));
        assert!(!cfg.is_handler_key("id"));
    }

    #[test]
    fn test_set_and_reset() {
        set_config(RuntimeConfig {
            max_update_passes: 3,
            handler_prefix: "handle".into(),
        });
        assert_eq!(config().max_update_passes, 3);
        assert!(config().is_handler_key("handleClick"));

        reset_config();
        assert_eq!(config(), RuntimeConfig::default());
    }
}
