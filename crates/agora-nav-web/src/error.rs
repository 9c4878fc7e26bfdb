#![forbid(unsafe_code)]

use agora_nav::ConfigError;

/// Reasons `installNavTracker` can refuse to start.
///
/// Only installation fails. Once running, the tracker swallows every DOM
/// error it meets.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("no global `window` object")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("invalid tracker config: {0}")]
    Config(#[from] ConfigError),
    #[error("DOM error: {0}")]
    Dom(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_nav::TrackerConfig;

    #[test]
    fn config_errors_keep_their_detail() {
        let err: InstallError = TrackerConfig::from_json_str(r#"{ "activationFrames": 0 }"#)
            .unwrap_err()
            .into();
        let text = err.to_string();
        assert!(text.starts_with("invalid tracker config: validation errors:"), "{text}");
        assert!(text.contains("activationFrames"), "{text}");
    }

    #[test]
    fn dom_error_display() {
        let err = InstallError::Dom("SyntaxError: '###' is not a valid selector".to_owned());
        assert_eq!(
            err.to_string(),
            "DOM error: SyntaxError: '###' is not a valid selector"
        );
    }
}
