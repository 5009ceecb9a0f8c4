use std::{io, path::PathBuf};

use tracing::warn;
use tracing_subscriber::EnvFilter;

const AVATAR_PITCH_CONFIG_ENV_NAME: &str = "AVATAR_PITCH_CONFIG_PATH";

/// Get config path from input or env AVATAR_PITCH_CONFIG_PATH
pub fn get_apps_config_path(config: Option<PathBuf>) -> Option<PathBuf> {
    if config.is_some() {
        config
    } else {
        std::env::var(AVATAR_PITCH_CONFIG_ENV_NAME)
            .ok()
            .filter(|s| !s.is_empty())
            .map(|s| {
                warn!("### ENV VAR {} is used ###", s);
                PathBuf::from(s)
            })
    }
}

/// Installs the log subscriber. Logs go to stderr, filtered by `RUST_LOG`
/// (`info` when unset), so stdout only carries progress output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_apps_config_path() {
        let path = get_apps_config_path(Some(PathBuf::from("a.toml")));
        assert_eq!(path, Some(PathBuf::from("a.toml")));

        std::env::set_var(AVATAR_PITCH_CONFIG_ENV_NAME, "b.toml");
        let path = get_apps_config_path(Some(PathBuf::from("a.toml")));
        assert_eq!(path, Some(PathBuf::from("a.toml")));
        let path = get_apps_config_path(None);
        assert_eq!(path, Some(PathBuf::from("b.toml")));

        std::env::set_var(AVATAR_PITCH_CONFIG_ENV_NAME, "");
        assert!(get_apps_config_path(None).is_none());
        std::env::remove_var(AVATAR_PITCH_CONFIG_ENV_NAME);
        assert!(get_apps_config_path(None).is_none());
    }
}
