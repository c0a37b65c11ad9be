//! Installation du subscriber `tracing`.
//!
//! `RUST_LOG` a priorité ; sinon on utilise la directive de la configuration,
//! et `info` si celle-ci est invalide.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

const FALLBACK_DIRECTIVE: &str = "info";

/// Installe un subscriber `fmt` global.
///
/// Retourne `false` si un subscriber était déjà installé (par l'hôte ou un
/// appel précédent) : ce n'est pas une erreur.
pub fn init(config: &LoggingConfig) -> bool {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(env.as_deref(), config);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

/// Première directive valide parmi : environnement, configuration, `info`.
fn build_filter(env: Option<&str>, config: &LoggingConfig) -> EnvFilter {
    env.and_then(|directive| EnvFilter::try_new(directive).ok())
        .or_else(|| EnvFilter::try_new(&config.filter).ok())
        .unwrap_or_else(|| EnvFilter::new(FALLBACK_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(filter: &str) -> LoggingConfig {
        LoggingConfig {
            filter: filter.to_string(),
        }
    }

    #[test]
    fn test_second_init_is_harmless() {
        let config = config("siteshell=debug");
        init(&config);
        assert!(!init(&config));
    }

    #[test]
    fn test_configured_directive_is_used() {
        let filter = build_filter(None, &config("siteshell=debug"));
        assert_eq!(filter.to_string(), "siteshell=debug");
    }

    #[test]
    fn test_invalid_directive_falls_back_to_info() {
        let filter = build_filter(None, &config("siteshell=notalevel"));
        assert_eq!(filter.to_string(), FALLBACK_DIRECTIVE);
    }

    #[test]
    fn test_environment_wins_over_config() {
        let filter = build_filter(Some("warn"), &config("siteshell=debug"));
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn test_invalid_environment_falls_back_to_config() {
        let filter = build_filter(Some("siteshell=notalevel"), &config("siteshell=trace"));
        assert_eq!(filter.to_string(), "siteshell=trace");
    }
}
