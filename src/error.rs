//! Erreurs typées des étapes d'initialisation faillibles du shell.
//!
//! Les échecs de chargement et de connectivité n'apparaissent jamais ici :
//! le coordinateur les transforme en surface d'erreur. Ces types couvrent
//! la configuration, la résolution des ressources et l'ouverture externe.

use std::io;
use std::path::PathBuf;

/// Valeurs de configuration invalides ou inutilisables.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration TOML invalide : {0}")]
    Parse(#[from] toml::de::Error),
    #[error("site.home_url '{value}' n'est pas une URL absolue : {source}")]
    HomeUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("site.home_url '{0}' doit utiliser http ou https")]
    HomeScheme(String),
    #[error("site.origin_host est vide et home_url n'a pas d'hôte")]
    MissingOrigin,
    #[error("beacon.endpoint '{value}' n'est pas une URL valide : {source}")]
    BeaconEndpoint {
        value: String,
        source: url::ParseError,
    },
    #[error("reachability.probe_address '{0}' n'est pas une adresse de socket")]
    ProbeAddress(String),
}

/// Échec de la transmission d'une URL à une application externe.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("aucune application enregistrée pour ouvrir '{url}'")]
    NoHandler {
        url: String,
        #[source]
        source: io::Error,
    },
    #[error("l'URL '{0}' ne peut pas être passée à l'ouvreur système")]
    Rejected(String),
}

/// Erreurs levées pendant l'assemblage d'un shell.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("le dossier des pages d'erreur '{}' doit être un chemin absolu", .0.display())]
    RelativeAssetDir(PathBuf),
}
