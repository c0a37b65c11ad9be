//! Pages d'erreur locales.
//!
//! Trois documents statiques (`no_internet.html`, `page_not_found.html`,
//! `generic_error.html`) affichent le code de diagnostic reçu dans le
//! paramètre de requête `error`. Ce module cherche le dossier qui les
//! contient dans les chemins suivants :
//!
//! 1. Variable d'environnement `SITESHELL_ASSETS_PATH`
//! 2. À côté de l'exécutable (`<exe_dir>/assets/`)
//! 3. Racine du projet si l'exécutable est dans `target/{debug,release}/`
//! 4. Répertoire courant (`./assets/`)
//! 5. Chemin configuré (`[error_pages] dir`), rendu absolu

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use url::Url;

use crate::classify::{ErrorCode, ErrorSurface};
use crate::error::ShellError;

/// Nom du dossier d'assets cherché à côté de l'exécutable et dans le cwd.
const ASSETS_DIR_NAME: &str = "assets";

/// Paramètre de requête portant le code d'erreur.
pub const ERROR_QUERY_PARAM: &str = "error";

/// Fichier servant chaque page d'erreur.
pub fn file_name(surface: ErrorSurface) -> &'static str {
    match surface {
        ErrorSurface::NoInternet => "no_internet.html",
        ErrorSurface::NotFound => "page_not_found.html",
        ErrorSurface::Generic => "generic_error.html",
    }
}

/// Résolveur d'URL pour les pages d'erreur locales.
#[derive(Debug, Clone)]
pub struct ErrorPages {
    /// URL `file://` du dossier, toujours terminée par `/`.
    base: Url,
}

impl ErrorPages {
    /// Construit le résolveur pour un dossier absolu.
    pub fn new(dir: &Path) -> Result<Self, ShellError> {
        let base = Url::from_directory_path(dir)
            .map_err(|()| ShellError::RelativeAssetDir(dir.to_path_buf()))?;
        Ok(Self { base })
    }

    /// Cherche le dossier d'assets (voir l'ordre en tête de module).
    pub fn locate(configured: &Path) -> Result<Self, ShellError> {
        let dir = find_assets_dir().unwrap_or_else(|| absolutize(configured));
        info!(dir = %dir.display(), "Error pages directory");
        Self::new(&dir)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// `file:///…/<page>.html?error=<CODE>`
    pub fn url_for(&self, surface: ErrorSurface, code: ErrorCode) -> Url {
        let mut url = self.base.clone();
        url.set_path(&format!("{}{}", self.base.path(), file_name(surface)));
        url.query_pairs_mut()
            .clear()
            .append_pair(ERROR_QUERY_PARAM, code.as_str());
        url
    }

    /// Vrai pour toute URL sous le dossier des pages d'erreur.
    ///
    /// Ces pages sont déjà un état d'erreur rendu : leurs événements de
    /// chargement ne doivent ni effacer l'erreur ni relancer la sonde.
    pub fn is_error_page(&self, url: &Url) -> bool {
        url.scheme() == "file" && url.path().starts_with(self.base.path())
    }
}

fn find_assets_dir() -> Option<PathBuf> {
    // 1. Variable d'environnement SITESHELL_ASSETS_PATH
    if let Ok(path) = env::var("SITESHELL_ASSETS_PATH") {
        let path = PathBuf::from(path);
        if path.is_dir() {
            return Some(absolutize(&path));
        }
        debug!(path = %path.display(), "SITESHELL_ASSETS_PATH is not a directory");
    }

    // 2. À côté de l'exécutable
    if let Ok(exe_path) = env::current_exe()
        && let Ok(canonical) = exe_path.canonicalize()
    {
        let exe_dir = canonical.parent().unwrap_or(&canonical);
        let path = exe_dir.join(ASSETS_DIR_NAME);
        if path.is_dir() {
            return Some(path);
        }

        // 3. Exécutable dans target/{debug,release}/ : remonter au projet.
        if let Some(target_dir) = exe_dir.parent()
            && target_dir.file_name().is_some_and(|n| n == "target")
            && let Some(project_root) = target_dir.parent()
        {
            let path = project_root.join(ASSETS_DIR_NAME);
            if path.is_dir() {
                return Some(path);
            }
        }
    }

    // 4. Répertoire courant
    if let Ok(cwd) = env::current_dir() {
        let path = cwd.join(ASSETS_DIR_NAME);
        if path.is_dir() {
            return Some(path);
        }
    }

    None
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages() -> ErrorPages {
        let dir = tempfile::tempdir().unwrap();
        ErrorPages::new(dir.path()).unwrap()
    }

    #[test]
    fn test_url_for_carries_code() {
        let p = pages();
        let url = p.url_for(ErrorSurface::NoInternet, ErrorCode::OFFLINE_AT_START);
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/no_internet.html"));
        assert_eq!(url.query(), Some("error=NET-001"));

        let url = p.url_for(ErrorSurface::NotFound, ErrorCode::NOT_FOUND);
        assert!(url.path().ends_with("/page_not_found.html"));
        assert_eq!(url.query(), Some("error=WEB-404"));

        let url = p.url_for(ErrorSurface::Generic, ErrorCode::GENERIC);
        assert!(url.path().ends_with("/generic_error.html"));
    }

    #[test]
    fn test_generated_urls_are_error_pages() {
        let p = pages();
        let url = p.url_for(ErrorSurface::Generic, ErrorCode::BAD_GATEWAY);
        assert!(p.is_error_page(&url));
    }

    #[test]
    fn test_remote_and_foreign_files_are_not_error_pages() {
        let p = pages();
        assert!(!p.is_error_page(&Url::parse("https://site.test/no_internet.html").unwrap()));
        assert!(!p.is_error_page(&Url::parse("file:///somewhere/else.html").unwrap()));
    }

    #[test]
    fn test_relative_dir_is_rejected() {
        let err = ErrorPages::new(Path::new("assets")).unwrap_err();
        assert!(matches!(err, ShellError::RelativeAssetDir(_)));
    }

    #[test]
    fn test_shipped_assets_exist() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join(ASSETS_DIR_NAME);
        for surface in [
            ErrorSurface::NoInternet,
            ErrorSurface::NotFound,
            ErrorSurface::Generic,
        ] {
            let page = dir.join(file_name(surface));
            assert!(page.is_file(), "missing {}", page.display());
        }
    }
}
