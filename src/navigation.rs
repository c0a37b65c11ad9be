//! Politique de navigation sortante.
//!
//! Pour chaque URL que le navigateur s'apprête à suivre : rester dans le
//! shell, partir vers une autre application, ou être remplacée par une page
//! d'erreur. La décision ne dépend que de l'URL, de l'origine du site et de
//! la connectivité ; elle se teste sans navigateur.

use tracing::debug;
use url::Url;

use crate::classify::ErrorCode;

/// Schémas qui déclenchent une action dans une autre application.
const ACTION_SCHEMES: &[&str] = &["mailto", "tel", "sms", "intent"];

/// Pourquoi une URL quitte le shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalTarget {
    /// Schéma d'action non web (`mailto:`, `tel:`, …).
    Action,
    /// Page web d'un autre site.
    Site,
}

/// Résultat de [`NavigationPolicy::decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    LoadInline,
    DispatchExternally { url: String, target: ExternalTarget },
    RedirectToError(ErrorCode),
}

impl NavigationDecision {
    /// Vrai si le navigateur ne doit pas suivre l'URL lui-même.
    pub fn cancels_navigation(&self) -> bool {
        !matches!(self, NavigationDecision::LoadInline)
    }
}

/// Règles « même site » pour un hôte d'origine.
#[derive(Debug, Clone)]
pub struct NavigationPolicy {
    origin_host: String,
}

impl NavigationPolicy {
    /// `origin_host` est comparé sans tenir compte de la casse ; un `www.`
    /// initial est conservé tel quel.
    pub fn new(origin_host: &str) -> Self {
        Self {
            origin_host: origin_host.trim_end_matches('.').to_ascii_lowercase(),
        }
    }

    pub fn origin_host(&self) -> &str {
        &self.origin_host
    }

    /// La première règle qui s'applique l'emporte :
    ///
    /// 1. hors ligne → page d'erreur (`NET-003`)
    /// 2. http(s) sur l'hôte d'origine ou un sous-domaine → inline
    /// 3. référence relative (sans schéma), sauf `javascript:` → inline
    /// 4. schémas d'action → application externe
    /// 5. tout le reste → application externe
    pub fn decide(&self, url: &str, reachable: bool) -> NavigationDecision {
        if !reachable {
            return NavigationDecision::RedirectToError(ErrorCode::OFFLINE_ON_NAVIGATION);
        }

        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            // `javascript:` a toujours un schéma : jamais ici.
            Err(url::ParseError::RelativeUrlWithoutBase) => return NavigationDecision::LoadInline,
            Err(e) => {
                debug!(url, error = %e, "URL de navigation illisible, confiée à l'extérieur");
                return self.external(url, ExternalTarget::Site);
            }
        };

        if self.is_same_site(&parsed) {
            return NavigationDecision::LoadInline;
        }

        if ACTION_SCHEMES.contains(&parsed.scheme()) {
            return self.external(url, ExternalTarget::Action);
        }

        self.external(url, ExternalTarget::Site)
    }

    /// URL http(s) sur l'hôte d'origine ou l'un de ses sous-domaines.
    pub fn is_same_site(&self, url: &Url) -> bool {
        if !matches!(url.scheme(), "http" | "https") {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        host == self.origin_host
            || host
                .strip_suffix(self.origin_host.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    fn external(&self, url: &str, target: ExternalTarget) -> NavigationDecision {
        NavigationDecision::DispatchExternally {
            url: url.to_string(),
            target,
        }
    }
}
