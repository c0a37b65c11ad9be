//! Normalisation des callbacks du navigateur embarqué.
//!
//! Les plateformes exposent souvent deux surcharges pour le même événement
//! logique (une API courante et une API dépréciée conservée pour les vieux
//! OS), et les deux peuvent être appelées. On ne garde qu'une famille de
//! surcharges, choisie une fois pour toutes par l'hôte, et chaque callback
//! brut devient au plus un [`BrowserEvent`].

use tracing::warn;
use url::Url;

use crate::classify::raw;

/// Famille de surcharge d'un callback plateforme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overload {
    Current,
    Legacy,
}

/// Callback tel que reçu de la plateforme, avant normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawCallback {
    PageStarted {
        url: Option<String>,
    },
    PageFinished {
        url: Option<String>,
    },
    ReceivedError {
        code: Option<i32>,
        overload: Overload,
    },
}

/// Un événement logique par occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEvent {
    Started { url: Url },
    Finished { url: Url },
    Failed { code: i32 },
}

/// Filtre les surcharges et convertit les callbacks bruts.
#[derive(Debug, Clone, Copy)]
pub struct CallbackNormalizer {
    accepted: Overload,
}

impl CallbackNormalizer {
    pub fn new(accepted: Overload) -> Self {
        Self { accepted }
    }

    /// Choisit la famille de surcharges à partir du niveau d'API de l'hôte.
    /// `legacy_below` est le premier niveau qui fournit l'API courante.
    pub fn for_api_level(api_level: u32, legacy_below: u32) -> Self {
        if api_level < legacy_below {
            Self::new(Overload::Legacy)
        } else {
            Self::new(Overload::Current)
        }
    }

    pub fn accepted(&self) -> Overload {
        self.accepted
    }

    pub fn normalize(&self, callback: RawCallback) -> Option<BrowserEvent> {
        match callback {
            RawCallback::PageStarted { url } => {
                parse_url(url, "start").map(|url| BrowserEvent::Started { url })
            }
            RawCallback::PageFinished { url } => {
                parse_url(url, "finish").map(|url| BrowserEvent::Finished { url })
            }
            RawCallback::ReceivedError { code, overload } => {
                (overload == self.accepted).then(|| BrowserEvent::Failed {
                    code: code.unwrap_or(raw::UNKNOWN),
                })
            }
        }
    }

    /// Même filtrage pour la demande de navigation (`should override`).
    pub fn navigation_request(&self, url: Option<String>, overload: Overload) -> Option<String> {
        if overload != self.accepted {
            return None;
        }
        // Une requête sans URL se comporte comme une URL vide : lien relatif.
        Some(url.unwrap_or_default())
    }
}

fn parse_url(url: Option<String>, kind: &'static str) -> Option<Url> {
    let raw = url?;
    match Url::parse(&raw) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(kind, url = %raw, error = %e, "Callback navigateur ignoré : URL invalide");
            None
        }
    }
}
