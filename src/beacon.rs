//! Beacon analytique : un seul GET HTTP « fire-and-forget » par surface.
//!
//! La requête tourne sur son propre thread. Réponse et erreurs sont
//! ignorées ; rien ne peut atteindre la session de chargement.

use std::thread;
use std::time::Duration;

use tracing::{debug, trace};
use url::Url;

/// Transport du hit analytique.
pub trait Beacon {
    /// Doit rendre la main immédiatement.
    fn fire(&self);
}

/// Beacon utilisé quand l'analytique est désactivée.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBeacon;

impl Beacon for NoopBeacon {
    fn fire(&self) {
        trace!("Beacon désactivé");
    }
}

/// GET vers un endpoint de suivi, avec un identifiant client fixe.
#[derive(Clone)]
pub struct HttpBeacon {
    agent: ureq::Agent,
    endpoint: Url,
    client_id: String,
}

impl HttpBeacon {
    pub fn new(endpoint: Url, client_id: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent,
            endpoint,
            client_id: client_id.into(),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request(&self) -> ureq::Request {
        self.agent
            .get(self.endpoint.as_str())
            .set("User-Agent", &self.client_id)
    }
}

impl Beacon for HttpBeacon {
    fn fire(&self) {
        let request = self.request();
        let endpoint = self.endpoint.to_string();
        let spawned = thread::Builder::new()
            .name("siteshell-beacon".into())
            .spawn(move || match request.call() {
                Ok(response) => debug!(endpoint = %endpoint, status = response.status(), "Beacon envoyé"),
                Err(e) => debug!(endpoint = %endpoint, error = %e, "Échec du beacon"),
            });
        if let Err(e) = spawned {
            debug!(error = %e, "Impossible de lancer le thread du beacon");
        }
    }
}
