//! Boucle d'événements du shell.
//!
//! Toutes les mutations de la session se font sur le thread qui possède le
//! [`Shell`]. Les callbacks de l'hôte et le timer du splash n'y touchent
//! jamais directement : ils passent par un [`EventSender`], clonable et
//! `Send`, qui pousse des [`ShellEvent`] dans un canal.
//!
//! ```text
//! Callbacks hôte (navigateur, focus, retour)     Thread timer splash
//!         │                                              │ sleep(min)
//!         │ EventSender::send()                          │ EventSender::send()
//!         ▼                                              ▼
//!   ┌─────────────── crossbeam_channel ────────────────────────┐
//!   └──────────────────────────┬───────────────────────────────┘
//!                              ▼
//!              Shell::run() / pump()   (thread de l'événement)
//!                └─ Coordinator → Browser / Presenter / Beacon
//! ```
//!
//! Les demandes de navigation (`should override`) attendent une réponse
//! synchrone : elles appellent [`Shell::on_navigation_request`] directement.
//!
//! Le shell garde lui-même un émetteur : le canal ne se ferme jamais tant
//! que le shell existe. La boucle ne s'arrête que sur [`Flow::Exit`].

use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, warn};

use crate::beacon::{Beacon, HttpBeacon, NoopBeacon};
use crate::config::ShellSettings;
use crate::coordinator::{
    BackAction, Browser, Collaborators, Coordinator, Presenter, RequestOutcome,
};
use crate::error::ShellError;
use crate::error_pages::ErrorPages;
use crate::events::BrowserEvent;
use crate::external::SystemOpener;
use crate::navigation::NavigationPolicy;
use crate::reachability::SystemProbe;

// ─────────────────────────────────────────────────────────────────────────────
// Événements et émetteur
// ─────────────────────────────────────────────────────────────────────────────

/// Ce qui peut arriver au shell depuis l'extérieur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    Browser(BrowserEvent),
    SplashMinTimeElapsed,
    /// La surface passe en arrière-plan.
    Paused,
    /// La surface revient au premier plan.
    Resumed,
    BackPressed,
    /// La surface hôte est détruite.
    Destroy,
}

/// Pont thread-safe vers la boucle du shell.
///
/// Un envoi échoue seulement quand le shell n'existe plus : l'événement est
/// alors ignoré, ce qui rend un timer en retard inoffensif.
#[derive(Debug, Clone)]
pub struct EventSender(Sender<ShellEvent>);

impl EventSender {
    /// Retourne `false` si le shell a déjà été détruit.
    pub fn send(&self, event: ShellEvent) -> bool {
        match self.0.send(event) {
            Ok(()) => true,
            Err(e) => {
                debug!(event = ?e.into_inner(), "Shell gone, event dropped");
                false
            }
        }
    }

    pub fn browser(&self, event: BrowserEvent) -> bool {
        self.send(ShellEvent::Browser(event))
    }
}

/// Faut-il continuer à faire tourner la boucle ?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

// ─────────────────────────────────────────────────────────────────────────────
// Shell
// ─────────────────────────────────────────────────────────────────────────────

pub struct Shell {
    coordinator: Coordinator,
    events: Receiver<ShellEvent>,
    sender: EventSender,
    splash_min_duration: Duration,
    launched: bool,
}

impl Shell {
    pub fn new(
        settings: &ShellSettings,
        pages: ErrorPages,
        collaborators: Collaborators,
    ) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let coordinator = Coordinator::new(
            settings.home_url.clone(),
            NavigationPolicy::new(&settings.origin_host),
            pages,
            collaborators,
        );

        Self {
            coordinator,
            events: rx,
            sender: EventSender(tx),
            splash_min_duration: settings.splash_min_duration,
            launched: false,
        }
    }

    /// Assemble un shell avec les implémentations système : sonde de
    /// routage, ouvreur du bureau, beacon HTTP si activé.
    pub fn with_system_services(
        settings: &ShellSettings,
        browser: Box<dyn Browser>,
        presenter: Box<dyn Presenter>,
    ) -> Result<Self, ShellError> {
        let pages = ErrorPages::locate(&settings.error_pages_dir)?;
        let beacon: Box<dyn Beacon> = match &settings.beacon {
            Some(b) => Box::new(HttpBeacon::new(
                b.endpoint.clone(),
                b.client_id.clone(),
                b.timeout,
            )),
            None => Box::new(NoopBeacon),
        };

        let collaborators = Collaborators {
            browser,
            presenter,
            probe: Box::new(SystemProbe::new(settings.probe_address)),
            opener: Box::new(SystemOpener),
            beacon,
        };
        Ok(Self::new(settings, pages, collaborators))
    }

    pub fn sender(&self) -> EventSender {
        self.sender.clone()
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Démarre le timer du splash puis la première navigation. Sans effet
    /// après le premier appel.
    pub fn launch(&mut self) {
        if self.launched {
            return;
        }
        self.launched = true;
        info!(min_splash = ?self.splash_min_duration, "Launching shell");
        spawn_splash_timer(self.splash_min_duration, self.sender.clone());
        self.coordinator.start();
    }

    /// Réponse synchrone à une demande de navigation du navigateur.
    pub fn on_navigation_request(&mut self, url: &str) -> RequestOutcome {
        self.coordinator.on_navigation_request(url)
    }

    pub fn dispatch(&mut self, event: ShellEvent) -> Flow {
        match event {
            ShellEvent::Browser(BrowserEvent::Started { url }) => {
                self.coordinator.on_navigation_start(&url)
            }
            ShellEvent::Browser(BrowserEvent::Finished { url }) => {
                self.coordinator.on_navigation_finish(&url)
            }
            ShellEvent::Browser(BrowserEvent::Failed { code }) => {
                self.coordinator.on_navigation_error(code)
            }
            ShellEvent::SplashMinTimeElapsed => self.coordinator.on_splash_min_time_elapsed(),
            ShellEvent::Paused => self.coordinator.on_pause(),
            ShellEvent::Resumed => self.coordinator.on_resume(),
            ShellEvent::BackPressed => {
                if self.coordinator.on_back_pressed() == BackAction::ExitToSystem {
                    self.coordinator.on_destroy();
                    return Flow::Exit;
                }
            }
            ShellEvent::Destroy => {
                self.coordinator.on_destroy();
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    /// Traite les événements en attente sans bloquer.
    pub fn pump(&mut self) -> Flow {
        while let Ok(event) = self.events.try_recv() {
            if self.dispatch(event) == Flow::Exit {
                return Flow::Exit;
            }
        }
        Flow::Continue
    }

    /// Attend au plus `timeout` le prochain événement et le traite.
    pub fn pump_timeout(&mut self, timeout: Duration) -> Flow {
        match self.events.recv_timeout(timeout) {
            Ok(event) => self.dispatch(event),
            // Seul cas possible : le délai a expiré.
            Err(_) => Flow::Continue,
        }
    }

    /// Boucle bloquante jusqu'à `Destroy` ou une sortie par le bouton retour.
    pub fn run(&mut self) {
        self.launch();
        while let Ok(event) = self.events.recv() {
            if self.dispatch(event) == Flow::Exit {
                break;
            }
        }
        info!("Shell event loop finished");
    }
}

/// Thread unique qui dort la durée minimale du splash puis prévient le shell.
fn spawn_splash_timer(duration: Duration, sender: EventSender) {
    let timer_sender = sender.clone();
    let spawned = thread::Builder::new()
        .name("siteshell-splash".into())
        .spawn(move || {
            thread::sleep(duration);
            if !timer_sender.send(ShellEvent::SplashMinTimeElapsed) {
                debug!("Splash timer fired after teardown");
            }
        });

    if let Err(e) = spawned {
        // Sans timer le splash resterait affiché pour toujours.
        warn!(error = %e, "Cannot spawn splash timer, releasing splash now");
        sender.send(ShellEvent::SplashMinTimeElapsed);
    }
}
