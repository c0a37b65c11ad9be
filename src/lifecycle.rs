//! Cycle de vie du chargement : état de session et son reducer.
//!
//! La session est une [`Phase`] explicite plus quelques drapeaux
//! monotones. La surface visible est toujours dérivée de cet état par
//! [`LoadSession::surface`] ; rien ne mémorise « ce qui est à l'écran ».
//!
//! ```text
//!                 start non-initial               finish / erreur
//!   Splash ─────────────────────────▶ Spinner ─────────────────────▶ Content | Error*
//!     │   (le splash reste dessous)      ▲                               │
//!     │ stabilisé + durée min écoulée    └──────── start suivant ────────┘
//!     └──────────────────────────────▶ Content | Error*      Error* ──resume──▶ Spinner
//! ```
//!
//! [`reduce`] est pur : le [`Coordinator`](crate::coordinator::Coordinator)
//! interroge les collaborateurs, leurs réponses voyagent dans l'[`Event`]
//! et les effets de bord reviennent sous forme d'[`Effect`].

use url::Url;

use crate::classify::{self, ErrorCode, ErrorSurface};

/// Ce que l'utilisateur voit à un instant donné.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Splash,
    Spinner,
    Content,
    ErrorNoInternet,
    ErrorNotFound,
    ErrorGeneric,
}

impl Surface {
    pub fn is_error(self) -> bool {
        matches!(
            self,
            Surface::ErrorNoInternet | Surface::ErrorNotFound | Surface::ErrorGeneric
        )
    }
}

impl From<ErrorSurface> for Surface {
    fn from(surface: ErrorSurface) -> Self {
        match surface {
            ErrorSurface::NoInternet => Surface::ErrorNoInternet,
            ErrorSurface::NotFound => Surface::ErrorNotFound,
            ErrorSurface::Generic => Surface::ErrorGeneric,
        }
    }
}

/// Origine d'un échec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    /// Aucune route réseau (d'après la sonde).
    Connectivity,
    /// Le navigateur a signalé une erreur alors que le réseau répondait.
    Load,
}

/// Échec classé, affiché sous forme de page d'erreur locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failure {
    pub code: ErrorCode,
    pub surface: ErrorSurface,
    pub cause: Cause,
}

impl Failure {
    fn offline(code: ErrorCode) -> Self {
        Self {
            code,
            surface: ErrorSurface::NoInternet,
            cause: Cause::Connectivity,
        }
    }

    fn from_browser(raw_code: i32) -> Self {
        let c = classify::classify(raw_code);
        Self {
            code: c.code,
            surface: c.surface,
            cause: Cause::Load,
        }
    }
}

/// État de chargement de la navigation courante.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Rien n'a encore été tenté.
    Idle,
    /// Navigation en cours. `spinner` indique si l'indicateur de chargement
    /// a été levé (pas pour le tout premier chargement : le splash le couvre).
    Loading { spinner: bool },
    Loaded,
    Failed(Failure),
}

impl Phase {
    fn is_settled(&self) -> bool {
        matches!(self, Phase::Loaded | Phase::Failed(_))
    }
}

/// État d'une surface hôte, de sa création à sa destruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSession {
    home: Url,
    phase: Phase,
    /// Ce que le navigateur affiche quand la navigation courante est abandonnée.
    last_settled: Option<Phase>,
    first_load: bool,
    splash_min_time_passed: bool,
    splash_dismissed: bool,
    beacon_sent: bool,
}

impl LoadSession {
    pub fn new(home: Url) -> Self {
        Self {
            home,
            phase: Phase::Idle,
            last_settled: None,
            first_load: true,
            splash_min_time_passed: false,
            splash_dismissed: false,
            beacon_sent: false,
        }
    }

    pub fn home(&self) -> &Url {
        &self.home
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_first_load(&self) -> bool {
        self.first_load
    }

    /// Vrai dès que la navigation courante s'est terminée, succès ou échec.
    pub fn is_page_loaded(&self) -> bool {
        self.phase.is_settled()
    }

    pub fn is_splash_min_time_passed(&self) -> bool {
        self.splash_min_time_passed
    }

    pub fn is_splash_dismissed(&self) -> bool {
        self.splash_dismissed
    }

    pub fn has_error(&self) -> bool {
        matches!(self.phase, Phase::Failed(_))
    }

    pub fn failure(&self) -> Option<Failure> {
        match self.phase {
            Phase::Failed(f) => Some(f),
            _ => None,
        }
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.failure().map(|f| f.code)
    }

    pub fn beacon_sent(&self) -> bool {
        self.beacon_sent
    }

    /// Dérive la surface visible de l'état.
    ///
    /// Le spinner passe au-dessus du splash : une navigation non initiale
    /// lancée pendant le splash montre le spinner, puis de nouveau le splash
    /// une fois terminée.
    pub fn surface(&self) -> Surface {
        match self.phase {
            Phase::Loading { spinner: true } => Surface::Spinner,
            _ if !self.splash_dismissed => Surface::Splash,
            Phase::Idle | Phase::Loading { .. } => Surface::Spinner,
            Phase::Loaded => Surface::Content,
            Phase::Failed(f) => f.surface.into(),
        }
    }

    fn settle(&mut self, phase: Phase) {
        self.phase = phase;
        self.last_settled = Some(phase);
        self.dismiss_splash_if_due();
    }

    fn fail(&mut self, failure: Failure) -> Vec<Effect> {
        self.settle(Phase::Failed(failure));
        vec![Effect::ShowErrorPage(failure)]
    }

    fn dismiss_splash_if_due(&mut self) {
        if self.splash_min_time_passed && self.phase.is_settled() {
            self.splash_dismissed = true;
        }
    }

    fn begin_navigation(&mut self, url: Url, spinner: bool) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        if self.first_load && !self.beacon_sent {
            self.beacon_sent = true;
            effects.push(Effect::FireBeacon);
        }
        self.phase = Phase::Loading { spinner };
        effects.push(Effect::Navigate(url));
        effects
    }
}

/// Entrées de [`reduce`], déjà normalisées et complétées par la sonde.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Le shell veut charger `url` ; `reachable` est la sonde préalable.
    Navigate { url: Url, reachable: bool },
    /// Le navigateur commence un chargement. `local` : une de nos pages d'erreur.
    NavigationStarted { local: bool },
    /// Le navigateur a fini de charger. `reachable` est la sonde d'après
    /// chargement (ignorée pour les pages locales).
    NavigationFinished { local: bool, reachable: bool },
    NavigationFailed { raw_code: i32 },
    SplashMinTimeElapsed,
    Resumed { reachable: bool },
    /// Lien suivi alors que l'appareil est hors ligne.
    OfflineNavigation,
    /// Lien confié à une application externe ; le navigateur l'annule.
    ExternalHandoff,
}

/// Effets de bord demandés par [`reduce`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Navigate(Url),
    /// Le navigateur charge la page d'erreur locale.
    ShowErrorPage(Failure),
    /// L'hôte affiche la page d'erreur lui-même, sans passer par le
    /// navigateur (échec de la sonde avant toute navigation).
    PresentErrorPage(Failure),
    InjectLinkHandler,
    FireBeacon,
}

/// Applique un événement à la session et retourne les effets à exécuter.
pub fn reduce(session: &mut LoadSession, event: Event) -> Vec<Effect> {
    match event {
        Event::Navigate { url, reachable } => {
            if !reachable {
                // Le navigateur n'est jamais sollicité.
                let failure = Failure::offline(ErrorCode::OFFLINE_AT_START);
                session.settle(Phase::Failed(failure));
                return vec![Effect::PresentErrorPage(failure)];
            }
            let spinner = !session.first_load;
            session.begin_navigation(url, spinner)
        }

        Event::NavigationStarted { local } => {
            if local {
                // Notre propre page d'erreur en cours de rendu : l'échec reste.
                return Vec::new();
            }
            let retrying = matches!(session.phase, Phase::Loading { spinner: true });
            session.phase = Phase::Loading {
                spinner: retrying || !session.first_load,
            };
            Vec::new()
        }

        Event::NavigationFinished { local, reachable } => {
            if local || session.has_error() {
                return Vec::new();
            }
            if !reachable {
                return session.fail(Failure::offline(ErrorCode::OFFLINE_AFTER_LOAD));
            }
            session.first_load = false;
            session.settle(Phase::Loaded);
            vec![Effect::InjectLinkHandler]
        }

        Event::NavigationFailed { raw_code } => {
            if session.has_error() {
                // La première erreur d'une navigation l'emporte.
                return Vec::new();
            }
            session.fail(Failure::from_browser(raw_code))
        }

        Event::SplashMinTimeElapsed => {
            if !session.splash_min_time_passed {
                session.splash_min_time_passed = true;
                session.dismiss_splash_if_due();
            }
            Vec::new()
        }

        Event::Resumed { reachable } => match session.failure() {
            Some(f) if f.surface == ErrorSurface::NoInternet && reachable => {
                let home = session.home.clone();
                session.begin_navigation(home, true)
            }
            _ => Vec::new(),
        },

        Event::OfflineNavigation => {
            session.fail(Failure::offline(ErrorCode::OFFLINE_ON_NAVIGATION))
        }

        Event::ExternalHandoff => {
            if let Phase::Loading { spinner: true } = session.phase {
                session.phase = session
                    .last_settled
                    .unwrap_or(Phase::Loading { spinner: false });
                session.dismiss_splash_if_due();
            }
            Vec::new()
        }
    }
}
