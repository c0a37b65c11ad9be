//! Coordinateur du cycle de vie : seul propriétaire de la [`LoadSession`].
//!
//! Il interroge la sonde de connectivité, alimente le reducer pur de
//! [`crate::lifecycle`], exécute les effets sur le navigateur, le beacon et
//! les pages d'erreur, et prévient le [`Presenter`] à chaque changement de
//! surface. Les échecs de chargement et de connectivité s'arrêtent ici : ils
//! deviennent une surface d'erreur et ne remontent jamais à l'appelant.

use tracing::{debug, info, warn};
use url::Url;

use crate::beacon::Beacon;
use crate::error_pages::ErrorPages;
use crate::external::ExternalOpener;
use crate::lifecycle::{self, Effect, Event, Failure, LoadSession, Surface};
use crate::link_handler::link_handler_script;
use crate::navigation::{ExternalTarget, NavigationDecision, NavigationPolicy};
use crate::reachability::Reachability;

// ─────────────────────────────────────────────────────────────────────────────
// Collaborateurs
// ─────────────────────────────────────────────────────────────────────────────

/// Le navigateur embarqué, vu comme une boîte noire.
pub trait Browser {
    fn navigate(&mut self, url: &Url);
    fn can_go_back(&self) -> bool;
    fn go_back(&mut self);
    fn execute_script(&mut self, script: &str);
    /// La surface passe en arrière-plan : timers et médias suspendus.
    fn pause(&mut self);
    fn resume(&mut self);
}

/// Reçoit les changements de surface ; libre de les animer (fondus…).
pub trait Presenter {
    fn present(&mut self, surface: Surface);

    /// Affiche la page d'erreur locale `page` hors du navigateur. Utilisé
    /// quand la sonde échoue avant toute navigation.
    fn present_error_page(&mut self, page: &Url, failure: Failure);
}

/// Réponse au callback « faut-il suivre cette URL ? » du navigateur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Proceed,
    Cancel,
}

/// Résultat d'un appui sur retour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    /// Le navigateur est revenu en arrière dans son historique.
    GoneBack,
    /// Plus d'historique : l'hôte doit fermer la surface.
    ExitToSystem,
}

/// Tout ce à quoi le coordinateur parle.
pub struct Collaborators {
    pub browser: Box<dyn Browser>,
    pub presenter: Box<dyn Presenter>,
    pub probe: Box<dyn Reachability>,
    pub opener: Box<dyn ExternalOpener>,
    pub beacon: Box<dyn Beacon>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Coordinateur
// ─────────────────────────────────────────────────────────────────────────────

pub struct Coordinator {
    session: LoadSession,
    visible: Surface,
    alive: bool,
    policy: NavigationPolicy,
    pages: ErrorPages,
    link_script: String,
    browser: Box<dyn Browser>,
    presenter: Box<dyn Presenter>,
    probe: Box<dyn Reachability>,
    opener: Box<dyn ExternalOpener>,
    beacon: Box<dyn Beacon>,
}

impl Coordinator {
    /// Crée le coordinateur, splash affiché. Rien n'est chargé avant
    /// [`Coordinator::start`].
    pub fn new(
        home: Url,
        policy: NavigationPolicy,
        pages: ErrorPages,
        collaborators: Collaborators,
    ) -> Self {
        let session = LoadSession::new(home);
        let visible = session.surface();
        let link_script = link_handler_script(policy.origin_host());
        let Collaborators {
            browser,
            mut presenter,
            probe,
            opener,
            beacon,
        } = collaborators;
        presenter.present(visible);

        Self {
            session,
            visible,
            alive: true,
            policy,
            pages,
            link_script,
            browser,
            presenter,
            probe,
            opener,
            beacon,
        }
    }

    pub fn session(&self) -> &LoadSession {
        &self.session
    }

    pub fn visible_surface(&self) -> Surface {
        self.visible
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Charge l'URL d'accueil.
    pub fn start(&mut self) {
        let home = self.session.home().clone();
        self.navigate(home);
    }

    /// Charge `url` après une sonde préalable. Hors ligne, le navigateur
    /// n'est jamais sollicité.
    pub fn navigate(&mut self, url: Url) {
        let reachable = self.probe.is_reachable();
        info!(%url, reachable, "Navigation demandée");
        self.apply(Event::Navigate { url, reachable });
    }

    pub fn on_navigation_start(&mut self, url: &Url) {
        let local = self.pages.is_error_page(url);
        debug!(%url, local, "Navigation commencée");
        self.apply(Event::NavigationStarted { local });
    }

    pub fn on_navigation_finish(&mut self, url: &Url) {
        let local = self.pages.is_error_page(url);
        // Pas de nouvelle sonde pour nos pages d'erreur.
        let reachable = local || self.probe.is_reachable();
        debug!(%url, local, reachable, "Navigation terminée");
        self.apply(Event::NavigationFinished { local, reachable });
    }

    pub fn on_navigation_error(&mut self, raw_code: i32) {
        debug!(raw_code, "Échec de navigation");
        self.apply(Event::NavigationFailed { raw_code });
    }

    pub fn on_splash_min_time_elapsed(&mut self) {
        self.apply(Event::SplashMinTimeElapsed);
    }

    /// La surface passe en arrière-plan.
    pub fn on_pause(&mut self) {
        if self.alive {
            debug!("Surface en pause");
            self.browser.pause();
        }
    }

    /// Retour au premier plan : relance le navigateur, puis retente le
    /// chargement si la dernière erreur était une coupure réseau.
    pub fn on_resume(&mut self) {
        if !self.alive {
            return;
        }
        self.browser.resume();
        if !self.session.has_error() {
            return;
        }
        let reachable = self.probe.is_reachable();
        self.apply(Event::Resumed { reachable });
    }

    /// Applique la politique de navigation à une URL que le navigateur
    /// s'apprête à suivre.
    pub fn on_navigation_request(&mut self, url: &str) -> RequestOutcome {
        if !self.alive {
            return RequestOutcome::Cancel;
        }

        let reachable = self.probe.is_reachable();
        let decision = self.policy.decide(url, reachable);
        match &decision {
            NavigationDecision::LoadInline => {}
            NavigationDecision::RedirectToError(code) => {
                info!(url, %code, "Lien suivi hors ligne");
                self.apply(Event::OfflineNavigation);
            }
            NavigationDecision::DispatchExternally { url, target } => {
                self.apply(Event::ExternalHandoff);
                self.dispatch_externally(url, *target);
            }
        }

        if decision.cancels_navigation() {
            RequestOutcome::Cancel
        } else {
            RequestOutcome::Proceed
        }
    }

    pub fn on_back_pressed(&mut self) -> BackAction {
        if self.alive && self.browser.can_go_back() {
            self.browser.go_back();
            BackAction::GoneBack
        } else {
            BackAction::ExitToSystem
        }
    }

    /// La surface hôte a disparu ; tout événement ultérieur est ignoré.
    pub fn on_destroy(&mut self) {
        if self.alive {
            info!("Surface détruite");
            self.alive = false;
        }
    }

    fn dispatch_externally(&mut self, url: &str, target: ExternalTarget) {
        match self.opener.open(url) {
            Ok(()) => info!(url, ?target, "Ouvert dans une application externe"),
            // Rien n'est montré à l'utilisateur quand aucun handler n'existe.
            Err(e) => warn!(url, ?target, error = %e, "Échec de l'ouverture externe"),
        }
    }

    fn apply(&mut self, event: Event) {
        if !self.alive {
            debug!(?event, "Événement après destruction ignoré");
            return;
        }

        for effect in lifecycle::reduce(&mut self.session, event) {
            self.run(effect);
        }

        let surface = self.session.surface();
        if surface != self.visible {
            info!(from = ?self.visible, to = ?surface, "Changement de surface");
            self.visible = surface;
            self.presenter.present(surface);
        }
    }

    fn run(&mut self, effect: Effect) {
        match effect {
            Effect::Navigate(url) => self.browser.navigate(&url),
            Effect::ShowErrorPage(failure) => {
                let url = self.pages.url_for(failure.surface, failure.code);
                warn!(code = %failure.code, cause = ?failure.cause, "Affichage de la page d'erreur");
                self.browser.navigate(&url);
            }
            Effect::PresentErrorPage(failure) => {
                let url = self.pages.url_for(failure.surface, failure.code);
                warn!(code = %failure.code, cause = ?failure.cause, "Hors ligne avant navigation");
                self.presenter.present_error_page(&url, failure);
            }
            Effect::InjectLinkHandler => self.browser.execute_script(&self.link_script),
            Effect::FireBeacon => self.beacon.fire(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::classify::ErrorCode;
    use proptest::prelude::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    /// Simule le navigateur qui réagit à ses propres appels navigate().
    fn load_ok(c: &mut Coordinator, u: &Url) {
        c.on_navigation_start(u);
        c.on_navigation_finish(u);
    }

    #[test]
    fn test_created_on_splash() {
        let h = Harness::new();
        let c = h.coordinator();
        assert_eq!(c.visible_surface(), Surface::Splash);
        assert_eq!(h.log.presented(), vec![Surface::Splash]);
        assert!(h.log.navigations().is_empty());
    }

    #[test]
    fn test_first_load_scenario() {
        let h = Harness::new();
        let mut c = h.coordinator();
        c.start();
        assert_eq!(h.log.navigations(), vec![HOME.to_string()]);
        assert_eq!(h.log.count(&Call::Beacon), 1);

        c.on_navigation_start(&Harness::home());
        assert_eq!(c.visible_surface(), Surface::Splash);
        c.on_navigation_finish(&Harness::home());
        assert!(c.session().is_page_loaded());
        assert_eq!(c.visible_surface(), Surface::Splash);
        assert_eq!(h.log.count(&Call::Script), 1);
        assert!(!h.log.presented().contains(&Surface::Spinner));

        c.on_splash_min_time_elapsed();
        assert_eq!(c.visible_surface(), Surface::Content);
        assert_eq!(h.log.presented(), vec![Surface::Splash, Surface::Content]);
    }

    #[test]
    fn test_offline_launch_never_invokes_browser() {
        let h = Harness::new();
        h.online.set(false);
        let mut c = h.coordinator();
        c.start();

        assert!(h.log.navigations().is_empty());
        let pages = h.log.error_pages_presented();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].starts_with("file://"));
        assert!(pages[0].ends_with("no_internet.html?error=NET-001"));
        assert_eq!(h.log.count(&Call::Beacon), 0);
        assert_eq!(c.session().error_code(), Some(ErrorCode::OFFLINE_AT_START));

        c.on_splash_min_time_elapsed();
        assert_eq!(c.visible_surface(), Surface::ErrorNoInternet);
        assert!(h.log.navigations().is_empty());
    }

    #[test]
    fn test_pause_and_resume_reach_browser() {
        let h = Harness::new();
        let mut c = h.coordinator();
        c.on_splash_min_time_elapsed();
        c.start();
        load_ok(&mut c, &Harness::home());
        h.log.clear();

        c.on_pause();
        c.on_resume();
        assert_eq!(h.log.calls(), vec![Call::Pause, Call::Resume]);
        assert_eq!(c.visible_surface(), Surface::Content);

        c.on_destroy();
        c.on_pause();
        c.on_resume();
        assert_eq!(h.log.count(&Call::Pause), 1);
        assert_eq!(h.log.count(&Call::Resume), 1);
    }

    #[test]
    fn test_host_lookup_scenario() {
        let h = Harness::new();
        let mut c = h.coordinator();
        c.on_splash_min_time_elapsed();
        c.start();
        c.on_navigation_start(&Harness::home());
        c.on_navigation_error(-2);

        assert_eq!(c.session().error_code(), Some(ErrorCode::HOST_LOOKUP));
        assert_eq!(c.visible_surface(), Surface::ErrorNoInternet);
        let last = h.log.navigations().pop().unwrap();
        assert!(last.ends_with("no_internet.html?error=WEB-001"));

        // La page d'erreur se charge sans effacer l'erreur.
        let page = url(&last);
        h.online.set(false);
        load_ok(&mut c, &page);
        assert_eq!(c.visible_surface(), Surface::ErrorNoInternet);
        assert_eq!(c.session().error_code(), Some(ErrorCode::HOST_LOOKUP));
        assert_eq!(h.log.count(&Call::Script), 0);
    }

    #[test]
    fn test_resume_retry_scenario() {
        let h = Harness::new();
        h.online.set(false);
        let mut c = h.coordinator();
        c.on_splash_min_time_elapsed();
        c.start();
        assert_eq!(c.visible_surface(), Surface::ErrorNoInternet);

        c.on_resume();
        assert_eq!(c.visible_surface(), Surface::ErrorNoInternet);

        h.online.set(true);
        h.log.clear();
        c.on_resume();
        assert!(!c.session().has_error());
        assert_eq!(c.visible_surface(), Surface::Spinner);
        assert_eq!(h.log.navigations(), vec![HOME.to_string()]);

        load_ok(&mut c, &Harness::home());
        assert_eq!(c.visible_surface(), Surface::Content);
    }

    #[test]
    fn test_connectivity_lost_while_loading() {
        let h = Harness::new();
        let mut c = h.coordinator();
        c.on_splash_min_time_elapsed();
        c.start();
        c.on_navigation_start(&Harness::home());
        h.online.set(false);
        c.on_navigation_finish(&Harness::home());
        assert_eq!(c.session().error_code(), Some(ErrorCode::OFFLINE_AFTER_LOAD));
        assert_eq!(c.visible_surface(), Surface::ErrorNoInternet);
        assert_eq!(h.log.count(&Call::Script), 0);
    }

    #[test]
    fn test_subsequent_navigation_shows_spinner() {
        let h = Harness::new();
        let mut c = h.coordinator();
        c.on_splash_min_time_elapsed();
        c.start();
        load_ok(&mut c, &Harness::home());
        assert_eq!(c.visible_surface(), Surface::Content);

        let about = url("https://site.test/about");
        assert_eq!(c.on_navigation_request(about.as_str()), RequestOutcome::Proceed);
        c.on_navigation_start(&about);
        assert_eq!(c.visible_surface(), Surface::Spinner);
        c.on_navigation_finish(&about);
        assert_eq!(c.visible_surface(), Surface::Content);
        assert_eq!(h.log.count(&Call::Script), 2);
        assert_eq!(h.log.count(&Call::Beacon), 1);
    }

    #[test]
    fn test_external_link_is_dispatched_and_cancelled() {
        let h = Harness::new();
        let mut c = h.coordinator();
        c.on_splash_min_time_elapsed();
        c.start();
        load_ok(&mut c, &Harness::home());

        let outcome = c.on_navigation_request("mailto:hello@site.test");
        assert_eq!(outcome, RequestOutcome::Cancel);
        assert!(h.log.calls().contains(&Call::Open("mailto:hello@site.test".into())));
        assert_eq!(c.visible_surface(), Surface::Content);
    }

    #[test]
    fn test_missing_handler_is_swallowed() {
        let h = Harness::new();
        let mut c = Coordinator::new(
            Harness::home(),
            NavigationPolicy::new("site.test"),
            h.pages.clone(),
            h.collaborators(false),
        );
        c.on_splash_min_time_elapsed();
        c.start();
        load_ok(&mut c, &Harness::home());

        let outcome = c.on_navigation_request("https://elsewhere.test/");
        assert_eq!(outcome, RequestOutcome::Cancel);
        assert_eq!(c.visible_surface(), Surface::Content);
        assert!(!c.session().has_error());
    }

    #[test]
    fn test_handoff_dismisses_spinner() {
        let h = Harness::new();
        let mut c = h.coordinator();
        c.on_splash_min_time_elapsed();
        c.start();
        load_ok(&mut c, &Harness::home());
        c.on_navigation_start(&url("https://site.test/redirect"));
        assert_eq!(c.visible_surface(), Surface::Spinner);

        c.on_navigation_request("https://elsewhere.test/");
        assert_eq!(c.visible_surface(), Surface::Content);
    }

    #[test]
    fn test_offline_link_redirects_to_error() {
        let h = Harness::new();
        let mut c = h.coordinator();
        c.on_splash_min_time_elapsed();
        c.start();
        load_ok(&mut c, &Harness::home());

        h.online.set(false);
        let outcome = c.on_navigation_request("https://site.test/about");
        assert_eq!(outcome, RequestOutcome::Cancel);
        assert_eq!(
            c.session().error_code(),
            Some(ErrorCode::OFFLINE_ON_NAVIGATION)
        );
        assert_eq!(c.visible_surface(), Surface::ErrorNoInternet);
        assert!(
            h.log
                .navigations()
                .last()
                .unwrap()
                .ends_with("error=NET-003")
        );
    }

    #[test]
    fn test_back_navigation() {
        let h = Harness::new();
        let mut c = h.coordinator();
        h.history.set(1);
        assert_eq!(c.on_back_pressed(), BackAction::GoneBack);
        assert_eq!(c.on_back_pressed(), BackAction::ExitToSystem);
        assert_eq!(h.log.count(&Call::GoBack), 1);
    }

    #[test]
    fn test_events_after_destroy_are_ignored() {
        let h = Harness::new();
        let mut c = h.coordinator();
        c.start();
        c.on_navigation_start(&Harness::home());
        c.on_navigation_finish(&Harness::home());
        c.on_destroy();
        c.on_splash_min_time_elapsed();
        assert!(!c.session().is_splash_min_time_passed());
        assert_eq!(c.visible_surface(), Surface::Splash);
        assert_eq!(
            c.on_navigation_request("https://site.test/"),
            RequestOutcome::Cancel
        );
    }

    // ── Propriétés ────────────────────────────────────────────────────────

    #[derive(Debug, Clone)]
    enum Step {
        Start,
        NavStart(bool),
        NavFinish(bool),
        NavError(i32),
        Timer,
        Resume,
        Request(&'static str),
        Online(bool),
    }

    fn arb_step() -> impl Strategy<Value = Step> {
        prop_oneof![
            Just(Step::Start),
            any::<bool>().prop_map(Step::NavStart),
            any::<bool>().prop_map(Step::NavFinish),
            prop_oneof![Just(-2), Just(-12), Just(-15), Just(-999_999)].prop_map(Step::NavError),
            Just(Step::Timer),
            Just(Step::Resume),
            prop_oneof![
                Just("https://site.test/a"),
                Just("tel:123"),
                Just("https://elsewhere.test/"),
                Just("/relative"),
            ]
            .prop_map(Step::Request),
            any::<bool>().prop_map(Step::Online),
        ]
    }

    proptest! {
        #[test]
        fn prop_visible_equals_derived(steps in prop::collection::vec(arb_step(), 0..50)) {
            let h = Harness::new();
            let mut c = h.coordinator();
            let error_page = h.pages.url_for(
                crate::classify::ErrorSurface::Generic,
                ErrorCode::GENERIC,
            );
            for step in steps {
                match step {
                    Step::Start => c.start(),
                    Step::NavStart(local) => {
                        let u = if local { error_page.clone() } else { Harness::home() };
                        c.on_navigation_start(&u)
                    }
                    Step::NavFinish(local) => {
                        let u = if local { error_page.clone() } else { Harness::home() };
                        c.on_navigation_finish(&u)
                    }
                    Step::NavError(code) => c.on_navigation_error(code),
                    Step::Timer => c.on_splash_min_time_elapsed(),
                    Step::Resume => c.on_resume(),
                    Step::Request(u) => {
                        c.on_navigation_request(u);
                    }
                    Step::Online(v) => h.online.set(v),
                }
                prop_assert_eq!(c.visible_surface(), c.session().surface());
                prop_assert_eq!(Some(c.visible_surface()), h.log.presented().last().copied());
            }
        }

        #[test]
        fn prop_offline_attempt_never_invokes_browser(timer_first in any::<bool>(), attempts in 1usize..4) {
            let h = Harness::new();
            let mut c = h.coordinator();
            if timer_first {
                c.on_splash_min_time_elapsed();
            }
            h.online.set(false);
            for _ in 0..attempts {
                c.start();
            }
            prop_assert!(h.log.navigations().is_empty());
            prop_assert_eq!(h.log.error_pages_presented().len(), attempts);
            prop_assert_eq!(h.log.count(&Call::Beacon), 0);
            prop_assert_eq!(c.session().error_code(), Some(ErrorCode::OFFLINE_AT_START));
        }
    }
}
