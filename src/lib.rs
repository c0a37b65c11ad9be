//! # siteshell : shell mono-site
//!
//! Cœur indépendant de la plateforme d'une application qui affiche un seul
//! site web dans un navigateur embarqué, avec écran de démarrage (splash),
//! indicateur de chargement, pages d'erreur locales et renvoi des liens
//! sortants vers les applications du système.
//!
//! ## Architecture des modules
//!
//! - [`classify`] : Table des codes d'erreur du navigateur → page d'erreur
//!   et code de diagnostic (`WEB-404`, …). Fonction pure et totale.
//!
//! - [`reachability`] : Sonde de connectivité de l'appareil. Fail-closed :
//!   une sonde qui ne sait pas répondre équivaut à une coupure.
//!
//! - [`lifecycle`] : Session de chargement et son reducer pur
//!   `(état, événement) → effets`. La surface visible en est dérivée.
//!
//! - [`coordinator`] : Seul propriétaire de la session. Interroge la sonde,
//!   exécute les effets sur le navigateur et notifie le `Presenter`.
//!
//! - [`navigation`] : Politique des liens : inline, application externe,
//!   ou page d'erreur hors ligne.
//!
//! - [`events`] : Normalisation des surcharges de callbacks plateforme en
//!   un événement logique par occurrence.
//!
//! - [`shell`] : Boucle d'événements mono-thread, timer du splash et
//!   `EventSender` pour les callbacks de l'hôte.
//!
//! - [`error_pages`], [`link_handler`], [`external`], [`beacon`] : pages
//!   d'erreur locales, script d'interception des liens, ouverture externe,
//!   beacon analytique fire-and-forget.
//!
//! - [`config`], [`logging`], [`error`] : configuration TOML, subscriber
//!   `tracing`, erreurs typées.

pub mod beacon;
pub mod classify;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod error_pages;
pub mod events;
pub mod external;
pub mod lifecycle;
pub mod link_handler;
pub mod logging;
pub mod navigation;
pub mod reachability;
pub mod shell;

pub use coordinator::{BackAction, Browser, Collaborators, Coordinator, Presenter, RequestOutcome};
pub use lifecycle::{LoadSession, Surface};
pub use shell::{EventSender, Flow, Shell, ShellEvent};
