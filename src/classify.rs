//! Classification des erreurs de chargement du navigateur.
//!
//! Le navigateur embarqué signale ses échecs par des entiers tirés de sa
//! propre énumération. [`classify`] associe à chaque entier possible la page
//! d'erreur à afficher et le code de diagnostic court qui y est imprimé.

use std::fmt;

/// Codes d'erreur bruts émis par le navigateur embarqué.
pub mod raw {
    pub const HOST_LOOKUP: i32 = -2;
    pub const CONNECT: i32 = -6;
    pub const TIMEOUT: i32 = -8;
    pub const FILE_NOT_FOUND: i32 = -12;
    pub const TOO_MANY_REQUESTS: i32 = -15;
    pub const INTERNAL_SERVER: i32 = -16;
    pub const BAD_GATEWAY: i32 = -17;
    pub const SERVICE_UNAVAILABLE: i32 = -18;
    /// Quand le callback de la plateforme n'a fourni aucune erreur.
    pub const UNKNOWN: i32 = -1;
}

/// Code court affiché sur une page d'erreur (`NET-001`, `WEB-404`…).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(&'static str);

impl ErrorCode {
    /// Pas de réseau avant la tentative de navigation.
    pub const OFFLINE_AT_START: ErrorCode = ErrorCode("NET-001");
    /// Réseau perdu pendant le chargement.
    pub const OFFLINE_AFTER_LOAD: ErrorCode = ErrorCode("NET-002");
    /// Lien suivi hors ligne.
    pub const OFFLINE_ON_NAVIGATION: ErrorCode = ErrorCode("NET-003");

    pub const HOST_LOOKUP: ErrorCode = ErrorCode("WEB-001");
    pub const CONNECT: ErrorCode = ErrorCode("WEB-002");
    pub const TIMEOUT: ErrorCode = ErrorCode("WEB-003");
    pub const NOT_FOUND: ErrorCode = ErrorCode("WEB-404");
    pub const TOO_MANY_REQUESTS: ErrorCode = ErrorCode("WEB-429");
    pub const INTERNAL_SERVER: ErrorCode = ErrorCode("WEB-500");
    pub const BAD_GATEWAY: ErrorCode = ErrorCode("WEB-502");
    pub const SERVICE_UNAVAILABLE: ErrorCode = ErrorCode("WEB-503");
    pub const GENERIC: ErrorCode = ErrorCode("WEB-999");

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Les trois documents d'erreur locaux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorSurface {
    NoInternet,
    NotFound,
    Generic,
}

/// Résultat de [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub surface: ErrorSurface,
    pub code: ErrorCode,
}

/// Associe un code d'erreur brut à sa page d'erreur et à son code de
/// diagnostic.
///
/// Fonction totale : tout code inconnu donne
/// `(ErrorSurface::Generic, WEB-999)`.
pub fn classify(raw_code: i32) -> Classification {
    let (surface, code) = match raw_code {
        raw::HOST_LOOKUP => (ErrorSurface::NoInternet, ErrorCode::HOST_LOOKUP),
        raw::CONNECT => (ErrorSurface::NoInternet, ErrorCode::CONNECT),
        raw::TIMEOUT => (ErrorSurface::NoInternet, ErrorCode::TIMEOUT),
        raw::FILE_NOT_FOUND => (ErrorSurface::NotFound, ErrorCode::NOT_FOUND),
        raw::TOO_MANY_REQUESTS => (ErrorSurface::Generic, ErrorCode::TOO_MANY_REQUESTS),
        raw::INTERNAL_SERVER => (ErrorSurface::Generic, ErrorCode::INTERNAL_SERVER),
        raw::BAD_GATEWAY => (ErrorSurface::Generic, ErrorCode::BAD_GATEWAY),
        raw::SERVICE_UNAVAILABLE => (ErrorSurface::Generic, ErrorCode::SERVICE_UNAVAILABLE),
        _ => (ErrorSurface::Generic, ErrorCode::GENERIC),
    };
    Classification { surface, code }
}
