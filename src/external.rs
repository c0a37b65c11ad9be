//! Transmission d'URL à d'autres applications (mail, téléphone, navigateur…).

use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::DispatchError;

/// Lance un handler externe pour une URL.
pub trait ExternalOpener {
    fn open(&self, url: &str) -> Result<(), DispatchError>;
}

/// Passe par la commande « ouvrir avec » générique du bureau.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl SystemOpener {
    fn command(url: &str) -> Command {
        #[cfg(target_os = "windows")]
        {
            // `start` prend le premier argument entre guillemets pour un titre.
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", ""]).arg(url);
            cmd
        }
        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg(url);
            cmd
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(url);
            cmd
        }
    }
}

impl ExternalOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<(), DispatchError> {
        // Un '-' initial serait lu comme une option par l'ouvreur.
        if url.is_empty() || url.starts_with('-') || url.chars().any(char::is_control) {
            return Err(DispatchError::Rejected(url.to_string()));
        }

        let mut child = Self::command(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DispatchError::NoHandler {
                url: url.to_string(),
                source,
            })?;

        debug!(url, pid = child.id(), "URL confiée à l'ouvreur système");

        // Attend l'ouvreur pour ne pas laisser de zombie.
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_option_like_urls() {
        let err = SystemOpener.open("--help").unwrap_err();
        assert!(matches!(err, DispatchError::Rejected(_)));
    }

    #[test]
    fn test_rejects_empty_and_control_chars() {
        assert!(matches!(
            SystemOpener.open(""),
            Err(DispatchError::Rejected(_))
        ));
        assert!(matches!(
            SystemOpener.open("https://a.test/\nrm"),
            Err(DispatchError::Rejected(_))
        ));
    }
}
