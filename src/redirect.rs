//! Outbound link handling.
//!
//! The youth portal sometimes redirects deep links to its generic landing
//! page, so portal links are not opened directly: they go through the
//! verification page, which decides the final navigation target.

use std::process::Stdio;
use tokio::process::Command as AsyncCommand;

/// Rewrites portal links through the verification indirection before
/// opening anything in the browser.
#[derive(Debug, Clone)]
pub struct LinkGuard {
    portal_origin: String,
    verifier_base: String,
}

impl LinkGuard {
    pub fn new(portal_origin: String, verifier_base: String) -> Self {
        Self {
            portal_origin,
            verifier_base,
        }
    }

    /// The URL that should actually be navigated to. Portal links become
    /// `{verifier}/redirect.html?target=<encoded original>`; everything
    /// else passes through unchanged.
    pub fn guard(&self, url: &str) -> String {
        if url.starts_with(&self.portal_origin) {
            format!(
                "{}/redirect.html?target={}",
                self.verifier_base,
                urlencoding::encode(url)
            )
        } else {
            url.to_string()
        }
    }

    /// Open a link in the system browser, routed through the guard.
    pub async fn open(&self, url: &str) -> color_eyre::Result<()> {
        let target = self.guard(url);
        self.launch_browser(&target).await
    }

    async fn launch_browser(&self, target: &str) -> color_eyre::Result<()> {
        let openers = ["xdg-open", "open", "firefox", "chromium-browser", "google-chrome"];

        for opener in &openers {
            if !command_exists(opener).await {
                continue;
            }
            let mut cmd = AsyncCommand::new(opener);
            cmd.arg(target);
            cmd.stdout(Stdio::null());
            cmd.stderr(Stdio::null());
            if cmd.spawn().is_ok() {
                tracing::debug!("opened {target} with {opener}");
                return Ok(());
            }
        }

        Err(color_eyre::eyre::eyre!(
            "No suitable browser opener found. Install one of: xdg-open, firefox, chromium-browser"
        ))
    }
}

async fn command_exists(command: &str) -> bool {
    AsyncCommand::new("which")
        .arg(command)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}
