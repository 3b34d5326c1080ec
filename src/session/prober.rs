//! SpamBot conversation
//!
//! Anything other than a recognised "no limits" reply counts as restricted.

use crate::{Error, config::ProbeSettings, session::client::TelegramSession};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SpamProber {
    bot_username: String,
    command: String,
    timeout: Duration,
    clear_phrases: Vec<String>,
}

impl SpamProber {
    pub fn new(settings: &ProbeSettings) -> Self {
        Self {
            bot_username: settings.bot_username.clone(),
            command: settings.command.clone(),
            timeout: settings.timeout(),
            clear_phrases: settings
                .clear_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    /// Override the reply wait
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether `reply` contains one of the all-clear phrases, ignoring case
    pub fn is_clear(&self, reply: &str) -> bool {
        let reply = reply.to_lowercase();
        self.clear_phrases.iter().any(|p| reply.contains(p.as_str()))
    }

    /// Ask the bot about `session`'s account. Returns `true` only for a
    /// confirmed clean account; every failure is logged and yields `false`.
    pub async fn probe<S: TelegramSession + ?Sized>(&self, session: &S) -> bool {
        let exchange = session.converse(&self.bot_username, &self.command);

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(reply)) => {
                let clear = self.is_clear(&reply);
                tracing::info!(clear, "SpamBot replied: {}", reply.trim());
                clear
            }
            Ok(Err(Error::FloodWait { seconds })) => {
                tracing::error!("Flood wait of {}s while probing SpamBot", seconds);
                false
            }
            Ok(Err(err)) => {
                tracing::error!("SpamBot probe failed: {}", err);
                false
            }
            Err(_) => {
                tracing::error!("SpamBot did not reply within {:?}", self.timeout);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::client::{SessionFactory, SessionSpec};
    use crate::session::testing::{ScriptedFactory, ScriptedReply, ScriptedSession};
    use crate::types::{AccountProfile, ProxyDescriptor};
    use rstest::rstest;
    use std::path::Path;

    fn prober() -> SpamProber {
        SpamProber::new(&ProbeSettings::default()).with_timeout(Duration::from_millis(50))
    }

    fn session(factory: &ScriptedFactory) -> ScriptedSession {
        let profile = AccountProfile::new(1, "h", "1");
        let proxy = ProxyDescriptor::socks5("h", 1, "u", "p");
        factory
            .open(SessionSpec::existing(Path::new("acc.session"), &profile, &proxy))
            .unwrap()
    }

    #[rstest]
    #[case("Good news, no limits are currently applied to your account. You're free as a bird!", true)]
    #[case("GOOD NEWS, NO LIMITS ARE CURRENTLY APPLIED TO YOUR ACCOUNT", true)]
    #[case("Unfortunately, some phone numbers may trigger a harsh response from our anti-spam systems.", false)]
    #[case("", false)]
    fn test_is_clear(#[case] reply: &str, #[case] expected: bool) {
        assert_eq!(prober().is_clear(reply), expected);
    }

    #[test]
    fn test_configured_phrases_are_case_folded() {
        let settings = ProbeSettings {
            clear_phrases: vec!["All Clear".to_string()],
            ..ProbeSettings::default()
        };
        assert!(SpamProber::new(&settings).is_clear("status: ALL CLEAR"));
    }

    #[tokio::test]
    async fn test_probe_sends_start_to_spambot() {
        let factory = ScriptedFactory::new();
        let session = session(&factory);

        assert!(prober().probe(&session).await);
        assert_eq!(
            factory.log().conversations,
            vec![("SpamBot".to_string(), "/start".to_string())]
        );
    }

    #[rstest]
    #[case(ScriptedReply::Text("Your account is now limited until 1 Jan".to_string()))]
    #[case(ScriptedReply::FloodWait(30))]
    #[case(ScriptedReply::Fail)]
    #[case(ScriptedReply::Silent)]
    #[tokio::test]
    async fn test_probe_fails_closed(#[case] reply: ScriptedReply) {
        let factory = ScriptedFactory::new().reply(reply);
        let session = session(&factory);

        assert!(!prober().probe(&session).await);
    }
}
