//! Bark notification router.
//!
//! Forwards notice messages to a Bark server, resolving usernames to device
//! keys through a configured `username:device_key` text mapping. One
//! form-encoded POST is issued per resolved device key.
//!
//! Bark API Reference: https://github.com/Finb/Bark

use std::sync::{Arc, RwLock};

use serde::Deserialize;

use crate::config::BarkSettings;
use crate::events::NoticeMessage;
use crate::routers::outcome::DispatchOutcome;
use crate::routers::transport::PushTransport;

/// Provider-level success code in the Bark response body.
const BARK_SUCCESS_CODE: i64 = 200;

/// Immutable Bark router configuration snapshot.
///
/// Built once per configuration load and replaced wholesale on reload.
/// Recipient entries keep their configured order; keys are unique, trimmed
/// and non-empty.
#[derive(Debug, Clone, Default)]
pub struct BarkConfig {
    pub enabled: bool,
    /// Bark server base URL, no trailing slash significance
    pub server: String,
    /// Ordered (username, device_key) pairs
    pub recipients: Vec<(String, String)>,
    /// Static extra request parameters from the `params` setting
    pub extra_params: Vec<(String, String)>,
    /// Allowlist of catalog names; empty allows all
    pub msgtypes: Vec<String>,
}

impl BarkConfig {
    /// Build a snapshot from raw settings.
    pub fn from_settings(settings: &BarkSettings) -> Self {
        Self {
            enabled: settings.enabled,
            server: settings.server.trim().trim_end_matches('/').to_string(),
            recipients: parse_recipients(&settings.apikey),
            extra_params: parse_extra_params(&settings.params),
            msgtypes: settings.msgtypes.clone(),
        }
    }

    /// Whether the router is operational: enabled with server and at least
    /// one parsed recipient. An empty recipient map disables the router.
    pub fn state(&self) -> bool {
        self.enabled && !self.server.is_empty() && !self.recipients.is_empty()
    }

    /// Look up the device key mapped to a username.
    pub fn recipient(&self, username: &str) -> Option<&str> {
        self.recipients
            .iter()
            .find(|(user, _)| user == username)
            .map(|(_, key)| key.as_str())
    }

    /// The push endpoint URL.
    pub fn push_url(&self) -> String {
        format!("{}/push", self.server)
    }
}

/// Parse the `username:device_key` recipient text.
///
/// Whitespace-separated tokens; a token containing a colon is split on the
/// first colon, both sides trimmed. Colon-free tokens are dropped silently.
/// A repeated username overwrites the earlier entry, keeping its position.
fn parse_recipients(raw: &str) -> Vec<(String, String)> {
    let mut recipients: Vec<(String, String)> = Vec::new();
    for token in raw.split_whitespace() {
        if let Some((username, device_key)) = token.split_once(':') {
            let username = username.trim();
            let device_key = device_key.trim();
            if username.is_empty() {
                continue;
            }
            if let Some(entry) = recipients.iter_mut().find(|(user, _)| user == username) {
                entry.1 = device_key.to_string();
            } else {
                recipients.push((username.to_string(), device_key.to_string()));
            }
        }
    }
    recipients
}

/// Parse the static extra-parameter text with query-string semantics.
///
/// `key=value` pairs joined by `&`; the first value per key wins, pairs
/// without `=` are dropped.
fn parse_extra_params(raw: &str) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::new();
    for pair in raw.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            let key = key.trim();
            if key.is_empty() || params.iter().any(|(k, _)| k == key) {
                continue;
            }
            params.push((key.to_string(), value.trim().to_string()));
        }
    }
    params
}

/// Bark API response body.
#[derive(Debug, Deserialize)]
struct BarkReply {
    code: i64,
    #[serde(default)]
    message: String,
}

/// Bark router: filter, resolve, dispatch.
pub struct BarkRouter {
    config: RwLock<Arc<BarkConfig>>,
    transport: Arc<dyn PushTransport>,
}

impl BarkRouter {
    /// Create the router from settings.
    pub fn new(settings: &BarkSettings, transport: Arc<dyn PushTransport>) -> Self {
        Self {
            config: RwLock::new(Arc::new(BarkConfig::from_settings(settings))),
            transport,
        }
    }

    /// Replace the configuration snapshot wholesale.
    pub fn reload(&self, settings: &BarkSettings) {
        let fresh = Arc::new(BarkConfig::from_settings(settings));
        *self.config.write().expect("bark config lock poisoned") = fresh;
    }

    /// The current configuration snapshot.
    pub fn snapshot(&self) -> Arc<BarkConfig> {
        self.config.read().expect("bark config lock poisoned").clone()
    }

    /// Whether the router is enabled and fully configured.
    pub fn state(&self) -> bool {
        self.snapshot().state()
    }

    /// Event filter: decide whether an event should be processed at all.
    pub fn should_process(config: &BarkConfig, event: &NoticeMessage) -> bool {
        if !config.state() {
            return false;
        }
        // Channel-targeted events are handled by channel-specific senders.
        if event.channel.as_deref().is_some_and(|c| !c.is_empty()) {
            return false;
        }
        if event.is_empty_content() {
            tracing::warn!("Title and text are both empty, dropping event");
            return false;
        }
        if !event.force_send
            && let Some(msg_type) = event.msg_type
            && !config.msgtypes.is_empty()
            && !config.msgtypes.iter().any(|m| m == msg_type.as_str())
        {
            tracing::info!(msg_type = %msg_type, "Message type not enabled for Bark forwarding");
            return false;
        }
        true
    }

    /// Recipient resolver. First matching branch wins:
    /// 1. forced send → every mapped device key;
    /// 2. username mapped → that single key;
    /// 3. username unmapped → nothing (fail closed);
    /// 4. no username → every mapped device key (broadcast).
    pub fn resolve_targets(config: &BarkConfig, event: &NoticeMessage) -> Vec<String> {
        let all = || {
            config
                .recipients
                .iter()
                .map(|(_, key)| key.clone())
                .collect::<Vec<_>>()
        };

        if event.force_send {
            return all();
        }

        match event.username.as_deref().filter(|u| !u.is_empty()) {
            Some(username) => match config.recipient(username) {
                Some(key) => vec![key.to_string()],
                None => {
                    tracing::info!(username, "User not in Bark configuration, skipping send");
                    Vec::new()
                }
            },
            None => all(),
        }
    }

    /// Dispatcher: one POST per target, outcomes in target order.
    ///
    /// Transport failures and provider rejections become failed outcomes;
    /// nothing is raised past this boundary.
    pub async fn dispatch(
        &self,
        config: &BarkConfig,
        title: &str,
        text: &str,
        targets: &[String],
    ) -> Vec<DispatchOutcome> {
        let url = config.push_url();
        let mut outcomes = Vec::with_capacity(targets.len());

        for target in targets {
            let mut form = config.extra_params.clone();
            form.push(("title".to_string(), title.to_string()));
            form.push(("body".to_string(), text.to_string()));
            form.push(("device_key".to_string(), target.clone()));

            let outcome = match self.transport.post_form(&url, &form).await {
                Ok(reply) if reply.status == 200 => match serde_json::from_str::<BarkReply>(
                    &reply.body,
                ) {
                    Ok(parsed) if parsed.code == BARK_SUCCESS_CODE => {
                        DispatchOutcome::success(target.clone(), parsed.code, None)
                    }
                    Ok(parsed) => DispatchOutcome::failure(
                        target.clone(),
                        Some(200),
                        Some(parsed.code),
                        parsed.message,
                    ),
                    Err(e) => DispatchOutcome::failure(
                        target.clone(),
                        Some(200),
                        None,
                        format!("unparsable response: {}", e),
                    ),
                },
                Ok(reply) => DispatchOutcome::failure(
                    target.clone(),
                    Some(reply.status),
                    None,
                    format!("HTTP {}", reply.status),
                ),
                Err(e) => {
                    tracing::warn!(target = %target, error = %e, "Bark request got no response");
                    DispatchOutcome::failure(target.clone(), None, None, "no response")
                }
            };

            if outcome.success {
                tracing::info!(target = %outcome.target, "Bark message sent");
            } else {
                tracing::warn!(
                    target = %outcome.target,
                    status = ?outcome.http_status,
                    code = ?outcome.provider_code,
                    message = ?outcome.message,
                    "Bark message failed"
                );
            }
            outcomes.push(outcome);
        }

        outcomes
    }

    /// Run the full pipeline for one event: filter, resolve, dispatch.
    ///
    /// Infallible by design; every failure mode ends as a logged outcome.
    pub async fn handle(&self, event: &NoticeMessage) -> Vec<DispatchOutcome> {
        let config = self.snapshot();

        if !Self::should_process(&config, event) {
            return Vec::new();
        }

        let targets = Self::resolve_targets(&config, event);
        if targets.is_empty() {
            return Vec::new();
        }

        let title = event.title.clone().unwrap_or_default();
        let text = event.text.clone().unwrap_or_default();
        self.dispatch(&config, &title, &text, &targets).await
    }
}
