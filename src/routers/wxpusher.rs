//! WxPusher notification router.
//!
//! Forwards notice messages to the WxPusher send API. Unlike Bark, WxPusher
//! accepts a batched request: all resolved UIDs and topic ids travel in one
//! JSON POST, so a dispatch produces exactly one outcome.
//!
//! WxPusher API Reference: https://wxpusher.zjiecode.com/docs

use std::sync::{Arc, RwLock};

use serde::Deserialize;
use serde_json::json;

use crate::config::WxPusherSettings;
use crate::events::NoticeMessage;
use crate::routers::outcome::DispatchOutcome;
use crate::routers::transport::PushTransport;

/// Provider-level success code in the WxPusher response body.
const WXPUSHER_SUCCESS_CODE: i64 = 1000;

/// Immutable WxPusher router configuration snapshot.
#[derive(Debug, Clone, Default)]
pub struct WxPusherConfig {
    pub enabled: bool,
    pub app_token: String,
    pub api_url: String,
    /// Ordered (username, uid) pairs parsed from the recipient text
    pub recipients: Vec<(String, String)>,
    /// Bare UIDs from the recipient text (legacy broadcast format)
    pub fallback_uids: Vec<String>,
    /// Configured topic ids
    pub topic_ids: Vec<String>,
    /// Default content type: 1 = text, 2 = HTML, 3 = markdown
    pub content_type: i32,
    /// Allowlist of catalog names; empty allows all
    pub msgtypes: Vec<String>,
}

impl WxPusherConfig {
    /// Build a snapshot from raw settings.
    pub fn from_settings(settings: &WxPusherSettings) -> Self {
        let (recipients, fallback_uids) = parse_recipients(&settings.uids);
        Self {
            enabled: settings.enabled,
            app_token: settings.app_token.trim().to_string(),
            api_url: settings.api_url.trim().to_string(),
            recipients,
            fallback_uids,
            topic_ids: parse_list(&settings.topic_ids),
            content_type: settings.content_type,
            msgtypes: settings.msgtypes.clone(),
        }
    }

    /// Whether the router is operational: enabled with an app token set.
    ///
    /// Recipients are not required here; topic-only setups are valid, and a
    /// per-event override can still supply UIDs.
    pub fn state(&self) -> bool {
        self.enabled && !self.app_token.is_empty()
    }

    /// Look up the UID mapped to a username.
    pub fn recipient(&self, username: &str) -> Option<&str> {
        self.recipients
            .iter()
            .find(|(user, _)| user == username)
            .map(|(_, uid)| uid.as_str())
    }
}

/// Parse the recipient text into a username map plus a bare-UID fallback list.
///
/// Comma-separated entries, each trimmed. An entry containing a colon is split
/// on the first colon into `username:uid`; a colon-free entry is a bare UID in
/// the legacy broadcast format. A repeated username overwrites the earlier
/// entry, keeping its position.
fn parse_recipients(raw: &str) -> (Vec<(String, String)>, Vec<String>) {
    let mut recipients: Vec<(String, String)> = Vec::new();
    let mut fallback: Vec<String> = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        match entry.split_once(':') {
            Some((username, uid)) => {
                let username = username.trim();
                let uid = uid.trim();
                if username.is_empty() {
                    continue;
                }
                if let Some(slot) = recipients.iter_mut().find(|(user, _)| user == username) {
                    slot.1 = uid.to_string();
                } else {
                    recipients.push((username.to_string(), uid.to_string()));
                }
            }
            None => fallback.push(entry.to_string()),
        }
    }
    (recipients, fallback)
}

/// Split a comma-separated list, trimming and dropping empty entries.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Bare UIDs from a per-event recipient override (colon entries are ignored;
/// the override carries direct UIDs, not username mappings).
fn override_uids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.contains(':'))
        .map(str::to_string)
        .collect()
}

/// WxPusher API response body.
#[derive(Debug, Deserialize)]
struct WxPusherReply {
    code: i64,
    #[serde(default)]
    msg: String,
}

/// WxPusher router: filter, resolve, dispatch.
pub struct WxPusherRouter {
    config: RwLock<Arc<WxPusherConfig>>,
    transport: Arc<dyn PushTransport>,
}

impl WxPusherRouter {
    /// Create the router from settings.
    pub fn new(settings: &WxPusherSettings, transport: Arc<dyn PushTransport>) -> Self {
        Self {
            config: RwLock::new(Arc::new(WxPusherConfig::from_settings(settings))),
            transport,
        }
    }

    /// Replace the configuration snapshot wholesale.
    pub fn reload(&self, settings: &WxPusherSettings) {
        let fresh = Arc::new(WxPusherConfig::from_settings(settings));
        *self.config.write().expect("wxpusher config lock poisoned") = fresh;
    }

    /// The current configuration snapshot.
    pub fn snapshot(&self) -> Arc<WxPusherConfig> {
        self.config
            .read()
            .expect("wxpusher config lock poisoned")
            .clone()
    }

    /// Whether the router is enabled and fully configured.
    pub fn state(&self) -> bool {
        self.snapshot().state()
    }

    /// Event filter: decide whether an event should be processed at all.
    pub fn should_process(config: &WxPusherConfig, event: &NoticeMessage) -> bool {
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
            tracing::info!(msg_type = %msg_type, "Message type not enabled for WxPusher forwarding");
            return false;
        }
        true
    }

    /// Recipient resolver, yielding the UID list. First matching branch wins:
    /// 1. forced send → every mapped UID plus the bare-UID fallback list;
    /// 2. username mapped → that single UID;
    /// 3. username unmapped → nothing (fail closed);
    /// 4. no username → the bare-UID fallback list, or the per-event override
    ///    when the configuration carries none.
    pub fn resolve_uids(config: &WxPusherConfig, event: &NoticeMessage) -> Vec<String> {
        if event.force_send {
            let mut uids: Vec<String> =
                config.recipients.iter().map(|(_, uid)| uid.clone()).collect();
            uids.extend(config.fallback_uids.iter().cloned());
            return uids;
        }

        match event.username.as_deref().filter(|u| !u.is_empty()) {
            Some(username) => match config.recipient(username) {
                Some(uid) => vec![uid.to_string()],
                None => {
                    tracing::info!(username, "User not in WxPusher configuration, skipping send");
                    Vec::new()
                }
            },
            None => {
                if !config.fallback_uids.is_empty() {
                    return config.fallback_uids.clone();
                }
                event
                    .uids
                    .as_deref()
                    .map(override_uids)
                    .unwrap_or_default()
            }
        }
    }

    /// Resolve the topic ids for an event.
    ///
    /// A username-addressed event never fans out to topics. Otherwise the
    /// per-event override replaces the configured topic list when present.
    pub fn resolve_topics(config: &WxPusherConfig, event: &NoticeMessage) -> Vec<String> {
        if event.username.as_deref().is_some_and(|u| !u.is_empty()) && !event.force_send {
            return Vec::new();
        }
        match event.topic_ids.as_deref() {
            Some(raw) => parse_list(raw),
            None => config.topic_ids.clone(),
        }
    }

    /// Dispatcher: one batched JSON POST covering every UID and topic.
    ///
    /// Transport failures and provider rejections become a failed outcome;
    /// nothing is raised past this boundary.
    pub async fn dispatch(
        &self,
        config: &WxPusherConfig,
        event: &NoticeMessage,
        uids: &[String],
        topics: &[String],
    ) -> DispatchOutcome {
        let title = event.title.as_deref().unwrap_or("");
        let text = event.text.as_deref().filter(|t| !t.is_empty()).unwrap_or(title);
        let summary = event
            .summary
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(title);
        let content_type = event.content_type.unwrap_or(config.content_type);

        let mut payload = json!({
            "appToken": config.app_token,
            "content": text,
            "summary": summary,
            "contentType": content_type,
        });
        if !uids.is_empty() {
            payload["uids"] = json!(uids);
        }
        if !topics.is_empty() {
            payload["topicIds"] = json!(topics);
        }

        let target = if uids.is_empty() {
            format!("topics:{}", topics.join(","))
        } else {
            uids.join(",")
        };

        let outcome = match self.transport.post_json(&config.api_url, &payload).await {
            Ok(reply) if reply.status == 200 => {
                match serde_json::from_str::<WxPusherReply>(&reply.body) {
                    Ok(parsed) if parsed.code == WXPUSHER_SUCCESS_CODE => {
                        DispatchOutcome::success(target, parsed.code, Some(parsed.msg))
                    }
                    Ok(parsed) => DispatchOutcome::failure(
                        target,
                        Some(200),
                        Some(parsed.code),
                        parsed.msg,
                    ),
                    Err(e) => DispatchOutcome::failure(
                        target,
                        Some(200),
                        None,
                        format!("unparsable response: {}", e),
                    ),
                }
            }
            Ok(reply) => DispatchOutcome::failure(
                target,
                Some(reply.status),
                None,
                format!("HTTP {}", reply.status),
            ),
            Err(e) => {
                tracing::warn!(error = %e, "WxPusher request got no response");
                DispatchOutcome::failure(target, None, None, "no response")
            }
        };

        if outcome.success {
            tracing::info!(target = %outcome.target, "WxPusher message sent");
        } else {
            tracing::warn!(
                target = %outcome.target,
                status = ?outcome.http_status,
                code = ?outcome.provider_code,
                message = ?outcome.message,
                "WxPusher message failed"
            );
        }
        outcome
    }

    /// Run the full pipeline for one event: filter, resolve, dispatch.
    ///
    /// Infallible by design; every failure mode ends as a logged outcome.
    pub async fn handle(&self, event: &NoticeMessage) -> Vec<DispatchOutcome> {
        let config = self.snapshot();

        if !Self::should_process(&config, event) {
            return Vec::new();
        }

        let uids = Self::resolve_uids(&config, event);
        let topics = Self::resolve_topics(&config, event);
        if uids.is_empty() && topics.is_empty() {
            tracing::info!("No WxPusher recipients resolved, nothing to send");
            return Vec::new();
        }

        vec![self.dispatch(&config, event, &uids, &topics).await]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NotificationType;
    use crate::routers::transport::testing::{Recorded, RecordingTransport};
    use proptest::prelude::*;

    const OK_BODY: &str = r#"{"code":1000,"msg":"success","data":[]}"#;

    fn settings(uids: &str) -> WxPusherSettings {
        WxPusherSettings {
            enabled: true,
            app_token: "AT_token".to_string(),
            uids: uids.to_string(),
            ..Default::default()
        }
    }

    fn router(uids: &str, transport: Arc<RecordingTransport>) -> WxPusherRouter {
        WxPusherRouter::new(&settings(uids), transport)
    }

    fn recorded_json(requests: &[Recorded]) -> (String, serde_json::Value) {
        let Recorded::Json { url, body } = &requests[0] else {
            panic!("expected a JSON POST");
        };
        (url.clone(), body.clone())
    }

    // ------------------------------------------------------------------
    // Parsing
    // ------------------------------------------------------------------

    #[test]
    fn test_parse_recipients_mixed_entries() {
        let (recipients, fallback) = parse_recipients("alice:UID1, bob : UID2 ,UID3,");
        assert_eq!(
            recipients,
            vec![
                ("alice".to_string(), "UID1".to_string()),
                ("bob".to_string(), "UID2".to_string()),
            ]
        );
        assert_eq!(fallback, vec!["UID3".to_string()]);
    }

    #[test]
    fn test_parse_recipients_duplicate_username_last_wins() {
        let (recipients, _) = parse_recipients("alice:OLD,alice:NEW");
        assert_eq!(recipients, vec![("alice".to_string(), "NEW".to_string())]);
    }

    #[test]
    fn test_parse_topic_list_trims_and_drops_empty() {
        assert_eq!(parse_list(" 101 ,,102 , "), vec!["101", "102"]);
        assert!(parse_list("").is_empty());
    }

    proptest! {
        #[test]
        fn prop_every_entry_lands_exactly_once(
            user in "[a-z]{1,8}",
            uid in "UID_[A-Za-z0-9]{1,12}",
            bare in "UID_[A-Za-z0-9]{1,12}",
        ) {
            let (recipients, fallback) =
                parse_recipients(&format!("{}:{} , {}", user, uid, bare));
            prop_assert_eq!(recipients, vec![(user, uid)]);
            prop_assert_eq!(fallback, vec![bare]);
        }

        #[test]
        fn prop_parsing_is_idempotent(raw in "[a-z0-9:, ]{0,64}") {
            prop_assert_eq!(parse_recipients(&raw), parse_recipients(&raw));
        }
    }

    // ------------------------------------------------------------------
    // Filter and resolver
    // ------------------------------------------------------------------

    #[test]
    fn test_state_requires_app_token() {
        let mut s = settings("UID1");
        s.app_token = String::new();
        assert!(!WxPusherConfig::from_settings(&s).state());
    }

    #[test]
    fn test_filter_applies_allowlist_with_force_bypass() {
        let mut s = settings("UID1");
        s.msgtypes = vec!["Download".to_string()];
        let config = WxPusherConfig::from_settings(&s);

        let blocked = NoticeMessage::new("T", "B").with_type(NotificationType::Plugin);
        assert!(!WxPusherRouter::should_process(&config, &blocked));

        let forced = NoticeMessage::new("T", "B")
            .with_type(NotificationType::Plugin)
            .forced();
        assert!(WxPusherRouter::should_process(&config, &forced));
    }

    #[test]
    fn test_resolver_mapped_username_single_uid() {
        let config = WxPusherConfig::from_settings(&settings("alice:UID1,UID2"));
        let event = NoticeMessage::new("T", "B").with_username("alice");
        assert_eq!(WxPusherRouter::resolve_uids(&config, &event), vec!["UID1"]);
    }

    #[test]
    fn test_resolver_unknown_username_fails_closed_despite_fallback() {
        let config = WxPusherConfig::from_settings(&settings("alice:UID1,UID2"));
        let event = NoticeMessage::new("T", "B").with_username("carol");
        assert!(WxPusherRouter::resolve_uids(&config, &event).is_empty());
    }

    #[test]
    fn test_resolver_no_username_uses_fallback_list() {
        let config = WxPusherConfig::from_settings(&settings("alice:UID1,UID2,UID3"));
        let event = NoticeMessage::new("T", "B");
        assert_eq!(
            WxPusherRouter::resolve_uids(&config, &event),
            vec!["UID2", "UID3"]
        );
    }

    #[test]
    fn test_resolver_event_override_fills_empty_fallback() {
        let config = WxPusherConfig::from_settings(&settings("alice:UID1"));
        let mut event = NoticeMessage::new("T", "B");
        event.uids = Some("UID8, UID9".to_string());
        assert_eq!(
            WxPusherRouter::resolve_uids(&config, &event),
            vec!["UID8", "UID9"]
        );
    }

    #[test]
    fn test_resolver_force_send_targets_everyone() {
        let config = WxPusherConfig::from_settings(&settings("alice:UID1,UID2"));
        let event = NoticeMessage::new("T", "B").with_username("carol").forced();
        assert_eq!(
            WxPusherRouter::resolve_uids(&config, &event),
            vec!["UID1", "UID2"]
        );
    }

    #[test]
    fn test_topics_suppressed_for_username_addressed_events() {
        let mut s = settings("alice:UID1");
        s.topic_ids = "101,102".to_string();
        let config = WxPusherConfig::from_settings(&s);

        let addressed = NoticeMessage::new("T", "B").with_username("alice");
        assert!(WxPusherRouter::resolve_topics(&config, &addressed).is_empty());

        let broadcast = NoticeMessage::new("T", "B");
        assert_eq!(
            WxPusherRouter::resolve_topics(&config, &broadcast),
            vec!["101", "102"]
        );
    }

    #[test]
    fn test_topic_override_replaces_configured_list() {
        let mut s = settings("");
        s.topic_ids = "101".to_string();
        let config = WxPusherConfig::from_settings(&s);

        let mut event = NoticeMessage::new("T", "B");
        event.topic_ids = Some("205,206".to_string());
        assert_eq!(
            WxPusherRouter::resolve_topics(&config, &event),
            vec!["205", "206"]
        );
    }

    // ------------------------------------------------------------------
    // Dispatch scenarios
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_single_json_post_covers_all_uids() {
        let transport = Arc::new(RecordingTransport::replying(200, OK_BODY));
        let router = router("UID1,UID2", transport.clone());

        let outcomes = router.handle(&NoticeMessage::new("Title", "Body")).await;

        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].success);
        assert_eq!(outcomes[0].provider_code, Some(1000));

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let (url, body) = recorded_json(&requests);
        assert_eq!(url, "https://wxpusher.zjiecode.com/api/send/message");
        assert_eq!(body["appToken"], "AT_token");
        assert_eq!(body["content"], "Body");
        assert_eq!(body["summary"], "Title");
        assert_eq!(body["contentType"], 1);
        assert_eq!(body["uids"], serde_json::json!(["UID1", "UID2"]));
        assert!(body.get("topicIds").is_none());
    }

    #[tokio::test]
    async fn test_content_and_summary_fall_back_to_title() {
        let transport = Arc::new(RecordingTransport::replying(200, OK_BODY));
        let router = router("UID1", transport.clone());

        router.handle(&NoticeMessage::new("Only title", "")).await;

        let (_, body) = recorded_json(&transport.requests());
        assert_eq!(body["content"], "Only title");
        assert_eq!(body["summary"], "Only title");
    }

    #[tokio::test]
    async fn test_event_content_type_override() {
        let transport = Arc::new(RecordingTransport::replying(200, OK_BODY));
        let router = router("UID1", transport.clone());

        let mut event = NoticeMessage::new("T", "B");
        event.content_type = Some(3);
        router.handle(&event).await;

        let (_, body) = recorded_json(&transport.requests());
        assert_eq!(body["contentType"], 3);
    }

    #[tokio::test]
    async fn test_topics_only_send_has_no_uids_field() {
        let transport = Arc::new(RecordingTransport::replying(200, OK_BODY));
        let mut s = settings("");
        s.topic_ids = "101".to_string();
        let router = WxPusherRouter::new(&s, transport.clone());

        let outcomes = router.handle(&NoticeMessage::new("T", "B")).await;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].target, "topics:101");
        let (_, body) = recorded_json(&transport.requests());
        assert!(body.get("uids").is_none());
        assert_eq!(body["topicIds"], serde_json::json!(["101"]));
    }

    #[tokio::test]
    async fn test_no_recipients_resolved_makes_no_http_call() {
        let transport = Arc::new(RecordingTransport::replying(200, OK_BODY));
        let router = router("alice:UID1", transport.clone());

        // Broadcast event, no fallback UIDs, no topics, no override.
        let outcomes = router.handle(&NoticeMessage::new("T", "B")).await;

        assert!(outcomes.is_empty());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_provider_rejection_yields_failed_outcome() {
        let transport = Arc::new(RecordingTransport::replying(
            200,
            r#"{"code":1001,"msg":"appToken invalid"}"#,
        ));
        let router = router("UID1", transport);

        let outcomes = router.handle(&NoticeMessage::new("T", "B")).await;

        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].success);
        assert_eq!(outcomes[0].provider_code, Some(1001));
        assert_eq!(outcomes[0].message.as_deref(), Some("appToken invalid"));
    }

    #[tokio::test]
    async fn test_transport_failure_yields_no_response_outcome() {
        let transport = Arc::new(RecordingTransport::failing("dns failure"));
        let router = router("UID1", transport);

        let outcomes = router.handle(&NoticeMessage::new("T", "B")).await;

        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].success);
        assert_eq!(outcomes[0].http_status, None);
        assert_eq!(outcomes[0].message.as_deref(), Some("no response"));
    }

    #[test]
    fn test_reload_replaces_snapshot_wholesale() {
        let transport = Arc::new(RecordingTransport::replying(200, OK_BODY));
        let router = router("alice:UID1", transport);
        assert!(router.state());

        let mut s = settings("bob:UID2");
        s.enabled = false;
        router.reload(&s);

        assert!(!router.state());
        let snapshot = router.snapshot();
        assert_eq!(snapshot.recipient("bob"), Some("UID2"));
        assert_eq!(snapshot.recipient("alice"), None);
    }
}
