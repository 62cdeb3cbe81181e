//! Settings form schemas.
//!
//! Each router publishes a declarative description of its settings form:
//! a field list for the host UI to render plus the default values. The
//! schemas are static metadata derived from the settings structures; no
//! runtime state flows into them.

use serde::Serialize;
use serde_json::{Value, json};

use crate::config::{BarkSettings, WxPusherSettings};
use crate::events::NotificationType;

/// A renderable settings form: field descriptors plus default values.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct FormSchema {
    /// Router identifier the form belongs to
    #[schema(value_type = String)]
    pub router: &'static str,
    /// Ordered field descriptors
    #[schema(value_type = Vec<Object>)]
    pub fields: Vec<Value>,
    /// Default value per field key
    #[schema(value_type = Object)]
    pub defaults: Value,
}

/// Message-type selector options shared by both forms.
fn msgtype_options() -> Vec<Value> {
    NotificationType::all()
        .iter()
        .map(|t| json!({ "value": t.as_str(), "title": t.label() }))
        .collect()
}

/// The Bark settings form.
pub fn bark_form() -> FormSchema {
    let defaults = BarkSettings::default();
    FormSchema {
        router: "bark",
        fields: vec![
            json!({
                "key": "enabled",
                "component": "switch",
                "label": "Enable Bark forwarding",
            }),
            json!({
                "key": "server",
                "component": "text",
                "label": "Bark server URL",
                "placeholder": "https://api.day.app",
            }),
            json!({
                "key": "apikey",
                "component": "textarea",
                "label": "Device keys",
                "placeholder": "username:device_key, one entry per line or space-separated",
                "hint": "Entries without a username colon are ignored",
            }),
            json!({
                "key": "params",
                "component": "text",
                "label": "Extra push parameters",
                "placeholder": "sound=alarm&group=media",
            }),
            json!({
                "key": "msgtypes",
                "component": "select",
                "label": "Message types",
                "multiple": true,
                "options": msgtype_options(),
                "hint": "Leave empty to forward every type",
            }),
        ],
        defaults: json!({
            "enabled": defaults.enabled,
            "server": defaults.server,
            "apikey": defaults.apikey,
            "params": defaults.params,
            "msgtypes": defaults.msgtypes,
        }),
    }
}

/// The WxPusher settings form.
pub fn wxpusher_form() -> FormSchema {
    let defaults = WxPusherSettings::default();
    FormSchema {
        router: "wxpusher",
        fields: vec![
            json!({
                "key": "enabled",
                "component": "switch",
                "label": "Enable WxPusher forwarding",
            }),
            json!({
                "key": "run_on_start",
                "component": "switch",
                "label": "Send a test message on startup",
            }),
            json!({
                "key": "app_token",
                "component": "text",
                "label": "Application token",
                "placeholder": "AT_...",
            }),
            json!({
                "key": "uids",
                "component": "textarea",
                "label": "Recipient UIDs",
                "placeholder": "username:UID_xxx, UID_yyy",
                "hint": "Comma-separated; bare UIDs receive broadcast messages",
            }),
            json!({
                "key": "topic_ids",
                "component": "text",
                "label": "Topic ids",
                "placeholder": "101,102",
            }),
            json!({
                "key": "content_type",
                "component": "select",
                "label": "Content type",
                "options": [
                    { "value": 1, "title": "Text" },
                    { "value": 2, "title": "HTML" },
                    { "value": 3, "title": "Markdown" },
                ],
            }),
            json!({
                "key": "msgtypes",
                "component": "select",
                "label": "Message types",
                "multiple": true,
                "options": msgtype_options(),
                "hint": "Leave empty to forward every type",
            }),
        ],
        defaults: json!({
            "enabled": defaults.enabled,
            "run_on_start": defaults.run_on_start,
            "app_token": defaults.app_token,
            "uids": defaults.uids,
            "topic_ids": defaults.topic_ids,
            "content_type": defaults.content_type,
            "msgtypes": defaults.msgtypes,
        }),
    }
}

/// All router forms, in display order.
pub fn all_forms() -> Vec<FormSchema> {
    vec![bark_form(), wxpusher_form()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_field_has_a_default() {
        for form in all_forms() {
            let defaults = form.defaults.as_object().expect("defaults is an object");
            for field in &form.fields {
                let key = field["key"].as_str().expect("field has a key");
                assert!(
                    defaults.contains_key(key),
                    "{} form is missing a default for {}",
                    form.router,
                    key
                );
            }
        }
    }

    #[test]
    fn test_defaults_match_settings_defaults() {
        let bark = bark_form();
        assert_eq!(bark.defaults["server"], "https://api.day.app");
        assert_eq!(bark.defaults["enabled"], false);

        let wxpusher = wxpusher_form();
        assert_eq!(wxpusher.defaults["content_type"], 1);
        assert_eq!(wxpusher.defaults["enabled"], false);
    }

    #[test]
    fn test_msgtype_options_cover_the_catalog() {
        assert_eq!(msgtype_options().len(), NotificationType::all().len());
    }
}
