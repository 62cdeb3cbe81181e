use utoipa::OpenApi;

pub const HEALTH_TAG: &str = "Health";
pub const TRIGGER_TAG: &str = "Trigger";
pub const CONFIG_TAG: &str = "Config";
pub const FORM_TAG: &str = "Forms";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "pushrelay",
        description = "A notification forwarding service for Bark and WxPusher",
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::health::liveness_check,
        crate::api::handlers::run::run_test_message,
        crate::api::handlers::config::reload_config,
        crate::api::handlers::forms::list_forms,
    ),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::api::dto::RunResponse,
            crate::api::dto::ReloadResponse,
            crate::forms::FormSchema,
            crate::events::NotificationType,
        )
    ),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = TRIGGER_TAG, description = "On-demand test message trigger"),
        (name = CONFIG_TAG, description = "Configuration reload endpoints"),
        (name = FORM_TAG, description = "Settings form schema endpoints"),
    )
)]
pub struct ApiDoc;
