//! Settings form schema endpoint.

use axum::{Router, response::Json, routing::get};

use crate::api::doc::FORM_TAG;
use crate::forms::{FormSchema, all_forms};
use crate::state::AppState;

/// Creates the form schema routes.
///
/// # Routes
/// - `GET /forms` - Form schemas for every router
pub fn form_routes() -> Router<AppState> {
    Router::new().route("/forms", get(list_forms))
}

/// List the settings form schema of every router.
#[utoipa::path(
    get,
    path = "/api/forms",
    responses(
        (status = 200, description = "Form schemas", body = Vec<FormSchema>)
    ),
    tag = FORM_TAG
)]
pub async fn list_forms() -> Json<Vec<FormSchema>> {
    Json(all_forms())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_both_router_forms() {
        let Json(forms) = list_forms().await;
        let routers: Vec<_> = forms.iter().map(|f| f.router).collect();
        assert_eq!(routers, vec!["bark", "wxpusher"]);
    }
}
