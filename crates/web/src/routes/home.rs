//! Home page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::Query;

use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::routes::MessageQuery;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub current_user: Option<CurrentUser>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the home page.
pub async fn home(
    OptionalAuth(current_user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> HomeTemplate {
    HomeTemplate {
        current_user,
        error: query.error,
        success: query.success,
    }
}
