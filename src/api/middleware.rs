use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tower_cookies::Cookies;

/// Caller identity as established by the upstream auth layer, which sets the
/// `ecotrack_user` cookie. Issuing and verifying that cookie is not this
/// service's job.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub String);

pub async fn auth_middleware(cookies: Cookies, mut request: Request, next: Next) -> Response {
    if let Some(cookie) = cookies.get("ecotrack_user") {
        let user_id = cookie.value().trim().to_string();
        if !user_id.is_empty() {
            request.extensions_mut().insert(CurrentUser(user_id));
            return next.run(request).await;
        }
    }
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Unauthorized"})),
    )
        .into_response()
}
