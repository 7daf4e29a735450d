use crate::db::user::Claims;
use actix_web::http::header;
use actix_web::{HttpMessage, HttpRequest, HttpResponse};
use serde_json::json;

pub mod auth;
pub mod pages;

/// Pulls the session jwt out of the `jwt` cookie, falling back to an
/// `Authorization: Bearer` header.
pub fn get_auth(req: &HttpRequest) -> Option<String> {
  if let Some(cookie) = req.cookie("jwt") {
    return Some(cookie.value().to_string());
  }
  req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|h| h.to_str().ok())
    .and_then(|h| h.strip_prefix("Bearer "))
    .map(|h| h.to_string())
}

pub fn get_claims(req: &HttpRequest) -> Option<Claims> {
  get_auth(req).and_then(|jwt| Claims::decode(&jwt).ok().map(|t| t.claims))
}

pub fn login_url(next: &str) -> String {
  format!("/auth/login/?next={}", next)
}

pub fn redirect(location: &str) -> HttpResponse {
  HttpResponse::Found()
    .header(header::LOCATION, location)
    .finish()
}

/// The not logged in answer for protected pages: off to the login page,
/// with the original path preserved as the return target.
pub fn redirect_to_login(next: &str) -> HttpResponse {
  redirect(&login_url(next))
}

/// The custom error page, in json form.
pub async fn not_found() -> HttpResponse {
  HttpResponse::NotFound().json(json!({ "error": "not_found" }))
}

#[cfg(test)]
mod tests {
  use super::login_url;

  #[test]
  fn test_login_url_keeps_return_target() {
    assert_eq!("/auth/login/?next=/create/", login_url("/create/"));
    assert_eq!(
      "/auth/login/?next=/posts/7/edit/",
      login_url("/posts/7/edit/")
    );
  }
}
