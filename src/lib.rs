#[macro_use]
pub extern crate diesel;
#[macro_use]
pub extern crate strum_macros;
#[macro_use]
pub extern crate lazy_static;
#[macro_use]
pub extern crate failure;
pub extern crate actix_web;
pub extern crate bcrypt;
pub extern crate chrono;
pub extern crate jsonwebtoken;
pub extern crate serde;
pub extern crate serde_json;
pub extern crate strum;

pub mod api;
pub mod cache;
pub mod db;
pub mod routes;
pub mod schema;
pub mod settings;

use actix_web::{http::StatusCode, HttpResponse};
use regex::Regex;
use serde_json::json;

pub type DbPool = diesel::r2d2::Pool<diesel::r2d2::ConnectionManager<diesel::PgConnection>>;
pub type PostId = i32;
pub type GroupId = i32;
pub type UserId = i32;

#[derive(Fail, Debug)]
#[fail(display = "{{\"error\":\"{}\"}}", message)]
pub struct APIError {
  pub message: String,
}

impl APIError {
  pub fn err(msg: &str) -> Self {
    APIError {
      message: msg.to_string(),
    }
  }
}

#[derive(Debug)]
pub struct YatubeError {
  inner: failure::Error,
}

impl YatubeError {
  fn api_error(&self) -> Option<&APIError> {
    self.inner.downcast_ref::<APIError>()
  }

  /// The error code if this wraps an APIError, eg. "couldnt_find_post".
  pub fn api_message(&self) -> Option<&str> {
    self.api_error().map(|e| e.message.as_str())
  }
}

impl<T> From<T> for YatubeError
where
  T: Into<failure::Error>,
{
  fn from(t: T) -> Self {
    YatubeError { inner: t.into() }
  }
}

impl std::fmt::Display for YatubeError {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    self.inner.fmt(f)
  }
}

impl actix_web::error::ResponseError for YatubeError {
  fn status_code(&self) -> StatusCode {
    match self.api_error() {
      Some(e) if e.message.starts_with("couldnt_find") => StatusCode::NOT_FOUND,
      Some(_) => StatusCode::BAD_REQUEST,
      None => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let message = match self.api_error() {
      Some(e) => e.message.to_owned(),
      None => "internal_error".to_string(),
    };
    HttpResponse::build(self.status_code()).json(json!({ "error": message }))
  }
}

pub async fn blocking<F, T>(pool: &DbPool, f: F) -> Result<T, YatubeError>
where
  F: FnOnce(&diesel::PgConnection) -> T + Send + 'static,
  T: Send + 'static,
{
  let pool = pool.clone();
  let res = actix_web::web::block(move || {
    let conn = pool.get()?;
    let res = (f)(&conn);
    Ok(res) as Result<_, YatubeError>
  })
  .await?;

  Ok(res)
}

pub fn naive_now() -> chrono::NaiveDateTime {
  chrono::Utc::now().naive_utc()
}

lazy_static! {
  static ref EMAIL_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9.!#$%&’*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$").unwrap();
  static ref VALID_USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_]{3,30}$").unwrap();
  static ref VALID_SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9-]{1,200}$").unwrap();
}

pub fn is_email_regex(test: &str) -> bool {
  EMAIL_REGEX.is_match(test)
}

pub fn is_valid_username(name: &str) -> bool {
  VALID_USERNAME_REGEX.is_match(name)
}

pub fn is_valid_slug(slug: &str) -> bool {
  VALID_SLUG_REGEX.is_match(slug)
}

#[cfg(test)]
mod tests {
  use crate::{is_valid_slug, is_valid_username};

  #[test]
  fn test_valid_username() {
    assert!(is_valid_username("gen_nadiy"));
    assert!(is_valid_username("leo_92"));
    assert!(!is_valid_username("no"));
    assert!(!is_valid_username("invalid username"));
    assert!(!is_valid_username("nope@nope.com"));
    assert!(!is_valid_username(""));
  }

  #[test]
  fn test_valid_slug() {
    assert!(is_valid_slug("cats"));
    assert!(is_valid_slug("test-slug-2"));
    assert!(!is_valid_slug("Caps"));
    assert!(!is_valid_slug("under_scores"));
    assert!(!is_valid_slug(""));
  }
}
