use crate::{
  api::user::{Login, Register},
  api::{Oper, Perform},
  routes::redirect,
  DbPool,
  YatubeError,
};
use actix_web::http::header;
use actix_web::{cookie::Cookie, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

pub fn config(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/auth/login/", web::get().to(login_page))
    .route("/auth/login/", web::post().to(login))
    .route("/auth/signup/", web::post().to(signup))
    .route("/auth/logout/", web::post().to(logout));
}

#[derive(Deserialize)]
struct NextQuery {
  next: Option<String>,
}

// The rendered login form lives in the frontend; this is only the address
// guests get redirected to.
async fn login_page(query: web::Query<NextQuery>) -> HttpResponse {
  HttpResponse::Ok().json(json!({ "login_required": true, "next": query.next }))
}

fn session_response(jwt: String) -> HttpResponse {
  let cookie = Cookie::build("jwt", jwt.to_owned())
    .path("/")
    .http_only(true)
    .finish();
  HttpResponse::Ok().cookie(cookie).json(json!({ "jwt": jwt }))
}

async fn login(
  data: web::Json<Login>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  let res = Oper::new(data.into_inner()).perform(&db).await?;
  Ok(session_response(res.jwt))
}

async fn signup(
  data: web::Json<Register>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  let res = Oper::new(data.into_inner()).perform(&db).await?;
  Ok(session_response(res.jwt))
}

async fn logout() -> HttpResponse {
  let mut res = redirect("/");
  res.headers_mut().append(
    header::SET_COOKIE,
    header::HeaderValue::from_static("jwt=; Max-Age=0; Path=/"),
  );
  res
}
