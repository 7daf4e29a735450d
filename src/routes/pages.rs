use crate::{
  api::{
    comment::CreateComment,
    group::GetGroup,
    post::{CreatePost, CreatePostLike, EditPost, GetPost, GetPosts},
    user::{FollowUser, GetUserDetails},
    APIError,
    Oper,
    Perform,
  },
  cache,
  db::ListingType,
  routes::{get_auth, get_claims, redirect, redirect_to_login},
  settings::Settings,
  DbPool,
  YatubeError,
};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub fn config(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/", web::get().to(index))
    .route("/create/", web::get().to(post_create_page))
    .route("/create/", web::post().to(post_create))
    .route("/follow/", web::get().to(follow_index))
    .route("/group/{slug}/", web::get().to(group_posts))
    .route("/posts/{id}/", web::get().to(post_detail))
    .route("/posts/{id}/edit/", web::get().to(post_edit_page))
    .route("/posts/{id}/edit/", web::post().to(post_edit))
    .route("/posts/{id}/comment/", web::post().to(add_comment))
    .route("/posts/{id}/like/", web::post().to(post_like))
    .route("/posts/{id}/unlike/", web::post().to(post_unlike))
    .route("/profile/{username}/", web::get().to(profile))
    .route("/profile/{username}/follow/", web::get().to(profile_follow))
    .route(
      "/profile/{username}/unfollow/",
      web::get().to(profile_unfollow),
    );
}

#[derive(Deserialize)]
pub struct PageQuery {
  page: Option<String>,
}

impl PageQuery {
  // A non numeric page parameter means the first page
  fn number(&self) -> Option<i64> {
    self.page.as_ref().and_then(|p| p.parse::<i64>().ok())
  }

  fn cache_key(&self) -> String {
    self.page.to_owned().unwrap_or_else(|| "1".to_string())
  }
}

#[derive(Deserialize)]
pub struct PostInput {
  pub text: String,
  pub group_id: Option<i32>,
  pub image: Option<String>,
}

#[derive(Deserialize)]
pub struct CommentInput {
  pub text: String,
}

fn json_response(body: String) -> HttpResponse {
  HttpResponse::Ok()
    .content_type("application/json")
    .body(body)
}

/// The main listing. Its rendered output is cached per page parameter and
/// only refreshed on expiry or an explicit cache::clear(), so recent
/// deletions can stay visible here for a while.
async fn index(
  query: web::Query<PageQuery>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  let max_age = Duration::from_secs(Settings::get().index_cache_seconds);
  let cache_key = query.cache_key();
  if let Some(body) = cache::get(&cache_key, max_age) {
    return Ok(json_response(body));
  }

  let oper = Oper::new(GetPosts {
    type_: ListingType::All.to_string(),
    page: query.number(),
    auth: None,
  });
  let res = oper.perform(&db).await?;

  let body = serde_json::to_string(&res)?;
  cache::put(&cache_key, &body);
  Ok(json_response(body))
}

async fn group_posts(
  path: web::Path<String>,
  query: web::Query<PageQuery>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  let oper = Oper::new(GetGroup {
    slug: path.into_inner(),
    page: query.number(),
  });
  Ok(HttpResponse::Ok().json(oper.perform(&db).await?))
}

async fn profile(
  req: HttpRequest,
  path: web::Path<String>,
  query: web::Query<PageQuery>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  let oper = Oper::new(GetUserDetails {
    username: path.into_inner(),
    page: query.number(),
    auth: get_auth(&req),
  });
  Ok(HttpResponse::Ok().json(oper.perform(&db).await?))
}

async fn post_detail(
  req: HttpRequest,
  path: web::Path<i32>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  let oper = Oper::new(GetPost {
    id: path.into_inner(),
    auth: get_auth(&req),
  });
  Ok(HttpResponse::Ok().json(oper.perform(&db).await?))
}

async fn post_create_page(req: HttpRequest) -> Result<HttpResponse, YatubeError> {
  if get_claims(&req).is_none() {
    return Ok(redirect_to_login("/create/"));
  }
  Ok(HttpResponse::Ok().json(json!({ "fields": ["text", "group_id", "image"] })))
}

async fn post_create(
  req: HttpRequest,
  body: Option<web::Json<PostInput>>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  let claims = match get_claims(&req) {
    Some(claims) => claims,
    None => return Ok(redirect_to_login("/create/")),
  };
  let input = match body {
    Some(body) => body.into_inner(),
    None => return Err(APIError::err("invalid_post_form").into()),
  };

  let oper = Oper::new(CreatePost {
    text: input.text,
    group_id: input.group_id,
    image: input.image,
    auth: get_auth(&req).unwrap_or_default(),
  });
  oper.perform(&db).await?;

  Ok(redirect(&format!("/profile/{}/", claims.username)))
}

async fn post_edit_page(
  req: HttpRequest,
  path: web::Path<i32>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  let id = path.into_inner();
  let claims = match get_claims(&req) {
    Some(claims) => claims,
    None => return Ok(redirect_to_login(&format!("/posts/{}/edit/", id))),
  };

  let oper = Oper::new(GetPost {
    id,
    auth: get_auth(&req),
  });
  let res = oper.perform(&db).await?;

  // Only the author gets the edit page, everyone else goes back to the post
  if res.post.author_id != claims.id {
    return Ok(redirect(&format!("/posts/{}/", id)));
  }

  Ok(HttpResponse::Ok().json(res))
}

async fn post_edit(
  req: HttpRequest,
  path: web::Path<i32>,
  body: Option<web::Json<PostInput>>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  let id = path.into_inner();
  let detail_url = format!("/posts/{}/", id);

  if get_claims(&req).is_none() {
    return Ok(redirect_to_login(&format!("/posts/{}/edit/", id)));
  }
  let input = match body {
    Some(body) => body.into_inner(),
    None => return Err(APIError::err("invalid_post_form").into()),
  };

  let oper = Oper::new(EditPost {
    edit_id: id,
    text: input.text,
    group_id: input.group_id,
    image: input.image,
    auth: get_auth(&req).unwrap_or_default(),
  });
  match oper.perform(&db).await {
    Ok(_res) => Ok(redirect(&detail_url)),
    // Someone elses post is not an error here, just a bounce back to it
    Err(e) if e.api_message() == Some("no_post_edit_allowed") => Ok(redirect(&detail_url)),
    Err(e) => Err(e),
  }
}

async fn add_comment(
  req: HttpRequest,
  path: web::Path<i32>,
  body: Option<web::Json<CommentInput>>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  let id = path.into_inner();

  if get_claims(&req).is_none() {
    return Ok(redirect_to_login(&format!("/posts/{}/comment/", id)));
  }

  let oper = Oper::new(CreateComment {
    post_id: id,
    text: body.map(|b| b.into_inner().text).unwrap_or_default(),
    auth: get_auth(&req).unwrap_or_default(),
  });
  match oper.perform(&db).await {
    Ok(_res) => Ok(redirect(&format!("/posts/{}/", id))),
    // An empty comment is dropped on the floor, the post page still loads
    Err(e) if e.api_message() == Some("invalid_comment_text") => {
      Ok(redirect(&format!("/posts/{}/", id)))
    }
    Err(e) => Err(e),
  }
}

async fn follow_index(
  req: HttpRequest,
  query: web::Query<PageQuery>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  if get_claims(&req).is_none() {
    return Ok(redirect_to_login("/follow/"));
  }

  let oper = Oper::new(GetPosts {
    type_: ListingType::Subscribed.to_string(),
    page: query.number(),
    auth: get_auth(&req),
  });
  Ok(HttpResponse::Ok().json(oper.perform(&db).await?))
}

async fn profile_follow(
  req: HttpRequest,
  path: web::Path<String>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  let username = path.into_inner();

  if get_claims(&req).is_none() {
    return Ok(redirect_to_login(&format!("/profile/{}/follow/", username)));
  }

  let oper = Oper::new(FollowUser {
    username,
    follow: true,
    auth: get_auth(&req).unwrap_or_default(),
  });
  oper.perform(&db).await?;

  Ok(redirect("/follow/"))
}

async fn profile_unfollow(
  req: HttpRequest,
  path: web::Path<String>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  let username = path.into_inner();

  if get_claims(&req).is_none() {
    return Ok(redirect_to_login(&format!(
      "/profile/{}/unfollow/",
      username
    )));
  }

  let oper = Oper::new(FollowUser {
    username,
    follow: false,
    auth: get_auth(&req).unwrap_or_default(),
  });
  oper.perform(&db).await?;

  Ok(redirect("/follow/"))
}

async fn post_like(
  req: HttpRequest,
  path: web::Path<i32>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  change_like(req, path.into_inner(), true, db).await
}

async fn post_unlike(
  req: HttpRequest,
  path: web::Path<i32>,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  change_like(req, path.into_inner(), false, db).await
}

async fn change_like(
  req: HttpRequest,
  id: i32,
  like: bool,
  db: web::Data<DbPool>,
) -> Result<HttpResponse, YatubeError> {
  let action = if like { "like" } else { "unlike" };

  if get_claims(&req).is_none() {
    return Ok(redirect_to_login(&format!("/posts/{}/{}/", id, action)));
  }

  let oper = Oper::new(CreatePostLike {
    post_id: id,
    like,
    auth: get_auth(&req).unwrap_or_default(),
  });
  oper.perform(&db).await?;

  Ok(redirect(&format!("/posts/{}/", id)))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::routes::not_found;
  use actix_web::http::StatusCode;
  use actix_web::{test, App};
  use diesel::r2d2::{ConnectionManager, Pool};
  use diesel::PgConnection;

  // Builds lazily and never connects; the guest paths below redirect or 404
  // before any db work happens.
  fn lazy_pool() -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new("postgres://unused@localhost:1/unused");
    Pool::builder().min_idle(Some(0)).build_unchecked(manager)
  }

  async fn guest_get(path: &str) -> actix_web::dev::ServiceResponse {
    let mut app = test::init_service(
      App::new()
        .data(lazy_pool())
        .configure(config)
        .default_service(web::route().to(not_found)),
    )
    .await;
    let req = test::TestRequest::get().uri(path).to_request();
    test::call_service(&mut app, req).await
  }

  async fn guest_post(path: &str) -> actix_web::dev::ServiceResponse {
    let mut app = test::init_service(
      App::new()
        .data(lazy_pool())
        .configure(config)
        .default_service(web::route().to(not_found)),
    )
    .await;
    let req = test::TestRequest::post().uri(path).to_request();
    test::call_service(&mut app, req).await
  }

  fn location(res: &actix_web::dev::ServiceResponse) -> String {
    res
      .headers()
      .get("location")
      .unwrap()
      .to_str()
      .unwrap()
      .to_string()
  }

  #[actix_rt::test]
  async fn test_guest_get_redirects_to_login_with_next() {
    for path in &[
      "/create/",
      "/follow/",
      "/posts/1/edit/",
      "/profile/leo/follow/",
      "/profile/leo/unfollow/",
    ] {
      let res = guest_get(path).await;
      assert_eq!(StatusCode::FOUND, res.status());
      assert_eq!(format!("/auth/login/?next={}", path), location(&res));
    }
  }

  #[actix_rt::test]
  async fn test_guest_post_redirects_to_login() {
    let res = guest_post("/posts/1/comment/").await;
    assert_eq!(StatusCode::FOUND, res.status());
    assert_eq!("/auth/login/?next=/posts/1/comment/", location(&res));

    let res = guest_post("/posts/1/like/").await;
    assert_eq!(StatusCode::FOUND, res.status());
    assert_eq!("/auth/login/?next=/posts/1/like/", location(&res));

    let res = guest_post("/create/").await;
    assert_eq!(StatusCode::FOUND, res.status());
    assert_eq!("/auth/login/?next=/create/", location(&res));
  }

  #[actix_rt::test]
  async fn test_unknown_path_is_not_found() {
    let res = guest_get("/unexisting_page/").await;
    assert_eq!(StatusCode::NOT_FOUND, res.status());
  }
}
