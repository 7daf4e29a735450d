use crate::{
  api::{APIError, Oper, Perform},
  blocking,
  db::{
    follow::{UserFollow, UserFollowForm},
    post_view::{PostQueryBuilder, PostView},
    resolve_page,
    user::{Claims, UserForm, User_},
    user_view::UserView,
    Followable,
    PageInfo,
  },
  is_valid_username,
  settings::Settings,
  DbPool,
  YatubeError,
};
use bcrypt::verify;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Login {
  pub username_or_email: String,
  pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct Register {
  pub username: String,
  pub email: Option<String>,
  pub password: String,
  pub password_verify: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
  pub jwt: String,
}

#[derive(Serialize, Deserialize)]
pub struct GetUserDetails {
  pub username: String,
  pub page: Option<i64>,
  pub auth: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct GetUserDetailsResponse {
  pub user: UserView,
  pub posts: Vec<PostView>,
  pub page: PageInfo,
  pub following: bool,
}

#[derive(Serialize, Deserialize)]
pub struct FollowUser {
  pub username: String,
  pub follow: bool,
  pub auth: String,
}

#[derive(Serialize, Deserialize)]
pub struct FollowUserResponse {
  pub following: bool,
}

#[async_trait::async_trait(?Send)]
impl Perform for Oper<Login> {
  type Response = LoginResponse;

  async fn perform(&self, pool: &DbPool) -> Result<LoginResponse, YatubeError> {
    let data: &Login = &self.data;

    // Fetch that username / email
    let username_or_email = data.username_or_email.clone();
    let user = match blocking(pool, move |conn| {
      User_::find_by_email_or_username(conn, &username_or_email)
    })
    .await?
    {
      Ok(user) => user,
      Err(_e) => return Err(APIError::err("couldnt_find_that_username_or_email").into()),
    };

    // Verify the password
    let valid: bool = verify(&data.password, &user.password_encrypted).unwrap_or(false);
    if !valid {
      return Err(APIError::err("password_incorrect").into());
    }

    // Return the jwt
    Ok(LoginResponse { jwt: user.jwt() })
  }
}

#[async_trait::async_trait(?Send)]
impl Perform for Oper<Register> {
  type Response = LoginResponse;

  async fn perform(&self, pool: &DbPool) -> Result<LoginResponse, YatubeError> {
    let data: &Register = &self.data;

    // Make sure passwords match
    if data.password != data.password_verify {
      return Err(APIError::err("passwords_dont_match").into());
    }

    if !is_valid_username(&data.username) {
      return Err(APIError::err("invalid_username").into());
    }

    let user_form = UserForm {
      name: data.username.to_owned(),
      email: data.email.to_owned(),
      password_encrypted: data.password.to_owned(),
      updated: None,
    };

    // Create the user, bcrypting the password along the way
    let inserted_user = match blocking(pool, move |conn| User_::register(conn, &user_form)).await?
    {
      Ok(user) => user,
      Err(_e) => return Err(APIError::err("user_already_exists").into()),
    };

    // Return the jwt
    Ok(LoginResponse {
      jwt: inserted_user.jwt(),
    })
  }
}

#[async_trait::async_trait(?Send)]
impl Perform for Oper<GetUserDetails> {
  type Response = GetUserDetailsResponse;

  async fn perform(&self, pool: &DbPool) -> Result<GetUserDetailsResponse, YatubeError> {
    let data: &GetUserDetails = &self.data;

    let user_id: Option<i32> = match &data.auth {
      Some(auth) => match Claims::decode(&auth) {
        Ok(claims) => Some(claims.claims.id),
        Err(_e) => None,
      },
      None => None,
    };

    let username = data.username.clone();
    let user_view = match blocking(pool, move |conn| {
      UserView::read_from_name(conn, &username)
    })
    .await?
    {
      Ok(user) => user,
      Err(_e) => return Err(APIError::err("couldnt_find_user").into()),
    };

    let author_id = user_view.id;
    let page = data.page;
    let per_page = Settings::get().posts_per_page;
    let (posts, page) = blocking(pool, move |conn| {
      let query = PostQueryBuilder::create(conn).for_author_id(author_id);
      let total_count = query.count()?;
      let page = resolve_page(page, total_count, per_page);
      let posts = query.list(&page)?;
      Ok((posts, page)) as Result<_, diesel::result::Error>
    })
    .await??;

    // Whether the requesting user follows this author
    let following = match user_id {
      Some(user_id) => {
        blocking(pool, move |conn| {
          UserFollow::read_for_pair(conn, user_id, author_id).is_ok()
        })
        .await?
      }
      None => false,
    };

    Ok(GetUserDetailsResponse {
      user: user_view,
      posts,
      page,
      following,
    })
  }
}

#[async_trait::async_trait(?Send)]
impl Perform for Oper<FollowUser> {
  type Response = FollowUserResponse;

  async fn perform(&self, pool: &DbPool) -> Result<FollowUserResponse, YatubeError> {
    let data: &FollowUser = &self.data;

    let claims = match Claims::decode(&data.auth) {
      Ok(claims) => claims.claims,
      Err(_e) => return Err(APIError::err("not_logged_in").into()),
    };

    let user_id = claims.id;

    let username = data.username.clone();
    let author = match blocking(pool, move |conn| {
      User_::find_by_username(conn, &username)
    })
    .await?
    {
      Ok(user) => user,
      Err(_e) => return Err(APIError::err("couldnt_find_user").into()),
    };

    // Following yourself is silently ignored
    if author.id == user_id && data.follow {
      return Ok(FollowUserResponse { following: false });
    }

    let user_follow_form = UserFollowForm {
      user_id,
      author_id: author.id,
    };

    if data.follow {
      let follow = move |conn: &'_ _| UserFollow::follow(conn, &user_follow_form);
      if blocking(pool, follow).await?.is_err() {
        return Err(APIError::err("couldnt_follow_user").into());
      }
    } else {
      let unfollow = move |conn: &'_ _| UserFollow::unfollow(conn, &user_follow_form);
      if blocking(pool, unfollow).await?? == 0 {
        return Err(APIError::err("couldnt_find_follow").into());
      }
    }

    Ok(FollowUserResponse {
      following: data.follow,
    })
  }
}
