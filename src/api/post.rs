use crate::{
  api::{APIError, Oper, Perform},
  blocking,
  db::{
    comment_view::CommentView,
    group::Group,
    post::{Post, PostForm, PostLike, PostLikeForm},
    post_view::{PostQueryBuilder, PostView},
    resolve_page,
    user::Claims,
    Crud,
    Likeable,
    ListingType,
    PageInfo,
  },
  naive_now,
  settings::Settings,
  DbPool,
  YatubeError,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Serialize, Deserialize)]
pub struct GetPosts {
  pub type_: String,
  pub page: Option<i64>,
  pub auth: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct GetPostsResponse {
  pub posts: Vec<PostView>,
  pub page: PageInfo,
}

#[derive(Serialize, Deserialize)]
pub struct GetPost {
  pub id: i32,
  pub auth: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct GetPostResponse {
  pub post: PostView,
  pub comments: Vec<CommentView>,
  pub liked: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct CreatePost {
  pub text: String,
  pub group_id: Option<i32>,
  pub image: Option<String>,
  pub auth: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct PostResponse {
  pub post: PostView,
}

#[derive(Serialize, Deserialize)]
pub struct EditPost {
  pub edit_id: i32,
  pub text: String,
  pub group_id: Option<i32>,
  pub image: Option<String>,
  pub auth: String,
}

#[derive(Serialize, Deserialize)]
pub struct CreatePostLike {
  pub post_id: i32,
  pub like: bool,
  pub auth: String,
}

#[derive(Serialize, Deserialize)]
pub struct PostLikeResponse {
  pub post: PostView,
  pub liked: bool,
}

#[async_trait::async_trait(?Send)]
impl Perform for Oper<GetPosts> {
  type Response = GetPostsResponse;

  async fn perform(&self, pool: &DbPool) -> Result<GetPostsResponse, YatubeError> {
    let data: &GetPosts = &self.data;

    let user_id: Option<i32> = match &data.auth {
      Some(auth) => match Claims::decode(&auth) {
        Ok(claims) => Some(claims.claims.id),
        Err(_e) => None,
      },
      None => None,
    };

    let type_ = ListingType::from_str(&data.type_)?;

    if let ListingType::Subscribed = type_ {
      if user_id.is_none() {
        return Err(APIError::err("not_logged_in").into());
      }
    }

    let page = data.page;
    let per_page = Settings::get().posts_per_page;
    let (posts, page) = blocking(pool, move |conn| {
      let query = PostQueryBuilder::create(conn)
        .listing_type(type_)
        .my_user_id(user_id);
      let total_count = query.count()?;
      let page = resolve_page(page, total_count, per_page);
      let posts = query.list(&page)?;
      Ok((posts, page)) as Result<_, diesel::result::Error>
    })
    .await??;

    Ok(GetPostsResponse { posts, page })
  }
}

#[async_trait::async_trait(?Send)]
impl Perform for Oper<GetPost> {
  type Response = GetPostResponse;

  async fn perform(&self, pool: &DbPool) -> Result<GetPostResponse, YatubeError> {
    let data: &GetPost = &self.data;

    let user_id: Option<i32> = match &data.auth {
      Some(auth) => match Claims::decode(&auth) {
        Ok(claims) => Some(claims.claims.id),
        Err(_e) => None,
      },
      None => None,
    };

    let id = data.id;
    let post_view = match blocking(pool, move |conn| PostView::read(conn, id)).await? {
      Ok(post) => post,
      Err(_e) => return Err(APIError::err("couldnt_find_post").into()),
    };

    let comments = blocking(pool, move |conn| CommentView::for_post(conn, id)).await??;

    let liked = match user_id {
      Some(user_id) => Some(
        blocking(pool, move |conn| {
          PostLike::read_for_pair(conn, id, user_id).is_ok()
        })
        .await?,
      ),
      None => None,
    };

    Ok(GetPostResponse {
      post: post_view,
      comments,
      liked,
    })
  }
}

#[async_trait::async_trait(?Send)]
impl Perform for Oper<CreatePost> {
  type Response = PostResponse;

  async fn perform(&self, pool: &DbPool) -> Result<PostResponse, YatubeError> {
    let data: &CreatePost = &self.data;

    let claims = match Claims::decode(&data.auth) {
      Ok(claims) => claims.claims,
      Err(_e) => return Err(APIError::err("not_logged_in").into()),
    };

    let user_id = claims.id;

    if data.text.trim().is_empty() {
      return Err(APIError::err("invalid_post_text").into());
    }

    // The group is optional, but a given one has to exist
    if let Some(group_id) = data.group_id {
      if blocking(pool, move |conn| Group::read(conn, group_id))
        .await?
        .is_err()
      {
        return Err(APIError::err("couldnt_find_group").into());
      }
    }

    let post_form = PostForm {
      text: data.text.to_owned(),
      author_id: user_id,
      group_id: data.group_id,
      image: data.image.to_owned(),
      updated: None,
    };

    let inserted_post = match blocking(pool, move |conn| Post::create(conn, &post_form)).await? {
      Ok(post) => post,
      Err(_e) => return Err(APIError::err("couldnt_create_post").into()),
    };

    let post_id = inserted_post.id;
    let post_view = blocking(pool, move |conn| PostView::read(conn, post_id)).await??;

    Ok(PostResponse { post: post_view })
  }
}

#[async_trait::async_trait(?Send)]
impl Perform for Oper<EditPost> {
  type Response = PostResponse;

  async fn perform(&self, pool: &DbPool) -> Result<PostResponse, YatubeError> {
    let data: &EditPost = &self.data;

    let claims = match Claims::decode(&data.auth) {
      Ok(claims) => claims.claims,
      Err(_e) => return Err(APIError::err("not_logged_in").into()),
    };

    let user_id = claims.id;

    if data.text.trim().is_empty() {
      return Err(APIError::err("invalid_post_text").into());
    }

    let edit_id = data.edit_id;
    let read_post = match blocking(pool, move |conn| Post::read(conn, edit_id)).await? {
      Ok(post) => post,
      Err(_e) => return Err(APIError::err("couldnt_find_post").into()),
    };

    // Only the author can edit
    if read_post.author_id != user_id {
      return Err(APIError::err("no_post_edit_allowed").into());
    }

    if let Some(group_id) = data.group_id {
      if blocking(pool, move |conn| Group::read(conn, group_id))
        .await?
        .is_err()
      {
        return Err(APIError::err("couldnt_find_group").into());
      }
    }

    let post_form = PostForm {
      text: data.text.to_owned(),
      author_id: read_post.author_id,
      group_id: data.group_id,
      image: data.image.to_owned(),
      updated: Some(naive_now()),
    };

    let edit_id = data.edit_id;
    if blocking(pool, move |conn| Post::update(conn, edit_id, &post_form))
      .await?
      .is_err()
    {
      return Err(APIError::err("couldnt_update_post").into());
    }

    let edit_id = data.edit_id;
    let post_view = blocking(pool, move |conn| PostView::read(conn, edit_id)).await??;

    Ok(PostResponse { post: post_view })
  }
}

#[async_trait::async_trait(?Send)]
impl Perform for Oper<CreatePostLike> {
  type Response = PostLikeResponse;

  async fn perform(&self, pool: &DbPool) -> Result<PostLikeResponse, YatubeError> {
    let data: &CreatePostLike = &self.data;

    let claims = match Claims::decode(&data.auth) {
      Ok(claims) => claims.claims,
      Err(_e) => return Err(APIError::err("not_logged_in").into()),
    };

    let user_id = claims.id;

    let post_id = data.post_id;
    if blocking(pool, move |conn| Post::read(conn, post_id))
      .await?
      .is_err()
    {
      return Err(APIError::err("couldnt_find_post").into());
    }

    let like_form = PostLikeForm {
      post_id: data.post_id,
      user_id,
    };

    if data.like {
      let like = move |conn: &'_ _| PostLike::like(conn, &like_form);
      if blocking(pool, like).await?.is_err() {
        return Err(APIError::err("couldnt_like_post").into());
      }
    } else {
      let unlike = move |conn: &'_ _| PostLike::unlike(conn, &like_form);
      if blocking(pool, unlike).await?? == 0 {
        return Err(APIError::err("couldnt_find_like").into());
      }
    }

    let post_id = data.post_id;
    let post_view = blocking(pool, move |conn| PostView::read(conn, post_id)).await??;

    Ok(PostLikeResponse {
      post: post_view,
      liked: data.like,
    })
  }
}
