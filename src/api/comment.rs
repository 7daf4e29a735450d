use crate::{
  api::{APIError, Oper, Perform},
  blocking,
  db::{
    comment::{Comment, CommentForm},
    comment_view::CommentView,
    post::Post,
    user::Claims,
    Crud,
  },
  DbPool,
  YatubeError,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct CreateComment {
  pub post_id: i32,
  pub text: String,
  pub auth: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct CommentResponse {
  pub comment: CommentView,
}

#[async_trait::async_trait(?Send)]
impl Perform for Oper<CreateComment> {
  type Response = CommentResponse;

  async fn perform(&self, pool: &DbPool) -> Result<CommentResponse, YatubeError> {
    let data: &CreateComment = &self.data;

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

    if data.text.trim().is_empty() {
      return Err(APIError::err("invalid_comment_text").into());
    }

    let comment_form = CommentForm {
      post_id: data.post_id,
      author_id: user_id,
      text: data.text.to_owned(),
    };

    let inserted_comment = match blocking(pool, move |conn| Comment::create(conn, &comment_form))
      .await?
    {
      Ok(comment) => comment,
      Err(_e) => return Err(APIError::err("couldnt_create_comment").into()),
    };

    let comment_id = inserted_comment.id;
    let comment_view = blocking(pool, move |conn| CommentView::read(conn, comment_id)).await??;

    Ok(CommentResponse {
      comment: comment_view,
    })
  }
}
