use super::*;
use crate::schema::comment;
use crate::schema::comment::dsl::*;

#[derive(Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize)]
#[table_name = "comment"]
pub struct Comment {
  pub id: i32,
  pub post_id: i32,
  pub author_id: i32,
  pub text: String,
  pub published: chrono::NaiveDateTime,
}

#[derive(Insertable, AsChangeset, Clone)]
#[table_name = "comment"]
pub struct CommentForm {
  pub post_id: i32,
  pub author_id: i32,
  pub text: String,
}

impl Crud<CommentForm> for Comment {
  fn read(conn: &PgConnection, comment_id: i32) -> Result<Self, Error> {
    comment.find(comment_id).first::<Self>(conn)
  }

  fn delete(conn: &PgConnection, comment_id: i32) -> Result<usize, Error> {
    diesel::delete(comment.find(comment_id)).execute(conn)
  }

  fn create(conn: &PgConnection, new_comment: &CommentForm) -> Result<Self, Error> {
    insert_into(comment)
      .values(new_comment)
      .get_result::<Self>(conn)
  }

  fn update(conn: &PgConnection, comment_id: i32, new_comment: &CommentForm) -> Result<Self, Error> {
    diesel::update(comment.find(comment_id))
      .set(new_comment)
      .get_result::<Self>(conn)
  }
}

#[cfg(test)]
mod tests {
  use super::super::post::*;
  use super::super::user::*;
  use super::*;

  #[test]
  fn test_crud() {
    let conn = establish_unpooled_connection();

    let new_user = UserForm {
      name: "terry_comment".into(),
      password_encrypted: "nope".into(),
      email: None,
      updated: None,
    };

    let inserted_user = User_::create(&conn, &new_user).unwrap();

    let new_post = PostForm {
      text: "A post to comment on".into(),
      author_id: inserted_user.id,
      group_id: None,
      image: None,
      updated: None,
    };

    let inserted_post = Post::create(&conn, &new_post).unwrap();

    let new_comment = CommentForm {
      post_id: inserted_post.id,
      author_id: inserted_user.id,
      text: "A test comment".into(),
    };

    let inserted_comment = Comment::create(&conn, &new_comment).unwrap();

    let expected_comment = Comment {
      id: inserted_comment.id,
      post_id: inserted_post.id,
      author_id: inserted_user.id,
      text: "A test comment".into(),
      published: inserted_comment.published,
    };

    let read_comment = Comment::read(&conn, inserted_comment.id).unwrap();
    let updated_comment = Comment::update(&conn, inserted_comment.id, &new_comment).unwrap();

    // Deleting the post cascades to its comments
    let post_deleted = Post::delete(&conn, inserted_post.id).unwrap();
    let comment_gone = Comment::read(&conn, inserted_comment.id);
    User_::delete(&conn, inserted_user.id).unwrap();

    assert_eq!(expected_comment, read_comment);
    assert_eq!(expected_comment, inserted_comment);
    assert_eq!(expected_comment, updated_comment);
    assert_eq!(1, post_deleted);
    assert!(comment_gone.is_err());
  }
}
