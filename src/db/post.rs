use super::*;
use crate::schema::{post, post_like};

#[derive(Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize)]
#[table_name = "post"]
pub struct Post {
  pub id: i32,
  pub text: String,
  pub author_id: i32,
  pub group_id: Option<i32>,
  pub image: Option<String>,
  pub published: chrono::NaiveDateTime,
  pub updated: Option<chrono::NaiveDateTime>,
}

#[derive(Insertable, AsChangeset, Clone)]
#[table_name = "post"]
pub struct PostForm {
  pub text: String,
  pub author_id: i32,
  pub group_id: Option<i32>,
  pub image: Option<String>,
  pub updated: Option<chrono::NaiveDateTime>,
}

impl Crud<PostForm> for Post {
  fn read(conn: &PgConnection, post_id: i32) -> Result<Self, Error> {
    use crate::schema::post::dsl::*;
    post.find(post_id).first::<Self>(conn)
  }

  fn delete(conn: &PgConnection, post_id: i32) -> Result<usize, Error> {
    use crate::schema::post::dsl::*;
    diesel::delete(post.find(post_id)).execute(conn)
  }

  fn create(conn: &PgConnection, new_post: &PostForm) -> Result<Self, Error> {
    use crate::schema::post::dsl::*;
    insert_into(post).values(new_post).get_result::<Self>(conn)
  }

  fn update(conn: &PgConnection, post_id: i32, new_post: &PostForm) -> Result<Self, Error> {
    use crate::schema::post::dsl::*;
    diesel::update(post.find(post_id))
      .set(new_post)
      .get_result::<Self>(conn)
  }
}

#[derive(Identifiable, Queryable, Associations, PartialEq, Debug)]
#[belongs_to(Post)]
#[table_name = "post_like"]
pub struct PostLike {
  pub id: i32,
  pub post_id: i32,
  pub user_id: i32,
  pub published: chrono::NaiveDateTime,
}

#[derive(Insertable, AsChangeset, Clone)]
#[table_name = "post_like"]
pub struct PostLikeForm {
  pub post_id: i32,
  pub user_id: i32,
}

impl Likeable<PostLikeForm> for PostLike {
  // Upsert on the (post_id, user_id) constraint, so liking twice keeps one row
  fn like(conn: &PgConnection, post_like_form: &PostLikeForm) -> Result<Self, Error> {
    use crate::schema::post_like::dsl::*;
    insert_into(post_like)
      .values(post_like_form)
      .on_conflict((post_id, user_id))
      .do_update()
      .set(post_like_form)
      .get_result::<Self>(conn)
  }

  fn unlike(conn: &PgConnection, post_like_form: &PostLikeForm) -> Result<usize, Error> {
    use crate::schema::post_like::dsl::*;
    diesel::delete(
      post_like
        .filter(post_id.eq(post_like_form.post_id))
        .filter(user_id.eq(post_like_form.user_id)),
    )
    .execute(conn)
  }
}

impl PostLike {
  pub fn read_for_post(conn: &PgConnection, post_id_from: i32) -> Result<Vec<Self>, Error> {
    use crate::schema::post_like::dsl::*;
    post_like
      .filter(post_id.eq(post_id_from))
      .load::<Self>(conn)
  }

  pub fn read_for_pair(
    conn: &PgConnection,
    from_post_id: i32,
    from_user_id: i32,
  ) -> Result<Self, Error> {
    use crate::schema::post_like::dsl::*;
    post_like
      .filter(post_id.eq(from_post_id))
      .filter(user_id.eq(from_user_id))
      .first::<Self>(conn)
  }
}

#[cfg(test)]
mod tests {
  use super::super::group::*;
  use super::super::user::*;
  use super::*;

  #[test]
  fn test_crud() {
    let conn = establish_unpooled_connection();

    let new_user = UserForm {
      name: "jim_post".into(),
      password_encrypted: "nope".into(),
      email: None,
      updated: None,
    };

    let inserted_user = User_::create(&conn, &new_user).unwrap();

    let new_group = GroupForm {
      title: "A test group".into(),
      slug: "a-test-group".into(),
      description: "nada".into(),
    };

    let inserted_group = Group::create(&conn, &new_group).unwrap();

    let new_post = PostForm {
      text: "A test post".into(),
      author_id: inserted_user.id,
      group_id: Some(inserted_group.id),
      image: None,
      updated: None,
    };

    let inserted_post = Post::create(&conn, &new_post).unwrap();

    let expected_post = Post {
      id: inserted_post.id,
      text: "A test post".into(),
      author_id: inserted_user.id,
      group_id: Some(inserted_group.id),
      image: None,
      published: inserted_post.published,
      updated: None,
    };

    let post_like_form = PostLikeForm {
      post_id: inserted_post.id,
      user_id: inserted_user.id,
    };

    let inserted_post_like = PostLike::like(&conn, &post_like_form).unwrap();

    let expected_post_like = PostLike {
      id: inserted_post_like.id,
      post_id: inserted_post.id,
      user_id: inserted_user.id,
      published: inserted_post_like.published,
    };

    // Liking a second time upserts into the same row
    let duplicate_post_like = PostLike::like(&conn, &post_like_form).unwrap();
    let likes = PostLike::read_for_post(&conn, inserted_post.id).unwrap();

    let read_post = Post::read(&conn, inserted_post.id).unwrap();
    let updated_post = Post::update(&conn, inserted_post.id, &new_post).unwrap();
    let like_removed = PostLike::unlike(&conn, &post_like_form).unwrap();
    let like_removed_again = PostLike::unlike(&conn, &post_like_form).unwrap();
    let num_deleted = Post::delete(&conn, inserted_post.id).unwrap();
    Group::delete(&conn, inserted_group.id).unwrap();
    User_::delete(&conn, inserted_user.id).unwrap();

    assert_eq!(expected_post, read_post);
    assert_eq!(expected_post, inserted_post);
    assert_eq!(expected_post, updated_post);
    assert_eq!(expected_post_like, inserted_post_like);
    assert_eq!(inserted_post_like.id, duplicate_post_like.id);
    assert_eq!(1, likes.len());
    assert_eq!(1, like_removed);
    assert_eq!(0, like_removed_again);
    assert_eq!(1, num_deleted);
  }
}
