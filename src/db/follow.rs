use super::*;
use crate::schema::user_follow;

#[derive(Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize)]
#[table_name = "user_follow"]
pub struct UserFollow {
  pub id: i32,
  pub user_id: i32,
  pub author_id: i32,
  pub published: chrono::NaiveDateTime,
}

#[derive(Insertable, AsChangeset, Clone)]
#[table_name = "user_follow"]
pub struct UserFollowForm {
  pub user_id: i32,
  pub author_id: i32,
}

impl Followable<UserFollowForm> for UserFollow {
  // Upsert on the (user_id, author_id) constraint, so following twice keeps
  // a single edge. A self-follow violates the table check and errors here;
  // callers that want to ignore it have to check first.
  fn follow(conn: &PgConnection, form: &UserFollowForm) -> Result<Self, Error> {
    use crate::schema::user_follow::dsl::*;
    insert_into(user_follow)
      .values(form)
      .on_conflict((user_id, author_id))
      .do_update()
      .set(form)
      .get_result::<Self>(conn)
  }

  fn unfollow(conn: &PgConnection, form: &UserFollowForm) -> Result<usize, Error> {
    use crate::schema::user_follow::dsl::*;
    diesel::delete(
      user_follow
        .filter(user_id.eq(&form.user_id))
        .filter(author_id.eq(&form.author_id)),
    )
    .execute(conn)
  }
}

impl UserFollow {
  pub fn read_for_pair(
    conn: &PgConnection,
    from_user_id: i32,
    from_author_id: i32,
  ) -> Result<Self, Error> {
    use crate::schema::user_follow::dsl::*;
    user_follow
      .filter(user_id.eq(from_user_id))
      .filter(author_id.eq(from_author_id))
      .first::<Self>(conn)
  }
}
