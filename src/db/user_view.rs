use super::*;

table! {
  user_view (id) {
    id -> Int4,
    name -> Varchar,
    published -> Timestamp,
    number_of_posts -> BigInt,
    number_of_followers -> BigInt,
  }
}

#[derive(
  Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize, QueryableByName, Clone,
)]
#[table_name = "user_view"]
pub struct UserView {
  pub id: i32,
  pub name: String,
  pub published: chrono::NaiveDateTime,
  pub number_of_posts: i64,
  pub number_of_followers: i64,
}

impl UserView {
  pub fn read(conn: &PgConnection, from_user_id: i32) -> Result<Self, Error> {
    use self::user_view::dsl::*;
    user_view.find(from_user_id).first::<Self>(conn)
  }

  pub fn read_from_name(conn: &PgConnection, from_user_name: &str) -> Result<Self, Error> {
    use self::user_view::dsl::*;
    user_view
      .filter(name.eq(from_user_name))
      .first::<Self>(conn)
  }
}

#[cfg(test)]
mod tests {
  use super::super::user::*;
  use super::*;

  #[test]
  fn test_read() {
    let conn = establish_unpooled_connection();

    let new_user = UserForm {
      name: "viewable_user".into(),
      password_encrypted: "nope".into(),
      email: None,
      updated: None,
    };

    let inserted_user = User_::create(&conn, &new_user).unwrap();

    let user_view = UserView::read_from_name(&conn, "viewable_user").unwrap();

    User_::delete(&conn, inserted_user.id).unwrap();

    assert_eq!(inserted_user.id, user_view.id);
    assert_eq!("viewable_user", user_view.name);
    assert_eq!(0, user_view.number_of_posts);
    assert_eq!(0, user_view.number_of_followers);
  }
}
