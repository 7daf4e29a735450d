use super::*;

table! {
  comment_view (id) {
    id -> Int4,
    post_id -> Int4,
    author_id -> Int4,
    text -> Text,
    published -> Timestamp,
    author_name -> Varchar,
  }
}

#[derive(
  Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize, QueryableByName, Clone,
)]
#[table_name = "comment_view"]
pub struct CommentView {
  pub id: i32,
  pub post_id: i32,
  pub author_id: i32,
  pub text: String,
  pub published: chrono::NaiveDateTime,
  pub author_name: String,
}

impl CommentView {
  pub fn read(conn: &PgConnection, from_comment_id: i32) -> Result<Self, Error> {
    use self::comment_view::dsl::*;
    comment_view.find(from_comment_id).first::<Self>(conn)
  }

  /// Newest first, the order the detail page shows them in.
  pub fn for_post(conn: &PgConnection, from_post_id: i32) -> Result<Vec<Self>, Error> {
    use self::comment_view::dsl::*;
    comment_view
      .filter(post_id.eq(from_post_id))
      .order_by(published.desc())
      .then_order_by(id.desc())
      .load::<Self>(conn)
  }
}
