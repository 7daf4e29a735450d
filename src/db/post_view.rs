use self::post_view::BoxedQuery;
use super::*;
use crate::schema::user_follow;
use diesel::pg::Pg;

// The post_view sql view joins every post with its author name, group info
// and comment/like counts.
table! {
  post_view (id) {
    id -> Int4,
    text -> Text,
    author_id -> Int4,
    group_id -> Nullable<Int4>,
    image -> Nullable<Text>,
    published -> Timestamp,
    updated -> Nullable<Timestamp>,
    author_name -> Varchar,
    group_title -> Nullable<Varchar>,
    group_slug -> Nullable<Varchar>,
    number_of_comments -> BigInt,
    number_of_likes -> BigInt,
  }
}

allow_tables_to_appear_in_same_query!(post_view, user_follow);

#[derive(
  Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize, QueryableByName, Clone,
)]
#[table_name = "post_view"]
pub struct PostView {
  pub id: i32,
  pub text: String,
  pub author_id: i32,
  pub group_id: Option<i32>,
  pub image: Option<String>,
  pub published: chrono::NaiveDateTime,
  pub updated: Option<chrono::NaiveDateTime>,
  pub author_name: String,
  pub group_title: Option<String>,
  pub group_slug: Option<String>,
  pub number_of_comments: i64,
  pub number_of_likes: i64,
}

pub struct PostQueryBuilder<'a> {
  conn: &'a PgConnection,
  listing_type: ListingType,
  for_group_id: Option<i32>,
  for_author_id: Option<i32>,
  my_user_id: Option<i32>,
}

impl<'a> PostQueryBuilder<'a> {
  pub fn create(conn: &'a PgConnection) -> Self {
    PostQueryBuilder {
      conn,
      listing_type: ListingType::All,
      for_group_id: None,
      for_author_id: None,
      my_user_id: None,
    }
  }

  pub fn listing_type(mut self, listing_type: ListingType) -> Self {
    self.listing_type = listing_type;
    self
  }

  pub fn for_group_id<T: MaybeOptional<i32>>(mut self, for_group_id: T) -> Self {
    self.for_group_id = for_group_id.get_optional();
    self
  }

  pub fn for_author_id<T: MaybeOptional<i32>>(mut self, for_author_id: T) -> Self {
    self.for_author_id = for_author_id.get_optional();
    self
  }

  pub fn my_user_id<T: MaybeOptional<i32>>(mut self, my_user_id: T) -> Self {
    self.my_user_id = my_user_id.get_optional();
    self
  }

  fn query(&self) -> BoxedQuery<'static, Pg> {
    use self::post_view::dsl::*;

    let mut query = post_view.into_boxed();

    if let Some(for_group_id) = self.for_group_id {
      query = query.filter(group_id.eq(for_group_id));
    }

    if let Some(for_author_id) = self.for_author_id {
      query = query.filter(author_id.eq(for_author_id));
    }

    if let ListingType::Subscribed = self.listing_type {
      // The left join below will match nothing in this case
      let user_id_join = self.my_user_id.unwrap_or(-1);
      let followed = user_follow::table
        .select(user_follow::author_id)
        .filter(user_follow::user_id.eq(user_id_join));
      query = query.filter(author_id.eq_any(followed));
    }

    query
  }

  pub fn count(&self) -> Result<i64, Error> {
    self.query().count().get_result::<i64>(self.conn)
  }

  /// Newest first, sliced to the given page.
  pub fn list(&self, page: &PageInfo) -> Result<Vec<PostView>, Error> {
    use self::post_view::dsl::*;

    let (limit, offset) = page.limit_and_offset();
    self
      .query()
      .order_by(published.desc())
      .then_order_by(id.desc())
      .limit(limit)
      .offset(offset)
      .load::<PostView>(self.conn)
  }
}

impl PostView {
  pub fn read(conn: &PgConnection, from_post_id: i32) -> Result<Self, Error> {
    use self::post_view::dsl::*;
    post_view.find(from_post_id).first::<Self>(conn)
  }
}

#[cfg(test)]
mod tests {
  use super::super::follow::*;
  use super::super::group::*;
  use super::super::post::*;
  use super::super::user::*;
  use super::*;
  use crate::db::resolve_page;

  #[test]
  fn test_listing_and_pagination() {
    let conn = establish_unpooled_connection();

    let author_form = UserForm {
      name: "listing_author".into(),
      password_encrypted: "nope".into(),
      email: None,
      updated: None,
    };
    let reader_form = UserForm {
      name: "listing_reader".into(),
      password_encrypted: "nope".into(),
      email: None,
      updated: None,
    };

    let author = User_::create(&conn, &author_form).unwrap();
    let reader = User_::create(&conn, &reader_form).unwrap();

    let group_form = GroupForm {
      title: "Listing group".into(),
      slug: "listing-group".into(),
      description: "nada".into(),
    };
    let group = Group::create(&conn, &group_form).unwrap();

    for i in 0..3 {
      let post_form = PostForm {
        text: format!("post number {}", i),
        author_id: author.id,
        group_id: Some(group.id),
        image: None,
        updated: None,
      };
      Post::create(&conn, &post_form).unwrap();
    }

    // A post outside the group, by someone the reader does not follow
    let stray_form = PostForm {
      text: "stray post".into(),
      author_id: reader.id,
      group_id: None,
      image: None,
      updated: None,
    };
    let stray = Post::create(&conn, &stray_form).unwrap();

    let group_query = PostQueryBuilder::create(&conn).for_group_id(group.id);
    let total = group_query.count().unwrap();
    assert_eq!(3, total);

    let first_page = resolve_page(Some(1), total, 2);
    let posts = group_query.list(&first_page).unwrap();
    assert_eq!(2, posts.len());
    // Newest first
    assert_eq!("post number 2", posts[0].text);
    assert_eq!(Some("listing-group".to_string()), posts[0].group_slug);
    assert_eq!("listing_author", posts[0].author_name);

    let second_page = resolve_page(Some(2), total, 2);
    let remainder = group_query.list(&second_page).unwrap();
    assert_eq!(1, remainder.len());

    // Subscription feed only shows followed authors
    let follow_form = UserFollowForm {
      user_id: reader.id,
      author_id: author.id,
    };
    UserFollow::follow(&conn, &follow_form).unwrap();

    let feed_query = PostQueryBuilder::create(&conn)
      .listing_type(ListingType::Subscribed)
      .my_user_id(reader.id);
    let feed_total = feed_query.count().unwrap();
    let feed = feed_query
      .list(&resolve_page(None, feed_total, 10))
      .unwrap();
    assert_eq!(3, feed.len());
    assert!(feed.iter().all(|p| p.author_id == author.id));

    // An author is not part of their own feed
    let author_feed_query = PostQueryBuilder::create(&conn)
      .listing_type(ListingType::Subscribed)
      .my_user_id(author.id);
    assert_eq!(0, author_feed_query.count().unwrap());

    Post::delete(&conn, stray.id).unwrap();
    User_::delete(&conn, author.id).unwrap();
    User_::delete(&conn, reader.id).unwrap();
    Group::delete(&conn, group.id).unwrap();
  }
}
