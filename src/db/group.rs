use super::*;
use crate::schema::group_;
use crate::schema::group_::dsl::*;

#[derive(Queryable, Identifiable, PartialEq, Debug, Serialize, Deserialize, Clone)]
#[table_name = "group_"]
pub struct Group {
  pub id: i32,
  pub title: String,
  pub slug: String,
  pub description: String,
  pub published: chrono::NaiveDateTime,
}

#[derive(Insertable, AsChangeset, Clone)]
#[table_name = "group_"]
pub struct GroupForm {
  pub title: String,
  pub slug: String,
  pub description: String,
}

impl Crud<GroupForm> for Group {
  fn read(conn: &PgConnection, group_id: i32) -> Result<Self, Error> {
    group_.find(group_id).first::<Self>(conn)
  }

  fn delete(conn: &PgConnection, group_id: i32) -> Result<usize, Error> {
    diesel::delete(group_.find(group_id)).execute(conn)
  }

  fn create(conn: &PgConnection, new_group: &GroupForm) -> Result<Self, Error> {
    insert_into(group_).values(new_group).get_result::<Self>(conn)
  }

  fn update(conn: &PgConnection, group_id: i32, new_group: &GroupForm) -> Result<Self, Error> {
    diesel::update(group_.find(group_id))
      .set(new_group)
      .get_result::<Self>(conn)
  }
}

impl Group {
  pub fn read_from_slug(conn: &PgConnection, group_slug: &str) -> Result<Self, Error> {
    group_.filter(slug.eq(group_slug)).first::<Self>(conn)
  }

  pub fn get_url(&self) -> String {
    format!("https://{}/group/{}/", Settings::get().hostname, self.slug)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_crud() {
    let conn = establish_unpooled_connection();

    let new_group = GroupForm {
      title: "Cats".into(),
      slug: "cats".into(),
      description: "Pictures of cats".into(),
    };

    let inserted_group = Group::create(&conn, &new_group).unwrap();

    let expected_group = Group {
      id: inserted_group.id,
      title: "Cats".into(),
      slug: "cats".into(),
      description: "Pictures of cats".into(),
      published: inserted_group.published,
    };

    let read_group = Group::read(&conn, inserted_group.id).unwrap();
    let slug_group = Group::read_from_slug(&conn, "cats").unwrap();
    let updated_group = Group::update(&conn, inserted_group.id, &new_group).unwrap();
    let num_deleted = Group::delete(&conn, inserted_group.id).unwrap();

    assert_eq!(expected_group, read_group);
    assert_eq!(expected_group, slug_group);
    assert_eq!(expected_group, inserted_group);
    assert_eq!(expected_group, updated_group);
    assert_eq!(1, num_deleted);
  }
}
