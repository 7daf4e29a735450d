use crate::settings::Settings;
use diesel::result::Error;
use diesel::*;
use serde::{Deserialize, Serialize};

pub mod comment;
pub mod comment_view;
pub mod follow;
pub mod group;
pub mod post;
pub mod post_view;
pub mod user;
pub mod user_view;

pub trait Crud<T> {
  fn create(conn: &PgConnection, form: &T) -> Result<Self, Error>
  where
    Self: Sized;
  fn read(conn: &PgConnection, id: i32) -> Result<Self, Error>
  where
    Self: Sized;
  fn update(conn: &PgConnection, id: i32, form: &T) -> Result<Self, Error>
  where
    Self: Sized;
  fn delete(conn: &PgConnection, id: i32) -> Result<usize, Error>
  where
    Self: Sized;
}

pub trait Followable<T> {
  fn follow(conn: &PgConnection, form: &T) -> Result<Self, Error>
  where
    Self: Sized;
  fn unfollow(conn: &PgConnection, form: &T) -> Result<usize, Error>
  where
    Self: Sized;
}

pub trait Likeable<T> {
  fn like(conn: &PgConnection, form: &T) -> Result<Self, Error>
  where
    Self: Sized;
  fn unlike(conn: &PgConnection, form: &T) -> Result<usize, Error>
  where
    Self: Sized;
}

pub trait MaybeOptional<T> {
  fn get_optional(self) -> Option<T>;
}

impl<T> MaybeOptional<T> for T {
  fn get_optional(self) -> Option<T> {
    Some(self)
  }
}

impl<T> MaybeOptional<T> for Option<T> {
  fn get_optional(self) -> Option<T> {
    self
  }
}

pub fn establish_unpooled_connection() -> PgConnection {
  let db_url = Settings::get().get_database_url();
  PgConnection::establish(&db_url)
    .unwrap_or_else(|_| panic!("Error connecting to {}", db_url))
}

#[derive(EnumString, ToString, Debug, Serialize, Deserialize, Clone, Copy)]
pub enum ListingType {
  All,
  Subscribed,
}

/// A resolved slice of an ordered result set: the 1-based page number after
/// clamping, plus the metadata listing pages carry along with their items.
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct PageInfo {
  pub number: i64,
  pub per_page: i64,
  pub total_count: i64,
  pub num_pages: i64,
  pub has_next: bool,
  pub has_previous: bool,
}

impl PageInfo {
  pub fn limit_and_offset(&self) -> (i64, i64) {
    (self.per_page, self.per_page * (self.number - 1))
  }
}

/// Turns a requested 1-based page number into a valid one. A missing number
/// means the first page, an out-of-range number clamps to the nearest valid
/// page, and an empty result set still has exactly one (empty) page.
pub fn resolve_page(requested: Option<i64>, total_count: i64, per_page: i64) -> PageInfo {
  let num_pages = std::cmp::max(1, (total_count + per_page - 1) / per_page);
  let number = requested.unwrap_or(1).max(1).min(num_pages);
  PageInfo {
    number,
    per_page,
    total_count,
    num_pages,
    has_next: number < num_pages,
    has_previous: number > 1,
  }
}

#[cfg(test)]
mod tests {
  use super::{resolve_page, PageInfo};

  #[test]
  fn test_resolve_page() {
    let expected = PageInfo {
      number: 1,
      per_page: 10,
      total_count: 11,
      num_pages: 2,
      has_next: true,
      has_previous: false,
    };
    assert_eq!(expected, resolve_page(None, 11, 10));
    assert_eq!(expected, resolve_page(Some(1), 11, 10));
    assert_eq!((10, 0), resolve_page(Some(1), 11, 10).limit_and_offset());
  }

  #[test]
  fn test_resolve_page_remainder() {
    let last = resolve_page(Some(2), 11, 10);
    assert_eq!(2, last.number);
    assert_eq!((10, 10), last.limit_and_offset());
    assert!(!last.has_next);
    assert!(last.has_previous);
  }

  #[test]
  fn test_resolve_page_clamps_out_of_range() {
    assert_eq!(2, resolve_page(Some(9000), 11, 10).number);
    assert_eq!(1, resolve_page(Some(0), 11, 10).number);
    assert_eq!(1, resolve_page(Some(-3), 11, 10).number);
  }

  #[test]
  fn test_resolve_page_empty() {
    let empty = resolve_page(Some(5), 0, 10);
    assert_eq!(1, empty.number);
    assert_eq!(1, empty.num_pages);
    assert!(!empty.has_next);
    assert!(!empty.has_previous);
  }
}
