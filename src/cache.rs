//! Process wide cache for the rendered main listing page. Entries expire
//! after a fixed duration or on an explicit [`clear`]; data changes do not
//! invalidate them, so deletions stay invisible until the entry expires.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

struct CachedPage {
  body: String,
  stored_at: Instant,
}

lazy_static! {
  static ref INDEX_PAGE_CACHE: RwLock<HashMap<String, CachedPage>> = RwLock::new(HashMap::new());
}

pub fn get(key: &str, max_age: Duration) -> Option<String> {
  let cache = INDEX_PAGE_CACHE.read().unwrap();
  match cache.get(key) {
    Some(cached) if cached.stored_at.elapsed() < max_age => Some(cached.body.to_owned()),
    _ => None,
  }
}

pub fn put(key: &str, body: &str) {
  let mut cache = INDEX_PAGE_CACHE.write().unwrap();
  cache.insert(
    key.to_string(),
    CachedPage {
      body: body.to_string(),
      stored_at: Instant::now(),
    },
  );
}

pub fn clear() {
  INDEX_PAGE_CACHE.write().unwrap().clear();
}

#[cfg(test)]
mod tests {
  use super::*;

  const HOUR: Duration = Duration::from_secs(60 * 60);

  // A single test, because clear() wipes the whole process wide map
  #[test]
  fn test_cache() {
    assert_eq!(None, get("never-stored", HOUR));

    put("page-1", "the old listing");

    // Whatever happens to the underlying rows, the cached body wins
    assert_eq!(Some("the old listing".to_string()), get("page-1", HOUR));

    // A zero max age means everything is already expired
    assert_eq!(None, get("page-1", Duration::from_secs(0)));

    clear();
    assert_eq!(None, get("page-1", HOUR));
  }
}
