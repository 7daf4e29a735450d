use crate::{DbPool, YatubeError};

pub mod comment;
pub mod group;
pub mod post;
pub mod user;

pub use crate::APIError;

pub struct Oper<T> {
  data: T,
}

impl<Data> Oper<Data> {
  pub fn new(data: Data) -> Oper<Data> {
    Oper { data }
  }
}

#[async_trait::async_trait(?Send)]
pub trait Perform {
  type Response: serde::ser::Serialize + Send;

  async fn perform(&self, pool: &DbPool) -> Result<Self::Response, YatubeError>;
}
