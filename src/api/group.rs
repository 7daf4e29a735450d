use crate::{
  api::{APIError, Oper, Perform},
  blocking,
  db::{
    group::Group,
    post_view::{PostQueryBuilder, PostView},
    resolve_page,
    PageInfo,
  },
  settings::Settings,
  DbPool,
  YatubeError,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
pub struct GetGroup {
  pub slug: String,
  pub page: Option<i64>,
}

#[derive(Serialize, Deserialize)]
pub struct GetGroupResponse {
  pub group: Group,
  pub posts: Vec<PostView>,
  pub page: PageInfo,
}

#[async_trait::async_trait(?Send)]
impl Perform for Oper<GetGroup> {
  type Response = GetGroupResponse;

  async fn perform(&self, pool: &DbPool) -> Result<GetGroupResponse, YatubeError> {
    let data: &GetGroup = &self.data;

    let slug = data.slug.clone();
    let group = match blocking(pool, move |conn| Group::read_from_slug(conn, &slug)).await? {
      Ok(group) => group,
      Err(_e) => return Err(APIError::err("couldnt_find_group").into()),
    };

    let group_id = group.id;
    let page = data.page;
    let per_page = Settings::get().posts_per_page;
    let (posts, page) = blocking(pool, move |conn| {
      let query = PostQueryBuilder::create(conn).for_group_id(group_id);
      let total_count = query.count()?;
      let page = resolve_page(page, total_count, per_page);
      let posts = query.list(&page)?;
      Ok((posts, page)) as Result<_, diesel::result::Error>
    })
    .await??;

    Ok(GetGroupResponse { group, posts, page })
  }
}
