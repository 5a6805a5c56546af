use contracts::domain::a001_post::aggregate::Post;
use contracts::domain::common::HostType;
use contracts::domain::meta::{MetaCollection, MetaFilter};
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set};

use crate::shared::meta::{HasMetaScope, MetaCapable, MetaError};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wp_posts")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "ID")]
    pub id: i64,
    pub post_author: i64,
    pub post_date: DateTime,
    pub post_content: String,
    pub post_title: String,
    pub post_excerpt: String,
    pub post_status: String,
    pub post_name: String,
    pub post_parent: i64,
    pub menu_order: i32,
    pub post_type: String,
    pub post_mime_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Post {
    fn from(m: Model) -> Self {
        Post {
            id: m.id,
            author_id: m.post_author,
            title: m.post_title,
            content: m.post_content,
            excerpt: m.post_excerpt,
            status: m.post_status,
            slug: m.post_name,
            parent_id: m.post_parent,
            menu_order: m.menu_order,
            kind: HostType::from_post_type(&m.post_type),
            post_type: m.post_type,
            mime_type: m.post_mime_type,
            posted_at: m.post_date,
            meta: None,
        }
    }
}

impl MetaCapable for Post {
    fn host_type(&self) -> HostType {
        self.kind
    }

    fn owner_id(&self) -> i64 {
        self.id
    }

    fn loaded_meta(&self) -> Option<&MetaCollection> {
        self.meta.as_ref()
    }

    fn set_loaded_meta(&mut self, meta: Option<MetaCollection>) {
        self.meta = meta;
    }
}

pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<Post>, DbErr> {
    let result = Entity::find_by_id(id).one(db).await?;
    Ok(result.map(Into::into))
}

pub async fn insert<C: ConnectionTrait>(db: &C, post: &Post) -> Result<i64, DbErr> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        post_author: Set(post.author_id),
        post_date: Set(post.posted_at),
        post_content: Set(post.content.clone()),
        post_title: Set(post.title.clone()),
        post_excerpt: Set(post.excerpt.clone()),
        post_status: Set(post.status.clone()),
        post_name: Set(post.slug.clone()),
        post_parent: Set(post.parent_id),
        menu_order: Set(post.menu_order),
        post_type: Set(post.post_type.clone()),
        post_mime_type: Set(post.mime_type.clone()),
    };
    let model = active.insert(db).await?;
    Ok(model.id)
}

/// Posts of `post_type` (any type if `None`) whose meta matches `filter`.
pub async fn list<C: ConnectionTrait>(
    db: &C,
    post_type: Option<&str>,
    filter: MetaFilter,
) -> Result<Vec<Post>, MetaError> {
    let mut query = Entity::find();
    if let Some(post_type) = post_type {
        query = query.filter(Column::PostType.eq(post_type));
    }
    let host = post_type
        .map(HostType::from_post_type)
        .unwrap_or(HostType::Post);
    let items = query
        .has_meta(host, filter)?
        .order_by_asc(Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}
