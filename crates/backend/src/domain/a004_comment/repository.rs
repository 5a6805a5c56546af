use contracts::domain::a004_comment::aggregate::Comment;
use contracts::domain::common::HostType;
use contracts::domain::meta::MetaCollection;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set};

use crate::shared::meta::MetaCapable;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wp_comments")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "comment_ID")]
    pub comment_id: i64,
    #[sea_orm(column_name = "comment_post_ID")]
    pub comment_post_id: i64,
    pub comment_author: String,
    pub comment_content: String,
    pub comment_approved: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Comment {
    fn from(m: Model) -> Self {
        Comment {
            id: m.comment_id,
            post_id: m.comment_post_id,
            author: m.comment_author,
            content: m.comment_content,
            approved: m.comment_approved,
            meta: None,
        }
    }
}

impl MetaCapable for Comment {
    fn host_type(&self) -> HostType {
        HostType::Comment
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

pub async fn list_for_post<C: ConnectionTrait>(db: &C, post_id: i64) -> Result<Vec<Comment>, DbErr> {
    let items = Entity::find()
        .filter(Column::CommentPostId.eq(post_id))
        .order_by_asc(Column::CommentId)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn insert<C: ConnectionTrait>(db: &C, comment: &Comment) -> Result<i64, DbErr> {
    let active = ActiveModel {
        comment_id: sea_orm::ActiveValue::NotSet,
        comment_post_id: Set(comment.post_id),
        comment_author: Set(comment.author.clone()),
        comment_content: Set(comment.content.clone()),
        comment_approved: Set(comment.approved.clone()),
    };
    let model = active.insert(db).await?;
    Ok(model.comment_id)
}
