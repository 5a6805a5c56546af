use contracts::domain::a003_term::aggregate::Term;
use contracts::domain::common::HostType;
use contracts::domain::meta::MetaCollection;
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::shared::meta::MetaCapable;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wp_terms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub term_id: i64,
    pub name: String,
    pub slug: String,
    pub term_group: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Term {
    fn from(m: Model) -> Self {
        Term {
            id: m.term_id,
            name: m.name,
            slug: m.slug,
            term_group: m.term_group,
            meta: None,
        }
    }
}

impl MetaCapable for Term {
    fn host_type(&self) -> HostType {
        HostType::Term
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

pub async fn get_by_slug<C: ConnectionTrait>(db: &C, slug: &str) -> Result<Option<Term>, DbErr> {
    let result = Entity::find()
        .filter(Column::Slug.eq(slug))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert<C: ConnectionTrait>(db: &C, term: &Term) -> Result<i64, DbErr> {
    let active = ActiveModel {
        term_id: sea_orm::ActiveValue::NotSet,
        name: Set(term.name.clone()),
        slug: Set(term.slug.clone()),
        term_group: Set(term.term_group),
    };
    let model = active.insert(db).await?;
    Ok(model.term_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    #[tokio::test]
    async fn test_term_meta_uses_term_id() {
        let db = connect_in_memory().await.unwrap();
        let term = Term::new_for_insert("News".into(), "news".into());
        insert(&db, &term).await.unwrap();
        let term = get_by_slug(&db, "news").await.unwrap().unwrap();

        let entry = term.create_field(&db, "color", "#ff0000").await.unwrap();
        assert_eq!(entry.owner_id, term.id);

        let relation = term.fields().unwrap();
        assert_eq!(relation.table(), "wp_termmeta");
        assert_eq!(relation.foreign_key(), "term_id");
        assert_eq!(relation.all(&db).await.unwrap(), vec![entry]);
    }
}
