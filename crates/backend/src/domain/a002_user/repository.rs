use contracts::domain::a002_user::aggregate::User;
use contracts::domain::common::HostType;
use contracts::domain::meta::MetaCollection;
use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::shared::meta::MetaCapable;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "wp_users")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "ID")]
    pub id: i64,
    pub user_login: String,
    pub user_email: String,
    pub display_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(m: Model) -> Self {
        User {
            id: m.id,
            login: m.user_login,
            email: m.user_email,
            display_name: m.display_name,
            meta: None,
        }
    }
}

impl MetaCapable for User {
    fn host_type(&self) -> HostType {
        HostType::User
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

pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: i64) -> Result<Option<User>, DbErr> {
    let result = Entity::find_by_id(id).one(db).await?;
    Ok(result.map(Into::into))
}

pub async fn get_by_login<C: ConnectionTrait>(db: &C, login: &str) -> Result<Option<User>, DbErr> {
    let result = Entity::find()
        .filter(Column::UserLogin.eq(login))
        .one(db)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn insert<C: ConnectionTrait>(db: &C, user: &User) -> Result<i64, DbErr> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        user_login: Set(user.login.clone()),
        user_email: Set(user.email.clone()),
        display_name: Set(user.display_name.clone()),
    };
    let model = active.insert(db).await?;
    Ok(model.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use crate::shared::meta::HasMetaScope;
    use sea_orm::{DatabaseBackend, Statement};

    #[tokio::test]
    async fn test_user_meta_lives_in_usermeta() {
        let db = connect_in_memory().await.unwrap();
        let user = User::new_for_insert("ann".into(), "ann@example.com".into());
        let id = insert(&db, &user).await.unwrap();
        let mut user = get_by_login(&db, "ann").await.unwrap().unwrap();
        assert_eq!(user.id, id);

        user.save_meta_map(&db, [("first_name", "Ann"), ("rich_editing", "true")])
            .await
            .unwrap();
        assert_eq!(user.meta_value("first_name"), Some("Ann"));

        let rows = db
            .query_all(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT user_id FROM wp_usermeta".to_string(),
            ))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);

        let found = Entity::find()
            .has_meta(HostType::User, ("first_name", "Ann"))
            .unwrap()
            .all(&db)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(get_by_id(&db, id + 1).await.unwrap().is_none());
    }
}
