use contracts::domain::common::HostType;
use contracts::domain::meta::{MetaCondition, MetaFilter};
use sea_orm::sea_query::{Alias, Expr, Query, SelectStatement};
use sea_orm::{
    EntityName, EntityTrait, IdenStatic, Iterable, PrimaryKeyToColumn, QueryFilter, Select,
};

use super::error::RegistryError;
use super::registry::{self, MetaBinding, MetaRegistry, META_KEY, META_VALUE};

/// Primary key column of `E`, the binding's host key if `E` declares none.
fn host_key<E: EntityTrait>(binding: &MetaBinding) -> String {
    E::PrimaryKey::iter()
        .next()
        .map(|pk| pk.into_column().as_str().to_string())
        .unwrap_or_else(|| binding.host_key.clone())
}

/// Correlated sub-query: meta rows of the current `E` row matching `condition`.
fn meta_exists<E: EntityTrait>(binding: &MetaBinding, condition: &MetaCondition) -> SelectStatement {
    let meta = Alias::new(&binding.table);
    let host = Alias::new(E::default().table_name());
    let mut sub = Query::select();
    sub.expr(Expr::val(1))
        .from(meta.clone())
        .and_where(
            Expr::col((meta.clone(), Alias::new(&binding.foreign_key)))
                .equals((host, Alias::new(host_key::<E>(binding)))),
        )
        .and_where(Expr::col((meta.clone(), Alias::new(META_KEY))).eq(condition.key.as_str()));
    if let Some(value) = &condition.value {
        sub.and_where(Expr::col((meta, Alias::new(META_VALUE))).eq(value.as_str()));
    }
    sub
}

/// Add one `EXISTS` constraint per filter condition (AND-combined).
///
/// An empty filter leaves the query unchanged. The caller is responsible
/// for `binding` belonging to `E`; [`HasMetaScope`] checks it.
pub fn has_meta<E: EntityTrait>(
    query: Select<E>,
    binding: &MetaBinding,
    filter: MetaFilter,
) -> Select<E> {
    filter.into_iter().fold(query, |query, condition| {
        query.filter(Expr::exists(meta_exists::<E>(binding, &condition)))
    })
}

/// Meta query scope on host queries
///
/// ```ignore
/// let posts = post::Entity::find()
///     .has_meta(HostType::Post, ("color", "red"))?
///     .all(db)
///     .await?;
/// ```
pub trait HasMetaScope: Sized {
    /// Scope against an explicit registry.
    fn has_meta_in(
        self,
        registry: &MetaRegistry,
        host: HostType,
        filter: impl Into<MetaFilter>,
    ) -> Result<Self, RegistryError>;

    /// Scope against the process-wide registry.
    fn has_meta(self, host: HostType, filter: impl Into<MetaFilter>) -> Result<Self, RegistryError> {
        self.has_meta_in(registry::global(), host, filter)
    }
}

impl<E: EntityTrait> HasMetaScope for Select<E> {
    fn has_meta_in(
        self,
        registry: &MetaRegistry,
        host: HostType,
        filter: impl Into<MetaFilter>,
    ) -> Result<Self, RegistryError> {
        let binding = registry.resolve(host)?;
        let table = E::default().table_name().to_string();
        if table != binding.host_table {
            return Err(RegistryError::HostTableMismatch {
                host: host.short_name().to_string(),
                expected: binding.host_table.clone(),
                actual: table,
            });
        }
        Ok(has_meta(self, binding, filter.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_post::repository::{self as post_repository, Entity as PostEntity};
    use crate::domain::a002_user::repository::{self as user_repository, Entity as UserEntity};
    use crate::shared::data::db::connect_in_memory;
    use crate::shared::meta::relation::MetaRelation;
    use contracts::domain::a001_post::aggregate::Post;
    use contracts::domain::a002_user::aggregate::User;
    use contracts::domain::meta::MetaMap;
    use sea_orm::sea_query::SqliteQueryBuilder;
    use sea_orm::{DatabaseConnection, QueryOrder, QueryTrait};

    async fn seed() -> (DatabaseConnection, Vec<i64>) {
        let db = connect_in_memory().await.unwrap();
        let binding = registry::global().resolve(HostType::Post).unwrap().clone();
        let mut ids = Vec::new();
        for (title, meta) in [
            ("red shirt", vec![("color", Some("red")), ("size", Some("xl"))]),
            ("blue shirt", vec![("color", Some("blue"))]),
            ("plain", vec![("size", None)]),
        ] {
            let post = Post::new_for_insert("post", title.into(), String::new());
            let id = post_repository::insert(&db, &post).await.unwrap();
            let relation = MetaRelation::new(&binding, id);
            for (key, value) in meta {
                relation.create(&db, key, value.into()).await.unwrap();
            }
            ids.push(id);
        }
        (db, ids)
    }

    async fn matching(db: &DatabaseConnection, filter: impl Into<MetaFilter>) -> Vec<i64> {
        PostEntity::find()
            .has_meta(HostType::Post, filter)
            .unwrap()
            .order_by_asc(post_repository::Column::Id)
            .all(db)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect()
    }

    #[test]
    fn test_builds_one_exists_per_condition() {
        let sql = PostEntity::find()
            .has_meta(HostType::Attachment, MetaMap::from([("a", "1"), ("b", "2")]))
            .unwrap()
            .as_query()
            .to_string(SqliteQueryBuilder);
        assert_eq!(sql.matches("EXISTS").count(), 2);
        assert!(sql.contains(r#""wp_postmeta"."post_id" = "wp_posts"."ID""#));
    }

    #[tokio::test]
    async fn test_key_only_matches_any_value() {
        let (db, ids) = seed().await;
        assert_eq!(matching(&db, "color").await, vec![ids[0], ids[1]]);
        assert_eq!(
            matching(&db, ("size", None::<String>)).await,
            vec![ids[0], ids[2]]
        );
    }

    #[tokio::test]
    async fn test_key_and_value_match_exactly() {
        let (db, ids) = seed().await;
        assert_eq!(matching(&db, ("color", "red")).await, vec![ids[0]]);
        assert!(matching(&db, ("color", "green")).await.is_empty());
    }

    #[tokio::test]
    async fn test_conditions_are_and_combined() {
        let (db, ids) = seed().await;
        assert_eq!(matching(&db, ["color", "size"]).await, vec![ids[0]]);

        let map = MetaMap::new()
            .insert("color", "blue")
            .insert("size", None::<String>);
        assert!(matching(&db, map).await.is_empty());

        let map = MetaMap::new()
            .insert("color", "red")
            .insert("size", None::<String>);
        assert_eq!(matching(&db, map).await, vec![ids[0]]);
    }

    #[tokio::test]
    async fn test_empty_filter_adds_nothing() {
        let (db, ids) = seed().await;
        assert_eq!(matching(&db, MetaFilter::new()).await, ids);
    }

    #[test]
    fn test_host_of_another_table_is_rejected() {
        let result = PostEntity::find().has_meta(HostType::User, "color");
        assert_eq!(
            result.err(),
            Some(RegistryError::HostTableMismatch {
                host: "User".into(),
                expected: "wp_users".into(),
                actual: "wp_posts".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_scopes_users_on_their_own_table() {
        let db = connect_in_memory().await.unwrap();
        let mut ids = Vec::new();
        for login in ["ann", "bob"] {
            let user = User::new_for_insert(login.into(), format!("{login}@example.com"));
            ids.push(user_repository::insert(&db, &user).await.unwrap());
        }
        let binding = registry::global().resolve(HostType::User).unwrap();
        MetaRelation::new(binding, ids[1])
            .create(&db, "locale", "de_DE".into())
            .await
            .unwrap();

        let found: Vec<_> = UserEntity::find()
            .has_meta(HostType::User, ("locale", "de_DE"))
            .unwrap()
            .all(&db)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(found, vec![ids[1]]);
    }

    #[test]
    fn test_unknown_host_is_an_error() {
        let result = PostEntity::find().has_meta(HostType::Custom("Video"), "color");
        assert!(matches!(result, Err(RegistryError::UnknownHost(_))));
    }
}
