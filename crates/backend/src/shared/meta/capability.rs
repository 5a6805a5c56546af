use async_trait::async_trait;
use contracts::domain::common::HostType;
use contracts::domain::meta::{MetaCollection, MetaEntry, MetaMap, MetaValue};
use sea_orm::ConnectionTrait;

use super::error::{MetaError, RegistryError};
use super::registry::{self, MetaBinding};
use super::relation::MetaRelation;

/// Host entity that owns rows in a meta side table
///
/// Implementors only expose their identity and a slot for the loaded
/// relation; reading, filtering and writing meta is shared here. Map
/// forms reload the relation afterwards, single-key forms leave the
/// loaded relation as it was.
///
/// Map forms are not atomic: a failure mid-way keeps the entries already
/// written.
#[async_trait]
pub trait MetaCapable: Send + Sync {
    fn host_type(&self) -> HostType;

    fn owner_id(&self) -> i64;

    fn loaded_meta(&self) -> Option<&MetaCollection>;

    fn set_loaded_meta(&mut self, meta: Option<MetaCollection>);

    fn meta_binding(&self) -> Result<&'static MetaBinding, RegistryError> {
        registry::global().resolve(self.host_type())
    }

    /// Relation to this host's meta rows.
    fn meta(&self) -> Result<MetaRelation, RegistryError> {
        Ok(MetaRelation::new(self.meta_binding()?, self.owner_id()))
    }

    fn fields(&self) -> Result<MetaRelation, RegistryError> {
        self.meta()
    }

    /// Value from the loaded relation; `None` when not loaded or absent.
    fn meta_value(&self, key: &str) -> Option<&str> {
        self.loaded_meta().and_then(|meta| meta.get(key))
    }

    /// Fetch the relation and replace the loaded one.
    async fn load_meta<C>(&mut self, db: &C) -> Result<(), MetaError>
    where
        C: ConnectionTrait,
    {
        let meta = self.meta()?.collection(db).await?;
        self.set_loaded_meta(Some(meta));
        Ok(())
    }

    /// Upsert one key. Returns whether the row was persisted.
    async fn save_meta<C, V>(&self, db: &C, key: &str, value: V) -> Result<bool, MetaError>
    where
        C: ConnectionTrait,
        V: Into<MetaValue> + Send,
    {
        let relation = self.meta()?;
        let saved = relation
            .first_or_new(db, key)
            .await?
            .fill(value.into())
            .save(db)
            .await?;
        Ok(saved)
    }

    /// Upsert every entry in order, then reload the relation.
    async fn save_meta_map<C, M>(&mut self, db: &C, fields: M) -> Result<bool, MetaError>
    where
        C: ConnectionTrait,
        M: Into<MetaMap> + Send,
    {
        for (key, value) in fields.into() {
            self.save_meta(db, &key, value).await?;
        }
        self.load_meta(db).await?;
        Ok(true)
    }

    async fn save_field<C, V>(&self, db: &C, key: &str, value: V) -> Result<bool, MetaError>
    where
        C: ConnectionTrait,
        V: Into<MetaValue> + Send,
    {
        self.save_meta(db, key, value).await
    }

    /// Insert one row, even if the key already exists.
    async fn create_meta<C, V>(&self, db: &C, key: &str, value: V) -> Result<MetaEntry, MetaError>
    where
        C: ConnectionTrait,
        V: Into<MetaValue> + Send,
    {
        Ok(self.meta()?.create(db, key, value.into()).await?)
    }

    /// Insert one row per entry, then reload the relation. Rows come back in input order.
    async fn create_meta_map<C, M>(&mut self, db: &C, fields: M) -> Result<Vec<MetaEntry>, MetaError>
    where
        C: ConnectionTrait,
        M: Into<MetaMap> + Send,
    {
        let relation = self.meta()?;
        let mut created = Vec::new();
        for (key, value) in fields.into() {
            created.push(relation.create(db, &key, value).await?);
        }
        self.load_meta(db).await?;
        Ok(created)
    }

    async fn create_field<C, V>(&self, db: &C, key: &str, value: V) -> Result<MetaEntry, MetaError>
    where
        C: ConnectionTrait,
        V: Into<MetaValue> + Send,
    {
        self.create_meta(db, key, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;

    struct Host {
        kind: HostType,
        id: i64,
        meta: Option<MetaCollection>,
    }

    impl Host {
        fn new(kind: HostType, id: i64) -> Self {
            Self {
                kind,
                id,
                meta: None,
            }
        }
    }

    impl MetaCapable for Host {
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

    #[test]
    fn test_fields_is_meta() {
        let host = Host::new(HostType::Comment, 5);
        let meta = host.meta().unwrap();
        let fields = host.fields().unwrap();
        assert_eq!(meta.binding(), fields.binding());
        assert_eq!(meta.foreign_key(), "comment_id");
        assert_eq!(meta.owner_id(), 5);
    }

    #[test]
    fn test_unbound_host() {
        let host = Host::new(HostType::Custom("Video"), 1);
        assert!(matches!(host.meta(), Err(RegistryError::UnknownHost(_))));
    }

    #[tokio::test]
    async fn test_save_twice_keeps_one_row() {
        let db = connect_in_memory().await.unwrap();
        let host = Host::new(HostType::Post, 1);

        assert!(host.save_meta(&db, "color", "red").await.unwrap());
        assert!(host.save_meta(&db, "color", "blue").await.unwrap());
        // unchanged value is still a successful save
        assert!(host.save_field(&db, "color", "blue").await.unwrap());

        let rows = host.meta().unwrap().where_key(&db, "color").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].meta_value.as_deref(), Some("blue"));
    }

    #[tokio::test]
    async fn test_create_twice_duplicates() {
        let db = connect_in_memory().await.unwrap();
        let host = Host::new(HostType::Term, 2);

        let first = host.create_meta(&db, "order", 1).await.unwrap();
        let second = host.create_field(&db, "order", 2).await.unwrap();
        assert_ne!(first.id, second.id);

        let rows = host.meta().unwrap().where_key(&db, "order").await.unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn test_map_forms_reload_relation() {
        let db = connect_in_memory().await.unwrap();
        let mut host = Host::new(HostType::User, 3);
        assert_eq!(host.meta_value("nickname"), None);

        assert!(host
            .save_meta_map(&db, [("nickname", "ann"), ("locale", "de_DE")])
            .await
            .unwrap());
        assert_eq!(host.meta_value("nickname"), Some("ann"));
        assert_eq!(host.loaded_meta().unwrap().len(), 2);

        let created = host
            .create_meta_map(&db, MetaMap::new().insert("tag", "b").insert("tag", "a"))
            .await
            .unwrap();
        let values: Vec<_> = created.iter().map(|e| e.meta_value.as_deref()).collect();
        assert_eq!(values, vec![Some("b"), Some("a")]);
        assert_eq!(host.loaded_meta().unwrap().count_key("tag"), 2);
    }

    #[tokio::test]
    async fn test_single_key_forms_do_not_reload() {
        let db = connect_in_memory().await.unwrap();
        let mut host = Host::new(HostType::Post, 4);
        host.load_meta(&db).await.unwrap();

        host.save_meta(&db, "color", "red").await.unwrap();
        assert!(host.loaded_meta().unwrap().is_empty());

        host.load_meta(&db).await.unwrap();
        assert_eq!(host.meta_value("color"), Some("red"));
    }

    #[tokio::test]
    async fn test_null_value_is_stored_as_null() {
        let db = connect_in_memory().await.unwrap();
        let mut host = Host::new(HostType::Post, 6);
        host.save_meta(&db, "draft", None::<String>).await.unwrap();
        host.load_meta(&db).await.unwrap();

        let entry = host.loaded_meta().unwrap().find("draft").unwrap();
        assert_eq!(entry.meta_value, None);
    }
}
