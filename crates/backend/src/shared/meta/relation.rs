use contracts::domain::meta::{MetaCollection, MetaEntry, MetaValue};
use sea_orm::sea_query::{Alias, Expr, Order, Query, SelectStatement};
use sea_orm::{ConnectionTrait, DbErr, FromQueryResult};

use super::registry::{MetaBinding, META_KEY, META_VALUE};

#[derive(Debug, FromQueryResult)]
struct MetaRow {
    id: i64,
    owner_id: i64,
    meta_key: Option<String>,
    meta_value: Option<String>,
}

impl From<MetaRow> for MetaEntry {
    fn from(row: MetaRow) -> Self {
        MetaEntry {
            id: row.id,
            owner_id: row.owner_id,
            meta_key: row.meta_key.unwrap_or_default(),
            meta_value: row.meta_value,
        }
    }
}

/// One-to-many relation host -> meta rows
///
/// Only describes the relation; nothing is read or written until one of
/// the async methods is awaited.
#[derive(Debug, Clone)]
pub struct MetaRelation {
    binding: MetaBinding,
    owner_id: i64,
}

impl MetaRelation {
    pub fn new(binding: &MetaBinding, owner_id: i64) -> Self {
        Self {
            binding: binding.clone(),
            owner_id,
        }
    }

    pub fn binding(&self) -> &MetaBinding {
        &self.binding
    }

    pub fn table(&self) -> &str {
        &self.binding.table
    }

    pub fn foreign_key(&self) -> &str {
        &self.binding.foreign_key
    }

    pub fn owner_id(&self) -> i64 {
        self.owner_id
    }

    fn select(&self) -> SelectStatement {
        let b = &self.binding;
        Query::select()
            .expr_as(Expr::col(Alias::new(&b.primary_key)), Alias::new("id"))
            .expr_as(Expr::col(Alias::new(&b.foreign_key)), Alias::new("owner_id"))
            .column(Alias::new(META_KEY))
            .column(Alias::new(META_VALUE))
            .from(Alias::new(&b.table))
            .and_where(Expr::col(Alias::new(&b.foreign_key)).eq(self.owner_id))
            .order_by(Alias::new(&b.primary_key), Order::Asc)
            .to_owned()
    }

    async fn fetch<C: ConnectionTrait>(
        &self,
        db: &C,
        select: &SelectStatement,
    ) -> Result<Vec<MetaEntry>, DbErr> {
        let stmt = db.get_database_backend().build(select);
        let rows = MetaRow::find_by_statement(stmt).all(db).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// All meta rows of the owner, oldest first.
    pub async fn all<C: ConnectionTrait>(&self, db: &C) -> Result<Vec<MetaEntry>, DbErr> {
        self.fetch(db, &self.select()).await
    }

    pub async fn collection<C: ConnectionTrait>(&self, db: &C) -> Result<MetaCollection, DbErr> {
        Ok(self.all(db).await?.into())
    }

    pub async fn where_key<C: ConnectionTrait>(
        &self,
        db: &C,
        key: &str,
    ) -> Result<Vec<MetaEntry>, DbErr> {
        let select = self
            .select()
            .and_where(Expr::col(Alias::new(META_KEY)).eq(key))
            .to_owned();
        self.fetch(db, &select).await
    }

    pub async fn first_by_key<C: ConnectionTrait>(
        &self,
        db: &C,
        key: &str,
    ) -> Result<Option<MetaEntry>, DbErr> {
        let select = self
            .select()
            .and_where(Expr::col(Alias::new(META_KEY)).eq(key))
            .limit(1)
            .to_owned();
        Ok(self.fetch(db, &select).await?.into_iter().next())
    }

    /// Existing row for `key`, or an unsaved one bound to this owner.
    pub async fn first_or_new<C: ConnectionTrait>(
        &self,
        db: &C,
        key: &str,
    ) -> Result<PendingMeta<'_>, DbErr> {
        let pending = match self.first_by_key(db, key).await? {
            Some(entry) => PendingMeta {
                relation: self,
                id: Some(entry.id),
                meta_key: entry.meta_key,
                original: entry.meta_value.clone(),
                meta_value: entry.meta_value,
            },
            None => PendingMeta {
                relation: self,
                id: None,
                meta_key: key.to_string(),
                original: None,
                meta_value: None,
            },
        };
        Ok(pending)
    }

    /// Insert a new row unconditionally.
    pub async fn create<C: ConnectionTrait>(
        &self,
        db: &C,
        key: &str,
        value: MetaValue,
    ) -> Result<MetaEntry, DbErr> {
        let meta_value = value.into_inner();
        let id = self.insert(db, key, meta_value.clone()).await?;
        tracing::debug!(
            "Created {}.{} for {}={}: id {}",
            self.binding.table,
            key,
            self.binding.foreign_key,
            self.owner_id,
            id
        );
        Ok(MetaEntry {
            id,
            owner_id: self.owner_id,
            meta_key: key.to_string(),
            meta_value,
        })
    }

    async fn insert<C: ConnectionTrait>(
        &self,
        db: &C,
        key: &str,
        value: Option<String>,
    ) -> Result<i64, DbErr> {
        let b = &self.binding;
        let mut insert = Query::insert();
        insert
            .into_table(Alias::new(&b.table))
            .columns([
                Alias::new(&b.foreign_key),
                Alias::new(META_KEY),
                Alias::new(META_VALUE),
            ])
            .values([self.owner_id.into(), key.into(), value.into()])
            .map_err(|e| DbErr::Custom(e.to_string()))?;
        let result = db.execute(db.get_database_backend().build(&insert)).await?;
        Ok(result.last_insert_id() as i64)
    }

    async fn update<C: ConnectionTrait>(
        &self,
        db: &C,
        id: i64,
        value: Option<String>,
    ) -> Result<bool, DbErr> {
        let b = &self.binding;
        let update = Query::update()
            .table(Alias::new(&b.table))
            .value(Alias::new(META_VALUE), value)
            .and_where(Expr::col(Alias::new(&b.primary_key)).eq(id))
            .to_owned();
        let result = db.execute(db.get_database_backend().build(&update)).await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Result of find-or-new: an existing row or one not saved yet
#[derive(Debug)]
pub struct PendingMeta<'r> {
    relation: &'r MetaRelation,
    id: Option<i64>,
    meta_key: String,
    meta_value: Option<String>,
    original: Option<String>,
}

impl PendingMeta<'_> {
    pub fn exists(&self) -> bool {
        self.id.is_some()
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.meta_key
    }

    pub fn value(&self) -> Option<&str> {
        self.meta_value.as_deref()
    }

    pub fn fill(mut self, value: MetaValue) -> Self {
        self.meta_value = value.into_inner();
        self
    }

    pub fn is_dirty(&self) -> bool {
        !self.exists() || self.meta_value != self.original
    }

    /// Persist the row. `false` means the update touched nothing
    /// (the row disappeared since it was read).
    pub async fn save<C: ConnectionTrait>(self, db: &C) -> Result<bool, DbErr> {
        let relation = self.relation;
        match self.id {
            Some(_) if !self.is_dirty() => Ok(true),
            Some(id) => {
                tracing::debug!(
                    "Updating {}.{} for {}={}",
                    relation.binding.table,
                    self.meta_key,
                    relation.binding.foreign_key,
                    relation.owner_id
                );
                relation.update(db, id, self.meta_value).await
            }
            None => {
                relation
                    .create(db, &self.meta_key, self.meta_value.into())
                    .await?;
                Ok(true)
            }
        }
    }
}
