use super::repository;
use crate::shared::meta::MetaCapable;
use contracts::domain::a001_post::aggregate::Post;
use contracts::domain::meta::{MetaCollection, MetaEntry, MetaFilter, MetaMap};
use sea_orm::ConnectionTrait;

/// Получение записи по ID вместе с meta-полями
pub async fn get_with_meta<C: ConnectionTrait>(db: &C, id: i64) -> anyhow::Result<Option<Post>> {
    let Some(mut post) = repository::get_by_id(db, id).await? else {
        return Ok(None);
    };
    post.load_meta(db).await?;
    Ok(Some(post))
}

/// Список записей, отфильтрованных по meta
pub async fn list<C: ConnectionTrait>(
    db: &C,
    post_type: Option<String>,
    filter: MetaFilter,
) -> anyhow::Result<Vec<Post>> {
    Ok(repository::list(db, post_type.as_deref(), filter).await?)
}

/// Сохранение (upsert) meta-полей записи; `None` если записи нет
pub async fn save_meta<C: ConnectionTrait>(
    db: &C,
    id: i64,
    fields: MetaMap,
) -> anyhow::Result<Option<MetaCollection>> {
    let Some(mut post) = repository::get_by_id(db, id).await? else {
        return Ok(None);
    };
    tracing::info!("Saving {} meta field(s) for post {}", fields.len(), id);
    post.save_meta_map(db, fields).await?;
    Ok(post.meta)
}

/// Создание новых meta-строк записи (без поиска существующих)
pub async fn create_meta<C: ConnectionTrait>(
    db: &C,
    id: i64,
    fields: MetaMap,
) -> anyhow::Result<Option<Vec<MetaEntry>>> {
    let Some(mut post) = repository::get_by_id(db, id).await? else {
        return Ok(None);
    };
    tracing::info!("Creating {} meta row(s) for post {}", fields.len(), id);
    let created = post.create_meta_map(db, fields).await?;
    Ok(Some(created))
}

/// Вставка тестовых данных
pub async fn insert_test_data<C: ConnectionTrait>(db: &C) -> anyhow::Result<()> {
    let data = vec![
        (
            "post",
            "Hello world",
            MetaMap::new().insert("color", "red").insert("featured", true),
        ),
        (
            "page",
            "About",
            MetaMap::new().insert("_wp_page_template", "default"),
        ),
        (
            "attachment",
            "Cover image",
            MetaMap::new()
                .insert("_wp_attached_file", "2024/01/cover.jpg")
                .insert("_wp_attachment_image_alt", "Cover"),
        ),
    ];

    for (post_type, title, fields) in data {
        let post = Post::new_for_insert(post_type, title.into(), String::new());
        let mut post = Post {
            id: repository::insert(db, &post).await?,
            ..post
        };
        post.save_meta_map(db, fields).await?;
    }

    Ok(())
}
