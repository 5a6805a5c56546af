use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::common::HostType;
use crate::domain::meta::MetaCollection;

/// Запись `wp_posts`: пост, страница, вложение или пункт меню
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,

    #[serde(rename = "authorId")]
    pub author_id: i64,

    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub status: String,
    pub slug: String,

    #[serde(rename = "parentId")]
    pub parent_id: i64,

    #[serde(rename = "menuOrder")]
    pub menu_order: i32,

    #[serde(rename = "postType")]
    pub post_type: String,

    #[serde(rename = "mimeType")]
    pub mime_type: String,

    #[serde(rename = "postedAt")]
    pub posted_at: NaiveDateTime,

    /// Тип host-а для выбора meta-таблицы
    #[serde(skip)]
    pub kind: HostType,

    /// Загруженные meta-поля, `None` пока не загружены
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub meta: Option<MetaCollection>,
}

impl Post {
    /// Создать новую запись для вставки в БД (id назначит база)
    pub fn new_for_insert(post_type: &str, title: String, content: String) -> Self {
        Self {
            id: 0,
            author_id: 0,
            slug: slugify(&title),
            title,
            content,
            excerpt: String::new(),
            status: "publish".to_string(),
            parent_id: 0,
            menu_order: 0,
            post_type: post_type.to_string(),
            mime_type: String::new(),
            posted_at: chrono::Utc::now().naive_utc(),
            kind: HostType::from_post_type(post_type),
            meta: None,
        }
    }

    /// Считать запись другим типом host-а (например, пункт меню как custom link)
    pub fn with_kind(mut self, kind: HostType) -> Self {
        self.kind = kind;
        self
    }
}

fn slugify(title: &str) -> String {
    title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_for_insert_resolves_kind() {
        let post = Post::new_for_insert("attachment", "Cover Image".into(), String::new());
        assert_eq!(post.kind, HostType::Attachment);
        assert_eq!(post.slug, "cover-image");

        let link = Post::new_for_insert("nav_menu_item", "Home".into(), String::new())
            .with_kind(HostType::CustomLink);
        assert_eq!(link.kind, HostType::CustomLink);
    }
}
