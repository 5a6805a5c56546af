use std::fmt;

/// Тег типа сущности-владельца meta-таблицы
///
/// Заменяет поиск класса по имени: каждый тег имеет короткое имя, из
/// которого по соглашению выводятся имя meta-типа (`{ShortName}Meta`) и
/// внешний ключ (`{shortname}_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HostType {
    #[default]
    Post,
    Page,
    Attachment,
    MenuItem,
    CustomLink,
    User,
    Term,
    Comment,
    /// Пользовательский тип записи, например `Custom("Video")`
    Custom(&'static str),
}

impl HostType {
    /// Встроенные типы WordPress
    pub const BUILTIN: [HostType; 8] = [
        HostType::Post,
        HostType::Page,
        HostType::Attachment,
        HostType::MenuItem,
        HostType::CustomLink,
        HostType::User,
        HostType::Term,
        HostType::Comment,
    ];

    /// Короткое имя типа (аналог имени класса без namespace)
    pub fn short_name(&self) -> &'static str {
        match self {
            HostType::Post => "Post",
            HostType::Page => "Page",
            HostType::Attachment => "Attachment",
            HostType::MenuItem => "MenuItem",
            HostType::CustomLink => "CustomLink",
            HostType::User => "User",
            HostType::Term => "Term",
            HostType::Comment => "Comment",
            HostType::Custom(name) => *name,
        }
    }

    /// Тип host-а строки `wp_posts` по колонке `post_type`
    ///
    /// Неизвестные типы считаются обычными постами. Custom link хранится
    /// как `nav_menu_item`, поэтому выбирается явно.
    pub fn from_post_type(post_type: &str) -> Self {
        match post_type {
            "page" => HostType::Page,
            "attachment" => HostType::Attachment,
            "nav_menu_item" => HostType::MenuItem,
            _ => HostType::Post,
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
