use std::collections::HashMap;

use contracts::domain::common::HostType;
use once_cell::sync::OnceCell;

use super::error::RegistryError;

pub const META_KEY: &str = "meta_key";
pub const META_VALUE: &str = "meta_value";

/// Generic meta type used by hosts without a meta table of their own.
pub const DEFAULT_FALLBACK: &str = "PostMeta";

static REGISTRY: OnceCell<MetaRegistry> = OnceCell::new();

/// Meta type name by convention: `{ShortName}Meta`.
pub fn meta_type_name(short_name: &str) -> String {
    format!("{}Meta", short_name)
}

/// Foreign key column by convention: `{shortname}_id`.
pub fn foreign_key_name(short_name: &str) -> String {
    format!("{}_id", short_name.to_lowercase())
}

/// Resolved binding host -> meta table
///
/// Everything a relation or a scope needs to address the meta rows of
/// one host type: the meta table with its key columns and the host table
/// the foreign key points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaBinding {
    pub meta_type: String,
    pub table: String,
    pub primary_key: String,
    pub foreign_key: String,
    pub host_table: String,
    pub host_key: String,
    /// The host had no `{ShortName}Meta` and uses the fallback type
    pub fallback: bool,
}

#[derive(Debug, Clone)]
struct MetaTable {
    name: String,
    table: String,
    primary_key: String,
}

#[derive(Debug, Clone)]
struct HostTable {
    table: String,
    primary_key: String,
}

/// Host -> meta bindings, built once at startup
#[derive(Debug, Clone)]
pub struct MetaRegistry {
    bindings: HashMap<HostType, MetaBinding>,
}

impl MetaRegistry {
    pub fn builder() -> MetaRegistryBuilder {
        MetaRegistryBuilder::default()
    }

    /// Stock WordPress schema: post, user, term and comment meta
    ///
    /// Attachment, CustomLink, MenuItem and Page are rows of `wp_posts` and
    /// share Post's meta table and `post_id` foreign key.
    pub fn wordpress_builder() -> MetaRegistryBuilder {
        Self::builder()
            .meta_type("PostMeta", "wp_postmeta", "meta_id")
            .meta_type("UserMeta", "wp_usermeta", "umeta_id")
            .meta_type("TermMeta", "wp_termmeta", "meta_id")
            .meta_type("CommentMeta", "wp_commentmeta", "meta_id")
            .host(HostType::Post, "wp_posts", "ID")
            .host(HostType::Page, "wp_posts", "ID")
            .host(HostType::Attachment, "wp_posts", "ID")
            .host(HostType::MenuItem, "wp_posts", "ID")
            .host(HostType::CustomLink, "wp_posts", "ID")
            .host(HostType::User, "wp_users", "ID")
            .host(HostType::Term, "wp_terms", "term_id")
            .host(HostType::Comment, "wp_comments", "comment_ID")
            .alias(HostType::Attachment, HostType::Post)
            .alias(HostType::CustomLink, HostType::Post)
            .alias(HostType::MenuItem, HostType::Post)
            // without this alias Page would fall back to PostMeta keyed by `page_id`,
            // a column `wp_postmeta` does not have
            .alias(HostType::Page, HostType::Post)
            .fallback(DEFAULT_FALLBACK)
    }

    pub fn wordpress(strict: bool) -> Result<Self, RegistryError> {
        Self::wordpress_builder().strict(strict).build()
    }

    pub fn resolve(&self, host: HostType) -> Result<&MetaBinding, RegistryError> {
        self.bindings
            .get(&host)
            .ok_or_else(|| RegistryError::UnknownHost(host.short_name().to_string()))
    }

    pub fn hosts(&self) -> impl Iterator<Item = HostType> + '_ {
        self.bindings.keys().copied()
    }
}

/// Install the process-wide registry; only the first call wins.
pub fn install(registry: MetaRegistry) -> anyhow::Result<()> {
    REGISTRY
        .set(registry)
        .map_err(|_| anyhow::anyhow!("Meta registry is already installed"))?;
    tracing::info!("Meta registry installed");
    Ok(())
}

/// Process-wide registry; the built-in WordPress bindings unless one was installed.
pub fn global() -> &'static MetaRegistry {
    REGISTRY.get_or_init(|| {
        MetaRegistry::wordpress(false).expect("built-in WordPress meta bindings are valid")
    })
}

#[derive(Debug, Default)]
pub struct MetaRegistryBuilder {
    meta_types: Vec<MetaTable>,
    hosts: Vec<(HostType, HostTable)>,
    aliases: Vec<(HostType, HostType)>,
    fallback: Option<String>,
    strict: bool,
}

impl MetaRegistryBuilder {
    /// Register meta type `name` stored in `table` with primary key `primary_key`.
    pub fn meta_type(mut self, name: &str, table: &str, primary_key: &str) -> Self {
        self.meta_types.push(MetaTable {
            name: name.to_string(),
            table: table.to_string(),
            primary_key: primary_key.to_string(),
        });
        self
    }

    /// Register a host type stored in `table` with primary key `primary_key`.
    pub fn host(mut self, host: HostType, table: &str, primary_key: &str) -> Self {
        self.hosts.push((
            host,
            HostTable {
                table: table.to_string(),
                primary_key: primary_key.to_string(),
            },
        ));
        self
    }

    /// Resolve `host` through `target`'s short name (shared meta table and foreign key).
    pub fn alias(mut self, host: HostType, target: HostType) -> Self {
        self.aliases.push((host, target));
        self
    }

    pub fn fallback(mut self, meta_type: &str) -> Self {
        self.fallback = Some(meta_type.to_string());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Validate the registrations and resolve every host once.
    pub fn build(self) -> Result<MetaRegistry, RegistryError> {
        let mut meta_types: HashMap<String, MetaTable> = HashMap::new();
        for meta in self.meta_types {
            if meta_types.contains_key(&meta.name) {
                return Err(RegistryError::DuplicateMetaType(meta.name));
            }
            meta_types.insert(meta.name.clone(), meta);
        }

        let mut hosts: HashMap<HostType, HostTable> = HashMap::new();
        for (host, table) in self.hosts {
            if hosts.insert(host, table).is_some() {
                return Err(RegistryError::DuplicateHost(host.short_name().to_string()));
            }
        }

        let mut aliases: HashMap<HostType, HostType> = HashMap::new();
        for (host, target) in &self.aliases {
            if !hosts.contains_key(host) {
                return Err(RegistryError::UnknownHost(host.short_name().to_string()));
            }
            if !hosts.contains_key(target) {
                return Err(RegistryError::UnknownAliasTarget {
                    host: host.short_name().to_string(),
                    target: target.short_name().to_string(),
                });
            }
            if aliases.insert(*host, *target).is_some() {
                return Err(RegistryError::DuplicateHost(host.short_name().to_string()));
            }
        }
        for (host, target) in &self.aliases {
            let alias_error = |host: &HostType, target: &HostType| {
                (host.short_name().to_string(), target.short_name().to_string())
            };
            if aliases.contains_key(target) {
                let (host, target) = alias_error(host, target);
                return Err(RegistryError::AliasChain { host, target });
            }
            if !meta_types.contains_key(&meta_type_name(target.short_name())) {
                let (host, target) = alias_error(host, target);
                return Err(RegistryError::AliasWithoutMeta { host, target });
            }
        }

        let fallback_name = self
            .fallback
            .unwrap_or_else(|| DEFAULT_FALLBACK.to_string());
        let fallback = meta_types
            .get(&fallback_name)
            .ok_or_else(|| RegistryError::UnknownFallback(fallback_name.clone()))?;

        let mut bindings = HashMap::with_capacity(hosts.len());
        for (host, host_table) in &hosts {
            let short_name = aliases.get(host).unwrap_or(host).short_name();
            let (meta, is_fallback) = match meta_types.get(&meta_type_name(short_name)) {
                Some(meta) => (meta, false),
                None => (fallback, true),
            };
            let foreign_key = foreign_key_name(short_name);

            if is_fallback {
                if self.strict {
                    return Err(RegistryError::UnboundHost(host.short_name().to_string()));
                }
                tracing::warn!(
                    "{} has no {}; using {} ({}.{})",
                    host,
                    meta_type_name(short_name),
                    meta.name,
                    meta.table,
                    foreign_key
                );
            }

            bindings.insert(
                *host,
                MetaBinding {
                    meta_type: meta.name.clone(),
                    table: meta.table.clone(),
                    primary_key: meta.primary_key.clone(),
                    foreign_key,
                    host_table: host_table.table.clone(),
                    host_key: host_table.primary_key.clone(),
                    fallback: is_fallback,
                },
            );
        }

        Ok(MetaRegistry { bindings })
    }
}
