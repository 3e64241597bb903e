//! # Schema Registry
//!
//! Declares every store, its key path and its secondary indexes. The
//! storage engine builds the on-disk layout from this and nothing else.
//!
//! ## Registry → SQLite Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StoreDef "articles" (key_path = "id")                                  │
//! │  ├── by-slug   (slug,   unique)                                         │
//! │  ├── by-pillar (pillar)                                                 │
//! │  └── by-status (status)                                                 │
//! │            │                                                            │
//! │            ▼                                                            │
//! │  CREATE TABLE "articles" (                                              │
//! │      pk            TEXT PRIMARY KEY NOT NULL,   ← doc["id"]             │
//! │      doc           TEXT NOT NULL,               ← whole record, JSON    │
//! │      "ix_by-slug"   TEXT,                       ← doc["slug"]           │
//! │      "ix_by-pillar" TEXT,                       ← doc["pillar"]         │
//! │      "ix_by-status" TEXT                        ← doc["status"]         │
//! │  )                                                                      │
//! │  CREATE UNIQUE INDEX "articles__by-slug" ON "articles"("ix_by-slug")    │
//! │  CREATE INDEX        "articles__by-pillar" ...                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Persisted Contract
//! Store names, key paths, index names, indexed fields and uniqueness
//! flags are what existing data was written against. Changing any of them
//! needs a new [`SCHEMA_VERSION`].

use serde_json::Value;

use crate::error::{DbError, DbResult};

/// Logical database name.
pub const DATABASE_NAME: &str = "academy-db";

/// Current schema revision, stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// Store names.
pub mod stores {
    pub const ARTICLES: &str = "articles";
    pub const PODCASTS: &str = "podcasts";
    pub const VIDEOS: &str = "videos";
    pub const LEADS: &str = "leads";
    pub const SETTINGS: &str = "settings";
}

/// Index names.
pub mod indexes {
    pub const BY_SLUG: &str = "by-slug";
    pub const BY_PILLAR: &str = "by-pillar";
    pub const BY_STATUS: &str = "by-status";
}

// =============================================================================
// Definitions
// =============================================================================

/// A secondary index over one top-level record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    pub name: &'static str,
    pub field: &'static str,
    pub unique: bool,
}

impl IndexDef {
    const fn new(name: &'static str, field: &'static str) -> Self {
        IndexDef {
            name,
            field,
            unique: false,
        }
    }

    const fn unique(name: &'static str, field: &'static str) -> Self {
        IndexDef {
            name,
            field,
            unique: true,
        }
    }

    /// Column holding this index's extracted value.
    pub fn column(&self) -> String {
        quote_ident(&format!("ix_{}", self.name))
    }

    /// Value this index stores for `doc`.
    ///
    /// Strings are used as-is, numbers and booleans in their JSON text
    /// form. A missing or structured field is not indexed (NULL).
    pub fn value_of(&self, doc: &Value) -> Option<String> {
        match doc.get(self.field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// A named collection of keyed records.
#[derive(Debug, PartialEq, Eq)]
pub struct StoreDef {
    pub name: &'static str,
    pub key_path: &'static str,
    pub indexes: &'static [IndexDef],
}

/// The whole registry at one revision.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub version: i64,
    pub stores: &'static [StoreDef],
}

static CONTENT_INDEXES: [IndexDef; 2] = [
    IndexDef::unique(indexes::BY_SLUG, "slug"),
    IndexDef::new(indexes::BY_STATUS, "status"),
];

static ARTICLE_INDEXES: [IndexDef; 3] = [
    IndexDef::unique(indexes::BY_SLUG, "slug"),
    IndexDef::new(indexes::BY_PILLAR, "pillar"),
    IndexDef::new(indexes::BY_STATUS, "status"),
];

static STORES: [StoreDef; 5] = [
    StoreDef {
        name: stores::ARTICLES,
        key_path: "id",
        indexes: &ARTICLE_INDEXES,
    },
    StoreDef {
        name: stores::PODCASTS,
        key_path: "id",
        indexes: &CONTENT_INDEXES,
    },
    StoreDef {
        name: stores::VIDEOS,
        key_path: "id",
        indexes: &CONTENT_INDEXES,
    },
    StoreDef {
        name: stores::LEADS,
        key_path: "id",
        indexes: &[],
    },
    StoreDef {
        name: stores::SETTINGS,
        key_path: "id",
        indexes: &[],
    },
];

/// The registry every [`Database`](crate::Database) is opened against.
pub static SCHEMA: Schema = Schema {
    name: DATABASE_NAME,
    version: SCHEMA_VERSION,
    stores: &STORES,
};

impl Schema {
    /// Looks up a store by name.
    pub fn store(&'static self, name: &str) -> DbResult<&'static StoreDef> {
        self.stores
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| DbError::UnknownStore(name.to_string()))
    }
}

// =============================================================================
// Store Helpers
// =============================================================================

impl StoreDef {
    /// Looks up one of this store's indexes.
    pub fn index(&self, name: &str) -> DbResult<&IndexDef> {
        self.indexes
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| DbError::UnknownIndex {
                store: self.name.to_string(),
                index: name.to_string(),
            })
    }

    /// Extracts the primary key. Only non-empty strings are keys.
    pub fn key_of(&self, doc: &Value) -> DbResult<String> {
        match doc.get(self.key_path) {
            Some(Value::String(key)) if !key.is_empty() => Ok(key.clone()),
            _ => Err(DbError::MissingKey {
                store: self.name.to_string(),
                key_path: self.key_path.to_string(),
            }),
        }
    }

    /// Index values for `doc`, in declaration order.
    pub fn index_values(&self, doc: &Value) -> Vec<Option<String>> {
        self.indexes.iter().map(|i| i.value_of(doc)).collect()
    }

    /// Quoted table name.
    pub fn table(&self) -> String {
        quote_ident(self.name)
    }

    /// Statements creating this store's table and indexes.
    pub fn ddl(&self) -> Vec<String> {
        let mut columns = vec![
            "pk TEXT PRIMARY KEY NOT NULL".to_string(),
            "doc TEXT NOT NULL".to_string(),
        ];
        columns.extend(self.indexes.iter().map(|i| format!("{} TEXT", i.column())));

        let mut statements = vec![format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.table(),
            columns.join(", ")
        )];

        for index in self.indexes {
            statements.push(format!(
                "CREATE {}INDEX IF NOT EXISTS {} ON {}({})",
                if index.unique { "UNIQUE " } else { "" },
                quote_ident(&format!("{}__{}", self.name, index.name)),
                self.table(),
                index.column(),
            ));
        }

        statements
    }

    /// Insert-or-update on the primary key only.
    ///
    /// A clash on a unique secondary index fails the statement instead of
    /// replacing the other row.
    pub fn upsert_sql(&self) -> String {
        let mut columns = vec!["pk".to_string(), "doc".to_string()];
        columns.extend(self.indexes.iter().map(IndexDef::column));

        let placeholders: Vec<String> = (1..=columns.len()).map(|n| format!("?{n}")).collect();
        let updates: Vec<String> = columns[1..]
            .iter()
            .map(|c| format!("{c} = excluded.{c}"))
            .collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(pk) DO UPDATE SET {}",
            self.table(),
            columns.join(", "),
            placeholders.join(", "),
            updates.join(", ")
        )
    }

    /// Maps a column named in a SQLite constraint message back to its index.
    pub(crate) fn index_for_column(&self, column: &str) -> Option<(usize, &IndexDef)> {
        let name = column.trim_matches('"').strip_prefix("ix_")?;
        self.indexes.iter().enumerate().find(|(_, i)| i.name == name)
    }
}

/// Double-quotes an SQL identifier.
pub(crate) fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_matches_layout() {
        let names: Vec<_> = SCHEMA.stores.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["articles", "podcasts", "videos", "leads", "settings"]);
        assert!(SCHEMA.stores.iter().all(|s| s.key_path == "id"));

        let articles = SCHEMA.store(stores::ARTICLES).unwrap();
        assert!(articles.index(indexes::BY_SLUG).unwrap().unique);
        assert!(!articles.index(indexes::BY_PILLAR).unwrap().unique);
        assert!(!articles.index(indexes::BY_STATUS).unwrap().unique);

        let videos = SCHEMA.store(stores::VIDEOS).unwrap();
        assert!(videos.index(indexes::BY_PILLAR).is_err());
        assert!(SCHEMA.store(stores::LEADS).unwrap().indexes.is_empty());
    }

    #[test]
    fn test_unknown_names() {
        assert!(matches!(
            SCHEMA.store("comments"),
            Err(DbError::UnknownStore(name)) if name == "comments"
        ));
        let podcasts = SCHEMA.store(stores::PODCASTS).unwrap();
        assert!(matches!(
            podcasts.index("by-author"),
            Err(DbError::UnknownIndex { .. })
        ));
    }

    #[test]
    fn test_key_and_index_extraction() {
        let articles = SCHEMA.store(stores::ARTICLES).unwrap();
        let doc = json!({ "id": "a1", "slug": "x", "status": "draft", "pillar": 7 });

        assert_eq!(articles.key_of(&doc).unwrap(), "a1");
        assert_eq!(
            articles.index_values(&doc),
            vec![Some("x".to_string()), Some("7".to_string()), Some("draft".to_string())]
        );

        assert!(matches!(
            articles.key_of(&json!({ "id": "" })),
            Err(DbError::MissingKey { .. })
        ));
        assert!(articles.key_of(&json!({ "id": 5 })).is_err());
        assert_eq!(articles.index_values(&json!({ "id": "a2" })), vec![None, None, None]);
    }

    #[test]
    fn test_ddl_and_upsert_sql() {
        let articles = SCHEMA.store(stores::ARTICLES).unwrap();
        let ddl = articles.ddl();
        assert_eq!(ddl.len(), 4);
        assert!(ddl[0].starts_with("CREATE TABLE IF NOT EXISTS \"articles\""));
        assert!(ddl[1].contains("CREATE UNIQUE INDEX IF NOT EXISTS \"articles__by-slug\""));
        assert!(ddl[2].starts_with("CREATE INDEX"));

        let sql = articles.upsert_sql();
        assert!(sql.contains("VALUES (?1, ?2, ?3, ?4, ?5)"));
        assert!(sql.contains("ON CONFLICT(pk) DO UPDATE"));
        assert!(!sql.contains("REPLACE"));
    }

    #[test]
    fn test_index_for_column() {
        let articles = SCHEMA.store(stores::ARTICLES).unwrap();
        let (pos, index) = articles.index_for_column("ix_by-slug").unwrap();
        assert_eq!(pos, 0);
        assert_eq!(index.name, indexes::BY_SLUG);
        assert!(articles.index_for_column("doc").is_none());
    }
}
