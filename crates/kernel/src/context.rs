use std::sync::Arc;

use bookapi_cache::TagAwareCache;
use sea_orm::DatabaseConnection;

use crate::settings::Settings;

/// Shared handles every module router is built with.
#[derive(Clone)]
pub struct AppContext {
    pub settings: Arc<Settings>,
    pub db: DatabaseConnection,
    pub cache: TagAwareCache,
}

impl AppContext {
    pub fn new(settings: Settings, db: DatabaseConnection, cache: TagAwareCache) -> Self {
        Self {
            settings: Arc::new(settings),
            db,
            cache,
        }
    }

    /// Absolute or path-only URL of a resource, used for `Location` headers.
    pub fn resource_location(&self, collection: &str, id: impl std::fmt::Display) -> String {
        format!(
            "{}/api/{}/{}",
            self.settings.server.public_url.trim_end_matches('/'),
            collection,
            id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::time::Duration;

    fn context(public_url: &str) -> AppContext {
        let mut settings = Settings::default();
        settings.server.public_url = public_url.to_string();
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        AppContext::new(settings, db, TagAwareCache::new(16, Duration::from_secs(60)))
    }

    #[test]
    fn location_is_path_only_without_public_url() {
        assert_eq!(context("").resource_location("books", 7), "/api/books/7");
    }

    #[test]
    fn location_joins_public_url_without_double_slash() {
        assert_eq!(
            context("https://books.example.com/").resource_location("authors", 3),
            "https://books.example.com/api/authors/3"
        );
    }
}
