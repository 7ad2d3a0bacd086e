//! Wiring: settings, database, cache and modules into one runnable app.

use std::time::Duration;

use anyhow::Context;
use axum::Router;
use bookapi_cache::TagAwareCache;
use bookapi_kernel::{settings::Settings, AppContext, InitCtx, ModuleRegistry};

use crate::modules;

pub struct Application {
    ctx: AppContext,
    registry: ModuleRegistry,
}

impl Application {
    /// Open the database and register modules. Nothing is migrated yet.
    pub async fn connect(settings: Settings) -> anyhow::Result<Self> {
        let db = bookapi_db::connect(&settings.database)
            .await
            .with_context(|| format!("failed to connect to {}", settings.database.url))?;
        let cache = TagAwareCache::new(
            settings.cache.max_capacity,
            Duration::from_secs(settings.cache.ttl_secs),
        );

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry);
        tracing::info!(modules = registry.module_count(), "modules registered");

        Ok(Self {
            ctx: AppContext::new(settings, db, cache),
            registry,
        })
    }

    /// `connect`, migrate when configured to, then initialize every module.
    pub async fn start(settings: Settings) -> anyhow::Result<Self> {
        let app = Self::connect(settings).await?;
        if app.ctx.settings.database.run_migrations {
            app.migrate().await?;
        }
        app.registry
            .init_all(&InitCtx::from_app(&app.ctx))
            .await
            .context("module initialization failed")?;
        Ok(app)
    }

    /// Apply pending module migrations; returns how many ran.
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        bookapi_db::run_migrations(&self.ctx.db, &self.registry.collect_migrations())
            .await
            .context("migrations failed")
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn router(&self) -> Router {
        bookapi_http::build_router(&self.registry, &self.ctx)
    }

    /// Serve until ctrl-c or SIGTERM, then stop modules in reverse order.
    pub async fn serve(self) -> anyhow::Result<()> {
        self.registry
            .start_all(&InitCtx::from_app(&self.ctx))
            .await
            .context("module start failed")?;

        let result =
            bookapi_http::start_server(self.router(), &self.ctx, bookapi_http::shutdown_signal())
                .await;

        self.registry.stop_all().await?;
        result
    }
}
