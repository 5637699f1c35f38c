use std::sync::Arc;
use crate::{
    blog_interface::BlogInterface,
    config::Config,
    infrastructure::BlogDatabase,
    search::InMemorySearchBackend,
};

#[derive(Clone)]
pub struct AppState {
    pub blog_interface: BlogInterface,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize database
        let database = BlogDatabase::connect(&config.database).await?;
        database.init().await?;

        // Search index is rebuilt from saves and publishes while the process runs
        let search = Arc::new(InMemorySearchBackend::new());
        let blog_interface = BlogInterface::new(database, search)?;

        Ok(Self {
            blog_interface,
            config,
        })
    }
}
