use super::{Connect, Db, Pool, Shared};
use crate::{cache::MetadataCache, Catalog, Config};

use warden_core::{driver::Driver, Result};

use std::sync::Arc;

#[derive(Debug, Default)]
pub struct Builder {
    config: Option<Config>,
    catalog: Option<Box<dyn Catalog>>,
}

impl Builder {
    pub fn config(&mut self, config: Config) -> &mut Self {
        self.config = Some(config);
        self
    }

    /// Sets where schemas, policies and views are loaded from. Required.
    pub fn catalog(&mut self, catalog: impl Catalog) -> &mut Self {
        self.catalog = Some(Box::new(catalog));
        self
    }

    pub async fn connect(&mut self, url: &str) -> Result<Db> {
        self.build(Connect::new(url)?).await
    }

    pub async fn build(&mut self, driver: impl Driver) -> Result<Db> {
        let Some(catalog) = self.catalog.take() else {
            warden_core::bail!("no catalog configured");
        };

        let config = self.config.take().unwrap_or_default();
        let pool = Pool::new(driver, config.pool_max_size).await?;

        Ok(Db {
            shared: Arc::new(Shared {
                catalog,
                cache: MetadataCache::new(config.cache_max_entries, config.cache_ttl),
                pool,
                config,
            }),
        })
    }
}
