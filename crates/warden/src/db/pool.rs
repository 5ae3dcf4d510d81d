//! Connection pooling for store connections.

use std::ops::{Deref, DerefMut};

use warden_core::{
    driver::{Connection, Driver},
    Error, Result,
};

/// A pool of store connections.
#[derive(Debug)]
pub struct Pool {
    inner: deadpool::managed::Pool<Manager>,
}

impl Pool {
    /// Creates a pool and opens its first connection, so that an unreachable
    /// store is reported at startup.
    ///
    /// The pool never grows past the smaller of `max_size` and the driver's
    /// own limit.
    pub async fn new(driver: impl Driver, max_size: Option<usize>) -> Result<Pool> {
        let max_size = match (max_size, driver.max_connections()) {
            (Some(configured), Some(driver)) => Some(configured.min(driver)),
            (configured, driver) => configured.or(driver),
        };

        let mut builder = deadpool::managed::Pool::builder(Manager {
            driver: Box::new(driver),
        })
        .runtime(deadpool::Runtime::Tokio1);

        if let Some(max_size) = max_size {
            builder = builder.max_size(max_size.max(1));
        }

        let inner = builder.build().map_err(Error::connection_pool)?;

        drop(inner.get().await.map_err(Error::connection_pool)?);

        Ok(Pool { inner })
    }

    /// Checks out a connection. It returns to the pool when dropped.
    pub async fn get(&self) -> Result<PoolConnection> {
        let connection = self.inner.get().await.map_err(Error::connection_pool)?;
        Ok(PoolConnection { inner: connection })
    }

    pub fn max_size(&self) -> usize {
        self.inner.status().max_size
    }
}

#[derive(Debug)]
struct Manager {
    driver: Box<dyn Driver>,
}

impl deadpool::managed::Manager for Manager {
    type Type = Box<dyn Connection>;
    type Error = Error;

    async fn create(&self) -> Result<Self::Type> {
        self.driver.connect().await
    }

    async fn recycle(
        &self,
        _obj: &mut Self::Type,
        _metrics: &deadpool::managed::Metrics,
    ) -> deadpool::managed::RecycleResult<Self::Error> {
        Ok(())
    }
}

/// A connection checked out of a [`Pool`].
pub struct PoolConnection {
    inner: deadpool::managed::Object<Manager>,
}

impl Deref for PoolConnection {
    type Target = Box<dyn Connection>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PoolConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
