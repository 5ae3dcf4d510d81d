use warden_core::{
    async_trait,
    driver::{Connection, Driver},
    Error, Result,
};

use std::borrow::Cow;
use url::Url;

/// Picks a built-in driver from the scheme of a connection URL.
///
/// `sqlite:` and `postgresql:` (or `postgres:`) are recognized, each behind
/// the cargo feature of the same name.
#[derive(Debug)]
pub struct Connect {
    driver: Box<dyn Driver>,
}

impl Connect {
    pub fn new(url: &str) -> Result<Connect> {
        let parsed = Url::parse(url).map_err(|err| Error::invalid_connection_url(err.to_string()))?;

        let driver = match parsed.scheme() {
            "sqlite" => sqlite(url)?,
            "postgresql" | "postgres" => postgresql(url)?,
            scheme => {
                return Err(Error::invalid_connection_url(format!(
                    "unsupported scheme `{scheme}`"
                )))
            }
        };

        Ok(Connect { driver })
    }
}

#[async_trait]
impl Driver for Connect {
    fn url(&self) -> Cow<'_, str> {
        self.driver.url()
    }

    async fn connect(&self) -> Result<Box<dyn Connection>> {
        self.driver.connect().await
    }

    fn max_connections(&self) -> Option<usize> {
        self.driver.max_connections()
    }
}

#[cfg(feature = "sqlite")]
fn sqlite(url: &str) -> Result<Box<dyn Driver>> {
    Ok(Box::new(warden_driver_sqlite::Sqlite::new(url)?))
}

#[cfg(not(feature = "sqlite"))]
fn sqlite(_url: &str) -> Result<Box<dyn Driver>> {
    Err(Error::invalid_connection_url("`sqlite` feature not enabled"))
}

#[cfg(feature = "postgresql")]
fn postgresql(url: &str) -> Result<Box<dyn Driver>> {
    Ok(Box::new(warden_driver_postgresql::PostgreSQL::new(url)?))
}

#[cfg(not(feature = "postgresql"))]
fn postgresql(_url: &str) -> Result<Box<dyn Driver>> {
    Err(Error::invalid_connection_url("`postgresql` feature not enabled"))
}
