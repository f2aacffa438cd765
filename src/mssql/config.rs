use async_trait::async_trait;
use tiberius::Config as TiberiusConfig;

use super::client::create_mssql_client;
use super::session::MssqlSession;
use crate::driver::{Connector, Session};
use crate::error::QueryBuilderError;

/// The built-in [`Connector`]: one tiberius client per execution, configured from an
/// ADO.NET style connection string.
///
/// ```rust
/// use mssql_query_builder::mssql::MssqlConnector;
///
/// let connector = MssqlConnector::new()
///     .with_trust_cert(true)
///     .with_application_name("reporting");
/// let config = connector
///     .build_config("Server=tcp:db.local,1444;Database=app;User Id=sa;Password=secret")
///     .unwrap();
/// assert_eq!(config.get_addr(), "db.local:1444");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MssqlConnector {
    trust_cert: bool,
    application_name: Option<String>,
}

impl MssqlConnector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept any server certificate, as `TrustServerCertificate=true` does.
    #[must_use]
    pub fn with_trust_cert(mut self, trust_cert: bool) -> Self {
        self.trust_cert = trust_cert;
        self
    }

    #[must_use]
    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Parse `connection_string` and apply the connector options on top of it.
    ///
    /// # Errors
    /// Returns `QueryBuilderError::ConnectionError` if the connection string cannot be parsed.
    pub fn build_config(&self, connection_string: &str) -> Result<TiberiusConfig, QueryBuilderError> {
        let mut config = TiberiusConfig::from_ado_string(connection_string).map_err(|e| {
            QueryBuilderError::ConnectionError(format!("invalid SQL Server connection string: {e}"))
        })?;
        if self.trust_cert {
            config.trust_cert();
        }
        if let Some(name) = &self.application_name {
            config.application_name(name);
        }
        Ok(config)
    }
}

#[async_trait]
impl Connector for MssqlConnector {
    async fn connect(&self, target: &str) -> Result<Box<dyn Session>, QueryBuilderError> {
        let config = self.build_config(target)?;
        let addr = config.get_addr();
        tracing::debug!(%addr, "connecting to SQL Server");
        let client = create_mssql_client(config).await?;
        Ok(Box::new(MssqlSession::new(client)))
    }
}
