use tiberius::{Client, Config, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::error::QueryBuilderError;

/// Type alias for SQL Server client
pub type MssqlClient = Client<Compat<TcpStream>>;

/// Open a client for `config`.
///
/// Named instances are resolved through the SQL Browser service. A routing redirect from
/// the server (Azure SQL gateways, availability group listeners) is followed once.
///
/// # Errors
/// Returns `QueryBuilderError::ConnectionError` if the TCP connection or the login fails.
pub async fn create_mssql_client(config: Config) -> Result<MssqlClient, QueryBuilderError> {
    let tcp = open_tcp(&config).await?;

    match Client::connect(config.clone(), tcp.compat_write()).await {
        Ok(client) => Ok(client),
        Err(tiberius::error::Error::Routing { host, port }) => {
            tracing::debug!(%host, port, "following SQL Server routing redirect");
            let mut routed = config;
            routed.host(&host);
            routed.port(port);
            let tcp = open_tcp(&routed).await?;
            Client::connect(routed, tcp.compat_write())
                .await
                .map_err(login_error)
        }
        Err(e) => Err(login_error(e)),
    }
}

async fn open_tcp(config: &Config) -> Result<TcpStream, QueryBuilderError> {
    let tcp = TcpStream::connect_named(config)
        .await
        .map_err(|e| QueryBuilderError::ConnectionError(format!("TCP connection error: {e}")))?;
    tcp.set_nodelay(true)
        .map_err(|e| QueryBuilderError::ConnectionError(format!("TCP setup error: {e}")))?;
    Ok(tcp)
}

fn login_error(e: tiberius::error::Error) -> QueryBuilderError {
    QueryBuilderError::ConnectionError(format!("SQL Server connection error: {e}"))
}
