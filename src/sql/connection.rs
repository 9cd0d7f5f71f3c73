//! SQL Server connections over TDS

use async_trait::async_trait;
use tiberius::{AuthMethod, Client, Config, Query};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use super::executor::{Connector, DbError, SqlConnection};
use super::value::{SqlType, SqlValue};
use crate::config::{ConnectionConfig, Credentials};

/// Connects to SQL Server with the settings from `sql_server_config.cfg`
#[derive(Debug, Clone)]
pub struct TiberiusConnector {
    config: ConnectionConfig,
}

impl TiberiusConnector {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn tds_config(&self) -> Config {
        let mut config = Config::new();
        config.host(&self.config.server);
        config.port(self.config.port);
        config.database(&self.config.database);
        config.application_name("dimensional-pipeline");
        if self.config.trust_server_certificate {
            config.trust_cert();
        }
        config.authentication(auth_method(&self.config.credentials()));
        config
    }
}

#[cfg(windows)]
fn integrated_auth() -> AuthMethod {
    AuthMethod::Integrated
}

/// Outside Windows there is no SSPI; log in as the OS user with an empty
/// password, which works for servers that map OS accounts to logins
#[cfg(not(windows))]
fn integrated_auth() -> AuthMethod {
    AuthMethod::sql_server(os_user_name(), "")
}

#[cfg(not(windows))]
fn os_user_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_default()
}

fn auth_method(credentials: &Credentials) -> AuthMethod {
    match credentials {
        Credentials::SqlServer { username, password } => AuthMethod::sql_server(username, password),
        Credentials::Integrated => integrated_auth(),
    }
}

#[async_trait]
impl Connector for TiberiusConnector {
    async fn connect(&self) -> Result<Box<dyn SqlConnection>, DbError> {
        let config = self.tds_config();
        debug!(
            server = %self.config.server,
            port = self.config.port,
            database = %self.config.database,
            "Connecting to SQL Server"
        );

        let tcp = TcpStream::connect(config.get_addr())
            .await
            .map_err(|e| DbError::Connection(format!("{}:{}: {}", self.config.server, self.config.port, e)))?;
        tcp.set_nodelay(true)
            .map_err(|e| DbError::Connection(e.to_string()))?;

        let client = Client::connect(config, tcp.compat_write())
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        info!(database = %self.config.database, "Connected to database");
        Ok(Box::new(TiberiusConnection { client }))
    }
}

pub struct TiberiusConnection {
    client: Client<Compat<TcpStream>>,
}

fn query_error(err: tiberius::error::Error) -> DbError {
    DbError::Query(err.to_string())
}

fn bind_value<'a>(query: &mut Query<'a>, value: &SqlValue) {
    match value {
        SqlValue::Null(SqlType::Integer) => query.bind(Option::<i64>::None),
        SqlValue::Null(SqlType::Decimal) => query.bind(Option::<f64>::None),
        SqlValue::Null(SqlType::Text) => query.bind(Option::<String>::None),
        SqlValue::Null(SqlType::Boolean) => query.bind(Option::<bool>::None),
        SqlValue::Null(SqlType::Date) => query.bind(Option::<chrono::NaiveDateTime>::None),
        SqlValue::Int(v) => query.bind(*v),
        SqlValue::Decimal(v) => query.bind(*v),
        SqlValue::Text(v) => query.bind(v.clone()),
        SqlValue::Bool(v) => query.bind(*v),
        SqlValue::Date(v) => query.bind(*v),
    }
}

#[async_trait]
impl SqlConnection for TiberiusConnection {
    async fn execute_batch(&mut self, sql: &str) -> Result<(), DbError> {
        self.client
            .simple_query(sql)
            .await
            .map_err(query_error)?
            .into_results()
            .await
            .map_err(query_error)?;
        Ok(())
    }

    async fn execute_params(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, DbError> {
        let mut query = Query::new(sql.to_string());
        for value in params {
            bind_value(&mut query, value);
        }
        let result = query.execute(&mut self.client).await.map_err(query_error)?;
        Ok(result.total())
    }

    async fn query_count(&mut self, sql: &str) -> Result<i64, DbError> {
        let row = self
            .client
            .simple_query(sql)
            .await
            .map_err(query_error)?
            .into_row()
            .await
            .map_err(query_error)?
            .ok_or_else(|| DbError::Query(format!("No rows returned by: {}", sql)))?;

        // COUNT(*) is INT, COUNT_BIG(*) is BIGINT
        if let Ok(Some(count)) = row.try_get::<i32, usize>(0) {
            return Ok(count as i64);
        }
        row.try_get::<i64, usize>(0)
            .map_err(query_error)?
            .ok_or_else(|| DbError::Query(format!("NULL count returned by: {}", sql)))
    }

    async fn close(self: Box<Self>) -> Result<(), DbError> {
        self.client.close().await.map_err(query_error)
    }
}
