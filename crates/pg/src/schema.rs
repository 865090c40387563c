use tokio_postgres::Client;

/// Schema metadata for PostgreSQL tables.
///
/// Provides compile-time SQL generation for table creation and indexing.
/// All methods return `&'static str` so implementations can build their
/// statements with `const_format::concatcp!`.
///
/// This trait contains no I/O; [`install`] applies the statements.
pub trait Schema {
    /// Returns the table (or view) name in the database.
    fn name() -> &'static str;
    /// Returns idempotent DDL creating the relation.
    fn creates() -> &'static str;
    /// Returns `CREATE INDEX IF NOT EXISTS` statements for all indices.
    fn indices() -> &'static str;
}

/// Applies one relation's DDL and indices.
pub async fn install<S: Schema>(client: &Client) -> Result<(), tokio_postgres::Error> {
    log::info!("ensuring relation ({})", S::name());
    client.batch_execute(S::creates()).await?;
    client.batch_execute(S::indices()).await
}

