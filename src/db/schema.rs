use tokio_postgres::Client;

use crate::error::IntrospectError;
use crate::introspect::{ColumnRecord, SchemaIntrospector};

// Excluded columns are flagged rather than filtered in SQL so a single round
// trip can tell a missing table apart from a fully excluded one.
const LIST_COLUMNS_SQL: &str = r#"
    SELECT
        c.column_name::text AS column_name,
        c.column_name::text = ANY($3) AS is_excluded
    FROM information_schema.columns c
    WHERE c.table_schema = $1 AND c.table_name = $2
    ORDER BY c.ordinal_position
"#;

/// Reads column metadata from PostgreSQL's `information_schema`.
pub struct PgIntrospector {
    client: Client,
    schema: String,
}

impl PgIntrospector {
    pub fn new(client: Client, schema: impl Into<String>) -> Self {
        Self {
            client,
            schema: schema.into(),
        }
    }
}

impl SchemaIntrospector for PgIntrospector {
    async fn list_columns(
        &self,
        table: &str,
        excluding: &[&str],
    ) -> Result<Vec<ColumnRecord>, IntrospectError> {
        let excluded: Vec<String> = excluding.iter().map(|c| c.to_string()).collect();
        let rows = self
            .client
            .query(LIST_COLUMNS_SQL, &[&self.schema, &table, &excluded])
            .await?;

        let total = rows.len();
        let columns = keep_included(
            &self.schema,
            table,
            rows.iter().map(|row| {
                (
                    row.get::<_, String>("column_name"),
                    row.get::<_, bool>("is_excluded"),
                )
            }),
        )?;

        tracing::debug!(
            schema = %self.schema,
            table,
            total,
            kept = columns.len(),
            "listed columns"
        );

        Ok(columns)
    }
}

/// Turn `(column_name, is_excluded)` rows into the kept columns. No rows at all
/// means the table does not exist; rows that are all excluded give an empty
/// list.
fn keep_included<I>(schema: &str, table: &str, rows: I) -> Result<Vec<ColumnRecord>, IntrospectError>
where
    I: IntoIterator<Item = (String, bool)>,
{
    let mut seen_any = false;
    let mut columns = Vec::new();
    for (column_name, is_excluded) in rows {
        seen_any = true;
        if !is_excluded {
            columns.push(ColumnRecord { column_name });
        }
    }

    if !seen_any {
        return Err(IntrospectError::TableNotFound {
            table: format!("{}.{}", schema, table),
        });
    }
    Ok(columns)
}
