//! Coalesce fragment generator.
//!
//! Merges per-player statistics spread across several source tables into one
//! row: for every mergeable column of the reference table, the first non-null
//! value across the sources wins, in the order the sources are listed.

use tracing::{debug, warn};

use crate::config::GeneratorConfig;
use crate::error::{FragmentError, FragmentResult};
use crate::fragment::{self, Ident};
use crate::introspect::SchemaIntrospector;

/// Identity and provenance columns. They must come from exactly one
/// designated source and are never merged.
pub const EXCLUDED_COLUMNS: [&str; 2] = ["player_", "source_file"];

/// Staging table every stat-type load is appended to.
pub const DEFAULT_REFERENCE_TABLE: &str = "staging_stats_table";

pub fn is_excluded(column: &str) -> bool {
    EXCLUDED_COLUMNS.contains(&column)
}

/// Generates `COALESCE(...)` select lists from a reference table's schema.
pub struct CoalesceGenerator<I> {
    introspector: I,
    reference_table: String,
}

impl<I: SchemaIntrospector> CoalesceGenerator<I> {
    pub fn new(introspector: I) -> Self {
        Self::with_reference_table(introspector, DEFAULT_REFERENCE_TABLE)
    }

    pub fn with_reference_table(introspector: I, reference_table: impl Into<String>) -> Self {
        Self {
            introspector,
            reference_table: reference_table.into(),
        }
    }

    pub fn from_config(introspector: I, config: &GeneratorConfig) -> Self {
        Self::with_reference_table(introspector, config.reference_table.clone())
    }

    pub fn reference_table(&self) -> &str {
        &self.reference_table
    }

    /// Build one `COALESCE(t1.c, ..., tn.c) AS c` expression per mergeable
    /// reference column, joined by `",\n"`.
    ///
    /// Issues exactly one schema read per call. An empty reference schema
    /// yields an empty string whatever `tables` holds; otherwise `tables`
    /// must name at least one source.
    pub async fn generate<S: AsRef<str>>(&self, tables: &[S]) -> FragmentResult<String> {
        debug!(
            reference_table = %self.reference_table,
            sources = tables.len(),
            "introspecting reference schema"
        );
        let records = self
            .introspector
            .list_columns(&self.reference_table, &EXCLUDED_COLUMNS)
            .await
            .map_err(|source| FragmentError::SchemaUnavailable {
                table: self.reference_table.clone(),
                source,
            })?;

        // Column names come from the warehouse itself and are taken as-is.
        let mut columns = Vec::with_capacity(records.len());
        for record in records {
            if is_excluded(&record.column_name) {
                warn!(
                    column = %record.column_name,
                    "introspector returned an excluded column; dropping it"
                );
                continue;
            }
            columns.push(Ident::from_catalog(record.column_name));
        }

        if columns.is_empty() {
            debug!("reference schema has no mergeable columns");
            return Ok(String::new());
        }
        if tables.is_empty() {
            return Err(FragmentError::NoSourceTables);
        }
        let sources = fragment::idents(tables.iter().map(|t| t.as_ref()))?;

        debug!(columns = columns.len(), "emitting coalesce fragment");
        Ok(fragment::coalesce_list(&columns, &sources))
    }
}

/// Generate the coalesce fragment against [`DEFAULT_REFERENCE_TABLE`].
pub async fn generate_coalesce_columns<I, S>(introspector: I, tables: &[S]) -> FragmentResult<String>
where
    I: SchemaIntrospector,
    S: AsRef<str>,
{
    CoalesceGenerator::new(introspector).generate(tables).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IntrospectError;
    use crate::introspect::{ColumnRecord, StaticIntrospector};
    use sqlparser::dialect::PostgreSqlDialect;
    use sqlparser::parser::Parser;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn reference(columns: &[&str]) -> StaticIntrospector {
        StaticIntrospector::new().with_table(DEFAULT_REFERENCE_TABLE, columns.iter().copied())
    }

    /// Ignores the exclusion argument and counts how often it is asked.
    struct CountingIntrospector {
        columns: Vec<String>,
        calls: AtomicUsize,
    }

    impl SchemaIntrospector for CountingIntrospector {
        async fn list_columns(
            &self,
            _table: &str,
            _excluding: &[&str],
        ) -> Result<Vec<ColumnRecord>, IntrospectError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.columns.iter().map(ColumnRecord::new).collect())
        }
    }

    struct FailingIntrospector;

    impl SchemaIntrospector for FailingIntrospector {
        async fn list_columns(
            &self,
            _table: &str,
            _excluding: &[&str],
        ) -> Result<Vec<ColumnRecord>, IntrospectError> {
            Err(IntrospectError::Other("permission denied".to_string()))
        }
    }

    #[tokio::test]
    async fn test_two_columns_two_expressions() {
        let out = generate_coalesce_columns(reference(&["c1", "c2"]), &["a", "b"])
            .await
            .unwrap();
        assert_eq!(
            out,
            "COALESCE(a.c1, b.c1) AS c1,\nCOALESCE(a.c2, b.c2) AS c2"
        );
        assert_eq!(out.matches("COALESCE(").count(), 2);
    }

    #[tokio::test]
    async fn test_excluded_columns_never_emitted() {
        let introspector = reference(&["player_", "minutes", "source_file", "int_"]);
        let out = generate_coalesce_columns(&introspector, &["summary", "defense"])
            .await
            .unwrap();
        assert!(!out.contains("player_"));
        assert!(!out.contains("source_file"));
        assert_eq!(
            out,
            "COALESCE(summary.minutes, defense.minutes) AS minutes,\n\
             COALESCE(summary.int_, defense.int_) AS int_"
        );
    }

    #[tokio::test]
    async fn test_exclusion_enforced_even_if_adapter_ignores_it() {
        let introspector = CountingIntrospector {
            columns: vec!["player_".into(), "minutes".into(), "source_file".into()],
            calls: AtomicUsize::new(0),
        };
        let out = generate_coalesce_columns(&introspector, &["a"]).await.unwrap();
        assert_eq!(out, "COALESCE(a.minutes) AS minutes");
    }

    #[tokio::test]
    async fn test_argument_order_follows_input() {
        let out = generate_coalesce_columns(reference(&["minutes"]), &["C", "A", "B"])
            .await
            .unwrap();
        assert_eq!(out, "COALESCE(C.minutes, A.minutes, B.minutes) AS minutes");
    }

    #[tokio::test]
    async fn test_empty_schema_yields_empty_text() {
        let out = generate_coalesce_columns(reference(&[]), &["a", "b"])
            .await
            .unwrap();
        assert_eq!(out, "");

        let only_excluded = reference(&["player_", "source_file"]);
        let out = generate_coalesce_columns(&only_excluded, &["a"]).await.unwrap();
        assert_eq!(out, "");

        let no_tables: [&str; 0] = [];
        let out = generate_coalesce_columns(&only_excluded, &no_tables)
            .await
            .unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn test_empty_tables_rejected() {
        let no_tables: [&str; 0] = [];
        let err = generate_coalesce_columns(reference(&["minutes"]), &no_tables)
            .await
            .unwrap_err();
        assert!(matches!(err, FragmentError::NoSourceTables));
    }

    #[tokio::test]
    async fn test_schema_unavailable_surfaces_source() {
        let err = generate_coalesce_columns(FailingIntrospector, &["a"])
            .await
            .unwrap_err();
        match err {
            FragmentError::SchemaUnavailable { table, source } => {
                assert_eq!(table, DEFAULT_REFERENCE_TABLE);
                assert_eq!(source.to_string(), "permission denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_reference_table() {
        let generator =
            CoalesceGenerator::with_reference_table(reference(&["minutes"]), "other_table");
        let err = generator.generate(&["a"]).await.unwrap_err();
        assert!(matches!(
            err,
            FragmentError::SchemaUnavailable {
                source: IntrospectError::TableNotFound { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_one_read_per_call() {
        let introspector = CountingIntrospector {
            columns: vec!["minutes".into()],
            calls: AtomicUsize::new(0),
        };
        let generator = CoalesceGenerator::new(&introspector);
        generator.generate(&["a"]).await.unwrap();
        generator.generate(&["a"]).await.unwrap();
        assert_eq!(introspector.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_table_identifier() {
        let err = generate_coalesce_columns(reference(&["minutes"]), &["a; DROP TABLE x"])
            .await
            .unwrap_err();
        assert!(matches!(err, FragmentError::InvalidIdentifier { .. }));
    }

    #[tokio::test]
    async fn test_empty_schema_wins_over_invalid_table() {
        let out = generate_coalesce_columns(reference(&[]), &["\"Player Stats\"", "a b"])
            .await
            .unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn test_schema_failure_reported_before_table_checks() {
        let err = generate_coalesce_columns(FailingIntrospector, &["a b"])
            .await
            .unwrap_err();
        assert!(matches!(err, FragmentError::SchemaUnavailable { .. }));

        let generator = CoalesceGenerator::with_reference_table(reference(&["minutes"]), "gone");
        let err = generator.generate(&["a b"]).await.unwrap_err();
        assert!(matches!(
            err,
            FragmentError::SchemaUnavailable {
                source: IntrospectError::TableNotFound { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_schema_read_happens_even_for_invalid_table() {
        let introspector = CountingIntrospector {
            columns: vec!["minutes".into()],
            calls: AtomicUsize::new(0),
        };
        let err = generate_coalesce_columns(&introspector, &["a;b"])
            .await
            .unwrap_err();
        assert!(matches!(err, FragmentError::InvalidIdentifier { .. }));
        assert_eq!(introspector.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_quoted_names_pass_through() {
        let introspector = reference(&["player_", "minutes", "\"Pass Cmp\""]);
        let out = generate_coalesce_columns(&introspector, &["\"Player Stats\"", "misc"])
            .await
            .unwrap();
        assert_eq!(
            out,
            "COALESCE(\"Player Stats\".minutes, misc.minutes) AS minutes,\n\
             COALESCE(\"Player Stats\".\"Pass Cmp\", misc.\"Pass Cmp\") AS \"Pass Cmp\""
        );
    }

    #[tokio::test]
    async fn test_tables_used_verbatim() {
        let out = generate_coalesce_columns(reference(&["minutes"]), &["Stats.Summary"])
            .await
            .unwrap();
        assert_eq!(out, "COALESCE(Stats.Summary.minutes) AS minutes");
    }

    #[tokio::test]
    async fn test_fragment_embeds_in_select() {
        let out = generate_coalesce_columns(
            reference(&["player_", "minutes", "tackles_tkl", "int_"]),
            &["summary", "defense", "misc"],
        )
        .await
        .unwrap();
        let sql = format!(
            "SELECT summary.player_, {out} FROM summary \
             FULL JOIN defense USING (player_) FULL JOIN misc USING (player_)"
        );
        assert!(Parser::parse_sql(&PostgreSqlDialect {}, &sql).is_ok());
    }

    #[tokio::test]
    async fn test_from_config_uses_reference_table() {
        let config = GeneratorConfig {
            reference_table: "merged".to_string(),
            ..GeneratorConfig::default()
        };
        let introspector = StaticIntrospector::new().with_table("merged", ["xg"]);
        let generator = CoalesceGenerator::from_config(introspector, &config);
        assert_eq!(generator.reference_table(), "merged");
        assert_eq!(
            generator.generate(&["a", "b"]).await.unwrap(),
            "COALESCE(a.xg, b.xg) AS xg"
        );
    }
}
