//! SQL fragment generators for a player-statistics pipeline.
//!
//! Two independent generators produce select-list text for a downstream
//! query builder:
//!
//! - [`coalesce`] merges the same statistics from several source tables,
//!   taking the first non-null value per column.
//! - [`position`] picks the statistics relevant to a playing position.
pub mod coalesce;
pub mod config;
pub mod db;
pub mod error;
pub mod fragment;
pub mod introspect;
pub mod position;

pub use coalesce::{generate_coalesce_columns, CoalesceGenerator, EXCLUDED_COLUMNS};
pub use config::GeneratorConfig;
pub use error::{FragmentError, IntrospectError};
pub use introspect::{ColumnRecord, SchemaIntrospector, StaticIntrospector};
pub use position::{generate_position_select, get_columns_for_position, Position};
