//! Position column catalog.
//!
//! Maps each playing position to the statistics that matter for judging a
//! player in that role. List order is display/analysis priority and is kept
//! as-is in every generated fragment. Every list ends with `minutes` so rates
//! can be normalised downstream.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::fragment;

const GOALKEEPER: &[&str] = &[
    "shot_stopping_saves",
    "shot_stopping_sota",
    "shot_stopping_psxg",
    "shot_stopping_ga",
    "crosses_stp",
    "crosses_opp",
    "sweeper_#opa",
    "sweeper_avgdist",
    "total_cmp%",
    "goal_kicks_launch%",
    "minutes",
];

const CENTERBACK: &[&str] = &[
    "aerial_duels_won%",
    "clr_",
    "int_",
    "blocks_blocks",
    "tackles_tkl",
    "tackles_tklw",
    "minutes",
];

const FULLBACK: &[&str] = &[
    "tackles_tkl",
    "tackles_tklw",
    "int_",
    "blocks_blocks",
    "carries_prgc",
    "passes_prgp",
    "crspa",
    "kp",
    "minutes",
];

const MIDFIELDER: &[&str] = &[
    "total_cmp%",
    "passes_prgp",
    "kp",
    "ppa",
    "sca_sca",
    "gca_gca",
    "tackles_tkl",
    "int_",
    "carries_prgc",
    "minutes",
];

const WINGER: &[&str] = &[
    "performance_gls",
    "performance_ast",
    "expected_xg",
    "expected_xag",
    "sca_sca",
    "take_ons_succ",
    "carries_prgc",
    "crspa",
    "minutes",
];

const STRIKER: &[&str] = &[
    "performance_gls",
    "performance_sh",
    "performance_sot",
    "expected_xg",
    "expected_npxg",
    "aerial_duels_won%",
    "touches_att_pen",
    "minutes",
];

/// The closed set of positions the catalog knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Position {
    Goalkeeper,
    Centerback,
    Fullback,
    Midfielder,
    Winger,
    Striker,
}

impl Position {
    pub const ALL: [Position; 6] = [
        Position::Goalkeeper,
        Position::Centerback,
        Position::Fullback,
        Position::Midfielder,
        Position::Winger,
        Position::Striker,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "Goalkeeper",
            Position::Centerback => "Centerback",
            Position::Fullback => "Fullback",
            Position::Midfielder => "Midfielder",
            Position::Winger => "Winger",
            Position::Striker => "Striker",
        }
    }

    /// Exact, case-sensitive label match.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Position::Goalkeeper => GOALKEEPER,
            Position::Centerback => CENTERBACK,
            Position::Fullback => FULLBACK,
            Position::Midfielder => MIDFIELDER,
            Position::Winger => WINGER,
            Position::Striker => STRIKER,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPosition(pub String);

impl fmt::Display for UnknownPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown position {:?}", self.0)
    }
}

impl std::error::Error for UnknownPosition {}

impl FromStr for Position {
    type Err = UnknownPosition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| UnknownPosition(s.to_string()))
    }
}

/// Catalog columns for `label`. An unrecognised label is not an error: it
/// simply has no columns.
pub fn get_columns_for_position(label: &str) -> &'static [&'static str] {
    match Position::from_label(label) {
        Some(position) => position.columns(),
        None => &[],
    }
}

/// Columns for `label` joined with `", "`, ready to drop into a `SELECT`.
pub fn generate_position_select(label: &str) -> String {
    fragment::flat_list(get_columns_for_position(label))
}

/// Serializable view of one catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub position: Position,
    pub columns: &'static [&'static str],
}

pub fn catalog() -> Vec<CatalogEntry> {
    Position::ALL
        .into_iter()
        .map(|position| CatalogEntry {
            position,
            columns: position.columns(),
        })
        .collect()
}
