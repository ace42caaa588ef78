//! Error taxonomy for the tree visual.
//!
//! Only structural problems with the input table are errors. An undrawable
//! canvas or a click on a stale node are treated as no-ops by the engine and
//! never surface here.

use thiserror::Error;

/// The edge table does not describe a single rooted tree.
///
/// Any of these aborts the current update before layout runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// The host's parallel columns have different lengths.
    #[error("column lengths differ: {parents} parents, {children} children, {values} values")]
    ColumnLengthMismatch {
        parents: usize,
        children: usize,
        values: usize,
    },

    /// A row has no child identifier.
    #[error("row {row} has an empty child identifier")]
    EmptyIdentifier { row: usize },

    /// The same child identifier is defined by more than one row.
    #[error("duplicate node: {id}")]
    DuplicateNode { id: String },

    /// More than one row has no parent.
    #[error("multiple roots: {first} and {second}")]
    MultipleRoots { first: String, second: String },

    /// Every row has a parent, so there is nowhere to start.
    #[error("no root")]
    NoRoot,

    /// A parent identifier names no row.
    #[error("missing parent {parent} for node {child}")]
    MissingParent { child: String, parent: String },

    /// A parent chain loops back on itself before reaching the root.
    #[error("cyclic parentage through node {id}")]
    Cycle { id: String },
}

/// A configuration value the layout cannot work with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Spacing and separation must be finite and positive, or nodes collapse
    /// onto each other.
    #[error("{field} must be a positive number, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    /// Radius and margins must be finite and not negative.
    #[error("{field} must be a non-negative number, got {value}")]
    Negative { field: &'static str, value: f32 },
}
