//! Edge records and the host's column input.
//!
//! The host delivers three parallel columns (parent, child, value). Each row
//! becomes one [`EdgeRecord`]; the child identifier defines a node and the
//! parent identifier attaches it to another row's node.

use serde::{Deserialize, Serialize};

use crate::error::StructuralError;

/// One row of the edge table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Parent identifier. `None` (or empty) only for the root row.
    pub parent: Option<String>,
    /// Identifier of the node this row defines.
    pub child: String,
    /// Numeric value carried by the node.
    pub value: f64,
}

impl EdgeRecord {
    pub fn new(parent: Option<&str>, child: &str, value: f64) -> Self {
        Self {
            parent: parent.map(str::to_owned),
            child: child.to_owned(),
            value,
        }
    }

    /// The parent identifier, treating an empty string as absent.
    #[inline]
    pub fn parent_identifier(&self) -> Option<&str> {
        self.parent.as_deref().filter(|p| !p.is_empty())
    }
}

/// The host's categorical columns, zipped row-wise into records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Columns {
    pub parents: Vec<Option<String>>,
    pub children: Vec<String>,
    pub values: Vec<f64>,
}

impl Columns {
    /// Zip the columns into records.
    ///
    /// Fails when the columns do not all have the same length.
    pub fn into_records(self) -> Result<Vec<EdgeRecord>, StructuralError> {
        let (parents, children, values) = (
            self.parents.len(),
            self.children.len(),
            self.values.len(),
        );
        if parents != children || children != values {
            return Err(StructuralError::ColumnLengthMismatch {
                parents,
                children,
                values,
            });
        }

        Ok(self
            .parents
            .into_iter()
            .zip(self.children)
            .zip(self.values)
            .map(|((parent, child), value)| EdgeRecord {
                parent,
                child,
                value,
            })
            .collect())
    }
}

impl From<&[EdgeRecord]> for Columns {
    fn from(records: &[EdgeRecord]) -> Self {
        Self {
            parents: records.iter().map(|r| r.parent.clone()).collect(),
            children: records.iter().map(|r| r.child.clone()).collect(),
            values: records.iter().map(|r| r.value).collect(),
        }
    }
}
