use std::fmt;

use serde::Serialize;

/// What a run does with one record. There is no delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
    Create,
    Update,
    Skip,
}

impl DiffKind {
    pub fn is_write(&self) -> bool {
        !matches!(self, DiffKind::Skip)
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffKind::Create => write!(f, "+"),
            DiffKind::Update => write!(f, "~"),
            DiffKind::Skip => write!(f, "="),
        }
    }
}
