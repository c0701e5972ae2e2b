use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Identifies one dispatched intent for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OperationId(Uuid);

impl OperationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Fetch,
    Create,
    Update,
    Delete,
    Extract,
}

impl OperationKind {
    pub const ALL: [OperationKind; 5] = [
        OperationKind::Fetch,
        OperationKind::Create,
        OperationKind::Update,
        OperationKind::Delete,
        OperationKind::Extract,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Extract => "extract",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Fetch => 0,
            Self::Create => 1,
            Self::Update => 2,
            Self::Delete => 3,
            Self::Extract => 4,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lifecycle of a single operation: `Loading` until its gateway call resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "lowercase")]
pub enum OperationStatus {
    Loading,
    Succeeded,
    Failed(String),
}

impl OperationStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Aggregate view across operations, for a single loading/error indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_to_width() {
        assert_eq!(format!("{:<8}|", OperationKind::Fetch), "fetch   |");
        assert_eq!(format!("{:>9}|", Status::Failed), "   failed|");
    }
}
