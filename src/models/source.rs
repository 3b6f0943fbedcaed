use serde::{Deserialize, Serialize};

/// A record origin as stored in the `sources` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub confidence: i64,
}

/// Provenance carried by a prescription record.
///
/// `kind` keeps the raw upstream string for display; scoring goes through
/// [`SourceKind::classify`]. `confidence` is already defaulted to 0 when the
/// upstream value was absent or non-numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceProvenance {
    #[serde(rename = "type")]
    pub kind: String,
    pub label: String,
    pub confidence: f64,
}

impl SourceProvenance {
    pub fn kind(&self) -> SourceKind {
        SourceKind::classify(&self.kind)
    }
}

impl From<&Source> for SourceProvenance {
    fn from(source: &Source) -> Self {
        Self {
            kind: source.kind.clone(),
            label: source.label.clone(),
            confidence: source.confidence as f64,
        }
    }
}

/// Recognized origin categories, ranked by trust.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Ehr,
    Manual,
    Other,
    Unrecognized,
}

impl SourceKind {
    /// Case-insensitive classification; anything else is `Unrecognized`.
    pub fn classify(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "ehr" => Self::Ehr,
            "manual" => Self::Manual,
            "other" => Self::Other,
            _ => Self::Unrecognized,
        }
    }

    pub fn weight(self) -> u8 {
        match self {
            Self::Ehr => 3,
            Self::Manual => 2,
            Self::Other => 1,
            Self::Unrecognized => 0,
        }
    }
}
