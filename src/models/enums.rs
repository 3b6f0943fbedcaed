use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(PrescriptionStatus {
    Active => "active",
    Stopped => "stopped",
    Unknown => "unknown",
});

str_enum!(FacilityType {
    Hospital => "hospital",
    Clinic => "clinic",
    Pharmacy => "pharmacy",
    Other => "other",
});

impl PrescriptionStatus {
    /// Lenient parse for external data: anything unrecognized becomes `Unknown`.
    pub fn parse_lenient(s: &str) -> Self {
        s.trim()
            .to_lowercase()
            .parse()
            .unwrap_or(Self::Unknown)
    }
}

impl Default for PrescriptionStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl Default for FacilityType {
    fn default() -> Self {
        Self::Hospital
    }
}
