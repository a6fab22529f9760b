use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The database string doubles as the serde wire name.
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

str_enum!(Role {
    Patient => "Patient",
    Doctor => "Doctor",
});

str_enum!(Zone {
    Unknown => "Unknown",
    Green => "Green",
    Yellow => "Yellow",
    Red => "Red",
});

str_enum!(Trend {
    Improving => "improving",
    Stable => "stable",
    Worsening => "worsening",
});

str_enum!(ReadingSource {
    Manual => "manual",
    Device => "device",
});

str_enum!(MedicationSource {
    Patient => "patient",
    Doctor => "doctor",
});

str_enum!(TakenStatus {
    Taken => "taken",
    NotTaken => "not_taken",
    Skipped => "skipped",
});

str_enum!(AlertType {
    RedZone => "red_zone",
});

impl Default for ReadingSource {
    fn default() -> Self {
        Self::Manual
    }
}
