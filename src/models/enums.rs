use crate::db::DatabaseError;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern,
/// plus SQLite conversions and a default variant.
macro_rules! str_enum {
    ($name:ident default $default:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
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

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: DatabaseError| FromSqlError::Other(Box::new(e)))
            }
        }

        impl crate::db::ToColumn for $name {
            fn to_column(&self) -> rusqlite::types::Value {
                rusqlite::types::Value::Text(self.as_str().to_string())
            }
        }
    };
}

str_enum!(TriageStatus default Pending {
    Pending => "pending",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(PrescriptionStatus default Active {
    Active => "active",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(AppointmentStatus default Scheduled {
    Scheduled => "scheduled",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(AllergySeverity default Mild {
    Mild => "mild",
    Moderate => "moderate",
    Severe => "severe",
});

str_enum!(DisabilityKind default Disability {
    Disability => "disability",
    Impairment => "impairment",
    Allergy => "allergy",
});
