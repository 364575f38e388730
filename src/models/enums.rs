use crate::db::DatabaseError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
///
/// Values serialize as their string code so rows and payloads carry the
/// same representation as the database columns.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
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

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }

        impl rusqlite::types::FromSql for $name {
            fn column_result(value: rusqlite::types::ValueRef<'_>) -> rusqlite::types::FromSqlResult<Self> {
                let s = value.as_str()?;
                s.parse()
                    .map_err(|e: DatabaseError| rusqlite::types::FromSqlError::Other(Box::new(e)))
            }
        }

        impl rusqlite::types::ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
                Ok(rusqlite::types::ToSqlOutput::from(self.as_str()))
            }
        }
    };
}

// Stored codes

str_enum!(Gender {
    Male => "M",
    Female => "F",
    Other => "O",
});

str_enum!(RangeGender {
    Male => "M",
    Female => "F",
    Any => "ANY",
});

str_enum!(Priority {
    Normal => "NORMAL",
    Urgent => "URGENT",
});

str_enum!(OrderStatus {
    Pending => "PENDING",
    SampleCollected => "SAMPLE_COLLECTED",
    ResultsEntered => "RESULTS_ENTERED",
    ReportReady => "REPORT_READY",
});

str_enum!(ResultFlag {
    Low => "LOW",
    Normal => "NORMAL",
    High => "HIGH",
});

// Client-facing codes

str_enum!(DisplayPriority {
    Normal => "normal",
    Urgent => "urgent",
});

str_enum!(DisplayStatus {
    Pending => "pending",
    InProgress => "in-progress",
    Completed => "completed",
});

// Activity feed

str_enum!(ActivityAction {
    CreatePatient => "CREATE_PATIENT",
    UpdatePatient => "UPDATE_PATIENT",
    DeletePatient => "DELETE_PATIENT",
    CreateDoctor => "CREATE_DOCTOR",
    CreateTest => "CREATE_TEST",
    CreateOrder => "CREATE_ORDER",
    UpdateOrder => "UPDATE_ORDER",
    UpdateResults => "UPDATE_RESULTS",
    UpdateSettings => "UPDATE_SETTINGS",
});

str_enum!(EntityType {
    Patient => "PATIENT",
    Doctor => "DOCTOR",
    Test => "TEST",
    Order => "ORDER",
    Settings => "SETTINGS",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn order_status_codes() {
        for (variant, s) in [
            (OrderStatus::Pending, "PENDING"),
            (OrderStatus::SampleCollected, "SAMPLE_COLLECTED"),
            (OrderStatus::ResultsEntered, "RESULTS_ENTERED"),
            (OrderStatus::ReportReady, "REPORT_READY"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(OrderStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn display_status_uses_hyphenated_code() {
        assert_eq!(DisplayStatus::InProgress.as_str(), "in-progress");
        let json = serde_json::to_string(&DisplayStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn invalid_enum_rejected() {
        let err = Gender::from_str("X").unwrap_err();
        match err {
            DatabaseError::InvalidEnum { field, value } => {
                assert_eq!(field, "Gender");
                assert_eq!(value, "X");
            }
            other => panic!("Expected InvalidEnum, got: {other}"),
        }
    }

    #[test]
    fn deserialize_rejects_unknown_code() {
        let result: Result<DisplayPriority, _> = serde_json::from_str("\"asap\"");
        assert!(result.is_err());
    }

    #[test]
    fn gender_serializes_as_code() {
        let json = serde_json::to_value(Some(Gender::Female)).unwrap();
        assert_eq!(json, serde_json::json!("F"));
    }
}
