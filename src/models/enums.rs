use serde::{Deserialize, Serialize};

use super::InvalidEnum;

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
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
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

// Wire values are the ones the clinic backend returns from `/login`.
str_enum!(Role {
    Patient => "user",
    Doctor => "doc",
});

str_enum!(Specialty {
    General => "general",
    Cardiologia => "cardiologia",
    Dermatologia => "dermatologia",
    Pediatria => "pediatria",
});

impl Specialty {
    pub const ALL: [Specialty; 4] = [
        Specialty::General,
        Specialty::Cardiologia,
        Specialty::Dermatologia,
        Specialty::Pediatria,
    ];

    /// Human-readable name shown to patients and stored on appointments.
    pub fn label(&self) -> &'static str {
        match self {
            Self::General => "Medicina General",
            Self::Cardiologia => "Cardiología",
            Self::Dermatologia => "Dermatología",
            Self::Pediatria => "Pediatría",
        }
    }
}

/// Appointment status.
///
/// `Active` is how the patient-facing listing names an appointment that is
/// still pending; it behaves like `Scheduled` for cancellation. Only
/// `Scheduled` can be completed by a doctor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[serde(rename = "SCHEDULED", alias = "PROGRAMADA", alias = "scheduled")]
    Scheduled,
    #[serde(rename = "ACTIVE", alias = "activa", alias = "active")]
    Active,
    #[serde(rename = "COMPLETED", alias = "COMPLETADA", alias = "completada", alias = "completed")]
    Completed,
    #[serde(rename = "CANCELLED", alias = "CANCELADA", alias = "cancelada", alias = "cancelled")]
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Active,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Active => "ACTIVE",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Still waiting to happen.
    pub fn is_open(&self) -> bool {
        match self {
            Self::Scheduled | Self::Active => true,
            Self::Completed | Self::Cancelled => false,
        }
    }

    /// No transition leaves this status.
    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = InvalidEnum;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" | "PROGRAMADA" | "scheduled" => Ok(Self::Scheduled),
            "ACTIVE" | "activa" | "active" => Ok(Self::Active),
            "COMPLETED" | "COMPLETADA" | "completada" | "completed" => Ok(Self::Completed),
            "CANCELLED" | "CANCELADA" | "cancelada" | "cancelled" => Ok(Self::Cancelled),
            _ => Err(InvalidEnum {
                field: "AppointmentStatus".into(),
                value: s.into(),
            }),
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_uses_backend_wire_values() {
        assert_eq!(Role::from_str("user").unwrap(), Role::Patient);
        assert_eq!(Role::from_str("doc").unwrap(), Role::Doctor);
        assert_eq!(serde_json::to_string(&Role::Doctor).unwrap(), "\"doc\"");
        let parsed: Role = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, Role::Patient);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = Role::from_str("admin").unwrap_err();
        assert_eq!(err.field, "Role");
        assert_eq!(err.value, "admin");
    }

    #[test]
    fn specialty_labels() {
        assert_eq!(Specialty::General.label(), "Medicina General");
        assert_eq!(Specialty::from_str("cardiologia").unwrap().label(), "Cardiología");
        assert!(Specialty::from_str("oftalmologia").is_err());
    }

    #[test]
    fn status_accepts_spanish_and_english_spellings() {
        for (raw, expected) in [
            ("PROGRAMADA", AppointmentStatus::Scheduled),
            ("activa", AppointmentStatus::Active),
            ("COMPLETADA", AppointmentStatus::Completed),
            ("completada", AppointmentStatus::Completed),
            ("CANCELADA", AppointmentStatus::Cancelled),
            ("cancelada", AppointmentStatus::Cancelled),
            ("SCHEDULED", AppointmentStatus::Scheduled),
        ] {
            assert_eq!(AppointmentStatus::from_str(raw).unwrap(), expected);
            let json = format!("\"{raw}\"");
            let parsed: AppointmentStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, expected);
        }
    }

    #[test]
    fn status_serializes_canonically() {
        assert_eq!(
            serde_json::to_string(&AppointmentStatus::Cancelled).unwrap(),
            "\"CANCELLED\""
        );
    }

    #[test]
    fn open_and_terminal_partition_statuses() {
        for status in AppointmentStatus::ALL {
            assert_ne!(status.is_open(), status.is_terminal());
        }
        assert!(AppointmentStatus::Active.is_open());
        assert!(AppointmentStatus::Completed.is_terminal());
    }
}
