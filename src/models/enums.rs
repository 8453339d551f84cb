use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A categorical value that is not part of a closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field} value: {value:?}")]
pub struct UnknownCategory {
    pub field: String,
    pub value: String,
}

/// Macro to generate a closed categorical enum with as_str + std::str::FromStr.
///
/// Each variant has exactly one spelling. Serde goes through the same
/// string mapping.
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
            type Err = UnknownCategory;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(UnknownCategory {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(Domain {
    Diabetes => "diabetes",
    Heart => "heart",
});

// Sex as spelled on the diabetes wire format.
str_enum!(Sex {
    Male => "Male",
    Female => "Female",
});

// Sex as spelled on the heart wire format, matching the `Sex_F`/`Sex_M`
// one-hot columns.
str_enum!(HeartSex {
    Male => "M",
    Female => "F",
});

str_enum!(ChestPainType {
    Asy => "ASY",
    Ata => "ATA",
    Nap => "NAP",
    Ta => "TA",
});

str_enum!(ExerciseAngina {
    No => "N",
    Yes => "Y",
});

str_enum!(StSlope {
    Down => "Down",
    Flat => "Flat",
    Up => "Up",
});
