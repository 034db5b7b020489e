use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Namespaces partitioning a case's data.
///
/// The four clinical spaces are the service modules; `Meta` holds payment
/// authorization state for a case, never clinical data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Space {
    #[serde(rename = "trauma")]
    Trauma,
    #[serde(rename = "preop")]
    Preop,
    #[serde(rename = "generales")]
    Generales,
    #[serde(rename = "ia")]
    Ia,
    #[serde(rename = "meta")]
    Meta,
}

impl Space {
    /// All spaces, in cleanup order.
    pub const TODOS: [Space; 5] = [
        Space::Trauma,
        Space::Preop,
        Space::Generales,
        Space::Ia,
        Space::Meta,
    ];

    /// The clinical modules a caller may request documents for.
    pub const MODULOS: [Space; 4] = [Space::Trauma, Space::Preop, Space::Generales, Space::Ia];

    pub fn as_str(&self) -> &'static str {
        match self {
            Space::Trauma => "trauma",
            Space::Preop => "preop",
            Space::Generales => "generales",
            Space::Ia => "ia",
            Space::Meta => "meta",
        }
    }

    /// Whether this space is one of the four clinical modules.
    pub fn es_modulo(&self) -> bool {
        !matches!(self, Space::Meta)
    }
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Space {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trauma" => Ok(Space::Trauma),
            "preop" => Ok(Space::Preop),
            "generales" => Ok(Space::Generales),
            "ia" => Ok(Space::Ia),
            "meta" => Ok(Space::Meta),
            _ => Err(CoreError::validation(format!("Unknown module: {s}"))),
        }
    }
}
