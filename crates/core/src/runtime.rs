//! Movie runtime in minutes.
//!
//! On the wire a runtime is the string `"<N> mins"`, never a bare number.
//! Arithmetic and comparisons always go through [`Runtime::minutes`].

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const UNIT: &str = "mins";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Runtime(pub i32);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeParseError {
    #[error("invalid runtime format")]
    InvalidFormat,
}

impl Runtime {
    pub const fn minutes(self) -> i32 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Render the runtime the way clients see it, e.g. `"97 mins"`.
    pub fn to_wire_string(self) -> String {
        format!("{} {UNIT}", self.0)
    }
}

impl From<i32> for Runtime {
    fn from(minutes: i32) -> Self {
        Self(minutes)
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {UNIT}", self.0)
    }
}

impl FromStr for Runtime {
    type Err = RuntimeParseError;

    /// Accepts exactly `"<integer> mins"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (number, unit) = s.split_once(' ').ok_or(RuntimeParseError::InvalidFormat)?;
        if unit != UNIT {
            return Err(RuntimeParseError::InvalidFormat);
        }
        number
            .parse::<i32>()
            .map(Self)
            .map_err(|_| RuntimeParseError::InvalidFormat)
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire_string())
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RuntimeVisitor;

        impl Visitor<'_> for RuntimeVisitor {
            type Value = Runtime;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string of the form \"<N> mins\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Runtime, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(RuntimeVisitor)
    }
}
