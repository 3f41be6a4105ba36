//! The argument model for processor construction.
//!
//! An argument is either a literal value or a reference to a channel with a
//! direction tag. Literal kinds are discriminated by the enum variant itself,
//! never by a zero-value sentinel; integer widths collapse to `i64` and
//! floating widths to `f64`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::uri::ChannelUri;

/// A literal argument value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Any integer width
    Int(i64),
    /// Any floating-point width
    Double(f64),
    /// A string value
    String(String),
    /// A timestamp value
    Date(DateTime<Utc>),
}

impl Literal {
    /// Human-readable name of the literal kind, used in mismatch reports
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Date(_) => "date",
        }
    }
}

/// Whether a channel reference grants read or write capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Consume payloads delivered for the URI
    Reader,
    /// Produce payloads bound for the URI
    Writer,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reader => write!(f, "reader"),
            Self::Writer => write!(f, "writer"),
        }
    }
}

/// A tagged argument value, immutable once resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Argument {
    /// A literal value
    Literal(Literal),
    /// A reference to a channel by URI
    Channel {
        /// The referenced channel
        uri: ChannelUri,
        /// Which capability the reference grants
        direction: Direction,
    },
}

impl Argument {
    /// Shorthand for an integer literal argument
    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::Literal(Literal::Int(value))
    }

    /// Shorthand for a floating-point literal argument
    #[must_use]
    pub fn double(value: f64) -> Self {
        Self::Literal(Literal::Double(value))
    }

    /// Shorthand for a string literal argument
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(Literal::String(value.into()))
    }

    /// Shorthand for a timestamp literal argument
    #[must_use]
    pub fn date(value: DateTime<Utc>) -> Self {
        Self::Literal(Literal::Date(value))
    }

    /// Shorthand for a reader channel reference
    #[must_use]
    pub fn reader(uri: impl Into<ChannelUri>) -> Self {
        Self::Channel {
            uri: uri.into(),
            direction: Direction::Reader,
        }
    }

    /// Shorthand for a writer channel reference
    #[must_use]
    pub fn writer(uri: impl Into<ChannelUri>) -> Self {
        Self::Channel {
            uri: uri.into(),
            direction: Direction::Writer,
        }
    }

    /// Human-readable name of the argument kind, used in mismatch reports
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Literal(literal) => literal.kind(),
            Self::Channel {
                direction: Direction::Reader,
                ..
            } => "reader",
            Self::Channel {
                direction: Direction::Writer,
                ..
            } => "writer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_kind() {
        assert_eq!(Literal::Int(0).kind(), "int");
        assert_eq!(Literal::Double(0.0).kind(), "double");
        assert_eq!(Literal::String(String::new()).kind(), "string");
        assert_eq!(Literal::Date(Utc::now()).kind(), "date");
    }

    #[test]
    fn test_zero_is_a_value_not_absence() {
        // A zero integer is a present literal, discriminated by its variant.
        let arg = Argument::int(0);
        assert_eq!(arg, Argument::Literal(Literal::Int(0)));
        assert_eq!(arg.kind(), "int");
    }

    #[test]
    fn test_channel_argument_kind() {
        assert_eq!(Argument::reader("in").kind(), "reader");
        assert_eq!(Argument::writer("out").kind(), "writer");
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Reader.to_string(), "reader");
        assert_eq!(Direction::Writer.to_string(), "writer");
    }

    #[test]
    fn test_argument_serde_roundtrip() {
        let arg = Argument::writer("urn:channel/out");
        let json = serde_json::to_string(&arg).unwrap();
        let back: Argument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, arg);
    }
}
