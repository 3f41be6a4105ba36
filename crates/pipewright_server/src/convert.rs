//! Conversions between wire messages and the core data model.
//!
//! Decoding is strict: unset oneofs and UNSPECIFIED enum values are
//! rejected with a [`DecodeError`] instead of being coerced to a default
//! case, so a malformed request fails the call that carried it rather
//! than silently loading a wrong stage.

use pipewright_core::{Argument, ChannelMessage, Direction, ProcessorSpec, StageSpec};

use crate::proto;

/// A wire message that does not decode into the core data model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The stage descriptor has no processor.
    #[error("stage `{uri}` is missing its processor descriptor")]
    MissingProcessor {
        /// URI of the offending stage.
        uri: String,
    },
    /// An argument carries no kind.
    #[error("argument `{key}` has no kind set")]
    EmptyArgument {
        /// Name of the offending argument.
        key: String,
    },
    /// A literal argument carries no value.
    #[error("literal argument `{key}` has no value set")]
    EmptyLiteral {
        /// Name of the offending argument.
        key: String,
    },
    /// A channel reference has no usable direction.
    #[error("channel argument `{key}` has unspecified direction")]
    UnspecifiedDirection {
        /// Name of the offending argument.
        key: String,
    },
    /// A timestamp literal is outside the representable range.
    #[error("timestamp argument `{key}` is out of range: {millis}ms")]
    TimestampOutOfRange {
        /// Name of the offending argument.
        key: String,
        /// The raw epoch-milliseconds value.
        millis: i64,
    },
    /// A channel message has no usable kind.
    #[error("channel message for `{uri}` has unspecified kind")]
    UnspecifiedMessageKind {
        /// URI of the offending channel.
        uri: String,
    },
}

/// Decode a stage descriptor.
pub fn stage_from_proto(stage: proto::Stage) -> Result<StageSpec, DecodeError> {
    let processor = stage
        .processor
        .ok_or_else(|| DecodeError::MissingProcessor {
            uri: stage.uri.clone(),
        })?;

    let mut spec = ProcessorSpec::new(processor.uri, processor.entrypoint);
    for (key, value) in processor.metadata {
        spec = spec.with_metadata(key, value);
    }

    let mut decoded = StageSpec::new(stage.uri, spec);
    for (key, argument) in stage.arguments {
        let argument = argument_from_proto(&key, argument)?;
        decoded = decoded.with_argument(key, argument);
    }
    Ok(decoded)
}

fn argument_from_proto(key: &str, argument: proto::Argument) -> Result<Argument, DecodeError> {
    let kind = argument.kind.ok_or_else(|| DecodeError::EmptyArgument {
        key: key.to_string(),
    })?;

    match kind {
        proto::argument::Kind::Literal(literal) => literal_from_proto(key, literal),
        proto::argument::Kind::Channel(channel) => {
            let direction = match proto::Direction::try_from(channel.direction) {
                Ok(proto::Direction::Reader) => Direction::Reader,
                Ok(proto::Direction::Writer) => Direction::Writer,
                _ => {
                    return Err(DecodeError::UnspecifiedDirection {
                        key: key.to_string(),
                    });
                }
            };
            Ok(match direction {
                Direction::Reader => Argument::reader(channel.uri),
                Direction::Writer => Argument::writer(channel.uri),
            })
        }
    }
}

fn literal_from_proto(key: &str, literal: proto::Literal) -> Result<Argument, DecodeError> {
    let value = literal.value.ok_or_else(|| DecodeError::EmptyLiteral {
        key: key.to_string(),
    })?;

    Ok(match value {
        proto::literal::Value::Int(value) => Argument::int(value),
        proto::literal::Value::Double(value) => Argument::double(value),
        proto::literal::Value::String(value) => Argument::string(value),
        proto::literal::Value::TimestampMs(millis) => {
            let date = chrono::DateTime::from_timestamp_millis(millis).ok_or(
                DecodeError::TimestampOutOfRange {
                    key: key.to_string(),
                    millis,
                },
            )?;
            Argument::date(date)
        }
    })
}

/// Decode a channel message off the inbound stream.
pub fn message_from_proto(message: proto::ChannelMessage) -> Result<ChannelMessage, DecodeError> {
    match proto::MessageType::try_from(message.kind) {
        Ok(proto::MessageType::Data) => {
            Ok(ChannelMessage::data(message.channel_uri, message.payload))
        }
        Ok(proto::MessageType::Close) => Ok(ChannelMessage::close(message.channel_uri)),
        _ => Err(DecodeError::UnspecifiedMessageKind {
            uri: message.channel_uri,
        }),
    }
}

/// Encode a channel message for the outbound stream.
#[must_use]
pub fn message_to_proto(message: ChannelMessage) -> proto::ChannelMessage {
    match message.kind {
        pipewright_core::MessageKind::Data(payload) => proto::ChannelMessage {
            channel_uri: message.channel.as_str().to_string(),
            kind: proto::MessageType::Data as i32,
            payload,
        },
        pipewright_core::MessageKind::Close => proto::ChannelMessage {
            channel_uri: message.channel.as_str().to_string(),
            kind: proto::MessageType::Close as i32,
            payload: bytes::Bytes::new(),
        },
    }
}
