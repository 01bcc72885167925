//! Extraction of the inner update envelope from configuration messages.
//!
//! The engine orders the configuration *update*, not the materialized
//! config. A config message arrives either as a direct `Config` envelope
//! or wrapped in an `OrdererTransaction` (system-channel form); in both
//! cases the `last_update` envelope inside the config envelope is what
//! gets forwarded.

use pontoon_types::{ChannelHeader, ConfigEnvelope, Envelope, HeaderType, Payload};

use crate::error::BridgeError;

/// Pull the `last_update` envelope out of a configuration message.
///
/// Fails with a descriptive error on a missing header, missing channel
/// header, any decode failure, or an unexpected envelope type. There is
/// no fallback: a config message that cannot be interpreted is not
/// forwarded.
pub fn extract_last_update(envelope: &Envelope) -> Result<Envelope, BridgeError> {
    let payload = Payload::from_bytes(&envelope.payload)?;
    let header = payload.header.as_ref().ok_or(BridgeError::MissingHeader)?;
    if header.channel_header.is_empty() {
        return Err(BridgeError::MissingChannelHeader);
    }
    let channel_header = ChannelHeader::from_bytes(&header.channel_header)?;

    match channel_header.header_type {
        HeaderType::Config => last_update_of(&payload.data),
        HeaderType::OrdererTransaction => {
            let inner = Envelope::from_bytes(&payload.data)?;
            let inner_payload = Payload::from_bytes(&inner.payload)?;
            let inner_header = inner_payload
                .header
                .as_ref()
                .ok_or(BridgeError::MissingHeader)?;
            let inner_channel_header = ChannelHeader::from_bytes(&inner_header.channel_header)?;
            if inner_channel_header.header_type != HeaderType::Config {
                return Err(BridgeError::UnexpectedEnvelopeType(
                    inner_channel_header.header_type,
                ));
            }
            last_update_of(&inner_payload.data)
        }
        other => Err(BridgeError::UnexpectedEnvelopeType(other)),
    }
}

fn last_update_of(data: &[u8]) -> Result<Envelope, BridgeError> {
    let config_envelope = ConfigEnvelope::from_bytes(data)?;
    config_envelope
        .last_update
        .ok_or(BridgeError::MissingLastUpdate)
}
