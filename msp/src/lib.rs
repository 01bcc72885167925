//! Membership service for the pontoon workspace.
//!
//! Supplies the two interfaces the delivery client verifies blocks
//! through — [`IdentityDeserializer`] and [`Identity`] — together with a
//! local Ed25519 implementation and the [`MspManager`] registry that
//! resolves an MSP identifier to its deserializer (the empty identifier
//! selects the local MSP).

pub mod error;
pub mod identity;
pub mod local;
pub mod manager;
pub mod signer;

pub use error::MspError;
pub use identity::{Identity, IdentityDeserializer, SerializedIdentity};
pub use local::LocalMsp;
pub use manager::MspManager;
pub use signer::LocalSigner;
