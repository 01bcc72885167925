//! Delivery client for the pontoon ordering service.
//!
//! Connects to the ordering service's delivery endpoint, issues one seek
//! request, and reads blocks until the stream closes. When verification
//! is enabled, each block's ordering-node signatures are checked against
//! the BFT quorum rule.

pub mod config;
pub mod deliver;
pub mod error;
pub mod verify;

pub use config::ClientConfig;
pub use deliver::DeliverClient;
pub use error::ClientError;
pub use verify::{validate_signatures, BlockVerifier, QuorumParams, Verdict, VerificationOutcome};
