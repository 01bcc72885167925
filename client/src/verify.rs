//! BFT verification of ordering-node block signatures.
//!
//! A block produced by `N` ordering nodes tolerating `F` Byzantine
//! faults should carry more than `Q = (N + F) / 2` valid signatures.
//! Verification recomputes the signed bytes for every signature —
//! `metadata.value ∥ signature_header ∥ block header bytes`, the exact
//! construction the ordering nodes sign — resolves each signer through
//! the MSP, and classifies the count of valid signatures.

use pontoon_msp::{IdentityDeserializer, MspManager};
use pontoon_types::{Block, BlockMetadataIndex, Metadata, SignatureHeader};
use pontoon_utils::concat_bytes;

/// The `(N, F)` quorum parameters.
#[derive(Clone, Copy, Debug)]
pub struct QuorumParams {
    /// Total ordering nodes in the system.
    pub nodes: i64,
    /// Byzantine ordering nodes tolerated.
    pub faults: i64,
}

impl QuorumParams {
    pub fn new(nodes: i64, faults: i64) -> Self {
        Self { nodes, faults }
    }

    /// The quorum threshold `(N + F) / 2`, as a real number.
    pub fn quorum(&self) -> f64 {
        (self.nodes + self.faults) as f64 / 2.0
    }
}

/// How a block's signature count measures against the quorum rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Strictly more than `Q` valid signatures.
    Quorate,
    /// Not quorate, but strictly more than `F` — acceptable with a
    /// warning.
    Weak,
    /// `F` or fewer valid signatures.
    Insufficient,
    /// Block 0 requires no signature validation.
    Exempt,
}

/// Result of verifying one metadata entry against one block.
#[derive(Clone, Copy, Debug)]
pub struct VerificationOutcome {
    /// Signatures that verified.
    pub valid: i64,
    /// Signatures present on the metadata entry.
    pub total: usize,
    pub verdict: Verdict,
}

/// Classify a valid-signature count against the quorum rule.
pub fn classify(valid: i64, params: &QuorumParams) -> Verdict {
    if valid as f64 > params.quorum() {
        Verdict::Quorate
    } else if valid > params.faults {
        Verdict::Weak
    } else {
        Verdict::Insufficient
    }
}

/// Verify every signature on a metadata entry and classify the count.
///
/// Per-signature failures — a malformed header, an identity the MSP
/// rejects, a signature that does not verify — are logged and skipped;
/// they neither count nor abort the remaining checks.
pub fn validate_signatures(
    metadata: &Metadata,
    block: &Block,
    msp: &MspManager,
    params: &QuorumParams,
) -> VerificationOutcome {
    let total = metadata.signatures.len();
    if block.header.number == 0 {
        return VerificationOutcome {
            valid: 0,
            total,
            verdict: Verdict::Exempt,
        };
    }

    let mut valid = 0i64;
    match msp.deserializer("") {
        Ok(deserializer) => {
            let header_bytes = block.header.to_bytes();
            for (index, sig) in metadata.signatures.iter().enumerate() {
                let signed =
                    concat_bytes(&[&metadata.value, &sig.signature_header, &header_bytes]);

                let sig_header = match SignatureHeader::from_bytes(&sig.signature_header) {
                    Ok(h) => h,
                    Err(e) => {
                        tracing::warn!(index, error = %e, "malformed signature header, skipping");
                        continue;
                    }
                };
                let identity = match deserializer.deserialize_identity(&sig_header.creator) {
                    Ok(identity) => identity,
                    Err(e) => {
                        tracing::warn!(index, error = %e, "could not deserialize signer identity, skipping");
                        continue;
                    }
                };
                tracing::debug!(
                    index,
                    msp = identity.msp_identifier(),
                    "verifying block signature"
                );
                if let Err(e) = identity.verify(&signed, &sig.signature) {
                    tracing::warn!(index, error = %e, "signature verification failed, skipping");
                    continue;
                }
                valid += 1;
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "no default MSP available, counting no signatures");
        }
    }

    VerificationOutcome {
        valid,
        total,
        verdict: classify(valid, params),
    }
}

/// Per-block verification driver used by the delivery loop: checks both
/// the block-signature and last-config metadata entries.
pub struct BlockVerifier {
    msp: MspManager,
    params: QuorumParams,
}

impl BlockVerifier {
    pub fn new(msp: MspManager, params: QuorumParams) -> Self {
        Self { msp, params }
    }

    /// Verify a block's signature sets and print the verdicts.
    pub fn verify_block(&self, block: &Block) {
        let number = block.header.number;
        for (label, index) in [
            ("block", BlockMetadataIndex::Signatures),
            ("last-config", BlockMetadataIndex::LastConfig),
        ] {
            let metadata = block
                .metadata_at(index)
                .and_then(|bytes| Metadata::from_bytes(bytes).ok())
                .unwrap_or_default();
            println!(
                "Block #{number} carries {} {label} signatures",
                metadata.signatures.len()
            );
            let outcome = validate_signatures(&metadata, block, &self.msp, &self.params);
            report(number, &outcome);
        }
    }
}

/// Print the verdict for one verified metadata entry.
pub fn report(number: u64, outcome: &VerificationOutcome) {
    match outcome.verdict {
        Verdict::Quorate => println!(
            "Block #{number} carries a quorum of valid signatures ({}/{})",
            outcome.valid, outcome.total
        ),
        Verdict::Weak => println!(
            "Block #{number} carries enough valid signatures ({}/{})",
            outcome.valid, outcome.total
        ),
        Verdict::Insufficient => println!(
            "Block #{number} does NOT carry enough valid signatures ({}/{})",
            outcome.valid, outcome.total
        ),
        Verdict::Exempt => println!("Block #0 requires no signature validation"),
    }
}
