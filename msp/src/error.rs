use thiserror::Error;

#[derive(Debug, Error)]
pub enum MspError {
    #[error("failed to decode serialized identity")]
    BadIdentity(#[source] bincode::Error),

    #[error("identity carries an invalid public key")]
    BadPublicKey,

    #[error("identity is not rooted in this MSP")]
    UntrustedIdentity,

    #[error("no MSP registered under ID '{0}'")]
    UnknownMsp(String),

    #[error("signature verification failed")]
    InvalidSignature,

    #[error("failed to load MSP material from {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("key file {0} is not valid hex-encoded key material")]
    BadKeyFile(String),
}
