use alloy::{
    primitives::utils::UnitsError,
    signers::local::LocalSignerError,
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;

pub type Result<T = ()> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid transaction hash: {0}")]
    InvalidTxHash(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] UnitsError),
    #[error("unknown network: {0}")]
    UnknownNetwork(String),
    #[error("transaction not found on any configured network: {0}")]
    TransactionNotFound(String),
    #[error("transaction is not confirmed as successful: {0}")]
    TransactionUnconfirmed(String),
    #[error("transaction recipient is not the treasury: {0}")]
    WrongRecipient(String),
    #[error("boost sender does not match offering sender: {0}")]
    SenderMismatch(String),
    #[error("transaction already processed: {0}")]
    AlreadyProcessed(String),
    #[error("no reward-token transfer to the treasury in transaction: {0}")]
    MissingTokenTransfer(String),
    #[error("confirmation timed out for transaction: {0}")]
    ConfirmationTimeout(String),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("signer error: {0}")]
    Signer(#[from] LocalSignerError),
    #[error("rpc error: {0}")]
    Rpc(Box<RpcError<TransportErrorKind>>),
    #[error("store error: {0}")]
    Store(#[from] redis::RedisError),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<RpcError<TransportErrorKind>> for Error {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        Error::Rpc(Box::new(err))
    }
}

impl Error {
    /// Whether this error is the caller's fault (maps to HTTP 400). Anything
    /// else is an internal failure and must not leak details to the caller.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::InvalidTxHash(_)
                | Error::InvalidAddress(_)
                | Error::UnknownNetwork(_)
                | Error::TransactionNotFound(_)
                | Error::TransactionUnconfirmed(_)
                | Error::WrongRecipient(_)
                | Error::SenderMismatch(_)
                | Error::AlreadyProcessed(_)
        )
    }
}
