// ============================================================================
// STARTER-PAYMENTS - Error Types
// ============================================================================
// Every failure the client can report, local or remote. Messages never carry
// secret key material.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Structured rejection reason returned by Horizon (`extras.result_codes`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCodes {
    /// Transaction-level code, e.g. `tx_bad_seq`
    #[serde(default)]
    pub transaction: Option<String>,

    /// Per-operation codes, e.g. `op_underfunded`
    #[serde(default)]
    pub operations: Vec<String>,
}

impl ResultCodes {
    /// Check whether the ledger reported a specific transaction-level code
    pub fn has_transaction_code(&self, code: &str) -> bool {
        self.transaction.as_deref() == Some(code)
    }
}

impl fmt::Display for ResultCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tx: {}, ops: [{}]",
            self.transaction.as_deref().unwrap_or("none"),
            self.operations.join(", ")
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum ClientError {
    // ==================== Key Errors ====================
    #[error("Invalid secret key")]
    InvalidSecretKey,

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    // ==================== Account Errors ====================
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    // ==================== Payment Errors ====================
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    // ==================== Faucet Errors ====================
    #[error("Faucet unavailable: {0}")]
    FaucetUnavailable(String),

    // ==================== Network Errors ====================
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    // ==================== Submission Errors ====================
    #[error("Transaction rejected ({0})")]
    TransactionRejected(ResultCodes),

    #[error("Submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    // ==================== Configuration Errors ====================
    #[error("Configuration error: {0}")]
    Config(String),

    // ==================== Contract Errors ====================
    #[error("Contract invocation failed: {0}")]
    Contract(String),
}

impl ClientError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::InvalidSecretKey => "INVALID_SECRET_KEY",
            ClientError::InvalidAddress(_) => "INVALID_ADDRESS",
            ClientError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            ClientError::InvalidAmount(_) => "INVALID_AMOUNT",
            ClientError::FaucetUnavailable(_) => "FAUCET_UNAVAILABLE",
            ClientError::NetworkUnavailable(_) => "NETWORK_UNAVAILABLE",
            ClientError::TransactionRejected(_) => "TRANSACTION_REJECTED",
            ClientError::SubmissionFailed(_) => "SUBMISSION_FAILED",
            ClientError::MalformedEnvelope(_) => "MALFORMED_ENVELOPE",
            ClientError::Config(_) => "CONFIG",
            ClientError::Contract(_) => "CONTRACT",
        }
    }

    /// True for errors detected locally, before anything is sent over the wire
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidSecretKey
                | ClientError::InvalidAddress(_)
                | ClientError::InvalidAmount(_)
                | ClientError::FaucetUnavailable(_)
                | ClientError::MalformedEnvelope(_)
                | ClientError::Config(_)
        )
    }

    /// Ledger result codes, if this is a structured rejection
    pub fn result_codes(&self) -> Option<&ResultCodes> {
        match self {
            ClientError::TransactionRejected(codes) => Some(codes),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::NetworkUnavailable(format!("request timed out: {}", err))
        } else if err.is_connect() {
            ClientError::NetworkUnavailable(format!("connection failed: {}", err))
        } else {
            ClientError::NetworkUnavailable(err.to_string())
        }
    }
}

impl From<stellar_xdr::curr::Error> for ClientError {
    fn from(err: stellar_xdr::curr::Error) -> Self {
        ClientError::MalformedEnvelope(err.to_string())
    }
}

impl From<base64::DecodeError> for ClientError {
    fn from(err: base64::DecodeError) -> Self {
        ClientError::MalformedEnvelope(format!("invalid base64: {}", err))
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Config(format!("invalid URL: {}", err))
    }
}
