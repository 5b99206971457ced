// ============================================================================
// STARTER-PAYMENTS - Transaction Builder
// ============================================================================
// Build, sign and decode Stellar transactions.
//
// A transaction carries:
// - Source account
// - Sequence number (account sequence + 1)
// - Fee (base fee x operation count)
// - Time bounds (the ledger rejects it once max_time has passed)
// - Operations
// - Signatures over sha256(network_id || ENVELOPE_TYPE_TX || tx)
//
// network_id is sha256(passphrase), so an envelope signed for one network
// never verifies on another.
// ============================================================================

use crate::amount::{format_stroops, parse_amount};
use crate::config::NetworkConfig;
use crate::error::ClientError;
use crate::horizon::Account;
use crate::keypair::{decode_account_address, encode_account_address};
use crate::Result;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use ed25519_dalek::{Signature as Ed25519Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    Asset, DecoratedSignature, FeeBumpTransactionInnerTx, Hash, Limits, Memo, MuxedAccount,
    Operation, OperationBody, PaymentOp, Preconditions, ReadXdr, SequenceNumber, Signature,
    SignatureHint, TimeBounds, TimePoint, Transaction, TransactionEnvelope, TransactionExt,
    TransactionSignaturePayload, TransactionSignaturePayloadTaggedTransaction,
    TransactionV1Envelope, Uint256, WriteXdr,
};

// ============================================================================
// RESULT TYPES
// ============================================================================

/// Outcome of exactly one submission attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum SubmissionResult {
    /// Ledger accepted the transaction; carries its hash
    Success(String),
    /// Submission did not happen or the ledger refused it
    Failure(ClientError),
}

impl SubmissionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionResult::Success(_))
    }

    pub fn hash(&self) -> Option<&str> {
        match self {
            SubmissionResult::Success(hash) => Some(hash),
            SubmissionResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            SubmissionResult::Success(_) => None,
            SubmissionResult::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<String> {
        match self {
            SubmissionResult::Success(hash) => Ok(hash),
            SubmissionResult::Failure(err) => Err(err),
        }
    }
}

impl From<Result<String>> for SubmissionResult {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(hash) => SubmissionResult::Success(hash),
            Err(err) => SubmissionResult::Failure(err),
        }
    }
}

/// Signed transaction ready for submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Hex transaction hash
    pub hash: String,
    /// Base64 XDR `TransactionEnvelope`
    pub envelope_xdr: String,
}

/// Decoded view of a payment operation inside an envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSummary {
    pub source: String,
    pub destination: String,
    pub native: bool,
    pub amount_stroops: i64,
}

impl PaymentSummary {
    pub fn amount(&self) -> String {
        format_stroops(self.amount_stroops)
    }
}

// ============================================================================
// TRANSACTION BUILDER
// ============================================================================

#[derive(Debug, Clone)]
enum PendingOperation {
    NativePayment { destination: String, amount: String },
}

/// Builder for Stellar transactions
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    source_account: String,
    account_sequence: i64,
    fee: u32,
    timeout_seconds: u64,
    operations: Vec<PendingOperation>,
}

impl TransactionBuilder {
    /// Start a transaction drawn against a freshly loaded account
    pub fn new(config: &NetworkConfig, source_account: &Account) -> Self {
        Self::from_sequence(config, &source_account.address, source_account.sequence)
    }

    /// Start a transaction from an address and its current sequence number
    pub fn from_sequence(config: &NetworkConfig, source_account: &str, sequence: i64) -> Self {
        Self {
            source_account: source_account.to_string(),
            account_sequence: sequence,
            fee: config.base_fee,
            timeout_seconds: config.tx_timeout_secs,
            operations: Vec::new(),
        }
    }

    /// Set fee per operation (in stroops)
    pub fn fee(mut self, fee: u32) -> Self {
        self.fee = fee;
        self
    }

    /// Set validity window in seconds
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Add native XLM payment operation
    pub fn payment_native(mut self, destination: &str, amount: &str) -> Self {
        self.operations.push(PendingOperation::NativePayment {
            destination: destination.to_string(),
            amount: amount.to_string(),
        });
        self
    }

    /// Build with time bounds relative to the current clock
    pub fn build(self) -> Result<UnsignedTransaction> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.build_at(now)
    }

    /// Build with time bounds relative to `now` (unix seconds)
    pub fn build_at(self, now: u64) -> Result<UnsignedTransaction> {
        if self.operations.is_empty() {
            return Err(ClientError::Config(
                "transaction must have at least one operation".to_string(),
            ));
        }

        let source = decode_account_address(&self.source_account)?;
        // A maxed-out sequence can never be followed
        let next_sequence = self.account_sequence.checked_add(1).ok_or_else(|| {
            ClientError::NetworkUnavailable(format!(
                "malformed sequence number: {}",
                self.account_sequence
            ))
        })?;

        let mut operations = Vec::with_capacity(self.operations.len());
        for op in &self.operations {
            operations.push(to_xdr_operation(op)?);
        }

        let total_fee = self
            .fee
            .checked_mul(operations.len() as u32)
            .ok_or_else(|| ClientError::Config("fee overflow".to_string()))?;

        let tx = Transaction {
            source_account: MuxedAccount::Ed25519(Uint256(source)),
            fee: total_fee,
            seq_num: SequenceNumber(next_sequence),
            cond: Preconditions::Time(TimeBounds {
                min_time: TimePoint(0),
                max_time: TimePoint(now.saturating_add(self.timeout_seconds)),
            }),
            memo: Memo::None,
            operations: operations.try_into()?,
            ext: TransactionExt::V0,
        };

        Ok(UnsignedTransaction { tx })
    }
}

fn to_xdr_operation(op: &PendingOperation) -> Result<Operation> {
    match op {
        PendingOperation::NativePayment { destination, amount } => {
            let destination = decode_account_address(destination)?;
            let amount = parse_amount(amount)?;

            Ok(Operation {
                source_account: None,
                body: OperationBody::Payment(PaymentOp {
                    destination: MuxedAccount::Ed25519(Uint256(destination)),
                    asset: Asset::Native,
                    amount,
                }),
            })
        }
    }
}

// ============================================================================
// UNSIGNED TRANSACTION
// ============================================================================

/// Transaction ready for signing
#[derive(Debug, Clone)]
pub struct UnsignedTransaction {
    tx: Transaction,
}

impl UnsignedTransaction {
    pub fn sequence(&self) -> i64 {
        self.tx.seq_num.0
    }

    pub fn fee(&self) -> u32 {
        self.tx.fee
    }

    /// Latest ledger close time (unix seconds) at which this is still valid
    pub fn max_time(&self) -> Option<u64> {
        match &self.tx.cond {
            Preconditions::Time(bounds) => Some(bounds.max_time.0),
            Preconditions::V2(v2) => v2.time_bounds.as_ref().map(|b| b.max_time.0),
            Preconditions::None => None,
        }
    }

    /// Transaction hash under the given network passphrase
    pub fn hash(&self, network_passphrase: &str) -> Result<[u8; 32]> {
        transaction_hash(&self.tx, network_passphrase)
    }

    /// Sign for the network identified by `network_passphrase`
    pub fn sign(&self, signing_key: &SigningKey, network_passphrase: &str) -> Result<SignedTransaction> {
        let tx_hash = self.hash(network_passphrase)?;
        let signature = signing_key.sign(&tx_hash);
        let public = signing_key.verifying_key().to_bytes();

        let decorated = DecoratedSignature {
            hint: signature_hint(&public),
            signature: Signature(signature.to_bytes().to_vec().try_into()?),
        };

        let envelope = TransactionEnvelope::Tx(TransactionV1Envelope {
            tx: self.tx.clone(),
            signatures: vec![decorated].try_into()?,
        });

        let envelope_bytes = envelope.to_xdr(Limits::none())?;

        Ok(SignedTransaction {
            hash: hex::encode(tx_hash),
            envelope_xdr: BASE64_STANDARD.encode(envelope_bytes),
        })
    }
}

// ============================================================================
// HASHING & SIGNATURES
// ============================================================================

fn network_id(network_passphrase: &str) -> Hash {
    Hash(Sha256::digest(network_passphrase.as_bytes()).into())
}

fn signature_hint(public_key: &[u8; 32]) -> SignatureHint {
    SignatureHint([public_key[28], public_key[29], public_key[30], public_key[31]])
}

/// sha256 of the signature payload for a v1 transaction
pub fn transaction_hash(tx: &Transaction, network_passphrase: &str) -> Result<[u8; 32]> {
    payload_hash(
        network_passphrase,
        TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
    )
}

fn payload_hash(
    network_passphrase: &str,
    tagged_transaction: TransactionSignaturePayloadTaggedTransaction,
) -> Result<[u8; 32]> {
    let payload = TransactionSignaturePayload {
        network_id: network_id(network_passphrase),
        tagged_transaction,
    };
    let payload_bytes = payload.to_xdr(Limits::none())?;
    Ok(Sha256::digest(&payload_bytes).into())
}

/// Hash of the transaction carried by an envelope under a passphrase
pub fn envelope_hash(envelope: &TransactionEnvelope, network_passphrase: &str) -> Result<[u8; 32]> {
    match envelope {
        TransactionEnvelope::Tx(v1) => transaction_hash(&v1.tx, network_passphrase),
        TransactionEnvelope::TxFeeBump(fee_bump) => payload_hash(
            network_passphrase,
            TransactionSignaturePayloadTaggedTransaction::TxFeeBump(fee_bump.tx.clone()),
        ),
        TransactionEnvelope::TxV0(_) => Err(ClientError::MalformedEnvelope(
            "v0 envelopes are not supported".to_string(),
        )),
    }
}

/// Check that the envelope carries a valid signature from `public_key` for
/// the network identified by `network_passphrase`
pub fn is_signed_by(
    envelope: &TransactionEnvelope,
    network_passphrase: &str,
    public_key: &[u8; 32],
) -> bool {
    let Ok(tx_hash) = envelope_hash(envelope, network_passphrase) else {
        return false;
    };
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key) else {
        return false;
    };
    let hint = signature_hint(public_key);

    signatures(envelope).iter().any(|decorated| {
        decorated.hint == hint
            && Ed25519Signature::from_slice(decorated.signature.0.as_slice())
                .map(|sig| verifying_key.verify(&tx_hash, &sig).is_ok())
                .unwrap_or(false)
    })
}

// ============================================================================
// DECODING
// ============================================================================

/// Decode a base64 XDR envelope
pub fn decode_envelope(envelope_xdr: &str) -> Result<TransactionEnvelope> {
    let bytes = BASE64_STANDARD.decode(envelope_xdr.trim())?;
    Ok(TransactionEnvelope::from_xdr(&bytes, Limits::none())?)
}

/// Signatures attached to the outermost envelope
pub fn signatures(envelope: &TransactionEnvelope) -> Vec<DecoratedSignature> {
    match envelope {
        TransactionEnvelope::TxV0(v0) => v0.signatures.to_vec(),
        TransactionEnvelope::Tx(v1) => v1.signatures.to_vec(),
        TransactionEnvelope::TxFeeBump(fee_bump) => fee_bump.signatures.to_vec(),
    }
}

/// Source account and operations of the (inner) transaction
pub fn source_and_operations(envelope: &TransactionEnvelope) -> (String, Vec<Operation>) {
    match envelope {
        TransactionEnvelope::TxV0(v0) => (
            encode_account_address(&v0.tx.source_account_ed25519.0),
            v0.tx.operations.to_vec(),
        ),
        TransactionEnvelope::Tx(v1) => (
            muxed_to_address(&v1.tx.source_account),
            v1.tx.operations.to_vec(),
        ),
        TransactionEnvelope::TxFeeBump(fee_bump) => match &fee_bump.tx.inner_tx {
            FeeBumpTransactionInnerTx::Tx(inner) => (
                muxed_to_address(&inner.tx.source_account),
                inner.tx.operations.to_vec(),
            ),
        },
    }
}

/// All payment operations in the envelope, in order
pub fn payment_summaries(envelope: &TransactionEnvelope) -> Vec<PaymentSummary> {
    let (source, operations) = source_and_operations(envelope);

    operations
        .iter()
        .filter_map(|op| match &op.body {
            OperationBody::Payment(payment) => Some(PaymentSummary {
                source: op
                    .source_account
                    .as_ref()
                    .map(muxed_to_address)
                    .unwrap_or_else(|| source.clone()),
                destination: muxed_to_address(&payment.destination),
                native: matches!(payment.asset, Asset::Native),
                amount_stroops: payment.amount,
            }),
            _ => None,
        })
        .collect()
}

fn muxed_to_address(account: &MuxedAccount) -> String {
    match account {
        MuxedAccount::Ed25519(key) => encode_account_address(&key.0),
        MuxedAccount::MuxedEd25519(muxed) => encode_account_address(&muxed.ed25519.0),
    }
}
