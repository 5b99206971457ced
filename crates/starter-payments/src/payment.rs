// ============================================================================
// STARTER-PAYMENTS - Payment Service
// ============================================================================
// Native XLM payment pipeline, one call = at most one submission:
//
//   validate -> load source account -> build -> sign -> submit -> classify
//
// Every local check runs before the first network call. Nothing is retried:
// resubmitting a signed transaction with a stale sequence number is unsafe,
// so retry policy belongs to the caller.
// ============================================================================

use crate::amount::parse_amount;
use crate::config::NetworkConfig;
use crate::error::ClientError;
use crate::horizon::{Account, HorizonClient};
use crate::keypair::{encode_account_address, signing_key_from_secret, validate_account_address};
use crate::transaction::{SignedTransaction, SubmissionResult, TransactionBuilder};
use crate::transport::HttpTransport;
use crate::Result;
use ed25519_dalek::SigningKey;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// "Pay `amount` XLM from sender to receiver"
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PaymentIntent {
    pub sender_address: String,
    pub sender_secret: String,
    pub receiver_address: String,
    pub amount: String,
}

impl PaymentIntent {
    pub fn new(sender_address: &str, sender_secret: &str, receiver_address: &str, amount: &str) -> Self {
        Self {
            sender_address: sender_address.to_string(),
            sender_secret: sender_secret.to_string(),
            receiver_address: receiver_address.to_string(),
            amount: amount.to_string(),
        }
    }
}

impl fmt::Debug for PaymentIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentIntent")
            .field("sender_address", &self.sender_address)
            .field("sender_secret", &"<redacted>")
            .field("receiver_address", &self.receiver_address)
            .field("amount", &self.amount)
            .finish()
    }
}

pub struct PaymentService {
    config: NetworkConfig,
    horizon: HorizonClient,
}

impl PaymentService {
    pub fn new(config: NetworkConfig) -> Result<Self> {
        let horizon = HorizonClient::new(config.clone())?;
        Ok(Self { config, horizon })
    }

    pub fn with_transport(config: NetworkConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let horizon = HorizonClient::with_transport(config.clone(), transport);
        Self { config, horizon }
    }

    /// Share an existing Horizon client
    pub fn with_horizon(horizon: HorizonClient) -> Self {
        Self {
            config: horizon.config().clone(),
            horizon,
        }
    }

    /// Send a native payment
    pub async fn payment(
        &self,
        sender_address: &str,
        sender_secret: &str,
        receiver_address: &str,
        amount: &str,
    ) -> SubmissionResult {
        let intent = PaymentIntent::new(sender_address, sender_secret, receiver_address, amount);
        self.pay(&intent).await
    }

    /// Run the full pipeline and report the outcome
    pub async fn pay(&self, intent: &PaymentIntent) -> SubmissionResult {
        self.try_pay(intent).await.into()
    }

    /// Same as [`pay`](Self::pay), as a `Result` carrying the transaction hash
    pub async fn try_pay(&self, intent: &PaymentIntent) -> Result<String> {
        let signing_key = validate_intent(intent)?;

        let account = self.horizon.get_account(&intent.sender_address).await?;
        let signed = self.sign_payment(intent, &account, &signing_key)?;

        debug!(
            "Payment {} -> {} built on account sequence {} ({})",
            intent.sender_address, intent.receiver_address, account.sequence, signed.hash
        );

        match self.horizon.submit_envelope(&signed.envelope_xdr).await {
            Ok(hash) => {
                info!(
                    "XLM sent: {} XLM {} -> {} ({})",
                    intent.amount, intent.sender_address, intent.receiver_address, hash
                );
                Ok(hash)
            }
            Err(e) => {
                warn!("XLM send failed: {}", e);
                Err(e)
            }
        }
    }

    /// Build and sign a payment against an already loaded source account,
    /// without submitting it
    pub fn build_signed(&self, intent: &PaymentIntent, account: &Account) -> Result<SignedTransaction> {
        let signing_key = validate_intent(intent)?;
        if account.address != intent.sender_address {
            return Err(ClientError::InvalidAddress(format!(
                "loaded account {} is not the sender",
                account.address
            )));
        }
        self.sign_payment(intent, account, &signing_key)
    }

    fn sign_payment(
        &self,
        intent: &PaymentIntent,
        account: &Account,
        signing_key: &SigningKey,
    ) -> Result<SignedTransaction> {
        TransactionBuilder::new(&self.config, account)
            .payment_native(&intent.receiver_address, &intent.amount)
            .build()?
            .sign(signing_key, &self.config.passphrase)
    }
}

/// Local checks, in order: amount, sender address, secret, receiver address.
/// Returns the signer so the secret is decoded only once.
fn validate_intent(intent: &PaymentIntent) -> Result<SigningKey> {
    parse_amount(&intent.amount)?;
    validate_account_address(&intent.sender_address)?;

    let signing_key = signing_key_from_secret(&intent.sender_secret)?;
    let signer_address = encode_account_address(&signing_key.verifying_key().to_bytes());
    if signer_address != intent.sender_address {
        return Err(ClientError::InvalidSecretKey);
    }

    validate_account_address(&intent.receiver_address)?;
    Ok(signing_key)
}
