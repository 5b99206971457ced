// ============================================================================
// STARTER-PAYMENTS - Horizon API Client
// ============================================================================
// Account queries against the ledger read endpoint, plus the single
// transaction submission call shared by the payment service and the raw
// envelope submitter.
// ============================================================================

use crate::config::NetworkConfig;
use crate::error::{ClientError, ResultCodes};
use crate::keypair::validate_account_address;
use crate::transport::{HttpResponse, HttpTransport, ReqwestTransport};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Asset code the native asset is always reported under
pub const NATIVE_ASSET_CODE: &str = "XLM";

// ============================================================================
// DATA TYPES
// ============================================================================

/// Normalized account balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// "XLM" for the native asset, otherwise the issuer-defined code
    pub asset_code: String,

    /// Balance amount exactly as the ledger reported it
    pub amount: String,
}

impl Balance {
    pub fn is_native(&self) -> bool {
        self.asset_code == NATIVE_ASSET_CODE
    }
}

/// Account state as seen by the ledger at query time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account address (G...)
    pub address: String,

    /// Current sequence number
    pub sequence: i64,

    /// Balances in ledger order
    pub balances: Vec<Balance>,
}

impl Account {
    /// Native XLM balance, if the ledger listed one
    pub fn native_balance(&self) -> Option<&Balance> {
        self.balances.iter().find(|b| b.is_native())
    }
}

// ==================== Horizon wire types ====================

#[derive(Debug, Deserialize)]
struct HorizonAccount {
    id: String,
    sequence: String,
    #[serde(default)]
    balances: Vec<HorizonBalance>,
}

#[derive(Debug, Deserialize)]
struct HorizonBalance {
    balance: String,
    asset_type: String,
    #[serde(default)]
    asset_code: Option<String>,
}

impl HorizonBalance {
    fn normalize(self) -> Balance {
        let asset_code = if self.asset_type == "native" {
            NATIVE_ASSET_CODE.to_string()
        } else {
            // Pool shares carry no code; report their type instead
            self.asset_code.unwrap_or(self.asset_type)
        };

        Balance {
            asset_code,
            amount: self.balance,
        }
    }
}

/// Successful submission response
#[derive(Debug, Clone, Deserialize)]
struct TransactionResponse {
    hash: String,
    #[serde(default)]
    ledger: Option<u64>,
}

/// Horizon problem+json error response
#[derive(Debug, Clone, Default, Deserialize)]
struct HorizonErrorResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    extras: Option<HorizonErrorExtras>,
}

#[derive(Debug, Clone, Deserialize)]
struct HorizonErrorExtras {
    #[serde(default)]
    result_codes: Option<HorizonResultCodes>,
}

#[derive(Debug, Clone, Deserialize)]
struct HorizonResultCodes {
    #[serde(default)]
    transaction: Option<String>,
    #[serde(default)]
    operations: Option<Vec<String>>,
}

impl From<HorizonResultCodes> for ResultCodes {
    fn from(rc: HorizonResultCodes) -> Self {
        ResultCodes {
            transaction: rc.transaction,
            operations: rc.operations.unwrap_or_default(),
        }
    }
}

// ============================================================================
// HORIZON CLIENT
// ============================================================================

/// Client for Stellar Horizon API
#[derive(Clone)]
pub struct HorizonClient {
    config: NetworkConfig,
    transport: Arc<dyn HttpTransport>,
}

impl HorizonClient {
    /// Create a client backed by reqwest
    pub fn new(config: NetworkConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over any transport
    pub fn with_transport(config: NetworkConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    // ==================== Account Operations ====================

    /// Load account state
    pub async fn get_account(&self, address: &str) -> Result<Account> {
        validate_account_address(address)?;

        let url = format!(
            "{}/accounts/{}",
            self.config.horizon_read_url.trim_end_matches('/'),
            address
        );

        debug!("Loading account: {}", address);

        let response = self.transport.get(&url).await?;

        match response.status {
            200..=299 => {
                let raw: HorizonAccount = response.json().map_err(|e| {
                    ClientError::NetworkUnavailable(format!("malformed account response: {}", e))
                })?;
                let sequence = raw.sequence.parse::<i64>().map_err(|_| {
                    ClientError::NetworkUnavailable(format!(
                        "malformed sequence number: {}",
                        raw.sequence
                    ))
                })?;

                Ok(Account {
                    address: raw.id,
                    sequence,
                    balances: raw.balances.into_iter().map(HorizonBalance::normalize).collect(),
                })
            }
            404 => Err(ClientError::AccountNotFound(address.to_string())),
            status => Err(ClientError::NetworkUnavailable(format!(
                "Horizon HTTP {}: {}",
                status,
                summarize(&response)
            ))),
        }
    }

    /// Get account balances in ledger order
    pub async fn get_account_balance(&self, address: &str) -> Result<Vec<Balance>> {
        let account = self.get_account(address).await?;
        Ok(account.balances)
    }

    /// Check if account exists
    pub async fn account_exists(&self, address: &str) -> Result<bool> {
        match self.get_account(address).await {
            Ok(_) => Ok(true),
            Err(ClientError::AccountNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // ==================== Transaction Submission ====================

    /// Submit a signed, base64 XDR envelope. Exactly one attempt.
    ///
    /// A `SubmissionFailed` raised for an unreadable 2xx body means the
    /// outcome is unknown: the ledger may already have applied the
    /// transaction. Look the hash or the account sequence up before
    /// resubmitting.
    pub async fn submit_envelope(&self, envelope_xdr: &str) -> Result<String> {
        let url = format!(
            "{}/transactions",
            self.config.horizon_submit_url.trim_end_matches('/')
        );

        debug!("Submitting transaction...");

        let response = self.transport.post_form(&url, &[("tx", envelope_xdr)]).await?;

        if response.is_success() {
            let tx: TransactionResponse = response.json().map_err(|e| {
                ClientError::SubmissionFailed(format!(
                    "outcome unknown, unreadable success response: {}",
                    e
                ))
            })?;
            debug!("Transaction successful: {} (ledger {:?})", tx.hash, tx.ledger);
            return Ok(tx.hash);
        }

        Err(classify_rejection(&response))
    }
}

/// Turn a failed submission response into a structured rejection when the
/// ledger supplied result codes, or a generic failure otherwise.
fn classify_rejection(response: &HttpResponse) -> ClientError {
    let error: HorizonErrorResponse = response.json().unwrap_or_default();

    if let Some(codes) = error.extras.and_then(|e| e.result_codes) {
        let codes = ResultCodes::from(codes);
        warn!("Transaction rejected: {}", codes);
        return ClientError::TransactionRejected(codes);
    }

    let reason = error
        .detail
        .or(error.title)
        .unwrap_or_else(|| summarize(response));
    warn!("Transaction submission failed: HTTP {}: {}", response.status, reason);
    ClientError::SubmissionFailed(format!("HTTP {}: {}", response.status, reason))
}

fn summarize(response: &HttpResponse) -> String {
    response.body.chars().take(200).collect()
}
