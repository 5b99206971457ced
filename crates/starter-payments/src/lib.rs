// ============================================================================
// STARTER-PAYMENTS - Stellar Account & Transaction Client
// ============================================================================
// Client-side core of the Scaffold Stellar starter app.
//
// Features:
// - Generate / import Ed25519 keypairs (G... / S...)
// - Query account balances from Horizon (native asset always "XLM")
// - Fund testnet accounts through Friendbot
// - Build, sign and submit native XLM payments
// - Submit externally signed envelopes untouched
// - Bind contract clients for an external invocation layer
// ============================================================================

pub mod amount;
pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod faucet;
pub mod horizon;
pub mod keypair;
pub mod payment;
pub mod submitter;
pub mod transaction;
pub mod transport;

pub use client::{Environment, StellarService};
pub use config::{Network, NetworkConfig};
pub use contract::{ContractBinding, ContractClient, ContractClientFactory, ContractInvoker};
pub use error::{ClientError, ResultCodes};
pub use faucet::FaucetClient;
pub use horizon::{Account, Balance, HorizonClient};
pub use keypair::{Keypair, KeypairService};
pub use payment::{PaymentIntent, PaymentService};
pub use submitter::EnvelopeSubmitter;
pub use transaction::{SignedTransaction, SubmissionResult, TransactionBuilder};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

/// Re-export for convenience
pub type Result<T> = std::result::Result<T, ClientError>;
