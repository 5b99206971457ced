// ============================================================================
// STARTER-PAYMENTS - Stellar Service
// ============================================================================
// Single entry surface for the app: every component, wired to one immutable
// NetworkConfig and one shared transport.
// ============================================================================

use crate::config::NetworkConfig;
use crate::contract::{ContractClient, ContractClientFactory, ContractInvoker};
use crate::error::ClientError;
use crate::faucet::FaucetClient;
use crate::horizon::{Balance, HorizonClient};
use crate::keypair::{Keypair, KeypairService};
use crate::payment::PaymentService;
use crate::submitter::EnvelopeSubmitter;
use crate::transaction::SubmissionResult;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// What a contract-invocation layer needs to talk to the network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub rpc_url: Option<String>,
    pub network_passphrase: String,
}

pub struct StellarService {
    config: NetworkConfig,
    keys: KeypairService,
    horizon: HorizonClient,
    faucet: FaucetClient,
    payments: PaymentService,
    submitter: EnvelopeSubmitter,
    contracts: Option<ContractClientFactory>,
}

impl StellarService {
    /// Create a service backed by reqwest
    pub fn new(config: NetworkConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a service over any transport
    pub fn with_transport(config: NetworkConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let horizon = HorizonClient::with_transport(config.clone(), Arc::clone(&transport));

        info!(
            "Stellar service ready on {} ({})",
            config.network.as_str(),
            config.horizon_read_url
        );

        Self {
            keys: KeypairService::new(),
            faucet: FaucetClient::with_transport(config.clone(), transport),
            payments: PaymentService::with_horizon(horizon.clone()),
            submitter: EnvelopeSubmitter::new(horizon.clone()),
            horizon,
            contracts: None,
            config,
        }
    }

    /// Attach the contract-invocation layer
    pub fn with_invoker(mut self, invoker: Arc<dyn ContractInvoker>) -> Self {
        self.contracts = Some(ContractClientFactory::new(invoker));
        self
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    pub fn horizon(&self) -> &HorizonClient {
        &self.horizon
    }

    // ==================== Keys ====================

    /// Generate a new random keypair; the caller stores the secret
    pub fn create_account(&self) -> Keypair {
        self.keys.generate()
    }

    pub fn import_account(&self, secret: &str) -> Result<Keypair> {
        self.keys.from_secret(secret)
    }

    // ==================== Queries ====================

    pub async fn get_account_balance(&self, address: &str) -> Result<Vec<Balance>> {
        self.horizon.get_account_balance(address).await
    }

    // ==================== Testnet ====================

    pub async fn fund_account(&self, address: &str) -> Result<bool> {
        self.faucet.fund(address).await
    }

    // ==================== Transactions ====================

    pub async fn payment(
        &self,
        sender_address: &str,
        sender_secret: &str,
        receiver_address: &str,
        amount: &str,
    ) -> SubmissionResult {
        self.payments
            .payment(sender_address, sender_secret, receiver_address, amount)
            .await
    }

    pub async fn submit_transaction(&self, envelope_xdr: &str) -> SubmissionResult {
        self.submitter.submit(envelope_xdr).await
    }

    // ==================== Contracts ====================

    /// Bind a client to the configured contract for `caller_address`
    pub fn build_client(&self, caller_address: &str) -> Result<ContractClient> {
        let factory = self.contracts.as_ref().ok_or_else(|| {
            ClientError::Config("no contract invoker attached".to_string())
        })?;
        let contract = self.config.contract_address.as_deref().ok_or_else(|| {
            ClientError::Config("no contract address configured".to_string())
        })?;

        factory.build_client(caller_address, contract, &self.config)
    }

    pub fn environment(&self) -> Environment {
        Environment {
            rpc_url: self.config.rpc_url.clone(),
            network_passphrase: self.config.passphrase.clone(),
        }
    }

    // ==================== Explorer ====================

    pub fn explorer_tx_url(&self, hash: &str) -> Option<String> {
        self.config.explorer_tx_url(hash)
    }

    pub fn explorer_account_url(&self, address: &str) -> Option<String> {
        self.config.explorer_account_url(address)
    }
}
