// ============================================================================
// STARTER-PAYMENTS - Configuration
// ============================================================================
// Immutable network configuration. Built once at process start and cloned
// into every component; nothing mutates it afterwards.

use crate::error::ClientError;
use crate::Result;
use serde::{Deserialize, Serialize};
use url::Url;

pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const PUBLIC_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// Base fee per operation in stroops (1 XLM = 10,000,000 stroops)
pub const BASE_FEE: u32 = 100;

/// Seconds a built transaction stays valid on the ledger
pub const DEFAULT_TX_TIMEOUT_SECS: u64 = 180;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Network selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Test,
    Public,
    Custom,
}

impl Network {
    /// Parse the `STELLAR_NETWORK` style names used by the web app
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "testnet" | "test" => Network::Test,
            "public" | "mainnet" | "pubnet" => Network::Public,
            _ => Network::Custom,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Test => "testnet",
            Network::Public => "public",
            Network::Custom => "custom",
        }
    }
}

/// Stellar network configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Which network this configuration targets
    pub network: Network,

    /// Network passphrase mixed into every transaction signature
    pub passphrase: String,

    /// Horizon URL used for account queries
    pub horizon_read_url: String,

    /// Horizon URL used for transaction submission
    pub horizon_submit_url: String,

    /// Friendbot URL (test network only)
    #[serde(default)]
    pub faucet_url: Option<String>,

    /// Soroban RPC URL used by contract clients
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Deployed contract address (C...)
    #[serde(default)]
    pub contract_address: Option<String>,

    /// Base fee per operation in stroops
    #[serde(default = "default_base_fee")]
    pub base_fee: u32,

    /// Transaction validity window in seconds
    #[serde(default = "default_tx_timeout")]
    pub tx_timeout_secs: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_fee() -> u32 {
    BASE_FEE
}

fn default_tx_timeout() -> u64 {
    DEFAULT_TX_TIMEOUT_SECS
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl NetworkConfig {
    /// Create testnet configuration
    pub fn testnet() -> Self {
        Self {
            network: Network::Test,
            passphrase: TESTNET_PASSPHRASE.to_string(),
            horizon_read_url: "https://horizon-testnet.stellar.org".to_string(),
            horizon_submit_url: "https://horizon-testnet.stellar.org".to_string(),
            faucet_url: Some("https://friendbot.stellar.org".to_string()),
            rpc_url: Some("https://soroban-testnet.stellar.org".to_string()),
            contract_address: None,
            base_fee: BASE_FEE,
            tx_timeout_secs: DEFAULT_TX_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Create public network (mainnet) configuration
    pub fn public() -> Self {
        Self {
            network: Network::Public,
            passphrase: PUBLIC_PASSPHRASE.to_string(),
            horizon_read_url: "https://horizon.stellar.org".to_string(),
            horizon_submit_url: "https://horizon.stellar.org".to_string(),
            faucet_url: None,
            rpc_url: None,
            contract_address: None,
            base_fee: BASE_FEE,
            tx_timeout_secs: DEFAULT_TX_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Create configuration for a standalone / private network
    pub fn custom(passphrase: &str, horizon_url: &str) -> Self {
        Self {
            network: Network::Custom,
            passphrase: passphrase.to_string(),
            horizon_read_url: horizon_url.to_string(),
            horizon_submit_url: horizon_url.to_string(),
            faucet_url: None,
            rpc_url: None,
            contract_address: None,
            base_fee: BASE_FEE,
            tx_timeout_secs: DEFAULT_TX_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    pub fn with_faucet_url(mut self, url: &str) -> Self {
        self.faucet_url = Some(url.to_string());
        self
    }

    pub fn with_rpc_url(mut self, url: &str) -> Self {
        self.rpc_url = Some(url.to_string());
        self
    }

    pub fn with_contract_address(mut self, address: &str) -> Self {
        self.contract_address = Some(address.to_string());
        self
    }

    pub fn with_submit_url(mut self, url: &str) -> Self {
        self.horizon_submit_url = url.to_string();
        self
    }

    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from any key/value source.
    ///
    /// Recognised keys: `STELLAR_NETWORK`, `HORIZON_URL`, `HORIZON_SUBMIT_URL`,
    /// `HORIZON_NETWORK_PASSPHRASE`, `STELLAR_FRIENDBOT_URL`,
    /// `SOROBAN_RPC_URL`, `CONTRACT_ADDRESS`. Presets fill in whatever a
    /// known network leaves unset; a custom network must name its Horizon URL
    /// and passphrase explicitly.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let network = get("STELLAR_NETWORK")
            .map(|n| Network::from_name(&n))
            .unwrap_or(Network::Test);

        let mut config = match network {
            Network::Test => Self::testnet(),
            Network::Public => Self::public(),
            Network::Custom => {
                let horizon = get("HORIZON_URL").ok_or_else(|| {
                    ClientError::Config("HORIZON_URL is required for a custom network".into())
                })?;
                let passphrase = get("HORIZON_NETWORK_PASSPHRASE").ok_or_else(|| {
                    ClientError::Config(
                        "HORIZON_NETWORK_PASSPHRASE is required for a custom network".into(),
                    )
                })?;
                Self::custom(&passphrase, &horizon)
            }
        };

        if let Some(horizon) = get("HORIZON_URL") {
            config.horizon_read_url = horizon.clone();
            config.horizon_submit_url = horizon;
        }
        if let Some(submit) = get("HORIZON_SUBMIT_URL") {
            config.horizon_submit_url = submit;
        }
        if let Some(passphrase) = get("HORIZON_NETWORK_PASSPHRASE") {
            config.passphrase = passphrase;
        }
        if let Some(faucet) = get("STELLAR_FRIENDBOT_URL") {
            config.faucet_url = Some(faucet);
        }
        if let Some(rpc) = get("SOROBAN_RPC_URL") {
            config.rpc_url = Some(rpc);
        }
        if let Some(contract) = get("CONTRACT_ADDRESS") {
            config.contract_address = Some(contract);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that URLs parse and the passphrase is present
    pub fn validate(&self) -> Result<()> {
        if self.passphrase.trim().is_empty() {
            return Err(ClientError::Config("network passphrase is empty".into()));
        }
        Url::parse(&self.horizon_read_url)?;
        Url::parse(&self.horizon_submit_url)?;
        if let Some(faucet) = &self.faucet_url {
            Url::parse(faucet)?;
        }
        if let Some(rpc) = &self.rpc_url {
            Url::parse(rpc)?;
        }
        if self.tx_timeout_secs == 0 {
            return Err(ClientError::Config("transaction timeout must be positive".into()));
        }
        Ok(())
    }

    /// Check if this is the test network
    pub fn is_testnet(&self) -> bool {
        self.network == Network::Test
    }

    /// Get Stellar Expert explorer URL for an address
    pub fn explorer_account_url(&self, address: &str) -> Option<String> {
        self.explorer_segment()
            .map(|net| format!("https://stellar.expert/explorer/{}/account/{}", net, address))
    }

    /// Get Stellar Expert explorer URL for a transaction
    pub fn explorer_tx_url(&self, hash: &str) -> Option<String> {
        self.explorer_segment()
            .map(|net| format!("https://stellar.expert/explorer/{}/tx/{}", net, hash))
    }

    fn explorer_segment(&self) -> Option<&'static str> {
        match self.network {
            Network::Test => Some("testnet"),
            Network::Public => Some("public"),
            Network::Custom => None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::testnet()
    }
}
