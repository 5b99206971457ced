// ============================================================================
// STARTER-PAYMENTS - Contract Clients
// ============================================================================
// A `ContractClient` is an opaque handle bound to one deployed Soroban
// contract, one caller and one network. Encoding and invoking contract
// methods is the job of a `ContractInvoker` supplied by the caller; this
// module only validates the binding and hands calls through.
// ============================================================================

use crate::config::NetworkConfig;
use crate::error::ClientError;
use crate::keypair::{validate_account_address, validate_contract_address};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Everything an invoker needs to reach the contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractBinding {
    pub contract_id: String,
    pub caller: String,
    pub rpc_url: String,
    pub network_passphrase: String,
}

/// Capability implemented by the contract-invocation layer
#[async_trait]
pub trait ContractInvoker: Send + Sync {
    async fn invoke(
        &self,
        binding: &ContractBinding,
        method: &str,
        args: Vec<serde_json::Value>,
    ) -> Result<serde_json::Value>;
}

/// Handle bound to one deployed contract
#[derive(Clone)]
pub struct ContractClient {
    binding: ContractBinding,
    invoker: Arc<dyn ContractInvoker>,
}

impl ContractClient {
    pub fn contract_id(&self) -> &str {
        &self.binding.contract_id
    }

    pub fn caller(&self) -> &str {
        &self.binding.caller
    }

    pub fn rpc_url(&self) -> &str {
        &self.binding.rpc_url
    }

    pub fn network_passphrase(&self) -> &str {
        &self.binding.network_passphrase
    }

    pub fn binding(&self) -> &ContractBinding {
        &self.binding
    }

    /// Invoke `method` through the configured invoker
    pub async fn call(&self, method: &str, args: Vec<serde_json::Value>) -> Result<serde_json::Value> {
        if method.trim().is_empty() {
            return Err(ClientError::Contract("method name is empty".to_string()));
        }
        debug!("Invoking {} on contract {}", method, self.binding.contract_id);
        self.invoker.invoke(&self.binding, method, args).await
    }
}

impl fmt::Debug for ContractClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractClient")
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

/// Builds contract clients for a single invoker implementation
#[derive(Clone)]
pub struct ContractClientFactory {
    invoker: Arc<dyn ContractInvoker>,
}

impl ContractClientFactory {
    pub fn new(invoker: Arc<dyn ContractInvoker>) -> Self {
        Self { invoker }
    }

    /// Validate configuration and addresses, then bind a client
    pub fn build_client(
        &self,
        caller_address: &str,
        contract_address: &str,
        config: &NetworkConfig,
    ) -> Result<ContractClient> {
        validate_account_address(caller_address)?;
        validate_contract_address(contract_address)?;

        let rpc_url = config
            .rpc_url
            .clone()
            .ok_or_else(|| ClientError::Config("no Soroban RPC URL configured".to_string()))?;
        url::Url::parse(&rpc_url)?;

        if config.passphrase.trim().is_empty() {
            return Err(ClientError::Config("network passphrase is empty".to_string()));
        }

        Ok(ContractClient {
            binding: ContractBinding {
                contract_id: contract_address.to_string(),
                caller: caller_address.to_string(),
                rpc_url,
                network_passphrase: config.passphrase.clone(),
            },
            invoker: Arc::clone(&self.invoker),
        })
    }
}
