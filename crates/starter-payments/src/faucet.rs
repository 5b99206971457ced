// ============================================================================
// STARTER-PAYMENTS - Friendbot Faucet
// ============================================================================
// Test-network funding. Three distinct outcomes:
//   Ok(true)                 faucet accepted the request
//   Ok(false)                faucet answered but declined (already funded,
//                            rate limited, ...)
//   Err(NetworkUnavailable)  faucet could not be reached at all
// ============================================================================

use crate::config::{Network, NetworkConfig};
use crate::error::ClientError;
use crate::keypair::validate_account_address;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub struct FaucetClient {
    config: NetworkConfig,
    transport: Arc<dyn HttpTransport>,
}

impl FaucetClient {
    pub fn new(config: NetworkConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: NetworkConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self { config, transport }
    }

    /// Ask Friendbot to fund `address` (testnet only)
    pub async fn fund(&self, address: &str) -> Result<bool> {
        if self.config.network != Network::Test {
            return Err(ClientError::FaucetUnavailable(format!(
                "Friendbot is only available on testnet, configured network is {}",
                self.config.network.as_str()
            )));
        }

        validate_account_address(address)?;

        let faucet_url = self.config.faucet_url.as_deref().ok_or_else(|| {
            ClientError::FaucetUnavailable("no Friendbot URL configured".to_string())
        })?;

        let url = Url::parse_with_params(faucet_url, &[("addr", address)])
            .map_err(|e| ClientError::Config(format!("invalid Friendbot URL: {}", e)))?;

        debug!("Requesting friendbot funding for: {}", address);

        let response = self.transport.get(url.as_str()).await?;

        if response.is_success() {
            info!("Friendbot funded account: {}", address);
            Ok(true)
        } else {
            warn!("Friendbot declined {} with HTTP {}", address, response.status);
            Ok(false)
        }
    }
}
