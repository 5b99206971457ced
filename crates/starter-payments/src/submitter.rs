// ============================================================================
// STARTER-PAYMENTS - Raw Envelope Submitter
// ============================================================================
// Forwards an already-signed base64 XDR envelope to Horizon untouched. The
// envelope is decoded only to reject structurally broken input before it
// goes over the wire.

use crate::error::ClientError;
use crate::horizon::HorizonClient;
use crate::transaction::{decode_envelope, signatures, source_and_operations, SubmissionResult};
use crate::Result;
use tracing::{debug, info};

pub struct EnvelopeSubmitter {
    horizon: HorizonClient,
}

impl EnvelopeSubmitter {
    pub fn new(horizon: HorizonClient) -> Self {
        Self { horizon }
    }

    pub async fn submit(&self, envelope_xdr: &str) -> SubmissionResult {
        self.try_submit(envelope_xdr).await.into()
    }

    pub async fn try_submit(&self, envelope_xdr: &str) -> Result<String> {
        validate_envelope(envelope_xdr)?;

        let hash = self.horizon.submit_envelope(envelope_xdr).await?;
        info!("Envelope submitted: {}", hash);
        Ok(hash)
    }
}

/// Structural checks: decodes, has operations, carries at least one signature
pub fn validate_envelope(envelope_xdr: &str) -> Result<()> {
    let envelope = decode_envelope(envelope_xdr)?;

    let (source, operations) = source_and_operations(&envelope);
    if operations.is_empty() {
        return Err(ClientError::MalformedEnvelope(
            "transaction has no operations".to_string(),
        ));
    }
    if signatures(&envelope).is_empty() {
        return Err(ClientError::MalformedEnvelope(
            "envelope carries no signatures".to_string(),
        ));
    }

    debug!("Envelope from {} with {} operation(s)", source, operations.len());
    Ok(())
}
