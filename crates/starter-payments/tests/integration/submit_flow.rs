//! Raw envelope submission

use super::mock_ledger::{service_on, xlm, MockLedger};
use pretty_assertions::assert_eq;
use starter_payments::keypair::signing_key_from_secret;
use starter_payments::transaction::{decode_envelope, envelope_hash};
use starter_payments::{
    ClientError, NetworkConfig, PaymentIntent, PaymentService, SignedTransaction, StellarService,
    TransactionBuilder,
};
use std::sync::Arc;

/// Sign a payment offline against the ledger's current state
async fn sign_offline(
    service: &StellarService,
    sender: &starter_payments::Keypair,
    receiver: &str,
    amount: &str,
) -> SignedTransaction {
    let account = service
        .horizon()
        .get_account(sender.public_address())
        .await
        .unwrap();
    let intent = PaymentIntent::new(sender.public_address(), sender.secret_key(), receiver, amount);
    PaymentService::with_horizon(service.horizon().clone())
        .build_signed(&intent, &account)
        .unwrap()
}

#[tokio::test]
async fn test_externally_signed_envelope_is_forwarded_verbatim() {
    let ledger = Arc::new(MockLedger::new("Submit Network"));
    let service = service_on(&ledger);
    let alice = service.create_account();
    let bob = service.create_account();
    ledger.add_account(alice.public_address(), xlm(20));
    ledger.add_account(bob.public_address(), xlm(1));

    let signed = sign_offline(&service, &alice, bob.public_address(), "4").await;

    let result = service.submit_transaction(&signed.envelope_xdr).await;
    assert_eq!(result.hash(), Some(signed.hash.as_str()));
    assert_eq!(ledger.submitted(), vec![signed.envelope_xdr.clone()]);
    assert_eq!(ledger.native_stroops(bob.public_address()), Some(xlm(5)));
}

#[tokio::test]
async fn test_malformed_envelope_never_sent() {
    let ledger = Arc::new(MockLedger::new("Submit Network"));
    let service = service_on(&ledger);

    for envelope in ["", "not-base64!", "aGVsbG8gd29ybGQ="] {
        let result = service.submit_transaction(envelope).await;
        assert!(
            matches!(result.error(), Some(ClientError::MalformedEnvelope(_))),
            "envelope {:?} gave {:?}",
            envelope,
            result
        );
    }
    assert_eq!(ledger.calls(), 0);
}

#[tokio::test]
async fn test_replayed_envelope_is_rejected_with_bad_seq() {
    let ledger = Arc::new(MockLedger::new("Submit Network"));
    let service = service_on(&ledger);
    let alice = service.create_account();
    let bob = service.create_account();
    ledger.add_account(alice.public_address(), xlm(20));
    ledger.add_account(bob.public_address(), xlm(1));

    let signed = sign_offline(&service, &alice, bob.public_address(), "1").await;

    assert!(service.submit_transaction(&signed.envelope_xdr).await.is_success());
    let replay = service.submit_transaction(&signed.envelope_xdr).await;

    let codes = replay.error().and_then(|e| e.result_codes()).cloned();
    assert_eq!(codes.and_then(|c| c.transaction), Some("tx_bad_seq".to_string()));
    assert_eq!(ledger.native_stroops(bob.public_address()), Some(xlm(2)));
}

#[tokio::test]
async fn test_envelope_signed_for_other_network_is_rejected() {
    let ledger = Arc::new(MockLedger::new("Network B"));
    let service = service_on(&ledger);
    let alice = service.create_account();
    let bob = service.create_account();
    ledger.add_account(alice.public_address(), xlm(20));
    ledger.add_account(bob.public_address(), xlm(1));
    let sequence = ledger.sequence(alice.public_address()).unwrap();

    // Signed offline for network A
    let config_a = NetworkConfig::custom("Network A", "http://unused.test");
    let key = signing_key_from_secret(alice.secret_key()).unwrap();
    let signed = TransactionBuilder::from_sequence(&config_a, alice.public_address(), sequence)
        .payment_native(bob.public_address(), "1")
        .build()
        .unwrap()
        .sign(&key, &config_a.passphrase)
        .unwrap();

    // The hash only matches under the signing network
    let envelope = decode_envelope(&signed.envelope_xdr).unwrap();
    assert_eq!(
        hex::encode(envelope_hash(&envelope, "Network A").unwrap()),
        signed.hash
    );
    assert_ne!(
        hex::encode(envelope_hash(&envelope, "Network B").unwrap()),
        signed.hash
    );

    let result = service.submit_transaction(&signed.envelope_xdr).await;
    match result.error() {
        Some(ClientError::TransactionRejected(codes)) => {
            assert_eq!(codes.transaction.as_deref(), Some("tx_bad_auth"));
        }
        other => panic!("expected rejection, got {:?}", other),
    }
    assert_eq!(ledger.native_stroops(bob.public_address()), Some(xlm(1)));
}

#[tokio::test]
async fn test_unreachable_ledger_is_network_unavailable() {
    let ledger = Arc::new(MockLedger::new("Submit Network"));
    let service = service_on(&ledger);
    let alice = service.create_account();
    let bob = service.create_account();
    ledger.add_account(alice.public_address(), xlm(20));

    let signed = sign_offline(&service, &alice, bob.public_address(), "1").await;
    ledger.set_offline(true);

    let result = service.submit_transaction(&signed.envelope_xdr).await;
    assert!(matches!(result.error(), Some(ClientError::NetworkUnavailable(_))));
}

#[tokio::test]
async fn test_unreadable_success_reports_unknown_outcome() {
    let ledger = Arc::new(MockLedger::new("Submit Network"));
    let service = service_on(&ledger);
    let alice = service.create_account();
    let bob = service.create_account();
    ledger.add_account(alice.public_address(), xlm(20));
    ledger.add_account(bob.public_address(), xlm(1));

    let signed = sign_offline(&service, &alice, bob.public_address(), "1").await;
    // 2xx without a hash in the body
    ledger.set_submit_status(200);

    let result = service.submit_transaction(&signed.envelope_xdr).await;
    match result.error() {
        Some(ClientError::SubmissionFailed(cause)) => assert!(cause.contains("outcome unknown")),
        other => panic!("expected submission failure, got {:?}", other),
    }
    assert_eq!(ledger.submitted().len(), 1);
}
