//! In-process ledger speaking the Horizon and Friendbot HTTP shapes.
//!
//! Accounts live in a map of address -> (sequence, native stroops).
//! Submissions are verified the way a validator would: the envelope must
//! be signed by its source for *this* ledger's passphrase and must use the
//! next sequence number. Every request is counted so tests can assert that
//! local failures never reach the network.

use async_trait::async_trait;
use serde_json::json;
use starter_payments::amount::format_stroops;
use starter_payments::keypair::decode_account_address;
use starter_payments::transaction::{
    decode_envelope, envelope_hash, is_signed_by, payment_summaries, source_and_operations,
};
use starter_payments::{
    ClientError, HttpResponse, HttpTransport, Network, NetworkConfig, StellarService,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use stellar_xdr::curr::TransactionEnvelope;

pub const HORIZON_URL: &str = "http://horizon.ledger.test";
pub const FRIENDBOT_URL: &str = "http://friendbot.ledger.test";

/// Starting balance Friendbot hands out: 10,000 XLM
pub const FRIENDBOT_STROOPS: i64 = 10_000 * 10_000_000;

pub fn xlm(units: i64) -> i64 {
    units * 10_000_000
}

/// Service wired to `ledger` with the ledger's own passphrase
pub fn service_on(ledger: &Arc<MockLedger>) -> StellarService {
    service_with(ledger, ledger.config())
}

/// Service wired to `ledger` with an arbitrary configuration
pub fn service_with(ledger: &Arc<MockLedger>, config: NetworkConfig) -> StellarService {
    let transport: Arc<dyn HttpTransport> = ledger.clone();
    StellarService::with_transport(config, transport)
}

#[derive(Debug, Clone)]
struct LedgerAccount {
    sequence: i64,
    native: i64,
    issued: Vec<(String, String)>,
}

pub struct MockLedger {
    passphrase: String,
    accounts: Mutex<HashMap<String, LedgerAccount>>,
    submitted: Mutex<Vec<String>>,
    calls: AtomicUsize,
    offline: AtomicBool,
    garbled_accounts: AtomicBool,
    faucet_status: AtomicU16,
    submit_status: AtomicU16,
}

impl MockLedger {
    pub fn new(passphrase: &str) -> Self {
        Self {
            passphrase: passphrase.to_string(),
            accounts: Mutex::new(HashMap::new()),
            submitted: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            offline: AtomicBool::new(false),
            garbled_accounts: AtomicBool::new(false),
            faucet_status: AtomicU16::new(200),
            submit_status: AtomicU16::new(0),
        }
    }

    /// Test-network configuration pointing at this ledger
    pub fn config(&self) -> NetworkConfig {
        let mut config =
            NetworkConfig::custom(&self.passphrase, HORIZON_URL).with_faucet_url(FRIENDBOT_URL);
        config.network = Network::Test;
        config
    }

    pub fn add_account(&self, address: &str, native_stroops: i64) {
        self.accounts.lock().unwrap().insert(
            address.to_string(),
            LedgerAccount {
                sequence: 4_294_967_296,
                native: native_stroops,
                issued: Vec::new(),
            },
        );
    }

    pub fn add_issued_balance(&self, address: &str, code: &str, amount: &str) {
        if let Some(account) = self.accounts.lock().unwrap().get_mut(address) {
            account.issued.push((code.to_string(), amount.to_string()));
        }
    }

    pub fn native_stroops(&self, address: &str) -> Option<i64> {
        self.accounts.lock().unwrap().get(address).map(|a| a.native)
    }

    pub fn sequence(&self, address: &str) -> Option<i64> {
        self.accounts.lock().unwrap().get(address).map(|a| a.sequence)
    }

    /// Number of HTTP requests received
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Envelopes received on the submission endpoint, verbatim
    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    /// Fail every request at the transport level
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Answer account lookups with a non-JSON body
    pub fn set_garbled_accounts(&self, garbled: bool) {
        self.garbled_accounts.store(garbled, Ordering::SeqCst);
    }

    pub fn set_faucet_status(&self, status: u16) {
        self.faucet_status.store(status, Ordering::SeqCst);
    }

    /// Force every submission to fail with `status` and no result codes
    pub fn set_submit_status(&self, status: u16) {
        self.submit_status.store(status, Ordering::SeqCst);
    }

    fn account_response(&self, address: &str) -> HttpResponse {
        if self.garbled_accounts.load(Ordering::SeqCst) {
            return HttpResponse::new(200, "<html>gateway</html>");
        }

        let accounts = self.accounts.lock().unwrap();
        let Some(account) = accounts.get(address) else {
            return HttpResponse::new(
                404,
                json!({
                    "type": "https://stellar.org/horizon-errors/not_found",
                    "title": "Resource Missing",
                    "status": 404
                })
                .to_string(),
            );
        };

        let mut balances: Vec<_> = account
            .issued
            .iter()
            .map(|(code, amount)| {
                json!({
                    "balance": amount,
                    "asset_type": "credit_alphanum4",
                    "asset_code": code,
                    "asset_issuer": "GISSUER"
                })
            })
            .collect();
        balances.push(json!({
            "balance": format_stroops(account.native),
            "asset_type": "native"
        }));

        HttpResponse::new(
            200,
            json!({
                "id": address,
                "account_id": address,
                "sequence": account.sequence.to_string(),
                "balances": balances
            })
            .to_string(),
        )
    }

    fn friendbot_response(&self, url: &str) -> HttpResponse {
        let status = self.faucet_status.load(Ordering::SeqCst);
        if status != 200 {
            return HttpResponse::new(status, json!({ "title": "Friendbot declined" }).to_string());
        }

        let address = url::Url::parse(url).ok().and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == "addr")
                .map(|(_, v)| v.into_owned())
        });
        let Some(address) = address else {
            return HttpResponse::new(400, json!({ "title": "Bad Request" }).to_string());
        };

        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&address) {
            return HttpResponse::new(
                400,
                json!({ "title": "Transaction Failed", "detail": "account already funded" })
                    .to_string(),
            );
        }
        accounts.insert(
            address,
            LedgerAccount {
                sequence: 4_294_967_296,
                native: FRIENDBOT_STROOPS,
                issued: Vec::new(),
            },
        );
        HttpResponse::new(200, json!({ "successful": true }).to_string())
    }

    fn submit_response(&self, envelope_xdr: &str) -> HttpResponse {
        self.submitted.lock().unwrap().push(envelope_xdr.to_string());

        let forced = self.submit_status.load(Ordering::SeqCst);
        if forced != 0 {
            return HttpResponse::new(
                forced,
                json!({ "title": "Service Unavailable", "status": forced }).to_string(),
            );
        }

        let Ok(envelope) = decode_envelope(envelope_xdr) else {
            return HttpResponse::new(
                400,
                json!({ "title": "Transaction Malformed", "status": 400 }).to_string(),
            );
        };
        let TransactionEnvelope::Tx(v1) = &envelope else {
            return rejected("tx_not_supported", &[]);
        };

        let (source, _) = source_and_operations(&envelope);
        let Ok(source_key) = decode_account_address(&source) else {
            return rejected("tx_bad_auth", &[]);
        };

        let mut accounts = self.accounts.lock().unwrap();
        let Some(current) = accounts.get(&source).cloned() else {
            return rejected("tx_no_source_account", &[]);
        };
        if !is_signed_by(&envelope, &self.passphrase, &source_key) {
            return rejected("tx_bad_auth", &[]);
        }
        if v1.tx.seq_num.0 != current.sequence + 1 {
            return rejected("tx_bad_seq", &[]);
        }

        let fee = i64::from(v1.tx.fee);
        let payments = payment_summaries(&envelope);
        let total: i64 = payments.iter().map(|p| p.amount_stroops).sum();
        for payment in &payments {
            if !accounts.contains_key(&payment.destination) {
                return rejected("tx_failed", &["op_no_destination"]);
            }
        }
        if current.native < total + fee {
            return rejected("tx_failed", &["op_underfunded"]);
        }

        if let Some(account) = accounts.get_mut(&source) {
            account.sequence += 1;
            account.native -= fee;
        }
        for payment in &payments {
            if let Some(account) = accounts.get_mut(&payment.source) {
                account.native -= payment.amount_stroops;
            }
            if let Some(account) = accounts.get_mut(&payment.destination) {
                account.native += payment.amount_stroops;
            }
        }

        let hash = envelope_hash(&envelope, &self.passphrase).unwrap_or_default();
        HttpResponse::new(
            200,
            json!({
                "hash": hex::encode(hash),
                "ledger": 4242,
                "successful": true,
                "envelope_xdr": envelope_xdr
            })
            .to_string(),
        )
    }
}

fn rejected(transaction: &str, operations: &[&str]) -> HttpResponse {
    HttpResponse::new(
        400,
        json!({
            "type": "https://stellar.org/horizon-errors/transaction_failed",
            "title": "Transaction Failed",
            "status": 400,
            "extras": {
                "result_codes": {
                    "transaction": transaction,
                    "operations": operations
                }
            }
        })
        .to_string(),
    )
}

#[async_trait]
impl HttpTransport for MockLedger {
    async fn get(&self, url: &str) -> starter_payments::Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::NetworkUnavailable("connection refused".to_string()));
        }

        if let Some(address) = url.strip_prefix(&format!("{}/accounts/", HORIZON_URL)) {
            return Ok(self.account_response(address));
        }
        if url.starts_with(FRIENDBOT_URL) {
            return Ok(self.friendbot_response(url));
        }
        Ok(HttpResponse::new(404, "not found"))
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> starter_payments::Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientError::NetworkUnavailable("connection refused".to_string()));
        }

        if url != format!("{}/transactions", HORIZON_URL) {
            return Ok(HttpResponse::new(404, "not found"));
        }
        match form.iter().find(|(k, _)| *k == "tx") {
            Some((_, tx)) => Ok(self.submit_response(tx)),
            None => Ok(HttpResponse::new(400, json!({ "title": "Bad Request" }).to_string())),
        }
    }
}
