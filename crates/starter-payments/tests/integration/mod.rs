//! Integration Tests Module
//!
//! Test categories:
//! - `keypair_flow`: key generation and import
//! - `query_flow`: account lookup and balance normalization
//! - `faucet_flow`: Friendbot funding outcomes
//! - `payment_flow`: build, sign, submit and classify payments
//! - `submit_flow`: raw envelope submission
//! - `contract_flow`: contract client binding
//! - `mock_ledger`: the shared in-process ledger

mod mock_ledger;

mod submit_flow;
