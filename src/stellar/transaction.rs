//! Payment transaction building, hashing, and envelope encoding.
//!
//! # Responsibilities
//! - Build single-operation native payments with a fixed validity window
//! - Encode/decode transaction envelopes as base64 XDR
//! - Compute the network-bound transaction hash that gets signed

use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};
use stellar_xdr::curr::{
    Asset, Hash, Limits, Memo, Operation, OperationBody, PaymentOp, Preconditions, ReadXdr,
    SequenceNumber, TimeBounds, TimePoint, Transaction, TransactionEnvelope, TransactionExt,
    TransactionSignaturePayload, TransactionSignaturePayloadTaggedTransaction,
    TransactionV1Envelope, VecM, WriteXdr,
};

use crate::stellar::types::{
    Account, AccountId, Amount, NetworkConfig, StellarError, StellarResult,
};

/// Builder for native-asset payment transactions.
#[derive(Debug, Clone)]
pub struct PaymentBuilder {
    base_fee: u32,
    timeout_secs: u64,
}

impl PaymentBuilder {
    /// Create a builder using the configured fee and validity window.
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            base_fee: config.base_fee,
            timeout_secs: config.tx_timeout_secs,
        }
    }

    /// Build a payment valid from now until now + timeout.
    pub fn build(
        &self,
        source: &Account,
        destination: &AccountId,
        amount: Amount,
    ) -> StellarResult<Transaction> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.build_at(source, destination, amount, now)
    }

    /// Build a payment whose validity window starts at `now` (unix seconds).
    pub fn build_at(
        &self,
        source: &Account,
        destination: &AccountId,
        amount: Amount,
        now: u64,
    ) -> StellarResult<Transaction> {
        if !amount.is_positive() {
            return Err(StellarError::InvalidAmount(amount.to_string()));
        }

        let seq_num = source
            .sequence
            .checked_add(1)
            .ok_or_else(|| StellarError::Xdr("sequence number overflow".to_string()))?;

        let payment = Operation {
            source_account: None,
            body: OperationBody::Payment(PaymentOp {
                destination: destination.to_muxed(),
                asset: Asset::Native,
                amount: amount.stroops(),
            }),
        };
        let operations: VecM<Operation, 100> = vec![payment].try_into()?;

        Ok(Transaction {
            source_account: source.account_id.to_muxed(),
            fee: self.base_fee.saturating_mul(operations.len() as u32),
            seq_num: SequenceNumber(seq_num),
            cond: Preconditions::Time(TimeBounds {
                min_time: TimePoint(0),
                max_time: TimePoint(now.saturating_add(self.timeout_secs)),
            }),
            memo: Memo::None,
            operations,
            ext: TransactionExt::V0,
        })
    }
}

/// Wrap an unsigned transaction into a v1 envelope.
pub fn envelope(tx: Transaction) -> TransactionEnvelope {
    TransactionEnvelope::Tx(TransactionV1Envelope {
        tx,
        signatures: VecM::default(),
    })
}

/// Serialize an envelope to base64 XDR.
pub fn encode_envelope(envelope: &TransactionEnvelope) -> StellarResult<String> {
    Ok(envelope.to_xdr_base64(Limits::none())?)
}

/// Parse a base64 XDR envelope.
pub fn decode_envelope(xdr: &str) -> StellarResult<TransactionEnvelope> {
    Ok(TransactionEnvelope::from_xdr_base64(xdr.trim(), Limits::none())?)
}

/// Network id: sha256 of the passphrase.
pub fn network_id(passphrase: &str) -> Hash {
    Hash(Sha256::digest(passphrase.as_bytes()).into())
}

/// Hash a transaction is signed over under the given network.
pub fn transaction_hash(tx: &Transaction, passphrase: &str) -> StellarResult<[u8; 32]> {
    let payload = TransactionSignaturePayload {
        network_id: network_id(passphrase),
        tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
    };
    let bytes = payload.to_xdr(Limits::none())?;
    Ok(Sha256::digest(&bytes).into())
}

/// The payment carried by an envelope, flattened for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSummary {
    pub source: AccountId,
    pub sequence: i64,
    pub fee: u32,
    pub destination: AccountId,
    pub amount: Amount,
    pub native: bool,
    pub max_time: u64,
    pub operation_count: usize,
    pub signature_count: usize,
}

/// Extract the single payment from a v1 envelope.
pub fn inspect_payment(envelope: &TransactionEnvelope) -> StellarResult<PaymentSummary> {
    let TransactionEnvelope::Tx(v1) = envelope else {
        return Err(StellarError::Xdr("expected a v1 transaction envelope".to_string()));
    };
    let tx = &v1.tx;

    let payment = tx
        .operations
        .iter()
        .find_map(|op| match &op.body {
            OperationBody::Payment(payment) => Some(payment),
            _ => None,
        })
        .ok_or_else(|| StellarError::Xdr("envelope carries no payment".to_string()))?;

    let max_time = match &tx.cond {
        Preconditions::Time(bounds) => bounds.max_time.0,
        _ => 0,
    };

    Ok(PaymentSummary {
        source: AccountId::try_from(&tx.source_account)?,
        sequence: tx.seq_num.0,
        fee: tx.fee,
        destination: AccountId::try_from(&payment.destination)?,
        amount: Amount::from_stroops(payment.amount),
        native: matches!(payment.asset, Asset::Native),
        max_time,
        operation_count: tx.operations.len(),
        signature_count: v1.signatures.len(),
    })
}
