//! Payment flow: account lookup, build, sign, submit.
//!
//! One call is one strictly sequential chain with exactly one submission.
//! A failure at any stage stops the chain and is returned as is. Calling
//! again after a failed submission may pay twice if the first attempt made
//! it to the ledger.

use std::sync::Arc;

use crate::donation::error::{DonationError, DonationResult};
use crate::stellar::transaction::{decode_envelope, encode_envelope, envelope, inspect_payment};
use crate::stellar::types::NetworkConfig;
use crate::stellar::{
    AccountId, Amount, HorizonClient, PaymentBuilder, SignOptions, SubmitResponse, WalletError,
    WalletProvider,
};

/// Builds and submits native payments signed by the wallet.
#[derive(Clone)]
pub struct PaymentFlow {
    horizon: HorizonClient,
    wallet: Arc<dyn WalletProvider>,
    builder: PaymentBuilder,
    network_passphrase: String,
}

impl PaymentFlow {
    pub fn new(
        horizon: HorizonClient,
        wallet: Arc<dyn WalletProvider>,
        network: &NetworkConfig,
    ) -> Self {
        Self {
            horizon,
            wallet,
            builder: PaymentBuilder::new(network),
            network_passphrase: network.network_passphrase.clone(),
        }
    }

    /// Send `amount` XLM from `sender` to `recipient`.
    pub async fn make_donation(
        &self,
        sender: &str,
        recipient: &str,
        amount: &str,
    ) -> DonationResult<SubmitResponse> {
        let source_id: AccountId = sender.parse().map_err(DonationError::AccountLookup)?;
        let destination: AccountId = recipient.parse().map_err(DonationError::Build)?;
        let amount: Amount = amount.parse().map_err(DonationError::Build)?;

        let account = self
            .horizon
            .load_account(&source_id)
            .await
            .map_err(DonationError::AccountLookup)?;

        let tx = self
            .builder
            .build(&account, &destination, amount)
            .map_err(DonationError::Build)?;
        let unsigned = encode_envelope(&envelope(tx)).map_err(DonationError::Build)?;

        tracing::info!(
            sender = %source_id,
            recipient = %destination,
            amount = %amount,
            sequence = account.sequence + 1,
            "Requesting wallet signature"
        );

        let options = SignOptions {
            network_passphrase: self.network_passphrase.clone(),
            address: sender.trim().to_string(),
        };
        let signed = self
            .wallet
            .sign_transaction(&unsigned, &options)
            .await
            .map_err(DonationError::Signing)?;

        let signed_xdr = verify_signed(&signed, &destination, amount)?;

        self.horizon
            .submit_transaction(&signed_xdr)
            .await
            .map_err(DonationError::Submission)
    }
}

/// The wallet hands back XDR; make sure it is still our payment before it
/// goes anywhere.
fn verify_signed(signed: &str, destination: &AccountId, amount: Amount) -> DonationResult<String> {
    let rejected = |reason: String| DonationError::Signing(WalletError::Rejected(reason));

    let envelope = decode_envelope(signed).map_err(|e| rejected(e.to_string()))?;
    let summary = inspect_payment(&envelope).map_err(|e| rejected(e.to_string()))?;
    if summary.destination != *destination || summary.amount != amount {
        return Err(rejected(
            "signed envelope does not match the requested payment".to_string(),
        ));
    }
    encode_envelope(&envelope).map_err(DonationError::Build)
}

impl std::fmt::Debug for PaymentFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentFlow")
            .field("horizon", &self.horizon)
            .field("builder", &self.builder)
            .field("network_passphrase", &self.network_passphrase)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stellar::{Account, StellarError, UnavailableWallet};

    const SOURCE: &str = "GAAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQDZ7H";
    const DEST: &str = "GABAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEJXA";
    const OTHER_DEST: &str = "GABQGAYDAMBQGAYDAMBQGAYDAMBQGAYDAMBQGAYDAMBQGAYDAMBQHGPC";

    fn flow(wallet: Arc<dyn WalletProvider>) -> PaymentFlow {
        // Nothing listens on port 9; these tests fail before or at the lookup
        let horizon = HorizonClient::new("http://127.0.0.1:9", 2).unwrap();
        PaymentFlow::new(horizon, wallet, &NetworkConfig::default())
    }

    #[tokio::test]
    async fn test_invalid_sender_is_lookup_failure() {
        let err = flow(Arc::new(UnavailableWallet))
            .make_donation("GNOPE", "GABAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEJXA", "5")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DonationError::AccountLookup(StellarError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_recipient_fails_before_network() {
        let err = flow(Arc::new(UnavailableWallet))
            .make_donation(
                "GAAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQDZ7H",
                "GDEST",
                "5",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DonationError::Build(StellarError::InvalidAddress(_))));
        assert!(err.to_string().starts_with("Donation failed: "));
    }

    #[tokio::test]
    async fn test_unreachable_horizon_is_lookup_failure() {
        let err = flow(Arc::new(UnavailableWallet))
            .make_donation(
                "GAAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQDZ7H",
                "GABAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEJXA",
                "5",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DonationError::AccountLookup(_)));
    }

    fn payment_xdr(destination: &str, amount: Amount) -> String {
        let account = Account {
            account_id: SOURCE.parse().unwrap(),
            sequence: 41,
        };
        let tx = PaymentBuilder::new(&NetworkConfig::default())
            .build_at(&account, &destination.parse().unwrap(), amount, 1_700_000_000)
            .unwrap();
        encode_envelope(&envelope(tx)).unwrap()
    }

    #[test]
    fn test_verify_signed_accepts_requested_payment() {
        let xdr = payment_xdr(DEST, Amount::from_xlm(5));
        let verified = verify_signed(&xdr, &DEST.parse().unwrap(), Amount::from_xlm(5)).unwrap();
        assert_eq!(verified, xdr);
    }

    #[test]
    fn test_verify_signed_rejects_tampered_envelope() {
        let requested: AccountId = DEST.parse().unwrap();

        let redirected = payment_xdr(OTHER_DEST, Amount::from_xlm(5));
        let err = verify_signed(&redirected, &requested, Amount::from_xlm(5)).unwrap_err();
        assert!(matches!(err, DonationError::Signing(WalletError::Rejected(_))));

        let inflated = payment_xdr(DEST, Amount::from_xlm(50));
        let err = verify_signed(&inflated, &requested, Amount::from_xlm(5)).unwrap_err();
        assert!(matches!(err, DonationError::Signing(WalletError::Rejected(_))));
        assert!(err.to_string().starts_with("Donation failed: "));

        let err = verify_signed("not xdr", &requested, Amount::from_xlm(5)).unwrap_err();
        assert!(matches!(err, DonationError::Signing(WalletError::Rejected(_))));
    }
}
