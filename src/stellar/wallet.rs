//! Wallet capability and transaction signing.
//!
//! The wallet is an external collaborator: the application only asks whether
//! it is available, requests access to an address, and hands it serialized
//! envelopes to sign.
//!
//! # Security
//! - Secret seeds are loaded ONLY from environment variables
//! - Keys are never logged or serialized
//! - The wallet refuses to sign for another account or another network

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use stellar_xdr::curr::{
    DecoratedSignature, Signature as XdrSignature, SignatureHint, TransactionEnvelope,
};
use thiserror::Error;

use crate::stellar::transaction::{decode_envelope, encode_envelope, transaction_hash};
use crate::stellar::types::{AccountId, StellarError};

/// Errors reported by a wallet.
#[derive(Debug, Error)]
pub enum WalletError {
    /// No wallet is installed / configured.
    #[error("Wallet is not installed. Configure a signing key first.")]
    NotInstalled,

    /// Access was never granted to this application.
    #[error("Wallet access has not been granted")]
    NotAllowed,

    /// Asked to sign for an account the wallet does not hold.
    #[error("Wallet holds {actual}, not {expected}")]
    AddressMismatch { expected: String, actual: String },

    /// Asked to sign under a different network passphrase.
    #[error("Wallet is on '{actual}', not '{expected}'")]
    NetworkMismatch { expected: String, actual: String },

    /// The signing request was rejected.
    #[error("Signing rejected: {0}")]
    Rejected(String),

    /// The configured secret could not be loaded.
    #[error("Invalid wallet secret: {0}")]
    InvalidSecret(String),
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

/// Parameters accompanying a signing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOptions {
    /// Passphrase the transaction must be signed under.
    pub network_passphrase: String,
    /// Account expected to sign.
    pub address: String,
}

/// Signing wallet surface.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Whether a wallet is present at all.
    async fn is_connected(&self) -> bool;

    /// Whether this application has been granted access.
    async fn is_allowed(&self) -> bool;

    /// Ask for access; returns the account address on approval.
    async fn request_access(&self) -> WalletResult<String>;

    /// Currently selected account address.
    async fn get_address(&self) -> WalletResult<String>;

    /// Sign a base64 XDR envelope, returning the signed envelope.
    async fn sign_transaction(&self, xdr: &str, opts: &SignOptions) -> WalletResult<String>;
}

/// Wallet backed by a local ed25519 key pair.
pub struct KeypairWallet {
    signing_key: SigningKey,
    account_id: AccountId,
    network_passphrase: String,
    allowed: AtomicBool,
}

impl KeypairWallet {
    /// Create a wallet from an `S...` secret seed.
    ///
    /// # Security
    /// The secret is decoded and held in memory only. It is never logged.
    pub fn from_secret(secret: &str, network_passphrase: &str) -> WalletResult<Self> {
        let seed = stellar_strkey::ed25519::PrivateKey::from_string(secret.trim())
            .map_err(|_| WalletError::InvalidSecret("not an S... secret seed".to_string()))?;

        let signing_key = SigningKey::from_bytes(&seed.0);
        let account_id = AccountId::from_bytes(signing_key.verifying_key().to_bytes());

        tracing::info!(address = %account_id, "Wallet initialized");

        Ok(Self {
            signing_key,
            account_id,
            network_passphrase: network_passphrase.to_string(),
            allowed: AtomicBool::new(false),
        })
    }

    /// Load the secret seed from an environment variable.
    pub fn from_env(var: &str, network_passphrase: &str) -> WalletResult<Self> {
        let secret = std::env::var(var).map_err(|_| {
            WalletError::InvalidSecret(format!("Environment variable {} not set", var))
        })?;
        Self::from_secret(&secret, network_passphrase)
    }

    /// Account this wallet signs for.
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    fn sign_envelope(&self, xdr: &str) -> Result<String, StellarError> {
        let mut envelope = decode_envelope(xdr)?;
        let TransactionEnvelope::Tx(v1) = &mut envelope else {
            return Err(StellarError::Xdr("only v1 envelopes can be signed".to_string()));
        };

        let source = AccountId::try_from(&v1.tx.source_account)?;
        if source != self.account_id {
            return Err(StellarError::InvalidAddress(format!(
                "transaction source {} is not the wallet account",
                source
            )));
        }

        let hash = transaction_hash(&v1.tx, &self.network_passphrase)?;
        let signature = self.signing_key.sign(&hash);

        let mut signatures = v1.signatures.to_vec();
        signatures.push(DecoratedSignature {
            hint: SignatureHint(self.account_id.signature_hint()),
            signature: XdrSignature(signature.to_bytes().to_vec().try_into()?),
        });
        v1.signatures = signatures.try_into()?;

        encode_envelope(&envelope)
    }
}

#[async_trait]
impl WalletProvider for KeypairWallet {
    async fn is_connected(&self) -> bool {
        true
    }

    async fn is_allowed(&self) -> bool {
        self.allowed.load(Ordering::SeqCst)
    }

    async fn request_access(&self) -> WalletResult<String> {
        self.allowed.store(true, Ordering::SeqCst);
        Ok(self.account_id.to_string())
    }

    async fn get_address(&self) -> WalletResult<String> {
        if !self.allowed.load(Ordering::SeqCst) {
            return Err(WalletError::NotAllowed);
        }
        Ok(self.account_id.to_string())
    }

    async fn sign_transaction(&self, xdr: &str, opts: &SignOptions) -> WalletResult<String> {
        if !self.allowed.load(Ordering::SeqCst) {
            return Err(WalletError::NotAllowed);
        }

        let requested = opts.address.trim();
        if requested != self.account_id.to_string() {
            return Err(WalletError::AddressMismatch {
                expected: requested.to_string(),
                actual: self.account_id.to_string(),
            });
        }

        if opts.network_passphrase != self.network_passphrase {
            return Err(WalletError::NetworkMismatch {
                expected: opts.network_passphrase.clone(),
                actual: self.network_passphrase.clone(),
            });
        }

        let signed = self
            .sign_envelope(xdr)
            .map_err(|e| WalletError::Rejected(e.to_string()))?;
        tracing::debug!(address = %self.account_id, "Transaction signed");
        Ok(signed)
    }
}

impl std::fmt::Debug for KeypairWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeypairWallet")
            .field("address", &self.account_id.to_string())
            .field("network_passphrase", &self.network_passphrase)
            .finish_non_exhaustive()
    }
}

/// Stand-in used when no signing key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableWallet;

#[async_trait]
impl WalletProvider for UnavailableWallet {
    async fn is_connected(&self) -> bool {
        false
    }

    async fn is_allowed(&self) -> bool {
        false
    }

    async fn request_access(&self) -> WalletResult<String> {
        Err(WalletError::NotInstalled)
    }

    async fn get_address(&self) -> WalletResult<String> {
        Err(WalletError::NotInstalled)
    }

    async fn sign_transaction(&self, _xdr: &str, _opts: &SignOptions) -> WalletResult<String> {
        Err(WalletError::NotInstalled)
    }
}

/// Load the configured key-pair wallet, or the unavailable stand-in.
pub fn load_wallet(secret_env_var: &str, network_passphrase: &str) -> Arc<dyn WalletProvider> {
    match KeypairWallet::from_env(secret_env_var, network_passphrase) {
        Ok(wallet) => Arc::new(wallet),
        Err(e) => {
            tracing::warn!(error = %e, "No signing wallet available");
            Arc::new(UnavailableWallet)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TESTNET_PASSPHRASE;
    use crate::stellar::transaction::{envelope, inspect_payment, PaymentBuilder};
    use crate::stellar::types::{Account, Amount, NetworkConfig};
    use ed25519_dalek::{Verifier, VerifyingKey};

    // Seed of 32 bytes of 0x07; test use only
    const TEST_SECRET: &str = "SADQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQOBYHA4DQP54X";
    const TEST_ADDRESS: &str = "GDVEU3DD4KOFECV66VIHWEZOYX4ZKR3WV27L464SIIPOU2IUI3JCZA57";
    const DEST: &str = "GABAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEJXA";

    fn unsigned_xdr(source: &str) -> String {
        let builder = PaymentBuilder::new(&NetworkConfig::default());
        let account = Account {
            account_id: source.parse().unwrap(),
            sequence: 10,
        };
        let tx = builder
            .build_at(&account, &DEST.parse().unwrap(), Amount::from_xlm(5), 100)
            .unwrap();
        encode_envelope(&envelope(tx)).unwrap()
    }

    fn options() -> SignOptions {
        SignOptions {
            network_passphrase: TESTNET_PASSPHRASE.to_string(),
            address: TEST_ADDRESS.to_string(),
        }
    }

    #[test]
    fn test_wallet_from_secret() {
        let wallet = KeypairWallet::from_secret(TEST_SECRET, TESTNET_PASSPHRASE).unwrap();
        assert_eq!(wallet.account_id().to_string(), TEST_ADDRESS);
    }

    #[test]
    fn test_invalid_secret() {
        let result = KeypairWallet::from_secret(TEST_ADDRESS, TESTNET_PASSPHRASE);
        assert!(matches!(result, Err(WalletError::InvalidSecret(_))));
    }

    #[tokio::test]
    async fn test_access_flow() {
        let wallet = KeypairWallet::from_secret(TEST_SECRET, TESTNET_PASSPHRASE).unwrap();
        assert!(wallet.is_connected().await);
        assert!(!wallet.is_allowed().await);
        assert!(matches!(wallet.get_address().await, Err(WalletError::NotAllowed)));

        assert_eq!(wallet.request_access().await.unwrap(), TEST_ADDRESS);
        assert!(wallet.is_allowed().await);
        assert_eq!(wallet.get_address().await.unwrap(), TEST_ADDRESS);
    }

    #[tokio::test]
    async fn test_sign_transaction_appends_valid_signature() {
        let wallet = KeypairWallet::from_secret(TEST_SECRET, TESTNET_PASSPHRASE).unwrap();
        wallet.request_access().await.unwrap();

        let signed = wallet
            .sign_transaction(&unsigned_xdr(TEST_ADDRESS), &options())
            .await
            .unwrap();

        let envelope = decode_envelope(&signed).unwrap();
        assert_eq!(inspect_payment(&envelope).unwrap().signature_count, 1);

        let TransactionEnvelope::Tx(v1) = &envelope else {
            panic!("expected v1 envelope");
        };
        let decorated = &v1.signatures[0];
        assert_eq!(decorated.hint.0, wallet.account_id().signature_hint());

        let hash = transaction_hash(&v1.tx, TESTNET_PASSPHRASE).unwrap();
        let key = VerifyingKey::from_bytes(wallet.account_id().as_bytes()).unwrap();
        let bytes: [u8; 64] = decorated.signature.0.to_vec().try_into().unwrap();
        let signature = ed25519_dalek::Signature::from_bytes(&bytes);
        assert!(key.verify(&hash, &signature).is_ok());
    }

    #[tokio::test]
    async fn test_sign_requires_access() {
        let wallet = KeypairWallet::from_secret(TEST_SECRET, TESTNET_PASSPHRASE).unwrap();
        let result = wallet
            .sign_transaction(&unsigned_xdr(TEST_ADDRESS), &options())
            .await;
        assert!(matches!(result, Err(WalletError::NotAllowed)));
    }

    #[tokio::test]
    async fn test_sign_rejects_other_network() {
        let wallet = KeypairWallet::from_secret(TEST_SECRET, TESTNET_PASSPHRASE).unwrap();
        wallet.request_access().await.unwrap();

        let mut opts = options();
        opts.network_passphrase = "Public Global Stellar Network ; September 2015".to_string();
        let result = wallet.sign_transaction(&unsigned_xdr(TEST_ADDRESS), &opts).await;
        assert!(matches!(result, Err(WalletError::NetworkMismatch { .. })));
    }

    #[tokio::test]
    async fn test_sign_rejects_other_address() {
        let wallet = KeypairWallet::from_secret(TEST_SECRET, TESTNET_PASSPHRASE).unwrap();
        wallet.request_access().await.unwrap();

        let mut opts = options();
        opts.address = DEST.to_string();
        let result = wallet.sign_transaction(&unsigned_xdr(TEST_ADDRESS), &opts).await;
        assert!(matches!(result, Err(WalletError::AddressMismatch { .. })));
    }

    #[tokio::test]
    async fn test_sign_rejects_foreign_source() {
        let wallet = KeypairWallet::from_secret(TEST_SECRET, TESTNET_PASSPHRASE).unwrap();
        wallet.request_access().await.unwrap();

        let result = wallet.sign_transaction(&unsigned_xdr(DEST), &options()).await;
        assert!(matches!(result, Err(WalletError::Rejected(_))));

        let result = wallet.sign_transaction("garbage", &options()).await;
        assert!(matches!(result, Err(WalletError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_unavailable_wallet() {
        let wallet = UnavailableWallet;
        assert!(!wallet.is_connected().await);
        assert!(matches!(
            wallet.request_access().await,
            Err(WalletError::NotInstalled)
        ));
    }

    #[tokio::test]
    async fn test_load_wallet_falls_back_when_unset() {
        let wallet = load_wallet("HOPECHAIN_TEST_SECRET_THAT_IS_NOT_SET", TESTNET_PASSPHRASE);
        assert!(!wallet.is_connected().await);
    }
}
