//! Altered-account indexing.
//!
//! After a block commits, the node hands the indexer the set of accounts the
//! block touched. The indexer loads each account, splits the set into
//! native-balance entries and token-balance entries, and produces the maps
//! an external search backend ingests: one keyed by address, and a history
//! map keyed by address and timestamp.
//!
//! Consensus does not depend on this crate; it is a node subsystem fed by
//! the committed-block pipeline.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Decimal digits kept when projecting a balance to a float.
const FLOAT_BALANCE_DECIMALS: i32 = 10;

/// Indexer-side failures.
#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("cannot decode address: {0}")]
    DecodeAddress(String),

    #[error("account not found")]
    AccountNotFound,
}

/// Flags describing why an account appears in a block's altered set.
#[derive(Debug, Clone, Default)]
pub struct AlteredAccount {
    /// The account sent a token transfer in this block.
    pub is_token_sender: bool,
    /// The account was part of a token operation in this block.
    pub is_token_operation: bool,
    /// Token touched by the operation, empty for native-only changes.
    pub token_identifier: String,
}

/// A loaded user account.
#[derive(Debug, Clone, Default)]
pub struct UserAccount {
    /// Raw address bytes.
    pub address: Vec<u8>,
    /// Account nonce.
    pub nonce: u64,
    /// Native balance, smallest denomination.
    pub balance: u128,
    /// Token balances by identifier: value and hex-encoded properties.
    pub tokens: HashMap<String, (u128, String)>,
}

/// A user account paired with the token the block touched.
#[derive(Debug, Clone)]
pub struct TokenAccount {
    pub account: UserAccount,
    pub token_identifier: String,
}

/// An indexable account snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountInfo {
    pub address: String,
    pub nonce: u64,
    pub balance: String,
    pub balance_num: f64,
    pub token_identifier: String,
    pub properties: String,
}

/// A point-in-time balance record.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountBalanceHistory {
    pub address: String,
    pub balance: String,
    pub timestamp: u64,
    pub token_identifier: String,
}

/// Address encoding seam.
pub trait PubkeyConverter: Send + Sync {
    fn decode(&self, address: &str) -> Result<Vec<u8>, IndexerError>;
    fn encode(&self, bytes: &[u8]) -> String;
}

/// Hex-string addresses.
#[derive(Debug, Default, Clone, Copy)]
pub struct HexPubkeyConverter;

impl PubkeyConverter for HexPubkeyConverter {
    fn decode(&self, address: &str) -> Result<Vec<u8>, IndexerError> {
        hex::decode(address).map_err(|e| IndexerError::DecodeAddress(e.to_string()))
    }

    fn encode(&self, bytes: &[u8]) -> String {
        hex::encode(bytes)
    }
}

/// Account storage seam.
pub trait AccountsAdapter: Send + Sync {
    fn load_account(&self, address: &[u8]) -> Result<UserAccount, IndexerError>;
}

/// Produces indexable account maps from a block's altered-account set.
pub struct AccountsIndexer {
    denomination_divider: f64,
    balance_precision: f64,
    converter: Arc<dyn PubkeyConverter>,
    accounts: Arc<dyn AccountsAdapter>,
}

impl AccountsIndexer {
    /// Create an indexer for balances denominated with `denomination`
    /// decimal places.
    pub fn new(
        denomination: u32,
        converter: Arc<dyn PubkeyConverter>,
        accounts: Arc<dyn AccountsAdapter>,
    ) -> Self {
        AccountsIndexer {
            denomination_divider: 10f64.powi(denomination as i32),
            balance_precision: 10f64.powi(FLOAT_BALANCE_DECIMALS),
            converter,
            accounts,
        }
    }

    /// Load the altered accounts and split them into native-balance and
    /// token-balance groups.
    ///
    /// Accounts that fail to decode or load are logged and skipped. Every
    /// loaded account lands in the native group; the token group
    /// additionally receives those flagged as token operations. The
    /// `is_token_sender` flag only affects grouping in the caller's logs,
    /// not which lists the account joins.
    pub fn get_accounts(
        &self,
        altered: &HashMap<String, AlteredAccount>,
    ) -> (Vec<UserAccount>, Vec<TokenAccount>) {
        let mut native = Vec::new();
        let mut tokens = Vec::new();

        for (address, info) in altered {
            let address_bytes = match self.converter.decode(address) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(address = %address, error = %e, "cannot decode address");
                    continue;
                }
            };

            let account = match self.accounts.load_account(&address_bytes) {
                Ok(account) => account,
                Err(e) => {
                    warn!(address = %address, error = %e, "cannot load account");
                    continue;
                }
            };

            if info.is_token_operation {
                tokens.push(TokenAccount {
                    account: account.clone(),
                    token_identifier: info.token_identifier.clone(),
                });
            }

            if info.is_token_sender {
                native.push(account);
                continue;
            }

            native.push(account);
        }

        (native, tokens)
    }

    /// Index map for native balances, keyed by encoded address.
    pub fn native_accounts_map(&self, accounts: &[UserAccount]) -> HashMap<String, AccountInfo> {
        accounts
            .iter()
            .map(|account| {
                let address = self.converter.encode(&account.address);
                let info = AccountInfo {
                    address: String::new(),
                    nonce: account.nonce,
                    balance: account.balance.to_string(),
                    balance_num: self.balance_as_float(account.balance),
                    token_identifier: String::new(),
                    properties: String::new(),
                };
                (address, info)
            })
            .collect()
    }

    /// Index map for token balances, keyed by encoded address.
    ///
    /// Accounts whose touched token cannot be resolved are indexed with a
    /// zero balance rather than dropped.
    pub fn token_accounts_map(&self, accounts: &[TokenAccount]) -> HashMap<String, AccountInfo> {
        accounts
            .iter()
            .map(|entry| {
                let address = self.converter.encode(&entry.account.address);
                let (balance, properties) = entry
                    .account
                    .tokens
                    .get(&entry.token_identifier)
                    .cloned()
                    .unwrap_or((0, String::new()));

                let info = AccountInfo {
                    address: address.clone(),
                    nonce: entry.account.nonce,
                    balance: balance.to_string(),
                    balance_num: self.balance_as_float(balance),
                    token_identifier: entry.token_identifier.clone(),
                    properties,
                };
                (address, info)
            })
            .collect()
    }

    /// History map for the given snapshot, keyed `"{address}_{timestamp}"`.
    pub fn accounts_history(
        &self,
        accounts: &HashMap<String, AccountInfo>,
        timestamp: u64,
    ) -> HashMap<String, AccountBalanceHistory> {
        accounts
            .iter()
            .map(|(address, info)| {
                let record = AccountBalanceHistory {
                    address: address.clone(),
                    balance: info.balance.clone(),
                    timestamp,
                    token_identifier: info.token_identifier.clone(),
                };
                (format!("{}_{}", address, timestamp), record)
            })
            .collect()
    }

    /// Project a raw balance to a float with [`FLOAT_BALANCE_DECIMALS`]
    /// digits of precision, clamped at zero.
    pub fn balance_as_float(&self, balance: u128) -> f64 {
        let scaled = balance as f64 / self.denomination_divider;
        let rounded = (scaled * self.balance_precision).round() / self.balance_precision;
        rounded.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct InMemoryAccounts {
        accounts: HashMap<Vec<u8>, UserAccount>,
    }

    impl AccountsAdapter for InMemoryAccounts {
        fn load_account(&self, address: &[u8]) -> Result<UserAccount, IndexerError> {
            self.accounts
                .get(address)
                .cloned()
                .ok_or(IndexerError::AccountNotFound)
        }
    }

    fn account(address: &[u8], balance: u128) -> UserAccount {
        UserAccount {
            address: address.to_vec(),
            nonce: 3,
            balance,
            tokens: HashMap::new(),
        }
    }

    fn indexer_with(accounts: Vec<UserAccount>) -> AccountsIndexer {
        let mut adapter = InMemoryAccounts::default();
        for acc in accounts {
            adapter.accounts.insert(acc.address.clone(), acc);
        }
        AccountsIndexer::new(18, Arc::new(HexPubkeyConverter), Arc::new(adapter))
    }

    #[test]
    fn test_balance_as_float() {
        let indexer = indexer_with(vec![]);
        assert_eq!(indexer.balance_as_float(1_500_000_000_000_000_000), 1.5);
        assert_eq!(indexer.balance_as_float(0), 0.0);
        // Rounded to ten decimals.
        assert_eq!(indexer.balance_as_float(1), 0.0);
    }

    #[test]
    fn test_get_accounts_grouping() {
        let addr = vec![0xaa; 4];
        let mut acc = account(&addr, 100);
        acc.tokens.insert("TKN-01".into(), (42, "0b".into()));
        let indexer = indexer_with(vec![acc]);

        let altered = HashMap::from([(
            "aaaaaaaa".to_string(),
            AlteredAccount {
                is_token_sender: false,
                is_token_operation: true,
                token_identifier: "TKN-01".into(),
            },
        )]);

        let (native, tokens) = indexer.get_accounts(&altered);
        // A token operation lands in both groups: native balance still
        // changed (fees), token balance is indexed separately.
        assert_eq!(native.len(), 1);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token_identifier, "TKN-01");
    }

    #[test]
    fn test_get_accounts_sender_flag_only_affects_grouping() {
        let addr = vec![0xbb; 4];
        let indexer = indexer_with(vec![account(&addr, 5)]);

        let altered = HashMap::from([(
            "bbbbbbbb".to_string(),
            AlteredAccount {
                is_token_sender: true,
                is_token_operation: false,
                token_identifier: String::new(),
            },
        )]);

        let (native, tokens) = indexer.get_accounts(&altered);
        assert_eq!(native.len(), 1);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_get_accounts_skips_undecodable_and_missing() {
        let indexer = indexer_with(vec![]);

        let altered = HashMap::from([
            ("not-hex!".to_string(), AlteredAccount::default()),
            ("cccccccc".to_string(), AlteredAccount::default()),
        ]);

        let (native, tokens) = indexer.get_accounts(&altered);
        assert!(native.is_empty());
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_native_accounts_map() {
        let addr = vec![0xaa; 4];
        let indexer = indexer_with(vec![]);
        let map = indexer.native_accounts_map(&[account(&addr, 2_000_000_000_000_000_000)]);

        let info = map.get("aaaaaaaa").expect("indexed by encoded address");
        assert_eq!(info.nonce, 3);
        assert_eq!(info.balance, "2000000000000000000");
        assert_eq!(info.balance_num, 2.0);
    }

    #[test]
    fn test_token_accounts_map_resolves_token_balance() {
        let addr = vec![0xdd; 4];
        let mut acc = account(&addr, 0);
        acc.tokens.insert("TKN-01".into(), (7, "beef".into()));
        let indexer = indexer_with(vec![]);

        let map = indexer.token_accounts_map(&[TokenAccount {
            account: acc,
            token_identifier: "TKN-01".into(),
        }]);

        let info = map.get("dddddddd").unwrap();
        assert_eq!(info.balance, "7");
        assert_eq!(info.token_identifier, "TKN-01");
        assert_eq!(info.properties, "beef");
    }

    #[test]
    fn test_accounts_history_key_format() {
        let indexer = indexer_with(vec![]);
        let snapshot = HashMap::from([(
            "aabb".to_string(),
            AccountInfo {
                balance: "9".into(),
                ..AccountInfo::default()
            },
        )]);

        let history = indexer.accounts_history(&snapshot, 1_234);
        let record = history.get("aabb_1234").expect("address_timestamp key");
        assert_eq!(record.balance, "9");
        assert_eq!(record.timestamp, 1_234);
    }
}
