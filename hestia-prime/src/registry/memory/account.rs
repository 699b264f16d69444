use std::{
    collections::{HashMap, HashSet},
    ops::RangeInclusive,
    sync::Arc,
};

use async_trait::async_trait;
use hestia_core::{
    Account, AccountId,
    schema::{ActivationToken, NewAccount},
};
use rand::Rng;
use tokio::sync::RwLock;

use crate::registry::{AccountRegistry, RegistryError, random_token};

use super::TOKEN_LEN;

/// Random draws attempted before scanning the range for a free pseudonym.
const PSEUDONYM_ATTEMPTS: usize = 64;

#[derive(Clone, Default)]
pub struct InMemoryAccountRegistry {
    pub(super) accounts: Arc<RwLock<HashMap<AccountId, Account>>>,
}

impl InMemoryAccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRegistry for InMemoryAccountRegistry {
    async fn create(
        &self,
        account: NewAccount,
        pseudonyms: RangeInclusive<i64>,
    ) -> Result<Account, RegistryError> {
        let mut accounts = self.accounts.write().await;

        let taken: HashSet<i64> = accounts.values().map(|a| a.pseudonym).collect();
        let pseudonym = match account.pseudonym {
            Some(pseudonym) if taken.contains(&pseudonym) => return Err(RegistryError::Duplicate),
            Some(pseudonym) => pseudonym,
            None => free_pseudonym(&taken, &pseudonyms)?,
        };

        let activation_token = loop {
            let token = random_token(TOKEN_LEN);
            if !accounts.values().any(|a| a.activation_token == token) {
                break token;
            }
        };

        let id = AccountId(accounts.len() as u64 + 1);
        let account = Account {
            id,
            pseudonym,
            activation_token,
            location: account.location,
            activated_at: None,
        };
        accounts.insert(id, account.clone());

        Ok(account)
    }

    async fn activate(&self, token: &ActivationToken) -> Result<Account, RegistryError> {
        let mut accounts = self.accounts.write().await;

        let account = accounts
            .values_mut()
            .find(|a| &*a.activation_token == token.as_str())
            .ok_or(RegistryError::InvalidActivationToken)?;

        if account.activated_at.is_none() {
            account.activated_at = Some(jiff::Timestamp::now());
        }

        Ok(account.clone())
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>, RegistryError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&id).cloned())
    }
}

fn free_pseudonym(taken: &HashSet<i64>, range: &RangeInclusive<i64>) -> Result<i64, RegistryError> {
    let exhausted = RegistryError::PseudonymsExhausted {
        min: *range.start(),
        max: *range.end(),
    };

    let size = i128::from(*range.end()) - i128::from(*range.start()) + 1;
    if range.is_empty() || taken.len() as i128 >= size {
        return Err(exhausted);
    }

    let mut rng = rand::rng();
    for _ in 0..PSEUDONYM_ATTEMPTS {
        let candidate = rng.random_range(range.clone());
        if !taken.contains(&candidate) {
            return Ok(candidate);
        }
    }

    range
        .clone()
        .find(|candidate| !taken.contains(candidate))
        .ok_or(exhausted)
}
