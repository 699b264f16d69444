use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use hestia_core::schema::SessionToken;
use tokio::sync::RwLock;

use crate::registry::{RegistryError, SessionRegistry, Subject, random_token};

use super::TOKEN_LEN;

#[derive(Clone, Default)]
pub struct InMemorySessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionToken, Subject>>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn issue(&self, subject: Subject) -> Result<SessionToken, RegistryError> {
        let mut sessions = self.sessions.write().await;

        loop {
            let token = SessionToken::issued(random_token(TOKEN_LEN));
            if !sessions.contains_key(&token) {
                sessions.insert(token.clone(), subject);
                return Ok(token);
            }
        }
    }

    async fn resolve(&self, token: &SessionToken) -> Result<Option<Subject>, RegistryError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(token).copied())
    }
}
