//! Chat client construction from auth info.

use std::sync::Arc;

use codeask_llms::providers::api::ApiConfig;
use codeask_llms::providers::proxy::ProxyConfig;
use codeask_llms::{ApiClient, ChatClient, ConversationStore, ProxyClient};

use crate::config::{AuthInfo, AuthMode, RuntimeConfig};
use crate::error::{Result, RuntimeError};

/// Builds a chat client for the given credentials. The controller calls it on
/// auth changes and once more before giving up on an unauthenticated request.
pub type ClientFactory = Arc<dyn Fn(&AuthInfo) -> Result<Arc<dyn ChatClient>> + Send + Sync>;

/// Create a chat client for `auth`, applying endpoint and model overrides.
pub fn create_client(
    config: &RuntimeConfig,
    auth: &AuthInfo,
    store: &Arc<ConversationStore>,
) -> Result<Arc<dyn ChatClient>> {
    let credential = auth
        .credential()
        .ok_or(RuntimeError::AuthenticationMissing(auth.mode))?;

    match auth.mode {
        AuthMode::ApiKey => {
            let mut api = ApiConfig::new(credential);
            if let Some(url) = &config.api_base_url {
                api = api.with_base_url(url.clone());
            }
            if let Some(model) = &config.model {
                api = api.with_model(model.clone());
            }
            let client = ApiClient::new(api)?.with_store(Arc::clone(store));
            Ok(Arc::new(client))
        }
        AuthMode::AccessToken => {
            let mut proxy = ProxyConfig::new(credential);
            if let Some(url) = &config.proxy_url {
                proxy = proxy.with_url(url.clone());
            }
            if let Some(model) = &config.model {
                proxy = proxy.with_model(model.clone());
            }
            Ok(Arc::new(ProxyClient::new(proxy)?))
        }
    }
}

/// Factory over `config` whose API-key clients share one bounded message store.
pub fn client_factory(config: RuntimeConfig) -> ClientFactory {
    let store = Arc::new(ConversationStore::new());
    Arc::new(move |auth: &AuthInfo| create_client(&config, auth, &store))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_builds_api_client() {
        let factory = client_factory(RuntimeConfig::default());
        let client = factory(&AuthInfo::api_key("sk-test")).unwrap();
        assert_eq!(client.client_id(), "api");
    }

    #[test]
    fn test_access_token_builds_proxy_client() {
        let factory = client_factory(RuntimeConfig::default().with_model("m"));
        let client = factory(&AuthInfo::access_token("tok")).unwrap();
        assert_eq!(client.client_id(), "proxy");
    }

    #[test]
    fn test_missing_credential_fails() {
        let factory = client_factory(RuntimeConfig::default());
        let mut auth = AuthInfo::api_key("sk-test");
        auth.mode = AuthMode::AccessToken;

        match factory(&auth) {
            Err(RuntimeError::AuthenticationMissing(mode)) => assert_eq!(mode, AuthMode::AccessToken),
            Err(other) => panic!("Expected missing authentication, got {:?}", other),
            Ok(_) => panic!("Expected missing authentication"),
        }
    }
}
