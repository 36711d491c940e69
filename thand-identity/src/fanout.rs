//! `GetIdentity` (§4.E): colon-prefixed dispatch, else parallel fan-out with
//! first-non-nil-wins and close-once cancellation of stragglers.
//!
//! Grounded on `r2e-events::local::LocalEventBus`'s `tokio::spawn`-per-handler
//! dispatch, generalized from "all handlers" to "first handler wins, cancel
//! the rest" using a [`tokio_util::sync::CancellationToken`] as the
//! close-once signal (§5 "Cancellation").

use thand_core::{Identity, Principal, User};
use thand_providers::{Capability, ProviderError, ProviderSet};
use tokio_util::sync::CancellationToken;

/// Resolves one identity by key.
///
/// - `provider:key` dispatches only to the named provider; an unknown
///   provider fails with [`ProviderError::ProviderNotFound`].
/// - A bare key fans out to every identity-capable provider in parallel; the
///   first `Some` result wins and the rest are cancelled cooperatively.
/// - If no identity-capable provider exists, or every worker returns `None`
///   or errors, a fallback identity is synthesized from `key` (S5).
pub async fn get_identity(providers: &ProviderSet, key: &str) -> Result<Identity, ProviderError> {
    if let Some((provider_name, rest)) = key.split_once(':') {
        let active = providers
            .get(provider_name)
            .ok_or_else(|| ProviderError::ProviderNotFound(provider_name.to_string()))?;
        return Ok(active
            .adapter
            .get_identity(rest)
            .await?
            .unwrap_or_else(|| synthesize_fallback(rest)));
    }

    let workers: Vec<_> = providers.with_capability(Capability::Identities).collect();
    if workers.is_empty() {
        return Ok(synthesize_fallback(key));
    }

    let token = CancellationToken::new();
    let (tx, mut rx) = tokio::sync::mpsc::channel::<Identity>(1);

    let mut handles = Vec::with_capacity(workers.len());
    for active in workers {
        let adapter = active.adapter.clone();
        let tx = tx.clone();
        let token = token.clone();
        let key = key.to_string();
        handles.push(tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => return,
                r = adapter.get_identity(&key) => r,
            };
            if let Ok(Some(identity)) = result {
                // A closed receiver (another worker already won) makes this a
                // no-op; the send failing is exactly the "late arrival falls
                // through" behavior described in §5.
                let _ = tx.send(identity).await;
            }
        }));
    }
    drop(tx);

    let winner = rx.recv().await;
    token.cancel();
    for handle in handles {
        handle.abort();
    }

    Ok(winner.unwrap_or_else(|| synthesize_fallback(key)))
}

fn synthesize_fallback(identifier: &str) -> Identity {
    let username = identifier.split('@').next().unwrap_or(identifier).to_string();
    Identity {
        id: identifier.to_string(),
        label: identifier.to_string(),
        principal: Principal::User(User {
            id: identifier.to_string(),
            email: identifier.to_string(),
            username,
            source: String::new(),
            ..Default::default()
        }),
        provider_refs: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use thand_core::Provider;
    use thand_providers::test_support::MockAdapter;

    #[tokio::test]
    async fn s5_fallback_identity_when_no_providers() {
        let providers = ProviderSet::default();
        let identity = get_identity(&providers, "john.doe@example.com").await.unwrap();
        let user = identity.user().unwrap();
        assert_eq!(user.email, "john.doe@example.com");
        assert_eq!(user.username, "john.doe");
    }

    #[tokio::test]
    async fn prefixed_key_dispatches_to_named_provider_only() {
        let adapter = MockAdapter::new("aws-prod", vec![Capability::Identities]);
        adapter.identities.lock().unwrap().push(Identity {
            id: "u1".into(),
            label: "u1".into(),
            principal: Principal::User(User { id: "u1".into(), ..Default::default() }),
            provider_refs: vec![],
        });
        let mut providers = ProviderSet::default();
        providers.insert_for_test(
            "aws-prod",
            Provider { name: "aws-prod".into(), engine: "aws".into(), enabled: true, ..Default::default() },
            Arc::new(adapter),
        );

        let identity = get_identity(&providers, "aws-prod:u1").await.unwrap();
        assert_eq!(identity.id, "u1");
    }

    #[tokio::test]
    async fn prefixed_key_with_unknown_provider_fails() {
        let providers = ProviderSet::default();
        let err = get_identity(&providers, "nope:u1").await.unwrap_err();
        assert!(matches!(err, ProviderError::ProviderNotFound(p) if p == "nope"));
    }

    #[tokio::test]
    async fn fan_out_returns_the_one_provider_that_has_it() {
        let empty = MockAdapter::new("empty", vec![Capability::Identities]);
        let full = MockAdapter::new("full", vec![Capability::Identities]);
        full.identities.lock().unwrap().push(Identity {
            id: "u1".into(),
            label: "u1".into(),
            principal: Principal::User(User { id: "u1".into(), ..Default::default() }),
            provider_refs: vec![],
        });

        let mut providers = ProviderSet::default();
        providers.insert_for_test(
            "empty",
            Provider { name: "empty".into(), engine: "x".into(), enabled: true, ..Default::default() },
            Arc::new(empty),
        );
        providers.insert_for_test(
            "full",
            Provider { name: "full".into(), engine: "y".into(), enabled: true, ..Default::default() },
            Arc::new(full),
        );

        let identity = get_identity(&providers, "u1").await.unwrap();
        assert_eq!(identity.id, "u1");
    }
}
