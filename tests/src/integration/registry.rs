//! Registry loading and lookups.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use hats_modules_client::prelude::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_lookup_returns_exact_module() {
        let (client, _chain) = prepared_client().await;

        let module = client.get_module_by_id(ALLOWLIST).unwrap();
        let expected = registry()
            .modules
            .into_iter()
            .find(|m| m.name == "Allowlist Eligibility")
            .unwrap();
        assert_eq!(module, expected);
    }

    #[tokio::test]
    async fn test_lookup_ignores_address_case() {
        let (client, _chain) = prepared_client().await;

        let lower = client.get_module_by_id(&ALLOWLIST.to_lowercase()).unwrap();
        let upper = client
            .get_module_by_id(&format!("0x{}", ALLOWLIST[2..].to_uppercase()))
            .unwrap();
        assert_eq!(lower.name, "Allowlist Eligibility");
        assert_eq!(lower, upper);
    }

    #[tokio::test]
    async fn test_unknown_module_not_available() {
        let (client, _chain) = prepared_client().await;

        let err = client
            .get_module_by_id("0x0000000000000000000000000000000000000001")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModuleNotAvailable);

        let err = client.get_module_by_id("not-an-address").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModuleNotAvailable);

        let err = client.get_module_by_name("Jokerace Eligibility").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModuleNotAvailable);
    }

    #[tokio::test]
    async fn test_lookup_by_name() {
        let (client, _chain) = prepared_client().await;
        let module = client.get_module_by_name("Hat Wearing Eligibility").unwrap();
        assert_eq!(module.implementation_address, addr(HAT_WEARING));
    }

    #[tokio::test]
    async fn test_filters_hide_deprecated_by_default() {
        let (client, _chain) = prepared_client().await;

        let names: Vec<String> = client
            .get_modules(&ModuleFilter::default())
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["Allowlist Eligibility", "Hat Wearing Eligibility"]);

        let all = client
            .get_modules(&ModuleFilter {
                include_deprecated: true,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(all.len(), 3);

        let toggles = client
            .get_modules(&ModuleFilter {
                toggle: Some(true),
                include_deprecated: true,
                ..Default::default()
            })
            .unwrap();
        assert!(toggles.is_empty());
    }

    #[tokio::test]
    async fn test_available_modules_follow_active_network() {
        let (client, _chain) = prepared_client().await;
        let available: Vec<Address> = client
            .get_available_modules()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.implementation_address)
            .collect();
        assert_eq!(available, [addr(ALLOWLIST), addr(HAT_WEARING)]);

        let optimism = Arc::new(InMemoryChain::new(ChainId(OTHER_CHAIN), addr(FACTORY)));
        let client = client_for(&optimism).await;
        client.prepare(None).await.unwrap();
        let available = client.get_available_modules().await.unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].implementation_address, addr(STAKING));
    }

    #[tokio::test]
    async fn test_prepare_with_supplied_document_replaces_registry() {
        let (client, _chain) = prepared_client().await;
        assert!(client.get_module_by_id(STAKING).is_ok());

        let mut smaller = registry();
        smaller.modules.retain(|m| m.implementation_address != addr(STAKING));
        client.prepare(Some(smaller)).await.unwrap();

        let err = client.get_module_by_id(STAKING).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModuleNotAvailable);
        assert_eq!(client.registry().unwrap().modules().len(), 2);
    }

    #[tokio::test]
    async fn test_prepare_rejects_malformed_argument_type() {
        let chain = test_chain();
        let client = client_for(&chain).await;

        let mut document = registry_json();
        document["modules"][0]["creationArgs"]["immutable"][1]["type"] = "uint257".into();
        let registry: Registry = serde_json::from_value(document).unwrap();

        let err = client.prepare(Some(registry)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParam);
        assert!(err.to_string().contains("creationArgs.immutable[1]"), "{err}");
        assert!(!client.is_prepared());
    }

    #[tokio::test]
    async fn test_prepare_rejects_duplicate_implementation() {
        let chain = test_chain();
        let client = client_for(&chain).await;

        let mut registry = registry();
        let duplicate = registry.modules[0].clone();
        registry.modules.push(duplicate);

        let err = client.prepare(Some(registry)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParam);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_registry() {
        let (client, _chain) = prepared_client().await;
        let client = Arc::new(client);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    let id = if i % 2 == 0 { ALLOWLIST } else { HAT_WEARING };
                    client.get_module_by_id(id).map(|m| m.name)
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let name = handle.await.unwrap().unwrap();
            let expected = if i % 2 == 0 {
                "Allowlist Eligibility"
            } else {
                "Hat Wearing Eligibility"
            };
            assert_eq!(name, expected);
        }
    }

    #[tokio::test]
    async fn test_registry_document_round_trips_through_json() {
        let registry = registry();
        let text = serde_json::to_string(&registry).unwrap();
        let source = StaticRegistrySource::from_json(&text).unwrap();
        assert_eq!(source.fetch().await.unwrap(), registry);
    }
}
