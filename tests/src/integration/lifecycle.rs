//! Client construction, preparation and missing collaborators.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use async_trait::async_trait;
    use hats_modules_client::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    struct UnreachableSource;

    #[async_trait]
    impl RegistrySource for UnreachableSource {
        async fn fetch(&self) -> Result<Registry, ModulesError> {
            Err(ModulesError::ModulesRegistryFetchError(
                "registry host unreachable".to_string(),
            ))
        }
    }

    fn write_request(instance: Address) -> CallWriteFunctionRequest {
        let module = registry().modules[0].clone();
        CallWriteFunctionRequest {
            account: None,
            module_id: ALLOWLIST.to_string(),
            instance,
            func: module.write_function("addAccount").unwrap().clone(),
            args: vec![json!(STRANGER.to_string())],
        }
    }

    fn create_request() -> CreateInstanceRequest {
        CreateInstanceRequest {
            account: None,
            module_id: ALLOWLIST.to_string(),
            hat_id: U256::from(7),
            immutable_args: vec![json!(OWNER_HAT), json!(ARBITRATOR_HAT)],
            mutable_args: vec![json!([])],
        }
    }

    #[tokio::test]
    async fn test_build_rejects_clients_on_different_networks() {
        init_tracing();
        let sepolia = test_chain();
        let optimism = Arc::new(InMemoryChain::new(ChainId(OTHER_CHAIN), addr(FACTORY)));

        let err = ModulesClient::builder()
            .public_client(sepolia)
            .wallet_client(optimism)
            .build()
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::ChainIdMismatch);
        assert!(err.to_string().contains("11155111"), "{err}");
    }

    #[tokio::test]
    async fn test_build_requires_configured_token() {
        let config = ClientConfig {
            require_token: true,
            ..Default::default()
        };
        let err = ModulesClient::builder().config(config).build().await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::MissingToken);
    }

    #[tokio::test]
    async fn test_build_rejects_invalid_config() {
        let config = ClientConfig {
            registry_url: "ftp://example.org/modules.json".into(),
            ..Default::default()
        };
        let err = ModulesClient::builder().config(config).build().await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidParam);
    }

    #[tokio::test]
    async fn test_every_operation_requires_prepare() {
        let chain = test_chain();
        let client = client_for(&chain).await;
        let instance = Address::new([0x01; 20]);
        let not_prepared = |result: Result<(), ModulesError>| {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::ClientNotPrepared);
        };

        not_prepared(client.get_module_by_id(ALLOWLIST).map(drop));
        not_prepared(client.get_module_by_name("Allowlist Eligibility").map(drop));
        not_prepared(client.get_modules(&ModuleFilter::default()).map(drop));
        not_prepared(client.get_available_modules().await.map(drop));
        not_prepared(client.get_module_by_instance(instance).await.map(drop));
        not_prepared(client.get_modules_by_instances(&[instance]).await.map(drop));
        not_prepared(client.create_new_instance(create_request()).await.map(drop));
        not_prepared(
            client
                .batch_create_new_instances(BatchCreateInstancesRequest {
                    account: None,
                    module_ids: vec![ALLOWLIST.to_string()],
                    hat_ids: vec![U256::from(7)],
                    immutable_args_list: vec![create_request().immutable_args],
                    mutable_args_list: vec![create_request().mutable_args],
                })
                .await
                .map(drop),
        );
        not_prepared(
            client
                .predict_instance_address(PredictInstanceRequest {
                    module_id: ALLOWLIST.to_string(),
                    hat_id: U256::from(7),
                    immutable_args: create_request().immutable_args,
                })
                .await
                .map(drop),
        );
        not_prepared(
            client
                .create_eligibilities_chain(CreateChainRequest {
                    account: None,
                    hat_id: U256::from(7),
                    clauses: vec![vec![instance]],
                })
                .await
                .map(drop),
        );
        not_prepared(
            client
                .create_toggles_chain(CreateChainRequest {
                    account: None,
                    hat_id: U256::from(7),
                    clauses: vec![vec![instance]],
                })
                .await
                .map(drop),
        );
        not_prepared(client.call_instance_write_function(write_request(instance)).await.map(drop));
        not_prepared(client.get_instance_parameters(instance).await.map(drop));
        not_prepared(
            client
                .read_instance(ReadInstanceRequest {
                    module_id: ALLOWLIST.to_string(),
                    instance,
                    function_name: "OWNER_HAT".to_string(),
                    args: vec![],
                })
                .await
                .map(drop),
        );

        assert!(chain.sent_transactions().is_empty());
        assert_eq!(chain.call_count(), 0);
    }

    #[tokio::test]
    async fn test_writes_require_wallet_client() {
        init_tracing();
        let chain = test_chain();
        let client = ModulesClient::builder()
            .public_client(chain.clone())
            .registry_source(Arc::new(StaticRegistrySource::new(registry())))
            .build()
            .await
            .unwrap();
        client.prepare(None).await.unwrap();

        let err = client.create_new_instance(create_request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingWalletClient);

        let err = client
            .call_instance_write_function(write_request(Address::new([0x01; 20])))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingWalletClient);

        let err = client
            .create_toggles_chain(CreateChainRequest {
                account: None,
                hat_id: U256::from(7),
                clauses: vec![vec![Address::new([0x01; 20])]],
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingWalletClient);

        assert!(chain.sent_transactions().is_empty());
        assert_eq!(chain.call_count(), 0);

        // Reads still work.
        let predicted = client
            .predict_instance_address(PredictInstanceRequest {
                module_id: ALLOWLIST.to_string(),
                hat_id: U256::from(7),
                immutable_args: create_request().immutable_args,
            })
            .await;
        assert!(predicted.is_ok());
    }

    #[tokio::test]
    async fn test_reads_require_public_client() {
        init_tracing();
        let chain = test_chain();
        let client = ModulesClient::builder()
            .wallet_client(chain.clone())
            .registry_source(Arc::new(StaticRegistrySource::new(registry())))
            .build()
            .await
            .unwrap();
        client.prepare(None).await.unwrap();

        // The wallet still determines the network.
        assert_eq!(client.chain_id(), Some(ChainId(TEST_CHAIN)));
        assert_eq!(client.get_available_modules().await.unwrap().len(), 2);

        let err = client
            .get_module_by_instance(Address::new([0x01; 20]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingPublicClient);

        let err = client.create_new_instance(create_request()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingPublicClient);
        assert!(chain.sent_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_registry_only_client_without_collaborators() {
        let client = ModulesClient::builder().build().await.unwrap();
        client.prepare(Some(registry())).await.unwrap();

        assert!(client.is_prepared());
        assert_eq!(client.chain_id(), None);
        assert!(client.get_module_by_id(HAT_WEARING).is_ok());

        let err = client.get_available_modules().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingPublicClient);
    }

    #[tokio::test]
    async fn test_registry_fetch_failure_surfaces() {
        let chain = test_chain();
        let client = ModulesClient::builder()
            .public_client(chain.clone())
            .registry_source(Arc::new(UnreachableSource))
            .build()
            .await
            .unwrap();

        let err = client.prepare(None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModulesRegistryFetchError);
        assert!(!client.is_prepared());
    }
}
