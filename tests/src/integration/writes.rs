//! Module write functions.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use hats_modules_client::prelude::*;
    use serde_json::{json, Value};

    fn allowlist() -> Module {
        registry()
            .modules
            .into_iter()
            .find(|m| m.implementation_address == addr(ALLOWLIST))
            .unwrap()
    }

    fn write_call(instance: Address, function: &str, args: Vec<Value>) -> CallWriteFunctionRequest {
        CallWriteFunctionRequest {
            account: None,
            module_id: ALLOWLIST.to_string(),
            instance,
            func: allowlist().write_function(function).unwrap().clone(),
            args,
        }
    }

    async fn is_allowed(client: &ModulesClient, instance: Address, account: Address) -> bool {
        let status = client
            .read_instance(ReadInstanceRequest {
                module_id: ALLOWLIST.to_string(),
                instance,
                function_name: "getWearerStatus".to_string(),
                args: vec![json!(account.to_string()), json!(42)],
            })
            .await
            .unwrap();
        status[0] == json!(true)
    }

    #[tokio::test]
    async fn test_successful_write_reports_status_and_hash() {
        let (client, chain) = prepared_client().await;
        let instance = deploy_allowlist(&client, 42, &[]).await.new_instance;
        assert!(!is_allowed(&client, instance, STRANGER).await);

        let result = client
            .call_instance_write_function(write_call(
                instance,
                "addAccount",
                vec![json!(STRANGER.to_string())],
            ))
            .await
            .unwrap();

        assert_eq!(result.status, TransactionStatus::Success);
        let receipt = chain
            .wait_for_transaction_receipt(result.transaction_hash)
            .await
            .unwrap();
        assert_eq!(receipt.transaction_hash, result.transaction_hash);
        assert_eq!(chain.sent_transactions().last().unwrap().to, instance);
        assert!(is_allowed(&client, instance, STRANGER).await);
    }

    #[tokio::test]
    async fn test_array_argument_write() {
        let (client, _chain) = prepared_client().await;
        let instance = deploy_allowlist(&client, 42, &[]).await.new_instance;
        let others = [Address::new([0x01; 20]), Address::new([0x02; 20])];

        let result = client
            .call_instance_write_function(write_call(
                instance,
                "addAccounts",
                vec![json!([others[0].to_string(), others[1].to_string()])],
            ))
            .await
            .unwrap();
        assert!(result.status.is_success());
        for account in others {
            assert!(is_allowed(&client, instance, account).await);
        }
    }

    #[tokio::test]
    async fn test_custom_error_revert_carries_error_name() {
        let (client, chain) = prepared_client().await;
        let instance = deploy_allowlist(&client, 42, &[]).await.new_instance;

        let err = client
            .call_instance_write_function(CallWriteFunctionRequest {
                account: Some(STRANGER),
                ..write_call(instance, "addAccount", vec![json!(STRANGER.to_string())])
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransactionReverted);
        assert_eq!(
            err.to_string(),
            "module function reverted with error name AllowlistEligibility_NotOwner"
        );
        // Only the deployment reached the chain.
        assert_eq!(chain.sent_transactions().len(), 1);
        assert!(!is_allowed(&client, instance, STRANGER).await);
    }

    #[tokio::test]
    async fn test_reason_string_revert() {
        let (client, _chain) = prepared_client().await;
        let instance = deploy_allowlist(&client, 42, &[]).await.new_instance;

        let err = client
            .call_instance_write_function(write_call(
                instance,
                "removeAccount",
                vec![json!(STRANGER.to_string())],
            ))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransactionReverted);
        assert_eq!(
            err.to_string(),
            format!("module function reverted with reason: {NOT_ON_ALLOWLIST}")
        );
    }

    #[tokio::test]
    async fn test_reverted_receipt_is_not_success() {
        init_tracing();
        let chain = test_chain();
        let client = ModulesClient::builder()
            .config(ClientConfig {
                simulate_writes: false,
                ..Default::default()
            })
            .public_client(chain.clone())
            .wallet_client(chain.clone())
            .build()
            .await
            .unwrap();
        client.prepare(Some(registry())).await.unwrap();
        let instance = deploy_allowlist(&client, 42, &[]).await.new_instance;

        let result = client
            .call_instance_write_function(CallWriteFunctionRequest {
                account: Some(STRANGER),
                ..write_call(instance, "addAccount", vec![json!(STRANGER.to_string())])
            })
            .await
            .unwrap();
        assert_eq!(result.status, TransactionStatus::Reverted);
        assert!(!result.status.is_success());
        assert!(!is_allowed(&client, instance, STRANGER).await);
    }

    #[tokio::test]
    async fn test_argument_count_checked_before_network() {
        let (client, chain) = prepared_client().await;
        let instance = deploy_allowlist(&client, 42, &[]).await.new_instance;
        let calls = chain.call_count();

        for args in [vec![], vec![json!(STRANGER.to_string()), json!(STRANGER.to_string())]] {
            let err = client
                .call_instance_write_function(write_call(instance, "addAccount", args))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ParametersLengthsMismatch);
        }
        assert_eq!(chain.call_count(), calls);
        assert_eq!(chain.sent_transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_argument_type_checked_before_network() {
        let (client, chain) = prepared_client().await;
        let instance = deploy_allowlist(&client, 42, &[]).await.new_instance;
        let calls = chain.call_count();

        for bad in [json!(12), json!("0x1234"), json!([STRANGER.to_string()])] {
            let err = client
                .call_instance_write_function(write_call(instance, "addAccount", vec![bad]))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParam);
            assert!(err.to_string().contains("Account"), "{err}");
        }
        assert_eq!(chain.call_count(), calls);
    }

    #[tokio::test]
    async fn test_view_function_is_not_a_write() {
        let (client, chain) = prepared_client().await;
        let instance = deploy_allowlist(&client, 42, &[]).await.new_instance;

        let func = WriteFunction {
            roles: vec!["public".to_string()],
            function_name: "getWearerStatus".to_string(),
            label: "Status".to_string(),
            description: String::new(),
            primary: None,
            args: vec![
                WriteFunctionArg {
                    name: "Wearer".to_string(),
                    description: String::new(),
                    kind: "address".to_string(),
                    display_type: "default".to_string(),
                    optional: None,
                },
                WriteFunctionArg {
                    name: "Hat".to_string(),
                    description: String::new(),
                    kind: "uint256".to_string(),
                    display_type: "hat".to_string(),
                    optional: None,
                },
            ],
        };
        let err = client
            .call_instance_write_function(CallWriteFunctionRequest {
                account: None,
                module_id: ALLOWLIST.to_string(),
                instance,
                func,
                args: vec![json!(STRANGER.to_string()), json!(42)],
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParam);
        assert_eq!(chain.sent_transactions().len(), 1);
    }

    #[tokio::test]
    async fn test_function_missing_from_abi() {
        let (client, _chain) = prepared_client().await;
        let instance = deploy_allowlist(&client, 42, &[]).await.new_instance;

        let mut func = allowlist().write_function("addAccount").unwrap().clone();
        func.function_name = "setOwner".to_string();
        let err = client
            .call_instance_write_function(CallWriteFunctionRequest {
                account: None,
                module_id: ALLOWLIST.to_string(),
                instance,
                func,
                args: vec![json!(STRANGER.to_string())],
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParam);
    }

    #[tokio::test]
    async fn test_write_on_module_missing_from_network() {
        let (client, chain) = prepared_client().await;
        let staking = client.get_module_by_id(STAKING).unwrap();

        let err = client
            .call_instance_write_function(CallWriteFunctionRequest {
                account: None,
                module_id: STAKING.to_string(),
                instance: Address::new([0x33; 20]),
                func: staking.write_function("stake").unwrap().clone(),
                args: vec![json!("1000")],
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModuleNotAvailable);
        assert!(chain.sent_transactions().is_empty());
    }
}
