//! Eligibilities and toggles chains.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use hats_modules_client::prelude::*;

    fn word(value: u64) -> Vec<u8> {
        let mut out = vec![0u8; 32];
        U256::from(value).to_big_endian(&mut out);
        out
    }

    fn padded(address: Address) -> Vec<u8> {
        let mut out = vec![0u8; 12];
        out.extend_from_slice(address.as_bytes());
        out
    }

    #[tokio::test]
    async fn test_eligibilities_chain_packs_clauses() {
        let (client, chain) = prepared_client().await;
        let first = deploy_allowlist(&client, 42, &[]).await.new_instance;
        let second = deploy_allowlist(&client, 43, &[]).await.new_instance;
        let third = deploy_allowlist(&client, 44, &[]).await.new_instance;

        // (first AND second) OR third
        let created = client
            .create_eligibilities_chain(CreateChainRequest {
                account: None,
                hat_id: U256::from(42),
                clauses: vec![vec![first, second], vec![third]],
            })
            .await
            .unwrap();
        assert_eq!(created.status, TransactionStatus::Success);

        let record = chain.instance(created.new_instance).unwrap();
        assert_eq!(record.implementation, addr(ELIGIBILITIES_CHAIN));
        let mut expected = word(2);
        expected.extend(word(2));
        expected.extend(word(1));
        expected.extend(padded(first));
        expected.extend(padded(second));
        expected.extend(padded(third));
        assert_eq!(record.immutable_args, expected);
        assert!(record.init_data.is_empty());
    }

    #[tokio::test]
    async fn test_toggles_chain_uses_toggles_implementation() {
        let (client, chain) = prepared_client().await;
        let member = Address::new([0x77; 20]);

        let created = client
            .create_toggles_chain(CreateChainRequest {
                account: None,
                hat_id: U256::from(9),
                clauses: vec![vec![member]],
            })
            .await
            .unwrap();

        let record = chain.instance(created.new_instance).unwrap();
        assert_eq!(record.implementation, addr(TOGGLES_CHAIN));
        assert_eq!(record.hat_id, U256::from(9));
    }

    #[tokio::test]
    async fn test_empty_clauses_rejected() {
        let (client, chain) = prepared_client().await;

        for clauses in [vec![], vec![vec![Address::new([0x77; 20])], vec![]]] {
            let err = client
                .create_eligibilities_chain(CreateChainRequest {
                    account: None,
                    hat_id: U256::from(9),
                    clauses,
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParam);
        }
        assert!(chain.sent_transactions().is_empty());
    }

    #[tokio::test]
    async fn test_chain_module_must_be_deployed_on_network() {
        let (client, _chain) = prepared_client().await;

        let mut registry = registry();
        registry.toggles_chain.deployments.clear();
        client.prepare(Some(registry)).await.unwrap();

        let err = client
            .create_toggles_chain(CreateChainRequest {
                account: None,
                hat_id: U256::from(9),
                clauses: vec![vec![Address::new([0x77; 20])]],
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModuleNotAvailable);
    }
}
