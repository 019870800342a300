use crate::{Error, Result, ledger::resolver::NetworkHandle};
use alloy::primitives::{Address, B256, U256, b256};

/// keccak256("Transfer(address,address,uint256)")
const TRANSFER_TOPIC: B256 =
    b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef");

/// Ledger-verified offering fact, owned by one settlement run.
#[derive(Debug, Clone, Copy)]
pub struct Offering {
    pub from: Address,
    pub value: U256,
}

/// Ledger-verified reward-token transfer backing a boost.
#[derive(Debug, Clone, Copy)]
pub struct BoostTransfer {
    pub from: Address,
    pub token_amount: U256,
}

/// Fetch and validate the offering: receipt must report success and the
/// recipient must be this network's treasury. Address equality is over
/// canonical bytes, which subsumes the case-insensitive compare.
pub async fn verify_offering(network: &NetworkHandle, hash: B256) -> Result<Offering> {
    let hash_str = format!("{hash:#x}");

    let receipt = network
        .client
        .get_receipt(hash)
        .await?
        .ok_or_else(|| Error::TransactionNotFound(hash_str.clone()))?;
    if !receipt.success {
        return Err(Error::TransactionUnconfirmed(hash_str));
    }

    let tx = network
        .client
        .get_transaction(hash)
        .await?
        .ok_or_else(|| Error::TransactionNotFound(hash_str.clone()))?;
    if tx.to != Some(network.treasury()) {
        return Err(Error::WrongRecipient(hash_str));
    }

    Ok(Offering {
        from: tx.from,
        value: tx.value,
    })
}

/// Same receipt contract as the offering, plus: the boost must come from the
/// offering sender and its receipt must carry a reward-token Transfer log to
/// the treasury.
pub async fn verify_boost(
    network: &NetworkHandle,
    hash: B256,
    offering_sender: Address,
) -> Result<BoostTransfer> {
    let hash_str = format!("{hash:#x}");

    let token = network
        .boost_token()
        .ok_or_else(|| Error::MissingTokenTransfer(hash_str.clone()))?;

    let receipt = network
        .client
        .get_receipt(hash)
        .await?
        .ok_or_else(|| Error::TransactionNotFound(hash_str.clone()))?;
    if !receipt.success {
        return Err(Error::TransactionUnconfirmed(hash_str));
    }

    let tx = network
        .client
        .get_transaction(hash)
        .await?
        .ok_or_else(|| Error::TransactionNotFound(hash_str.clone()))?;
    if tx.from != offering_sender {
        return Err(Error::SenderMismatch(hash_str));
    }

    let token_amount = receipt
        .logs
        .iter()
        .find_map(|log| {
            if log.address != token
                || log.topics.len() < 3
                || log.topics[0] != TRANSFER_TOPIC
                || Address::from_word(log.topics[2]) != network.treasury()
                || log.data.len() < 32
            {
                return None;
            }
            Some(U256::from_be_slice(&log.data[..32]))
        })
        .ok_or(Error::MissingTokenTransfer(hash_str))?;

    Ok(BoostTransfer {
        from: tx.from,
        token_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ledger::{LogEntry, MockLedgerRpc, TxBody, TxReceipt},
        settings::NetworkSettings,
    };
    use std::sync::Arc;

    const TREASURY: &str = "0x00000000000000000000000000000000000088a8";
    const TOKEN: &str = "0x0000000000000000000000000000000000000f00";

    fn network(client: MockLedgerRpc) -> NetworkHandle {
        NetworkHandle::new(
            NetworkSettings {
                name: "monad".to_string(),
                rpc_url: "https://rpc.example.org".to_string(),
                chain_id: 143,
                treasury_address: TREASURY.to_string(),
                explorer_url: "https://explorer.example.org".to_string(),
                min_offering: "0.8".to_string(),
                currency: "MON".to_string(),
                signer_key: None,
                boost_token: Some(TOKEN.to_string()),
            },
            Arc::new(client),
        )
        .unwrap()
    }

    fn hash() -> B256 {
        B256::repeat_byte(0x11)
    }

    fn sender() -> Address {
        Address::repeat_byte(0x22)
    }

    fn transfer_log(token: &str, to: Address, amount: U256) -> LogEntry {
        LogEntry {
            address: token.parse().unwrap(),
            topics: vec![
                TRANSFER_TOPIC,
                sender().into_word(),
                to.into_word(),
            ],
            data: amount.to_be_bytes::<32>().to_vec(),
        }
    }

    #[tokio::test]
    async fn offering_requires_successful_receipt() {
        let mut client = MockLedgerRpc::new();
        client.expect_get_receipt().returning(|_| {
            Ok(Some(TxReceipt {
                success: false,
                logs: vec![],
            }))
        });
        let network = network(client);

        let err = verify_offering(&network, hash()).await.unwrap_err();
        assert!(matches!(err, Error::TransactionUnconfirmed(_)));
    }

    #[tokio::test]
    async fn offering_requires_treasury_recipient() {
        let mut client = MockLedgerRpc::new();
        client.expect_get_receipt().returning(|_| {
            Ok(Some(TxReceipt {
                success: true,
                logs: vec![],
            }))
        });
        client.expect_get_transaction().returning(|_| {
            Ok(Some(TxBody {
                from: sender(),
                to: Some(Address::repeat_byte(0x99)),
                value: U256::from(8u64),
            }))
        });
        let network = network(client);

        let err = verify_offering(&network, hash()).await.unwrap_err();
        assert!(matches!(err, Error::WrongRecipient(_)));
    }

    #[tokio::test]
    async fn offering_accepts_valid_transaction() {
        let mut client = MockLedgerRpc::new();
        client.expect_get_receipt().returning(|_| {
            Ok(Some(TxReceipt {
                success: true,
                logs: vec![],
            }))
        });
        client.expect_get_transaction().returning(|_| {
            Ok(Some(TxBody {
                from: sender(),
                to: Some(TREASURY.parse().unwrap()),
                value: U256::from(8u64),
            }))
        });
        let network = network(client);

        let offering = verify_offering(&network, hash()).await.unwrap();
        assert_eq!(offering.from, sender());
        assert_eq!(offering.value, U256::from(8u64));
    }

    #[tokio::test]
    async fn boost_rejects_foreign_sender() {
        let mut client = MockLedgerRpc::new();
        client.expect_get_receipt().returning(|_| {
            Ok(Some(TxReceipt {
                success: true,
                logs: vec![],
            }))
        });
        client.expect_get_transaction().returning(|_| {
            Ok(Some(TxBody {
                from: Address::repeat_byte(0x33),
                to: Some(TOKEN.parse().unwrap()),
                value: U256::ZERO,
            }))
        });
        let network = network(client);

        let err = verify_boost(&network, hash(), sender()).await.unwrap_err();
        assert!(matches!(err, Error::SenderMismatch(_)));
    }

    #[tokio::test]
    async fn boost_extracts_token_transfer_to_treasury() {
        let treasury: Address = TREASURY.parse().unwrap();
        let amount = U256::from(1_000u64);
        let mut client = MockLedgerRpc::new();
        client.expect_get_receipt().returning(move |_| {
            Ok(Some(TxReceipt {
                success: true,
                logs: vec![
                    // Unrelated log from another contract first
                    transfer_log("0x0000000000000000000000000000000000000bad", treasury, amount),
                    transfer_log(TOKEN, treasury, amount),
                ],
            }))
        });
        client.expect_get_transaction().returning(|_| {
            Ok(Some(TxBody {
                from: sender(),
                to: Some(TOKEN.parse().unwrap()),
                value: U256::ZERO,
            }))
        });
        let network = network(client);

        let boost = verify_boost(&network, hash(), sender()).await.unwrap();
        assert_eq!(boost.token_amount, amount);
    }

    #[tokio::test]
    async fn boost_without_matching_transfer_is_rejected() {
        let amount = U256::from(1_000u64);
        let mut client = MockLedgerRpc::new();
        client.expect_get_receipt().returning(move |_| {
            Ok(Some(TxReceipt {
                success: true,
                logs: vec![transfer_log(TOKEN, Address::repeat_byte(0x44), amount)],
            }))
        });
        client.expect_get_transaction().returning(|_| {
            Ok(Some(TxBody {
                from: sender(),
                to: Some(TOKEN.parse().unwrap()),
                value: U256::ZERO,
            }))
        });
        let network = network(client);

        let err = verify_boost(&network, hash(), sender()).await.unwrap_err();
        assert!(matches!(err, Error::MissingTokenTransfer(_)));
    }
}
