use crate::{
    Result,
    store::{SettlementRecord, SettlementStore},
};
use async_trait::async_trait;
use chrono::Utc;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde_json::json;
use tracing::warn;

const MARKER_PREFIX: &str = "caishen:processed:";
const HISTORY_PREFIX: &str = "caishen:history:";

/// Redis-backed settlement store. Replay markers are plain keys written with
/// SETNX so the guard is a single atomic round trip; settlement records are
/// JSON rows in a per-sender list (LPUSH keeps them newest first).
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    fn marker_key(tx_hash: &str) -> String {
        format!("{MARKER_PREFIX}{}", tx_hash.to_lowercase())
    }

    fn history_key(sender: &str) -> String {
        format!("{HISTORY_PREFIX}{}", sender.to_lowercase())
    }
}

#[async_trait]
impl SettlementStore for RedisStore {
    async fn is_processed(&self, tx_hash: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        Ok(conn.exists(Self::marker_key(tx_hash)).await?)
    }

    async fn try_mark_processed(&self, tx_hash: &str, network: &str) -> Result<bool> {
        let payload = json!({
            "network": network,
            "processed_at": Utc::now().timestamp_millis(),
        })
        .to_string();

        let mut conn = self.conn.clone();
        Ok(conn.set_nx(Self::marker_key(tx_hash), payload).await?)
    }

    async fn insert_settlement(&self, record: &SettlementRecord) -> Result<()> {
        let payload = serde_json::to_string(record)?;
        let mut conn = self.conn.clone();
        let _: () = conn.lpush(Self::history_key(&record.sender), payload).await?;
        Ok(())
    }

    async fn list_by_address(&self, sender: &str) -> Result<Vec<SettlementRecord>> {
        let mut conn = self.conn.clone();
        let rows: Vec<String> = conn.lrange(Self::history_key(sender), 0, -1).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_str(&row) {
                Ok(record) => records.push(record),
                Err(err) => warn!(sender, ?err, "skipping unreadable settlement row"),
            }
        }
        Ok(records)
    }
}
