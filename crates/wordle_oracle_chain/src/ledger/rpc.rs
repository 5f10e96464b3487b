//! # JSON-RPC Ledger
//!
//! [`LedgerClient`] over an alloy HTTP provider with a local signing wallet.

use alloy::network::{Ethereum, EthereumWallet, ReceiptResponse};
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::Filter;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, info, warn};
use url::Url;

use super::{BlockRange, FulfillGuess, FulfillReceipt, LedgerClient, SubmittedTx};
use crate::contracts::IWordleGame;
use crate::error::{LedgerError, LedgerResult};
use crate::events::{EventKind, EventParser, LogPosition, OracleEvent};

const LOG_TARGET: &str = "chain::rpc";

/// Ledger client backed by a JSON-RPC node.
pub struct RpcLedger {
    provider: DynProvider<Ethereum>,
    contract: Address,
    oracle: Address,
    chain_id: u64,
}

impl RpcLedger {
    /// Connects to the node and loads the oracle wallet.
    ///
    /// The connection is verified by reading the chain id, so a dead endpoint
    /// fails here rather than on the first poll.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Wallet`] for an unusable private key and
    /// [`LedgerError::Rpc`] if the node does not answer.
    pub async fn connect(rpc_url: Url, contract: Address, private_key: &str) -> LedgerResult<Self> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| LedgerError::Wallet(format!("{e}")))?;
        let oracle = signer.address();

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url)
            .erased();

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;

        info!(
            target: LOG_TARGET,
            %contract,
            %oracle,
            chain_id,
            "connected to ledger"
        );

        Ok(Self {
            provider,
            contract,
            oracle,
            chain_id,
        })
    }

    /// Address of the oracle's signing identity.
    #[must_use]
    pub const fn oracle_address(&self) -> Address {
        self.oracle
    }

    /// Watched contract.
    #[must_use]
    pub const fn contract_address(&self) -> Address {
        self.contract
    }

    /// Chain id reported at connect time.
    #[must_use]
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

#[async_trait]
impl LedgerClient for RpcLedger {
    async fn block_number(&self) -> LedgerResult<u64> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))
    }

    async fn events(&self, kind: EventKind, range: BlockRange) -> LedgerResult<Vec<OracleEvent>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let filter = Filter::new()
            .address(self.contract)
            .event_signature(kind.signature())
            .from_block(range.first())
            .to_block(range.last());

        let logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| LedgerError::Rpc(e.to_string()))?;

        let mut events = Vec::with_capacity(logs.len());
        for log in logs {
            let (Some(block_number), Some(log_index)) = (log.block_number, log.log_index) else {
                // Pending logs have no position yet.
                warn!(target: LOG_TARGET, %kind, "skipping log without block position");
                continue;
            };
            let position = LogPosition::new(block_number, log_index);
            match EventParser::parse(log.inner.data.topics(), &log.inner.data.data, position) {
                Some(event) => events.push(event),
                None => warn!(target: LOG_TARGET, %kind, %position, "skipping malformed log"),
            }
        }

        events.sort_by_key(OracleEvent::position);
        debug!(target: LOG_TARGET, %kind, %range, count = events.len(), "fetched events");
        Ok(events)
    }

    async fn submit_fulfillment(&self, call: FulfillGuess) -> LedgerResult<SubmittedTx> {
        let contract = IWordleGame::new(self.contract, self.provider.clone());

        let pending = contract
            .fulfillGuess(call.player, call.hints, call.won, call.game_over)
            .send()
            .await
            .map_err(|e| LedgerError::Submit(e.to_string()))?;

        let tx_hash = *pending.tx_hash();
        let confirmation = async move {
            let receipt = pending
                .get_receipt()
                .await
                .map_err(|e| LedgerError::Confirmation {
                    tx_hash,
                    reason: e.to_string(),
                })?;

            if !receipt.status() {
                return Err(LedgerError::Reverted(tx_hash));
            }

            Ok(FulfillReceipt {
                tx_hash,
                block_number: receipt.block_number(),
            })
        }
        .boxed();

        Ok(SubmittedTx::new(tx_hash, confirmation))
    }
}
