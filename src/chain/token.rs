//! ERC-20 permit token client.
//!
//! The token contract is the authority on permits: it holds the owner's
//! nonce, its own `DOMAIN_SEPARATOR`, and performs the final signature check
//! inside `permit`. [`PermitToken`] reads that state and submits signed
//! permits.

use alloy_primitives::{Address, B256, TxHash, U256};
use alloy_provider::{PendingTransactionError, Provider};
use alloy_sol_types::sol;
use alloy_transport::TransportError;
use std::future::IntoFuture;
use std::time::Duration;
use tracing::{Instrument, Level, instrument};

use crate::eip712::Domain;
use crate::permit::SignedPermit;

sol! {
    #[allow(missing_docs)]
    #[allow(clippy::too_many_arguments)]
    #[derive(Debug)]
    #[sol(rpc)]
    interface IERC20Permit {
        function name() external view returns (string);
        function decimals() external view returns (uint8);
        function nonces(address owner) external view returns (uint256);
        function DOMAIN_SEPARATOR() external view returns (bytes32);
        function allowance(address owner, address spender) external view returns (uint256);
        function permit(address owner, address spender, uint256 value, uint256 deadline, uint8 v, bytes32 r, bytes32 s) external;
    }
}

pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    PendingTransaction(#[from] PendingTransactionError),
    #[error("Transaction {0} reverted")]
    TransactionReverted(TxHash),
    #[error("Contract call failed: {0}")]
    ContractCall(String),
    #[error("Domain separator mismatch: local {local}, on-chain {onchain}")]
    DomainMismatch { local: B256, onchain: B256 },
    #[error("Permit is for token {permit}, not {token}")]
    WrongToken { permit: Address, token: Address },
}

impl From<alloy_contract::Error> for TokenError {
    fn from(e: alloy_contract::Error) -> Self {
        match e {
            alloy_contract::Error::TransportError(e) => Self::Transport(e),
            alloy_contract::Error::PendingTransactionError(e) => Self::PendingTransaction(e),
            _ => Self::ContractCall(e.to_string()),
        }
    }
}

/// The `permit(owner, spender, value, deadline, v, r, s)` call for a signed permit.
pub fn permit_call(signed: &SignedPermit) -> IERC20Permit::permitCall {
    let message = &signed.message;
    let signature = &signed.signature;
    IERC20Permit::permitCall {
        owner: message.owner.0,
        spender: message.spender.0,
        value: message.value,
        deadline: message.deadline.into(),
        v: signature.v,
        r: signature.r,
        s: signature.s,
    }
}

pub struct PermitToken<P> {
    contract: IERC20Permit::IERC20PermitInstance<P>,
    receipt_timeout: Duration,
}

impl<P: Provider> PermitToken<P> {
    pub fn new(address: Address, provider: P) -> Self {
        Self {
            contract: IERC20Permit::new(address, provider),
            receipt_timeout: DEFAULT_RECEIPT_TIMEOUT,
        }
    }

    pub fn with_receipt_timeout(mut self, receipt_timeout: Duration) -> Self {
        self.receipt_timeout = receipt_timeout;
        self
    }

    pub fn address(&self) -> Address {
        *self.contract.address()
    }

    pub async fn name(&self) -> Result<String, TokenError> {
        let name = self
            .contract
            .name()
            .call()
            .into_future()
            .instrument(tracing::info_span!(
                "fetch_name",
                token = %self.address(),
                otel.kind = "client",
            ))
            .await?;
        Ok(name)
    }

    pub async fn decimals(&self) -> Result<u8, TokenError> {
        let decimals = self
            .contract
            .decimals()
            .call()
            .into_future()
            .instrument(tracing::info_span!(
                "fetch_decimals",
                token = %self.address(),
                otel.kind = "client",
            ))
            .await?;
        Ok(decimals)
    }

    /// The owner's current permit nonce; the next valid permit must carry exactly this value.
    pub async fn nonce(&self, owner: Address) -> Result<U256, TokenError> {
        let nonce = self
            .contract
            .nonces(owner)
            .call()
            .into_future()
            .instrument(tracing::info_span!(
                "fetch_nonce",
                token = %self.address(),
                owner = %owner,
                otel.kind = "client",
            ))
            .await?;
        Ok(nonce)
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, TokenError> {
        let allowance = self
            .contract
            .allowance(owner, spender)
            .call()
            .into_future()
            .instrument(tracing::info_span!(
                "fetch_allowance",
                token = %self.address(),
                owner = %owner,
                spender = %spender,
                otel.kind = "client",
            ))
            .await?;
        Ok(allowance)
    }

    pub async fn domain_separator(&self) -> Result<B256, TokenError> {
        let separator = self
            .contract
            .DOMAIN_SEPARATOR()
            .call()
            .into_future()
            .instrument(tracing::info_span!(
                "fetch_domain_separator",
                token = %self.address(),
                otel.kind = "client",
            ))
            .await?;
        Ok(separator)
    }

    /// Checks that `domain` hashes to the separator the contract verifies against.
    #[instrument(skip_all, err, fields(token = %self.address(), domain = %domain))]
    pub async fn assert_domain(&self, domain: &Domain) -> Result<(), TokenError> {
        let onchain = self.domain_separator().await?;
        let local = domain.separator();
        if local != onchain {
            return Err(TokenError::DomainMismatch { local, onchain });
        }
        Ok(())
    }

    fn assert_token(&self, signed: &SignedPermit) -> Result<(), TokenError> {
        let permit = signed.domain.verifying_contract();
        let token = self.address();
        if permit != token {
            return Err(TokenError::WrongToken { permit, token });
        }
        Ok(())
    }

    /// Runs `permit` through `eth_call` without sending a transaction.
    #[instrument(skip_all, err, fields(token = %self.address(), owner = %signed.message.owner))]
    pub async fn simulate_permit(&self, signed: &SignedPermit) -> Result<(), TokenError> {
        self.assert_token(signed)?;
        let call = permit_call(signed);
        self.contract
            .call_builder(&call)
            .call()
            .into_future()
            .instrument(tracing::info_span!("simulate_permit", otel.kind = "client"))
            .await?;
        Ok(())
    }

    /// Sends `permit` and waits for the receipt.
    pub async fn submit_permit(&self, signed: &SignedPermit) -> Result<TxHash, TokenError> {
        self.assert_token(signed)?;
        let call = permit_call(signed);
        let pending = self
            .contract
            .call_builder(&call)
            .send()
            .instrument(tracing::info_span!("call_permit",
                owner = %call.owner,
                spender = %call.spender,
                value = %call.value,
                deadline = %call.deadline,
                token_contract = %self.address(),
                otel.kind = "client",
            ))
            .await?;
        let receipt = pending
            .with_timeout(Some(self.receipt_timeout))
            .get_receipt()
            .await?;
        if receipt.status() {
            tracing::event!(Level::INFO,
                status = "ok",
                tx = %receipt.transaction_hash,
                "permit succeeded"
            );
            Ok(receipt.transaction_hash)
        } else {
            tracing::event!(
                Level::WARN,
                status = "failed",
                tx = %receipt.transaction_hash,
                "permit failed"
            );
            Err(TokenError::TransactionReverted(receipt.transaction_hash))
        }
    }
}
