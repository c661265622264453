//! Two-phase mint/burn authorization.
//!
//! An authorization record is keyed by a content-derived id and moves strictly
//! forward: `Unset -> Approved -> {Executed | Canceled}`. Each transition is a
//! command that must be presented together with a [`Grant`] for the role the
//! command requires; the ledger obtains the grant from its role book before
//! calling [`transition`].

use odra::prelude::*;
use odra::casper_types::bytesrepr::ToBytes;
use odra::casper_types::U256;
use crate::access_control::{Grant, Role};
use crate::errors::{LedgerError, LedgerResult};
use crate::types::{TxId, TxState};

/// A state-changing command on an authorization record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxCommand {
    Approve,
    Cancel,
    Execute,
}

impl TxCommand {
    /// Capability a caller must hold to issue this command
    pub const fn required_role(&self) -> Role {
        match self {
            TxCommand::Approve | TxCommand::Cancel => Role::Approver,
            TxCommand::Execute => Role::Minter,
        }
    }
}

/// Apply `command` to a record in `state`, returning the next state.
pub fn transition(grant: &Grant, state: TxState, command: TxCommand) -> LedgerResult<TxState> {
    if grant.role != command.required_role() {
        return Err(LedgerError::Unauthorized);
    }
    match (state, command) {
        (TxState::Unset, TxCommand::Approve) => Ok(TxState::Approved),
        (TxState::Approved, TxCommand::Cancel) => Ok(TxState::Canceled),
        (TxState::Approved, TxCommand::Execute) => Ok(TxState::Executed),
        _ => Err(LedgerError::InvalidTxState),
    }
}

/// Fields committed to by an authorization id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub network_id: u64,
    pub vault: Address,
    pub initiator: Address,
    pub amount: U256,
    pub recipient: Address,
    pub timestamp: u64,
}

impl AuthorizationRequest {
    /// Bytes hashed into the id: bytesrepr encodings concatenated in field order.
    pub fn preimage(&self) -> LedgerResult<Vec<u8>> {
        let mut bytes = Vec::new();
        append(&mut bytes, &self.network_id)?;
        append(&mut bytes, &self.vault)?;
        append(&mut bytes, &self.initiator)?;
        append(&mut bytes, &self.amount)?;
        append(&mut bytes, &self.recipient)?;
        append(&mut bytes, &self.timestamp)?;
        Ok(bytes)
    }
}

fn append<T: ToBytes>(bytes: &mut Vec<u8>, value: &T) -> LedgerResult<()> {
    let encoded = value
        .to_bytes()
        .map_err(|_| LedgerError::MalformedAuthorization)?;
    bytes.extend_from_slice(&encoded);
    Ok(())
}

/// Read a 32-byte digest as a big-endian id
pub fn tx_id_from_digest(digest: [u8; 32]) -> TxId {
    U256::from_big_endian(&digest)
}
