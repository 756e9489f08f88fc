//! # Verdant Core
//!
//! Shared primitives for the Verdant green-bond protocol.
//!
//! This crate provides the building blocks the lifecycle, treasury, impact
//! and governance crates compose:
//! - `types` - addresses, amounts, basis points, protocol constants
//! - `clock` - the externally supplied clock abstraction
//! - `collab` - interfaces to the external collaborators (capability
//!   oracle, circuit breaker, bond-token ledger, payment-asset ledger)
//! - `events` - the observable audit-event vocabulary
//! - `timelock` - the generic two-phase schedule-then-execute gate
//!
//! The protocol is a single-threaded state machine: every public operation
//! runs to completion against one mutable ledger, and all "waiting" is a
//! timestamp comparison, never a blocking wait.

pub mod clock;
pub mod collab;
pub mod events;
pub mod timelock;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use collab::{
    BondTokenLedger, CapabilityOracle, CircuitBreaker, CollabError, InMemoryPaymentLedger,
    InMemoryTokenLedger, PauseSwitch, PaymentLedger, Role, StaticCapabilities,
};
pub use events::{Event, EventLog};
pub use timelock::{Gate, OpFingerprint, Timelock, TimelockError};
pub use types::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::collab::{
        BondTokenLedger, CapabilityOracle, CircuitBreaker, CollabError, PaymentLedger, Role,
    };
    pub use crate::events::{Event, EventLog};
    pub use crate::timelock::{Gate, OpFingerprint, Timelock, TimelockError};
    pub use crate::types::*;
}
