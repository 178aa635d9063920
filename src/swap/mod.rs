//! Swap Module
//!
//! The SOL -> USDC swap lifecycle: quote, build, sign, submit, confirm,
//! coordinated by the `SwapOrder` state machine.

mod builder;
mod order;
mod quote;
mod signer;
mod submitter;

pub use builder::*;
pub use order::*;
pub use quote::*;
pub use signer::*;
pub use submitter::*;
