//! Prescription Contract Gateway
//!
//! Typed access to the externally deployed prescription contract:
//! - Wallet and transport seams ([`WalletProvider`], [`ContractTransport`])
//! - Per-network deployment lookup from a contract artifact
//! - Read calls and estimate-then-send writes with a gas buffer
//! - Normalization of listing results into [`Prescription`] records
//!
//! [`Prescription`]: prescriptions_integrity::Prescription

pub mod deployment;
pub mod gateway;
pub mod normalize;
pub mod provider;

pub use deployment::Deployments;
pub use gateway::{buffered_gas, methods, ContractGateway, DEFAULT_GAS_BUFFER_PERCENT};
pub use normalize::{
    map_prescriptions, normalize_sequence, Column, MappingContext, ResponseLayout, DOCTOR_LISTING,
    PATIENT_LISTING,
};
pub use provider::{ContractCall, ContractTransport, TxReceipt, WalletProvider};
