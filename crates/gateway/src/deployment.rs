//! Where the contract lives on each network.

use rx_reminder_shared::{Address, NetworkId, RxError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Deserialize)]
struct Artifact {
    #[serde(default)]
    networks: HashMap<String, NetworkEntry>,
}

#[derive(Deserialize)]
struct NetworkEntry {
    address: String,
}

/// Contract address per network id
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Deployments {
    by_network: HashMap<NetworkId, Address>,
}

impl Deployments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, network_id: NetworkId, address: Address) -> Self {
        self.by_network.insert(network_id, address);
        self
    }

    /// Read the `networks` table of a contract build artifact.
    ///
    /// Entries with a non-numeric network id or a malformed address are
    /// skipped.
    pub fn from_artifact_json(json: &str) -> Result<Self, RxError> {
        let artifact: Artifact = serde_json::from_str(json)
            .map_err(|e| RxError::Config(format!("invalid contract artifact: {}", e)))?;

        let mut deployments = Deployments::new();
        for (network, entry) in artifact.networks {
            let Ok(network_id) = network.parse::<NetworkId>() else {
                tracing::warn!(
                    network = %network,
                    "skipping deployment with non-numeric network id"
                );
                continue;
            };
            match Address::parse(&entry.address) {
                Ok(address) => {
                    deployments.by_network.insert(network_id, address);
                }
                Err(e) => {
                    tracing::warn!(
                        network_id,
                        error = %e,
                        "skipping deployment with invalid address"
                    );
                }
            }
        }
        Ok(deployments)
    }

    pub fn from_artifact_file(path: &Path) -> Result<Self, RxError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| RxError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_artifact_json(&json)
    }

    pub fn address_for(&self, network_id: NetworkId) -> Result<&Address, RxError> {
        self.by_network
            .get(&network_id)
            .ok_or(RxError::DeploymentMissing { network_id })
    }

    pub fn is_empty(&self) -> bool {
        self.by_network.is_empty()
    }
}
