use serde::{Deserialize, Serialize};

/// Cloud identity of the node being bootstrapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    /// Hostname the node registers under.
    pub name: String,
    /// Cloud instance id, e.g. `i-0abc123`.
    pub instance_id: String,
    /// Private IPv4 address reported by the metadata service.
    pub private_ip: String,
}

/// Body of `POST /v1/node-token/<token>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub node_details: NodeDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeDetails {
    pub name: String,
    pub metadata: NodeMetadata,
}

/// Field names are part of the webservice contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeMetadata {
    pub ec2_instance_id: String,
    pub ec2_ipaddress: String,
}

impl From<&NodeIdentity> for RegistrationRequest {
    fn from(identity: &NodeIdentity) -> Self {
        Self {
            node_details: NodeDetails {
                name: identity.name.clone(),
                metadata: NodeMetadata {
                    ec2_instance_id: identity.instance_id.clone(),
                    ec2_ipaddress: identity.private_ip.clone(),
                },
            },
        }
    }
}
