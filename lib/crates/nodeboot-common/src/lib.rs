//! Types shared between the nodeboot CLI and tooling that generates its
//! provisioning input.

pub mod context;
pub mod identity;

pub use context::{
    AgentSettings, CA_PORT, ContextError, DnsSettings, InstallerEndpoint, ProvisioningContext,
};
pub use identity::{NodeDetails, NodeIdentity, NodeMetadata, RegistrationRequest};
