//! Check-config command: validate the provisioning file.

use anyhow::Result;
use nodeboot_common::ProvisioningContext;

use crate::app::AppContext;
use crate::application::services::registration::redact_token;

/// Load the provisioning file and print what the bootstrap would use.
///
/// # Errors
///
/// Returns an error if the file is missing, malformed, or invalid.
pub fn run(app: &AppContext) -> Result<()> {
    let context = app.load_context()?;
    app.output.success(&format!(
        "{} is valid",
        app.config_path().display()
    ));
    for (key, value) in summary(&context) {
        app.output.kv(&format!("{key:<14}"), &value);
    }
    Ok(())
}

/// Key/value lines describing `context`, secrets redacted.
#[must_use]
pub fn summary(context: &ProvisioningContext) -> Vec<(&'static str, String)> {
    let mut lines = vec![
        (
            "installer",
            format!(
                "{} ({})",
                context.installer.hostname, context.installer.ip_address
            ),
        ),
        ("webservice", context.webservice_base_url()),
        ("ca", context.ca_url()),
        (
            "registration",
            context
                .registration_url()
                .map_or_else(|| "disabled".to_string(), |url| redact_token(&url)),
        ),
    ];
    if context.dns.override_dns {
        let nameservers: Vec<String> = context
            .dns
            .nameservers
            .iter()
            .map(ToString::to_string)
            .collect();
        lines.push(("nameservers", nameservers.join(", ")));
        lines.push((
            "domain",
            context.dns.domain.clone().unwrap_or_default(),
        ));
    } else {
        lines.push(("dns override", "disabled".to_string()));
    }
    lines.push((
        "agent",
        format!(
            "splay {}s, waitforcert {}s",
            context.agent.splay_limit, context.agent.wait_for_cert
        ),
    ));
    lines
}
