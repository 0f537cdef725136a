//! Property-based tests for backoff bounds and host file rendering.
//!
//! Uses `proptest` to verify invariants across many random inputs.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use nodeboot_cli::domain::backoff::{next_delay, seed};
use nodeboot_cli::domain::host::{append_hosts_entry, hosts_entry, render_resolv_conf};
use nodeboot_cli::domain::http::{HTTP_ATTEMPTS, http_backoff};
use nodeboot_common::DnsSettings;

// ============================================================================
// Command retry backoff
// ============================================================================

proptest! {
    /// The jittered delay never leaves `[seed / 2, seed]`.
    #[test]
    fn prop_delay_within_half_open_seed_window(
        attempt in 0u32..80,
        base_ms in 1u64..5_000,
        ceiling_ms in 1u64..120_000,
        rng_seed in any::<u64>(),
    ) {
        let base = Duration::from_millis(base_ms);
        let ceiling = Duration::from_millis(ceiling_ms);
        let mut rng = StdRng::seed_from_u64(rng_seed);

        let upper = seed(attempt, base, ceiling);
        let delay = next_delay(attempt, base, ceiling, &mut rng);

        prop_assert!(delay <= upper, "{delay:?} above {upper:?}");
        prop_assert!(delay.as_millis() >= upper.as_millis() / 2, "{delay:?} below half of {upper:?}");
    }

    /// The seed grows monotonically with the attempt and is capped by the ceiling.
    #[test]
    fn prop_seed_monotonic_and_capped(
        attempt in 0u32..80,
        base_ms in 1u64..5_000,
        ceiling_ms in 1u64..120_000,
    ) {
        let base = Duration::from_millis(base_ms);
        let ceiling = Duration::from_millis(ceiling_ms);

        let here = seed(attempt, base, ceiling);
        let next = seed(attempt + 1, base, ceiling);

        prop_assert!(here <= next);
        prop_assert!(next <= ceiling);
    }
}

#[test]
fn test_http_backoff_schedule_is_fixed() {
    let total: u64 = (0..HTTP_ATTEMPTS - 1).map(|a| http_backoff(a).as_secs()).sum();
    // 2 + 4 + 8 + 16: no sleep follows the final attempt.
    assert_eq!(total, 30);
}

// ============================================================================
// Hosts file
// ============================================================================

fn hostname_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,20}(\\.[a-z][a-z0-9-]{0,10}){0,3}"
}

proptest! {
    /// Appending an entry twice changes the file once.
    #[test]
    fn prop_hosts_append_is_idempotent(
        octets in any::<[u8; 4]>(),
        hostname in hostname_strategy(),
        existing in "([0-9.]{7,15}\t[a-z.]{1,20}\n){0,5}",
    ) {
        let ip = IpAddr::V4(Ipv4Addr::from(octets));
        let entry = hosts_entry(ip, &hostname);

        let once = append_hosts_entry(&existing, &entry)
            .unwrap_or_else(|| existing.clone());
        prop_assert!(append_hosts_entry(&once, &entry).is_none());
        prop_assert!(once.starts_with(existing.as_str()));
        prop_assert!(once.ends_with('\n'));
    }

    /// Existing content is preserved even without a trailing newline.
    #[test]
    fn prop_hosts_append_keeps_unterminated_last_line(
        last in "[0-9.]{7,15} [a-z]{1,10}",
        hostname in hostname_strategy(),
    ) {
        let entry = hosts_entry(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), &hostname);
        if let Some(updated) = append_hosts_entry(&last, &entry) {
            let lines: Vec<&str> = updated.lines().collect();
            prop_assert_eq!(lines.first().copied(), Some(last.as_str()));
            prop_assert_eq!(lines.last().copied(), Some(entry.as_str()));
        }
    }
}

// ============================================================================
// Resolver file
// ============================================================================

proptest! {
    /// Every nameserver appears exactly once, in configured order.
    #[test]
    fn prop_resolv_conf_lists_nameservers_in_order(
        servers in prop::collection::vec(any::<[u8; 4]>(), 1..4),
    ) {
        let nameservers: Vec<IpAddr> = servers
            .iter()
            .map(|o| IpAddr::V4(Ipv4Addr::from(*o)))
            .collect();
        let dns = DnsSettings {
            override_dns: true,
            nameservers: nameservers.clone(),
            domain: Some("example.com".to_string()),
            ..DnsSettings::default()
        };

        let rendered = render_resolv_conf(&dns);
        let listed: Vec<String> = rendered
            .lines()
            .filter_map(|l| l.strip_prefix("nameserver "))
            .map(str::to_string)
            .collect();
        let expected: Vec<String> = nameservers.iter().map(ToString::to_string).collect();
        prop_assert_eq!(listed, expected);
    }
}
