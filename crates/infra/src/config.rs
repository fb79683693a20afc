//! Configuration loading and representation.

use std::time::Duration;

/// Runtime knobs for the inventory core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// Page size used when a caller asks for no particular limit.
    pub default_page_size: usize,
    /// Upper bound on any requested limit.
    pub max_page_size: usize,
    /// How often a write is retried after losing a compare-and-swap race.
    pub max_mutation_retries: u32,
    /// Longest wait for a per-item lock before failing with a conflict.
    pub lock_timeout: Duration,
    /// Open-order count reported on the dashboard until an order source is wired in.
    pub open_orders: u64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
            max_mutation_retries: 3,
            lock_timeout: Duration::from_secs(2),
            open_orders: 0,
        }
    }
}

impl InventoryConfig {
    /// Load from `INVENTRACK_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let mut config = Self {
            default_page_size: parse_or(
                &lookup,
                "INVENTRACK_DEFAULT_PAGE_SIZE",
                defaults.default_page_size,
            ),
            max_page_size: parse_or(&lookup, "INVENTRACK_MAX_PAGE_SIZE", defaults.max_page_size),
            max_mutation_retries: parse_or(
                &lookup,
                "INVENTRACK_MAX_MUTATION_RETRIES",
                defaults.max_mutation_retries,
            ),
            lock_timeout: Duration::from_millis(parse_or(
                &lookup,
                "INVENTRACK_LOCK_TIMEOUT_MS",
                defaults.lock_timeout.as_millis() as u64,
            )),
            open_orders: parse_or(&lookup, "INVENTRACK_OPEN_ORDERS", defaults.open_orders),
        };

        if config.default_page_size == 0 {
            tracing::warn!("INVENTRACK_DEFAULT_PAGE_SIZE must be positive; using default");
            config.default_page_size = defaults.default_page_size;
        }
        if config.max_page_size < config.default_page_size {
            tracing::warn!(
                max = config.max_page_size,
                default = config.default_page_size,
                "max page size below default page size; raising it"
            );
            config.max_page_size = config.default_page_size;
        }
        config
    }

    /// Resolve a caller-requested limit: absent or zero means the default page
    /// size, anything above the maximum is clamped.
    pub fn page_limit(&self, requested: Option<usize>) -> usize {
        match requested {
            None | Some(0) => self.default_page_size,
            Some(n) => n.min(self.max_page_size),
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: core::str::FromStr + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring malformed config value");
            default
        }),
    }
}
