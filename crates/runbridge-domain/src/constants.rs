//! Fixed tables shared by the services.

/// Actor whose datasets only understand the `simplified` projection flag.
///
/// Remove once no stored runs of this actor are reachable.
pub const LEGACY_ACTOR_ID: &str = "YPh5JENjSSR6vBf2E";

/// Formats offered as full-dataset download links.
pub const EXPORT_FORMATS: [&str; 6] = ["xml", "csv", "json", "xlsx", "html", "rss"];

/// Run fields that never reach the host.
pub const STRIPPED_RUN_FIELDS: [&str; 4] = ["meta", "stats", "options", "userId"];

/// Run memory sizes the platform accepts, in megabytes.
pub const MEMORY_OPTIONS_MB: [u32; 9] = [128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768];

/// Longest synchronous wait for a started run, in seconds.
pub const MAX_WAIT_FOR_FINISH_SECS: u64 = 60;

/// Run events a webhook subscription listens to.
pub const WEBHOOK_EVENT_TYPES: [&str; 4] = [
    "ACTOR.RUN.SUCCEEDED",
    "ACTOR.RUN.FAILED",
    "ACTOR.RUN.TIMED_OUT",
    "ACTOR.RUN.ABORTED",
];

/// Page size used when walking actor and task listings.
pub const LISTING_PAGE_SIZE: usize = 500;
