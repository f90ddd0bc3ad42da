pub mod network {
    pub const US_REST_BASE_URL: &str = "https://api.newrelic.com/v2";
    pub const EU_REST_BASE_URL: &str = "https://api.eu.newrelic.com/v2";
    pub const US_NERDGRAPH_URL: &str = "https://api.newrelic.com/graphql";
    pub const EU_NERDGRAPH_URL: &str = "https://api.eu.newrelic.com/graphql";
}

pub mod pagination {
    /// Hard stop for link-relation walks. A backend that keeps handing
    /// out `next` links fails the call instead of looping forever.
    pub const MAX_PAGES: usize = 200;
}

pub mod tools {
    /// Tools that cannot run without a resolvable account id
    /// (per-call override, fallback field, or process default).
    pub const ACCOUNT_REQUIRED: &[&str] = &[
        "run_nrql_query",
        "list_apm_applications",
        "search_entities",
        "get_account_details",
        "list_alert_policies",
        "list_open_incidents",
        "list_synthetics_monitors",
        "create_browser_monitor",
    ];

    /// Subset whose resolved account id must match `^\d+$`. These
    /// interpolate the id where only a numeric literal is valid.
    pub const NUMERIC_ACCOUNT: &[&str] = &[
        "run_nrql_query",
        "get_account_details",
        "list_apm_applications",
        "list_alert_policies",
        "list_open_incidents",
        "create_browser_monitor",
    ];
}
