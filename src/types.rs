use soroban_sdk::{contracttype, Address};

// ---------------------------------------------------------------------------
// Global configuration
// ---------------------------------------------------------------------------

/// Global configuration for the Veriflow protocol.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub token: Address,
    pub admin: Address,
}

/// Registry roles an identity can hold.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuthRole {
    /// May report SLA breaches and trigger refunds.
    Oracle = 0,
    /// May submit raw metric observations.
    Agent = 1,
}

// ---------------------------------------------------------------------------
// Streams
// ---------------------------------------------------------------------------

/// SLA thresholds agreed at stream creation, plus the flat refund policy
/// applied when no graduated tiers are configured.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SlaConfig {
    /// Maximum acceptable latency in milliseconds.
    pub max_latency: u64,
    /// Minimum acceptable uptime in basis points (0-10000).
    pub min_uptime: u32,
    /// Maximum acceptable error rate in basis points (0-10000).
    pub max_error_rate: u32,
    /// Maximum acceptable jitter in milliseconds.
    pub max_jitter: u64,
    /// Flat refund per breach in basis points, used in legacy refund mode.
    pub refund_percent_on_breach: u32,
    /// Terminate the stream once the severe-breach threshold is reached.
    pub auto_stop_on_severe_breach: bool,
}

/// Graduated refund schedule. Severity below `tier1_threshold` refunds
/// `tier1_percent`, severity from `tier1_threshold` up refunds
/// `tier2_percent`, severity from `tier2_threshold` up refunds
/// `tier3_percent`. Boundary values belong to the higher tier.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundTiers {
    pub tier1_percent: u32,
    pub tier2_percent: u32,
    pub tier3_percent: u32,
    pub tier1_threshold: u64,
    pub tier2_threshold: u64,
}

/// How breach refunds are computed for a stream. Kept explicit rather than
/// inferring the mode from sentinel threshold values.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RefundMode {
    /// Flat `refund_percent_on_breach` of the deposit per breach.
    Legacy,
    /// Graduated tier schedule.
    Tiered(RefundTiers),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stream {
    /// Unique stream identifier.
    pub id: u64,
    /// The payer who funded the stream; immutable.
    pub sender: Address,
    /// The payee funds vest to; immutable.
    pub recipient: Address,
    /// Total committed amount at creation; immutable.
    pub deposit: i128,
    /// `deposit / (stop_time - start_time)`, floor division, fixed at creation.
    pub rate_per_second: i128,
    /// Unix timestamp when vesting begins.
    pub start_time: u64,
    /// Unix timestamp when vesting completes.
    pub stop_time: u64,
    /// Funds not yet withdrawn or refunded. Never exceeds `deposit`,
    /// never increases.
    pub remaining_balance: i128,
    /// Cleared exactly once, on cancellation or auto-stop.
    pub is_active: bool,
    /// SLA thresholds and legacy refund policy.
    pub sla: SlaConfig,
    /// Refund computation mode.
    pub refund_mode: RefundMode,
    /// Number of breaches reported against this stream.
    pub breach_count: u32,
    /// Total amount refunded to the sender through breaches.
    pub total_refunded: i128,
}

/// Parameters for creating a single stream in a batch.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateStreamParams {
    pub recipient: Address,
    pub deposit: i128,
    pub start_time: u64,
    pub stop_time: u64,
    pub sla: SlaConfig,
    pub refund_tiers: Option<RefundTiers>,
}

// ---------------------------------------------------------------------------
// Metrics & breaches
// ---------------------------------------------------------------------------

/// Monitored metric categories.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BreachType {
    Latency = 0,
    Uptime = 1,
    ErrorRate = 2,
    Jitter = 3,
}

/// A single metric observation. Reports are append-only and never mutated.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MetricReport {
    pub stream_id: u64,
    /// Observed latency in milliseconds.
    pub latency: u64,
    /// Observed uptime in basis points.
    pub uptime: u32,
    /// Observed error rate in basis points.
    pub error_rate: u32,
    /// Observed jitter in milliseconds.
    pub jitter: u64,
    /// Observation time: the signed timestamp for relayed reports, the
    /// ledger time for direct submissions.
    pub timestamp: u64,
    /// The identity the observation is attributed to.
    pub reporter: Address,
}

// ---------------------------------------------------------------------------
// Event payloads
// ---------------------------------------------------------------------------

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BreachEvent {
    pub breach_type: BreachType,
    pub breach_value: u64,
    pub breach_count: u32,
}

/// Tier 0 marks a legacy flat-percentage refund.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundEvent {
    pub amount: i128,
    pub tier: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CancelEvent {
    pub recipient_share: i128,
    pub sender_share: i128,
}

/// Informational notice that an observation crossed a reference threshold.
/// Advisory only; refunds are triggered exclusively by breach reports.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThresholdAlert {
    pub metric: BreachType,
    pub observed: u64,
    pub limit: u64,
}
