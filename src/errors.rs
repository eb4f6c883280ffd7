use soroban_sdk::contracterror;

/// Error codes for the Veriflow streaming contract.
/// Each variant maps to a unique u32 for on-chain error reporting.
#[contracterror]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum StreamError {
    /// The contract has already been initialized.
    AlreadyInitialized = 1,
    /// The contract has not been initialized yet.
    NotInitialized = 2,
    /// The caller is not permitted to perform this action.
    /// Covers admin-only calls, third-party cancellations and metric
    /// submissions from identities without the agent role.
    Unauthorized = 3,
    /// `start_time` is not strictly before `stop_time`.
    InvalidTimeRange = 4,
    /// The deposit is zero/negative, or so small relative to the stream
    /// duration that the per-second rate floors to zero.
    InvalidDeposit = 5,
    /// The recipient is not a valid counterparty (streaming to oneself).
    InvalidRecipient = 6,
    /// An SLA or refund-tier parameter is out of range: a basis-point
    /// field above 10000, a zero tier threshold, or misordered thresholds.
    InvalidSlaConfig = 7,
    /// The withdrawal amount is zero or negative.
    InvalidAmount = 8,
    /// No stream exists under the given id.
    StreamNotFound = 9,
    /// The stream has been cancelled, auto-stopped or exhausted; terminal
    /// streams accept no further mutation.
    StreamNotActive = 10,
    /// The requested amount exceeds the vested, unconsumed balance.
    InsufficientBalance = 11,
    /// The caller holds no oracle authorization and may not report breaches.
    OracleNotAuthorized = 12,
    /// A metric field is out of range (uptime or error rate above 10000 bps).
    InvalidMetrics = 13,
    /// The parallel arrays of a batch submission differ in length.
    BatchLengthMismatch = 14,
    /// The signing key is not bound to an agent-authorized identity, or the
    /// signature has already been consumed.
    InvalidSignature = 15,
    /// The signed timestamp is more than 300 seconds behind the ledger time.
    TimestampTooOld = 16,
    /// The signed timestamp is more than 60 seconds ahead of the ledger time.
    TimestampInFuture = 17,
    /// No metric report exists at the given index.
    ReportNotFound = 18,
    /// The stream's SLA does not enable auto-stop, so it cannot be forced
    /// into termination through breach reports.
    AutoStopDisabled = 19,
}
