#![no_std]

mod errors;
mod refund;
mod storage;
mod types;
mod vesting;

use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Bytes, BytesN, Env, Vec};

use errors::StreamError;
use storage::{
    get_agent_key, get_config, get_metric, get_metric_count, get_stream, get_stream_count,
    has_config, has_stream, is_agent_authorized, is_oracle_authorized, is_signature_used,
    mark_signature_used, save_stream, set_agent_authorized, set_agent_key, set_config, set_metric,
    set_metric_count, set_oracle_authorized, set_stream_count,
};
use types::{
    AuthRole, BreachEvent, BreachType, CancelEvent, Config, CreateStreamParams, MetricReport,
    RefundEvent, RefundMode, RefundTiers, SlaConfig, Stream, ThresholdAlert,
};

// ---------------------------------------------------------------------------
// Protocol constants
// ---------------------------------------------------------------------------

/// Upper bound for every basis-point field (100%).
pub const MAX_BPS: u32 = 10_000;

/// Breach count at which a stream with `auto_stop_on_severe_breach`
/// terminates and returns its remaining balance to the sender.
pub const SEVERE_BREACH_THRESHOLD: u32 = 3;

/// Signed metric reports older than this are rejected.
pub const MAX_METRIC_AGE_SECS: u64 = 300;

/// Signed metric reports dated further ahead than this are rejected.
pub const MAX_METRIC_FUTURE_DRIFT_SECS: u64 = 60;

// Reference thresholds for informational metric notices. These are advisory
// signals for external observers; refunds are driven only by breach reports
// checked against each stream's own SLA.
pub const REF_MAX_LATENCY_MS: u64 = 1_000;
pub const REF_MIN_UPTIME_BPS: u32 = 9_900;
pub const REF_MAX_ERROR_RATE_BPS: u32 = 500;
pub const REF_MAX_JITTER_MS: u64 = 500;

#[contract]
pub struct VeriflowStream;

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

impl VeriflowStream {
    fn require_config(env: &Env) -> Result<Config, StreamError> {
        get_config(env).ok_or(StreamError::NotInitialized)
    }

    fn require_admin(env: &Env) -> Result<Config, StreamError> {
        let config = Self::require_config(env)?;
        config.admin.require_auth();
        Ok(config)
    }

    fn load_stream(env: &Env, stream_id: u64) -> Result<Stream, StreamError> {
        get_stream(env, stream_id).ok_or(StreamError::StreamNotFound)
    }

    /// Validate creation parameters and derive the per-second rate.
    fn validate_stream_params(
        sender: &Address,
        recipient: &Address,
        deposit: i128,
        start_time: u64,
        stop_time: u64,
        sla: &SlaConfig,
    ) -> Result<i128, StreamError> {
        if start_time >= stop_time {
            return Err(StreamError::InvalidTimeRange);
        }
        if sender == recipient {
            return Err(StreamError::InvalidRecipient);
        }
        if deposit <= 0 {
            return Err(StreamError::InvalidDeposit);
        }
        let duration = (stop_time - start_time) as i128;
        let rate_per_second = deposit / duration;
        if rate_per_second == 0 {
            return Err(StreamError::InvalidDeposit);
        }
        Self::validate_sla(sla)?;
        Ok(rate_per_second)
    }

    fn validate_sla(sla: &SlaConfig) -> Result<(), StreamError> {
        if sla.min_uptime > MAX_BPS
            || sla.max_error_rate > MAX_BPS
            || sla.refund_percent_on_breach > MAX_BPS
        {
            return Err(StreamError::InvalidSlaConfig);
        }
        Ok(())
    }

    fn validate_tiers(tiers: &RefundTiers) -> Result<(), StreamError> {
        if tiers.tier1_percent > MAX_BPS
            || tiers.tier2_percent > MAX_BPS
            || tiers.tier3_percent > MAX_BPS
        {
            return Err(StreamError::InvalidSlaConfig);
        }
        if tiers.tier1_threshold == 0 || tiers.tier2_threshold == 0 {
            return Err(StreamError::InvalidSlaConfig);
        }
        if tiers.tier1_threshold >= tiers.tier2_threshold {
            return Err(StreamError::InvalidSlaConfig);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn persist_new_stream(
        env: &Env,
        stream_id: u64,
        sender: Address,
        recipient: Address,
        deposit: i128,
        rate_per_second: i128,
        start_time: u64,
        stop_time: u64,
        sla: SlaConfig,
        refund_mode: RefundMode,
    ) {
        let stream = Stream {
            id: stream_id,
            sender,
            recipient,
            deposit,
            rate_per_second,
            start_time,
            stop_time,
            remaining_balance: deposit,
            is_active: true,
            sla,
            refund_mode,
            breach_count: 0,
            total_refunded: 0,
        };
        save_stream(env, &stream);

        env.events()
            .publish((symbol_short!("created"), stream_id), deposit);
    }

    /// Pay out of the contract's own balance.
    fn pay(env: &Env, token_addr: &Address, to: &Address, amount: i128) {
        token::Client::new(env, token_addr).transfer(&env.current_contract_address(), to, &amount);
    }

    /// Apply one breach to an active stream: bump the counter, compute the
    /// refund, auto-stop once the severity threshold is reached. Mutates
    /// and persists `stream`, then performs the transfers. Returns
    /// `(refund, residual)`, both paid to the sender.
    fn apply_breach(
        env: &Env,
        token_addr: &Address,
        stream: &mut Stream,
        breach_type: BreachType,
        breach_value: u64,
    ) -> (i128, i128) {
        stream.breach_count += 1;

        let (refund_amount, tier) = refund::calculate_refund(
            stream.deposit,
            stream.remaining_balance,
            stream.sla.refund_percent_on_breach,
            &stream.refund_mode,
            breach_value,
        );
        if refund_amount > 0 {
            stream.remaining_balance -= refund_amount;
            stream.total_refunded += refund_amount;
        }

        let mut residual = 0;
        let auto_stopped = stream.sla.auto_stop_on_severe_breach
            && stream.breach_count >= SEVERE_BREACH_THRESHOLD;
        if auto_stopped {
            residual = stream.remaining_balance;
            stream.is_active = false;
            stream.remaining_balance = 0;
        }

        // CEI: persist and emit before the external token transfers.
        save_stream(env, stream);
        env.events().publish(
            (symbol_short!("breach"), stream.id),
            BreachEvent {
                breach_type,
                breach_value,
                breach_count: stream.breach_count,
            },
        );
        if refund_amount > 0 {
            env.events().publish(
                (symbol_short!("refund"), stream.id),
                RefundEvent {
                    amount: refund_amount,
                    tier,
                },
            );
        }
        if auto_stopped {
            env.events()
                .publish((symbol_short!("autostop"), stream.id), residual);
        }

        if refund_amount > 0 {
            Self::pay(env, token_addr, &stream.sender, refund_amount);
        }
        if residual > 0 {
            Self::pay(env, token_addr, &stream.sender, residual);
        }

        (refund_amount, residual)
    }

    fn require_oracle(env: &Env, oracle: &Address) -> Result<(), StreamError> {
        oracle.require_auth();
        if !is_oracle_authorized(env, oracle) {
            return Err(StreamError::OracleNotAuthorized);
        }
        Ok(())
    }

    fn require_agent(env: &Env, agent: &Address) -> Result<(), StreamError> {
        agent.require_auth();
        if !is_agent_authorized(env, agent) {
            return Err(StreamError::Unauthorized);
        }
        Ok(())
    }

    fn validate_metric_values(uptime: u32, error_rate: u32) -> Result<(), StreamError> {
        if uptime > MAX_BPS || error_rate > MAX_BPS {
            return Err(StreamError::InvalidMetrics);
        }
        Ok(())
    }

    /// Append a report to the stream's log and emit the advisory notices.
    fn append_report(env: &Env, report: &MetricReport) -> u32 {
        let index = get_metric_count(env, report.stream_id);
        set_metric(env, report.stream_id, index, report);
        set_metric_count(env, report.stream_id, index + 1);

        env.events()
            .publish((symbol_short!("metric"), report.stream_id), index);
        Self::emit_threshold_notices(env, report);
        index
    }

    fn emit_threshold_notices(env: &Env, report: &MetricReport) {
        let topic = (symbol_short!("thresh"), report.stream_id);
        if report.latency > REF_MAX_LATENCY_MS {
            env.events().publish(
                topic.clone(),
                ThresholdAlert {
                    metric: BreachType::Latency,
                    observed: report.latency,
                    limit: REF_MAX_LATENCY_MS,
                },
            );
        }
        if report.uptime < REF_MIN_UPTIME_BPS {
            env.events().publish(
                topic.clone(),
                ThresholdAlert {
                    metric: BreachType::Uptime,
                    observed: report.uptime as u64,
                    limit: REF_MIN_UPTIME_BPS as u64,
                },
            );
        }
        if report.error_rate > REF_MAX_ERROR_RATE_BPS {
            env.events().publish(
                topic.clone(),
                ThresholdAlert {
                    metric: BreachType::ErrorRate,
                    observed: report.error_rate as u64,
                    limit: REF_MAX_ERROR_RATE_BPS as u64,
                },
            );
        }
        if report.jitter > REF_MAX_JITTER_MS {
            env.events().publish(
                topic,
                ThresholdAlert {
                    metric: BreachType::Jitter,
                    observed: report.jitter,
                    limit: REF_MAX_JITTER_MS,
                },
            );
        }
    }

    /// Fixed-width big-endian encoding of the signed metric fields. The
    /// signer and the contract must agree on this layout byte for byte.
    fn signed_payload(
        env: &Env,
        stream_id: u64,
        latency: u64,
        uptime: u32,
        error_rate: u32,
        jitter: u64,
        timestamp: u64,
    ) -> Bytes {
        let mut payload = Bytes::new(env);
        payload.extend_from_array(&stream_id.to_be_bytes());
        payload.extend_from_array(&latency.to_be_bytes());
        payload.extend_from_array(&uptime.to_be_bytes());
        payload.extend_from_array(&error_rate.to_be_bytes());
        payload.extend_from_array(&jitter.to_be_bytes());
        payload.extend_from_array(&timestamp.to_be_bytes());
        payload
    }

    #[allow(clippy::too_many_arguments)]
    fn create_internal(
        env: &Env,
        sender: Address,
        recipient: Address,
        deposit: i128,
        start_time: u64,
        stop_time: u64,
        sla: SlaConfig,
        refund_mode: RefundMode,
    ) -> Result<u64, StreamError> {
        sender.require_auth();
        let config = Self::require_config(env)?;
        let rate_per_second =
            Self::validate_stream_params(&sender, &recipient, deposit, start_time, stop_time, &sla)?;

        // Pull the deposit first; if the transfer fails nothing is persisted.
        token::Client::new(env, &config.token).transfer(
            &sender,
            &env.current_contract_address(),
            &deposit,
        );

        let stream_id = get_stream_count(env);
        set_stream_count(env, stream_id + 1);
        Self::persist_new_stream(
            env,
            stream_id,
            sender,
            recipient,
            deposit,
            rate_per_second,
            start_time,
            stop_time,
            sla,
            refund_mode,
        );
        Ok(stream_id)
    }
}

// ---------------------------------------------------------------------------
// Contract implementation
// ---------------------------------------------------------------------------

#[contractimpl]
impl VeriflowStream {
    /// Initialise the contract with the streaming token and admin address.
    ///
    /// Must be called exactly once before any other operation. The admin
    /// controls the authorization registry and is itself authorized for
    /// both the oracle and agent roles, so a fresh deployment is usable
    /// without further registry calls.
    ///
    /// # Errors
    /// - `AlreadyInitialized` when called a second time.
    pub fn init(env: Env, token: Address, admin: Address) -> Result<(), StreamError> {
        if has_config(&env) {
            return Err(StreamError::AlreadyInitialized);
        }
        set_config(
            &env,
            &Config {
                token,
                admin: admin.clone(),
            },
        );
        set_stream_count(&env, 0);
        set_oracle_authorized(&env, &admin, true);
        set_agent_authorized(&env, &admin, true);

        // Ensure instance storage (Config/ID counter) doesn't expire quickly.
        env.storage()
            .instance()
            .extend_ttl(storage::TTL_THRESHOLD, storage::TTL_EXTEND_TO);
        Ok(())
    }

    /// Rotate the admin key. Current admin only.
    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), StreamError> {
        let mut config = Self::require_admin(&env)?;
        let old_admin = config.admin.clone();
        config.admin = new_admin.clone();
        set_config(&env, &config);

        env.events().publish(
            (symbol_short!("admin"), symbol_short!("updated")),
            (old_admin, new_admin),
        );
        Ok(())
    }

    /// Grant or revoke a registry role for `identity`. Admin only.
    ///
    /// Granting a role an identity already holds (or revoking one it does
    /// not) is a no-op, not an error.
    pub fn authorize(
        env: Env,
        identity: Address,
        role: AuthRole,
        enabled: bool,
    ) -> Result<(), StreamError> {
        Self::require_admin(&env)?;
        match role {
            AuthRole::Oracle => set_oracle_authorized(&env, &identity, enabled),
            AuthRole::Agent => set_agent_authorized(&env, &identity, enabled),
        }

        env.events()
            .publish((symbol_short!("auth"), identity), (role, enabled));
        Ok(())
    }

    /// Whether `identity` currently holds `role`.
    pub fn is_authorized(env: Env, identity: Address, role: AuthRole) -> bool {
        match role {
            AuthRole::Oracle => is_oracle_authorized(&env, &identity),
            AuthRole::Agent => is_agent_authorized(&env, &identity),
        }
    }

    /// Bind an ed25519 signing key to the identity it signs for. Admin only.
    ///
    /// Signed metric reports are attributed to the bound identity, which
    /// must also hold the agent role at submission time.
    pub fn register_agent_key(
        env: Env,
        public_key: BytesN<32>,
        identity: Address,
    ) -> Result<(), StreamError> {
        Self::require_admin(&env)?;
        set_agent_key(&env, &public_key, &identity);

        env.events()
            .publish((symbol_short!("agentkey"), identity), public_key);
        Ok(())
    }

    /// Create a new payment stream with specified parameters.
    ///
    /// Transfers `deposit` from the sender into the contract, then records
    /// a stream vesting linearly from `start_time` to `stop_time` at
    /// `deposit / (stop_time - start_time)` per second (floor division,
    /// fixed at creation). Breach refunds use the legacy flat percentage
    /// from `sla`.
    ///
    /// # Authorization
    /// Requires authorization from `sender`.
    ///
    /// # Errors
    /// - `InvalidTimeRange` when `start_time >= stop_time`
    /// - `InvalidRecipient` when the sender streams to itself
    /// - `InvalidDeposit` when `deposit <= 0` or the derived rate floors
    ///   to zero
    /// - `InvalidSlaConfig` when a basis-point field exceeds 10000
    ///
    /// # Events
    /// Publishes `created(stream_id, deposit)` on success.
    ///
    /// # Usage Notes
    /// - The call is atomic: if the deposit transfer fails, no stream is
    ///   created and the ID counter is untouched.
    /// - Stream IDs are sequential starting from 0.
    #[allow(clippy::too_many_arguments)]
    pub fn create_stream(
        env: Env,
        sender: Address,
        recipient: Address,
        deposit: i128,
        start_time: u64,
        stop_time: u64,
        sla: SlaConfig,
    ) -> Result<u64, StreamError> {
        Self::create_internal(
            &env,
            sender,
            recipient,
            deposit,
            start_time,
            stop_time,
            sla,
            RefundMode::Legacy,
        )
    }

    /// Create a stream whose breach refunds follow a graduated tier
    /// schedule instead of the legacy flat percentage.
    ///
    /// # Errors
    /// All of `create_stream`, plus `InvalidSlaConfig` when a tier
    /// percentage exceeds 10000 bp, a threshold is zero, or
    /// `tier1_threshold >= tier2_threshold`.
    #[allow(clippy::too_many_arguments)]
    pub fn create_stream_with_tiers(
        env: Env,
        sender: Address,
        recipient: Address,
        deposit: i128,
        start_time: u64,
        stop_time: u64,
        sla: SlaConfig,
        tiers: RefundTiers,
    ) -> Result<u64, StreamError> {
        Self::validate_tiers(&tiers)?;
        Self::create_internal(
            &env,
            sender,
            recipient,
            deposit,
            start_time,
            stop_time,
            sla,
            RefundMode::Tiered(tiers),
        )
    }

    /// Create multiple payment streams in a single transaction.
    ///
    /// Every item is validated with the single-creation rules before any
    /// state is written; one bulk transfer funds the whole batch with the
    /// sum of the per-item deposits. The ID counter advances once, by the
    /// batch size, so the records occupy ids `first..first + N` and are
    /// mutually independent thereafter.
    ///
    /// # Authorization
    /// Requires authorization from `sender` exactly once for the batch.
    pub fn create_streams(
        env: Env,
        sender: Address,
        items: Vec<CreateStreamParams>,
    ) -> Result<Vec<u64>, StreamError> {
        sender.require_auth();
        let config = Self::require_config(&env)?;

        // First pass: validate all items and total the funding requirement.
        let mut total_deposit: i128 = 0;
        for item in items.iter() {
            Self::validate_stream_params(
                &sender,
                &item.recipient,
                item.deposit,
                item.start_time,
                item.stop_time,
                &item.sla,
            )?;
            if let Some(tiers) = &item.refund_tiers {
                Self::validate_tiers(tiers)?;
            }
            total_deposit = total_deposit
                .checked_add(item.deposit)
                .ok_or(StreamError::InvalidDeposit)?;
        }

        if total_deposit > 0 {
            token::Client::new(&env, &config.token).transfer(
                &sender,
                &env.current_contract_address(),
                &total_deposit,
            );
        }

        // Second pass: one counter bump for the whole batch, then persist.
        let first_id = get_stream_count(&env);
        set_stream_count(&env, first_id + items.len() as u64);

        let mut created_ids = Vec::new(&env);
        for (offset, item) in items.iter().enumerate() {
            let stream_id = first_id + offset as u64;
            let duration = (item.stop_time - item.start_time) as i128;
            let refund_mode = match item.refund_tiers {
                Some(tiers) => RefundMode::Tiered(tiers),
                None => RefundMode::Legacy,
            };
            Self::persist_new_stream(
                &env,
                stream_id,
                sender.clone(),
                item.recipient.clone(),
                item.deposit,
                item.deposit / duration,
                item.start_time,
                item.stop_time,
                item.sla.clone(),
                refund_mode,
            );
            created_ids.push_back(stream_id);
        }

        env.events()
            .publish((symbol_short!("b_create"), sender), created_ids.clone());
        Ok(created_ids)
    }

    /// The amount the recipient could withdraw right now.
    ///
    /// Zero before `start_time` and for terminated streams; the full
    /// remaining balance from `stop_time` on; otherwise the vested amount
    /// less everything already withdrawn or refunded. Read-only and safe
    /// for any caller.
    pub fn balance_of(env: Env, stream_id: u64) -> Result<i128, StreamError> {
        let stream = Self::load_stream(&env, stream_id)?;
        Ok(vesting::withdrawable(&stream, env.ledger().timestamp()))
    }

    /// Withdraw `amount` from a stream to its recipient.
    ///
    /// # Authorization
    /// Requires authorization from the stream's recipient.
    ///
    /// # Errors
    /// - `StreamNotActive` for cancelled or auto-stopped streams
    /// - `InvalidAmount` when `amount <= 0`
    /// - `InsufficientBalance` when `amount` exceeds the withdrawable
    ///   balance; the stream is left untouched
    ///
    /// # Events
    /// Publishes `withdrew(stream_id, amount)` before the token transfer.
    pub fn withdraw(env: Env, stream_id: u64, amount: i128) -> Result<(), StreamError> {
        let config = Self::require_config(&env)?;
        let mut stream = Self::load_stream(&env, stream_id)?;
        stream.recipient.require_auth();

        if !stream.is_active {
            return Err(StreamError::StreamNotActive);
        }
        if amount <= 0 {
            return Err(StreamError::InvalidAmount);
        }
        let available = vesting::withdrawable(&stream, env.ledger().timestamp());
        if amount > available {
            return Err(StreamError::InsufficientBalance);
        }

        // CEI: update state before the external token transfer.
        stream.remaining_balance -= amount;
        save_stream(&env, &stream);

        env.events()
            .publish((symbol_short!("withdrew"), stream_id), amount);

        Self::pay(&env, &config.token, &stream.recipient, amount);
        Ok(())
    }

    /// Withdraw everything currently withdrawable; returns the amount.
    ///
    /// A zero balance returns 0 without transfer, state change or event,
    /// so callers need not pre-check the balance.
    pub fn withdraw_max(env: Env, stream_id: u64) -> Result<i128, StreamError> {
        let config = Self::require_config(&env)?;
        let mut stream = Self::load_stream(&env, stream_id)?;
        stream.recipient.require_auth();

        if !stream.is_active {
            return Err(StreamError::StreamNotActive);
        }
        let available = vesting::withdrawable(&stream, env.ledger().timestamp());
        if available == 0 {
            return Ok(0);
        }

        stream.remaining_balance -= available;
        save_stream(&env, &stream);

        env.events()
            .publish((symbol_short!("withdrew"), stream_id), available);

        Self::pay(&env, &config.token, &stream.recipient, available);
        Ok(available)
    }

    /// Cancel a stream, splitting the remaining balance between the
    /// parties: the recipient is paid everything vested so far, the
    /// sender the rest.
    ///
    /// # Authorization
    /// `caller` must authorize, and must be the stream's sender or
    /// recipient.
    ///
    /// # Errors
    /// - `Unauthorized` for any third party
    /// - `StreamNotActive` when the stream is already terminated
    ///
    /// # Usage Notes
    /// Cancellation is terminal and all-or-nothing: the stream is
    /// deactivated, its balance zeroed and both shares paid, or nothing
    /// happens at all.
    pub fn cancel_stream(env: Env, caller: Address, stream_id: u64) -> Result<(), StreamError> {
        let config = Self::require_config(&env)?;
        let mut stream = Self::load_stream(&env, stream_id)?;
        caller.require_auth();

        if caller != stream.sender && caller != stream.recipient {
            return Err(StreamError::Unauthorized);
        }
        if !stream.is_active {
            return Err(StreamError::StreamNotActive);
        }

        let recipient_share = vesting::withdrawable(&stream, env.ledger().timestamp());
        let sender_share = stream.remaining_balance - recipient_share;

        // CEI: update state before the external token transfers.
        stream.is_active = false;
        stream.remaining_balance = 0;
        save_stream(&env, &stream);

        env.events().publish(
            (symbol_short!("cancelled"), stream_id),
            CancelEvent {
                recipient_share,
                sender_share,
            },
        );

        if recipient_share > 0 {
            Self::pay(&env, &config.token, &stream.recipient, recipient_share);
        }
        if sender_share > 0 {
            Self::pay(&env, &config.token, &stream.sender, sender_share);
        }
        Ok(())
    }

    /// Report an SLA breach against an active stream.
    ///
    /// Increments the stream's breach counter, computes the refund for the
    /// given severity (flat percentage in legacy mode, graduated tier
    /// otherwise, always clamped to the remaining balance) and pays it to
    /// the sender. Once the stream has accumulated
    /// `SEVERE_BREACH_THRESHOLD` breaches and its SLA enables auto-stop,
    /// the stream terminates and the full remaining balance returns to
    /// the sender.
    ///
    /// Returns the refund amount (excluding any auto-stop residual).
    ///
    /// # Authorization
    /// Requires authorization from `oracle`, which must hold the oracle
    /// role (`OracleNotAuthorized` otherwise).
    ///
    /// # Events
    /// `breach`, then `refund` (tagged with the tier) when the refund is
    /// non-zero, then `autostop` when the stream terminates.
    pub fn report_breach(
        env: Env,
        oracle: Address,
        stream_id: u64,
        breach_type: BreachType,
        breach_value: u64,
    ) -> Result<i128, StreamError> {
        let config = Self::require_config(&env)?;
        Self::require_oracle(&env, &oracle)?;

        let mut stream = Self::load_stream(&env, stream_id)?;
        if !stream.is_active {
            return Err(StreamError::StreamNotActive);
        }

        let (refunded, _) =
            Self::apply_breach(&env, &config.token, &mut stream, breach_type, breach_value);
        Ok(refunded)
    }

    /// Drive a stream to termination with maximal-severity breaches,
    /// returning its full remaining balance to the sender. Oracle only.
    ///
    /// Returns the total paid back to the sender. Fails with
    /// `AutoStopDisabled` (and no state change) when the stream's SLA
    /// does not enable auto-stop.
    pub fn force_full_refund(
        env: Env,
        oracle: Address,
        stream_id: u64,
    ) -> Result<i128, StreamError> {
        let config = Self::require_config(&env)?;
        Self::require_oracle(&env, &oracle)?;

        let mut stream = Self::load_stream(&env, stream_id)?;
        if !stream.is_active {
            return Err(StreamError::StreamNotActive);
        }

        let mut total: i128 = 0;
        for _ in 0..SEVERE_BREACH_THRESHOLD {
            if !stream.is_active {
                break;
            }
            let (refunded, residual) = Self::apply_breach(
                &env,
                &config.token,
                &mut stream,
                BreachType::Uptime,
                u64::MAX,
            );
            total += refunded + residual;
        }
        if stream.is_active {
            return Err(StreamError::AutoStopDisabled);
        }
        Ok(total)
    }

    /// Terminate a stream through repeated maximal-severity breach
    /// reports. Oracle only. Fails with `AutoStopDisabled` when the
    /// stream's SLA does not enable auto-stop.
    pub fn force_cancel(env: Env, oracle: Address, stream_id: u64) -> Result<(), StreamError> {
        Self::force_full_refund(env, oracle, stream_id)?;
        Ok(())
    }

    /// Submit a metric observation for a stream. Agent only.
    ///
    /// Appends an immutable report stamped with the ledger time and emits
    /// advisory `thresh` notices for values crossing the fixed reference
    /// thresholds. Notices never move funds; refunds are triggered only
    /// through `report_breach`. Terminated streams still accept reports.
    ///
    /// Returns the report's index in the stream's log.
    ///
    /// # Errors
    /// - `Unauthorized` when `agent` does not hold the agent role
    /// - `InvalidMetrics` when `uptime` or `error_rate` exceeds 10000 bp
    /// - `StreamNotFound` for an unknown stream
    pub fn submit_metric(
        env: Env,
        agent: Address,
        stream_id: u64,
        latency: u64,
        uptime: u32,
        error_rate: u32,
        jitter: u64,
    ) -> Result<u32, StreamError> {
        Self::require_agent(&env, &agent)?;
        Self::validate_metric_values(uptime, error_rate)?;
        if !has_stream(&env, stream_id) {
            return Err(StreamError::StreamNotFound);
        }

        let report = MetricReport {
            stream_id,
            latency,
            uptime,
            error_rate,
            jitter,
            timestamp: env.ledger().timestamp(),
            reporter: agent,
        };
        Ok(Self::append_report(&env, &report))
    }

    /// Submit a metric observation signed by a registered agent key.
    ///
    /// The caller needs no authorization of its own, enabling relayed and
    /// sponsored submission: the report is attributed to the identity
    /// bound to `public_key`, never to the relayer. The signature covers
    /// the fixed-width big-endian encoding of `(stream_id, latency,
    /// uptime, error_rate, jitter, timestamp)`.
    ///
    /// # Errors
    /// - `TimestampTooOld` / `TimestampInFuture` outside the freshness
    ///   window (300 s back, 60 s ahead of ledger time)
    /// - `InvalidSignature` when the key is unregistered, its identity no
    ///   longer holds the agent role, or the signature was already
    ///   consumed
    ///
    /// A cryptographically invalid signature aborts the invocation in the
    /// host, discarding all effects.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_signed_metric(
        env: Env,
        stream_id: u64,
        latency: u64,
        uptime: u32,
        error_rate: u32,
        jitter: u64,
        timestamp: u64,
        public_key: BytesN<32>,
        signature: BytesN<64>,
    ) -> Result<u32, StreamError> {
        Self::validate_metric_values(uptime, error_rate)?;
        if !has_stream(&env, stream_id) {
            return Err(StreamError::StreamNotFound);
        }

        let now = env.ledger().timestamp();
        if now.saturating_sub(timestamp) > MAX_METRIC_AGE_SECS {
            return Err(StreamError::TimestampTooOld);
        }
        if timestamp.saturating_sub(now) > MAX_METRIC_FUTURE_DRIFT_SECS {
            return Err(StreamError::TimestampInFuture);
        }

        let reporter = get_agent_key(&env, &public_key).ok_or(StreamError::InvalidSignature)?;
        if !is_agent_authorized(&env, &reporter) {
            return Err(StreamError::InvalidSignature);
        }
        if is_signature_used(&env, &signature) {
            return Err(StreamError::InvalidSignature);
        }

        let payload =
            Self::signed_payload(&env, stream_id, latency, uptime, error_rate, jitter, timestamp);
        env.crypto().ed25519_verify(&public_key, &payload, &signature);
        mark_signature_used(&env, &signature);

        let report = MetricReport {
            stream_id,
            latency,
            uptime,
            error_rate,
            jitter,
            timestamp,
            reporter,
        };
        Ok(Self::append_report(&env, &report))
    }

    /// Submit one metric observation per stream id, as parallel arrays.
    /// Agent only. Returns the number of reports appended.
    ///
    /// Every element is validated before any report is persisted; a
    /// length mismatch or a single invalid element fails the whole call.
    pub fn batch_submit_metrics(
        env: Env,
        agent: Address,
        stream_ids: Vec<u64>,
        latencies: Vec<u64>,
        uptimes: Vec<u32>,
        error_rates: Vec<u32>,
        jitters: Vec<u64>,
    ) -> Result<u32, StreamError> {
        Self::require_agent(&env, &agent)?;

        let n = stream_ids.len();
        if latencies.len() != n
            || uptimes.len() != n
            || error_rates.len() != n
            || jitters.len() != n
        {
            return Err(StreamError::BatchLengthMismatch);
        }

        // First pass: validate every element before touching the log.
        for i in 0..n {
            Self::validate_metric_values(uptimes.get_unchecked(i), error_rates.get_unchecked(i))?;
            if !has_stream(&env, stream_ids.get_unchecked(i)) {
                return Err(StreamError::StreamNotFound);
            }
        }

        let now = env.ledger().timestamp();
        for i in 0..n {
            let report = MetricReport {
                stream_id: stream_ids.get_unchecked(i),
                latency: latencies.get_unchecked(i),
                uptime: uptimes.get_unchecked(i),
                error_rate: error_rates.get_unchecked(i),
                jitter: jitters.get_unchecked(i),
                timestamp: now,
                reporter: agent.clone(),
            };
            Self::append_report(&env, &report);
        }
        Ok(n)
    }

    // ── Query functions ──────────────────────────────────────────────

    /// Retrieve the complete state of a stream.
    pub fn get_stream(env: Env, stream_id: u64) -> Result<Stream, StreamError> {
        Self::load_stream(&env, stream_id)
    }

    /// Total number of streams ever created.
    pub fn get_stream_count(env: Env) -> u64 {
        get_stream_count(&env)
    }

    /// Number of metric reports appended for a stream.
    pub fn get_metric_count(env: Env, stream_id: u64) -> u32 {
        get_metric_count(&env, stream_id)
    }

    /// Retrieve a metric report by stream id and log index.
    pub fn get_metric(env: Env, stream_id: u64, index: u32) -> Result<MetricReport, StreamError> {
        get_metric(&env, stream_id, index).ok_or(StreamError::ReportNotFound)
    }

    /// Retrieve the global contract configuration.
    pub fn get_config(env: Env) -> Result<Config, StreamError> {
        Self::require_config(&env)
    }
}
