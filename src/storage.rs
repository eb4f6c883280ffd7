use soroban_sdk::{contracttype, Address, BytesN, Env};

use crate::types::{Config, MetricReport, Stream};

/// TTL policy for persistent entries: extend to the maximum whenever an
/// entry is written and its remaining lifetime drops below the threshold.
pub const TTL_THRESHOLD: u32 = 17280;
pub const TTL_EXTEND_TO: u32 = 120960;

/// Namespace for all contract storage keys.
#[contracttype]
pub enum DataKey {
    /// Instance storage for global settings (admin/token).
    Config,
    /// Instance storage for the auto-incrementing stream ID counter.
    NextStreamId,
    /// Persistent storage for individual stream data (O(1) lookup).
    Stream(u64),
    /// Number of metric reports appended for a stream.
    MetricCount(u64),
    /// Append-only metric log entry (stream id, report index).
    Metric(u64, u32),
    /// Oracle role bit for an identity.
    OracleAuth(Address),
    /// Agent role bit for an identity.
    AgentAuth(Address),
    /// Binding from an ed25519 signing key to the identity it signs for.
    AgentKey(BytesN<32>),
    /// Consumed signed-metric signatures (replay guard).
    UsedSig(BytesN<64>),
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> Option<Config> {
    env.storage().instance().get(&DataKey::Config)
}

pub fn set_config(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
}

// ---------------------------------------------------------------------------
// Stream helpers
// ---------------------------------------------------------------------------

pub fn get_stream_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::NextStreamId)
        .unwrap_or(0u64)
}

pub fn set_stream_count(env: &Env, count: u64) {
    env.storage().instance().set(&DataKey::NextStreamId, &count);
}

pub fn get_stream(env: &Env, stream_id: u64) -> Option<Stream> {
    env.storage().persistent().get(&DataKey::Stream(stream_id))
}

pub fn has_stream(env: &Env, stream_id: u64) -> bool {
    env.storage().persistent().has(&DataKey::Stream(stream_id))
}

pub fn save_stream(env: &Env, stream: &Stream) {
    let key = DataKey::Stream(stream.id);
    env.storage().persistent().set(&key, stream);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ---------------------------------------------------------------------------
// Metric log helpers
// ---------------------------------------------------------------------------

pub fn get_metric_count(env: &Env, stream_id: u64) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::MetricCount(stream_id))
        .unwrap_or(0u32)
}

pub fn set_metric_count(env: &Env, stream_id: u64, count: u32) {
    env.storage()
        .persistent()
        .set(&DataKey::MetricCount(stream_id), &count);
}

pub fn get_metric(env: &Env, stream_id: u64, index: u32) -> Option<MetricReport> {
    env.storage()
        .persistent()
        .get(&DataKey::Metric(stream_id, index))
}

pub fn set_metric(env: &Env, stream_id: u64, index: u32, report: &MetricReport) {
    let key = DataKey::Metric(stream_id, index);
    env.storage().persistent().set(&key, report);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

// ---------------------------------------------------------------------------
// Authorization registry helpers
// ---------------------------------------------------------------------------

pub fn is_oracle_authorized(env: &Env, identity: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::OracleAuth(identity.clone()))
        .unwrap_or(false)
}

pub fn set_oracle_authorized(env: &Env, identity: &Address, enabled: bool) {
    env.storage()
        .persistent()
        .set(&DataKey::OracleAuth(identity.clone()), &enabled);
}

pub fn is_agent_authorized(env: &Env, identity: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&DataKey::AgentAuth(identity.clone()))
        .unwrap_or(false)
}

pub fn set_agent_authorized(env: &Env, identity: &Address, enabled: bool) {
    env.storage()
        .persistent()
        .set(&DataKey::AgentAuth(identity.clone()), &enabled);
}

pub fn get_agent_key(env: &Env, public_key: &BytesN<32>) -> Option<Address> {
    env.storage()
        .persistent()
        .get(&DataKey::AgentKey(public_key.clone()))
}

pub fn set_agent_key(env: &Env, public_key: &BytesN<32>, identity: &Address) {
    env.storage()
        .persistent()
        .set(&DataKey::AgentKey(public_key.clone()), identity);
}

pub fn is_signature_used(env: &Env, signature: &BytesN<64>) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::UsedSig(signature.clone()))
}

pub fn mark_signature_used(env: &Env, signature: &BytesN<64>) {
    env.storage()
        .persistent()
        .set(&DataKey::UsedSig(signature.clone()), &true);
}
