//! Tests for omega-core: types, protocol, errors

use chrono::Utc;
use omega_core::*;

// ===========================================================================
// SignalId
// ===========================================================================

#[test]
fn signal_id_new_and_display() {
    let id = SignalId::new("sig-123");
    assert_eq!(id.as_str(), "sig-123");
    assert_eq!(format!("{}", id), "sig-123");
}

#[test]
fn signal_id_generate_is_unique() {
    let a = SignalId::generate();
    let b = SignalId::generate();
    assert_ne!(a, b);
    assert_eq!(a.as_str().len(), 36);
}

#[test]
fn signal_id_serializes_transparent() {
    let id: SignalId = "abc".into();
    assert_eq!(serde_json::to_string(&id).unwrap(), r#""abc""#);
}

// ===========================================================================
// Tier / Quorum / Status
// ===========================================================================

#[test]
fn tier_serializes_screaming() {
    assert_eq!(serde_json::to_string(&Tier::Reflex).unwrap(), r#""REFLEX""#);
    assert_eq!(serde_json::to_string(&Tier::Tactical).unwrap(), r#""TACTICAL""#);
    assert_eq!(serde_json::to_string(&Tier::Strategic).unwrap(), r#""STRATEGIC""#);
    assert_eq!(Tier::Strategic.to_string(), "STRATEGIC");
}

#[test]
fn tier_maps_to_quorum() {
    assert_eq!(Tier::Reflex.quorum(), QuorumType::SingleWitness);
    assert_eq!(Tier::Tactical.quorum(), QuorumType::TriNode);
    assert_eq!(Tier::Strategic.quorum(), QuorumType::CouncilOfMany);
}

#[test]
fn quorum_uses_wire_names() {
    assert_eq!(serde_json::to_string(&QuorumType::SingleWitness).unwrap(), r#""one_verified""#);
    assert_eq!(serde_json::to_string(&QuorumType::TriNode).unwrap(), r#""trinity_lock""#);
    assert_eq!(serde_json::to_string(&QuorumType::CouncilOfMany).unwrap(), r#""multitude""#);
}

#[test]
fn decision_status_wire_names() {
    assert_eq!(serde_json::to_string(&DecisionStatus::Executed).unwrap(), r#""EXECUTED""#);
    assert_eq!(serde_json::to_string(&DecisionStatus::Authorized).unwrap(), r#""AUTHORIZED""#);
    assert_eq!(
        serde_json::to_string(&DecisionStatus::HeldForArbitration).unwrap(),
        r#""HELD_FOR_ARBITRATION""#
    );
}

// ===========================================================================
// Vote
// ===========================================================================

#[test]
fn affirmative_vote_has_no_dissent() {
    let vote = Vote::affirm("claude", 0.8, "deadbeef");
    assert!(vote.verdict);
    assert!(vote.dissent.is_none());
    let json = serde_json::to_string(&vote).unwrap();
    assert!(!json.contains("dissent"));
}

#[test]
fn dissenting_vote_carries_rationale() {
    let vote = Vote::dissent("gpt", 0.9, "cafebabe", "Drift detected: 0.60");
    assert!(!vote.verdict);
    assert_eq!(vote.dissent.as_deref(), Some("Drift detected: 0.60"));
}

#[test]
fn vote_confidence_is_clamped() {
    assert_eq!(Vote::affirm("a", 1.7, "x").confidence, 1.0);
    assert_eq!(Vote::dissent("a", -0.2, "x", "r").confidence, 0.0);
}

// ===========================================================================
// DriftParameters / DriftMode
// ===========================================================================

#[test]
fn drift_defaults_match_geiger_start() {
    let p = DriftParameters::default();
    assert_eq!(p.drift_level, 0.6);
    assert_eq!(p.temperature, 0.7);
    assert_eq!(p.validation_threshold, 0.6);
    assert_eq!(p.mode(), DriftMode::Balanced);
}

#[test]
fn drift_bounded_clamps_every_field() {
    let p = DriftParameters::bounded(3.0, 0.0, 0.1);
    assert_eq!(p.drift_level, 1.0);
    assert!(p.temperature > 0.0);
    assert_eq!(p.validation_threshold, 0.5);

    let q = DriftParameters::bounded(f64::NAN, f64::INFINITY, 2.0);
    assert_eq!(q.drift_level, 0.0);
    assert_eq!(q.temperature, 1.0);
    assert_eq!(q.validation_threshold, 0.95);
}

#[test]
fn drift_mode_boundaries() {
    assert_eq!(DriftMode::from_drift(0.0), DriftMode::Stable);
    assert_eq!(DriftMode::from_drift(0.4), DriftMode::Stable);
    assert_eq!(DriftMode::from_drift(0.41), DriftMode::Balanced);
    assert_eq!(DriftMode::from_drift(0.7), DriftMode::Balanced);
    assert_eq!(DriftMode::from_drift(0.71), DriftMode::Critical);
}

// ===========================================================================
// Decision
// ===========================================================================

#[test]
fn executed_decision_has_no_votes() {
    let signal = Signal::new(serde_json::json!("chicka chicka orange"), Tier::Reflex, Utc::now());
    let decision = Decision::executed(&signal, 0.6, Utc::now());
    assert_eq!(decision.status, DecisionStatus::Executed);
    assert_eq!(decision.quorum, QuorumType::SingleWitness);
    assert_eq!(decision.votes, 0);
    assert_eq!(decision.signal_id, signal.id);
    assert!(decision.is_authorized());
}

#[test]
fn decision_serializes_fields() {
    let signal = Signal::new(serde_json::json!("x"), Tier::Reflex, Utc::now());
    let decision = Decision::executed(&signal, 0.25, Utc::now());
    let v = serde_json::to_value(&decision).unwrap();
    assert_eq!(v["status"], "EXECUTED");
    assert_eq!(v["tier"], "REFLEX");
    assert_eq!(v["quorum"], "one_verified");
    assert_eq!(v["drift_level"], 0.25);
}

// ===========================================================================
// Protocol
// ===========================================================================

#[test]
fn rpc_request_params_default_to_null() {
    let req: RpcRequest =
        serde_json::from_str(r#"{"id":"1","method":"consensus.status"}"#).unwrap();
    assert_eq!(req.method, "consensus.status");
    assert!(req.params.is_null());
}

#[test]
fn rpc_response_ok_skips_error() {
    let resp = RpcResponse::ok("1", serde_json::json!({"ok": true}));
    let json = serde_json::to_string(&resp).unwrap();
    assert!(json.contains("\"result\""));
    assert!(!json.contains("\"error\""));
}

#[test]
fn rpc_response_method_not_found() {
    let resp = RpcResponse::method_not_found("7", "nope");
    let err = resp.error.unwrap();
    assert_eq!(err.code, METHOD_NOT_FOUND);
    assert!(err.message.contains("nope"));
}

#[test]
fn drift_event_includes_mode() {
    let evt = EventMessage::drift(&DriftParameters::bounded(0.9, 0.5, 0.9));
    assert_eq!(evt.event, "drift");
    assert_eq!(evt.data["mode"], "CRITICAL");
    assert_eq!(evt.data["drift_level"], 0.9);
}

#[test]
fn dissent_event_carries_record() {
    let record = DissentRecord {
        signal_id: "s1".into(),
        witness_id: "deepseek".into(),
        rationale: "Drift detected: 0.80".into(),
        archived_at: Utc::now(),
    };
    let evt = EventMessage::dissent(&record);
    assert_eq!(evt.event, "dissent");
    assert_eq!(evt.data["witness_id"], "deepseek");
    assert_eq!(evt.data["signal_id"], "s1");
}

// ===========================================================================
// Config / Errors
// ===========================================================================

#[test]
fn gateway_config_defaults() {
    let cfg: GatewayConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg.port, 18789);
    assert_eq!(cfg.bind, BindMode::Loopback);
    assert_eq!(BindMode::parse("lan").to_addr(), "0.0.0.0");
    assert_eq!(BindMode::parse("localhost").to_addr(), "127.0.0.1");
}

#[test]
fn state_poisoned_error_message() {
    let err = Error::state_poisoned("drift monitor");
    assert_eq!(err.to_string(), "shared state poisoned: drift monitor");
}

#[test]
fn json_error_converts() {
    let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
    let err: Error = parse.unwrap_err().into();
    assert!(matches!(err, Error::JsonError(_)));
}

#[test]
fn errors_map_to_rpc_codes() {
    assert_eq!(Error::InvalidParams("x".into()).rpc_code(), INVALID_PARAMS);
    assert_eq!(Error::MethodNotFound("x".into()).rpc_code(), METHOD_NOT_FOUND);
    assert_eq!(Error::state_poisoned("pipeline").rpc_code(), INTERNAL_ERROR);
}
