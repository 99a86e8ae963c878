use pppos::accm::Accm;
use pppos::decode::{FrameEvent, ReceiveState};
use pppos::encode::encode_frame;
use pppos::fcs::{fcs_step_all, FCS_INIT};

fn computed_fcs_bytes(bytes: &[u8]) -> (u8, u8) {
    let fcs = fcs_step_all(FCS_INIT, bytes);
    let complement = !fcs;
    ((complement & 0xFF) as u8, (complement >> 8) as u8)
}

/// Scenario 1: IP payload, no compression, link not idle.
#[test]
fn scenario_ip_payload_no_leading_flag() {
    let accm = Accm::default_escaping();
    let chain = encode_frame(&[0x01, 0x02, 0x03], 0x0021, false, false, false, &accm).unwrap();
    let wire = chain.into_bytes();

    let (lo, hi) = computed_fcs_bytes(&[0xFF, 0x03, 0x00, 0x21, 0x01, 0x02, 0x03]);
    let expected = vec![0xFF, 0x03, 0x00, 0x21, 0x01, 0x02, 0x03, lo, hi, 0x7E];
    assert_eq!(wire, expected);

    let mut rx = ReceiveState::new();
    let events = rx.input(&wire, &accm);
    assert_eq!(
        events,
        vec![FrameEvent::Dispatched { protocol: 0x0021, payload: vec![0x01, 0x02, 0x03] }]
    );
}

/// Scenario 2: empty LCP payload, link idle for longer than the threshold.
#[test]
fn scenario_empty_lcp_payload_idle_link() {
    let accm = Accm::default_escaping();
    let chain = encode_frame(&[], 0xC021, false, false, true, &accm).unwrap();
    let wire = chain.into_bytes();

    let (lo, hi) = computed_fcs_bytes(&[0xFF, 0x03, 0xC0, 0x21]);
    assert_eq!(wire, vec![0x7E, 0xFF, 0x03, 0xC0, 0x21, lo, hi, 0x7E]);
}

/// Scenario 3: payload bytes that must be escaped round-trip through the
/// decoder intact.
#[test]
fn scenario_payload_requiring_escapes() {
    let accm = Accm::default_escaping();
    let chain = encode_frame(&[0x7E, 0x7D, 0x7F], 0x0021, false, false, true, &accm).unwrap();
    let wire = chain.into_bytes();

    let mut rx = ReceiveState::new();
    let events = rx.input(&wire, &accm);
    assert_eq!(
        events,
        vec![FrameEvent::Dispatched { protocol: 0x0021, payload: vec![0x7E, 0x7D, 0x7F] }]
    );
}

/// Scenario 4: ACFC — no address/control on the wire, decoder still accepts.
#[test]
fn scenario_acfc_no_address_control() {
    let accm = Accm::default_escaping();
    let (lo, hi) = computed_fcs_bytes(&[0x00, 0x21]);
    let wire = vec![0x7E, 0x00, 0x21, lo, hi, 0x7E];

    let mut rx = ReceiveState::new();
    let events = rx.input(&wire, &accm);
    assert_eq!(events, vec![FrameEvent::Dispatched { protocol: 0x0021, payload: vec![] }]);
}

/// Scenario 5: PFC — single protocol octet, decoder recovers the full
/// 16-bit protocol number.
#[test]
fn scenario_pfc_single_protocol_octet() {
    let (lo, hi) = computed_fcs_bytes(&[0xFF, 0x03, 0x21]);
    let wire = vec![0x7E, 0xFF, 0x03, 0x21, lo, hi, 0x7E];

    let accm = Accm::default_escaping();
    let mut rx = ReceiveState::new();
    let events = rx.input(&wire, &accm);
    assert_eq!(events, vec![FrameEvent::Dispatched { protocol: 0x0021, payload: vec![] }]);
}

/// Scenario 6: wrong FCS — dropped, checksum-error counted, decoder ready
/// for the next frame afterward.
#[test]
fn scenario_wrong_fcs_is_dropped_and_resyncs() {
    let wire = [0x7E, 0xFF, 0x03, 0x00, 0x21, 0xAA, 0xBB, 0xCC, 0xDE, 0xAD, 0x7E];
    let accm = Accm::default_escaping();
    let mut rx = ReceiveState::new();
    let events = rx.input(&wire, &accm);
    assert_eq!(events, vec![FrameEvent::ChecksumError]);

    // The decoder must still be able to dispatch a subsequent well-formed
    // frame after the bad one.
    let chain = encode_frame(&[0x01], 0x0021, false, false, false, &accm).unwrap();
    let next_wire = chain.into_bytes();
    let events = rx.input(&next_wire, &accm);
    assert_eq!(
        events,
        vec![FrameEvent::Dispatched { protocol: 0x0021, payload: vec![0x01] }]
    );
}

/// Truncated-frame rejection: a frame missing its protocol/FCS is a length
/// error, not silently swallowed.
#[test]
fn truncated_frame_missing_protocol_is_rejected() {
    let wire = [0x7E, 0xFF, 0x03, 0x7E];
    let mut rx = ReceiveState::new();
    let events = rx.input(&wire, &Accm::default_escaping());
    assert_eq!(events, vec![FrameEvent::LengthError]);
}

/// Extra-flag idempotence: stray 0x7E octets between frames change nothing.
#[test]
fn extra_flags_between_frames_are_idempotent() {
    let accm = Accm::default_escaping();
    let mut wire = encode_frame(&[0x42], 0x0021, false, false, true, &accm).unwrap().into_bytes();
    for _ in 0..5 {
        wire.push(0x7E);
    }
    wire.extend(encode_frame(&[0x43], 0x0021, false, false, false, &accm).unwrap().into_bytes());

    let mut rx = ReceiveState::new();
    let events = rx.input(&wire, &accm);
    assert_eq!(
        events,
        vec![
            FrameEvent::Dispatched { protocol: 0x0021, payload: vec![0x42] },
            FrameEvent::Dispatched { protocol: 0x0021, payload: vec![0x43] },
        ]
    );
}
