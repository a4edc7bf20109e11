//! 端到端 YGC 协议测试
//!
//! 生成方与求值方在本机回环地址上各占一个线程跑完整个协议，
//! 覆盖全加器, 比较器, 单非门的全部输入组合以及电路视图的序列化往返

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU16, Ordering};
use std::thread;
use ygc_api::garbled_circuits::{Circuit, GcParams};
use ygc_api::network::MAX_FRAME_BYTES;
use ygc_api::oblivious_transfer::OtParams;
use ygc_api::protocols::{GarbledView, Outputs, SessionConfig, YgcEvaluator, YgcGenerator};

static NEXT_PORT: AtomicU16 = AtomicU16::new(49200);

/// Reserves a block of ports: main channels plus derived OT channels.
fn session_ports() -> (u16, u16) {
    let base = NEXT_PORT.fetch_add(16, Ordering::SeqCst);
    (base, base + 8)
}

/// Runs one full protocol session and returns (generator, evaluator) outputs.
fn run_session(circuit: Circuit, evaluator_inputs: BTreeMap<u64, u8>) -> (Outputs, Outputs) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let (generator_port, evaluator_port) = session_ports();
    let generator_config = SessionConfig {
        host: "127.0.0.1".to_string(),
        port: generator_port,
        peer_host: "127.0.0.1".to_string(),
        peer_port: evaluator_port,
    };
    let evaluator_config = SessionConfig {
        host: "127.0.0.1".to_string(),
        port: evaluator_port,
        peer_host: "127.0.0.1".to_string(),
        peer_port: generator_port,
    };

    let generator = thread::spawn(move || {
        YgcGenerator::connect(generator_config, circuit, OtParams::demo())
            .unwrap()
            .run()
            .unwrap()
    });
    let evaluator_outputs = YgcEvaluator::connect(
        evaluator_config,
        evaluator_inputs,
        OtParams::demo(),
        GcParams::default(),
    )
    .unwrap()
    .run()
    .unwrap();
    let generator_outputs = generator.join().unwrap();
    (generator_outputs, evaluator_outputs)
}

// ===== E1: full adder =====

#[test]
fn test_full_adder_end_to_end_all_assignments() {
    let params = GcParams::default();
    for assignment in 0..8u8 {
        let w0 = (assignment >> 2) & 1;
        let w1 = (assignment >> 1) & 1;
        let w2 = assignment & 1;

        let circuit =
            Circuit::full_adder(&params, BTreeMap::from([(0, w0), (2, w2)])).unwrap();
        let (generator_outputs, evaluator_outputs) =
            run_session(circuit, BTreeMap::from([(1, w1)]));

        let total = w0 + w1 + w2;
        let expected = Outputs::from([
            ("001".to_string(), total & 1),
            ("100".to_string(), u8::from(total >= 2)),
        ]);
        assert_eq!(evaluator_outputs, expected, "inputs ({w0},{w1},{w2})");
        assert_eq!(generator_outputs, expected, "inputs ({w0},{w1},{w2})");
    }
}

// ===== E2: 2-bit comparator =====

#[test]
fn test_comparator_end_to_end_all_assignments() {
    let params = GcParams::default();
    for assignment in 0..16u8 {
        let bits: Vec<u8> = (0..4).map(|i| (assignment >> (3 - i)) & 1).collect();

        // generator holds W0, W2 (its value high/low), evaluator W1, W3
        let circuit =
            Circuit::comparator2(&params, BTreeMap::from([(0, bits[0]), (2, bits[2])])).unwrap();
        let (generator_outputs, evaluator_outputs) =
            run_session(circuit, BTreeMap::from([(1, bits[1]), (3, bits[3])]));

        let generator_value = bits[0] * 2 + bits[2];
        let evaluator_value = bits[1] * 2 + bits[3];
        let expected = Outputs::from([(
            "110".to_string(),
            u8::from(generator_value > evaluator_value),
        )]);
        assert_eq!(evaluator_outputs, expected, "bits {bits:?}");
        assert_eq!(generator_outputs, expected, "bits {bits:?}");
    }
}

#[test]
fn test_comparator_reference_assignment() {
    // generator 10 vs evaluator 01: greater
    let params = GcParams::default();
    let circuit = Circuit::comparator2(&params, BTreeMap::from([(0, 1), (2, 0)])).unwrap();
    let (_, outputs) = run_session(circuit, BTreeMap::from([(1, 0), (3, 1)]));
    assert_eq!(outputs["110"], 1);
}

// ===== E4: single NOT gate, evaluator-owned input =====

#[test]
fn test_single_not_end_to_end() {
    let params = GcParams::default();
    for value in 0u8..2 {
        let circuit = Circuit::single_not(&params, BTreeMap::new()).unwrap();
        let (generator_outputs, evaluator_outputs) =
            run_session(circuit, BTreeMap::from([(0, value)]));
        assert_eq!(evaluator_outputs["0"], 1 - value);
        assert_eq!(generator_outputs, evaluator_outputs);
    }
}

// ===== E5: garbled view serialization round-trip =====

#[test]
fn test_garbled_view_serialization_round_trip() {
    let params = GcParams::default();
    let circuit = Circuit::comparator2(&params, BTreeMap::from([(0, 1), (2, 0)])).unwrap();
    let view = GarbledView::from_circuit(&circuit).unwrap();

    let text = serde_json::to_string(&view).unwrap();
    let parsed: GarbledView = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, view);
}

#[test]
fn test_garbled_view_fits_one_frame() {
    // the view is sent as a single framed message on the main channel
    let params = GcParams::default();
    let circuit = Circuit::comparator2(&params, BTreeMap::from([(0, 1), (2, 0)])).unwrap();
    let view = GarbledView::from_circuit(&circuit).unwrap();
    let text = serde_json::to_string(&view).unwrap();
    assert!(
        text.len() + 1 <= MAX_FRAME_BYTES,
        "view frame is {} bytes",
        text.len() + 1
    );
}

// ===== Input validation at the protocol surface =====

#[test]
fn test_evaluator_rejects_non_bit_inputs() {
    let config = SessionConfig::default();
    let result = YgcEvaluator::connect(
        config,
        BTreeMap::from([(1, 2)]),
        OtParams::demo(),
        GcParams::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_generator_rejects_invalid_circuit_inputs() {
    let params = GcParams::default();
    // assignment to a non-input wire is rejected before any socket opens
    assert!(Circuit::full_adder(&params, BTreeMap::from([(7, 1)])).is_err());

    let circuit = Circuit::full_adder(&params, BTreeMap::from([(0, 1), (2, 0)])).unwrap();
    let mut bad_params = OtParams::demo();
    bad_params.generator = 1u32.into();
    let result = YgcGenerator::connect(SessionConfig::default(), circuit, bad_params);
    assert!(result.is_err());
}

#[test]
fn test_wire_values_kept_from_evaluator() {
    // the garbled view never carries both labels of a generator input wire
    // in clear association with its logical values
    let params = GcParams::default();
    let circuit = Circuit::full_adder(&params, BTreeMap::from([(0, 1), (2, 0)])).unwrap();
    let view = GarbledView::from_circuit(&circuit).unwrap();
    // generator input pairs match the assigned values only
    assert_eq!(view.generator_inputs[&0], circuit.wire_pair(0, 1).unwrap());
    assert_eq!(view.generator_inputs[&2], circuit.wire_pair(2, 0).unwrap());
    assert!(!view.generator_inputs.contains_key(&1));
}
