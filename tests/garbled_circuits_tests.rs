//! 混淆电路测试
//!
//! 包含电路构造, 门混淆, 本地求值等混淆电路相关测试；
//! 通过在本地重放求值方的逐门解密流程来对照明文求值结果

use num_bigint::BigUint;
use std::collections::BTreeMap;
use ygc_api::garbled_circuits::*;
use ygc_api::protocols::{GarbledView, Outputs};

/// Replays the evaluator's per-gate walk against a garbled view, starting
/// from canonical (label, permutation bit) pairs for all input wires.
fn evaluate_view(
    view: &GarbledView,
    mut held: BTreeMap<u64, (Label, u8)>,
    params: &GcParams,
) -> Outputs {
    let mut outputs = Outputs::new();
    for (index, gate_id) in view.gate_ids.iter().enumerate() {
        let catalogue = &view.permuted_inputs[gate_id];
        let gate_inputs = order_gate_inputs(catalogue, &held);
        let (label, perm_bit) =
            decrypt_gate(&view.garbled_tables[index], gate_id, &gate_inputs, params).unwrap();
        if !view.decoding_tables[index].is_empty() {
            let bit =
                decode_output(&view.decoding_tables[index], gate_id, &label, params).unwrap();
            outputs.insert(gate_id.clone(), bit);
        }
        let next_key = held.keys().next_back().map_or(0, |&key| key + 1);
        held.insert(next_key, (label, perm_bit));
    }
    outputs
}

fn held_pairs(circuit: &Circuit, assignment: &BTreeMap<WireId, u8>) -> BTreeMap<u64, (Label, u8)> {
    assignment
        .iter()
        .map(|(&wire, &value)| (wire as u64, circuit.wire_pair(wire, value).unwrap()))
        .collect()
}

// ===== Functional correctness against clear evaluation =====

#[test]
fn test_full_adder_all_assignments() {
    let params = GcParams::default();
    let circuit = Circuit::full_adder(&params, BTreeMap::new()).unwrap();
    let view = GarbledView::from_circuit(&circuit).unwrap();

    for assignment in 0..8u8 {
        let bits = BTreeMap::from([
            (0, (assignment >> 2) & 1),
            (1, (assignment >> 1) & 1),
            (2, assignment & 1),
        ]);
        let garbled = evaluate_view(&view, held_pairs(&circuit, &bits), &params);
        let clear = circuit.eval_clear(&bits).unwrap();
        assert_eq!(garbled, clear, "full adder mismatch for {bits:?}");
    }
}

#[test]
fn test_full_adder_reference_assignment() {
    let params = GcParams::default();
    let circuit = Circuit::full_adder(&params, BTreeMap::new()).unwrap();
    let view = GarbledView::from_circuit(&circuit).unwrap();

    // (W0, W1, W2) = (1, 1, 0): sum 0, carry 1
    let bits = BTreeMap::from([(0, 1), (1, 1), (2, 0)]);
    let outputs = evaluate_view(&view, held_pairs(&circuit, &bits), &params);
    assert_eq!(outputs["001"], 0);
    assert_eq!(outputs["100"], 1);
}

#[test]
fn test_comparator_all_assignments() {
    let params = GcParams::default();
    let circuit = Circuit::comparator2(&params, BTreeMap::new()).unwrap();
    let view = GarbledView::from_circuit(&circuit).unwrap();

    for assignment in 0..16u8 {
        let bits: BTreeMap<WireId, u8> =
            (0..4).map(|i| (i, (assignment >> (3 - i)) & 1)).collect();
        let garbled = evaluate_view(&view, held_pairs(&circuit, &bits), &params);
        let clear = circuit.eval_clear(&bits).unwrap();
        assert_eq!(garbled, clear, "comparator mismatch for {bits:?}");
    }
}

#[test]
fn test_single_not_gate() {
    let params = GcParams::default();
    let circuit = Circuit::single_not(&params, BTreeMap::new()).unwrap();
    let view = GarbledView::from_circuit(&circuit).unwrap();

    for value in 0u8..2 {
        let bits = BTreeMap::from([(0, value)]);
        let outputs = evaluate_view(&view, held_pairs(&circuit, &bits), &params);
        assert_eq!(outputs["0"], 1 - value);
    }
}

#[test]
fn test_custom_truth_table_gate() {
    let params = GcParams::default();
    // single NAND gate expressed as an explicit truth table
    let wires: Vec<Wire> = (0..3).map(|_| Wire::random(params.label_bits)).collect();
    let nand = GateFn::Truth(vec![true, true, true, false]);
    let gates = vec![Gate::garble("0", nand, vec![0, 1], 2, true, &wires, &params).unwrap()];
    let circuit = Circuit::new(wires, gates, BTreeMap::new()).unwrap();
    let view = GarbledView::from_circuit(&circuit).unwrap();

    for a in 0u8..2 {
        for b in 0u8..2 {
            let bits = BTreeMap::from([(0, a), (1, b)]);
            let outputs = evaluate_view(&view, held_pairs(&circuit, &bits), &params);
            assert_eq!(outputs["0"], 1 - (a & b), "NAND({a},{b})");
        }
    }
}

// ===== Structural properties =====

#[test]
fn test_round_trip_recovers_installed_pairs() {
    let params = GcParams::default();
    let circuit = Circuit::full_adder(&params, BTreeMap::new()).unwrap();
    let view = GarbledView::from_circuit(&circuit).unwrap();

    // decrypting gate "000" (XOR of W0, W1) must yield exactly the pair the
    // generator installed on W3 for the logically correct row
    for a in 0u8..2 {
        for b in 0u8..2 {
            let held = vec![
                circuit.wire_pair(0, a).unwrap(),
                circuit.wire_pair(1, b).unwrap(),
            ];
            let recovered =
                decrypt_gate(&view.garbled_tables[0], "000", &held, &params).unwrap();
            assert_eq!(recovered, circuit.wire_pair(3, a ^ b).unwrap());
        }
    }
}

#[test]
fn test_output_decoding_uniqueness_over_random_draws() {
    let params = GcParams::default();
    for _ in 0..16 {
        let circuit = Circuit::single_not(&params, BTreeMap::new()).unwrap();
        let gate = &circuit.gates[0];
        for value in 0u8..2 {
            // exactly one entry decodes to a bit for each output label
            let label = circuit.wires[1].label(value);
            let bit = decode_output(&gate.decoding_table, &gate.id, label, &params).unwrap();
            assert_eq!(bit, value);
        }
    }
}

#[test]
fn test_garbled_tables_hide_row_reuse() {
    // two garblings of the same circuit share no table entries
    let params = GcParams::default();
    let first = Circuit::single_not(&params, BTreeMap::new()).unwrap();
    let second = Circuit::single_not(&params, BTreeMap::new()).unwrap();
    let overlap: Vec<&BigUint> = first.gates[0]
        .garbled_table
        .iter()
        .filter(|&entry| second.gates[0].garbled_table.contains(entry))
        .collect();
    assert!(overlap.is_empty());
}
