//! Evaluator-side gate decryption and output decoding

use super::{GcParams, Label};
use crate::utils::crypto::{digest_to_uint, sha512_str};
use crate::utils::encoding::{to_bin_of_size, unpack_label};
use crate::{Result, YgcError};
use num_bigint::BigUint;
use num_traits::One;
use std::collections::BTreeMap;

/// Recovers the gate-input order for the pairs the evaluator actually holds.
///
/// The generator ships every candidate (label, permutation bit) pair of the
/// gate in shuffled order. The evaluator cannot tell the candidates apart
/// cryptographically, so each held candidate is tagged with the canonical
/// wire index it was received under and the candidates are ordered by that
/// index. The wire-assignment counter grows in gate-construction order,
/// which makes this the gate's input order.
pub fn order_gate_inputs(
    catalogue: &[(Label, u8)],
    held: &BTreeMap<u64, (Label, u8)>,
) -> Vec<(Label, u8)> {
    let inverted: BTreeMap<&(Label, u8), u64> =
        held.iter().map(|(&index, pair)| (pair, index)).collect();

    let mut tagged: Vec<(u64, &(Label, u8))> = catalogue
        .iter()
        .filter_map(|candidate| inverted.get(candidate).map(|&index| (index, candidate)))
        .collect();
    tagged.sort_by_key(|&(index, _)| index);
    tagged.into_iter().map(|(_, pair)| pair.clone()).collect()
}

/// Decrypts one garbled-table row with the held input pairs.
///
/// The row is selected by the concatenated permutation bits (MSB first);
/// the decryption key is the hash of the concatenated input labels and the
/// gate id. The result splits into the output label and permutation bit.
pub fn decrypt_gate(
    garbled_table: &[BigUint],
    gate_id: &str,
    held_inputs: &[(Label, u8)],
    params: &GcParams,
) -> Result<(Label, u8)> {
    if garbled_table.len() != 1usize << held_inputs.len() {
        return Err(YgcError::Protocol(format!(
            "gate {gate_id}: held {} inputs against a {}-entry table",
            held_inputs.len(),
            garbled_table.len()
        )));
    }

    let width = params.label_bits as usize;
    let mut row = 0usize;
    let mut hash_input = String::new();
    for (label, perm_bit) in held_inputs {
        row = (row << 1) | usize::from(*perm_bit & 1);
        hash_input.push_str(&to_bin_of_size(label, width));
    }
    hash_input.push_str(gate_id);

    let key = digest_to_uint(&sha512_str(&hash_input));
    let packed = key ^ &garbled_table[row];
    unpack_label(&packed, params.label_bits)
        .map_err(|_| YgcError::DecodeFailure(format!("gate {gate_id}: corrupted table row {row}")))
}

/// Decodes an output gate's label into a cleartext bit.
///
/// Exactly one decoding-table entry must XOR down to a value in {0, 1};
/// zero or multiple matches mean the transcript was tampered with.
pub fn decode_output(
    decoding_table: &[BigUint],
    gate_id: &str,
    output_label: &Label,
    params: &GcParams,
) -> Result<u8> {
    let mut hash_input = to_bin_of_size(output_label, params.label_bits as usize);
    hash_input.push_str(&params.out_tag);
    hash_input.push_str(gate_id);
    let mask = digest_to_uint(&sha512_str(&hash_input));

    let mut decoded = None;
    for entry in decoding_table {
        let candidate = entry ^ &mask;
        if candidate <= BigUint::one() {
            if decoded.is_some() {
                return Err(YgcError::DecodeFailure(format!(
                    "gate {gate_id}: multiple decoding entries matched"
                )));
            }
            decoded = Some(u8::from(candidate.is_one()));
        }
    }
    decoded.ok_or_else(|| {
        YgcError::DecodeFailure(format!("gate {gate_id}: no decoding entry matched"))
    })
}
