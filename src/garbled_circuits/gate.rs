//! Gate functions and gate garbling

use super::{GateId, GcParams, Label, Wire, WireId};
use crate::utils::crypto::{digest_to_uint, sha512_str};
use crate::utils::encoding::{pack_label, to_bin_of_size};
use crate::{Result, YgcError};
use num_bigint::BigUint;

/// Boolean function computed by a gate.
///
/// The named variants cover the standard gates; `Truth` carries an explicit
/// truth table indexed by the input bits read MSB-first, so custom gates
/// stay expressible without dynamic dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateFn {
    And,
    Or,
    Xor,
    Not,
    Truth(Vec<bool>),
}

impl GateFn {
    /// Number of gate inputs (1 or 2).
    pub fn arity(&self) -> Result<usize> {
        match self {
            GateFn::And | GateFn::Or | GateFn::Xor => Ok(2),
            GateFn::Not => Ok(1),
            GateFn::Truth(table) => match table.len() {
                2 => Ok(1),
                4 => Ok(2),
                n => Err(YgcError::InvalidParameter(format!(
                    "truth table must have 2 or 4 rows, got {n}"
                ))),
            },
        }
    }

    /// Evaluates the gate function on cleartext input bits.
    pub fn eval(&self, inputs: &[bool]) -> Result<bool> {
        let arity = self.arity()?;
        if inputs.len() != arity {
            return Err(YgcError::Protocol(format!(
                "gate function expects {arity} inputs, got {}",
                inputs.len()
            )));
        }
        Ok(match self {
            GateFn::And => inputs[0] && inputs[1],
            GateFn::Or => inputs[0] || inputs[1],
            GateFn::Xor => inputs[0] ^ inputs[1],
            GateFn::Not => !inputs[0],
            GateFn::Truth(table) => {
                let mut index = 0;
                for &bit in inputs {
                    index = (index << 1) | usize::from(bit);
                }
                table[index]
            }
        })
    }
}

/// One garbled gate: wire bindings plus the tables computed at construction.
#[derive(Debug, Clone)]
pub struct Gate {
    /// Unique bit-string identifier, hashed into every table entry
    pub id: GateId,
    pub func: GateFn,
    pub input_wires: Vec<WireId>,
    pub output_wire: WireId,
    pub is_output: bool,
    /// 2^arity entries indexed by the concatenated input permutation bits
    pub garbled_table: Vec<BigUint>,
    /// Two entries for output gates, empty otherwise
    pub decoding_table: Vec<BigUint>,
}

/// Expands `value` into `width` bits, most significant first.
fn bits_msb(value: usize, width: usize) -> Vec<u8> {
    (0..width)
        .rev()
        .map(|shift| ((value >> shift) & 1) as u8)
        .collect()
}

impl Gate {
    /// Garbles one gate against the wire arena.
    ///
    /// Builds the primitive garbled map (truth-table row -> labelled input
    /// tuple -> labelled output), then lays the rows out in permutation-bit
    /// order and encrypts each as
    /// `H(input labels ∥ gate id) XOR (output label ∥ output bit)`.
    /// Output gates additionally get a two-entry decoding table.
    pub fn garble(
        id: impl Into<GateId>,
        func: GateFn,
        input_wires: Vec<WireId>,
        output_wire: WireId,
        is_output: bool,
        wires: &[Wire],
        params: &GcParams,
    ) -> Result<Gate> {
        let id = id.into();
        if id.is_empty() || !id.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(YgcError::InvalidParameter(format!(
                "gate id must be a nonempty bit string, got {id:?}"
            )));
        }
        let arity = func.arity()?;
        if input_wires.len() != arity {
            return Err(YgcError::InvalidParameter(format!(
                "gate {id} has {} input wires, function takes {arity}",
                input_wires.len()
            )));
        }
        for &wire in input_wires.iter().chain(std::iter::once(&output_wire)) {
            if wire >= wires.len() {
                return Err(YgcError::InvalidParameter(format!(
                    "gate {id} references wire {wire}, arena holds {}",
                    wires.len()
                )));
            }
        }

        let width = params.label_bits as usize;

        // Primitive garbled map: one row per truth-table entry, each input
        // and the output replaced by its (label, permutation bit) pair.
        struct Row {
            label_concat: String,
            perm_bits: Vec<u8>,
            output: (Label, u8),
        }
        let mut rows = Vec::with_capacity(1 << arity);
        for assignment in 0..(1usize << arity) {
            let values = bits_msb(assignment, arity);
            let bools: Vec<bool> = values.iter().map(|&v| v == 1).collect();
            let out_value = u8::from(func.eval(&bools)?);

            let mut label_concat = String::new();
            let mut perm_bits = Vec::with_capacity(arity);
            for (position, &value) in values.iter().enumerate() {
                let wire = &wires[input_wires[position]];
                label_concat.push_str(&to_bin_of_size(wire.label(value), width));
                perm_bits.push(wire.perm_bit(value));
            }
            rows.push(Row {
                label_concat,
                perm_bits,
                output: wires[output_wire].pair(out_value),
            });
        }

        // Garbled table: row i holds the entry whose input permutation bits
        // spell i, MSB first.
        let mut garbled_table = Vec::with_capacity(1 << arity);
        for index in 0..(1usize << arity) {
            let selector = bits_msb(index, arity);
            let row = rows
                .iter()
                .find(|row| row.perm_bits == selector)
                .ok_or_else(|| {
                    YgcError::Protocol(format!("gate {id}: no row for selector {selector:?}"))
                })?;
            let mut hash_input = row.label_concat.clone();
            hash_input.push_str(&id);
            let mask = digest_to_uint(&sha512_str(&hash_input));
            let (out_label, out_p) = &row.output;
            garbled_table.push(mask ^ pack_label(out_label, *out_p));
        }

        let mut decoding_table = Vec::new();
        if is_output {
            for value in 0u8..2 {
                let mut hash_input = to_bin_of_size(wires[output_wire].label(value), width);
                hash_input.push_str(&params.out_tag);
                hash_input.push_str(&id);
                let mask = digest_to_uint(&sha512_str(&hash_input));
                decoding_table.push(mask ^ BigUint::from(value));
            }
        }

        Ok(Gate {
            id,
            func,
            input_wires,
            output_wire,
            is_output,
            garbled_table,
            decoding_table,
        })
    }

    /// Table arity recovered from the garbled table length.
    pub fn arity(&self) -> usize {
        self.input_wires.len()
    }
}
