//! Wire labels and permutation bits

use super::Label;
use crate::utils::random::{random_bit, random_label};

#[derive(Debug, Clone)]
pub struct Wire {
    k: [Label; 2],
    p: [u8; 2],
}

impl Wire {
    /// Draws two independent K-bit labels and a random permutation bit;
    /// the second permutation bit is the complement of the first.
    pub fn random(label_bits: u64) -> Self {
        let k = [random_label(label_bits), random_label(label_bits)];
        let p0 = random_bit();
        Wire { k, p: [p0, 1 - p0] }
    }

    /// Label bound to logical value `value`.
    pub fn label(&self, value: u8) -> &Label {
        &self.k[value as usize]
    }

    /// Permutation bit bound to logical value `value`.
    pub fn perm_bit(&self, value: u8) -> u8 {
        self.p[value as usize]
    }

    /// The (label, permutation bit) pair bound to logical value `value`.
    pub fn pair(&self, value: u8) -> (Label, u8) {
        (self.k[value as usize].clone(), self.p[value as usize])
    }
}
