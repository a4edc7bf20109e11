//! Parakh 1-out-of-2 oblivious transfer over a point-to-point channel
//!
//! Sender and receiver each own a fresh messaging node for the session and
//! release it on every exit path. The arithmetic follows Parakh's protocol:
//! the receiver's blinding exponent `N_B1` cancels under inversion mod p-1,
//! collapsing `M3` onto exactly one of the sender's two symmetric keys.

use super::{check_choice, OtMessage, OtParams};
use crate::network::{resolve_addr, Node};
use crate::utils::crypto::{nonce_bytes, secretbox_open, secretbox_seal, session_key};
use crate::utils::math::{inverse, square_multiply};
use crate::utils::random::{random_coprime_exponent, random_exponent};
use crate::{Result, YgcError};
use num_bigint::BigUint;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use tracing::debug;

/// Oblivious transfer sender (Alice): holds the two secrets.
pub struct OtSender {
    node: Node<OtMessage>,
    peer: SocketAddr,
    params: OtParams,
    secret1: BigUint,
    secret2: BigUint,
}

impl OtSender {
    /// Validates the parameters and connects the session channel.
    pub fn connect(
        host: &str,
        port: u16,
        peer_host: &str,
        peer_port: u16,
        params: OtParams,
        secret1: BigUint,
        secret2: BigUint,
    ) -> Result<Self> {
        params.validate()?;
        let peer = resolve_addr(peer_host, peer_port)?;
        let mut node = Node::bind(host, port)?;
        node.connect(&[peer])?;
        Ok(OtSender {
            node,
            peer,
            params,
            secret1,
            secret2,
        })
    }

    /// Runs the sender side of the protocol to completion.
    ///
    /// The symmetric nonce is fixed to zero: every session derives fresh
    /// keys from fresh Diffie-Hellman randomness, so no (key, nonce) pair
    /// repeats across sessions.
    pub fn run(mut self) -> Result<()> {
        let result = self.protocol();
        self.node.close();
        result
    }

    fn protocol(&mut self) -> Result<()> {
        let p = &self.params.prime;
        let g = &self.params.generator;

        // 1) Generate the nonce N_A1 and send M1 = g^(x1 + N_A1) mod p
        let n_a1 = random_exponent(p);
        let m1 = square_multiply(g, &(&self.params.x1 + &n_a1), p);
        debug!(%m1, "ot sender round 1");
        self.node
            .send_messages(BTreeMap::from([(self.peer, OtMessage::Round1 { m1 })]))?;

        // 2) Receive A = (M1 / g^(x_B))^(N_B * N_B1) mod p and B = g^(N_B) mod p
        let (a, b) = match self.node.get_message_at(0)? {
            OtMessage::Round2 { a, b } => (a, b),
            other => {
                return Err(YgcError::Protocol(format!(
                    "expected OT round 2, got {other:?}"
                )))
            }
        };

        // 3) Generate the nonce N_A2 and send M3 = A^(N_A2) mod p
        let n_a2 = random_exponent(p);
        let m3 = square_multiply(&a, &n_a2, p);

        // 4) Derive K1 = B^(N_A1 * N_A2) mod p and
        //    K2 = (B^(x1 - x2 + N_A1))^(N_A2) mod p, encrypt one secret
        //    under each
        let k1 = square_multiply(&b, &(&n_a1 * &n_a2), p);
        let k2 = square_multiply(
            &square_multiply(&b, &(&self.params.x1 - &self.params.x2 + &n_a1), p),
            &n_a2,
            p,
        );

        let nonce = 0u64;
        let c1 = secretbox_seal(
            &session_key(&k1),
            &nonce_bytes(nonce),
            &self.secret1.to_bytes_le(),
        )?;
        let c2 = secretbox_seal(
            &session_key(&k2),
            &nonce_bytes(nonce),
            &self.secret2.to_bytes_le(),
        )?;
        debug!(%m3, "ot sender round 3");
        self.node.send_messages(BTreeMap::from([(
            self.peer,
            OtMessage::Round3 {
                m3,
                c1,
                n1: nonce,
                c2,
                n2: nonce,
            },
        )]))?;
        Ok(())
    }
}

/// Oblivious transfer receiver (Bob): holds the choice `c ∈ {1, 2}`.
pub struct OtReceiver {
    node: Node<OtMessage>,
    peer: SocketAddr,
    params: OtParams,
    choice: u8,
}

impl OtReceiver {
    /// Validates the choice and parameters, then connects the session channel.
    pub fn connect(
        host: &str,
        port: u16,
        peer_host: &str,
        peer_port: u16,
        params: OtParams,
        choice: u8,
    ) -> Result<Self> {
        check_choice(choice)?;
        params.validate()?;
        let peer = resolve_addr(peer_host, peer_port)?;
        let mut node = Node::bind(host, port)?;
        node.connect(&[peer])?;
        Ok(OtReceiver {
            node,
            peer,
            params,
            choice,
        })
    }

    /// Runs the receiver side of the protocol and returns the chosen secret.
    pub fn run(mut self) -> Result<BigUint> {
        let result = self.protocol();
        self.node.close();
        result
    }

    fn protocol(&mut self) -> Result<BigUint> {
        let p = &self.params.prime;
        let g = &self.params.generator;

        // 1) Receive M1 = g^(x1 + N_A1) mod p
        let m1 = match self.node.get_message_at(0)? {
            OtMessage::Round1 { m1 } => m1,
            other => {
                return Err(YgcError::Protocol(format!(
                    "expected OT round 1, got {other:?}"
                )))
            }
        };
        debug!(%m1, choice = self.choice, "ot receiver round 1");

        // 2) Set x_B = x1 to obtain secret 1, x_B = x2 for secret 2;
        //    draw N_B and an N_B1 invertible mod p - 1
        let x_b = if self.choice == 1 {
            &self.params.x1
        } else {
            &self.params.x2
        };
        let p_minus_1 = p - 1u32;
        let n_b = random_exponent(p);
        let n_b1 = random_coprime_exponent(&p_minus_1);

        // 3) Send A = (M1 * (g^(x_B))^(-1))^(N_B * N_B1) mod p and
        //    B = g^(N_B) mod p
        let g_xb_inverse = inverse(&square_multiply(g, x_b, p), p)?;
        let a = square_multiply(&(m1 * g_xb_inverse % p), &(&n_b * &n_b1), p);
        let b = square_multiply(g, &n_b, p);
        self.node
            .send_messages(BTreeMap::from([(self.peer, OtMessage::Round2 { a, b })]))?;

        // 4) Receive M3 = A^(N_A2) mod p and the two ciphertexts
        let (m3, c1, n1, c2, n2) = match self.node.get_message_at(1)? {
            OtMessage::Round3 { m3, c1, n1, c2, n2 } => (m3, c1, n1, c2, n2),
            other => {
                return Err(YgcError::Protocol(format!(
                    "expected OT round 3, got {other:?}"
                )))
            }
        };

        // 5) K_B = M3^(N_B1^(-1) mod (p-1)) mod p collapses onto the key
        //    for the chosen secret
        let k_b = square_multiply(&m3, &inverse(&n_b1, &p_minus_1)?, p);
        debug!(%k_b, "ot receiver derived key");

        let (cipher, nonce) = if self.choice == 1 { (c1, n1) } else { (c2, n2) };
        let plain = secretbox_open(&session_key(&k_b), &nonce_bytes(nonce), &cipher)?;
        Ok(BigUint::from_bytes_le(&plain))
    }
}
