//! # 密码工具函数 (Cryptographic Utility Functions)
//!
//! 本模块封装了协议使用的两个密码黑盒：
//! - **SHA-512 哈希门面**: 对字节串、文本或非负整数取哈希，摘要按
//!   小端序解释为无符号大整数，供混淆表的 XOR 运算使用
//! - **认证对称加密门面**: 32 字节密钥、24 字节 nonce 的 secretbox
//!   式加解密，认证标签校验失败即为解密错误
//!
//! 整数的哈希输入采用小端序最小宽度字节编码（零编码为单个零字节）。

use crate::{Result, YgcError};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use num_bigint::BigUint;
use sha2::{Digest, Sha512};

/// SHA-512 摘要长度（字节）
pub const DIGEST_LEN: usize = 64;
/// 对称加密密钥长度（字节）
pub const KEY_LEN: usize = 32;
/// 对称加密 nonce 长度（字节）
pub const NONCE_LEN: usize = 24;

/// 计算字节串的 SHA-512 哈希
pub fn sha512_bytes(message: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha512::new();
    hasher.update(message);
    hasher.finalize().into()
}

/// 计算文本（UTF-8 编码）的 SHA-512 哈希
pub fn sha512_str(message: &str) -> [u8; DIGEST_LEN] {
    sha512_bytes(message.as_bytes())
}

/// 计算非负整数的 SHA-512 哈希
///
/// 整数先编码为小端序最小宽度字节串再取哈希；零编码为一个零字节。
pub fn sha512_uint(message: &BigUint) -> [u8; DIGEST_LEN] {
    sha512_bytes(&message.to_bytes_le())
}

/// 将摘要按小端序解释为无符号大整数
pub fn digest_to_uint(digest: &[u8; DIGEST_LEN]) -> BigUint {
    BigUint::from_bytes_le(digest)
}

/// 从群元素派生 32 字节对称密钥
///
/// 取群元素哈希的前 32 字节，因而对任意规模的群（玩具素数与生产级
/// 2048 位群）都适用。
pub fn session_key(element: &BigUint) -> [u8; KEY_LEN] {
    let digest = sha512_uint(element);
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&digest[..KEY_LEN]);
    key
}

/// 将 nonce 计数编码为 24 字节小端序 nonce
pub fn nonce_bytes(counter: u64) -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    nonce[..8].copy_from_slice(&counter.to_le_bytes());
    nonce
}

/// 认证加密
///
/// 使用给定密钥与 nonce 加密明文，返回含认证标签的密文。
pub fn secretbox_seal(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .encrypt(XNonce::from_slice(nonce), plaintext)
        .map_err(|_| YgcError::Protocol("secretbox encryption failed".to_string()))
}

/// 认证解密
///
/// 认证标签校验失败时返回解密错误，表明传输被篡改或参数配置不一致。
pub fn secretbox_open(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| YgcError::OtDecrypt("authentication tag mismatch".to_string()))
}
