//! # 随机数工具函数 (Random Utility Functions)
//!
//! 本模块提供了协议所需的随机采样功能，所有函数都使用线程安全的
//! 随机数生成器。
//!
//! ## 主要功能
//! - 生成 K 位随机线标签
//! - 生成随机置换位
//! - 在群指数范围内均匀采样
//! - 与模数互素的指数的拒绝采样
//!
//! 这些函数为线标签生成、OT 的 nonce 指数等提供支持。

use crate::utils::math::gcd;
use num_bigint::{BigUint, RandBigInt};
use num_traits::One;
use rand::{thread_rng, Rng};

/// 生成一个指定位宽的随机标签
///
/// 返回值均匀分布于 [0, 2^bits)。
///
/// # 参数
/// * `bits` - 标签位宽（安全参数 K）
pub fn random_label(bits: u64) -> BigUint {
    let mut rng = thread_rng();
    rng.gen_biguint(bits)
}

/// 生成一个随机位
pub fn random_bit() -> u8 {
    let mut rng = thread_rng();
    rng.gen_range(0..=1)
}

/// 在 [1, prime - 1] 内均匀采样一个群指数
///
/// # 参数
/// * `prime` - 群的素数模数
pub fn random_exponent(prime: &BigUint) -> BigUint {
    let mut rng = thread_rng();
    rng.gen_biguint_range(&BigUint::one(), prime)
}

/// 采样一个与模数互素的指数
///
/// 在 [1, modulus - 1] 内拒绝采样，直到 gcd(指数, modulus) = 1。
/// OT 接收方用它生成可在模 p-1 下求逆的 nonce 指数。
///
/// # 参数
/// * `modulus` - 互素条件的模数（协议中为 p - 1）
pub fn random_coprime_exponent(modulus: &BigUint) -> BigUint {
    let mut rng = thread_rng();
    let one = BigUint::one();
    loop {
        let candidate = rng.gen_biguint_range(&one, modulus);
        if gcd(&candidate, modulus).is_one() {
            return candidate;
        }
    }
}
