//! # 数学工具函数 (Mathematical Utility Functions)
//!
//! 本模块提供了 YGC 协议中常用的大整数模运算函数，包括：
//! - 平方-乘模幂运算
//! - 欧几里得算法与扩展欧几里得算法
//! - 模逆运算
//! - 概率素性检测
//!
//! 所有运算基于任意精度整数，数值域以协议素数为界。
//! 这些函数为不经意传输的群运算提供数学基础。

use crate::{Result, YgcError};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{One, Zero};

/// 平方-乘模幂运算
///
/// 计算 base^exponent mod modulus。从指数二进制展开的最高位开始扫描：
/// 每一位先将累积结果平方取模，该位为 1 时再乘以底数取模，初始值为 1。
///
/// # 参数
/// * `base` - 底数
/// * `exponent` - 指数
/// * `modulus` - 模数
///
/// # 返回值
/// 返回模幂运算的结果
pub fn square_multiply(base: &BigUint, exponent: &BigUint, modulus: &BigUint) -> BigUint {
    let mut result = BigUint::one();
    for index in (0..exponent.bits()).rev() {
        result = &result * &result % modulus;
        if exponent.bit(index) {
            result = result * base % modulus;
        }
    }
    result
}

/// 计算两个数的最大公约数 (Greatest Common Divisor)
///
/// 使用经典欧几里得约简计算两个非负整数的最大公约数。
/// 在协议中用于模逆运算与互素指数的拒绝采样。
///
/// # 参数
/// * `a` - 第一个非负整数
/// * `b` - 第二个非负整数
///
/// # 返回值
/// 返回 a 和 b 的最大公约数
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let (mut larger, mut smaller) = if a >= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    };
    while !smaller.is_zero() {
        let remainder = &larger % &smaller;
        larger = smaller;
        smaller = remainder;
    }
    larger
}

/// 扩展欧几里得算法 (Extended Euclidean Algorithm)
///
/// 求整数系数 (u, v) 使得 u*a + v*b = gcd(a, b)。
///
/// # 参数
/// * `a` - 第一个非负整数
/// * `b` - 第二个非负整数
///
/// # 返回值
/// 返回三元组 (u, v, g)，满足 u*a + v*b = g = gcd(a, b)
pub fn extended_gcd(a: &BigUint, b: &BigUint) -> (BigInt, BigInt, BigUint) {
    let mut old_r = BigInt::from(a.clone());
    let mut r = BigInt::from(b.clone());
    let mut old_u = BigInt::one();
    let mut u = BigInt::zero();
    let mut old_v = BigInt::zero();
    let mut v = BigInt::one();

    while !r.is_zero() {
        let quotient = &old_r / &r;
        let next_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, next_r);
        let next_u = &old_u - &quotient * &u;
        old_u = std::mem::replace(&mut u, next_u);
        let next_v = &old_v - &quotient * &v;
        old_v = std::mem::replace(&mut v, next_v);
    }

    // old_r >= 0 whenever a, b >= 0
    let (_, g) = old_r.into_parts();
    (old_u, old_v, g)
}

/// 模逆运算
///
/// 求 x 关于模数 n 的乘法逆元。inverse(1, n) = 1；当 gcd(x, n) != 1 时
/// 逆元不存在，返回算术错误（表明协议参数配置有误）。
///
/// # 参数
/// * `x` - 要求逆的数
/// * `n` - 模数
///
/// # 返回值
/// 返回 x^{-1} mod n，即满足 x * inverse(x, n) ≡ 1 (mod n) 的值
pub fn inverse(x: &BigUint, n: &BigUint) -> Result<BigUint> {
    if x.is_one() {
        return Ok(BigUint::one());
    }
    let (u, _, g) = extended_gcd(x, n);
    if !g.is_one() {
        return Err(YgcError::Arithmetic(format!(
            "{x} has no inverse modulo {n}: gcd is {g}"
        )));
    }
    let modulus = BigInt::from(n.clone());
    let reduced = ((u % &modulus) + &modulus) % &modulus;
    let (_, magnitude) = reduced.into_parts();
    Ok(magnitude)
}

/// 概率素性检测
///
/// 使用固定底数集合的 Miller-Rabin 检测。合数通过所有底数的概率
/// 可以忽略不计，足以校验调用方提供的协议素数。
///
/// # 参数
/// * `n` - 待检测的非负整数
///
/// # 返回值
/// n 很可能是素数时返回 true，确定是合数时返回 false
pub fn is_probable_prime(n: &BigUint) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    if n == &two {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // n - 1 = d * 2^s with d odd
    let n_minus_1 = n - 1u32;
    let mut d = n_minus_1.clone();
    let mut s = 0u64;
    while d.is_even() {
        d >>= 1;
        s += 1;
    }

    const WITNESSES: [u32; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
    'witness: for base in WITNESSES {
        let base = BigUint::from(base);
        if base >= n_minus_1 {
            continue;
        }
        let mut x = square_multiply(&base, &d, n);
        if x.is_one() || x == n_minus_1 {
            continue;
        }
        for _ in 1..s {
            x = &x * &x % n;
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}
