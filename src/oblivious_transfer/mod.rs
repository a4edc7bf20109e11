//! # 不经意传输模块 (Oblivious Transfer)
//!
//! 本模块实现了 Parakh 的 1-out-of-2 不经意传输协议
//! (<https://arxiv.org/pdf/0909.2852.pdf>)。发送方持有两个秘密，
//! 接收方持有选择 `c ∈ {1, 2}`；协议结束后接收方恰好得到第 c 个秘密，
//! 发送方不知道 c，接收方也无法得到另一个秘密。
//!
//! ## 核心概念
//!
//! ### 协议轮次
//! - **第一轮 (发送方)**: 发送 `M1 = g^(x1 + N_A1) mod p`
//! - **第二轮 (接收方)**: 按选择取 `x_B`，发送
//!   `A = (M1 / g^(x_B))^(N_B * N_B1) mod p` 与 `B = g^(N_B) mod p`
//! - **第三轮 (发送方)**: 发送 `M3 = A^(N_A2) mod p` 及两个秘密在
//!   密钥 `K1 = B^(N_A1*N_A2)`、`K2 = B^((x1-x2+N_A1)*N_A2)` 下的密文
//! - **恢复**: 接收方计算 `K_B = M3^(N_B1^{-1} mod (p-1)) mod p`，
//!   恰好等于其选择对应的密钥
//!
//! ### 安全性质（半诚实模型）
//! - **接收方隐私**: 发送方的视图与 c 统计独立
//! - **发送方隐私**: 接收方恢复另一把密钥需要解离散对数
//!
//! ## 公共参数
//!
//! 素数 p、生成元 g 与两个公开均匀随机数 x1 > x2 在协议开始前约定，
//! 双方必须一致。参考实现使用玩具素数群 (2903, 5)；生产部署应替换为
//! 至少 2048 位的安全素数群，`OtParams::validate` 对两者执行同样的检查。

pub mod parakh;

pub use parakh::*;

use crate::utils::math::is_probable_prime;
use crate::{Result, YgcError};
use num_bigint::BigUint;
use num_traits::One;
use serde::{Deserialize, Serialize};

/// OT 子通道相对主通道的端口偏移
pub const OT_PORT_OFFSET: u16 = 1;

/// 不经意传输的公共参数
///
/// 两方必须持有相同的参数；`validate` 在协议开始前执行结构检查。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtParams {
    /// 素数模数 p
    pub prime: BigUint,
    /// 群生成元 g
    pub generator: BigUint,
    /// 公开均匀随机数 x1（较大者）
    pub x1: BigUint,
    /// 公开均匀随机数 x2（较小者）
    pub x2: BigUint,
}

impl OtParams {
    /// 组装一组公共参数
    pub fn new(prime: BigUint, generator: BigUint, x1: BigUint, x2: BigUint) -> Self {
        OtParams {
            prime,
            generator,
            x1,
            x2,
        }
    }

    /// 演示参数：玩具素数群 (p, g) = (2903, 5)，x1 = 1500，x2 = 700
    ///
    /// 仅用于演示与测试，不提供密码学安全性。
    pub fn demo() -> Self {
        OtParams::new(
            BigUint::from(2903u32),
            BigUint::from(5u32),
            BigUint::from(1500u32),
            BigUint::from(700u32),
        )
    }

    /// 校验参数的结构性质
    ///
    /// - p 为（概率意义上的）奇素数
    /// - 1 < g < p
    /// - 0 < x2 < x1 < p
    pub fn validate(&self) -> Result<()> {
        if !is_probable_prime(&self.prime) {
            return Err(YgcError::InvalidParameter(format!(
                "modulus {} is not prime",
                self.prime
            )));
        }
        let one = BigUint::one();
        if self.generator <= one || self.generator >= self.prime {
            return Err(YgcError::InvalidParameter(format!(
                "generator {} outside (1, {})",
                self.generator, self.prime
            )));
        }
        if self.x2 < one || self.x1 <= self.x2 || self.x1 >= self.prime {
            return Err(YgcError::InvalidParameter(format!(
                "public randoms must satisfy 0 < x2 < x1 < p, got x1={}, x2={}",
                self.x1, self.x2
            )));
        }
        Ok(())
    }
}

impl Default for OtParams {
    fn default() -> Self {
        OtParams::demo()
    }
}

/// OT 子通道上的消息
///
/// 三轮消息各自对应一个带标签的变体；群元素为大整数，密文为字节串，
/// nonce 以显式字段随密文传输。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OtMessage {
    /// 第一轮：`M1 = g^(x1 + N_A1) mod p`
    Round1 { m1: BigUint },
    /// 第二轮：`A = (M1 / g^(x_B))^(N_B * N_B1)`，`B = g^(N_B)`
    Round2 { a: BigUint, b: BigUint },
    /// 第三轮：`M3 = A^(N_A2)` 与两份密文及其 nonce
    Round3 {
        m3: BigUint,
        c1: Vec<u8>,
        n1: u64,
        c2: Vec<u8>,
        n2: u64,
    },
}

/// 校验接收方的选择值属于 {1, 2}
pub fn check_choice(choice: u8) -> Result<()> {
    if choice == 1 || choice == 2 {
        Ok(())
    } else {
        Err(YgcError::ChoiceRange(choice))
    }
}
