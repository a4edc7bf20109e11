//! # 混淆电路模块 (Garbled Circuits)
//!
//! 本模块实现了经典的姚氏混淆电路方案。生成方为电路的每条线生成两个
//! 随机标签与一对互补置换位，将每个门的真值表加密为混淆表；求值方
//! 凭借持有的输入标签逐门解密，全程不接触任何中间线的明文值。
//!
//! ## 核心概念
//!
//! ### 混淆方案
//! - **线标签**: 每条线两个 K 位随机标签，分别绑定逻辑值 0 和 1
//! - **置换位**: 每条线一对互补的明文位，作为混淆表的行选择子；
//!   置换位独立均匀随机，公开它不泄露线的逻辑值
//! - **混淆表**: 按输入线置换位的拼接索引，表项为
//!   `H(输入标签拼接 ∥ 门标识) XOR (输出标签 ∥ 输出置换位)`
//! - **输出解码表**: 仅输出门构造，将输出标签映射回明文位
//!
//! ### 安全保证
//! - **隐私性**: 求值方每个门只能解出一行，内部线值全程密文
//! - **正确性**: 解出的标签恰为逻辑正确真值表行对应的输出标签
//! - **一次性**: 每个混淆电路只能使用一次
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use std::collections::BTreeMap;
//! use ygc_api::garbled_circuits::{Circuit, GcParams};
//!
//! // 生成方构造一个全加器电路并给自己的输入线赋值
//! let params = GcParams::default();
//! let inputs = BTreeMap::from([(0, 1), (2, 0)]);
//! let circuit = Circuit::full_adder(&params, inputs).unwrap();
//! ```

pub mod circuit;
pub mod evaluator;
pub mod gate;
pub mod wire;

pub use circuit::*;
pub use evaluator::*;
pub use gate::*;
pub use wire::*;

use serde::{Deserialize, Serialize};

/// 线标签类型
///
/// K 位随机大整数，绑定某条线上的一个逻辑值。对持有者而言是不透明的
/// 密码学秘密。
pub type Label = num_bigint::BigUint;

/// 线标识符类型
///
/// 线在电路 arena 中的稳定索引。
pub type WireId = usize;

/// 门标识符类型
///
/// 电路内唯一的位串（'0'/'1' 文本），参与混淆表的哈希域分隔。
pub type GateId = String;

/// 输出解码表的域分隔符，ASCII "out" 的位串形式
pub const OUT_TAG: &str = "011011110111010101110100";

/// 标签位宽的参考值（安全参数 K）
pub const DEFAULT_LABEL_BITS: u64 = 100;

/// 混淆方案参数
///
/// 两方必须使用一致的参数，否则求值阶段的哈希无法对齐。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcParams {
    /// 线标签位宽（安全参数 K）
    pub label_bits: u64,
    /// 输出解码表的域分隔位串
    pub out_tag: String,
}

impl Default for GcParams {
    fn default() -> Self {
        GcParams {
            label_bits: DEFAULT_LABEL_BITS,
            out_tag: OUT_TAG.to_string(),
        }
    }
}
