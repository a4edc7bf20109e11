//! # YGC API - 姚氏混淆电路 (Yao's Garbled Circuits) 两方安全计算库
//!
//! 这是一个用 Rust 实现的两方安全函数求值库。生成方 (Generator) 和求值方
//! (Evaluator) 在不泄露各自私有输入的情况下共同计算一个布尔电路。
//! 生成方构造电路的加密（"混淆"）版本；求值方通过不经意传输获得自己输入
//! 对应的线标签，逐门解密电路，最终只解码指定的输出位。
//!
//! ## 核心组件 (Core Components)
//!
//! ### 混淆电路 (Garbled Circuits)
//! - **线标签**: 每条线有两个随机标签和一对互补的置换位
//! - **门混淆**: 真值表按置换位排序后逐行加密
//! - **输出解码表**: 仅输出门携带，将输出标签映射回明文位
//!
//! ### 不经意传输 (Oblivious Transfer)
//! - **Parakh 1-out-of-2 OT**: 基于素数阶循环群的 Diffie-Hellman 式交互协议
//! - 接收方恰好获得发送方两个秘密中的一个，发送方不知道是哪一个
//!
//! ### 点对点通信 (Point-to-Point Messaging)
//! - **消息节点**: 双工的帧化 JSON 消息传输，后台读取线程持续收包
//! - 主通道承载 YGC 协议消息，每次 OT 使用派生端口上的独立通道
//!
//! ### 协议编排 (Protocol Orchestration)
//! - **生成方状态机**: 混淆电路 → 发送电路视图 → OT 循环 → 接收输出
//! - **求值方状态机**: 接收视图 → 逐位 OT → 逐门解密 → 解码并回传输出
//!
//! ## 设计原则 (Design Principles)
//!
//! 1. **半诚实安全模型**: 协议在 semi-honest 敌手模型下保证输入隐私
//! 2. **索引化电路**: 线与门存放在 arena 中，通过稳定索引引用，无共享可变图
//! 3. **类型化消息**: 所有传输消息均为带标签的枚举，无隐式终止约定
//! 4. **任意精度运算**: 所有群运算基于大整数，支持生产规模的素数群

pub mod garbled_circuits;
pub mod network;
pub mod oblivious_transfer;
pub mod protocols;
pub mod utils;

pub use garbled_circuits::*;
pub use network::*;
pub use oblivious_transfer::*;
pub use protocols::*;
pub use utils::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum YgcError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),
    #[error("Authenticated decryption failed: {0}")]
    OtDecrypt(String),
    #[error("Output decode failure: {0}")]
    DecodeFailure(String),
    #[error("Oblivious transfer choice must be 1 or 2, got {0}")]
    ChoiceRange(u8),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<String> for YgcError {
    fn from(s: String) -> Self {
        YgcError::Protocol(s)
    }
}

impl From<&str> for YgcError {
    fn from(s: &str) -> Self {
        YgcError::Protocol(s.to_string())
    }
}

pub type Result<T> = std::result::Result<T, YgcError>;
