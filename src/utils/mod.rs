//! # 工具模块 (Utility Functions)
//!
//! 本模块提供了 YGC 协议实现中使用的各种工具函数和辅助功能。
//! 这些工具函数为混淆电路和不经意传输的实现提供了基础支持。
//!
//! ## 子模块
//!
//! - **数学工具 (math)**: 大整数模运算（平方-乘算法、欧几里得算法、模逆）
//! - **密码工具 (crypto)**: SHA-512 哈希门面与认证对称加密门面
//! - **随机数生成 (random)**: 线标签、置换位与群指数的随机采样
//! - **编码工具 (encoding)**: 定宽二进制串编码与标签/置换位打包
//!
//! ## 主要功能
//!
//! ### 模运算
//! - 平方-乘模幂运算
//! - 最大公约数与扩展欧几里得算法
//! - 模逆运算与概率素性检测
//!
//! ### 密码原语
//! - 字节串、文本与大整数的 SHA-512 哈希
//! - 32 字节密钥、24 字节 nonce 的认证加密
//!
//! ### 随机采样
//! - K 位随机线标签与随机置换位
//! - 群指数的均匀采样与互素拒绝采样

pub mod crypto;
pub mod encoding;
pub mod math;
pub mod random;

pub use crypto::*;
pub use encoding::*;
pub use math::*;
pub use random::*;
