//! # 协议编排模块 (Protocol Orchestration)
//!
//! 本模块把混淆电路、不经意传输与消息节点装配为完整的两方协议。
//! 生成方与求值方各自以独占方式持有自己的消息节点，协议结束或出错时
//! 在所有退出路径上释放套接字。
//!
//! ## 会话流程
//!
//! 1. 生成方混淆电路并发送可传输的电路视图
//! 2. 求值方对自己的每个输入位发起一次不经意传输
//! 3. 求值方逐门解密、解码输出，并把输出映射回传给生成方

pub mod ygc;

pub use ygc::*;
