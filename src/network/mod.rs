//! # 点对点通信模块 (Point-to-Point Messaging)
//!
//! 本模块实现了协议双方之间的点对点消息传输。每个节点绑定一个监听端口，
//! 与对端互相建立一条入站和一条出站连接；后台读取线程持续将到达的帧化
//! JSON 消息排入有序缓冲区，发送在调用方线程上同步完成。
//!
//! ## 核心概念
//!
//! ### 消息契约
//! - **帧格式**: 每条消息一行 JSON 文本，单帧上限 16 KiB
//! - **有序缓冲**: `get_message_at(i)` 阻塞直至第 i 条消息到达
//! - **自环回送**: 发给本机地址的消息直接进入本地缓冲区
//! - **按通道 FIFO**: 单一通道内保序；不同通道之间无跨序保证，
//!   主通道与 OT 子通道使用不同端口互不混淆
//!
//! ### 生命周期
//! - 节点在构造时获取套接字，在作用域化的 `close` 中释放
//! - 所有退出路径（包括错误路径）都会触发释放

pub mod node;

pub use node::*;
