//! # 消息节点 (Messaging Node)
//!
//! 双工点对点消息节点。`connect` 为每个对端同时发起一条出站连接并接受
//! 一条入站连接；入站连接由后台读取线程持续排空，消息按到达顺序缓冲。
//! 传输与反序列化错误不在节点内恢复，而是在下一次 `get_message_at`
//! 调用时上抛给调用方。

use crate::{Result, YgcError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// 单帧消息的字节上限
pub const MAX_FRAME_BYTES: usize = 16 * 1024;

const DIAL_RETRY_DELAY: Duration = Duration::from_millis(50);
const DIAL_ATTEMPTS: u32 = 400;

/// 有序消息缓冲区
///
/// 读取线程生产，调用方消费；一次失败即终结整个通道。
struct SharedBuffer<M> {
    state: Mutex<BufferState<M>>,
    available: Condvar,
}

struct BufferState<M> {
    messages: Vec<M>,
    failure: Option<String>,
    closed: bool,
}

impl<M> SharedBuffer<M> {
    fn new() -> Self {
        SharedBuffer {
            state: Mutex::new(BufferState {
                messages: Vec::new(),
                failure: None,
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BufferState<M>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, message: M) {
        self.lock().messages.push(message);
        self.available.notify_all();
    }

    fn fail(&self, reason: String) {
        let mut state = self.lock();
        if state.failure.is_none() {
            state.failure = Some(reason);
        }
        drop(state);
        self.available.notify_all();
    }

    fn mark_closed(&self) {
        self.lock().closed = true;
        self.available.notify_all();
    }

    fn wait_for(&self, index: usize) -> Result<M>
    where
        M: Clone,
    {
        let mut state = self.lock();
        loop {
            if let Some(message) = state.messages.get(index) {
                return Ok(message.clone());
            }
            if let Some(reason) = &state.failure {
                return Err(YgcError::Network(reason.clone()));
            }
            if state.closed {
                return Err(YgcError::Network(format!(
                    "channel closed before message {index} arrived"
                )));
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// 点对点消息节点
///
/// 泛型参数 `M` 为该通道承载的消息类型；主通道与 OT 通道各自实例化
/// 不同的消息枚举，互不混淆。
pub struct Node<M> {
    local_addr: SocketAddr,
    listener: Option<TcpListener>,
    inbound: Vec<TcpStream>,
    outbound: Mutex<BTreeMap<SocketAddr, TcpStream>>,
    buffer: Arc<SharedBuffer<M>>,
    stop: Arc<AtomicBool>,
    readers: Vec<JoinHandle<()>>,
}

/// 解析主机名与端口为套接字地址
pub fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr> {
    use std::net::ToSocketAddrs;
    (host, port)
        .to_socket_addrs()
        .map_err(|e| YgcError::Network(format!("resolve {host}:{port} failed: {e}")))?
        .next()
        .ok_or_else(|| YgcError::Network(format!("{host}:{port} resolves to no address")))
}

fn dial_with_retry(peer: SocketAddr) -> Result<TcpStream> {
    for _ in 0..DIAL_ATTEMPTS {
        match TcpStream::connect(peer) {
            Ok(stream) => return Ok(stream),
            Err(_) => thread::sleep(DIAL_RETRY_DELAY),
        }
    }
    Err(YgcError::Network(format!(
        "peer {peer} did not accept a connection"
    )))
}

impl<M> Node<M>
where
    M: Serialize + DeserializeOwned + Clone + Send + 'static,
{
    /// 绑定监听端口
    ///
    /// # 参数
    /// * `host` - 本机主机名
    /// * `port` - 本机端口号
    pub fn bind(host: &str, port: u16) -> Result<Self> {
        let listener = TcpListener::bind((host, port))
            .map_err(|e| YgcError::Network(format!("bind {host}:{port} failed: {e}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| YgcError::Network(e.to_string()))?;
        debug!(%local_addr, "node bound");
        Ok(Node {
            local_addr,
            listener: Some(listener),
            inbound: Vec::new(),
            outbound: Mutex::new(BTreeMap::new()),
            buffer: Arc::new(SharedBuffer::new()),
            stop: Arc::new(AtomicBool::new(false)),
            readers: Vec::new(),
        })
    }

    /// 本节点的监听地址
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// 与所有对端建立双向连接
    ///
    /// 对每个对端并行发起一条出站连接（对端监听器未就绪时重试），
    /// 同时在本地监听器上接受一条入站连接；全部连通后启动后台读取线程。
    /// 本机地址会被跳过。
    ///
    /// # 参数
    /// * `peers` - 对端地址列表
    pub fn connect(&mut self, peers: &[SocketAddr]) -> Result<()> {
        let remote: Vec<SocketAddr> = peers
            .iter()
            .copied()
            .filter(|addr| *addr != self.local_addr)
            .collect();

        let dialers: Vec<(SocketAddr, JoinHandle<Result<TcpStream>>)> = remote
            .iter()
            .map(|&peer| (peer, thread::spawn(move || dial_with_retry(peer))))
            .collect();

        let listener = self
            .listener
            .take()
            .ok_or_else(|| YgcError::Network("node already connected".to_string()))?;
        for _ in 0..remote.len() {
            let (conn, addr) = listener
                .accept()
                .map_err(|e| YgcError::Network(format!("accept failed: {e}")))?;
            debug!(%addr, "accepted inbound connection");
            self.spawn_reader(conn)?;
        }

        for (peer, handle) in dialers {
            let stream = handle
                .join()
                .map_err(|_| YgcError::Network("dialer thread panicked".to_string()))??;
            debug!(%peer, "outbound connection established");
            let mut outbound = self
                .outbound
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            outbound.insert(peer, stream);
        }
        Ok(())
    }

    fn spawn_reader(&mut self, conn: TcpStream) -> Result<()> {
        let reader_conn = conn
            .try_clone()
            .map_err(|e| YgcError::Network(format!("clone inbound socket failed: {e}")))?;
        self.inbound.push(conn);

        let buffer = Arc::clone(&self.buffer);
        let stop = Arc::clone(&self.stop);
        let handle = thread::spawn(move || {
            let mut reader = BufReader::new(reader_conn);
            let mut line = String::new();
            loop {
                line.clear();
                match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(bytes) => {
                        if bytes > MAX_FRAME_BYTES {
                            buffer.fail(format!(
                                "inbound frame of {bytes} bytes exceeds the {MAX_FRAME_BYTES}-byte limit"
                            ));
                            break;
                        }
                        let text = line.trim_end();
                        if text.is_empty() {
                            continue;
                        }
                        match serde_json::from_str::<M>(text) {
                            Ok(message) => {
                                debug!(frame_bytes = bytes, "buffered inbound message");
                                buffer.push(message);
                            }
                            Err(e) => {
                                buffer.fail(format!("malformed payload: {e}"));
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        if !stop.load(Ordering::SeqCst) {
                            buffer.fail(format!("transport read failed: {e}"));
                        }
                        break;
                    }
                }
            }
            buffer.mark_closed();
        });
        self.readers.push(handle);
        Ok(())
    }

    /// 发送一批消息，每个对端一条
    ///
    /// 发给本机地址的消息直接回送进本地缓冲区，其余消息序列化为单行
    /// JSON 同步写入对应出站连接。
    ///
    /// # 参数
    /// * `messages` - 对端地址到消息的映射
    pub fn send_messages(&self, messages: BTreeMap<SocketAddr, M>) -> Result<()> {
        for (addr, message) in messages {
            if addr == self.local_addr {
                self.buffer.push(message);
                continue;
            }
            let mut text = serde_json::to_string(&message)
                .map_err(|e| YgcError::Serialization(e.to_string()))?;
            if text.len() + 1 > MAX_FRAME_BYTES {
                return Err(YgcError::Network(format!(
                    "outbound frame of {} bytes exceeds the {MAX_FRAME_BYTES}-byte limit",
                    text.len() + 1
                )));
            }
            text.push('\n');

            let mut outbound = self
                .outbound
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let stream = outbound
                .get_mut(&addr)
                .ok_or_else(|| YgcError::Network(format!("no connection to {addr}")))?;
            stream
                .write_all(text.as_bytes())
                .and_then(|_| stream.flush())
                .map_err(|e| YgcError::Network(format!("send to {addr} failed: {e}")))?;
            debug!(%addr, frame_bytes = text.len(), "sent message");
        }
        Ok(())
    }

    /// 取第 `index` 条缓冲消息（0 起），未到达则阻塞
    ///
    /// 读取线程已因传输或反序列化错误终止时，返回相应错误而非继续等待。
    pub fn get_message_at(&self, index: usize) -> Result<M> {
        self.buffer.wait_for(index)
    }
}

impl<M> Node<M> {
    /// 关闭节点：通知读取线程停止、关闭全部套接字并等待线程退出
    ///
    /// 幂等；`Drop` 中也会调用，保证所有退出路径都释放资源。
    pub fn close(&mut self) {
        if self.stop.swap(true, Ordering::SeqCst) {
            return;
        }
        for conn in &self.inbound {
            let _ = conn.shutdown(Shutdown::Both);
        }
        {
            let mut outbound = self
                .outbound
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for stream in outbound.values() {
                let _ = stream.shutdown(Shutdown::Both);
            }
            outbound.clear();
        }
        self.listener = None;
        for handle in self.readers.drain(..) {
            if handle.join().is_err() {
                warn!("reader thread panicked during shutdown");
            }
        }
        self.inbound.clear();
    }
}

impl<M> Drop for Node<M> {
    fn drop(&mut self) {
        self.close();
    }
}
