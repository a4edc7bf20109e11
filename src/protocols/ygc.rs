//! # YGC 协议状态机 (YGC Protocol State Machines)
//!
//! 生成方构造混淆电路后向求值方发送电路视图：按序排列的混淆表与输出
//! 解码表、每个门打乱顺序的候选输入对目录，以及生成方自己输入线上的
//! (标签, 置换位) 对。随后进入 OT 循环：求值方每请求一条输入线，双方
//! 就在派生端口上执行一次完整的不经意传输。求值方取得全部输入标签后
//! 逐门解密电路、解码输出门，并以带标签的终止消息回传输出映射。
//!
//! 主通道消息为显式枚举：`GarbledView`、`WireRequest` 与 `Done`，
//! 无任何隐式的类型判别约定。

use crate::garbled_circuits::{
    decode_output, decrypt_gate, order_gate_inputs, Circuit, GateId, GcParams, Label,
};
use crate::network::{resolve_addr, Node};
use crate::oblivious_transfer::{OtParams, OtReceiver, OtSender, OT_PORT_OFFSET};
use crate::utils::encoding::{pack_label, unpack_label};
use crate::{Result, YgcError};
use num_bigint::BigUint;
use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use tracing::{debug, info};

/// 电路输出：输出门标识到明文位的映射
pub type Outputs = BTreeMap<GateId, u8>;

/// 一次 YGC 会话的网络配置
///
/// 主通道使用 `port`/`peer_port`；第 i 次 OT 会话使用两侧各自
/// `端口 + 1 + i` 的派生端口，已结束会话的端口不会被重新绑定。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// 本机主机名
    pub host: String,
    /// 本机主通道端口
    pub port: u16,
    /// 对端主机名
    pub peer_host: String,
    /// 对端主通道端口
    pub peer_port: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            host: "127.0.0.1".to_string(),
            port: 12024,
            peer_host: "127.0.0.1".to_string(),
            peer_port: 12032,
        }
    }
}

/// 混淆电路的可传输投影
///
/// 求值方凭此视图完成求值，但接触不到任何未持有逻辑值的线标签秘密。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbledView {
    /// 门标识，按门的定义顺序排列
    pub gate_ids: Vec<GateId>,
    /// 与 `gate_ids` 对齐的混淆表序列
    pub garbled_tables: Vec<Vec<BigUint>>,
    /// 与 `gate_ids` 对齐的输出解码表序列（非输出门为空表）
    pub decoding_tables: Vec<Vec<BigUint>>,
    /// 每个门打乱顺序的候选输入 (标签, 置换位) 目录
    pub permuted_inputs: BTreeMap<GateId, Vec<(Label, u8)>>,
    /// 生成方输入线上的 (标签, 置换位) 对，按规范线索引编号
    pub generator_inputs: BTreeMap<u64, (Label, u8)>,
}

impl GarbledView {
    /// 从已混淆的电路导出视图
    ///
    /// 导出前重新校验电路结构；每个门的候选目录收齐两个逻辑值下的
    /// 全部输入对后随机打乱。
    pub fn from_circuit(circuit: &Circuit) -> Result<Self> {
        circuit.validate()?;

        let mut gate_ids = Vec::with_capacity(circuit.gates.len());
        let mut garbled_tables = Vec::with_capacity(circuit.gates.len());
        let mut decoding_tables = Vec::with_capacity(circuit.gates.len());
        let mut permuted_inputs = BTreeMap::new();
        let mut rng = thread_rng();

        for gate in &circuit.gates {
            gate_ids.push(gate.id.clone());
            garbled_tables.push(gate.garbled_table.clone());
            decoding_tables.push(gate.decoding_table.clone());

            let mut candidates = Vec::with_capacity(2 * gate.input_wires.len());
            for value in 0u8..2 {
                for &wire in &gate.input_wires {
                    candidates.push(circuit.wire_pair(wire, value)?);
                }
            }
            candidates.shuffle(&mut rng);
            permuted_inputs.insert(gate.id.clone(), candidates);
        }

        let mut generator_inputs = BTreeMap::new();
        for (&wire, &value) in &circuit.inputs {
            generator_inputs.insert(wire as u64, circuit.wire_pair(wire, value)?);
        }

        Ok(GarbledView {
            gate_ids,
            garbled_tables,
            decoding_tables,
            permuted_inputs,
            generator_inputs,
        })
    }

    fn check_consistency(&self) -> Result<()> {
        if self.garbled_tables.len() != self.gate_ids.len()
            || self.decoding_tables.len() != self.gate_ids.len()
        {
            return Err(YgcError::Protocol(format!(
                "garbled view tables misaligned: {} ids, {} tables, {} decoding tables",
                self.gate_ids.len(),
                self.garbled_tables.len(),
                self.decoding_tables.len()
            )));
        }
        Ok(())
    }
}

/// 主通道上的协议消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum YgcMessage {
    /// 生成方 -> 求值方：混淆电路视图
    GarbledView(GarbledView),
    /// 求值方 -> 生成方：请求对某条输入线执行不经意传输
    WireRequest(u64),
    /// 求值方 -> 生成方：最终输出映射，终止会话
    Done(Outputs),
}

/// YGC 生成方状态机
pub struct YgcGenerator {
    node: Node<YgcMessage>,
    config: SessionConfig,
    peer: SocketAddr,
    circuit: Circuit,
    ot_params: OtParams,
}

impl YgcGenerator {
    /// 校验电路与 OT 参数并连接主通道
    pub fn connect(
        config: SessionConfig,
        circuit: Circuit,
        ot_params: OtParams,
    ) -> Result<Self> {
        circuit.validate()?;
        ot_params.validate()?;
        let peer = resolve_addr(&config.peer_host, config.peer_port)?;
        let mut node = Node::bind(&config.host, config.port)?;
        node.connect(&[peer])?;
        Ok(YgcGenerator {
            node,
            config,
            peer,
            circuit,
            ot_params,
        })
    }

    /// 运行生成方协议，返回求值方回传的输出映射
    pub fn run(mut self) -> Result<Outputs> {
        let result = self.protocol();
        self.node.close();
        result
    }

    fn protocol(&mut self) -> Result<Outputs> {
        info!("generator: sending garbled view");
        let view = GarbledView::from_circuit(&self.circuit)?;
        self.node
            .send_messages(BTreeMap::from([(self.peer, YgcMessage::GarbledView(view))]))?;

        // OT loop: serve wire requests until the evaluator reports outputs
        let mut round = 0;
        let mut ot_session: u16 = 0;
        loop {
            let message = self.node.get_message_at(round)?;
            round += 1;
            match message {
                YgcMessage::WireRequest(wire) => {
                    debug!(wire, ot_session, "generator: serving oblivious transfer");
                    let (label0, p0) = self.circuit.wire_pair(wire as usize, 0)?;
                    let (label1, p1) = self.circuit.wire_pair(wire as usize, 1)?;
                    let sender = OtSender::connect(
                        &self.config.host,
                        self.config.port + OT_PORT_OFFSET + ot_session,
                        &self.config.peer_host,
                        self.config.peer_port + OT_PORT_OFFSET + ot_session,
                        self.ot_params.clone(),
                        pack_label(&label0, p0),
                        pack_label(&label1, p1),
                    )?;
                    sender.run()?;
                    ot_session += 1;
                }
                YgcMessage::Done(outputs) => {
                    info!("generator: session complete");
                    return Ok(outputs);
                }
                YgcMessage::GarbledView(_) => {
                    return Err(YgcError::Protocol(
                        "unexpected garbled view from evaluator".to_string(),
                    ))
                }
            }
        }
    }
}

/// YGC 求值方状态机
pub struct YgcEvaluator {
    node: Node<YgcMessage>,
    config: SessionConfig,
    peer: SocketAddr,
    inputs: BTreeMap<u64, u8>,
    ot_params: OtParams,
    gc_params: GcParams,
}

impl YgcEvaluator {
    /// 校验输入与 OT 参数并连接主通道
    ///
    /// # 参数
    /// * `inputs` - 求值方持有的输入赋值：规范线索引 -> 明文位
    pub fn connect(
        config: SessionConfig,
        inputs: BTreeMap<u64, u8>,
        ot_params: OtParams,
        gc_params: GcParams,
    ) -> Result<Self> {
        for (&wire, &bit) in &inputs {
            if bit > 1 {
                return Err(YgcError::InvalidParameter(format!(
                    "input bit for wire {wire} is {bit}"
                )));
            }
        }
        ot_params.validate()?;
        let peer = resolve_addr(&config.peer_host, config.peer_port)?;
        let mut node = Node::bind(&config.host, config.port)?;
        node.connect(&[peer])?;
        Ok(YgcEvaluator {
            node,
            config,
            peer,
            inputs,
            ot_params,
            gc_params,
        })
    }

    /// 运行求值方协议，返回解码后的输出映射
    pub fn run(mut self) -> Result<Outputs> {
        let result = self.protocol();
        self.node.close();
        result
    }

    fn protocol(&mut self) -> Result<Outputs> {
        // 1) Receive the garbled view
        let view = match self.node.get_message_at(0)? {
            YgcMessage::GarbledView(view) => view,
            other => {
                return Err(YgcError::Protocol(format!(
                    "expected garbled view, got {other:?}"
                )))
            }
        };
        view.check_consistency()?;
        info!(gates = view.gate_ids.len(), "evaluator: received garbled view");

        // 2) Seed the held inputs with the generator's pairs, then run one
        //    oblivious transfer per own input bit
        let mut held: BTreeMap<u64, (Label, u8)> = view.generator_inputs.clone();
        for (session, (&wire, &bit)) in self.inputs.iter().enumerate() {
            self.node
                .send_messages(BTreeMap::from([(self.peer, YgcMessage::WireRequest(wire))]))?;
            let session = session as u16;
            let receiver = OtReceiver::connect(
                &self.config.host,
                self.config.port + OT_PORT_OFFSET + session,
                &self.config.peer_host,
                self.config.peer_port + OT_PORT_OFFSET + session,
                self.ot_params.clone(),
                bit + 1,
            )?;
            let packed = receiver.run()?;
            let pair = unpack_label(&packed, self.gc_params.label_bits)?;
            debug!(wire, "evaluator: obtained input label");
            held.insert(wire, pair);
        }

        // 3) Walk the gates in definition order, feeding each output forward
        //    under the next canonical wire index
        let mut gate_outputs: BTreeMap<GateId, (Label, u8)> = BTreeMap::new();
        for (index, gate_id) in view.gate_ids.iter().enumerate() {
            let catalogue = view.permuted_inputs.get(gate_id).ok_or_else(|| {
                YgcError::Protocol(format!("no candidate catalogue for gate {gate_id}"))
            })?;
            let gate_inputs = order_gate_inputs(catalogue, &held);
            let (out_label, out_p) = decrypt_gate(
                &view.garbled_tables[index],
                gate_id,
                &gate_inputs,
                &self.gc_params,
            )?;
            let next_key = held.keys().next_back().map_or(0, |&key| key + 1);
            held.insert(next_key, (out_label.clone(), out_p));
            gate_outputs.insert(gate_id.clone(), (out_label, out_p));
        }

        // 4) Decode every output gate
        let mut outputs = Outputs::new();
        for (index, gate_id) in view.gate_ids.iter().enumerate() {
            let table = &view.decoding_tables[index];
            if table.is_empty() {
                continue;
            }
            let (label, _) = gate_outputs.get(gate_id).ok_or_else(|| {
                YgcError::Protocol(format!("no evaluated output for gate {gate_id}"))
            })?;
            outputs.insert(
                gate_id.clone(),
                decode_output(table, gate_id, label, &self.gc_params)?,
            );
        }

        // 5) Terminate the generator's OT loop with the output map
        info!(outputs = outputs.len(), "evaluator: session complete");
        self.node
            .send_messages(BTreeMap::from([(self.peer, YgcMessage::Done(outputs.clone()))]))?;
        Ok(outputs)
    }
}
