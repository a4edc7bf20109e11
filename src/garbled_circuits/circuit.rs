//! # 电路表示和基本操作
//!
//! 本模块定义了混淆电路的 arena 表示：所有线存放在一个向量中按稳定索引
//! 引用，门按拓扑顺序排列并通过线索引绑定输入输出。生成方构造电路时即
//! 完成全部门的混淆，此后电路不再变更。
//!
//! 演示电路（全加器、两位比较器、单非门）以构造函数形式提供。

use super::{Gate, GateFn, GateId, GcParams, Label, Wire, WireId};
use crate::{Result, YgcError};
use std::collections::{BTreeMap, BTreeSet};

/// 布尔电路结构
///
/// 包含线 arena、按拓扑顺序排列的混淆门，以及生成方持有的输入赋值
/// （线索引到明文位的映射）。
#[derive(Debug, Clone)]
pub struct Circuit {
    /// 电路中所有线的 arena，按索引寻址
    pub wires: Vec<Wire>,
    /// 按定义顺序（即拓扑顺序）排列的混淆门
    pub gates: Vec<Gate>,
    /// 生成方输入赋值：线索引 -> 明文位
    pub inputs: BTreeMap<WireId, u8>,
}

impl Circuit {
    /// 组装电路并立即校验结构不变量
    ///
    /// # 参数
    /// * `wires` - 线 arena
    /// * `gates` - 已混淆的门序列
    /// * `inputs` - 生成方持有的输入赋值
    pub fn new(wires: Vec<Wire>, gates: Vec<Gate>, inputs: BTreeMap<WireId, u8>) -> Result<Self> {
        let circuit = Circuit {
            wires,
            gates,
            inputs,
        };
        circuit.validate()?;
        Ok(circuit)
    }

    /// 电路输入线的数量
    ///
    /// 在本电路形状约定下，前若干条线为输入线，其余每条线恰由一个门写入。
    pub fn input_wire_count(&self) -> usize {
        self.wires.len() - self.gates.len()
    }

    /// 取某条线上绑定给定逻辑值的 (标签, 置换位) 对
    ///
    /// # 参数
    /// * `wire` - 线索引
    /// * `value` - 逻辑值（0 或 1）
    pub fn wire_pair(&self, wire: WireId, value: u8) -> Result<(Label, u8)> {
        if value > 1 {
            return Err(YgcError::Protocol(format!(
                "wire value must be a bit, got {value}"
            )));
        }
        let entry = self
            .wires
            .get(wire)
            .ok_or_else(|| YgcError::Protocol(format!("wire {wire} out of range")))?;
        Ok(entry.pair(value))
    }

    /// 校验电路的结构不变量
    ///
    /// - 门标识在电路内唯一
    /// - 每个门的所有输入线索引严格小于其输出线索引（拓扑有序）
    /// - 第 k 个门的输出线恰为 `输入线数 + k`，即每条内部线有唯一写入者，
    ///   且求值方按接收顺序递增分配的键能对上规范线索引
    /// - 生成方输入赋值只落在输入线上，取值为位
    pub fn validate(&self) -> Result<()> {
        if self.gates.len() > self.wires.len() {
            return Err(YgcError::InvalidParameter(
                "more gates than wires".to_string(),
            ));
        }
        let input_count = self.input_wire_count();

        let mut seen_ids = BTreeSet::new();
        for (index, gate) in self.gates.iter().enumerate() {
            if !seen_ids.insert(gate.id.clone()) {
                return Err(YgcError::InvalidParameter(format!(
                    "duplicate gate id {}",
                    gate.id
                )));
            }
            let expected_output = input_count + index;
            if gate.output_wire != expected_output {
                return Err(YgcError::InvalidParameter(format!(
                    "gate {} writes wire {}, expected {expected_output}; \
                     evaluator wire-assignment order depends on this shape",
                    gate.id, gate.output_wire
                )));
            }
            for &input in &gate.input_wires {
                if input >= gate.output_wire {
                    return Err(YgcError::InvalidParameter(format!(
                        "gate {} reads wire {input} which does not precede its output {}",
                        gate.id, gate.output_wire
                    )));
                }
            }
        }

        for (&wire, &value) in &self.inputs {
            if wire >= input_count {
                return Err(YgcError::InvalidParameter(format!(
                    "input assignment for non-input wire {wire}"
                )));
            }
            if value > 1 {
                return Err(YgcError::InvalidParameter(format!(
                    "input bit for wire {wire} is {value}"
                )));
            }
        }
        Ok(())
    }

    /// 在明文下求值整个电路（测试基准用）
    ///
    /// # 参数
    /// * `assignment` - 覆盖全部输入线的明文赋值（双方输入的并集）
    ///
    /// # 返回值
    /// 输出门标识到明文输出位的映射
    pub fn eval_clear(&self, assignment: &BTreeMap<WireId, u8>) -> Result<BTreeMap<GateId, u8>> {
        let mut values: Vec<Option<bool>> = vec![None; self.wires.len()];
        for (&wire, &bit) in assignment {
            if wire >= self.wires.len() {
                return Err(YgcError::Protocol(format!("assignment to wire {wire}")));
            }
            values[wire] = Some(bit == 1);
        }

        let mut outputs = BTreeMap::new();
        for gate in &self.gates {
            let mut inputs = Vec::with_capacity(gate.input_wires.len());
            for &wire in &gate.input_wires {
                inputs.push(values[wire].ok_or_else(|| {
                    YgcError::Protocol(format!("wire {wire} unset before gate {}", gate.id))
                })?);
            }
            let out = gate.func.eval(&inputs)?;
            values[gate.output_wire] = Some(out);
            if gate.is_output {
                outputs.insert(gate.id.clone(), u8::from(out));
            }
        }
        Ok(outputs)
    }

    /// 构造全加器演示电路
    ///
    /// 线 W0 (生成方)、W1 (求值方)、W2 (生成方) 为输入，
    /// 门 "001" 输出 Sum，门 "100" 输出 Carry。
    ///
    /// # 参数
    /// * `params` - 混淆方案参数
    /// * `inputs` - 生成方输入赋值（W0 与 W2）
    pub fn full_adder(params: &GcParams, inputs: BTreeMap<WireId, u8>) -> Result<Self> {
        let wires: Vec<Wire> = (0..8).map(|_| Wire::random(params.label_bits)).collect();
        let gates = vec![
            Gate::garble("000", GateFn::Xor, vec![0, 1], 3, false, &wires, params)?,
            Gate::garble("001", GateFn::Xor, vec![2, 3], 4, true, &wires, params)?,
            Gate::garble("010", GateFn::And, vec![2, 3], 5, false, &wires, params)?,
            Gate::garble("011", GateFn::And, vec![0, 1], 6, false, &wires, params)?,
            Gate::garble("100", GateFn::Or, vec![5, 6], 7, true, &wires, params)?,
        ];
        Circuit::new(wires, gates, inputs)
    }

    /// 构造两位比较器演示电路
    ///
    /// 计算“生成方的两位值 > 求值方的两位值”。生成方持有 W0、W2
    /// （高位、低位），求值方持有 W1、W3；门 "110" 输出比较结果。
    ///
    /// # 参数
    /// * `params` - 混淆方案参数
    /// * `inputs` - 生成方输入赋值（W0 与 W2）
    pub fn comparator2(params: &GcParams, inputs: BTreeMap<WireId, u8>) -> Result<Self> {
        let wires: Vec<Wire> = (0..11).map(|_| Wire::random(params.label_bits)).collect();
        let gates = vec![
            Gate::garble("000", GateFn::Xor, vec![0, 1], 4, false, &wires, params)?,
            Gate::garble("001", GateFn::Not, vec![4], 5, false, &wires, params)?,
            Gate::garble("010", GateFn::And, vec![0, 4], 6, false, &wires, params)?,
            Gate::garble("011", GateFn::Xor, vec![2, 3], 7, false, &wires, params)?,
            Gate::garble("100", GateFn::And, vec![5, 7], 8, false, &wires, params)?,
            Gate::garble("101", GateFn::And, vec![2, 8], 9, false, &wires, params)?,
            Gate::garble("110", GateFn::Or, vec![6, 9], 10, true, &wires, params)?,
        ];
        Circuit::new(wires, gates, inputs)
    }

    /// 构造单非门演示电路
    ///
    /// W0 为输入，门 "0" 输出 NOT(W0)。
    ///
    /// # 参数
    /// * `params` - 混淆方案参数
    /// * `inputs` - 生成方输入赋值（W0 属于求值方时传空映射）
    pub fn single_not(params: &GcParams, inputs: BTreeMap<WireId, u8>) -> Result<Self> {
        let wires: Vec<Wire> = (0..2).map(|_| Wire::random(params.label_bits)).collect();
        let gates = vec![Gate::garble(
            "0",
            GateFn::Not,
            vec![0],
            1,
            true,
            &wires,
            params,
        )?];
        Circuit::new(wires, gates, inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_adder_shape() {
        let circuit = Circuit::full_adder(&GcParams::default(), BTreeMap::new()).unwrap();
        assert_eq!(circuit.wires.len(), 8);
        assert_eq!(circuit.gates.len(), 5);
        assert_eq!(circuit.input_wire_count(), 3);
    }

    #[test]
    fn test_full_adder_clear_eval() {
        let circuit = Circuit::full_adder(&GcParams::default(), BTreeMap::new()).unwrap();
        for assignment in 0..8u8 {
            let bits = [
                (assignment >> 2) & 1,
                (assignment >> 1) & 1,
                assignment & 1,
            ];
            let inputs = BTreeMap::from([(0, bits[0]), (1, bits[1]), (2, bits[2])]);
            let outputs = circuit.eval_clear(&inputs).unwrap();
            let total = bits[0] + bits[1] + bits[2];
            assert_eq!(outputs["001"], total & 1, "sum for {bits:?}");
            assert_eq!(outputs["100"], u8::from(total >= 2), "carry for {bits:?}");
        }
    }

    #[test]
    fn test_comparator_clear_eval() {
        let circuit = Circuit::comparator2(&GcParams::default(), BTreeMap::new()).unwrap();
        for assignment in 0..16u8 {
            let bits: Vec<u8> = (0..4).map(|i| (assignment >> (3 - i)) & 1).collect();
            let inputs: BTreeMap<WireId, u8> =
                bits.iter().enumerate().map(|(i, &b)| (i, b)).collect();
            let outputs = circuit.eval_clear(&inputs).unwrap();
            let generator_value = bits[0] * 2 + bits[2];
            let evaluator_value = bits[1] * 2 + bits[3];
            assert_eq!(
                outputs["110"],
                u8::from(generator_value > evaluator_value),
                "comparator for {bits:?}"
            );
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let params = GcParams::default();
        let wires: Vec<Wire> = (0..4).map(|_| Wire::random(params.label_bits)).collect();
        let gates = vec![
            Gate::garble("0", GateFn::Not, vec![0], 2, false, &wires, &params).unwrap(),
            Gate::garble("0", GateFn::Not, vec![1], 3, true, &wires, &params).unwrap(),
        ];
        assert!(Circuit::new(wires, gates, BTreeMap::new()).is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_order_output() {
        let params = GcParams::default();
        let wires: Vec<Wire> = (0..4).map(|_| Wire::random(params.label_bits)).collect();
        // single gate must write wire 3 (= 3 inputs + 0), not wire 2
        let gates =
            vec![Gate::garble("0", GateFn::Not, vec![0], 2, true, &wires, &params).unwrap()];
        assert!(Circuit::new(wires, gates, BTreeMap::new()).is_err());
    }

    #[test]
    fn test_validate_rejects_non_input_assignment() {
        let params = GcParams::default();
        let circuit = Circuit::full_adder(&params, BTreeMap::from([(5, 1)]));
        assert!(circuit.is_err());
    }
}
