pub mod example;
pub mod multiplier;

use p3_field::Field;

use crate::{
    config::CircuitSizes,
    core::{IoSignal, TemplateDef},
};

/// 编译后的电路：除输入以外引擎所需的全部数据
///
/// 模板 id 即 `templates` 的下标；组件 id 与信号偏移由编译器按先序分配，
/// 每个实例为整棵子树预留连续区间。
#[derive(Clone, Debug)]
pub struct Circuit<F> {
    pub name: String,
    pub sizes: CircuitSizes,
    pub templates: Vec<TemplateDef<F>>,
    pub main_template: usize,
    pub constants: Vec<F>,
    /// 模板 `log` 语句输出的消息，按下标索引
    pub messages: Vec<String>,
    /// 主输入，从 `sizes.main_input_signal_start` 开始
    pub inputs: Vec<IoSignal>,
    /// 主输出，从信号 1 排到第一个输入之前
    pub outputs: Vec<IoSignal>,
}

impl<F> Circuit<F> {
    pub fn sizes(&self) -> CircuitSizes {
        self.sizes
    }
}

/// [`by_name`] 可用的电路名
pub const BUNDLED: &[&str] = &[example::NAME, multiplier::NAME];

/// 按名称查找内置电路
pub fn by_name<F: Field>(name: &str) -> Option<Circuit<F>> {
    match name {
        example::NAME => Some(example::circuit()),
        multiplier::NAME => Some(multiplier::circuit()),
        _ => None,
    }
}
