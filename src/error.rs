use thiserror::Error;

/// [`WitnessError`] 的错误类别
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// 编译器与运行时约定不一致：越界索引、区间重叠、尺寸不符
    ContractViolation,
    /// 电路断言不成立
    AssertionFailure,
    /// 输入缺失或格式错误
    UnresolvedInput,
    /// 读写见证或输入文件
    Io,
}

/// 见证计算过程中的错误类型
///
/// 引擎内部不做恢复：第一个错误即终止运行，此后上下文不再给出见证。
#[derive(Error, Debug)]
pub enum WitnessError {
    /// 断言失败，附带从根组件开始的组件路径
    #[error(
        "Failed assert in template/function {template} line {line}. Followed trace of components: {trace}"
    )]
    AssertionFailed {
        template: String,
        line: usize,
        component: usize,
        trace: String,
    },

    /// 模板内除以零
    #[error("Division by zero in template {template} line {line}")]
    DivisionByZero { template: String, line: usize },

    #[error("Component offset {offset} out of range (limit {limit})")]
    ComponentOutOfRange { offset: usize, limit: usize },

    #[error("Component slot {offset} is already populated")]
    ComponentSlotOccupied { offset: usize },

    #[error("Component {component} has no descriptor")]
    ComponentNotCreated { component: usize },

    #[error("Unknown template id {template_id}")]
    UnknownTemplate { template_id: usize },

    #[error("Template {template} has no parallel variant")]
    ParallelVariantMissing { template: String },

    /// 访问超出组件信号区间
    #[error("Signal {signal} outside component range [{start}, {end})")]
    SignalOutOfRange {
        signal: usize,
        start: usize,
        end: usize,
    },

    #[error("Signal {signal} read before being set")]
    SignalNotSet { signal: usize },

    #[error("Signal range of component {component} overlaps sibling {sibling}")]
    OverlappingRange { component: usize, sibling: usize },

    #[error("Sub-component slot {slot} out of range for {component} ({count} slots)")]
    SubcomponentSlotOutOfRange {
        component: usize,
        slot: usize,
        count: usize,
    },

    #[error("Sub-component slot {slot} of component {component} was never created")]
    SubcomponentNotCreated { component: usize, slot: usize },

    #[error("Component {component} received more inputs than declared")]
    InputCounterUnderflow { component: usize },

    #[error("Constant {index} out of range ({count} constants)")]
    ConstantOutOfRange { index: usize, count: usize },

    #[error("Template message {index} out of range ({count} messages)")]
    MessageOutOfRange { index: usize, count: usize },

    /// 尺寸查询与模板表或给定数据不一致
    #[error("Size mismatch for {query}: expected {expected}, got {got}")]
    SizeMismatch {
        query: &'static str,
        expected: usize,
        got: usize,
    },

    /// 上下文只能运行一次
    #[error("Context has already been run")]
    AlreadyRun,

    #[error("Context has not been run to completion")]
    NotRun,

    #[error("Missing inputs: {remaining} main input signals were never set")]
    MissingInputs { remaining: usize },

    #[error("Unknown input signal: {0}")]
    UnknownInput(String),

    #[error("Input {name}[{index}] out of range (size {size})")]
    InputIndexOutOfRange {
        name: String,
        index: usize,
        size: usize,
    },

    #[error("Input {name}[{index}] set twice")]
    DuplicateInput { name: String, index: usize },

    #[error("Input hash map is full (capacity {capacity})")]
    InputMapFull { capacity: usize },

    #[error("Invalid field value: {0}")]
    InvalidFieldValue(String),

    /// 见证文件格式错误
    #[error("Invalid witness file: {0}")]
    InvalidWitnessFile(String),

    /// 配置错误
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WitnessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AssertionFailed { .. } | Self::DivisionByZero { .. } => {
                ErrorKind::AssertionFailure
            }
            Self::MissingInputs { .. }
            | Self::UnknownInput(_)
            | Self::InputIndexOutOfRange { .. }
            | Self::DuplicateInput { .. }
            | Self::InvalidFieldValue(_) => ErrorKind::UnresolvedInput,
            Self::InvalidWitnessFile(_)
            | Self::ConfigurationError(_)
            | Self::Io(_)
            | Self::Serialization(_) => ErrorKind::Io,
            _ => ErrorKind::ContractViolation,
        }
    }

    pub fn is_contract_violation(&self) -> bool {
        self.kind() == ErrorKind::ContractViolation
    }
}
