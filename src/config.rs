use serde::{Deserialize, Serialize};

use crate::error::WitnessError;

/// 单次见证计算的运行参数
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    /// 是否在工作线程上并行运行可并行的子组件
    pub parallel: bool,
    /// 专用线程池大小，`None` 表示使用全局 rayon 线程池
    pub num_threads: Option<usize>,
    /// 见证中存在未赋值信号时拒绝输出
    pub check_witness: bool,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            num_threads: None,
            check_witness: true,
        }
    }
}

impl ExecConfig {
    /// 完全顺序执行
    pub fn sequential() -> Self {
        Self {
            parallel: false,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, WitnessError> {
        let config: Self = serde_json::from_str(json)?;
        if config.num_threads == Some(0) {
            return Err(WitnessError::ConfigurationError(
                "num_threads must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }
}

/// 编译后电路的尺寸信息
///
/// 同一电路固定不变；上下文在执行前据此分配信号存储和组件描述表。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitSizes {
    /// 第一个主输入信号的索引（信号 0 固定为常量 1，主输出排在输入之前）
    pub main_input_signal_start: usize,
    /// 主组件输入信号个数
    pub main_input_signal_no: usize,
    pub total_signal_no: usize,
    pub number_of_components: usize,
    pub input_hashmap_size: usize,
    pub witness_size: usize,
    pub constants_size: usize,
    pub io_map_size: usize,
}

impl CircuitSizes {
    pub const fn main_input_signal_start(&self) -> usize {
        self.main_input_signal_start
    }

    pub const fn main_input_signal_no(&self) -> usize {
        self.main_input_signal_no
    }

    pub const fn total_signal_no(&self) -> usize {
        self.total_signal_no
    }

    pub const fn number_of_components(&self) -> usize {
        self.number_of_components
    }

    pub const fn size_of_input_hashmap(&self) -> usize {
        self.input_hashmap_size
    }

    pub const fn size_of_witness(&self) -> usize {
        self.witness_size
    }

    pub const fn size_of_constants(&self) -> usize {
        self.constants_size
    }

    pub const fn size_of_io_map(&self) -> usize {
        self.io_map_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_json() {
        let config = ExecConfig::from_json_str(r#"{"parallel": false}"#).unwrap();
        assert!(!config.parallel);
        assert!(config.check_witness);
        assert_eq!(config.num_threads, None);

        assert!(ExecConfig::from_json_str(r#"{"num_threads": 0}"#).is_err());
        assert!(ExecConfig::from_json_str("not json").is_err());
    }
}
