use std::{fs, path::PathBuf, process::ExitCode};

use calcwit_rs::{
    Context, ExecConfig, WitnessError, circuits, engine::run, hash::sha256, io,
};
use clap::Parser;
use p3_goldilocks::Goldilocks;
use tracing_forest::ForestLayer;
use tracing_forest::util::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

type F = Goldilocks;

/// 计算内置电路的见证（Goldilocks 域）
#[derive(Debug, Parser)]
#[command(name = "demo", about = "Compute a witness for a bundled circuit")]
struct Args {
    /// 电路名（`example` 或 `multiplier`）
    #[arg(long, default_value = "multiplier")]
    circuit: String,

    /// 输入 JSON，省略时使用内置示例输入
    #[arg(long)]
    input: Option<PathBuf>,

    /// 运行配置 JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// 见证输出路径，`.json` 写 JSON，其余写 `.wtns`
    #[arg(long)]
    output: Option<PathBuf>,

    /// 期望的见证 SHA-256（十六进制），不一致时失败
    #[arg(long = "expect-sha256")]
    expect_sha256: Option<String>,

    /// 所有子组件都在当前线程运行
    #[arg(long)]
    sequential: bool,
}

fn init_logger() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    Registry::default()
        .with(env_filter)
        .with(ForestLayer::default())
        .init();
}

fn sample_inputs(circuit: &str) -> &'static str {
    match circuit {
        "example" => r#"{"sig1": "3", "sig2": "4", "sig2_check": "5"}"#,
        _ => r#"{"in": [1, 2, 3, 4, 5, 6, 7, 8]}"#,
    }
}

fn execute(args: &Args) -> Result<(Vec<F>, Vec<F>), WitnessError> {
    let circuit = circuits::by_name::<F>(&args.circuit).ok_or_else(|| {
        WitnessError::ConfigurationError(format!(
            "unknown circuit {} (available: {})",
            args.circuit,
            circuits::BUNDLED.join(", ")
        ))
    })?;

    let mut config = match &args.config {
        Some(path) => ExecConfig::from_json_str(&fs::read_to_string(path)?)?,
        None => ExecConfig::default(),
    };
    if args.sequential {
        config.parallel = false;
    }

    let mut ctx = Context::new(&circuit, config)?;
    match &args.input {
        Some(path) => io::input::load_inputs_file(&mut ctx, path)?,
        None => io::input::load_inputs(&mut ctx, sample_inputs(&args.circuit))?,
    }
    run(&mut ctx)?;
    Ok((ctx.witness()?, ctx.outputs()?))
}

fn check_digest(witness: &[F], expected: &str) -> Result<bool, WitnessError> {
    let bytes = hex::decode(expected)
        .map_err(|e| WitnessError::ConfigurationError(format!("expect-sha256: {e}")))?;
    let digest: [u8; 32] = bytes.try_into().map_err(|_| {
        WitnessError::ConfigurationError("expect-sha256 must be 32 bytes".to_string())
    })?;
    Ok(sha256::verify(witness, &digest))
}

fn main() -> ExitCode {
    init_logger();
    let args = Args::parse();

    println!("🚀 见证计算演示: {}", args.circuit);
    println!("============================");
    let (witness, outputs) = match execute(&args) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("❌ 计算失败: {err}");
            return ExitCode::FAILURE;
        }
    };
    let rendered: Vec<String> = outputs.iter().map(ToString::to_string).collect();
    println!("  - 见证长度: {}", witness.len());
    println!("  - 主输出: [{}]", rendered.join(", "));
    println!("  - SHA-256: {}", sha256::witness_digest_hex(&witness));

    if let Some(expected) = &args.expect_sha256 {
        match check_digest(&witness, expected) {
            Ok(true) => println!("  - 摘要校验: ✅ 通过"),
            Ok(false) => {
                eprintln!("❌ 摘要校验失败");
                return ExitCode::FAILURE;
            }
            Err(err) => {
                eprintln!("❌ {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(path) = &args.output {
        if let Err(err) = io::write_witness_file(path, &witness) {
            eprintln!("❌ {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
        println!("  - 已写入 {}", path.display());
    }
    println!("✅ 完成");
    ExitCode::SUCCESS
}
