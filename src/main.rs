// ==========================================
// 补贴预算分配引擎 - 命令行入口
// ==========================================
// 子命令:
// - run: 加载数据源并执行分配（--json-out 时 stdout 只输出 JSON 报告）
//   不带子命令时等同 run，顶层接受 run 的全部参数
// - sensitivity: alpha 敏感性扫描
// - invoke: 调用外部引擎进程
// - config: 配置查询 / 覆写
// ==========================================

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use subsidy_alloc::config::{config_keys, get_default_db_path};
use subsidy_alloc::domain::{AllocationCaps, AllocationConfig, DistributionMode};
use subsidy_alloc::engine::DEFAULT_SENSITIVITY_ALPHAS;
use subsidy_alloc::importer::{resolve_data_dir, FeedPaths, LoadedFeed};
use subsidy_alloc::{
    logging, AllocationConfigReader, ConfigManager, FeedLoader, InProcessTransport,
    ProcessTransport, SensitivityAnalyzer, SimulationApi, TextReportRenderer,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "subsidy-alloc",
    about = "Budget-constrained subsidy allocation engine",
    version
)]
struct Cli {
    /// SQLite database holding configuration overrides
    #[arg(long, global = true)]
    db_path: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,

    // 不带子命令时的 run 参数: subsidy-alloc --budget X --alpha Y --json-out
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load feeds and run the allocation (default command)
    Run(RunArgs),
    /// Sweep alpha at a fixed budget and print the selection shift
    Sensitivity(SensitivityArgs),
    /// Run the allocation through an external engine process
    Invoke(InvokeArgs),
    /// Inspect or override configuration values
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Args, Debug)]
struct FeedArgs {
    /// Directory containing the feed files
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Eligibility feed (defaults to <data-dir>/scheme_eligibility_results.csv)
    #[arg(long)]
    eligibility: Option<PathBuf>,
    /// Scheme metadata feed
    #[arg(long)]
    schemes: Option<PathBuf>,
    /// Entity metadata feed
    #[arg(long)]
    entities: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    feeds: FeedArgs,
    /// Total budget
    #[arg(long)]
    budget: Option<f64>,
    /// Revenue weight in [0, 1]; employment weight is 1 - alpha
    #[arg(long, allow_negative_numbers = true)]
    alpha: Option<f64>,
    /// Split the budget into per-category sub-budgets
    #[arg(long)]
    category_budgets: bool,
    /// Maximum length of the selected list
    #[arg(long)]
    max_selected: Option<usize>,
    /// Maximum length of the rejected list
    #[arg(long)]
    max_rejected: Option<usize>,
    /// Print the report as a single JSON document on stdout
    #[arg(long)]
    json_out: bool,
    /// Also write the text report to this file
    #[arg(long)]
    report_out: Option<PathBuf>,
    /// Skip the sensitivity section of the text report
    #[arg(long)]
    no_sensitivity: bool,
}

#[derive(Args, Debug)]
struct SensitivityArgs {
    #[command(flatten)]
    feeds: FeedArgs,
    /// Total budget
    #[arg(long)]
    budget: Option<f64>,
    /// Alpha values to evaluate
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SENSITIVITY_ALPHAS.to_vec())]
    alphas: Vec<f64>,
    /// Print rows as JSON
    #[arg(long)]
    json_out: bool,
}

#[derive(Args, Debug)]
struct InvokeArgs {
    /// Total budget
    #[arg(long)]
    budget: Option<f64>,
    /// Revenue weight in [0, 1]
    #[arg(long, allow_negative_numbers = true)]
    alpha: Option<f64>,
    /// Engine program (overrides engine/program)
    #[arg(long)]
    program: Option<String>,
    /// Arguments placed before the protocol flags (overrides engine/args)
    #[arg(long = "engine-arg")]
    engine_args: Vec<String>,
    /// Timeout in seconds (overrides engine/timeout_secs)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print one value (or its default marker)
    Get { key: String },
    /// Override a value
    Set { key: String, value: String },
    /// Remove an override
    Unset { key: String },
    /// Print all overrides as JSON
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run(cli.run));

    // JSON 模式下日志写 stderr
    let json_mode = matches!(
        &command,
        Command::Run(RunArgs { json_out: true, .. })
            | Command::Sensitivity(SensitivityArgs { json_out: true, .. })
            | Command::Invoke(_)
    );
    if json_mode {
        logging::init_stderr();
    } else {
        logging::init();
    }

    let db_path = cli.db_path.unwrap_or_else(get_default_db_path);
    let config = Arc::new(
        ConfigManager::new(&db_path).with_context(|| format!("无法打开配置数据库: {}", db_path))?,
    );
    info!(app = subsidy_alloc::APP_NAME, version = subsidy_alloc::VERSION, db_path = %db_path, "配置已加载");

    match command {
        Command::Run(args) => run(config, args).await,
        Command::Sensitivity(args) => sensitivity(config, args).await,
        Command::Invoke(args) => invoke(config, args).await,
        Command::Config { command } => manage_config(&config, command),
    }
}

async fn load_feed(config: &ConfigManager, args: &FeedArgs) -> anyhow::Result<LoadedFeed> {
    let data_dir = match &args.data_dir {
        Some(dir) => dir.clone(),
        None => {
            let cwd = std::env::current_dir().context("无法读取当前工作目录")?;
            resolve_data_dir(&config.get_data_dir().await?, &cwd)
        }
    };
    let mut paths = FeedPaths::in_data_dir(&data_dir);
    if let Some(path) = &args.eligibility {
        paths.eligibility = path.clone();
    }
    if args.schemes.is_some() {
        paths.schemes = args.schemes.clone();
    }
    if args.entities.is_some() {
        paths.entities = args.entities.clone();
    }

    if !paths.eligibility.exists() {
        bail!(
            "资格记录文件不存在: {}（请先生成资格数据）",
            paths.eligibility.display()
        );
    }
    Ok(FeedLoader::new().load(&paths)?)
}

async fn run(config: Arc<ConfigManager>, args: RunArgs) -> anyhow::Result<()> {
    let feed = load_feed(&config, &args.feeds).await?;

    let defaults = config.get_caps().await?;
    let caps = AllocationCaps {
        max_selected: args.max_selected.unwrap_or(defaults.max_selected),
        max_rejected: args.max_rejected.unwrap_or(defaults.max_rejected),
    };
    let mode = if args.category_budgets {
        DistributionMode::CategorySubBudgets
    } else {
        DistributionMode::GlobalGreedy
    };
    let template = AllocationConfig::default()
        .with_caps(caps)
        .with_mode(mode)
        .with_category_shares(config.get_category_shares().await?);

    let records = Arc::new(feed.records);
    let transport = InProcessTransport::with_shared(Arc::clone(&records), template);
    let reader: Arc<dyn AllocationConfigReader> = config.clone();
    let api = SimulationApi::new(reader, Arc::new(transport));
    let outcome = api.simulate(args.budget, args.alpha).await?;

    if args.json_out {
        println!("{}", serde_json::to_string(&outcome.report)?);
        return Ok(());
    }

    let sensitivity = if args.no_sensitivity {
        Vec::new()
    } else {
        SensitivityAnalyzer::new().analyze(
            &records,
            outcome.request.budget,
            &DEFAULT_SENSITIVITY_ALPHAS,
            caps,
        )
    };
    let text = TextReportRenderer::new().render(&outcome.report, &records, &sensitivity);
    println!("{}", text);

    if let Some(path) = args.report_out {
        std::fs::write(&path, &text)
            .with_context(|| format!("无法写入报告: {}", path.display()))?;
        info!(path = %path.display(), "评估报告已保存");
    }
    Ok(())
}

async fn sensitivity(config: Arc<ConfigManager>, args: SensitivityArgs) -> anyhow::Result<()> {
    let feed = load_feed(&config, &args.feeds).await?;
    let budget = match args.budget {
        Some(v) => v,
        None => config.get_default_budget().await?,
    };
    let caps = config.get_caps().await?;

    let rows = SensitivityAnalyzer::new().analyze(&feed.records, budget, &args.alphas, caps);
    if args.json_out {
        println!("{}", serde_json::to_string(&rows)?);
    } else {
        println!("{}", TextReportRenderer::new().render_sensitivity(&rows));
    }
    Ok(())
}

async fn invoke(config: Arc<ConfigManager>, args: InvokeArgs) -> anyhow::Result<()> {
    let reader: Arc<dyn AllocationConfigReader> = config.clone();

    let api = match args.program {
        Some(program) => {
            let engine_args = if args.engine_args.is_empty() {
                config.get_engine_args().await?
            } else {
                args.engine_args
            };
            let timeout = match args.timeout_secs {
                Some(secs) => Duration::from_secs(secs.max(1)),
                None => config.get_engine_timeout().await?,
            };
            let transport = ProcessTransport::new(program)
                .with_args(engine_args)
                .with_timeout(timeout)
                .with_working_dir(config.get_data_dir().await?);
            info!(
                program = transport.program(),
                timeout_secs = transport.timeout().as_secs(),
                "使用命令行指定的外部引擎"
            );
            SimulationApi::new(reader, Arc::new(transport))
        }
        None => SimulationApi::external(reader).await?,
    };

    let outcome = api.simulate(args.budget, args.alpha).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn manage_config(config: &ConfigManager, command: ConfigCommand) -> anyhow::Result<()> {
    match command {
        ConfigCommand::Get { key } => match config.get_global_config_value(&key)? {
            Some(value) => println!("{}", value),
            None => println!("(default)"),
        },
        ConfigCommand::Set { key, value } => {
            if !config_keys::ALL.contains(&key.as_str()) {
                bail!("未知配置键: {}（可用: {}）", key, config_keys::ALL.join(", "));
            }
            config.set_global_config_value(&key, &value)?;
            info!(key = %key, value = %value, "配置已更新");
        }
        ConfigCommand::Unset { key } => {
            if config.remove_global_config_value(&key)? {
                info!(key = %key, "配置已恢复默认值");
            }
        }
        ConfigCommand::List => println!("{}", config.get_config_snapshot()?),
    }
    Ok(())
}
