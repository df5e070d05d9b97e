// ==========================================
// 炉次化学成分录入系统 - 命令行入口
// ==========================================
// 子命令: heats / chemistry / env-ok
// 失败时以 JSON ErrorResponse 输出到 stdout，退出码 1
// ==========================================

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use heat_ledger::api::{ApiError, ErrorResponse};
use heat_ledger::app::{
    table, AppState, ChemistryRecorderView, HeatRegistryView, Notice, SubmitOutcome,
};
use heat_ledger::config::StoreSettings;
use heat_ledger::domain::types::Element;
use heat_ledger::{i18n, logging};

#[derive(Parser)]
#[command(name = "heat-ledger")]
#[command(version, about = "Heat registry and chemistry ledger", long_about = None)]
struct Cli {
    /// SQLite database path (overrides HEAT_LEDGER_STORE_URL)
    #[arg(long, global = true)]
    db: Option<String>,

    /// Notice language (en | zh-CN)
    #[arg(long, global = true)]
    locale: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Heat registry
    #[command(subcommand)]
    Heats(HeatCommands),
    /// Chemistry records
    #[command(subcommand)]
    Chemistry(ChemistryCommands),
    /// Report whether store URL and key are configured
    EnvOk,
}

#[derive(Subcommand)]
enum HeatCommands {
    /// List heats, newest first
    List,
    /// Register a heat
    Add {
        /// Heat code
        heat_code: String,
        /// Supplier (optional)
        #[arg(short, long, default_value = "")]
        supplier: String,
    },
    /// List heat selection options
    Options,
}

#[derive(Subcommand)]
enum ChemistryCommands {
    /// List recent chemistry records, newest first
    List {
        /// Only records for this heat
        #[arg(long)]
        heat: Option<i64>,
        /// Write CSV to stdout
        #[arg(long)]
        csv: bool,
    },
    /// Record chemistry for a heat
    Add {
        /// Heat id
        #[arg(long)]
        heat: Option<i64>,
        /// Element value, e.g. -e mn=1.2 (repeatable)
        #[arg(short = 'e', long = "element", value_parser = parse_element_assignment)]
        elements: Vec<(Element, String)>,
        /// Other elements / notes
        #[arg(long, default_value = "")]
        others: String,
    },
}

/// 解析 "code=value"
fn parse_element_assignment(raw: &str) -> Result<(Element, String), String> {
    let (code, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <element>=<value>, got {:?}", raw))?;
    let element = Element::from_code(code).ok_or_else(|| format!("unknown element {:?}", code))?;
    Ok((element, value.to_string()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }

    if let Some(locale) = cli.locale.as_deref() {
        i18n::set_locale(locale);
    }

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{:#}", err);
            let response = ErrorResponse {
                code: "INTERNAL_ERROR".to_string(),
                message: format!("{:#}", err),
                details: None,
            };
            print_error_response(&response);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut settings = StoreSettings::from_env();

    if let Commands::EnvOk = cli.command {
        println!("{}", settings.readiness().to_json());
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(db) = cli.db {
        settings.store_url = Some(db);
    }

    tracing::info!("{} v{}", heat_ledger::APP_NAME, heat_ledger::VERSION);
    let state = AppState::new(settings)
        .map_err(anyhow::Error::msg)
        .context("初始化应用状态失败")?;

    let mut stdout = io::stdout().lock();
    match cli.command {
        Commands::Heats(HeatCommands::List) => match state.heat_api.list_heats().await {
            Ok(heats) => write!(stdout, "{}", table::render_heats(&heats))?,
            Err(err) => return Ok(report_api_error(&err)),
        },
        Commands::Heats(HeatCommands::Options) => match state.heat_api.list_heat_options().await {
            Ok(options) => write!(stdout, "{}", table::render_heat_options(&options))?,
            Err(err) => return Ok(report_api_error(&err)),
        },
        Commands::Heats(HeatCommands::Add { heat_code, supplier }) => {
            let mut view = HeatRegistryView::new(state.heat_api.clone());
            view.form.heat_code = heat_code;
            view.form.supplier = supplier;

            let outcome = view.submit().await;
            if let Some(notice) = view.notice() {
                eprintln!("{}", notice.render());
            }
            if let Some(err) = outcome.error() {
                return Ok(report_api_error(err));
            }
            match view.list_error() {
                Some(err) => report_list_error(err),
                None => write!(stdout, "{}", table::render_heats(view.heats()))?,
            }
        }
        Commands::Chemistry(ChemistryCommands::List { heat, csv }) => {
            let result = match heat {
                Some(id) => state.chemistry_api.list_chemistry_for_heat(id).await,
                None => state.chemistry_api.list_chemistry().await,
            };
            match result {
                Ok(records) if csv => table::write_chemistry_csv(&records, &mut stdout)
                    .context("CSV 输出失败")?,
                Ok(records) => write!(stdout, "{}", table::render_chemistry(&records))?,
                Err(err) => return Ok(report_api_error(&err)),
            }
        }
        Commands::Chemistry(ChemistryCommands::Add { heat, elements, others }) => {
            let mut view = ChemistryRecorderView::new(state.chemistry_api.clone());
            view.activate().await;
            view.select_heat(heat);
            for (element, raw) in elements {
                view.set_field(element, raw);
            }
            view.set_others(others);

            let outcome = view.submit().await;
            if let Some(notice) = view.notice() {
                eprintln!("{}", notice.render());
            }
            match outcome {
                SubmitOutcome::Saved(_) => match view.list_error() {
                    Some(err) => report_list_error(err),
                    None => write!(stdout, "{}", table::render_chemistry(view.records()))?,
                },
                SubmitOutcome::Rejected(err) | SubmitOutcome::Failed(err) => {
                    return Ok(report_api_error(&err))
                }
                SubmitOutcome::Busy => {}
            }
        }
        Commands::EnvOk => {}
    }

    Ok(ExitCode::SUCCESS)
}

fn report_api_error(err: &ApiError) -> ExitCode {
    print_error_response(&ErrorResponse::from(err));
    ExitCode::FAILURE
}

/// 保存已成功但刷新列表失败: 只在 stderr 提示，退出码仍为成功
fn report_list_error(err: &ApiError) {
    eprintln!("{}", Notice::Error(err.clone()).render());
}

fn print_error_response(response: &ErrorResponse) {
    match serde_json::to_string(response) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("{}: {}", response.message, e),
    }
}
