use academic_period::config::{CliConfig, Command, LogFormat, TomlConfig};
use academic_period::domain::model::{
    ConsistencyReport, DiagnosticReport, InputValidation, PeriodContext, RepairOutcome,
    TransitionOutcome,
};
use academic_period::utils::error::{ErrorSeverity, PeriodError};
use academic_period::utils::{logger, validation::Validate};
use academic_period::{Intent, OutcomeCode, PeriodId, PeriodManager, PeriodStore, Semester, SystemClock};
use clap::Parser;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入配置：有設定檔用設定檔，否則讀環境變數
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration '{}': {}", cli.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    match config.logging.format {
        LogFormat::Json => logger::init_json_logger(config.logging.level.as_deref()),
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
    }

    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let store = match config.open_store().await {
        Ok(store) => store,
        Err(e) => exit_with_error(e),
    };
    let manager = PeriodManager::with_options(
        store,
        Arc::new(SystemClock),
        config.read_repair(),
        config.columns.clone(),
    );

    match run(&cli, &manager).await {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(RunError::Period(e)) => exit_with_error(e),
        Err(RunError::Other(e)) => Err(e),
    }
}

enum RunError {
    Period(PeriodError),
    Other(anyhow::Error),
}

impl From<PeriodError> for RunError {
    fn from(e: PeriodError) -> Self {
        RunError::Period(e)
    }
}

impl From<anyhow::Error> for RunError {
    fn from(e: anyhow::Error) -> Self {
        RunError::Other(e)
    }
}

fn load_config(path: &str) -> academic_period::Result<TomlConfig> {
    if Path::new(path).exists() {
        TomlConfig::from_file(path)
    } else {
        TomlConfig::from_env()
    }
}

fn exit_with_error(e: PeriodError) -> ! {
    tracing::error!(
        "❌ Operation failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

async fn run(
    cli: &CliConfig,
    manager: &PeriodManager<dyn PeriodStore>,
) -> Result<i32, RunError> {
    let json = cli.json;

    match &cli.command {
        Command::Periods => {
            let periods = manager.store().find_all().await?;
            emit(json, &periods, || {
                if periods.is_empty() {
                    println!("No periods configured");
                }
                for period in &periods {
                    println!(
                        "{} {:<24} {} .. {}  [{}]",
                        if period.is_active { "●" } else { " " },
                        period.label(),
                        period.start_date,
                        period.end_date,
                        period.id
                    );
                }
            })?;
            Ok(0)
        }
        Command::Status => {
            let active = manager.resolver().resolve_optional().await?;
            emit(json, &active, || match &active {
                Some(period) => println!(
                    "✅ Active period: {} ({} .. {}) [{}]",
                    period.label(),
                    period.start_date,
                    period.end_date,
                    period.id
                ),
                None => println!("⚠️ No active period"),
            })?;
            Ok(if active.is_some() { 0 } else { 1 })
        }
        Command::Validate => {
            let report = manager.validator().validate().await?;
            emit(json, &report, || print_report(&report))?;
            Ok(if report.is_healthy { 0 } else { 1 })
        }
        Command::Repair => {
            let outcome = manager.repair().repair().await?;
            emit(json, &outcome, || print_repair(&outcome))?;
            Ok(0)
        }
        Command::Diagnose { repair } => {
            let report = manager.diagnose(*repair).await?;
            emit(json, &report, || print_diagnosis(&report))?;
            let healthy = report.after.as_ref().unwrap_or(&report.before).is_healthy;
            Ok(if healthy { 0 } else { 1 })
        }
        Command::Activate { id } => {
            let outcome = manager
                .transitions()
                .set_active_period(&PeriodId::new(id.as_str()))
                .await?;
            emit(json, &outcome, || print_transition(&outcome))?;
            Ok(transition_exit_code(&outcome))
        }
        Command::Transition { year, semester } => {
            let semester = Semester::try_from(*semester).map_err(anyhow::Error::msg)?;
            let outcome = manager
                .transitions()
                .transition_to_new_year(year, semester)
                .await?;
            emit(json, &outcome, || print_transition(&outcome))?;
            Ok(transition_exit_code(&outcome))
        }
        Command::Advance => {
            let outcome = manager.transitions().advance_semester().await?;
            emit(json, &outcome, || print_transition(&outcome))?;
            Ok(transition_exit_code(&outcome))
        }
        Command::Context { input, period } => {
            let intent = if *input {
                Intent::Input
            } else {
                Intent::View {
                    selected: period.as_deref().map(PeriodId::from),
                }
            };
            let context = manager.context().resolve_context(&intent).await?;
            emit(json, &context, || print_context(&context))?;
            Ok(0)
        }
        Command::CheckInput { id } => {
            let validation = manager
                .context()
                .validate_for_input(&PeriodId::new(id.as_str()))
                .await?;
            emit(json, &validation, || print_validation(&validation))?;
            Ok(if validation.valid { 0 } else { 1 })
        }
    }
}

fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce()) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human();
    }
    Ok(())
}

fn transition_exit_code(outcome: &TransitionOutcome) -> i32 {
    match outcome.code {
        None => 0,
        Some(OutcomeCode::TransitionPartialFailure) => 3,
        Some(_) => 1,
    }
}

fn print_report(report: &ConsistencyReport) {
    if report.is_healthy {
        println!("✅ Period configuration is consistent");
    } else {
        println!("❌ Period configuration has critical issues");
    }
    for issue in &report.issues {
        println!("  🚨 {:?}: {}", issue.kind, issue.message);
    }
    for warning in &report.warnings {
        println!("  ⚠️ {:?}: {}", warning.kind, warning.message);
    }
}

fn print_repair(outcome: &RepairOutcome) {
    if outcome.fixes_applied == 0 {
        println!("✅ Nothing to repair");
    } else {
        println!("🔧 Applied {} fix(es)", outcome.fixes_applied);
        for fix in &outcome.fixes {
            println!("  - deactivated {} [{}]", fix.label, fix.period_id);
        }
    }
    if let Some(kept) = &outcome.kept {
        println!("  Active period: {}", kept.label());
    }
}

fn print_diagnosis(report: &DiagnosticReport) {
    println!("📋 Before:");
    print_report(&report.before);
    if let Some(repair) = &report.repair {
        println!();
        print_repair(repair);
    }
    if let Some(after) = &report.after {
        println!();
        println!("📋 After:");
        print_report(after);
    }
}

fn print_transition(outcome: &TransitionOutcome) {
    match outcome.code {
        None => println!("✅ {}", outcome.message),
        Some(OutcomeCode::TransitionPartialFailure) => {
            println!("🚨 {} ({})", outcome.message, OutcomeCode::TransitionPartialFailure)
        }
        Some(code) => println!("❌ {} ({})", outcome.message, code),
    }
    if let Some(previous) = &outcome.previous_active {
        println!("  Previously active: {}", previous.label());
    }
    if let Some(hint) = &outcome.archive_recommendation {
        println!("  📦 {}", hint);
    }
    if let Some(suggestion) = &outcome.suggestion {
        println!("  💡 {}", suggestion);
    }
}

fn print_context(context: &PeriodContext) {
    println!(
        "{} semester {} ({:?})",
        context.year, context.semester_number, context.source
    );
    match &context.period_id {
        Some(id) => println!("  Period id: {}", id),
        None => println!("  Period id: none (calendar estimate, display only)"),
    }
    println!("  View: {}  Input: {}", context.can_view, context.can_input);
}

fn print_validation(validation: &InputValidation) {
    match validation.code {
        None => println!("✅ {}", validation.message),
        Some(code) => println!("❌ {} ({})", validation.message, code),
    }
}
