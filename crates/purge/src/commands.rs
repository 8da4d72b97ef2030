use clap::ArgMatches;
use serde::Serialize;
use tracing::{error, info, warn};

use purge_core::catalog::api_token_from_env;
use purge_core::config::PurgeConfig;
use purge_core::events;
use purge_core::index::ProgressFn;
use purge_core::{
    AnalyzeOptions, Analysis, CancelFlag, CatalogError, CloudflareCatalog, DeletionPlan,
    DeletionResult, RiskLevel, RiskSummary, ScanProgress, SkipReason, deletion_ops, plan_ops,
};

#[derive(Serialize)]
struct PlanOutput<'a> {
    plan: &'a DeletionPlan,
    risk_summary: RiskSummary,
    warnings: Vec<String>,
    unscanned_workers: &'a [String],
    dependency_check_skipped: bool,
}

impl<'a> PlanOutput<'a> {
    fn new(analysis: &'a Analysis) -> Self {
        Self {
            plan: &analysis.plan,
            risk_summary: analysis.plan.risk_summary(),
            warnings: analysis.plan.warning_messages(),
            unscanned_workers: &analysis.unscanned_workers,
            dependency_check_skipped: analysis.dependency_check_skipped,
        }
    }
}

#[derive(Serialize)]
struct DeleteOutput<'a> {
    #[serde(flatten)]
    analysis: PlanOutput<'a>,
    dry_run: bool,
    result: &'a DeletionResult,
}

/// Load configuration with warning on errors.
///
/// Falls back to defaults if config loading fails, but notifies the user via:
/// - stderr message for immediate visibility
/// - structured log event `cli.config.load_failed` for debugging
fn load_config_with_warning() -> PurgeConfig {
    match PurgeConfig::load_hierarchy() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Could not load config: {}. Using defaults.\n\
                 Tip: Check ~/.purge/config.toml and ./.purge/config.toml for syntax errors.",
                e
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e
            );
            PurgeConfig::default()
        }
    }
}

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    events::log_app_startup();

    let result = match matches.subcommand() {
        Some(("plan", sub_matches)) => handle_plan_command(sub_matches),
        Some(("delete", sub_matches)) => handle_delete_command(sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    };

    events::log_app_shutdown();
    result
}

fn handle_plan_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let worker = matches
        .get_one::<String>("worker")
        .ok_or("Worker argument is required")?;
    let json = matches.get_flag("json");

    info!(event = "cli.plan_started", worker = worker);

    let mut config = load_config_with_warning();
    apply_cli_overrides(&mut config, matches);

    let catalog = connect_catalog(&config)?;
    let analysis = run_analysis(&catalog, worker, &config, matches, !json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&PlanOutput::new(&analysis))?);
    } else {
        print_plan(&analysis);
        if analysis.plan.has_shared_resources {
            println!();
            println!("Shared resources are skipped unless you pass --force to 'purge delete'.");
        }
    }

    info!(
        event = "cli.plan_completed",
        worker = worker,
        resources = analysis.plan.resources_to_delete.len()
    );
    Ok(())
}

fn handle_delete_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let worker = matches
        .get_one::<String>("worker")
        .ok_or("Worker argument is required")?;
    let json = matches.get_flag("json");
    let dry_run = matches.get_flag("dry-run");
    let force = matches.get_flag("force");
    let confirmed = matches.get_flag("yes") || force;

    info!(
        event = "cli.delete_started",
        worker = worker,
        dry_run = dry_run,
        force = force
    );

    if !dry_run && !confirmed {
        eprintln!("❌ Refusing to delete '{}' without confirmation.", worker);
        eprintln!("   Run 'purge plan {}' to review, then pass --yes.", worker);
        eprintln!("   Use --force to also delete resources shared with other workers.");
        error!(
            event = "cli.delete_blocked",
            worker = worker,
            reason = "not_confirmed"
        );
        return Err("Deletion not confirmed. Pass --yes or --force.".into());
    }

    let mut config = load_config_with_warning();
    apply_cli_overrides(&mut config, matches);
    let catalog = connect_catalog(&config)?;

    if matches.get_flag("worker-only") {
        return delete_worker_script_only(&catalog, worker, dry_run);
    }

    let mut analysis = run_analysis(&catalog, worker, &config, matches, !json)?;
    analysis.plan.delete_shared = force && !analysis.plan.exclusive_only;

    if !json {
        print_plan(&analysis);
        println!();
    }

    let result = deletion_ops::execute_plan(&catalog, &analysis.plan, dry_run, &CancelFlag::new());

    if json {
        let output = DeleteOutput {
            analysis: PlanOutput::new(&analysis),
            dry_run,
            result: &result,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_result(worker, &result, dry_run);
    }

    if result.success {
        info!(
            event = "cli.delete_completed",
            worker = worker,
            deleted = result.resources_deleted.len()
        );
        Ok(())
    } else {
        error!(
            event = "cli.delete_failed",
            worker = worker,
            errors = result.errors.len()
        );
        for e in &result.errors {
            events::log_app_error(e);
        }
        Err(format!(
            "Deletion of '{}' finished with {} error(s)",
            worker,
            result.errors.len()
        )
        .into())
    }
}

fn delete_worker_script_only(
    catalog: &CloudflareCatalog,
    worker: &str,
    dry_run: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match deletion_ops::delete_worker_only(catalog, worker, dry_run) {
        Ok(()) => {
            if dry_run {
                println!("Dry run: worker '{}' would be deleted; resources kept.", worker);
            } else {
                println!("✅ Worker '{}' deleted. Its resources were left in place.", worker);
            }
            info!(event = "cli.delete_worker_only_completed", worker = worker);
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Failed to delete worker '{}': {}", worker, e);
            error!(
                event = "cli.delete_worker_only_failed",
                worker = worker,
                error = %e
            );
            events::log_app_error(&e);
            Err(e.into())
        }
    }
}

/// Apply CLI flags on top of the loaded configuration.
fn apply_cli_overrides(config: &mut PurgeConfig, matches: &ArgMatches) {
    if let Some(account_id) = matches.get_one::<String>("account-id") {
        config.account.id = Some(account_id.clone());
    }
    if let Some(concurrency) = matches.get_one::<u16>("concurrency") {
        config.scan.concurrency = Some(usize::from(*concurrency));
    }
    if matches.get_flag("skip-dependency-check") {
        config.scan.skip_dependency_check = Some(true);
    }
}

fn connect_catalog(config: &PurgeConfig) -> Result<CloudflareCatalog, Box<dyn std::error::Error>> {
    let connect = || -> Result<CloudflareCatalog, CatalogError> {
        let token = api_token_from_env()?;
        CloudflareCatalog::connect(
            config.api.base_url(),
            config.account.id.as_deref(),
            &token,
            config.api.timeout(),
        )
    };

    let catalog = connect().map_err(|e| {
        eprintln!("❌ Could not connect to Cloudflare: {}", e);
        error!(event = "cli.connect_failed", error = %e);
        events::log_app_error(&e);
        e
    })?;

    info!(event = "cli.catalog_connected", account_id = catalog.account_id());
    Ok(catalog)
}

fn run_analysis(
    catalog: &CloudflareCatalog,
    worker: &str,
    config: &PurgeConfig,
    matches: &ArgMatches,
    show_progress: bool,
) -> Result<Analysis, Box<dyn std::error::Error>> {
    let options = AnalyzeOptions {
        exclusive_only: matches.get_flag("exclusive-only"),
        skip_dependency_check: config.scan.skip_dependency_check(),
        concurrency: config.scan.concurrency(),
    };

    let print_progress = |p: &ScanProgress| {
        eprint!("\rScanning workers {}/{}", p.current, p.total);
    };
    let progress: Option<ProgressFn<'_>> = if show_progress && !options.skip_dependency_check {
        Some(&print_progress)
    } else {
        None
    };

    let outcome = plan_ops::analyze_worker(catalog, worker, &options, progress, &CancelFlag::new());
    if progress.is_some() {
        eprintln!();
    }

    outcome.map_err(|e| {
        eprintln!("❌ Failed to analyze worker '{}': {}", worker, e);
        error!(
            event = "cli.analysis_failed",
            worker = worker,
            error = %e
        );
        events::log_app_error(&e);
        e.into()
    })
}

fn risk_marker(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Safe => "  ",
        RiskLevel::Caution => "⚠️",
        RiskLevel::Danger => "🛑",
    }
}

fn print_plan(analysis: &Analysis) {
    let plan = &analysis.plan;
    println!("Deletion plan for worker '{}'", plan.worker.name);

    if plan.resources_to_delete.is_empty() {
        println!("  No resources to delete.");
    } else {
        println!("  Resources ({}):", plan.resources_to_delete.len());
        for resource in &plan.resources_to_delete {
            println!(
                "  {} [{:<7}] {} '{}' ({})",
                risk_marker(resource.risk_level),
                resource.risk_level,
                resource.kind,
                resource.name,
                resource.key
            );
        }
        let summary = plan.risk_summary();
        println!(
            "  Summary: {} safe, {} caution, {} danger",
            summary.safe, summary.caution, summary.danger
        );
    }

    for warning in plan.warning_messages() {
        println!("⚠️  {}", warning);
    }

    if analysis.dependency_check_skipped {
        println!("⚠️  Dependency check skipped: other workers were not scanned.");
    }
    if !analysis.unscanned_workers.is_empty() {
        println!(
            "⚠️  {} worker(s) could not be scanned ({}); resources they share are not flagged above.",
            analysis.unscanned_workers.len(),
            analysis.unscanned_workers.join(", ")
        );
    }
}

fn print_result(worker: &str, result: &DeletionResult, dry_run: bool) {
    let prefix = if dry_run { "Dry run: would delete" } else { "Deleted" };

    if result.worker_deleted {
        println!("{} worker '{}'", prefix, worker);
    }
    for name in &result.resources_deleted {
        println!("{} '{}'", prefix, name);
    }
    for name in result.skipped_for(SkipReason::Shared) {
        println!("Skipped shared resource '{}'", name);
    }
    for name in result.skipped_for(SkipReason::Cancelled) {
        println!("Not attempted '{}'", name);
    }
    for e in &result.errors {
        eprintln!("❌ {}", e);
    }

    if result.success {
        if dry_run {
            println!("✅ Dry run complete. Nothing was deleted.");
        } else {
            println!("✅ Worker '{}' purged successfully!", worker);
        }
    } else {
        eprintln!(
            "❌ Purge of '{}' finished with {} error(s). Re-run to retry failed items.",
            worker,
            result.errors.len()
        );
    }
}
