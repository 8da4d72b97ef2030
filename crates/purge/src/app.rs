use clap::{Arg, ArgAction, Command, value_parser};

pub fn build_cli() -> Command {
    Command::new("purge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Delete a Cloudflare worker together with the resources it owns")
        .long_about("purge scans every worker in the account to find out which KV namespaces, R2 buckets and D1 databases the target worker shares with others, shows a risk level for each, and deletes the worker script before its resources. Shared resources are only deleted with --force.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("plan")
                .about("Show what deleting a worker would remove, without changing anything")
                .args(analysis_args())
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a worker and the resources it owns")
                .args(analysis_args())
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .help("Report what would be deleted without deleting anything")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .short('y')
                        .help("Confirm deletion of the worker and its exclusive resources; shared resources are skipped (use --force to delete them)")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .short('f')
                        .help("Confirm deletion and also delete resources shared with other workers")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("worker-only")
                        .long("worker-only")
                        .help("Delete only the worker script and leave every resource in place")
                        .action(ArgAction::SetTrue)
                        .conflicts_with_all(["exclusive-only", "skip-dependency-check"])
                )
        )
}

fn analysis_args() -> Vec<Arg> {
    vec![
        Arg::new("worker")
            .help("Name of the worker script")
            .required(true)
            .index(1),
        Arg::new("account-id")
            .long("account-id")
            .help("Cloudflare account id (overrides config and CLOUDFLARE_ACCOUNT_ID)"),
        Arg::new("exclusive-only")
            .long("exclusive-only")
            .help("Only consider resources no other worker references")
            .action(ArgAction::SetTrue),
        Arg::new("skip-dependency-check")
            .long("skip-dependency-check")
            .help("Do not scan other workers; every resource is treated as exclusive")
            .action(ArgAction::SetTrue),
        Arg::new("concurrency")
            .long("concurrency")
            .short('c')
            .help("Parallel worker fetches during the account scan (overrides config)")
            .value_parser(value_parser!(u16).range(1..)),
        Arg::new("json")
            .long("json")
            .help("Output in JSON format")
            .action(ArgAction::SetTrue),
    ]
}
