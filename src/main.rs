use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;
use vulnprobe::{validate_target, ScanConfig, ScanResult, Scanner, Severity};

#[derive(Parser)]
#[command(name = "vulnprobe")]
#[command(version)]
#[command(about = "SQL injection and reflected XSS probe for a single URL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every query parameter of a URL for SQL injection and reflected XSS
    #[command(arg_required_else_help = true)]
    Scan {
        /// Target URL (http:// or https://) including its query string
        #[arg(short, long)]
        target: String,

        /// Per-probe timeout in seconds
        #[arg(short = 'o', long, default_value = "10")]
        timeout: u64,

        /// Maximum concurrent probe workers (1 = sequential)
        #[arg(short, long, default_value = "5")]
        concurrency: usize,

        /// Payloads tried per parameter in the POST pass
        #[arg(long, default_value = "5")]
        post_budget: usize,

        /// Abort the scan after this many seconds and report partial results
        #[arg(long)]
        scan_timeout: Option<u64>,

        /// YAML file overriding sqli_payloads, xss_payloads or sql_error_signatures
        #[arg(short, long)]
        payload_file: Option<PathBuf>,

        /// Custom User-Agent
        #[arg(long)]
        user_agent: Option<String>,

        /// Skip SQL injection probes
        #[arg(long)]
        no_sqli: bool,

        /// Skip reflected XSS probes
        #[arg(long)]
        no_xss: bool,

        /// Output format
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        output: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                eprintln!("\nReceived shutdown signal, stopping scan...");
                let _ = shutdown_tx.send(());
            }
            Err(e) => {
                eprintln!("Error setting up signal handler: {}", e);
            }
        }
    });

    let cli = Cli::parse();

    let code = tokio::select! {
        code = run_command(cli) => code,
        _ = &mut shutdown_rx => {
            eprintln!("Scan interrupted by user");
            130
        }
    };

    std::process::exit(code);
}

async fn run_command(cli: Cli) -> i32 {
    match cli.command {
        Commands::Scan {
            target,
            timeout,
            concurrency,
            post_budget,
            scan_timeout,
            payload_file,
            user_agent,
            no_sqli,
            no_xss,
            output,
        } => {
            let defaults = ScanConfig::default();
            let config = ScanConfig {
                timeout_secs: timeout,
                user_agent: user_agent.unwrap_or(defaults.user_agent),
                max_concurrency: concurrency,
                post_payload_budget: post_budget,
                scan_timeout_secs: scan_timeout,
                test_sqli: !no_sqli,
                test_xss: !no_xss,
                payload_file,
            };

            handle_scan(target, config, output).await
        }
    }
}

async fn handle_scan(target: String, config: ScanConfig, output: String) -> i32 {
    let target = match validate_target(&target) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let scanner = match Scanner::new(config) {
        Ok(scanner) => scanner,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let _ = write_banner(&mut std::io::stderr(), &target);

    let results = scanner.scan(target.as_str()).await;

    match output.as_str() {
        "json" => match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: failed to serialize results: {}", e);
                return 1;
            }
        },
        _ => print_results(&results),
    }

    0
}

fn write_banner(out: &mut impl Write, target: &Url) -> std::io::Result<()> {
    writeln!(out, "⚠️  WARNING: Use only on systems you own or have permission to test")?;
    writeln!(out, "Probing {}\n", target)
}

fn print_results(results: &ScanResult) {
    println!("\n{}", "=".repeat(60));
    println!("SCAN RESULTS SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Target: {}", results.target);
    println!("Scan duration: {} to {}", results.scan_start, results.scan_end);
    println!(
        "Parameters tested: {}  Probes sent: {}",
        results.parameters_tested, results.probes_sent
    );
    if results.timed_out {
        println!("⚠ Scan deadline reached, results are partial");
    }

    if results.vulnerabilities.is_empty() {
        println!("\n✓ No vulnerabilities detected!");
        if results.parameters_tested == 0 {
            println!("The target URL has no query parameters to test.");
        }
        println!("{}", "=".repeat(60));
        return;
    }

    println!("\n⚠ Total Vulnerabilities Found: {}", results.total);
    println!("\nSeverity Breakdown:");
    println!("  {}:   {}", Severity::High, results.summary.high);
    println!("  {}: {}", Severity::Medium, results.summary.medium);
    println!("  {}:    {}", Severity::Low, results.summary.low);

    println!("\nVulnerability Details:");
    println!("{}", "-".repeat(60));

    for (i, vuln) in results.vulnerabilities.iter().enumerate() {
        println!("\n[{}] {}", i + 1, vuln.vulnerability_type);
        println!("    Severity: {}", vuln.severity);
        println!("    Parameter: {} ({})", vuln.parameter, vuln.method);
        println!("    Payload: {}", vuln.payload);
        println!("    Test URL: {}", vuln.url);
        if let Some(body) = &vuln.body {
            println!("    Body: {}", body);
        }
        println!("    Status: {}", vuln.status_code);
        println!("    Evidence: {}", vuln.evidence);
    }

    println!("\n{}", "=".repeat(60));
}
