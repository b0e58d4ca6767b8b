//! `sshscan` - list the key exchange algorithms an SSH server offers.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use sshscan_platform::{Scanner, SecurityModule, SshScanError};
use sshscan_proto::ssh::{render_json, render_text, ReadMode, ScanConfig, SshScanner};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sshscan",
    version,
    about = "Audit key exchange algorithms and settings on an SSH server"
)]
struct Cli {
    /// Host name or IP address to scan
    host: String,
    /// Port the SSH server listens on
    #[arg(short, long, default_value = "22")]
    port: String,
    /// Print the result as JSON instead of text
    #[arg(short, long, default_value_t = false)]
    json: bool,
    /// Seconds to wait for the TCP connection
    #[arg(long, default_value_t = 5)]
    connect_timeout: u64,
    /// Seconds allowed for the banner exchange and KEXINIT read together
    #[arg(long, default_value_t = 10)]
    io_timeout: u64,
    /// Keep reading until the banner line and the whole packet have arrived
    #[arg(long, default_value_t = false)]
    complete_reads: bool,
}

impl Cli {
    fn scan_config(&self) -> Result<ScanConfig, SshScanError> {
        let read_mode = if self.complete_reads {
            ReadMode::Complete
        } else {
            ReadMode::Single
        };
        let config = ScanConfig::default()
            .with_connect_timeout(Duration::from_secs(self.connect_timeout))
            .with_io_timeout(Duration::from_secs(self.io_timeout))
            .with_read_mode(read_mode);
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match cli.scan_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("sshscan: {}", err);
            return ExitCode::from(2);
        }
    };

    let scanner = SshScanner::new(config);
    if !cli.json {
        println!("Starting SSHScan {}", scanner.version());
        println!();
    }

    tracing::debug!(host = %cli.host, port = %cli.port, "scanning");
    let result = scanner.scan(&cli.host, &cli.port).await;

    if cli.json {
        match render_json(&result) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("sshscan: cannot encode result: {}", err);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", render_text(&result));
    }

    if result.is_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
