//! BOSH Ansible Inventory - Entry Point
//!
//! Reads the director target and credentials from the BOSH CLI config file
//! named by `BOSH_CONFIG` and prints an Ansible inventory on stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

use bosh_inventory::app::options::{AppOptions, OutputFormat};
use bosh_inventory::app::run::run;
use bosh_inventory::http::tasks::PollOptions;
use bosh_inventory::inventory::builder::HostOptions;
use bosh_inventory::logs::{init_logging, LogLevel, LogOptions};
use bosh_inventory::models::task::Enumeration;
use bosh_inventory::utils::{parse_key_values, split_words, version_info};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "bosh-inventory")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Ansible dynamic inventory for BOSH deployments", long_about = None)]
struct Args {
    /// Print the JSON dynamic inventory instead of INI
    #[arg(long, conflicts_with = "host")]
    list: bool,

    /// Print the variables of one host as JSON
    #[arg(long, value_name = "HOSTNAME")]
    host: Option<String>,

    /// BOSH CLI config file with the target and its credentials
    #[arg(long, env = "BOSH_CONFIG")]
    config: PathBuf,

    /// Space separated key=value variables added to every host
    #[arg(long, env = "BOSH_ANSIBLE_INVENTORY_PARAMS")]
    params: Option<String>,

    /// Space separated instance fields copied into the host variables
    #[arg(long, env = "BOSH_ANSIBLE_INVENTORY_VARS")]
    vars: Option<String>,

    /// Only inventory this deployment
    #[arg(long, env = "BOSH_ANSIBLE_DEPLOYMENT")]
    deployment: Option<String>,

    /// 1-based index of the IP exported as ansible_host, 0 disables
    #[arg(long, env = "BOSH_ANSIBLE_INVENTORY_IP", default_value_t = 0)]
    ip: usize,

    /// Instance field used as host name
    #[arg(long, env = "BOSH_ANSIBLE_INVENTORY_HOST_ATTR", default_value = "dns")]
    host_attr: String,

    /// Director listing used to resolve instances
    #[arg(
        long,
        env = "BOSH_ANSIBLE_INVENTORY_CALL",
        value_enum,
        default_value_t = Enumeration::Instances
    )]
    call: Enumeration,

    /// Keep instances whose VM is not provisioned yet
    #[arg(long, env = "BOSH_ANSIBLE_INVENTORY_INCLUDE_UNPROVISIONED")]
    include_unprovisioned: bool,

    /// Seconds to wait for each director task
    #[arg(long, env = "BOSH_ANSIBLE_INVENTORY_TIMEOUT", default_value_t = 60)]
    timeout: u32,

    /// Deployments resolved at the same time
    #[arg(long, env = "BOSH_ANSIBLE_INVENTORY_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// PEM file with a client certificate and private key
    #[arg(long, env = "BOSH_CLIENT_CERT")]
    client_cert: Option<PathBuf>,

    /// Log level written to stderr
    #[arg(long, env = "BOSH_INVENTORY_LOG", default_value = "warn")]
    log_level: LogLevel,

    /// Write logs as JSON
    #[arg(long, env = "BOSH_INVENTORY_LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn into_options(self) -> Result<AppOptions, String> {
        let literals = parse_key_values(&split_words(self.params.as_deref()))
            .map_err(|e| format!("BOSH_ANSIBLE_INVENTORY_PARAMS: {}", e))?;

        let format = match (self.list, self.host) {
            (_, Some(host)) => OutputFormat::Host(host),
            (true, None) => OutputFormat::Json,
            (false, None) => OutputFormat::Ini,
        };

        Ok(AppOptions {
            config_path: self.config,
            client_cert_path: self.client_cert,
            target_deployment: self.deployment,
            enumeration: self.call,
            poll: PollOptions {
                timeout_ticks: self.timeout,
                ..Default::default()
            },
            hosts: HostOptions {
                host_attribute: self.host_attr,
                ip_index: self.ip,
                pass_through: split_words(self.vars.as_deref()),
                literals,
                include_unprovisioned: self.include_unprovisioned,
            },
            concurrency: self.concurrency,
            format,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let log_options = LogOptions {
        log_level: args.log_level,
        json_format: args.log_json,
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }
    debug!("bosh-inventory {}", version_info());

    let options = match args.into_options() {
        Ok(options) => options,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::from(1);
        }
    };

    match run(&options).await {
        Ok(output) => {
            println!("{}", output.trim_end_matches('\n'));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
