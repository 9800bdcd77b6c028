//! send2jsm - Zabbix Media Script Entry Point

use alert_message::AlertRecord;
use anyhow::Context;
use clap::{CommandFactory, Parser};
use relay_config::{ConfigurationStore, LogLevel, DEFAULT_CONF_PATH, DEFAULT_JEC_CONF_PATH};
use send2jsm::logging::{self, DEFAULT_LOG_PATH};
use send2jsm::{AlertSource, Pipeline, RelayError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "send2jsm", version, about = "Send Zabbix alerts to Jira Service Management")]
struct Args {
    /// Raw alert message made of `key: value` lines
    message: Option<String>,

    #[arg(long = "triggerName")]
    trigger_name: Option<String>,
    #[arg(long = "triggerId")]
    trigger_id: Option<String>,
    #[arg(long = "triggerStatus")]
    trigger_status: Option<String>,
    #[arg(long = "triggerSeverity")]
    trigger_severity: Option<String>,
    #[arg(long = "triggerDescription")]
    trigger_description: Option<String>,
    #[arg(long = "triggerUrl")]
    trigger_url: Option<String>,
    #[arg(long = "triggerValue")]
    trigger_value: Option<String>,
    #[arg(long = "triggerHostGroupName")]
    trigger_host_group_name: Option<String>,
    #[arg(long = "hostName")]
    host_name: Option<String>,
    #[arg(long = "ipAddress")]
    ip_address: Option<String>,
    #[arg(long = "eventId")]
    event_id: Option<String>,
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    time: Option<String>,
    #[arg(long = "itemKey")]
    item_key: Option<String>,
    #[arg(long = "itemValue")]
    item_value: Option<String>,
    #[arg(long = "recoveryEventStatus")]
    recovery_event_status: Option<String>,

    /// Integration `key=value` file
    #[arg(long, default_value = DEFAULT_CONF_PATH)]
    conf: PathBuf,

    /// JEC JSON file
    #[arg(long = "jec-conf", default_value = DEFAULT_JEC_CONF_PATH)]
    jec_conf: PathBuf,

    /// Log file, falls back to /tmp/send2jsm.log when not writable
    #[arg(long = "log-path", default_value = DEFAULT_LOG_PATH)]
    log_path: PathBuf,

    /// Configuration override, applied after both files
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,
}

impl Args {
    /// Alert fields given as flags, under their Zabbix names
    fn flag_fields(&self) -> AlertRecord {
        [
            ("triggerName", &self.trigger_name),
            ("triggerId", &self.trigger_id),
            ("triggerStatus", &self.trigger_status),
            ("triggerSeverity", &self.trigger_severity),
            ("triggerDescription", &self.trigger_description),
            ("triggerUrl", &self.trigger_url),
            ("triggerValue", &self.trigger_value),
            ("triggerHostGroupName", &self.trigger_host_group_name),
            ("hostName", &self.host_name),
            ("ipAddress", &self.ip_address),
            ("eventId", &self.event_id),
            ("date", &self.date),
            ("time", &self.time),
            ("itemKey", &self.item_key),
            ("itemValue", &self.item_value),
            ("recoveryEventStatus", &self.recovery_event_status),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|value| (key, value)))
        .collect()
    }

    fn source(&self) -> Option<AlertSource> {
        if let Some(message) = &self.message {
            return Some(AlertSource::Message(message.clone()));
        }
        let fields = self.flag_fields();
        (!fields.is_empty()).then_some(AlertSource::Fields(fields))
    }
}

/// Log a fatal failure before it leaves `run`
fn fatal(e: impl Into<anyhow::Error>) -> anyhow::Error {
    let e = e.into();
    error!("{:#}", e);
    e
}

async fn run(args: Args, source: AlertSource) -> anyhow::Result<()> {
    let store = ConfigurationStore::new(&args.conf, &args.jec_conf);
    let loaded = tracing::dispatcher::with_default(&logging::bootstrap_dispatch(), || {
        store.load_with_overrides(&args.overrides)
    });

    // Configuration failures still reach the file, at the default level
    let level = loaded
        .as_ref()
        .map(|settings| settings.log_level)
        .unwrap_or(LogLevel::Warning);
    let log = logging::init_logging(level, &args.log_path);
    tracing::dispatcher::set_global_default(log.dispatch)
        .context("Failed to set tracing subscriber")?;

    let settings = loaded.map_err(|e| fatal(RelayError::from(e)))?;

    info!("=== send2jsm v{} ===", env!("CARGO_PKG_VERSION"));

    let pipeline = Pipeline::new(settings).map_err(fatal)?;
    let delivery = pipeline.run(source).await.map_err(fatal)?;
    info!("Alert delivered on attempt {}", delivery.attempts);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let Some(source) = args.source() else {
        Args::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "an alert MESSAGE or at least one alert field flag is required",
            )
            .exit();
    };

    match run(args, source).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
