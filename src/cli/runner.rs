//! CLI runner - executes commands

use crate::cli::commands::{parse_stream_list, Cli, Commands, OutputFormat};
use crate::config::{config_spec, SourceConfig};
use crate::connectors::list_builtin_info;
use crate::engine::{Message, SourceRunner, StreamOutcome};
use crate::error::{Error, Result, ResultExt};
use crate::http::HttpClient;
use crate::loader::{compile, http_client_config, load_connector, select_streams, ConnectorManifest};
use crate::state::StateManager;
use crate::stream::StreamDefinition;
use crate::template::TemplateContext;
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Buffered messages between the readers and stdout
const CHANNEL_CAPACITY: usize = 1024;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check => self.check(),
            Commands::Streams => self.streams(),
            Commands::List => self.list_connectors(),
            Commands::Read { streams } => self.read(&parse_stream_list(streams.as_deref())).await,
        }
    }

    /// Load connector manifest
    fn load_connector(&self) -> Result<ConnectorManifest> {
        load_connector(&self.cli.connector)
    }

    /// Load and validate configuration
    fn load_config(&self) -> Result<SourceConfig> {
        // Inline config takes precedence
        if let Some(json_str) = &self.cli.config_json {
            return SourceConfig::from_json(json_str);
        }

        let path = self.cli.config.as_ref().ok_or_else(|| {
            Error::config("No configuration given (use --config or --config-json)")
        })?;
        let content = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
        SourceConfig::from_json(&content)
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
                .with_context(|| format!("Failed to load state from {}", path.display()))
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Compile the selected streams against the configuration
    fn compile_streams(
        &self,
        manifest: &ConnectorManifest,
        config: &SourceConfig,
        names: &[String],
    ) -> Result<Vec<StreamDefinition>> {
        select_streams(compile(manifest, config)?, names)
    }

    /// Show the configuration surface
    fn spec(&self) -> Result<()> {
        let manifest = self.load_connector()?;
        let properties: Vec<Value> = config_spec()
            .into_iter()
            .map(|p| serde_json::to_value(p).unwrap_or(Value::Null))
            .collect();

        self.output_message(&json!({
            "type": "SPEC",
            "spec": {
                "connector": manifest.name,
                "version": manifest.version,
                "properties": properties
            }
        }));

        Ok(())
    }

    /// Validate configuration and manifest
    fn check(&self) -> Result<()> {
        let manifest = self.load_connector()?;
        let config = self.load_config()?;
        let streams = self.compile_streams(&manifest, &config, &[])?;

        self.output(&Message::info(format!(
            "Connector '{}' v{} is valid with {} streams",
            manifest.name,
            manifest.version,
            streams.len()
        )));

        Ok(())
    }

    /// List stream names
    fn streams(&self) -> Result<()> {
        let manifest = self.load_connector()?;

        self.output_message(&json!({
            "type": "STREAMS",
            "streams": manifest.stream_names(),
            "connector": manifest.name
        }));

        Ok(())
    }

    /// List built-in connectors
    fn list_connectors(&self) -> Result<()> {
        let connectors: Vec<Value> = list_builtin_info()
            .into_iter()
            .map(|info| {
                json!({
                    "name": info.name,
                    "description": info.description,
                    "category": info.category,
                    "streams": info.streams
                })
            })
            .collect();

        self.output_message(&json!({
            "type": "CONNECTORS",
            "connectors": connectors
        }));

        Ok(())
    }

    /// Read streams, printing messages as they arrive
    async fn read(&self, names: &[String]) -> Result<()> {
        let manifest = self.load_connector()?;
        let config = self.load_config()?;
        let streams = self.compile_streams(&manifest, &config, names)?;
        let state = self.load_state()?;
        if !state.is_in_memory() {
            info!(path = %state.path().display(), "Persisting checkpoints to state file");
        }
        let client = HttpClient::with_config(http_client_config(&manifest))?;

        let runner = SourceRunner::new(
            streams,
            client,
            Arc::new(state),
            TemplateContext::with_config(config.to_template_value()),
        );

        let token = runner.cancellation_token();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling streams");
                token.cancel();
            }
        });

        let (tx, mut rx) = mpsc::channel::<Message>(CHANNEL_CAPACITY);
        let format = self.cli.format;
        let printer = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                print_engine_message(format, &message);
            }
        });

        let outcomes = runner.run(tx).await;
        interrupt.abort();
        printer
            .await
            .map_err(|e| Error::output(format!("Output task failed: {e}")))?;

        self.report(&outcomes)
    }

    /// Print one summary line per stream and turn failures into an error
    fn report(&self, outcomes: &[StreamOutcome]) -> Result<()> {
        let mut failed = 0usize;
        let mut cancelled = 0usize;

        for outcome in outcomes {
            match &outcome.result {
                Ok(summary) => {
                    self.output_message(&json!({
                        "type": "SUMMARY",
                        "summary": summary
                    }));
                }
                Err(e) => {
                    if e.is_cancelled() {
                        cancelled += 1;
                    } else {
                        failed += 1;
                    }
                    self.output(&Message::error(e.to_string()));
                }
            }
        }

        info!(streams = outcomes.len(), failed, cancelled, "Read finished");

        if failed > 0 {
            return Err(Error::Other(format!(
                "{failed} of {} streams failed",
                outcomes.len()
            )));
        }
        if cancelled > 0 {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        print_message(self.cli.format, msg);
    }

    /// Output an engine message
    fn output(&self, message: &Message) {
        print_engine_message(self.cli.format, message);
    }
}

fn print_engine_message(format: OutputFormat, message: &Message) {
    match serde_json::to_value(message) {
        Ok(value) => print_message(format, &value),
        Err(e) => warn!(error = %e, "Failed to serialize message"),
    }
}

fn print_message(format: OutputFormat, msg: &Value) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(msg).unwrap_or_default());
        }
        OutputFormat::Pretty => {
            println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
        }
    }
}
