//! Session command - drives one in-process cache from stdin
//!
//! One command per line:
//!
//! ```text
//! lookup <query>
//! update <query> => <result>
//! clear
//! stats
//! quit
//! ```

use clap::Args;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{EngineConfig, EngineType, RequestContext};
use crate::infrastructure::embedding::EmbedderFactory;
use crate::infrastructure::logging;
use crate::infrastructure::observability::{init_metrics, PrometheusMetrics};
use crate::infrastructure::services::LlmCache;

/// Arguments for the session command
#[derive(Args, Clone, Debug, Default)]
pub struct SessionArgs {
    /// Engine to use: exact or similarity (overrides config)
    #[arg(long)]
    pub engine: Option<String>,

    /// Maximum number of cached queries (overrides config)
    #[arg(long)]
    pub max_entries: Option<usize>,

    /// Match threshold for the configured metric (overrides config)
    #[arg(long)]
    pub threshold: Option<f32>,
}

impl SessionArgs {
    fn apply(&self, config: &mut EngineConfig) -> anyhow::Result<()> {
        if let Some(engine) = &self.engine {
            config.engine = engine.parse()?;
        }

        if let Some(max_entries) = self.max_entries {
            config.max_entries = max_entries;
        }

        if let Some(threshold) = self.threshold {
            config.threshold = Some(threshold);
        }

        Ok(())
    }
}

/// A parsed session line
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Lookup(String),
    Update { query: String, result: String },
    Clear,
    Stats,
    Help,
    Quit,
}

impl std::str::FromStr for SessionCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command.to_lowercase().as_str() {
            "lookup" | "get" if !rest.is_empty() => Ok(SessionCommand::Lookup(rest.to_string())),
            "update" | "set" => {
                let (query, result) = rest
                    .split_once("=>")
                    .ok_or_else(|| "usage: update <query> => <result>".to_string())?;
                let query = query.trim();

                if query.is_empty() {
                    return Err("usage: update <query> => <result>".to_string());
                }

                Ok(SessionCommand::Update {
                    query: query.to_string(),
                    result: result.trim().to_string(),
                })
            }
            "lookup" | "get" => Err("usage: lookup <query>".to_string()),
            "clear" => Ok(SessionCommand::Clear),
            "stats" => Ok(SessionCommand::Stats),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" => Ok(SessionCommand::Quit),
            other => Err(format!("unknown command '{}', type 'help'", other)),
        }
    }
}

const HELP: &str = "commands:
  lookup <query>
  update <query> => <result>
  clear
  stats
  quit
";

/// Load configuration from `dir` and apply command-line overrides
fn load_config(args: &SessionArgs, dir: &str) -> anyhow::Result<AppConfig> {
    let mut config = AppConfig::load_from(dir)?;
    args.apply(&mut config.cache)?;
    config.cache.validate()?;

    Ok(config)
}

/// Run the session command
pub async fn run(args: SessionArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = load_config(&args, "config")?;
    logging::init_logging(&config.logging);

    let metrics = init_metrics(&config.metrics);

    let embedder = match config.cache.engine {
        EngineType::Similarity => Some(EmbedderFactory::create(&config.embedder)?),
        EngineType::Exact => None,
    };
    let cache: LlmCache<String> = LlmCache::from_config(&config.cache, embedder)?;

    info!(
        engine = cache.engine_name(),
        embedder = %config.embedder.provider,
        "Cache session started"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let keep_going = match line.parse::<SessionCommand>() {
            Ok(command) => execute(&cache, command, metrics.as_ref(), &mut stdout).await?,
            Err(message) => {
                stdout.write_all(format!("error: {}\n", message).as_bytes()).await?;
                true
            }
        };

        stdout.flush().await?;

        if !keep_going {
            break;
        }
    }

    info!("Cache session finished");
    Ok(())
}

/// Execute one command; returns `false` when the session should end
pub async fn execute<W>(
    cache: &LlmCache<String>,
    command: SessionCommand,
    metrics: Option<&PrometheusMetrics>,
    out: &mut W,
) -> anyhow::Result<bool>
where
    W: AsyncWrite + Unpin,
{
    let ctx = RequestContext::background();

    let reply = match command {
        SessionCommand::Lookup(query) => match cache.lookup(&ctx, &query).await {
            Some(result) => format!("HIT {}\n", result),
            None => "MISS\n".to_string(),
        },
        SessionCommand::Update { query, result } => match cache.update(&ctx, &query, result).await {
            Ok(()) => "OK\n".to_string(),
            Err(e) => format!("error: {}\n", e),
        },
        SessionCommand::Clear => {
            cache.clear(&ctx).await?;
            "OK\n".to_string()
        }
        SessionCommand::Stats => {
            let stats = cache.stats();
            let mut reply = serde_json::to_string_pretty(&stats)?;
            reply.push_str(&format!("\nhit_rate: {:.3}\n", stats.hit_rate()));

            if let Some(metrics) = metrics {
                reply.push_str(&metrics.render());
            }

            reply
        }
        SessionCommand::Help => HELP.to_string(),
        SessionCommand::Quit => return Ok(false),
    };

    out.write_all(reply.as_bytes()).await?;
    Ok(true)
}
