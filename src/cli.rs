//! Drives the command-line program.

use crate::clock::{DEFAULT_AFTER, DEFAULT_BEFORE, DateWindow, NaiveDate};
use crate::conf::{self, ConfigFile};
use crate::dispatch::{Command, CommandName, Harvester, Options, Request, SearchType};
use crate::error::{Error, Result};
use crate::gab::service::Tolerance;
use crate::gab::{ClientSettings, GabClient};
use crate::logging;
use crate::output::OutputTarget;
use crate::stream::{ContentKey, Harvest, Limit, Streamer};
use clap::{CommandFactory, Parser, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use indoc::formatdoc;
use itertools::Itertools;
use log::{error, info, warn};
use std::io;
use std::path::PathBuf;
use std::pin::pin;

/// Program configuration.
#[derive(Debug, Parser)]
#[command(name = "garc", version)]
#[command(about = "Harvests posts, comments, and accounts from Gab", long_about = None)]
pub struct Config {
    /// Command to run (see below)
    command: Option<String>,

    /// Search terms, username, or timespan, depending on the command
    query: Option<String>,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,

    /// Log file
    #[arg(long, default_value = "garc.log")]
    log: PathBuf,

    /// Gab account name
    #[arg(long = "user_account")]
    user_account: Option<String>,

    /// Gab account password
    #[arg(long = "user_password")]
    user_password: Option<String>,

    /// Config file containing Gab account info
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name of a profile in your configuration file
    #[arg(long, default_value = "main")]
    profile: String,

    /// Include warning messages in output
    #[arg(long, default_value_t = false)]
    warnings: bool,

    /// Number of connection errors before giving up
    #[arg(long = "connection_errors", default_value_t = 0)]
    connection_errors: u32,

    /// Number of HTTP errors before giving up
    #[arg(long = "http_errors", default_value_t = 0)]
    http_errors: u32,

    /// Write output to file path
    #[arg(long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Search type
    #[arg(long = "search_type", value_enum, default_value_t = SearchType::Date)]
    search_type: SearchType,

    /// Number of gabs to return (-1 for all)
    #[arg(long = "number_gabs", default_value_t = -1, allow_negative_numbers = true)]
    number_gabs: i64,

    /// Approximate date of earliest gab you wish to collect
    #[arg(long = "gabs_after", default_value = DEFAULT_AFTER)]
    gabs_after: NaiveDate,

    /// Approximate date of latest gab you wish to collect
    #[arg(long = "gabs_before", default_value = DEFAULT_BEFORE)]
    gabs_before: NaiveDate,

    /// Reduce each record to "content" or "created_at" ("all" keeps everything)
    #[arg(long = "content_key", default_value = "all")]
    content_key: String,
}

impl Config {
    /// Options passed through to retrieval commands.
    pub fn options(&self) -> Options {
        Options {
            limit: self.limit(),
            window: DateWindow::new(self.gabs_after, self.gabs_before),
            search_type: self.search_type,
        }
    }

    /// Maximum number of records to write.
    pub fn limit(&self) -> Limit {
        Limit::new(self.number_gabs)
    }

    /// Which part of each record to write.
    pub fn content_key(&self) -> ContentKey {
        ContentKey::from(self.content_key.as_str())
    }

    /// Settings used to log in to Gab.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            user_account: self.user_account.clone(),
            user_password: self.user_password.clone(),
            tolerance: Tolerance::new(self.connection_errors, self.http_errors),
            config: self.config.clone(),
            profile: self.profile.clone(),
        }
    }
}

/// Output formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One JSON value per line.
    #[default]
    Json,
}

/// How a run ended.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Records were harvested.
    Finished(Harvest),

    /// Usage was shown instead of running a command.
    Usage,

    /// The version was shown.
    Version,

    /// Configuration was updated.
    Configured,

    /// The harvest was interrupted before it finished.
    Interrupted,
}

impl Outcome {
    /// The process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Usage => 1,
            _ => 0,
        }
    }
}

/// Usage text, including the list of commands and a few examples.
pub fn usage() -> String {
    let help = Config::command().render_help();
    let commands = CommandName::ALL
        .iter()
        .map(|name| format!(" - {name}"))
        .join("\n");
    formatdoc! {"
        {help}
        Please use one of the following commands:

        {commands}

        For example:

            garc search \"make america great again\"

        For example:

            garc usercomments username --number_gabs=40 --content_key=content
    "}
}

/// Runs the command-line program.
#[derive(Debug)]
pub struct Runner {
    config: Config,
}

impl Runner {
    /// Create a new program runner using the given `config`.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the command-line program using its stored configuration options.
    ///
    /// An interrupt (Ctrl-C) at any point ends the run with
    /// [`Outcome::Interrupted`].
    pub async fn run(&self) -> Result<Outcome> {
        self.run_until(interrupted()).await
    }

    /// Run the command-line program until it finishes or `cancel` resolves.
    pub async fn run_until(&self, cancel: impl Future<Output = ()>) -> Result<Outcome> {
        let mut cancel = pin!(cancel);
        let config = &self.config;
        let command = match Command::parse(
            config.command.as_deref(),
            config.query.as_deref(),
            &config.options(),
        ) {
            Err(Error::UnknownCommand(name)) => {
                warn!("unknown command: {name}");
                Command::Help
            }
            command => command?,
        };

        match command {
            Command::Help => {
                println!("{}", usage());
                Ok(Outcome::Usage)
            }
            Command::Version => {
                println!("garc v{}", env!("CARGO_PKG_VERSION"));
                Ok(Outcome::Version)
            }
            Command::Configure => {
                let path = config.config.clone();
                let profile = config.profile.clone();
                // The prompt blocks on stdin, so it runs off the async thread.
                let prompt = async move {
                    tokio::task::spawn_blocking(move || {
                        let mut file = ConfigFile::load_or_default(path.as_deref())?;
                        let stdin = io::stdin();
                        conf::input_keys(&mut file, &profile, &mut stdin.lock(), &mut io::stdout())
                    })
                    .await
                    .map_err(io::Error::from)?
                };
                tokio::select! {
                    biased;
                    _ = &mut cancel => Ok(cancelled()),
                    prompted = prompt => prompted.map(|_| Outcome::Configured),
                }
            }
            Command::UserAgent => {
                let mut file = ConfigFile::load_or_default(config.config.as_deref())?;
                let user_agent = conf::save_user_agent(&mut file, &config.profile)?;
                println!("Saved user agent {user_agent}");
                Ok(Outcome::Configured)
            }
            Command::Retrieve(request) => {
                let settings = config.client_settings();
                let client = tokio::select! {
                    biased;
                    _ = &mut cancel => return Ok(cancelled()),
                    client = GabClient::connect(&settings) => client?,
                };
                self.harvest(&request, &client, cancel).await
            }
        }
    }

    /// Streams the records `request` retrieves from `harvester` to the
    /// configured output.
    ///
    /// If `cancel` resolves first, the harvest stops and the output is left
    /// as it is, without being finalized.
    pub async fn harvest<H: Harvester>(
        &self,
        request: &Request,
        harvester: &H,
        cancel: impl Future<Output = ()>,
    ) -> Result<Outcome> {
        let mut records = request.dispatch(harvester);
        let target = OutputTarget::open(self.config.output.as_deref())?;
        let streamer = Streamer::new(self.config.limit(), self.config.content_key());

        tokio::select! {
            biased;
            _ = cancel => Ok(cancelled()),
            harvest = streamer.stream(&mut records, target) => {
                let harvest = harvest?;
                info!("harvested {} records", harvest.count);
                Ok(Outcome::Finished(harvest))
            }
        }
    }
}

fn cancelled() -> Outcome {
    warn!("interrupted");
    Outcome::Interrupted
}

/// Resolves when the process receives an interrupt.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler there is nothing to wait for.
        std::future::pending::<()>().await;
    }
}

/// Runs the program and returns its exit status.
pub async fn run(config: Config) -> i32 {
    let level = config.verbosity.log_level_filter();
    if let Err(err) = logging::init(&config.log, level, config.warnings) {
        eprintln!("garc: could not open log file {}: {err}", config.log.display());
        return 1;
    }

    match Runner::new(config).run().await {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            error!("{err}");
            eprintln!("garc: {err}");
            1
        }
    }
}
