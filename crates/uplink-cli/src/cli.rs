//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uplink_core::TransformCleanup;
use uplink_swarm::DEFAULT_SWARM_PROGRAM;
use uplink_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, init_logging};
use uplink_transcode::DEFAULT_FFMPEG_PROGRAM;
use url::Url;

use crate::client::{AppContext, CliDependencies, CliResult};
use crate::commands::login::handle_login;
use crate::commands::upload::handle_upload;

const DEFAULT_API_URL: &str = "http://localhost";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const BUILD_SHA: &str = match option_env!("UPLINK_BUILD_SHA") {
    Some(sha) => sha,
    None => "dev",
};

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.into(),
        build_sha: BUILD_SHA,
    }) {
        eprintln!("warning: logging disabled: {err}");
    }
    let _context = GlobalContextGuard::new(cli.command.label());

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received; finishing current file as cancelled");
            interrupt.cancel();
        }
    });

    match dispatch(cli, cancel).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

pub(crate) async fn dispatch(cli: Cli, cancel: CancellationToken) -> CliResult<()> {
    let deps = CliDependencies::from_cli(&cli)?;
    debug!(api_url = %cli.api_url, "dispatching command");
    let ctx = AppContext {
        client: deps.client,
        base_url: cli.api_url,
        token: cli.token,
        output: cli.output,
        ffmpeg: cli.ffmpeg,
        swarm_client: cli.swarm_client,
        cancel,
    };

    match cli.command {
        Command::Upload(args) => handle_upload(&ctx, args).await,
        Command::Login(args) => handle_login(&ctx, args).await,
    }
}

#[derive(Parser)]
#[command(
    name = "uplink",
    version,
    about = "Upload files, folders, and swarm downloads to a remote file backend"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "UPLINK_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(
        long,
        global = true,
        env = "UPLINK_TOKEN",
        hide_env_values = true,
        help = "Session token returned by `uplink login`"
    )]
    pub(crate) token: Option<String>,
    #[arg(
        long,
        global = true,
        env = "UPLINK_CONNECT_TIMEOUT_SECS",
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS
    )]
    pub(crate) connect_timeout: u64,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for command results"
    )]
    pub(crate) output: OutputFormat,
    #[arg(long, global = true, env = "UPLINK_LOG", default_value = "info")]
    pub(crate) log_level: String,
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub(crate) log_format: LogFormatArg,
    #[arg(
        long,
        global = true,
        env = "UPLINK_FFMPEG",
        default_value = DEFAULT_FFMPEG_PROGRAM,
        help = "ffmpeg executable used by --hevc"
    )]
    pub(crate) ffmpeg: PathBuf,
    #[arg(
        long,
        global = true,
        env = "UPLINK_SWARM_CLIENT",
        default_value = DEFAULT_SWARM_PROGRAM,
        help = "Swarm client executable used for .torrent sources"
    )]
    pub(crate) swarm_client: PathBuf,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Upload a file, a directory tree, or the content of a .torrent manifest.
    Upload(UploadArgs),
    /// Exchange credentials for a session token.
    Login(LoginArgs),
}

impl Command {
    pub(crate) const fn label(&self) -> &'static str {
        match self {
            Self::Upload(_) => "upload",
            Self::Login(_) => "login",
        }
    }
}

#[derive(Args)]
pub(crate) struct UploadArgs {
    #[arg(help = "File, directory, or .torrent manifest to upload")]
    pub(crate) source: PathBuf,
    #[arg(help = "Destination folder on the backend")]
    pub(crate) folder: String,
    #[arg(long, help = "Comma-separated tags attached to every file")]
    pub(crate) tags: Option<String>,
    #[arg(long, help = "Description attached to every file")]
    pub(crate) description: Option<String>,
    #[arg(long, help = "Re-encode videos to HEVC before uploading")]
    pub(crate) hevc: bool,
    #[arg(long, value_name = "DIR", help = "Directory receiving swarm downloads")]
    pub(crate) torrent_dir: Option<PathBuf>,
    #[arg(
        long,
        value_enum,
        default_value_t = CleanupArg::Keep,
        help = "File to delete after a transcoded upload succeeds"
    )]
    pub(crate) cleanup: CleanupArg,
    #[arg(long, value_name = "SECS", help = "Give up on swarm downloads after this long")]
    pub(crate) acquire_timeout: Option<u64>,
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long, env = "UPLINK_USERNAME")]
    pub(crate) username: String,
    #[arg(long, env = "UPLINK_PASSWORD", hide_env_values = true)]
    pub(crate) password: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum CleanupArg {
    Keep,
    RemoveOriginal,
    RemoveTranscoded,
}

impl From<CleanupArg> for TransformCleanup {
    fn from(value: CleanupArg) -> Self {
        match value {
            CleanupArg::Keep => Self::Keep,
            CleanupArg::RemoveOriginal => Self::RemoveOriginal,
            CleanupArg::RemoveTranscoded => Self::RemoveTranscoded,
        }
    }
}

pub(crate) fn parse_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|err| format!("invalid URL '{value}': {err}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported URL scheme '{}'", url.scheme()));
    }
    Ok(url)
}
