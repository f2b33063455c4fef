use std::io::{self, Write};

use anyhow::anyhow;
use serde::Serialize;
use uplink_client::{Session, login};

use crate::cli::{LoginArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};

#[derive(Serialize)]
struct LoginReport<'a> {
    token: &'a str,
}

pub(crate) async fn handle_login(ctx: &AppContext, args: LoginArgs) -> CliResult<()> {
    let session = request_session(ctx, &args).await?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_session(&mut out, &session, ctx.output)
}

pub(crate) async fn request_session(ctx: &AppContext, args: &LoginArgs) -> CliResult<Session> {
    if args.username.trim().is_empty() {
        return Err(CliError::validation("username must not be empty"));
    }
    Ok(login(&ctx.client, &ctx.base_url, &args.username, &args.password).await?)
}

pub(crate) fn write_session(
    out: &mut impl Write,
    session: &Session,
    format: OutputFormat,
) -> CliResult<()> {
    let text = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&LoginReport {
            token: session.token(),
        })
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?,
        OutputFormat::Table => format!(
            "token: {}\nexport UPLINK_TOKEN={}",
            session.token(),
            session.token()
        ),
    };
    writeln!(out, "{text}")
        .map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
}
