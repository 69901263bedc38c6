//! postboard: JSONPlaceholder posts client.
//! One-shot subcommands for each endpoint plus an interactive session that
//! keeps its query cache alive between commands.

mod context;
mod handlers;
mod print;

use postboard::config::{self, Command};
use postboard::infra::telemetry;

use context::{CliError, Ctx};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let (cli, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    let ctx = Ctx::new(&settings, cli.json)?;

    match cli.command.unwrap_or(Command::Session) {
        Command::Posts(args) => handlers::posts(&ctx, args.action).await?,
        Command::Comments { post_id } => handlers::comments(&ctx, post_id).await?,
        Command::Session => handlers::session(&ctx).await?,
    }

    Ok(())
}
