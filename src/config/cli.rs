use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

use crate::domain::posts::{PostId, UserId};

/// Command-line arguments for the postboard binary.
#[derive(Debug, Parser)]
#[command(
    name = "postboard",
    version,
    about = "JSONPlaceholder posts client with a mutation-synced query cache"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "POSTBOARD_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    /// Print results as pretty JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the API base URL.
    #[arg(long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// Override the request timeout.
    #[arg(long = "api-timeout-seconds", value_name = "SECONDS")]
    pub api_timeout_seconds: Option<u64>,

    /// Override the user id sent with new posts.
    #[arg(long = "api-user-id", value_name = "ID")]
    pub api_user_id: Option<UserId>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override how many posts list views show.
    #[arg(long = "display-post-limit", value_name = "COUNT")]
    pub display_post_limit: Option<usize>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Post operations (list/create/update/patch/delete).
    Posts(PostsArgs),
    /// Show the comments of one post.
    Comments {
        #[arg(long = "post-id")]
        post_id: PostId,
    },
    /// Interactive session on stdin that keeps one query cache alive.
    Session,
}

#[derive(Debug, Args, Clone)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub action: PostsCmd,
}

#[derive(Debug, Subcommand, Clone)]
pub enum PostsCmd {
    /// List posts.
    List {
        /// Maximum number of posts to show (defaults to display.post_limit).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Create a post (POST).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
    },
    /// Replace a post (PUT).
    Update {
        #[arg(long)]
        id: PostId,
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        /// Owner of the post (defaults to api.user_id).
        #[arg(long = "user-id")]
        user_id: Option<UserId>,
    },
    /// Change some fields of a post (PATCH).
    Patch {
        #[arg(long)]
        id: PostId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
        #[arg(long = "user-id")]
        user_id: Option<UserId>,
    },
    /// Delete a post (DELETE).
    Delete {
        #[arg(long)]
        id: PostId,
    },
}
