//! Interactive session.
//!
//! One session owns one query store for its whole lifetime; every command
//! reads from and syncs into that store. Errors are reported and the loop
//! keeps going so the user can retry.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use futures::future::try_join_all;
use serde_json::json;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::application::error::AppError;
use crate::application::posts::{PostUpdate, PostsService};
use crate::application::transport::PostsApi;
use crate::domain::error::DomainError;
use crate::domain::posts::{Comment, NewPost, Post, PostId, UserId, patched_title};

use super::OutputFormat;
use super::views::{
    RenderError, render_applied, render_comments, render_help, render_json, render_posts,
    render_sync_log,
};

const PROMPT: &str = "postboard> ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    List(Option<usize>),
    Refresh,
    Create(NewPost),
    Edit {
        id: PostId,
        title: String,
        body: String,
    },
    Patch(PostId),
    Delete(PostId),
    Comments(PostId),
    Log,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid post id `{0}`")]
    InvalidId(String),
}

impl FromStr for SessionCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "list" | "ls" => {
                if rest.is_empty() {
                    Ok(Self::List(None))
                } else {
                    rest.parse()
                        .map(|n| Self::List(Some(n)))
                        .map_err(|_| ParseCommandError::Usage("list [n]"))
                }
            }
            "refresh" => Ok(Self::Refresh),
            "create" | "new" => {
                let (title, body) =
                    split_content(rest).ok_or(ParseCommandError::Usage("create <title> | <body>"))?;
                Ok(Self::Create(NewPost { title, body }))
            }
            "edit" | "update" => {
                let (id, rest) = rest
                    .split_once(char::is_whitespace)
                    .ok_or(ParseCommandError::Usage("edit <id> <title> | <body>"))?;
                let (title, body) = split_content(rest)
                    .ok_or(ParseCommandError::Usage("edit <id> <title> | <body>"))?;
                Ok(Self::Edit {
                    id: parse_id(id)?,
                    title,
                    body,
                })
            }
            "patch" => Ok(Self::Patch(parse_required_id(rest, "patch <id>")?)),
            "delete" | "rm" => Ok(Self::Delete(parse_required_id(rest, "delete <id>")?)),
            "comments" => Ok(Self::Comments(parse_required_id(rest, "comments <id>")?)),
            "log" => Ok(Self::Log),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}

fn split_content(input: &str) -> Option<(String, String)> {
    let (title, body) = input.split_once('|')?;
    Some((title.trim().to_string(), body.trim().to_string()))
}

fn parse_id(raw: &str) -> Result<PostId, ParseCommandError> {
    raw.trim()
        .parse()
        .map_err(|_| ParseCommandError::InvalidId(raw.trim().to_string()))
}

fn parse_required_id(raw: &str, usage: &'static str) -> Result<PostId, ParseCommandError> {
    if raw.is_empty() {
        return Err(ParseCommandError::Usage(usage));
    }
    parse_id(raw)
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Parse(#[from] ParseCommandError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl SessionError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::App(err) if err.is_retryable())
    }
}

impl From<super::views::TemplateRenderError> for SessionError {
    fn from(err: super::views::TemplateRenderError) -> Self {
        Self::Render(err.into())
    }
}

impl From<super::views::JsonRenderError> for SessionError {
    fn from(err: super::views::JsonRenderError) -> Self {
        Self::Render(err.into())
    }
}

impl From<DomainError> for SessionError {
    fn from(err: DomainError) -> Self {
        Self::App(err.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

pub struct Session<A: PostsApi + ?Sized> {
    service: PostsService<A>,
    expanded: BTreeSet<PostId>,
    post_limit: usize,
    user_id: UserId,
    format: OutputFormat,
}

impl<A: PostsApi + ?Sized> Session<A> {
    pub fn new(
        service: PostsService<A>,
        post_limit: usize,
        user_id: UserId,
        format: OutputFormat,
    ) -> Self {
        Self {
            service,
            expanded: BTreeSet::new(),
            post_limit,
            user_id,
            format,
        }
    }

    pub fn service(&self) -> &PostsService<A> {
        &self.service
    }

    pub fn expanded(&self) -> impl Iterator<Item = PostId> + '_ {
        self.expanded.iter().copied()
    }

    /// Parse and run one input line.
    pub async fn handle_line(&mut self, line: &str) -> Result<Reply, SessionError> {
        let command: SessionCommand = line.parse()?;
        self.execute(command).await
    }

    pub async fn execute(&mut self, command: SessionCommand) -> Result<Reply, SessionError> {
        debug!(?command, "Session command");
        let out = match command {
            SessionCommand::List(limit) => {
                let posts = self.service.load_posts().await?;
                self.render_list(&posts, limit.unwrap_or(self.post_limit))
                    .await?
            }
            SessionCommand::Refresh => {
                let posts = self.service.refresh_posts().await?;
                self.render_list(&posts, self.post_limit).await?
            }
            SessionCommand::Create(post) => {
                let applied = self.service.create(post).await?;
                self.render_value(&applied.value, || render_applied(&applied))?
            }
            SessionCommand::Edit { id, title, body } => {
                let user_id = self.cached_post(id).map_or(self.user_id, |p| p.user_id);
                let applied = self
                    .service
                    .update(PostUpdate {
                        id,
                        user_id,
                        title,
                        body,
                    })
                    .await?;
                self.render_value(&applied.value, || render_applied(&applied))?
            }
            SessionCommand::Patch(id) => {
                let post = self
                    .cached_post(id)
                    .ok_or_else(|| DomainError::not_found("post", id))?;
                let applied = self.service.patch(id, patched_title(&post)).await?;
                self.render_value(&applied.value, || render_applied(&applied))?
            }
            SessionCommand::Delete(id) => {
                let applied = self.service.delete(id).await?;
                self.expanded.remove(&id);
                self.render_value(&applied.event.post_id, || render_applied(&applied))?
            }
            SessionCommand::Comments(id) => {
                if self.expanded.remove(&id) {
                    match self.format {
                        OutputFormat::Json => {
                            render_json(&json!({ "postId": id, "expanded": false }))?
                        }
                        OutputFormat::Text => format!("Comments hidden for post #{id}."),
                    }
                } else {
                    let comments = self.service.load_comments(id).await?;
                    self.expanded.insert(id);
                    match self.format {
                        OutputFormat::Json => render_json(&comments)?,
                        OutputFormat::Text => render_comments(id, &comments)?,
                    }
                }
            }
            SessionCommand::Log => {
                let events = self.service.store().sync_log().events();
                render_sync_log(&events)
            }
            SessionCommand::Help => render_help()?,
            SessionCommand::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Output(out))
    }

    /// Read commands line by line until `quit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, output: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        while let Some(line) = lines.next_line().await? {
            if !line.trim().is_empty() {
                match self.handle_line(&line).await {
                    Ok(Reply::Quit) => break,
                    Ok(Reply::Output(text)) => {
                        output.write_all(text.as_bytes()).await?;
                        output.write_all(b"\n").await?;
                    }
                    Err(err) => {
                        let hint = if err.is_retryable() {
                            " (try again)"
                        } else {
                            ""
                        };
                        output
                            .write_all(format!("error: {err}{hint}\n").as_bytes())
                            .await?;
                    }
                }
            }
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;
        }
        output.write_all(b"\n").await?;
        output.flush().await
    }

    fn cached_post(&self, id: PostId) -> Option<Post> {
        self.service
            .store()
            .posts()
            .and_then(|posts| posts.into_iter().find(|post| post.id == id))
    }

    async fn render_list(&self, posts: &[Post], limit: usize) -> Result<String, SessionError> {
        if let OutputFormat::Json = self.format {
            let shown: Vec<&Post> = posts.iter().take(limit).collect();
            return Ok(render_json(&shown)?);
        }

        let loads = self.expanded.iter().map(|id| async move {
            self.service
                .load_comments(*id)
                .await
                .map(|comments| (*id, comments))
        });
        let expanded: HashMap<PostId, Vec<Comment>> =
            try_join_all(loads).await?.into_iter().collect();
        Ok(render_posts(posts, limit, &expanded)?)
    }

    fn render_value<T, F>(&self, value: &T, text: F) -> Result<String, SessionError>
    where
        T: serde::Serialize,
        F: FnOnce() -> String,
    {
        match self.format {
            OutputFormat::Json => Ok(render_json(value)?),
            OutputFormat::Text => Ok(text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_with_and_without_limit() {
        assert_eq!("list".parse::<SessionCommand>(), Ok(SessionCommand::List(None)));
        assert_eq!("list 3".parse::<SessionCommand>(), Ok(SessionCommand::List(Some(3))));
        assert_eq!(
            "list many".parse::<SessionCommand>(),
            Err(ParseCommandError::Usage("list [n]"))
        );
    }

    #[test]
    fn parses_create_title_and_body() {
        assert_eq!(
            "create Hello world | First body".parse::<SessionCommand>(),
            Ok(SessionCommand::Create(NewPost {
                title: "Hello world".into(),
                body: "First body".into(),
            }))
        );
        assert!("create no separator".parse::<SessionCommand>().is_err());
    }

    #[test]
    fn parses_edit() {
        assert_eq!(
            "edit 4 New | Text".parse::<SessionCommand>(),
            Ok(SessionCommand::Edit {
                id: 4,
                title: "New".into(),
                body: "Text".into(),
            })
        );
        assert_eq!(
            "edit x New | Text".parse::<SessionCommand>(),
            Err(ParseCommandError::InvalidId("x".into()))
        );
    }

    #[test]
    fn parses_id_commands() {
        assert_eq!("patch 2".parse::<SessionCommand>(), Ok(SessionCommand::Patch(2)));
        assert_eq!("DELETE 7".parse::<SessionCommand>(), Ok(SessionCommand::Delete(7)));
        assert_eq!("comments 1".parse::<SessionCommand>(), Ok(SessionCommand::Comments(1)));
        assert_eq!(
            "delete".parse::<SessionCommand>(),
            Err(ParseCommandError::Usage("delete <id>"))
        );
    }

    #[test]
    fn rejects_unknown_command() {
        assert_eq!(
            "frobnicate".parse::<SessionCommand>(),
            Err(ParseCommandError::Unknown("frobnicate".into()))
        );
        assert_eq!("q".parse::<SessionCommand>(), Ok(SessionCommand::Quit));
    }
}
