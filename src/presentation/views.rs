//! Terminal views of the cached collection view, comments and mutations.

use std::collections::HashMap;

use askama::{Error as AskamaError, Template};
use serde::Serialize;
use thiserror::Error;

use crate::application::posts::Applied;
use crate::cache::{SyncEvent, SyncKind};
use crate::domain::posts::{Comment, Post, PostId};

#[derive(Debug, Error)]
#[error("failed to render {view}")]
pub struct TemplateRenderError {
    pub(crate) view: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(view: &'static str, error: AskamaError) -> Self {
        Self { view, error }
    }
}

#[derive(Debug, Error)]
#[error("failed to render json output: {0}")]
pub struct JsonRenderError(#[from] serde_json::Error);

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Template(#[from] TemplateRenderError),
    #[error(transparent)]
    Json(#[from] JsonRenderError),
}

#[derive(Clone)]
pub struct CommentView {
    pub email: String,
    pub body: String,
}

#[derive(Clone)]
pub struct PostCardView {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub expanded: bool,
    pub comments: Vec<CommentView>,
}

#[derive(Clone)]
pub struct PostListView {
    pub cards: Vec<PostCardView>,
    pub shown: usize,
    pub total: usize,
}

#[derive(Template)]
#[template(path = "posts.txt")]
pub struct PostListTemplate {
    pub content: PostListView,
}

#[derive(Clone)]
pub struct CommentListView {
    pub post_id: PostId,
    pub comments: Vec<CommentView>,
}

#[derive(Template)]
#[template(path = "comments.txt")]
pub struct CommentListTemplate {
    pub content: CommentListView,
}

#[derive(Template)]
#[template(path = "help.txt")]
pub struct HelpTemplate;

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            email: comment.email.clone(),
            body: single_line(&comment.body),
        }
    }
}

/// Build the list view for the first `limit` posts. Posts present in
/// `expanded` show their comments inline.
pub fn post_list_view(
    posts: &[Post],
    limit: usize,
    expanded: &HashMap<PostId, Vec<Comment>>,
) -> PostListView {
    let cards: Vec<PostCardView> = posts
        .iter()
        .take(limit)
        .map(|post| {
            let comments = expanded.get(&post.id);
            PostCardView {
                id: post.id,
                title: single_line(&post.title),
                body: single_line(&post.body),
                expanded: comments.is_some(),
                comments: comments
                    .map(|list| list.iter().map(CommentView::from).collect())
                    .unwrap_or_default(),
            }
        })
        .collect();

    PostListView {
        shown: cards.len(),
        total: posts.len(),
        cards,
    }
}

pub fn render_posts(
    posts: &[Post],
    limit: usize,
    expanded: &HashMap<PostId, Vec<Comment>>,
) -> Result<String, TemplateRenderError> {
    PostListTemplate {
        content: post_list_view(posts, limit, expanded),
    }
    .render()
    .map(|out| out.trim_start().to_string())
    .map_err(|err| TemplateRenderError::new("post list", err))
}

pub fn render_comments(post_id: PostId, comments: &[Comment]) -> Result<String, TemplateRenderError> {
    CommentListTemplate {
        content: CommentListView {
            post_id,
            comments: comments.iter().map(CommentView::from).collect(),
        },
    }
    .render()
    .map_err(|err| TemplateRenderError::new("comment list", err))
}

pub fn render_help() -> Result<String, TemplateRenderError> {
    HelpTemplate
        .render()
        .map_err(|err| TemplateRenderError::new("help", err))
}

/// One line describing an applied sync.
pub fn describe_sync(event: &SyncEvent) -> String {
    let verb = match event.kind {
        SyncKind::Create => "created",
        SyncKind::Update => "updated",
        SyncKind::Patch => "patched",
        SyncKind::Delete => "deleted",
    };
    let note = if event.hit { "" } else { " (not cached)" };
    format!(
        "{verb} post #{}{note}; cache {} -> {} [epoch {}]",
        event.post_id, event.len_before, event.len_after, event.epoch
    )
}

pub fn render_applied<T>(applied: &Applied<T>) -> String {
    describe_sync(&applied.event)
}

pub fn render_sync_log(events: &[SyncEvent]) -> String {
    if events.is_empty() {
        return "No cache syncs applied yet.".to_string();
    }
    events
        .iter()
        .map(describe_sync)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_json<T: Serialize>(value: &T) -> Result<String, JsonRenderError> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
