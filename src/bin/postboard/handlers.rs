use std::collections::HashMap;

use tokio::io::{self, BufReader};

use postboard::application::posts::PostUpdate;
use postboard::config::PostsCmd;
use postboard::domain::posts::{NewPost, PostId, PostPatch};
use postboard::presentation::session::Session;
use postboard::presentation::views::{render_applied, render_comments, render_posts};

use crate::context::{CliError, Ctx};
use crate::print::print_output;

pub async fn posts(ctx: &Ctx, cmd: PostsCmd) -> Result<(), CliError> {
    match cmd {
        PostsCmd::List { limit } => list(ctx, limit).await,
        PostsCmd::Create { title, body } => {
            let applied = ctx.service.create(NewPost { title, body }).await?;
            print_output(ctx.format, &applied.value, || Ok(render_applied(&applied)))?;
            Ok(())
        }
        PostsCmd::Update {
            id,
            title,
            body,
            user_id,
        } => {
            let update = PostUpdate {
                id,
                user_id: user_id.unwrap_or(ctx.user_id),
                title,
                body,
            };
            let applied = ctx.service.update(update).await?;
            print_output(ctx.format, &applied.value, || Ok(render_applied(&applied)))?;
            Ok(())
        }
        PostsCmd::Patch {
            id,
            title,
            body,
            user_id,
        } => {
            let patch = PostPatch {
                user_id,
                title,
                body,
            };
            let applied = ctx.service.patch(id, patch).await?;
            print_output(ctx.format, &applied.value, || Ok(render_applied(&applied)))?;
            Ok(())
        }
        PostsCmd::Delete { id } => {
            let applied = ctx.service.delete(id).await?;
            print_output(ctx.format, &id, || Ok(render_applied(&applied)))?;
            Ok(())
        }
    }
}

async fn list(ctx: &Ctx, limit: Option<usize>) -> Result<(), CliError> {
    let posts = ctx.service.load_posts().await?;
    let limit = limit.unwrap_or(ctx.post_limit);
    let shown: Vec<_> = posts.iter().take(limit).collect();
    print_output(ctx.format, &shown, || {
        Ok(render_posts(&posts, limit, &HashMap::new())?)
    })?;
    Ok(())
}

pub async fn comments(ctx: &Ctx, post_id: PostId) -> Result<(), CliError> {
    let comments = ctx.service.load_comments(post_id).await?;
    print_output(ctx.format, &comments, || {
        Ok(render_comments(post_id, &comments)?)
    })?;
    Ok(())
}

pub async fn session(ctx: &Ctx) -> Result<(), CliError> {
    let mut session = Session::new(
        ctx.service.clone(),
        ctx.post_limit,
        ctx.user_id,
        ctx.format,
    );
    let stdin = BufReader::new(io::stdin());
    let mut stdout = io::stdout();
    session.run(stdin, &mut stdout).await?;
    Ok(())
}
