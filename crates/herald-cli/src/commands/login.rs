use super::describe_session;
use crate::context::AppContext;
use anyhow::{Context, Result};

pub async fn run(ctx: &AppContext) -> Result<()> {
    ctx.bootstrap().await?;

    if ctx.session.is_connected().await {
        println!("{}", describe_session(&ctx.session.session().await));
        return Ok(());
    }

    if let Some(profile_fetch) = ctx.session.connect().await? {
        profile_fetch.await.context("Profile fetch task failed")?;
    }
    println!("{}", describe_session(&ctx.session.session().await));
    Ok(())
}
