use super::describe_session;
use crate::context::AppContext;
use anyhow::Result;

pub async fn run(ctx: &AppContext) -> Result<()> {
    ctx.bootstrap().await?;
    println!("{}", describe_session(&ctx.session.session().await));
    println!("Scopes: {}", ctx.session.scopes().join(", "));
    Ok(())
}
