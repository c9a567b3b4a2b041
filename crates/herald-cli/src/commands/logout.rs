use crate::context::AppContext;
use anyhow::Result;

pub async fn run(ctx: &AppContext) -> Result<()> {
    // Without a usable provider the local session is still cleared
    if let Err(e) = ctx.session.initialize().await {
        tracing::warn!("[Logout] Skipping remote logout: {}", e);
    }
    ctx.session.restore().await?;

    ctx.session.disconnect().await?;
    ctx.catalog.clear();
    println!("Logged out");
    Ok(())
}
