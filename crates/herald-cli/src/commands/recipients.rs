use crate::context::AppContext;
use anyhow::Result;
use herald_core::recipient::{Recipient, RecipientKind};

pub async fn run(ctx: &AppContext, kind: Option<RecipientKind>) -> Result<()> {
    ctx.bootstrap().await?;
    let summary = ctx.catalog.fetch().await?;

    for (category, result) in [
        (RecipientKind::Individual, &summary.individuals),
        (RecipientKind::Group, &summary.groups),
    ] {
        if kind.is_some_and(|wanted| wanted != category) {
            continue;
        }
        match result {
            Ok(_) => print_list(category, &ctx.catalog.recipients(category)),
            Err(e) => eprintln!("Could not load {} list: {}", category, e),
        }
    }
    Ok(())
}

fn print_list(kind: RecipientKind, recipients: &[Recipient]) {
    println!("{} ({}):", heading(kind), recipients.len());
    if recipients.is_empty() {
        println!("  (none)");
    }
    for recipient in recipients {
        println!("  {}", format_recipient(recipient));
    }
}

fn heading(kind: RecipientKind) -> &'static str {
    match kind {
        RecipientKind::Individual => "Friends",
        RecipientKind::Group => "Groups",
    }
}

pub(crate) fn format_recipient(recipient: &Recipient) -> String {
    match recipient.member_count {
        Some(count) => format!("{:<20} {} ({} members)", recipient.id, recipient.name, count),
        None => format!("{:<20} {}", recipient.id, recipient.name),
    }
}
