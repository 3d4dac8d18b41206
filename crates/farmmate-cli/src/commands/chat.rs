use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use farmmate_core::chat::{BookmarkState, ChatView};

use crate::context::Context;
use crate::output;
use crate::{BookmarkAction, ChatAction};

pub async fn run(ctx: &Context, action: ChatAction) -> Result<()> {
    let member_id = ctx.member_id()?;
    match action {
        ChatAction::Show { crop } => {
            let crop = ctx.crop(crop)?;
            let view = ctx.services.chat.load_messages(&member_id, &crop).await?;
            if view.is_empty() {
                println!("No messages yet. Ask something with `farmmate chat send`.");
            }
            for (index, message) in view.messages().iter().enumerate() {
                output::chat_message(index, message);
            }
        }
        ChatAction::Send { message, crop } => {
            let crop = ctx.crop(crop)?;
            // The history is not needed to send, only the thread.
            let thread_id = ctx.cache.crop_catalog()?.require_thread(&crop)?;
            let mut view = ChatView::new(member_id, crop, thread_id);

            let result = ctx.services.chat.send_message(&mut view, &message).await;
            for (index, message) in view.messages().iter().enumerate() {
                output::chat_message(index, message);
            }
            result?;
        }
    }
    Ok(())
}

pub async fn bookmark(ctx: &Context, action: BookmarkAction) -> Result<()> {
    let member_id = ctx.member_id()?;
    match action {
        BookmarkAction::Toggle { index, crop } => {
            let crop = ctx.crop(crop)?;
            let mut view = ctx.services.chat.load_messages(&member_id, &crop).await?;
            match ctx.services.bookmarks.toggle_bookmark(&mut view, index).await? {
                BookmarkState::Bookmarked { bookmark_id } => {
                    println!("{} (#{bookmark_id})", "Bookmarked".yellow().bold());
                }
                BookmarkState::NotBookmarked => println!("Bookmark removed"),
            }
        }
        BookmarkAction::List { crop } => {
            let crop = ctx.crop(crop)?;
            let today = Local::now().date_naive();
            let groups = ctx
                .services
                .dashboard
                .bookmark_weeks(&member_id, &crop, today)
                .await?;
            output::bookmark_weeks(&groups);
        }
    }
    Ok(())
}
