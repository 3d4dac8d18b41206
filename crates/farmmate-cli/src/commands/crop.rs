use anyhow::Result;
use colored::Colorize;

use crate::CropAction;
use crate::context::Context;
use crate::output;

pub async fn list(ctx: &Context, offline: bool) -> Result<()> {
    let tiles = if offline {
        ctx.services.crops.tiles()?
    } else {
        let member_id = ctx.member_id()?;
        ctx.services.crops.sync_with_server(&member_id).await?
    };
    output::crop_tiles(&tiles);
    Ok(())
}

pub async fn run(ctx: &Context, action: CropAction) -> Result<()> {
    let crops = &ctx.services.crops;
    match action {
        CropAction::Create {
            crop,
            address,
            planted_at,
        } => {
            let entry = crops
                .create(&ctx.member_id()?, &crop, &address, &planted_at)
                .await?;
            println!(
                "{} {crop} at {} (thread {})",
                "Growing".green().bold(),
                entry.address,
                entry.thread_id
            );
        }
        CropAction::Modify {
            crop,
            address,
            planted_at,
        } => {
            let entry = crops
                .modify(&ctx.member_id()?, &crop, &address, &planted_at)
                .await?;
            println!(
                "{} {crop}: {} since {}",
                "Updated".green().bold(),
                entry.address,
                entry.planted_at.as_deref().unwrap_or("-")
            );
        }
        CropAction::Delete { crop } => {
            crops.delete(&ctx.member_id()?, &crop).await?;
            println!("{} {crop}", "Stopped growing".yellow().bold());
        }
        CropAction::Select { crop } => {
            crops.select(&crop)?;
            println!("Selected {crop}");
        }
    }
    Ok(())
}
