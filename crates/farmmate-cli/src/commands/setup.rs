use anyhow::Result;
use colored::Colorize;
use farmmate_application::Landing;

use crate::context::Context;
use crate::output;

/// Splash flow: registers the member and seeds the crop catalog.
pub async fn init(ctx: &Context) -> Result<()> {
    if ctx.config.ensure_config_file()? {
        println!("Created default config.toml");
    }

    let outcome = ctx.services.bootstrap.run().await?;
    println!("{} {}", "member:".bold(), outcome.member_id);

    match outcome.landing {
        Landing::CropList => output::crop_tiles(&ctx.services.crops.tiles()?),
        Landing::Recommend => {
            println!("You are not growing anything yet. Available crops:");
            output::crop_tiles(&ctx.services.crops.tiles()?);
            println!(
                "Start with `farmmate crop create <crop> --address <address> --planted-at YYYY-MM-DD`."
            );
        }
    }
    Ok(())
}

pub fn reset(ctx: &Context) -> Result<()> {
    ctx.cache.clear()?;
    println!("Local state cleared.");
    Ok(())
}
