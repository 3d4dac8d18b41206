use anyhow::Result;

use crate::context::Context;
use crate::output;

pub async fn weather(ctx: &Context, crop: Option<String>, short_term: bool) -> Result<()> {
    let crop = ctx.crop(crop)?;
    let dashboard = &ctx.services.dashboard;
    if short_term {
        output::forecast(&dashboard.short_term_forecast(&crop).await?);
    } else {
        output::weather(&dashboard.current_weather(&crop).await?);
    }
    Ok(())
}

pub async fn pests(ctx: &Context, crop: Option<String>) -> Result<()> {
    let crop = ctx.crop(crop)?;
    let alerts = ctx.services.dashboard.pest_alerts(&crop).await?;
    output::pest_alerts(&crop, &alerts);
    Ok(())
}

pub async fn pest(ctx: &Context, name: &str, crop: Option<String>) -> Result<()> {
    let crop = ctx.crop(crop)?;
    let detail = ctx.services.dashboard.pest_detail(name, &crop).await?;
    output::pest_detail(&detail);
    Ok(())
}

pub async fn guidance(ctx: &Context, crop: Option<String>) -> Result<()> {
    let crop = ctx.crop(crop)?;
    let actions = ctx
        .services
        .dashboard
        .guidance(&ctx.member_id()?, &crop)
        .await?;
    output::guidance(&actions);
    Ok(())
}
