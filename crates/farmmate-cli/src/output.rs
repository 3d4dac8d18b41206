//! Terminal rendering of view models.

use colored::Colorize;
use farmmate_core::bookmark::WeekGroup;
use farmmate_core::chat::{ChatMessage, DeliveryState, Role};
use farmmate_core::crop::CropTile;
use farmmate_core::pest::{PestAlerts, PestDetail};
use farmmate_core::weather::{DaySummary, WeatherReading};

pub fn crop_tiles(tiles: &[CropTile]) {
    if tiles.is_empty() {
        println!("No crops known yet. Run `farmmate init`.");
        return;
    }
    for tile in tiles {
        let marker = if tile.created {
            "●".green()
        } else {
            "○".dimmed()
        };
        println!("{marker} {} (#{})", tile.name, tile.crop_id);
    }
}

pub fn chat_message(index: usize, message: &ChatMessage) {
    let who = match message.role {
        Role::User => "you".cyan().bold(),
        Role::Assistant => "farmmate".green().bold(),
        Role::System => "system".dimmed(),
    };
    let mut line = format!("[{index}] {who}: {}", message.text);
    if message.bookmark.is_bookmarked() {
        line.push_str(&format!(" {}", "★".yellow()));
    }
    match message.delivery {
        DeliveryState::Delivered => {}
        DeliveryState::Pending => line.push_str(&format!(" {}", "(sending)".dimmed())),
        DeliveryState::Failed => line.push_str(&format!(" {}", "(not sent)".red())),
    }
    println!("{line}");
}

pub fn weather(reading: &WeatherReading) {
    let w = &reading.weather;
    println!(
        "{} {}  {:.1}°C  humidity {:.0}%  precipitation {:.1}mm",
        w.sky().icon(),
        w.sky().label().bold(),
        w.temperature,
        w.humidity,
        w.precipitation
    );
    if reading.is_fallback {
        println!("{}", "(weather service unavailable, showing default reading)".dimmed());
    }
}

fn temperature(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |t| format!("{t:.0}°C"))
}

pub fn forecast(days: &[DaySummary]) {
    for day in days {
        println!(
            "{}  AM {}  PM {}  max {}  min {}",
            day.forecast_date.bold(),
            day.morning,
            day.afternoon,
            temperature(day.max_temperature),
            temperature(day.min_temperature)
        );
    }
}

pub fn pest_alerts(crop_name: &str, alerts: &PestAlerts) {
    if alerts.is_empty() {
        println!("No pest alerts for {crop_name}.");
        return;
    }
    let levels = [
        ("warning", &alerts.warnings),
        ("advisory", &alerts.advisories),
        ("forecast", &alerts.forecasts),
    ];
    for (level, names) in levels {
        if names.is_empty() {
            continue;
        }
        let label = match level {
            "warning" => level.red().bold(),
            "advisory" => level.yellow().bold(),
            _ => level.normal(),
        };
        println!("{label}: {}", names.join(", "));
    }
}

fn section(title: &str, body: &str) {
    if body.trim().is_empty() {
        return;
    }
    println!("{}\n{}\n", title.bold(), body.trim());
}

pub fn pest_detail(detail: &PestDetail) {
    println!(
        "{} ({} / {})  {}\n",
        detail.sick_name_kor.bold(),
        detail.sick_name_chn,
        detail.sick_name_eng,
        detail.crop_name.dimmed()
    );
    section("Development condition", &detail.development_condition);
    section("Symptoms", &detail.symptoms);
    section("Prevention", &detail.prevention_method);
    if let Some(image) = detail.preview_image() {
        println!("{} {}", "Preview:".bold(), image.image);
    }
}

pub fn guidance(actions: &[String]) {
    if actions.is_empty() {
        println!("No recommended actions right now.");
        return;
    }
    for (i, action) in actions.iter().enumerate() {
        println!("{}. {action}", i + 1);
    }
}

pub fn bookmark_weeks(groups: &[WeekGroup]) {
    if groups.is_empty() {
        println!("No bookmarks yet.");
        return;
    }
    for group in groups {
        println!("{}", group.title().bold());
        for bookmark in &group.bookmarks {
            println!("  {} {}", "Q".cyan(), bookmark.question);
            println!("  {} {}", "A".green(), bookmark.answer);
        }
    }
}
