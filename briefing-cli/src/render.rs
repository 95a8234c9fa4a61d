//! Plain-text rendering of weather and headlines.

use briefing_core::{
    Article, Category, CurrentConditions, DaySummary, FeaturedArticle, HeadlinesPage, WeatherReport,
    model::round_half_up,
};
use std::fmt::Write;

pub fn current(c: &CurrentConditions) -> String {
    let mut out = String::new();
    let place = if c.country.is_empty() {
        c.location_name.clone()
    } else {
        format!("{}, {}", c.location_name, c.country)
    };

    let _ = writeln!(out, "{} {}  {}°C", c.condition.emoji(), place, round_half_up(c.temperature_c));
    let _ = writeln!(out, "   {}", c.description);
    let _ = writeln!(out, "   💧 Humidity    {}%", c.humidity_pct);
    let _ = writeln!(out, "   🌡️ Feels like  {}°C", round_half_up(c.feels_like_c));
    let _ = writeln!(out, "   💨 Wind        {} m/s", c.wind_speed_mps);
    let _ = writeln!(out, "   🔽 Pressure    {} hPa", c.pressure_hpa);
    if let Some(v) = c.visibility_m {
        let _ = writeln!(out, "   👁️ Visibility  {:.1} km", f64::from(v) / 1000.0);
    }
    out
}

fn day_line(d: &DaySummary) -> String {
    format!(
        "{}  {} {:>3}°C  ({:>3} / {:>3})  {}",
        d.date.format("%a %d %b"),
        d.condition.emoji(),
        d.avg_temp_c,
        d.min_temp_c,
        d.max_temp_c,
        d.description
    )
}

pub fn report(r: &WeatherReport) -> String {
    let mut out = current(&r.current);
    if r.days.is_empty() {
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Forecast for {}", r.location.display_name());
    for day in &r.days {
        let _ = writeln!(out, "  {}", day_line(day));
    }
    out
}

fn article_lines(out: &mut String, n: usize, a: &Article) {
    let _ = writeln!(out, "{n:>3}. {}", a.title);
    let source = a.source_name.as_deref().unwrap_or("Unknown source");
    match a.published_at {
        Some(at) => {
            let _ = writeln!(out, "     {} · {}", source, at.format("%Y-%m-%d %H:%M UTC"));
        }
        None => {
            let _ = writeln!(out, "     {source}");
        }
    }
    let _ = writeln!(out, "     {}", a.url);
}

pub fn headlines(page: &HeadlinesPage, category: Option<Category>) -> String {
    let mut out = String::new();
    let heading = match category {
        Some(c) => format!("{} Top {c} headlines", c.emoji()),
        None => format!("{} Top headlines", Category::General.emoji()),
    };
    let _ = writeln!(
        out,
        "{heading} (page {} of {})",
        page.page,
        page.total_pages().max(1)
    );

    if page.articles.is_empty() {
        let _ = writeln!(out, "  No articles found.");
    }

    let offset = (page.page.saturating_sub(1) * page.page_size) as usize;
    for (i, a) in page.articles.iter().enumerate() {
        article_lines(&mut out, offset + i + 1, a);
    }

    let mut nav = Vec::new();
    if page.has_previous() {
        nav.push(format!("--page {} for previous", page.page - 1));
    }
    if page.has_next() {
        nav.push(format!("--page {} for more", page.page + 1));
    }
    if !nav.is_empty() {
        let _ = writeln!(out, "\n  {}", nav.join(", "));
    }
    out
}

pub fn featured(top: &[Article], featured: &[FeaturedArticle]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} Top stories", Category::General.emoji());
    if top.is_empty() {
        let _ = writeln!(out, "  No articles found.");
    }
    for (i, a) in top.iter().enumerate() {
        article_lines(&mut out, i + 1, a);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Featured");
    if featured.is_empty() {
        let _ = writeln!(out, "  No featured stories.");
    }
    for f in featured {
        let _ = writeln!(out, "  {} {:<13} {}", f.category.emoji(), f.category.as_str(), f.article.title);
        let _ = writeln!(out, "     {}", f.article.url);
    }
    out
}
