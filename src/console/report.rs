// console/report.rs

use crate::analyzer::market_indicators::{group_sizes, lego_set_ids, unique_websites};
use crate::analyzer::{GroupedCollection, MarketSummary};
use crate::model::{Deal, Dealer, PaginationMeta};
use chrono::{DateTime, Utc};

fn fmt_price(price: Option<f64>) -> String {
    price.map(|p| format!("{:.2} €", p)).unwrap_or_else(|| "n/a".into())
}

fn fmt_deal(deal: &Deal) -> String {
    let discount = deal.discount
        .map(|d| format!(" (-{:.0}%)", d))
        .unwrap_or_default();
    format!(
        "[{}] {} | {}{} | {}",
        deal.id, deal.title, fmt_price(deal.price), discount, deal.link
    )
}

/// One line per deal.
pub fn render_deals(deals: &[Deal]) -> String {
    if deals.is_empty() {
        return "📭 No deals to show.".into();
    }
    let lines: Vec<String> = deals.iter().map(fmt_deal).collect();
    format!("🧱 Deals ({}):\n{}", deals.len(), lines.join("\n"))
}

pub fn render_pagination(meta: &PaginationMeta) -> String {
    format!(
        "📄 Page {}/{} · {} per page · {} deals in total",
        meta.current_page, meta.page_count, meta.page_size, meta.total_count
    )
}

/// Deal count, websites and lego set ids of the shown deals.
pub fn render_indicators(deals: &[Deal], meta: &PaginationMeta) -> String {
    let websites = unique_websites(deals);
    let ids = lego_set_ids(deals);
    format!(
        "🔢 {} deals · {} websites: {}\n🆔 Lego set ids: {}",
        meta.total_count,
        websites.len(),
        websites.join(", "),
        ids.join(", ")
    )
}

pub fn render_groups(groups: &GroupedCollection<Deal>) -> String {
    let mut out = Vec::new();
    for (name, count) in group_sizes(groups) {
        out.push(format!("🏢 {} has {} deals", name, count));
        if let Some(deals) = groups.get(&name) {
            for deal in deals {
                out.push(format!("    {}", fmt_deal(deal)));
            }
        }
    }
    if out.is_empty() {
        return "📭 No communities.".into();
    }
    out.join("\n")
}

pub fn render_market_summary(lego_set_id: &str, summary: &MarketSummary, profit: Option<f64>) -> String {
    let mut msg = format!(
        "💶 Resale listings for {}: {}\n\
         📊 Average: {:.2} € (σ {:.2})\n\
         p5: {:.2} € · p25: {:.2} € · max: {:.2} €\n\
         🕰 Has very old listings: {}",
        lego_set_id,
        summary.count,
        summary.average,
        summary.std_dev,
        summary.p5,
        summary.p25,
        summary.max,
        summary.has_old_listing
    );
    if let Some(age) = summary.oldest_listing_age {
        msg.push_str(&format!("\n📅 Oldest listing: {} days", age.num_days()));
    }
    if let Some(profit) = profit {
        msg.push_str(&format!("\n💰 Highest potential profitability: {:.2} €", profit));
    }
    msg
}

/// Favorite dealers, with the time they were last saved when known.
pub fn render_dealers(dealers: &[Dealer], saved_at: Option<DateTime<Utc>>) -> String {
    if dealers.is_empty() {
        return "⭐ No favorite dealers saved.".into();
    }
    let mut lines: Vec<String> = dealers.iter().map(|d| format!("⭐ {} - {}", d.name, d.url)).collect();
    if let Some(saved_at) = saved_at {
        lines.push(format!("💾 Saved {}", saved_at.format("%Y-%m-%d %H:%M UTC")));
    }
    lines.join("\n")
}
