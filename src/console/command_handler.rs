// console/command_handler.rs

use crate::analyzer::price_analysis::{average, percentile, profitability};
use crate::analyzer::{DealFilter, MarketSummary, SortOrder};
use crate::config::Thresholds;
use crate::console::report::{
    render_dealers, render_deals, render_groups, render_indicators, render_market_summary,
    render_pagination,
};
use crate::console::{ConsoleContext, FAVORITE_DEALERS_KEY};
use crate::model::{Dealer, Field, StatsError};
use crate::scraper::{DealSource, FetchReport, FetchStatus};
use crate::state::{CollectionState, ViewRequest};
use chrono::{Duration, Utc};
use tracing::{info, warn};

pub const HELP: &str = "📋 Available commands:\n\
    /show N - deals per page\n\
    /page N - go to page N\n\
    /filter discount|commented|hot - named filters\n\
    /filter range <price|discount|comments|temperature> MIN MAX\n\
    /filter community NAME\n\
    /sort price-asc|price-desc|date-asc|date-desc\n\
    /group [sort order] - deals by community\n\
    /stats - statistics of the shown deals\n\
    /sales ID - resale listings for a lego set\n\
    /favorites - saved favorite dealers\n\
    /reset - drop filters and sorting\n\
    /uptime - session uptime\n\
    /quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Show(u32),
    Page(u32),
    Filter(DealFilter),
    Sort(SortOrder),
    Group(Option<SortOrder>),
    Stats,
    Sales(String),
    Favorites,
    Reset,
    Uptime,
    Help,
    Quit,
}

fn parse_number<T: std::str::FromStr>(arg: Option<&str>, what: &str) -> Result<T, String> {
    arg.ok_or_else(|| format!("missing {}", what))?
        .parse::<T>()
        .map_err(|_| format!("invalid {}", what))
}

fn parse_field(name: Option<&str>) -> Result<Field, String> {
    match name {
        Some("price") => Ok(Field::Price),
        Some("discount") => Ok(Field::Discount),
        Some("comments") => Ok(Field::Comments),
        Some("temperature") => Ok(Field::Temperature),
        Some(other) => Err(format!("unknown field '{}'", other)),
        None => Err("missing field".into()),
    }
}

fn parse_filter(args: &[&str], thresholds: &Thresholds) -> Result<DealFilter, String> {
    match args.first().copied() {
        Some("discount") => Ok(DealFilter::BestDiscount { min: thresholds.best_discount }),
        Some("commented") => Ok(DealFilter::MostCommented { min: thresholds.most_commented }),
        Some("hot") => Ok(DealFilter::Hot { min: thresholds.hot_temperature }),
        Some("range") => {
            let field = parse_field(args.get(1).copied())?;
            let min: f64 = parse_number(args.get(2).copied(), "minimum")?;
            let max: f64 = parse_number(args.get(3).copied(), "maximum")?;
            if min > max {
                return Err("minimum is above maximum".into());
            }
            Ok(DealFilter::Range { field, min, max })
        }
        Some("community") if args.len() > 1 => Ok(DealFilter::Community(args[1..].join(" "))),
        Some(other) => Err(format!("unknown filter '{}'", other)),
        None => Err("missing filter name".into()),
    }
}

/// Parses one console line such as `/sort price-desc`.
pub fn parse_command(text: &str, thresholds: &Thresholds) -> Result<Command, String> {
    let mut parts = text.split_whitespace();
    let name = parts.next().ok_or_else(|| "empty command".to_string())?;
    let args: Vec<&str> = parts.collect();
    let first = args.first().copied();

    match name {
        "/show" => Ok(Command::Show(parse_number(first, "page size")?)),
        "/page" => Ok(Command::Page(parse_number(first, "page number")?)),
        "/filter" => Ok(Command::Filter(parse_filter(&args, thresholds)?)),
        "/sort" => first
            .ok_or_else(|| "missing sort order".to_string())?
            .parse()
            .map(Command::Sort),
        "/group" => match first {
            Some(order) => order.parse().map(|o| Command::Group(Some(o))),
            None => Ok(Command::Group(None)),
        },
        "/stats" => Ok(Command::Stats),
        "/sales" => first
            .map(|id| Command::Sales(id.to_string()))
            .ok_or_else(|| "missing lego set id".to_string()),
        "/favorites" => Ok(Command::Favorites),
        "/reset" => Ok(Command::Reset),
        "/uptime" => Ok(Command::Uptime),
        "/help" => Ok(Command::Help),
        "/quit" | "/exit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{}', try /help", other)),
    }
}

fn fmt_stat(value: Result<f64, StatsError>, unit: &str) -> String {
    match value {
        Ok(v) => format!("{:.2}{}", v, unit),
        Err(StatsError::EmptyInput) => "n/a".into(),
        Err(e) => e.to_string(),
    }
}

/// Deals, pagination and indicators as they currently stand.
pub fn render_state(state: &CollectionState) -> String {
    let meta = state.pagination();
    format!(
        "{}\n{}\n{}",
        render_deals(state.current_view()),
        render_pagination(&meta),
        render_indicators(state.current_view(), &meta)
    )
}

fn render_fetch(report: &FetchReport, state: &CollectionState) -> String {
    let prefix = match &report.status {
        FetchStatus::Applied => String::new(),
        FetchStatus::Stale => "⏭ A newer page was already shown; response ignored.\n".into(),
        FetchStatus::Failed(e) => format!("⚠️ Fetch failed ({}); showing previous deals.\n", e),
    };
    format!("{}{}", prefix, render_state(state))
}

/// Runs `command` and returns the text to display.
pub async fn handle_command<S: DealSource>(command: Command, ctx: &ConsoleContext<S>) -> String {
    info!("Handling command: {:?}", command);
    let state = ctx.coordinator.state();
    match command {
        Command::Show(size) => {
            let report = ctx.coordinator.change_page_size(size).await;
            render_fetch(&report, &*state.lock().await)
        }
        Command::Page(page) => {
            let report = ctx.coordinator.change_page(page).await;
            render_fetch(&report, &*state.lock().await)
        }
        Command::Filter(filter) => {
            let mut state = state.lock().await;
            render_deals(state.apply_view(ViewRequest::Filter(filter)))
        }
        Command::Sort(order) => {
            let mut state = state.lock().await;
            render_deals(state.apply_view(ViewRequest::Sort(order)))
        }
        Command::Group(order) => {
            let mut state = state.lock().await;
            render_groups(state.group(order))
        }
        Command::Stats => {
            let state = state.lock().await;
            let deals = state.current_view();
            format!(
                "📊 {} deals shown\n💸 Average price: {}\n📉 Average discount: {}\n🔻 p5 price: {} · p25 price: {}",
                deals.len(),
                fmt_stat(average(deals, Field::Price), " €"),
                fmt_stat(average(deals, Field::Discount), "%"),
                fmt_stat(percentile(deals, Field::Price, 0.05), " €"),
                fmt_stat(percentile(deals, Field::Price, 0.25), " €"),
            )
        }
        Command::Sales(lego_set_id) => sales_report(&lego_set_id, ctx).await,
        Command::Favorites => {
            let storage = ctx.storage.lock().await;
            let loaded = storage
                .get_json::<Vec<Dealer>>(FAVORITE_DEALERS_KEY)
                .and_then(|dealers| Ok((dealers, storage.updated_at(FAVORITE_DEALERS_KEY)?)));
            match loaded {
                Ok((dealers, saved_at)) => render_dealers(&dealers.unwrap_or_default(), saved_at),
                Err(e) => {
                    warn!("Favorites load failed: {}", e);
                    format!("⚠️ Could not load favorites: {}", e)
                }
            }
        }
        Command::Reset => {
            let mut state = state.lock().await;
            state.clear_view();
            render_state(&state)
        }
        Command::Uptime => {
            let uptime = ctx.start_time.elapsed();
            format!(
                "⏱ Uptime: {:02}:{:02}:{:02}",
                uptime.as_secs() / 3600,
                (uptime.as_secs() % 3600) / 60,
                uptime.as_secs() % 60
            )
        }
        Command::Help => HELP.to_string(),
        Command::Quit => "👋 Bye!".to_string(),
    }
}

async fn sales_report<S: DealSource>(lego_set_id: &str, ctx: &ConsoleContext<S>) -> String {
    let items = match ctx.coordinator.fetch_sales(lego_set_id).await {
        Ok(items) => items,
        Err(e) => {
            warn!("Sales fetch for {} failed: {}", lego_set_id, e);
            return format!("⚠️ Could not fetch sales for {}: {}", lego_set_id, e);
        }
    };

    let max_age = Duration::days(ctx.config.thresholds.old_listing_days);
    let summary = match MarketSummary::compute(&items, max_age, Utc::now()) {
        Ok(summary) => summary,
        Err(e) => return format!("📭 No priced listings for {} ({})", lego_set_id, e),
    };

    // cheapest deal on the current page for the same set, if any
    let purchase_price = {
        let state = ctx.coordinator.state();
        let state = state.lock().await;
        state.canonical_deals()
            .iter()
            .filter(|d| d.id == lego_set_id)
            .filter_map(|d| d.price)
            .min_by(|a, b| a.total_cmp(b))
    };
    let profit = purchase_price.map(|price| profitability(&items, price));
    render_market_summary(lego_set_id, &summary, profit)
}
