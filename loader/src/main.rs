// cost-data entry point: load every dashboard dataset once and print a summary
use anyhow::{Context, Result};
use loader::config::LoaderSettings;
use loader::notify::{NotificationBoard, NotificationPort, ToastKind, TracingNotifier};
use loader::DataLoader;
use shared::models::{Datasets, Row, Scalar};
use shared::utils::{
    average, calculate_margin, format_currency, format_number, format_percent, sum,
    DEFAULT_CURRENCY_DECIMALS, DEFAULT_PERCENT_DECIMALS,
};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

const DASHBOARD_CONTAINER: &str = "#dashboard";
const PRODUCT_COST_COLUMN: &str = "unit_cost";
const PRODUCT_PRICE_COLUMN: &str = "sales_price";

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    info!("Starting cost-data loader...");

    let settings = match std::env::args().nth(1) {
        Some(path) => LoaderSettings::load_from_file(&path)
            .with_context(|| format!("loading settings from {}", path))?,
        None => LoaderSettings::load_default().context("loading embedded default settings")?,
    };

    let loader = DataLoader::from_settings(&settings)?;
    let board = NotificationBoard::from_settings(&settings);
    let notifier = (TracingNotifier, board.clone());

    notifier.show_loading(DASHBOARD_CONTAINER);
    let outcome = match loader.load_all().await {
        Ok(datasets) => {
            board.clear_container(DASHBOARD_CONTAINER);
            print_summary(&datasets);
            notifier.show_toast("数据加载完成", ToastKind::Success);
            Ok(())
        }
        Err(e) => {
            notifier.show_error(DASHBOARD_CONTAINER, &e.to_string());
            notifier.show_toast("数据加载失败", ToastKind::Error);
            Err(e).context("loading dashboard datasets")
        }
    };
    log_board(&board);
    outcome
}

fn log_board(board: &NotificationBoard) {
    if let Some(html) = board.render_container(DASHBOARD_CONTAINER) {
        debug!(container = DASHBOARD_CONTAINER, html = %html, "Rendered indicator");
    }
    for toast in board.toasts() {
        debug!(toast_id = toast.id, html = %toast.render_html(), "Rendered toast");
    }
}

fn print_summary(datasets: &Datasets) {
    for (kind, rows) in datasets.iter() {
        println!(
            "{:<36} {:>8} rows",
            kind.filename(),
            format_number(Some(rows.len() as f64), 0)
        );
        for column in numeric_columns(rows) {
            println!(
                "    {:<32} sum {:>16}  avg {:>12}",
                column,
                format_number(Some(sum(rows, &column)), 2),
                format_number(Some(average(rows, &column)), 2)
            );
        }
    }

    if let Some(summary) = ProductSummary::from_rows(&datasets.products) {
        println!("products");
        println!(
            "    total cost   {:>16}",
            format_currency(Some(summary.total_cost), DEFAULT_CURRENCY_DECIMALS)
        );
        println!(
            "    total sales  {:>16}",
            format_currency(Some(summary.total_sales), DEFAULT_CURRENCY_DECIMALS)
        );
        println!(
            "    margin       {:>16}",
            format_percent(Some(summary.overall_margin), DEFAULT_PERCENT_DECIMALS)
        );
        println!(
            "    avg margin   {:>16}",
            format_percent(Some(summary.average_margin), DEFAULT_PERCENT_DECIMALS)
        );
    }
}

// Columns whose present values are all numbers.
fn numeric_columns(rows: &[Row]) -> Vec<String> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    first
        .iter()
        .map(|(column, _)| column)
        .filter(|column| {
            rows.iter().all(|row| {
                matches!(row.get(column), None | Some(Scalar::Null) | Some(Scalar::Number(_)))
            }) && rows.iter().any(|row| matches!(row.get(column), Some(Scalar::Number(_))))
        })
        .map(str::to_string)
        .collect()
}

/// Cost and sales totals over the product list, with gross margins in percent.
#[derive(Debug, Clone, PartialEq)]
struct ProductSummary {
    total_cost: f64,
    total_sales: f64,
    overall_margin: f64,
    average_margin: f64,
}

impl ProductSummary {
    /// `None` when the product list lacks the cost or price column.
    fn from_rows(rows: &[Row]) -> Option<Self> {
        let has_columns = rows.first().is_some_and(|row| {
            row.get(PRODUCT_COST_COLUMN).is_some() && row.get(PRODUCT_PRICE_COLUMN).is_some()
        });
        if !has_columns {
            return None;
        }

        let total_cost = sum(rows, PRODUCT_COST_COLUMN);
        let total_sales = sum(rows, PRODUCT_PRICE_COLUMN);
        let margins: f64 = rows
            .iter()
            .map(|row| {
                let cost = row.get(PRODUCT_COST_COLUMN).map_or(0.0, Scalar::as_number);
                let sales = row.get(PRODUCT_PRICE_COLUMN).map_or(0.0, Scalar::as_number);
                calculate_margin(cost, sales)
            })
            .sum();

        Some(ProductSummary {
            total_cost,
            total_sales,
            overall_margin: calculate_margin(total_cost, total_sales),
            average_margin: margins / rows.len() as f64,
        })
    }
}
