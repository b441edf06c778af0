//! Click-through scenarios for the FDC3 chart-and-grid demo.
//!
//! Both scenarios walk the same flow: confirm the modules menu is up, open
//! the data grid, open the chart module from it, then select a ticker symbol
//! and wait for the chart to pick it up. They differ only in pace: match
//! confidence for the first click, wait budgets and settle delays.

use {
    crate::{assets_dir, fail, Registry},
    anyhow::Context as _,
    std::{thread::sleep, time::Duration},
    tracing::info,
    uiauto::{Confidence, Pattern, Screen},
};

const MODULES_MENU: &str = "modules-menu.png";
const DATAGRID_BUTTON: &str = "datagrid-button.png";
const CHART_BUTTON: &str = "chart-button.png";
const CHART_OPENED: &str = "chart-opened.png";
const TICKER_SYMBOL: &str = "ticker-symbol.png";

/// Budget for finding the data-grid button once the modules menu is up.
const BUTTON_WAIT: Duration = Duration::from_secs(5);
/// Budget for the ticker cell and for the chart to re-render after it.
const TICKER_WAIT: Duration = Duration::from_secs(10);

/// Pace knobs of one walk through the chart-and-grid flow.
struct Pace {
    /// Confidence for the data-grid button click.
    button_confidence: Confidence,
    /// How long the chart module button may take to appear.
    chart_wait: Duration,
    /// Extra delay before selecting the ticker, for slow environments.
    settle: Option<Duration>,
}

pub fn register(registry: &mut Registry) {
    registry.add("open_chart", open_chart);
    registry.add("open_chart_relaxed", open_chart_relaxed);
}

/// Tight pace: pixel-perfect button match, 20 s chart budget, no settling.
pub fn open_chart(screen: &Screen) -> anyhow::Result<()> {
    run_chart_flow(
        screen,
        &Pace {
            button_confidence: Confidence::Exact,
            chart_wait: Duration::from_secs(20),
            settle: None,
        },
    )
}

/// Relaxed pace for slow or virtualized environments: fuzzier button match,
/// 30 s chart budget, settling before the ticker click.
pub fn open_chart_relaxed(screen: &Screen) -> anyhow::Result<()> {
    run_chart_flow(
        screen,
        &Pace {
            button_confidence: Confidence::Similar(0.69),
            chart_wait: Duration::from_secs(30),
            settle: Some(Duration::from_secs(5)),
        },
    )
}

fn pattern(file_name: &str) -> anyhow::Result<Pattern> {
    Pattern::from_file(assets_dir().join(file_name))
        .with_context(|| format!("failed to load reference screenshot {:?}", file_name))
}

fn run_chart_flow(screen: &Screen, pace: &Pace) -> anyhow::Result<()> {
    let modules_menu = pattern(MODULES_MENU)?;
    if !screen.exists(&modules_menu)? {
        return Err(fail("Module not found, can't continue"));
    }
    info!("modules menu is on screen");

    let datagrid_button = pattern(DATAGRID_BUTTON)?.with_confidence(pace.button_confidence);
    screen.wait_click(&datagrid_button, BUTTON_WAIT)?;
    info!("opened the data grid");

    let chart_button = pattern(CHART_BUTTON)?;
    screen.wait_click(&chart_button, pace.chart_wait)?;

    let chart_opened = pattern(CHART_OPENED)?;
    if !screen.exists(&chart_opened)? {
        return Err(fail("Chart not available to proceed"));
    }
    info!("chart module is up");

    if let Some(settle) = pace.settle {
        sleep(settle);
    }
    let ticker = pattern(TICKER_SYMBOL)?;
    screen.wait_click(&ticker, TICKER_WAIT)?;
    info!("selected the ticker symbol");

    screen.wait(&chart_opened, TICKER_WAIT)?;
    info!("chart rendered the selected ticker");
    Ok(())
}
