//! Collapsetui — click a group of same-coloured blocks, watch the rest fall.

mod app;
mod grid;
mod input;
mod logging;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use grid::BlockGrid;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Grid options derived from CLI; reused when dealing a new grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
    pub seed: Option<u64>,
}

impl From<&Args> for GridConfig {
    fn from(args: &Args) -> Self {
        Self {
            width: usize::from(args.width),
            height: usize::from(args.height),
            seed: args.seed,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log.as_deref() {
        logging::init_log_file(path)
            .with_context(|| format!("opening log file {}", path.display()))?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|err| {
        vlog!("theme load failed, using default: {err}");
        let mut t = theme::Theme::default();
        t.apply_palette(args.palette);
        t
    });
    let config = GridConfig::from(&args);
    vlog!("start {config:?} palette={:?}", args.palette);

    let mut rng = config.seed.map(StdRng::seed_from_u64);
    let grid = match rng.as_mut() {
        Some(rng) => BlockGrid::with_rng(config.width, config.height, rng),
        None => BlockGrid::new(config.width, config.height),
    }
    .context("building the initial grid")?;
    let mut app = App::new(config, grid, theme, rng);
    app.run()?;
    Ok(())
}

/// Same-colour block clearing puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "collapsetui",
    version,
    about = "Same-colour block clearing puzzle in the terminal. \
        Click a group; the rest collapses down.",
    long_about = "Collapsetui is a terminal take on the classic same-colour clearing puzzle.\n\n\
        Click (or select with the cursor) any block: it and every block of the same colour \
        connected to it (up, down, left, right) are removed, and the blocks above fall to fill \
        the gap. Removed slots stay greyed out at the top of their column.\n\n\
        CONTROLS:\n  Mouse click  Remove group      Arrows / hjkl  Move cursor\n  \
        Enter/Space  Remove group      n              New grid\n  q / Esc      Quit"
)]
pub struct Args {
    /// Grid width in columns.
    #[arg(
        long,
        default_value_t = grid::DEFAULT_WIDTH as u16,
        value_name = "COLS",
        value_parser = clap::value_parser!(u16).range(1..=64)
    )]
    pub width: u16,

    /// Grid height in rows.
    #[arg(
        long,
        default_value_t = grid::DEFAULT_HEIGHT as u16,
        value_name = "ROWS",
        value_parser = clap::value_parser!(u16).range(1..=64)
    )]
    pub height: u16,

    /// Seed for reproducible grids. Random if not set.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Write a log of every move to this file.
    #[arg(long, value_name = "FILE")]
    pub log: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["collapsetui"]).unwrap();
        assert_eq!(
            GridConfig::from(&args),
            GridConfig {
                width: grid::DEFAULT_WIDTH,
                height: grid::DEFAULT_HEIGHT,
                seed: None
            }
        );
        assert_eq!(args.palette, Palette::Normal);
    }

    #[test]
    fn test_custom_size_and_seed() {
        let args = Args::try_parse_from([
            "collapsetui",
            "--width",
            "6",
            "--height",
            "12",
            "--seed",
            "99",
            "--palette",
            "colourblind",
        ])
        .unwrap();
        let config = GridConfig::from(&args);
        assert_eq!((config.width, config.height, config.seed), (6, 12, Some(99)));
        assert_eq!(args.palette, Palette::Colorblind);
    }

    #[test]
    fn test_rejects_zero_width() {
        assert!(Args::try_parse_from(["collapsetui", "--width", "0"]).is_err());
    }
}
