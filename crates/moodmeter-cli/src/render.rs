//! Terminal rendering of the board and roster.

use colored::{ColoredString, Colorize};

use moodmeter_core::mood::{GRID_SIZE, MoodSelection, Quadrant};
use moodmeter_core::presentation::{MoodCard, mood_cards, roster};

const CELL_WIDTH: usize = 14;

/// Parses `hsl(H, S%, L%)` into RGB.
fn hsl_to_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let inner = color.trim().strip_prefix("hsl(")?.strip_suffix(')')?;
    let mut parts = inner.split(',').map(|p| p.trim().trim_end_matches('%'));
    let h: f64 = parts.next()?.parse().ok()?;
    let s: f64 = parts.next()?.parse::<f64>().ok()? / 100.0;
    let l: f64 = parts.next()?.parse::<f64>().ok()? / 100.0;

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match (h.rem_euclid(360.0) / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let scale = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Some((scale(r), scale(g), scale(b)))
}

fn paint(text: &str, color: &str) -> ColoredString {
    match hsl_to_rgb(color) {
        Some((r, g, b)) => text.truecolor(r, g, b),
        None => text.normal(),
    }
}

fn quadrant_label(text: &str, quadrant: Quadrant) -> ColoredString {
    match quadrant {
        Quadrant::HighEnergyUnpleasant => text.red(),
        Quadrant::HighEnergyPleasant => text.yellow(),
        Quadrant::LowEnergyUnpleasant => text.blue(),
        Quadrant::LowEnergyPleasant => text.green(),
    }
}

fn render_cell(card: &MoodCard) -> String {
    let label: String = card.mood.label().chars().take(CELL_WIDTH - 2).collect();
    let padded = format!("{:<width$}", label, width = CELL_WIDTH - 2);

    if !card.is_selected() {
        return format!("{} ", quadrant_label(&padded, card.quadrant).dimmed());
    }

    // One marker per selection, in stripe order.
    let markers: String = card
        .stripes()
        .iter()
        .take(3)
        .map(|stripe| paint("●", &stripe.color).to_string())
        .collect();
    format!("{}{} ", quadrant_label(&padded, card.quadrant).bold(), markers)
}

pub fn print_board(view: &[MoodSelection]) {
    let cards = mood_cards(view);
    println!("{}", "        LOW PLEASANTNESS  →  HIGH PLEASANTNESS".bright_black());
    for row in cards.chunks(GRID_SIZE) {
        let line: String = row.iter().map(render_cell).collect();
        println!("  {}", line);
    }
    println!();
}

pub fn print_roster(view: &[MoodSelection]) {
    let entries = roster(view);
    if entries.is_empty() {
        println!("{}", "No one has shared a mood yet.".bright_black());
        return;
    }

    println!("{}", format!("Who's here ({})", entries.len()).bright_magenta().bold());
    for entry in &entries {
        println!(
            "  {} {}  {}",
            paint("●", &entry.user_color),
            entry.user_name.bold(),
            entry.feeling().bright_black()
        );
    }
}
