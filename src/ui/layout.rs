use ratatui::layout::{Constraint, Direction, Layout, Rect};

use cardorbit::engine::physics::{Bounds, Physics};

/// Pixel size of one terminal cell in the orbit's virtual space.
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub footer: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(area);

        Self {
            header: vertical[0],
            main: vertical[1],
            footer: vertical[2],
        }
    }
}

/// Orbit bounds in pixels for a screen region in cells.
pub fn orbit_bounds(area: Rect, card_width: f64, card_height: f64) -> Bounds {
    Bounds::new(
        f64::from(area.width) * CELL_WIDTH_PX,
        f64::from(area.height) * CELL_HEIGHT_PX,
        card_width,
        card_height,
    )
}

/// Where a floating card lands on screen, clipped to `area`.
pub fn card_rect(area: Rect, physics: &Physics, bounds: &Bounds) -> Rect {
    let col = (physics.x / CELL_WIDTH_PX).round() as u16;
    let row = (physics.y / CELL_HEIGHT_PX).round() as u16;
    let w = (bounds.card_width / CELL_WIDTH_PX).round().max(3.0) as u16;
    let h = (bounds.card_height / CELL_HEIGHT_PX).round().max(3.0) as u16;
    let rect = Rect::new(area.x.saturating_add(col), area.y.saturating_add(row), w, h);
    rect.intersection(area)
}

pub fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    const INDENT: &str = "  ";
    const GAP: &str = "  ";
    if width == 0 {
        return Vec::new();
    }

    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    for hint in hints.iter().filter(|h| !h.is_empty()) {
        let candidate = if current.is_empty() {
            format!("{INDENT}{hint}")
        } else {
            format!("{current}{GAP}{hint}")
        };
        if candidate.chars().count() <= width || current.is_empty() {
            current = candidate;
        } else {
            out.push(std::mem::replace(&mut current, format!("{INDENT}{hint}")));
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 40;
    const MIN_POPUP_HEIGHT: u16 = 9;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area.x.saturating_add(area.width.saturating_sub(target_w) / 2);
    let top = area.y.saturating_add(area.height.saturating_sub(target_h) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_wrap_to_width() {
        let lines = pack_hint_lines(&["[q] Quit", "[Enter] Flip", "", "[r] Requeue"], 26);
        assert_eq!(lines, vec!["  [q] Quit  [Enter] Flip", "  [r] Requeue"]);
        assert!(pack_hint_lines(&["x"], 0).is_empty());
    }

    #[test]
    fn cards_map_from_pixels_to_cells() {
        let area = Rect::new(2, 3, 80, 20);
        let bounds = orbit_bounds(area, 128.0, 80.0);
        assert_eq!(bounds.width, 640.0);
        assert_eq!(bounds.height, 320.0);

        let physics = Physics { x: 16.0, y: 32.0, vx: 0.0, vy: 0.0 };
        let rect = card_rect(area, &physics, &bounds);
        assert_eq!(rect, Rect::new(4, 5, 16, 5));
        assert!(contains(rect, 4, 5));
        assert!(!contains(rect, 20, 5));
    }

    #[test]
    fn popup_never_exceeds_area() {
        let area = Rect::new(0, 0, 30, 8);
        let popup = centered_rect(50, 50, area);
        assert_eq!(popup, area);
    }
}
