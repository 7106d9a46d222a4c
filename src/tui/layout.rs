// Screen layout: panel arrangement and sizing.
//
// Two screens, each divided into fixed zones.
//
// Home:                               Race:
// +-------------------------------+   +-------------------------------+
// | Status Bar (1 row)            |   | Status Bar (1 row)            |
// +---------------+---------------+   +---------------+---------------+
// | Tracks (50%)  | Racers (50%)  |   | Leaderboard   | Race Area     |
// |               |               |   | (55%)         | (45%)         |
// +---------------+---------------+   +---------------+---------------+
// | Help Bar (1 row)              |   | Help Bar (1 row)              |
// +-------------------------------+   +-------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved areas for the home screen zones.
#[derive(Debug, Clone)]
pub struct HomeLayout {
    /// Top row: session selection summary and notices.
    pub status_bar: Rect,
    /// Left column: the track catalog list.
    pub tracks: Rect,
    /// Right column: the racer catalog list.
    pub racers: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Resolved areas for the race screen zones.
#[derive(Debug, Clone)]
pub struct RaceLayout {
    pub status_bar: Rect,
    /// Left column: countdown, then live leaderboard, then results.
    pub leaderboard: Rect,
    /// Right column: track title, car roster, gas-pedal directions.
    pub race_area: Rect,
    pub help_bar: Rect,
}

/// Build the home screen layout from the available terminal area.
pub fn home_layout(area: Rect) -> HomeLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(8),    // catalogs
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(vertical[1]);

    HomeLayout {
        status_bar: vertical[0],
        tracks: columns[0],
        racers: columns[1],
        help_bar: vertical[2],
    }
}

/// Build the race screen layout from the available terminal area.
pub fn race_layout(area: Rect) -> RaceLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(8),    // race columns
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(vertical[1]);

    RaceLayout {
        status_bar: vertical[0],
        leaderboard: columns[0],
        race_area: columns[1],
        help_bar: vertical[2],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// A reasonable terminal size for testing.
    fn test_area() -> Rect {
        Rect::new(0, 0, 120, 40)
    }

    #[test]
    fn home_layout_all_rects_nonzero() {
        let layout = home_layout(test_area());
        for (name, rect) in [
            ("status_bar", layout.status_bar),
            ("tracks", layout.tracks),
            ("racers", layout.racers),
            ("help_bar", layout.help_bar),
        ] {
            assert!(
                rect.width > 0 && rect.height > 0,
                "{name} has zero area: {rect:?}"
            );
        }
    }

    #[test]
    fn race_layout_all_rects_nonzero() {
        let layout = race_layout(test_area());
        for (name, rect) in [
            ("status_bar", layout.status_bar),
            ("leaderboard", layout.leaderboard),
            ("race_area", layout.race_area),
            ("help_bar", layout.help_bar),
        ] {
            assert!(
                rect.width > 0 && rect.height > 0,
                "{name} has zero area: {rect:?}"
            );
        }
    }

    #[test]
    fn bars_are_one_row() {
        let home = home_layout(test_area());
        let race = race_layout(test_area());
        assert_eq!(home.status_bar.height, 1);
        assert_eq!(home.help_bar.height, 1);
        assert_eq!(race.status_bar.height, 1);
        assert_eq!(race.help_bar.height, 1);
    }

    #[test]
    fn home_columns_sit_side_by_side() {
        let layout = home_layout(test_area());
        assert!(layout.tracks.x < layout.racers.x);
        assert_eq!(layout.tracks.y, layout.racers.y);
    }

    #[test]
    fn race_leaderboard_left_of_race_area() {
        let layout = race_layout(test_area());
        assert!(layout.leaderboard.x < layout.race_area.x);
    }

    #[test]
    fn layout_fits_within_area() {
        let area = test_area();
        let home = home_layout(area);
        let race = race_layout(area);
        for rect in [
            home.status_bar,
            home.tracks,
            home.racers,
            home.help_bar,
            race.status_bar,
            race.leaderboard,
            race.race_area,
            race.help_bar,
        ] {
            assert!(rect.x + rect.width <= area.width);
            assert!(rect.y + rect.height <= area.height);
        }
    }
}
