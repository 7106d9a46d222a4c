// Widget render functions, one module per screen zone.

pub mod countdown;
pub mod fault;
pub mod leaderboard;
pub mod modal;
pub mod race_info;
pub mod racers;
pub mod results;
pub mod status_bar;
pub mod tracks;
