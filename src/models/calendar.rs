//! Day, block, and time window models.
//!
//! Defines the time vocabulary shared by every resolution stage: the five
//! resolvable weekdays, the AM/PM blocks, the lunch sub-slots, and weekly
//! availability calendars.
//!
//! # Time Model
//! All times are minutes after midnight of the resolved day.
//!
//! # Precedence
//! A weekly calendar with no windows is always available. Otherwise a day is
//! available only inside the window declared for that day.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A time interval [start, end) in minutes after midnight.
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Interval start (minutes, inclusive).
    pub start_min: u16,
    /// Interval end (minutes, exclusive).
    pub end_min: u16,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start_min: u16, end_min: u16) -> Self {
        Self { start_min, end_min }
    }

    /// Creates a window from wall-clock hours and minutes.
    pub fn hm(start_h: u16, start_m: u16, end_h: u16, end_m: u16) -> Self {
        Self::new(start_h * 60 + start_m, end_h * 60 + end_m)
    }

    /// Duration of this window (minutes).
    #[inline]
    pub fn duration_min(&self) -> u16 {
        self.end_min.saturating_sub(self.start_min)
    }

    /// Whether the window is non-empty.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.start_min < self.end_min
    }

    /// Whether a minute falls within this window.
    #[inline]
    pub fn contains(&self, minute: u16) -> bool {
        minute >= self.start_min && minute < self.end_min
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_min < other.end_min && other.start_min < self.end_min
    }

    /// Whether this window fully covers `other`.
    pub fn covers(&self, other: &Self) -> bool {
        self.start_min <= other.start_min && self.end_min >= other.end_min
    }

    /// Splits the window at its midpoint into two halves.
    pub fn halves(&self) -> (Self, Self) {
        let mid = self.start_min + self.duration_min() / 2;
        (Self::new(self.start_min, mid), Self::new(mid, self.end_min))
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start_min / 60,
            self.start_min % 60,
            self.end_min / 60,
            self.end_min % 60
        )
    }
}

/// A resolvable weekday.
///
/// Weekends have no key: the engine does not resolve them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayKey {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl DayKey {
    /// All resolvable days, Monday first.
    pub const ALL: [DayKey; 5] = [
        DayKey::Mon,
        DayKey::Tue,
        DayKey::Wed,
        DayKey::Thu,
        DayKey::Fri,
    ];

    /// Maps a weekday index (0 = Sunday .. 6 = Saturday) to a day key.
    ///
    /// Returns `None` for Sunday, Saturday, and out-of-range indices.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(DayKey::Mon),
            2 => Some(DayKey::Tue),
            3 => Some(DayKey::Wed),
            4 => Some(DayKey::Thu),
            5 => Some(DayKey::Fri),
            _ => None,
        }
    }

    /// Short lowercase key (`"mon"` .. `"fri"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            DayKey::Mon => "mon",
            DayKey::Tue => "tue",
            DayKey::Wed => "wed",
            DayKey::Thu => "thu",
            DayKey::Fri => "fri",
        }
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-day block of a template assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Block {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl Block {
    /// Both blocks in day order.
    pub const BOTH: [Block; 2] = [Block::Am, Block::Pm];

    /// The other block of the day.
    pub fn other(&self) -> Self {
        match self {
            Block::Am => Block::Pm,
            Block::Pm => Block::Am,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Block::Am => "AM",
            Block::Pm => "PM",
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One of the two halves of the lunch window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LunchSlot {
    /// Late-morning half.
    First,
    /// Early-afternoon half.
    Second,
}

impl LunchSlot {
    pub const BOTH: [LunchSlot; 2] = [LunchSlot::First, LunchSlot::Second];

    pub fn other(&self) -> Self {
        match self {
            LunchSlot::First => LunchSlot::Second,
            LunchSlot::Second => LunchSlot::First,
        }
    }

    /// The block this sub-slot belongs to.
    pub fn block(&self) -> Block {
        match self {
            LunchSlot::First => Block::Am,
            LunchSlot::Second => Block::Pm,
        }
    }
}

impl fmt::Display for LunchSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LunchSlot::First => f.write_str("lunch-1"),
            LunchSlot::Second => f.write_str("lunch-2"),
        }
    }
}

/// Row position of a schedule slot, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Am,
    LunchFirst,
    LunchSecond,
    Pm,
}

impl From<Block> for Period {
    fn from(block: Block) -> Self {
        match block {
            Block::Am => Period::Am,
            Block::Pm => Period::Pm,
        }
    }
}

impl From<LunchSlot> for Period {
    fn from(slot: LunchSlot) -> Self {
        match slot {
            LunchSlot::First => Period::LunchFirst,
            LunchSlot::Second => Period::LunchSecond,
        }
    }
}

/// Per-weekday availability calendar.
///
/// An empty calendar means "always available". A non-empty calendar makes the
/// entity available only on the listed days, inside the listed window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyCalendar {
    windows: BTreeMap<DayKey, TimeWindow>,
}

impl WeeklyCalendar {
    /// Creates an unconstrained calendar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the window for a day (replacing any previous one).
    pub fn with_day(mut self, day: DayKey, window: TimeWindow) -> Self {
        self.windows.insert(day, window);
        self
    }

    /// Whether no day is constrained.
    pub fn is_unconstrained(&self) -> bool {
        self.windows.is_empty()
    }

    /// The declared window for a day, if any.
    pub fn window_for(&self, day: DayKey) -> Option<&TimeWindow> {
        self.windows.get(&day)
    }

    /// Iterates declared windows in day order.
    pub fn iter(&self) -> impl Iterator<Item = (&DayKey, &TimeWindow)> {
        self.windows.iter()
    }

    /// Whether the calendar fully covers `window` on `day`.
    pub fn covers(&self, day: DayKey, window: &TimeWindow) -> bool {
        if self.is_unconstrained() {
            return true;
        }
        self.window_for(day).is_some_and(|w| w.covers(window))
    }

    /// Whether the calendar touches `window` at all on `day`.
    pub fn overlaps(&self, day: DayKey, window: &TimeWindow) -> bool {
        if self.is_unconstrained() {
            return true;
        }
        self.window_for(day).is_some_and(|w| w.overlaps(window))
    }
}
