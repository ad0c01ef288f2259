//! Dual-row auto-scrolling carousel.
//!
//! Each row scrolls a strip holding two identical copies of its content, so
//! jumping by exactly half the strip width is invisible. The rows never read
//! a clock themselves: callers feed elapsed time into [`Row::tick`], which
//! makes every state transition reproducible in tests.

use std::time::Duration;

/// Multiplier applied to speed on every frame.
pub const DAMPING: f64 = 0.7;
/// Resting speed, in columns per frame before damping.
pub const BASE_SPEED: f64 = 0.3;

const FORWARD_SPEED: f64 = 7.0;
const FORWARD_EASE_SPEED: f64 = 5.0;
const FORWARD_EASE_AT: Duration = Duration::from_millis(800);
const FORWARD_END_AT: Duration = Duration::from_millis(1600);

const BACKWARD_SPEED: f64 = 4.0;
const BACKWARD_RESTORE_AT: Duration = Duration::from_millis(1200);
const BACKWARD_END_AT: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// A user perturbation, relative to the row's natural direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Race ahead, then ease back to resting speed.
    Forward,
    /// Briefly run the other way.
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boost {
    Started,
    /// The row was still busy with an earlier gesture.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TimerAction {
    SetSpeed(f64),
    Restore(Direction),
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Timer {
    due: Duration,
    action: TimerAction,
}

/// Scroll state of one row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    offset: f64,
    speed: f64,
    direction: Direction,
    natural: Direction,
    /// Rightward rows start at `-half_width`; set once that is known.
    initialized: bool,
    clock: Duration,
    timers: Vec<Timer>,
}

impl Row {
    pub fn new(natural: Direction) -> Self {
        Self {
            offset: 0.0,
            speed: BASE_SPEED,
            direction: natural,
            natural,
            initialized: natural == Direction::Left,
            clock: Duration::ZERO,
            timers: Vec::new(),
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn natural(&self) -> Direction {
        self.natural
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// A gesture is still playing out.
    pub fn is_busy(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Start a gesture unless one is already in progress.
    pub fn boost(&mut self, gesture: Gesture) -> Boost {
        if self.is_busy() {
            return Boost::Ignored;
        }

        match gesture {
            Gesture::Forward => {
                self.speed = FORWARD_SPEED;
                self.schedule(FORWARD_EASE_AT, TimerAction::SetSpeed(FORWARD_EASE_SPEED));
                self.schedule(FORWARD_END_AT, TimerAction::Release);
            }
            Gesture::Backward => {
                let original = self.direction;
                self.direction = original.reversed();
                self.speed = BACKWARD_SPEED;
                self.schedule(BACKWARD_RESTORE_AT, TimerAction::Restore(original));
                self.schedule(BACKWARD_END_AT, TimerAction::Release);
            }
        }
        Boost::Started
    }

    /// Drop every pending timer and return to base speed in the natural direction.
    pub fn cancel(&mut self) {
        self.timers.clear();
        self.speed = BASE_SPEED;
        self.direction = self.natural;
    }

    /// State after `dt` has elapsed and one frame has been drawn.
    ///
    /// `half_width` is the width of one copy of the content; `None` means it
    /// has not been laid out yet, in which case the frame is skipped and a
    /// rightward row stays uninitialized.
    pub fn tick(&self, dt: Duration, half_width: Option<f64>) -> Row {
        let mut next = self.clone();
        next.advance_clock(dt);
        next.frame(half_width);
        next
    }

    /// Column of the doubled strip at which the viewport starts.
    pub fn window_start(&self, half_width: f64) -> f64 {
        if half_width <= 0.0 {
            return 0.0;
        }
        (-self.offset).rem_euclid(half_width)
    }

    fn schedule(&mut self, after: Duration, action: TimerAction) {
        self.timers.push(Timer {
            due: self.clock + after,
            action,
        });
    }

    fn advance_clock(&mut self, dt: Duration) {
        self.clock += dt;
        while let Some(timer) = self.timers.first().copied() {
            if timer.due > self.clock {
                break;
            }
            self.timers.remove(0);
            match timer.action {
                TimerAction::SetSpeed(speed) => self.speed = speed,
                TimerAction::Restore(direction) => {
                    self.direction = direction;
                    self.speed = BASE_SPEED;
                }
                TimerAction::Release => self.speed = BASE_SPEED,
            }
        }
    }

    fn frame(&mut self, half_width: Option<f64>) {
        let Some(half) = half_width.filter(|w| *w > 0.0) else {
            return;
        };

        if !self.initialized {
            self.offset = -half;
            self.initialized = true;
        }

        self.offset += self.speed * self.direction.sign() * DAMPING;

        match self.direction {
            Direction::Left if self.offset <= -half => self.offset = 0.0,
            Direction::Right if self.offset >= 0.0 => self.offset = -half,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Top,
    Bottom,
}

/// Two rows scrolling in opposite directions over the same recipes.
#[derive(Debug, Clone, PartialEq)]
pub struct Carousel {
    top: Row,
    bottom: Row,
    running: bool,
}

impl Default for Carousel {
    fn default() -> Self {
        Self::new()
    }
}

impl Carousel {
    pub fn new() -> Self {
        Self {
            top: Row::new(Direction::Left),
            bottom: Row::new(Direction::Right),
            running: false,
        }
    }

    /// Start animating when there is something to show.
    pub fn start(&mut self, item_count: usize) -> bool {
        self.running = item_count > 0;
        self.running
    }

    /// Stop the frame loop and cancel every pending gesture.
    pub fn stop(&mut self) {
        self.running = false;
        self.top.cancel();
        self.bottom.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn row(&self, lane: Lane) -> &Row {
        match lane {
            Lane::Top => &self.top,
            Lane::Bottom => &self.bottom,
        }
    }

    pub fn boost(&mut self, lane: Lane, gesture: Gesture) -> Boost {
        if !self.running {
            return Boost::Ignored;
        }
        let boost = match lane {
            Lane::Top => self.top.boost(gesture),
            Lane::Bottom => self.bottom.boost(gesture),
        };
        tracing::debug!("Carousel {:?} {:?}: {:?}", lane, gesture, boost);
        boost
    }

    pub fn tick(&mut self, dt: Duration, top_half: Option<f64>, bottom_half: Option<f64>) {
        if !self.running {
            return;
        }
        self.top = self.top.tick(dt, top_half);
        self.bottom = self.bottom.tick(dt, bottom_half);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(16);
    const HALF: f64 = 40.0;

    fn run(row: &Row, frames: usize, dt: Duration) -> Row {
        let mut row = row.clone();
        for _ in 0..frames {
            row = row.tick(dt, Some(HALF));
        }
        row
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn leftward_row_moves_by_damped_speed() {
        let row = Row::new(Direction::Left).tick(FRAME, Some(HALF));
        assert_close(row.offset(), -BASE_SPEED * DAMPING);
    }

    #[test]
    fn leftward_row_stays_in_range() {
        let mut row = Row::new(Direction::Left);
        row.boost(Gesture::Forward);
        for _ in 0..500 {
            row = row.tick(FRAME, Some(HALF));
            assert!(row.offset() > -HALF && row.offset() <= 0.0, "{}", row.offset());
        }
    }

    #[test]
    fn rightward_row_starts_at_minus_half_once() {
        let row = Row::new(Direction::Right);
        assert!(!row.is_initialized());

        let row = row.tick(FRAME, Some(HALF));
        assert!(row.is_initialized());
        assert_close(row.offset(), -HALF + BASE_SPEED * DAMPING);

        let row = row.tick(FRAME, Some(HALF));
        assert_close(row.offset(), -HALF + 2.0 * BASE_SPEED * DAMPING);
    }

    #[test]
    fn rightward_row_stays_in_range() {
        let mut row = Row::new(Direction::Right);
        row.boost(Gesture::Forward);
        for _ in 0..500 {
            row = row.tick(FRAME, Some(HALF));
            assert!(row.offset() >= -HALF && row.offset() < 0.0, "{}", row.offset());
        }
    }

    #[test]
    fn unmeasured_width_defers_initialization() {
        let row = Row::new(Direction::Right).tick(FRAME, None);
        assert!(!row.is_initialized());
        assert_close(row.offset(), 0.0);

        let row = row.tick(FRAME, Some(0.0));
        assert!(!row.is_initialized());

        let row = row.tick(FRAME, Some(HALF));
        assert!(row.is_initialized());
        assert!(row.offset() < -HALF / 2.0);
    }

    #[test]
    fn wraps_exactly_at_half_width() {
        let mut row = Row::new(Direction::Left);
        row.offset = -HALF + 0.1;
        let row = row.tick(FRAME, Some(HALF));
        assert_close(row.offset(), 0.0);

        let mut row = Row::new(Direction::Right);
        row.initialized = true;
        row.offset = -0.1;
        let row = row.tick(FRAME, Some(HALF));
        assert_close(row.offset(), -HALF);
    }

    #[test]
    fn forward_boost_schedule() {
        let mut row = Row::new(Direction::Left);
        assert_eq!(row.boost(Gesture::Forward), Boost::Started);
        assert_close(row.speed(), 7.0);

        let row = row.tick(Duration::from_millis(799), Some(HALF));
        assert_close(row.speed(), 7.0);
        let row = row.tick(Duration::from_millis(1), Some(HALF));
        assert_close(row.speed(), 5.0);
        assert!(row.is_busy());

        let row = row.tick(Duration::from_millis(800), Some(HALF));
        assert_close(row.speed(), BASE_SPEED);
        assert_eq!(row.direction(), Direction::Left);
        assert!(!row.is_busy());
    }

    #[test]
    fn backward_boost_schedule() {
        let mut row = Row::new(Direction::Right);
        row.boost(Gesture::Backward);
        assert_eq!(row.direction(), Direction::Left);
        assert_close(row.speed(), 4.0);

        let row = row.tick(Duration::from_millis(1200), Some(HALF));
        assert_eq!(row.direction(), Direction::Right);
        assert_close(row.speed(), BASE_SPEED);
        assert!(row.is_busy(), "still locked until the full duration");

        let row = row.tick(Duration::from_millis(800), Some(HALF));
        assert!(!row.is_busy());
        assert_eq!(row.direction(), Direction::Right);
        assert_close(row.speed(), BASE_SPEED);
    }

    #[test]
    fn second_gesture_while_busy_is_a_no_op() {
        let mut row = Row::new(Direction::Left);
        row.boost(Gesture::Backward);
        let row = row.tick(FRAME, Some(HALF));

        let mut again = row.clone();
        assert_eq!(again.boost(Gesture::Forward), Boost::Ignored);
        assert_eq!(again.boost(Gesture::Backward), Boost::Ignored);
        assert_eq!(again, row);
    }

    #[test]
    fn gesture_accepted_after_release() {
        let mut row = Row::new(Direction::Left);
        row.boost(Gesture::Forward);
        let mut row = run(&row, 101, FRAME);
        assert!(!row.is_busy());
        assert_eq!(row.boost(Gesture::Backward), Boost::Started);
    }

    #[test]
    fn long_frame_fires_all_due_timers_in_order() {
        let mut row = Row::new(Direction::Left);
        row.boost(Gesture::Backward);
        let row = row.tick(Duration::from_secs(5), Some(HALF));
        assert!(!row.is_busy());
        assert_eq!(row.direction(), Direction::Left);
        assert_close(row.speed(), BASE_SPEED);
    }

    #[test]
    fn window_start_tracks_offset() {
        let mut row = Row::new(Direction::Left);
        row.offset = -12.5;
        assert_close(row.window_start(HALF), 12.5);
        row.offset = 0.0;
        assert_close(row.window_start(HALF), 0.0);
        assert_close(row.window_start(0.0), 0.0);
    }

    #[test]
    fn carousel_needs_items_to_run() {
        let mut carousel = Carousel::new();
        assert!(!carousel.start(0));
        carousel.tick(FRAME, Some(HALF), Some(HALF));
        assert_close(carousel.row(Lane::Top).offset(), 0.0);
        assert_eq!(carousel.boost(Lane::Top, Gesture::Forward), Boost::Ignored);

        assert!(carousel.start(3));
        carousel.tick(FRAME, Some(HALF), Some(HALF));
        assert!(carousel.row(Lane::Top).offset() < 0.0);
        assert!(carousel.row(Lane::Bottom).is_initialized());
    }

    #[test]
    fn rows_are_independent() {
        let mut carousel = Carousel::new();
        carousel.start(1);
        assert_eq!(carousel.boost(Lane::Top, Gesture::Forward), Boost::Started);
        assert_eq!(carousel.boost(Lane::Bottom, Gesture::Forward), Boost::Started);
        assert_eq!(carousel.boost(Lane::Top, Gesture::Forward), Boost::Ignored);
    }

    #[test]
    fn stop_cancels_pending_gestures() {
        let mut carousel = Carousel::new();
        carousel.start(2);
        carousel.boost(Lane::Top, Gesture::Forward);
        carousel.boost(Lane::Bottom, Gesture::Backward);
        carousel.stop();

        assert!(!carousel.is_running());
        assert!(!carousel.row(Lane::Top).is_busy());
        assert!(!carousel.row(Lane::Bottom).is_busy());

        let before = carousel.clone();
        carousel.tick(FRAME, Some(HALF), Some(HALF));
        assert_eq!(carousel, before);
    }

    #[test]
    fn restart_after_stop_resumes_base_motion() {
        let mut carousel = Carousel::new();
        carousel.start(3);
        carousel.tick(FRAME, Some(HALF), Some(HALF));
        assert_eq!(carousel.boost(Lane::Top, Gesture::Backward), Boost::Started);
        assert_eq!(carousel.boost(Lane::Bottom, Gesture::Forward), Boost::Started);
        carousel.stop();
        carousel.start(3);

        for _ in 0..300 {
            carousel.tick(FRAME, Some(HALF), Some(HALF));
        }
        for lane in [Lane::Top, Lane::Bottom] {
            let row = carousel.row(lane);
            assert_eq!(row.direction(), row.natural());
            assert_eq!(row.speed(), BASE_SPEED);
            assert!(!row.is_busy());
        }

        // A fresh backward gesture restores the natural direction.
        assert_eq!(carousel.boost(Lane::Top, Gesture::Backward), Boost::Started);
        for _ in 0..200 {
            carousel.tick(FRAME, Some(HALF), Some(HALF));
        }
        assert_eq!(carousel.row(Lane::Top).direction(), Direction::Left);
        assert_eq!(carousel.row(Lane::Top).speed(), BASE_SPEED);
    }
}
