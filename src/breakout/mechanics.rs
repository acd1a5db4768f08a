use std::time::Duration;

use egui::{Pos2, Vec2};
use itertools::Itertools;

use crate::breakout::algebra_2d::{AaBB, Circle};

/// TOP / LEFT corner is 0/0
pub const MODEL_GRID_LEN_X: f32 = 480.0;
pub const MODEL_GRID_LEN_Y: f32 = 320.0;

/// nominal display refresh cadence; one `time_step` call per tick
pub const TIME_GRANULARITY: Duration = Duration::from_millis(16);

const PADDLE_LEN_X: f32 = 120.0;
const PADDLE_LEN_Y: f32 = 10.0;
const PADDLE_SPEED_PER_TICK: f32 = 7.0;

pub const BALL_RADIUS: f32 = 10.0;
const BALL_SPEED_PER_TICK: f32 = 5.0;
const BALL_START_DISTANCE_TO_FLOOR: f32 = 30.0;

pub const BRICK_ROWS: usize = 5;
pub const BRICK_COLUMNS: usize = 9;
const BRICK_LEN_X: f32 = 75.0;
const BRICK_LEN_Y: f32 = 20.0;
const BRICK_SPACING: f32 = 10.0;
const BRICK_OFFSET_TOP: f32 = 30.0;
const BRICK_OFFSET_LEFT: f32 = 30.0;

const INITIAL_LIVES: u32 = 3;

/// Simulation context. Sole owner and sole mutator of the whole game state;
/// the frontend only reads cloned snapshots and feeds the two input entry
/// points ([`Self::set_direction`], [`Self::set_paddle_from_pointer`]).
#[derive(Clone, Debug, PartialEq)]
pub struct BreakoutMechanics {
    pub bricks: Vec<Brick>,
    pub ball: Ball,
    pub paddle: Paddle,
    pub score: u32,
    pub lives: u32,
    /// `None` while the game is in progress
    pub outcome: Option<GameOutcome>,
    pub direction_intent: PaddleDirection,
}

impl BreakoutMechanics {
    pub fn new() -> Self {
        Self {
            bricks: Self::initial_bricks(),
            ball: Self::initial_ball(),
            paddle: Self::initial_paddle(),
            score: 0,
            lives: INITIAL_LIVES,
            outcome: None,
            direction_intent: PaddleDirection::None,
        }
    }

    /// Full restart after a terminal outcome. Everything returns to its
    /// creation-time value, unlike the mid-game respawn after a lost life.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn initial_bricks() -> Vec<Brick> {
        (0..BRICK_ROWS)
            .cartesian_product(0..BRICK_COLUMNS)
            .map(|(row, column)| Brick::new(row, column))
            .collect()
    }

    fn initial_ball() -> Ball {
        Ball {
            shape: Circle {
                center: Pos2::new(
                    MODEL_GRID_LEN_X / 2.0,
                    MODEL_GRID_LEN_Y - BALL_START_DISTANCE_TO_FLOOR,
                ),
                radius: BALL_RADIUS,
            },
            velocity: Vec2::new(BALL_SPEED_PER_TICK, -BALL_SPEED_PER_TICK),
        }
    }

    fn initial_paddle() -> Paddle {
        Paddle {
            shape: AaBB::from_min_size(
                Pos2::new(
                    (MODEL_GRID_LEN_X - PADDLE_LEN_X) / 2.0,
                    MODEL_GRID_LEN_Y - PADDLE_LEN_Y,
                ),
                Vec2::new(PADDLE_LEN_X, PADDLE_LEN_Y),
            ),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn destroyed_brick_count(&self) -> usize {
        self.bricks
            .iter()
            .filter(|b| b.state == BrickState::Destroyed)
            .count()
    }

    /// physically move one time step forward
    ///
    /// Once the outcome is terminal this is a no-op; a tick that produces the
    /// terminal outcome skips its remaining stages.
    pub fn time_step(&mut self) {
        if self.is_finished() {
            return;
        }
        self.check_brick_collisions();
        if self.is_finished() {
            return;
        }
        self.check_side_wall_reflection();
        self.check_ceiling_and_floor();
        if self.is_finished() {
            return;
        }
        self.paddle.proceed(self.direction_intent);
        self.ball.proceed();
    }

    /// Input entry point: overwrite the paddle direction intent register.
    /// The register is read once per tick by the paddle motion stage.
    pub fn set_direction(&mut self, direction: PaddleDirection) {
        self.direction_intent = direction;
    }

    /// Input entry point: center the paddle under an absolute pointer
    /// position. Takes effect immediately, not at the next tick.
    /// Positions outside the open arena range are silently ignored.
    pub fn set_paddle_from_pointer(&mut self, pointer_x: f32) {
        if pointer_x > 0.0 && pointer_x < MODEL_GRID_LEN_X {
            self.paddle.set_center_x(pointer_x);
        }
    }

    /// A brick is hit when the ball center lies strictly inside its
    /// rectangle. Each hit flips the vertical velocity on its own, so two
    /// hits in the same step cancel each other out.
    fn check_brick_collisions(&mut self) {
        let ball_center = self.ball.shape.center;
        for brick in self.bricks.iter_mut() {
            if brick.state == BrickState::Active && brick.shape.contains_open(ball_center) {
                self.ball.velocity.y = -self.ball.velocity.y;
                brick.state = BrickState::Destroyed;
                self.score += 1;
                if self.score == (BRICK_ROWS * BRICK_COLUMNS) as u32 {
                    log::info!("all bricks cleared, score: {}", self.score);
                    self.outcome = Some(GameOutcome::Won);
                    return;
                }
            }
        }
    }

    fn check_side_wall_reflection(&mut self) {
        let ball = &mut self.ball;
        let next_x = ball.shape.center.x + ball.velocity.x;
        if next_x > MODEL_GRID_LEN_X - ball.shape.radius || next_x < ball.shape.radius {
            ball.velocity.x = -ball.velocity.x;
        }
    }

    fn check_ceiling_and_floor(&mut self) {
        let next_y = self.ball.shape.center.y + self.ball.velocity.y;
        if next_y < self.ball.shape.radius {
            self.ball.velocity.y = -self.ball.velocity.y;
        } else if next_y > MODEL_GRID_LEN_Y - self.ball.shape.radius {
            // the paddle returns the ball only if the ball center is strictly
            // between the paddle edges
            if self.paddle.covers_x(self.ball.shape.center.x) {
                self.ball.velocity.y = -self.ball.velocity.y;
            } else {
                self.lose_life();
            }
        }
    }

    fn lose_life(&mut self) {
        self.lives -= 1;
        if self.lives > 0 {
            log::info!("ball lost, {} live(s) left", self.lives);
            self.respawn();
        } else {
            log::info!("game over, score: {}", self.score);
            self.outcome = Some(GameOutcome::Lost);
        }
    }

    /// Ball and paddle return to their start state; bricks and score survive.
    fn respawn(&mut self) {
        self.ball = Self::initial_ball();
        self.paddle = Self::initial_paddle();
    }
}

/// Pending player input, written by the frontend and consumed by the
/// mechanics thread once per tick.
#[derive(Copy, Clone, Debug)]
pub struct GameInput {
    pub control: PaddleDirection,
    /// absolute pointer x in arena coordinates, if the pointer moved
    pub pointer_x: Option<f32>,
    /// restart request after a terminal outcome
    pub reset: bool,
    pub exit: bool,
}

impl GameInput {
    pub fn none() -> Self {
        Self {
            control: PaddleDirection::None,
            pointer_x: None,
            reset: false,
            exit: false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PaddleDirection {
    None,
    Left,
    Right,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    Lost,
    Won,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BrickState {
    Active,
    Destroyed,
}

/// Grid cell. Its place in the arena is fixed at creation from the
/// (row, column) index; a destroyed brick stays in the grid and never
/// becomes active again.
#[derive(Clone, Debug, PartialEq)]
pub struct Brick {
    pub shape: AaBB,
    pub state: BrickState,
}

impl Brick {
    fn new(row: usize, column: usize) -> Self {
        let left_x = column as f32 * (BRICK_LEN_X + BRICK_SPACING) + BRICK_OFFSET_LEFT;
        let upper_y = row as f32 * (BRICK_LEN_Y + BRICK_SPACING) + BRICK_OFFSET_TOP;
        Brick {
            shape: AaBB::from_min_size(
                Pos2::new(left_x, upper_y),
                Vec2::new(BRICK_LEN_X, BRICK_LEN_Y),
            ),
            state: BrickState::Active,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ball {
    pub shape: Circle,
    /// arena units per tick; the sign carries the direction
    pub velocity: Vec2,
}

impl Ball {
    fn proceed(&mut self) {
        self.shape.center += self.velocity;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Paddle {
    pub shape: AaBB,
}

impl Paddle {
    fn proceed(&mut self, direction: PaddleDirection) {
        match direction {
            PaddleDirection::Right => self.shift(PADDLE_SPEED_PER_TICK),
            PaddleDirection::Left => self.shift(-PADDLE_SPEED_PER_TICK),
            PaddleDirection::None => {}
        }
    }

    fn shift(&mut self, len_x: f32) {
        self.shape = self.shape.translate(Vec2::new(len_x, 0.0));
        self.clamp_to_arena();
    }

    fn set_center_x(&mut self, center_x: f32) {
        let left_x = center_x - self.shape.len_x() / 2.0;
        self.shape = self.shape.translate(Vec2::new(left_x - self.shape.min.x, 0.0));
        self.clamp_to_arena();
    }

    pub fn covers_x(&self, x: f32) -> bool {
        self.shape.min.x < x && x < self.shape.max.x
    }

    fn clamp_to_arena(&mut self) {
        if self.shape.min.x < 0.0 {
            self.shape = self.shape.translate(Vec2::new(-self.shape.min.x, 0.0));
        } else if self.shape.max.x > MODEL_GRID_LEN_X {
            self.shape = self
                .shape
                .translate(Vec2::new(MODEL_GRID_LEN_X - self.shape.max.x, 0.0));
        }
    }
}

pub trait Assert {
    fn assert(&self);
}

impl Assert for Paddle {
    fn assert(&self) {
        assert!(self.shape.min.x >= 0.0);
        assert!(self.shape.max.x <= MODEL_GRID_LEN_X);
        assert!(self.shape.min.y >= 0.0);
        assert!(self.shape.max.y <= MODEL_GRID_LEN_Y);
    }
}

impl Assert for Ball {
    fn assert(&self) {
        assert!(self.shape.center.x - self.shape.radius >= 0.0);
        assert!(self.shape.center.x + self.shape.radius <= MODEL_GRID_LEN_X);
        assert!(self.shape.center.y - self.shape.radius >= 0.0);
        assert!(self.shape.center.y + self.shape.radius <= MODEL_GRID_LEN_Y);
    }
}

#[cfg(test)]
mod tests {
    use egui::{Pos2, Vec2};
    use rstest::rstest;

    use super::*;

    fn mechanics_with_ball(center: Pos2, velocity: Vec2) -> BreakoutMechanics {
        let mut mechanics = BreakoutMechanics::new();
        mechanics.ball.shape.center = center;
        mechanics.ball.velocity = velocity;
        mechanics
    }

    #[rstest]
    #[case(Pos2::new(466.0, 200.0), Vec2::new(5.0, 5.0), -5.0)]
    #[case(Pos2::new(14.0, 200.0), Vec2::new(-5.0, 5.0), 5.0)]
    #[case(Pos2::new(240.0, 200.0), Vec2::new(5.0, 5.0), 5.0)]
    fn side_wall_reflection(
        #[case] center: Pos2,
        #[case] velocity: Vec2,
        #[case] expected_dx: f32,
    ) {
        let mut mechanics = mechanics_with_ball(center, velocity);
        mechanics.time_step();
        assert_eq!(mechanics.ball.velocity.x, expected_dx);
    }

    #[rstest]
    fn ceiling_reflection() {
        let mut mechanics = mechanics_with_ball(Pos2::new(240.0, 14.0), Vec2::new(5.0, -5.0));
        mechanics.time_step();
        assert_eq!(mechanics.ball.velocity.y, 5.0);
        assert_eq!(mechanics.ball.shape.center, Pos2::new(245.0, 19.0));
    }

    #[rstest]
    fn floor_bounce_when_paddle_covers_the_ball() {
        let mut mechanics = mechanics_with_ball(Pos2::new(240.0, 308.0), Vec2::new(5.0, 5.0));
        mechanics.time_step();
        assert_eq!(mechanics.ball.velocity.y, -5.0);
        assert_eq!(mechanics.lives, 3);
        assert!(mechanics.outcome.is_none());
    }

    #[rstest]
    fn floor_contact_without_paddle_costs_a_life() {
        let mut mechanics = mechanics_with_ball(Pos2::new(240.0, 308.0), Vec2::new(5.0, 5.0));
        mechanics.set_paddle_from_pointer(60.0);
        assert_eq!(mechanics.paddle.shape.min.x, 0.0);

        mechanics.time_step();

        assert_eq!(mechanics.lives, 2);
        assert!(mechanics.outcome.is_none());
        // the respawned ball already moved one step within the same tick
        assert_eq!(mechanics.ball.shape.center, Pos2::new(245.0, 285.0));
        assert_eq!(mechanics.ball.velocity, Vec2::new(5.0, -5.0));
        assert_eq!(
            mechanics.paddle.shape.min.x,
            (MODEL_GRID_LEN_X - PADDLE_LEN_X) / 2.0
        );
    }

    #[rstest]
    fn respawn_keeps_bricks_and_score() {
        let mut mechanics = mechanics_with_ball(Pos2::new(50.0, 35.0), Vec2::new(5.0, 5.0));
        mechanics.time_step();
        assert_eq!(mechanics.score, 1);

        mechanics.ball.shape.center = Pos2::new(400.0, 308.0);
        mechanics.ball.velocity = Vec2::new(5.0, 5.0);
        mechanics.time_step();

        assert_eq!(mechanics.lives, 2);
        assert_eq!(mechanics.score, 1);
        assert_eq!(mechanics.destroyed_brick_count(), 1);
    }

    #[rstest]
    fn brick_hit_destroys_the_brick_and_scores() {
        let mut mechanics = mechanics_with_ball(Pos2::new(50.0, 35.0), Vec2::new(5.0, 5.0));
        mechanics.time_step();
        assert_eq!(mechanics.score, 1);
        assert_eq!(mechanics.bricks[0].state, BrickState::Destroyed);
        assert_eq!(mechanics.destroyed_brick_count(), 1);
        assert_eq!(mechanics.ball.velocity.y, -5.0);
    }

    #[rstest]
    #[case(Pos2::new(30.0, 35.0))]
    #[case(Pos2::new(105.0, 35.0))]
    #[case(Pos2::new(50.0, 30.0))]
    #[case(Pos2::new(50.0, 50.0))]
    fn ball_center_on_a_brick_edge_is_a_miss(#[case] center: Pos2) {
        let mut mechanics = mechanics_with_ball(center, Vec2::new(5.0, 5.0));
        mechanics.time_step();
        assert_eq!(mechanics.score, 0);
        assert_eq!(mechanics.destroyed_brick_count(), 0);
    }

    #[rstest]
    fn simultaneous_brick_hits_flip_dy_once_per_brick() {
        let mut mechanics = mechanics_with_ball(Pos2::new(50.0, 40.0), Vec2::new(5.0, 5.0));
        let cell = AaBB::from_min_size(Pos2::new(30.0, 30.0), Vec2::new(75.0, 20.0));
        mechanics.bricks = vec![
            Brick { shape: cell, state: BrickState::Active },
            Brick { shape: cell, state: BrickState::Active },
        ];

        mechanics.time_step();

        assert_eq!(mechanics.score, 2);
        assert!(mechanics.bricks.iter().all(|b| b.state == BrickState::Destroyed));
        // two flips cancel out
        assert_eq!(mechanics.ball.velocity.y, 5.0);
    }

    #[rstest]
    fn destroying_the_last_brick_wins() {
        let mut mechanics = mechanics_with_ball(Pos2::new(50.0, 35.0), Vec2::new(5.0, 5.0));
        for brick in mechanics.bricks.iter_mut().skip(1) {
            brick.state = BrickState::Destroyed;
        }
        mechanics.score = (BRICK_ROWS * BRICK_COLUMNS) as u32 - 1;

        mechanics.time_step();

        assert_eq!(mechanics.outcome, Some(GameOutcome::Won));
        assert_eq!(mechanics.score, (BRICK_ROWS * BRICK_COLUMNS) as u32);
        // the winning tick stops before integration
        assert_eq!(mechanics.ball.shape.center, Pos2::new(50.0, 35.0));
    }

    #[rstest]
    fn losing_the_last_life_ends_the_game() {
        let mut mechanics = mechanics_with_ball(Pos2::new(400.0, 308.0), Vec2::new(5.0, 5.0));
        mechanics.lives = 1;

        mechanics.time_step();

        assert_eq!(mechanics.lives, 0);
        assert_eq!(mechanics.outcome, Some(GameOutcome::Lost));
    }

    #[rstest]
    #[case(Some(GameOutcome::Won))]
    #[case(Some(GameOutcome::Lost))]
    fn terminal_state_is_frozen(#[case] outcome: Option<GameOutcome>) {
        let mut mechanics = mechanics_with_ball(Pos2::new(240.0, 200.0), Vec2::new(5.0, 5.0));
        mechanics.outcome = outcome;
        mechanics.set_direction(PaddleDirection::Right);
        let frozen = mechanics.clone();

        mechanics.time_step();

        assert_eq!(mechanics, frozen);
    }

    #[rstest]
    #[case(50.0, 0.0)]
    #[case(240.0, 180.0)]
    #[case(460.0, MODEL_GRID_LEN_X - PADDLE_LEN_X)]
    fn pointer_centers_and_clamps_the_paddle(
        #[case] pointer_x: f32,
        #[case] expected_left_x: f32,
    ) {
        let mut mechanics = BreakoutMechanics::new();
        mechanics.set_paddle_from_pointer(pointer_x);
        assert_eq!(mechanics.paddle.shape.min.x, expected_left_x);
        assert_eq!(mechanics.paddle.shape.len_x(), PADDLE_LEN_X);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-25.0)]
    #[case(MODEL_GRID_LEN_X)]
    #[case(900.0)]
    fn out_of_range_pointer_is_ignored(#[case] pointer_x: f32) {
        let mut mechanics = BreakoutMechanics::new();
        let paddle_before = mechanics.paddle.clone();
        mechanics.set_paddle_from_pointer(pointer_x);
        assert_eq!(mechanics.paddle, paddle_before);
    }

    #[rstest]
    #[case(PaddleDirection::Right, 187.0)]
    #[case(PaddleDirection::Left, 173.0)]
    #[case(PaddleDirection::None, 180.0)]
    fn paddle_follows_the_direction_intent(
        #[case] direction: PaddleDirection,
        #[case] expected_left_x: f32,
    ) {
        let mut mechanics = mechanics_with_ball(Pos2::new(240.0, 200.0), Vec2::new(5.0, 5.0));
        mechanics.set_direction(direction);
        mechanics.time_step();
        assert_eq!(mechanics.paddle.shape.min.x, expected_left_x);
    }

    #[rstest]
    fn paddle_stops_at_the_arena_bound() {
        let mut mechanics = mechanics_with_ball(Pos2::new(240.0, 200.0), Vec2::new(5.0, 5.0));
        mechanics.set_paddle_from_pointer(475.0);
        assert_eq!(mechanics.paddle.shape.min.x, MODEL_GRID_LEN_X - PADDLE_LEN_X);

        mechanics.set_direction(PaddleDirection::Right);
        for _ in 0..5 {
            mechanics.time_step();
        }
        assert_eq!(mechanics.paddle.shape.min.x, MODEL_GRID_LEN_X - PADDLE_LEN_X);
    }

    #[rstest]
    fn reset_restores_the_creation_state() {
        let mut mechanics = mechanics_with_ball(Pos2::new(50.0, 35.0), Vec2::new(5.0, 5.0));
        mechanics.time_step();
        mechanics.set_direction(PaddleDirection::Left);
        assert_ne!(mechanics, BreakoutMechanics::new());

        mechanics.reset();

        assert_eq!(mechanics, BreakoutMechanics::new());
    }

    #[rstest]
    fn brick_grid_covers_rows_times_columns() {
        let mechanics = BreakoutMechanics::new();
        assert_eq!(mechanics.bricks.len(), BRICK_ROWS * BRICK_COLUMNS);
        assert!(mechanics.bricks.iter().all(|b| b.state == BrickState::Active));
        // first cell sits at the configured offset
        assert_eq!(mechanics.bricks[0].shape.min, Pos2::new(30.0, 30.0));
    }
}
