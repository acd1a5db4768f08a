use std::ops::{Add, Div};
use std::sync::{Arc, RwLock};
use std::thread;
use std::thread::JoinHandle;
use std::time::Instant;

use anyhow::anyhow;
use eframe::glow;
use egui::{Align2, Color32, Context, FontId, Id, LayerId, Order, Painter, Vec2};

use breakout_arcade::breakout::app_game_drawer::AppGameDrawer;
use breakout_arcade::breakout::mechanics::*;
use breakout_arcade::util::init_logging;

pub const FRAME_SIZE_X: f32 = MODEL_GRID_LEN_X;
pub const FRAME_SIZE_Y: f32 = MODEL_GRID_LEN_Y;

pub struct BreakoutApp {
    game_input: Arc<RwLock<GameInput>>,
    game_state: Arc<RwLock<BreakoutMechanics>>,
    mechanics_join_handle: JoinHandle<()>,
    /// kept up until the mechanics thread confirms the restart
    pending_reset: bool,
}

impl BreakoutApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        game_input: Arc<RwLock<GameInput>>,
        game_state: Arc<RwLock<BreakoutMechanics>>,
        mechanics_join_handle: JoinHandle<()>,
    ) -> Self {
        Self {
            game_input,
            game_state,
            mechanics_join_handle,
            pending_reset: false,
        }
    }

    /// ArrowRight is checked before ArrowLeft - when both are held down,
    /// Right wins.
    fn read_ui_control(
        &mut self,
        ctx: &Context,
        canvas_size: Vec2,
    ) -> GameInput {
        let control = if ctx.input(|i| i.key_down(egui::Key::ArrowRight)) {
            PaddleDirection::Right
        } else if ctx.input(|i| i.key_down(egui::Key::ArrowLeft)) {
            PaddleDirection::Left
        } else {
            PaddleDirection::None
        };
        let pointer_x = ctx.input(|i| {
            if i.pointer.delta() != Vec2::ZERO {
                i.pointer
                    .hover_pos()
                    .map(|pos| pos.x * MODEL_GRID_LEN_X / canvas_size.x)
            } else {
                None
            }
        });
        let exit = ctx.input(|i| i.key_down(egui::Key::Escape));
        GameInput {
            control,
            pointer_x,
            reset: false,
            exit,
        }
    }

    /// Shows the terminal modal while the game is over; returns whether the
    /// player dismissed it this frame.
    fn terminal_modal(
        &self,
        ctx: &Context,
        game_state: &BreakoutMechanics,
    ) -> bool {
        let Some(outcome) = game_state.outcome else {
            return false;
        };
        let (title, text) = match outcome {
            GameOutcome::Won => (
                "YOU WON",
                format!("Congratulations! You have scored {}.", game_state.score),
            ),
            GameOutcome::Lost => ("GAME OVER", "Try again!".to_string()),
        };
        let mut dismissed = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(text);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        dismissed
    }

    fn draw_game_content(
        &self,
        painter: &Painter,
        game_state: &BreakoutMechanics,
    ) {
        let paint_offset = painter.clip_rect().min;
        let canvas_size = painter.clip_rect().size();

        let drawer = AppGameDrawer::new(canvas_size, game_state.clone());
        for mut shape in drawer.shapes() {
            shape.translate(paint_offset.to_vec2());
            painter.add(shape);
        }

        let scale_x = canvas_size.x / MODEL_GRID_LEN_X;
        let scale_y = canvas_size.y / MODEL_GRID_LEN_Y;
        let font = FontId::proportional(20.0 * scale_y);
        painter.text(
            paint_offset + Vec2::new(8.0 * scale_x, 6.0 * scale_y),
            Align2::LEFT_TOP,
            format!("Score: {}", game_state.score),
            font.clone(),
            Color32::WHITE,
        );
        painter.text(
            paint_offset + Vec2::new((MODEL_GRID_LEN_X - 8.0) * scale_x, 6.0 * scale_y),
            Align2::RIGHT_TOP,
            format!("Lives: {}", game_state.lives),
            font,
            Color32::WHITE,
        );
    }

    fn read_game_state(&self) -> BreakoutMechanics {
        let read_handle = self.game_state.read().unwrap();
        let game_state = read_handle.clone();
        drop(read_handle);
        game_state
    }

    fn write_game_input(
        &self,
        game_input: GameInput,
    ) {
        let mut write_handle = self.game_input.write().unwrap();
        *write_handle = game_input;
        drop(write_handle);
    }
}

impl eframe::App for BreakoutApp {
    fn update(
        &mut self,
        ctx: &Context,
        frame: &mut eframe::Frame,
    ) {
        if self.mechanics_join_handle.is_finished() {
            frame.close()
        }
        frame.set_window_size(Vec2::new(FRAME_SIZE_X, FRAME_SIZE_Y));

        let game_painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("game")));
        let canvas_size = game_painter.clip_rect().size();
        let game_state = self.read_game_state();

        let mut player_input = self.read_ui_control(ctx, canvas_size);
        if self.terminal_modal(ctx, &game_state) {
            self.pending_reset = true;
        }
        if game_state.outcome.is_none() {
            self.pending_reset = false;
        }
        player_input.reset = self.pending_reset;
        self.write_game_input(player_input);

        self.draw_game_content(&game_painter, &game_state);
    }

    fn on_exit(
        &mut self,
        _: Option<&glow::Context>,
    ) {
        *self.game_input.write().unwrap() = GameInput {
            exit: true,
            ..GameInput::none()
        };
    }
}

fn mechanics_thread(
    game_input: Arc<RwLock<GameInput>>,
    game_state: Arc<RwLock<BreakoutMechanics>>,
    egui_ctx: Context,
) {
    let read_input = || -> GameInput {
        let read_handle = game_input.read().unwrap();
        let input = *read_handle;
        drop(read_handle);
        input
    };

    let write_game_state = |state: BreakoutMechanics| {
        let mut write_handle = game_state.write().unwrap();
        *write_handle = state;
        drop(write_handle);
    };

    let mut mechanics = BreakoutMechanics::new();
    let mut next_step_time = Instant::now().add(TIME_GRANULARITY);
    let sleep_time = TIME_GRANULARITY.div(5);
    loop {
        if Instant::now().ge(&next_step_time) {
            next_step_time = next_step_time.add(TIME_GRANULARITY);
            let input = read_input();
            if input.exit {
                break;
            }
            if input.reset && mechanics.is_finished() {
                mechanics.reset();
            }
            if let Some(pointer_x) = input.pointer_x {
                mechanics.set_paddle_from_pointer(pointer_x);
            }
            mechanics.set_direction(input.control);
            mechanics.time_step();
            write_game_state(mechanics.clone());
            egui_ctx.request_repaint();
        }
        thread::sleep(sleep_time);
    }
}

fn breakout_arcade_game() -> eframe::Result<()> {
    let game_input = Arc::new(RwLock::new(GameInput::none()));
    let game_state = Arc::new(RwLock::new(BreakoutMechanics::new()));

    let m_game_input = Arc::clone(&game_input);
    let m_game_state = Arc::clone(&game_state);

    let mut native_options = eframe::NativeOptions::default();
    native_options.initial_window_size = Some(Vec2::new(FRAME_SIZE_X, FRAME_SIZE_Y));
    native_options.default_theme = eframe::Theme::Dark;
    eframe::run_native("Breakout", native_options, Box::new(|cc| {
        let egui_ctx = cc.egui_ctx.clone();
        let mechanics_join_handle = thread::spawn(move || mechanics_thread(m_game_input, m_game_state, egui_ctx));
        Box::new(BreakoutApp::new(cc, game_input, game_state, mechanics_join_handle))
    }))
}

fn main() -> anyhow::Result<()> {
    init_logging();
    breakout_arcade_game().map_err(|e| anyhow!("egui frontend failed: {e}"))?;
    Ok(())
}
