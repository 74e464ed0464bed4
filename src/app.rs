use crate::chain::{Chain, Point};
use crate::config::{Settings, BASE_WIDTH, SEGMENT_COUNT, SEGMENT_LENGTH, TENTACLE_HUE, TRAIL};
use crate::input::{collect_input_nonblocking, Action};
use crate::render::{draw_text, Surface, Terminal};
use crate::solver::{self, base_point};
use crossterm::style::Color;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub(crate) struct App {
    settings: Settings,
    term: Terminal,
    chain: Chain,
    pointer: Point,
    base: Point,
    show_hud: bool,
    should_quit: bool,
    fps: FpsCounter,
}

impl App {
    fn init(settings: Settings) -> anyhow::Result<Self> {
        let (_, rows) = crossterm::terminal::size()?;
        settings.check_fits(rows)?;

        let term = Terminal::begin(settings.margin_rows, TRAIL.rgb())?;
        let (w, h) = term.canvas.size();

        // Chain grows straight up from the anchor; the pointer starts centered.
        let base = base_point(w, h);
        let chain = Chain::new(SEGMENT_COUNT, SEGMENT_LENGTH, BASE_WIDTH, TENTACLE_HUE, base);
        let pointer = Point::new(w / 2.0, h / 2.0);

        info!(
            cols = term.cols,
            rows = term.rows,
            canvas_w = w,
            canvas_h = h,
            segments = chain.len(),
            reach = chain.reach(),
            fps_cap = settings.fps_cap,
            color = settings.enable_color,
            "tentacle started"
        );

        Ok(Self {
            settings,
            term,
            chain,
            pointer,
            base,
            show_hud: false,
            should_quit: false,
            fps: FpsCounter::new(),
        })
    }

    fn run(&mut self) -> anyhow::Result<()> {
        let frame_dt = Duration::from_secs_f32(1.0 / self.settings.fps_cap as f32);

        while !self.should_quit {
            let frame_start = Instant::now();

            if self.term.resize_if_needed()? {
                let (w, h) = self.term.canvas.size();
                info!(cols = self.term.cols, rows = self.term.rows, canvas_w = w, canvas_h = h, "resized");
            }

            for action in collect_input_nonblocking(frame_dt)? {
                match action {
                    Action::Quit => {
                        self.should_quit = true;
                        break;
                    }
                    Action::ToggleHud => self.show_hud = !self.show_hud,
                    Action::PointerMoved(p) => self.pointer = p,
                    // Picked up by resize_if_needed at the top of the next frame.
                    Action::Resized => {}
                }
            }
            if self.should_quit {
                break;
            }

            self.base = solver::tick(&mut self.chain, self.pointer, &mut self.term.canvas);

            self.term.compose(self.settings.enable_color);
            if self.show_hud {
                self.draw_hud();
            }
            self.term.present(true)?;

            if let Some(fps) = self.fps.frame() {
                let tip = self.chain.tip().position;
                debug!(fps, tip_x = tip.x, tip_y = tip.y, "frame stats");
            }

            spin_sleep(frame_dt, frame_start);
        }

        info!("tentacle stopped");
        Ok(())
    }

    fn draw_hud(&mut self) {
        let line = format!(
            "fps:{:>5.1}  pointer:({:.0},{:.0})  base:({:.0},{:.0})  segments:{}  keys: h hud  q quit",
            self.fps.current,
            self.pointer.x,
            self.pointer.y,
            self.base.x,
            self.base.y,
            self.chain.len()
        );
        let w = self.term.cur.w as usize;
        let padded = format!("{line:<w$}");
        draw_text(&mut self.term.cur, 0, 0, &padded, Color::White, Color::Black);
    }
}

pub(crate) fn run(settings: Settings) -> anyhow::Result<()> {
    let mut app = App::init(settings)?;
    app.run()
}

/// Frames per second, re-estimated every half second.
struct FpsCounter {
    since: Instant,
    frames: u32,
    current: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            since: Instant::now(),
            frames: 0,
            current: 0.0,
        }
    }

    /// Returns a fresh estimate when one is due.
    fn frame(&mut self) -> Option<f32> {
        self.frames += 1;
        let elapsed = self.since.elapsed();
        if elapsed < Duration::from_millis(500) {
            return None;
        }
        self.current = self.frames as f32 / elapsed.as_secs_f32();
        self.since = Instant::now();
        self.frames = 0;
        Some(self.current)
    }
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, start: Instant) {
    let end = start + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
