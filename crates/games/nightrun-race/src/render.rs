//! Segment-road renderer. Produces a backend-agnostic [`DrawList`].

use glam::Vec2;

use nightrun_core::run::RunState;

use crate::config::RaceConfig;
use crate::environment::{Environment, celestial_body, derive_environment};
use crate::palette::{self, Rgb};
use crate::physics::PlayerState;
use crate::projection::{Camera, ScreenPoint, Viewport, WorldPoint, project};
use crate::track::{Track, TrafficCar};
use crate::traffic::SegmentBuckets;
use crate::wrap;

/// Rumble strip width as a fraction of the road half-width.
const RUMBLE_FRACTION: f64 = 0.15;
/// Lane marker width as a fraction of the road half-width.
const LANE_FRACTION: f64 = 0.05;
/// Car sprite width as a fraction of the projected road width.
const SPRITE_ROAD_FRACTION: f32 = 0.25;
/// Player sprite width as a fraction of the screen width.
const PLAYER_SCREEN_FRACTION: f32 = 0.25;
const PLAYER_BOTTOM_MARGIN: f32 = 10.0;
const PLAYER_LEAN: f32 = 0.2;

/// Horizontal span of a road edge at one screen row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub x: f32,
    pub y: f32,
    pub half_width: f32,
}

impl Span {
    fn scaled(p: &ScreenPoint, fraction: f64, shift: f64) -> Self {
        Span {
            x: (p.x + shift * p.half_width) as f32,
            y: p.y as f32,
            half_width: (p.half_width * fraction) as f32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Traffic { variant: u8 },
    Player { steer: i8 },
}

/// A car sprite anchored at its bottom center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteCommand {
    pub kind: SpriteKind,
    pub center_x: f32,
    pub bottom: f32,
    pub width: f32,
    pub height: f32,
    /// Rows at or below this are hidden behind nearer terrain.
    pub clip_y: f32,
}

/// An axis-aligned filled rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectPart {
    pub min: Vec2,
    pub max: Vec2,
    pub color: Rgb,
    pub alpha: f32,
}

impl RectPart {
    fn solid(x: f32, y: f32, w: f32, h: f32, color: Rgb) -> Self {
        Self::blended(x, y, w, h, color, 1.0)
    }

    fn blended(x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32) -> Self {
        RectPart {
            min: Vec2::new(x, y),
            max: Vec2::new(x + w, y + h),
            color,
            alpha,
        }
    }
}

impl SpriteCommand {
    pub fn top(&self) -> f32 {
        self.bottom - self.height
    }

    /// Decompose into flat rectangles, back to front.
    pub fn parts(&self) -> Vec<RectPart> {
        let (w, h) = (self.width, self.height);
        let l = self.center_x - w / 2.0;
        let t = self.top();
        match self.kind {
            SpriteKind::Traffic { variant } => {
                let (body, roof) = palette::CAR_BODIES[usize::from(variant) % palette::CAR_BODIES.len()];
                vec![
                    RectPart::blended(l + w * 0.1, t + h * 0.8, w * 0.8, h * 0.15, palette::BLACK, 0.5),
                    RectPart::solid(l, t + h * 0.4, w, h * 0.5, body),
                    RectPart::solid(l + w * 0.2, t, w * 0.6, h * 0.4, roof),
                    RectPart::solid(l + w * 0.1, t + h * 0.55, w * 0.15, h * 0.15, palette::TAIL_LIGHT),
                    RectPart::solid(l + w * 0.75, t + h * 0.55, w * 0.15, h * 0.15, palette::TAIL_LIGHT),
                ]
            },
            SpriteKind::Player { .. } => vec![
                RectPart::blended(l + w * 0.05, t + h * 0.85, w * 0.9, h * 0.1, palette::BLACK, 0.5),
                RectPart::solid(l, t + h * 0.3, w, h * 0.4, palette::PLAYER_BODY),
                RectPart::solid(l, t + h * 0.5, w, h * 0.2, palette::PLAYER_STRIPE),
                RectPart::solid(l - w * 0.05, t + h * 0.5, w * 0.1, h * 0.25, palette::TYRE),
                RectPart::solid(l + w * 0.95, t + h * 0.5, w * 0.1, h * 0.25, palette::TYRE),
                RectPart::solid(l + w * 0.1, t + h * 0.55, w * 0.2, h * 0.1, palette::TAIL_LIGHT),
                RectPart::solid(l + w * 0.7, t + h * 0.55, w * 0.2, h * 0.1, palette::TAIL_LIGHT),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Whole-screen fill.
    Fill(Rgb),
    Rect(RectPart),
    /// Road-aligned quad between two horizontal spans; `far` is above `near`.
    Trapezoid { near: Span, far: Span, color: Rgb },
    Circle { center: Vec2, radius: f32, color: Rgb },
    Sprite(SpriteCommand),
}

/// Ordered draw commands for one frame, painter's order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn sprites(&self) -> impl Iterator<Item = &SpriteCommand> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Sprite(s) => Some(s),
            _ => None,
        })
    }
}

/// The slice of simulation state the renderer reads.
#[derive(Debug, Clone, Copy)]
pub struct RenderView<'a> {
    pub track: &'a Track,
    pub traffic: &'a [TrafficCar],
    pub player: &'a PlayerState,
    pub run_state: RunState,
    pub day: u32,
    pub time_of_day: f32,
}

#[derive(Debug, Clone, Copy)]
struct QueuedSprite {
    x: f64,
    y: f64,
    scale: f64,
    variant: u8,
    clip: f64,
}

/// Per-frame working memory. Cleared every frame, never part of the track.
#[derive(Debug, Default)]
pub struct RenderScratch {
    /// Visible clip height per segment index.
    clip: Vec<f64>,
    buckets: SegmentBuckets,
    sprites: Vec<QueuedSprite>,
}

impl RenderScratch {
    fn begin_frame(&mut self, segments: usize, height: f64) {
        self.clip.clear();
        self.clip.resize(segments, height);
        self.sprites.clear();
    }

    /// Clip height recorded for `segment` during the last frame.
    pub fn clip_of(&self, segment: usize) -> Option<f64> {
        self.clip.get(segment).copied()
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub struct Renderer {
    viewport: Viewport,
    road_width: f64,
    camera_height: f64,
    camera_depth: f64,
    player_z: f64,
    draw_distance: usize,
    scratch: RenderScratch,
}

impl Renderer {
    pub fn new(config: &RaceConfig) -> Self {
        Self {
            viewport: Viewport::new(config.render.width, config.render.height),
            road_width: config.track.road_width,
            camera_height: config.render.camera_height,
            camera_depth: config.render.camera_depth(),
            player_z: config.render.player_z(),
            draw_distance: config.render.draw_distance,
            scratch: RenderScratch::default(),
        }
    }

    pub fn scratch(&self) -> &RenderScratch {
        &self.scratch
    }

    pub fn render(&mut self, view: &RenderView<'_>) -> DrawList {
        let (w, h) = (self.viewport.width as f32, self.viewport.height as f32);
        let mut list = DrawList {
            width: self.viewport.width as u32,
            height: self.viewport.height as u32,
            commands: Vec::new(),
        };

        if !view.run_state.shows_road() {
            list.push(DrawCommand::Fill(palette::BLACK));
            return list;
        }

        let env = derive_environment(view.day, view.time_of_day);
        list.push(DrawCommand::Fill(env.sky));
        if let Some(body) = celestial_body(&env, view.time_of_day, w, h) {
            list.push(DrawCommand::Circle {
                center: Vec2::new(body.x, body.y),
                radius: body.radius,
                color: body.color,
            });
        }
        list.push(DrawCommand::Rect(RectPart::solid(0.0, h / 2.0, w, h / 2.0, env.ground)));

        self.draw_road(view, &env, &mut list);
        self.draw_traffic(&mut list);

        if view.run_state == RunState::LevelComplete {
            push_flag(&mut list, w);
        } else {
            let width = w * PLAYER_SCREEN_FRACTION;
            let steer = view.player.steer;
            list.push(DrawCommand::Sprite(SpriteCommand {
                kind: SpriteKind::Player { steer },
                center_x: w / 2.0 + f32::from(steer) * width * PLAYER_LEAN,
                bottom: h - PLAYER_BOTTOM_MARGIN,
                width,
                height: width / 2.0,
                clip_y: h,
            }));
        }
        list
    }

    fn draw_road(&mut self, view: &RenderView<'_>, env: &Environment, list: &mut DrawList) {
        let track = view.track;
        let seg_len = track.segment_length();
        let (w, h) = (self.viewport.width, self.viewport.height);

        self.scratch.begin_frame(track.segment_count(), h);
        self.scratch.buckets.rebuild(view.traffic, track);

        let base = track.segment_at(view.player.z);
        let base_percent = wrap::percent_through(view.player.z, seg_len);
        let camera = Camera {
            x: view.player.offset * self.road_width,
            y: self.camera_height + lerp(base.p1.y, base.p2.y, base_percent),
            z: 0.0,
            depth: self.camera_depth,
        };

        let fog = f64::from(env.fog);
        let fog_start = self.draw_distance as f64 * (1.0 - fog);
        let mut max_y = h;
        // Accumulated centreline shift; positive curvature bends the road left.
        let mut x = 0.0;
        let mut dx = -base.curve * base_percent;

        for n in 0..self.draw_distance {
            let segment = track.segment_after(base.index, n);
            self.scratch.clip[segment.index] = max_y;

            let near_z = n as f64 * seg_len - base_percent * seg_len + self.player_z;
            if !camera.is_visible(near_z) {
                continue;
            }
            let mut near = project(
                WorldPoint::new(-x, segment.p1.y, near_z),
                &camera,
                &self.viewport,
                self.road_width,
            );
            let far = project(
                WorldPoint::new(-x - dx, segment.p2.y, near_z + seg_len),
                &camera,
                &self.viewport,
                self.road_width,
            );
            if n == 0 {
                near.y = h;
            }
            x += dx;
            dx += segment.curve;

            for car in self.scratch.buckets.cars_in(segment.index) {
                let Some(car) = view.traffic.get(car) else {
                    continue;
                };
                self.scratch.sprites.push(QueuedSprite {
                    x: near.x + near.half_width * car.offset,
                    y: near.y,
                    scale: near.scale,
                    variant: car.sprite,
                    clip: max_y,
                });
            }

            if far.y >= max_y || far.y >= near.y {
                continue;
            }

            let colors = segment.colors;
            list.push(DrawCommand::Rect(RectPart::solid(
                0.0,
                far.y as f32,
                w as f32,
                (near.y - far.y) as f32,
                colors.grass,
            )));
            list.push(DrawCommand::Trapezoid {
                near: Span::scaled(&near, 1.0, 0.0),
                far: Span::scaled(&far, 1.0, 0.0),
                color: colors.road,
            });
            let rumble_shift = 1.0 + RUMBLE_FRACTION / 2.0;
            for side in [-1.0, 1.0] {
                list.push(DrawCommand::Trapezoid {
                    near: Span::scaled(&near, RUMBLE_FRACTION / 2.0, side * rumble_shift),
                    far: Span::scaled(&far, RUMBLE_FRACTION / 2.0, side * rumble_shift),
                    color: colors.rumble,
                });
            }
            if let Some(lane) = colors.lane {
                list.push(DrawCommand::Trapezoid {
                    near: Span::scaled(&near, LANE_FRACTION / 2.0, 0.0),
                    far: Span::scaled(&far, LANE_FRACTION / 2.0, 0.0),
                    color: lane,
                });
            }
            max_y = far.y;

            if fog > 0.0 && n as f64 > fog_start {
                let percent = (n as f64 - fog_start) / (self.draw_distance as f64 - fog_start);
                list.push(DrawCommand::Rect(RectPart::blended(
                    0.0,
                    far.y as f32,
                    w as f32,
                    (near.y - far.y) as f32,
                    env.fog_color,
                    (percent * 2.0).min(1.0) as f32,
                )));
            }
        }
    }

    /// Queued traffic, farthest first. Sprites fully hidden behind a crest
    /// are dropped.
    fn draw_traffic(&mut self, list: &mut DrawList) {
        let w = self.viewport.width;
        for queued in self.scratch.sprites.iter().rev() {
            let road_half_width = queued.scale * self.road_width * w / 2.0;
            let width = (2.0 * road_half_width) as f32 * SPRITE_ROAD_FRACTION;
            let sprite = SpriteCommand {
                kind: SpriteKind::Traffic {
                    variant: queued.variant,
                },
                center_x: queued.x as f32,
                bottom: queued.y as f32,
                width,
                height: width / 2.0,
                clip_y: queued.clip as f32,
            };
            if sprite.top() > sprite.clip_y {
                continue;
            }
            list.push(DrawCommand::Sprite(sprite));
        }
    }
}

/// Checkered finish flag on a pole, top right.
fn push_flag(list: &mut DrawList, width: f32) {
    const CELL: f32 = 20.0;
    let x = width - 150.0;
    let y = 50.0;
    list.push(DrawCommand::Rect(RectPart::solid(x, y, 10.0, 200.0, palette::FLAG_POLE)));
    for row in 0..4u8 {
        for col in 0..4u8 {
            let color = if (row + col) % 2 == 0 { palette::BLACK } else { palette::WHITE };
            list.push(DrawCommand::Rect(RectPart::solid(
                x - f32::from(4 - col) * CELL,
                y + f32::from(row) * CELL,
                CELL,
                CELL,
                color,
            )));
        }
    }
}
