//! Raster backend
//!
//! Applies a `FrameView` to an RGB24 pixel buffer:
//!
//! ```text
//! +-------------------------------------------+
//! |      Swarm Simulation: <name>             |  title band
//! |  +-------------------------------------+  |
//! |  | Leader banner             [legend]  |  |
//! |  | Time banner                         |  |
//! |  |   tasks, trails, agent markers      |  |  plot area (equal axes)
//! |  +-------------------------------------+  |
//! +-------------------------------------------+
//! ```
//!
//! Shapes are drawn with `plotters` on a bitmap backend; text is blitted
//! afterwards with the built-in glyph font.

use crate::models::position::Position;
use crate::models::scenario::{Area, Scenario};
use crate::playback::glyphs::{text_height, text_width, GlyphCanvas};
use crate::playback::PlaybackError;
use crate::render::palette::{self, Rgb};
use crate::render::view::{AgentVisual, FrameView, MarkerShape, TaskVisual};
use plotters::coord::Shift;
use plotters::prelude::{
    BitMapBackend, Circle, Color, DrawingArea, DrawingAreaErrorKind, IntoDrawingArea,
    PathElement, Polygon, RGBColor, Rectangle,
};

type Canvas<'b> = DrawingArea<BitMapBackend<'b>, Shift>;

const TITLE_BAND: f64 = 48.0;
const MARGIN: f64 = 24.0;
const REFERENCE_WIDTH: f64 = 1000.0;

/// Marker size units (points) to pixels at the reference width
const POINTS_TO_PIXELS: f64 = 0.7;
const CROSS_HALF_SIZE: f64 = 2.0;

const BACKGROUND: Rgb = Rgb(255, 255, 255);
const GRID: Rgb = Rgb(176, 176, 176);
const GRID_ALPHA: f64 = 0.3;
const LEGEND_BACKGROUND_ALPHA: f64 = 0.8;
const LEGEND_BORDER: Rgb = Rgb(204, 204, 204);

fn to_rgb(color: Rgb) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn draw_failed<E>(err: DrawingAreaErrorKind<E>) -> PlaybackError
where
    E: std::error::Error + Send + Sync,
{
    PlaybackError::Render(err.to_string())
}

/// Pixel rectangle of the plot area
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlotRect {
    x0: f64,
    y0: f64,
    width: f64,
    height: f64,
}

/// One legend row: swatch and label position in pixels
#[derive(Debug, Clone, PartialEq)]
struct LegendEntry {
    swatch: (i32, i32, i32, i32),
    color: Rgb,
    text_x: usize,
    text_y: usize,
    text_width: usize,
    label: String,
}

/// Static frame geometry for one scenario and output size
///
/// Computed once per run; every frame is painted against it.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneLayout {
    title: String,
    area: Area,
    width: usize,
    height: usize,
    plot: PlotRect,

    /// Pixel scale factor relative to a 1000 px wide frame
    ui_scale: f64,
}

impl SceneLayout {
    /// Fit the scenario area into a `width` × `height` frame, keeping its
    /// aspect ratio
    pub fn new(scenario: &Scenario, width: usize, height: usize) -> Self {
        let area = scenario.area();
        let width = width.max(1);
        let height = height.max(1);
        let ui_scale = (width.min(height) as f64 / REFERENCE_WIDTH).max(0.25);

        let available_w = (width as f64 - 2.0 * MARGIN * ui_scale).max(1.0);
        let available_h = (height as f64 - (TITLE_BAND + MARGIN) * ui_scale).max(1.0);
        let aspect = area.width() / area.height();
        let (plot_w, plot_h) = if available_w / available_h > aspect {
            (available_h * aspect, available_h)
        } else {
            (available_w, available_w / aspect)
        };

        Self {
            title: scenario.title(),
            area,
            width,
            height,
            plot: PlotRect {
                x0: (width as f64 - plot_w) / 2.0,
                y0: TITLE_BAND * ui_scale + (available_h - plot_h) / 2.0,
                width: plot_w,
                height: plot_h,
            },
            ui_scale,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes in one RGB24 frame
    pub fn frame_len(&self) -> usize {
        self.width * self.height * 3
    }

    /// Map an area position to pixel coordinates (y grows downwards)
    pub fn to_pixel(&self, position: Position) -> (i32, i32) {
        let fx = (position.x - self.area.xmin) / self.area.width();
        let fy = (position.y - self.area.ymin) / self.area.height();
        let px = self.plot.x0 + fx * self.plot.width;
        let py = self.plot.y0 + self.plot.height - fy * self.plot.height;
        (clamp_coord(px), clamp_coord(py))
    }

    /// Convert a length in area units to pixels
    pub fn scale_length(&self, length: f64) -> f64 {
        length / self.area.width() * self.plot.width
    }

    fn marker_radius(&self, size: f64) -> i32 {
        ((size * POINTS_TO_PIXELS * self.ui_scale).round() as i32).max(1)
    }

    fn text_scale(&self, base: f64) -> usize {
        ((base * self.ui_scale).round() as usize).max(1)
    }

    /// Paint one frame
    pub fn paint(&self, view: &FrameView) -> Result<Vec<u8>, PlaybackError> {
        let mut buffer = vec![0u8; self.frame_len()];
        let legend = self.legend_entries(&view.agents);
        {
            let backend =
                BitMapBackend::with_buffer(&mut buffer, (self.width as u32, self.height as u32));
            let root = backend.into_drawing_area();
            root.fill(&to_rgb(BACKGROUND)).map_err(draw_failed)?;

            self.draw_grid(&root)?;
            for task in &view.tasks {
                self.draw_task(&root, task)?;
            }
            for agent in &view.agents {
                self.draw_trail(&root, agent)?;
            }
            for agent in &view.agents {
                self.draw_marker(&root, agent)?;
            }
            self.draw_legend_frame(&root, &legend)?;
            root.present().map_err(draw_failed)?;
        }

        let mut canvas = GlyphCanvas::new(&mut buffer, self.width, self.height);
        self.draw_labels(&mut canvas, view);
        self.draw_banners(&mut canvas, view);
        self.draw_title(&mut canvas);
        let legend_scale = self.text_scale(1.5);
        for entry in &legend {
            canvas.draw_text(
                entry.text_x,
                entry.text_y,
                &entry.label,
                legend_scale,
                palette::BLACK,
                1.0,
            );
        }

        Ok(buffer)
    }

    // ------------------------------------------------------------------------
    // Shapes
    // ------------------------------------------------------------------------

    fn draw_grid(&self, root: &Canvas<'_>) -> Result<(), PlaybackError> {
        let style = to_rgb(GRID).mix(GRID_ALPHA).stroke_width(1);
        let (left, bottom) = self.to_pixel(Position::new(self.area.xmin, self.area.ymin));
        let (right, top) = self.to_pixel(Position::new(self.area.xmax, self.area.ymax));

        for x in grid_ticks(self.area.xmin, self.area.xmax) {
            let (px, _) = self.to_pixel(Position::new(x, self.area.ymin));
            root.draw(&PathElement::new(vec![(px, top), (px, bottom)], style))
                .map_err(draw_failed)?;
        }
        for y in grid_ticks(self.area.ymin, self.area.ymax) {
            let (_, py) = self.to_pixel(Position::new(self.area.xmin, y));
            root.draw(&PathElement::new(vec![(left, py), (right, py)], style))
                .map_err(draw_failed)?;
        }

        root.draw(&Rectangle::new(
            [(left, top), (right, bottom)],
            to_rgb(palette::BLACK).stroke_width(1),
        ))
        .map_err(draw_failed)
    }

    fn draw_task(&self, root: &Canvas<'_>, task: &TaskVisual) -> Result<(), PlaybackError> {
        let center = self.to_pixel(task.position);
        if task.marker_alpha > 0.0 {
            let radius = self.scale_length(task.radius).round().max(1.0) as i32;
            let style = to_rgb(task.marker_color).mix(task.marker_alpha).filled();
            root.draw(&Circle::new(center, radius, style))
                .map_err(draw_failed)?;
        }

        let half = ((CROSS_HALF_SIZE * self.ui_scale).round() as i32).max(1);
        let style = to_rgb(palette::BLACK).mix(task.cross_alpha).stroke_width(1);
        let (cx, cy) = center;
        root.draw(&PathElement::new(
            vec![(cx - half, cy - half), (cx + half, cy + half)],
            style,
        ))
        .map_err(draw_failed)?;
        root.draw(&PathElement::new(
            vec![(cx - half, cy + half), (cx + half, cy - half)],
            style,
        ))
        .map_err(draw_failed)
    }

    fn draw_trail(&self, root: &Canvas<'_>, agent: &AgentVisual) -> Result<(), PlaybackError> {
        if agent.trail.len() < 2 || agent.trail_alpha <= 0.0 {
            return Ok(());
        }
        let points: Vec<(i32, i32)> = agent.trail.iter().map(|p| self.to_pixel(*p)).collect();
        let style = to_rgb(agent.color)
            .mix(agent.trail_alpha)
            .stroke_width(agent.trail_width);
        root.draw(&PathElement::new(points, style))
            .map_err(draw_failed)
    }

    fn draw_marker(&self, root: &Canvas<'_>, agent: &AgentVisual) -> Result<(), PlaybackError> {
        let Some(position) = agent.position else {
            return Ok(());
        };
        let (cx, cy) = self.to_pixel(position);
        let radius = self.marker_radius(agent.marker_size);
        let style = to_rgb(agent.color).mix(agent.marker_alpha).filled();

        let drawn = match agent.shape {
            MarkerShape::Circle => root.draw(&Circle::new((cx, cy), radius, style)),
            MarkerShape::Diamond => root.draw(&Polygon::new(
                vec![
                    (cx, cy - radius),
                    (cx + radius, cy),
                    (cx, cy + radius),
                    (cx - radius, cy),
                ],
                style,
            )),
        };
        drawn.map_err(draw_failed)
    }

    fn draw_legend_frame(
        &self,
        root: &Canvas<'_>,
        legend: &[LegendEntry],
    ) -> Result<(), PlaybackError> {
        let Some((left, top, right, bottom)) = legend_bounds(legend, self.ui_scale) else {
            return Ok(());
        };
        root.draw(&Rectangle::new(
            [(left, top), (right, bottom)],
            to_rgb(BACKGROUND).mix(LEGEND_BACKGROUND_ALPHA).filled(),
        ))
        .map_err(draw_failed)?;
        root.draw(&Rectangle::new(
            [(left, top), (right, bottom)],
            to_rgb(LEGEND_BORDER).stroke_width(1),
        ))
        .map_err(draw_failed)?;

        for entry in legend {
            let (x0, y0, x1, y1) = entry.swatch;
            root.draw(&Rectangle::new(
                [(x0, y0), (x1, y1)],
                to_rgb(entry.color).filled(),
            ))
            .map_err(draw_failed)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Text
    // ------------------------------------------------------------------------

    fn draw_labels(&self, canvas: &mut GlyphCanvas<'_>, view: &FrameView) {
        let scale = self.text_scale(1.5);
        for task in &view.tasks {
            let (x, y) = self.to_pixel(task.label_position);
            let y = i64::from(y) - text_height(scale) as i64;
            canvas.draw_text_centered(
                i64::from(x),
                y,
                &task.label,
                scale,
                task.label_color,
                task.label_alpha,
            );
        }
    }

    fn draw_banners(&self, canvas: &mut GlyphCanvas<'_>, view: &FrameView) {
        let scale = self.text_scale(2.0);
        let line = text_height(scale);
        let x = (self.plot.x0 + 0.02 * self.plot.width) as usize;
        let leader_y = (self.plot.y0 + 0.05 * self.plot.height) as usize;
        let time_y = (self.plot.y0 + 0.08 * self.plot.height) as usize;

        let leader_text = view.leader_text();
        let leader_top = leader_y.saturating_sub(line);
        let leader_color = if view.leader.is_reelecting() {
            // flag the election with a filled box behind the text
            let pad = scale * 2;
            canvas.fill_rect(
                x.saturating_sub(pad),
                leader_top.saturating_sub(pad),
                text_width(&leader_text, scale) + 2 * pad,
                line + 2 * pad,
                palette::ALERT,
                1.0,
            );
            palette::WHITE
        } else {
            palette::ALERT
        };
        canvas.draw_text(x, leader_top, &leader_text, scale, leader_color, 1.0);

        let time_top = time_y.saturating_sub(line);
        canvas.draw_text(x, time_top, &view.time_text(), scale, palette::BLACK, 1.0);
    }

    fn draw_title(&self, canvas: &mut GlyphCanvas<'_>) {
        let scale = self.text_scale(3.0);
        let band = TITLE_BAND * self.ui_scale;
        let y = ((band - text_height(scale) as f64) / 2.0).max(0.0) as i64;
        canvas.draw_text_centered(
            (self.width / 2) as i64,
            y,
            &self.title,
            scale,
            palette::BLACK,
            1.0,
        );
    }

    /// Legend rows in the top-right corner of the plot, two columns when crowded
    fn legend_entries(&self, agents: &[AgentVisual]) -> Vec<LegendEntry> {
        if agents.is_empty() {
            return Vec::new();
        }
        let scale = self.text_scale(1.5);
        let row_height = text_height(scale) + 3 * scale;
        let swatch = text_height(scale) as i32;
        let columns = if agents.len() > 10 { 2 } else { 1 };
        let label_width = agents
            .iter()
            .map(|agent| text_width(&agent.label, scale))
            .max()
            .unwrap_or(0);
        let column_width = swatch as usize + 2 * scale + label_width + 4 * scale;

        let pad = 3 * scale;
        let right = (self.plot.x0 + self.plot.width) as usize;
        let left = right.saturating_sub(columns * column_width + 2 * pad);
        let top = self.plot.y0 as usize + pad;

        agents
            .iter()
            .enumerate()
            .map(|(i, agent)| {
                let rows = agents.len().div_ceil(columns);
                let column = i / rows;
                let row = i % rows;
                let x = left + pad + column * column_width;
                let y = top + pad + row * row_height;
                LegendEntry {
                    swatch: (x as i32, y as i32, x as i32 + swatch, y as i32 + swatch),
                    color: agent.color,
                    text_x: x + swatch as usize + 2 * scale,
                    text_y: y,
                    text_width: text_width(&agent.label, scale),
                    label: agent.label.clone(),
                }
            })
            .collect()
    }
}

fn legend_bounds(legend: &[LegendEntry], ui_scale: f64) -> Option<(i32, i32, i32, i32)> {
    let pad = ((4.0 * ui_scale).round() as i32).max(2);
    let left = legend.iter().map(|e| e.swatch.0).min()? - pad;
    let top = legend.iter().map(|e| e.swatch.1).min()? - pad;
    let right = legend
        .iter()
        .map(|e| (e.text_x + e.text_width) as i32)
        .max()?
        + pad;
    let bottom = legend.iter().map(|e| e.swatch.3).max()? + pad;
    Some((left, top, right, bottom))
}

fn clamp_coord(value: f64) -> i32 {
    if value.is_finite() {
        value.round().clamp(-1.0e6, 1.0e6) as i32
    } else {
        -1
    }
}

/// Upper bound on grid lines per axis
const MAX_TICKS: usize = 64;

/// Evenly spaced "nice" tick positions (steps of 1, 2 or 5 × 10^k)
///
/// Ticks are computed as `first + k * step`, capped at `MAX_TICKS`, so a step
/// below the float resolution at `min` cannot stall the loop.
fn grid_ticks(min: f64, max: f64) -> Vec<f64> {
    let span = max - min;
    if !(span.is_finite() && span > 0.0) {
        return Vec::new();
    }
    let raw = span / 8.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|step| *step >= raw)
        .unwrap_or(10.0 * magnitude);

    let first = (min / step).ceil() * step;
    let limit = max + step * 1e-9;
    let mut ticks: Vec<f64> = Vec::new();
    for k in 0..MAX_TICKS {
        let tick = first + k as f64 * step;
        if tick > limit {
            break;
        }
        // steps below the resolution at `first` collapse onto one value
        if ticks.last() == Some(&tick) {
            continue;
        }
        ticks.push(tick);
    }
    ticks
}
