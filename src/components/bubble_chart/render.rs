//! Canvas rendering for the bubble chart.
//!
//! Pure projection of the node store: nothing here mutates chart state.
//! Passes, back to front:
//! 1. Surface background
//! 2. Bubbles in store order (later nodes on top), each with fill, avatar, labels
//! 3. Hover ring and tooltip for the hovered bubble

use std::collections::HashMap;
use std::f64::consts::PI;

use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::scale::LabelFonts;
use super::state::{ChartState, SimulationNode};
use super::theme::Theme;
use super::tooltip::{PriceHistory, format_change, sparkline_points, tooltip_lines};
use super::viewport::Viewport;

/// Share of the bubble diameter available to label text.
const TEXT_WIDTH_RATIO: f64 = 0.8;

/// Loaded avatar images, keyed by URL.
#[derive(Default)]
pub struct AvatarCache {
	images: HashMap<String, HtmlImageElement>,
}

impl AvatarCache {
	/// Start loading any URL not seen before.
	pub fn sync(&mut self, urls: &[String]) {
		for url in urls {
			if self.images.contains_key(url) {
				continue;
			}
			let Ok(image) = HtmlImageElement::new() else {
				continue;
			};
			image.set_cross_origin(Some("anonymous"));
			image.set_src(url);
			self.images.insert(url.clone(), image);
		}
	}

	/// Number of images that have finished loading.
	pub fn loaded(&self) -> usize {
		self.images
			.values()
			.filter(|img| img.complete() && img.natural_width() > 0)
			.count()
	}

	/// The image for `url`, once fully loaded.
	fn ready(&self, url: &str) -> Option<&HtmlImageElement> {
		self.images
			.get(url)
			.filter(|img| img.complete() && img.natural_width() > 0)
	}
}

/// Renders the complete chart to the canvas.
pub fn render(
	state: &ChartState,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	avatars: &AvatarCache,
	history: &dyn PriceHistory,
) {
	let Some(viewport) = state.viewport() else {
		return;
	};

	draw_background(ctx, viewport, theme);

	for node in state.store.nodes() {
		draw_bubble(ctx, node, theme);
		let avatar = node
			.record
			.image_url
			.as_deref()
			.and_then(|url| avatars.ready(url));
		if let Some(image) = avatar {
			draw_avatar(ctx, node, image);
		}
		draw_labels(ctx, node, theme, avatar.is_some());
	}

	for (index, node) in state.store.nodes().iter().enumerate() {
		let t = state.hover.intensity(index);
		if t > 0.01 {
			draw_hover_ring(ctx, node, theme, t);
		}
	}

	if let Some(node) = state
		.hover
		.hovered
		.filter(|_| !state.is_dragging())
		.and_then(|i| state.store.nodes().get(i))
	{
		draw_tooltip(ctx, node, viewport, theme, history);
	}
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn draw_background(ctx: &CanvasRenderingContext2d, viewport: Viewport, theme: &Theme) {
	ctx.clear_rect(0.0, 0.0, viewport.width, viewport.height);
	rounded_rect(
		ctx,
		0.0,
		0.0,
		viewport.width,
		viewport.height,
		theme.surface.corner_radius,
	);
	ctx.set_fill_style_str(&theme.surface.background.to_css());
	ctx.fill();
}

fn draw_bubble(ctx: &CanvasRenderingContext2d, node: &SimulationNode, theme: &Theme) {
	let (x, y, r) = (node.x, node.y, node.radius);
	let style = theme.trend(node.record.change_pct);

	// 135deg: top-left to bottom-right
	let gradient = ctx.create_linear_gradient(x - r, y - r, x + r, y + r);
	let _ = gradient.add_color_stop(0.0, &style.from.to_css());
	let _ = gradient.add_color_stop(1.0, &style.to.to_css());

	ctx.save();
	ctx.set_shadow_color(&theme.surface.shadow.to_css());
	ctx.set_shadow_blur(theme.surface.shadow_blur);
	ctx.set_shadow_offset_y(theme.surface.shadow_offset_y);
	ctx.begin_path();
	let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
	ctx.restore();

	ctx.begin_path();
	let _ = ctx.arc(x, y, (r - 0.5).max(0.0), 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(&theme.surface.rim.to_css());
	ctx.set_line_width(1.0);
	ctx.stroke();
}

fn avatar_geometry(node: &SimulationNode) -> (f64, f64, f64) {
	let r = node.radius * 0.22;
	(node.x, node.y - node.radius * 0.5, r)
}

fn draw_avatar(ctx: &CanvasRenderingContext2d, node: &SimulationNode, image: &HtmlImageElement) {
	let (ax, ay, ar) = avatar_geometry(node);
	ctx.save();
	ctx.begin_path();
	let _ = ctx.arc(ax, ay, ar, 0.0, 2.0 * PI);
	ctx.clip();
	let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
		image,
		ax - ar,
		ay - ar,
		ar * 2.0,
		ar * 2.0,
	);
	ctx.restore();
}

/// Truncate `text` with an ellipsis until it fits `max_width` in the current font.
fn fit_text(ctx: &CanvasRenderingContext2d, text: &str, max_width: f64) -> String {
	let width = |s: &str| ctx.measure_text(s).map(|m| m.width()).unwrap_or(0.0);
	if width(text) <= max_width {
		return text.to_string();
	}
	let mut chars: Vec<char> = text.chars().collect();
	while !chars.is_empty() {
		chars.pop();
		let candidate: String = chars.iter().collect::<String>().trim_end().to_string() + "…";
		if width(&candidate) <= max_width {
			return candidate;
		}
	}
	String::new()
}

fn draw_labels(ctx: &CanvasRenderingContext2d, node: &SimulationNode, theme: &Theme, has_avatar: bool) {
	let fonts = LabelFonts::for_radius(node.radius);
	let (x, r) = (node.x, node.radius);
	let max_width = 2.0 * r * TEXT_WIDTH_RATIO;
	let lines = [
		(fonts.name, fonts.name_css()),
		(fonts.floor, fonts.floor_css()),
		(fonts.change, fonts.change_css()),
	];
	let block: f64 = lines.iter().map(|(size, _)| size * 1.1).sum::<f64>() + 2.0;
	let mut top = node.y - block / 2.0;
	if has_avatar {
		let (_, ay, ar) = avatar_geometry(node);
		top = top.max(ay + ar + 2.0);
	}

	ctx.save();
	ctx.set_text_align("center");
	ctx.set_text_baseline("top");
	ctx.set_shadow_color(&theme.surface.text_shadow.to_css());
	ctx.set_shadow_blur(6.0);
	ctx.set_shadow_offset_y(2.0);

	let texts = [
		node.record.name.clone(),
		format!("{:.2} ETH", node.record.floor_price),
		format_change(node.record.change_pct),
	];
	let colors = [
		theme.surface.text,
		theme.surface.text.with_alpha(0.9),
		theme.trend(node.record.change_pct).label,
	];

	for (i, ((size, font), text)) in lines.iter().zip(texts.iter()).enumerate() {
		if i == 2 {
			top += 2.0;
		}
		ctx.set_font(font);
		ctx.set_fill_style_str(&colors[i].to_css());
		let text = fit_text(ctx, text, max_width);
		let _ = ctx.fill_text(&text, x, top);
		top += size * 1.1;
	}
	ctx.restore();
}

fn draw_hover_ring(ctx: &CanvasRenderingContext2d, node: &SimulationNode, theme: &Theme, t: f64) {
	ctx.begin_path();
	let _ = ctx.arc(node.x, node.y, node.radius + 3.0, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(&theme.ring.with_alpha(theme.ring.a * t).to_css());
	ctx.set_line_width(2.0);
	ctx.stroke();
}

fn draw_tooltip(
	ctx: &CanvasRenderingContext2d,
	node: &SimulationNode,
	viewport: Viewport,
	theme: &Theme,
	history: &dyn PriceHistory,
) {
	let style = &theme.tooltip;
	let lines = tooltip_lines(&node.record);
	ctx.set_font(style.font);
	let text_width = lines
		.iter()
		.map(|l| ctx.measure_text(l).map(|m| m.width()).unwrap_or(0.0))
		.fold(0.0, f64::max);

	let series = history.series(&node.record.name).unwrap_or(&[]);
	let spark_w = text_width.max(120.0);
	let spark = sparkline_points(series, spark_w, style.sparkline_height);

	let w = spark_w + style.padding * 2.0;
	let mut h = lines.len() as f64 * style.line_height + style.padding * 2.0;
	if !spark.is_empty() {
		h += style.sparkline_height + style.padding;
	}

	let x = (node.x + node.radius * 0.7).min(viewport.width - w - 4.0).max(4.0);
	let y = (node.y - node.radius * 0.7 - h).max(4.0);

	rounded_rect(ctx, x, y, w, h, 8.0);
	ctx.set_fill_style_str(&style.background.to_css());
	ctx.fill();
	ctx.set_stroke_style_str(&style.border.to_css());
	ctx.set_line_width(1.0);
	ctx.stroke();

	ctx.set_text_align("left");
	ctx.set_text_baseline("top");
	ctx.set_fill_style_str(&style.text.to_css());
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(
			line,
			x + style.padding,
			y + style.padding + i as f64 * style.line_height,
		);
	}

	if let Some(&(first_x, first_y)) = spark.first() {
		let ox = x + style.padding;
		let oy = y + style.padding + lines.len() as f64 * style.line_height + style.padding;
		ctx.begin_path();
		ctx.move_to(ox + first_x, oy + first_y);
		for &(px, py) in &spark[1..] {
			ctx.line_to(ox + px, oy + py);
		}
		ctx.set_stroke_style_str(&theme.trend(node.record.change_pct).from.to_css());
		ctx.set_line_width(1.5);
		ctx.stroke();
	}
}
