use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{CanvasState, node_radius};
use crate::graph::Node;

const BACKGROUND: &str = "#1a1a2e";

pub fn render(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_links(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
	draw_tooltip(state, ctx);
}

fn draw_links(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let model = state.visualizer.model();
	let dashed = js_sys::Array::of2(&JsValue::from_f64(5.0), &JsValue::from_f64(5.0));
	let solid = js_sys::Array::new();

	for link in model.links() {
		let (Ok(source), Ok(target)) = (model.find_node(link.source), model.find_node(link.target))
		else {
			continue;
		};
		ctx.set_stroke_style_str(link.color());
		ctx.set_line_width(if link.is_highlighted { 3.0 } else { 2.0 });
		let dash: &JsValue = if link.is_dashed() { &dashed } else { &solid };
		let _ = ctx.set_line_dash(dash);
		ctx.begin_path();
		ctx.move_to(source.x, source.y);
		ctx.line_to(target.x, target.y);
		ctx.stroke();
	}
	let _ = ctx.set_line_dash(&solid);
}

fn draw_nodes(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for node in state.visualizer.model().nodes() {
		let radius = node_radius(node);
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&node.color);
		ctx.fill();
		ctx.set_stroke_style_str(node.border_color());
		ctx.set_line_width(if node.is_highlighted {
			4.0
		} else {
			node.border_width()
		});
		ctx.stroke();

		ctx.set_fill_style_str("white");
		ctx.set_font(if node.is_highlighted {
			"bold 20px sans-serif"
		} else {
			"bold 16px sans-serif"
		});
		let _ = ctx.fill_text(&node.label, node.x, node.y);
	}
}

fn tooltip_lines(node: &Node) -> [String; 6] {
	[
		format!("{} {}", node.label, node.username),
		format!("ID: {}", node.id),
		format!("Title: {}", node.title),
		format!("Treasury: {} PZM", node.treasury_display()),
		format!("Vassals: {}", node.vassals),
		format!("Status: {}", node.status.display_name()),
	]
}

fn draw_tooltip(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	if state.drag.node.is_some() {
		return;
	}
	let Some(node) = state
		.hover
		.node
		.and_then(|id| state.visualizer.model().find_node(id).ok())
	else {
		return;
	};

	let lines = tooltip_lines(node);
	let line_height = 16.0;
	// Rough width; the canvas font is close to 7px per glyph at 12px.
	let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as f64 * 7.0 + 16.0;
	let height = lines.len() as f64 * line_height + 12.0;
	let (x, y) = (state.hover.x + 10.0, state.hover.y - 10.0);

	ctx.set_global_alpha(0.9);
	ctx.set_fill_style_str("#000000");
	ctx.fill_rect(x, y, width, height);
	ctx.set_global_alpha(1.0);

	ctx.set_text_align("left");
	ctx.set_text_baseline("top");
	ctx.set_fill_style_str("white");
	for (i, line) in lines.iter().enumerate() {
		ctx.set_font(if i == 0 {
			"bold 12px sans-serif"
		} else {
			"12px sans-serif"
		});
		let _ = ctx.fill_text(line, x + 8.0, y + 6.0 + i as f64 * line_height);
	}
}
