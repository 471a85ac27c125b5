use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::Result;

/// Stable node identifier, the primary key of a ruler.
pub type NodeId = u64;

pub const DEFAULT_BORDER_COLOR: &str = "#CCCCCC";
pub const DEFAULT_BORDER_WIDTH: f64 = 2.0;
pub const HIGHLIGHT_LINK_COLOR: &str = "#FF4081";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
	Admin,
	#[default]
	Active,
	Pending,
	Inactive,
}

impl Status {
	pub fn display_name(self) -> &'static str {
		match self {
			Status::Admin => "Administrator",
			Status::Active => "Active",
			Status::Pending => "Pending",
			Status::Inactive => "Inactive",
		}
	}
}

/// Side of the formation a ruler or a vassalage link belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Flank {
	Left = 1,
	Center = 2,
	Right = 3,
}

impl Flank {
	pub fn from_code(code: u8) -> Option<Self> {
		match code {
			1 => Some(Flank::Left),
			2 => Some(Flank::Center),
			3 => Some(Flank::Right),
			_ => None,
		}
	}

	pub fn display_name(flank: Option<Self>) -> &'static str {
		match flank {
			Some(Flank::Left) => "Left",
			Some(Flank::Center) => "Center",
			Some(Flank::Right) => "Right",
			None => "Not set",
		}
	}
}

impl TryFrom<u8> for Flank {
	type Error = String;

	fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
		Flank::from_code(code).ok_or_else(|| format!("unknown flank code {code}"))
	}
}

impl From<Flank> for u8 {
	fn from(flank: Flank) -> u8 {
		flank as u8
	}
}

/// A ruler in the hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	pub id: NodeId,
	/// Short glyph drawn inside the node circle.
	#[serde(default)]
	pub label: String,
	pub username: String,
	pub title: String,
	#[serde(default)]
	pub treasury: u64,
	#[serde(default)]
	pub vassals: u32,
	#[serde(default)]
	pub status: Status,
	#[serde(default, alias = "position")]
	pub flank_position: Option<Flank>,
	#[serde(default = "default_color")]
	pub color: String,
	#[serde(default)]
	pub border_color: Option<String>,
	#[serde(default)]
	pub border_width: Option<f64>,
	/// Layout position. Non-finite means the node has not been placed yet.
	#[serde(default = "unplaced")]
	pub x: f64,
	#[serde(default = "unplaced")]
	pub y: f64,
	#[serde(default)]
	pub fx: Option<f64>,
	#[serde(default)]
	pub fy: Option<f64>,
	#[serde(default)]
	pub is_highlighted: bool,
}

fn default_color() -> String {
	"#764ba2".into()
}

fn unplaced() -> f64 {
	f64::NAN
}

impl Node {
	pub fn is_placed(&self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}

	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}

	pub fn border_color(&self) -> &str {
		self.border_color.as_deref().unwrap_or(DEFAULT_BORDER_COLOR)
	}

	pub fn border_width(&self) -> f64 {
		self.border_width.unwrap_or(DEFAULT_BORDER_WIDTH)
	}

	/// Treasury with space-separated digit groups, e.g. `1 250 000`.
	pub fn treasury_display(&self) -> String {
		group_digits(self.treasury)
	}
}

fn group_digits(value: u64) -> String {
	let digits = value.to_string();
	let mut out = String::with_capacity(digits.len() + digits.len() / 3);
	for (i, ch) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			out.push(' ');
		}
		out.push(ch);
	}
	out
}

/// A directed vassalage relationship between two rulers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
	pub source: NodeId,
	pub target: NodeId,
	/// Presentation category only; physics ignores it.
	#[serde(default)]
	pub flank: u8,
	#[serde(default)]
	pub is_highlighted: bool,
}

impl Link {
	pub fn color(&self) -> &'static str {
		if self.is_highlighted {
			return HIGHLIGHT_LINK_COLOR;
		}
		match Flank::from_code(self.flank) {
			Some(Flank::Left) => "#FF6B6B",
			Some(Flank::Center) => "#4ECDC4",
			Some(Flank::Right) => "#FFD166",
			None => "#9E9E9E",
		}
	}

	pub fn is_dashed(&self) -> bool {
		Flank::from_code(self.flank) == Some(Flank::Center)
	}

	pub fn touches(&self, id: NodeId) -> bool {
		self.source == id || self.target == id
	}
}

/// The document handed over by the data source at start-up.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
	pub nodes: Vec<Node>,
	pub links: Vec<Link>,
}

impl Dataset {
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}
}

/// Position of one node after a layout step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
	pub id: NodeId,
	pub x: f64,
	pub y: f64,
}

impl fmt::Display for Position {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}@({:.1}, {:.1})", self.id, self.x, self.y)
	}
}
