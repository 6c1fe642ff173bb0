//! Layout engine: turns the declarative band configuration into a render
//! tree.
//!
//! The top band is a simple flow of fixed-size tiles. The middle and bottom
//! bands are grids whose columns come from each tile's `width` hint, in
//! declaration order. [`LayoutEngine::build`] is pure: the same config
//! always yields the same tree.

use std::fmt;

use crate::config::{LayoutConfig, TileDescriptor};

/// Width of a top-band tile that has no fixed cell width.
pub const DEFAULT_FLOW_WIDTH: u16 = 24;

/// Shown when no band has any tile.
pub const EMPTY_LAYOUT_MESSAGE: &str =
    "No tiles configured. Add [[layout.top]], [[layout.middle]] or [[layout.bottom]] entries to the config file.";

/// One column size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeToken {
    /// `Nfr`: proportional share of the remaining space.
    Fill(u16),
    /// `N%`: percentage of the band.
    Percent(u16),
    /// `N`: fixed number of cells.
    Length(u16),
}

impl SizeToken {
    /// The equal-share token (`1fr`).
    pub const EQUAL_SHARE: Self = Self::Fill(1);

    /// Parse a width hint. `None` when the hint is not a valid token.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Some(n) = raw.strip_suffix("fr") {
            return n.trim().parse().ok().filter(|n| *n > 0).map(Self::Fill);
        }
        if let Some(n) = raw.strip_suffix('%') {
            return n
                .trim()
                .parse()
                .ok()
                .filter(|n| (1..=100).contains(n))
                .map(Self::Percent);
        }
        raw.parse().ok().filter(|n| *n > 0).map(Self::Length)
    }

    /// Parse an optional hint, degrading to the equal-share token.
    pub fn from_hint(hint: Option<&str>) -> Self {
        hint.and_then(Self::parse).unwrap_or(Self::EQUAL_SHARE)
    }
}

impl fmt::Display for SizeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fill(n) => write!(f, "{n}fr"),
            Self::Percent(n) => write!(f, "{n}%"),
            Self::Length(n) => write!(f, "{n}"),
        }
    }
}

/// A tile in the top flow band.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowTile {
    pub width: u16,
    pub tile: TileDescriptor,
}

/// A tile in a grid band.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub size: SizeToken,
    pub tile: TileDescriptor,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowBand {
    pub tiles: Vec<FlowTile>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridBand {
    pub cells: Vec<GridCell>,
}

impl GridBand {
    /// Column sizes in declaration order.
    pub fn columns(&self) -> Vec<SizeToken> {
        self.cells.iter().map(|c| c.size).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FlowBand {
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// The composed layout.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderTree {
    /// No tiles anywhere: a single diagnostic and no band containers.
    Empty { message: String },
    Bands {
        top: FlowBand,
        middle: GridBand,
        bottom: GridBand,
    },
}

impl RenderTree {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty { .. })
    }

    /// Every tile in focus order: top, middle, bottom.
    pub fn tiles(&self) -> Vec<&TileDescriptor> {
        match self {
            Self::Empty { .. } => Vec::new(),
            Self::Bands {
                top,
                middle,
                bottom,
            } => top
                .tiles
                .iter()
                .map(|t| &t.tile)
                .chain(middle.cells.iter().map(|c| &c.tile))
                .chain(bottom.cells.iter().map(|c| &c.tile))
                .collect(),
        }
    }
}

/// Builds [`RenderTree`]s.
pub struct LayoutEngine;

impl LayoutEngine {
    pub fn build(config: &LayoutConfig) -> RenderTree {
        if config.tile_count() == 0 {
            tracing::warn!("layout has no tiles; rendering empty state");
            return RenderTree::Empty {
                message: EMPTY_LAYOUT_MESSAGE.to_owned(),
            };
        }

        RenderTree::Bands {
            top: FlowBand {
                tiles: config.top.iter().map(flow_tile).collect(),
            },
            middle: grid_band(&config.middle),
            bottom: grid_band(&config.bottom),
        }
    }
}

fn flow_tile(tile: &TileDescriptor) -> FlowTile {
    let width = match SizeToken::from_hint(tile.width.as_deref()) {
        SizeToken::Length(cells) => cells,
        _ => DEFAULT_FLOW_WIDTH,
    };
    FlowTile {
        width,
        tile: tile.clone(),
    }
}

fn grid_band(tiles: &[TileDescriptor]) -> GridBand {
    GridBand {
        cells: tiles
            .iter()
            .map(|tile| {
                let size = SizeToken::from_hint(tile.width.as_deref());
                if tile.width.is_some() && size == SizeToken::EQUAL_SHARE {
                    tracing::debug!(tile = %tile.kind, width = ?tile.width, "width hint treated as 1fr");
                }
                GridCell {
                    size,
                    tile: tile.clone(),
                }
            })
            .collect(),
    }
}
