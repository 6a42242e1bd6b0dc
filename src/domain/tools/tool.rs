use crate::domain::errors::DrawingError;
use crate::domain::mapping::DomainPoint;
use crate::domain::tools::kind::ToolKind;
use crate::domain::tools::options::ToolOptions;
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Identity of a live tool; never reused within a session
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into, Serialize, Deserialize,
)]
#[display(fmt = "{}", _0)]
pub struct ToolId(u64);

impl ToolId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Serializable geometry and style of a tool, the unit of history snapshots
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolState {
    pub points: Vec<DomainPoint>,
    pub options: ToolOptions,
}

/// A placed drawing primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: ToolId,
    pub kind: ToolKind,
    pub points: Vec<DomainPoint>,
    pub options: ToolOptions,
    pub selected: bool,
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_id: Option<String>,
}

impl Tool {
    pub fn new(id: ToolId, kind: ToolKind, points: Vec<DomainPoint>, options: ToolOptions) -> Self {
        Self { id, kind, points, options, selected: false, locked: false, alert_id: None }
    }

    pub fn state(&self) -> ToolState {
        ToolState { points: self.points.clone(), options: self.options.clone() }
    }

    /// Replace geometry and style in place
    pub fn restore(&mut self, state: &ToolState) {
        self.points = state.points.clone();
        self.options = state.options.clone();
    }

    pub fn update_points(&mut self, points: Vec<DomainPoint>) {
        self.points = points;
    }

    pub fn apply_options(&mut self, patch: &ToolOptions) {
        self.options.merge(patch);
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn point_mut(&mut self, index: usize) -> Result<&mut DomainPoint, DrawingError> {
        let len = self.points.len();
        self.points.get_mut(index).ok_or(DrawingError::PointIndexOutOfRange { index, len })
    }

    /// Move one edit handle to `point`.
    ///
    /// Handle indices follow the hit test: anchors first, then derived
    /// handles (box corners 2..3 and edges 4..7, channel offset 2).
    pub fn update_point_by_index(&mut self, index: usize, point: DomainPoint) -> Result<(), DrawingError> {
        use ToolKind::*;
        match self.kind {
            HorizontalLine => self.point_mut(index)?.price = point.price,
            VerticalLine => self.point_mut(index)?.logical = point.logical,
            LongPosition | ShortPosition if index == 0 => {
                let entry = *self.point_mut(0)?;
                self.translate(point.logical - entry.logical, point.price - entry.price);
            }
            kind if kind.has_box_handles() && index >= 2 => {
                if self.points.len() < 2 {
                    return Err(DrawingError::PointIndexOutOfRange { index, len: self.points.len() });
                }
                let (first, second) = self.points.split_at_mut(1);
                let (p1, p2) = (&mut first[0], &mut second[0]);
                match index {
                    2 => {
                        p1.logical = point.logical;
                        p2.price = point.price;
                    }
                    3 => {
                        p2.logical = point.logical;
                        p1.price = point.price;
                    }
                    4 => p1.price = point.price,
                    5 => p2.price = point.price,
                    6 => p1.logical = point.logical,
                    7 => p2.logical = point.logical,
                    _ => return Err(DrawingError::PointIndexOutOfRange { index, len: 8 }),
                }
            }
            _ => *self.point_mut(index)? = point,
        }
        Ok(())
    }

    /// Shift the whole tool; axis-constrained lines keep their fixed axis
    pub fn translate(&mut self, d_logical: f64, d_price: f64) {
        let (dl, dp) = match self.kind {
            ToolKind::HorizontalLine => (0.0, d_price),
            ToolKind::VerticalLine => (d_logical, 0.0),
            _ => (d_logical, d_price),
        };
        for p in &mut self.points {
            *p = p.offset(dl, dp);
        }
    }

    /// Price of a line-like tool at `logical`, honoring extension flags
    pub fn price_at_logical(&self, logical: f64) -> Option<f64> {
        use ToolKind::*;
        match self.kind {
            HorizontalLine => self.points.first().map(|p| p.price),
            HorizontalRay => self.points.first().filter(|p| logical >= p.logical).map(|p| p.price),
            TrendLine | Ray | ExtendedLine | Arrow => {
                let (p1, p2) = (self.points.first()?, self.points.get(1)?);
                let span = p2.logical - p1.logical;
                if span == 0.0 {
                    return Option::None;
                }
                let t = (logical - p1.logical) / span;
                let (extend_left, extend_right) = self.options.extends();
                if (t < 0.0 && !extend_left) || (t > 1.0 && !extend_right) {
                    return Option::None;
                }
                Some(p1.price + (p2.price - p1.price) * t)
            }
            _ => Option::None,
        }
    }

    /// Price band covered by an area tool at `logical`
    pub fn zone_at_logical(&self, logical: f64) -> Option<(f64, f64)> {
        let (p1, p2) = (self.points.first()?, self.points.get(1)?);
        let (lo_l, hi_l) = (p1.logical.min(p2.logical), p1.logical.max(p2.logical));
        if logical < lo_l || logical > hi_l {
            return None;
        }
        match self.kind {
            ToolKind::Rectangle => Some((p1.price.min(p2.price), p1.price.max(p2.price))),
            ToolKind::ParallelChannel => {
                let p3 = self.points.get(2)?;
                let span = p2.logical - p1.logical;
                if span == 0.0 {
                    return None;
                }
                let slope = (p2.price - p1.price) / span;
                let base = p1.price + slope * (logical - p1.logical);
                let offset = p3.price - (p1.price + slope * (p3.logical - p1.logical));
                Some((base.min(base + offset), base.max(base + offset)))
            }
            _ => None,
        }
    }

    /// Reference price shown for an alert before the next candle arrives
    pub fn reference_price(&self) -> Option<f64> {
        self.points.get(1).or(self.points.first()).map(|p| p.price)
    }
}
