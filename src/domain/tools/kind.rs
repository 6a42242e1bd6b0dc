use crate::domain::geometry::LineStyle;
use crate::domain::tools::options::{FibLevel, ToolOptions};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Every drawing mode the manager understands, including the non-drawing
/// modes `None`, `Eraser` and `UserPriceAlerts`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, StrumDisplay, EnumIter, EnumString, AsRefStr, Serialize, Deserialize,
)]
pub enum ToolKind {
    #[default]
    None,
    TrendLine,
    Ray,
    ExtendedLine,
    Arrow,
    HorizontalLine,
    HorizontalRay,
    VerticalLine,
    CrossLine,
    Rectangle,
    Circle,
    Triangle,
    ParallelChannel,
    FibRetracement,
    FibExtension,
    Text,
    Callout,
    PriceLabel,
    Brush,
    Highlighter,
    Path,
    LongPosition,
    ShortPosition,
    Measure,
    PriceRange,
    DateRange,
    DatePriceRange,
    ElliottImpulse,
    ElliottCorrection,
    HeadAndShoulders,
    Eraser,
    UserPriceAlerts,
}

/// Geometric family shared by several kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFamily {
    /// Two anchors joined by a (possibly extended) line
    LineLike,
    /// One anchor constrained to an axis, or a text anchor
    SingleAnchor,
    /// Two anchors spanning a box or circle
    AreaLike,
    /// Three anchors
    TripleAnchor,
    /// Variable anchor polyline
    Polyline,
    /// Manager mode without a primitive
    Mode,
}

/// How a kind collects its anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Not placeable
    Mode,
    /// Finalizes on the first click
    SingleClick,
    /// Finalizes after exactly this many clicks
    Clicks(usize),
    /// Pointer-down, drag, pointer-up
    Stroke,
    /// Clicks until a double-click or right-click
    OpenPath,
}

impl ToolKind {
    pub fn family(&self) -> ShapeFamily {
        use ToolKind::*;
        match self {
            TrendLine | Ray | ExtendedLine | Arrow => ShapeFamily::LineLike,
            HorizontalLine | HorizontalRay | VerticalLine | CrossLine | Text | PriceLabel => {
                ShapeFamily::SingleAnchor
            }
            Rectangle | Circle | FibRetracement | Measure | PriceRange | DateRange | DatePriceRange
            | Callout => ShapeFamily::AreaLike,
            Triangle | ParallelChannel | FibExtension | LongPosition | ShortPosition => {
                ShapeFamily::TripleAnchor
            }
            Brush | Highlighter | Path | ElliottImpulse | ElliottCorrection | HeadAndShoulders => {
                ShapeFamily::Polyline
            }
            None | Eraser | UserPriceAlerts => ShapeFamily::Mode,
        }
    }

    pub fn placement(&self) -> Placement {
        use ToolKind::*;
        match self {
            None | Eraser | UserPriceAlerts => Placement::Mode,
            HorizontalLine | HorizontalRay | VerticalLine | CrossLine | Text | Callout | PriceLabel => {
                Placement::SingleClick
            }
            TrendLine | Ray | ExtendedLine | Arrow | Rectangle | Circle | FibRetracement | Measure
            | PriceRange | DateRange | DatePriceRange | LongPosition | ShortPosition => Placement::Clicks(2),
            Triangle | ParallelChannel | FibExtension => Placement::Clicks(3),
            ElliottImpulse => Placement::Clicks(6),
            ElliottCorrection => Placement::Clicks(4),
            HeadAndShoulders => Placement::Clicks(7),
            Brush | Highlighter => Placement::Stroke,
            Path => Placement::OpenPath,
        }
    }

    /// Anchors stored by a finished tool, when fixed
    pub fn anchor_count(&self) -> Option<usize> {
        use ToolKind::*;
        match self {
            HorizontalLine | HorizontalRay | VerticalLine | CrossLine | Text | PriceLabel => Some(1),
            Callout => Some(2),
            LongPosition | ShortPosition => Some(3),
            _ => match self.placement() {
                Placement::Clicks(n) => Some(n),
                _ => Option::None,
            },
        }
    }

    pub fn is_drawable(&self) -> bool {
        self.family() != ShapeFamily::Mode
    }

    pub fn is_freehand(&self) -> bool {
        matches!(self, ToolKind::Brush | ToolKind::Highlighter)
    }

    pub fn supports_drag(&self) -> bool {
        self.is_drawable()
    }

    pub fn supports_alert(&self) -> bool {
        use ToolKind::*;
        matches!(
            self,
            TrendLine | Ray | ExtendedLine | Arrow | HorizontalLine | HorizontalRay | VerticalLine | Rectangle
                | ParallelChannel
        )
    }

    /// Area kinds evaluate zone conditions instead of crossings
    pub fn is_zone(&self) -> bool {
        matches!(self, ToolKind::Rectangle | ToolKind::ParallelChannel)
    }

    /// Pan and zoom stay enabled while this kind is active
    pub fn keeps_chart_interaction(&self) -> bool {
        matches!(self, ToolKind::None | ToolKind::Text | ToolKind::Callout)
    }

    /// Whether starting this kind shows the collapsed toolbar
    pub fn shows_toolbar_on_start(&self) -> bool {
        !matches!(self, ToolKind::None | ToolKind::Eraser | ToolKind::Measure)
    }

    pub fn selects_on_finalize(&self) -> bool {
        *self != ToolKind::Measure
    }

    /// Box-shaped kinds with eight edit handles
    pub fn has_box_handles(&self) -> bool {
        use ToolKind::*;
        matches!(self, Rectangle | PriceRange | DateRange | DatePriceRange | Measure)
    }

    pub fn default_options(&self) -> ToolOptions {
        use ToolKind::*;
        let mut o = ToolOptions::default();
        match self {
            TrendLine | Ray | ExtendedLine | Arrow => {
                o.line_color = Some("rgb(0, 0, 0)".into());
                o.line_width = Some(2.0);
                o.line_style = Some(LineStyle::Solid);
                o.extend_left = Some(*self == ExtendedLine);
                o.extend_right = Some(matches!(self, Ray | ExtendedLine));
                o.left_end = Some(0);
                o.right_end = Some(u8::from(*self == Arrow));
            }
            HorizontalLine | HorizontalRay => {
                o.line_color = Some("#2962FF".into());
                o.line_width = Some(2.0);
                o.line_style = Some(LineStyle::Solid);
            }
            VerticalLine => {
                o.line_color = Some("#2962FF".into());
                o.line_width = Some(2.0);
                o.line_style = Some(LineStyle::Solid);
                o.show_label = Some(false);
                o.label_background_color = Some("rgba(255, 255, 255, 0.85)".into());
                o.label_text_color = Some("rgb(0, 0, 0)".into());
            }
            CrossLine => {
                o.line_color = Some("#2962FF".into());
                o.line_width = Some(2.0);
                o.line_style = Some(LineStyle::Dashed);
            }
            Rectangle | Circle => {
                o.line_color = Some("rgb(41, 98, 255)".into());
                o.line_width = Some(2.0);
                o.background_color = Some("rgba(41, 98, 255, 0.2)".into());
            }
            Text => {
                o.color = Some("rgb(0, 0, 0)".into());
                o.font_size = Some(14.0);
                o.font_family = Some("Arial".into());
                o.text = Some("Text".into());
            }
            ParallelChannel => {
                o.line_color = Some("rgb(33, 150, 243)".into());
                o.background_color = Some("rgba(33, 150, 243, 0.2)".into());
                o.line_width = Some(1.0);
                o.show_middle = Some(true);
            }
            Triangle => {
                o.line_color = Some("rgb(33, 150, 243)".into());
                o.background_color = Some("rgba(33, 150, 243, 0.2)".into());
                o.line_width = Some(1.0);
            }
            Callout => {
                o.line_color = Some("rgb(33, 150, 243)".into());
                o.background_color = Some("rgba(255, 255, 255, 0.9)".into());
                o.text_color = Some("rgb(0, 0, 0)".into());
                o.line_width = Some(1.0);
                o.font_size = Some(12.0);
                o.font_family = Some("Arial".into());
                o.text = Some("Text".into());
            }
            Brush => {
                o.line_color = Some("rgba(0, 0, 0, 0.8)".into());
                o.line_width = Some(2.0);
                o.opacity = Some(1.0);
                o.smooth = Some(true);
            }
            Highlighter => {
                o.line_color = Some("rgba(255, 235, 59, 0.6)".into());
                o.line_width = Some(20.0);
                o.opacity = Some(0.6);
                o.smooth = Some(true);
            }
            Path => {
                o.line_color = Some("rgba(33, 150, 243, 1)".into());
                o.line_width = Some(2.0);
                o.opacity = Some(1.0);
                o.smooth = Some(false);
            }
            PriceRange | DateRange | DatePriceRange | Measure => {
                o.background_color = Some("rgba(41, 98, 255, 0.2)".into());
                o.border_color = Some("rgb(41, 98, 255)".into());
                o.border_width = Some(if *self == Measure { 1.0 } else { 2.0 });
                o.text_color = Some("#FFFFFF".into());
            }
            LongPosition | ShortPosition => {
                o.line_color = Some("#787B86".into());
                o.profit_color = Some("rgba(0, 255, 0, 0.2)".into());
                o.loss_color = Some("rgba(255, 0, 0, 0.2)".into());
                o.profit_line_color = Some("#00FF00".into());
                o.loss_line_color = Some("#FF0000".into());
                o.line_width = Some(1.0);
                o.zone_opacity = Some(0.2);
                o.text_color = Some("#FFFFFF".into());
            }
            ElliottImpulse | ElliottCorrection => {
                o.line_color = Some("#2962FF".into());
                o.line_width = Some(2.0);
                o.text_color = Some("#2962FF".into());
            }
            HeadAndShoulders => {
                o.line_color = Some("#089981".into());
                o.line_width = Some(2.0);
                o.fill_color = Some("rgba(8, 153, 129, 0.2)".into());
                o.label_background_color = Some("#089981".into());
                o.label_text_color = Some("#ffffff".into());
            }
            PriceLabel => {
                o.background_color = Some("#2962FF".into());
                o.text_color = Some("#FFFFFF".into());
                o.font_size = Some(12.0);
                o.font_family = Some(
                    "-apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, Helvetica, Arial, sans-serif".into(),
                );
            }
            FibRetracement => {
                o.line_width = Some(1.0);
                o.levels = Some(FibLevel::retracement_defaults());
            }
            FibExtension => {
                o.line_width = Some(1.0);
                o.levels = Some(FibLevel::extension_defaults());
            }
            None | Eraser | UserPriceAlerts => {}
        }
        o
    }
}

/// Initial session preferences seeded for every kind
pub fn initial_sticky_options() -> ToolOptions {
    ToolOptions {
        line_color: Some("#2962FF".into()),
        color: Some("#2962FF".into()),
        line_width: Some(2.0),
        ..ToolOptions::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn every_drawable_kind_has_a_placement() {
        for kind in ToolKind::iter().filter(|k| k.is_drawable()) {
            assert_ne!(kind.placement(), Placement::Mode, "{kind}");
        }
    }

    #[test]
    fn kinds_parse_by_name() {
        assert_eq!("FibExtension".parse::<ToolKind>(), Ok(ToolKind::FibExtension));
        assert_eq!(ToolKind::HeadAndShoulders.anchor_count(), Some(7));
    }
}
