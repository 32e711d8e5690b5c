//! Linear pattern: type a count, press Enter to array the selection.

use super::transform::Snapshot;
use super::{ToolContext, ToolHandler};
use crate::error::{ToolError, ToolResult};
use crate::geometry::Transform;
use crate::input::{Key, KeyEvent};
use crate::kernel::{EditOp, PatternParams};
use crate::numeric::NumericInput;
use crate::overlay::OverlayItem;

#[derive(Debug, Clone, Default)]
pub struct PatternTool {
    /// Selection and parameters shown while a count is being typed.
    preview: Option<(Snapshot, PatternParams)>,
    numeric: NumericInput,
}

impl PatternTool {
    pub fn new() -> Self {
        Self::default()
    }

    fn params(&self, ctx: &ToolContext<'_>) -> Result<PatternParams, ToolError> {
        let count = match self.numeric.value() {
            None => ctx.config.default_pattern_count,
            Some(n) if n.fract() == 0.0 && n >= 0.0 && n <= f64::from(u32::MAX) => n as u32,
            Some(n) => return Err(ToolError::InvalidPattern(format!("count {n} is not a whole number"))),
        };
        if count < 2 {
            return Err(ToolError::InvalidPattern(format!("count {count} must be at least 2")));
        }
        if count > ctx.config.max_pattern_count {
            return Err(ToolError::InvalidPattern(format!(
                "count {count} exceeds the limit of {}",
                ctx.config.max_pattern_count
            )));
        }
        let (dx, dy) = ctx.config.pattern_step;
        Ok(PatternParams::Linear { dx, dy, count })
    }

    fn refresh(&mut self, ctx: &ToolContext<'_>) {
        self.preview = match (Snapshot::capture(&*ctx.store), self.params(ctx)) {
            (Ok(snapshot), Ok(params)) if !self.numeric.is_empty() => Some((snapshot, params)),
            _ => None,
        };
    }

    fn reset(&mut self) {
        self.preview = None;
        self.numeric.clear();
    }

    fn submit(&mut self, ctx: &mut ToolContext<'_>) -> ToolResult {
        let snapshot = Snapshot::capture(ctx.store)?;
        let params = self.params(ctx)?;
        ctx.commit(EditOp::Pattern {
            ids: snapshot.ids,
            params,
        })?;
        Ok(())
    }
}

impl ToolHandler for PatternTool {
    fn on_key(&mut self, ctx: &mut ToolContext<'_>, key: &KeyEvent) -> ToolResult {
        match key.key {
            Key::Escape => self.cancel(ctx),
            Key::Enter => {
                let result = self.submit(ctx);
                self.reset();
                return result;
            }
            ref k => {
                if self.numeric.handle_key(k) {
                    self.refresh(ctx);
                }
            }
        }
        Ok(())
    }

    fn cancel(&mut self, _ctx: &mut ToolContext<'_>) {
        self.reset();
    }

    fn overlay(&self) -> Vec<OverlayItem> {
        let Some((snapshot, PatternParams::Linear { dx, dy, count })) = &self.preview else {
            return Vec::new();
        };
        (1..*count)
            .flat_map(|i| {
                let step = Transform::Translate {
                    dx: dx * f64::from(i),
                    dy: dy * f64::from(i),
                };
                snapshot.preview(&step).collect::<Vec<_>>()
            })
            .collect()
    }

    fn is_idle(&self) -> bool {
        self.numeric.is_empty()
    }

    fn numeric(&self) -> &NumericInput {
        &self.numeric
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::kernel::codes;
    use crate::tools::test_support::{Fixture, close, key, special};
    use kurbo::Point;

    fn fixture() -> Fixture {
        let mut fx = Fixture::with(vec![("a", Geometry::Circle { c: Point::ZERO, r: 1.0 })]);
        fx.select(&["a"]);
        fx
    }

    fn centers(fx: &Fixture) -> Vec<Point> {
        fx.geoms()
            .iter()
            .map(|g| match g {
                Geometry::Circle { c, .. } => *c,
                other => panic!("unexpected {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_default_count_on_enter() {
        let mut fx = fixture();
        let mut tool = PatternTool::new();
        tool.on_key(&mut fx.ctx(), &special(Key::Enter)).unwrap();
        let c = centers(&fx);
        assert_eq!(c.len(), 3);
        assert!(close(c[1], Point::new(10.0, 0.0)));
        assert!(close(c[2], Point::new(20.0, 0.0)));
    }

    #[test]
    fn test_typed_count_with_preview() {
        let mut fx = fixture();
        let mut tool = PatternTool::new();
        tool.on_key(&mut fx.ctx(), &key('5')).unwrap();
        assert!(!tool.is_idle());
        assert_eq!(tool.overlay().len(), 4);
        tool.on_key(&mut fx.ctx(), &special(Key::Enter)).unwrap();
        assert_eq!(centers(&fx).len(), 5);
        assert!(tool.is_idle());
        assert!(tool.overlay().is_empty());
    }

    #[test]
    fn test_count_below_two_is_rejected() {
        let mut fx = fixture();
        let mut tool = PatternTool::new();
        tool.on_key(&mut fx.ctx(), &key('1')).unwrap();
        let err = tool.on_key(&mut fx.ctx(), &special(Key::Enter)).unwrap_err();
        assert_eq!(err.code(), codes::EDIT_PATTERN_INVALID_PARAMS);
        assert_eq!(fx.geoms().len(), 1);
        assert!(tool.numeric().is_empty());
    }

    #[test]
    fn test_fractional_count_is_rejected() {
        let mut fx = fixture();
        let mut tool = PatternTool::new();
        for c in ['2', '.', '5'] {
            tool.on_key(&mut fx.ctx(), &key(c)).unwrap();
        }
        let err = tool.on_key(&mut fx.ctx(), &special(Key::Enter)).unwrap_err();
        assert_eq!(err.code(), codes::EDIT_PATTERN_INVALID_PARAMS);
    }

    #[test]
    fn test_count_above_limit_is_rejected_without_preview() {
        let mut fx = fixture();
        let mut tool = PatternTool::new();
        for c in "2000000".chars() {
            tool.on_key(&mut fx.ctx(), &key(c)).unwrap();
        }
        assert!(tool.overlay().is_empty());
        let err = tool.on_key(&mut fx.ctx(), &special(Key::Enter)).unwrap_err();
        assert_eq!(err.code(), codes::EDIT_PATTERN_INVALID_PARAMS);
        assert_eq!(fx.geoms().len(), 1);
    }

    #[test]
    fn test_count_at_limit_is_accepted() {
        let mut fx = fixture();
        fx.config.max_pattern_count = 4;
        let mut tool = PatternTool::new();
        tool.on_key(&mut fx.ctx(), &key('4')).unwrap();
        assert_eq!(tool.overlay().len(), 3);
        tool.on_key(&mut fx.ctx(), &special(Key::Enter)).unwrap();
        assert_eq!(centers(&fx).len(), 4);
    }

    #[test]
    fn test_requires_selection() {
        let mut fx = Fixture::with(vec![("a", Geometry::Circle { c: Point::ZERO, r: 1.0 })]);
        let mut tool = PatternTool::new();
        let err = tool.on_key(&mut fx.ctx(), &special(Key::Enter)).unwrap_err();
        assert_eq!(err.code(), codes::EDIT_NO_SELECTION);
    }
}
