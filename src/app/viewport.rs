/// Fixed row height of the chapter list template. Both the direct layout
/// calculator and the failure-recovery estimator derive offsets from this
/// value, so the two paths always agree.
pub const ROW_HEIGHT: f32 = 88.0;

/// Offset and extent of one fixed-height row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLayout {
    pub offset: f32,
    pub length: f32,
}

pub fn row_layout(index: usize) -> RowLayout {
    RowLayout {
        offset: ROW_HEIGHT * index as f32,
        length: ROW_HEIGHT,
    }
}

/// Best available offset guess for an unmeasured row: the average of the
/// rows the view has measured so far, or the fixed template height when
/// nothing has been measured yet.
pub fn estimate_offset(index: usize, measured_heights: &[f32]) -> f32 {
    let per_row = if measured_heights.is_empty() {
        ROW_HEIGHT
    } else {
        measured_heights.iter().sum::<f32>() / measured_heights.len() as f32
    };
    per_row * index as f32
}

/// The row the viewport was asked to reach has not been laid out yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NotMeasured;

/// Scroll surface of a virtualized list. The shell (or a test double)
/// implements this; controllers only ever drive it through [`jump_to_row`].
pub trait ListViewport {
    /// Scroll so the row at `index` sits at the top. Fails when the row's
    /// position is not yet measured.
    fn scroll_to_index(&mut self, index: usize) -> Result<(), NotMeasured>;

    /// Scroll to an absolute pixel offset. Always succeeds.
    fn scroll_to_offset(&mut self, offset: f32);

    /// Heights of the rows measured so far, in layout order.
    fn measured_row_heights(&self) -> Vec<f32>;
}

/// How a jump landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JumpResolution {
    /// The direct positional scroll succeeded first try.
    Direct,
    /// Direct failed; one estimated-offset scroll brought the row into
    /// layout and the retry landed.
    AfterEstimate,
    /// The single retry failed too; the view stays at the estimated
    /// offset. No further attempts are made.
    AcceptedAtOffset,
}

/// Phases of the scroll-position recovery machine.
#[derive(Debug, Clone, Copy, PartialEq)]
enum JumpPhase {
    Direct,
    EstimatedOffset,
    DirectRetry,
}

/// Two-phase positional scroll: Direct → EstimatedOffset → Direct-retry →
/// Accept. Exactly one offset correction, never a loop.
pub fn jump_to_row(view: &mut dyn ListViewport, index: usize) -> JumpResolution {
    let mut phase = JumpPhase::Direct;
    loop {
        match phase {
            JumpPhase::Direct => match view.scroll_to_index(index) {
                Ok(()) => return JumpResolution::Direct,
                Err(NotMeasured) => phase = JumpPhase::EstimatedOffset,
            },
            JumpPhase::EstimatedOffset => {
                let offset = estimate_offset(index, &view.measured_row_heights());
                view.scroll_to_offset(offset);
                phase = JumpPhase::DirectRetry;
            }
            JumpPhase::DirectRetry => {
                return match view.scroll_to_index(index) {
                    Ok(()) => JumpResolution::AfterEstimate,
                    Err(NotMeasured) => JumpResolution::AcceptedAtOffset,
                };
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Viewport double: fails direct scrolls a configurable number of
    /// times, records every call.
    pub(crate) struct FakeViewport {
        pub direct_failures: usize,
        pub measured: Vec<f32>,
        pub index_calls: Vec<usize>,
        pub offset_calls: Vec<f32>,
    }

    impl FakeViewport {
        pub(crate) fn failing(times: usize) -> Self {
            FakeViewport {
                direct_failures: times,
                measured: Vec::new(),
                index_calls: Vec::new(),
                offset_calls: Vec::new(),
            }
        }
    }

    impl ListViewport for FakeViewport {
        fn scroll_to_index(&mut self, index: usize) -> Result<(), NotMeasured> {
            self.index_calls.push(index);
            if self.direct_failures > 0 {
                self.direct_failures -= 1;
                Err(NotMeasured)
            } else {
                Ok(())
            }
        }

        fn scroll_to_offset(&mut self, offset: f32) {
            self.offset_calls.push(offset);
        }

        fn measured_row_heights(&self) -> Vec<f32> {
            self.measured.clone()
        }
    }

    #[test]
    fn row_layout_is_deterministic() {
        assert_eq!(row_layout(0).offset, 0.0);
        assert_eq!(row_layout(10).offset, 880.0);
        assert_eq!(row_layout(10).length, ROW_HEIGHT);
    }

    #[test]
    fn estimate_uses_fixed_height_when_nothing_measured() {
        assert_eq!(estimate_offset(5, &[]), 5.0 * ROW_HEIGHT);
    }

    #[test]
    fn estimate_averages_measured_heights() {
        // avg of 80 and 100 is 90
        assert_eq!(estimate_offset(4, &[80.0, 100.0]), 360.0);
    }

    #[test]
    fn direct_scroll_short_circuits() {
        let mut view = FakeViewport::failing(0);
        assert_eq!(jump_to_row(&mut view, 7), JumpResolution::Direct);
        assert_eq!(view.index_calls, vec![7]);
        assert!(view.offset_calls.is_empty());
    }

    #[test]
    fn one_failure_recovers_through_estimated_offset() {
        let mut view = FakeViewport::failing(1);
        assert_eq!(jump_to_row(&mut view, 3), JumpResolution::AfterEstimate);
        assert_eq!(view.index_calls, vec![3, 3]);
        assert_eq!(view.offset_calls, vec![3.0 * ROW_HEIGHT]);
    }

    #[test]
    fn second_failure_accepts_the_offset_without_looping() {
        let mut view = FakeViewport::failing(5);
        assert_eq!(jump_to_row(&mut view, 3), JumpResolution::AcceptedAtOffset);
        // exactly one retry, exactly one offset correction
        assert_eq!(view.index_calls, vec![3, 3]);
        assert_eq!(view.offset_calls.len(), 1);
    }

    #[test]
    fn recovery_uses_measured_average_when_available() {
        let mut view = FakeViewport::failing(1);
        view.measured = vec![90.0, 90.0, 90.0];
        jump_to_row(&mut view, 10);
        assert_eq!(view.offset_calls, vec![900.0]);
    }
}
