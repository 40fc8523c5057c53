use rand::Rng;

use crate::config::{EDGE_CELLS, JITTER_SAFE_MARGIN};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
}

/// Fixed per-cell positional offsets, seeded once and read every frame.
///
/// Covers cell indices `[-EDGE_CELLS, span - EDGE_CELLS)` on both axes, where
/// `span` is large enough for a viewport `JITTER_SAFE_MARGIN` times the largest
/// dimension seen at build time. Lookups outside that square return
/// [`Offset::ZERO`].
#[derive(Debug, Clone)]
pub struct JitterTable {
    origin: i32,
    span: usize,
    offsets: Vec<Offset>,
}

impl JitterTable {
    pub fn build<R: Rng + ?Sized>(
        spacing: f64,
        magnitude: f64,
        max_dimension: f64,
        rng: &mut R,
    ) -> Self {
        let covered = max_dimension.max(0.0) * JITTER_SAFE_MARGIN;
        let cells = if spacing > 0.0 {
            (covered / spacing).ceil() as usize
        } else {
            0
        };
        let span = cells + 2 * EDGE_CELLS as usize;

        let mut jitter = || (rng.gen::<f64>() - 0.5) * 2.0 * magnitude;
        let offsets = (0..span * span)
            .map(|_| Offset {
                x: jitter(),
                y: jitter(),
            })
            .collect();

        log::debug!(
            "jitter table: {span}x{span} cells, spacing {spacing}, magnitude {magnitude}"
        );

        Self {
            origin: -EDGE_CELLS,
            span,
            offsets,
        }
    }

    pub fn get(&self, i: i32, j: i32) -> Offset {
        self.index(i, j)
            .and_then(|idx| self.offsets.get(idx))
            .copied()
            .unwrap_or(Offset::ZERO)
    }

    pub fn contains(&self, i: i32, j: i32) -> bool {
        self.index(i, j).is_some()
    }

    /// Half-open index range covered on each axis.
    pub fn bounds(&self) -> std::ops::Range<i32> {
        self.origin..self.origin + self.span as i32
    }

    fn index(&self, i: i32, j: i32) -> Option<usize> {
        let col = usize::try_from(i.checked_sub(self.origin)?).ok()?;
        let row = usize::try_from(j.checked_sub(self.origin)?).ok()?;
        (col < self.span && row < self.span).then(|| row * self.span + col)
    }
}
