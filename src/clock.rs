/// Optional frame-rate cap over display refresh timestamps (milliseconds).
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    interval_ms: Option<f64>,
    last_ms: Option<f64>,
}

impl FrameClock {
    /// `None`, zero or a non-finite rate means every refresh renders.
    pub fn new(max_fps: Option<f64>) -> Self {
        let interval_ms = max_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| 1000.0 / fps);
        Self {
            interval_ms,
            last_ms: None,
        }
    }

    /// Whether the refresh at `now_ms` should render. Leftover time past the
    /// interval is carried so a 60 Hz display holds a 30 fps cap steadily.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(interval) = self.interval_ms else {
            self.last_ms = Some(now_ms);
            return true;
        };
        match self.last_ms {
            Some(last) if now_ms - last < interval => false,
            Some(last) => {
                let elapsed = now_ms - last;
                self.last_ms = Some(now_ms - elapsed % interval);
                true
            }
            None => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }
}
