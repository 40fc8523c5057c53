use std::ops::{Deref, DerefMut};

use crate::color::Rgba;

/// A 2D drawing target in logical (CSS) pixels.
pub trait Surface {
    /// Clears a `width` x `height` logical area starting at the origin.
    fn clear(&mut self, width: f64, height: f64);

    /// Applies a gaussian blur of `radius` px to subsequent fills.
    fn set_blur(&mut self, radius: f64);

    /// Returns fills to the unfiltered state.
    fn reset_filter(&mut self);

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgba);
}

/// Blur applied for as long as the scope lives; the filter is reset on drop,
/// whatever path leaves the scope.
pub struct BlurScope<'a, S: Surface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: Surface + ?Sized> BlurScope<'a, S> {
    pub fn new(surface: &'a mut S, radius: f64) -> Self {
        surface.set_blur(radius);
        Self { surface }
    }
}

impl<S: Surface + ?Sized> Deref for BlurScope<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.surface
    }
}

impl<S: Surface + ?Sized> DerefMut for BlurScope<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.surface
    }
}

impl<S: Surface + ?Sized> Drop for BlurScope<'_, S> {
    fn drop(&mut self) {
        self.surface.reset_filter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log(Vec<String>);

    impl Surface for Log {
        fn clear(&mut self, _: f64, _: f64) {
            self.0.push("clear".into());
        }
        fn set_blur(&mut self, radius: f64) {
            self.0.push(format!("blur {radius}"));
        }
        fn reset_filter(&mut self) {
            self.0.push("reset".into());
        }
        fn fill_circle(&mut self, _: f64, _: f64, _: f64, _: Rgba) {
            self.0.push("fill".into());
        }
    }

    fn paint_until_negative(surface: &mut Log, radii: &[f64]) -> Option<()> {
        let mut blurred = BlurScope::new(surface, 4.0);
        for &r in radii {
            if r < 0.0 {
                return None;
            }
            blurred.fill_circle(0.0, 0.0, r, Rgba::BLACK);
        }
        Some(())
    }

    #[test]
    fn scope_resets_on_drop() {
        let mut log = Log::default();
        {
            let mut s = BlurScope::new(&mut log, 4.0);
            s.fill_circle(0.0, 0.0, 1.0, Rgba::BLACK);
        }
        assert_eq!(log.0, ["blur 4", "fill", "reset"]);
    }

    #[test]
    fn early_exit_still_resets() {
        let mut log = Log::default();
        assert!(paint_until_negative(&mut log, &[1.0, -1.0, 2.0]).is_none());
        assert_eq!(log.0, ["blur 4", "fill", "reset"]);
    }
}
