//! Indicator driver — pushes resolved colors to the strip.

use std::time::Duration;

use super::animation::PingPong;
use super::strip::{LedStrip, Result};
use crate::color::Color;

/// Owns the strip and the optional chase animation.
pub struct IndicatorDriver<S: LedStrip> {
    strip: S,
    brightness: f64,
    animation: Option<PingPong>,
    animation_color: Color,
}

impl<S: LedStrip> IndicatorDriver<S> {
    /// Wrap `strip`. `brightness` scales every output color (1.0 = as resolved).
    pub fn new(strip: S, brightness: f64) -> Self {
        Self {
            strip,
            brightness,
            animation: None,
            animation_color: Color::BLACK,
        }
    }

    /// Enable the ping-pong chase after each capture.
    pub fn with_animation(mut self) -> Self {
        self.animation = Some(PingPong::new(self.strip.len()));
        self
    }

    fn output(&self, color: Color) -> Color {
        if self.brightness == 1.0 {
            color
        } else {
            color.scale(self.brightness)
        }
    }

    /// Fill the whole strip with `color` and show it.
    pub fn apply(&mut self, color: Color) -> Result<()> {
        let out = self.output(color);
        self.strip.set_all(out)?;
        self.strip.show()?;
        Ok(())
    }

    /// Start the chase with `color`. No-op when animation is disabled.
    pub fn arm_animation(&mut self, color: Color) {
        if let Some(anim) = self.animation.as_mut() {
            self.animation_color = color;
            anim.start();
        }
    }

    /// Whether a chase is in progress.
    pub fn is_animating(&self) -> bool {
        self.animation.as_ref().is_some_and(PingPong::is_active)
    }

    /// Render one chase frame and advance it.
    ///
    /// LEDs `0..lit` show the armed color, the rest are off. Does nothing
    /// when no chase is in progress.
    pub fn step(&mut self) -> Result<()> {
        let out = self.output(self.animation_color);
        let Some(anim) = self.animation.as_mut() else {
            return Ok(());
        };
        if !anim.is_active() {
            return Ok(());
        }
        self.strip.set_all(Color::BLACK)?;
        for i in 0..anim.lit() {
            self.strip.set_pixel(i, out)?;
        }
        self.strip.show()?;
        anim.advance();
        Ok(())
    }

    /// Show each color in turn, holding each for `delay`.
    pub fn self_test(&mut self, colors: &[Color], delay: Duration) -> Result<()> {
        for &c in colors {
            self.apply(c)?;
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }
        Ok(())
    }

    /// Turn every LED off and show the dark frame.
    pub fn turn_off(&mut self) -> Result<()> {
        self.strip.set_all(Color::BLACK)?;
        self.strip.show()
    }

    /// Release the strip's bus.
    pub fn release(&mut self) {
        self.strip.release();
    }

    pub fn strip(&self) -> &S {
        &self.strip
    }

    pub fn strip_mut(&mut self) -> &mut S {
        &mut self.strip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::led::strip::mock::MockStrip;

    const RED: Color = Color::new(255, 0, 0);

    #[test]
    fn apply_fills_and_shows_once() {
        let mut drv = IndicatorDriver::new(MockStrip::new(8), 1.0);
        drv.apply(RED).unwrap();
        assert_eq!(drv.strip().frames.len(), 1);
        assert_eq!(drv.strip().last_frame().unwrap(), &[RED; 8]);
    }

    #[test]
    fn apply_respects_brightness() {
        let mut drv = IndicatorDriver::new(MockStrip::new(2), 0.5);
        drv.apply(Color::new(255, 165, 0)).unwrap();
        assert_eq!(
            drv.strip().last_frame().unwrap(),
            &[Color::new(127, 82, 0); 2]
        );
    }

    #[test]
    fn apply_propagates_show_failure() {
        let mut drv = IndicatorDriver::new(MockStrip::new(2), 1.0);
        drv.strip_mut().fail_show.set(true);
        assert!(drv.apply(RED).is_err());
    }

    #[test]
    fn turn_off_shows_black() {
        let mut drv = IndicatorDriver::new(MockStrip::new(3), 1.0);
        drv.apply(RED).unwrap();
        drv.turn_off().unwrap();
        assert_eq!(drv.strip().last_frame().unwrap(), &[Color::BLACK; 3]);
    }

    #[test]
    fn self_test_shows_each_color_in_order() {
        let mut drv = IndicatorDriver::new(MockStrip::new(2), 1.0);
        let colors = [RED, Color::new(0, 0, 255), Color::WHITE];
        drv.self_test(&colors, Duration::ZERO).unwrap();
        let firsts: Vec<Color> = drv.strip().frames.iter().map(|f| f[0]).collect();
        assert_eq!(firsts, colors);
    }

    #[test]
    fn step_without_animation_is_noop() {
        let mut drv = IndicatorDriver::new(MockStrip::new(4), 1.0);
        drv.arm_animation(RED);
        assert!(!drv.is_animating());
        drv.step().unwrap();
        assert!(drv.strip().frames.is_empty());
    }

    #[test]
    fn chase_lights_prefix_and_finishes() {
        let mut drv = IndicatorDriver::new(MockStrip::new(2), 1.0).with_animation();
        drv.arm_animation(RED);
        assert!(drv.is_animating());

        let mut steps = 0;
        while drv.is_animating() {
            drv.step().unwrap();
            steps += 1;
            assert!(steps < 500);
        }

        let frames = &drv.strip().frames;
        assert_eq!(frames.len(), steps);
        // First frame: nothing lit yet.
        assert_eq!(frames[0], vec![Color::BLACK; 2]);
        // Some frame has exactly one LED lit, in order from index 0.
        assert!(frames.contains(&vec![RED, Color::BLACK]));
        assert!(frames.contains(&vec![RED, RED]));
        // No frame lights a later LED without the earlier ones.
        assert!(!frames.contains(&vec![Color::BLACK, RED]));

        // Once finished, further steps do nothing.
        drv.step().unwrap();
        assert_eq!(drv.strip().frames.len(), steps);
    }
}
