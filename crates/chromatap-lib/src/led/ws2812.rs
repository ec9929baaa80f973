//! WS2812 strip driven over the Raspberry Pi SPI bus.
//!
//! Bit timing and the latch tail come from `ws2812-spi`; this module only
//! maps bus numbers and converts colors at the edge.

use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use smart_leds::{RGB8, SmartLedsWrite};
use ws2812_spi::Ws2812;

use super::strip::{LedError, LedStrip, Result};
use crate::color::Color;

/// SPI clock expected by `ws2812-spi` (2 to 3.8 MHz).
const SPI_CLOCK_HZ: u32 = 3_000_000;

impl From<Color> for RGB8 {
    fn from(c: Color) -> Self {
        RGB8::new(c.r, c.g, c.b)
    }
}

fn spi_bus(bus: u8) -> Result<Bus> {
    Ok(match bus {
        0 => Bus::Spi0,
        1 => Bus::Spi1,
        2 => Bus::Spi2,
        3 => Bus::Spi3,
        4 => Bus::Spi4,
        5 => Bus::Spi5,
        6 => Bus::Spi6,
        n => return Err(LedError::OpenFailed(format!("SPI bus {n}: no such bus"))),
    })
}

fn chip_select(device: u8) -> Result<SlaveSelect> {
    Ok(match device {
        0 => SlaveSelect::Ss0,
        1 => SlaveSelect::Ss1,
        2 => SlaveSelect::Ss2,
        n => {
            return Err(LedError::OpenFailed(format!(
                "SPI device {n}: no such chip select"
            )));
        }
    })
}

pub struct Ws2812Strip {
    driver: Option<Ws2812<Spi>>,
    pixels: Vec<Color>,
}

impl Ws2812Strip {
    /// Open `/dev/spidev{bus}.{device}` for a strip of `len` pixels.
    pub fn open(bus: u8, device: u8, len: usize) -> Result<Self> {
        let spi = Spi::new(spi_bus(bus)?, chip_select(device)?, SPI_CLOCK_HZ, Mode::Mode0)
            .map_err(|e| LedError::OpenFailed(format!("SPI: {e}")))?;
        Ok(Self {
            driver: Some(Ws2812::new(spi)),
            pixels: vec![Color::BLACK; len],
        })
    }
}

impl LedStrip for Ws2812Strip {
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set_all(&mut self, color: Color) -> Result<()> {
        self.pixels.fill(color);
        Ok(())
    }

    fn set_pixel(&mut self, index: usize, color: Color) -> Result<()> {
        if let Some(px) = self.pixels.get_mut(index) {
            *px = color;
        }
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        let Some(driver) = self.driver.as_mut() else {
            return Err(LedError::ShowFailed("SPI: released".into()));
        };
        driver
            .write(self.pixels.iter().copied().map(RGB8::from))
            .map_err(|e| LedError::ShowFailed(format!("SPI write: {e:?}")))?;
        Ok(())
    }

    fn release(&mut self) {
        self.driver = None;
    }
}
