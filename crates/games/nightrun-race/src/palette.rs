use serde::{Deserialize, Serialize};

use nightrun_core::run::WeatherFamily;

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Build from a `0xRRGGBB` literal.
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
        }
    }

    /// Linear blend toward `other`; `alpha` is clamped to `[0, 1]`.
    pub fn blend(self, other: Rgb, alpha: f32) -> Rgb {
        let a = if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 };
        let mix = |x: u8, y: u8| (f32::from(x) + (f32::from(y) - f32::from(x)) * a).round() as u8;
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

pub const BLACK: Rgb = Rgb::hex(0x000000);
pub const WHITE: Rgb = Rgb::hex(0xFFFFFF);

pub const SKY_DAWN: Rgb = Rgb::hex(0xFFD54F);
pub const SKY_DAY: Rgb = Rgb::hex(0x72D7EE);
pub const SKY_DUSK: Rgb = Rgb::hex(0xFF9800);
pub const SKY_NIGHT: Rgb = Rgb::hex(0x090909);
pub const SKY_SNOW: Rgb = Rgb::hex(0xB3E5FC);
pub const SKY_FOG: Rgb = Rgb::hex(0xA0A0A0);

pub const FOG_SNOW: Rgb = Rgb::hex(0xE0F7FA);
pub const FOG_FOG: Rgb = Rgb::hex(0xA0A0A0);

pub const RUMBLE: [Rgb; 2] = [Rgb::hex(0x555555), Rgb::hex(0xBBBBBB)];
pub const LANE: Rgb = Rgb::hex(0xCCCCCC);

pub const SUN: Rgb = Rgb::hex(0xFF5722);
pub const MOON: Rgb = Rgb::hex(0xEEEEEE);

/// Traffic body and roof colors per sprite variant: red, blue, green.
pub const CAR_BODIES: [(Rgb, Rgb); 3] = [
    (Rgb::hex(0xD32F2F), Rgb::hex(0xEF5350)),
    (Rgb::hex(0x1976D2), Rgb::hex(0x42A5F5)),
    (Rgb::hex(0x388E3C), Rgb::hex(0x66BB6A)),
];
pub const TAIL_LIGHT: Rgb = Rgb::hex(0xFF0000);
pub const PLAYER_BODY: Rgb = Rgb::hex(0xFFFFFF);
pub const PLAYER_STRIPE: Rgb = Rgb::hex(0xCCCCCC);
pub const TYRE: Rgb = Rgb::hex(0x111111);
pub const FLAG_POLE: Rgb = Rgb::hex(0xFFFFFF);

/// Road tones (dark, light) for a weather family.
pub fn road_tones(weather: WeatherFamily) -> [Rgb; 2] {
    match weather {
        WeatherFamily::Clear => [Rgb::hex(0x6B6B6B), Rgb::hex(0x696969)],
        WeatherFamily::Snow => [Rgb::hex(0x90A4AE), Rgb::hex(0x78909C)],
        WeatherFamily::Fog => [Rgb::hex(0x424242), Rgb::hex(0x303030)],
    }
}

/// Ground tones (dark, light) for a weather family.
pub fn ground_tones(weather: WeatherFamily) -> [Rgb; 2] {
    match weather {
        WeatherFamily::Clear => [Rgb::hex(0x10AA10), Rgb::hex(0x009A00)],
        WeatherFamily::Snow => [Rgb::hex(0xE0F7FA), Rgb::hex(0xB2EBF2)],
        WeatherFamily::Fog => [Rgb::hex(0x424242), Rgb::hex(0x616161)],
    }
}
