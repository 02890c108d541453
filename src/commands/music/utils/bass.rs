//! Bass boost presets and their rendering as an `ffmpeg` equalizer chain.

use std::fmt;
use std::str::FromStr;

use super::music_manager::MusicError;

/// Centre frequencies (Hz) of the first equalizer bands, in band order.
const BAND_FREQUENCIES: [u32; 5] = [25, 40, 63, 100, 160];

/// Bass boost levels, from no boost to everything maxed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BassBoost {
    #[default]
    Off,
    Low,
    Medium,
    High,
    Ultra,
    Maximum,
    DummyHard,
}

impl BassBoost {
    pub const ALL: [BassBoost; 7] = [
        BassBoost::Off,
        BassBoost::Low,
        BassBoost::Medium,
        BassBoost::High,
        BassBoost::Ultra,
        BassBoost::Maximum,
        BassBoost::DummyHard,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BassBoost::Off => "off",
            BassBoost::Low => "low",
            BassBoost::Medium => "medium",
            BassBoost::High => "high",
            BassBoost::Ultra => "ultra",
            BassBoost::Maximum => "maximum",
            BassBoost::DummyHard => "dummyhard",
        }
    }

    /// Presets shown to users. `dummyhard` works but is not advertised.
    pub fn advertised() -> impl Iterator<Item = BassBoost> {
        Self::ALL
            .into_iter()
            .filter(|preset| *preset != BassBoost::DummyHard)
    }

    /// `(band, gain)` pairs; a gain of 0.25 doubles the band, 1.0 is the top.
    pub fn bands(self) -> &'static [(usize, f32)] {
        match self {
            BassBoost::Off => &[(0, 0.0), (1, 0.0)],
            BassBoost::Low => &[(0, 0.25), (1, 0.15)],
            BassBoost::Medium => &[(0, 0.50), (1, 0.25)],
            BassBoost::High => &[(0, 0.75), (1, 0.50)],
            BassBoost::Ultra => &[(0, 1.0), (1, 0.75)],
            BassBoost::Maximum => &[(0, 1.0), (1, 1.0)],
            BassBoost::DummyHard => &[(0, 1.0), (1, 1.0), (2, 1.0), (3, 1.0), (4, 1.0)],
        }
    }

    pub fn is_off(self) -> bool {
        self.bands().iter().all(|(_, gain)| *gain == 0.0)
    }

    /// The `-af` argument for `ffmpeg`, `None` when no band is boosted.
    pub fn ffmpeg_filter(self) -> Option<String> {
        let filters: Vec<String> = self
            .bands()
            .iter()
            .filter(|(_, gain)| *gain != 0.0)
            .map(|&(band, gain)| {
                format!(
                    "equalizer=f={}:width_type=o:width=1:g={:.2}",
                    BAND_FREQUENCIES[band],
                    gain_to_db(gain)
                )
            })
            .collect();

        (!filters.is_empty()).then(|| filters.join(","))
    }
}

/// Converts a band multiplier to decibels.
fn gain_to_db(gain: f32) -> f32 {
    20.0 * (1.0 + gain).log10()
}

impl fmt::Display for BassBoost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BassBoost {
    type Err = MusicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|preset| preset.name() == wanted)
            .ok_or_else(|| {
                MusicError::InvalidBassPreset(
                    Self::advertised()
                        .map(BassBoost::name)
                        .collect::<Vec<_>>()
                        .join(", "),
                )
            })
    }
}
