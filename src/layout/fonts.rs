/// Typography preset applied to the header, stats, and primary blocks.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct FontPreset {
    pub id: &'static str,
    /// Family name looked up in the host's font book.
    pub family: &'static str,
    pub label_scale: f64,
    pub value_scale: f64,
    pub weight: u16,
    pub premium: bool,
}

pub static FONT_PRESETS: [FontPreset; 4] = [
    FontPreset {
        id: "sans",
        family: "Inter",
        label_scale: 1.0,
        value_scale: 1.0,
        weight: 700,
        premium: false,
    },
    FontPreset {
        id: "condensed",
        family: "Barlow Condensed",
        label_scale: 1.05,
        value_scale: 1.15,
        weight: 600,
        premium: false,
    },
    FontPreset {
        id: "mono",
        family: "JetBrains Mono",
        label_scale: 0.95,
        value_scale: 0.9,
        weight: 500,
        premium: false,
    },
    FontPreset {
        id: "serif",
        family: "Playfair Display",
        label_scale: 1.0,
        value_scale: 1.05,
        weight: 700,
        premium: true,
    },
];

pub fn default_font_preset() -> &'static FontPreset {
    &FONT_PRESETS[0]
}

pub fn font_preset(id: &str) -> Option<&'static FontPreset> {
    FONT_PRESETS.iter().find(|p| p.id == id)
}

pub fn next_font_preset(current: &str, premium_unlocked: bool) -> &'static FontPreset {
    let Some(pos) = FONT_PRESETS.iter().position(|p| p.id == current) else {
        return default_font_preset();
    };
    (1..=FONT_PRESETS.len())
        .map(|step| &FONT_PRESETS[(pos + step) % FONT_PRESETS.len()])
        .find(|p| premium_unlocked || !p.premium)
        .unwrap_or_else(default_font_preset)
}
