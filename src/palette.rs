// Color table for the menu and the canvas. Values are packed 0x00RRGGBB.

pub const RED: u32 = 0x00_FF_00_00;
pub const GREEN: u32 = 0x00_00_FF_00;
pub const BLUE: u32 = 0x00_00_00_FF;
pub const YELLOW: u32 = 0x00_FF_FF_00;
pub const PURPLE: u32 = 0x00_FF_00_FF;
pub const CYAN: u32 = 0x00_00_FF_FF;
pub const WHITE: u32 = 0x00_FF_FF_FF;
pub const BLACK: u32 = 0x00_00_00_00;
pub const ORANGE: u32 = 0x00_FF_A5_00;
pub const PINK: u32 = 0x00_FF_C0_CB;
pub const INDIGO: u32 = 0x00_4B_00_82;
pub const VIOLET: u32 = 0x00_EE_82_EE;

pub const LIGHT_GRAY: u32 = 0x00_D3_D3_D3;
pub const MID_GRAY: u32 = 0x00_A9_A9_A9;
pub const DARKER_GRAY: u32 = 0x00_46_46_46;

/// Canvas background; also what the eraser paints.
pub const BACKGROUND: u32 = WHITE;

/// Selectable colors in menu order, with their display names.
pub const COLORS: [(u32, &str); 12] = [
    (RED, "Red"),
    (GREEN, "Green"),
    (BLUE, "Blue"),
    (YELLOW, "Yellow"),
    (PURPLE, "Purple"),
    (CYAN, "Cyan"),
    (WHITE, "White"),
    (BLACK, "Black"),
    (ORANGE, "Orange"),
    (PINK, "Pink"),
    (INDIGO, "Indigo"),
    (VIOLET, "Violet"),
];

/// Human name for a palette color, hex for anything else.
pub fn color_name(color: u32) -> String {
    COLORS
        .iter()
        .find(|(c, _)| *c == color)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| format!("#{:06X}", color & 0x00FF_FFFF))
}

/// Split 0x00RRGGBB into channels.
#[inline]
pub fn unpack(px: u32) -> [u8; 3] {
    [((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8]
}

/// Pack channels back to 0x00RRGGBB.
#[inline]
pub fn pack(rgb: [u8; 3]) -> u32 {
    ((rgb[0] as u32) << 16) | ((rgb[1] as u32) << 8) | rgb[2] as u32
}

/// Per-channel weighted sum `a*wa + b*wb + bias`, rounded half to even and clipped to 0..=255.
#[inline]
pub fn weighted_sum(a: u32, wa: f32, b: u32, wb: f32, bias: f32) -> u32 {
    let (ca, cb) = (unpack(a), unpack(b));
    let mut out = [0u8; 3];
    for i in 0..3 {
        let v = ca[i] as f32 * wa + cb[i] as f32 * wb + bias;
        out[i] = v.round_ties_even().clamp(0.0, 255.0) as u8;
    }
    pack(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_known_colors() {
        assert_eq!(color_name(ORANGE), "Orange");
        assert_eq!(color_name(0x00_12_34_56), "#123456");
    }

    #[test]
    fn weighted_sum_rounds_half_to_even_and_saturates() {
        // 0.5*200 + 0.5*100 + 0.5 = 150.5 -> 150, 0.5 -> 0
        assert_eq!(weighted_sum(pack([200, 0, 0]), 0.5, pack([100, 0, 0]), 0.5, 0.5), pack([150, 0, 0]));
        // 151.5 -> 152
        assert_eq!(weighted_sum(pack([201, 0, 0]), 0.5, pack([101, 0, 0]), 0.5, 0.5), pack([152, 0, 0]));
        assert_eq!(weighted_sum(BLACK, 0.5, BLACK, 0.5, 0.5), BLACK);
        // 255 + 255 overflows, must clip
        assert_eq!(weighted_sum(WHITE, 1.0, WHITE, 1.0, 0.0), WHITE);
    }
}
