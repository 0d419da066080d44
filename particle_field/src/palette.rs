//! Scene colours, packed ARGB (0xAARRGGBB, A=0xFF) like the framebuffer.

pub const GREEN_LIGHT:   u32 = 0xFFA2D5AB;
pub const GREEN_MID:     u32 = 0xFF5C9E6F;
pub const GREEN_DARK:    u32 = 0xFF3A6B4A;
pub const METALLIC_GOLD: u32 = 0xFFFFC857;
pub const CHRISTMAS_RED: u32 = 0xFFD90429;
pub const WHITE:         u32 = 0xFFFFFFFF;
pub const WARM_LIGHT:    u32 = 0xFFFFB700;

/// `#RRGGBB` form of a packed colour (alpha dropped).
pub fn to_hex(color: u32) -> String {
    format!("#{:06X}", color & 0x00FF_FFFF)
}

/// Scale the RGB channels by `factor` (clamped to 0.0–1.0); alpha is kept opaque.
pub fn shade(color: u32, factor: f32) -> u32 {
    let f = factor.clamp(0.0, 1.0);
    let ch = |shift: u32| ((((color >> shift) & 0xFF) as f32) * f) as u32;
    0xFF000000 | (ch(16) << 16) | (ch(8) << 8) | ch(0)
}
