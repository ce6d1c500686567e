use std::sync::Arc;

use eframe::egui::{self, FontData, FontDefinitions, FontFamily};
use usvg::fontdb;

/// Installed families tried in order when looking for Japanese glyphs.
const CJK_FAMILIES: &[&str] = &[
    "Noto Sans CJK JP",
    "Noto Sans JP",
    "Source Han Sans JP",
    "Source Han Sans",
    "Hiragino Sans",
    "Hiragino Kaku Gothic ProN",
    "Yu Gothic",
    "Meiryo",
    "MS Gothic",
    "IPAexGothic",
    "IPAGothic",
    "TakaoGothic",
    "VL Gothic",
    "Droid Sans Fallback",
];

const FALLBACK_NAME: &str = "cjk-fallback";

/// Family name, bytes and collection index of the first installed CJK face.
pub fn find_cjk_face(db: &fontdb::Database) -> Option<(String, Vec<u8>, u32)> {
    CJK_FAMILIES.iter().find_map(|&family| {
        let families = [fontdb::Family::Name(family)];
        let id = db.query(&fontdb::Query {
            families: &families,
            ..Default::default()
        })?;
        let (bytes, index) = db.with_face_data(id, |data, index| (data.to_vec(), index))?;
        Some((family.to_string(), bytes, index))
    })
}

/// Append `data` as the last-resort font of the proportional and monospace families.
pub fn add_fallback(fonts: &mut FontDefinitions, name: &str, data: FontData) {
    fonts.font_data.insert(name.to_owned(), Arc::new(data));
    for family in [FontFamily::Proportional, FontFamily::Monospace] {
        fonts.families.entry(family).or_default().push(name.to_owned());
    }
}

/// egui's bundled fonts carry no CJK glyphs; borrow one from the system.
pub fn install_cjk_fallback(ctx: &egui::Context, db: &fontdb::Database) {
    let Some((family, bytes, index)) = find_cjk_face(db) else {
        log::warn!("No CJK font found; Japanese text will not render");
        return;
    };
    log::info!("Using '{family}' for CJK glyphs");

    let mut data = FontData::from_owned(bytes);
    data.index = index;
    let mut fonts = FontDefinitions::default();
    add_fallback(&mut fonts, FALLBACK_NAME, data);
    ctx.set_fonts(fonts);
}
