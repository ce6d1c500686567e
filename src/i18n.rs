use serde::{Deserialize, Serialize};

use crate::error::TernaryError;

/// UI language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl Locale {
    pub fn strings(self) -> &'static Strings {
        match self {
            Locale::En => &EN,
            Locale::Ja => &JA,
        }
    }
}

/// Fixed UI text for one language.
pub struct Strings {
    pub locale: Locale,
    pub window_title: &'static str,
    pub menu_file: &'static str,
    pub menu_open: &'static str,
    pub elements_heading: &'static str,
    pub element_slots: [&'static str; 3],
    pub basis_heading: &'static str,
    pub basis_slots: [&'static str; 3],
    pub not_selected: &'static str,
    pub export_heading: &'static str,
    pub default_section: &'static str,
    pub custom_section: &'static str,
    pub legend_title: &'static str,
    pub custom_title: &'static str,
    pub show_table: &'static str,
    pub table_heading: &'static str,
    pub label_column: &'static str,
    pub no_data: &'static str,
    pub file_hint: &'static str,
    pub select_all_prompt: &'static str,
    pub rows_loaded: &'static str,
    pub load_failed: &'static str,
    pub outside_basis: &'static str,
    pub exported: &'static str,
}

impl Strings {
    /// Title of the chart drawn on the raw element axes.
    pub fn default_title(&self, axis_names: &[String; 3]) -> String {
        let system = axis_names.join("-");
        match self.locale {
            Locale::En => format!("{system} ternary diagram"),
            Locale::Ja => format!("{system} 三角相図"),
        }
    }

    /// Localised explanation of an error for inline display.
    pub fn explain(&self, err: &TernaryError) -> String {
        let ja = self.locale == Locale::Ja;
        match err {
            TernaryError::IncompleteSelection { .. } => self.select_all_prompt.to_string(),
            TernaryError::DegenerateBasis { .. } if ja => {
                "選択した化合物が重複しており相図を作ることができません。別の組み合わせを選んでください。"
                    .to_string()
            }
            TernaryError::DegenerateBasis { .. } => format!(
                "{err}. The selected compounds are duplicated or linearly dependent; choose another combination."
            ),
            TernaryError::ExternalToolMissing { program } if ja => {
                format!("変換ツール '{program}' が見つかりません。")
            }
            _ if ja => format!("エラーが発生しました: {err}"),
            _ => format!("Error: {err}"),
        }
    }
}

static EN: Strings = Strings {
    locale: Locale::En,
    window_title: "Rusty Ternary – Phase Diagram Viewer",
    menu_file: "File",
    menu_open: "Open…",
    elements_heading: "Elements",
    element_slots: ["Element A", "Element B", "Element C"],
    basis_heading: "Basis compounds",
    basis_slots: ["Basis compound 1", "Basis compound 2", "Basis compound 3"],
    not_selected: "(not selected)",
    export_heading: "Export",
    default_section: "① Ternary diagram",
    custom_section: "② Ternary diagram in a custom basis",
    legend_title: "Compound",
    custom_title: "Transformed ternary diagram",
    show_table: "Show data table",
    table_heading: "Data",
    label_column: "Label",
    no_data: "Open a file to draw a ternary diagram  (File → Open…)",
    file_hint: "Columns: label, A, B, C (Excel, CSV, TSV, JSON or Parquet, header row required)",
    select_all_prompt: "Select all three basis compounds.",
    rows_loaded: "rows loaded",
    load_failed: "Could not open the file",
    outside_basis: "row(s) lie outside the selected basis and are not shown.",
    exported: "Exported",
};

static JA: Strings = Strings {
    locale: Locale::Ja,
    window_title: "三角相図ジェネレーター",
    menu_file: "ファイル",
    menu_open: "開く…",
    elements_heading: "元素",
    element_slots: ["元素A", "元素B", "元素C"],
    basis_heading: "基底化合物",
    basis_slots: ["基底化合物1", "基底化合物2", "基底化合物3"],
    not_selected: "（未選択）",
    export_heading: "エクスポート",
    default_section: "① 基本の三角相図",
    custom_section: "② 頂点を変換した三角相図",
    legend_title: "化合物",
    custom_title: "変換三角相図",
    show_table: "データ表を表示",
    table_heading: "データ",
    label_column: "ラベル",
    no_data: "ファイルを開くと三角相図を描きます（ファイル → 開く…）",
    file_hint: "列順：ラベル, A, B, C（Excel・CSV・TSV・JSON・Parquet、見出し行が必要）",
    select_all_prompt: "すべての化合物を正しく選択してください。",
    rows_loaded: "行を読み込みました",
    load_failed: "ファイルを開けませんでした",
    outside_basis: "行が選択した基底の外にあるため表示されません。",
    exported: "書き出しました",
};

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> [String; 3] {
        ["Sr".into(), "Mo".into(), "O".into()]
    }

    #[test]
    fn default_title_is_localised() {
        assert_eq!(
            Locale::En.strings().default_title(&names()),
            "Sr-Mo-O ternary diagram"
        );
        assert_eq!(Locale::Ja.strings().default_title(&names()), "Sr-Mo-O 三角相図");
    }

    #[test]
    fn legend_title_is_localised() {
        assert_eq!(Locale::En.strings().legend_title, "Compound");
        assert_eq!(Locale::Ja.strings().legend_title, "化合物");
    }

    #[test]
    fn incomplete_selection_reads_as_a_prompt() {
        let err = TernaryError::IncompleteSelection { slot: 0, label: None };
        assert_eq!(
            Locale::En.strings().explain(&err),
            "Select all three basis compounds."
        );
    }
}
