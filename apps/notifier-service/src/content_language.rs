//! # コンテンツ言語
//!
//! 通知本文に埋め込む日時を、サイトのコンテンツ言語とタイムゾーンで整形する。
//! 月名などの地域化には chrono のロケール機能を使う。

use chrono::{DateTime, FixedOffset, Locale, Utc};

/// 日時整形サービス
pub trait ContentLanguage: Send + Sync {
    /// 言語コード
    fn code(&self) -> &str;

    /// 日付と時刻
    fn time_and_date(&self, at: DateTime<Utc>) -> String;

    /// 日付のみ
    fn date(&self, at: DateTime<Utc>) -> String;

    /// 時刻のみ
    fn time(&self, at: DateTime<Utc>) -> String;
}

/// 言語ごとの書式
#[derive(Debug, Clone, Copy)]
struct Formats {
    locale:        Locale,
    date:          &'static str,
    time:          &'static str,
    time_and_date: &'static str,
}

const EN: Formats = Formats {
    locale:        Locale::en_US,
    date:          "%-d %B %Y",
    time:          "%H:%M",
    time_and_date: "%H:%M, %-d %B %Y",
};

const JA: Formats = Formats {
    locale:        Locale::ja_JP,
    date:          "%Y年%-m月%-d日",
    time:          "%H:%M",
    time_and_date: "%Y年%-m月%-d日 %H:%M",
};

const DE: Formats = Formats {
    locale:        Locale::de_DE,
    date:          "%-d. %B %Y",
    time:          "%H:%M",
    time_and_date: "%-d. %B %Y, %H:%M",
};

const FR: Formats = Formats {
    locale:        Locale::fr_FR,
    date:          "%-d %B %Y",
    time:          "%H:%M",
    time_and_date: "%-d %B %Y à %H:%M",
};

/// chrono ロケールによる実装
///
/// 未知の言語は英語の書式で整形する。
#[derive(Debug, Clone)]
pub struct LocaleContentLanguage {
    code:    String,
    formats: Formats,
    offset:  FixedOffset,
}

impl LocaleContentLanguage {
    pub fn new(code: &str, offset: FixedOffset) -> Self {
        let code = crate::catalog::primary_subtag(code);
        let formats = match code.as_str() {
            "ja" => JA,
            "de" => DE,
            "fr" => FR,
            _ => EN,
        };

        Self {
            code,
            formats,
            offset,
        }
    }

    /// UTC からの分単位のオフセットで作成する
    ///
    /// ±24 時間を超えるオフセットは `None`。
    pub fn with_offset_minutes(code: &str, minutes: i32) -> Option<Self> {
        let offset = FixedOffset::east_opt(minutes.checked_mul(60)?)?;
        Some(Self::new(code, offset))
    }

    fn format(&self, at: DateTime<Utc>, pattern: &str) -> String {
        at.with_timezone(&self.offset)
            .format_localized(pattern, self.formats.locale)
            .to_string()
    }
}

impl ContentLanguage for LocaleContentLanguage {
    fn code(&self) -> &str {
        &self.code
    }

    fn time_and_date(&self, at: DateTime<Utc>) -> String {
        self.format(at, self.formats.time_and_date)
    }

    fn date(&self, at: DateTime<Utc>) -> String {
        self.format(at, self.formats.date)
    }

    fn time(&self, at: DateTime<Utc>) -> String {
        self.format(at, self.formats.time)
    }
}
