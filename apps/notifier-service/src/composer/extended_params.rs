//! # 拡張パラメータフック
//!
//! 件名と本文のテンプレートに、既定より多くの位置パラメータを渡すフック。
//!
//! | パラメータ | 件名 | 本文 |
//! |-----------|------|------|
//! | `$1` | サイト名 | 受信者 |
//! | `$2` | ユーザー名 | ユーザー名 |
//! | `$3`〜`$6` | - | 既定と同じ（サイト名、日時、日付、時刻） |
//! | `$7` | - | 作成されたアカウントのメールアドレス |
//! | `$8` | - | URL エンコードしたサイト名 |
//! | `$9` | - | アカウント作成を要求したクライアントの IP アドレス |
//! | `$10` | - | URL エンコードしたユーザー名 |
//!
//! URL エンコードは RFC 3986 の非予約文字以外をすべて `%XX` にする（空白は `%20`）。

use super::{BodyHook, ComposeContext, SubjectHook};
use crate::catalog::{BODY_KEY, SUBJECT_KEY};

/// クライアント IP が不明な場合の表示
const UNKNOWN_IP: &str = "unknown";

/// 拡張パラメータフック
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtendedParamsHook;

impl SubjectHook for ExtendedParamsHook {
    fn on_subject(&self, ctx: &ComposeContext<'_>, subject: &mut String) {
        *subject = ctx.composer.message(
            SUBJECT_KEY,
            &[ctx.site_name.to_string(), ctx.user().name().to_string()],
        );
    }
}

impl BodyHook for ExtendedParamsHook {
    fn on_body(&self, ctx: &ComposeContext<'_>, body: &mut String) {
        let user = ctx.user();

        let mut params = ctx.composer.default_body_params(ctx.recipient, user);
        params.extend([
            user.email().map(|e| e.to_string()).unwrap_or_default(),
            urlencoding::encode(ctx.site_name).into_owned(),
            ctx.event
                .client_ip()
                .map_or_else(|| UNKNOWN_IP.to_string(), |ip| ip.to_string()),
            urlencoding::encode(user.name().as_str()).into_owned(),
        ]);

        *body = ctx.composer.message(BODY_KEY, &params);
    }
}
