//! # ドメイン層エラー定義
//!
//! 値オブジェクトの生成時に発生する検証エラーを表現する。
//!
//! 受信者が見つからない、メールアドレスが未確認といった状態はエラーではなく
//! 通常の結果（`None` / スキップ）として扱うため、ここには含めない。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がホストプラットフォームの規則に違反している場合に使用する。
    ///
    /// # 例
    ///
    /// - 空のユーザー名
    /// - ユーザー名に使用できない文字
    /// - `@` を含まないメールアドレス
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validationのメッセージに理由が含まれる() {
        let err = DomainError::Validation("ユーザー名は必須です".to_string());
        assert_eq!(err.to_string(), "バリデーションエラー: ユーザー名は必須です");
    }
}
