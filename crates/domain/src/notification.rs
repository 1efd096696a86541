//! # 通知
//!
//! 新規ユーザー作成通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`NotificationEvent`] | 通知イベント | アカウント作成の事実。1 回の配送パスで消費される |
//! | [`RecipientSpec`] | 受信者指定 | 設定に書かれた内部受信者（数値 ID またはユーザー名） |
//! | [`RecipientKind`] | 受信者種別 | 外部（生アドレス）/ 内部（登録アカウント） |
//! | [`EmailMessage`] | メールメッセージ | 受信者ごとに生成される件名と本文 |
//!
//! ## 設計方針
//!
//! - **受信者の解決は失敗しない**: 存在しない受信者は黙ってスキップする
//! - **送信失敗は伝播する**: 配送に失敗した時点で呼び出し元へ返す（再送しない）

use std::{net::IpAddr, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

use crate::{
    DomainError,
    user::{Account, Email, UserId},
};

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// 送信先・送信元アドレスが不正
    #[error("メールアドレスが不正: {0}")]
    InvalidAddress(String),
}

impl From<DomainError> for NotificationError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(msg) => Self::InvalidAddress(msg),
        }
    }
}

/// 受信者種別
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RecipientKind {
    /// 外部受信者: アカウントに紐づかない生のメールアドレス
    External,
    /// 内部受信者: 登録済みアカウント
    Internal,
}

/// 受信者指定
///
/// 設定で与えられる内部受信者の識別子。
///
/// - 文字列からの変換では、ASCII 数字のみからなる値を数値 ID、それ以外をユーザー名とする
/// - JSON では数値なら ID、文字列ならユーザー名とする
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipientSpec {
    /// 数値 ID
    Id(UserId),
    /// ユーザー名（正規化前）
    Name(String),
}

impl FromStr for RecipientSpec {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::Validation("受信者指定が空です".to_string()));
        }

        if s.bytes().all(|b| b.is_ascii_digit()) {
            let id = s
                .parse::<u64>()
                .map_err(|e| DomainError::Validation(format!("不正なユーザー ID: {s} ({e})")))?;
            return Ok(Self::Id(UserId::new(id)));
        }

        Ok(Self::Name(s.to_string()))
    }
}

impl std::fmt::Display for RecipientSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Name(name) => write!(f, "{name}"),
        }
    }
}

/// メールアドレスと任意の表示名
///
/// `Name <addr>` または `addr` の形式で表示する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAddress {
    address: Email,
    name:    Option<String>,
}

impl MailAddress {
    pub fn new(address: Email) -> Self {
        Self {
            address,
            name: None,
        }
    }

    /// 表示名を付ける
    ///
    /// 空の表示名は付けない。
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = (!name.trim().is_empty()).then_some(name);
        self
    }

    /// 生のアドレス文字列から作成する
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        Email::new(value).map(Self::new)
    }

    pub fn address(&self) -> &Email {
        &self.address
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl std::fmt::Display for MailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} <{}>", self.address),
            None => write!(f, "{}", self.address),
        }
    }
}

/// メールメッセージ
///
/// 受信者ごとに生成され、`NotificationSender` に渡される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// 送信先
    pub to:      MailAddress,
    /// 送信元
    pub from:    MailAddress,
    /// 件名
    pub subject: String,
    /// プレーンテキスト本文
    pub body:    String,
}

/// 通知イベント（アカウント作成）
///
/// イベント発生元が生成し、1 回の配送パスで消費される。生成後は変更しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    user:        Account,
    autocreated: bool,
    client_ip:   Option<IpAddr>,
}

impl NotificationEvent {
    pub fn new(user: Account, autocreated: bool) -> Self {
        Self {
            user,
            autocreated,
            client_ip: None,
        }
    }

    /// アカウント作成を要求したクライアントの IP アドレスを付ける
    pub fn with_client_ip(mut self, client_ip: IpAddr) -> Self {
        self.client_ip = Some(client_ip);
        self
    }

    /// 作成されたアカウント
    pub fn user(&self) -> &Account {
        &self.user
    }

    /// 自動作成（外部認証連携など）されたアカウントか
    pub fn is_autocreated(&self) -> bool {
        self.autocreated
    }

    pub fn client_ip(&self) -> Option<IpAddr> {
        self.client_ip
    }
}
