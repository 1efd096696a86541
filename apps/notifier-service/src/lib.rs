//! # Notifier Service ライブラリ
//!
//! 新規ユーザー通知の受信者解決・メッセージ組み立て・配送と、
//! それを公開する HTTP ハンドラを提供する。
//!
//! ## モジュール構成
//!
//! - [`resolver`] - 内部受信者の解決
//! - [`composer`] - 件名・本文の組み立てとフック
//! - [`dispatcher`] - 配送パス
//! - [`catalog`] / [`content_language`] - コンテンツ言語のテンプレートと日時書式
//! - [`handler`] - HTTP ハンドラ
//! - [`config`] / [`setup`] - 設定の読み込みと組み立て

pub mod catalog;
pub mod composer;
pub mod config;
pub mod content_language;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod resolver;
pub mod setup;

pub use dispatcher::{DispatchError, DispatchSummary, NewUserNotifier};
