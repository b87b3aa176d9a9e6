//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum used to classify user-visible notices.

use serde::Serialize;

/// エラー種別の列挙体
///
/// クライアントアプリで発生するエラーの分類を定義します。
/// 各バリアントは UI 側の通知カテゴリ（入力エラー・認証エラー・
/// 接続エラーなど）にマッピングされます。
///
/// ## Notes
/// * `non_exhaustive` - 将来的に列挙子が追加される可能性があることを示す
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::Unavailable;
/// assert_eq!(kind.as_str(), "Unavailable");
/// assert!(kind.is_transient());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 入力が不正（形式エラー）
    InvalidInput,
    /// 認証が必要・資格情報が無効
    Unauthorized,
    /// アクセス権限なし
    Forbidden,
    /// リソースが見つからない
    NotFound,
    /// 操作がタイムアウトした
    Timeout,
    /// 現在の状態と競合
    Conflict,
    /// 試行回数の上限超過（一時ロック）
    RateLimited,
    /// 外部サービスに到達できない
    Unavailable,
    /// 端末ローカルストレージの読み書き失敗
    Storage,
    /// アプリ内部エラー
    Internal,
}

impl ErrorKind {
    /// ユーザー向けの文字列表現を取得
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::InvalidInput.as_str(), "Invalid Input");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "Invalid Input",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Timeout => "Timeout",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::RateLimited => "Rate Limited",
            ErrorKind::Unavailable => "Unavailable",
            ErrorKind::Storage => "Storage",
            ErrorKind::Internal => "Internal",
        }
    }

    /// アプリ側の障害かどうかを判定
    ///
    /// `true` のエラーは error レベルでログに記録すべきです。
    #[inline]
    pub const fn is_fault(&self) -> bool {
        matches!(self, ErrorKind::Internal | ErrorKind::Storage)
    }

    /// 一時的なエラー（再試行で解消しうる）かどうかを判定
    #[inline]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::Timeout | ErrorKind::Unavailable | ErrorKind::RateLimited
        )
    }

    /// ユーザー操作に起因するエラーかどうかを判定
    #[inline]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidInput
                | ErrorKind::Unauthorized
                | ErrorKind::Forbidden
                | ErrorKind::NotFound
                | ErrorKind::Conflict
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
