//! ドメインエラー型

use thiserror::Error;

/// ドメイン層のエラー型
/// 各バリアントは特定の失敗シナリオを表現
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// 呼び出し側の入力が不正（ゾーン名、スコープ名、値など）
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// レジストリアクセス拒否（HKLMへの書き込みには管理者権限が必要）
    #[error("Registry access denied: {0}")]
    RegistryAccessDenied(String),

    /// キーまたは値が存在しない
    #[error("Registry value not found: {0}")]
    ValueNotFound(String),

    /// その他のレジストリエラー
    #[error("Registry error: {0}")]
    Registry(String),

    /// このプラットフォームでは未対応
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// 設定ファイルの読み込み失敗
    #[error("Configuration load failed: {0}")]
    ConfigLoadFailed(String),

    /// 設定値が無効
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// ファイルI/Oエラー
    #[error("IO error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = DomainError::RegistryAccessDenied("HKLM zone 3".into());
        assert_eq!(err.to_string(), "Registry access denied: HKLM zone 3");
    }
}
