//! 設定ストア（レジストリ）ポート

use crate::error::DomainError;
use crate::model::{StoreRoot, ZoneCode};

/// ゾーンごとの保護モード値を読み書きする最小ポート。
/// パスの組み立てはアダプタ側の責務で、コアはゾーンコードのみ渡す。
pub trait ConfigStore: Send + Sync {
    /// 生の整数値を取得
    fn get_int(&self, root: StoreRoot, zone: ZoneCode) -> Result<u32, DomainError>;

    /// 生の整数値を設定
    fn set_int(&self, root: StoreRoot, zone: ZoneCode, value: u32) -> Result<(), DomainError>;
}
