//! ポート定義
//!
//! - driving: 外部から呼び出されるユースケース
//! - driven: ドメインが外部に求める機能

pub mod driven;
pub mod driving;
