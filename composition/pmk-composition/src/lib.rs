//! pmk-composition: 実行ファイル向けのランタイムを組み立てるコンポジションルート。
//! ドメイン／アプリケーション／各種アダプタをここで配線し、apps/* はこのクレートだけに依存する。

pub mod logging;
pub mod runtime;
pub mod shutdown;

// apps/* が内側レイヤーの型に触れる必要がある場合は、ここから辿れるようにする。
pub use pmk_app as app;
pub use pmk_domain as domain;

pub use runtime::KeeperRuntime;
