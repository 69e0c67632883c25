use thiserror::Error;

/// アプリケーション全体で利用するエラー型。
///
/// いずれのエラーも復旧せず、`main`まで伝播してプロセスを終了させる。
#[derive(Debug, Error)]
pub enum Error {
    /// 設定ファイルの読み込みに失敗した、もしくは必須キーが存在しない。
    #[error("configuration error: {0}")]
    Config(String),

    /// Toggl APIが2xx以外のステータスを返した。
    #[error("request returned status {status}: {body}")]
    Request { status: u16, body: String },

    /// durationの文字列やCSVの形式が想定と異なる。
    #[error("format error: {0}")]
    Format(String),

    /// HTTPの通信自体に失敗した。
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
