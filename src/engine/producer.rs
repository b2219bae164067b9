// Producer - ファイル名配信機能

use anyhow::Result;
use tokio::sync::mpsc;

/// Producer: 担当ファイル名を順番にチャンネルへ流す
///
/// チャンネルが満杯なら待機する（バックプレッシャー）。全件送信後に送信側を閉じる。
pub fn spawn_producer(
    file_names: Vec<String>,
    work_tx: mpsc::Sender<String>,
) -> tokio::task::JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let total = file_names.len();
        for (sent, file_name) in file_names.into_iter().enumerate() {
            if work_tx.send(file_name).await.is_err() {
                // 全ワーカーが終了済み
                log::debug!("Producer: 受信側が閉じたため {sent}/{total} 件で停止");
                break;
            }
        }
        Ok(())
    })
}
