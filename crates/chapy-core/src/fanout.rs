//! 作業項目の逐次／並行実行
//!
//! サービス単位とコンテナ単位の2段の並行化で共通に使います。
//! 並行時も全タスクの完了を待ってから戻るため、呼び出し側のループは
//! 常に前の作業が終わってから次に進みます。

use std::future::Future;
use tokio::task::JoinSet;
use tracing::warn;

/// 全ての作業項目を実行し、結果を返す
///
/// `concurrent` が false の場合は項目順に1つずつ実行します。
/// true の場合は項目ごとにタスクを生成し、結果は完了順になります。
pub async fn fan_out<T, R, F, Fut>(concurrent: bool, items: Vec<T>, work: F) -> Vec<R>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = R> + Send + 'static,
    R: Send + 'static,
{
    let mut results = Vec::with_capacity(items.len());

    if !concurrent {
        for item in items {
            results.push(work(item).await);
        }
        return results;
    }

    let mut set = JoinSet::new();
    for item in items {
        set.spawn(work(item));
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => warn!(error = %e, "Task did not complete"),
        }
    }

    results
}
