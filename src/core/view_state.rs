use crate::core::orchestrator::FetchOrchestrator;
use crate::domain::model::{RouteQuery, ViewSnapshot, ViewState};
use crate::domain::ports::RouteServices;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;

/// 持有唯一的畫面狀態槽
///
/// 每次送出查詢都會取得新的 generation 編號。執行中的查詢不會被中止，
/// 但完成時只有在其 generation 仍是目前值、且狀態仍為 `Loading` 時才能寫入結果。
pub struct ViewController<S: RouteServices + 'static> {
    orchestrator: FetchOrchestrator<S>,
    slot: Arc<watch::Sender<ViewSnapshot>>,
}

impl<S: RouteServices + 'static> Clone for ViewController<S> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: self.orchestrator.clone(),
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<S: RouteServices + 'static> ViewController<S> {
    pub fn new(orchestrator: FetchOrchestrator<S>) -> Self {
        let (slot, _) = watch::channel(ViewSnapshot::initial());
        Self {
            orchestrator,
            slot: Arc::new(slot),
        }
    }

    /// 接受新查詢：狀態重設為 `Loading`，並在背景執行查詢，回傳分配到的 generation。
    ///
    /// 內部使用 `tokio::spawn`，必須在 tokio runtime 內呼叫，否則會 panic。
    pub fn submit(&self, query: RouteQuery) -> u64 {
        let mut generation = 0;
        self.slot.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.query = Some(query.clone());
            snapshot.state = ViewState::Loading;
            snapshot.updated_at = Utc::now();
            generation = snapshot.generation;
        });
        tracing::info!("Submitted {} as generation {}", query, generation);

        let controller = self.clone();
        tokio::spawn(async move {
            let outcome = controller.orchestrator.run(&query).await;
            controller.apply(generation, outcome);
        });

        generation
    }

    /// 送出查詢並等待它 (或之後更新的查詢) 進入終態
    pub async fn submit_and_wait(&self, query: RouteQuery) -> ViewState {
        let mut receiver = self.slot.subscribe();
        let generation = self.submit(query);

        let settled = receiver
            .wait_for(|snapshot| snapshot.generation >= generation && snapshot.state.is_terminal())
            .await
            .map(|snapshot| snapshot.state.clone());

        match settled {
            Ok(state) => state,
            Err(_) => self.snapshot().state,
        }
    }

    /// 結果仍屬於目前查詢時才寫入，回傳狀態槽是否有變更
    pub fn apply(&self, generation: u64, outcome: ViewState) -> bool {
        if !outcome.is_terminal() {
            return false;
        }

        let mut current = 0;
        let applied = self.slot.send_if_modified(|snapshot| {
            current = snapshot.generation;
            if snapshot.generation != generation || snapshot.state.is_terminal() {
                return false;
            }
            snapshot.state = outcome;
            snapshot.updated_at = Utc::now();
            true
        });

        if applied {
            tracing::info!("Generation {} settled", generation);
        } else if current != generation {
            tracing::debug!(
                "Discarded stale result of generation {} (current {})",
                generation,
                current
            );
        } else {
            tracing::debug!("Generation {} already settled, ignoring outcome", generation);
        }
        applied
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.slot.borrow().clone()
    }

    pub fn current_generation(&self) -> u64 {
        self.slot.borrow().generation
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.slot.subscribe()
    }
}
