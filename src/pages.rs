use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::response::Html;
use spdlog::prelude::*;
use uuid::Uuid;

use crate::routes::AppState;
use crate::timer::OneShot;

/// How long the confirmation page stays open before closing itself.
pub const AUTO_CLOSE_SECS: u64 = 3;

/// Transient confirmation notices, one per served confirmation page. Each
/// notice expires through a one-shot timer; tearing the board down cancels
/// every pending timer so no callback fires afterwards.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    entries: Arc<Mutex<HashMap<Uuid, OneShot>>>,
    ttl: Duration,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        NoticeBoard {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Registers a notice that removes itself after the board's ttl.
    pub fn post(&self) -> Uuid {
        let id = Uuid::new_v4();
        let entries = Arc::clone(&self.entries);

        // Hold the lock across the insert so the expiry callback cannot run
        // before the entry exists.
        let mut guard = self.entries.lock().unwrap();
        let timer = OneShot::schedule(self.ttl, move || {
            entries.lock().unwrap().remove(&id);
        });
        guard.insert(id, timer);

        id
    }

    pub fn is_active(&self, id: Uuid) -> bool {
        self.entries.lock().unwrap().contains_key(&id)
    }

    /// Cancels every pending expiry. Dropping the timers is enough to stop
    /// their callbacks.
    pub fn teardown(&self) {
        self.entries.lock().unwrap().clear();
    }
}

// GET /pages/upload-complete
pub async fn upload_complete(State(state): State<AppState>) -> Html<String> {
    let notice = state.notices.post();
    debug!("Serving upload confirmation, notice {}", notice);

    Html(render_confirmation(notice, AUTO_CLOSE_SECS))
}

fn render_confirmation(notice: Uuid, auto_close_secs: u64) -> String {
    format!(
        r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <title>Upload complete</title>
  </head>
  <body data-notice="{notice}">
    <h1>Upload complete</h1>
    <p>Your observations were received. This window will close in {auto_close_secs} seconds.</p>
    <script>
      setTimeout(function () {{ window.close(); }}, {auto_close_secs} * 1000);
    </script>
  </body>
</html>
"#
    )
}
