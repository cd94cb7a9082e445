//! Subcommand implementations on top of a running hub.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use kiosk_core::stores::{BrowseState, Stores, track_quality};
use kiosk_core::{ConnectionStatus, StateCell, ViewModel, format_duration};
use kiosk_types::{BrowseResponse, PlayerState, QueueItem};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub struct Session {
    pub stores: Arc<Stores>,
    pub connection: StateCell<ConnectionStatus>,
    pub view: StateCell<ViewModel>,
    pub timeout: Duration,
    pub shutdown: CancellationToken,
}

impl Session {
    async fn wait_open(&self) -> Result<()> {
        let mut rx = self.connection.subscribe();
        let waited = tokio::time::timeout(self.timeout, rx.wait_for(ConnectionStatus::is_open)).await;
        match waited {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(anyhow!("connection state dropped")),
            Err(_) => {
                let status = self.connection.get();
                Err(anyhow!(
                    "backend not reachable after {:?} (retries {}, last error: {})",
                    self.timeout,
                    status.retry_count,
                    status.last_error.as_deref().unwrap_or("none")
                ))
            }
        }
    }

    /// Wait until `done` holds for the cell, giving up after the timeout.
    async fn wait_until<T: Clone>(
        &self,
        cell: &StateCell<T>,
        what: &str,
        done: impl FnMut(&T) -> bool,
    ) -> Result<T> {
        let mut rx: watch::Receiver<T> = cell.subscribe();
        match tokio::time::timeout(self.timeout, rx.wait_for(done)).await {
            Ok(Ok(value)) => Ok((*value).clone()),
            Ok(Err(_)) => Err(anyhow!("{what}: state dropped")),
            Err(_) => Err(anyhow!("{what}: no answer within {:?}", self.timeout)),
        }
    }
}

pub async fn run(session: &Session, viewport: Option<(u32, u32)>) -> Result<()> {
    if let Some((width, height)) = viewport {
        session.stores.device.set_viewport(width, height);
        let kind = session.stores.device.state().with(|d| d.kind);
        tracing::info!(width, height, ?kind, "viewport");
    }
    let mut view = session.view.subscribe();
    loop {
        log_view(&view.borrow_and_update());
        tokio::select! {
            _ = session.shutdown.cancelled() => return Ok(()),
            changed = view.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
        }
    }
}

fn log_view(view: &ViewModel) {
    tracing::info!(
        connection = view.connection.label(),
        playing = view.is_playing,
        elapsed = %view.elapsed_label,
        duration = %view.duration_label,
        progress = view.progress_percent.round() as u64,
        quality = %view.track_quality,
        favourite = view.is_favorite,
        queue = view.queue_len,
        "view"
    );
}

pub async fn status(session: &Session) -> Result<()> {
    session.wait_open().await?;
    let player = session
        .wait_until(session.stores.player.state(), "getState", |p| !p.title.is_empty() || !p.uri.is_empty())
        .await
        .unwrap_or_else(|err| {
            tracing::warn!("{err}");
            session.stores.player.state().get()
        });
    print_player(&player);
    Ok(())
}

/// Issue one player action and print the state the backend answers with.
pub async fn player_action(session: &Session, action: impl FnOnce(&Stores)) -> Result<()> {
    session.wait_open().await?;
    let mut rx = session.stores.player.state().subscribe();
    action(&session.stores);
    let changed = tokio::time::timeout(session.timeout, rx.changed()).await;
    match changed {
        Ok(Ok(())) => print_player(&rx.borrow()),
        _ => tracing::warn!("no state update after {:?}", session.timeout),
    }
    Ok(())
}

pub async fn browse(session: &Session, uri: Option<&str>) -> Result<()> {
    session.wait_open().await?;
    let Some(uri) = uri else {
        let state = session
            .wait_until(session.stores.browse.state(), "getBrowseSources", |s| !s.sources.is_empty())
            .await?;
        for source in &state.sources {
            println!("{:<24} {}", source.name, source.uri);
        }
        return Ok(());
    };
    session.stores.browse.browse(uri);
    let state = wait_browse(session, "browseLibrary").await?;
    print_node(&state.node);
    Ok(())
}

pub async fn search(session: &Session, query: &str) -> Result<()> {
    session.wait_open().await?;
    session.stores.browse.search(query);
    let state = wait_browse(session, "search").await?;
    print_node(&state.node);
    Ok(())
}

async fn wait_browse(session: &Session, what: &str) -> Result<BrowseState> {
    let state = session
        .wait_until(session.stores.browse.state(), what, |s| !s.loading)
        .await?;
    match state.error.as_ref() {
        Some(err) => Err(anyhow!("{what}: {err}")),
        None => Ok(state),
    }
}

pub async fn queue(session: &Session) -> Result<()> {
    session.wait_open().await?;
    session.stores.queue.refresh();
    let state = session
        .wait_until(session.stores.queue.state(), "getQueue", |q| !q.loading)
        .await?;
    if state.items.is_empty() {
        println!("queue is empty");
    }
    for (index, item) in state.items.iter().enumerate() {
        println!("{}", queue_line(index, item));
    }
    Ok(())
}

fn print_player(player: &PlayerState) {
    let status = serde_json::to_value(player.status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    println!("{status}: {} - {}", player.artist, player.title);
    let elapsed = format_duration(player.seek / 1000);
    let duration = format_duration(player.duration);
    if !duration.is_empty() {
        println!("  {} / {}", if elapsed.is_empty() { "0:00" } else { &elapsed }, duration);
    }
    let quality = track_quality(player);
    if !quality.is_empty() {
        println!("  {quality}");
    }
    println!("  volume {}{}", player.volume, if player.mute { " (muted)" } else { "" });
}

fn print_node(node: &BrowseResponse) {
    for list in &node.lists {
        if let Some(title) = list.title.as_deref().filter(|t| !t.is_empty()) {
            println!("== {title}");
        }
        for item in &list.items {
            let artist = item.artist.as_deref().unwrap_or("");
            println!("{:<8} {:<40} {:<24} {}", item.item_type, item.title, artist, item.uri);
        }
    }
    if let Some(prev) = node.prev.as_ref() {
        println!("(back: {})", prev.uri);
    }
}

fn queue_line(index: usize, item: &QueueItem) -> String {
    let duration = format_duration(item.duration);
    if duration.is_empty() {
        format!("{index:>3}. {} - {}", item.artist, item.display_name())
    } else {
        format!("{index:>3}. {} - {} [{duration}]", item.artist, item.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_line_formats_duration_when_known() {
        let item = QueueItem {
            name: "So What".into(),
            artist: "Miles Davis".into(),
            duration: 564,
            ..QueueItem::default()
        };
        assert_eq!(queue_line(0, &item), "  0. Miles Davis - So What [9:24]");
        let item = QueueItem {
            duration: 0,
            ..item
        };
        assert_eq!(queue_line(12, &item), " 12. Miles Davis - So What");

        let item = QueueItem {
            name: String::new(),
            title: Some("Freddie Freeloader".into()),
            ..item
        };
        assert_eq!(queue_line(1, &item), "  1. Miles Davis - Freddie Freeloader");
    }
}
