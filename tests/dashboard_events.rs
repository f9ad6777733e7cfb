use std::sync::mpsc;
use veye::feed::FEED_CAP;
use veye::gui::DashboardApp;
use veye::prediction::{Prediction, Tier};
use veye::supabase::FeedEvent;

fn row(id: i64, tier: Tier) -> Prediction {
    Prediction {
        id,
        platform: "tiktok".into(),
        author: None,
        title: None,
        clip_url: None,
        ai_score: 0.0,
        platform_score: 0.0,
        final_score: 0.0,
        tier,
        cross_platform: false,
        scored_at: None,
    }
}

#[test]
fn snapshot_event_replaces_feed() {
    let mut app = DashboardApp::detached();
    app.apply_event(FeedEvent::Snapshot(vec![row(1, Tier::Viral)]));
    app.apply_event(FeedEvent::Snapshot(vec![row(2, Tier::Noise), row(3, Tier::Noise)]));
    assert_eq!(app.feed.len(), 2);
    assert_eq!(app.feed.rows()[0].id, 2);
}

#[test]
fn insert_event_prepends() {
    let mut app = DashboardApp::detached();
    app.apply_event(FeedEvent::Snapshot(vec![row(1, Tier::Monitor)]));
    app.apply_event(FeedEvent::Insert(row(2, Tier::Critical)));
    assert_eq!(app.feed.rows()[0].id, 2);
    assert_eq!(app.feed.stats().critical, 1);
}

#[test]
fn drain_applies_queued_events_in_order() {
    let (tx, rx) = mpsc::channel();
    let mut app = DashboardApp::new(rx);
    tx.send(FeedEvent::Snapshot(vec![row(1, Tier::Noise)])).unwrap();
    for id in 2..5 {
        tx.send(FeedEvent::Insert(row(id, Tier::Viral))).unwrap();
    }
    app.drain_events();
    assert_eq!(app.feed.len(), 4);
    // Last insert is newest, snapshot row is oldest.
    assert_eq!(app.feed.rows()[0].id, 4);
    assert_eq!(app.feed.rows()[3].id, 1);
}

#[test]
fn cap_holds_across_many_realtime_inserts() {
    let mut app = DashboardApp::detached();
    app.apply_event(FeedEvent::Snapshot(
        (0..FEED_CAP as i64).map(|id| row(id, Tier::Noise)).collect(),
    ));
    for id in 0..500 {
        app.apply_event(FeedEvent::Insert(row(1000 + id, Tier::Viral)));
        assert!(app.feed.len() <= FEED_CAP);
    }
}
